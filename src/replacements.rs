//! Placeholder → value map with a fixed substitution order.

use crate::error::{Error, Result};

/// Token delimiters of a placeholder, as in `{{Bank_Name}}`.
pub const OPEN: &str = "{{";
pub const CLOSE: &str = "}}";

/// Ordered mapping from placeholder token to replacement text.
///
/// Iteration order is insertion order, which is also the order keys are
/// substituted in. Inserting an existing key replaces its value in place.
///
/// # Examples
///
/// ```rust
/// use complaint_docx::replacements::ReplacementMap;
///
/// let mut map = ReplacementMap::new();
/// map.insert("{{Bank_Name}}", "ABC Bank")?;
/// map.insert("{{Txn_ID}}", "T-1")?;
/// map.insert("{{Bank_Name}}", "XYZ Bank")?;
///
/// assert_eq!(map.len(), 2);
/// assert_eq!(map.get("{{Bank_Name}}"), Some("XYZ Bank"));
/// assert_eq!(map.keys().collect::<Vec<_>>(), ["{{Bank_Name}}", "{{Txn_ID}}"]);
/// assert!(map.insert("Bank_Name", "x").is_err());
/// # Ok::<(), complaint_docx::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplacementMap {
    entries: Vec<(String, String)>,
}

impl ReplacementMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a token and its value.
    ///
    /// Fails with [`Error::Substitution`] when `token` is not a `{{name}}`
    /// placeholder with a non-empty name.
    pub fn insert(&mut self, token: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let token = token.into();
        validate_token(&token)?;
        let value = value.into();

        match self.entries.iter_mut().find(|(key, _)| *key == token) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((token, value)),
        }
        Ok(())
    }

    /// Insert `value` under the placeholder for `name`, e.g. `Bank_Name`.
    pub fn insert_field(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        self.insert(token_for(name), value)
    }

    /// Get the value of a token.
    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == token)
            .map(|(_, value)| value.as_str())
    }

    /// Iterate over `(token, value)` pairs in substitution order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build the placeholder token for a field name.
pub fn token_for(name: &str) -> String {
    format!("{OPEN}{name}{CLOSE}")
}

fn validate_token(token: &str) -> Result<()> {
    let name = token
        .strip_prefix(OPEN)
        .and_then(|rest| rest.strip_suffix(CLOSE))
        .ok_or_else(|| Error::Substitution(format!("malformed placeholder token: {token:?}")))?;

    if name.is_empty() || name.contains(OPEN) || name.contains(CLOSE) {
        return Err(Error::Substitution(format!("malformed placeholder token: {token:?}")));
    }
    Ok(())
}

impl<K, V> TryFrom<Vec<(K, V)>> for ReplacementMap
where
    K: Into<String>,
    V: Into<String>,
{
    type Error = Error;

    fn try_from(pairs: Vec<(K, V)>) -> Result<Self> {
        let mut map = Self::new();
        for (token, value) in pairs {
            map.insert(token, value)?;
        }
        Ok(map)
    }
}
