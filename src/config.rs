//! Fill options and their YAML representation.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Template read when none is configured.
pub const DEFAULT_TEMPLATE: &str = "with_placeholder.docx";

/// Output written when none is configured. Overwritten on every fill.
pub const DEFAULT_OUTPUT: &str = "modified_document.docx";

/// Options controlling a template fill.
///
/// Options can be built in code or read from a YAML file; fields missing
/// from the file keep their defaults.
///
/// # Examples
///
/// ```rust
/// use complaint_docx::config::FillOptions;
///
/// // Create with defaults
/// let options = FillOptions::default();
/// assert_eq!(options.output.to_str(), Some("modified_document.docx"));
///
/// // Or customize
/// let options = FillOptions::new()
///     .with_template("templates/complaint.docx")
///     .with_summary_table(true);
/// assert!(options.summary_table);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FillOptions {
    /// Path of the template `.docx`
    pub template: PathBuf,
    /// Path the filled document is saved to
    pub output: PathBuf,
    /// Whether to append the transaction summary table
    pub summary_table: bool,
}

impl Default for FillOptions {
    fn default() -> Self {
        Self {
            template: PathBuf::from(DEFAULT_TEMPLATE),
            output: PathBuf::from(DEFAULT_OUTPUT),
            summary_table: false,
        }
    }
}

impl FillOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_template(mut self, template: impl Into<PathBuf>) -> Self {
        self.template = template.into();
        self
    }

    #[inline]
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// Set whether the summary table is appended after substitution.
    #[inline]
    pub fn with_summary_table(mut self, enabled: bool) -> Self {
        self.summary_table = enabled;
        self
    }

    /// Parse options from YAML text.
    ///
    /// ```rust
    /// use complaint_docx::config::FillOptions;
    ///
    /// let options = FillOptions::from_yaml_str("output: out/complaint.docx\nsummary_table: true\n")?;
    /// assert_eq!(options.template.to_str(), Some("with_placeholder.docx"));
    /// assert!(options.summary_table);
    /// # Ok::<(), complaint_docx::Error>(())
    /// ```
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_saphyr::from_str(yaml).map_err(|e| Error::Config(format!("invalid fill options: {e}")))
    }

    /// Read options from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_yaml_str(&yaml)
    }
}
