//! Placeholder substitution in paragraphs and table cells.
//!
//! Word splits text into runs wherever formatting, spell checking or editing
//! history changes, so a placeholder is rarely contained in a single run.
//! Substitution therefore works on the paragraph's full run text and, when
//! anything matched, collapses the paragraph's runs into one run holding the
//! substituted text.

use crate::docx::{Paragraph, Run, Table};
use crate::replacements::ReplacementMap;
use crate::style::{apply_style, rule_for};
use tracing::debug;

/// Substitute every key of `map` in `paragraph`.
///
/// Keys are applied in map order to the progressively substituted text, and
/// each key replaces all of its occurrences. When the result differs from
/// the original text, all runs are discarded and a single run holding the
/// result is put where the first run was, styled after the last key that
/// matched. Otherwise the paragraph is left untouched.
///
/// Returns whether the paragraph was rewritten.
///
/// # Examples
///
/// ```rust
/// use complaint_docx::docx::Paragraph;
/// use complaint_docx::replacements::ReplacementMap;
/// use complaint_docx::substitute::rewrite_paragraph;
///
/// let mut map = ReplacementMap::new();
/// map.insert("{{Bank_Name}}", "ABC Bank")?;
///
/// let mut para = Paragraph::new();
/// para.add_run("Dear {{Bank_");
/// para.add_run("Name}} team");
///
/// assert!(rewrite_paragraph(&mut para, &map));
/// assert_eq!(para.text(), "Dear ABC Bank team");
/// assert_eq!(para.run_count(), 1);
/// # Ok::<(), complaint_docx::Error>(())
/// ```
pub fn rewrite_paragraph(paragraph: &mut Paragraph, map: &ReplacementMap) -> bool {
    if paragraph.run_count() == 0 {
        return false;
    }

    let original = paragraph.text();
    let mut text = original.clone();
    let mut last_match = None;

    for (key, value) in map.iter() {
        if text.contains(key) {
            text = text.replace(key, value);
            last_match = Some(key);
        }
    }

    if text == original {
        return false;
    }

    debug!(
        runs = paragraph.run_count(),
        last_match = last_match.unwrap_or_default(),
        "rewriting paragraph"
    );

    let run = paragraph.replace_runs(Run::new(text));
    if let Some(rule) = last_match.and_then(rule_for) {
        apply_style(run, rule);
    }
    true
}

/// Apply [`rewrite_paragraph`] to every paragraph of every cell, row by row.
///
/// Returns the number of paragraphs rewritten.
pub fn rewrite_table(table: &mut Table, map: &ReplacementMap) -> usize {
    table
        .paragraphs_mut()
        .map(|para| rewrite_paragraph(para, map))
        .filter(|&rewritten| rewritten)
        .count()
}
