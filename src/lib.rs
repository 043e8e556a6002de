//! complaint-docx - fill a fraud-complaint Word template
//!
//! This library substitutes `{{placeholder}}` tokens in a `.docx` template
//! with case values and gives each substituted paragraph the fixed style of
//! its placeholder.
//!
//! # Features
//!
//! - **Split-run matching**: placeholders are found in the paragraph's full
//!   text, however Word split it into runs
//! - **Lossless round trip**: paragraphs, tables and package parts that are
//!   not substituted are written back byte for byte
//! - **Per-placeholder styles**: font, size, bold and underline from a static
//!   table
//! - **Summary table**: optional transaction summary appended to the letter
//! - **Atomic save**: the output is replaced in one rename
//!
//! # Example - Filling a template
//!
//! ```no_run
//! use complaint_docx::{ReplacementMap, fill_template};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut map = ReplacementMap::new();
//! map.insert("{{Bank_Name}}", "ABC Bank")?;
//! map.insert("{{Txn_ID}}", "T-100")?;
//!
//! let path = fill_template("with_placeholder.docx", &map, "modified_document.docx")?;
//! println!("Saved {}", path.display());
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Filling from a case form
//!
//! ```no_run
//! use complaint_docx::{CaseForm, FillOptions, fill};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let form = CaseForm::from_yaml_file("case.yaml")?;
//! let options = FillOptions::new().with_summary_table(true);
//!
//! let path = fill(&form.to_replacements()?, &options)?;
//! println!("Saved {}", path.display());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod docx;
pub mod error;
pub mod fill;
pub mod form;
pub mod package;
pub mod replacements;
pub mod style;
pub mod substitute;
pub mod summary;

pub use config::FillOptions;
pub use error::{Error, LoadError, Result, WriteError};
pub use fill::{fill, fill_bytes, fill_document, fill_template};
pub use form::CaseForm;
pub use replacements::ReplacementMap;
