/// In-memory model of the main document part of a Word (.docx) file.
///
/// The model covers what template filling touches and nothing more:
/// - `Document`: the body as an ordered list of paragraphs, tables and
///   verbatim markup
/// - `Paragraph`: direct runs plus verbatim inline markup
/// - `Run`: a span of text with its character formatting
/// - `Table`, `Row`, `Cell`: top-level tables and their cell paragraphs
///
/// Anything not modelled is written back exactly as it was read.
///
/// # Example
///
/// ```rust,no_run
/// use complaint_docx::docx::Document;
/// use complaint_docx::package::Package;
///
/// let package = Package::open("with_placeholder.docx")?;
/// let doc = Document::from_xml(package.main_part_xml())?;
///
/// for para in doc.paragraphs() {
///     println!("Paragraph: {}", para.text());
/// }
///
/// for table in doc.tables() {
///     for row in table.rows() {
///         for cell in row.cells() {
///             println!("Cell: {}", cell.text());
///         }
///     }
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub mod document;
pub mod paragraph;
pub mod table;
pub(crate) mod xml;

pub use document::{BodyElement, Document};
pub use paragraph::{Paragraph, Run, RunFormat};
pub use table::{Cell, Row, Table};
