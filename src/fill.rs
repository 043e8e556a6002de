//! Filling a template end to end: load, substitute, save.

use crate::config::FillOptions;
use crate::docx::Document;
use crate::error::Result;
use crate::package::Package;
use crate::replacements::ReplacementMap;
use crate::substitute::{rewrite_paragraph, rewrite_table};
use crate::summary::build_summary_table;
use std::path::{Path, PathBuf};
use tracing::info;

/// Substitute `map` in a parsed document.
///
/// Top-level paragraphs are rewritten first, then every paragraph of every
/// top-level table. With `summary_table` set, the summary table is appended
/// afterwards so its cells are never substituted.
///
/// Returns the number of paragraphs rewritten.
pub fn fill_document(doc: &mut Document, map: &ReplacementMap, summary_table: bool) -> Result<usize> {
    let mut rewritten = 0;
    for para in doc.paragraphs_mut() {
        if rewrite_paragraph(para, map) {
            rewritten += 1;
        }
    }
    for table in doc.tables_mut() {
        rewritten += rewrite_table(table, map);
    }

    if summary_table {
        build_summary_table(doc, map)?;
    }
    Ok(rewritten)
}

/// Fill a template held in memory and return the filled package bytes.
///
/// Only `summary_table` is read from `options`; nothing touches the
/// filesystem.
pub fn fill_bytes(template: Vec<u8>, map: &ReplacementMap, options: &FillOptions) -> Result<Vec<u8>> {
    let mut package = Package::from_bytes(template)?;
    fill_package(&mut package, map, options.summary_table)?;
    Ok(package.to_bytes()?)
}

/// Fill the template at `template` and save it to `output`.
///
/// Returns the path the filled document was written to.
///
/// # Examples
///
/// ```rust,no_run
/// use complaint_docx::fill::fill_template;
/// use complaint_docx::replacements::ReplacementMap;
///
/// let mut map = ReplacementMap::new();
/// map.insert("{{Bank_Name}}", "ABC Bank")?;
///
/// let path = fill_template("with_placeholder.docx", &map, "modified_document.docx")?;
/// println!("saved {}", path.display());
/// # Ok::<(), complaint_docx::Error>(())
/// ```
pub fn fill_template<P, Q>(template: P, map: &ReplacementMap, output: Q) -> Result<PathBuf>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let options = FillOptions::new()
        .with_template(template.as_ref())
        .with_output(output.as_ref());
    fill(map, &options)
}

/// Fill the configured template and save it to the configured output.
pub fn fill(map: &ReplacementMap, options: &FillOptions) -> Result<PathBuf> {
    let mut package = Package::open(&options.template)?;
    let rewritten = fill_package(&mut package, map, options.summary_table)?;
    let path = package.save(&options.output)?;

    info!(
        template = %options.template.display(),
        output = %path.display(),
        keys = map.len(),
        rewritten,
        "filled template"
    );
    Ok(path)
}

fn fill_package(package: &mut Package, map: &ReplacementMap, summary_table: bool) -> Result<usize> {
    let mut doc = Document::from_xml(package.main_part_xml())?;
    let rewritten = fill_document(&mut doc, map, summary_table)?;
    package.set_main_part_xml(doc.to_xml());
    Ok(rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::document::tests::document_xml;
    use crate::error::{Error, LoadError, WriteError};
    use crate::package::tests::{build_docx, member};

    const LETTER_BODY: &str = concat!(
        r#"<w:p><w:r><w:t xml:space="preserve">Dear </w:t></w:r><w:r><w:t>{{Bank_Name}}</w:t></w:r><w:r><w:t xml:space="preserve"> team</w:t></w:r></w:p>"#,
        r#"<w:p><w:r><w:t>Nothing to fill here</w:t></w:r></w:p>"#,
        r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>Txn ID</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>{{Txn_</w:t></w:r><w:r><w:t>ID}}</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
    );

    fn letter_map() -> ReplacementMap {
        ReplacementMap::try_from(vec![
            ("{{Bank_Name}}", "ABC Bank"),
            ("{{Txn_ID}}", "T-100"),
            ("{{Txn_date}}", "05-03-2024"),
        ])
        .unwrap()
    }

    fn filled_document(bytes: Vec<u8>) -> Document {
        let package = Package::from_bytes(bytes).unwrap();
        Document::from_xml(package.main_part_xml()).unwrap()
    }

    #[test]
    fn test_fill_bytes_rewrites_paragraphs_and_tables() {
        let template = build_docx(&document_xml(LETTER_BODY));
        let filled = fill_bytes(template, &letter_map(), &FillOptions::default()).unwrap();
        let doc = filled_document(filled);

        let texts: Vec<String> = doc.paragraphs().map(|p| p.text()).collect();
        assert_eq!(texts, ["Dear ABC Bank team", "Nothing to fill here"]);

        let table = doc.tables().next().unwrap();
        let cells: Vec<String> = table.row(0).unwrap().cells().map(|c| c.text()).collect();
        assert_eq!(cells, ["Txn ID", "T-100"]);
        assert_eq!(doc.table_count(), 1);
    }

    #[test]
    fn test_untouched_paragraphs_survive_byte_for_byte() {
        let template = build_docx(&document_xml(LETTER_BODY));
        let filled = fill_bytes(template, &letter_map(), &FillOptions::default()).unwrap();

        let package = Package::from_bytes(filled).unwrap();
        let xml = String::from_utf8(package.main_part_xml().to_vec()).unwrap();
        assert!(xml.contains(r#"<w:p><w:r><w:t>Nothing to fill here</w:t></w:r></w:p>"#));
        assert!(xml.contains(r#"<w:tc><w:p><w:r><w:t>Txn ID</w:t></w:r></w:p></w:tc>"#));
        assert_eq!(member(&package, "word/styles.xml"), Some(&b"<w:styles/>"[..]));
    }

    #[test]
    fn test_summary_table_is_optional() {
        let template = build_docx(&document_xml(LETTER_BODY));
        let options = FillOptions::new().with_summary_table(true);
        let doc = filled_document(fill_bytes(template, &letter_map(), &options).unwrap());

        assert_eq!(doc.table_count(), 2);
        let summary = doc.tables().nth(1).unwrap();
        let data: Vec<String> = summary.row(1).unwrap().cells().map(|c| c.text()).collect();
        assert_eq!(data, ["", "", "T-100", "", "05-03-2024"]);
    }

    #[test]
    fn test_fill_template_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("with_placeholder.docx");
        let output = dir.path().join("modified_document.docx");
        std::fs::write(&template, build_docx(&document_xml(LETTER_BODY))).unwrap();

        let written = fill_template(&template, &letter_map(), &output).unwrap();
        assert_eq!(written, output);

        let doc = filled_document(std::fs::read(&output).unwrap());
        assert_eq!(doc.paragraphs().next().unwrap().text(), "Dear ABC Bank team");

        // The template itself is never modified
        let original = filled_document(std::fs::read(&template).unwrap());
        assert_eq!(original.paragraphs().next().unwrap().text(), "Dear {{Bank_Name}} team");
    }

    #[test]
    fn test_missing_template() {
        let dir = tempfile::tempdir().unwrap();
        let err = fill_template(dir.path().join("absent.docx"), &letter_map(), dir.path().join("out.docx"))
            .unwrap_err();
        assert!(matches!(err, Error::Load(LoadError::TemplateNotFound(_))));
    }

    #[test]
    fn test_corrupt_template() {
        let err = fill_bytes(b"PK\x03\x04 truncated".to_vec(), &letter_map(), &FillOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Load(_)));
    }

    #[test]
    fn test_unwritable_output() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("with_placeholder.docx");
        std::fs::write(&template, build_docx(&document_xml(LETTER_BODY))).unwrap();

        let output = dir.path().join("no_such_dir").join("out.docx");
        let err = fill_template(&template, &letter_map(), &output).unwrap_err();
        assert!(matches!(err, Error::Write(WriteError::Io { .. })));
    }
}
