/// Document - the main API for working with Word document content.
use crate::docx::paragraph::Paragraph;
use crate::docx::table::Table;
use crate::docx::xml::{Tag, XmlCursor, XmlElement, is_wml, push_event, unexpected_eof};
use crate::error::LoadError;
use quick_xml::events::Event;

/// A top-level element of the document body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyElement {
    Paragraph(Paragraph),
    Table(Table),
    /// The body's final `<w:sectPr>`, kept verbatim
    SectionProperties(Vec<u8>),
    /// Any other body content (content controls, whitespace, ...), kept verbatim
    Markup(Vec<u8>),
}

/// The main document part of a Word package.
///
/// Holds the body as an ordered sequence of [`BodyElement`]s. Everything
/// outside the body (namespace declarations, background, ...) is kept as raw
/// markup and written back unchanged.
///
/// # Examples
///
/// ```rust
/// use complaint_docx::docx::Document;
///
/// let xml = br#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>Dear {{Bank_Name}} team</w:t></w:r></w:p></w:body></w:document>"#;
/// let doc = Document::from_xml(xml)?;
///
/// assert_eq!(doc.paragraph_count(), 1);
/// assert_eq!(doc.paragraphs().next().unwrap().text(), "Dear {{Bank_Name}} team");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Markup before the body content, up to and excluding `<w:body>`
    prolog: Vec<u8>,
    body_tag: Tag,
    body: Vec<BodyElement>,
    /// Markup after `</w:body>`
    epilog: Vec<u8>,
}

impl Document {
    /// Parse the XML of a main document part.
    pub fn from_xml(xml: &[u8]) -> Result<Self, LoadError> {
        let mut cursor = XmlCursor::new(xml);
        let mut prolog = Vec::with_capacity(2048);

        let (body_tag, body) = loop {
            let event = cursor.next()?;
            match event {
                Event::Start(ref e) if is_wml(e.name(), b"body") => {
                    break (Tag::from_start(e, false), parse_body(&mut cursor)?);
                },
                Event::Empty(ref e) if is_wml(e.name(), b"body") => {
                    break (Tag::from_start(e, true), Vec::new());
                },
                Event::Eof => return Err(LoadError::PartNotFound("w:body in main document part".to_string())),
                _ => push_event(&mut prolog, &event),
            }
        };

        let mut epilog = Vec::new();
        loop {
            let event = cursor.next()?;
            if matches!(event, Event::Eof) {
                break;
            }
            push_event(&mut epilog, &event);
        }

        Ok(Self {
            prolog,
            body_tag,
            body,
            epilog,
        })
    }

    /// Serialize the document back to XML.
    pub fn to_xml(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.prolog.len() + self.epilog.len() + 4096);
        out.extend_from_slice(&self.prolog);

        let has_children = !self.body.is_empty();
        self.body_tag.write_open(&mut out, has_children);
        for element in &self.body {
            match element {
                BodyElement::Paragraph(p) => p.write_xml(&mut out),
                BodyElement::Table(t) => t.write_xml(&mut out),
                BodyElement::SectionProperties(raw) | BodyElement::Markup(raw) => out.extend_from_slice(raw),
            }
        }
        self.body_tag.write_close(&mut out, has_children);

        out.extend_from_slice(&self.epilog);
        out
    }

    /// Get the body elements in document order.
    #[inline]
    pub fn body(&self) -> &[BodyElement] {
        &self.body
    }

    /// Get all top-level paragraphs in order.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.body.iter().filter_map(|element| match element {
            BodyElement::Paragraph(p) => Some(p),
            _ => None,
        })
    }

    /// Get all top-level paragraphs in order, mutably.
    pub fn paragraphs_mut(&mut self) -> impl Iterator<Item = &mut Paragraph> {
        self.body.iter_mut().filter_map(|element| match element {
            BodyElement::Paragraph(p) => Some(p),
            _ => None,
        })
    }

    /// Get all top-level tables in order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.body.iter().filter_map(|element| match element {
            BodyElement::Table(t) => Some(t),
            _ => None,
        })
    }

    /// Get all top-level tables in order, mutably.
    pub fn tables_mut(&mut self) -> impl Iterator<Item = &mut Table> {
        self.body.iter_mut().filter_map(|element| match element {
            BodyElement::Table(t) => Some(t),
            _ => None,
        })
    }

    /// Get the number of top-level paragraphs.
    pub fn paragraph_count(&self) -> usize {
        self.paragraphs().count()
    }

    /// Get the number of top-level tables.
    pub fn table_count(&self) -> usize {
        self.tables().count()
    }

    /// Append a table at the end of the body content, before the final
    /// section properties.
    pub fn add_table(&mut self, table: Table) -> &mut Table {
        let index = self
            .body
            .iter()
            .rposition(|e| matches!(e, BodyElement::SectionProperties(_)))
            .unwrap_or(self.body.len());
        self.body.insert(index, BodyElement::Table(table));
        match &mut self.body[index] {
            BodyElement::Table(t) => t,
            _ => unreachable!(),
        }
    }
}

/// Parse body children up to and including `</w:body>`.
fn parse_body(cursor: &mut XmlCursor<'_>) -> Result<Vec<BodyElement>, LoadError> {
    let mut body = Vec::new();
    loop {
        let event = cursor.next()?;
        match event {
            Event::Start(ref e) if is_wml(e.name(), Paragraph::LOCAL_NAME) => {
                body.push(BodyElement::Paragraph(Paragraph::parse(cursor, e, false)?));
            },
            Event::Empty(ref e) if is_wml(e.name(), Paragraph::LOCAL_NAME) => {
                body.push(BodyElement::Paragraph(Paragraph::parse(cursor, e, true)?));
            },
            Event::Start(ref e) if is_wml(e.name(), Table::LOCAL_NAME) => {
                body.push(BodyElement::Table(Table::parse(cursor, e, false)?));
            },
            Event::Start(ref e) => {
                let is_sect_pr = is_wml(e.name(), b"sectPr");
                let mut raw = Vec::new();
                push_event(&mut raw, &event);
                cursor.copy_element(&mut raw)?;
                body.push(if is_sect_pr {
                    BodyElement::SectionProperties(raw)
                } else {
                    BodyElement::Markup(raw)
                });
            },
            Event::Empty(ref e) if is_wml(e.name(), b"sectPr") => {
                let mut raw = Vec::new();
                push_event(&mut raw, &event);
                body.push(BodyElement::SectionProperties(raw));
            },
            Event::End(_) => return Ok(body),
            Event::Eof => return Err(unexpected_eof()),
            _ => {
                let mut raw = Vec::new();
                push_event(&mut raw, &event);
                body.push(BodyElement::Markup(raw));
            },
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const DOCUMENT_HEAD: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#;

    pub(crate) const SECT_PR: &str = r#"<w:sectPr><w:pgSz w:w="12240" w:h="15840"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440"/></w:sectPr>"#;

    /// Wrap body content into a complete main document part.
    pub(crate) fn document_xml(body: &str) -> String {
        format!("{DOCUMENT_HEAD}<w:body>{body}{SECT_PR}</w:body></w:document>")
    }

    #[test]
    fn test_parse_body_elements() {
        let xml = document_xml(
            r#"<w:p><w:r><w:t>Subject: {{section}}</w:t></w:r></w:p><w:tbl><w:tr><w:tc><w:p/></w:tc></w:tr></w:tbl><w:p/>"#,
        );
        let doc = Document::from_xml(xml.as_bytes()).unwrap();

        assert_eq!(doc.paragraph_count(), 2);
        assert_eq!(doc.table_count(), 1);
        assert!(matches!(doc.body().last(), Some(BodyElement::SectionProperties(_))));

        let texts: Vec<String> = doc.paragraphs().map(Paragraph::text).collect();
        assert_eq!(texts, ["Subject: {{section}}", ""]);
    }

    #[test]
    fn test_untouched_document_writes_back_verbatim() {
        let xml = document_xml(
            r#"<w:p w:rsidR="0012"><w:pPr><w:jc w:val="right"/></w:pPr><w:r><w:t xml:space="preserve">Date: {{Date_top}} </w:t></w:r></w:p><w:sdt><w:sdtContent><w:p/></w:sdtContent></w:sdt><w:tbl><w:tblPr><w:tblW w:w="0" w:type="auto"/></w:tblPr><w:tr><w:tc><w:p><w:r><w:t>x</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
        );
        let doc = Document::from_xml(xml.as_bytes()).unwrap();
        assert_eq!(String::from_utf8(doc.to_xml()).unwrap(), xml);
    }

    #[test]
    fn test_add_table_goes_before_section_properties() {
        let xml = document_xml(r#"<w:p/>"#);
        let mut doc = Document::from_xml(xml.as_bytes()).unwrap();
        doc.add_table(Table::new(2));

        let body = doc.body();
        assert!(matches!(body[body.len() - 2], BodyElement::Table(_)));
        assert!(matches!(body[body.len() - 1], BodyElement::SectionProperties(_)));
    }

    #[test]
    fn test_empty_body_grows_children() {
        let xml = format!("{DOCUMENT_HEAD}<w:body/></w:document>");
        let mut doc = Document::from_xml(xml.as_bytes()).unwrap();
        assert_eq!(String::from_utf8(doc.to_xml()).unwrap(), xml);

        doc.add_table(Table::new(1));
        let out = String::from_utf8(doc.to_xml()).unwrap();
        assert!(out.contains("<w:body><w:tbl>"));
        assert!(out.ends_with("</w:tbl></w:body></w:document>"));
    }

    #[test]
    fn test_missing_body() {
        let err = Document::from_xml(b"<w:document></w:document>").unwrap_err();
        assert!(matches!(err, LoadError::PartNotFound(_)));
    }

    #[test]
    fn test_truncated_document() {
        let err = Document::from_xml(b"<w:document><w:body><w:p><w:r>").unwrap_err();
        assert!(matches!(err, LoadError::Xml(_)));
    }
}
