/// Paragraph and Run structures for Word documents.
use crate::docx::xml::{Node, Tag, XmlCursor, XmlElement, attribute, is_wml, parse_children, push_event, write_children};
use crate::error::LoadError;
use quick_xml::events::{BytesStart, Event};
use smallvec::SmallVec;

/// Character formatting of a run.
///
/// Only the properties template filling reads or writes are modelled;
/// `None` means the property is not set on the run and is inherited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunFormat {
    /// Font for the ASCII and high-ANSI slots
    pub font: Option<String>,
    /// Font for the East Asian slot
    pub east_asia_font: Option<String>,
    /// Font size in half-points (e.g., 24 = 12pt)
    pub size_half_points: Option<u32>,
    pub bold: Option<bool>,
    pub underline: Option<bool>,
}

impl RunFormat {
    fn has_properties(&self) -> bool {
        self.font.is_some()
            || self.east_asia_font.is_some()
            || self.size_half_points.is_some()
            || self.bold.is_some()
            || self.underline.is_some()
    }

    /// Font size in points, if set.
    pub fn size_points(&self) -> Option<f32> {
        self.size_half_points.map(|hp| hp as f32 / 2.0)
    }

    fn write_xml(&self, out: &mut Vec<u8>) {
        if !self.has_properties() {
            return;
        }

        // Children follow the CT_RPr sequence: rFonts, b, sz, u.
        out.extend_from_slice(b"<w:rPr>");

        if self.font.is_some() || self.east_asia_font.is_some() {
            out.extend_from_slice(b"<w:rFonts");
            if let Some(ref font) = self.font {
                let font = quick_xml::escape::escape(font.as_str());
                out.extend_from_slice(format!(" w:ascii=\"{font}\" w:hAnsi=\"{font}\"").as_bytes());
            }
            if let Some(ref font) = self.east_asia_font {
                let font = quick_xml::escape::escape(font.as_str());
                out.extend_from_slice(format!(" w:eastAsia=\"{font}\"").as_bytes());
            }
            out.extend_from_slice(b"/>");
        }

        match self.bold {
            Some(true) => out.extend_from_slice(b"<w:b/>"),
            Some(false) => out.extend_from_slice(b"<w:b w:val=\"0\"/>"),
            None => {},
        }

        if let Some(size) = self.size_half_points {
            out.extend_from_slice(format!("<w:sz w:val=\"{size}\"/>").as_bytes());
        }

        match self.underline {
            Some(true) => out.extend_from_slice(b"<w:u w:val=\"single\"/>"),
            Some(false) => out.extend_from_slice(b"<w:u w:val=\"none\"/>"),
            None => {},
        }

        out.extend_from_slice(b"</w:rPr>");
    }

    /// Read the modelled properties from one child of `<w:rPr>`.
    fn read_property(&mut self, e: &BytesStart<'_>) -> Result<(), LoadError> {
        match e.local_name().as_ref() {
            b"rFonts" => {
                if let Some(font) = attribute(e, b"ascii")? {
                    self.font = Some(font);
                } else if let Some(font) = attribute(e, b"hAnsi")? {
                    self.font = Some(font);
                }
                if let Some(font) = attribute(e, b"eastAsia")? {
                    self.east_asia_font = Some(font);
                }
            },
            b"b" => self.bold = Some(on_off(attribute(e, b"val")?.as_deref())),
            b"sz" => {
                self.size_half_points = attribute(e, b"val")?.and_then(|v| v.trim().parse().ok());
            },
            b"u" => {
                self.underline = Some(!matches!(attribute(e, b"val")?.as_deref(), Some("none")));
            },
            _ => {},
        }
        Ok(())
    }
}

/// Interpret an `ST_OnOff` value; a missing value means on.
fn on_off(val: Option<&str>) -> bool {
    !matches!(val, Some("0") | Some("false") | Some("off"))
}

/// A text run in a paragraph.
///
/// Represents a `<w:r>` element. A run read from a template keeps its
/// original markup until its text or formatting is changed, at which point
/// it is regenerated from the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    text: String,
    format: RunFormat,
    /// Original markup, dropped on the first edit
    xml: Option<Vec<u8>>,
}

impl Run {
    /// Create a new unformatted run with text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: RunFormat::default(),
            xml: None,
        }
    }

    /// Build a run from the markup of a `<w:r>` element.
    pub(crate) fn from_xml(xml: Vec<u8>) -> Result<Self, LoadError> {
        let mut text = String::new();
        let mut format = RunFormat::default();
        let mut raw_text = Vec::new();

        let mut cursor = XmlCursor::new(&xml);
        // depth 1 is the run itself
        let mut depth = 0usize;
        let mut in_props = false;
        let mut in_text = false;

        loop {
            let event = cursor.next()?;
            match event {
                Event::Start(ref e) => {
                    depth += 1;
                    if depth == 2 {
                        in_props = is_wml(e.name(), b"rPr");
                        in_text = is_wml(e.name(), b"t");
                        raw_text.clear();
                    } else if depth == 3 && in_props {
                        format.read_property(e)?;
                    }
                },
                Event::Empty(ref e) => {
                    if depth == 1 {
                        push_special_char(&mut text, e)?;
                    } else if depth == 2 && in_props {
                        format.read_property(e)?;
                    }
                },
                Event::End(_) => {
                    if depth == 2 && in_text {
                        let raw = std::str::from_utf8(&raw_text)?;
                        text.push_str(&quick_xml::escape::unescape(raw)?);
                        in_text = false;
                    }
                    if depth == 2 {
                        in_props = false;
                    }
                    depth = depth.saturating_sub(1);
                },
                Event::Text(_) | Event::GeneralRef(_) | Event::CData(_) if in_text && depth == 2 => {
                    if let Event::CData(ref c) = event {
                        raw_text.extend_from_slice(quick_xml::escape::escape(std::str::from_utf8(c)?).as_bytes());
                    } else {
                        push_event(&mut raw_text, &event);
                    }
                },
                Event::Eof => break,
                _ => {},
            }
        }

        Ok(Self {
            text,
            format,
            xml: Some(xml),
        })
    }

    /// Get the text content of this run.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Get the character formatting.
    #[inline]
    pub fn format(&self) -> &RunFormat {
        &self.format
    }

    /// Get mutable character formatting. The run is regenerated on write.
    pub fn format_mut(&mut self) -> &mut RunFormat {
        self.xml = None;
        &mut self.format
    }

    fn write_generated(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(b"<w:r>");
        self.format.write_xml(out);

        let mut segment = String::new();
        for ch in self.text.chars() {
            match ch {
                '\t' | '\n' => {
                    write_text(out, &segment);
                    segment.clear();
                    out.extend_from_slice(if ch == '\t' { b"<w:tab/>" } else { b"<w:br/>" });
                },
                _ => segment.push(ch),
            }
        }
        write_text(out, &segment);

        out.extend_from_slice(b"</w:r>");
    }
}

fn write_text(out: &mut Vec<u8>, text: &str) {
    if text.is_empty() {
        return;
    }
    out.extend_from_slice(b"<w:t xml:space=\"preserve\">");
    out.extend_from_slice(quick_xml::escape::escape(text).as_bytes());
    out.extend_from_slice(b"</w:t>");
}

/// Map run-level special characters to their text equivalent.
fn push_special_char(text: &mut String, e: &BytesStart<'_>) -> Result<(), LoadError> {
    match e.local_name().as_ref() {
        b"tab" | b"ptab" => text.push('\t'),
        b"cr" => text.push('\n'),
        b"br" => {
            // Page and column breaks carry no text
            if matches!(attribute(e, b"type")?.as_deref(), None | Some("textWrapping")) {
                text.push('\n');
            }
        },
        b"noBreakHyphen" => text.push('-'),
        _ => {},
    }
    Ok(())
}

impl XmlElement for Run {
    const LOCAL_NAME: &'static [u8] = b"r";

    fn parse(cursor: &mut XmlCursor<'_>, start: &BytesStart<'_>, empty: bool) -> Result<Self, LoadError> {
        let mut xml = Vec::new();
        if empty {
            push_event(&mut xml, &Event::Empty(start.borrow()));
        } else {
            push_event(&mut xml, &Event::Start(start.borrow()));
            cursor.copy_element(&mut xml)?;
        }
        Run::from_xml(xml)
    }

    fn write_xml(&self, out: &mut Vec<u8>) {
        match self.xml {
            Some(ref xml) => out.extend_from_slice(xml),
            None => self.write_generated(out),
        }
    }
}

/// A paragraph in a Word document.
///
/// Represents a `<w:p>` element. Direct `<w:r>` children are modelled as
/// [`Run`]s; paragraph properties, bookmarks, hyperlinks and any other
/// content are kept verbatim in document order.
///
/// # Example
///
/// ```rust
/// use complaint_docx::docx::{Paragraph, Run};
///
/// let mut para = Paragraph::new();
/// para.add_run("Dear ");
/// para.add_run("{{Bank_Name}} team");
/// assert_eq!(para.text(), "Dear {{Bank_Name}} team");
/// assert_eq!(para.run_count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    tag: Tag,
    content: SmallVec<[Node<Run>; 8]>,
}

impl Default for Paragraph {
    fn default() -> Self {
        Self::new()
    }
}

impl Paragraph {
    /// Create an empty paragraph.
    pub fn new() -> Self {
        Self {
            tag: Tag::new("w:p"),
            content: SmallVec::new(),
        }
    }

    /// Get the runs of this paragraph in order.
    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.content.iter().filter_map(|node| match node {
            Node::Item(run) => Some(run),
            Node::Markup(_) => None,
        })
    }

    /// Get mutable runs in order.
    pub fn runs_mut(&mut self) -> impl Iterator<Item = &mut Run> {
        self.content.iter_mut().filter_map(|node| match node {
            Node::Item(run) => Some(run),
            Node::Markup(_) => None,
        })
    }

    /// Get the number of runs.
    pub fn run_count(&self) -> usize {
        self.runs().count()
    }

    /// Get the first run, if any.
    pub fn first_run_mut(&mut self) -> Option<&mut Run> {
        self.runs_mut().next()
    }

    /// Concatenated text of all runs.
    pub fn text(&self) -> String {
        self.runs().map(Run::text).collect()
    }

    /// Append a new unformatted run with text.
    pub fn add_run(&mut self, text: impl Into<String>) -> &mut Run {
        self.content.push(Node::Item(Run::new(text)));
        match self.content.last_mut() {
            Some(Node::Item(run)) => run,
            _ => unreachable!(),
        }
    }

    /// Discard every run and put `run` where the first one was.
    ///
    /// Non-run content keeps its position. With no existing runs, `run` is
    /// appended.
    pub fn replace_runs(&mut self, run: Run) -> &mut Run {
        let position = self
            .content
            .iter()
            .position(|node| matches!(node, Node::Item(_)))
            .unwrap_or(self.content.len());
        // Everything before the first run is markup, so `position` survives the retain.
        self.content.retain(|node| matches!(node, Node::Markup(_)));
        self.content.insert(position, Node::Item(run));
        match &mut self.content[position] {
            Node::Item(run) => run,
            Node::Markup(_) => unreachable!(),
        }
    }

    /// Serialize this paragraph.
    pub fn to_xml(&self) -> String {
        let mut out = Vec::new();
        self.write_xml(&mut out);
        String::from_utf8_lossy(&out).into_owned()
    }
}

impl XmlElement for Paragraph {
    const LOCAL_NAME: &'static [u8] = b"p";

    fn parse(cursor: &mut XmlCursor<'_>, start: &BytesStart<'_>, empty: bool) -> Result<Self, LoadError> {
        let content = if empty {
            SmallVec::new()
        } else {
            parse_children::<Run>(cursor)?.into_iter().collect()
        };
        Ok(Self {
            tag: Tag::from_start(start, empty),
            content,
        })
    }

    fn write_xml(&self, out: &mut Vec<u8>) {
        let has_children = !self.content.is_empty();
        self.tag.write_open(out, has_children);
        write_children(out, &self.content);
        self.tag.write_close(out, has_children);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Parse a single `<w:p>` fragment.
    pub(crate) fn parse_paragraph(xml: &str) -> Paragraph {
        let mut cursor = XmlCursor::new(xml.as_bytes());
        loop {
            match cursor.next().unwrap() {
                Event::Start(ref e) if is_wml(e.name(), b"p") => {
                    return Paragraph::parse(&mut cursor, e, false).unwrap();
                },
                Event::Empty(ref e) if is_wml(e.name(), b"p") => {
                    return Paragraph::parse(&mut cursor, e, true).unwrap();
                },
                Event::Eof => panic!("no paragraph in fragment"),
                _ => {},
            }
        }
    }

    #[test]
    fn test_runs_and_text() {
        let xml = r#"<w:p><w:pPr><w:jc w:val="both"/></w:pPr><w:r><w:rPr><w:b/></w:rPr><w:t>Dear </w:t></w:r><w:proofErr w:type="spellStart"/><w:r><w:t>{{Bank_</w:t></w:r><w:r><w:t>Name}} team</w:t></w:r></w:p>"#;
        let para = parse_paragraph(xml);

        assert_eq!(para.run_count(), 3);
        assert_eq!(para.text(), "Dear {{Bank_Name}} team");
        assert_eq!(para.runs().next().unwrap().format().bold, Some(true));
    }

    #[test]
    fn test_untouched_paragraph_writes_back_verbatim() {
        let xml = r#"<w:p w:rsidR="00A1"><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:bookmarkStart w:id="0" w:name="top"/><w:r w:rsidRPr="00B2"><w:rPr><w:rFonts w:ascii="Arial" w:hAnsi="Arial"/><w:sz w:val="28"/></w:rPr><w:t xml:space="preserve">Fish &amp; chips </w:t></w:r><w:bookmarkEnd w:id="0"/></w:p>"#;
        let para = parse_paragraph(xml);
        assert_eq!(para.to_xml(), xml);
    }

    #[test]
    fn test_run_format_is_read() {
        let xml = r#"<w:p><w:r><w:rPr><w:rFonts w:ascii="Tahoma" w:hAnsi="Tahoma" w:eastAsia="SimSun"/><w:b w:val="0"/><w:sz w:val="22"/><w:u w:val="single"/></w:rPr><w:t>x</w:t></w:r></w:p>"#;
        let para = parse_paragraph(xml);
        let format = para.runs().next().unwrap().format().clone();

        assert_eq!(format.font.as_deref(), Some("Tahoma"));
        assert_eq!(format.east_asia_font.as_deref(), Some("SimSun"));
        assert_eq!(format.bold, Some(false));
        assert_eq!(format.size_half_points, Some(22));
        assert_eq!(format.size_points(), Some(11.0));
        assert_eq!(format.underline, Some(true));
    }

    #[test]
    fn test_special_characters_in_run_text() {
        let xml = r#"<w:p><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c</w:t><w:br w:type="page"/></w:r></w:p>"#;
        let para = parse_paragraph(xml);
        assert_eq!(para.text(), "a\tb\nc");
    }

    #[test]
    fn test_self_closing_paragraph() {
        let para = parse_paragraph(r#"<w:p w:rsidR="1"/>"#);
        assert_eq!(para.run_count(), 0);
        assert_eq!(para.text(), "");
        assert_eq!(para.to_xml(), r#"<w:p w:rsidR="1"/>"#);
    }

    #[test]
    fn test_replace_runs_keeps_other_content() {
        let xml = r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:t>one</w:t></w:r><w:bookmarkStart w:id="1" w:name="b"/><w:r><w:t>two</w:t></w:r></w:p>"#;
        let mut para = parse_paragraph(xml);
        para.replace_runs(Run::new("three"));

        assert_eq!(para.run_count(), 1);
        assert_eq!(para.text(), "three");
        assert_eq!(
            para.to_xml(),
            r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:t xml:space="preserve">three</w:t></w:r><w:bookmarkStart w:id="1" w:name="b"/></w:p>"#
        );
    }

    #[test]
    fn test_generated_run_markup() {
        let mut run = Run::new("a < b\tc");
        let format = run.format_mut();
        format.font = Some("Tahoma".to_string());
        format.east_asia_font = Some("Tahoma".to_string());
        format.size_half_points = Some(24);
        format.bold = Some(true);
        format.underline = Some(false);

        let mut out = Vec::new();
        run.write_xml(&mut out);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            r#"<w:r><w:rPr><w:rFonts w:ascii="Tahoma" w:hAnsi="Tahoma" w:eastAsia="Tahoma"/><w:b/><w:sz w:val="24"/><w:u w:val="none"/></w:rPr><w:t xml:space="preserve">a &lt; b</w:t><w:tab/><w:t xml:space="preserve">c</w:t></w:r>"#
        );
    }

    #[test]
    fn test_edit_drops_original_markup() {
        let mut para = parse_paragraph(r#"<w:p><w:r w:rsidR="9"><w:t>old</w:t></w:r></w:p>"#);
        let run = para.first_run_mut().unwrap();
        assert!(run.xml.is_some());
        run.format_mut().bold = Some(true);
        assert!(run.xml.is_none());
        assert_eq!(
            para.to_xml(),
            r#"<w:p><w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">old</w:t></w:r></w:p>"#
        );
    }
}
