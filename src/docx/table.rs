/// Table, Row and Cell structures for Word documents.
use crate::docx::paragraph::Paragraph;
use crate::docx::xml::{Node, Tag, XmlCursor, XmlElement, parse_children, write_element};
use crate::error::LoadError;
use quick_xml::events::BytesStart;

/// Text block width of a Letter page with 1" margins, in twentieths of a point.
const BLOCK_WIDTH_DXA: u32 = 9360;

/// A table in a Word document.
///
/// Represents a `<w:tbl>` element. Rows are modelled; table properties and
/// the column grid are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    tag: Tag,
    content: Vec<Node<Row>>,
}

impl Table {
    /// Create an empty table with `cols` evenly sized grid columns and
    /// single borders on every edge.
    pub fn new(cols: usize) -> Self {
        let mut properties = String::with_capacity(512);
        properties.push_str("<w:tblPr><w:tblW w:w=\"5000\" w:type=\"pct\"/><w:tblBorders>");
        for edge in ["top", "left", "bottom", "right", "insideH", "insideV"] {
            properties.push_str(&format!(
                "<w:{edge} w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"000000\"/>"
            ));
        }
        properties.push_str("</w:tblBorders><w:tblLook w:val=\"04A0\"/></w:tblPr>");

        properties.push_str("<w:tblGrid>");
        let width = column_width(cols);
        for _ in 0..cols {
            properties.push_str(&format!("<w:gridCol w:w=\"{width}\"/>"));
        }
        properties.push_str("</w:tblGrid>");

        Self {
            tag: Tag::new("w:tbl"),
            content: vec![Node::Markup(properties.into_bytes())],
        }
    }

    /// Append a row of `cols` empty cells.
    pub fn add_row(&mut self, cols: usize) -> &mut Row {
        self.content.push(Node::Item(Row::new(cols)));
        match self.content.last_mut() {
            Some(Node::Item(row)) => row,
            _ => unreachable!(),
        }
    }

    /// Get the rows in order.
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.content.iter().filter_map(|node| match node {
            Node::Item(row) => Some(row),
            Node::Markup(_) => None,
        })
    }

    /// Get mutable rows in order.
    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut Row> {
        self.content.iter_mut().filter_map(|node| match node {
            Node::Item(row) => Some(row),
            Node::Markup(_) => None,
        })
    }

    /// Get a row by index.
    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows().nth(index)
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows().count()
    }

    /// Get the number of columns (cell count of the widest row).
    pub fn column_count(&self) -> usize {
        self.rows().map(Row::cell_count).max().unwrap_or(0)
    }

    /// Iterate over every paragraph of every cell in row-major order.
    pub fn paragraphs_mut(&mut self) -> impl Iterator<Item = &mut Paragraph> {
        self.rows_mut()
            .flat_map(Row::cells_mut)
            .flat_map(Cell::paragraphs_mut)
    }
}

fn column_width(cols: usize) -> u32 {
    match cols {
        0 => BLOCK_WIDTH_DXA,
        n => BLOCK_WIDTH_DXA / n as u32,
    }
}

impl XmlElement for Table {
    const LOCAL_NAME: &'static [u8] = b"tbl";

    fn parse(cursor: &mut XmlCursor<'_>, start: &BytesStart<'_>, empty: bool) -> Result<Self, LoadError> {
        let content = if empty { Vec::new() } else { parse_children(cursor)? };
        Ok(Self {
            tag: Tag::from_start(start, empty),
            content,
        })
    }

    fn write_xml(&self, out: &mut Vec<u8>) {
        write_element(out, &self.tag, &self.content);
    }
}

/// A table row (`<w:tr>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    tag: Tag,
    content: Vec<Node<Cell>>,
}

impl Row {
    pub(crate) fn new(cols: usize) -> Self {
        let width = column_width(cols);
        Self {
            tag: Tag::new("w:tr"),
            content: (0..cols).map(|_| Node::Item(Cell::new(width))).collect(),
        }
    }

    /// Get the cells in order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.content.iter().filter_map(|node| match node {
            Node::Item(cell) => Some(cell),
            Node::Markup(_) => None,
        })
    }

    /// Get mutable cells in order.
    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.content.iter_mut().filter_map(|node| match node {
            Node::Item(cell) => Some(cell),
            Node::Markup(_) => None,
        })
    }

    /// Get the number of cells.
    pub fn cell_count(&self) -> usize {
        self.cells().count()
    }
}

impl XmlElement for Row {
    const LOCAL_NAME: &'static [u8] = b"tr";

    fn parse(cursor: &mut XmlCursor<'_>, start: &BytesStart<'_>, empty: bool) -> Result<Self, LoadError> {
        let content = if empty { Vec::new() } else { parse_children(cursor)? };
        Ok(Self {
            tag: Tag::from_start(start, empty),
            content,
        })
    }

    fn write_xml(&self, out: &mut Vec<u8>) {
        write_element(out, &self.tag, &self.content);
    }
}

/// A table cell (`<w:tc>`).
///
/// Cell properties and nested tables are kept verbatim; only the cell's
/// own paragraphs are modelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    tag: Tag,
    content: Vec<Node<Paragraph>>,
}

impl Cell {
    pub(crate) fn new(width_dxa: u32) -> Self {
        let properties = format!("<w:tcPr><w:tcW w:w=\"{width_dxa}\" w:type=\"dxa\"/></w:tcPr>");
        Self {
            tag: Tag::new("w:tc"),
            content: vec![
                Node::Markup(properties.into_bytes()),
                Node::Item(Paragraph::new()),
            ],
        }
    }

    /// Get the paragraphs in order.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.content.iter().filter_map(|node| match node {
            Node::Item(para) => Some(para),
            Node::Markup(_) => None,
        })
    }

    /// Get mutable paragraphs in order.
    pub fn paragraphs_mut(&mut self) -> impl Iterator<Item = &mut Paragraph> {
        self.content.iter_mut().filter_map(|node| match node {
            Node::Item(para) => Some(para),
            Node::Markup(_) => None,
        })
    }

    /// Get the first paragraph, if any.
    pub fn first_paragraph_mut(&mut self) -> Option<&mut Paragraph> {
        self.paragraphs_mut().next()
    }

    /// Cell text: paragraph texts joined with newlines.
    pub fn text(&self) -> String {
        self.paragraphs().map(Paragraph::text).collect::<Vec<_>>().join("\n")
    }

    /// Replace the cell content with a single paragraph holding one run
    /// with `text`. Cell properties are kept.
    ///
    /// The run is created even for empty text.
    pub fn set_text(&mut self, text: &str) {
        self.content.retain(|node| match node {
            Node::Markup(raw) => is_cell_properties(raw),
            Node::Item(_) => false,
        });
        let mut para = Paragraph::new();
        para.add_run(text);
        self.content.push(Node::Item(para));
    }
}

fn is_cell_properties(raw: &[u8]) -> bool {
    let raw = raw.trim_ascii_start();
    raw.starts_with(b"<w:tcPr") || raw.starts_with(b"<tcPr")
}

impl XmlElement for Cell {
    const LOCAL_NAME: &'static [u8] = b"tc";

    fn parse(cursor: &mut XmlCursor<'_>, start: &BytesStart<'_>, empty: bool) -> Result<Self, LoadError> {
        let content = if empty { Vec::new() } else { parse_children(cursor)? };
        Ok(Self {
            tag: Tag::from_start(start, empty),
            content,
        })
    }

    fn write_xml(&self, out: &mut Vec<u8>) {
        write_element(out, &self.tag, &self.content);
    }
}
