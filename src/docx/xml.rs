//! Lossless event plumbing for WordprocessingML.
//!
//! Parsed elements keep every piece of markup they do not model as raw bytes
//! rebuilt from the reader events, so an element that is never edited
//! serializes back to the markup it was read from.

use crate::error::LoadError;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;

/// Streaming reader over a borrowed XML buffer.
pub(crate) struct XmlCursor<'a> {
    reader: Reader<&'a [u8]>,
}

impl<'a> XmlCursor<'a> {
    pub(crate) fn new(xml: &'a [u8]) -> Self {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(false);
        Self { reader }
    }

    /// Read the next event.
    #[inline]
    pub(crate) fn next(&mut self) -> Result<Event<'a>, LoadError> {
        self.reader.read_event().map_err(|e| {
            LoadError::Xml(format!(
                "XML parsing error at position {}: {}",
                self.reader.buffer_position(),
                e
            ))
        })
    }

    /// Copy the rest of an element whose start tag has just been read,
    /// including its end tag.
    pub(crate) fn copy_element(&mut self, out: &mut Vec<u8>) -> Result<(), LoadError> {
        let mut depth = 1usize;
        loop {
            let event = self.next()?;
            match event {
                Event::Start(_) => depth += 1,
                Event::End(_) => depth -= 1,
                Event::Eof => return Err(unexpected_eof()),
                _ => {},
            }
            push_event(out, &event);
            if depth == 0 {
                return Ok(());
            }
        }
    }
}

pub(crate) fn unexpected_eof() -> LoadError {
    LoadError::Xml("unexpected end of document".to_string())
}

/// Append the markup of a single event.
pub(crate) fn push_event(out: &mut Vec<u8>, event: &Event<'_>) {
    match event {
        Event::Start(e) => {
            out.push(b'<');
            out.extend_from_slice(e);
            out.push(b'>');
        },
        Event::End(e) => {
            out.extend_from_slice(b"</");
            out.extend_from_slice(e);
            out.push(b'>');
        },
        Event::Empty(e) => {
            out.push(b'<');
            out.extend_from_slice(e);
            out.extend_from_slice(b"/>");
        },
        Event::Text(e) => out.extend_from_slice(e),
        Event::GeneralRef(e) => {
            out.push(b'&');
            out.extend_from_slice(e);
            out.push(b';');
        },
        Event::CData(e) => {
            out.extend_from_slice(b"<![CDATA[");
            out.extend_from_slice(e);
            out.extend_from_slice(b"]]>");
        },
        Event::Comment(e) => {
            out.extend_from_slice(b"<!--");
            out.extend_from_slice(e);
            out.extend_from_slice(b"-->");
        },
        Event::Decl(e) => {
            out.extend_from_slice(b"<?");
            out.extend_from_slice(e);
            out.extend_from_slice(b"?>");
        },
        Event::PI(e) => {
            out.extend_from_slice(b"<?");
            out.extend_from_slice(e);
            out.extend_from_slice(b"?>");
        },
        Event::DocType(e) => {
            out.extend_from_slice(b"<!DOCTYPE ");
            out.extend_from_slice(e);
            out.push(b'>');
        },
        _ => {},
    }
}

/// Whether `name` is the WordprocessingML element `local` (`w:local` or
/// unprefixed `local`).
#[inline]
pub(crate) fn is_wml(name: QName<'_>, local: &[u8]) -> bool {
    let name = name.as_ref();
    name == local || name.strip_prefix(b"w:") == Some(local)
}

/// Start tag of a parsed or generated element.
///
/// Stores the tag content (name plus attributes, exactly as read) so the
/// element can be written back with its original attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Tag {
    content: Vec<u8>,
    name_len: usize,
    self_closing: bool,
}

impl Tag {
    /// Generated tag without attributes, e.g. `w:p`.
    pub(crate) fn new(name: &str) -> Self {
        Self {
            content: name.as_bytes().to_vec(),
            name_len: name.len(),
            self_closing: false,
        }
    }

    pub(crate) fn from_start(start: &BytesStart<'_>, self_closing: bool) -> Self {
        Self {
            content: start.to_vec(),
            name_len: start.name().as_ref().len(),
            self_closing,
        }
    }

    /// Write the opening tag. A self-closing element with no children is
    /// written back in its short form.
    pub(crate) fn write_open(&self, out: &mut Vec<u8>, has_children: bool) {
        out.push(b'<');
        out.extend_from_slice(&self.content);
        if self.self_closing && !has_children {
            out.extend_from_slice(b"/>");
        } else {
            out.push(b'>');
        }
    }

    pub(crate) fn write_close(&self, out: &mut Vec<u8>, has_children: bool) {
        if self.self_closing && !has_children {
            return;
        }
        out.extend_from_slice(b"</");
        out.extend_from_slice(&self.content[..self.name_len]);
        out.push(b'>');
    }
}

/// Either a modelled child element or markup carried through verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Node<T> {
    Item(T),
    Markup(Vec<u8>),
}

/// A WordprocessingML element with a typed in-memory model.
pub(crate) trait XmlElement: Sized {
    /// Local name of the element (`p`, `r`, `tbl`, ...).
    const LOCAL_NAME: &'static [u8];

    /// Parse the element whose start tag has just been read.
    fn parse(cursor: &mut XmlCursor<'_>, start: &BytesStart<'_>, empty: bool) -> Result<Self, LoadError>;

    fn write_xml(&self, out: &mut Vec<u8>);
}

/// Parse the children of the current element up to and including its end
/// tag, modelling `T` children and keeping everything else as markup.
pub(crate) fn parse_children<T: XmlElement>(cursor: &mut XmlCursor<'_>) -> Result<Vec<Node<T>>, LoadError> {
    let mut children = Vec::new();
    loop {
        let event = cursor.next()?;
        match event {
            Event::Start(ref e) if is_wml(e.name(), T::LOCAL_NAME) => {
                children.push(Node::Item(T::parse(cursor, e, false)?));
            },
            Event::Empty(ref e) if is_wml(e.name(), T::LOCAL_NAME) => {
                children.push(Node::Item(T::parse(cursor, e, true)?));
            },
            Event::Start(_) => {
                let mut raw = Vec::new();
                push_event(&mut raw, &event);
                cursor.copy_element(&mut raw)?;
                children.push(Node::Markup(raw));
            },
            Event::End(_) => return Ok(children),
            Event::Eof => return Err(unexpected_eof()),
            _ => {
                let mut raw = Vec::new();
                push_event(&mut raw, &event);
                children.push(Node::Markup(raw));
            },
        }
    }
}

pub(crate) fn write_children<T: XmlElement>(out: &mut Vec<u8>, children: &[Node<T>]) {
    for child in children {
        match child {
            Node::Item(item) => item.write_xml(out),
            Node::Markup(raw) => out.extend_from_slice(raw),
        }
    }
}

/// Write `tag` around `children`.
pub(crate) fn write_element<T: XmlElement>(out: &mut Vec<u8>, tag: &Tag, children: &[Node<T>]) {
    let has_children = !children.is_empty();
    tag.write_open(out, has_children);
    write_children(out, children);
    tag.write_close(out, has_children);
}

/// Read an attribute by local name, unescaped.
pub(crate) fn attribute(start: &BytesStart<'_>, local: &[u8]) -> Result<Option<String>, LoadError> {
    for attr in start.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == local {
            let raw = std::str::from_utf8(&attr.value)?;
            return Ok(Some(quick_xml::escape::unescape(raw)?.into_owned()));
        }
    }
    Ok(None)
}
