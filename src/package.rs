//! Physical `.docx` package handling.
//!
//! A Word document is an OPC package: a ZIP archive whose main part
//! (`word/document.xml` in practice) is located through the package
//! relationships. Template filling only ever rewrites that main part, so the
//! package keeps every other member as raw bytes and copies them back
//! verbatim on save.

use crate::docx::xml::attribute;
use crate::error::{LoadError, WriteError};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::io::{Cursor, Read, Seek, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

/// Content types and relationship types used to locate the main part.
pub mod constants {
    pub const WML_DOCUMENT_MAIN: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
    pub const WML_TEMPLATE_MAIN: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.template.main+xml";
    pub const WML_DOCUMENT_MACRO_MAIN: &str = "application/vnd.ms-word.document.macroEnabled.main+xml";
    pub const WML_TEMPLATE_MACRO_MAIN: &str = "application/vnd.ms-word.template.macroEnabledTemplate.main+xml";

    /// Content types accepted for the main document part.
    pub const WML_MAIN_PARTS: [&str; 4] = [
        WML_DOCUMENT_MAIN,
        WML_TEMPLATE_MAIN,
        WML_DOCUMENT_MACRO_MAIN,
        WML_TEMPLATE_MACRO_MAIN,
    ];

    pub const RT_OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    /// Strict OOXML spelling of the officeDocument relationship.
    pub const RT_OFFICE_DOCUMENT_STRICT: &str =
        "http://purl.oclc.org/ooxml/officeDocument/relationships/officeDocument";

    pub const CONTENT_TYPES_MEMBER: &str = "[Content_Types].xml";
    pub const PACKAGE_RELS_MEMBER: &str = "_rels/.rels";
    pub const DEFAULT_MAIN_PART: &str = "word/document.xml";
}

use constants::*;

/// Upper bound on the buffer preallocated for one archive member.
const MAX_SIZE_HINT: u64 = 16 * 1024 * 1024;

/// One member of the ZIP archive.
#[derive(Debug, Clone)]
struct Member {
    name: String,
    data: Vec<u8>,
    compression: CompressionMethod,
}

/// A loaded Word package.
///
/// # Examples
///
/// ```rust,no_run
/// use complaint_docx::package::Package;
///
/// let pkg = Package::open("with_placeholder.docx")?;
/// println!("main part: {}", pkg.main_part_name());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct Package {
    /// Archive members in their original order
    members: Vec<Member>,
    /// Index of the main document part in `members`
    main_index: usize,
}

impl Package {
    /// Open a `.docx` package from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(LoadError::TemplateNotFound(path.display().to_string()));
        }

        let data = std::fs::read(path)?;
        Self::from_bytes(data)
    }

    /// Load a package from owned bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, LoadError> {
        Self::from_reader(Cursor::new(data))
    }

    /// Load a package from a reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self, LoadError> {
        let mut archive = zip::ZipArchive::new(reader)?;
        let mut members = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            // The header size is untrusted; it only sizes the initial buffer
            let mut data = Vec::with_capacity(file.size().min(MAX_SIZE_HINT) as usize);
            file.read_to_end(&mut data)?;
            members.push(Member {
                name: file.name().to_string(),
                data,
                compression: file.compression(),
            });
        }

        let main_name = resolve_main_part(&members)?;
        let content_type = content_type_for(&members, &main_name)?;
        if !WML_MAIN_PARTS.contains(&content_type.as_str()) {
            return Err(LoadError::InvalidContentType {
                expected: WML_DOCUMENT_MAIN.to_string(),
                got: content_type,
            });
        }

        let main_index = members
            .iter()
            .position(|m| m.name == main_name)
            .ok_or_else(|| LoadError::PartNotFound(main_name.clone()))?;

        debug!(members = members.len(), main_part = %main_name, "loaded package");

        Ok(Self {
            members,
            main_index,
        })
    }

    /// Member name of the main document part, e.g. `word/document.xml`.
    #[inline]
    pub fn main_part_name(&self) -> &str {
        &self.members[self.main_index].name
    }

    /// Raw XML of the main document part.
    #[inline]
    pub fn main_part_xml(&self) -> &[u8] {
        &self.members[self.main_index].data
    }

    /// Replace the main document part.
    pub fn set_main_part_xml(&mut self, xml: Vec<u8>) {
        self.members[self.main_index].data = xml;
    }

    /// Serialize the package to ZIP bytes.
    ///
    /// Stored members stay stored; everything else is deflated.
    pub fn to_bytes(&self) -> Result<Vec<u8>, WriteError> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));

        for member in &self.members {
            let method = match member.compression {
                CompressionMethod::Stored => CompressionMethod::Stored,
                _ => CompressionMethod::Deflated,
            };
            let options = SimpleFileOptions::default().compression_method(method);
            zip.start_file(member.name.as_str(), options)?;
            zip.write_all(&member.data)
                .map_err(zip::result::ZipError::Io)?;
        }

        Ok(zip.finish()?.into_inner())
    }

    /// Save the package to `path`.
    ///
    /// The archive is written to a temporary file next to `path` and renamed
    /// over it, so the target is either fully replaced or left as it was.
    /// A replaced target keeps its permissions; a new one gets the same
    /// permissions a plainly created file would.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<PathBuf, WriteError> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut builder = tempfile::Builder::new();
        builder.prefix(".complaint-docx-").suffix(".tmp");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            // Masked by the process umask on creation
            builder.permissions(std::fs::Permissions::from_mode(0o666));
        }

        let mut tmp = builder.tempfile_in(dir).map_err(|e| WriteError::io(path, e))?;
        if let Ok(existing) = std::fs::metadata(path) {
            tmp.as_file()
                .set_permissions(existing.permissions())
                .map_err(|e| WriteError::io(path, e))?;
        }
        tmp.write_all(&bytes).map_err(|e| WriteError::io(path, e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| WriteError::io(path, e))?;
        tmp.persist(path).map_err(|e| WriteError::io(path, e.error))?;

        debug!(path = %path.display(), bytes = bytes.len(), "saved package");
        Ok(path.to_path_buf())
    }
}

/// Find the main part through the package-level officeDocument relationship.
fn resolve_main_part(members: &[Member]) -> Result<String, LoadError> {
    let Some(rels) = members.iter().find(|m| m.name == PACKAGE_RELS_MEMBER) else {
        return Ok(DEFAULT_MAIN_PART.to_string());
    };

    let mut reader = Reader::from_reader(&rels.data[..]);
    loop {
        match reader.read_event()? {
            Event::Start(ref e) | Event::Empty(ref e) if e.local_name().as_ref() == b"Relationship" => {
                let rel_type = attribute(e, b"Type")?;
                if matches!(
                    rel_type.as_deref(),
                    Some(RT_OFFICE_DOCUMENT) | Some(RT_OFFICE_DOCUMENT_STRICT)
                ) && let Some(target) = attribute(e, b"Target")?
                {
                    return Ok(target.trim_start_matches('/').to_string());
                }
            },
            Event::Eof => break,
            _ => {},
        }
    }

    Err(LoadError::PartNotFound(
        "officeDocument relationship in _rels/.rels".to_string(),
    ))
}

/// Look up the content type of a member from `[Content_Types].xml`.
fn content_type_for(members: &[Member], member_name: &str) -> Result<String, LoadError> {
    let types = members
        .iter()
        .find(|m| m.name == CONTENT_TYPES_MEMBER)
        .ok_or_else(|| LoadError::PartNotFound(CONTENT_TYPES_MEMBER.to_string()))?;

    let part_name = format!("/{}", member_name);
    let extension = member_name.rsplit_once('.').map(|(_, ext)| ext);
    let mut default_type = None;

    let mut reader = Reader::from_reader(&types.data[..]);
    loop {
        match reader.read_event()? {
            Event::Start(ref e) | Event::Empty(ref e) => match e.local_name().as_ref() {
                b"Override" => {
                    let name = attribute(e, b"PartName")?;
                    if name.is_some_and(|n| n.eq_ignore_ascii_case(&part_name))
                        && let Some(ct) = attribute(e, b"ContentType")?
                    {
                        return Ok(ct);
                    }
                },
                b"Default" => {
                    let ext = attribute(e, b"Extension")?;
                    if let (Some(ext), Some(wanted)) = (ext, extension)
                        && ext.eq_ignore_ascii_case(wanted)
                    {
                        default_type = attribute(e, b"ContentType")?;
                    }
                },
                _ => {},
            },
            Event::Eof => break,
            _ => {},
        }
    }

    default_type.ok_or_else(|| LoadError::PartNotFound(format!("content type for {}", part_name)))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

    pub(crate) const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

    /// Member names in archive order.
    pub(crate) fn member_names(pkg: &Package) -> Vec<&str> {
        pkg.members.iter().map(|m| m.name.as_str()).collect()
    }

    /// Raw bytes of a member, if present.
    pub(crate) fn member<'a>(pkg: &'a Package, name: &str) -> Option<&'a [u8]> {
        pkg.members
            .iter()
            .find(|m| m.name == name)
            .map(|m| m.data.as_slice())
    }

    /// Zip the given members, in order.
    fn build_package(members: &[(&str, &str)]) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, data) in members {
            zip.start_file(*name, options).unwrap();
            zip.write_all(data.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    /// Build a minimal `.docx` around the given `word/document.xml`.
    pub(crate) fn build_docx(document_xml: &str) -> Vec<u8> {
        build_package(&[
            (CONTENT_TYPES_MEMBER, CONTENT_TYPES),
            (PACKAGE_RELS_MEMBER, PACKAGE_RELS),
            (DEFAULT_MAIN_PART, document_xml),
            ("word/styles.xml", "<w:styles/>"),
        ])
    }

    #[test]
    fn test_open_resolves_main_part() {
        let pkg = Package::from_bytes(build_docx("<w:document/>")).unwrap();
        assert_eq!(pkg.main_part_name(), "word/document.xml");
        assert_eq!(pkg.main_part_xml(), b"<w:document/>");
    }

    #[test]
    fn test_missing_template() {
        let err = Package::open("/nonexistent/with_placeholder.docx").unwrap_err();
        assert!(matches!(err, LoadError::TemplateNotFound(_)));
    }

    #[test]
    fn test_not_a_zip() {
        let err = Package::from_bytes(b"definitely not a zip".to_vec()).unwrap_err();
        assert!(matches!(err, LoadError::Zip(_)));
    }

    #[test]
    fn test_rejects_non_word_main_part() {
        let types = CONTENT_TYPES.replace(WML_DOCUMENT_MAIN, "application/xml");
        let bytes = build_package(&[
            (CONTENT_TYPES_MEMBER, types.as_str()),
            (PACKAGE_RELS_MEMBER, PACKAGE_RELS),
            (DEFAULT_MAIN_PART, "<w:document/>"),
        ]);

        let err = Package::from_bytes(bytes).unwrap_err();
        assert!(matches!(err, LoadError::InvalidContentType { .. }));
    }

    #[test]
    fn test_accepts_template_and_macro_main_parts() {
        for content_type in [WML_TEMPLATE_MAIN, WML_DOCUMENT_MACRO_MAIN, WML_TEMPLATE_MACRO_MAIN] {
            let types = CONTENT_TYPES.replace(WML_DOCUMENT_MAIN, content_type);
            let bytes = build_package(&[
                (CONTENT_TYPES_MEMBER, types.as_str()),
                (PACKAGE_RELS_MEMBER, PACKAGE_RELS),
                (DEFAULT_MAIN_PART, "<w:document/>"),
            ]);

            let pkg = Package::from_bytes(bytes).unwrap();
            assert_eq!(pkg.main_part_name(), DEFAULT_MAIN_PART, "{content_type}");
        }
    }

    #[test]
    fn test_main_part_defaults_without_package_rels() {
        let bytes = build_package(&[
            (CONTENT_TYPES_MEMBER, CONTENT_TYPES),
            (DEFAULT_MAIN_PART, "<w:document/>"),
        ]);

        let pkg = Package::from_bytes(bytes).unwrap();
        assert_eq!(pkg.main_part_name(), "word/document.xml");
        assert_eq!(pkg.main_part_xml(), b"<w:document/>");
    }

    #[test]
    fn test_strict_office_document_relationship() {
        let rels = PACKAGE_RELS
            .replace(RT_OFFICE_DOCUMENT, RT_OFFICE_DOCUMENT_STRICT)
            .replace("Target=\"word/document.xml\"", "Target=\"/word/main.xml\"");
        let types = CONTENT_TYPES.replace("/word/document.xml", "/word/main.xml");
        let bytes = build_package(&[
            (CONTENT_TYPES_MEMBER, types.as_str()),
            (PACKAGE_RELS_MEMBER, rels.as_str()),
            ("word/main.xml", "<w:document/>"),
        ]);

        let pkg = Package::from_bytes(bytes).unwrap();
        assert_eq!(pkg.main_part_name(), "word/main.xml");
    }

    #[test]
    fn test_oversized_member_header() {
        let mut bytes = build_docx("<w:document/>");
        let name = b"word/styles.xml";
        let claimed = 0xFFFF_FFF0u32.to_le_bytes();

        // Overstate the uncompressed size in the local and central headers
        for (signature, size_at, name_len_at, name_at) in
            [(0x04034b50u32, 22, 26, 30), (0x02014b50u32, 24, 28, 46)]
        {
            let sig = signature.to_le_bytes();
            let mut i = 0;
            while i + name_at + name.len() <= bytes.len() {
                let name_len = bytes
                    .get(i + name_len_at..i + name_len_at + 2)
                    .map(|b| u16::from_le_bytes([b[0], b[1]]) as usize);
                if bytes[i..i + 4] == sig
                    && name_len == Some(name.len())
                    && &bytes[i + name_at..i + name_at + name.len()] == name
                {
                    bytes[i + size_at..i + size_at + 4].copy_from_slice(&claimed);
                }
                i += 1;
            }
        }

        match Package::from_bytes(bytes) {
            Ok(pkg) => assert_eq!(member(&pkg, "word/styles.xml"), Some(&b"<w:styles/>"[..])),
            Err(err) => assert!(matches!(err, LoadError::Zip(_) | LoadError::Io(_)), "{err}"),
        }
    }

    #[test]
    fn test_other_members_survive_save() {
        let mut pkg = Package::from_bytes(build_docx("<w:document/>")).unwrap();
        pkg.set_main_part_xml(b"<w:document><w:body/></w:document>".to_vec());

        let reopened = Package::from_bytes(pkg.to_bytes().unwrap()).unwrap();
        assert_eq!(reopened.main_part_xml(), b"<w:document><w:body/></w:document>");
        assert_eq!(member(&reopened, "word/styles.xml"), Some(&b"<w:styles/>"[..]));
        assert_eq!(member_names(&reopened), member_names(&pkg));
    }

    #[test]
    fn test_save_replaces_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("modified_document.docx");
        std::fs::write(&target, b"stale").unwrap();

        let pkg = Package::from_bytes(build_docx("<w:document/>")).unwrap();
        let written = pkg.save(&target).unwrap();

        assert_eq!(written, target);
        let reopened = Package::open(&target).unwrap();
        assert_eq!(reopened.main_part_xml(), b"<w:document/>");
    }

    #[test]
    fn test_save_into_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing").join("out.docx");

        let pkg = Package::from_bytes(build_docx("<w:document/>")).unwrap();
        let err = pkg.save(&target).unwrap_err();
        assert!(matches!(err, WriteError::Io { .. }));
    }

    #[cfg(unix)]
    fn file_mode(path: &Path) -> u32 {
        use std::os::unix::fs::PermissionsExt;
        std::fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    #[cfg(unix)]
    #[test]
    fn test_new_output_gets_plain_file_mode() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("plain.bin");
        std::fs::write(&plain, b"").unwrap();

        let target = dir.path().join("modified_document.docx");
        let pkg = Package::from_bytes(build_docx("<w:document/>")).unwrap();
        pkg.save(&target).unwrap();

        // Both are created under the same umask
        assert_eq!(file_mode(&target), file_mode(&plain));
    }

    #[cfg(unix)]
    #[test]
    fn test_replaced_output_keeps_its_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("modified_document.docx");
        std::fs::write(&target, b"stale").unwrap();
        std::fs::set_permissions(&target, std::fs::Permissions::from_mode(0o640)).unwrap();

        let pkg = Package::from_bytes(build_docx("<w:document/>")).unwrap();
        pkg.save(&target).unwrap();

        assert_eq!(file_mode(&target), 0o640);
    }
}
