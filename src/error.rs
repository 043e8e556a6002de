/// Error types for template filling.
use thiserror::Error;

/// Result type for template filling operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error for template filling.
#[derive(Error, Debug)]
pub enum Error {
    /// The template could not be loaded
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// A replacement map entry could not be used for substitution
    #[error("Substitution error: {0}")]
    Substitution(String),

    /// A style was applied to a run that does not exist
    #[error("Style application error: {0}")]
    StyleApplication(String),

    /// The filled document could not be written
    #[error("Write error: {0}")]
    Write(#[from] WriteError),

    /// A config or form file could not be read
    #[error("Config error: {0}")]
    Config(String),
}

/// Errors raised while opening a template package.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Part not found: {0}")]
    PartNotFound(String),

    #[error("Invalid content type: expected {expected}, got {got}")]
    InvalidContentType { expected: String, got: String },

    #[error("XML error: {0}")]
    Xml(String),

    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

impl From<quick_xml::Error> for LoadError {
    fn from(err: quick_xml::Error) -> Self {
        LoadError::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for LoadError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        LoadError::Xml(err.to_string())
    }
}

impl From<quick_xml::escape::EscapeError> for LoadError {
    fn from(err: quick_xml::escape::EscapeError) -> Self {
        LoadError::Xml(err.to_string())
    }
}

/// Errors raised while saving a filled package.
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl WriteError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        WriteError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
