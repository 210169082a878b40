use std::fmt;
use std::io;
use std::path::PathBuf;

#[derive(Debug)]
pub enum Error {
    /// The template path does not resolve to a readable file.
    TemplateNotFound(PathBuf),
    /// The template bytes are not a usable PDF.
    CorruptTemplate(String),
    PageOutOfRange { index: usize, count: usize },
    /// Image bytes are not a supported raster format.
    ImageDecode(String),
    /// The output document could not be written.
    Write { path: PathBuf, source: io::Error },
    /// The modified document could not be serialized.
    Serialize(String),
    Io(io::Error),
    InvalidCatalog(String),
    InvalidRecord(String),
    UnknownField(String),
}

impl Error {
    /// True when the request failed because of the template itself.
    pub fn is_template_problem(&self) -> bool {
        matches!(self, Error::TemplateNotFound(_) | Error::CorruptTemplate(_))
    }

    /// True when the request failed while producing the output document.
    pub fn is_output_problem(&self) -> bool {
        matches!(self, Error::Write { .. } | Error::Serialize(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::TemplateNotFound(path) => write!(f, "template not found: {}", path.display()),
            Error::CorruptTemplate(msg) => write!(f, "corrupt template: {msg}"),
            Error::PageOutOfRange { index, count } => {
                write!(f, "page {index} out of range (template has {count} pages)")
            }
            Error::ImageDecode(msg) => write!(f, "image decode error: {msg}"),
            Error::Write { path, source } => {
                write!(f, "cannot write output {}: {source}", path.display())
            }
            Error::Serialize(msg) => write!(f, "cannot serialize output: {msg}"),
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::InvalidCatalog(msg) => write!(f, "invalid catalog: {msg}"),
            Error::InvalidRecord(msg) => write!(f, "invalid record: {msg}"),
            Error::UnknownField(name) => write!(f, "field '{name}' is not in the catalog"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Write { source, .. } => Some(source),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}
