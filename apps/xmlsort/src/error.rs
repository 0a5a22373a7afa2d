//! Error types for parsing, configuration and sort runs.

use std::path::PathBuf;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure to turn input bytes into a document tree.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("malformed XML at byte {position}: {message}")]
    Malformed { position: u64, message: String },

    #[error("document has no root element")]
    MissingRoot,

    #[error("unexpected {what} after the root element at byte {position}")]
    TrailingContent { what: &'static str, position: u64 },

    #[error("unexpected end of input: <{0}> is not closed")]
    Unclosed(String),
}

/// Problems with the sort-order template or the effective settings.
///
/// These are always raised before any input document is modified.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read sort order template {}: {source}", path.display())]
    TemplateIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("sort order template {name} is not valid XML: {source}")]
    TemplateParse {
        name: String,
        #[source]
        source: ParseError,
    },

    #[error("unsupported encoding '{0}' (only UTF-8 can be written)")]
    UnsupportedEncoding(String),

    #[error("invalid line separator {0:?} (expected \\n, \\r\\n or \\r)")]
    LineSeparator(String),

    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },

    #[error("invalid config file {}: {message}", path.display())]
    File { path: PathBuf, message: String },
}

/// Top-level error for one sort or verify operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", path.display())]
    Document {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("bad glob pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
