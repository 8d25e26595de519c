use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("importer was not initialized with a file")]
    NotInitialized,
    #[error("unexpected end of data at offset {offset}")]
    UnexpectedEof { offset: usize },
    #[error("invalid record at offset {offset}: {reason}")]
    InvalidRecord { offset: usize, reason: String },
    #[error("unknown property type code {code:?} at offset {offset}")]
    UnknownPropertyType { code: char, offset: usize },
    #[error("failed to inflate array at offset {offset}: {source}")]
    Inflate {
        offset: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("syntax error on line {line}: {reason}")]
    Syntax { line: usize, reason: String },
    #[error("unsupported file version {0}, at least 7000 is required")]
    UnsupportedVersion(u32),
    #[error("{object}: {reason}")]
    InvalidGeometry { object: String, reason: String },
}
