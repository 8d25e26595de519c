use std::collections::TryReserveError;
use std::fmt;
use std::path::PathBuf;

use fbxwalk_sdk::ImportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Attribute,
    Material,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attribute => f.write_str("attribute"),
            Self::Material => f.write_str("material"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("failed to open {}", .path.display())]
    CorruptAsset {
        path: PathBuf,
        #[source]
        source: ImportError,
    },
    #[error("no scene is open")]
    SessionClosed,
    #[error("{kind} index {index} out of bounds for {count} entries")]
    IndexOutOfBounds {
        kind: IndexKind,
        index: usize,
        count: usize,
    },
    #[error("failed to allocate {len} entries for {buffer}")]
    Allocation {
        buffer: &'static str,
        len: usize,
        #[source]
        source: TryReserveError,
    },
}

pub type Result<T, E = SessionError> = std::result::Result<T, E>;
