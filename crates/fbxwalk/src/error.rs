use std::path::PathBuf;

use fbxwalk_session::SessionError;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("{} has no file extension", .0.display())]
    MissingExtension(PathBuf),

    #[error("unsupported format {extension:?} for {}", .path.display())]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error(transparent)]
    Session(#[from] SessionError),
}
