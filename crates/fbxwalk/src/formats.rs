use std::path::Path;

use crate::error::LoadError;
use crate::loader::{self, LoadOptions, LoadedScene};

const SUPPORTED_EXTENSIONS: [&str; 1] = ["fbx"];

/// File dialog style filters, one per supported extension.
pub fn supported_extension_filters() -> Vec<String> {
    SUPPORTED_EXTENSIONS
        .iter()
        .map(|extension| format!("*.{}", extension))
        .collect()
}

pub fn check_extension(path: &Path) -> Result<(), LoadError> {
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .ok_or_else(|| LoadError::MissingExtension(path.to_owned()))?;

    if SUPPORTED_EXTENSIONS
        .iter()
        .any(|supported| supported.eq_ignore_ascii_case(extension))
    {
        Ok(())
    } else {
        Err(LoadError::UnsupportedFormat {
            path: path.to_owned(),
            extension: extension.to_owned(),
        })
    }
}

/// Loads `path` after checking that its extension is one we read.
pub fn load(path: impl AsRef<Path>, options: &LoadOptions) -> Result<LoadedScene, LoadError> {
    let path = path.as_ref();
    check_extension(path)?;
    loader::load(path, options)
}
