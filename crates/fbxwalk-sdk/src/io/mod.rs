use std::path::{Path, PathBuf};

use crate::error::ImportError;
use crate::manager::Manager;
use crate::scene::Scene;

pub mod ascii;
pub mod binary;
mod document;
pub mod record;
mod settings;

pub use settings::IoSettings;

/// Oldest file version the importer understands.
pub const MIN_SUPPORTED_VERSION: u32 = 7000;

/// Reads one file into a [`Scene`], using the settings of the manager it was created from.
pub struct Importer<'a> {
    manager: &'a Manager,
    path: Option<PathBuf>,
    data: Option<Vec<u8>>,
}

impl<'a> Importer<'a> {
    pub fn create(manager: &'a Manager) -> Self {
        Self {
            manager,
            path: None,
            data: None,
        }
    }

    pub fn initialize(&mut self, path: impl AsRef<Path>) -> Result<(), ImportError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| ImportError::Read {
            path: path.to_owned(),
            source,
        })?;

        self.path = Some(path.to_owned());
        self.data = Some(data);
        Ok(())
    }

    pub fn initialize_from_bytes(&mut self, data: Vec<u8>) {
        self.path = None;
        self.data = Some(data);
    }

    pub fn import(&self) -> Result<Scene, ImportError> {
        puffin::profile_function!();

        let data = self.data.as_deref().ok_or(ImportError::NotInitialized)?;

        let document = if binary::is_binary(data) {
            binary::parse(data)?
        } else {
            ascii::parse(&String::from_utf8_lossy(data))?
        };

        if document.version < MIN_SUPPORTED_VERSION {
            return Err(ImportError::UnsupportedVersion(document.version));
        }

        let scene = document::build_scene(&document, self.manager.io_settings())?;
        log::info!(
            "Imported {} (version {}, {} nodes)",
            self.path
                .as_deref()
                .map_or_else(|| "<memory>".to_owned(), |path| path.display().to_string()),
            document.version,
            scene.node_count()
        );
        Ok(scene)
    }
}
