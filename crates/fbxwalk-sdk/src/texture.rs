use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum TextureKind {
    File {
        file_name: PathBuf,
        relative_file_name: PathBuf,
    },
    Layered,
    Procedural,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub name: String,
    pub kind: TextureKind,
}

impl Texture {
    pub fn file(name: &str, file_name: impl Into<PathBuf>) -> Self {
        let file_name = file_name.into();
        Self {
            name: name.to_owned(),
            kind: TextureKind::File {
                relative_file_name: file_name.clone(),
                file_name,
            },
        }
    }

    /// Absolute file name, falling back to the relative one when the absolute is empty.
    pub fn file_name(&self) -> Option<&std::path::Path> {
        match &self.kind {
            TextureKind::File {
                file_name,
                relative_file_name,
            } => {
                if file_name.as_os_str().is_empty() {
                    Some(relative_file_name.as_path())
                } else {
                    Some(file_name.as_path())
                }
            }
            TextureKind::Layered | TextureKind::Procedural => None,
        }
    }
}
