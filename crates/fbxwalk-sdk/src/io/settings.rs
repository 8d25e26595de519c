/// Import options shared by every importer created from one [`crate::Manager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoSettings {
    /// Attach material objects to the nodes that use them.
    pub materials: bool,
    /// Resolve texture connections on materials.
    pub textures: bool,
}

impl Default for IoSettings {
    fn default() -> Self {
        Self {
            materials: true,
            textures: true,
        }
    }
}
