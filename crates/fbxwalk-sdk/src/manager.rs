use crate::io::IoSettings;

/// Root object of the SDK. Importers read their settings from the manager that created them.
#[derive(Debug, Default)]
pub struct Manager {
    settings: IoSettings,
}

impl Manager {
    pub fn create() -> Self {
        log::debug!("Created SDK manager");
        Self::default()
    }

    pub fn io_settings(&self) -> &IoSettings {
        &self.settings
    }

    pub fn set_io_settings(&mut self, settings: IoSettings) {
        self.settings = settings;
    }
}
