use std::path::Path;

use fbxwalk_sdk::{GeometryConverter, Importer, IoSettings, Manager, Node, Scene};

use crate::cursor::NodeCursor;
use crate::error::{Result, SessionError};

/// Everything owned by an open scene. Dropping it releases the scene and its manager.
pub(crate) struct LiveScene {
    _manager: Manager,
    pub(crate) scene: Scene,
    pub(crate) cursor: NodeCursor,
    converter: Option<GeometryConverter>,
}

impl LiveScene {
    fn new(manager: Manager, scene: Scene) -> Self {
        let cursor = NodeCursor::at_root(&scene);
        Self {
            _manager: manager,
            scene,
            cursor,
            converter: None,
        }
    }

    /// The cursor only ever holds ids taken from this scene.
    pub(crate) fn current_node(&self) -> &Node {
        &self.scene[self.cursor.node()]
    }

    pub(crate) fn current_node_mut(&mut self) -> &mut Node {
        &mut self.scene[self.cursor.node()]
    }

    /// The node under the cursor together with the converter shared by all geometry
    /// operations of this scene, created on first use.
    pub(crate) fn current_node_with_converter(&mut self) -> (&mut Node, &GeometryConverter) {
        let converter = self.converter.get_or_insert_with(GeometryConverter::new);
        (&mut self.scene[self.cursor.node()], converter)
    }
}

/// One opened scene and the cursor walking it.
///
/// Every query runs against the node under the cursor. All of them fail with
/// [`SessionError::SessionClosed`] while nothing is open.
#[derive(Default)]
pub struct SceneSession {
    live: Option<LiveScene>,
}

impl SceneSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the file at `path` with default import settings, replacing any open scene.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<bool> {
        self.open_with_settings(path, IoSettings::default())
    }

    /// Opens the file at `path`. On failure no scene stays open, including one opened before.
    pub fn open_with_settings(&mut self, path: impl AsRef<Path>, settings: IoSettings) -> Result<bool> {
        puffin::profile_function!();

        let path = path.as_ref();
        let mut manager = Manager::create();
        manager.set_io_settings(settings);

        let imported = {
            let mut importer = Importer::create(&manager);
            importer.initialize(path).and_then(|()| importer.import())
        };

        match imported {
            Ok(scene) => {
                self.close();
                log::info!("Opened {} with {} nodes", path.display(), scene.node_count());
                self.live = Some(LiveScene::new(manager, scene));
                Ok(true)
            }
            Err(source) => {
                self.close();
                log::warn!("Failed to open {}: {}", path.display(), source);
                Err(SessionError::CorruptAsset {
                    path: path.to_owned(),
                    source,
                })
            }
        }
    }

    /// Adopts an already imported scene, replacing any open scene.
    pub fn open_scene(&mut self, scene: Scene) {
        self.close();
        log::info!("Opened in-memory scene with {} nodes", scene.node_count());
        self.live = Some(LiveScene::new(Manager::create(), scene));
    }

    pub fn close(&mut self) {
        if self.live.take().is_some() {
            log::info!("Closed scene");
        }
    }

    pub fn is_open(&self) -> bool {
        self.live.is_some()
    }

    pub(crate) fn live(&self) -> Result<&LiveScene> {
        self.live.as_ref().ok_or(SessionError::SessionClosed)
    }

    pub(crate) fn live_mut(&mut self) -> Result<&mut LiveScene> {
        self.live.as_mut().ok_or(SessionError::SessionClosed)
    }
}
