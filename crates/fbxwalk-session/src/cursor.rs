use fbxwalk_sdk::{NodeId, Scene};

use crate::error::Result;
use crate::session::SceneSession;

/// Position in the node tree of an open scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NodeCursor {
    node: NodeId,
}

impl NodeCursor {
    pub(crate) fn at_root(scene: &Scene) -> Self {
        Self { node: scene.root() }
    }

    pub(crate) fn node(&self) -> NodeId {
        self.node
    }

    fn descend_to_first_child(&mut self, scene: &Scene) -> bool {
        match scene[self.node].children.first() {
            Some(&child) => {
                self.node = child;
                true
            }
            None => false,
        }
    }

    /// Finds the current node among its siblings by id, since sibling names may repeat.
    fn advance_to_next_sibling(&mut self, scene: &Scene) -> bool {
        let Some(parent) = scene[self.node].parent else {
            return false;
        };

        let siblings = &scene[parent].children;
        match siblings.iter().position(|&sibling| sibling == self.node) {
            Some(index) if index + 1 < siblings.len() => {
                self.node = siblings[index + 1];
                true
            }
            _ => false,
        }
    }

    fn ascend_to_parent(&mut self, scene: &Scene) -> bool {
        match scene[self.node].parent {
            Some(parent) => {
                self.node = parent;
                true
            }
            None => false,
        }
    }
}

impl SceneSession {
    /// Moves to the first child of the current node. Returns `false` and stays put on a leaf.
    pub fn descend_to_first_child(&mut self) -> Result<bool> {
        let live = self.live_mut()?;
        let moved = live.cursor.descend_to_first_child(&live.scene);
        log::debug!("descend_to_first_child -> {}", moved);
        Ok(moved)
    }

    /// Moves to the next sibling. Returns `false` and stays put at the last child or the root.
    pub fn advance_to_next_sibling(&mut self) -> Result<bool> {
        let live = self.live_mut()?;
        let moved = live.cursor.advance_to_next_sibling(&live.scene);
        log::debug!("advance_to_next_sibling -> {}", moved);
        Ok(moved)
    }

    /// Moves to the parent. Returns `false` at the root.
    pub fn ascend_to_parent(&mut self) -> Result<bool> {
        let live = self.live_mut()?;
        let moved = live.cursor.ascend_to_parent(&live.scene);
        log::debug!("ascend_to_parent -> {}", moved);
        Ok(moved)
    }
}
