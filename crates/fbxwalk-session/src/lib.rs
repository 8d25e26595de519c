//! Cursor based access to an imported FBX scene.
//!
//! A [`SceneSession`] owns one open scene and a cursor on its node tree. Callers move the
//! cursor with [`SceneSession::descend_to_first_child`], [`SceneSession::advance_to_next_sibling`]
//! and [`SceneSession::ascend_to_parent`], then read the attributes and materials of the node
//! under it as flat buffers.

mod accessor;
mod buffer;
mod cursor;
mod error;
mod material;
mod mesh;
mod session;

pub use accessor::NodeAttributeType;
pub use error::{IndexKind, Result, SessionError};
pub use material::{opacity, OpacityRule, ShadingModel, TextureSlot, SPECULAR_POWER_UNSUPPORTED};
pub use mesh::{SmoothingRule, UvIndexPolicy};
pub use session::SceneSession;

pub use fbxwalk_sdk::IoSettings;
