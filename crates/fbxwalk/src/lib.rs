#![doc(html_no_source)]

mod error;
mod fbxwalk;
pub mod formats;
pub mod loader;
pub mod profiling;

pub use error::LoadError;
pub use fbxwalk::Fbxwalk;
pub use loader::{LoadOptions, LoadedMaterial, LoadedMesh, LoadedScene};

// Reexport all crates
pub use fbxwalk_sdk;
pub use fbxwalk_session;
