//! Reading FBX files into an in-memory scene: the importer for binary and ASCII 7.x
//! files, the scene object model and the geometry converter.

pub mod attribute;
pub mod converter;
pub mod error;
pub mod io;
pub mod layer;
pub mod manager;
pub mod material;
pub mod mesh;
pub mod scene;
pub mod surface;
pub mod texture;

pub use attribute::{AttributeKind, AttributeType, NodeAttribute};
pub use converter::GeometryConverter;
pub use error::ImportError;
pub use fbxwalk_transform::{NodeTransform, RotationOrder};
pub use io::{Importer, IoSettings};
pub use layer::{LayerElement, MappingMode, ReferenceMode};
pub use manager::Manager;
pub use material::{MaterialClass, Property, PropertyValue, SurfaceMaterial};
pub use mesh::Mesh;
pub use scene::{MaterialId, Node, NodeId, Scene, TextureId};
pub use texture::{Texture, TextureKind};
