use crate::mesh::Mesh;
use crate::surface::{NurbsSurface, Patch};

/// Node attribute type code as stored in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttributeType {
    #[default]
    Unknown,
    Null,
    Marker,
    Skeleton,
    Mesh,
    Nurbs,
    Patch,
    Camera,
    CameraStereo,
    CameraSwitcher,
    Light,
    OpticalReference,
    OpticalMarker,
    NurbsCurve,
    TrimNurbsSurface,
    Boundary,
    NurbsSurface,
    Shape,
    LodGroup,
    SubDiv,
    CachedEffect,
    Line,
}

impl AttributeType {
    /// Maps the type name of a `NodeAttribute` object or a legacy `Model` subtype.
    pub fn from_fbx(type_name: &str) -> Self {
        match type_name {
            "Null" | "Root" => Self::Null,
            "Marker" => Self::Marker,
            "LimbNode" | "Limb" | "Skeleton" => Self::Skeleton,
            "Mesh" => Self::Mesh,
            "Nurbs" => Self::Nurbs,
            "Patch" => Self::Patch,
            "Camera" => Self::Camera,
            "CameraStereo" => Self::CameraStereo,
            "CameraSwitcher" => Self::CameraSwitcher,
            "Light" => Self::Light,
            "OpticalReference" => Self::OpticalReference,
            "OpticalMarker" => Self::OpticalMarker,
            "NurbsCurve" => Self::NurbsCurve,
            "TrimNurbsSurface" => Self::TrimNurbsSurface,
            "Boundary" => Self::Boundary,
            "NurbsSurface" => Self::NurbsSurface,
            "Shape" => Self::Shape,
            "LodGroup" | "LODGroup" => Self::LodGroup,
            "SubDiv" | "Subdiv" => Self::SubDiv,
            "CachedEffect" => Self::CachedEffect,
            "Line" => Self::Line,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone)]
pub enum AttributeKind {
    Mesh(Mesh),
    /// Legacy NURBS object. Its geometry is not read, so it never triangulates.
    Nurbs,
    NurbsSurface(NurbsSurface),
    Patch(Patch),
    Other(AttributeType),
}

#[derive(Debug, Clone)]
pub struct NodeAttribute {
    pub name: String,
    pub kind: AttributeKind,
}

impl NodeAttribute {
    pub fn new(name: &str, kind: AttributeKind) -> Self {
        Self {
            name: name.to_owned(),
            kind,
        }
    }

    pub fn attribute_type(&self) -> AttributeType {
        match &self.kind {
            AttributeKind::Mesh(_) => AttributeType::Mesh,
            AttributeKind::Nurbs => AttributeType::Nurbs,
            AttributeKind::NurbsSurface(_) => AttributeType::NurbsSurface,
            AttributeKind::Patch(_) => AttributeType::Patch,
            AttributeKind::Other(attribute_type) => *attribute_type,
        }
    }

    pub fn mesh(&self) -> Option<&Mesh> {
        match &self.kind {
            AttributeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn mesh_mut(&mut self) -> Option<&mut Mesh> {
        match &mut self.kind {
            AttributeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_names_map_to_codes() {
        assert_eq!(AttributeType::from_fbx("LimbNode"), AttributeType::Skeleton);
        assert_eq!(AttributeType::from_fbx("LodGroup"), AttributeType::LodGroup);
        assert_eq!(AttributeType::from_fbx("Volume"), AttributeType::Unknown);
    }

    #[test]
    fn kind_determines_type() {
        let attribute = NodeAttribute::new("cam", AttributeKind::Other(AttributeType::Camera));
        assert_eq!(attribute.attribute_type(), AttributeType::Camera);
        assert!(attribute.mesh().is_none());

        let attribute = NodeAttribute::new("box", AttributeKind::Mesh(Mesh::default()));
        assert_eq!(attribute.attribute_type(), AttributeType::Mesh);
    }
}
