use std::fmt;

use fbxwalk_sdk::{AttributeType, NodeAttribute, SurfaceMaterial};

use crate::error::{IndexKind, Result, SessionError};
use crate::session::SceneSession;

/// Type of a node attribute as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeAttributeType {
    Null,
    Marker,
    Skeleton,
    Mesh,
    Nurbs,
    Patch,
    Camera,
    Stereo,
    CameraSwitcher,
    Light,
    OpticalReference,
    NurbsCurve,
    TrimNurbsSurface,
    Boundary,
    NurbsSurface,
    Shape,
    LodGroup,
    Subdiv,
    Unknown,
}

impl NodeAttributeType {
    pub const ALL: [Self; 19] = [
        Self::Null,
        Self::Marker,
        Self::Skeleton,
        Self::Mesh,
        Self::Nurbs,
        Self::Patch,
        Self::Camera,
        Self::Stereo,
        Self::CameraSwitcher,
        Self::Light,
        Self::OpticalReference,
        Self::NurbsCurve,
        Self::TrimNurbsSurface,
        Self::Boundary,
        Self::NurbsSurface,
        Self::Shape,
        Self::LodGroup,
        Self::Subdiv,
        Self::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Marker => "marker",
            Self::Skeleton => "skeleton",
            Self::Mesh => "mesh",
            Self::Nurbs => "nurbs",
            Self::Patch => "patch",
            Self::Camera => "camera",
            Self::Stereo => "stereo",
            Self::CameraSwitcher => "camera switcher",
            Self::Light => "light",
            Self::OpticalReference => "optical reference",
            Self::NurbsCurve => "nurbs curve",
            Self::TrimNurbsSurface => "trim nurbs surface",
            Self::Boundary => "boundary",
            Self::NurbsSurface => "nurbs surface",
            Self::Shape => "shape",
            Self::LodGroup => "lodgroup",
            Self::Subdiv => "subdiv",
            Self::Unknown => "unknown",
        }
    }

    /// Geometry the converter can turn into a triangle mesh.
    pub fn is_triangulatable(&self) -> bool {
        matches!(self, Self::Mesh | Self::Patch | Self::Nurbs | Self::NurbsSurface)
    }
}

impl fmt::Display for NodeAttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<AttributeType> for NodeAttributeType {
    fn from(code: AttributeType) -> Self {
        match code {
            AttributeType::Null => Self::Null,
            // Optical markers are reported as plain markers.
            AttributeType::Marker | AttributeType::OpticalMarker => Self::Marker,
            AttributeType::Skeleton => Self::Skeleton,
            AttributeType::Mesh => Self::Mesh,
            AttributeType::Nurbs => Self::Nurbs,
            AttributeType::Patch => Self::Patch,
            AttributeType::Camera => Self::Camera,
            AttributeType::CameraStereo => Self::Stereo,
            AttributeType::CameraSwitcher => Self::CameraSwitcher,
            AttributeType::Light => Self::Light,
            AttributeType::OpticalReference => Self::OpticalReference,
            AttributeType::NurbsCurve => Self::NurbsCurve,
            AttributeType::TrimNurbsSurface => Self::TrimNurbsSurface,
            AttributeType::Boundary => Self::Boundary,
            AttributeType::NurbsSurface => Self::NurbsSurface,
            AttributeType::Shape => Self::Shape,
            AttributeType::LodGroup => Self::LodGroup,
            AttributeType::SubDiv => Self::Subdiv,
            AttributeType::CachedEffect | AttributeType::Line | AttributeType::Unknown => Self::Unknown,
        }
    }
}

fn check_bounds(kind: IndexKind, index: usize, count: usize) -> Result<()> {
    if index < count {
        Ok(())
    } else {
        Err(SessionError::IndexOutOfBounds { kind, index, count })
    }
}

impl SceneSession {
    pub fn name(&self) -> Result<String> {
        Ok(self.live()?.current_node().name.clone())
    }

    /// Global transform of the current node, column major with the translation in 12..15.
    pub fn global_transform(&self) -> Result<[f64; 16]> {
        let live = self.live()?;
        Ok(live
            .scene
            .evaluate_global_transform(live.cursor.node())
            .to_cols_array())
    }

    /// Geometric pivot translation. It applies to the node's own geometry only and is not inherited.
    pub fn geometric_translation(&self) -> Result<[f64; 3]> {
        Ok(self.live()?.current_node().geometric_translation.to_array())
    }

    pub fn attribute_count(&self) -> Result<usize> {
        Ok(self.live()?.current_node().attributes.len())
    }

    pub fn attribute_name(&self, index: usize) -> Result<String> {
        Ok(self.attribute(index)?.name.clone())
    }

    pub fn attribute_type(&self, index: usize) -> Result<NodeAttributeType> {
        Ok(self.attribute(index)?.attribute_type().into())
    }

    pub fn material_count(&self) -> Result<usize> {
        Ok(self.live()?.current_node().materials.len())
    }

    pub fn material_name(&self, index: usize) -> Result<String> {
        Ok(self.material(index)?.name.clone())
    }

    pub(crate) fn attribute(&self, index: usize) -> Result<&NodeAttribute> {
        let attributes = &self.live()?.current_node().attributes;
        check_bounds(IndexKind::Attribute, index, attributes.len())?;
        Ok(&attributes[index])
    }

    pub(crate) fn attribute_mut(&mut self, index: usize) -> Result<&mut NodeAttribute> {
        let node = self.live_mut()?.current_node_mut();
        check_bounds(IndexKind::Attribute, index, node.attributes.len())?;
        Ok(&mut node.attributes[index])
    }

    pub(crate) fn material(&self, index: usize) -> Result<&SurfaceMaterial> {
        let live = self.live()?;
        let materials = &live.current_node().materials;
        check_bounds(IndexKind::Material, index, materials.len())?;

        // Ids on a node always come from the same scene.
        Ok(&live.scene[materials[index]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fbxwalk_sdk::{AttributeKind, MaterialClass, Node, NodeTransform, Scene};
    use glam::DVec3;

    fn session() -> SceneSession {
        let mut scene = Scene::new();
        let material = scene.add_material(SurfaceMaterial::new("paint", MaterialClass::Lambert));

        let mut parent = Node::new("parent");
        parent.transform = NodeTransform::from_translation(DVec3::new(0.0, 10.0, 0.0));
        let parent = scene.add_node(parent, scene.root());

        let mut node = Node::new("child");
        node.transform = NodeTransform::from_translation(DVec3::new(1.0, 2.0, 3.0));
        node.geometric_translation = DVec3::new(4.0, 5.0, 6.0);
        node.attributes.push(NodeAttribute::new("lens", AttributeKind::Other(AttributeType::Camera)));
        node.attributes.push(NodeAttribute::new("dot", AttributeKind::Other(AttributeType::OpticalMarker)));
        node.attributes.push(NodeAttribute::new("fx", AttributeKind::Other(AttributeType::CachedEffect)));
        node.materials.push(material);
        scene.add_node(node, parent);

        let mut session = SceneSession::new();
        session.open_scene(scene);
        session.descend_to_first_child().unwrap();
        session.descend_to_first_child().unwrap();
        session
    }

    #[test]
    fn reports_transforms() {
        let session = session();
        let transform = session.global_transform().unwrap();
        assert_eq!(&transform[12..15], &[1.0, 12.0, 3.0]);
        assert_eq!(transform[0], 1.0);
        assert_eq!(session.geometric_translation().unwrap(), [4.0, 5.0, 6.0]);
    }

    #[test]
    fn maps_attribute_types() {
        let session = session();
        assert_eq!(session.attribute_count().unwrap(), 3);
        assert_eq!(session.attribute_name(0).unwrap(), "lens");
        assert_eq!(session.attribute_type(0).unwrap(), NodeAttributeType::Camera);
        assert_eq!(session.attribute_type(1).unwrap(), NodeAttributeType::Marker);
        assert_eq!(session.attribute_type(2).unwrap(), NodeAttributeType::Unknown);
    }

    #[test]
    fn every_sdk_code_maps_into_the_enum() {
        let codes = [
            AttributeType::Unknown,
            AttributeType::Null,
            AttributeType::Marker,
            AttributeType::Skeleton,
            AttributeType::Mesh,
            AttributeType::Nurbs,
            AttributeType::Patch,
            AttributeType::Camera,
            AttributeType::CameraStereo,
            AttributeType::CameraSwitcher,
            AttributeType::Light,
            AttributeType::OpticalReference,
            AttributeType::OpticalMarker,
            AttributeType::NurbsCurve,
            AttributeType::TrimNurbsSurface,
            AttributeType::Boundary,
            AttributeType::NurbsSurface,
            AttributeType::Shape,
            AttributeType::LodGroup,
            AttributeType::SubDiv,
            AttributeType::CachedEffect,
            AttributeType::Line,
        ];
        for code in codes {
            assert!(NodeAttributeType::ALL.contains(&NodeAttributeType::from(code)));
        }
    }

    #[test]
    fn names_match_reported_strings() {
        assert_eq!(NodeAttributeType::CameraSwitcher.to_string(), "camera switcher");
        assert_eq!(NodeAttributeType::LodGroup.as_str(), "lodgroup");
        assert_eq!(NodeAttributeType::TrimNurbsSurface.as_str(), "trim nurbs surface");
    }

    #[test]
    fn indices_are_bounds_checked() {
        let session = session();
        assert!(matches!(
            session.attribute_type(3),
            Err(SessionError::IndexOutOfBounds {
                kind: IndexKind::Attribute,
                index: 3,
                count: 3
            })
        ));
        assert_eq!(session.material_count().unwrap(), 1);
        assert_eq!(session.material_name(0).unwrap(), "paint");
        assert!(matches!(
            session.material_name(1),
            Err(SessionError::IndexOutOfBounds {
                kind: IndexKind::Material,
                ..
            })
        ));
    }

    #[test]
    fn closed_session_rejects_queries() {
        let session = SceneSession::new();
        assert!(matches!(session.name(), Err(SessionError::SessionClosed)));
        assert!(matches!(session.attribute_count(), Err(SessionError::SessionClosed)));
        assert!(matches!(session.material_name(0), Err(SessionError::SessionClosed)));
    }
}
