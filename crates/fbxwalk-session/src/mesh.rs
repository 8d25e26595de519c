use fbxwalk_sdk::{GeometryConverter, LayerElement, MappingMode, Mesh, NodeAttribute, ReferenceMode};
use glam::{DVec2, Vec2, Vec3};

use crate::accessor::NodeAttributeType;
use crate::buffer::reserve;
use crate::error::Result;
use crate::session::SceneSession;

/// How the UV half of each face corner is filled, decided once per mesh from UV channel 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UvIndexPolicy {
    /// Per-corner index stored on the mesh.
    PerCorner,
    /// `3 * triangle + corner`.
    Sequential,
    /// No usable channel, every corner reads UV 0.
    Zero,
}

impl UvIndexPolicy {
    pub fn from_channel(channel: Option<&LayerElement<DVec2>>) -> Self {
        match channel {
            Some(uv)
                if uv.mapping_mode == MappingMode::ByPolygonVertex
                    && matches!(uv.reference_mode, ReferenceMode::Index | ReferenceMode::IndexToDirect) =>
            {
                Self::PerCorner
            }
            Some(uv) if uv.reference_mode == ReferenceMode::Direct => Self::Sequential,
            _ => Self::Zero,
        }
    }

    fn uv_index(&self, mesh: &Mesh, triangle: usize, corner: usize) -> i32 {
        match self {
            Self::PerCorner => mesh.texture_uv_index(triangle, corner),
            Self::Sequential => (3 * triangle + corner) as i32,
            Self::Zero => 0,
        }
    }
}

/// Steps that derive polygon smoothing groups, applied in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmoothingRule {
    /// A smoothing layer exists and is not edge mapped: read it as is.
    UseExisting,
    /// No smoothing layer: derive edge smoothing from the normals.
    EdgesFromNormals,
    /// Edge mapped smoothing: convert it to polygon groups.
    PolygonsFromEdges,
}

impl SmoothingRule {
    /// Rules needed to bring `mesh` to polygon smoothing.
    pub fn plan(mesh: &Mesh) -> Vec<Self> {
        match mesh.element_smoothing(0).map(|element| element.mapping_mode) {
            None => vec![Self::EdgesFromNormals, Self::PolygonsFromEdges],
            Some(MappingMode::ByEdge) => vec![Self::PolygonsFromEdges],
            Some(_) => vec![Self::UseExisting],
        }
    }

    fn apply(&self, converter: &GeometryConverter, mesh: &mut Mesh) -> bool {
        match self {
            Self::UseExisting => true,
            Self::EdgesFromNormals => converter.compute_edge_smoothing_from_normals(mesh),
            Self::PolygonsFromEdges => converter.compute_polygon_smoothing_from_edge_smoothing(mesh),
        }
    }
}

impl SceneSession {
    /// Mesh of attribute `index`, `None` when the attribute is of another type.
    fn mesh(&self, index: usize) -> Result<Option<&Mesh>> {
        Ok(self.attribute(index)?.mesh())
    }

    pub fn is_triangle_mesh(&self, index: usize) -> Result<bool> {
        Ok(self.mesh(index)?.is_some_and(Mesh::is_triangle_mesh))
    }

    /// Converts a mesh, patch or NURBS attribute into a triangle mesh in place.
    ///
    /// Conversion failures are logged, the attribute is then left as it was.
    pub fn triangulate(&mut self, index: usize) -> Result<()> {
        puffin::profile_function!();

        let attribute_type = self.attribute_type(index)?;
        if !attribute_type.is_triangulatable() {
            log::debug!("Not triangulating {} attribute {}", attribute_type, index);
            return Ok(());
        }

        let (node, converter) = self.live_mut()?.current_node_with_converter();
        let attribute: &mut NodeAttribute = &mut node.attributes[index];
        if !converter.triangulate(attribute) {
            log::warn!("Failed to triangulate {} {:?}", attribute_type, attribute.name);
        }
        Ok(())
    }

    /// Control points as `x, y, z` triples.
    pub fn vertices(&self, index: usize) -> Result<Option<Vec<f32>>> {
        let Some(mesh) = self.mesh(index)? else {
            return Ok(None);
        };

        let points: Vec<Vec3> = mesh.control_points().iter().map(|p| p.as_vec3()).collect();
        let mut vertices: Vec<f32> = reserve("vertices", 3 * points.len())?;
        vertices.extend_from_slice(bytemuck::cast_slice(&points));
        Ok(Some(vertices))
    }

    /// UV channel 0 as `u, 1 - v` pairs, one per entry of its direct array.
    pub fn tex_coords(&self, index: usize) -> Result<Option<Vec<f32>>> {
        let Some(uv) = self.mesh(index)?.and_then(|mesh| mesh.element_uv(0)) else {
            return Ok(None);
        };

        let flipped: Vec<Vec2> = uv
            .direct
            .iter()
            .map(|uv| Vec2::new(uv.x as f32, (1.0 - uv.y) as f32))
            .collect();
        let mut tex_coords: Vec<f32> = reserve("tex_coords", 2 * flipped.len())?;
        tex_coords.extend_from_slice(bytemuck::cast_slice(&flipped));
        Ok(Some(tex_coords))
    }

    /// Three `(vertex, uv)` index pairs per polygon, which is expected to be a triangle.
    pub fn faces(&self, index: usize) -> Result<Option<Vec<i32>>> {
        puffin::profile_function!();

        let Some(mesh) = self.mesh(index)? else {
            return Ok(None);
        };

        let policy = UvIndexPolicy::from_channel(mesh.element_uv(0));
        log::debug!("Face uv index policy {:?}", policy);

        let polygon_count = mesh.polygon_count();
        let mut faces = reserve("faces", 6 * polygon_count)?;
        for triangle in 0..polygon_count {
            let size = mesh.polygon_size(triangle).unwrap_or(0);
            for corner in 0..3 {
                // Short polygons repeat their last corner.
                let vertex = mesh
                    .polygon_vertex(triangle, corner.min(size.saturating_sub(1)))
                    .unwrap_or(0);
                faces.push(vertex);
                faces.push(policy.uv_index(mesh, triangle, corner));
            }
        }
        Ok(Some(faces))
    }

    /// One smoothing group per polygon, derived and stored on the mesh when missing.
    pub fn face_smoothing_groups(&mut self, index: usize) -> Result<Option<Vec<i32>>> {
        puffin::profile_function!();

        if self.mesh(index)?.is_none() {
            return Ok(None);
        }

        let (node, converter) = self.live_mut()?.current_node_with_converter();
        let Some(mesh) = node.attributes[index].mesh_mut() else {
            return Ok(None);
        };

        for rule in SmoothingRule::plan(mesh) {
            log::debug!("Smoothing rule {:?}", rule);
            if !rule.apply(converter, mesh) {
                log::warn!("Smoothing rule {:?} failed", rule);
                break;
            }
        }

        let polygon_count = mesh.polygon_count();
        let mut groups = reserve("face_smoothing_groups", polygon_count)?;
        let smoothing = mesh.element_smoothing(0);
        groups.extend((0..polygon_count).map(|polygon| {
            smoothing
                .and_then(|element| element.value(polygon))
                .unwrap_or(0)
        }));
        Ok(Some(groups))
    }
}
