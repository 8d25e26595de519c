use std::collections::HashMap;

use glam::{DVec2, DVec3};

use crate::attribute::{AttributeKind, NodeAttribute};
use crate::layer::{LayerElement, MappingMode, ReferenceMode};
use crate::mesh::Mesh;
use crate::surface::SurfaceGrid;

const NORMAL_EPSILON: f64 = 1e-6;

/// Topology and layer conversions applied to imported geometry.
#[derive(Debug, Default)]
pub struct GeometryConverter;

impl GeometryConverter {
    pub fn new() -> Self {
        Self
    }

    /// Replaces a mesh, NURBS surface or patch attribute by an all-triangle mesh.
    ///
    /// Returns `false` when the attribute cannot be triangulated, leaving it untouched.
    pub fn triangulate(&self, attribute: &mut NodeAttribute) -> bool {
        puffin::profile_function!();

        let mesh = match &mut attribute.kind {
            AttributeKind::Mesh(mesh) => {
                if mesh.is_triangle_mesh() {
                    return true;
                }
                self.triangulate_mesh(mesh)
            }
            AttributeKind::NurbsSurface(surface) => match surface.tessellate() {
                Ok(grid) => grid_mesh(&grid),
                Err(err) => {
                    log::warn!("Failed to tessellate NURBS surface {:?}: {}", attribute.name, err);
                    return false;
                }
            },
            AttributeKind::Patch(patch) => match patch.tessellate() {
                Ok(grid) => grid_mesh(&grid),
                Err(err) => {
                    log::warn!("Failed to tessellate patch {:?}: {}", attribute.name, err);
                    return false;
                }
            },
            AttributeKind::Nurbs | AttributeKind::Other(_) => return false,
        };

        attribute.kind = AttributeKind::Mesh(mesh);
        true
    }

    fn triangulate_mesh(&self, mesh: &mut Mesh) -> Mesh {
        // Edge smoothing cannot follow new edges, so carry it over as polygon smoothing.
        if mesh
            .element_smoothing(0)
            .is_some_and(|element| element.mapping_mode == MappingMode::ByEdge)
        {
            self.compute_polygon_smoothing_from_edge_smoothing(mesh);
        }

        let mut triangles = Vec::new();
        let mut polygon_vertex_map = Vec::new();
        let mut polygon_map = Vec::new();

        for polygon in 0..mesh.polygon_count() {
            let (Some(start), Some(size)) =
                (mesh.polygon_vertex_index(polygon), mesh.polygon_size(polygon))
            else {
                continue;
            };
            if size < 3 {
                log::warn!("Dropping degenerate polygon {} with {} vertices", polygon, size);
                continue;
            }

            let corners = &mesh.polygon_vertices()[start..start + size];
            for i in 1..size - 1 {
                triangles.push(vec![corners[0], corners[i], corners[i + 1]]);
                polygon_vertex_map.extend_from_slice(&[start, start + i, start + i + 1]);
                polygon_map.push(polygon);
            }
        }

        mesh.with_polygons(&triangles, &polygon_vertex_map, &polygon_map)
    }

    /// Writes one smoothing flag per edge into smoothing element 0.
    ///
    /// An edge is smooth when all polygons sharing it agree on the normal at both of its
    /// endpoints. Without a normal element every edge is smooth.
    pub fn compute_edge_smoothing_from_normals(&self, mesh: &mut Mesh) -> bool {
        puffin::profile_function!();

        let table = mesh.edges();
        let mut smooth = vec![1; table.edge_count()];

        if let Some(normals) = mesh.element_normal(0) {
            // First normal seen at each (edge, control point) pair.
            let mut seen: HashMap<(usize, i32), DVec3> = HashMap::new();

            for polygon in 0..mesh.polygon_count() {
                let (Some(start), Some(size)) =
                    (mesh.polygon_vertex_index(polygon), mesh.polygon_size(polygon))
                else {
                    continue;
                };

                for corner in 0..size {
                    let edge = table.corner_edges[start + corner];
                    let ends = [start + corner, start + (corner + 1) % size];
                    for polygon_vertex in ends {
                        let control_point = mesh.polygon_vertices()[polygon_vertex];
                        let Some(normal) = normals.value_at_corner(
                            polygon,
                            polygon_vertex,
                            control_point as usize,
                        ) else {
                            continue;
                        };

                        let first = *seen.entry((edge, control_point)).or_insert(normal);
                        if first.distance(normal) > NORMAL_EPSILON {
                            smooth[edge] = 0;
                        }
                    }
                }
            }
        } else {
            log::debug!("No normals, treating every edge as smooth");
        }

        let mut element = LayerElement::new("", MappingMode::ByEdge, ReferenceMode::Direct);
        element.direct = smooth;
        mesh.set_element_smoothing(0, element);
        true
    }

    /// Converts edge smoothing in element 0 into per-polygon smoothing group masks.
    ///
    /// Polygons joined by smooth edges share a group. Every group gets a single bit, chosen
    /// so that groups meeting at a hard edge never share one.
    pub fn compute_polygon_smoothing_from_edge_smoothing(&self, mesh: &mut Mesh) -> bool {
        puffin::profile_function!();

        let Some(edge_smoothing) = mesh
            .element_smoothing(0)
            .filter(|element| element.mapping_mode == MappingMode::ByEdge)
        else {
            return false;
        };

        let table = mesh.edges();
        let polygon_count = mesh.polygon_count();

        let mut edge_polygons = vec![Vec::new(); table.edge_count()];
        for polygon in 0..polygon_count {
            let (Some(start), Some(size)) =
                (mesh.polygon_vertex_index(polygon), mesh.polygon_size(polygon))
            else {
                continue;
            };
            for corner in 0..size {
                edge_polygons[table.corner_edges[start + corner]].push(polygon);
            }
        }

        let mut groups = UnionFind::new(polygon_count);
        let mut hard = Vec::new();
        for (edge, polygons) in edge_polygons.iter().enumerate() {
            let is_smooth = edge_smoothing.value(edge).unwrap_or(1) != 0;
            for pair in polygons.windows(2) {
                if is_smooth {
                    groups.union(pair[0], pair[1]);
                } else {
                    hard.push((pair[0], pair[1]));
                }
            }
        }

        let mut neighbours: HashMap<usize, Vec<usize>> = HashMap::new();
        for (a, b) in hard {
            let (a, b) = (groups.find(a), groups.find(b));
            if a != b {
                neighbours.entry(a).or_default().push(b);
                neighbours.entry(b).or_default().push(a);
            }
        }

        let mut masks: HashMap<usize, i32> = HashMap::new();
        let mut polygon_masks = Vec::with_capacity(polygon_count);
        for polygon in 0..polygon_count {
            let group = groups.find(polygon);
            if let Some(&mask) = masks.get(&group) {
                polygon_masks.push(mask);
                continue;
            }

            let taken = neighbours
                .get(&group)
                .into_iter()
                .flatten()
                .filter_map(|neighbour| masks.get(neighbour))
                .fold(0, |taken, mask| taken | mask);
            let bit = (0..32).find(|bit| taken & (1 << bit) == 0).unwrap_or(0);
            masks.insert(group, 1 << bit);
            polygon_masks.push(1 << bit);
        }

        let mut element = LayerElement::new("", MappingMode::ByPolygon, ReferenceMode::Direct);
        element.direct = polygon_masks;
        mesh.set_element_smoothing(0, element);
        true
    }
}

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, mut item: usize) -> usize {
        while self.parent[item] != item {
            self.parent[item] = self.parent[self.parent[item]];
            item = self.parent[item];
        }
        item
    }

    fn union(&mut self, a: usize, b: usize) {
        let (a, b) = (self.find(a), self.find(b));
        if a != b {
            self.parent[b.max(a)] = a.min(b);
        }
    }
}

/// Two triangles per grid cell, with a per-corner UV channel holding the surface parameters.
fn grid_mesh(grid: &SurfaceGrid) -> Mesh {
    let mut mesh = Mesh::new(grid.positions.clone());
    let mut uv = LayerElement::<DVec2>::new(
        "",
        MappingMode::ByPolygonVertex,
        ReferenceMode::IndexToDirect,
    );
    uv.direct = grid.parameters.clone();

    for row in 0..grid.rows.saturating_sub(1) {
        for column in 0..grid.columns.saturating_sub(1) {
            let a = (row * grid.columns + column) as i32;
            let b = a + 1;
            let c = a + grid.columns as i32;
            let d = c + 1;
            for triangle in [[a, b, d], [a, d, c]] {
                mesh.add_polygon(&triangle);
                uv.index.extend_from_slice(&triangle);
            }
        }
    }

    mesh.add_element_uv(uv);
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{NurbsSurface, Patch, PatchType};
    use glam::DVec4;

    fn two_quads() -> Mesh {
        // Two unit quads sharing the edge 1-4, folded along it.
        let mut mesh = Mesh::new(vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(2.0, 0.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
            DVec3::new(1.0, 1.0, 0.0),
            DVec3::new(2.0, 1.0, 1.0),
        ]);
        mesh.add_polygon(&[0, 1, 4, 3]);
        mesh.add_polygon(&[1, 2, 5, 4]);
        mesh
    }

    fn per_corner_normals(mesh: &mut Mesh, first: DVec3, second: DVec3) {
        let mut normals =
            LayerElement::new("", MappingMode::ByPolygonVertex, ReferenceMode::Direct);
        normals.direct = vec![first, first, first, first, second, second, second, second];
        mesh.add_element_normal(normals);
    }

    #[test]
    fn fan_triangulation_remaps_layers() {
        let mut mesh = two_quads();
        let mut uv = LayerElement::new("", MappingMode::ByPolygonVertex, ReferenceMode::IndexToDirect);
        uv.direct = vec![DVec2::ZERO; 8];
        uv.index = (0..8).collect();
        mesh.add_element_uv(uv);

        let mut attribute = NodeAttribute::new("quads", AttributeKind::Mesh(mesh));
        let converter = GeometryConverter::new();
        assert!(converter.triangulate(&mut attribute));

        let mesh = attribute.mesh().unwrap();
        assert!(mesh.is_triangle_mesh());
        assert_eq!(mesh.polygon_count(), 4);
        assert_eq!(mesh.polygon_vertices()[..6], [0, 1, 4, 0, 4, 3]);
        assert_eq!(mesh.element_uv(0).unwrap().index[..6], [0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.texture_uv_index(3, 2), 7);

        // Already triangulated.
        assert!(converter.triangulate(&mut attribute));
        assert_eq!(attribute.mesh().unwrap().polygon_count(), 4);
    }

    #[test]
    fn edge_smoothing_without_normals_is_all_smooth() {
        let mut mesh = two_quads();
        assert!(GeometryConverter::new().compute_edge_smoothing_from_normals(&mut mesh));

        let smoothing = mesh.element_smoothing(0).unwrap();
        assert_eq!(smoothing.mapping_mode, MappingMode::ByEdge);
        assert_eq!(smoothing.direct.len(), mesh.edges().edge_count());
        assert!(smoothing.direct.iter().all(|&flag| flag == 1));
    }

    #[test]
    fn differing_normals_split_smoothing_groups() {
        let converter = GeometryConverter::new();

        let mut flat = two_quads();
        per_corner_normals(&mut flat, DVec3::Z, DVec3::Z);
        converter.compute_edge_smoothing_from_normals(&mut flat);
        converter.compute_polygon_smoothing_from_edge_smoothing(&mut flat);
        let groups = &flat.element_smoothing(0).unwrap().direct;
        assert_eq!(groups, &vec![1, 1]);

        let mut folded = two_quads();
        per_corner_normals(&mut folded, DVec3::Z, DVec3::X);
        converter.compute_edge_smoothing_from_normals(&mut folded);
        converter.compute_polygon_smoothing_from_edge_smoothing(&mut folded);
        let smoothing = folded.element_smoothing(0).unwrap();
        assert_eq!(smoothing.mapping_mode, MappingMode::ByPolygon);
        assert_eq!(smoothing.direct, vec![1, 2]);
    }

    #[test]
    fn polygon_smoothing_needs_edge_layer() {
        let mut mesh = two_quads();
        assert!(!GeometryConverter::new().compute_polygon_smoothing_from_edge_smoothing(&mut mesh));
    }

    #[test]
    fn triangulation_keeps_edge_smoothing_as_groups() {
        let converter = GeometryConverter::new();
        let mut mesh = two_quads();
        per_corner_normals(&mut mesh, DVec3::Z, DVec3::X);
        converter.compute_edge_smoothing_from_normals(&mut mesh);

        let mut attribute = NodeAttribute::new("folded", AttributeKind::Mesh(mesh));
        assert!(converter.triangulate(&mut attribute));
        let smoothing = attribute.mesh().unwrap().element_smoothing(0).unwrap();
        assert_eq!(smoothing.mapping_mode, MappingMode::ByPolygon);
        assert_eq!(smoothing.direct, vec![1, 1, 2, 2]);
    }

    #[test]
    fn surfaces_become_meshes() {
        let converter = GeometryConverter::new();

        let surface = NurbsSurface {
            order_u: 2,
            order_v: 2,
            count_u: 2,
            count_v: 2,
            step_u: 1,
            step_v: 1,
            control_points: vec![
                DVec4::new(0.0, 0.0, 0.0, 1.0),
                DVec4::new(1.0, 0.0, 0.0, 1.0),
                DVec4::new(0.0, 1.0, 0.0, 1.0),
                DVec4::new(1.0, 1.0, 0.0, 1.0),
            ],
            knots_u: NurbsSurface::clamped_knots(2, 2),
            knots_v: NurbsSurface::clamped_knots(2, 2),
        };
        let mut attribute = NodeAttribute::new("surface", AttributeKind::NurbsSurface(surface));
        assert!(converter.triangulate(&mut attribute));
        let mesh = attribute.mesh().unwrap();
        assert_eq!(mesh.polygon_count(), 2);
        assert_eq!(mesh.control_points_count(), 4);
        assert_eq!(mesh.texture_uv_index(1, 1), 3);

        let patch = Patch {
            patch_type: PatchType::Linear,
            count_u: 3,
            count_v: 2,
            control_points: vec![DVec3::ZERO; 6],
        };
        let mut attribute = NodeAttribute::new("patch", AttributeKind::Patch(patch));
        assert!(converter.triangulate(&mut attribute));
        assert_eq!(attribute.mesh().unwrap().polygon_count(), 4);
    }

    #[test]
    fn other_attributes_are_not_triangulated() {
        let mut attribute = NodeAttribute::new(
            "light",
            AttributeKind::Other(crate::attribute::AttributeType::Light),
        );
        assert!(!GeometryConverter::new().triangulate(&mut attribute));

        let mut attribute = NodeAttribute::new("legacy", AttributeKind::Nurbs);
        assert!(!GeometryConverter::new().triangulate(&mut attribute));
        assert!(matches!(attribute.kind, AttributeKind::Nurbs));
    }
}
