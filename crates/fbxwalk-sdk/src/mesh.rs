use std::collections::HashMap;

use glam::{DVec2, DVec3};

use crate::layer::{LayerElement, MappingMode, ReferenceMode};

/// Undirected edges of a mesh, numbered in the order the polygons first walk them.
#[derive(Debug, Clone, Default)]
pub struct EdgeTable {
    /// Control point pair of every edge, smaller index first.
    pub edges: Vec<(i32, i32)>,
    /// Edge leaving each polygon vertex towards the next corner of its polygon.
    pub corner_edges: Vec<usize>,
}

impl EdgeTable {
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

/// Polygonal geometry: control points plus polygons indexing them, and the layer
/// elements carrying per-surface data.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    control_points: Vec<DVec3>,
    polygon_vertices: Vec<i32>,
    polygon_offsets: Vec<usize>,

    uv_elements: Vec<LayerElement<DVec2>>,
    normal_elements: Vec<LayerElement<DVec3>>,
    smoothing_elements: Vec<LayerElement<i32>>,
}

impl Mesh {
    pub fn new(control_points: Vec<DVec3>) -> Self {
        Self {
            control_points,
            polygon_vertices: Vec::new(),
            polygon_offsets: vec![0],
            ..Default::default()
        }
    }

    /// Decodes the file layout where the last corner of every polygon is stored as `!index`.
    pub fn from_polygon_vertex_index(
        control_points: Vec<DVec3>,
        polygon_vertex_index: &[i32],
    ) -> Result<Self, String> {
        let mut mesh = Self::new(control_points);
        let mut polygon = Vec::new();

        for &raw in polygon_vertex_index {
            let (index, closes) = if raw < 0 { (!raw, true) } else { (raw, false) };
            if index as usize >= mesh.control_points.len() {
                return Err(format!(
                    "polygon vertex {} references control point {} of {}",
                    mesh.polygon_vertices.len() + polygon.len(),
                    index,
                    mesh.control_points.len()
                ));
            }

            polygon.push(index);
            if closes {
                mesh.add_polygon(&polygon);
                polygon.clear();
            }
        }

        if !polygon.is_empty() {
            log::warn!(
                "Closing unterminated polygon with {} vertices at end of index array",
                polygon.len()
            );
            mesh.add_polygon(&polygon);
        }

        Ok(mesh)
    }

    pub fn add_polygon(&mut self, vertices: &[i32]) {
        if self.polygon_offsets.is_empty() {
            self.polygon_offsets.push(0);
        }
        self.polygon_vertices.extend_from_slice(vertices);
        self.polygon_offsets.push(self.polygon_vertices.len());
    }

    pub fn control_points(&self) -> &[DVec3] {
        &self.control_points
    }

    pub fn control_points_count(&self) -> usize {
        self.control_points.len()
    }

    pub fn polygon_count(&self) -> usize {
        self.polygon_offsets.len().saturating_sub(1)
    }

    pub fn polygon_vertex_count(&self) -> usize {
        self.polygon_vertices.len()
    }

    /// Flat control point indices of all polygons.
    pub fn polygon_vertices(&self) -> &[i32] {
        &self.polygon_vertices
    }

    pub fn polygon_size(&self, polygon: usize) -> Option<usize> {
        let start = *self.polygon_offsets.get(polygon)?;
        let end = *self.polygon_offsets.get(polygon + 1)?;
        Some(end - start)
    }

    /// Offset of the first corner of `polygon` in [`Mesh::polygon_vertices`].
    pub fn polygon_vertex_index(&self, polygon: usize) -> Option<usize> {
        if polygon < self.polygon_count() {
            Some(self.polygon_offsets[polygon])
        } else {
            None
        }
    }

    pub fn polygon_vertex(&self, polygon: usize, corner: usize) -> Option<i32> {
        if corner >= self.polygon_size(polygon)? {
            return None;
        }
        Some(self.polygon_vertices[self.polygon_offsets[polygon] + corner])
    }

    pub fn is_triangle_mesh(&self) -> bool {
        (0..self.polygon_count()).all(|polygon| self.polygon_size(polygon) == Some(3))
    }

    /// UV index of a polygon corner, or `-1` when the first UV channel is not mapped per polygon vertex.
    pub fn texture_uv_index(&self, polygon: usize, corner: usize) -> i32 {
        let Some(element) = self.element_uv(0) else {
            return -1;
        };
        if element.mapping_mode != MappingMode::ByPolygonVertex {
            return -1;
        }
        let Some(start) = self.polygon_vertex_index(polygon) else {
            return -1;
        };
        if self.polygon_size(polygon).map_or(true, |size| corner >= size) {
            return -1;
        }

        let polygon_vertex = start + corner;
        match element.reference_mode {
            ReferenceMode::Direct => polygon_vertex as i32,
            ReferenceMode::Index | ReferenceMode::IndexToDirect => {
                element.index.get(polygon_vertex).copied().unwrap_or(-1)
            }
        }
    }

    pub fn edges(&self) -> EdgeTable {
        let mut table = EdgeTable::default();
        let mut lookup = HashMap::new();

        for polygon in 0..self.polygon_count() {
            let start = self.polygon_offsets[polygon];
            let size = self.polygon_offsets[polygon + 1] - start;
            for corner in 0..size {
                let a = self.polygon_vertices[start + corner];
                let b = self.polygon_vertices[start + (corner + 1) % size];
                let key = (a.min(b), a.max(b));
                let edge = *lookup.entry(key).or_insert_with(|| {
                    table.edges.push(key);
                    table.edges.len() - 1
                });
                table.corner_edges.push(edge);
            }
        }

        table
    }

    pub fn element_uv_count(&self) -> usize {
        self.uv_elements.len()
    }

    pub fn element_uv(&self, index: usize) -> Option<&LayerElement<DVec2>> {
        self.uv_elements.get(index)
    }

    pub fn add_element_uv(&mut self, element: LayerElement<DVec2>) {
        self.uv_elements.push(element);
    }

    pub fn element_normal(&self, index: usize) -> Option<&LayerElement<DVec3>> {
        self.normal_elements.get(index)
    }

    pub fn add_element_normal(&mut self, element: LayerElement<DVec3>) {
        self.normal_elements.push(element);
    }

    pub fn element_smoothing(&self, index: usize) -> Option<&LayerElement<i32>> {
        self.smoothing_elements.get(index)
    }

    pub fn add_element_smoothing(&mut self, element: LayerElement<i32>) {
        self.smoothing_elements.push(element);
    }

    /// Replaces smoothing element `index`, appending when it does not exist yet.
    pub fn set_element_smoothing(&mut self, index: usize, element: LayerElement<i32>) {
        match self.smoothing_elements.get_mut(index) {
            Some(existing) => *existing = element,
            None => self.smoothing_elements.push(element),
        }
    }

    /// Same mesh with a new polygon list, carrying every layer element that can follow.
    pub(crate) fn with_polygons(
        &self,
        polygons: &[Vec<i32>],
        polygon_vertex_map: &[usize],
        polygon_map: &[usize],
    ) -> Self {
        let mut mesh = Self::new(self.control_points.clone());
        for polygon in polygons {
            mesh.add_polygon(polygon);
        }

        mesh.uv_elements = self
            .uv_elements
            .iter()
            .filter_map(|element| element.remapped(polygon_vertex_map, polygon_map))
            .collect();
        mesh.normal_elements = self
            .normal_elements
            .iter()
            .filter_map(|element| element.remapped(polygon_vertex_map, polygon_map))
            .collect();
        mesh.smoothing_elements = self
            .smoothing_elements
            .iter()
            .filter_map(|element| element.remapped(polygon_vertex_map, polygon_map))
            .collect();

        mesh
    }
}
