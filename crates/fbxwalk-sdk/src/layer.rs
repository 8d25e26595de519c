/// How the entries of a layer element are associated with the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MappingMode {
    #[default]
    None,
    ByControlPoint,
    ByPolygonVertex,
    ByPolygon,
    ByEdge,
    AllSame,
}

impl MappingMode {
    pub fn from_fbx(name: &str) -> Self {
        match name {
            "ByControlPoint" | "ByVertice" | "ByVertex" => Self::ByControlPoint,
            "ByPolygonVertex" => Self::ByPolygonVertex,
            "ByPolygon" => Self::ByPolygon,
            "ByEdge" => Self::ByEdge,
            "AllSame" => Self::AllSame,
            _ => Self::None,
        }
    }
}

/// How the mapped entries reach the direct array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferenceMode {
    #[default]
    Direct,
    Index,
    IndexToDirect,
}

impl ReferenceMode {
    pub fn from_fbx(name: &str) -> Self {
        match name {
            "Index" => Self::Index,
            "IndexToDirect" => Self::IndexToDirect,
            _ => Self::Direct,
        }
    }
}

/// A per-surface data channel (UVs, normals, smoothing, ...).
///
/// With [`ReferenceMode::Direct`] the n-th mapped element reads `direct[n]`,
/// otherwise it reads `direct[index[n]]`.
#[derive(Debug, Clone, Default)]
pub struct LayerElement<T> {
    pub name: String,
    pub mapping_mode: MappingMode,
    pub reference_mode: ReferenceMode,
    pub direct: Vec<T>,
    pub index: Vec<i32>,
}

impl<T: Copy + Default> LayerElement<T> {
    pub fn new(name: &str, mapping_mode: MappingMode, reference_mode: ReferenceMode) -> Self {
        Self {
            name: name.to_owned(),
            mapping_mode,
            reference_mode,
            direct: Vec::new(),
            index: Vec::new(),
        }
    }

    pub fn is_indexed(&self) -> bool {
        self.reference_mode != ReferenceMode::Direct
    }

    /// Slot in the direct array that the mapped element `element` refers to.
    pub fn direct_index(&self, element: usize) -> Option<usize> {
        let element = if self.mapping_mode == MappingMode::AllSame {
            0
        } else {
            element
        };

        if self.is_indexed() {
            self.index
                .get(element)
                .and_then(|&index| usize::try_from(index).ok())
        } else {
            Some(element)
        }
    }

    pub fn value(&self, element: usize) -> Option<T> {
        self.direct_index(element)
            .and_then(|index| self.direct.get(index).copied())
    }

    /// Value seen by one polygon corner. Edge-mapped elements cannot be read per corner.
    pub fn value_at_corner(
        &self,
        polygon: usize,
        polygon_vertex: usize,
        control_point: usize,
    ) -> Option<T> {
        let element = match self.mapping_mode {
            MappingMode::ByControlPoint => control_point,
            MappingMode::ByPolygonVertex => polygon_vertex,
            MappingMode::ByPolygon => polygon,
            MappingMode::AllSame => 0,
            MappingMode::ByEdge | MappingMode::None => return None,
        };
        self.value(element)
    }

    /// Rebuilds the element for a new polygon layout.
    ///
    /// `polygon_vertex_map[k]` and `polygon_map[k]` name the old polygon vertex and the
    /// old polygon that new element `k` came from. Edge-mapped elements cannot follow a
    /// topology change and yield `None`.
    pub fn remapped(&self, polygon_vertex_map: &[usize], polygon_map: &[usize]) -> Option<Self> {
        let map = match self.mapping_mode {
            MappingMode::ByPolygonVertex => polygon_vertex_map,
            MappingMode::ByPolygon => polygon_map,
            MappingMode::ByEdge => return None,
            MappingMode::ByControlPoint | MappingMode::AllSame | MappingMode::None => {
                return Some(self.clone())
            }
        };

        let mut remapped = Self::new(&self.name, self.mapping_mode, self.reference_mode);
        if self.is_indexed() {
            remapped.direct = self.direct.clone();
            remapped.index = map
                .iter()
                .map(|&old| self.index.get(old).copied().unwrap_or(-1))
                .collect();
        } else {
            remapped.direct = map
                .iter()
                .map(|&old| self.direct.get(old).copied().unwrap_or_default())
                .collect();
        }
        Some(remapped)
    }
}
