use std::ops::{Index, IndexMut};

use fbxwalk_transform::NodeTransform;
use glam::{DMat4, DVec3};

use crate::attribute::NodeAttribute;
use crate::material::SurfaceMaterial;
use crate::texture::Texture;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub usize);

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,

    pub attributes: Vec<NodeAttribute>,
    pub materials: Vec<MaterialId>,

    pub transform: NodeTransform,
    pub geometric_translation: DVec3,
    pub geometric_rotation: DVec3,
    pub geometric_scaling: DVec3,
}

impl Node {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            parent: None,
            children: Vec::new(),
            attributes: Vec::new(),
            materials: Vec::new(),
            transform: NodeTransform::default(),
            geometric_translation: DVec3::ZERO,
            geometric_rotation: DVec3::ZERO,
            geometric_scaling: DVec3::ONE,
        }
    }
}

/// Imported scene: an arena of nodes rooted at `RootNode`, plus the materials and
/// textures the nodes refer to.
#[derive(Debug, Clone)]
pub struct Scene {
    nodes: Vec<Node>,
    materials: Vec<SurfaceMaterial>,
    textures: Vec<Texture>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub const ROOT_NAME: &'static str = "RootNode";

    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(Self::ROOT_NAME)],
            materials: Vec::new(),
            textures: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub fn add_node(&mut self, node: Node, parent: NodeId) -> NodeId {
        let id = self.add_detached_node(node);
        self.attach(id, parent);
        id
    }

    /// Adds a node without a parent. It stays out of the tree until [`Scene::attach`] is called.
    pub fn add_detached_node(&mut self, mut node: Node) -> NodeId {
        node.parent = None;
        node.children.clear();
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Moves `child` under `parent`. Refuses links that would put a node under its own subtree.
    pub fn attach(&mut self, child: NodeId, parent: NodeId) -> bool {
        if child.0 >= self.nodes.len() || parent.0 >= self.nodes.len() || child == self.root() {
            return false;
        }

        let mut ancestor = Some(parent);
        while let Some(id) = ancestor {
            if id == child {
                log::warn!(
                    "Ignoring link of {:?} under {:?}, it would create a cycle",
                    self.nodes[child.0].name,
                    self.nodes[parent.0].name
                );
                return false;
            }
            ancestor = self.nodes[id.0].parent;
        }

        if let Some(previous) = self.nodes[child.0].parent {
            self.nodes[previous.0].children.retain(|&id| id != child);
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        true
    }

    pub fn add_material(&mut self, material: SurfaceMaterial) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    pub fn material(&self, id: MaterialId) -> Option<&SurfaceMaterial> {
        self.materials.get(id.0)
    }

    pub fn material_mut(&mut self, id: MaterialId) -> Option<&mut SurfaceMaterial> {
        self.materials.get_mut(id.0)
    }

    pub fn add_texture(&mut self, texture: Texture) -> TextureId {
        self.textures.push(texture);
        TextureId(self.textures.len() - 1)
    }

    pub fn texture(&self, id: TextureId) -> Option<&Texture> {
        self.textures.get(id.0)
    }

    /// Global transform of a node: the product of all local transforms from the root down.
    pub fn evaluate_global_transform(&self, id: NodeId) -> DMat4 {
        let mut global = DMat4::IDENTITY;
        let mut current = self.node(id);
        while let Some(node) = current {
            global = node.transform.get_matrix() * global;
            current = node.parent.and_then(|parent| self.node(parent));
        }
        global
    }
}

impl Index<NodeId> for Scene {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }
}

impl IndexMut<NodeId> for Scene {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }
}

impl Index<MaterialId> for Scene {
    type Output = SurfaceMaterial;

    fn index(&self, id: MaterialId) -> &SurfaceMaterial {
        &self.materials[id.0]
    }
}
