use std::collections::HashMap;
use std::path::{Path, PathBuf};

use fbxwalk_session::{IoSettings, SceneSession, SPECULAR_POWER_UNSUPPORTED};
use glam::{DMat4, DVec3, Vec2, Vec3, Vec4};

use crate::error::LoadError;

#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    /// Triangulate geometry that is not a triangle mesh yet.
    pub triangulate: bool,
    /// Load every material color with alpha 1.
    pub force_opaque: bool,
    pub settings: IoSettings,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            triangulate: true,
            force_opaque: true,
            settings: IoSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedMaterial {
    pub name: String,

    pub diffuse_color: Option<Vec4>,
    pub specular_color: Option<Vec4>,
    pub specular_power: Option<f32>,

    pub diffuse_map: Option<PathBuf>,
    pub specular_map: Option<PathBuf>,
    pub bump_map: Option<PathBuf>,
    pub self_illumination_map: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct LoadedMesh {
    pub node_name: String,
    pub attribute_name: String,

    pub transform: DMat4,
    pub geometric_translation: DVec3,

    pub vertices: Vec<Vec3>,
    pub tex_coords: Vec<Vec2>,
    /// `(vertex, uv)` index pairs, three per triangle.
    pub faces: Vec<[i32; 2]>,
    pub smoothing_groups: Vec<i32>,

    /// Index into [`LoadedScene::materials`].
    pub material: Option<usize>,
}

impl LoadedMesh {
    pub fn triangle_count(&self) -> usize {
        self.faces.len() / 3
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoadedScene {
    pub meshes: Vec<LoadedMesh>,
    pub materials: Vec<LoadedMaterial>,
}

/// Opens `path` and collects every piece of geometry in the node tree, depth first.
pub fn load(path: impl AsRef<Path>, options: &LoadOptions) -> Result<LoadedScene, LoadError> {
    puffin::profile_function!();

    let path = path.as_ref();
    let mut session = SceneSession::new();
    session.open_with_settings(path, options.settings)?;

    let mut loader = Loader {
        options,
        scene: LoadedScene::default(),
        material_cache: HashMap::new(),
    };
    loader.walk(&mut session)?;
    session.close();

    log::info!(
        "Loaded {} meshes and {} materials from {}",
        loader.scene.meshes.len(),
        loader.scene.materials.len(),
        path.display()
    );
    Ok(loader.scene)
}

struct Loader<'a> {
    options: &'a LoadOptions,
    scene: LoadedScene,
    material_cache: HashMap<String, usize>,
}

impl Loader<'_> {
    fn walk(&mut self, session: &mut SceneSession) -> Result<(), LoadError> {
        puffin::profile_function!();

        let mut depth = 0usize;
        loop {
            self.visit(session)?;

            if session.descend_to_first_child()? {
                depth += 1;
                continue;
            }

            loop {
                if depth == 0 {
                    return Ok(());
                }
                if session.advance_to_next_sibling()? {
                    break;
                }
                session.ascend_to_parent()?;
                depth -= 1;
            }
        }
    }

    fn visit(&mut self, session: &mut SceneSession) -> Result<(), LoadError> {
        let mut geometry = Vec::new();
        for index in 0..session.attribute_count()? {
            if session.attribute_type(index)?.is_triangulatable() {
                geometry.push(index);
            }
        }
        if geometry.is_empty() {
            return Ok(());
        }

        let material = if session.material_count()? > 0 {
            Some(self.material(session, 0)?)
        } else {
            None
        };

        for index in geometry {
            if let Some(mesh) = self.mesh(session, index, material)? {
                self.scene.meshes.push(mesh);
            }
        }
        Ok(())
    }

    fn material(&mut self, session: &SceneSession, index: usize) -> Result<usize, LoadError> {
        let name = session.material_name(index)?;
        if let Some(&cached) = self.material_cache.get(&name) {
            return Ok(cached);
        }

        let color = |rgba: [f64; 4]| {
            let color = Vec4::from_array(rgba.map(|c| c as f32));
            if self.options.force_opaque {
                color.truncate().extend(1.0)
            } else {
                color
            }
        };
        let specular_power = session.specular_power(index)?;

        let material = LoadedMaterial {
            name: name.clone(),
            diffuse_color: session.diffuse_color(index)?.map(color),
            specular_color: session.specular_color(index)?.map(color),
            specular_power: (specular_power != SPECULAR_POWER_UNSUPPORTED).then_some(specular_power as f32),
            diffuse_map: session.diffuse_map(index)?,
            specular_map: session.specular_map(index)?,
            bump_map: session.bump_map(index)?,
            self_illumination_map: session.self_illumination_map(index)?,
        };

        log::debug!("Loaded material {:?}", name);
        self.scene.materials.push(material);
        let id = self.scene.materials.len() - 1;
        self.material_cache.insert(name, id);
        Ok(id)
    }

    fn mesh(
        &mut self,
        session: &mut SceneSession,
        index: usize,
        material: Option<usize>,
    ) -> Result<Option<LoadedMesh>, LoadError> {
        if self.options.triangulate && !session.is_triangle_mesh(index)? {
            session.triangulate(index)?;
        }

        let attribute_name = session.attribute_name(index)?;
        let (Some(vertices), Some(faces)) = (session.vertices(index)?, session.faces(index)?) else {
            log::warn!("Skipping {:?}, it has no mesh data", attribute_name);
            return Ok(None);
        };
        let tex_coords = session.tex_coords(index)?.unwrap_or_else(|| vec![0.0, 0.0]);
        let smoothing_groups = session.face_smoothing_groups(index)?.unwrap_or_default();

        Ok(Some(LoadedMesh {
            node_name: session.name()?,
            attribute_name,
            transform: DMat4::from_cols_array(&session.global_transform()?),
            geometric_translation: DVec3::from_array(session.geometric_translation()?),
            vertices: vertices.chunks_exact(3).map(Vec3::from_slice).collect(),
            tex_coords: tex_coords.chunks_exact(2).map(Vec2::from_slice).collect(),
            faces: faces.chunks_exact(2).map(|corner| [corner[0], corner[1]]).collect(),
            smoothing_groups,
            material,
        }))
    }
}
