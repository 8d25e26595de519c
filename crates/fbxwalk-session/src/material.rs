use std::path::PathBuf;

use fbxwalk_sdk::{MaterialClass, SurfaceMaterial};
use glam::DVec3;

use crate::error::Result;
use crate::session::SceneSession;

/// Returned by [`SceneSession::specular_power`] for materials without a specular term.
pub const SPECULAR_POWER_UNSUPPORTED: f64 = -1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadingModel {
    Lambert,
    Phong,
    Other,
}

impl From<&MaterialClass> for ShadingModel {
    fn from(class: &MaterialClass) -> Self {
        match class {
            MaterialClass::Lambert => Self::Lambert,
            MaterialClass::Phong => Self::Phong,
            MaterialClass::Other(_) => Self::Other,
        }
    }
}

/// Material properties a texture map can hang off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureSlot {
    Diffuse,
    Specular,
    Bump,
    SelfIllumination,
}

impl TextureSlot {
    pub fn property_name(&self) -> &'static str {
        match self {
            Self::Diffuse => SurfaceMaterial::DIFFUSE_COLOR,
            Self::Specular => SurfaceMaterial::SPECULAR_COLOR,
            Self::Bump => SurfaceMaterial::BUMP,
            Self::SelfIllumination => SurfaceMaterial::EMISSIVE_COLOR,
        }
    }
}

/// Sources of a material's alpha, tried in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpacityRule {
    /// An explicit `Opacity` property, written by older exporters.
    ExplicitOpacity,
    /// `1 - TransparencyFactor`.
    InverseTransparency,
}

impl OpacityRule {
    pub const ORDER: [Self; 2] = [Self::ExplicitOpacity, Self::InverseTransparency];

    fn resolve(&self, material: &SurfaceMaterial) -> Option<f64> {
        match self {
            // Presence decides; a value that is not a number reads as 0.
            Self::ExplicitOpacity => material
                .find_property(SurfaceMaterial::OPACITY)
                .map(|property| property.value.as_number().unwrap_or(0.0)),
            Self::InverseTransparency => Some(
                1.0 - material
                    .number(SurfaceMaterial::TRANSPARENCY_FACTOR)
                    .unwrap_or(0.0),
            ),
        }
    }
}

pub fn opacity(material: &SurfaceMaterial) -> f64 {
    OpacityRule::ORDER
        .iter()
        .find_map(|rule| rule.resolve(material))
        .unwrap_or(1.0)
}

/// `factor * color` with the material opacity as alpha.
fn weighted_color(material: &SurfaceMaterial, color: &str, factor: &str) -> [f64; 4] {
    let rgb = material.vector(color).unwrap_or(DVec3::ZERO) * material.number(factor).unwrap_or(1.0);
    rgb.extend(opacity(material)).to_array()
}

impl SceneSession {
    pub fn shading_model(&self, index: usize) -> Result<ShadingModel> {
        Ok((&self.material(index)?.class).into())
    }

    /// `DiffuseFactor * DiffuseColor` with opacity, for Lambert and Phong materials.
    pub fn diffuse_color(&self, index: usize) -> Result<Option<[f64; 4]>> {
        let material = self.material(index)?;
        if !material.class.is_lambert_family() {
            return Ok(None);
        }
        Ok(Some(weighted_color(
            material,
            SurfaceMaterial::DIFFUSE_COLOR,
            SurfaceMaterial::DIFFUSE_FACTOR,
        )))
    }

    /// `SpecularFactor * SpecularColor` with opacity, for Phong materials only.
    pub fn specular_color(&self, index: usize) -> Result<Option<[f64; 4]>> {
        let material = self.material(index)?;
        if material.class != MaterialClass::Phong {
            return Ok(None);
        }
        Ok(Some(weighted_color(
            material,
            SurfaceMaterial::SPECULAR_COLOR,
            SurfaceMaterial::SPECULAR_FACTOR,
        )))
    }

    /// Phong shininess, or [`SPECULAR_POWER_UNSUPPORTED`] for other shading models.
    pub fn specular_power(&self, index: usize) -> Result<f64> {
        let material = self.material(index)?;
        if material.class != MaterialClass::Phong {
            return Ok(SPECULAR_POWER_UNSUPPORTED);
        }
        Ok(material
            .number(SurfaceMaterial::SHININESS_EXPONENT)
            .unwrap_or(SPECULAR_POWER_UNSUPPORTED))
    }

    /// File of the first texture connected to `slot`, `None` when there is none or it is not file based.
    pub fn texture_map(&self, index: usize, slot: TextureSlot) -> Result<Option<PathBuf>> {
        let material = self.material(index)?;
        let scene = &self.live()?.scene;

        Ok(material
            .find_property(slot.property_name())
            .and_then(|property| property.src_texture(0))
            .and_then(|texture| scene.texture(texture))
            .and_then(|texture| texture.file_name())
            .map(PathBuf::from))
    }

    pub fn diffuse_map(&self, index: usize) -> Result<Option<PathBuf>> {
        self.texture_map(index, TextureSlot::Diffuse)
    }

    pub fn specular_map(&self, index: usize) -> Result<Option<PathBuf>> {
        self.texture_map(index, TextureSlot::Specular)
    }

    pub fn bump_map(&self, index: usize) -> Result<Option<PathBuf>> {
        self.texture_map(index, TextureSlot::Bump)
    }

    pub fn self_illumination_map(&self, index: usize) -> Result<Option<PathBuf>> {
        self.texture_map(index, TextureSlot::SelfIllumination)
    }
}
