use glam::DVec3;

use crate::scene::TextureId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaterialClass {
    Lambert,
    Phong,
    Other(String),
}

impl MaterialClass {
    /// Maps the `ShadingModel` string of a material object.
    pub fn from_shading_model(shading_model: &str) -> Self {
        match shading_model.to_ascii_lowercase().as_str() {
            "lambert" => Self::Lambert,
            "phong" => Self::Phong,
            _ => Self::Other(shading_model.to_owned()),
        }
    }

    pub fn is_lambert_family(&self) -> bool {
        matches!(self, Self::Lambert | Self::Phong)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Number(f64),
    Vector(DVec3),
    Text(String),
    Empty,
}

impl PropertyValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<DVec3> {
        match self {
            Self::Vector(value) => Some(*value),
            Self::Number(value) => Some(DVec3::splat(*value)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub value: PropertyValue,
    sources: Vec<TextureId>,
}

impl Property {
    pub fn new(name: &str, value: PropertyValue) -> Self {
        Self {
            name: name.to_owned(),
            value,
            sources: Vec::new(),
        }
    }

    pub fn src_texture_count(&self) -> usize {
        self.sources.len()
    }

    pub fn src_texture(&self, index: usize) -> Option<TextureId> {
        self.sources.get(index).copied()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceMaterial {
    pub name: String,
    pub class: MaterialClass,
    properties: Vec<Property>,
}

impl SurfaceMaterial {
    pub const DIFFUSE_COLOR: &'static str = "DiffuseColor";
    pub const DIFFUSE_FACTOR: &'static str = "DiffuseFactor";
    pub const TRANSPARENCY_FACTOR: &'static str = "TransparencyFactor";
    pub const OPACITY: &'static str = "Opacity";
    pub const SPECULAR_COLOR: &'static str = "SpecularColor";
    pub const SPECULAR_FACTOR: &'static str = "SpecularFactor";
    pub const SHININESS_EXPONENT: &'static str = "ShininessExponent";
    pub const EMISSIVE_COLOR: &'static str = "EmissiveColor";
    pub const AMBIENT_COLOR: &'static str = "AmbientColor";
    pub const BUMP: &'static str = "Bump";

    /// Creates a material carrying the default properties of its class.
    pub fn new(name: &str, class: MaterialClass) -> Self {
        let mut material = Self {
            name: name.to_owned(),
            class,
            properties: Vec::new(),
        };

        if material.class.is_lambert_family() {
            material.set_property(Self::DIFFUSE_COLOR, PropertyValue::Vector(DVec3::splat(0.2)));
            material.set_property(Self::DIFFUSE_FACTOR, PropertyValue::Number(1.0));
            material.set_property(Self::TRANSPARENCY_FACTOR, PropertyValue::Number(0.0));
            material.set_property(Self::EMISSIVE_COLOR, PropertyValue::Vector(DVec3::ZERO));
            material.set_property(Self::BUMP, PropertyValue::Vector(DVec3::ZERO));
        }
        if material.class == MaterialClass::Phong {
            material.set_property(Self::SPECULAR_COLOR, PropertyValue::Vector(DVec3::splat(0.2)));
            material.set_property(Self::SPECULAR_FACTOR, PropertyValue::Number(1.0));
            material.set_property(Self::SHININESS_EXPONENT, PropertyValue::Number(20.0));
        }

        material
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn find_property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|property| property.name == name)
    }

    /// Sets a property value, keeping any texture already connected to it.
    pub fn set_property(&mut self, name: &str, value: PropertyValue) {
        match self.properties.iter_mut().find(|property| property.name == name) {
            Some(property) => property.value = value,
            None => self.properties.push(Property::new(name, value)),
        }
    }

    /// Connects a texture to a property, creating an empty property when needed.
    pub fn connect_texture(&mut self, name: &str, texture: TextureId) {
        if self.find_property(name).is_none() {
            self.properties.push(Property::new(name, PropertyValue::Empty));
        }
        if let Some(property) = self.properties.iter_mut().find(|property| property.name == name) {
            property.sources.push(texture);
        }
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.find_property(name)
            .and_then(|property| property.value.as_number())
    }

    pub fn vector(&self, name: &str) -> Option<DVec3> {
        self.find_property(name)
            .and_then(|property| property.value.as_vector())
    }
}
