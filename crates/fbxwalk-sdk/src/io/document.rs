use std::collections::HashMap;

use fbxwalk_transform::RotationOrder;
use glam::{DVec2, DVec3, DVec4};

use super::record::{Document, Record, Value};
use super::IoSettings;
use crate::attribute::{AttributeKind, AttributeType, NodeAttribute};
use crate::error::ImportError;
use crate::layer::{LayerElement, MappingMode, ReferenceMode};
use crate::material::{MaterialClass, PropertyValue, SurfaceMaterial};
use crate::mesh::Mesh;
use crate::scene::{MaterialId, Node, NodeId, Scene, TextureId};
use crate::surface::{NurbsSurface, Patch, PatchType, DEFAULT_SURFACE_STEP, MAX_SURFACE_STEP};
use crate::texture::{Texture, TextureKind};

/// Older exporters write these names; they fill in the modern property when it is missing.
const LEGACY_MATERIAL_ALIASES: [(&str, &str); 5] = [
    ("Diffuse", SurfaceMaterial::DIFFUSE_COLOR),
    ("Specular", SurfaceMaterial::SPECULAR_COLOR),
    ("Emissive", SurfaceMaterial::EMISSIVE_COLOR),
    ("Ambient", SurfaceMaterial::AMBIENT_COLOR),
    ("Shininess", SurfaceMaterial::SHININESS_EXPONENT),
];

const ROOT_ID: i64 = 0;

enum Object {
    Node(NodeId),
    Attribute(NodeAttribute),
    Material(MaterialId),
    Texture(TextureId),
}

/// Builds a scene from the `Objects` and `Connections` sections of a parsed document.
pub fn build_scene(document: &Document, settings: &IoSettings) -> Result<Scene, ImportError> {
    puffin::profile_function!();

    let mut scene = Scene::new();
    let mut objects = HashMap::new();

    if let Some(section) = document.find("Objects") {
        for record in &section.children {
            let Some(id) = record.i64_value(0) else {
                log::warn!("Skipping {} object without an id", record.name);
                continue;
            };
            if let Some(object) = read_object(record, settings, &mut scene)? {
                objects.insert(id, object);
            }
        }
    }

    let mut parented = Vec::new();
    if let Some(section) = document.find("Connections") {
        for connection in section.children_named("C") {
            let (Some(kind), Some(child), Some(parent)) = (
                connection.str_value(0),
                connection.i64_value(1),
                connection.i64_value(2),
            ) else {
                log::warn!("Skipping malformed connection {:?}", connection.values);
                continue;
            };
            let property = connection.str_value(3).filter(|_| kind == "OP");

            if connect(&mut scene, &objects, child, parent, property) {
                if let Some(Object::Node(node)) = objects.get(&child) {
                    parented.push(*node);
                }
            }
        }
    }

    // Models nobody claimed hang under the root, in file order.
    let mut orphans: Vec<NodeId> = objects
        .values()
        .filter_map(|object| match object {
            Object::Node(node) if !parented.contains(node) => Some(*node),
            _ => None,
        })
        .collect();
    orphans.sort_by_key(|node| node.0);
    for node in orphans {
        log::debug!("Attaching unconnected model {:?} to the root", node);
        scene.attach(node, scene.root());
    }

    Ok(scene)
}

fn connect(
    scene: &mut Scene,
    objects: &HashMap<i64, Object>,
    child: i64,
    parent: i64,
    property: Option<&str>,
) -> bool {
    let Some(child_object) = objects.get(&child) else {
        return false;
    };

    if parent == ROOT_ID {
        return match child_object {
            Object::Node(node) => scene.attach(*node, scene.root()),
            _ => false,
        };
    }

    match (child_object, objects.get(&parent)) {
        (Object::Node(node), Some(Object::Node(parent))) => scene.attach(*node, *parent),
        (Object::Attribute(attribute), Some(Object::Node(parent))) => {
            if let Some(node) = scene.node_mut(*parent) {
                node.attributes.push(attribute.clone());
            }
            false
        }
        (Object::Material(material), Some(Object::Node(parent))) => {
            if let Some(node) = scene.node_mut(*parent) {
                node.materials.push(*material);
            }
            false
        }
        (Object::Texture(texture), Some(Object::Material(material))) => {
            let property = property.unwrap_or(SurfaceMaterial::DIFFUSE_COLOR);
            if let Some(material) = scene.material_mut(*material) {
                material.connect_texture(property, *texture);
            }
            false
        }
        _ => false,
    }
}

fn read_object(
    record: &Record,
    settings: &IoSettings,
    scene: &mut Scene,
) -> Result<Option<Object>, ImportError> {
    let name = object_name(record);
    let subclass = record.str_value(2).unwrap_or_default();

    let object = match record.name.as_str() {
        "Model" => Some(Object::Node(scene.add_detached_node(read_model(record, &name)))),
        "Geometry" => read_geometry(record, &name, subclass)?.map(Object::Attribute),
        "NodeAttribute" => {
            let kind = match AttributeType::from_fbx(subclass) {
                AttributeType::Nurbs => AttributeKind::Nurbs,
                attribute_type => AttributeKind::Other(attribute_type),
            };
            Some(Object::Attribute(NodeAttribute::new(&name, kind)))
        }
        "Material" if settings.materials => {
            Some(Object::Material(scene.add_material(read_material(record, &name))))
        }
        "Texture" if settings.textures => Some(Object::Texture(scene.add_texture(read_texture(record, &name)))),
        "LayeredTexture" if settings.textures => Some(Object::Texture(scene.add_texture(Texture {
            name,
            kind: TextureKind::Layered,
        }))),
        "ProceduralTexture" if settings.textures => Some(Object::Texture(scene.add_texture(Texture {
            name,
            kind: TextureKind::Procedural,
        }))),
        _ => None,
    };

    Ok(object)
}

/// `Class::Name` object names are reduced to `Name`.
fn object_name(record: &Record) -> String {
    let full = record.str_value(1).unwrap_or_default();
    match full.split_once("::") {
        Some((_, name)) => name.to_owned(),
        None => full.to_owned(),
    }
}

/// Property table of an object, from either `Properties70` or the older `Properties60`.
fn property_table(record: &Record) -> Vec<(&str, &[Value])> {
    if let Some(table) = record.child("Properties70") {
        table
            .children_named("P")
            .filter_map(|p| Some((p.str_value(0)?, p.values.get(4..).unwrap_or_default())))
            .collect()
    } else if let Some(table) = record.child("Properties60") {
        table
            .children_named("Property")
            .filter_map(|p| Some((p.str_value(0)?, p.values.get(3..).unwrap_or_default())))
            .collect()
    } else {
        Vec::new()
    }
}

fn property_value(values: &[Value]) -> PropertyValue {
    let numbers: Vec<f64> = values.iter().filter_map(Value::as_f64).collect();
    match (numbers.as_slice(), values.first()) {
        ([x, y, z, ..], _) => PropertyValue::Vector(DVec3::new(*x, *y, *z)),
        ([value], _) => PropertyValue::Number(*value),
        (_, Some(Value::String(text))) => PropertyValue::Text(text.clone()),
        _ => PropertyValue::Empty,
    }
}

fn read_model(record: &Record, name: &str) -> Node {
    let mut node = Node::new(name);

    for (property, values) in property_table(record) {
        let value = property_value(values);
        let vector = value.as_vector();
        let transform = &mut node.transform;

        match (property, vector) {
            ("Lcl Translation", Some(v)) => transform.set_translation(v),
            ("Lcl Rotation", Some(v)) => transform.set_rotation(v),
            ("Lcl Scaling", Some(v)) => transform.set_scaling(v),
            ("PreRotation", Some(v)) => transform.set_pre_rotation(v),
            ("PostRotation", Some(v)) => transform.set_post_rotation(v),
            ("RotationOffset", Some(v)) => transform.set_rotation_offset(v),
            ("RotationPivot", Some(v)) => transform.set_rotation_pivot(v),
            ("ScalingOffset", Some(v)) => transform.set_scaling_offset(v),
            ("ScalingPivot", Some(v)) => transform.set_scaling_pivot(v),
            ("GeometricTranslation", Some(v)) => node.geometric_translation = v,
            ("GeometricRotation", Some(v)) => node.geometric_rotation = v,
            ("GeometricScaling", Some(v)) => node.geometric_scaling = v,
            ("RotationOrder", _) => {
                if let Some(order) = value.as_number() {
                    transform.set_rotation_order(RotationOrder::from_fbx(order as i64));
                }
            }
            ("RotationActive", _) => {
                if let Some(active) = value.as_number() {
                    transform.set_rotation_active(active != 0.0);
                }
            }
            _ => {}
        }
    }

    node
}

fn read_material(record: &Record, name: &str) -> SurfaceMaterial {
    let shading_model = record
        .child("ShadingModel")
        .and_then(|child| child.str_value(0))
        .unwrap_or("lambert");
    let mut material = SurfaceMaterial::new(name, MaterialClass::from_shading_model(shading_model));

    let mut properties: Vec<(String, PropertyValue)> = property_table(record)
        .into_iter()
        .map(|(property, values)| (property.to_owned(), property_value(values)))
        .collect();

    for (legacy, modern) in LEGACY_MATERIAL_ALIASES {
        let has_modern = properties.iter().any(|(property, _)| property == modern);
        let legacy_value = properties
            .iter()
            .find(|(property, _)| property == legacy)
            .map(|(_, value)| value.clone());
        if let (false, Some(value)) = (has_modern, legacy_value) {
            log::debug!("Material {:?}: using legacy {} for {}", name, legacy, modern);
            properties.push((modern.to_owned(), value));
        }
    }

    for (property, value) in properties {
        material.set_property(&property, value);
    }
    material
}

fn read_texture(record: &Record, name: &str) -> Texture {
    let file_name = record.child("FileName").and_then(|child| child.str_value(0));
    let relative = record.child("RelativeFilename").and_then(|child| child.str_value(0));

    let kind = match (file_name, relative) {
        (None, None) => TextureKind::Procedural,
        (file_name, relative) => TextureKind::File {
            file_name: file_name.unwrap_or_default().into(),
            relative_file_name: relative.or(file_name).unwrap_or_default().into(),
        },
    };

    Texture {
        name: name.to_owned(),
        kind,
    }
}

fn invalid(name: &str, reason: impl Into<String>) -> ImportError {
    ImportError::InvalidGeometry {
        object: name.to_owned(),
        reason: reason.into(),
    }
}

fn read_geometry(record: &Record, name: &str, subclass: &str) -> Result<Option<NodeAttribute>, ImportError> {
    let kind = match subclass {
        "Mesh" => AttributeKind::Mesh(read_mesh(record, name)?),
        "NurbsSurface" => AttributeKind::NurbsSurface(read_nurbs_surface(record, name)?),
        "Patch" => AttributeKind::Patch(read_patch(record, name)?),
        "Nurbs" => AttributeKind::Nurbs,
        other => match AttributeType::from_fbx(other) {
            AttributeType::Unknown => {
                log::warn!("Geometry {:?} has unsupported type {:?}", name, other);
                AttributeKind::Other(AttributeType::Unknown)
            }
            attribute_type => AttributeKind::Other(attribute_type),
        },
    };
    Ok(Some(NodeAttribute::new(name, kind)))
}

fn triples(name: &str, array: &str, values: &[f64]) -> Result<Vec<DVec3>, ImportError> {
    if values.len() % 3 != 0 {
        return Err(invalid(name, format!("{} length {} is not a multiple of 3", array, values.len())));
    }
    Ok(values
        .chunks_exact(3)
        .map(|v| DVec3::new(v[0], v[1], v[2]))
        .collect())
}

fn read_mesh(record: &Record, name: &str) -> Result<Mesh, ImportError> {
    puffin::profile_function!();

    let vertices = record
        .child_f64_array("Vertices")
        .ok_or_else(|| invalid(name, "missing Vertices"))?;
    let control_points = triples(name, "Vertices", &vertices)?;

    let polygon_vertex_index = record
        .child("PolygonVertexIndex")
        .ok_or_else(|| invalid(name, "missing PolygonVertexIndex"))?
        .i32_array()
        .map_err(|reason| invalid(name, reason))?;

    let mut mesh = Mesh::from_polygon_vertex_index(control_points, &polygon_vertex_index)
        .map_err(|reason| invalid(name, reason))?;

    for layer in record.children_named("LayerElementUV") {
        let mut element = layer_element::<DVec2>(layer);
        let uv = layer.child_f64_array("UV").unwrap_or_default();
        if uv.len() % 2 != 0 {
            return Err(invalid(name, format!("UV length {} is not a multiple of 2", uv.len())));
        }
        element.direct = uv.chunks_exact(2).map(|v| DVec2::new(v[0], v[1])).collect();
        element.index = layer_index(layer, &["UVIndex"], name)?;
        mesh.add_element_uv(element);
    }

    for layer in record.children_named("LayerElementNormal") {
        let mut element = layer_element::<DVec3>(layer);
        element.direct = triples(name, "Normals", &layer.child_f64_array("Normals").unwrap_or_default())?;
        element.index = layer_index(layer, &["NormalsIndex", "NormalIndex"], name)?;
        mesh.add_element_normal(element);
    }

    for layer in record.children_named("LayerElementSmoothing") {
        let mut element = layer_element::<i32>(layer);
        element.direct = layer
            .child("Smoothing")
            .map(Record::i32_array)
            .transpose()
            .map_err(|reason| invalid(name, reason))?
            .unwrap_or_default();
        mesh.add_element_smoothing(element);
    }

    Ok(mesh)
}

fn layer_element<T: Copy + Default>(layer: &Record) -> LayerElement<T> {
    let text = |key: &str| {
        layer
            .child(key)
            .and_then(|child| child.str_value(0))
            .unwrap_or_default()
    };
    LayerElement::new(
        text("Name"),
        MappingMode::from_fbx(text("MappingInformationType")),
        ReferenceMode::from_fbx(text("ReferenceInformationType")),
    )
}

fn layer_index(layer: &Record, keys: &[&str], name: &str) -> Result<Vec<i32>, ImportError> {
    match keys.iter().find_map(|key| layer.child(key)) {
        Some(index) => index.i32_array().map_err(|reason| invalid(name, reason)),
        None => Ok(Vec::new()),
    }
}

fn pair(record: &Record, key: &str) -> Option<(usize, usize)> {
    let values = record.child(key)?.i64_array();
    match values.as_slice() {
        [u, v, ..] => Some((usize::try_from(*u).ok()?, usize::try_from(*v).ok()?)),
        _ => None,
    }
}

fn read_nurbs_surface(record: &Record, name: &str) -> Result<NurbsSurface, ImportError> {
    let (order_u, order_v) =
        pair(record, "NurbsSurfaceOrder").ok_or_else(|| invalid(name, "missing NurbsSurfaceOrder"))?;
    let (count_u, count_v) = pair(record, "Dimensions").ok_or_else(|| invalid(name, "missing Dimensions"))?;
    let (step_u, step_v) = pair(record, "Step").unwrap_or((DEFAULT_SURFACE_STEP, DEFAULT_SURFACE_STEP));

    let points = record
        .child_f64_array("Points")
        .ok_or_else(|| invalid(name, "missing Points"))?;
    if points.len() % 4 != 0 {
        return Err(invalid(name, format!("Points length {} is not a multiple of 4", points.len())));
    }
    if count_u.checked_mul(count_v) != Some(points.len() / 4) {
        return Err(invalid(
            name,
            format!("{} control points do not describe a {}x{} grid", points.len() / 4, count_u, count_v),
        ));
    }
    if order_u > count_u || order_v > count_v {
        return Err(invalid(
            name,
            format!("{}x{} control points cannot carry order {}x{}", count_u, count_v, order_u, order_v),
        ));
    }
    if step_u > MAX_SURFACE_STEP || step_v > MAX_SURFACE_STEP {
        return Err(invalid(
            name,
            format!("step {}x{} exceeds {}", step_u, step_v, MAX_SURFACE_STEP),
        ));
    }

    let knots = |key: &str, count: usize, order: usize| {
        record
            .child_f64_array(key)
            .filter(|knots| !knots.is_empty())
            .unwrap_or_else(|| NurbsSurface::clamped_knots(count, order))
    };

    let surface = NurbsSurface {
        order_u,
        order_v,
        count_u,
        count_v,
        step_u: if step_u == 0 { DEFAULT_SURFACE_STEP } else { step_u },
        step_v: if step_v == 0 { DEFAULT_SURFACE_STEP } else { step_v },
        control_points: points
            .chunks_exact(4)
            .map(|p| DVec4::new(p[0], p[1], p[2], p[3]))
            .collect(),
        knots_u: knots("KnotVectorU", count_u, order_u),
        knots_v: knots("KnotVectorV", count_v, order_v),
    };
    surface.validate().map_err(|reason| invalid(name, reason))?;
    Ok(surface)
}

fn read_patch(record: &Record, name: &str) -> Result<Patch, ImportError> {
    let (count_u, count_v) = pair(record, "Dimensions").ok_or_else(|| invalid(name, "missing Dimensions"))?;
    let patch_type = record
        .child("PatchType")
        .and_then(|child| child.str_value(0))
        .map(PatchType::from_fbx)
        .unwrap_or_default();

    let points = record
        .child_f64_array("Points")
        .ok_or_else(|| invalid(name, "missing Points"))?;
    let count = count_u
        .checked_mul(count_v)
        .ok_or_else(|| invalid(name, format!("{}x{} grid is too large", count_u, count_v)))?;
    let control_points = if count > 0 && count.checked_mul(4) == Some(points.len()) {
        points
            .chunks_exact(4)
            .map(|p| DVec3::new(p[0], p[1], p[2]))
            .collect()
    } else if count.checked_mul(3) == Some(points.len()) {
        triples(name, "Points", &points)?
    } else {
        return Err(invalid(
            name,
            format!("{} point values do not describe a {}x{} grid", points.len(), count_u, count_v),
        ));
    };

    Ok(Patch {
        patch_type,
        count_u,
        count_v,
        control_points,
    })
}
