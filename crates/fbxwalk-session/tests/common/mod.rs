#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;

use flate2::write::ZlibEncoder;
use flate2::Compression;

/// One mesh node with two triangles sharing an edge, a UV channel mapped per polygon vertex
/// through an index, two materials, one texture and two identically named marker nodes.
pub const PLANE_SCENE: &str = r#"; FBX 7.4.0 project file
; ----------------------------------------------------
FBXHeaderExtension:  {
	FBXHeaderVersion: 1003
	FBXVersion: 7400
}
Objects:  {
	Geometry: 1000, "Geometry::Plane", "Mesh" {
		Vertices: *12 {
			a: 0,0,0,1,0,0,1,1,0,0,1,0
		}
		PolygonVertexIndex: *6 {
			a: 0,1,-3,0,2,-4
		}
		GeometryVersion: 124
		LayerElementUV: 0 {
			Version: 101
			Name: "map1"
			MappingInformationType: "ByPolygonVertex"
			ReferenceInformationType: "IndexToDirect"
			UV: *8 {
				a: 0,0,1,0,1,1,0,0.25
			}
			UVIndex: *6 {
				a: 3,2,1,3,1,0
			}
		}
	}
	Model: 2000, "Model::Plane", "Mesh" {
		Version: 232
		Properties70:  {
			P: "Lcl Translation", "Lcl Translation", "", "A",1,2,3
			P: "GeometricTranslation", "Vector3D", "Vector", "",0.5,0,0
		}
		Shading: T
		Culling: "CullingOff"
	}
	Model: 2001, "Model::Marker", "Null" {
	}
	Model: 2002, "Model::Marker", "Null" {
	}
	NodeAttribute: 3000, "NodeAttribute::Marker", "Null" {
		TypeFlags: "Null"
	}
	Material: 4000, "Material::Shiny", "" {
		Version: 102
		ShadingModel: "phong"
		MultiLayer: 0
		Properties70:  {
			P: "Specular", "Vector3D", "Vector", "",1,1,1
			P: "SpecularFactor", "Number", "", "A",0.5
			P: "Shininess", "Number", "", "A",20
			P: "TransparencyFactor", "Number", "", "A",0.3
		}
	}
	Material: 4001, "Material::Matte", "" {
		Version: 102
		ShadingModel: "lambert"
		Properties70:  {
			P: "DiffuseColor", "Color", "", "A",1,0,0
			P: "TransparencyFactor", "Number", "", "A",0.9
			P: "Opacity", "double", "Number", "",0.25
		}
	}
	Texture: 5000, "Texture::Checker", "" {
		Type: "TextureVideoClip"
		FileName: "/textures/checker.png"
		RelativeFilename: "checker.png"
	}
}
Connections:  {
	;Model::Plane, Model::RootNode
	C: "OO",2000,0
	C: "OO",2001,0
	C: "OO",2002,0
	C: "OO",1000,2000
	C: "OO",4000,2000
	C: "OO",4001,2000
	C: "OP",5000,4000, "DiffuseColor"
	C: "OO",3000,2001
}
"#;

/// A single quad with explicit per-polygon smoothing and normals.
pub const QUAD_SCENE: &str = r#"; FBX 7.3.0 project file
Objects:  {
	Geometry: 10, "Geometry::Quad", "Mesh" {
		Vertices: *12 {
			a: 0,0,0,1,0,0,1,1,0,0,1,0
		}
		PolygonVertexIndex: *4 {
			a: 0,1,2,-4
		}
		LayerElementSmoothing: 0 {
			MappingInformationType: "ByPolygon"
			ReferenceInformationType: "Direct"
			Smoothing: *1 {
				a: 4
			}
		}
		LayerElementUV: 0 {
			MappingInformationType: "ByPolygonVertex"
			ReferenceInformationType: "Direct"
			UV: *8 {
				a: 0,0,1,0,1,1,0,1
			}
		}
	}
	Model: 20, "Model::Quad", "Mesh" {
	}
}
Connections:  {
	C: "OO",20,0
	C: "OO",10,20
}
"#;

/// Writes `contents` to a file in the temp directory that no other test uses.
pub fn fixture(name: &str, contents: &[u8]) -> PathBuf {
    let path = std::env::temp_dir().join(format!("fbxwalk-{}-{}", std::process::id(), name));
    std::fs::write(&path, contents).unwrap();
    path
}

pub enum Prop {
    I32(i32),
    I64(i64),
    F64(f64),
    Str(String),
    F64Array(Vec<f64>),
    I32Array(Vec<i32>),
}

pub fn s(value: &str) -> Prop {
    Prop::Str(value.to_owned())
}

pub struct BinaryNode {
    pub name: &'static str,
    pub props: Vec<Prop>,
    pub children: Vec<BinaryNode>,
}

pub fn node(name: &'static str, props: Vec<Prop>, children: Vec<BinaryNode>) -> BinaryNode {
    BinaryNode {
        name,
        props,
        children,
    }
}

/// Encodes records in the binary layout, with 64-bit offsets from version 7500 and
/// zlib compressed arrays.
pub fn encode_binary(version: u32, nodes: &[BinaryNode]) -> Vec<u8> {
    let wide = version >= 7500;
    let mut out = b"Kaydara FBX Binary  \0".to_vec();
    out.extend_from_slice(&[0x1a, 0x00]);
    out.extend_from_slice(&version.to_le_bytes());

    for node in nodes {
        write_node(&mut out, node, wide);
    }
    out.extend(std::iter::repeat(0).take(null_len(wide)));
    out
}

fn null_len(wide: bool) -> usize {
    if wide {
        25
    } else {
        13
    }
}

fn write_offset(out: &mut [u8], at: usize, value: usize, wide: bool) {
    if wide {
        out[at..at + 8].copy_from_slice(&(value as u64).to_le_bytes());
    } else {
        out[at..at + 4].copy_from_slice(&(value as u32).to_le_bytes());
    }
}

fn write_node(out: &mut Vec<u8>, node: &BinaryNode, wide: bool) {
    let width = if wide { 8 } else { 4 };
    let start = out.len();
    out.extend(std::iter::repeat(0).take(3 * width));
    out.push(node.name.len() as u8);
    out.extend_from_slice(node.name.as_bytes());

    let props_start = out.len();
    for prop in &node.props {
        write_prop(out, prop);
    }
    let props_len = out.len() - props_start;

    for child in &node.children {
        write_node(out, child, wide);
    }
    if !node.children.is_empty() {
        out.extend(std::iter::repeat(0).take(null_len(wide)));
    }

    let end = out.len();
    write_offset(out, start, end, wide);
    write_offset(out, start + width, node.props.len(), wide);
    write_offset(out, start + 2 * width, props_len, wide);
}

fn compressed_array(out: &mut Vec<u8>, code: u8, count: usize, raw: &[u8]) {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(raw).unwrap();
    let compressed = encoder.finish().unwrap();

    out.push(code);
    out.extend_from_slice(&(count as u32).to_le_bytes());
    out.extend_from_slice(&1u32.to_le_bytes());
    out.extend_from_slice(&(compressed.len() as u32).to_le_bytes());
    out.extend_from_slice(&compressed);
}

fn write_prop(out: &mut Vec<u8>, prop: &Prop) {
    match prop {
        Prop::I32(value) => {
            out.push(b'I');
            out.extend_from_slice(&value.to_le_bytes());
        }
        Prop::I64(value) => {
            out.push(b'L');
            out.extend_from_slice(&value.to_le_bytes());
        }
        Prop::F64(value) => {
            out.push(b'D');
            out.extend_from_slice(&value.to_le_bytes());
        }
        Prop::Str(value) => {
            out.push(b'S');
            out.extend_from_slice(&(value.len() as u32).to_le_bytes());
            out.extend_from_slice(value.as_bytes());
        }
        Prop::F64Array(values) => {
            let raw: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
            compressed_array(out, b'd', values.len(), &raw);
        }
        Prop::I32Array(values) => {
            let raw: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
            compressed_array(out, b'i', values.len(), &raw);
        }
    }
}

/// The mesh part of [`PLANE_SCENE`] in binary form.
pub fn binary_plane(version: u32) -> Vec<u8> {
    let geometry = node(
        "Geometry",
        vec![Prop::I64(1000), s("Plane\0\u{1}Geometry"), s("Mesh")],
        vec![
            node(
                "Vertices",
                vec![Prop::F64Array(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0])],
                vec![],
            ),
            node("PolygonVertexIndex", vec![Prop::I32Array(vec![0, 1, -3, 0, 2, -4])], vec![]),
            node(
                "LayerElementUV",
                vec![Prop::I32(0)],
                vec![
                    node("MappingInformationType", vec![s("ByPolygonVertex")], vec![]),
                    node("ReferenceInformationType", vec![s("IndexToDirect")], vec![]),
                    node(
                        "UV",
                        vec![Prop::F64Array(vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 0.25])],
                        vec![],
                    ),
                    node("UVIndex", vec![Prop::I32Array(vec![3, 2, 1, 3, 1, 0])], vec![]),
                ],
            ),
        ],
    );

    let model = node(
        "Model",
        vec![Prop::I64(2000), s("Plane\0\u{1}Model"), s("Mesh")],
        vec![node(
            "Properties70",
            vec![],
            vec![node(
                "P",
                vec![
                    s("Lcl Translation"),
                    s("Lcl Translation"),
                    s(""),
                    s("A"),
                    Prop::F64(1.0),
                    Prop::F64(2.0),
                    Prop::F64(3.0),
                ],
                vec![],
            )],
        )],
    );

    let connections = node(
        "Connections",
        vec![],
        vec![
            node("C", vec![s("OO"), Prop::I64(2000), Prop::I64(0)], vec![]),
            node("C", vec![s("OO"), Prop::I64(1000), Prop::I64(2000)], vec![]),
        ],
    );

    encode_binary(
        version,
        &[
            node("Objects", vec![], vec![geometry, model]),
            connections,
        ],
    )
}
