mod common;

use std::path::PathBuf;

use common::{fixture, PLANE_SCENE, QUAD_SCENE};
use fbxwalk_sdk::ImportError;
use fbxwalk_session::{IndexKind, IoSettings, NodeAttributeType, SceneSession, SessionError, ShadingModel};

fn open_plane(name: &str) -> SceneSession {
    let path = fixture(name, PLANE_SCENE.as_bytes());
    let mut session = SceneSession::new();
    assert!(session.open(&path).unwrap());
    session
}

#[test]
fn opened_scene_starts_at_root() {
    let session = open_plane("root.fbx");
    assert!(session.is_open());
    assert_eq!(session.name().unwrap(), "RootNode");
    assert_eq!(session.attribute_count().unwrap(), 0);
    assert_eq!(session.material_count().unwrap(), 0);
}

#[test]
fn mesh_buffers_follow_per_corner_uv_indices() {
    let mut session = open_plane("plane.fbx");
    assert!(session.descend_to_first_child().unwrap());
    assert_eq!(session.name().unwrap(), "Plane");

    assert_eq!(session.attribute_count().unwrap(), 1);
    assert_eq!(session.attribute_name(0).unwrap(), "Plane");
    assert_eq!(session.attribute_type(0).unwrap(), NodeAttributeType::Mesh);
    assert!(session.is_triangle_mesh(0).unwrap());

    let vertices = session.vertices(0).unwrap().unwrap();
    assert_eq!(vertices, vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0]);

    let faces = session.faces(0).unwrap().unwrap();
    assert_eq!(faces, vec![0, 3, 1, 2, 2, 1, 0, 3, 2, 1, 3, 0]);

    let tex_coords = session.tex_coords(0).unwrap().unwrap();
    assert_eq!(tex_coords, vec![0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.75]);

    for corner in faces.chunks_exact(2) {
        assert!((corner[0] as usize) < vertices.len() / 3);
        assert!((corner[1] as usize) < tex_coords.len() / 2);
    }

    assert_eq!(session.face_smoothing_groups(0).unwrap().unwrap(), vec![1, 1]);
}

#[test]
fn node_transforms_are_exposed() {
    let mut session = open_plane("transform.fbx");
    session.descend_to_first_child().unwrap();

    let global = session.global_transform().unwrap();
    assert_eq!(&global[12..16], &[1.0, 2.0, 3.0, 1.0]);
    assert_eq!(global[0], 1.0);
    assert_eq!(session.geometric_translation().unwrap(), [0.5, 0.0, 0.0]);
}

#[test]
fn sibling_walk_stops_at_last_child() {
    let mut session = open_plane("siblings.fbx");
    session.descend_to_first_child().unwrap();

    assert!(session.advance_to_next_sibling().unwrap());
    assert_eq!(session.name().unwrap(), "Marker");
    assert_eq!(session.attribute_count().unwrap(), 1);
    assert_eq!(session.attribute_type(0).unwrap(), NodeAttributeType::Null);
    assert!(!session.descend_to_first_child().unwrap());

    // Same name as the previous sibling, still a different node.
    assert!(session.advance_to_next_sibling().unwrap());
    assert_eq!(session.name().unwrap(), "Marker");
    assert_eq!(session.attribute_count().unwrap(), 0);

    assert!(!session.advance_to_next_sibling().unwrap());
    assert_eq!(session.attribute_count().unwrap(), 0);

    assert!(session.ascend_to_parent().unwrap());
    assert_eq!(session.name().unwrap(), "RootNode");
    assert!(!session.ascend_to_parent().unwrap());
    assert!(!session.advance_to_next_sibling().unwrap());
}

#[test]
fn materials_resolve_colors_and_maps() {
    let mut session = open_plane("materials.fbx");
    session.descend_to_first_child().unwrap();

    assert_eq!(session.material_count().unwrap(), 2);
    assert_eq!(session.material_name(0).unwrap(), "Shiny");
    assert_eq!(session.material_name(1).unwrap(), "Matte");
    assert_eq!(session.shading_model(0).unwrap(), ShadingModel::Phong);
    assert_eq!(session.shading_model(1).unwrap(), ShadingModel::Lambert);

    let specular = session.specular_color(0).unwrap().unwrap();
    assert_eq!(&specular[..3], &[0.5, 0.5, 0.5]);
    assert!((specular[3] - 0.7).abs() < 1e-9);
    assert_eq!(session.specular_power(0).unwrap(), 20.0);

    assert_eq!(session.specular_color(1).unwrap(), None);
    assert_eq!(session.specular_power(1).unwrap(), fbxwalk_session::SPECULAR_POWER_UNSUPPORTED);

    let diffuse = session.diffuse_color(1).unwrap().unwrap();
    assert_eq!(diffuse[0], 1.0);
    assert_eq!(diffuse[3], 0.25);

    assert_eq!(
        session.diffuse_map(0).unwrap(),
        Some(PathBuf::from("/textures/checker.png"))
    );
    assert_eq!(session.diffuse_map(1).unwrap(), None);
    assert_eq!(session.bump_map(0).unwrap(), None);
}

#[test]
fn out_of_range_indices_are_reported() {
    let mut session = open_plane("bounds.fbx");
    session.descend_to_first_child().unwrap();

    assert!(matches!(
        session.attribute_name(1),
        Err(SessionError::IndexOutOfBounds {
            kind: IndexKind::Attribute,
            index: 1,
            count: 1
        })
    ));
    assert!(matches!(
        session.material_name(2),
        Err(SessionError::IndexOutOfBounds {
            kind: IndexKind::Material,
            index: 2,
            count: 2
        })
    ));
}

#[test]
fn reopening_resets_the_cursor() {
    let path = fixture("reopen.fbx", PLANE_SCENE.as_bytes());
    let mut session = SceneSession::new();
    session.open(&path).unwrap();
    session.descend_to_first_child().unwrap();
    session.advance_to_next_sibling().unwrap();
    let first = (session.name().unwrap(), session.attribute_count().unwrap());

    session.close();
    assert!(!session.is_open());
    session.open(&path).unwrap();
    assert_eq!(session.name().unwrap(), "RootNode");

    session.descend_to_first_child().unwrap();
    assert_eq!(session.material_count().unwrap(), 2);
    session.advance_to_next_sibling().unwrap();
    assert_eq!((session.name().unwrap(), session.attribute_count().unwrap()), first);
}

#[test]
fn closed_session_rejects_queries() {
    let mut session = SceneSession::new();
    assert!(matches!(session.name(), Err(SessionError::SessionClosed)));
    assert!(matches!(session.descend_to_first_child(), Err(SessionError::SessionClosed)));
    assert!(matches!(session.vertices(0), Err(SessionError::SessionClosed)));
    assert!(matches!(session.diffuse_color(0), Err(SessionError::SessionClosed)));
}

#[test]
fn failed_open_drops_previous_scene() {
    let mut session = open_plane("before-corrupt.fbx");

    // One record whose end offset points far past the end of the file.
    let mut bytes = b"Kaydara FBX Binary  \0\x1a\x00".to_vec();
    bytes.extend_from_slice(&7400u32.to_le_bytes());
    bytes.extend_from_slice(&0xffffu32.to_le_bytes());
    bytes.extend_from_slice(&[0; 8]);
    bytes.push(3);
    bytes.extend_from_slice(b"Obj");
    let corrupt = fixture("corrupt.fbx", &bytes);
    let err = session.open(&corrupt).unwrap_err();
    assert!(matches!(err, SessionError::CorruptAsset { ref path, .. } if *path == corrupt));
    assert!(!session.is_open());
    assert!(matches!(session.name(), Err(SessionError::SessionClosed)));
}

#[test]
fn missing_file_is_reported() {
    let mut session = SceneSession::new();
    let err = session.open(std::env::temp_dir().join("fbxwalk-does-not-exist.fbx")).unwrap_err();
    assert!(matches!(
        err,
        SessionError::CorruptAsset {
            source: ImportError::Read { .. },
            ..
        }
    ));
}

#[test]
fn old_versions_are_refused() {
    let text = PLANE_SCENE
        .replace("; FBX 7.4.0 project file", "; FBX 6.1.0 project file")
        .replace("FBXVersion: 7400", "FBXVersion: 6100");
    let path = fixture("old.fbx", text.as_bytes());

    let err = SceneSession::new().open(&path).unwrap_err();
    assert!(matches!(
        err,
        SessionError::CorruptAsset {
            source: ImportError::UnsupportedVersion(6100),
            ..
        }
    ));
}

fn open_geometry(name: &str, geometry: &str) -> SessionError {
    let text = format!("; FBX 7.4.0 project file\nObjects:  {{\n{}\n}}\n", geometry);
    let path = fixture(name, text.as_bytes());
    SceneSession::new().open(&path).unwrap_err()
}

#[test]
fn oversized_array_lengths_are_corrupt() {
    let err = open_geometry(
        "huge-array.fbx",
        r#"    Geometry: 1, "Geometry::Huge", "Mesh" {
        Vertices: *18446744073709551615 {
            a: 0
        }
    }"#,
    );
    assert!(matches!(
        err,
        SessionError::CorruptAsset {
            source: ImportError::Syntax { .. },
            ..
        }
    ));
}

#[test]
fn oversized_surface_dimensions_are_corrupt() {
    let nurbs = open_geometry(
        "huge-nurbs.fbx",
        r#"    Geometry: 1, "Geometry::Sheet", "NurbsSurface" {
        NurbsSurfaceOrder: 2,2
        Dimensions: 9223372036854775807,4
        Points: *4 {
            a: 0,0,0,1
        }
    }"#,
    );
    assert!(matches!(
        nurbs,
        SessionError::CorruptAsset {
            source: ImportError::InvalidGeometry { ref object, .. },
            ..
        } if object == "Sheet"
    ));

    let patch = open_geometry(
        "huge-patch.fbx",
        r#"    Geometry: 1, "Geometry::Hull", "Patch" {
        Dimensions: 9223372036854775807,4
        Points: *4 {
            a: 0,0,0,1
        }
    }"#,
    );
    assert!(matches!(
        patch,
        SessionError::CorruptAsset {
            source: ImportError::InvalidGeometry { ref object, .. },
            ..
        } if object == "Hull"
    ));
}

#[test]
fn oversized_surface_steps_are_corrupt() {
    let err = open_geometry(
        "huge-step.fbx",
        r#"    Geometry: 1, "Geometry::Sheet", "NurbsSurface" {
        NurbsSurfaceOrder: 2,2
        Dimensions: 2,2
        Step: 1000000,1000000
        Points: *16 {
            a: 0,0,0,1,1,0,0,1,0,1,0,1,1,1,0,1
        }
    }"#,
    );
    assert!(matches!(
        err,
        SessionError::CorruptAsset {
            source: ImportError::InvalidGeometry { .. },
            ..
        }
    ));
}

#[test]
fn settings_can_skip_materials() {
    let path = fixture("no-materials.fbx", PLANE_SCENE.as_bytes());
    let mut session = SceneSession::new();
    let settings = IoSettings {
        materials: false,
        textures: false,
    };
    assert!(session.open_with_settings(&path, settings).unwrap());
    session.descend_to_first_child().unwrap();
    assert_eq!(session.material_count().unwrap(), 0);
    assert_eq!(session.attribute_count().unwrap(), 1);
}

#[test]
fn quads_triangulate_with_their_smoothing() {
    let path = fixture("quad.fbx", QUAD_SCENE.as_bytes());
    let mut session = SceneSession::new();
    session.open(&path).unwrap();
    session.descend_to_first_child().unwrap();
    assert_eq!(session.name().unwrap(), "Quad");

    assert!(!session.is_triangle_mesh(0).unwrap());
    session.triangulate(0).unwrap();
    assert!(session.is_triangle_mesh(0).unwrap());

    let faces = session.faces(0).unwrap().unwrap();
    assert_eq!(faces, vec![0, 0, 1, 1, 2, 2, 0, 3, 2, 4, 3, 5]);
    assert_eq!(session.tex_coords(0).unwrap().unwrap().len(), 12);
    assert_eq!(session.face_smoothing_groups(0).unwrap().unwrap(), vec![4, 4]);
}
