use std::collections::HashSet;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use fbxwalk::fbxwalk_session::{IoSettings, SceneSession};
use fbxwalk::profiling::{Recorder, ScopeTiming};
use fbxwalk::{formats, Fbxwalk, LoadOptions, LoadedScene};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// FBX file to inspect
    path: PathBuf,

    /// Print the node tree with attribute types and material names
    #[arg(long, default_value_t = false)]
    tree: bool,

    /// Print a summary of every loaded mesh and material
    #[arg(long, default_value_t = false)]
    meshes: bool,

    /// Keep polygons as they are stored instead of triangulating them
    #[arg(long, default_value_t = false)]
    no_triangulate: bool,

    /// Keep material alpha instead of forcing it to 1
    #[arg(long, default_value_t = false)]
    keep_alpha: bool,

    /// Skip materials while importing
    #[arg(long, default_value_t = false)]
    no_materials: bool,

    /// Skip textures while importing
    #[arg(long, default_value_t = false)]
    no_textures: bool,

    /// Print how long each profiled scope took
    #[arg(long, default_value_t = false)]
    profile: bool,
}

impl Args {
    fn settings(&self) -> IoSettings {
        IoSettings {
            materials: !self.no_materials,
            textures: !self.no_textures,
        }
    }

    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            triangulate: !self.no_triangulate,
            force_opaque: !self.keep_alpha,
            settings: self.settings(),
        }
    }
}

pub fn internal_main() -> Result<()> {
    let _fbxwalk = Fbxwalk::new("FBX Inspect");
    let args = Args::parse();

    let recorder = args.profile.then(Recorder::start);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let (tree, meshes) = match (args.tree, args.meshes) {
        (false, false) => (true, true),
        selection => selection,
    };

    formats::check_extension(&args.path)?;

    if tree {
        let mut session = SceneSession::new();
        session.open_with_settings(&args.path, args.settings())?;
        print_tree(&mut session, 0, &mut out)?;
    }

    if meshes {
        let scene = formats::load(&args.path, &args.load_options())?;
        print_meshes(&scene, &mut out)?;
    }

    if let Some(recorder) = recorder {
        print_timings(&recorder.finish(), &mut out)?;
    }
    Ok(())
}

fn print_timings(timings: &[ScopeTiming], out: &mut impl Write) -> Result<()> {
    writeln!(out, "profile")?;
    for timing in timings {
        writeln!(
            out,
            "  {:>10.3} ms  {:>6} calls  {}",
            timing.total_ns as f64 / 1e6,
            timing.calls,
            timing.name
        )?;
    }
    Ok(())
}

fn print_tree(session: &mut SceneSession, depth: usize, out: &mut impl Write) -> Result<()> {
    puffin::profile_function!();

    let mut line = format!("{}{}", "  ".repeat(depth), session.name()?);

    let mut attributes = Vec::new();
    for index in 0..session.attribute_count()? {
        attributes.push(session.attribute_type(index)?.to_string());
    }
    if !attributes.is_empty() {
        line.push_str(&format!(" [{}]", attributes.join(", ")));
    }

    let mut materials = Vec::new();
    for index in 0..session.material_count()? {
        materials.push(session.material_name(index)?);
    }
    if !materials.is_empty() {
        line.push_str(&format!(" ({})", materials.join(", ")));
    }
    writeln!(out, "{}", line)?;

    if session.descend_to_first_child()? {
        loop {
            print_tree(session, depth + 1, out)?;
            if !session.advance_to_next_sibling()? {
                break;
            }
        }
        session.ascend_to_parent()?;
    }
    Ok(())
}

fn print_meshes(scene: &LoadedScene, out: &mut impl Write) -> Result<()> {
    for mesh in &scene.meshes {
        let material = mesh
            .material
            .and_then(|index| scene.materials.get(index))
            .map_or("none", |material| material.name.as_str());
        let groups: HashSet<i32> = mesh.smoothing_groups.iter().copied().collect();

        writeln!(
            out,
            "{}/{}: {} vertices, {} triangles, {} uvs, {} smoothing groups, material {}",
            mesh.node_name,
            mesh.attribute_name,
            mesh.vertices.len(),
            mesh.triangle_count(),
            mesh.tex_coords.len(),
            groups.len(),
            material
        )?;
    }

    for material in &scene.materials {
        writeln!(out, "material {}", material.name)?;
        if let Some(color) = material.diffuse_color {
            writeln!(out, "  diffuse {:?}", color.to_array())?;
        }
        if let Some(color) = material.specular_color {
            writeln!(out, "  specular {:?}", color.to_array())?;
        }
        if let Some(power) = material.specular_power {
            writeln!(out, "  specular power {}", power)?;
        }
        for (slot, map) in [
            ("diffuse map", &material.diffuse_map),
            ("specular map", &material.specular_map),
            ("bump map", &material.bump_map),
            ("self illumination map", &material.self_illumination_map),
        ] {
            if let Some(map) = map {
                writeln!(out, "  {} {}", slot, map.display())?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = r#"; FBX 7.4.0 project file
Objects:  {
	Geometry: 1, "Geometry::Box", "Mesh" {
		Vertices: *12 {
			a: 0,0,0,1,0,0,1,1,0,0,1,0
		}
		PolygonVertexIndex: *4 {
			a: 0,1,2,-4
		}
	}
	Model: 10, "Model::Root", "Null" {
	}
	Model: 11, "Model::Box", "Mesh" {
	}
	Material: 20, "Material::Clay", "" {
	}
}
Connections:  {
	C: "OO",10,0
	C: "OO",11,10
	C: "OO",1,11
	C: "OO",20,11
}
"#;

    fn fixture(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("fbx-inspect-{}-{}", std::process::id(), name));
        std::fs::write(&path, SCENE).unwrap();
        path
    }

    #[test]
    fn flags_map_to_options() {
        let args = Args::try_parse_from([
            "fbx-inspect",
            "scene.fbx",
            "--no-triangulate",
            "--keep-alpha",
            "--no-textures",
        ])
        .unwrap();
        let options = args.load_options();
        assert!(!options.triangulate);
        assert!(!options.force_opaque);
        assert!(options.settings.materials);
        assert!(!options.settings.textures);
    }

    #[test]
    fn tree_lists_attributes_and_materials() {
        let mut session = SceneSession::new();
        session.open(fixture("tree.fbx")).unwrap();

        let mut out = Vec::new();
        print_tree(&mut session, 0, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "RootNode\n  Root\n    Box [mesh] (Clay)\n"
        );
        assert_eq!(session.name().unwrap(), "RootNode");
    }

    #[test]
    fn timings_are_listed_in_milliseconds() {
        let timings = [
            ScopeTiming {
                name: "load".to_owned(),
                calls: 1,
                total_ns: 2_500_000,
            },
            ScopeTiming {
                name: "print_tree".to_owned(),
                calls: 3,
                total_ns: 40_000,
            },
        ];

        let mut out = Vec::new();
        print_timings(&timings, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "profile\n       2.500 ms       1 calls  load\n       0.040 ms       3 calls  print_tree\n"
        );
    }

    #[test]
    fn mesh_summary_mentions_materials() {
        let scene = formats::load(fixture("meshes.fbx"), &LoadOptions::default()).unwrap();

        let mut out = Vec::new();
        print_meshes(&scene, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Box/Box: 4 vertices, 2 triangles, 1 uvs, 1 smoothing groups, material Clay\n"));
        assert!(text.contains("material Clay\n  diffuse [0.2, 0.2, 0.2, 1.0]\n"));
    }
}
