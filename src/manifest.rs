use std::{fs::File, io::{BufRead, BufReader}, path::Path};

use log::{info, warn};

use crate::parse_utils::{split_keyword, strip_comment};

#[derive(Clone, Debug, PartialEq)]
pub struct MeshEntry {
    pub mesh: String,
    pub texture: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BlendEntry {
    pub mesh: String,
    pub name: String,
}

/// Scene description: textures to load, meshes to draw, and the blend targets
/// applied to the head mesh.
///
/// ```text
/// # comment
/// TEXTURE face.jpg
/// MESH head.obj face.jpg
/// BLEND smile.obj smile
/// FACS au12.obj AU12
/// ```
///
/// Once a `FACS` line is seen, any later `BLEND` lines are ignored.
#[derive(Default, Debug, PartialEq)]
pub struct Manifest {
    pub textures: Vec<String>,
    pub meshes: Vec<MeshEntry>,
    pub blends: Vec<BlendEntry>,
}

impl Manifest {
    pub fn parse<R: BufRead>(reader: R) -> Manifest {
        let mut manifest = Manifest::default();
        let mut facs_seen = false;

        for (line_idx, line) in reader.lines().enumerate() {
            let line_no = line_idx + 1;

            let line = match line {
                Ok(v) => v,
                Err(e) => {
                    warn!("Manifest read failed at line {}: {}", line_no, e);
                    break;
                }
            };

            let (key, args) = match split_keyword(strip_comment(&line)) {
                Some(v) => v,
                None => continue
            };

            match key {
                "TEXTURE" => {
                    match args.first() {
                        Some(name) => manifest.textures.push(name.to_string()),
                        None => warn!("Manifest line {}: TEXTURE needs a file name", line_no)
                    }
                }
                "MESH" => {
                    if args.len() < 2 {
                        warn!("Manifest line {}: MESH needs a mesh and a texture", line_no);
                        continue;
                    }

                    manifest.meshes.push(MeshEntry { mesh: args[0].to_string(), texture: args[1].to_string() });
                }
                "BLEND" | "FACS" => {
                    if key == "FACS" {
                        facs_seen = true;
                    }
                    else if facs_seen {
                        continue;
                    }

                    match args.first() {
                        Some(mesh) => manifest.blends.push(BlendEntry {
                            mesh: mesh.to_string(),
                            name: args.get(1).map(|x| x.to_string()).unwrap_or_default(),
                        }),
                        None => warn!("Manifest line {}: {} needs a mesh", line_no, key)
                    }
                }
                _ => {
                    warn!("Unknown manifest keyword: {}", key);
                }
            }
        }

        manifest
    }

    /// Read a manifest file. An unreadable file is logged and yields an empty manifest.
    pub fn load(path: &Path) -> Manifest {
        let file = match File::open(path) {
            Ok(v) => v,
            Err(e) => {
                warn!("Cannot read {}: {}", path.display(), e);
                return Manifest::default();
            }
        };

        info!("Loading {}", path.display());

        let manifest = Manifest::parse(BufReader::new(file));
        info!("{} textures, {} meshes, {} blend targets", manifest.textures.len(), manifest.meshes.len(), manifest.blends.len());

        manifest
    }

    /// Blend-target meshes, in manifest order
    pub fn blend_meshes(self: &Self) -> Vec<&str> {
        self.blends.iter().map(|x| x.mesh.as_str()).collect()
    }
}
