use crate::core::geometry::{DeltaFrame, VertexAttributes};
use crate::scene::blendshape::Blendshape;
use crate::scene::mesh::Mesh;
use crate::scene::source::{BakeOrigin, MeshSink};
use crate::scene::utils::compute_bounds;
use crate::Result;
use chrono::Utc;
use log::{debug, info};
use nalgebra::{Point3, Vector3, Vector4};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

pub const ASSET_EXTENSION: &str = "asset.json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Aabb {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FrameAsset {
    pub weight: f32,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub tangents: Vec<[f32; 3]>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BlendshapeAsset {
    pub name: String,
    pub frames: Vec<FrameAsset>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BakedFrom {
    pub mesh: String,
    pub blendshape: String,
    pub blendshape_index: usize,
    pub frame: usize,
    pub weight: f32,
}

/// On-disk form of a baked mesh.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MeshAsset {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub tangents: Vec<[f32; 4]>,
    pub indices: Vec<u32>,
    pub aabb: Option<Aabb>,
    #[serde(default)]
    pub blendshapes: Vec<BlendshapeAsset>,
    pub baked_from: Option<BakedFrom>,
    /// RFC 3339 UTC timestamp.
    pub baked_at: Option<String>,
}

impl MeshAsset {
    pub fn from_mesh(mesh: &Mesh, origin: Option<&BakeOrigin>) -> Self {
        let attributes = &mesh.attributes;
        Self {
            name: mesh.name.clone(),
            positions: attributes.positions.iter().map(|p| p.coords.into()).collect(),
            normals: attributes.normals.iter().map(|n| (*n).into()).collect(),
            tangents: attributes.tangents.iter().map(|t| (*t).into()).collect(),
            indices: mesh.indices.clone(),
            aabb: compute_bounds(mesh).map(|(min, max)| Aabb {
                min: min.coords.into(),
                max: max.coords.into(),
            }),
            blendshapes: mesh
                .blendshapes
                .iter()
                .map(|b| BlendshapeAsset {
                    name: b.name.clone(),
                    frames: b
                        .frames
                        .iter()
                        .map(|f| FrameAsset {
                            weight: f.weight,
                            positions: to_arrays(&f.deltas.positions),
                            normals: to_arrays(&f.deltas.normals),
                            tangents: to_arrays(&f.deltas.tangents),
                        })
                        .collect(),
                })
                .collect(),
            baked_from: origin.map(|o| BakedFrom {
                mesh: o.source_mesh.clone(),
                blendshape: o.blendshape.clone(),
                blendshape_index: o.blendshape_index,
                frame: o.frame,
                weight: o.weight,
            }),
            baked_at: origin.map(|_| Utc::now().to_rfc3339()),
        }
    }

    /// Rebuilds the mesh, checking every array against the vertex count.
    pub fn into_mesh(self) -> Result<Mesh> {
        let attributes = VertexAttributes::new(
            self.positions.into_iter().map(Point3::from).collect(),
            self.normals.into_iter().map(Vector3::from).collect(),
            self.tangents.into_iter().map(Vector4::from).collect(),
        );
        attributes.validate()?;

        let mut mesh = Mesh::new(self.name, attributes, self.indices);
        for shape in self.blendshapes {
            let mut blendshape = Blendshape::new(shape.name);
            for frame in shape.frames {
                let deltas = DeltaFrame::new(
                    from_arrays(frame.positions),
                    from_arrays(frame.normals),
                    from_arrays(frame.tangents),
                );
                blendshape = blendshape.with_frame(frame.weight, deltas);
            }
            mesh.add_blendshape(blendshape)?;
        }
        Ok(mesh)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&content)?)
    }
}

fn to_arrays(vectors: &[Vector3<f32>]) -> Vec<[f32; 3]> {
    vectors.iter().map(|v| (*v).into()).collect()
}

fn from_arrays(arrays: Vec<[f32; 3]>) -> Vec<Vector3<f32>> {
    arrays.into_iter().map(Vector3::from).collect()
}

/// Writes baked meshes as JSON files into one directory.
///
/// File names are `<mesh>.asset.json`, then `<mesh> 1.asset.json`,
/// `<mesh> 2.asset.json`, ... so existing assets are never replaced.
pub struct FileAssetStore {
    dir: PathBuf,
    pretty: bool,
}

impl FileAssetStore {
    pub fn new(dir: impl Into<PathBuf>, pretty: bool) -> Self {
        Self {
            dir: dir.into(),
            pretty,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Links the finished file at `temp_path` to the first free asset path
    /// for `stem`.
    ///
    /// `hard_link` fails on an existing name instead of replacing it, so a
    /// file created by another writer is skipped, never overwritten.
    fn publish(&self, temp_path: &Path, stem: &str) -> Result<PathBuf> {
        let mut n = 0usize;
        loop {
            let file_name = match n {
                0 => format!("{stem}.{ASSET_EXTENSION}"),
                n => format!("{stem} {n}.{ASSET_EXTENSION}"),
            };
            let path = self.dir.join(file_name);
            match fs::hard_link(temp_path, &path) {
                Ok(()) => return Ok(path),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => n += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn write_json(&self, asset: &MeshAsset, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        if self.pretty {
            serde_json::to_writer_pretty(&mut writer, asset)?;
        } else {
            serde_json::to_writer(&mut writer, asset)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl MeshSink for FileAssetStore {
    fn commit(&mut self, mesh: &Mesh, origin: &BakeOrigin) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;

        let asset = MeshAsset::from_mesh(mesh, Some(origin));
        let stem = sanitize_file_name(&mesh.name);
        let temp_path = self.dir.join(format!(".{stem}.{}.tmp", std::process::id()));

        debug!("Writing asset to temporary file '{}'", temp_path.display());
        let published = self
            .write_json(&asset, &temp_path)
            .and_then(|()| self.publish(&temp_path, &stem));
        fs::remove_file(&temp_path).ok();
        let path = published?;

        info!("Saved mesh asset '{}'", path.display());
        Ok(path)
    }
}

fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        "Mesh".to_string()
    } else {
        cleaned.to_string()
    }
}
