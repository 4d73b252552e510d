//! OBJ file loader for 3D models
//!
//! Each `o`/`g` block becomes its own mesh. A file with a single object
//! loads as one entity; several objects load as an empty root with one
//! child per object.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::assets::{AssetError, AssetLoader, MeshLibrary};
use crate::ecs::components::MeshRenderer;
use crate::render::material::{Material, SharedMaterial};
use crate::render::mesh::{Mesh, Vertex};
use crate::scene::EntityTemplate;

const DEFAULT_NORMAL: [f32; 3] = [0.0, 1.0, 0.0];
const DEFAULT_TEX_COORD: [f32; 2] = [0.0, 0.0];

/// Loads Wavefront OBJ files into entity templates
pub struct ObjLoader {
    search_paths: Vec<PathBuf>,
    material: SharedMaterial,
    library: MeshLibrary,
}

impl Default for ObjLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjLoader {
    /// Loader that resolves paths as given and assigns a plain default
    /// material to every object
    pub fn new() -> Self {
        Self {
            search_paths: Vec::new(),
            material: Material::new("default").into_shared(),
            library: MeshLibrary::new(),
        }
    }

    /// Add a directory to search for relative paths
    pub fn with_search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_paths.push(path.into());
        self
    }

    /// Material given to every loaded object
    pub fn with_material(mut self, material: SharedMaterial) -> Self {
        self.material = material;
        self
    }

    /// Every mesh loaded so far, keyed by name
    pub fn library(&self) -> &MeshLibrary {
        &self.library
    }

    /// Take the loaded meshes
    pub fn into_library(self) -> MeshLibrary {
        self.library
    }

    fn resolve(&self, path: &Path) -> Option<PathBuf> {
        self.search_paths
            .iter()
            .map(|dir| dir.join(path))
            .chain(std::iter::once(path.to_path_buf()))
            .find(|candidate| candidate.exists())
    }

    /// Parse OBJ text into one mesh per object. Mesh names are
    /// `base_name` for an unnamed object and `base_name/object` otherwise.
    pub fn parse<R: BufRead>(base_name: &str, reader: R) -> Result<Vec<Mesh>, AssetError> {
        let mut positions = Vec::new();
        let mut normals = Vec::new();
        let mut tex_coords = Vec::new();
        let mut meshes = Vec::new();
        let mut current = ObjectBuilder::new(base_name.to_string());

        for (line_number, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut parts = line.split_whitespace();
            let Some(keyword) = parts.next() else { continue };
            let args: Vec<&str> = parts.collect();
            let line_number = line_number + 1;

            match keyword {
                "v" => positions.push(parse_floats::<3>(&args, line_number)?),
                "vn" => normals.push(parse_floats::<3>(&args, line_number)?),
                "vt" => tex_coords.push(parse_floats::<2>(&args, line_number)?),
                "o" | "g" => {
                    let name = args.first().map_or_else(
                        || base_name.to_string(),
                        |object| format!("{base_name}/{object}"),
                    );
                    let finished = std::mem::replace(&mut current, ObjectBuilder::new(name));
                    meshes.extend(finished.finish());
                }
                "f" => {
                    if args.len() < 3 {
                        return Err(parse_error(line_number, "face needs at least 3 vertices"));
                    }
                    let mut face = Vec::with_capacity(args.len());
                    for corner in &args {
                        let vertex = parse_corner(corner, &positions, &tex_coords, &normals, line_number)?;
                        face.push(current.push_vertex(vertex));
                    }
                    // Fan triangulation
                    for i in 1..face.len() - 1 {
                        current.indices.extend_from_slice(&[face[0], face[i], face[i + 1]]);
                    }
                }
                _ => {}
            }
        }
        meshes.extend(current.finish());

        if meshes.is_empty() {
            return Err(AssetError::InvalidData(format!("{base_name}: no faces found")));
        }
        Ok(meshes)
    }
}

impl AssetLoader for ObjLoader {
    fn load(&mut self, path: &Path) -> Result<EntityTemplate, AssetError> {
        let is_obj = path
            .extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| extension.eq_ignore_ascii_case("obj"));
        if !is_obj {
            return Err(AssetError::UnsupportedFormat(path.display().to_string()));
        }
        let resolved = self
            .resolve(path)
            .ok_or_else(|| AssetError::NotFound(path.display().to_string()))?;
        let base_name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("model")
            .to_string();

        let meshes = Self::parse(&base_name, BufReader::new(File::open(&resolved)?))?;
        log::info!("Loaded {} mesh(es) from {}", meshes.len(), resolved.display());

        let mut templates: Vec<EntityTemplate> = meshes
            .into_iter()
            .map(|mesh| {
                let name = mesh.name.rsplit('/').next().unwrap_or(&mesh.name).to_string();
                let mesh = self.library.insert(mesh);
                EntityTemplate::new(name).with_component(MeshRenderer::new(mesh, Rc::clone(&self.material)))
            })
            .collect();

        if templates.len() == 1 {
            if let Some(mut single) = templates.pop() {
                single.name = base_name;
                return Ok(single);
            }
        }
        Ok(templates
            .into_iter()
            .fold(EntityTemplate::new(base_name), EntityTemplate::with_child))
    }
}

struct ObjectBuilder {
    name: String,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl ObjectBuilder {
    fn new(name: String) -> Self {
        Self {
            name,
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    fn push_vertex(&mut self, vertex: Vertex) -> u32 {
        self.vertices.push(vertex);
        (self.vertices.len() - 1) as u32
    }

    fn finish(self) -> Option<Mesh> {
        if self.indices.is_empty() {
            return None;
        }
        Some(Mesh::new(self.name, self.vertices, self.indices))
    }
}

fn parse_error(line: usize, message: &str) -> AssetError {
    AssetError::InvalidData(format!("line {line}: {message}"))
}

fn parse_floats<const N: usize>(args: &[&str], line: usize) -> Result<[f32; N], AssetError> {
    let mut values = [0.0; N];
    if args.len() < N {
        return Err(parse_error(line, "not enough components"));
    }
    for (value, arg) in values.iter_mut().zip(args) {
        *value = arg.parse().map_err(|_| parse_error(line, &format!("invalid number '{arg}'")))?;
    }
    Ok(values)
}

/// Resolve a 1-based (or negative, relative) OBJ index
fn resolve_index(raw: &str, len: usize, line: usize) -> Result<usize, AssetError> {
    let index: i64 = raw.parse().map_err(|_| parse_error(line, &format!("invalid index '{raw}'")))?;
    let resolved = match index {
        0 => None,
        i if i > 0 => usize::try_from(i - 1).ok(),
        i => usize::try_from(len as i64 + i).ok(),
    };
    resolved
        .filter(|&i| i < len)
        .ok_or_else(|| parse_error(line, &format!("index {index} out of bounds")))
}

fn parse_corner(
    corner: &str,
    positions: &[[f32; 3]],
    tex_coords: &[[f32; 2]],
    normals: &[[f32; 3]],
    line: usize,
) -> Result<Vertex, AssetError> {
    let mut fields = corner.split('/');
    let position = fields
        .next()
        .ok_or_else(|| parse_error(line, "empty face corner"))
        .and_then(|raw| resolve_index(raw, positions.len(), line))?;
    let tex_coord = match fields.next().filter(|raw| !raw.is_empty()) {
        Some(raw) => tex_coords[resolve_index(raw, tex_coords.len(), line)?],
        None => DEFAULT_TEX_COORD,
    };
    let normal = match fields.next().filter(|raw| !raw.is_empty()) {
        Some(raw) => normals[resolve_index(raw, normals.len(), line)?],
        None => DEFAULT_NORMAL,
    };
    Ok(Vertex::new(positions[position], normal, tex_coord))
}
