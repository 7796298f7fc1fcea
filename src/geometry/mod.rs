//! Geometry conversion: STEP in, triangle mesh out.
//!
//! STEP import is delegated to truck (feature `step-convert`); the mesh is kept
//! as plain triangles so writing it back out does not depend on the importer.

#[cfg(feature = "step-convert")]
mod step;
mod stl;

#[cfg(feature = "step-convert")]
pub use step::TruckStepImporter;
pub use stl::export;

use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    #[cfg(feature = "step-convert")]
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "step-convert")]
    #[error("{0} is not a readable STEP file")]
    StepParse(PathBuf),

    #[cfg(feature = "step-convert")]
    #[error("failed to convert STEP shell {shell}: {reason}")]
    ShellConversion { shell: String, reason: String },

    #[error("mesh `{0}` has no triangles")]
    EmptyMesh(String),

    #[error("unsupported mesh output {0}, expected a .stl path")]
    UnsupportedFormat(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [[f64; 3]; 3],
}

impl Triangle {
    pub fn new(a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> Self {
        Self {
            vertices: [a, b, c],
        }
    }

    /// Unit facet normal from counter-clockwise winding; zero for degenerate triangles.
    pub fn normal(&self) -> [f64; 3] {
        let [a, b, c] = self.vertices;
        let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
        let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
        let n = [
            u[1] * v[2] - u[2] * v[1],
            u[2] * v[0] - u[0] * v[2],
            u[0] * v[1] - u[1] * v[0],
        ];
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        if len <= f64::EPSILON {
            return [0.0; 3];
        }
        [n[0] / len, n[1] / len, n[2] / len]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            triangles: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Axis-aligned bounding box as (min, max).
    pub fn bounds(&self) -> Option<([f64; 3], [f64; 3])> {
        let mut points = self.triangles.iter().flat_map(|t| t.vertices.iter());
        let first = *points.next()?;
        let (mut min, mut max) = (first, first);
        for p in points {
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }
        Some((min, max))
    }
}

/// Reads an interchange file into a mesh.
pub trait StepImporter {
    fn import_step(&self, path: &Path) -> Result<Mesh, GeometryError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    StlBinary,
    StlAscii,
}

impl MeshFormat {
    /// Pick the output format for `path`; only `.stl` is supported.
    pub fn for_path(path: &Path, ascii: bool) -> Result<Self, GeometryError> {
        let is_stl = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("stl"));
        if !is_stl {
            return Err(GeometryError::UnsupportedFormat(path.to_path_buf()));
        }
        Ok(if ascii {
            MeshFormat::StlAscii
        } else {
            MeshFormat::StlBinary
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_follows_winding() {
        let t = Triangle::new([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        assert_eq!(t.normal(), [0.0, 0.0, 1.0]);
        let flipped = Triangle::new([0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]);
        assert_eq!(flipped.normal(), [0.0, 0.0, -1.0]);
    }

    #[test]
    fn degenerate_triangle_has_zero_normal() {
        let t = Triangle::new([0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [2.0, 2.0, 2.0]);
        assert_eq!(t.normal(), [0.0; 3]);
    }

    #[test]
    fn bounds_cover_all_vertices() {
        let mut mesh = Mesh::new("bar");
        assert!(mesh.bounds().is_none());
        mesh.triangles
            .push(Triangle::new([0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [0.0, 5.0, 0.0]));
        mesh.triangles
            .push(Triangle::new([0.0, 0.0, -2.0], [1.0, 0.0, 0.0], [0.0, 1.0, 100.0]));
        assert_eq!(
            mesh.bounds(),
            Some(([0.0, 0.0, -2.0], [10.0, 5.0, 100.0]))
        );
    }

    #[test]
    fn format_requires_stl_extension() {
        assert_eq!(
            MeshFormat::for_path(Path::new("out/bar.STL"), false).unwrap(),
            MeshFormat::StlBinary
        );
        assert_eq!(
            MeshFormat::for_path(Path::new("bar.stl"), true).unwrap(),
            MeshFormat::StlAscii
        );
        assert!(matches!(
            MeshFormat::for_path(Path::new("bar.obj"), false),
            Err(GeometryError::UnsupportedFormat(_))
        ));
        assert!(MeshFormat::for_path(Path::new("bar"), false).is_err());
    }
}
