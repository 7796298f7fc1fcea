use super::{GeometryError, Mesh, MeshFormat};
use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Write `mesh` to `path` in the given format.
pub fn export(mesh: &Mesh, path: &Path, format: MeshFormat) -> Result<(), GeometryError> {
    if mesh.is_empty() {
        return Err(GeometryError::EmptyMesh(mesh.name.clone()));
    }
    let write_err = |source: std::io::Error| GeometryError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    match format {
        MeshFormat::StlAscii => {
            std::fs::write(path, to_stl_ascii(mesh)).map_err(write_err)?;
        }
        MeshFormat::StlBinary => {
            let file = std::fs::File::create(path).map_err(write_err)?;
            let mut out = std::io::BufWriter::new(file);
            stl_io::write_stl(&mut out, to_stl_triangles(mesh).iter()).map_err(write_err)?;
            out.flush().map_err(write_err)?;
        }
    }
    info!(
        path = %path.display(),
        triangles = mesh.triangles.len(),
        ?format,
        "wrote mesh"
    );
    Ok(())
}

fn to_stl_triangles(mesh: &Mesh) -> Vec<stl_io::Triangle> {
    use stl_io::{Normal, Triangle, Vertex};

    mesh.triangles
        .iter()
        .map(|t| {
            let n = t.normal();
            Triangle {
                normal: Normal::new([n[0] as f32, n[1] as f32, n[2] as f32]),
                vertices: t
                    .vertices
                    .map(|p| Vertex::new([p[0] as f32, p[1] as f32, p[2] as f32])),
            }
        })
        .collect()
}

fn to_stl_ascii(mesh: &Mesh) -> String {
    let name = if mesh.name.is_empty() {
        "mesh"
    } else {
        mesh.name.as_str()
    };
    let mut out = String::new();
    let _ = writeln!(out, "solid {name}");
    for t in &mesh.triangles {
        let n = t.normal();
        let _ = writeln!(out, "  facet normal {:.6} {:.6} {:.6}", n[0], n[1], n[2]);
        out.push_str("    outer loop\n");
        for p in &t.vertices {
            let _ = writeln!(out, "      vertex {:.6} {:.6} {:.6}", p[0], p[1], p[2]);
        }
        out.push_str("    endloop\n");
        out.push_str("  endfacet\n");
    }
    let _ = writeln!(out, "endsolid {name}");
    out
}
