use super::{GeometryError, Mesh, StepImporter, Triangle};
use std::path::Path;
use tracing::{debug, info};
use truck_meshalgo::prelude::*;
use truck_meshalgo::tessellation::{MeshableShape, MeshedShape};
use truck_stepio::r#in::Table;

/// STEP reader backed by truck: parse, rebuild each shell, tessellate.
#[derive(Debug, Clone, Copy)]
pub struct TruckStepImporter {
    /// Chordal tolerance for tessellation, in model units.
    pub tolerance: f64,
}

impl TruckStepImporter {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }
}

impl StepImporter for TruckStepImporter {
    fn import_step(&self, path: &Path) -> Result<Mesh, GeometryError> {
        let text = std::fs::read_to_string(path).map_err(|source| GeometryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let table =
            Table::from_step(&text).ok_or_else(|| GeometryError::StepParse(path.to_path_buf()))?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut mesh = Mesh::new(name);
        for (id, holder) in table.shell.iter() {
            let shell = table
                .to_compressed_shell(holder)
                .map_err(|e| GeometryError::ShellConversion {
                    shell: format!("#{id}"),
                    reason: format!("{e:?}"),
                })?;
            let polygon = shell.triangulation(self.tolerance).to_polygon();
            let before = mesh.triangles.len();
            push_triangles(&polygon, &mut mesh.triangles);
            debug!(shell = %id, triangles = mesh.triangles.len() - before, "tessellated shell");
        }

        if mesh.is_empty() {
            return Err(GeometryError::EmptyMesh(mesh.name));
        }
        info!(
            path = %path.display(),
            shells = table.shell.len(),
            triangles = mesh.triangles.len(),
            "imported STEP"
        );
        Ok(mesh)
    }
}

fn push_triangles(polygon: &PolygonMesh, out: &mut Vec<Triangle>) {
    let positions = polygon.positions();
    for tri in polygon.faces().triangle_iter() {
        out.push(Triangle {
            vertices: tri.map(|v| {
                let p = positions[v.pos];
                [p.x, p.y, p.z]
            }),
        });
    }
}
