use super::{check_running, open_files, step_started};
use crate::creoson::CadSession;
use crate::geometry::{self, MeshFormat, StepImporter};
use crate::model::{
    now_utc, ExportFormat, ExportReport, ExportRequest, MeshSummary, Outcome, Step, Vector3,
    WorkflowEvent,
};
use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use tokio::sync::mpsc::UnboundedSender;

/// What the export workflow writes.
#[derive(Debug, Clone)]
pub(crate) struct ExportPlan {
    pub part: String,
    pub format: ExportFormat,
    /// Mesh output path; defaults to the exported file with a `.stl` extension.
    pub output: Option<PathBuf>,
    pub ascii: bool,
    /// Directory Creo writes the interchange file to, instead of its working directory.
    pub export_dir: Option<String>,
    /// Interchange file name, instead of the one Creo derives from the model.
    pub export_name: Option<String>,
    pub open_first: bool,
}

/// Export a part to an interchange file and, for STEP, convert it to STL.
///
/// `importer` is `None` when the build carries no STEP reader; the interchange
/// file is still written.
pub(crate) async fn run_export<S: CadSession>(
    session: &S,
    importer: Option<&dyn StepImporter>,
    plan: &ExportPlan,
    events: &UnboundedSender<WorkflowEvent>,
) -> Result<Outcome<ExportReport>> {
    // Reject mesh options that cannot apply before touching Creo.
    if plan.format != ExportFormat::Step && (plan.output.is_some() || plan.ascii) {
        bail!(
            "--output and --ascii only apply to STEP exports, not {}",
            plan.format.as_creoson_str()
        );
    }
    if let Some(out) = plan.output.as_deref() {
        MeshFormat::for_path(out, plan.ascii)?;
    }

    if !check_running(session, events).await? {
        return Ok(Outcome::CadNotRunning);
    }

    if plan.open_first {
        open_files(session, &[plan.part.as_str()], events).await?;
    }

    step_started(events, Step::ExportInterchange);
    let exported = session
        .export_file(&ExportRequest {
            filename: plan.export_name.clone(),
            dirname: plan.export_dir.clone(),
            ..ExportRequest::new(&plan.part, plan.format)
        })
        .await
        .with_context(|| {
            format!(
                "failed to export {} as {}",
                plan.part,
                plan.format.as_creoson_str()
            )
        })?;

    step_started(events, Step::WorkingDirectory);
    let working_directory = session
        .working_directory()
        .await
        .context("failed to read the Creo working directory")?;
    let exported_path = exported.path_in(&working_directory);
    let _ = events.send(WorkflowEvent::Info(format!(
        "Exported {}",
        exported_path.display()
    )));

    let mesh = match (plan.format, importer) {
        (ExportFormat::Step, Some(importer)) => {
            step_started(events, Step::ImportGeometry);
            let mesh = importer
                .import_step(&exported_path)
                .with_context(|| format!("failed to import {}", exported_path.display()))?;

            step_started(events, Step::WriteMesh);
            let out = plan
                .output
                .clone()
                .unwrap_or_else(|| exported_path.with_extension("stl"));
            let format = MeshFormat::for_path(&out, plan.ascii)?;
            geometry::export(&mesh, &out, format)
                .with_context(|| format!("failed to write {}", out.display()))?;

            Some(MeshSummary {
                path: out,
                triangles: mesh.triangles.len(),
                ascii: format == MeshFormat::StlAscii,
                bounds: mesh.bounds().map(|(min, max)| (to_vector(min), to_vector(max))),
            })
        }
        (ExportFormat::Step, None) => {
            let _ = events.send(WorkflowEvent::Info(
                "STEP conversion is not available in this build, skipping mesh output".into(),
            ));
            None
        }
        _ => None,
    };

    Ok(Outcome::Completed(ExportReport {
        timestamp_utc: now_utc(),
        part: plan.part.clone(),
        format: plan.format,
        exported: exported_path,
        working_directory,
        mesh,
    }))
}

fn to_vector(p: [f64; 3]) -> Vector3 {
    Vector3 {
        x: p[0],
        y: p[1],
        z: p[2],
    }
}
