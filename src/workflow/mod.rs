//! The two CAD workflows.
//!
//! Both are straight call chains against a `CadSession`: a liveness guard,
//! then queries (report) or export + conversion (export). Progress goes out as
//! `WorkflowEvent`s for the presentation layer.

mod export;
mod report;

pub(crate) use export::{run_export, ExportPlan};
pub(crate) use report::{run_report, ReportPlan};

use crate::creoson::CadSession;
use crate::model::{Step, WorkflowEvent};
use anyhow::{Context, Result};
use tokio::sync::mpsc::UnboundedSender;
use tracing::info;

/// Printed when the liveness guard stops a workflow.
pub(crate) const NOT_RUNNING_MESSAGE: &str = "CREO is not running!";

fn step_started(events: &UnboundedSender<WorkflowEvent>, step: Step) {
    info!(?step, "step started");
    let _ = events.send(WorkflowEvent::StepStarted { step });
}

/// Liveness guard shared by both workflows. Returns false when Creo is down.
async fn check_running<S: CadSession>(
    session: &S,
    events: &UnboundedSender<WorkflowEvent>,
) -> Result<bool> {
    step_started(events, Step::Liveness);
    let running = session
        .is_running()
        .await
        .context("failed to query whether Creo is running")?;
    if !running {
        info!("Creo is not running, stopping");
    }
    Ok(running)
}

/// Open each file in Creo before it is queried.
async fn open_files<S: CadSession>(
    session: &S,
    files: &[&str],
    events: &UnboundedSender<WorkflowEvent>,
) -> Result<()> {
    step_started(events, Step::OpenFiles);
    for file in files {
        let loaded = session
            .open_file(file)
            .await
            .with_context(|| format!("failed to open {file}"))?;
        let _ = events.send(WorkflowEvent::Info(format!(
            "Opened {file} ({} file(s) loaded)",
            loaded.len()
        )));
    }
    Ok(())
}
