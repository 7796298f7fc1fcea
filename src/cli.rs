use crate::creoson::CreosonClient;
use crate::geometry::StepImporter;
use crate::model::{ExportFormat, Outcome, RunConfig, WorkflowEvent};
use crate::text_summary::{build_export_summary, build_report_summary, TextSummary};
use crate::workflow::{self, ExportPlan, ReportPlan, NOT_RUNNING_MESSAGE};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

/// Forward workflow progress to stderr so stdout carries only results.
fn spawn_event_printer(
    mut evt_rx: mpsc::UnboundedReceiver<WorkflowEvent>,
    out_tx: mpsc::UnboundedSender<OutputLine>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(ev) = evt_rx.recv().await {
            let line = match ev {
                WorkflowEvent::StepStarted { step } => format!("== {} ==", step.heading()),
                WorkflowEvent::Info(msg) => msg,
            };
            let _ = out_tx.send(OutputLine::Stderr(line));
        }
    })
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "creoson-cli",
    version,
    about = "Query and export Creo models through a CREOSON server"
)]
pub struct Cli {
    /// CREOSON endpoint URL
    #[arg(
        long,
        env = "CREOSON_URL",
        default_value = "http://localhost:9056/creoson",
        global = true
    )]
    pub url: String,

    /// Timeout for each CREOSON call
    #[arg(long, default_value = "30s", global = true)]
    pub timeout: humantime::Duration,

    /// Print JSON result instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Open the named files in Creo before using them
    #[arg(long, global = true)]
    pub open: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// List assembly features, part mass properties and part features
    Report {
        /// Assembly to list features of
        #[arg(long, default_value = "2bars.asm")]
        assembly: String,

        /// Part to compute mass properties and list features of
        #[arg(long, default_value = "bar.prt")]
        part: String,

        /// Also list the part's features of this type (e.g. DATUM_AXIS)
        #[arg(long)]
        feature_type: Option<String>,

        /// Comma-separated feature-id path of a component whose transform to print
        #[arg(long, value_delimiter = ',')]
        transform_path: Option<Vec<i64>>,

        /// Coordinate system the transform is expressed in
        #[arg(long, requires = "transform_path")]
        csys: Option<String>,

        /// Length multiplier for the inertia moved into the transform frame (0.001 for mm to m)
        #[arg(long, default_value_t = 1.0, requires = "transform_path")]
        length_scale: f64,
    },

    /// Export a part to an interchange file and convert STEP exports to STL
    Export {
        /// Part to export
        #[arg(long, default_value = "bar.prt")]
        part: String,

        /// Interchange format Creo writes
        #[arg(long, value_enum, default_value_t = ExportFormat::Step)]
        format: ExportFormat,

        /// STL output path (defaults to the exported file with a .stl extension)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Write ASCII STL instead of binary
        #[arg(long)]
        ascii: bool,

        /// Directory Creo writes the interchange file to (defaults to its working directory)
        #[arg(long)]
        export_dir: Option<String>,

        /// Interchange file name (defaults to the name Creo derives from the part)
        #[arg(long)]
        export_name: Option<String>,

        /// Tessellation tolerance in model units
        #[arg(long, default_value_t = 0.01)]
        tolerance: f64,
    },
}

/// Build a `RunConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> RunConfig {
    RunConfig {
        endpoint: args.url.clone(),
        timeout: Duration::from(args.timeout),
        user_agent: format!("creoson-cli/{}", env!("CARGO_PKG_VERSION")),
        open_before_query: args.open,
    }
}

pub async fn run(args: Cli) -> Result<()> {
    let cfg = build_config(&args);
    let mut client = CreosonClient::new(&cfg).context("failed to build HTTP client")?;
    client
        .connect()
        .await
        .with_context(|| format!("failed to connect to CREOSON at {}", client.endpoint()))?;
    debug!(session_id = ?client.session_id(), "CREOSON session ready");

    let (out_tx, out_handle) = spawn_output_writer();
    let (evt_tx, evt_rx) = mpsc::unbounded_channel::<WorkflowEvent>();
    let printer = spawn_event_printer(evt_rx, out_tx.clone());

    let outcome = run_command(&args, &cfg, &client, &evt_tx).await;

    // Once Creo is reported down nothing else is sent on the session.
    if !matches!(outcome, Ok(Outcome::CadNotRunning)) {
        if let Err(e) = client.disconnect().await {
            warn!(error = %e, "failed to disconnect from CREOSON");
        }
    }

    // Let progress lines drain before results are printed.
    drop(evt_tx);
    let _ = printer.await;

    let result = outcome.map(|outcome| {
        let lines = match outcome {
            Outcome::Completed(lines) => lines,
            Outcome::CadNotRunning => not_running_lines(args.json),
        };
        for line in lines {
            let _ = out_tx.send(OutputLine::Stdout(line));
        }
    });
    drop(out_tx);
    let _ = out_handle.await;
    result
}

/// Run the selected workflow and render a completed report as stdout lines.
async fn run_command(
    args: &Cli,
    cfg: &RunConfig,
    client: &CreosonClient,
    evt_tx: &mpsc::UnboundedSender<WorkflowEvent>,
) -> Result<Outcome<Vec<String>>> {
    match &args.command {
        Command::Report {
            assembly,
            part,
            feature_type,
            transform_path,
            csys,
            length_scale,
        } => {
            let plan = ReportPlan {
                assembly: assembly.clone(),
                part: part.clone(),
                feature_type: feature_type.clone(),
                transform_path: transform_path.clone(),
                csys: csys.clone(),
                length_scale: *length_scale,
                open_first: cfg.open_before_query,
            };
            let outcome = workflow::run_report(client, &plan, evt_tx).await?;
            render_outcome(outcome, args.json, build_report_summary)
        }
        Command::Export {
            part,
            format,
            output,
            ascii,
            export_dir,
            export_name,
            tolerance,
        } => {
            let plan = ExportPlan {
                part: part.clone(),
                format: *format,
                output: output.clone(),
                ascii: *ascii,
                export_dir: export_dir.clone(),
                export_name: export_name.clone(),
                open_first: cfg.open_before_query,
            };

            #[cfg(feature = "step-convert")]
            let importer = crate::geometry::TruckStepImporter::new(*tolerance);
            #[cfg(feature = "step-convert")]
            let importer: Option<&dyn StepImporter> = Some(&importer);
            #[cfg(not(feature = "step-convert"))]
            let importer: Option<&dyn StepImporter> = {
                let _ = tolerance;
                None
            };

            let outcome = workflow::run_export(client, importer, &plan, evt_tx).await?;
            render_outcome(outcome, args.json, build_export_summary)
        }
    }
}

fn render_outcome<T: Serialize>(
    outcome: Outcome<T>,
    json: bool,
    summarize: fn(&T) -> TextSummary,
) -> Result<Outcome<Vec<String>>> {
    let lines = match outcome {
        Outcome::CadNotRunning => return Ok(Outcome::CadNotRunning),
        Outcome::Completed(report) if json => vec![serde_json::to_string_pretty(&report)?],
        Outcome::Completed(report) => summarize(&report).lines,
    };
    Ok(Outcome::Completed(lines))
}

/// What the liveness guard prints; stdout stays JSON in JSON mode.
fn not_running_lines(json: bool) -> Vec<String> {
    if json {
        vec![serde_json::json!({
            "creo_running": false,
            "message": NOT_RUNNING_MESSAGE,
        })
        .to_string()]
    } else {
        vec![NOT_RUNNING_MESSAGE.to_string()]
    }
}
