use super::{check_running, open_files, step_started};
use crate::creoson::CadSession;
use crate::inertia;
use crate::model::{
    now_utc, FeatureQuery, FeatureReport, FilteredFeatures, Outcome, Step, WorkflowEvent,
};
use anyhow::{Context, Result};
use tokio::sync::mpsc::UnboundedSender;

/// What the report workflow queries.
#[derive(Debug, Clone)]
pub(crate) struct ReportPlan {
    pub assembly: String,
    pub part: String,
    /// Extra listing of the part restricted to one feature type (e.g. `DATUM_AXIS`).
    pub feature_type: Option<String>,
    /// Feature-id path from the assembly root for a transform lookup.
    pub transform_path: Option<Vec<i64>>,
    pub csys: Option<String>,
    /// Multiplier applied to lengths when the part inertia is moved into the
    /// transform frame.
    pub length_scale: f64,
    pub open_first: bool,
}

/// List assembly features, part mass properties and part features.
pub(crate) async fn run_report<S: CadSession>(
    session: &S,
    plan: &ReportPlan,
    events: &UnboundedSender<WorkflowEvent>,
) -> Result<Outcome<FeatureReport>> {
    if !check_running(session, events).await? {
        return Ok(Outcome::CadNotRunning);
    }

    if plan.open_first {
        open_files(session, &[plan.assembly.as_str(), plan.part.as_str()], events).await?;
    }

    step_started(events, Step::FeatureListAssembly);
    let assembly_features = session
        .feature_list(&FeatureQuery::new(&plan.assembly))
        .await
        .with_context(|| format!("failed to list features of {}", plan.assembly))?;

    step_started(events, Step::MassProperties);
    let mass_properties = session
        .mass_properties(&plan.part)
        .await
        .with_context(|| format!("failed to compute mass properties of {}", plan.part))?;

    step_started(events, Step::FeatureListPart);
    let part_features = session
        .feature_list(&FeatureQuery::new(&plan.part))
        .await
        .with_context(|| format!("failed to list features of {}", plan.part))?;

    let filtered_features = match plan.feature_type.as_deref() {
        Some(feat_type) => {
            step_started(events, Step::DatumFeatures);
            let features = session
                .feature_list(&FeatureQuery::new(&plan.part).with_type(feat_type))
                .await
                .with_context(|| {
                    format!("failed to list {feat_type} features of {}", plan.part)
                })?;
            Some(FilteredFeatures {
                feat_type: feat_type.to_string(),
                features,
            })
        }
        None => None,
    };

    let transform = match plan.transform_path.as_deref() {
        Some(path) => {
            step_started(events, Step::Transform);
            let t = session
                .get_transform(Some(plan.assembly.as_str()), path, plan.csys.as_deref())
                .await
                .with_context(|| format!("failed to get transform for path {path:?}"))?;
            Some(t)
        }
        None => None,
    };

    let frame_inertia = transform.as_ref().and_then(|t| {
        let fi = inertia::in_frame(&mass_properties, t, plan.length_scale);
        if fi.is_none() {
            let _ = events.send(WorkflowEvent::Info(format!(
                "Mass properties of {} lack mass, center of gravity or inertia tensor; \
                 not moving them into the transform frame",
                plan.part
            )));
        }
        fi
    });

    Ok(Outcome::Completed(FeatureReport {
        timestamp_utc: now_utc(),
        assembly: plan.assembly.clone(),
        part: plan.part.clone(),
        assembly_features,
        mass_properties,
        part_features,
        filtered_features,
        transform,
        frame_inertia,
    }))
}
