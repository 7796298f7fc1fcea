use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub endpoint: String,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    pub user_agent: String,
    /// Open the target files in Creo before querying them.
    #[serde(default)]
    pub open_before_query: bool,
}

/// A 3D vector as CREOSON encodes it (`{"x": .., "y": .., "z": ..}`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

/// Inertia tensor rows, one vector per axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InertiaTensor {
    pub x_axis: Vector3,
    pub y_axis: Vector3,
    pub z_axis: Vector3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub feat_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub feat_id: Option<i64>,
    #[serde(default)]
    pub feat_number: Option<i64>,
    // Fields added by newer CREOSON releases are carried through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MassProperties {
    #[serde(default)]
    pub volume: Option<f64>,
    #[serde(default)]
    pub surface_area: Option<f64>,
    #[serde(default)]
    pub density: Option<f64>,
    #[serde(default)]
    pub mass: Option<f64>,
    #[serde(default)]
    pub center_of_gravity: Option<Vector3>,
    #[serde(default)]
    pub coord_sys_inertia: Option<InertiaTensor>,
    #[serde(default)]
    pub coord_sys_inertia_tensor: Option<InertiaTensor>,
    #[serde(default)]
    pub ctr_grav_inertia_tensor: Option<InertiaTensor>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub origin: Vector3,
    pub x_axis: Vector3,
    pub y_axis: Vector3,
    pub z_axis: Vector3,
    #[serde(default)]
    pub x_rot: Option<f64>,
    #[serde(default)]
    pub y_rot: Option<f64>,
    #[serde(default)]
    pub z_rot: Option<f64>,
}

/// Feature listing of one model, optionally restricted to a feature type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureQuery {
    pub file: String,
    pub feat_type: Option<String>,
}

impl FeatureQuery {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, feat_type: impl Into<String>) -> Self {
        self.feat_type = Some(feat_type.into());
        self
    }
}

/// Interchange formats Creo can write through `interface/export_file`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum ExportFormat {
    Step,
    Iges,
    Vrml,
}

impl ExportFormat {
    /// Value of the `type` field CREOSON expects.
    pub fn as_creoson_str(self) -> &'static str {
        match self {
            ExportFormat::Step => "STEP",
            ExportFormat::Iges => "IGES",
            ExportFormat::Vrml => "VRML",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    pub file: String,
    pub format: ExportFormat,
    /// Output file name; Creo derives one from the model name when unset.
    pub filename: Option<String>,
    /// Output directory; Creo writes to its working directory when unset.
    pub dirname: Option<String>,
}

impl ExportRequest {
    pub fn new(file: impl Into<String>, format: ExportFormat) -> Self {
        Self {
            file: file.into(),
            format,
            filename: None,
            dirname: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedFile {
    pub dirname: String,
    pub filename: String,
}

impl ExportedFile {
    /// Full path of the exported file, resolved against `fallback_dir` when
    /// CREOSON did not report a directory.
    pub fn path_in(&self, fallback_dir: &Path) -> PathBuf {
        if self.dirname.is_empty() {
            fallback_dir.join(&self.filename)
        } else {
            Path::new(&self.dirname).join(&self.filename)
        }
    }
}

/// Steps of the two workflows, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Step {
    Liveness,
    OpenFiles,
    FeatureListAssembly,
    MassProperties,
    FeatureListPart,
    DatumFeatures,
    Transform,
    ExportInterchange,
    WorkingDirectory,
    ImportGeometry,
    WriteMesh,
}

impl Step {
    /// Heading printed in text mode.
    pub fn heading(self) -> &'static str {
        match self {
            Step::Liveness => "CHECK CREO",
            Step::OpenFiles => "OPEN FILES",
            Step::FeatureListAssembly => "FEATURE LIST ASM",
            Step::MassProperties => "MASS PROP PART",
            Step::FeatureListPart => "FEATURE LIST PRT",
            Step::DatumFeatures => "FILTERED FEATURES PRT",
            Step::Transform => "TRANSFORM",
            Step::ExportInterchange => "EXPORT PART",
            Step::WorkingDirectory => "WORKING DIRECTORY",
            Step::ImportGeometry => "IMPORT GEOMETRY",
            Step::WriteMesh => "WRITE MESH",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WorkflowEvent {
    StepStarted { step: Step },
    Info(String),
}

/// Result of a workflow: either it ran to the end or the liveness guard stopped it.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Completed(T),
    CadNotRunning,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureReport {
    pub timestamp_utc: String,
    pub assembly: String,
    pub part: String,
    pub assembly_features: Vec<Feature>,
    pub mass_properties: MassProperties,
    pub part_features: Vec<Feature>,
    #[serde(default)]
    pub filtered_features: Option<FilteredFeatures>,
    #[serde(default)]
    pub transform: Option<Transform>,
    /// Part mass properties re-expressed in the transform's reference frame.
    #[serde(default)]
    pub frame_inertia: Option<FrameInertia>,
}

/// Rigid-body inertia of a part in a given reference frame, with lengths
/// multiplied by `length_scale` (0.001 turns Creo millimetres into metres).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameInertia {
    pub length_scale: f64,
    pub mass: f64,
    pub center_of_mass: Vector3,
    pub inertia_at_com: InertiaTensor,
    pub inertia_at_origin: InertiaTensor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilteredFeatures {
    pub feat_type: String,
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportReport {
    pub timestamp_utc: String,
    pub part: String,
    pub format: ExportFormat,
    pub exported: PathBuf,
    pub working_directory: PathBuf,
    #[serde(default)]
    pub mesh: Option<MeshSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshSummary {
    pub path: PathBuf,
    pub triangles: usize,
    pub ascii: bool,
    #[serde(default)]
    pub bounds: Option<(Vector3, Vector3)>,
}

pub(crate) fn now_utc() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "now".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn feature_keeps_unknown_fields() {
        let f: Feature = serde_json::from_value(json!({
            "name": "A_1",
            "type": "DATUM_AXIS",
            "status": "ACTIVE",
            "feat_id": 42,
            "feat_number": 7,
            "path": [3, 42]
        }))
        .unwrap();
        assert_eq!(f.feat_type.as_deref(), Some("DATUM_AXIS"));
        assert_eq!(f.feat_id, Some(42));
        assert_eq!(f.extra.get("path"), Some(&json!([3, 42])));
    }

    #[test]
    fn mass_properties_parse_tensors() {
        let m: MassProperties = serde_json::from_value(json!({
            "volume": 1200.0,
            "mass": 9.4,
            "density": 0.0078,
            "surface_area": 880.5,
            "center_of_gravity": {"x": 0.0, "y": 5.0, "z": 50.0},
            "ctr_grav_inertia_tensor": {
                "x_axis": {"x": 1.0, "y": 0.0, "z": 0.0},
                "y_axis": {"x": 0.0, "y": 2.0, "z": 0.0},
                "z_axis": {"x": 0.0, "y": 0.0, "z": 3.0}
            }
        }))
        .unwrap();
        assert_eq!(m.mass, Some(9.4));
        assert_eq!(m.center_of_gravity.unwrap().z, 50.0);
        assert_eq!(m.ctr_grav_inertia_tensor.unwrap().y_axis.y, 2.0);
        assert!(m.coord_sys_inertia.is_none());
    }

    #[test]
    fn exported_file_uses_fallback_dir_when_missing() {
        let e = ExportedFile {
            dirname: String::new(),
            filename: "bar.stp".into(),
        };
        assert_eq!(e.path_in(Path::new("/work")), PathBuf::from("/work/bar.stp"));

        let e = ExportedFile {
            dirname: "/creo/wd".into(),
            filename: "bar.stp".into(),
        };
        assert_eq!(e.path_in(Path::new("/work")), PathBuf::from("/creo/wd/bar.stp"));
    }

    #[test]
    fn export_format_names() {
        assert_eq!(ExportFormat::Step.as_creoson_str(), "STEP");
        assert_eq!(ExportFormat::Iges.as_creoson_str(), "IGES");
    }
}
