//! Text summary builder for CLI output.
//!
//! Formats workflow reports as the human-readable lines printed in text mode.

use crate::model::{
    ExportReport, Feature, FeatureReport, FrameInertia, InertiaTensor, MassProperties, Step,
    Transform, Vector3,
};

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

pub(crate) fn build_report_summary(report: &FeatureReport) -> TextSummary {
    let mut lines = Vec::new();

    lines.push(format!("{} ({})", Step::FeatureListAssembly.heading(), report.assembly));
    push_features(&report.assembly_features, &mut lines);

    lines.push(format!("{} ({})", Step::MassProperties.heading(), report.part));
    push_mass_properties(&report.mass_properties, &mut lines);

    lines.push(format!("{} ({})", Step::FeatureListPart.heading(), report.part));
    push_features(&report.part_features, &mut lines);

    if let Some(filtered) = report.filtered_features.as_ref() {
        lines.push(format!("{} ({})", filtered.feat_type, report.part));
        push_features(&filtered.features, &mut lines);
    }
    if let Some(t) = report.transform.as_ref() {
        lines.push(Step::Transform.heading().to_string());
        push_transform(t, &mut lines);
    }
    if let Some(fi) = report.frame_inertia.as_ref() {
        lines.push(format!("INERTIA IN TRANSFORM FRAME ({})", report.part));
        push_frame_inertia(fi, &mut lines);
    }

    TextSummary { lines }
}

pub(crate) fn build_export_summary(report: &ExportReport) -> TextSummary {
    let mut lines = vec![
        format!(
            "Exported {} as {}: {}",
            report.part,
            report.format.as_creoson_str(),
            report.exported.display()
        ),
        format!("Working directory: {}", report.working_directory.display()),
    ];
    if let Some(mesh) = report.mesh.as_ref() {
        lines.push(format!(
            "Mesh: {} ({} triangles, {})",
            mesh.path.display(),
            mesh.triangles,
            if mesh.ascii { "ASCII STL" } else { "binary STL" }
        ));
        if let Some((min, max)) = mesh.bounds.as_ref() {
            lines.push(format!("Bounds: {} .. {}", vec3(min), vec3(max)));
        }
    }
    TextSummary { lines }
}

fn push_features(features: &[Feature], lines: &mut Vec<String>) {
    if features.is_empty() {
        lines.push("  (no features)".to_string());
        return;
    }
    lines.push(format!(
        "  {:>4} {:>6}  {:<20} {:<10} {}",
        "#", "ID", "TYPE", "STATUS", "NAME"
    ));
    for f in features {
        lines.push(format!(
            "  {:>4} {:>6}  {:<20} {:<10} {}",
            f.feat_number.map_or("-".to_string(), |n| n.to_string()),
            f.feat_id.map_or("-".to_string(), |n| n.to_string()),
            f.feat_type.as_deref().unwrap_or("-"),
            f.status.as_deref().unwrap_or("-"),
            f.name.as_deref().unwrap_or("-"),
        ));
    }
}

fn push_mass_properties(m: &MassProperties, lines: &mut Vec<String>) {
    lines.push(format!("  Volume:       {}", num(m.volume)));
    lines.push(format!("  Surface area: {}", num(m.surface_area)));
    lines.push(format!("  Density:      {}", num(m.density)));
    lines.push(format!("  Mass:         {}", num(m.mass)));
    if let Some(cog) = m.center_of_gravity.as_ref() {
        lines.push(format!("  Center of gravity: {}", vec3_xyz(cog)));
    }
    if let Some(t) = m.ctr_grav_inertia_tensor.as_ref() {
        lines.push("  Inertia tensor at center of gravity:".to_string());
        push_tensor(t, lines);
    }
    if let Some(t) = m.coord_sys_inertia.as_ref() {
        lines.push("  Inertia at coordinate system:".to_string());
        push_tensor(t, lines);
    }
    if let Some(t) = m.coord_sys_inertia_tensor.as_ref() {
        lines.push("  Inertia tensor at coordinate system:".to_string());
        push_tensor(t, lines);
    }
}

fn push_frame_inertia(fi: &FrameInertia, lines: &mut Vec<String>) {
    if fi.length_scale != 1.0 {
        lines.push(format!("  Length scale: {}", fi.length_scale));
    }
    lines.push(format!("  Mass:           {:.6}", fi.mass));
    lines.push(format!("  Center of mass: {}", vec3_xyz(&fi.center_of_mass)));
    lines.push("  Inertia at center of mass:".to_string());
    push_tensor(&fi.inertia_at_com, lines);
    lines.push("  Inertia at frame origin:".to_string());
    push_tensor(&fi.inertia_at_origin, lines);
}

fn push_tensor(t: &InertiaTensor, lines: &mut Vec<String>) {
    for row in [&t.x_axis, &t.y_axis, &t.z_axis] {
        lines.push(format!("    {}", vec3_xyz(row)));
    }
}

fn push_transform(t: &Transform, lines: &mut Vec<String>) {
    lines.push(format!("  Origin: {}", vec3_xyz(&t.origin)));
    lines.push(format!("  X axis: {}", vec3_xyz(&t.x_axis)));
    lines.push(format!("  Y axis: {}", vec3_xyz(&t.y_axis)));
    lines.push(format!("  Z axis: {}", vec3_xyz(&t.z_axis)));
    if t.x_rot.is_some() || t.y_rot.is_some() || t.z_rot.is_some() {
        lines.push(format!(
            "  Rotation (deg): {} {} {}",
            num(t.x_rot),
            num(t.y_rot),
            num(t.z_rot)
        ));
    }
}

fn num(v: Option<f64>) -> String {
    v.map_or("-".to_string(), |v| format!("{v:.4}"))
}

fn vec3_xyz(v: &Vector3) -> String {
    format!("{:.4} {:.4} {:.4}", v.x, v.y, v.z)
}

fn vec3(v: &Vector3) -> String {
    format!("({:.3}, {:.3}, {:.3})", v.x, v.y, v.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExportFormat, FilteredFeatures, MeshSummary};
    use crate::workflow::testing::feature;
    use std::path::PathBuf;

    fn mass() -> MassProperties {
        MassProperties {
            volume: Some(1000.0),
            surface_area: None,
            density: Some(0.0078),
            mass: Some(7.8),
            center_of_gravity: Some(Vector3 {
                x: 0.0,
                y: 0.0,
                z: 50.0,
            }),
            coord_sys_inertia: None,
            coord_sys_inertia_tensor: None,
            ctr_grav_inertia_tensor: None,
            extra: Default::default(),
        }
    }

    #[test]
    fn report_sections_follow_query_order() {
        let report = FeatureReport {
            timestamp_utc: "2026-01-01T00:00:00Z".into(),
            assembly: "2bars.asm".into(),
            part: "bar.prt".into(),
            assembly_features: vec![feature("BAR", "COMPONENT", 12)],
            mass_properties: mass(),
            part_features: vec![],
            filtered_features: Some(FilteredFeatures {
                feat_type: "DATUM_AXIS".into(),
                features: vec![feature("A_1", "DATUM_AXIS", 40)],
            }),
            transform: None,
            frame_inertia: None,
        };
        let lines = build_report_summary(&report).lines;

        let heading = |h: &str| lines.iter().position(|l| l.starts_with(h)).unwrap();
        assert!(heading("FEATURE LIST ASM") < heading("MASS PROP PART"));
        assert!(heading("MASS PROP PART") < heading("FEATURE LIST PRT"));
        assert!(heading("FEATURE LIST PRT") < heading("DATUM_AXIS"));
        assert!(lines.iter().any(|l| l.contains("COMPONENT") && l.ends_with("BAR")));
        assert!(lines.contains(&"  Mass:         7.8000".to_string()));
        assert!(lines.contains(&"  Surface area: -".to_string()));
        assert!(lines.contains(&"  Center of gravity: 0.0000 0.0000 50.0000".to_string()));
        assert!(lines.contains(&"  (no features)".to_string()));
        assert!(!lines.iter().any(|l| l.starts_with("INERTIA IN TRANSFORM FRAME")));
    }

    #[test]
    fn every_reported_tensor_is_printed() {
        let tensor = |d: f64| InertiaTensor {
            x_axis: Vector3 { x: d, y: 0.0, z: 0.0 },
            y_axis: Vector3 { x: 0.0, y: d, z: 0.0 },
            z_axis: Vector3 { x: 0.0, y: 0.0, z: d },
        };
        let mass_properties = MassProperties {
            coord_sys_inertia: Some(tensor(1.0)),
            coord_sys_inertia_tensor: Some(tensor(2.0)),
            ctr_grav_inertia_tensor: Some(tensor(3.0)),
            ..mass()
        };
        let report = FeatureReport {
            timestamp_utc: "2026-01-01T00:00:00Z".into(),
            assembly: "2bars.asm".into(),
            part: "bar.prt".into(),
            assembly_features: vec![],
            mass_properties,
            part_features: vec![],
            filtered_features: None,
            transform: None,
            frame_inertia: Some(FrameInertia {
                length_scale: 0.001,
                mass: 7.8,
                center_of_mass: Vector3 { x: 0.0, y: 0.0, z: 0.05 },
                inertia_at_com: tensor(0.01),
                inertia_at_origin: tensor(0.0295),
            }),
        };
        let lines = build_report_summary(&report).lines;

        let after = |h: &str| {
            let i = lines.iter().position(|l| l == h).unwrap();
            lines[i + 1].clone()
        };
        assert_eq!(after("  Inertia at coordinate system:"), "    1.0000 0.0000 0.0000");
        assert_eq!(
            after("  Inertia tensor at coordinate system:"),
            "    2.0000 0.0000 0.0000"
        );
        assert_eq!(
            after("  Inertia tensor at center of gravity:"),
            "    3.0000 0.0000 0.0000"
        );
        assert!(lines.contains(&"INERTIA IN TRANSFORM FRAME (bar.prt)".to_string()));
        assert!(lines.contains(&"  Length scale: 0.001".to_string()));
        assert!(lines.contains(&"  Center of mass: 0.0000 0.0000 0.0500".to_string()));
        assert_eq!(after("  Inertia at frame origin:"), "    0.0295 0.0000 0.0000");
    }

    #[test]
    fn export_summary_mentions_mesh() {
        let report = ExportReport {
            timestamp_utc: "2026-01-01T00:00:00Z".into(),
            part: "bar.prt".into(),
            format: ExportFormat::Step,
            exported: PathBuf::from("/w/bar.stp"),
            working_directory: PathBuf::from("/w"),
            mesh: Some(MeshSummary {
                path: PathBuf::from("/w/bar.stl"),
                triangles: 12,
                ascii: false,
                bounds: None,
            }),
        };
        let lines = build_export_summary(&report).lines;
        assert_eq!(lines[0], "Exported bar.prt as STEP: /w/bar.stp");
        assert_eq!(lines[2], "Mesh: /w/bar.stl (12 triangles, binary STL)");
        assert_eq!(lines.len(), 3);
    }
}
