//! Mass properties moved into another reference frame.
//!
//! Creo reports the center of gravity and the inertia tensor about it in the
//! part's own coordinate system. A component transform places that system in
//! the assembly (or a named csys), so the same rigid body can be described
//! there: the center of mass is mapped through the transform, the tensor is
//! rotated, and the parallel-axis theorem gives the tensor about the frame
//! origin.

use crate::model::{FrameInertia, InertiaTensor, MassProperties, Transform, Vector3};
use nalgebra as na;

/// Express `props` in the frame `transform` is relative to.
///
/// Returns `None` when Creo did not report the mass, the center of gravity or
/// the inertia tensor at the center of gravity.
pub(crate) fn in_frame(
    props: &MassProperties,
    transform: &Transform,
    length_scale: f64,
) -> Option<FrameInertia> {
    let mass = props.mass?;
    let com = to_na(props.center_of_gravity.as_ref()?);
    let at_com = to_matrix(props.ctr_grav_inertia_tensor.as_ref()?);

    let rot = na::Matrix3::from_columns(&[
        to_na(&transform.x_axis),
        to_na(&transform.y_axis),
        to_na(&transform.z_axis),
    ]);
    let com = (rot * com + to_na(&transform.origin)) * length_scale;
    let at_com = rot * at_com * rot.transpose() * (length_scale * length_scale);
    let shift = (na::Matrix3::identity() * com.norm_squared() - com * com.transpose()) * mass;

    Some(FrameInertia {
        length_scale,
        mass,
        center_of_mass: from_na(&com),
        inertia_at_com: from_matrix(&at_com),
        inertia_at_origin: from_matrix(&(at_com + shift)),
    })
}

fn to_na(v: &Vector3) -> na::Vector3<f64> {
    na::Vector3::new(v.x, v.y, v.z)
}

fn from_na(v: &na::Vector3<f64>) -> Vector3 {
    Vector3 {
        x: v.x,
        y: v.y,
        z: v.z,
    }
}

fn to_matrix(t: &InertiaTensor) -> na::Matrix3<f64> {
    na::Matrix3::new(
        t.x_axis.x, t.x_axis.y, t.x_axis.z, //
        t.y_axis.x, t.y_axis.y, t.y_axis.z, //
        t.z_axis.x, t.z_axis.y, t.z_axis.z,
    )
}

fn from_matrix(m: &na::Matrix3<f64>) -> InertiaTensor {
    let row = |r: usize| Vector3 {
        x: m[(r, 0)],
        y: m[(r, 1)],
        z: m[(r, 2)],
    };
    InertiaTensor {
        x_axis: row(0),
        y_axis: row(1),
        z_axis: row(2),
    }
}
