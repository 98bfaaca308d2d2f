use std::f64::consts::FRAC_PI_2;

use tracing::debug;

use crate::error::KernelError;
use crate::kernel::GeometryKernel;
use crate::math::JointPlane;

/// Z-extent ratio above which two parts form a T-shaped joint.
const VERTICAL_RATIO: f64 = 2.0;

/// Classifies a joint as vertical (T-shaped) from the parts' world boxes.
///
/// The joint is vertical if the taller part's Z extent is more than twice
/// the shorter one's, or if one part's Z range contains the other's
/// (inclusive, within the model tolerance).
///
/// # Errors
///
/// Returns an error if either bounding box cannot be computed.
pub fn detect_vertical_joint<K: GeometryKernel>(
    kernel: &K,
    first: &K::Solid,
    second: &K::Solid,
) -> Result<bool, KernelError> {
    let a = kernel.bounding_box(first, None)?;
    let b = kernel.bounding_box(second, None)?;
    let tolerance = kernel.model_tolerance();

    let (ha, hb) = (a.extents().z.abs(), b.extents().z.abs());
    let (tall, short) = if ha >= hb { (ha, hb) } else { (hb, ha) };
    let ratio_exceeded = if short > tolerance {
        tall / short > VERTICAL_RATIO
    } else {
        tall > tolerance
    };

    let a_holds_b = a.min.z <= b.min.z + tolerance && a.max.z >= b.max.z - tolerance;
    let b_holds_a = b.min.z <= a.min.z + tolerance && b.max.z >= a.max.z - tolerance;

    let vertical = ratio_exceeded || a_holds_b || b_holds_a;
    debug!(ha, hb, ratio_exceeded, a_holds_b, b_holds_a, vertical, "vertical joint check");
    Ok(vertical)
}

/// Quarter turn about the plane's own X axis, so the tenon is inserted
/// along the taller part.
#[must_use]
pub fn orient_for_vertical(plane: &JointPlane) -> JointPlane {
    plane.rotated(FRAC_PI_2, &plane.x_axis)
}
