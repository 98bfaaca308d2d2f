use std::f64::consts::FRAC_PI_2;

use tracing::{debug, warn};

use crate::error::KernelError;
use crate::kernel::GeometryKernel;
use crate::math::{Aabb, Axis, JointPlane, Vector3};

/// Smallest extents below this multiple of the model tolerance are flagged
/// as thin intersections.
const THIN_FACTOR: f64 = 10.0;

/// Share of the shorter part used as joint extension.
const EXTENSION_SHARE: f64 = 0.5;
/// Lower bound on the joint extension, in millimetres.
const MIN_EXTENSION: f64 = 10.0;
/// Extension used when the parts cannot be measured.
const FALLBACK_EXTENSION: f64 = 30.0;

/// Outcome of [`JointPlaneResolver::resolve`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedPlane {
    pub plane: JointPlane,
    /// Axis of the region's thinnest extent, now the plane's Z direction.
    pub contact_axis: Axis,
    /// The thinnest extent is below ten times the model tolerance.
    pub thin: bool,
    /// The region could not be measured and the world XY frame was used.
    pub fallback: bool,
}

/// Derives the joint frame from an intersection region.
///
/// The frame sits at the centre of the region's bounding box with its Z axis
/// turned onto the box's thinnest direction.
pub struct JointPlaneResolver {
    tolerance: f64,
}

impl JointPlaneResolver {
    /// Creates a resolver using `tolerance` for the thin-region check.
    #[must_use]
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// Resolves the frame for the first solid of `region`.
    ///
    /// Never fails: any kernel error or invalid box yields the world XY frame
    /// at the origin with `fallback` set.
    pub fn resolve<K: GeometryKernel>(&self, kernel: &K, region: &[K::Solid]) -> ResolvedPlane {
        match self.try_resolve(kernel, region) {
            Ok(resolved) => resolved,
            Err(err) => {
                warn!(%err, "joint plane resolution failed; using world XY");
                ResolvedPlane {
                    plane: JointPlane::world_xy(),
                    contact_axis: Axis::Z,
                    thin: false,
                    fallback: true,
                }
            }
        }
    }

    fn try_resolve<K: GeometryKernel>(
        &self,
        kernel: &K,
        region: &[K::Solid],
    ) -> Result<ResolvedPlane, KernelError> {
        let first = region
            .first()
            .ok_or_else(|| KernelError::InvalidInput("empty intersection region".into()))?;
        let bbox = kernel.bounding_box(first, None)?;
        if !bbox.is_valid() {
            return Err(KernelError::InvalidInput(format!(
                "invalid region bounding box {bbox:?}"
            )));
        }

        let extents = bbox.extents();
        let contact_axis = bbox.smallest_axis();
        let smallest = extents[contact_axis.index()].abs();
        debug!(
            min = ?bbox.min,
            max = ?bbox.max,
            ?contact_axis,
            smallest,
            "resolving joint plane"
        );

        let threshold = self.tolerance * THIN_FACTOR;
        let thin = smallest < threshold;
        if thin {
            warn!(smallest, threshold, "very thin intersection");
        }

        Ok(ResolvedPlane {
            plane: rotate_onto(JointPlane::world_aligned(bbox.center()), contact_axis),
            contact_axis,
            thin,
            fallback: false,
        })
    }
}

/// Turns a world-aligned frame so its Z axis lies along `axis`.
fn rotate_onto(plane: JointPlane, axis: Axis) -> JointPlane {
    match axis {
        Axis::X => plane.rotated(FRAC_PI_2, &Vector3::y()),
        Axis::Y => plane.rotated(FRAC_PI_2, &Vector3::x()),
        Axis::Z => plane,
    }
}

/// Estimates how far a joint should reach along the plane normal: half of
/// the shorter part's extent along local Z, at least 10 mm.
///
/// Falls back to 30 mm if either part cannot be measured.
pub fn joint_extension<K: GeometryKernel>(
    kernel: &K,
    first: &K::Solid,
    second: &K::Solid,
    plane: &JointPlane,
) -> f64 {
    let measure = || -> Result<(Aabb, Aabb), KernelError> {
        Ok((
            kernel.bounding_box(first, Some(plane))?,
            kernel.bounding_box(second, Some(plane))?,
        ))
    };
    match measure() {
        Ok((a, b)) => {
            let extension = a.extents().z.abs().min(b.extents().z.abs()) * EXTENSION_SHARE;
            debug!(extension, "joint extension");
            if extension < MIN_EXTENSION {
                debug!(extension, min = MIN_EXTENSION, "joint extension raised to minimum");
                MIN_EXTENSION
            } else {
                extension
            }
        }
        Err(err) => {
            warn!(%err, fallback = FALLBACK_EXTENSION, "cannot measure parts for joint extension");
            FALLBACK_EXTENSION
        }
    }
}
