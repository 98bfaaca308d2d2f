mod dovetail;
mod mortise_tenon;

pub use dovetail::dovetail_corners;
pub use mortise_tenon::{detect_vertical_joint, orient_for_vertical};

use tracing::{debug, warn};

use super::dimensions::PrismExtents;
use crate::error::JointFailure;
use crate::kernel::GeometryKernel;
use crate::math::{JointPlane, Point3};

/// Tolerance for building and joining prism faces.
pub const FACE_TOLERANCE: f64 = 0.01;

/// Cross-section a joint kind's prisms are built with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrismShape {
    /// Straight-sided box.
    Rectangular,
    /// Trapezoid flaring by `tail_angle` degrees per side towards the top.
    Dovetail { tail_angle: f64 },
}

/// Builds joint prisms through a geometry kernel.
pub struct JointGeometryBuilder<'k, K> {
    kernel: &'k K,
}

impl<'k, K: GeometryKernel> JointGeometryBuilder<'k, K> {
    /// Creates a new builder over `kernel`.
    #[must_use]
    pub fn new(kernel: &'k K) -> Self {
        Self { kernel }
    }

    /// Builds the tenon or tail.
    ///
    /// # Errors
    ///
    /// Returns the reason the prism could not be built.
    pub fn build_positive(
        &self,
        shape: PrismShape,
        plane: &JointPlane,
        extents: &PrismExtents,
    ) -> Result<K::Solid, JointFailure> {
        self.build(shape, plane, extents).inspect_err(|reason| {
            warn!(%reason, ?shape, "failed to build positive joint prism");
        })
    }

    /// Builds the mortise or socket from the clearance-enlarged extents.
    ///
    /// # Errors
    ///
    /// Returns the reason the prism could not be built.
    pub fn build_negative(
        &self,
        shape: PrismShape,
        plane: &JointPlane,
        extents: &PrismExtents,
    ) -> Result<K::Solid, JointFailure> {
        self.build(shape, plane, extents).inspect_err(|reason| {
            warn!(%reason, ?shape, "failed to build negative joint prism");
        })
    }

    fn build(
        &self,
        shape: PrismShape,
        plane: &JointPlane,
        extents: &PrismExtents,
    ) -> Result<K::Solid, JointFailure> {
        let tolerance = self.kernel.model_tolerance();
        if !extents.is_solid(tolerance) {
            return Err(JointFailure::DegenerateGeometry(format!(
                "prism extents {:.4} x {:.4} x {:.4}",
                extents.width, extents.depth, extents.height
            )));
        }
        match shape {
            PrismShape::Rectangular => self.box_solid(plane, extents),
            PrismShape::Dovetail { tail_angle } => {
                self.prism_from_corners(&dovetail_corners(plane, extents, tail_angle))
            }
        }
    }

    /// Axis-aligned box in the plane's frame.
    fn box_solid(&self, plane: &JointPlane, extents: &PrismExtents) -> Result<K::Solid, JointFailure> {
        let corners = plane.box_corners(&extents.as_box());
        let solid = self.kernel.create_box(&corners)?;
        if !self.kernel.is_valid(&solid) {
            return Err(JointFailure::DegenerateGeometry("invalid box solid".into()));
        }
        Ok(solid)
    }

    /// Closed hexahedron from eight corners, bottom face first.
    ///
    /// Each of the six faces is built on its own and the faces are then
    /// joined. All six must build and the join must give exactly one closed
    /// body.
    ///
    /// # Errors
    ///
    /// Returns [`JointFailure::FaceConstruction`] or [`JointFailure::FaceJoin`].
    pub fn prism_from_corners(&self, p: &[Point3; 8]) -> Result<K::Solid, JointFailure> {
        let quads = [
            [p[0], p[1], p[2], p[3]],
            [p[4], p[5], p[6], p[7]],
            [p[0], p[3], p[7], p[4]],
            [p[1], p[5], p[6], p[2]],
            [p[0], p[4], p[5], p[1]],
            [p[3], p[2], p[6], p[7]],
        ];
        let expected = quads.len();
        let faces: Vec<K::Face> = quads
            .into_iter()
            .filter_map(|q| self.kernel.create_face_from_corners(q, FACE_TOLERANCE))
            .collect();
        if faces.len() < expected {
            return Err(JointFailure::FaceConstruction { built: faces.len() });
        }

        let mut joined = self.kernel.join_faces(faces, FACE_TOLERANCE);
        debug!(bodies = joined.len(), "joined prism faces");
        match joined.pop() {
            Some(solid) if joined.is_empty() && self.kernel.is_closed_solid(&solid) => Ok(solid),
            _ => Err(JointFailure::FaceJoin),
        }
    }
}
