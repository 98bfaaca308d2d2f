pub mod document;
#[cfg(test)]
pub(crate) mod mock;

use std::fmt;

pub use document::{Document, DocumentStore, ObjectId};

use crate::error::KernelError;
use crate::math::{Aabb, JointPlane, Point3, Vector3};

/// The three boolean solid operations the engine drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    Intersection,
    Union,
    Difference,
}

impl fmt::Display for BooleanOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Intersection => "intersection",
            Self::Union => "union",
            Self::Difference => "difference",
        })
    }
}

/// Result of a closest-point-on-face query.
#[derive(Debug, Clone, Copy)]
pub struct SurfacePoint {
    /// Index of the face within its solid.
    pub face: usize,
    /// U parameter on the face.
    pub u: f64,
    /// V parameter on the face.
    pub v: f64,
    /// 3D point on the face.
    pub point: Point3,
    /// Distance from the query point to the face point.
    pub distance: f64,
}

/// Operations consumed from an external boundary-representation kernel.
///
/// Boolean operations return every resulting body; an empty vector means the
/// kernel produced nothing and is not itself an error. `Err` is reserved for
/// kernel faults.
pub trait GeometryKernel {
    /// Handle to a solid body.
    type Solid: Clone;
    /// Handle to a single untrimmed face used while assembling prisms.
    type Face;

    /// Absolute model tolerance used for booleans and degeneracy checks.
    fn model_tolerance(&self) -> f64;

    /// Boolean intersection `a ∩ b`.
    ///
    /// # Errors
    ///
    /// Returns an error if the kernel faults.
    fn boolean_intersection(
        &self,
        a: &Self::Solid,
        b: &Self::Solid,
        tolerance: f64,
    ) -> Result<Vec<Self::Solid>, KernelError>;

    /// Boolean union `a ∪ b`.
    ///
    /// # Errors
    ///
    /// Returns an error if the kernel faults.
    fn boolean_union(
        &self,
        a: &Self::Solid,
        b: &Self::Solid,
        tolerance: f64,
    ) -> Result<Vec<Self::Solid>, KernelError>;

    /// Boolean difference `a − b`.
    ///
    /// # Errors
    ///
    /// Returns an error if the kernel faults.
    fn boolean_difference(
        &self,
        a: &Self::Solid,
        b: &Self::Solid,
        tolerance: f64,
    ) -> Result<Vec<Self::Solid>, KernelError>;

    /// Bounding box of `solid`, in world coordinates or, with `frame`, in
    /// the frame's local coordinates.
    ///
    /// # Errors
    ///
    /// Returns an error if the box cannot be computed.
    fn bounding_box(
        &self,
        solid: &Self::Solid,
        frame: Option<&JointPlane>,
    ) -> Result<Aabb, KernelError>;

    /// Number of faces of `solid`.
    fn face_count(&self, solid: &Self::Solid) -> usize;

    /// Surface parameters of the point on face `face` closest to `point`.
    fn closest_point_on_face(
        &self,
        solid: &Self::Solid,
        face: usize,
        point: &Point3,
    ) -> Option<(f64, f64)>;

    /// Point on face `face` at parameters `(u, v)`.
    fn face_point_at(&self, solid: &Self::Solid, face: usize, u: f64, v: f64) -> Option<Point3>;

    /// Outward normal of face `face` at parameters `(u, v)`.
    fn face_normal_at(&self, solid: &Self::Solid, face: usize, u: f64, v: f64)
        -> Option<Vector3>;

    /// Whether the body passes the kernel's validity checks.
    fn is_valid(&self, solid: &Self::Solid) -> bool;

    /// Whether the body is topologically closed.
    fn is_closed_solid(&self, solid: &Self::Solid) -> bool;

    /// Builds a hexahedron from eight corners ordered bottom face first,
    /// each face counter-clockwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the kernel rejects the corners.
    fn create_box(&self, corners: &[Point3; 8]) -> Result<Self::Solid, KernelError>;

    /// Builds a bilinear face through four corners, or `None` if degenerate.
    fn create_face_from_corners(&self, corners: [Point3; 4], tolerance: f64)
        -> Option<Self::Face>;

    /// Joins faces along shared edges into bodies.
    fn join_faces(&self, faces: Vec<Self::Face>, tolerance: f64) -> Vec<Self::Solid>;

    /// Runs one of the three boolean operations.
    ///
    /// # Errors
    ///
    /// Returns an error if the kernel faults.
    fn boolean(
        &self,
        op: BooleanOp,
        a: &Self::Solid,
        b: &Self::Solid,
        tolerance: f64,
    ) -> Result<Vec<Self::Solid>, KernelError> {
        match op {
            BooleanOp::Intersection => self.boolean_intersection(a, b, tolerance),
            BooleanOp::Union => self.boolean_union(a, b, tolerance),
            BooleanOp::Difference => self.boolean_difference(a, b, tolerance),
        }
    }

    /// Closest point to `point` over all faces of `solid`, with the outward
    /// normal there. The first face wins on equal distances.
    fn closest_surface_point(
        &self,
        solid: &Self::Solid,
        point: &Point3,
    ) -> Option<(SurfacePoint, Vector3)> {
        let mut best: Option<SurfacePoint> = None;
        for face in 0..self.face_count(solid) {
            let Some((u, v)) = self.closest_point_on_face(solid, face, point) else {
                continue;
            };
            let Some(on_face) = self.face_point_at(solid, face, u, v) else {
                continue;
            };
            let distance = (on_face - point).norm();
            if best.is_none_or(|b| distance < b.distance) {
                best = Some(SurfacePoint {
                    face,
                    u,
                    v,
                    point: on_face,
                    distance,
                });
            }
        }
        let best = best?;
        let normal = self.face_normal_at(solid, best.face, best.u, best.v)?;
        Some((best, normal))
    }
}
