use nalgebra::{Rotation3, Unit};

use super::{Aabb, Point3, Vector3, TOLERANCE};

/// An oriented local frame in which joint prisms are laid out.
///
/// The axes are kept mutually orthogonal and of unit length; every
/// constructor and rotation preserves this.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointPlane {
    pub origin: Point3,
    pub x_axis: Vector3,
    pub y_axis: Vector3,
    pub z_axis: Vector3,
}

impl Default for JointPlane {
    fn default() -> Self {
        Self::world_xy()
    }
}

impl JointPlane {
    /// The world XY frame at the world origin.
    #[must_use]
    pub fn world_xy() -> Self {
        Self::world_aligned(Point3::origin())
    }

    /// A world-aligned frame centred at `origin`.
    #[must_use]
    pub fn world_aligned(origin: Point3) -> Self {
        Self {
            origin,
            x_axis: Vector3::x(),
            y_axis: Vector3::y(),
            z_axis: Vector3::z(),
        }
    }

    /// Builds a frame whose Z axis is `normal`.
    ///
    /// Returns `None` if `normal` is zero-length.
    #[must_use]
    pub fn from_normal(origin: Point3, normal: Vector3) -> Option<Self> {
        let len = normal.norm();
        if len < TOLERANCE {
            return None;
        }
        let normal = normal / len;

        let reference = if normal.x.abs() < 0.9 {
            Vector3::x()
        } else {
            Vector3::y()
        };

        let x_axis = normal.cross(&reference).normalize();
        let y_axis = normal.cross(&x_axis);

        Some(Self {
            origin,
            x_axis,
            y_axis,
            z_axis: normal,
        })
    }

    /// Returns the frame rotated by `angle` radians about `axis` through its
    /// origin (right-hand rule). A zero-length axis leaves the frame as is.
    #[must_use]
    pub fn rotated(&self, angle: f64, axis: &Vector3) -> Self {
        let Some(axis) = Unit::try_new(*axis, TOLERANCE) else {
            return *self;
        };
        let rot = Rotation3::from_axis_angle(&axis, angle);
        Self {
            origin: self.origin,
            x_axis: rot * self.x_axis,
            y_axis: rot * self.y_axis,
            z_axis: rot * self.z_axis,
        }
    }

    /// World point at local coordinates `(u, v, w)`.
    #[must_use]
    pub fn point_at(&self, u: f64, v: f64, w: f64) -> Point3 {
        self.origin + self.x_axis * u + self.y_axis * v + self.z_axis * w
    }

    /// Local coordinates of a world point.
    #[must_use]
    pub fn to_local(&self, point: &Point3) -> Point3 {
        let d = point - self.origin;
        Point3::new(d.dot(&self.x_axis), d.dot(&self.y_axis), d.dot(&self.z_axis))
    }

    /// World positions of the eight corners of a box given in local coordinates.
    #[must_use]
    pub fn box_corners(&self, local: &Aabb) -> [Point3; 8] {
        local.corners().map(|c| self.point_at(c.x, c.y, c.z))
    }

    /// Returns `true` if the axes are unit length and mutually orthogonal.
    #[must_use]
    pub fn is_orthonormal(&self, tolerance: f64) -> bool {
        let (x, y, z) = (&self.x_axis, &self.y_axis, &self.z_axis);
        (x.norm() - 1.0).abs() < tolerance
            && (y.norm() - 1.0).abs() < tolerance
            && (z.norm() - 1.0).abs() < tolerance
            && x.dot(y).abs() < tolerance
            && y.dot(z).abs() < tolerance
            && z.dot(x).abs() < tolerance
    }
}
