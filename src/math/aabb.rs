use super::{Point3, Vector3};

/// A coordinate axis of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Component index of the axis (X = 0, Y = 1, Z = 2).
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

/// An axis-aligned bounding box, either in world space or in the local
/// coordinates of a [`JointPlane`](super::JointPlane).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3,
    /// Maximum corner of the bounding box.
    pub max: Point3,
}

impl Aabb {
    /// Creates a box from two opposite corners in any order.
    #[must_use]
    pub fn from_corners(a: Point3, b: Point3) -> Self {
        Self {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Smallest box enclosing all `points`, or `None` for an empty iterator.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point3>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self { min: first, max: first }, |acc, p| acc.including(&p)))
    }

    /// Returns `true` if every coordinate is finite and `min <= max` on all axes.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.min.iter().chain(self.max.iter()).all(|c| c.is_finite())
            && self.min.x <= self.max.x
            && self.min.y <= self.max.y
            && self.min.z <= self.max.z
    }

    /// Centre point of the box.
    #[must_use]
    pub fn center(&self) -> Point3 {
        nalgebra::center(&self.min, &self.max)
    }

    /// Edge lengths along X, Y and Z.
    #[must_use]
    pub fn extents(&self) -> Vector3 {
        self.max - self.min
    }

    /// Axis with the smallest extent. Ties resolve to the lowest axis.
    #[must_use]
    pub fn smallest_axis(&self) -> Axis {
        let e = self.extents();
        let mut axis = Axis::X;
        let mut smallest = e.x.abs();
        if e.y.abs() < smallest {
            axis = Axis::Y;
            smallest = e.y.abs();
        }
        if e.z.abs() < smallest {
            axis = Axis::Z;
        }
        axis
    }

    /// Volume of the box.
    #[must_use]
    pub fn volume(&self) -> f64 {
        let e = self.extents();
        e.x * e.y * e.z
    }

    /// Returns this box grown to include `p`.
    #[must_use]
    pub fn including(&self, p: &Point3) -> Self {
        Self {
            min: self.min.inf(p),
            max: self.max.sup(p),
        }
    }

    /// Returns the smallest box containing both boxes.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Returns the overlap of two boxes, or `None` if its volume is not
    /// larger than `tolerance` on every axis.
    #[must_use]
    pub fn intersection(&self, other: &Self, tolerance: f64) -> Option<Self> {
        let min = self.min.sup(&other.min);
        let max = self.max.inf(&other.max);
        let e = max - min;
        if e.x > tolerance && e.y > tolerance && e.z > tolerance {
            Some(Self { min, max })
        } else {
            None
        }
    }

    /// Returns the box grown by `margin` on both sides of each axis.
    #[must_use]
    pub fn expanded(&self, margin: &Vector3) -> Self {
        Self {
            min: self.min - *margin,
            max: self.max + *margin,
        }
    }

    /// Returns `true` if `other` lies inside this box, allowing `tolerance`.
    #[must_use]
    pub fn contains(&self, other: &Self, tolerance: f64) -> bool {
        (0..3).all(|i| {
            self.min[i] <= other.min[i] + tolerance && self.max[i] >= other.max[i] - tolerance
        })
    }

    /// The eight corners, bottom face (min Z) first, counter-clockwise.
    #[must_use]
    pub fn corners(&self) -> [Point3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Point3::new(a.x, a.y, a.z),
            Point3::new(b.x, a.y, a.z),
            Point3::new(b.x, b.y, a.z),
            Point3::new(a.x, b.y, a.z),
            Point3::new(a.x, a.y, b.z),
            Point3::new(b.x, a.y, b.z),
            Point3::new(b.x, b.y, b.z),
            Point3::new(a.x, b.y, b.z),
        ]
    }
}
