use tracing::debug;

use super::parameters::{JointParameters, PositionMode, Sizing};
use crate::math::{Aabb, Point3, Vector3};

/// Extents of one joint prism in the joint plane's local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrismExtents {
    pub width: f64,
    pub depth: f64,
    pub height: f64,
    /// Local minimum corner.
    pub min: Point3,
    /// Local maximum corner.
    pub max: Point3,
}

impl PrismExtents {
    fn from_box(bbox: Aabb) -> Self {
        let e = bbox.extents();
        Self {
            width: e.x,
            depth: e.y,
            height: e.z,
            min: bbox.min,
            max: bbox.max,
        }
    }

    /// The prism as a local axis-aligned box.
    #[must_use]
    pub fn as_box(&self) -> Aabb {
        Aabb {
            min: self.min,
            max: self.max,
        }
    }

    /// Returns `true` if every extent exceeds `tolerance`.
    #[must_use]
    pub fn is_solid(&self, tolerance: f64) -> bool {
        self.width > tolerance && self.depth > tolerance && self.height > tolerance
    }
}

/// Positive (tenon/tail) and negative (mortise/socket) prisms of a joint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointDimensions {
    pub positive: PrismExtents,
    pub negative: PrismExtents,
}

/// Turns joint parameters and a region's local bounding box into prisms.
pub struct JointDimensionCalculator<'a> {
    parameters: &'a JointParameters,
}

impl<'a> JointDimensionCalculator<'a> {
    /// Creates a new calculator for `parameters`.
    #[must_use]
    pub fn new(parameters: &'a JointParameters) -> Self {
        Self { parameters }
    }

    /// Computes both prisms.
    ///
    /// `region` is the intersection's bounding box in the joint plane's
    /// local frame. `height` is the prism height used by absolute sizing;
    /// percent sizing takes the region's own height.
    #[must_use]
    pub fn compute(&self, region: &Aabb, height: f64) -> JointDimensions {
        let clearance = self.parameters.clearance;
        let dims = match self.parameters.sizing {
            Sizing::Percent {
                intersection_percent,
            } => {
                let width = intersection_percent / 100.0 * (region.max.x - region.min.x);
                let (min_x, max_x) = self.span_x(region, width);
                let positive = Aabb {
                    min: Point3::new(min_x, region.min.y, region.min.z),
                    max: Point3::new(max_x, region.max.y, region.max.z),
                };
                let half = clearance / 2.0;
                let negative = positive.expanded(&Vector3::new(half, half, half));
                JointDimensions {
                    positive: PrismExtents::from_box(positive),
                    negative: PrismExtents::from_box(negative),
                }
            }
            Sizing::Absolute { width, depth } => {
                let (min_x, max_x) = self.span_x(region, width);
                let positive = Aabb {
                    min: Point3::new(min_x, -depth / 2.0, 0.0),
                    max: Point3::new(max_x, depth / 2.0, height),
                };
                let negative = Aabb {
                    min: Point3::new(min_x - clearance, -depth / 2.0 - clearance, 0.0),
                    max: Point3::new(max_x + clearance, depth / 2.0 + clearance, height + clearance),
                };
                JointDimensions {
                    positive: PrismExtents::from_box(positive),
                    negative: PrismExtents::from_box(negative),
                }
            }
        };
        debug!(positive = ?dims.positive, negative = ?dims.negative, "joint dimensions");
        dims
    }

    /// Width, depth and height of a tenon laid on a face-normal frame, where
    /// the region box is measured in world coordinates.
    #[must_use]
    pub fn local_tenon_size(&self, region: &Aabb) -> (f64, f64, f64) {
        let e = region.extents();
        match self.parameters.sizing {
            Sizing::Percent {
                intersection_percent,
            } => (intersection_percent / 100.0 * e.x, e.y, e.z),
            Sizing::Absolute { width, depth } => (width, depth, e.z),
        }
    }

    fn span_x(&self, region: &Aabb, width: f64) -> (f64, f64) {
        match self.parameters.position_mode {
            PositionMode::Centered => {
                let center = (region.min.x + region.max.x) / 2.0;
                (center - width / 2.0, center + width / 2.0)
            }
            PositionMode::Edge => (region.min.x, region.min.x + width),
        }
    }
}

/// Width of a dovetail's flared end: `width + 2·height·tan(angle)`.
#[must_use]
pub fn dovetail_wider_width(width: f64, height: f64, tail_angle_degrees: f64) -> f64 {
    width + 2.0 * height * tail_angle_degrees.to_radians().tan()
}
