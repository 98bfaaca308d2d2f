pub mod builder;
pub mod dimensions;
pub mod parameters;
pub mod plane;

use std::fmt;

use tracing::{debug, error, info, warn};

pub use builder::{JointGeometryBuilder, PrismShape};
pub use dimensions::{JointDimensionCalculator, JointDimensions, PrismExtents};
pub use parameters::{JointParameters, PositionMode, Sizing};
pub use plane::{joint_extension, JointPlaneResolver, ResolvedPlane};

use crate::error::{InputError, JointFailure, Result};
use crate::kernel::{BooleanOp, GeometryKernel};

/// Share of the joint extension a dovetail tail reaches.
const DOVETAIL_EXTENSION_SHARE: f64 = 0.8;

/// Joint families. Only mortise-and-tenon and dovetail can be generated;
/// the rest are reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JointKind {
    MortiseAndTenon,
    Dovetail,
    HalfLap,
    FingerJoint,
    BoxJoint,
    Bridle,
}

impl JointKind {
    pub const ALL: [Self; 6] = [
        Self::MortiseAndTenon,
        Self::Dovetail,
        Self::HalfLap,
        Self::FingerJoint,
        Self::BoxJoint,
        Self::Bridle,
    ];

    /// Human-readable name.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::MortiseAndTenon => "Mortise and tenon",
            Self::Dovetail => "Dovetail",
            Self::HalfLap => "Half lap",
            Self::FingerJoint => "Finger joint",
            Self::BoxJoint => "Box joint",
            Self::Bridle => "Bridle",
        }
    }

    /// Whether geometry can be generated for this kind.
    #[must_use]
    pub fn is_implemented(self) -> bool {
        self.shape(&JointParameters::default()).is_some()
    }

    fn shape(self, parameters: &JointParameters) -> Option<PrismShape> {
        match self {
            Self::MortiseAndTenon => Some(PrismShape::Rectangular),
            Self::Dovetail => Some(PrismShape::Dovetail {
                tail_angle: parameters.tail_angle,
            }),
            Self::HalfLap | Self::FingerJoint | Self::BoxJoint | Self::Bridle => None,
        }
    }
}

impl fmt::Display for JointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Result of a joint generation.
#[derive(Debug, Clone)]
pub enum JointOutcome<S> {
    /// Socket cut into the first part and tenon/tail carved from the second.
    Joined { first: S, second: S },
    /// Nothing was modified; both parts are returned as given.
    Unchanged {
        first: S,
        second: S,
        reason: JointFailure,
    },
}

impl<S> JointOutcome<S> {
    #[must_use]
    pub fn is_joined(&self) -> bool {
        matches!(self, Self::Joined { .. })
    }

    /// Why generation left the parts untouched, if it did.
    #[must_use]
    pub fn reason(&self) -> Option<&JointFailure> {
        match self {
            Self::Joined { .. } => None,
            Self::Unchanged { reason, .. } => Some(reason),
        }
    }

    /// The resulting `(first, second)` pair, whichever way generation went.
    pub fn into_pair(self) -> (S, S) {
        match self {
            Self::Joined { first, second } | Self::Unchanged { first, second, .. } => {
                (first, second)
            }
        }
    }
}

/// A joint between two parts.
///
/// The first part receives the mortise or socket; the second part is the
/// one carrying the tenon or tail.
#[derive(Debug, Clone)]
pub struct Joint<S> {
    kind: JointKind,
    first: S,
    second: S,
    intersection: Vec<S>,
    parameters: JointParameters,
}

impl<S: Clone> Joint<S> {
    /// Creates a joint.
    ///
    /// # Errors
    ///
    /// Returns an error if `intersection` is empty, the kind is not
    /// implemented, or the parameters are out of range.
    pub fn new(
        kind: JointKind,
        first: S,
        second: S,
        intersection: Vec<S>,
        parameters: JointParameters,
    ) -> Result<Self> {
        if intersection.is_empty() {
            return Err(InputError::EmptyIntersection.into());
        }
        if !kind.is_implemented() {
            return Err(InputError::UnsupportedKind(kind.display_name()).into());
        }
        parameters.validate()?;
        parameters.log_advisories();
        debug!(%kind, regions = intersection.len(), "joint created");
        Ok(Self {
            kind,
            first,
            second,
            intersection,
            parameters,
        })
    }

    #[must_use]
    pub fn kind(&self) -> JointKind {
        self.kind
    }

    #[must_use]
    pub fn parameters(&self) -> &JointParameters {
        &self.parameters
    }

    /// Generates the joint.
    ///
    /// Resolves the plane, sizes both prisms, cuts the socket out of the
    /// first part and intersects the second part with the tenon or tail.
    /// Any failure along the way returns the original parts untouched.
    pub fn generate<K>(&self, kernel: &K) -> JointOutcome<S>
    where
        K: GeometryKernel<Solid = S>,
    {
        match self.try_generate(kernel) {
            Ok((first, second)) => {
                info!(kind = %self.kind, "joint generated");
                JointOutcome::Joined { first, second }
            }
            Err(reason) => {
                if let JointFailure::Kernel(err) = &reason {
                    error!(kind = %self.kind, %err, "kernel error while generating joint");
                } else {
                    warn!(kind = %self.kind, %reason, "joint left unchanged");
                }
                JointOutcome::Unchanged {
                    first: self.first.clone(),
                    second: self.second.clone(),
                    reason,
                }
            }
        }
    }

    fn try_generate<K>(&self, kernel: &K) -> std::result::Result<(S, S), JointFailure>
    where
        K: GeometryKernel<Solid = S>,
    {
        let shape = self.kind.shape(&self.parameters).ok_or_else(|| {
            JointFailure::DegenerateGeometry(format!("no prism shape for {}", self.kind))
        })?;
        let tolerance = kernel.model_tolerance();

        let resolved = JointPlaneResolver::new(tolerance).resolve(kernel, &self.intersection);
        let mut plane = resolved.plane;
        if self.kind == JointKind::MortiseAndTenon
            && builder::detect_vertical_joint(kernel, &self.first, &self.second)?
        {
            debug!("vertical joint; turning plane about its X axis");
            plane = builder::orient_for_vertical(&plane);
        }
        debug!(origin = ?plane.origin, normal = ?plane.z_axis, "joint plane");

        let region = kernel.bounding_box(&self.intersection[0], Some(&plane))?;
        let height = match self.parameters.sizing {
            Sizing::Percent { .. } => region.extents().z,
            Sizing::Absolute { .. } => {
                let extension = joint_extension(kernel, &self.first, &self.second, &plane);
                match self.kind {
                    JointKind::Dovetail => extension * DOVETAIL_EXTENSION_SHARE,
                    _ => extension,
                }
            }
        };
        let dims = JointDimensionCalculator::new(&self.parameters).compute(&region, height);

        let geometry = JointGeometryBuilder::new(kernel);
        let positive = geometry.build_positive(shape, &plane, &dims.positive)?;
        let negative = geometry.build_negative(shape, &plane, &dims.negative)?;

        let socket = first_result(
            kernel.boolean_difference(&self.first, &negative, tolerance)?,
            BooleanOp::Difference,
        )?;
        let tenon = first_result(
            kernel.boolean_intersection(&self.second, &positive, tolerance)?,
            BooleanOp::Intersection,
        )?;
        Ok((socket, tenon))
    }
}

fn first_result<S>(results: Vec<S>, op: BooleanOp) -> std::result::Result<S, JointFailure> {
    results
        .into_iter()
        .next()
        .ok_or(JointFailure::EmptyBoolean { op })
}

/// Builds a joint of `kind` and generates it in one step.
///
/// # Errors
///
/// Returns an error only for invalid inputs; generation failures are
/// reported as [`JointOutcome::Unchanged`].
pub fn generate_joint<K: GeometryKernel>(
    kernel: &K,
    kind: JointKind,
    first: K::Solid,
    second: K::Solid,
    intersection: Vec<K::Solid>,
    parameters: JointParameters,
) -> Result<JointOutcome<K::Solid>> {
    Ok(Joint::new(kind, first, second, intersection, parameters)?.generate(kernel))
}
