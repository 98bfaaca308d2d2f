mod working_set;

pub use working_set::WorkingSet;

use tracing::{debug, info, warn};

use crate::error::{InputError, JointFailure, Result};
use crate::joint::{
    Joint, JointDimensionCalculator, JointGeometryBuilder, JointKind, JointOutcome,
    JointParameters,
};
use crate::kernel::{BooleanOp, Document, GeometryKernel};
use crate::math::{Aabb, JointPlane, Point3};

/// What happened to one mutating step of a pair.
#[derive(Debug, Clone)]
pub enum StepOutcome {
    /// The step did not run because the pair had no joint.
    Skipped,
    /// The slot was replaced with the boolean result.
    Applied,
    /// The step failed and the slot kept its previous geometry.
    Failed(JointFailure),
}

impl StepOutcome {
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Record of one ordered pair `(i, j)` in a synthesis pass.
#[derive(Debug, Clone)]
pub struct PairReport {
    pub pair: (usize, usize),
    /// The parts overlap.
    pub intersected: bool,
    /// Why no tenon was built for an overlapping pair.
    pub tenon_failure: Option<JointFailure>,
    /// Union of the tenon into slot `i`.
    pub union: StepOutcome,
    /// Difference of the tenon out of slot `j`.
    pub difference: StepOutcome,
}

impl PairReport {
    fn skipped(pair: (usize, usize)) -> Self {
        Self {
            pair,
            intersected: false,
            tenon_failure: None,
            union: StepOutcome::Skipped,
            difference: StepOutcome::Skipped,
        }
    }
}

/// Result of [`synthesize_assembly`].
#[derive(Debug, Clone)]
pub struct AssemblyReport<S> {
    /// Final geometry per part, in input order.
    pub solids: Vec<S>,
    /// One entry per ordered pair, in visiting order.
    pub pairs: Vec<PairReport>,
    /// Number of document objects replaced.
    pub written: usize,
}

/// Joins every overlapping pair in a set of parts with a mortise-and-tenon.
///
/// Every ordered pair `(i, j)` with `i != j` is visited, so each contact is
/// processed twice with the roles swapped. For each overlapping pair a tenon
/// is laid on the face of part `j` nearest the overlap's centre, unioned
/// into part `i` and subtracted from part `j`.
pub struct PairwiseJointSynthesizer<'k, K> {
    kernel: &'k K,
    parameters: JointParameters,
}

impl<'k, K: GeometryKernel> PairwiseJointSynthesizer<'k, K> {
    /// Creates a synthesizer.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are out of range.
    pub fn new(kernel: &'k K, parameters: JointParameters) -> Result<Self> {
        parameters.validate()?;
        parameters.log_advisories();
        Ok(Self { kernel, parameters })
    }

    /// Runs one pass over `solids`, updating slots in place.
    pub fn synthesize(&self, solids: &mut [K::Solid]) -> Vec<PairReport> {
        let n = solids.len();
        let mut reports = Vec::with_capacity(n * n.saturating_sub(1));
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    reports.push(self.process_pair(solids, i, j));
                }
            }
        }
        let joined = reports.iter().filter(|r| r.intersected).count();
        info!(parts = n, pairs = reports.len(), joined, "synthesis pass finished");
        reports
    }

    /// Processes the ordered pair `(i, j)`.
    ///
    /// The union and difference are attempted independently: a failure in
    /// one leaves its slot untouched without undoing the other.
    ///
    /// # Panics
    ///
    /// Panics if `i` or `j` is out of bounds.
    pub fn process_pair(&self, solids: &mut [K::Solid], i: usize, j: usize) -> PairReport {
        let tolerance = self.kernel.model_tolerance();
        let region = match self.kernel.boolean_intersection(&solids[i], &solids[j], tolerance) {
            Ok(region) => region,
            Err(err) => {
                warn!(pair = ?(i, j), %err, "intersection failed; skipping pair");
                return PairReport::skipped((i, j));
            }
        };
        if region.is_empty() {
            debug!(pair = ?(i, j), "no contact");
            return PairReport::skipped((i, j));
        }

        let mut report = PairReport {
            intersected: true,
            ..PairReport::skipped((i, j))
        };
        let tenon = match self.local_tenon(&solids[j], &region) {
            Ok(tenon) => tenon,
            Err(reason) => {
                warn!(pair = ?(i, j), %reason, "tenon not built; skipping pair");
                report.tenon_failure = Some(reason);
                return report;
            }
        };

        report.union = self.apply(solids, i, &tenon, BooleanOp::Union);
        report.difference = self.apply(solids, j, &tenon, BooleanOp::Difference);
        report
    }

    /// Replaces `solids[slot]` with `op(solids[slot], tool)` if the kernel
    /// returns a body.
    fn apply(
        &self,
        solids: &mut [K::Solid],
        slot: usize,
        tool: &K::Solid,
        op: BooleanOp,
    ) -> StepOutcome {
        let tolerance = self.kernel.model_tolerance();
        let result = self
            .kernel
            .boolean(op, &solids[slot], tool, tolerance)
            .map_err(JointFailure::from)
            .and_then(|out| {
                out.into_iter()
                    .next()
                    .ok_or(JointFailure::EmptyBoolean { op })
            });
        match result {
            Ok(solid) => {
                solids[slot] = solid;
                StepOutcome::Applied
            }
            Err(reason) => {
                warn!(slot, %op, %reason, "boolean step failed; slot unchanged");
                StepOutcome::Failed(reason)
            }
        }
    }

    /// Tenon on the face of `target` closest to the centre of `region`.
    ///
    /// The frame's Z axis is the face normal there. Width, depth and height
    /// come from the region's world bounding box; the tenon is centred on
    /// the frame origin and reaches its height along the normal.
    ///
    /// # Errors
    ///
    /// Returns the reason the tenon could not be built.
    pub fn local_tenon(
        &self,
        target: &K::Solid,
        region: &[K::Solid],
    ) -> std::result::Result<K::Solid, JointFailure> {
        let first = region
            .first()
            .ok_or_else(|| JointFailure::DegenerateGeometry("empty intersection".into()))?;
        let bbox = self.kernel.bounding_box(first, None)?;
        let center = bbox.center();

        let (closest, normal) = self
            .kernel
            .closest_surface_point(target, &center)
            .ok_or_else(|| JointFailure::DegenerateGeometry("no face near intersection".into()))?;
        let plane = JointPlane::from_normal(center, normal)
            .ok_or_else(|| JointFailure::DegenerateGeometry("zero face normal".into()))?;
        debug!(face = closest.face, distance = closest.distance, normal = ?plane.z_axis, "local tenon plane");

        let (width, depth, height) =
            JointDimensionCalculator::new(&self.parameters).local_tenon_size(&bbox);
        let tolerance = self.kernel.model_tolerance();
        if width <= tolerance || depth <= tolerance || height <= tolerance {
            return Err(JointFailure::DegenerateGeometry(format!(
                "local tenon {width:.4} x {depth:.4} x {height:.4}"
            )));
        }
        let local = Aabb {
            min: Point3::new(-width / 2.0, -depth / 2.0, 0.0),
            max: Point3::new(width / 2.0, depth / 2.0, height),
        };
        JointGeometryBuilder::new(self.kernel).prism_from_corners(&plane.box_corners(&local))
    }
}

/// Joins every overlapping pair among `solids` and writes the results back
/// to `document`, one replacement per identity.
///
/// # Errors
///
/// Returns an error if the parameters are invalid or `solids` and
/// `identities` differ in length.
pub fn synthesize_assembly<K, D>(
    kernel: &K,
    document: &mut D,
    solids: Vec<K::Solid>,
    identities: Vec<D::Id>,
    parameters: JointParameters,
) -> Result<AssemblyReport<K::Solid>>
where
    K: GeometryKernel,
    D: Document<Solid = K::Solid>,
{
    let synthesizer = PairwiseJointSynthesizer::new(kernel, parameters)?;
    let mut set = WorkingSet::new(solids, identities)?;
    let pairs = synthesizer.synthesize(set.solids_mut());
    let written = set.write_back(document);
    info!(written, "assembly written back");
    Ok(AssemblyReport {
        solids: set.into_solids(),
        pairs,
        written,
    })
}

/// Outcome of [`join_pair`].
#[derive(Debug, Clone)]
pub enum PairJoin {
    /// The two parts do not overlap; nothing was changed.
    NoIntersection,
    /// Both document objects were replaced.
    Joined,
    /// Generation failed; the document is untouched.
    Unchanged(JointFailure),
}

/// Joins two document objects with a joint of `kind`.
///
/// The first object receives the socket, the second the tenon or tail.
///
/// # Errors
///
/// Returns an error if either object is missing or cannot be replaced, or
/// if the joint inputs are invalid. A kernel fault while intersecting the
/// parts is also an error.
pub fn join_pair<K, D>(
    kernel: &K,
    document: &mut D,
    first: D::Id,
    second: D::Id,
    kind: JointKind,
    parameters: JointParameters,
) -> Result<PairJoin>
where
    K: GeometryKernel,
    D: Document<Solid = K::Solid>,
{
    let a = document.solid(first).cloned().ok_or(InputError::ObjectNotFound)?;
    let b = document.solid(second).cloned().ok_or(InputError::ObjectNotFound)?;
    let region = kernel.boolean_intersection(&a, &b, kernel.model_tolerance())?;
    if region.is_empty() {
        info!("selected parts do not intersect");
        return Ok(PairJoin::NoIntersection);
    }
    debug!(regions = region.len(), "intersection found");

    let joint = Joint::new(kind, a, b, region, parameters)?;
    match joint.generate(kernel) {
        JointOutcome::Joined {
            first: socket,
            second: tenon,
        } => {
            if !document.replace_object(first, socket) || !document.replace_object(second, tenon) {
                warn!("document rejected joined geometry");
                return Err(InputError::ObjectNotFound.into());
            }
            Ok(PairJoin::Joined)
        }
        JointOutcome::Unchanged { reason, .. } => Ok(PairJoin::Unchanged(reason)),
    }
}
