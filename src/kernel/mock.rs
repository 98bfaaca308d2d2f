use std::cell::{Cell, RefCell};
use std::sync::Once;

use tracing_subscriber::EnvFilter;

use super::{BooleanOp, GeometryKernel};
use crate::error::KernelError;
use crate::math::{Aabb, JointPlane, Point3, Vector3};

/// Installs a test log subscriber once per test binary.
pub(crate) fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub(crate) fn p(x: f64, y: f64, z: f64) -> Point3 {
    Point3::new(x, y, z)
}

/// Box solid spanning two corners.
pub(crate) fn cuboid(min: Point3, max: Point3) -> CuboidSolid {
    CuboidSolid {
        cells: vec![Aabb::from_corners(min, max)],
        closed: true,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CuboidSolid {
    pub cells: Vec<Aabb>,
    pub closed: bool,
}

impl CuboidSolid {
    fn from_cells(cells: Vec<Aabb>) -> Self {
        Self { cells, closed: true }
    }

    pub fn volume(&self) -> f64 {
        self.cells.iter().map(Aabb::volume).sum()
    }

    pub fn bounds(&self) -> Option<Aabb> {
        self.cells.iter().copied().reduce(|a, b| a.union(&b))
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CuboidFace {
    corners: [Point3; 4],
}

/// Kernel whose solids are unions of disjoint axis-aligned boxes, which keeps
/// every boolean exact. Prisms from rotated frames are stored as their world
/// bounding box, so tests keep frames axis-aligned.
#[derive(Debug)]
pub(crate) struct CuboidKernel {
    tolerance: f64,
    calls: RefCell<Vec<BooleanOp>>,
    empty_ops: RefCell<Vec<BooleanOp>>,
    faulting_ops: RefCell<Vec<BooleanOp>>,
    rejected_faces: Cell<usize>,
    split_join: Cell<bool>,
    fail_bounding_box: Cell<bool>,
}

impl Default for CuboidKernel {
    fn default() -> Self {
        Self {
            tolerance: 0.001,
            calls: RefCell::default(),
            empty_ops: RefCell::default(),
            faulting_ops: RefCell::default(),
            rejected_faces: Cell::new(0),
            split_join: Cell::new(false),
            fail_bounding_box: Cell::new(false),
        }
    }
}

impl CuboidKernel {
    pub fn new() -> Self {
        init_tracing();
        Self::default()
    }

    /// Makes `op` return an empty result from now on.
    pub fn return_empty(&self, op: BooleanOp) {
        self.empty_ops.borrow_mut().push(op);
    }

    /// Makes `op` fault from now on.
    pub fn fault(&self, op: BooleanOp) {
        self.faulting_ops.borrow_mut().push(op);
    }

    /// Rejects the next `n` face constructions.
    pub fn reject_faces(&self, n: usize) {
        self.rejected_faces.set(n);
    }

    /// Makes face joins yield two open bodies.
    pub fn split_joins(&self) {
        self.split_join.set(true);
    }

    pub fn fail_bounding_boxes(&self) {
        self.fail_bounding_box.set(true);
    }

    /// Number of boolean calls of kind `op` so far.
    pub fn calls(&self, op: BooleanOp) -> usize {
        self.calls.borrow().iter().filter(|c| **c == op).count()
    }

    fn record(&self, op: BooleanOp) -> Result<bool, KernelError> {
        self.calls.borrow_mut().push(op);
        if self.faulting_ops.borrow().contains(&op) {
            return Err(KernelError::Failed(format!("injected {op} fault")));
        }
        Ok(self.empty_ops.borrow().contains(&op))
    }

    fn subtract_cells(&self, cells: &[Aabb], cutters: &[Aabb]) -> Vec<Aabb> {
        let mut remaining = cells.to_vec();
        for cut in cutters {
            remaining = remaining
                .iter()
                .flat_map(|cell| subtract_box(cell, cut, self.tolerance))
                .collect();
        }
        remaining
    }

    fn cell_face(&self, solid: &CuboidSolid, face: usize) -> Option<(Aabb, usize, f64)> {
        let cell = solid.cells.get(face / 6)?;
        let axis = (face % 6) / 2;
        let sign = if face % 2 == 0 { -1.0 } else { 1.0 };
        Some((*cell, axis, sign))
    }
}

/// `cell − cut` as up to six disjoint boxes.
fn subtract_box(cell: &Aabb, cut: &Aabb, tolerance: f64) -> Vec<Aabb> {
    let Some(overlap) = cell.intersection(cut, tolerance) else {
        return vec![*cell];
    };
    let mut pieces = Vec::new();
    let mut core = *cell;
    for axis in 0..3 {
        let mut below = core;
        below.max[axis] = overlap.min[axis];
        let mut above = core;
        above.min[axis] = overlap.max[axis];
        for piece in [below, above] {
            if piece.extents().iter().all(|e| *e > tolerance) {
                pieces.push(piece);
            }
        }
        core.min[axis] = overlap.min[axis];
        core.max[axis] = overlap.max[axis];
    }
    pieces
}

fn in_plane_axes(axis: usize) -> (usize, usize) {
    match axis {
        0 => (1, 2),
        1 => (2, 0),
        _ => (0, 1),
    }
}

impl GeometryKernel for CuboidKernel {
    type Solid = CuboidSolid;
    type Face = CuboidFace;

    fn model_tolerance(&self) -> f64 {
        self.tolerance
    }

    fn boolean_intersection(
        &self,
        a: &CuboidSolid,
        b: &CuboidSolid,
        tolerance: f64,
    ) -> Result<Vec<CuboidSolid>, KernelError> {
        if self.record(BooleanOp::Intersection)? {
            return Ok(Vec::new());
        }
        let cells: Vec<Aabb> = a
            .cells
            .iter()
            .flat_map(|ca| b.cells.iter().filter_map(|cb| ca.intersection(cb, tolerance)))
            .collect();
        if cells.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![CuboidSolid::from_cells(cells)])
    }

    fn boolean_union(
        &self,
        a: &CuboidSolid,
        b: &CuboidSolid,
        _tolerance: f64,
    ) -> Result<Vec<CuboidSolid>, KernelError> {
        if self.record(BooleanOp::Union)? {
            return Ok(Vec::new());
        }
        let mut cells = a.cells.clone();
        cells.extend(self.subtract_cells(&b.cells, &a.cells));
        Ok(vec![CuboidSolid::from_cells(cells)])
    }

    fn boolean_difference(
        &self,
        a: &CuboidSolid,
        b: &CuboidSolid,
        _tolerance: f64,
    ) -> Result<Vec<CuboidSolid>, KernelError> {
        if self.record(BooleanOp::Difference)? {
            return Ok(Vec::new());
        }
        let cells = self.subtract_cells(&a.cells, &b.cells);
        if cells.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![CuboidSolid::from_cells(cells)])
    }

    fn bounding_box(
        &self,
        solid: &CuboidSolid,
        frame: Option<&JointPlane>,
    ) -> Result<Aabb, KernelError> {
        if self.fail_bounding_box.get() {
            return Err(KernelError::Failed("injected bounding box fault".into()));
        }
        let corners = solid.cells.iter().flat_map(Aabb::corners);
        let bbox = match frame {
            Some(plane) => Aabb::from_points(corners.map(|c| plane.to_local(&c))),
            None => Aabb::from_points(corners),
        };
        bbox.ok_or_else(|| KernelError::InvalidInput("solid has no cells".into()))
    }

    fn face_count(&self, solid: &CuboidSolid) -> usize {
        solid.cells.len() * 6
    }

    fn closest_point_on_face(
        &self,
        solid: &CuboidSolid,
        face: usize,
        point: &Point3,
    ) -> Option<(f64, f64)> {
        let (cell, axis, _) = self.cell_face(solid, face)?;
        let (iu, iv) = in_plane_axes(axis);
        Some((
            point[iu].clamp(cell.min[iu], cell.max[iu]),
            point[iv].clamp(cell.min[iv], cell.max[iv]),
        ))
    }

    fn face_point_at(&self, solid: &CuboidSolid, face: usize, u: f64, v: f64) -> Option<Point3> {
        let (cell, axis, sign) = self.cell_face(solid, face)?;
        let (iu, iv) = in_plane_axes(axis);
        let mut pt = Point3::origin();
        pt[axis] = if sign < 0.0 { cell.min[axis] } else { cell.max[axis] };
        pt[iu] = u;
        pt[iv] = v;
        Some(pt)
    }

    fn face_normal_at(
        &self,
        solid: &CuboidSolid,
        face: usize,
        _u: f64,
        _v: f64,
    ) -> Option<Vector3> {
        let (_, axis, sign) = self.cell_face(solid, face)?;
        let mut n = Vector3::zeros();
        n[axis] = sign;
        Some(n)
    }

    fn is_valid(&self, solid: &CuboidSolid) -> bool {
        !solid.cells.is_empty()
            && solid
                .cells
                .iter()
                .all(|c| c.is_valid() && c.extents().iter().all(|e| *e > self.tolerance))
    }

    fn is_closed_solid(&self, solid: &CuboidSolid) -> bool {
        solid.closed
    }

    fn create_box(&self, corners: &[Point3; 8]) -> Result<CuboidSolid, KernelError> {
        let bbox = Aabb::from_points(corners.iter().copied())
            .ok_or_else(|| KernelError::InvalidInput("no corners".into()))?;
        if !bbox.is_valid() {
            return Err(KernelError::InvalidInput("non-finite box corners".into()));
        }
        Ok(CuboidSolid::from_cells(vec![bbox]))
    }

    fn create_face_from_corners(&self, corners: [Point3; 4], tolerance: f64) -> Option<CuboidFace> {
        let rejected = self.rejected_faces.get();
        if rejected > 0 {
            self.rejected_faces.set(rejected - 1);
            return None;
        }
        for i in 0..4 {
            for j in (i + 1)..4 {
                if (corners[i] - corners[j]).norm() < tolerance {
                    return None;
                }
            }
        }
        Some(CuboidFace { corners })
    }

    fn join_faces(&self, faces: Vec<CuboidFace>, _tolerance: f64) -> Vec<CuboidSolid> {
        if faces.len() != 6 {
            return Vec::new();
        }
        let Some(bbox) = Aabb::from_points(faces.iter().flat_map(|f| f.corners)) else {
            return Vec::new();
        };
        if self.split_join.get() {
            let mid = bbox.center();
            let mut lower = bbox;
            lower.max.z = mid.z;
            let mut upper = bbox;
            upper.min.z = mid.z;
            return [lower, upper]
                .into_iter()
                .map(|c| CuboidSolid {
                    cells: vec![c],
                    closed: false,
                })
                .collect();
        }
        vec![CuboidSolid::from_cells(vec![bbox])]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn difference_keeps_volume() {
        let k = CuboidKernel::new();
        let a = cuboid(p(0.0, 0.0, 0.0), p(10.0, 10.0, 10.0));
        let b = cuboid(p(2.0, 2.0, 2.0), p(4.0, 4.0, 4.0));
        let out = k.boolean_difference(&a, &b, 0.001).unwrap();
        assert_relative_eq!(out[0].volume(), 1000.0 - 8.0, epsilon = 1e-9);

        let u = k.boolean_union(&out[0], &b, 0.001).unwrap();
        assert_relative_eq!(u[0].volume(), 1000.0, epsilon = 1e-9);
        assert_eq!(k.calls(BooleanOp::Difference), 1);
        assert_eq!(k.calls(BooleanOp::Union), 1);
    }

    #[test]
    fn closest_face_of_box() {
        let k = CuboidKernel::new();
        let a = cuboid(p(0.0, 0.0, 0.0), p(10.0, 10.0, 2.0));
        let (sp, normal) = k.closest_surface_point(&a, &p(5.0, 5.0, 1.5)).unwrap();
        assert_relative_eq!(sp.distance, 0.5, epsilon = 1e-12);
        assert_eq!(normal, Vector3::z());
    }
}
