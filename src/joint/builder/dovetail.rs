use crate::joint::dimensions::{dovetail_wider_width, PrismExtents};
use crate::math::{JointPlane, Point3};

/// Corners of a dovetail prism in world space.
///
/// The narrow face of width `extents.width` lies on `extents.min.z`; the
/// cross-section widens linearly to the flared width at `extents.max.z`.
/// Both faces are centred on the extents' X/Y midpoint. Ordering matches
/// [`Aabb::corners`](crate::math::Aabb::corners): narrow face first.
#[must_use]
pub fn dovetail_corners(
    plane: &JointPlane,
    extents: &PrismExtents,
    tail_angle_degrees: f64,
) -> [Point3; 8] {
    let cx = (extents.min.x + extents.max.x) / 2.0;
    let cy = (extents.min.y + extents.max.y) / 2.0;
    let (z0, z1) = (extents.min.z, extents.max.z);
    let half_d = extents.depth / 2.0;
    let narrow = extents.width / 2.0;
    let wide = dovetail_wider_width(extents.width, extents.height, tail_angle_degrees) / 2.0;

    [
        plane.point_at(cx - narrow, cy - half_d, z0),
        plane.point_at(cx + narrow, cy - half_d, z0),
        plane.point_at(cx + narrow, cy + half_d, z0),
        plane.point_at(cx - narrow, cy + half_d, z0),
        plane.point_at(cx - wide, cy - half_d, z1),
        plane.point_at(cx + wide, cy - half_d, z1),
        plane.point_at(cx + wide, cy + half_d, z1),
        plane.point_at(cx - wide, cy + half_d, z1),
    ]
}
