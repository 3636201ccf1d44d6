use crate::{BoundingBox, Velocity};

/// Compute intersection over union.
///
/// # Parameters
///
/// * `a`: A bounding box.
/// * `b`: A bounding box.
///
/// # Returns
///
/// The intersection over union in [0.0, 1.0] between `a` and `b`. Returns `0.0` when the union is not positive so degenerate boxes never produce a match.
pub fn intersection_over_union(a: &BoundingBox, b: &BoundingBox) -> f32 {
    let width = (a.right().min(b.right()) as i64 - a.left().max(b.left()) as i64).max(0);
    let height = (a.bottom().min(b.bottom()) as i64 - a.top().max(b.top()) as i64).max(0);
    let area_intersection = width as u128 * height as u128;

    let area_union = a.area() as u128 + b.area() as u128 - area_intersection;
    if area_union == 0 {
        return 0.0;
    }

    (area_intersection as f64 / area_union as f64) as f32
}

/// Compute the displacement of the center of `current` relative to the center of `previous`.
pub fn center_delta(current: &BoundingBox, previous: &BoundingBox) -> Velocity {
    Velocity::new(
        current.center_x().saturating_sub(previous.center_x()),
        current.center_y().saturating_sub(previous.center_y()),
    )
}

/// Normalize a pixel displacement into a box-relative unit.
///
/// # Parameters
///
/// * `velocity`: The last observed center displacement.
/// * `bbox`: The box the displacement belongs to.
/// * `scale_factor`: Multiplier applied to the normalized magnitude.
///
/// # Returns
///
/// `|velocity| / (width + height) * scale_factor`, or `0.0` if the box has no extent.
pub fn scaled_displacement(velocity: &Velocity, bbox: &BoundingBox, scale_factor: f32) -> f32 {
    let extent = bbox.width() + bbox.height();
    if extent <= 0 {
        return 0.0;
    }

    velocity.magnitude() / extent as f32 * scale_factor
}
