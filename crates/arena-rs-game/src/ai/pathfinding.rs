//! Direct steering on an open arena floor (no path search, walls are resolved afterwards).

/// Unit vector pointing from `(from_x, from_y)` toward `(to_x, to_y)`.
///
/// Returns `None` when the two points coincide, so callers never divide by zero.
pub fn direction_toward(from_x: f32, from_y: f32, to_x: f32, to_y: f32) -> Option<(f32, f32)> {
    let dx = to_x - from_x;
    let dy = to_y - from_y;
    let dist = (dx * dx + dy * dy).sqrt();
    if dist <= f32::EPSILON {
        return None;
    }
    Some((dx / dist, dy / dist))
}

/// Displacement for one step toward a goal, never overshooting it.
pub fn step_toward(
    current_x: f32,
    current_y: f32,
    goal_x: f32,
    goal_y: f32,
    max_step: f32,
) -> (f32, f32) {
    let dist = distance(current_x, current_y, goal_x, goal_y);
    match direction_toward(current_x, current_y, goal_x, goal_y) {
        Some((nx, ny)) => {
            let step = max_step.min(dist);
            (nx * step, ny * step)
        }
        None => (0.0, 0.0),
    }
}

/// Angle in radians from one point to another (`atan2` convention, +X = 0, +Y = π/2).
pub fn angle_toward(from_x: f32, from_y: f32, to_x: f32, to_y: f32) -> f32 {
    (to_y - from_y).atan2(to_x - from_x)
}

/// Unit vector for an angle in radians.
pub fn unit_from_angle(angle: f32) -> (f32, f32) {
    (angle.cos(), angle.sin())
}

/// Euclidean distance between two points.
pub fn distance(x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    distance_sq(x1, y1, x2, y2).sqrt()
}

/// Squared distance between two points.
pub fn distance_sq(x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    let dx = x2 - x1;
    let dy = y2 - y1;
    dx * dx + dy * dy
}
