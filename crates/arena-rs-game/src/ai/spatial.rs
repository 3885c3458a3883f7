//! Spatial targeting for boss attacks: biased floor sampling and beam hit tests.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::grid::Grid;

use super::pathfinding;

/// Radius, in tile widths, inside which a floor tile counts as "near" the target.
pub const NEAR_RADIUS_TILES: f32 = 4.0;

/// Keeps fallback points away from the arena edge.
const FALLBACK_MARGIN: f32 = 32.0;

/// Number of near-pool picks for a request of `count` points: `ceil(0.4 * count)`.
pub fn near_quota(count: usize) -> usize {
    (count * 2).div_ceil(5)
}

/// Choose `count` bombardment impact points around `target`.
///
/// Floor tile centres are shuffled, split into tiles within
/// [`NEAR_RADIUS_TILES`] of the target and the rest, then drawn near-first up
/// to [`near_quota`], filled from the far pool, and backfilled from any
/// unused tile. The result has `min(count, floor tiles)` points.
///
/// Without a grid, `count` uniform points inside `arena_size` are returned.
pub fn sample_bombardment_targets<R: Rng + ?Sized>(
    grid: Option<&dyn Grid>,
    target: (f32, f32),
    count: usize,
    arena_size: (f32, f32),
    rng: &mut R,
) -> Vec<(f32, f32)> {
    let Some(grid) = grid else {
        return random_points(count, arena_size, rng);
    };

    let mut tiles = grid.floor_tile_centers();
    tiles.shuffle(rng);

    let near_limit = NEAR_RADIUS_TILES * grid.tile_size();
    let near_limit_sq = near_limit * near_limit;
    let (near, far): (Vec<(f32, f32)>, Vec<(f32, f32)>) = tiles.into_iter().partition(|&(x, y)| {
        pathfinding::distance_sq(x, y, target.0, target.1) <= near_limit_sq
    });

    let from_near = near_quota(count).min(near.len());
    let mut picked: Vec<(f32, f32)> = near[..from_near].to_vec();

    let from_far = (count - picked.len()).min(far.len());
    picked.extend_from_slice(&far[..from_far]);

    if picked.len() < count {
        let short = count - picked.len();
        let leftovers = near[from_near..].iter().chain(far[from_far..].iter());
        picked.extend(leftovers.take(short).copied());
    }

    picked
}

/// `count` uniformly random points inside the arena, away from the edges.
pub fn random_points<R: Rng + ?Sized>(
    count: usize,
    arena_size: (f32, f32),
    rng: &mut R,
) -> Vec<(f32, f32)> {
    let (w, h) = arena_size;
    let span = |extent: f32| {
        if extent > 2.0 * FALLBACK_MARGIN {
            (FALLBACK_MARGIN, extent - FALLBACK_MARGIN)
        } else {
            (0.0, extent.max(0.0))
        }
    };
    let (x0, x1) = span(w);
    let (y0, y1) = span(h);
    (0..count)
        .map(|_| {
            (
                x0 + rng.gen::<f32>() * (x1 - x0),
                y0 + rng.gen::<f32>() * (y1 - y0),
            )
        })
        .collect()
}

/// Whether a circle is touched by a beam running from `a` to `b`.
///
/// The circle centre is projected onto the segment with `t` clamped to
/// `[0, 1]`; the hit test compares the distance to that point against
/// `radius + half_width`. A zero-length beam degenerates to a point test at `a`.
pub fn beam_hits_circle(
    a: (f32, f32),
    b: (f32, f32),
    center: (f32, f32),
    radius: f32,
    half_width: f32,
) -> bool {
    let abx = b.0 - a.0;
    let aby = b.1 - a.1;
    let len_sq = abx * abx + aby * aby;

    let t = if len_sq <= f32::EPSILON {
        0.0
    } else {
        (((center.0 - a.0) * abx + (center.1 - a.1) * aby) / len_sq).clamp(0.0, 1.0)
    };

    let px = a.0 + abx * t;
    let py = a.1 + aby * t;
    let reach = radius + half_width;
    pathfinding::distance_sq(px, py, center.0, center.1) <= reach * reach
}

/// Beam angle at sweep progress `p`: `start + direction * arc * p`, with `p` clamped to `[0, 1]`.
pub fn sweep_angle(start_angle: f32, direction: f32, arc: f32, progress: f32) -> f32 {
    start_angle + direction * arc * progress.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::TileGrid;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn near_count(points: &[(f32, f32)], target: (f32, f32), tile: f32) -> usize {
        points
            .iter()
            .filter(|&&(x, y)| {
                pathfinding::distance(x, y, target.0, target.1) <= NEAR_RADIUS_TILES * tile
            })
            .count()
    }

    #[test]
    fn quota_is_ceiling_of_forty_percent() {
        assert_eq!(near_quota(5), 2);
        assert_eq!(near_quota(8), 4);
        assert_eq!(near_quota(1), 1);
        assert_eq!(near_quota(0), 0);
    }

    #[test]
    fn bombardment_biases_toward_target() {
        let grid = TileGrid::open_room(40, 30, 32.0);
        let target = (320.0, 320.0);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let points = sample_bombardment_targets(Some(&grid), target, 5, (0.0, 0.0), &mut rng);
            assert_eq!(points.len(), 5);
            assert!(near_count(&points, target, 32.0) >= 2);
            assert!(points.iter().all(|&(x, y)| !grid.is_wall_at(x, y)));
        }
    }

    #[test]
    fn bombardment_points_are_distinct() {
        let grid = TileGrid::open_room(20, 20, 32.0);
        let mut rng = StdRng::seed_from_u64(3);
        let mut points = sample_bombardment_targets(Some(&grid), (300.0, 300.0), 8, (0.0, 0.0), &mut rng);
        points.sort_by(|a, b| a.partial_cmp(b).unwrap());
        points.dedup();
        assert_eq!(points.len(), 8);
    }

    #[test]
    fn bombardment_capped_by_floor_tiles() {
        // 3x3 room with border walls: a single floor tile.
        let grid = TileGrid::open_room(3, 3, 32.0);
        let mut rng = StdRng::seed_from_u64(1);
        let points = sample_bombardment_targets(Some(&grid), (48.0, 48.0), 5, (0.0, 0.0), &mut rng);
        assert_eq!(points, vec![(48.0, 48.0)]);
    }

    #[test]
    fn bombardment_backfills_when_far_pool_is_short() {
        // 6x6 room: every floor tile is within 4 tiles of the centre, so all come from "near".
        let grid = TileGrid::open_room(6, 6, 32.0);
        let mut rng = StdRng::seed_from_u64(11);
        let points = sample_bombardment_targets(Some(&grid), (96.0, 96.0), 8, (0.0, 0.0), &mut rng);
        assert_eq!(points.len(), 8);
    }

    #[test]
    fn bombardment_without_grid_uses_random_points() {
        let mut rng = StdRng::seed_from_u64(5);
        let points = sample_bombardment_targets(None, (0.0, 0.0), 6, (640.0, 480.0), &mut rng);
        assert_eq!(points.len(), 6);
        assert!(points
            .iter()
            .all(|&(x, y)| (0.0..=640.0).contains(&x) && (0.0..=480.0).contains(&y)));
    }

    #[test]
    fn beam_hits_circle_on_segment() {
        assert!(beam_hits_circle((0.0, 0.0), (100.0, 0.0), (50.0, 10.0), 5.0, 6.0));
        assert!(!beam_hits_circle((0.0, 0.0), (100.0, 0.0), (50.0, 20.0), 5.0, 6.0));
    }

    #[test]
    fn beam_clamps_past_the_tip() {
        // Circle beyond the beam end: distance is measured to the endpoint, not the infinite line.
        assert!(!beam_hits_circle((0.0, 0.0), (100.0, 0.0), (120.0, 0.0), 5.0, 6.0));
        assert!(beam_hits_circle((0.0, 0.0), (100.0, 0.0), (110.0, 0.0), 5.0, 6.0));
    }

    #[test]
    fn beam_zero_length_is_point_test() {
        assert!(beam_hits_circle((10.0, 10.0), (10.0, 10.0), (14.0, 10.0), 2.0, 2.0));
        assert!(!beam_hits_circle((10.0, 10.0), (10.0, 10.0), (20.0, 10.0), 2.0, 2.0));
    }

    #[test]
    fn sweep_is_linear_in_progress() {
        let start = 0.5;
        let arc = 2.0;
        assert!((sweep_angle(start, 1.0, arc, 0.0) - 0.5).abs() < 1e-6);
        assert!((sweep_angle(start, 1.0, arc, 0.5) - 1.5).abs() < 1e-6);
        assert!((sweep_angle(start, 1.0, arc, 1.0) - 2.5).abs() < 1e-6);
        assert!((sweep_angle(start, -1.0, arc, 1.0) + 1.5).abs() < 1e-6);
        assert!((sweep_angle(start, 1.0, arc, 3.0) - 2.5).abs() < 1e-6);
    }
}
