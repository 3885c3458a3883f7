//! Arena tile grid: wall occupancy, floor enumeration, and circle-vs-wall resolution.

use crate::error::GameError;

/// Default tile edge length in world units.
pub const DEFAULT_TILE_SIZE: f32 = 32.0;

/// Maximum push-out passes per resolution call.
const MAX_RESOLVE_PASSES: usize = 5;

/// Read-only view of an arena's wall layout.
///
/// Tiles outside the grid always count as walls.
pub trait Grid {
    /// Number of tile columns.
    fn cols(&self) -> usize;

    /// Number of tile rows.
    fn rows(&self) -> usize;

    /// Tile edge length in world units.
    fn tile_size(&self) -> f32;

    /// Whether the tile at `(col, row)` blocks movement.
    fn is_wall(&self, col: i32, row: i32) -> bool;

    /// Arena extent in world units.
    fn world_size(&self) -> (f32, f32) {
        (
            self.cols() as f32 * self.tile_size(),
            self.rows() as f32 * self.tile_size(),
        )
    }

    /// Whether the world position lies inside a wall tile.
    fn is_wall_at(&self, x: f32, y: f32) -> bool {
        let ts = self.tile_size();
        self.is_wall((x / ts).floor() as i32, (y / ts).floor() as i32)
    }

    /// Centres of all floor tiles, in row-major order.
    fn floor_tile_centers(&self) -> Vec<(f32, f32)> {
        let ts = self.tile_size();
        let mut centers = Vec::new();
        for row in 0..self.rows() {
            for col in 0..self.cols() {
                if !self.is_wall(col as i32, row as i32) {
                    centers.push(((col as f32 + 0.5) * ts, (row as f32 + 0.5) * ts));
                }
            }
        }
        centers
    }
}

/// A rectangular grid of wall/floor tiles with optional spawn markers.
#[derive(Debug, Clone)]
pub struct TileGrid {
    cols: usize,
    rows: usize,
    tile_size: f32,
    walls: Vec<bool>,
    boss_spawn: Option<(usize, usize)>,
    player_spawn: Option<(usize, usize)>,
}

impl TileGrid {
    /// An open room with a one-tile wall border.
    pub fn open_room(cols: usize, rows: usize, tile_size: f32) -> Self {
        let mut walls = vec![false; cols * rows];
        for row in 0..rows {
            for col in 0..cols {
                if row == 0 || col == 0 || row + 1 == rows || col + 1 == cols {
                    walls[row * cols + col] = true;
                }
            }
        }
        Self {
            cols,
            rows,
            tile_size,
            walls,
            boss_spawn: None,
            player_spawn: None,
        }
    }

    /// Parse an ASCII map: `#` wall, `.` floor, `B` boss spawn, `P` player spawn.
    ///
    /// Blank lines and surrounding whitespace are ignored. All rows must have
    /// the same width.
    pub fn from_ascii(map: &str, tile_size: f32) -> Result<Self, GameError> {
        let lines: Vec<&str> = map
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let first = lines.first().ok_or(GameError::EmptyGrid)?;
        let cols = first.chars().count();

        let mut walls = Vec::with_capacity(cols * lines.len());
        let mut boss_spawn = None;
        let mut player_spawn = None;

        for (row, line) in lines.iter().enumerate() {
            let got = line.chars().count();
            if got != cols {
                return Err(GameError::RaggedGrid {
                    row,
                    expected: cols,
                    got,
                });
            }
            for (col, ch) in line.chars().enumerate() {
                match ch {
                    '#' => walls.push(true),
                    '.' => walls.push(false),
                    'B' => {
                        boss_spawn = Some((col, row));
                        walls.push(false);
                    }
                    'P' => {
                        player_spawn = Some((col, row));
                        walls.push(false);
                    }
                    _ => return Err(GameError::InvalidTile { row, col, ch }),
                }
            }
        }

        Ok(Self {
            cols,
            rows: lines.len(),
            tile_size,
            walls,
            boss_spawn,
            player_spawn,
        })
    }

    /// World-space centre of the `B` marker, if the map had one.
    pub fn boss_spawn(&self) -> Option<(f32, f32)> {
        self.boss_spawn.map(|(c, r)| self.tile_center(c, r))
    }

    /// World-space centre of the `P` marker, if the map had one.
    pub fn player_spawn(&self) -> Option<(f32, f32)> {
        self.player_spawn.map(|(c, r)| self.tile_center(c, r))
    }

    /// Centre of the whole arena.
    pub fn center(&self) -> (f32, f32) {
        let (w, h) = self.world_size();
        (w / 2.0, h / 2.0)
    }

    fn tile_center(&self, col: usize, row: usize) -> (f32, f32) {
        (
            (col as f32 + 0.5) * self.tile_size,
            (row as f32 + 0.5) * self.tile_size,
        )
    }
}

impl Grid for TileGrid {
    fn cols(&self) -> usize {
        self.cols
    }

    fn rows(&self) -> usize {
        self.rows
    }

    fn tile_size(&self) -> f32 {
        self.tile_size
    }

    fn is_wall(&self, col: i32, row: i32) -> bool {
        if col < 0 || row < 0 || col as usize >= self.cols || row as usize >= self.rows {
            return true;
        }
        self.walls[row as usize * self.cols + col as usize]
    }
}

/// Push a circle out of any wall tiles it overlaps, then clamp it inside the arena.
pub fn resolve_walls(grid: &dyn Grid, x: &mut f32, y: &mut f32, radius: f32) {
    let ts = grid.tile_size();
    for _ in 0..MAX_RESOLVE_PASSES {
        let min_col = ((*x - radius) / ts).floor() as i32;
        let max_col = ((*x + radius) / ts).floor() as i32;
        let min_row = ((*y - radius) / ts).floor() as i32;
        let max_row = ((*y + radius) / ts).floor() as i32;

        let mut pushed = false;
        'scan: for row in min_row..=max_row {
            for col in min_col..=max_col {
                if !grid.is_wall(col, row) {
                    continue;
                }
                if let Some((px, py)) = push_out_of_tile(*x, *y, radius, col, row, ts) {
                    *x += px;
                    *y += py;
                    pushed = true;
                    break 'scan;
                }
            }
        }
        if !pushed {
            break;
        }
    }

    let (w, h) = grid.world_size();
    clamp_to_bounds(x, y, radius, w, h);
}

/// Keep a circle fully inside `[0, width] x [0, height]`.
pub fn clamp_to_bounds(x: &mut f32, y: &mut f32, radius: f32, width: f32, height: f32) {
    if width > 2.0 * radius {
        *x = x.clamp(radius, width - radius);
    }
    if height > 2.0 * radius {
        *y = y.clamp(radius, height - radius);
    }
}

/// Minimal displacement that separates a circle from one wall tile, if they overlap.
fn push_out_of_tile(x: f32, y: f32, radius: f32, col: i32, row: i32, ts: f32) -> Option<(f32, f32)> {
    let left = col as f32 * ts;
    let top = row as f32 * ts;
    let right = left + ts;
    let bottom = top + ts;

    let nearest_x = x.clamp(left, right);
    let nearest_y = y.clamp(top, bottom);
    let dx = x - nearest_x;
    let dy = y - nearest_y;
    let dist_sq = dx * dx + dy * dy;

    if dist_sq >= radius * radius {
        return None;
    }

    if dist_sq > f32::EPSILON {
        let dist = dist_sq.sqrt();
        let overlap = radius - dist;
        return Some((dx / dist * overlap, dy / dist * overlap));
    }

    // Centre is inside the tile: leave through the closest edge.
    let exits = [
        (x - left + radius, (-1.0, 0.0)),
        (right - x + radius, (1.0, 0.0)),
        (y - top + radius, (0.0, -1.0)),
        (bottom - y + radius, (0.0, 1.0)),
    ];
    let (depth, (nx, ny)) = exits
        .iter()
        .copied()
        .min_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))?;
    Some((nx * depth, ny * depth))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP: &str = "
        #######
        #B....#
        #..#..#
        #....P#
        #######
    ";

    #[test]
    fn parse_ascii_map() {
        let grid = TileGrid::from_ascii(MAP, 32.0).unwrap();
        assert_eq!(grid.cols(), 7);
        assert_eq!(grid.rows(), 5);
        assert!(grid.is_wall(0, 0));
        assert!(grid.is_wall(3, 2));
        assert!(!grid.is_wall(1, 1));
        assert_eq!(grid.boss_spawn(), Some((48.0, 48.0)));
        assert_eq!(grid.player_spawn(), Some((176.0, 112.0)));
    }

    #[test]
    fn out_of_range_is_wall() {
        let grid = TileGrid::open_room(4, 4, 32.0);
        assert!(grid.is_wall(-1, 2));
        assert!(grid.is_wall(2, 4));
    }

    #[test]
    fn ragged_map_rejected() {
        let err = TileGrid::from_ascii("###\n##\n", 32.0).unwrap_err();
        assert!(matches!(
            err,
            GameError::RaggedGrid {
                row: 1,
                expected: 3,
                got: 2
            }
        ));
    }

    #[test]
    fn invalid_tile_rejected() {
        let err = TileGrid::from_ascii("#x#", 32.0).unwrap_err();
        assert!(matches!(err, GameError::InvalidTile { col: 1, .. }));
    }

    #[test]
    fn empty_map_rejected() {
        assert!(matches!(
            TileGrid::from_ascii("  \n", 32.0),
            Err(GameError::EmptyGrid)
        ));
    }

    #[test]
    fn floor_tiles_exclude_walls() {
        let grid = TileGrid::from_ascii(MAP, 32.0).unwrap();
        let floors = grid.floor_tile_centers();
        // 5x3 interior minus the pillar
        assert_eq!(floors.len(), 14);
        assert!(floors.iter().all(|&(x, y)| !grid.is_wall_at(x, y)));
    }

    #[test]
    fn circle_pushed_out_of_border() {
        let grid = TileGrid::open_room(10, 10, 32.0);
        let (mut x, mut y) = (36.0, 160.0); // overlapping the left wall column
        resolve_walls(&grid, &mut x, &mut y, 20.0);
        assert!(x >= 32.0 + 20.0 - 0.01, "x={x}");
        assert!((y - 160.0).abs() < 0.01);
    }

    #[test]
    fn circle_inside_wall_is_ejected() {
        let grid = TileGrid::from_ascii(MAP, 32.0).unwrap();
        // centre of the pillar at (3, 2)
        let (mut x, mut y) = (112.0, 80.0);
        resolve_walls(&grid, &mut x, &mut y, 8.0);
        assert!(!grid.is_wall_at(x, y));
    }

    #[test]
    fn free_circle_not_moved() {
        let grid = TileGrid::open_room(10, 10, 32.0);
        let (mut x, mut y) = (160.0, 160.0);
        resolve_walls(&grid, &mut x, &mut y, 20.0);
        assert_eq!((x, y), (160.0, 160.0));
    }
}
