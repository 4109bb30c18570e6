//! The level grid and its collision queries.

use caper_core::{ArchetypeId, MonsterKind, PhysicsConfig, Tile};

/// Where the generator decided a monster starts.
///
/// Spawn records are resolved into live monsters by the simulation; the
/// grid itself never contains monster tiles once generation finishes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonsterSpawn {
    /// Spawn column.
    pub x: i32,
    /// Spawn row.
    pub y: i32,
    /// Movement class.
    pub kind: MonsterKind,
    /// Species picked for this spawn.
    pub archetype: ArchetypeId,
}

/// A level: tile grid, spawn point, and level-scoped mutable state.
///
/// Coordinates are bottom-up: `y == 0` is the floor row. All tile access
/// is by `i32` so collision code can probe one cell outside a position
/// without casts; the borders are solid, so in-bounds play never reads
/// outside the grid.
#[derive(Clone, Debug)]
pub struct Maze {
    /// Grid width in tiles.
    pub w: i32,
    /// Grid height in tiles.
    pub h: i32,
    grid: Vec<Tile>,
    /// Agent spawn cell.
    pub spawn: (i32, i32),
    /// Coins remaining; reaching zero finishes the level.
    pub coins: i32,
    /// Set when the episode ends (death, timeout, or last coin).
    pub is_terminated: bool,
    /// Set on creation, cleared once the batch engine has reported the
    /// level change to the caller.
    pub is_new_level: bool,
    /// Physics this level was generated under.
    pub physics: PhysicsConfig,
    /// Monster spawn records produced by generation.
    pub spawns: Vec<MonsterSpawn>,
}

impl Maze {
    /// A grid of the given size, filled with [`Tile::Empty`].
    pub fn new(w: i32, h: i32, physics: PhysicsConfig) -> Self {
        assert!(w > 2 && h > 2, "level must be at least 3x3");
        Self {
            w,
            h,
            grid: vec![Tile::Empty; (w * h) as usize],
            spawn: (1, 1),
            coins: 0,
            is_terminated: false,
            is_new_level: true,
            physics,
            spawns: Vec::new(),
        }
    }

    /// Tile at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics on out-of-bounds coordinates; the generator and physics
    /// both stay inside the solid border.
    pub fn get(&self, x: i32, y: i32) -> Tile {
        self.grid[self.index(x, y)]
    }

    /// Overwrite the tile at `(x, y)`.
    pub fn set(&mut self, x: i32, y: i32, tile: Tile) {
        let i = self.index(x, y);
        self.grid[i] = tile;
    }

    /// Fill the `dx` by `dy` rectangle whose bottom-left corner is
    /// `(x, y)`.
    pub fn fill(&mut self, x: i32, y: i32, dx: i32, dy: i32, tile: Tile) {
        for j in 0..dx {
            for k in 0..dy {
                self.set(x + j, y + k, tile);
            }
        }
    }

    /// Can a one-tile-wide body occupy the cell row at continuous
    /// position `(x, y)`? Probes the cells under `x + 0.1` and `x + 0.9`
    /// so a body flush against a wall still fits. Crates block only when
    /// `crates_count` is set.
    pub fn has_vertical_space(&self, x: f32, y: f32, crates_count: bool) -> bool {
        let iy = y as i32;
        let left = self.get((x + 0.1) as i32, iy);
        let right = self.get((x + 0.9) as i32, iy);
        !(left.is_wall(false)
            || right.is_wall(false)
            || (crates_count && left.is_crate())
            || (crates_count && right.is_crate()))
    }

    fn index(&self, x: i32, y: i32) -> usize {
        assert!(
            x >= 0 && x < self.w && y >= 0 && y < self.h,
            "tile ({x}, {y}) outside {}x{} level",
            self.w,
            self.h
        );
        (y * self.w + x) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_maze() -> Maze {
        Maze::new(8, 6, PhysicsConfig::default())
    }

    #[test]
    fn new_maze_is_all_empty() {
        let m = empty_maze();
        for y in 0..m.h {
            for x in 0..m.w {
                assert_eq!(m.get(x, y), Tile::Empty);
            }
        }
    }

    #[test]
    fn fill_covers_exact_rectangle() {
        let mut m = empty_maze();
        m.fill(1, 1, 3, 2, Tile::WallMid);
        assert_eq!(m.get(1, 1), Tile::WallMid);
        assert_eq!(m.get(3, 2), Tile::WallMid);
        assert_eq!(m.get(4, 1), Tile::Empty);
        assert_eq!(m.get(1, 3), Tile::Empty);
    }

    #[test]
    fn vertical_space_probes_both_edges() {
        let mut m = empty_maze();
        m.set(3, 2, Tile::WallMid);
        // Body at x=2.5 overlaps columns 2 and 3.
        assert!(!m.has_vertical_space(2.5, 2.0, false));
        assert!(m.has_vertical_space(1.0, 2.0, false));
    }

    #[test]
    fn crates_block_only_on_request() {
        let mut m = empty_maze();
        m.set(2, 2, Tile::Crate);
        assert!(m.has_vertical_space(2.0, 2.0, false));
        assert!(!m.has_vertical_space(2.0, 2.0, true));
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn out_of_bounds_get_is_fatal() {
        empty_maze().get(8, 0);
    }
}
