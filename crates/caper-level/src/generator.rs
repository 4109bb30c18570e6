//! Jump-arc driven procedural generation.
//!
//! Platforms are placed by replaying the agent's own ballistics: from a
//! stack of anchor cells (initially the whole floor), each attempt picks
//! an anchor with a bias toward recent additions, launches a simulated
//! jump, and builds a platform where the arc would land. Every carved arc
//! is therefore traversable by construction. Failed attempts abort
//! mid-way and leave their partial edits behind; the post-pass normalizes
//! those leftovers, which is where most flying monsters come from.

use caper_core::{ArchetypeRegistry, MonsterKind, PhysicsConfig, SimRng, Tile};

use crate::maze::{Maze, MonsterSpawn};

/// Generated level width in tiles.
pub const LEVEL_WIDTH: i32 = 64;
/// Generated level height in tiles.
pub const LEVEL_HEIGHT: i32 = 13;

const WANT_PLATFORMS: i32 = 11;
const FLYING_SPAWN_ODDS: i32 = 20;

/// Deterministically generate a level from a seed.
///
/// Identical `(seed, physics, registry)` inputs produce identical levels,
/// including monster placement and species.
pub fn generate(seed: u64, physics: PhysicsConfig, registry: &ArchetypeRegistry) -> Maze {
    let mut gen = Generator {
        maze: Maze::new(LEVEL_WIDTH, LEVEL_HEIGHT, physics),
        rng: SimRng::seed_from(seed),
        anchors: Vec::new(),
        registry,
    };
    gen.initial_floor_and_walls();
    gen.build_platforms();
    gen.place_coins();
    gen.remove_traces_add_monsters();
    gen.maze
}

struct Generator<'a> {
    maze: Maze,
    rng: SimRng,
    /// Cells a jump may launch from and a coin may sit on. LIFO order
    /// matters: coin placement pops from the top, so later platforms get
    /// first claim.
    anchors: Vec<(i32, i32)>,
    registry: &'a ArchetypeRegistry,
}

impl Generator<'_> {
    fn initial_floor_and_walls(&mut self) {
        let (w, h) = (self.maze.w, self.maze.h);
        self.maze.fill(0, 0, w, h, Tile::Empty);
        self.maze.fill(0, 0, w, 1, Tile::WallTop);
        self.maze.fill(0, 0, 1, h, Tile::WallMid);
        self.maze.fill(w - 1, 0, 1, h, Tile::WallMid);
        self.maze.fill(0, h - 1, w, 1, Tile::WallMid);
    }

    fn build_platforms(&mut self) {
        let w = self.maze.w;
        self.maze.spawn = (1 + self.rng.randn(w - 2), 1);
        for x in 0..w {
            self.anchors.push((x, 1));
        }
        let mut want = WANT_PLATFORMS;
        for _ in 0..WANT_PLATFORMS * 10 {
            if self.try_platform() {
                want -= 1;
            }
            if want == 0 {
                break;
            }
        }
    }

    /// One platform attempt. A `false` return may still have mutated the
    /// grid; leftover traces are cleaned up by the post-pass.
    fn try_platform(&mut self) -> bool {
        let gravity = self.maze.physics.gravity;
        let max_jump = self.maze.physics.max_jump;
        let max_speed = self.maze.physics.max_speed;
        let (w, h) = (self.maze.w, self.maze.h);

        if self.anchors.is_empty() {
            return false;
        }
        // Square-root of a uniform draw over len² biases toward the top
        // of the stack, i.e. toward recently built platforms.
        let len = self.anchors.len() as i32;
        let n = f64::from(self.rng.randn(len * len)).sqrt() as usize;
        let anchor = self.anchors[n];
        let vx = (self.rng.rand01() * 2.0 - 1.0) * 0.5 * max_speed;
        let mut vy = (0.8 + 0.2 * self.rng.rand01()) * max_jump;

        let top = 1 + (vy / gravity) as i32;
        let mut ix;
        let mut iy;
        if self.rng.randn(2) == 1 {
            // Ballistic arc from just above the anchor, carving traces.
            let steps = top + self.rng.randn(top / 2);
            let mut x = anchor.0 as f32;
            let mut y = (anchor.1 + 1) as f32;
            ix = -1;
            iy = -1;
            for _ in 0..steps {
                vy -= gravity;
                x += vx;
                y += vy;
                if ix != x as i32 || iy != y as i32 {
                    ix = x as i32;
                    iy = y as i32;
                    if ix < 1 || ix >= w - 1 || iy < 1 || iy >= h - 2 {
                        return false;
                    }
                    let c = self.maze.get(ix, iy);
                    if c != Tile::Empty && c != Tile::CarvedTrace {
                        return false;
                    }
                    self.maze.set(ix, iy, Tile::CarvedTrace);
                }
            }
        } else {
            // Ladder straight up from the anchor instead of a jump.
            ix = anchor.0;
            iy = anchor.1;
            if iy >= h - 3 {
                return false;
            }
            // Ladders never start on crates.
            if self.maze.get(ix, iy).is_crate() || self.maze.get(ix, iy - 1).is_crate() {
                return false;
            }
            self.anchors.remove(n);
            let mut rungs = Vec::new();
            let ladder_len = 5 + self.rng.randn(10);
            for _ in 0..ladder_len {
                rungs.push((ix, iy));
                iy += 1;
                if iy >= h - 3
                    || self.maze.get(ix, iy) != Tile::Empty
                    || self.maze.get(ix - 1, iy) == Tile::Ladder
                    || self.maze.get(ix + 1, iy) == Tile::Ladder
                {
                    return false;
                }
            }
            for (rx, ry) in rungs {
                self.maze.set(rx, ry, Tile::Ladder);
            }
            self.maze.set(ix, iy, Tile::Ladder);
        }

        // Build the platform at the landing cell, stepping in the jump's
        // horizontal direction.
        let c = self.maze.get(ix, iy);
        if iy >= h - 3 {
            return false;
        }
        if c == Tile::Empty || c == Tile::CarvedTrace {
            let edge = if vx > 0.0 {
                Tile::CliffLeft
            } else {
                Tile::CliffRight
            };
            self.maze.set(ix, iy, edge);
        }
        let mut crates: Vec<(i32, i32)> = Vec::new();
        let mut monster_candidates: Vec<(i32, i32)> = Vec::new();
        let len = 2 + self.rng.randn(10);
        let crates_shift = self.rng.randn(20);
        for platform in 0..len {
            ix += if vx > 0.0 { 1 } else { -1 };
            let c = self.maze.get(ix, iy);
            if c == Tile::CarvedTrace || c == Tile::Empty {
                let tile = if platform < len - 1 {
                    Tile::WallTop
                } else if vx > 0.0 {
                    Tile::CliffRight
                } else {
                    Tile::CliffLeft
                };
                self.maze.set(ix, iy, tile);
                self.anchors.push((ix, iy + 1));
                if (ix as f64 * 0.2 + iy as f64 + crates_shift as f64) as i32 % 4 == 0 {
                    crates.push((ix, iy + 1));
                } else if platform > 0 && platform < len - 1 {
                    monster_candidates.push((ix, iy + 1));
                }
            } else {
                if c == Tile::CliffLeft || c == Tile::CliffRight {
                    self.maze.set(ix, iy, Tile::WallTop);
                }
                break;
            }
        }

        if monster_candidates.len() > 1 {
            let pick = self.rng.randn(monster_candidates.len() as i32) as usize;
            let (mx, my) = monster_candidates[pick];
            let marker = if self.rng.randn(10) >= 8 {
                Tile::GroundSpawn
            } else {
                Tile::WalkingSpawn
            };
            self.maze.set(mx, my, marker);
        }

        // Grow crate stacks upward. Each surviving stack keeps growing
        // with probability `want/4`, nudged by its neighborhood.
        loop {
            if crates.is_empty() {
                break;
            }
            let mut c = 0;
            while c < crates.len() {
                let (cx, cy) = crates[c];
                let here = self.maze.get(cx, cy);
                let left = self.maze.get(cx - 1, cy);
                let right = self.maze.get(cx + 1, cy);
                let above = self.maze.get(cx, cy + 1);
                let want = 2 + left.is_crate() as i32 + right.is_crate() as i32
                    - (right == Tile::Ladder) as i32
                    - (left == Tile::Ladder) as i32
                    - above.is_wall(false) as i32;
                if self.rng.randn(4) < want && cy < h - 2 {
                    if here == Tile::CarvedTrace || here == Tile::Empty {
                        self.maze.set(cx, cy, Tile::Crate);
                    }
                    crates[c].1 += 1;
                    // Coins can sit on crates, and jumps can launch from
                    // them.
                    self.anchors.push(crates[c]);
                    c += 1;
                } else {
                    crates.remove(c);
                }
            }
        }

        true
    }

    fn place_coins(&mut self) {
        let mut coins = 0;
        while let Some((x, y)) = self.anchors.pop() {
            let clear = |c: Tile| c == Tile::Empty || c == Tile::WalkingSpawn;
            let good_place = clear(self.maze.get(x, y))
                && y > 2
                && clear(self.maze.get(x - 1, y))
                && clear(self.maze.get(x + 1, y))
                && clear(self.maze.get(x, y + 1))
                && self.maze.get(x - 1, y - 1).is_wall(true)
                && self.maze.get(x, y - 1).is_wall(true)
                && self.maze.get(x + 1, y - 1).is_wall(true);
            if good_place {
                let pickup = if self.rng.randn(10) >= 9 {
                    Tile::Gem
                } else {
                    Tile::Coin
                };
                self.maze.set(x, y, pickup);
                coins += 1;
            }
        }
        self.maze.coins = coins;
    }

    fn remove_traces_add_monsters(&mut self) {
        resolve_markers(&mut self.maze, &mut self.rng, self.registry);
    }
}

/// Normalize generation leftovers and resolve spawn markers.
///
/// Carved traces become empty space or, occasionally, a flying monster.
/// Cliff tiles that ended up buried become plain surface, and surface
/// tiles with surface below become filler. Spawn markers turn into
/// [`MonsterSpawn`] records, dropped when their footing is wrong for
/// their movement class. Also used on hand-written levels, which may
/// carry the same markers.
pub(crate) fn resolve_markers(maze: &mut Maze, rng: &mut SimRng, registry: &ArchetypeRegistry) {
    maze.spawns.clear();
    let (w, h) = (maze.w, maze.h);
    for y in 1..h {
        for x in 1..w - 1 {
            let mut c = maze.get(x, y);
            let below = maze.get(x, y - 1);
            let left = maze.get(x - 1, y);
            let right = maze.get(x + 1, y);

            if c == Tile::CarvedTrace {
                if rng.randn(FLYING_SPAWN_ODDS) == 0 && !below.is_wall(false) && y > 2 {
                    c = Tile::FlyingSpawn;
                } else {
                    c = Tile::Empty;
                }
                maze.set(x, y, c);
            }
            if (c == Tile::CliffLeft || c == Tile::CliffRight) && below.is_wall(false) {
                c = Tile::WallTop;
                maze.set(x, y, c);
            }
            if c.is_wall(false) && below.is_wall(false) {
                maze.set(x, y - 1, Tile::WallMid);
            }
            let kind = match c {
                Tile::FlyingSpawn => Some(MonsterKind::Flying),
                Tile::WalkingSpawn => Some(MonsterKind::Walking),
                Tile::GroundSpawn => Some(MonsterKind::Ground),
                _ => None,
            };
            if let Some(kind) = kind {
                let archetype = registry.sample(kind, rng);
                maze.set(x, y, Tile::Empty);
                // Walking monsters need room to patrol; walking and
                // ground monsters need a platform underfoot.
                let keep = (kind != MonsterKind::Walking
                    || (!left.is_wall(false) && !right.is_wall(false)))
                    && !(kind != MonsterKind::Flying && !below.is_wall(false));
                if keep {
                    maze.spawns.push(MonsterSpawn { x, y, kind, archetype });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn gen(seed: u64) -> Maze {
        generate(seed, PhysicsConfig::default(), &ArchetypeRegistry::standard())
    }

    #[test]
    fn expected_dimensions_and_border() {
        let m = gen(1);
        assert_eq!((m.w, m.h), (LEVEL_WIDTH, LEVEL_HEIGHT));
        for x in 0..m.w {
            assert!(m.get(x, 0).is_wall(false));
            assert!(m.get(x, m.h - 1).is_wall(false));
        }
        for y in 0..m.h {
            assert!(m.get(0, y).is_wall(false));
            assert!(m.get(m.w - 1, y).is_wall(false));
        }
    }

    #[test]
    fn spawn_is_on_the_floor() {
        for seed in 0..20 {
            let m = gen(seed);
            assert_eq!(m.spawn.1, 1);
            assert!(m.spawn.0 >= 1 && m.spawn.0 < m.w - 1);
        }
    }

    #[test]
    fn no_transient_markers_survive() {
        for seed in 0..20 {
            let m = gen(seed);
            for y in 0..m.h {
                for x in 0..m.w {
                    let c = m.get(x, y);
                    assert!(
                        !matches!(
                            c,
                            Tile::CarvedTrace
                                | Tile::FlyingSpawn
                                | Tile::WalkingSpawn
                                | Tile::GroundSpawn
                        ),
                        "marker {c:?} left at ({x}, {y}) for seed {seed}"
                    );
                }
            }
        }
    }

    #[test]
    fn coin_count_matches_grid() {
        for seed in 0..20 {
            let m = gen(seed);
            let on_grid = (0..m.h)
                .flat_map(|y| (0..m.w).map(move |x| (x, y)))
                .filter(|&(x, y)| m.get(x, y).is_coin() || m.get(x, y).is_gem())
                .count();
            assert_eq!(on_grid as i32, m.coins, "seed {seed}");
        }
    }

    #[test]
    fn pickups_sit_in_clear_pockets_on_solid_ground() {
        for seed in 0..20 {
            let m = gen(seed);
            for y in 1..m.h - 1 {
                for x in 1..m.w - 1 {
                    let c = m.get(x, y);
                    if c.is_coin() || c.is_gem() {
                        assert!(y > 2, "pickup too low, seed {seed}");
                        // Three solid-or-crate cells beneath.
                        for dx in -1..=1 {
                            assert!(
                                m.get(x + dx, y - 1).is_wall(true),
                                "floating pickup at ({x}, {y}), seed {seed}"
                            );
                        }
                        // Open cells on both sides and above; spawn
                        // markers there have been resolved away.
                        for (nx, ny) in [(x - 1, y), (x + 1, y), (x, y + 1)] {
                            assert_eq!(
                                m.get(nx, ny),
                                Tile::Empty,
                                "crowded pickup at ({x}, {y}), seed {seed}"
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn grounded_monsters_have_footing() {
        let registry = ArchetypeRegistry::standard();
        for seed in 0..40 {
            let m = generate(seed, PhysicsConfig::default(), &registry);
            for s in &m.spawns {
                if s.kind != MonsterKind::Flying {
                    assert!(m.get(s.x, s.y - 1).is_wall(false), "seed {seed}");
                }
                if s.kind == MonsterKind::Walking {
                    assert!(!m.get(s.x - 1, s.y).is_wall(false), "seed {seed}");
                    assert!(!m.get(s.x + 1, s.y).is_wall(false), "seed {seed}");
                }
                assert_eq!(m.get(s.x, s.y), Tile::Empty);
            }
        }
    }

    #[test]
    fn spawn_archetypes_match_kind() {
        let registry = ArchetypeRegistry::standard();
        for seed in 0..40 {
            let m = generate(seed, PhysicsConfig::default(), &registry);
            for s in &m.spawns {
                assert_eq!(registry.get(s.archetype).kind, s.kind);
            }
        }
    }

    proptest! {
        #[test]
        fn generation_is_deterministic(seed in any::<u64>()) {
            let a = gen(seed);
            let b = gen(seed);
            prop_assert_eq!(a.spawn, b.spawn);
            prop_assert_eq!(a.coins, b.coins);
            prop_assert_eq!(a.spawns.len(), b.spawns.len());
            for y in 0..a.h {
                for x in 0..a.w {
                    prop_assert_eq!(a.get(x, y), b.get(x, y));
                }
            }
        }

        #[test]
        fn coin_count_matches_grid_for_any_seed(seed in any::<u64>()) {
            let m = gen(seed);
            let on_grid = (0..m.h)
                .flat_map(|y| (0..m.w).map(move |x| (x, y)))
                .filter(|&(x, y)| m.get(x, y).is_coin() || m.get(x, y).is_gem())
                .count();
            prop_assert_eq!(on_grid as i32, m.coins);
        }
    }
}
