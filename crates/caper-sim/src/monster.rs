//! Monster AI: patrol, edge-turning, and jumping species.

use caper_core::{ArchetypeId, ArchetypeRegistry, MonsterKind, SimRng};
use caper_level::{Maze, MonsterSpawn};

/// Length of the position trail kept per monster.
pub const MONSTER_TRAIL: usize = 14;

/// Ticks a stomped monster's death pose is held.
pub const MONSTER_DEATH_ANIM_LENGTH: i32 = 2;

fn clip_abs(x: f32, limit: f32) -> f32 {
    if x > limit {
        limit
    } else if x < -limit {
        -limit
    } else {
        x
    }
}

fn sign(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else if x == 0.0 {
        0.0
    } else {
        -1.0
    }
}

/// One live monster.
///
/// The trail records the last [`MONSTER_TRAIL`] positions, oldest first;
/// collaborators can replay recent movement from it without the monster
/// keeping any other history.
#[derive(Clone, Debug)]
pub struct Monster {
    /// Horizontal position, in tiles.
    pub x: f32,
    /// Vertical position, in tiles.
    pub y: f32,
    /// Horizontal velocity.
    pub vx: f32,
    /// Vertical velocity.
    pub vy: f32,
    /// Recent positions, oldest first.
    pub trail: [(f32, f32); MONSTER_TRAIL],
    /// Movement class.
    pub kind: MonsterKind,
    /// Species.
    pub archetype: ArchetypeId,
    /// Stomped; dead monsters neither move nor collide.
    pub is_dead: bool,
    /// Death-pose countdown, set when stomped.
    pub dying_frames: i32,
    pause: i32,
}

impl Monster {
    /// Build a live monster from a generation spawn record. The initial
    /// nudge in `vx` picks the starting patrol direction.
    pub fn from_spawn(spawn: &MonsterSpawn) -> Self {
        let pos = (spawn.x as f32, spawn.y as f32);
        Self {
            x: pos.0,
            y: pos.1,
            vx: 0.01,
            vy: 0.0,
            trail: [pos; MONSTER_TRAIL],
            kind: spawn.kind,
            archetype: spawn.archetype,
            is_dead: false,
            dying_frames: 0,
            pause: 0,
        }
    }

    /// Advance one tick. Ground monsters are stationary hazards; walkers
    /// turn at walls and platform edges; fliers turn at walls only.
    /// Jumping species hop with a random pause between landings, drawn
    /// from `rng`.
    pub fn step(&mut self, maze: &Maze, archetypes: &ArchetypeRegistry, rng: &mut SimRng) {
        if self.kind == MonsterKind::Ground {
            return;
        }
        let mut control = sign(self.vx);
        let ix = self.x as i32;
        let iy = self.y as i32;
        if maze.get(ix, iy).is_wall(false) {
            control = 1.0;
        }
        if maze.get(ix + 1, iy).is_wall(false) {
            control = -1.0;
        }
        if self.kind == MonsterKind::Walking {
            if !maze.get(ix, iy - 1).is_wall(false) {
                control = 1.0;
            }
            if !maze.get(ix + 1, iy - 1).is_wall(false) {
                control = -1.0;
            }
        }

        let species = archetypes.get(self.archetype);
        let mix = maze.physics.monster_mix_rate;
        let max_speed = species.speed_multiplier * maze.physics.monster_speed;
        self.vx = clip_abs(mix * control + (1.0 - mix) * self.vx, max_speed);

        if species.jumps {
            if self.vy == 0.0 && self.pause == 0 {
                self.vy = species.jump_height;
            } else if self.pause == 0 {
                self.vy -= 0.8 * maze.physics.gravity;
            }

            let ny = self.y + self.vy;
            if self.vy < 0.0 && !maze.has_vertical_space(self.x, ny, false) {
                self.y = (ny as i32 + 1) as f32;
                self.vy = 0.0;
                self.pause = rng.randn(species.max_pause);
            }
        }

        if self.pause > 0 {
            self.pause -= 1;
        } else {
            self.x += self.vx;
            self.y += self.vy;
        }
        for t in 1..MONSTER_TRAIL {
            self.trail[t - 1] = self.trail[t];
        }
        self.trail[MONSTER_TRAIL - 1] = (self.x, self.y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caper_core::{PhysicsConfig, Tile};

    fn registry() -> ArchetypeRegistry {
        ArchetypeRegistry::standard()
    }

    fn id_of(reg: &ArchetypeRegistry, name: &str) -> ArchetypeId {
        (0..reg.len() as u32)
            .map(ArchetypeId)
            .find(|&id| reg.get(id).name == name)
            .unwrap()
    }

    /// A sealed box with a platform along the bottom.
    fn platform_maze() -> Maze {
        let mut m = Maze::new(12, 6, PhysicsConfig::default());
        m.fill(0, 0, 12, 1, Tile::WallTop);
        m.fill(0, 0, 1, 6, Tile::WallMid);
        m.fill(11, 0, 1, 6, Tile::WallMid);
        m.fill(0, 5, 12, 1, Tile::WallMid);
        m
    }

    fn walker_at(reg: &ArchetypeRegistry, x: f32, y: f32) -> Monster {
        let spawn = MonsterSpawn {
            x: x as i32,
            y: y as i32,
            kind: MonsterKind::Walking,
            archetype: id_of(reg, "slime_blue"),
        };
        let mut m = Monster::from_spawn(&spawn);
        m.x = x;
        m.y = y;
        m
    }

    #[test]
    fn ground_monsters_never_move() {
        let reg = registry();
        let maze = platform_maze();
        let spawn = MonsterSpawn {
            x: 5,
            y: 1,
            kind: MonsterKind::Ground,
            archetype: id_of(&reg, "saw_half"),
        };
        let mut m = Monster::from_spawn(&spawn);
        let mut rng = SimRng::seed_from(0);
        for _ in 0..50 {
            m.step(&maze, &reg, &mut rng);
        }
        assert_eq!((m.x, m.y), (5.0, 1.0));
    }

    #[test]
    fn walker_patrols_and_turns_at_walls() {
        let reg = registry();
        let maze = platform_maze();
        let mut m = walker_at(&reg, 5.0, 1.0);
        let mut rng = SimRng::seed_from(0);
        let mut min_x = m.x;
        let mut max_x = m.x;
        for _ in 0..2000 {
            m.step(&maze, &reg, &mut rng);
            min_x = min_x.min(m.x);
            max_x = max_x.max(m.x);
            assert!(m.x > 0.0 && m.x < 11.0, "walker left the box");
            assert_eq!(m.y, 1.0, "walker should stay on the platform");
        }
        assert!(max_x - min_x > 2.0, "walker should actually patrol");
    }

    #[test]
    fn walker_turns_at_platform_edge() {
        let reg = registry();
        let mut maze = Maze::new(12, 6, PhysicsConfig::default());
        // A free-standing ledge from x=4..=7 with nothing beneath.
        maze.fill(4, 2, 4, 1, Tile::WallTop);
        let mut m = walker_at(&reg, 5.0, 3.0);
        let mut rng = SimRng::seed_from(0);
        // Momentum carries the walker a fraction of a tile past the edge
        // before the turn takes effect.
        for _ in 0..2000 {
            m.step(&maze, &reg, &mut rng);
            assert!(m.x > 3.0 && m.x < 8.0, "walker stepped off the ledge");
        }
    }

    #[test]
    fn speed_respects_archetype_multiplier() {
        let reg = registry();
        let maze = platform_maze();
        let mut rng = SimRng::seed_from(0);

        let mut snail = walker_at(&reg, 5.0, 1.0);
        snail.archetype = id_of(&reg, "snail");
        let mut mouse = walker_at(&reg, 5.0, 1.0);
        mouse.archetype = id_of(&reg, "mouse");

        for _ in 0..100 {
            snail.step(&maze, &reg, &mut rng);
            mouse.step(&maze, &reg, &mut rng);
        }
        let base = maze.physics.monster_speed;
        assert!(snail.vx.abs() <= 0.4 * base + 1e-6);
        assert!(mouse.vx.abs() > 0.4 * base);
    }

    #[test]
    fn jumper_hops_and_pauses() {
        let reg = registry();
        let maze = platform_maze();
        let mut m = walker_at(&reg, 5.0, 1.0);
        m.archetype = id_of(&reg, "frog");
        let mut rng = SimRng::seed_from(7);
        let mut airborne = 0;
        for _ in 0..500 {
            m.step(&maze, &reg, &mut rng);
            if m.y > 1.0 {
                airborne += 1;
            }
            assert!(m.y >= 1.0, "jumper fell through the platform");
        }
        assert!(airborne > 0, "frog never left the ground");
    }

    #[test]
    fn trail_follows_position() {
        let reg = registry();
        let maze = platform_maze();
        let mut m = walker_at(&reg, 5.0, 1.0);
        let mut rng = SimRng::seed_from(0);
        for _ in 0..3 {
            m.step(&maze, &reg, &mut rng);
        }
        assert_eq!(m.trail[MONSTER_TRAIL - 1], (m.x, m.y));
        // The untouched head of the trail still holds the spawn point.
        assert_eq!(m.trail[0], (5.0, 1.0));
    }
}
