//! Agent physics: spring-charged jumps, ladder climbing, crate
//! drop-through, and pickup collection.

use caper_core::{Action, RewardConfig, Tile};
use caper_level::Maze;

/// Ticks the death pose is held when extras are collected.
pub const DEATH_ANIM_LENGTH: i32 = 30;
/// Ticks the level-finished pose is held when extras are collected.
pub const FINISHED_LEVEL_ANIM_LENGTH: i32 = 20;

fn clip_abs(x: f32, limit: f32) -> f32 {
    if x > limit {
        limit
    } else if x < -limit {
        -limit
    } else {
        x
    }
}

/// The player body.
///
/// One per [`SimInstance`](crate::SimInstance); reset in place on episode
/// termination rather than reallocated. `reward` accumulates until the
/// engine harvests it, which may span an episode boundary when the final
/// tick of one episode and the first of the next land in the same batch
/// step.
#[derive(Clone, Debug)]
pub struct Agent {
    /// Horizontal position, in tiles.
    pub x: f32,
    /// Vertical position, in tiles (bottom-up).
    pub y: f32,
    /// Horizontal velocity.
    pub vx: f32,
    /// Vertical velocity.
    pub vy: f32,
    /// Jump-charge accumulator. Positive while squatting with charge,
    /// negative briefly after pressing down.
    pub spring: f32,
    /// Facing, from the sign of the last nonzero horizontal velocity.
    pub is_facing_right: bool,
    /// Whether ladder physics are active this tick.
    pub ladder_mode: bool,
    /// Horizontal control input in `{-1, 0, +1}`.
    pub action_dx: i32,
    /// Vertical control input in `{-1, 0, +1}`.
    pub action_dy: i32,
    /// Ticks survived this episode.
    pub time_alive: i32,
    /// Reward accumulated since the engine last harvested it.
    pub reward: f32,
    /// Total reward this episode.
    pub reward_sum: f32,
    /// Whether the episode had already terminated when this tick began.
    pub game_over: bool,
    /// Killed by a monster or a lethal tile.
    pub is_killed: bool,
    /// Squatting with a charged spring.
    pub is_preparing_to_jump: bool,
    /// Gem shield active; cleared by collecting a coin.
    pub power_up_mode: bool,
    /// Standing on something, as of the last tick.
    pub support: bool,
    /// Death-pose countdown; only advanced when extras are collected.
    pub killed_animation_frames: i32,
    /// Finished-pose countdown; only advanced when extras are collected.
    pub finished_level_frames: i32,
    /// Head hit a ceiling this tick. Cleared once per tick by the
    /// instance.
    pub bumped_head: bool,
    /// Collected a coin this tick. Cleared once per tick by the instance.
    pub collected_coin: bool,
    /// Collected a gem this tick. Cleared once per tick by the instance.
    pub collected_gem: bool,
    /// Stomped a monster this tick. Cleared once per tick by the
    /// instance.
    pub killed_monster: bool,
}

impl Agent {
    /// An agent at the origin with everything zeroed; call
    /// [`Agent::reset`] before stepping.
    pub fn new() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            spring: 0.0,
            is_facing_right: true,
            ladder_mode: false,
            action_dx: 0,
            action_dy: 0,
            time_alive: 0,
            reward: 0.0,
            reward_sum: 0.0,
            game_over: false,
            is_killed: false,
            is_preparing_to_jump: false,
            power_up_mode: false,
            support: false,
            killed_animation_frames: 0,
            finished_level_frames: 0,
            bumped_head: false,
            collected_coin: false,
            collected_gem: false,
            killed_monster: false,
        }
    }

    /// Move to the level spawn and zero motion state. Accumulated
    /// `reward` is deliberately left alone; the engine harvests it across
    /// the episode boundary.
    pub fn reset(&mut self, maze: &Maze) {
        self.x = maze.spawn.0 as f32;
        self.y = maze.spawn.1 as f32;
        self.action_dx = 0;
        self.action_dy = 0;
        self.time_alive = 0;
        self.reward_sum = 0.0;
        self.vx = 0.0;
        self.vy = 0.0;
        self.spring = 0.0;
        self.is_facing_right = true;
        self.ladder_mode = false;
    }

    /// Latch the control inputs for the next tick.
    pub fn set_action(&mut self, action: Action) {
        self.action_dx = action.dx();
        self.action_dy = action.dy();
    }

    /// Advance one tick: physics, pickups, and the episode timeout.
    pub fn step(&mut self, maze: &mut Maze, rewards: &RewardConfig, timeout: i32) {
        self.time_alive += 1;
        self.tick_physics(maze, rewards);
        if self.time_alive > timeout {
            maze.is_terminated = true;
        }
    }

    fn tick_physics(&mut self, maze: &mut Maze, rewards: &RewardConfig) {
        self.support = false;
        if self.finished_level_frames > 0 {
            self.action_dx = 0;
            self.action_dy = 0;
        }

        let p = maze.physics;
        let near_x = (self.x + 0.5) as i32;
        let on_ladder = maze.get(near_x, (self.y + 0.2) as i32) == Tile::Ladder
            || maze.get(near_x, (self.y - 0.2) as i32) == Tile::Ladder;
        if on_ladder {
            if self.action_dy != 0 {
                self.ladder_mode = true;
            }
        } else {
            self.ladder_mode = false;
        }

        if self.ladder_mode {
            // Ladder physics pull toward the ladder's center column.
            self.vx = (1.0 - p.ladder_mix_rate_x) * self.vx
                + p.ladder_mix_rate_x
                    * p.max_speed
                    * (self.action_dx as f32 + 0.2 * (near_x as f32 - self.x));
            self.vx = clip_abs(self.vx, p.ladder_speed_cap);
            self.vy = (1.0 - p.ladder_mix_rate_y) * self.vy
                + p.ladder_mix_rate_y * p.max_speed * self.action_dy as f32;
            self.vy = clip_abs(self.vy, p.ladder_speed_cap);
        } else if self.spring > 0.0 && self.vy == 0.0 && self.action_dy == 0 {
            // Releasing a charged squat launches the jump.
            self.vy = p.max_jump;
            self.reward -= rewards.jump_penalty;
            self.reward_sum -= rewards.jump_penalty;
            self.spring = 0.0;
            self.support = true;
        } else {
            self.vy -= p.gravity;
        }

        self.vy = clip_abs(self.vy, p.max_jump);
        self.vx = clip_abs(self.vx, p.max_speed);

        let num_sub_steps = 2;
        let pct = 1.0 / num_sub_steps as f32;
        for _ in 0..num_sub_steps {
            self.sub_step(maze, rewards, self.vx * pct, self.vy * pct);
            if self.vx == 0.0 && self.vy == 0.0 {
                break;
            }
        }

        if self.support {
            if self.action_dy > 0 {
                // Four squat ticks charge a full jump.
                self.spring += p.max_jump / 4.0;
            }
            if self.action_dy < 0 {
                self.spring = -0.01;
            }
            if self.action_dy == 0 && self.spring < 0.0 {
                self.spring = 0.0;
            }
            self.spring = clip_abs(self.spring, p.max_jump);
            self.vx = (1.0 - p.mix_rate) * self.vx;
            if self.spring == 0.0 {
                self.vx += p.mix_rate * p.max_speed * self.action_dx as f32;
            }
            if self.vx.abs() < p.mix_rate * p.max_speed {
                self.vx = 0.0;
            }
        } else {
            self.spring = 0.0;
            let ac = p.air_control;
            self.vx = (1.0 - ac * p.mix_rate) * self.vx + ac * p.mix_rate * self.action_dx as f32;
        }

        if self.vx < 0.0 {
            self.is_facing_right = false;
        } else if self.vx > 0.0 {
            self.is_facing_right = true;
        }

        if self.spring != 0.0 && !(self.is_killed || self.ladder_mode || self.vy != 0.0) {
            self.reward -= rewards.squat_penalty;
            self.reward_sum -= rewards.squat_penalty;
            self.is_preparing_to_jump = true;
        } else {
            if self.is_preparing_to_jump && self.vy != p.max_jump {
                // Squat released without the jump actually happening.
                self.reward -= rewards.jitter_squat_penalty;
                self.reward_sum -= rewards.jitter_squat_penalty;
            }
            self.is_preparing_to_jump = false;
        }
    }

    /// One half-velocity movement step. Vertical motion resolves first
    /// with the two-probe footprint test, then horizontal motion with a
    /// single-cell probe, then the four cells under the new footprint are
    /// checked for pickups and hazards.
    fn sub_step(&mut self, maze: &mut Maze, rewards: &RewardConfig, vx: f32, vy: f32) {
        let ny = self.y + vy;
        let nx = self.x + vx;

        if vy < 0.0 && !maze.has_vertical_space(self.x, ny, false) {
            self.y = (ny as i32 + 1) as f32;
            self.support = true;
            self.vy = 0.0;
        } else if vy < 0.0 && !maze.has_vertical_space(self.x, ny, true) {
            if self.action_dy >= 0 && ny as i32 != self.y as i32 {
                self.y = (ny as i32 + 1) as f32;
                self.vy = 0.0;
                self.support = true;
            } else {
                // Holding down: drop through the crate.
                self.support = false;
                self.y = ny;
            }
        } else if vy > 0.0 && !maze.has_vertical_space(self.x, ny + 1.0, false) {
            self.y = (ny as i32) as f32;
            while !maze.has_vertical_space(self.x, self.y, false) {
                self.y -= 1.0;
            }
            self.bumped_head = true;
            self.vy = 0.0;
            self.reward -= rewards.bump_head_penalty;
            self.reward_sum -= rewards.bump_head_penalty;
        } else {
            self.y = ny;
        }

        let ix = self.x as i32;
        let iy = self.y as i32;
        let inx = nx as i32;

        if vx < 0.0 && maze.get(inx, iy).is_wall(false) {
            self.vx = 0.0;
            self.x = (inx + 1) as f32;
        } else if vx > 0.0 && maze.get(inx + 1, iy).is_wall(false) {
            self.vx = 0.0;
            self.x = inx as f32;
        } else {
            self.x = nx;
        }

        self.eat_cell(maze, ix, iy);
        self.eat_cell(maze, ix, iy + 1);
        self.eat_cell(maze, ix + 1, iy);
        self.eat_cell(maze, ix + 1, iy + 1);
    }

    fn eat_cell(&mut self, maze: &mut Maze, x: i32, y: i32) {
        let obj = maze.get(x, y);

        if obj.is_lethal() {
            maze.is_terminated = true;
            self.is_killed = true;
            self.killed_animation_frames = DEATH_ANIM_LENGTH;
        }

        if obj.is_coin() {
            maze.set(x, y, Tile::Empty);
            maze.coins -= 1;
            self.collected_coin = true;
            if self.power_up_mode {
                self.power_up_mode = false;
            }
            if maze.coins == 0 {
                self.reward += 10.0;
                self.reward_sum += 10.0;
                maze.is_terminated = true;
                self.finished_level_frames = FINISHED_LEVEL_ANIM_LENGTH;
            } else {
                self.reward += 1.0;
                self.reward_sum += 1.0;
            }
        }

        if obj.is_gem() {
            maze.set(x, y, Tile::Empty);
            self.reward += 1.0;
            self.reward_sum += 1.0;
            self.power_up_mode = true;
            self.collected_gem = true;
        }
    }
}

impl Default for Agent {
    fn default() -> Self {
        Self::new()
    }
}
