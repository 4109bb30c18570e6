//! Immutable physics and reward tuning values.
//!
//! The original environment kept these in process-wide mutable globals;
//! here they are plain value types passed into the engine and copied into
//! each level at creation, so two engines in one process can disagree.

/// Physics constants shared by the generator, the agent, and monsters.
///
/// The defaults are the reference tuning; the generator's jump-arc
/// simulation uses the same values, so changing them reshapes levels as
/// well as movement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicsConfig {
    /// Downward acceleration per tick.
    pub gravity: f32,
    /// Instantaneous upward velocity of a full jump; also the vertical
    /// velocity clamp.
    pub max_jump: f32,
    /// Horizontal speed clamp.
    pub max_speed: f32,
    /// Grounded horizontal velocity blend rate.
    pub mix_rate: f32,
    /// Fraction of `mix_rate` available while airborne.
    pub air_control: f32,
    /// Horizontal blend rate while on a ladder.
    pub ladder_mix_rate_x: f32,
    /// Vertical blend rate while on a ladder.
    pub ladder_mix_rate_y: f32,
    /// Speed cap (both axes) while on a ladder.
    pub ladder_speed_cap: f32,
    /// Base monster speed; archetype speeds are multiples of this.
    pub monster_speed: f32,
    /// Monster horizontal velocity blend rate.
    pub monster_mix_rate: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 0.08,
            max_jump: 0.9,
            max_speed: 0.2,
            mix_rate: 0.1,
            air_control: 0.15,
            ladder_mix_rate_x: 0.1,
            ladder_mix_rate_y: 0.4,
            ladder_speed_cap: 0.4,
            monster_speed: 0.05,
            monster_mix_rate: 0.05,
        }
    }
}

impl PhysicsConfig {
    /// Maximum height of a full jump, in tiles.
    pub fn max_jump_height(&self) -> f32 {
        self.max_jump * self.max_jump / (2.0 * self.gravity)
    }

    /// Maximum horizontal span of a full jump at top speed, in tiles.
    pub fn max_jump_span(&self) -> f32 {
        self.max_speed * 2.0 * self.max_jump / self.gravity
    }
}

/// Reward-shaping magnitudes.
///
/// Penalties are stored as non-negative magnitudes and subtracted where
/// they apply. The coin (+1), final-coin bonus (+10), and gem (+1) rewards
/// are fixed properties of the environment, not tunables.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RewardConfig {
    /// Subtracted when the agent's head hits a ceiling.
    pub bump_head_penalty: f32,
    /// Subtracted when a monster kills the agent.
    pub die_penalty: f32,
    /// Awarded for stomping a stompable monster.
    pub kill_monster_reward: f32,
    /// Subtracted when a charged jump is released.
    pub jump_penalty: f32,
    /// Subtracted per tick spent squatting with a charged spring.
    pub squat_penalty: f32,
    /// Subtracted once when a squat is released without jumping.
    pub jitter_squat_penalty: f32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            bump_head_penalty: 0.0,
            die_penalty: 0.0,
            kill_monster_reward: 5.0,
            jump_penalty: 0.0,
            squat_penalty: 0.0,
            jitter_squat_penalty: 0.0,
        }
    }
}
