//! One environment slot: level, agent, monsters, and the episode
//! life-cycle.

use caper_core::{Action, ArchetypeRegistry, PhysicsConfig, RewardConfig, SimRng};
use caper_level::{generate, Maze};

use crate::agent::{Agent, DEATH_ANIM_LENGTH};
use crate::monster::{Monster, MONSTER_DEATH_ANIM_LENGTH};

/// Default episode length limit, in ticks.
pub const DEFAULT_LEVEL_TIMEOUT: i32 = 1000;

/// How an instance picks the seed for each new episode's level.
#[derive(Clone, Debug)]
pub enum LevelSampling {
    /// A fresh seed from the full 64-bit space every episode.
    Unbounded,
    /// Seeds drawn uniformly from `0..n`, giving a training set of `n`
    /// distinct levels.
    SeedRange(u64),
    /// Seeds drawn uniformly from a fixed pool.
    SeedPool(Vec<u64>),
}

impl LevelSampling {
    /// Pre-draw a pool of `n` seeds from `pool_seed`. Instances sharing
    /// the pool train on the same fixed level set without sharing RNG
    /// state.
    pub fn pool_from_seed(pool_seed: u64, n: usize) -> Self {
        let mut rng = SimRng::seed_from(pool_seed);
        Self::SeedPool((0..n).map(|_| rng.next_seed()).collect())
    }
}

/// Everything configurable about one instance.
#[derive(Clone, Debug)]
pub struct InstanceConfig {
    /// Physics tuning, shared with generation.
    pub physics: PhysicsConfig,
    /// Reward shaping.
    pub rewards: RewardConfig,
    /// Episode length limit, in ticks.
    pub timeout: i32,
    /// Level seed policy.
    pub sampling: LevelSampling,
    /// Play out death/finish animation frames instead of resetting
    /// immediately. Used when recording trajectories for humans rather
    /// than training.
    pub collect_extras: bool,
    /// Pass-through for observation renderers: overlay velocity
    /// information. No effect on physics.
    pub paint_velocity_info: bool,
    /// Pass-through for observation renderers: apply data augmentation.
    /// No effect on physics.
    pub use_data_augmentation: bool,
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            rewards: RewardConfig::default(),
            timeout: DEFAULT_LEVEL_TIMEOUT,
            sampling: LevelSampling::Unbounded,
            collect_extras: false,
            paint_velocity_info: false,
            use_data_augmentation: false,
        }
    }
}

/// What the engine reports for one instance after one batch step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepReport {
    /// Reward accumulated since the previous harvest.
    pub reward: f32,
    /// Whether the episode had terminated when the tick began.
    pub done: bool,
    /// Whether a new level was generated since the previous harvest.
    pub new_level: bool,
}

/// Noteworthy events from the most recent tick, latched for collaborators
/// that inspect the instance between steps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickEvents {
    /// The agent collected a coin.
    pub collected_coin: bool,
    /// The agent collected a gem.
    pub collected_gem: bool,
    /// The agent stomped a monster.
    pub killed_monster: bool,
    /// The agent's head hit a ceiling.
    pub bumped_head: bool,
}

/// One simulation slot: a level, its monsters, and the agent playing it.
///
/// Strictly single-threaded; the batch engine hands each instance to at
/// most one worker at a time. The tick cycle is: [`set_action`], then
/// [`tick`], then [`harvest`].
///
/// [`set_action`]: SimInstance::set_action
/// [`tick`]: SimInstance::tick
/// [`harvest`]: SimInstance::harvest
#[derive(Clone, Debug)]
pub struct SimInstance {
    /// Current level. Replaced wholesale on episode reset.
    pub maze: Maze,
    /// The player body.
    pub agent: Agent,
    /// Live and dead monsters of the current level.
    pub monsters: Vec<Monster>,
    config: InstanceConfig,
    registry: ArchetypeRegistry,
    /// Instance-local RNG: level-seed draws and monster jump pauses.
    rng: SimRng,
    /// Ticks since this instance was created, across episodes.
    pub time: i32,
    /// Episodes started, counting the initial one.
    pub episode_id: u64,
    events: TickEvents,
}

impl SimInstance {
    /// Create an instance and generate its first level. `instance_seed`
    /// drives every random choice this instance will ever make, so equal
    /// seeds and action sequences replay identically.
    pub fn new(instance_seed: u64, config: InstanceConfig, registry: ArchetypeRegistry) -> Self {
        let mut rng = SimRng::seed_from(instance_seed);
        let level_seed = Self::draw_level_seed(&mut rng, &config.sampling);
        let maze = generate(level_seed, config.physics, &registry);
        let monsters = maze.spawns.iter().map(Monster::from_spawn).collect();
        let mut agent = Agent::new();
        agent.reset(&maze);
        Self {
            maze,
            agent,
            monsters,
            config,
            registry,
            rng,
            time: 0,
            episode_id: 0,
            events: TickEvents::default(),
        }
    }

    fn draw_level_seed(rng: &mut SimRng, sampling: &LevelSampling) -> u64 {
        match sampling {
            LevelSampling::Unbounded => rng.next_seed(),
            LevelSampling::SeedRange(n) => {
                if *n == 0 {
                    rng.next_seed()
                } else {
                    rng.next_seed() % n
                }
            }
            LevelSampling::SeedPool(pool) => {
                if pool.is_empty() {
                    rng.next_seed()
                } else {
                    pool[(rng.next_seed() % pool.len() as u64) as usize]
                }
            }
        }
    }

    /// Latch the control inputs for the next [`tick`](SimInstance::tick).
    pub fn set_action(&mut self, action: Action) {
        self.agent.set_action(action);
    }

    /// Advance the instance by one tick: monsters move and collide, the
    /// agent moves, and a terminated episode is replaced by a fresh one.
    pub fn tick(&mut self) {
        let a = &mut self.agent;
        if self.config.collect_extras
            && (a.killed_animation_frames > 1 || a.finished_level_frames > 1)
        {
            // Hold the pose for a few frames before resetting. A finished
            // agent keeps falling into the final coin; a killed one is
            // frozen.
            a.killed_animation_frames -= 1;
            a.finished_level_frames -= 1;
            if a.finished_level_frames > 1 {
                a.step(&mut self.maze, &self.config.rewards, self.config.timeout);
            }
            return;
        }

        self.time += 1;
        // Termination is observed before this tick's motion: the caller
        // learns about it one step after it happened, alongside the reset.
        let game_over = self.maze.is_terminated;

        for m in &mut self.monsters {
            if m.is_dead {
                continue;
            }
            m.step(&self.maze, &self.registry, &mut self.rng);
            let a = &mut self.agent;
            let dx = (m.x - a.x).abs();
            let dy = a.y - m.y;
            if dx < 0.6 && dy < 1.0 && dy > 0.0 && self.registry.get(m.archetype).stompable {
                m.is_dead = true;
                m.dying_frames = MONSTER_DEATH_ANIM_LENGTH - 1;
                a.reward += self.config.rewards.kill_monster_reward;
                a.reward_sum += self.config.rewards.kill_monster_reward;
                a.killed_monster = true;
            } else if dx + dy.abs() < 1.0 && !a.power_up_mode {
                self.maze.is_terminated = true;
                a.is_killed = true;
                a.killed_animation_frames = DEATH_ANIM_LENGTH;
                a.reward -= self.config.rewards.die_penalty;
                a.reward_sum -= self.config.rewards.die_penalty;
            }
        }

        self.agent.game_over = game_over;
        if !self.agent.is_killed {
            self.agent
                .step(&mut self.maze, &self.config.rewards, self.config.timeout);
        }
        if game_over {
            self.reset_episode();
        }

        let a = &mut self.agent;
        self.events = TickEvents {
            collected_coin: a.collected_coin,
            collected_gem: a.collected_gem,
            killed_monster: a.killed_monster,
            bumped_head: a.bumped_head,
        };
        a.collected_coin = false;
        a.collected_gem = false;
        a.killed_monster = false;
        a.bumped_head = false;
    }

    /// Read and clear the step outputs, exactly once per batch step.
    pub fn harvest(&mut self) -> StepReport {
        let report = StepReport {
            reward: self.agent.reward,
            done: self.agent.game_over,
            new_level: self.maze.is_new_level,
        };
        self.agent.reward = 0.0;
        self.agent.game_over = false;
        self.maze.is_new_level = false;
        report
    }

    /// Events latched by the most recent tick.
    pub fn events(&self) -> TickEvents {
        self.events
    }

    /// The configuration this instance was created with.
    pub fn config(&self) -> &InstanceConfig {
        &self.config
    }

    /// Throw away the current level and start a fresh episode. The agent
    /// is reset in place; its unharvested reward survives the boundary.
    fn reset_episode(&mut self) {
        let level_seed = Self::draw_level_seed(&mut self.rng, &self.config.sampling);
        self.maze = generate(level_seed, self.config.physics, &self.registry);
        self.monsters = self.maze.spawns.iter().map(Monster::from_spawn).collect();
        self.agent.reset(&self.maze);
        self.agent.is_killed = false;
        self.agent.is_preparing_to_jump = false;
        self.agent.killed_monster = false;
        self.agent.bumped_head = false;
        self.agent.killed_animation_frames = 0;
        self.agent.finished_level_frames = 0;
        self.agent.power_up_mode = false;
        self.episode_id += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caper_core::{ArchetypeId, MonsterKind};
    use caper_level::{parse, MonsterSpawn, TEST_LEVEL};

    fn instance(seed: u64) -> SimInstance {
        SimInstance::new(seed, InstanceConfig::default(), ArchetypeRegistry::standard())
    }

    #[test]
    fn fresh_instance_reports_new_level_once() {
        let mut inst = instance(1);
        let first = inst.harvest();
        assert!(first.new_level);
        inst.set_action(Action::from_index(0));
        inst.tick();
        let second = inst.harvest();
        assert!(!second.new_level);
    }

    #[test]
    fn identical_seeds_replay_identically() {
        let mut a = instance(42);
        let mut b = instance(42);
        let actions = [0, 1, 1, 3, 4, 1, 0, 2, 5, 1, 1, 3, 0, 6, 1, 1];
        for (t, &act) in actions.iter().cycle().take(400).enumerate() {
            a.set_action(Action::from_index(act));
            b.set_action(Action::from_index(act));
            a.tick();
            b.tick();
            let (ra, rb) = (a.harvest(), b.harvest());
            assert_eq!(ra, rb, "diverged at tick {t}");
            assert_eq!(a.agent.x, b.agent.x, "diverged at tick {t}");
            assert_eq!(a.agent.y, b.agent.y, "diverged at tick {t}");
        }
    }

    #[test]
    fn timeout_produces_done_and_a_new_level() {
        let mut inst = SimInstance::new(
            5,
            InstanceConfig {
                timeout: 8,
                ..InstanceConfig::default()
            },
            ArchetypeRegistry::standard(),
        );
        inst.harvest();
        let mut saw_done = false;
        let mut saw_new_level = false;
        for _ in 0..40 {
            inst.set_action(Action::from_index(0));
            inst.tick();
            let r = inst.harvest();
            saw_done |= r.done;
            saw_new_level |= r.new_level;
        }
        assert!(saw_done, "timeout must surface as done");
        assert!(saw_new_level, "reset must surface as new_level");
        assert!(inst.episode_id > 0);
    }

    #[test]
    fn done_lags_termination_by_one_step() {
        let mut inst = SimInstance::new(
            5,
            InstanceConfig {
                timeout: 8,
                ..InstanceConfig::default()
            },
            ArchetypeRegistry::standard(),
        );
        inst.harvest();
        loop {
            inst.set_action(Action::from_index(0));
            inst.tick();
            if inst.maze.is_terminated {
                break;
            }
            let r = inst.harvest();
            assert!(!r.done);
        }
        // The tick that noticed the termination resets and reports it.
        assert!(!inst.harvest().done);
        inst.set_action(Action::from_index(0));
        inst.tick();
        assert!(inst.harvest().done);
    }

    #[test]
    fn seed_range_limits_distinct_levels() {
        let config = InstanceConfig {
            timeout: 3,
            sampling: LevelSampling::SeedRange(2),
            ..InstanceConfig::default()
        };
        let mut inst = SimInstance::new(9, config, ArchetypeRegistry::standard());
        let mut seen = Vec::new();
        for _ in 0..200 {
            inst.set_action(Action::from_index(0));
            inst.tick();
        }
        assert!(inst.episode_id >= 10, "short timeout should cycle episodes");
        seen.push(inst.maze.spawn);
        // Only two seeds exist, so only two spawn columns can appear.
        for _ in 0..200 {
            inst.set_action(Action::from_index(0));
            inst.tick();
            if !seen.contains(&inst.maze.spawn) {
                seen.push(inst.maze.spawn);
            }
        }
        assert!(seen.len() <= 2);
    }

    #[test]
    fn seed_pool_from_seed_is_reproducible() {
        let a = LevelSampling::pool_from_seed(7, 5);
        let b = LevelSampling::pool_from_seed(7, 5);
        let (LevelSampling::SeedPool(pa), LevelSampling::SeedPool(pb)) = (&a, &b) else {
            panic!("expected seed pools");
        };
        assert_eq!(pa, pb);
        assert_eq!(pa.len(), 5);

        let config = InstanceConfig {
            timeout: 3,
            sampling: a,
            ..InstanceConfig::default()
        };
        let mut inst = SimInstance::new(1, config, ArchetypeRegistry::standard());
        for _ in 0..100 {
            inst.set_action(Action::from_index(0));
            inst.tick();
        }
        assert!(inst.episode_id > 5, "short timeout should cycle the pool");
    }

    /// An instance on the fixture level with a single hand-placed
    /// stompable walker in open space at (10, 5) and the agent just
    /// beside it, `agent_dy` above the monster.
    fn collision_rig(agent_dy: f32, power_up: bool) -> SimInstance {
        let registry = ArchetypeRegistry::standard();
        let stompable = (0..registry.len() as u32)
            .map(ArchetypeId)
            .find(|&id| {
                registry.get(id).stompable && registry.get(id).kind == MonsterKind::Walking
            })
            .unwrap();
        let config = InstanceConfig {
            rewards: RewardConfig {
                die_penalty: 2.5,
                ..RewardConfig::default()
            },
            ..InstanceConfig::default()
        };
        let mut inst = SimInstance::new(1, config, registry.clone());
        inst.maze = parse(TEST_LEVEL, PhysicsConfig::default(), &registry, 0).unwrap();
        inst.monsters = vec![Monster::from_spawn(&MonsterSpawn {
            x: 10,
            y: 5,
            kind: MonsterKind::Walking,
            archetype: stompable,
        })];
        inst.agent.reset(&inst.maze);
        inst.agent.x = 10.3;
        inst.agent.y = 5.0 + agent_dy;
        inst.agent.power_up_mode = power_up;
        inst.harvest();
        inst.set_action(Action::from_index(0));
        inst
    }

    #[test]
    fn stomping_a_monster_kills_it_and_pays_the_bounty() {
        let mut inst = collision_rig(0.5, false);
        inst.tick();
        assert!(inst.monsters[0].is_dead);
        assert_eq!(inst.monsters[0].dying_frames, MONSTER_DEATH_ANIM_LENGTH - 1);
        assert!(inst.events().killed_monster);
        assert!(!inst.agent.is_killed);
        assert!(!inst.maze.is_terminated);
        assert_eq!(inst.harvest().reward, 5.0);
    }

    #[test]
    fn flat_overlap_with_a_monster_kills_the_agent() {
        let mut inst = collision_rig(0.0, false);
        inst.tick();
        // Level with the monster fails the stomp window; it kills instead.
        assert!(inst.agent.is_killed);
        assert!(inst.maze.is_terminated);
        assert_eq!(inst.agent.killed_animation_frames, DEATH_ANIM_LENGTH);
        assert!(!inst.monsters[0].is_dead);
        let r = inst.harvest();
        assert_eq!(r.reward, -2.5);
        // Termination surfaces as done on the following step.
        assert!(!r.done);
        inst.set_action(Action::from_index(0));
        inst.tick();
        assert!(inst.harvest().done);
    }

    #[test]
    fn power_up_mode_shields_the_agent() {
        let mut inst = collision_rig(0.0, true);
        inst.tick();
        assert!(!inst.agent.is_killed);
        assert!(!inst.maze.is_terminated);
        assert!(!inst.monsters[0].is_dead);
        assert_eq!(inst.harvest().reward, 0.0);
    }

    #[test]
    fn events_latch_then_clear_on_agent() {
        let mut inst = instance(3);
        inst.agent.collected_coin = true;
        inst.agent.bumped_head = true;
        inst.set_action(Action::from_index(0));
        inst.tick();
        let ev = inst.events();
        assert!(ev.collected_coin);
        assert!(ev.bumped_head);
        assert!(!inst.agent.collected_coin);
        assert!(!inst.agent.bumped_head);
    }

    #[test]
    fn extras_hold_the_death_pose() {
        let config = InstanceConfig {
            collect_extras: true,
            ..InstanceConfig::default()
        };
        let mut inst = SimInstance::new(11, config, ArchetypeRegistry::standard());
        inst.agent.is_killed = true;
        inst.agent.killed_animation_frames = 5;
        inst.maze.is_terminated = true;
        let episode_before = inst.episode_id;
        for _ in 0..4 {
            inst.set_action(Action::from_index(0));
            inst.tick();
        }
        // Four ticks consumed by the pose; no reset yet.
        assert_eq!(inst.episode_id, episode_before);
        assert_eq!(inst.agent.killed_animation_frames, 1);
        // Next tick runs the normal path and resets.
        inst.set_action(Action::from_index(0));
        inst.tick();
        assert_eq!(inst.episode_id, episode_before + 1);
    }
}
