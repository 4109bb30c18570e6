//! Monster archetypes and the built-in roster.
//!
//! An archetype bundles the per-species tuning (speed multiplier, jumping
//! behavior, stompability) with the movement class. The generator samples
//! an archetype per spawn marker from the subset matching the marker's
//! movement class.

use crate::rng::SimRng;

/// How a monster moves through the level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MonsterKind {
    /// Fixed hazard anchored to the ground; never moves.
    Ground,
    /// Patrols a platform, turning at walls and edges.
    Walking,
    /// Drifts through open space, turning at walls only.
    Flying,
}

/// Index into an [`ArchetypeRegistry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ArchetypeId(pub u32);

/// Tuning for one monster species.
#[derive(Clone, Debug, PartialEq)]
pub struct Archetype {
    /// Species name, stable across runs.
    pub name: &'static str,
    /// Movement class.
    pub kind: MonsterKind,
    /// Horizontal speed as a multiple of the base monster speed.
    pub speed_multiplier: f32,
    /// Whether this species periodically hops while patrolling.
    pub jumps: bool,
    /// Upward velocity of a hop, when `jumps` is set.
    pub jump_height: f32,
    /// Maximum ticks spent paused between hops, when `jumps` is set.
    pub max_pause: i32,
    /// Whether the agent can kill this species by landing on it.
    pub stompable: bool,
}

impl Archetype {
    fn patroller(name: &'static str, kind: MonsterKind, speed_multiplier: f32) -> Self {
        Self {
            name,
            kind,
            speed_multiplier,
            jumps: false,
            jump_height: 0.0,
            max_pause: 0,
            stompable: false,
        }
    }
}

/// The roster of monster species available to the generator.
#[derive(Clone, Debug)]
pub struct ArchetypeRegistry {
    entries: Vec<Archetype>,
}

impl ArchetypeRegistry {
    /// The built-in roster.
    pub fn standard() -> Self {
        let mut entries = vec![
            Archetype::patroller("saw_half", MonsterKind::Ground, 0.0),
            Archetype::patroller("barnacle", MonsterKind::Ground, 0.0),
            Archetype::patroller("bee", MonsterKind::Flying, 1.0),
            Archetype::patroller("slime_block", MonsterKind::Walking, 1.0),
            Archetype::patroller("slime_blue", MonsterKind::Walking, 1.0),
            Archetype::patroller("mouse", MonsterKind::Walking, 2.0),
            Archetype::patroller("snail", MonsterKind::Walking, 0.4),
            Archetype::patroller("ladybug", MonsterKind::Walking, 1.8),
            Archetype::patroller("worm_pink", MonsterKind::Walking, 0.6),
            Archetype::patroller("frog", MonsterKind::Walking, 2.0),
        ];
        for a in &mut entries {
            match a.name {
                "slime_block" | "snail" | "worm_pink" => a.stompable = true,
                "ladybug" => {
                    a.jumps = true;
                    a.jump_height = 0.08;
                    a.max_pause = 15;
                }
                "frog" => {
                    a.jumps = true;
                    a.jump_height = 0.2;
                    a.max_pause = 60;
                }
                _ => {}
            }
        }
        Self { entries }
    }

    /// Look up an archetype by id.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this registry.
    pub fn get(&self, id: ArchetypeId) -> &Archetype {
        &self.entries[id.0 as usize]
    }

    /// Sample a species of the given movement class, uniformly over the
    /// matching subset.
    pub fn sample(&self, kind: MonsterKind, rng: &mut SimRng) -> ArchetypeId {
        let matching: Vec<u32> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, a)| a.kind == kind)
            .map(|(i, _)| i as u32)
            .collect();
        debug_assert!(!matching.is_empty(), "no archetypes of kind {kind:?}");
        let pick = rng.randn(matching.len() as i32) as usize;
        ArchetypeId(matching[pick])
    }

    /// Number of species in the roster.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the roster is empty. The built-in roster never is.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
