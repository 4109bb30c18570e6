//! The tile alphabet and its collision predicates.
//!
//! Tile semantics are centralized here as methods on the enum so that the
//! generator and the physics code never compare raw codes.

/// One cell of a level's tile grid.
///
/// `CarvedTrace` is a transient marker left behind by the generator's
/// ballistic carving pass; it never survives into a finished level (the
/// post-generation pass normalizes it to [`Tile::Empty`] or a
/// flying-monster spawn). The three monster-spawn variants are likewise
/// generation-time only: they are converted into monster records and
/// replaced with `Empty` before the grid is handed to a simulation
/// instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tile {
    /// Open space.
    Empty,
    /// Climbable ladder column.
    Ladder,
    /// Lava surface (lethal).
    LavaTop,
    /// Lava body below a surface (lethal).
    LavaMid,
    /// Walkable platform surface.
    WallTop,
    /// Solid filler below a surface.
    WallMid,
    /// Left cliff edge of a platform.
    CliffLeft,
    /// Right cliff edge of a platform.
    CliffRight,
    /// Collectible coin; collecting the last one finishes the level.
    Coin,
    /// Collectible gem; grants power-up mode.
    Gem,
    /// Spikes (lethal).
    Spike,
    /// Stackable crate. Solid from the sides and above, but the agent may
    /// intentionally drop through it.
    Crate,
    /// Generation-time marker: spawn a flying monster here.
    FlyingSpawn,
    /// Generation-time marker: spawn a walking monster here.
    WalkingSpawn,
    /// Generation-time marker: spawn a stationary ground monster here.
    GroundSpawn,
    /// Generation-time marker: cell carved out by a simulated jump arc.
    CarvedTrace,
}

impl Tile {
    /// Is this tile solid terrain? Crates are counted only when
    /// `crates_count` is set, mirroring the drop-through mechanic: the
    /// agent's feet treat crates as solid unless it is deliberately
    /// stepping down.
    pub fn is_wall(self, crates_count: bool) -> bool {
        match self {
            Tile::WallTop | Tile::WallMid | Tile::CliffLeft | Tile::CliffRight => true,
            Tile::Crate => crates_count,
            _ => false,
        }
    }

    /// Is this a crate tile?
    pub fn is_crate(self) -> bool {
        matches!(self, Tile::Crate)
    }

    /// Does touching this tile kill the agent?
    pub fn is_lethal(self) -> bool {
        matches!(self, Tile::LavaTop | Tile::LavaMid | Tile::Spike)
    }

    /// Is this a coin pickup?
    pub fn is_coin(self) -> bool {
        matches!(self, Tile::Coin)
    }

    /// Is this a gem pickup?
    pub fn is_gem(self) -> bool {
        matches!(self, Tile::Gem)
    }
}

impl Default for Tile {
    fn default() -> Self {
        Tile::Empty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crates_are_conditionally_solid() {
        assert!(!Tile::Crate.is_wall(false));
        assert!(Tile::Crate.is_wall(true));
    }

    #[test]
    fn terrain_is_solid_either_way() {
        for t in [
            Tile::WallTop,
            Tile::WallMid,
            Tile::CliffLeft,
            Tile::CliffRight,
        ] {
            assert!(t.is_wall(false));
            assert!(t.is_wall(true));
        }
    }

    #[test]
    fn lethal_tiles() {
        assert!(Tile::LavaTop.is_lethal());
        assert!(Tile::LavaMid.is_lethal());
        assert!(Tile::Spike.is_lethal());
        assert!(!Tile::Coin.is_lethal());
    }

    #[test]
    fn pickups_are_not_walls() {
        assert!(!Tile::Coin.is_wall(true));
        assert!(!Tile::Gem.is_wall(true));
        assert!(!Tile::Ladder.is_wall(true));
    }
}
