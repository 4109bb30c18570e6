//! Hand-written levels in a one-glyph-per-tile text format.
//!
//! Rows are written top-down, one character per tile. Spawn markers
//! (`F`, `M`, `G`) and carved-trace cells (space) are legal in source
//! text and resolved the same way generated levels are, so a fixture can
//! exercise monster placement. [`render`] is the inverse mapping, handy
//! for debugging generator output.

use std::error::Error;
use std::fmt;

use caper_core::{ArchetypeRegistry, PhysicsConfig, SimRng, Tile};

use crate::generator::resolve_markers;
use crate::maze::Maze;

/// A small fixture level: a coin run over crates, a ladder up to a gem
/// shelf, a lava pool, and one of each monster class.
pub const TEST_LEVEL: &str = "\
AAAAAAAAAAAAAAAAAAAAAA
A....................A
A..F.........2.......A
A...........aSb......A
A.....=..............A
A.....=..............A
A.#...=...G..........A
A...M.=1aSSSb..S^^S..A
ASSSSSSSSSSSSSSA||ASSA
AAAAAAAAAAAAAAAAAAAAAA
";

/// Failure to parse a text level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsciiError {
    /// The text had fewer than three rows or three columns.
    TooSmall {
        /// Parsed width.
        w: usize,
        /// Parsed height.
        h: usize,
    },
    /// A row's length disagreed with the first row's.
    RaggedRow {
        /// Zero-based row index, counted from the top of the text.
        row: usize,
        /// Length of this row.
        len: usize,
        /// Expected length.
        expected: usize,
    },
    /// A character with no tile meaning.
    UnknownGlyph {
        /// The offending character.
        glyph: char,
        /// Zero-based row index, counted from the top of the text.
        row: usize,
        /// Zero-based column index.
        col: usize,
    },
}

impl fmt::Display for AsciiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsciiError::TooSmall { w, h } => {
                write!(f, "level text is {w}x{h}; need at least 3x3")
            }
            AsciiError::RaggedRow { row, len, expected } => {
                write!(f, "row {row} has {len} glyphs, expected {expected}")
            }
            AsciiError::UnknownGlyph { glyph, row, col } => {
                write!(f, "unknown glyph {glyph:?} at row {row}, column {col}")
            }
        }
    }
}

impl Error for AsciiError {}

fn tile_from_glyph(glyph: char) -> Option<Tile> {
    Some(match glyph {
        '.' => Tile::Empty,
        ' ' => Tile::CarvedTrace,
        '=' => Tile::Ladder,
        '^' => Tile::LavaTop,
        '|' => Tile::LavaMid,
        'S' => Tile::WallTop,
        'A' => Tile::WallMid,
        'a' => Tile::CliffLeft,
        'b' => Tile::CliffRight,
        '1' => Tile::Coin,
        '2' => Tile::Gem,
        'P' => Tile::Spike,
        '#' | '$' | '&' | '%' => Tile::Crate,
        'F' => Tile::FlyingSpawn,
        'M' => Tile::WalkingSpawn,
        'G' => Tile::GroundSpawn,
        _ => return None,
    })
}

fn glyph_from_tile(tile: Tile) -> char {
    match tile {
        Tile::Empty => '.',
        Tile::CarvedTrace => ' ',
        Tile::Ladder => '=',
        Tile::LavaTop => '^',
        Tile::LavaMid => '|',
        Tile::WallTop => 'S',
        Tile::WallMid => 'A',
        Tile::CliffLeft => 'a',
        Tile::CliffRight => 'b',
        Tile::Coin => '1',
        Tile::Gem => '2',
        Tile::Spike => 'P',
        Tile::Crate => '#',
        Tile::FlyingSpawn => 'F',
        Tile::WalkingSpawn => 'M',
        Tile::GroundSpawn => 'G',
    }
}

/// Parse a text level into a ready-to-play [`Maze`].
///
/// The spawn is fixed at `(2, 2)`; fixture levels keep that corner
/// clear. `seed` drives marker resolution (flying-monster rolls and
/// species picks), so a fixture with markers is still deterministic per
/// seed.
pub fn parse(
    text: &str,
    physics: PhysicsConfig,
    registry: &ArchetypeRegistry,
    seed: u64,
) -> Result<Maze, AsciiError> {
    let rows: Vec<&str> = text.lines().collect();
    let h = rows.len();
    let w = rows.first().map_or(0, |r| r.chars().count());
    if w < 3 || h < 3 {
        return Err(AsciiError::TooSmall { w, h });
    }
    let mut maze = Maze::new(w as i32, h as i32, physics);
    maze.spawn = (2, 2);
    let mut coins = 0;
    for (row, line) in rows.iter().enumerate() {
        let len = line.chars().count();
        if len != w {
            return Err(AsciiError::RaggedRow { row, len, expected: w });
        }
        for (col, glyph) in line.chars().enumerate() {
            let tile =
                tile_from_glyph(glyph).ok_or(AsciiError::UnknownGlyph { glyph, row, col })?;
            if tile.is_coin() {
                coins += 1;
            }
            // Text is top-down, the grid is bottom-up.
            maze.set(col as i32, (h - 1 - row) as i32, tile);
        }
    }
    maze.coins = coins;
    let mut rng = SimRng::seed_from(seed);
    resolve_markers(&mut maze, &mut rng, registry);
    Ok(maze)
}

/// Render a level back to top-down text, one trailing newline per row.
pub fn render(maze: &Maze) -> String {
    let mut out = String::with_capacity(((maze.w + 1) * maze.h) as usize);
    for y in (0..maze.h).rev() {
        for x in 0..maze.w {
            out.push(glyph_from_tile(maze.get(x, y)));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use caper_core::MonsterKind;

    fn parse_fixture(seed: u64) -> Maze {
        parse(
            TEST_LEVEL,
            PhysicsConfig::default(),
            &ArchetypeRegistry::standard(),
            seed,
        )
        .unwrap()
    }

    #[test]
    fn fixture_parses() {
        let m = parse_fixture(0);
        assert_eq!((m.w, m.h), (22, 10));
        assert_eq!(m.spawn, (2, 2));
        // One coin; the gem is not part of the completion count.
        assert_eq!(m.coins, 1);
    }

    #[test]
    fn fixture_spawns_every_monster_class() {
        let m = parse_fixture(0);
        let kinds: Vec<_> = m.spawns.iter().map(|s| s.kind).collect();
        assert!(kinds.contains(&MonsterKind::Flying));
        assert!(kinds.contains(&MonsterKind::Walking));
        assert!(kinds.contains(&MonsterKind::Ground));
    }

    #[test]
    fn round_trip_without_markers() {
        let m = parse_fixture(0);
        // After marker resolution the render has no F/M/G glyphs, so it
        // re-parses to the identical grid.
        let text = render(&m);
        let again = parse(
            &text,
            PhysicsConfig::default(),
            &ArchetypeRegistry::standard(),
            0,
        )
        .unwrap();
        for y in 0..m.h {
            for x in 0..m.w {
                assert_eq!(m.get(x, y), again.get(x, y));
            }
        }
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = parse(
            "AAAA\nA..A\nAAA\n",
            PhysicsConfig::default(),
            &ArchetypeRegistry::standard(),
            0,
        )
        .unwrap_err();
        assert_eq!(
            err,
            AsciiError::RaggedRow {
                row: 2,
                len: 3,
                expected: 4
            }
        );
    }

    #[test]
    fn unknown_glyphs_are_rejected() {
        let err = parse(
            "AAAA\nA.?A\nAAAA\n",
            PhysicsConfig::default(),
            &ArchetypeRegistry::standard(),
            0,
        )
        .unwrap_err();
        assert_eq!(
            err,
            AsciiError::UnknownGlyph {
                glyph: '?',
                row: 1,
                col: 2
            }
        );
    }
}
