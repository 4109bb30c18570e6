//! Level grids and the procedural level generator.
//!
//! A [`Maze`] is a tile grid with bottom-up `y` coordinates plus the
//! level-scoped state the simulation mutates (coin count, termination
//! flag). [`generate`] builds one deterministically from a seed by
//! simulating jump arcs between platforms, so every platform is reachable
//! under the same physics the agent plays with.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod ascii;
mod generator;
mod maze;

pub use ascii::{parse, render, AsciiError, TEST_LEVEL};
pub use generator::{generate, LEVEL_HEIGHT, LEVEL_WIDTH};
pub use maze::{Maze, MonsterSpawn};
