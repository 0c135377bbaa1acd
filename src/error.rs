use thiserror::Error;

use crate::components::Pos;

/// Errors raised when the caller hands the core input it cannot build a level from.
///
/// Movement violations are not errors; they surface as `Event::Blocked`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GameError {
    #[error("no level {0} in the level table")]
    UnknownLevel(u32),

    #[error("grid size {0} is too small, need at least 2")]
    InvalidGridSize(usize),

    #[error("wall density {0} is outside 0.0..=1.0")]
    InvalidDensity(f64),

    #[error("{what} at {pos:?} is outside a {size}x{size} grid")]
    AnchorOutOfBounds {
        what: &'static str,
        pos: Pos,
        size: usize,
    },

    #[error("start, key and door must be three different cells")]
    DuplicateAnchors,

    #[error("walls cut the path start -> key -> door")]
    Unsolvable,
}
