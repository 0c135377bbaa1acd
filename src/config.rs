//! Fixed game parameters.

use std::time::Duration;

use crate::error::GameError;

pub const MAX_LEVEL: u32 = 3;
pub const LEVEL_TIME_BUDGET: Duration = Duration::from_secs(5 * 60);
pub const BLOCKED_DELAY: Duration = Duration::from_secs(1);
pub const MAX_LEVEL_ATTEMPTS: u32 = 50;
pub const FALLBACK_DENSITY: f64 = 0.30;
pub const FALLBACK_KEY_X: f64 = 0.6;
pub const FALLBACK_KEY_Y: f64 = 0.4;
pub const FALLBACK_CLEARANCE: usize = 1;

/// Level 1 first.
pub const LEVELS: [LevelConfig; MAX_LEVEL as usize] = [
    LevelConfig {
        grid_size: 5,
        wall_density: 0.50,
    },
    LevelConfig {
        grid_size: 7,
        wall_density: 0.70,
    },
    LevelConfig {
        grid_size: 10,
        wall_density: 0.85,
    },
];

#[derive(Debug, Clone, Copy, PartialEq)]
/// Only built through `new` or `for_level`, so the size is at least 2 and the
/// density lies in `0.0..=1.0`.
pub struct LevelConfig {
    grid_size: usize,
    wall_density: f64,
}

impl LevelConfig {
    pub fn new(grid_size: usize, wall_density: f64) -> Result<Self, GameError> {
        if grid_size < 2 {
            return Err(GameError::InvalidGridSize(grid_size));
        }
        if !(0.0..=1.0).contains(&wall_density) {
            return Err(GameError::InvalidDensity(wall_density));
        }
        Ok(Self {
            grid_size,
            wall_density,
        })
    }

    pub fn for_level(level: u32) -> Result<Self, GameError> {
        let idx = level
            .checked_sub(1)
            .ok_or(GameError::UnknownLevel(level))? as usize;
        LEVELS.get(idx).copied().ok_or(GameError::UnknownLevel(level))
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    pub fn wall_density(&self) -> f64 {
        self.wall_density
    }
}

/// Timing and retry knobs. The defaults are the game's fixed values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameConfig {
    pub time_budget: Duration,
    pub blocked_delay: Duration,
    pub max_attempts: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            time_budget: LEVEL_TIME_BUDGET,
            blocked_delay: BLOCKED_DELAY,
            max_attempts: MAX_LEVEL_ATTEMPTS,
        }
    }
}
