use log::{debug, warn};
use rand::Rng;

use crate::components::{Pos, WallSet};
use crate::config::{
    LevelConfig, FALLBACK_CLEARANCE, FALLBACK_DENSITY, FALLBACK_KEY_X, FALLBACK_KEY_Y,
    MAX_LEVEL_ATTEMPTS,
};
use crate::connectivity::{is_solvable, is_wall_between};
use crate::error::GameError;
use crate::walls::{essential_cells, place_walls, AnchorGuard, EssentialCells};

/// A generated level. Once built, start -> key and key -> door are always walkable.
#[derive(Debug, Clone, PartialEq)]
pub struct Maze {
    grid_size: usize,
    start: Pos,
    key: Pos,
    door: Pos,
    walls: WallSet,
}

impl Maze {
    pub fn new(
        grid_size: usize,
        start: Pos,
        key: Pos,
        door: Pos,
        walls: WallSet,
    ) -> Result<Self, GameError> {
        if grid_size < 2 {
            return Err(GameError::InvalidGridSize(grid_size));
        }
        for (what, pos) in [("start", start), ("key", key), ("door", door)] {
            if !pos.in_bounds(grid_size) {
                return Err(GameError::AnchorOutOfBounds {
                    what,
                    pos,
                    size: grid_size,
                });
            }
        }
        if start == key || key == door || door == start {
            return Err(GameError::DuplicateAnchors);
        }
        if !is_solvable(grid_size, start, key, door, &walls) {
            return Err(GameError::Unsolvable);
        }
        Ok(Self {
            grid_size,
            start,
            key,
            door,
            walls,
        })
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    pub fn start(&self) -> Pos {
        self.start
    }

    pub fn key(&self) -> Pos {
        self.key
    }

    pub fn door(&self) -> Pos {
        self.door
    }

    pub fn walls(&self) -> &WallSet {
        &self.walls
    }

    pub fn wall_count(&self) -> usize {
        self.walls.len()
    }

    pub fn has_wall(&self, a: Pos, b: Pos) -> bool {
        is_wall_between(&self.walls, a, b)
    }

    pub fn is_solvable(&self) -> bool {
        is_solvable(self.grid_size, self.start, self.key, self.door, &self.walls)
    }

    pub fn essential_cells(&self) -> EssentialCells {
        essential_cells(self.grid_size, &[self.start, self.key, self.door])
    }
}

/// Builds solvable levels from an injected random source.
pub struct LevelFactory<R> {
    rng: R,
    max_attempts: u32,
}

impl<R: Rng> LevelFactory<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            max_attempts: MAX_LEVEL_ATTEMPTS,
        }
    }

    /// Caps the randomized attempts; 0 goes straight to the fallback layout.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn generate_level(&mut self, level: u32) -> Result<Maze, GameError> {
        let config = LevelConfig::for_level(level)?;
        Ok(self.generate(&config))
    }

    pub fn generate(&mut self, config: &LevelConfig) -> Maze {
        let size = config.grid_size();
        let start = Pos::new(0, 0);

        for attempt in 1..=self.max_attempts {
            let key = self.random_cell(size);
            let door = self.random_cell(size);
            if key == start || door == start || key == door {
                continue;
            }

            let cells = essential_cells(size, &[start, key, door]);
            let walls = place_walls(
                &mut self.rng,
                size,
                start,
                key,
                door,
                config.wall_density(),
                AnchorGuard::Essential(&cells),
            );
            match Maze::new(size, start, key, door, walls) {
                Ok(maze) => {
                    debug!(
                        "{}x{} level on attempt {}: key {:?}, door {:?}, {} walls",
                        size,
                        size,
                        attempt,
                        key,
                        door,
                        maze.wall_count()
                    );
                    return maze;
                }
                Err(err) => warn!("discarding attempt {}: {}", attempt, err),
            }
        }

        warn!(
            "no level after {} attempts, using fallback layout for {}x{}",
            self.max_attempts, size, size
        );
        self.fallback(config)
    }

    /// Fixed anchors and sparse walls kept clear of them. Every wall is checked
    /// before it is kept, so the result is solvable even if no wall survives.
    pub fn fallback(&mut self, config: &LevelConfig) -> Maze {
        let size = config.grid_size();
        let start = Pos::new(0, 0);
        let door = Pos::new(size - 1, size - 1);
        let mut key = Pos::new(
            (size as f64 * FALLBACK_KEY_X) as usize,
            (size as f64 * FALLBACK_KEY_Y) as usize,
        );
        if key == start || key == door {
            key = Pos::new(size - 1, 0);
        }

        let guard = AnchorGuard::Clearance {
            anchors: [start, key, door],
            radius: FALLBACK_CLEARANCE,
        };
        let walls = place_walls(&mut self.rng, size, start, key, door, FALLBACK_DENSITY, guard);
        let maze = Maze {
            grid_size: size,
            start,
            key,
            door,
            walls,
        };
        debug_assert!(maze.is_solvable(), "fallback layout must stay solvable");
        maze
    }

    fn random_cell(&mut self, size: usize) -> Pos {
        Pos::new(self.rng.gen_range(0..size), self.rng.gen_range(0..size))
    }
}
