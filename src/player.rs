use std::collections::BTreeSet;

use crate::components::{Dir, Pos};
use crate::level::Maze;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerState {
    pub position: Pos,
    /// Cells entered since the last reset. The start cell is not in here until re-entered.
    pub visited: BTreeSet<Pos>,
    pub key_collected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    OutOfBounds,
    HitWall,
    DoorLocked,
    Moved { picked_up_key: bool, reached_door: bool },
}

impl PlayerState {
    pub fn at(start: Pos) -> Self {
        Self {
            position: start,
            visited: BTreeSet::new(),
            key_collected: false,
        }
    }

    /// Applies one step. Bounds, then walls, then the door lock, in that order;
    /// only `Moved` changes the state.
    pub fn try_move(&mut self, maze: &Maze, dir: Dir) -> MoveOutcome {
        let Some(target) = self.position.step(dir, maze.grid_size()) else {
            return MoveOutcome::OutOfBounds;
        };
        if maze.has_wall(self.position, target) {
            return MoveOutcome::HitWall;
        }
        if target == maze.door() && !self.key_collected {
            return MoveOutcome::DoorLocked;
        }

        self.position = target;
        self.visited.insert(target);

        let picked_up_key = target == maze.key() && !self.key_collected;
        if picked_up_key {
            self.key_collected = true;
        }
        MoveOutcome::Moved {
            picked_up_key,
            reached_door: target == maze.door(),
        }
    }

    /// Sends the player back to `start` after a collision. Returns true when
    /// a held key had to go back to its cell.
    pub fn return_to_start(&mut self, start: Pos) -> bool {
        self.position = start;
        self.visited.clear();
        std::mem::take(&mut self.key_collected)
    }
}
