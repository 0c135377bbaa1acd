//! Key-and-door grid puzzle: solvable level generation plus the movement state
//! machine that plays it. Rendering, input and wall-clock time live outside.

pub mod clock;
pub mod components;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod game;
pub mod level;
pub mod player;
pub mod session;
pub mod walls;

pub use components::{Dir, Edge, Pos, WallSet};
pub use config::{GameConfig, LevelConfig};
pub use connectivity::{is_solvable, reachable};
pub use error::GameError;
pub use game::Game;
pub use level::{LevelFactory, Maze};
pub use player::{MoveOutcome, PlayerState};
pub use session::{transition, BlockReason, Command, Event, GameSession, Intent, Phase, Step, Ticket};
