//! The game state machine: `(session, intent) -> (session, events, commands)`.

use std::collections::BTreeSet;
use std::time::Duration;

use log::debug;
use rand::Rng;

use crate::components::{Dir, Pos};
use crate::config::{GameConfig, LEVELS, MAX_LEVEL};
use crate::error::GameError;
use crate::level::{LevelFactory, Maze};
use crate::player::{MoveOutcome, PlayerState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Playing,
    /// Waiting out the collision delay before the player is sent back to start.
    Blocked,
    LevelComplete,
    GameWon,
    GameOver,
}

/// Identifies one armed collision delay so a late callback cannot hit a newer session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    StartLevel(u32),
    Move(Dir),
    ResolveBlocked(Ticket),
    Timeout,
    /// Back to level 1 with a fresh maze.
    Restart,
    /// Regenerate the current level.
    RetryLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    Bounds,
    Wall,
    DoorLocked,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    LevelStarted {
        level: u32,
        grid_size: usize,
        maze: Maze,
    },
    Moved {
        to: Pos,
        visited: BTreeSet<Pos>,
    },
    Blocked {
        reason: BlockReason,
        dir: Dir,
    },
    KeyCollected,
    KeyReturned,
    LevelComplete {
        level: u32,
    },
    TimeUp {
        level: u32,
    },
    GameWon,
    GameOver,
}

/// Requests for whoever owns the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ResetClock { budget: Duration },
    StopClock,
    ArmResolve { ticket: Ticket, delay: Duration },
    CancelResolve { ticket: Ticket },
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameSession {
    pub level: u32,
    pub max_level: u32,
    pub phase: Phase,
    pub maze: Maze,
    pub player: PlayerState,
    pub config: GameConfig,
    pending_resolve: Option<Ticket>,
    next_ticket: u64,
}

/// Everything one intent produced.
#[derive(Debug)]
pub struct Step {
    pub session: GameSession,
    pub events: Vec<Event>,
    pub commands: Vec<Command>,
}

impl GameSession {
    pub fn start<R: Rng>(
        level: u32,
        config: GameConfig,
        factory: &mut LevelFactory<R>,
    ) -> Result<Step, GameError> {
        let maze = factory.generate_level(level)?;
        Ok(Self::with_maze(level, config, maze))
    }

    /// Starts `level` on a maze built elsewhere.
    pub fn with_maze(level: u32, config: GameConfig, maze: Maze) -> Step {
        let session = GameSession {
            level,
            max_level: MAX_LEVEL,
            phase: Phase::Playing,
            player: PlayerState::at(maze.start()),
            maze,
            config,
            pending_resolve: None,
            next_ticket: 0,
        };
        let events = vec![session.level_started()];
        let commands = vec![Command::ResetClock {
            budget: config.time_budget,
        }];
        Step {
            session,
            events,
            commands,
        }
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, Phase::GameWon | Phase::GameOver)
    }

    pub fn pending_resolve(&self) -> Option<Ticket> {
        self.pending_resolve
    }

    fn level_started(&self) -> Event {
        Event::LevelStarted {
            level: self.level,
            grid_size: self.maze.grid_size(),
            maze: self.maze.clone(),
        }
    }
}

/// Applies one intent. Intents that make no sense in the current phase come
/// back as an unchanged session with no events.
pub fn transition<R: Rng>(
    mut session: GameSession,
    intent: Intent,
    factory: &mut LevelFactory<R>,
) -> Step {
    let mut events = Vec::new();
    let mut commands = Vec::new();

    match intent {
        Intent::StartLevel(level) => match factory.generate_level(level) {
            Ok(maze) => {
                session = replace_level(session, level, maze, &mut events, &mut commands);
            }
            Err(err) => debug!("ignoring start: {}", err),
        },
        Intent::Restart => {
            let (level, maze) = fresh_level(factory, 1);
            session = replace_level(session, level, maze, &mut events, &mut commands);
        }
        Intent::RetryLevel => {
            let (level, maze) = fresh_level(factory, session.level);
            session = replace_level(session, level, maze, &mut events, &mut commands);
        }
        Intent::Move(dir) if session.phase == Phase::Playing => {
            session = apply_move(session, dir, factory, &mut events, &mut commands);
        }
        Intent::ResolveBlocked(ticket)
            if session.phase == Phase::Blocked && session.pending_resolve == Some(ticket) =>
        {
            session.pending_resolve = None;
            session.phase = Phase::Playing;
            let start = session.maze.start();
            let key_returned = session.player.return_to_start(start);
            events.push(Event::Moved {
                to: start,
                visited: session.player.visited.clone(),
            });
            if key_returned {
                events.push(Event::KeyReturned);
            }
        }
        Intent::Timeout if session.phase == Phase::Playing => {
            events.push(Event::TimeUp {
                level: session.level,
            });
            session = finish_level(session, factory, &mut events, &mut commands, Phase::GameOver);
        }
        other => debug!("dropping {:?} in phase {:?}", other, session.phase),
    }

    Step {
        session,
        events,
        commands,
    }
}

fn apply_move<R: Rng>(
    mut session: GameSession,
    dir: Dir,
    factory: &mut LevelFactory<R>,
    events: &mut Vec<Event>,
    commands: &mut Vec<Command>,
) -> GameSession {
    match session.player.try_move(&session.maze, dir) {
        MoveOutcome::OutOfBounds => events.push(Event::Blocked {
            reason: BlockReason::Bounds,
            dir,
        }),
        MoveOutcome::DoorLocked => events.push(Event::Blocked {
            reason: BlockReason::DoorLocked,
            dir,
        }),
        MoveOutcome::HitWall => {
            let ticket = Ticket(session.next_ticket);
            session.next_ticket += 1;
            session.pending_resolve = Some(ticket);
            session.phase = Phase::Blocked;
            events.push(Event::Blocked {
                reason: BlockReason::Wall,
                dir,
            });
            commands.push(Command::ArmResolve {
                ticket,
                delay: session.config.blocked_delay,
            });
        }
        MoveOutcome::Moved {
            picked_up_key,
            reached_door,
        } => {
            events.push(Event::Moved {
                to: session.player.position,
                visited: session.player.visited.clone(),
            });
            if picked_up_key {
                events.push(Event::KeyCollected);
            }
            if reached_door {
                session.phase = Phase::LevelComplete;
                events.push(Event::LevelComplete {
                    level: session.level,
                });
                return finish_level(session, factory, events, commands, Phase::GameWon);
            }
        }
    }
    session
}

/// Next level if there is one, otherwise the terminal `last` phase.
fn finish_level<R: Rng>(
    mut session: GameSession,
    factory: &mut LevelFactory<R>,
    events: &mut Vec<Event>,
    commands: &mut Vec<Command>,
    last: Phase,
) -> GameSession {
    if session.level < session.max_level {
        let (level, maze) = fresh_level(factory, session.level + 1);
        return replace_level(session, level, maze, events, commands);
    }
    session.phase = last;
    events.push(match last {
        Phase::GameWon => Event::GameWon,
        _ => Event::GameOver,
    });
    commands.push(Command::StopClock);
    debug!("game finished on level {} as {:?}", session.level, last);
    session
}

fn replace_level(
    old: GameSession,
    level: u32,
    maze: Maze,
    events: &mut Vec<Event>,
    commands: &mut Vec<Command>,
) -> GameSession {
    if let Some(ticket) = old.pending_resolve {
        commands.push(Command::CancelResolve { ticket });
    }
    let mut step = GameSession::with_maze(level, old.config, maze);
    step.session.max_level = old.max_level;
    step.session.next_ticket = old.next_ticket;
    let size = step.session.maze.grid_size();
    debug!("level {} started on a {}x{} grid", level, size, size);
    events.append(&mut step.events);
    commands.append(&mut step.commands);
    step.session
}

/// A maze for `level`, or for level 1 when `level` is not in the table
/// (only possible for sessions built with `with_maze`).
fn fresh_level<R: Rng>(factory: &mut LevelFactory<R>, level: u32) -> (u32, Maze) {
    match factory.generate_level(level) {
        Ok(maze) => (level, maze),
        Err(err) => {
            debug!("{}; starting over at level 1", err);
            (1, factory.generate(&LEVELS[0]))
        }
    }
}
