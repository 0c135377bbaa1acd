//! Owns the session, the level factory and the clock, and exposes the intents
//! a front-end feeds in. Every call returns the events it produced.

use std::time::Duration;

use log::debug;
use rand::Rng;

use crate::clock::Clock;
use crate::components::Dir;
use crate::config::{GameConfig, LevelConfig, LEVELS};
use crate::error::GameError;
use crate::level::LevelFactory;
use crate::session::{transition, Command, Event, GameSession, Intent, Phase, Step};

pub struct Game<R> {
    session: GameSession,
    factory: LevelFactory<R>,
    clock: Clock,
    /// A timeout that landed during the collision delay, delivered once it resolves.
    deferred_timeout: bool,
}

impl<R> Game<R> {
    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }
}

impl<R: Rng> Game<R> {
    /// A new game on level 1.
    pub fn new(rng: R, config: GameConfig) -> (Self, Vec<Event>) {
        let mut factory = LevelFactory::new(rng).with_max_attempts(config.max_attempts);
        let maze = factory.generate(&LEVELS[0]);
        let step = GameSession::with_maze(1, config, maze);
        Self::from_session(factory, step)
    }

    /// Wraps a session that was started elsewhere, applying its clock commands.
    pub fn from_session(factory: LevelFactory<R>, step: Step) -> (Self, Vec<Event>) {
        let mut clock = Clock::new();
        for command in &step.commands {
            clock.apply(command);
        }
        let game = Self {
            session: step.session,
            factory,
            clock,
            deferred_timeout: false,
        };
        (game, step.events)
    }

    pub fn start_level(&mut self, level: u32) -> Result<Vec<Event>, GameError> {
        LevelConfig::for_level(level)?;
        Ok(self.dispatch(Intent::StartLevel(level)))
    }

    /// Anything other than a unit step is ignored.
    pub fn move_by(&mut self, dx: isize, dy: isize) -> Vec<Event> {
        match Dir::from_delta(dx, dy) {
            Some(dir) => self.step(dir),
            None => {
                debug!("ignoring move by ({}, {})", dx, dy);
                Vec::new()
            }
        }
    }

    pub fn step(&mut self, dir: Dir) -> Vec<Event> {
        self.dispatch(Intent::Move(dir))
    }

    pub fn restart(&mut self) -> Vec<Event> {
        self.dispatch(Intent::Restart)
    }

    pub fn retry_level(&mut self) -> Vec<Event> {
        self.dispatch(Intent::RetryLevel)
    }

    pub fn timeout(&mut self) -> Vec<Event> {
        self.dispatch(Intent::Timeout)
    }

    /// Resolves the pending collision now, for front-ends with their own scheduler.
    pub fn resolve_blocked_delay_elapsed(&mut self) -> Vec<Event> {
        let Some(ticket) = self.session.pending_resolve() else {
            return Vec::new();
        };
        self.clock.apply(&Command::CancelResolve { ticket });
        self.dispatch(Intent::ResolveBlocked(ticket))
    }

    pub fn tick(&mut self, dt: Duration) -> Vec<Event> {
        let mut events = Vec::new();
        for intent in self.clock.advance(dt) {
            events.extend(self.dispatch(intent));
        }
        events
    }

    fn dispatch(&mut self, intent: Intent) -> Vec<Event> {
        if intent == Intent::Timeout && self.session.phase == Phase::Blocked {
            debug!("timeout during collision delay, holding it");
            self.deferred_timeout = true;
            return Vec::new();
        }

        let Step {
            session,
            mut events,
            commands,
        } = transition(self.session.clone(), intent, &mut self.factory);
        self.session = session;
        for command in &commands {
            if matches!(command, Command::ResetClock { .. } | Command::StopClock) {
                self.deferred_timeout = false;
            }
            self.clock.apply(command);
        }

        if self.deferred_timeout && self.session.phase == Phase::Playing {
            self.deferred_timeout = false;
            events.extend(self.dispatch(Intent::Timeout));
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Edge, Pos, WallSet};
    use crate::level::Maze;
    use crate::session::BlockReason;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(21)
    }

    /// Player starts at (0, 0); moving down hits a wall.
    fn game_with_wall_below_start(level: u32) -> Game<ChaCha8Rng> {
        let walls: WallSet = [Edge::between(Pos::new(0, 0), Pos::new(0, 1)).unwrap()]
            .into_iter()
            .collect();
        let maze = Maze::new(5, Pos::new(0, 0), Pos::new(2, 0), Pos::new(4, 0), walls).unwrap();
        let step = GameSession::with_maze(level, GameConfig::default(), maze);
        Game::from_session(LevelFactory::new(rng()), step).0
    }

    #[test]
    fn new_game_starts_level_one() {
        let (game, events) = Game::new(rng(), GameConfig::default());
        assert_eq!(game.session().level, 1);
        assert_eq!(game.session().phase, Phase::Playing);
        assert!(matches!(
            events.as_slice(),
            [Event::LevelStarted {
                level: 1,
                grid_size: 5,
                ..
            }]
        ));
        assert_eq!(game.clock().remaining(), Some(Duration::from_secs(300)));
    }

    #[test]
    fn move_by_rejects_non_unit_steps() {
        let (mut game, _) = Game::new(rng(), GameConfig::default());
        let before = game.session().clone();
        assert!(game.move_by(1, 1).is_empty());
        assert!(game.move_by(0, 0).is_empty());
        assert_eq!(game.session(), &before);
        assert_eq!(
            game.move_by(0, -1),
            vec![Event::Blocked {
                reason: BlockReason::Bounds,
                dir: Dir::Up
            }]
        );
    }

    #[test]
    fn collision_resolves_after_one_second() {
        let mut game = game_with_wall_below_start(1);
        game.step(Dir::Down);
        assert_eq!(game.session().phase, Phase::Blocked);
        assert!(game.tick(Duration::from_millis(900)).is_empty());
        let events = game.tick(Duration::from_millis(100));
        assert_eq!(game.session().phase, Phase::Playing);
        assert!(matches!(events.as_slice(), [Event::Moved { .. }]));
    }

    #[test]
    fn manual_resolve_disarms_clock_timer() {
        let mut game = game_with_wall_below_start(1);
        game.step(Dir::Down);
        assert!(!game.resolve_blocked_delay_elapsed().is_empty());
        assert_eq!(game.session().phase, Phase::Playing);
        assert!(game.tick(Duration::from_secs(2)).is_empty());
        assert!(game.resolve_blocked_delay_elapsed().is_empty());
    }

    #[test]
    fn timeout_during_collision_is_delivered_after_it() {
        let mut game = game_with_wall_below_start(3);
        game.tick(Duration::from_millis(299_500));
        game.step(Dir::Down);
        assert_eq!(game.session().phase, Phase::Blocked);

        // Budget runs out first, the collision resolves half a second later.
        assert!(game.tick(Duration::from_millis(500)).is_empty());
        assert_eq!(game.session().phase, Phase::Blocked);

        let events = game.tick(Duration::from_millis(500));
        assert_eq!(game.session().phase, Phase::GameOver);
        assert!(events.contains(&Event::TimeUp { level: 3 }));
        assert_eq!(events.last(), Some(&Event::GameOver));
    }

    #[test]
    fn level_budget_moves_to_next_level() {
        let (mut game, _) = Game::new(rng(), GameConfig::default());
        let events = game.tick(Duration::from_secs(300));
        assert_eq!(events[0], Event::TimeUp { level: 1 });
        assert_eq!(game.session().level, 2);
        assert_eq!(game.clock().remaining(), Some(Duration::from_secs(300)));
    }

    #[test]
    fn start_level_validates_index() {
        let (mut game, _) = Game::new(rng(), GameConfig::default());
        assert_eq!(game.start_level(0), Err(GameError::UnknownLevel(0)));
        let events = game.start_level(3).unwrap();
        assert!(matches!(
            events.as_slice(),
            [Event::LevelStarted {
                level: 3,
                grid_size: 10,
                ..
            }]
        ));
    }
}
