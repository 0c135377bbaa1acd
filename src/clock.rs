//! Turns elapsed wall time into `Timeout` and `ResolveBlocked` intents.

use std::time::Duration;

use crate::session::{Command, Intent, Ticket};

#[derive(Debug, Clone, Default)]
pub struct Clock {
    remaining: Option<Duration>,
    expired: bool,
    timers: Vec<(Ticket, Duration)>,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, command: &Command) {
        match *command {
            Command::ResetClock { budget } => {
                self.remaining = Some(budget);
                self.expired = false;
            }
            Command::StopClock => {
                self.remaining = None;
                self.expired = false;
                self.timers.clear();
            }
            Command::ArmResolve { ticket, delay } => {
                self.timers.retain(|(t, _)| *t != ticket);
                self.timers.push((ticket, delay));
            }
            Command::CancelResolve { ticket } => {
                self.timers.retain(|(t, _)| *t != ticket);
            }
        }
    }

    /// Moves time forward by `dt` and returns what came due, resolves first.
    /// The level budget yields a single `Timeout` until the clock is reset.
    pub fn advance(&mut self, dt: Duration) -> Vec<Intent> {
        let mut due = Vec::new();

        let mut pending = Vec::with_capacity(self.timers.len());
        for (ticket, left) in self.timers.drain(..) {
            match left.checked_sub(dt) {
                Some(rest) if !rest.is_zero() => pending.push((ticket, rest)),
                _ => due.push(Intent::ResolveBlocked(ticket)),
            }
        }
        self.timers = pending;

        if let Some(left) = self.remaining {
            let rest = left.saturating_sub(dt);
            self.remaining = Some(rest);
            if rest.is_zero() && !self.expired {
                self.expired = true;
                due.push(Intent::Timeout);
            }
        }
        due
    }

    /// Time left on the level budget, `None` while stopped.
    pub fn remaining(&self) -> Option<Duration> {
        self.remaining
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }
}
