#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Timed executor that dispatches one trace action per interval.

use std::time::Duration;

use bunny_hop_core::{ActionTrace, Command, Event};
use tracing::debug;

/// Configuration parameters required to construct the executor.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    interval: Duration,
}

impl Config {
    /// Creates a new configuration using the provided dispatch cadence.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

/// Pure system that walks the active trace in lock step with simulated time.
///
/// The first action is dispatched as soon as a run starts. Each later action
/// waits one full interval, and one further interval after the last action the
/// executor reports the run as finished. Only one command is produced per
/// `TimeAdvanced` event so a single long frame never skips a step.
#[derive(Debug)]
pub struct Executor {
    interval: Duration,
    accumulator: Duration,
    trace: Option<ActionTrace>,
    cursor: usize,
}

impl Executor {
    /// Creates a new executor using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            interval: config.interval,
            accumulator: Duration::ZERO,
            trace: None,
            cursor: 0,
        }
    }

    /// Indicates whether a trace is currently being executed.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.trace.is_some()
    }

    /// Index of the next action to dispatch.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Consumes world events and emits dispatch commands.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::RunStarted { trace } => self.start(trace.clone(), out),
                Event::TimeAdvanced { dt } => self.advance(*dt, out),
                Event::RunConcluded { .. } | Event::LevelStarted { .. } => self.cancel(),
                _ => {}
            }
        }
    }

    fn start(&mut self, trace: ActionTrace, out: &mut Vec<Command>) {
        debug!(steps = trace.len(), "executor armed");
        self.trace = Some(trace);
        self.cursor = 0;
        self.accumulator = Duration::ZERO;
        self.dispatch_next(out);
    }

    fn advance(&mut self, dt: Duration, out: &mut Vec<Command>) {
        if self.trace.is_none() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(dt);
        if self.accumulator < self.interval {
            return;
        }
        self.accumulator -= self.interval;
        self.dispatch_next(out);
    }

    fn dispatch_next(&mut self, out: &mut Vec<Command>) {
        let Some(trace) = self.trace.as_ref() else {
            return;
        };

        match trace.get(self.cursor) {
            Some(action) => {
                debug!(step = self.cursor, ?action, "dispatching action");
                self.cursor += 1;
                out.push(Command::DispatchAction { action });
            }
            None => {
                debug!(steps = self.cursor, "trace exhausted");
                self.cancel();
                out.push(Command::FinishRun);
            }
        }
    }

    fn cancel(&mut self) {
        self.trace = None;
        self.accumulator = Duration::ZERO;
    }
}
