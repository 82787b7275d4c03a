//! Single-threaded session that routes commands and events between the world
//! and every system.

use std::time::Duration;

use anyhow::{bail, Result};
use bunny_hop_core::{Command, Event, GameState, Instruction, LevelId};
use bunny_hop_system_collision::{self as collision, CollisionDetector};
use bunny_hop_system_executor::{self as executor, Executor};
use bunny_hop_system_expansion::Expander;
use bunny_hop_system_progression::{Progression, ProgressionInput};
use bunny_hop_world::{self as world, query, LevelCatalog, World};
use tracing::trace;

use crate::Animator;

/// Owns the world together with the systems reacting to it.
///
/// Every entry point pumps commands until no system has anything left to say,
/// so callers always observe a settled world.
#[derive(Debug)]
pub struct Session {
    world: World,
    expander: Expander,
    executor: Executor,
    collision: CollisionDetector,
    progression: Progression,
    animator: Animator,
    log: Vec<Event>,
}

impl Session {
    /// Creates a session on the first level of the catalog.
    #[must_use]
    pub fn new(catalog: LevelCatalog) -> Self {
        Self::at_level(catalog, LevelId::new(0))
    }

    /// Creates a session on the provided level.
    #[must_use]
    pub fn at_level(catalog: LevelCatalog, level: LevelId) -> Self {
        let settings = *catalog.settings();
        Self {
            world: World::at_level(catalog, level),
            expander: Expander::new(settings.empty_loop),
            executor: Executor::new(executor::Config::new(settings.tick_interval())),
            collision: CollisionDetector::new(collision::Config::new(
                settings.collision_tolerance,
            )),
            progression: Progression::new(),
            animator: Animator::new(settings.move_duration()),
            log: Vec::new(),
        }
    }

    /// Read-only access to the authoritative world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Every event emitted since the session started or was last drained.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.log
    }

    /// Drains the event log.
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.log)
    }

    /// Applies a command and pumps the resulting cascade to completion.
    pub fn submit(&mut self, command: Command) {
        match command {
            Command::Tick { dt } => self.advance(dt),
            command => self.pump(vec![command]),
        }
    }

    /// Appends every instruction of `program` to the editor.
    pub fn load_program(&mut self, program: &[Instruction]) {
        for instruction in program {
            self.submit(Command::AppendInstruction {
                instruction: *instruction,
            });
        }
    }

    /// Forwards a press of the play/retry/next control.
    pub fn press_play(&mut self) {
        let mut commands = Vec::new();
        self.progression
            .handle(&[], ProgressionInput::new(true), &mut commands);
        self.pump(commands);
    }

    /// Advances simulated time by one frame.
    ///
    /// Movement for the frame settles first, so a collision that ends the run
    /// cancels the executor before it sees the same frame.
    pub fn advance(&mut self, dt: Duration) {
        let mut tick_events = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt }, &mut tick_events);
        self.log.extend(tick_events.iter().cloned());

        let mut movement = Vec::new();
        self.animator.handle(&tick_events, &mut movement);
        self.pump(movement);

        let mut scheduled = Vec::new();
        self.executor.handle(&tick_events, &mut scheduled);
        self.pump(scheduled);
    }

    /// Advances time in `frame` steps until the current run concludes.
    ///
    /// Returns immediately when no run is in progress and fails when the run is
    /// still going after `limit` of simulated time.
    pub fn run_until_settled(&mut self, frame: Duration, limit: Duration) -> Result<GameState> {
        if frame.is_zero() {
            bail!("frame duration must be positive");
        }

        let mut elapsed = Duration::ZERO;
        while query::game_state(&self.world) == GameState::Running {
            if elapsed >= limit {
                bail!("run still in progress after {limit:?} of simulated time");
            }
            self.advance(frame);
            elapsed = elapsed.saturating_add(frame);
        }

        Ok(query::game_state(&self.world))
    }

    fn pump(&mut self, initial: Vec<Command>) {
        let mut commands = initial;

        while !commands.is_empty() {
            let mut events = Vec::new();
            for command in commands.drain(..) {
                trace!(?command, "applying command");
                world::apply(&mut self.world, command, &mut events);
            }
            self.log.extend(events.iter().cloned());

            self.expander.handle(&events, &mut commands);
            self.executor.handle(&events, &mut commands);
            self.animator.handle(&events, &mut commands);
            self.collision
                .handle(&events, &query::zone_view(&self.world), &mut commands);
            self.progression
                .handle(&events, ProgressionInput::default(), &mut commands);
        }
    }
}
