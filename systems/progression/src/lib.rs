#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure progression system mapping the single play control onto run requests.

use bunny_hop_core::{Command, Event, GameState};
use tracing::debug;

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProgressionInput {
    /// Indicates whether the player pressed the play/retry/next control.
    pub play_pressed: bool,
}

impl ProgressionInput {
    /// Creates a new input descriptor with explicit field values.
    #[must_use]
    pub const fn new(play_pressed: bool) -> Self {
        Self { play_pressed }
    }
}

/// Progression system that follows the game state and answers the play control.
#[derive(Debug, Clone)]
pub struct Progression {
    state: GameState,
}

impl Default for Progression {
    fn default() -> Self {
        Self::new()
    }
}

impl Progression {
    /// Creates a new progression system instance.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: GameState::Editing,
        }
    }

    /// Game state last observed by the system.
    #[must_use]
    pub const fn state(&self) -> GameState {
        self.state
    }

    /// Consumes world events and adapter input to emit progression commands.
    pub fn handle(&mut self, events: &[Event], input: ProgressionInput, out: &mut Vec<Command>) {
        for event in events {
            if let Event::GameStateChanged { to, .. } = event {
                self.state = *to;
            }
        }

        if !input.play_pressed {
            return;
        }

        match self.state {
            GameState::Editing => out.push(Command::RequestRun),
            GameState::Running => debug!("play control ignored while running"),
            GameState::Complete => out.push(Command::AdvanceLevel),
            GameState::Failed | GameState::Uncomplete => out.push(Command::ResetLevel),
        }
    }
}
