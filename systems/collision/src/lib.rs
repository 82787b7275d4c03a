#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure collision system that resolves player positions against level zones.

use bunny_hop_core::{Command, Event, FailureCause, Outcome, SwitchId, WorldPoint, ZoneView};
use tracing::debug;

/// Configuration parameters required to construct the collision detector.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    tolerance: f32,
}

impl Config {
    /// Creates a new configuration using the provided per-axis tolerance.
    #[must_use]
    pub const fn new(tolerance: f32) -> Self {
        Self { tolerance }
    }
}

/// Zone a player position falls into.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Contact {
    /// The position lies on the goal.
    Goal(WorldPoint),
    /// The position lies on an off-path cell.
    Danger(WorldPoint),
    /// The position lies on the active obstacle.
    Obstacle(WorldPoint),
}

impl Contact {
    /// Outcome and resolved position of a run ending on this contact.
    #[must_use]
    pub const fn conclusion(self) -> (Outcome, WorldPoint) {
        match self {
            Self::Goal(at) => (Outcome::Complete, at),
            Self::Danger(at) => (
                Outcome::Failed {
                    cause: FailureCause::Danger,
                },
                at,
            ),
            Self::Obstacle(at) => (
                Outcome::Failed {
                    cause: FailureCause::Obstacle,
                },
                at,
            ),
        }
    }
}

/// Pure system that turns player movement into switch and conclusion commands.
#[derive(Debug)]
pub struct CollisionDetector {
    tolerance: f32,
}

impl CollisionDetector {
    /// Creates a new collision detector using the supplied configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self {
            tolerance: config.tolerance,
        }
    }

    /// Classifies a position, checking goal, danger and obstacle in that order.
    ///
    /// `obstacle` must be `None` once the obstacle has been deactivated.
    #[must_use]
    pub fn classify(
        &self,
        position: WorldPoint,
        goal: WorldPoint,
        danger: &[WorldPoint],
        obstacle: Option<WorldPoint>,
    ) -> Option<Contact> {
        if position.within(goal, self.tolerance) {
            return Some(Contact::Goal(goal));
        }

        if let Some(cell) = danger
            .iter()
            .find(|cell| position.within(**cell, self.tolerance))
        {
            return Some(Contact::Danger(*cell));
        }

        obstacle
            .filter(|obstacle| position.within(*obstacle, self.tolerance))
            .map(Contact::Obstacle)
    }

    /// Consumes world events and the zone view to emit collision commands.
    ///
    /// Switch activations for a position are emitted before any conclusion so
    /// the obstacle is lifted before it is tested. Processing stops at the
    /// first conclusion in the batch.
    pub fn handle(&self, events: &[Event], zones: &ZoneView<'_>, out: &mut Vec<Command>) {
        if !zones.running() {
            return;
        }

        let mut activated: Vec<SwitchId> = Vec::new();

        for event in events {
            let Event::PlayerMoved { position } = event else {
                continue;
            };

            for switch in zones.switches() {
                if switch.activated || activated.contains(&switch.id) {
                    continue;
                }
                if position.within(switch.position, self.tolerance) {
                    debug!(switch = switch.id.get(), "switch reached");
                    activated.push(switch.id);
                    out.push(Command::ActivateSwitch { switch: switch.id });
                }
            }

            let all_switches_on = zones
                .switches()
                .iter()
                .all(|switch| switch.activated || activated.contains(&switch.id));
            let obstacle = if all_switches_on && !zones.switches().is_empty() {
                None
            } else {
                zones.active_obstacle()
            };

            if let Some(contact) =
                self.classify(*position, zones.goal(), zones.danger(), obstacle)
            {
                let (outcome, at) = contact.conclusion();
                debug!(?outcome, "run concluded by collision");
                out.push(Command::ConcludeRun { outcome, at });
                return;
            }
        }
    }
}
