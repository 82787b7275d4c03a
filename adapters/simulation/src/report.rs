//! Serializable summary of a played run.

use bunny_hop_core::{Action, Event, Facing, GameState, LevelId, Outcome, WorldPoint};
use bunny_hop_world::query;
use serde::Serialize;

use crate::Session;

/// Summary of a session's event log, suitable for printing or JSON output.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunReport {
    /// Level the run was played on.
    pub level: LevelId,
    /// Game state after the run settled.
    pub state: GameState,
    /// Outcome of the last concluded run, if any.
    pub outcome: Option<Outcome>,
    /// Final player position.
    pub position: WorldPoint,
    /// Final player facing.
    pub facing: Facing,
    /// Actions dispatched in order.
    pub dispatched: Vec<Action>,
    /// Program slots used by the run.
    pub slots_used: usize,
    /// Number of switches activated during the run.
    pub switches_activated: usize,
    /// Human-readable notices raised along the way.
    pub notices: Vec<String>,
}

impl RunReport {
    /// Builds a report from the session's current state and event log.
    #[must_use]
    pub fn from_session(session: &Session) -> Self {
        let world = session.world();
        let mut report = Self {
            level: query::level_id(world),
            state: query::game_state(world),
            outcome: None,
            position: query::player_position(world),
            facing: query::player_facing(world),
            dispatched: Vec::new(),
            slots_used: query::slots_used(world),
            switches_activated: 0,
            notices: Vec::new(),
        };

        for event in session.events() {
            match event {
                Event::ActionDispatched { action, .. } => report.dispatched.push(*action),
                Event::RunConcluded { outcome, .. } => report.outcome = Some(*outcome),
                Event::SwitchActivated { .. } => report.switches_activated += 1,
                Event::ObstacleDeactivated => {
                    report.notices.push("The obstacle is gone.".to_owned());
                }
                Event::EditRejected { reason } => {
                    report.notices.push(format!("Edit rejected: {reason}."));
                }
                Event::RunRejected { error } | Event::LoopNotice { error } => {
                    report.notices.push(format!("Loop problem: {error}."));
                }
                Event::FewerBlocksPossible { budget, .. } => report
                    .notices
                    .push(format!("You can also solve this with {budget} blocks.")),
                _ => {}
            }
        }

        report
    }
}
