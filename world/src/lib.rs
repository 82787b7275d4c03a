#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state management for Bunny Hop.
//!
//! The world owns everything a level run mutates: the program being edited,
//! the trace being executed, the player's position and facing, switch and
//! obstacle flags, and the game state machine. It changes only through
//! [`apply`], one command at a time.

mod catalog;
mod geometry;
mod program;

use bunny_hop_core::{
    Action, ActionTrace, Command, EditRejection, Event, Facing, GameState, Level, LevelId,
    Outcome, SwitchId, WorldPoint, WELCOME_BANNER,
};
use tracing::{debug, info};

pub use catalog::{CatalogError, LevelCatalog, Settings};
pub use geometry::{GridGeometry, LevelLayout, MAX_DIMENSION};
pub use program::{LoopGate, Program};

/// Represents the authoritative Bunny Hop session state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    catalog: LevelCatalog,
    geometry: GridGeometry,
    level_index: usize,
    level: Level,
    layout: LevelLayout,
    state: GameState,
    program: Program,
    trace: Option<ActionTrace>,
    player: Player,
    switches: Vec<bool>,
    obstacle_active: bool,
}

impl World {
    /// Creates a world positioned on the first level of the catalog.
    #[must_use]
    pub fn new(catalog: LevelCatalog) -> Self {
        Self::at_level(catalog, LevelId::new(0))
    }

    /// Creates a world positioned on the provided level.
    ///
    /// Identifiers past the end of the catalog wrap around.
    #[must_use]
    pub fn at_level(catalog: LevelCatalog, level: LevelId) -> Self {
        let settings = *catalog.settings();
        let geometry = settings.geometry();
        let level_index = usize::try_from(level.get()).unwrap_or(0) % catalog.len();
        let level = catalog.level_at(level_index).clone();
        let layout = LevelLayout::build(&geometry, &level);
        let player = Player {
            position: layout.start(),
            facing: level.facing(),
        };

        Self {
            banner: WELCOME_BANNER,
            switches: vec![false; layout.switches().len()],
            obstacle_active: layout.obstacle().is_some(),
            program: Program::with_capacity(settings.program_capacity),
            trace: None,
            state: GameState::Editing,
            catalog,
            geometry,
            level_index,
            level,
            layout,
            player,
        }
    }

    fn level_id(&self) -> LevelId {
        LevelId::new(u32::try_from(self.level_index).unwrap_or(u32::MAX))
    }

    fn loops_unlocked(&self) -> bool {
        self.level_id().get() >= self.catalog.settings().loop_unlock_level
    }

    fn loop_gate(&self) -> LoopGate {
        LoopGate {
            unlocked: self.loops_unlocked(),
            default_iterations: self.catalog.settings().default_loop_iterations(),
        }
    }

    fn load_level(&mut self, index: usize, out_events: &mut Vec<Event>) {
        self.level_index = index;
        self.level = self.catalog.level_at(index).clone();
        self.layout = LevelLayout::build(&self.geometry, &self.level);
        self.program.reset();
        self.trace = None;
        self.switches = vec![false; self.layout.switches().len()];
        self.obstacle_active = self.layout.obstacle().is_some();
        self.player = Player {
            position: self.layout.start(),
            facing: self.level.facing(),
        };
        self.transition(GameState::Editing, out_events);

        info!(level = index, "level started");
        out_events.push(Event::LevelStarted {
            level: self.level_id(),
            start: self.layout.start(),
            goal: self.layout.goal(),
            facing: self.level.facing(),
            obstacle: self.layout.obstacle(),
            switches: self.layout.switches().to_vec(),
            loops_unlocked: self.loops_unlocked(),
        });
    }

    fn transition(&mut self, to: GameState, out_events: &mut Vec<Event>) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        info!(?from, ?to, "game state changed");
        out_events.push(Event::GameStateChanged { from, to });
    }

    fn reject(&self, reason: EditRejection, out_events: &mut Vec<Event>) {
        debug!(%reason, state = ?self.state, "request ignored");
        out_events.push(Event::EditRejected { reason });
    }

    fn conclude(&mut self, outcome: Outcome, at: WorldPoint, out_events: &mut Vec<Event>) {
        let used = self.program.slots_used();
        self.player.position = at;
        self.program.clear_instructions();
        self.trace = None;
        self.transition(outcome.state(), out_events);

        info!(?outcome, used, "run concluded");
        out_events.push(Event::RunConcluded {
            outcome,
            position: at,
        });

        let budget = self.level.block_budget();
        if outcome == Outcome::Complete && used > usize::try_from(budget).unwrap_or(usize::MAX) {
            info!(budget, "you can also solve this with {budget} blocks");
            out_events.push(Event::FewerBlocksPossible { used, budget });
        }
    }

    fn dispatch(&mut self, action: Action, out_events: &mut Vec<Event>) {
        let from = self.player.position;
        let to = match action {
            Action::Forward => {
                let (dx, dz) = self.player.facing.unit_offset();
                let step = self.geometry.step();
                from.offset(dx * step, dz * step)
            }
            Action::Left => {
                self.player.facing = self.player.facing.turned_left();
                from
            }
            Action::Right => {
                self.player.facing = self.player.facing.turned_right();
                from
            }
        };

        out_events.push(Event::ActionDispatched {
            action,
            facing: self.player.facing,
            from,
            to,
        });
    }

    fn activate_switch(&mut self, index: usize, out_events: &mut Vec<Event>) {
        let Some(activated) = self.switches.get_mut(index) else {
            return;
        };
        if *activated {
            return;
        }
        *activated = true;
        out_events.push(Event::SwitchActivated {
            switch: SwitchId::new(u32::try_from(index).unwrap_or(u32::MAX)),
        });

        if self.obstacle_active && self.switches.iter().all(|flag| *flag) {
            self.obstacle_active = false;
            info!("obstacle deactivated");
            out_events.push(Event::ObstacleDeactivated);
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => out_events.push(Event::TimeAdvanced { dt }),
        Command::AppendInstruction { instruction } => {
            if world.state != GameState::Editing {
                world.reject(EditRejection::NotEditing, out_events);
                return;
            }
            let gate = world.loop_gate();
            match world.program.append(instruction, gate) {
                Ok((slot, instruction)) => {
                    out_events.push(Event::InstructionAppended { instruction, slot });
                }
                Err(reason) => world.reject(reason, out_events),
            }
        }
        Command::UndoInstruction => {
            if world.state != GameState::Editing {
                world.reject(EditRejection::NotEditing, out_events);
                return;
            }
            match world.program.undo() {
                Ok((slot, instruction)) => {
                    out_events.push(Event::InstructionRemoved { instruction, slot });
                }
                Err(reason) => world.reject(reason, out_events),
            }
        }
        Command::SetLoopIterations { iterations } => {
            if world.state != GameState::Editing {
                world.reject(EditRejection::NotEditing, out_events);
                return;
            }
            if !world.loops_unlocked() {
                world.reject(EditRejection::LoopsLocked, out_events);
                return;
            }
            match world.program.set_loop_iterations(iterations) {
                Ok(()) => out_events.push(Event::LoopIterationsChanged { iterations }),
                Err(reason) => world.reject(reason, out_events),
            }
        }
        Command::RequestRun => {
            if world.state != GameState::Editing {
                world.reject(EditRejection::NotEditing, out_events);
                return;
            }
            if world.program.is_empty() {
                world.reject(EditRejection::EmptyProgram, out_events);
                return;
            }
            out_events.push(Event::RunRequested {
                program: world.program.instructions().to_vec(),
            });
        }
        Command::RejectRun { error } => {
            if world.state != GameState::Editing {
                return;
            }
            debug!(%error, "run rejected");
            out_events.push(Event::RunRejected { error });
        }
        Command::StartRun { trace, diagnostic } => {
            if world.state != GameState::Editing {
                debug!(state = ?world.state, "stale run start ignored");
                return;
            }
            if let Some(error) = diagnostic {
                info!(%error, "loop notice");
                out_events.push(Event::LoopNotice { error });
            }
            if trace.is_empty() {
                world.transition(GameState::Running, out_events);
                let position = world.player.position;
                world.conclude(Outcome::Uncomplete, position, out_events);
                return;
            }
            world.trace = Some(trace.clone());
            world.transition(GameState::Running, out_events);
            out_events.push(Event::RunStarted { trace });
        }
        Command::DispatchAction { action } => {
            if world.state != GameState::Running {
                debug!(?action, state = ?world.state, "dispatch outside a run ignored");
                return;
            }
            world.dispatch(action, out_events);
        }
        Command::ReportPosition { position } => {
            world.player.position = position;
            out_events.push(Event::PlayerMoved { position });
        }
        Command::ActivateSwitch { switch } => {
            if world.state != GameState::Running {
                return;
            }
            if let Ok(index) = usize::try_from(switch.get()) {
                world.activate_switch(index, out_events);
            }
        }
        Command::ConcludeRun { outcome, at } => {
            if world.state != GameState::Running {
                return;
            }
            world.conclude(outcome, at, out_events);
        }
        Command::FinishRun => {
            if world.state != GameState::Running {
                return;
            }
            let position = world.player.position;
            world.conclude(Outcome::Uncomplete, position, out_events);
        }
        Command::ResetLevel => {
            let index = world.level_index;
            world.load_level(index, out_events);
        }
        Command::AdvanceLevel => {
            if world.state != GameState::Complete {
                world.reject(EditRejection::NotComplete, out_events);
                return;
            }
            let next = world.catalog.next_index(world.level_index);
            world.load_level(next, out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use bunny_hop_core::{
        ActionTrace, Facing, GameState, Instruction, Level, LevelId, SwitchId, SwitchSnapshot,
        WorldPoint, ZoneView,
    };

    use super::{LevelCatalog, LevelLayout, Settings, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the level catalog.
    #[must_use]
    pub fn catalog(world: &World) -> &LevelCatalog {
        &world.catalog
    }

    /// Settings shared by every level.
    #[must_use]
    pub fn settings(world: &World) -> &Settings {
        world.catalog.settings()
    }

    /// Identifier of the active level.
    #[must_use]
    pub fn level_id(world: &World) -> LevelId {
        world.level_id()
    }

    /// Definition of the active level.
    #[must_use]
    pub fn level(world: &World) -> &Level {
        &world.level
    }

    /// World-space layout of the active level.
    #[must_use]
    pub fn layout(world: &World) -> &LevelLayout {
        &world.layout
    }

    /// Current state of the game state machine.
    #[must_use]
    pub fn game_state(world: &World) -> GameState {
        world.state
    }

    /// Instructions of the program being edited.
    #[must_use]
    pub fn program(world: &World) -> &[Instruction] {
        world.program.instructions()
    }

    /// Number of program slots in use.
    #[must_use]
    pub fn slots_used(world: &World) -> usize {
        world.program.slots_used()
    }

    /// Trace of the active run, if any.
    #[must_use]
    pub fn trace(world: &World) -> Option<&ActionTrace> {
        world.trace.as_ref()
    }

    /// Last position reported for the player.
    #[must_use]
    pub fn player_position(world: &World) -> WorldPoint {
        world.player.position
    }

    /// Direction the player currently faces.
    #[must_use]
    pub fn player_facing(world: &World) -> Facing {
        world.player.facing
    }

    /// Indicates whether loop markers may be placed on the active level.
    #[must_use]
    pub fn loops_unlocked(world: &World) -> bool {
        world.loops_unlocked()
    }

    /// Indicates whether the obstacle still blocks its cell.
    #[must_use]
    pub fn obstacle_active(world: &World) -> bool {
        world.obstacle_active
    }

    /// Activation flags of the level's switches in declaration order.
    #[must_use]
    pub fn switches_activated(world: &World) -> &[bool] {
        &world.switches
    }

    /// Captures the zones evaluated by collision detection.
    #[must_use]
    pub fn zone_view(world: &World) -> ZoneView<'_> {
        let switches = world
            .layout
            .switches()
            .iter()
            .zip(world.switches.iter())
            .enumerate()
            .map(|(index, (position, activated))| SwitchSnapshot {
                id: SwitchId::new(u32::try_from(index).unwrap_or(u32::MAX)),
                position: *position,
                activated: *activated,
            })
            .collect();
        let obstacle = if world.obstacle_active {
            world.layout.obstacle()
        } else {
            None
        };

        ZoneView::new(
            world.state == GameState::Running,
            world.layout.goal(),
            world.layout.danger(),
            obstacle,
            switches,
        )
    }
}

#[derive(Clone, Copy, Debug)]
struct Player {
    position: WorldPoint,
    facing: Facing,
}
