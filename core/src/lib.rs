#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Bunny Hop engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::{
    fmt,
    hash::{Hash, Hasher},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Bunny Hop.";

/// Scale applied to world coordinates before rounding to four decimal places.
const COORDINATE_SCALE: f32 = 10_000.0;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Appends an instruction to the end of the program being edited.
    AppendInstruction {
        /// Instruction the player placed.
        instruction: Instruction,
    },
    /// Removes the most recently appended instruction.
    UndoInstruction,
    /// Changes the iteration count stored on the program's loop start.
    SetLoopIterations {
        /// Number of times the loop body should repeat.
        iterations: LoopIterations,
    },
    /// Asks the world to validate and run the current program.
    RequestRun,
    /// Starts executing a flattened action trace.
    StartRun {
        /// Loop-free actions to dispatch, one per executor tick.
        trace: ActionTrace,
        /// Non-fatal loop diagnostic raised while flattening the program.
        diagnostic: Option<LoopError>,
    },
    /// Declines a run request because the program failed loop validation.
    RejectRun {
        /// Validation failure that blocked the run.
        error: LoopError,
    },
    /// Dispatches a single primitive action to the player.
    DispatchAction {
        /// Action to perform.
        action: Action,
    },
    /// Reports the player's current position as seen by the movement layer.
    ReportPosition {
        /// Interpolated world position of the player.
        position: WorldPoint,
    },
    /// Activates a pressure switch the player stepped on.
    ActivateSwitch {
        /// Identifier of the switch within the active level.
        switch: SwitchId,
    },
    /// Terminates the active run with the provided outcome.
    ConcludeRun {
        /// Outcome reached by the player.
        outcome: Outcome,
        /// Position the player snaps to when the run ends.
        at: WorldPoint,
    },
    /// Reports that every action of the trace was dispatched.
    FinishRun,
    /// Restores the active level to its initial editing state.
    ResetLevel,
    /// Moves on to the next level of the catalog after a completed run.
    AdvanceLevel,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that a level was (re)loaded and is ready for editing.
    LevelStarted {
        /// Identifier of the level within the catalog.
        level: LevelId,
        /// Cell the player starts on.
        start: WorldPoint,
        /// Cell the player must reach.
        goal: WorldPoint,
        /// Direction the player faces at the start.
        facing: Facing,
        /// Location of the obstacle, when the level has one.
        obstacle: Option<WorldPoint>,
        /// Locations of the switches guarding the obstacle.
        switches: Vec<WorldPoint>,
        /// Indicates whether loop instructions may be placed.
        loops_unlocked: bool,
    },
    /// Confirms that an instruction was placed into a program slot.
    InstructionAppended {
        /// Instruction that was placed.
        instruction: Instruction,
        /// Zero-based slot the instruction occupies.
        slot: usize,
    },
    /// Confirms that the last instruction was removed from the program.
    InstructionRemoved {
        /// Instruction that was removed.
        instruction: Instruction,
        /// Slot the instruction previously occupied.
        slot: usize,
    },
    /// Confirms that the loop start now carries a new iteration count.
    LoopIterationsChanged {
        /// Iteration count now stored on the loop start.
        iterations: LoopIterations,
    },
    /// Reports that an editing or progression request was ignored.
    EditRejected {
        /// Specific reason the request was declined.
        reason: EditRejection,
    },
    /// Publishes the program that should be flattened before running.
    RunRequested {
        /// Snapshot of the program at the time of the request.
        program: Vec<Instruction>,
    },
    /// Reports that a run request failed loop validation.
    RunRejected {
        /// Validation failure that blocked the run.
        error: LoopError,
    },
    /// Surfaces a non-fatal loop diagnostic raised while flattening the program.
    LoopNotice {
        /// Diagnostic the player should see.
        error: LoopError,
    },
    /// Confirms that execution of a trace began.
    RunStarted {
        /// Loop-free actions the executor should dispatch.
        trace: ActionTrace,
    },
    /// Confirms that an action was handed to the movement layer.
    ActionDispatched {
        /// Action that was dispatched.
        action: Action,
        /// Facing of the player after applying the action.
        facing: Facing,
        /// Position the movement starts from.
        from: WorldPoint,
        /// Position the movement ends at. Equal to `from` for turns.
        to: WorldPoint,
    },
    /// Relays a position update received from the movement layer.
    PlayerMoved {
        /// Latest world position of the player.
        position: WorldPoint,
    },
    /// Confirms that a switch was activated.
    SwitchActivated {
        /// Identifier of the activated switch.
        switch: SwitchId,
    },
    /// Announces that every switch is active and the obstacle is gone.
    ObstacleDeactivated,
    /// Announces that the active run ended.
    RunConcluded {
        /// Outcome of the run.
        outcome: Outcome,
        /// Position the player occupies once the run ended.
        position: WorldPoint,
    },
    /// Informs the player that the level can be solved with fewer blocks.
    FewerBlocksPossible {
        /// Number of program slots the player used.
        used: usize,
        /// Block budget advertised by the level.
        budget: u32,
    },
    /// Announces a transition of the game state machine.
    GameStateChanged {
        /// State before the transition.
        from: GameState,
        /// State after the transition.
        to: GameState,
    },
}

/// Overall state of a level run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameState {
    /// The program may be edited. Initial state of every level.
    #[default]
    Editing,
    /// A trace is being executed.
    Running,
    /// The player reached the goal.
    Complete,
    /// The player stepped onto a danger cell or an active obstacle.
    Failed,
    /// The trace ran out before the player reached the goal.
    Uncomplete,
}

/// Terminal result of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// The player reached the goal.
    Complete,
    /// The player hit a hazard.
    Failed {
        /// Hazard that ended the run.
        cause: FailureCause,
    },
    /// The trace ran out before the goal was reached.
    Uncomplete,
}

impl Outcome {
    /// Game state the outcome transitions into.
    #[must_use]
    pub const fn state(self) -> GameState {
        match self {
            Self::Complete => GameState::Complete,
            Self::Failed { .. } => GameState::Failed,
            Self::Uncomplete => GameState::Uncomplete,
        }
    }
}

/// Hazards that fail a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureCause {
    /// The player left the path.
    Danger,
    /// The player walked into the active obstacle.
    Obstacle,
}

/// Cardinal directions the player can face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    /// Toward decreasing `z`.
    North,
    /// Toward increasing `x`.
    East,
    /// Toward increasing `z`.
    South,
    /// Toward decreasing `x`.
    West,
}

impl Facing {
    /// Facing after a counter-clockwise quarter turn.
    #[must_use]
    pub const fn turned_left(self) -> Self {
        match self {
            Self::East => Self::North,
            Self::North => Self::West,
            Self::West => Self::South,
            Self::South => Self::East,
        }
    }

    /// Facing after a clockwise quarter turn.
    #[must_use]
    pub const fn turned_right(self) -> Self {
        match self {
            Self::East => Self::South,
            Self::South => Self::West,
            Self::West => Self::North,
            Self::North => Self::East,
        }
    }

    /// Unit offset along the `x` and `z` axes for one forward step.
    #[must_use]
    pub const fn unit_offset(self) -> (f32, f32) {
        match self {
            Self::North => (0.0, -1.0),
            Self::East => (1.0, 0.0),
            Self::South => (0.0, 1.0),
            Self::West => (-1.0, 0.0),
        }
    }
}

/// Primitive actions the executor can dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Hop one cell in the facing direction.
    Forward,
    /// Turn a quarter counter-clockwise.
    Left,
    /// Turn a quarter clockwise.
    Right,
}

/// Number of times a loop body repeats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum LoopIterations {
    /// Repeat the body twice.
    Two,
    /// Repeat the body three times.
    Three,
    /// Repeat the body four times.
    Four,
}

impl LoopIterations {
    /// Number of repetitions as a plain count.
    #[must_use]
    pub const fn count(self) -> usize {
        match self {
            Self::Two => 2,
            Self::Three => 3,
            Self::Four => 4,
        }
    }
}

impl TryFrom<u8> for LoopIterations {
    type Error = InvalidIterations;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            4 => Ok(Self::Four),
            other => Err(InvalidIterations(other)),
        }
    }
}

impl From<LoopIterations> for u8 {
    fn from(value: LoopIterations) -> Self {
        match value {
            LoopIterations::Two => 2,
            LoopIterations::Three => 3,
            LoopIterations::Four => 4,
        }
    }
}

/// Raised when an iteration count outside `2..=4` is requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("loops repeat 2, 3 or 4 times, not {0}")]
pub struct InvalidIterations(pub u8);

/// Single block of a program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Instruction {
    /// Hop one cell forward.
    Forward,
    /// Turn left.
    Left,
    /// Turn right.
    Right,
    /// Opens the loop region.
    LoopStart {
        /// Repetitions of the loop body, if one was selected.
        iterations: Option<LoopIterations>,
    },
    /// Closes the loop region.
    LoopEnd,
}

impl Instruction {
    /// Primitive action represented by the instruction, if any.
    #[must_use]
    pub const fn action(self) -> Option<Action> {
        match self {
            Self::Forward => Some(Action::Forward),
            Self::Left => Some(Action::Left),
            Self::Right => Some(Action::Right),
            Self::LoopStart { .. } | Self::LoopEnd => None,
        }
    }

    /// Reports whether the instruction opens a loop region.
    #[must_use]
    pub const fn is_loop_start(self) -> bool {
        matches!(self, Self::LoopStart { .. })
    }

    /// Reports whether the instruction closes a loop region.
    #[must_use]
    pub const fn is_loop_end(self) -> bool {
        matches!(self, Self::LoopEnd)
    }
}

impl From<Action> for Instruction {
    fn from(action: Action) -> Self {
        match action {
            Action::Forward => Self::Forward,
            Action::Left => Self::Left,
            Action::Right => Self::Right,
        }
    }
}

/// Loop-free sequence of primitive actions consumed by the executor.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionTrace {
    actions: Vec<Action>,
}

impl ActionTrace {
    /// Wraps the provided actions into a trace.
    #[must_use]
    pub fn new(actions: Vec<Action>) -> Self {
        Self { actions }
    }

    /// Actions in dispatch order.
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Action scheduled at the provided step, if any.
    #[must_use]
    pub fn get(&self, step: usize) -> Option<Action> {
        self.actions.get(step).copied()
    }

    /// Number of actions in the trace.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Reports whether the trace holds no actions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Consumes the trace, yielding the underlying actions.
    #[must_use]
    pub fn into_vec(self) -> Vec<Action> {
        self.actions
    }
}

/// Treatment of a loop whose markers enclose no actions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyLoopPolicy {
    /// Drop the markers, run the remaining actions and report the loop.
    #[default]
    Continue,
    /// Refuse to run until the loop holds at least one action.
    Reject,
}

/// Loop marker missing from an unbalanced program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unbalanced {
    /// A loop start has no matching loop end.
    Unterminated,
    /// A loop end has no matching loop start.
    NotOpened,
}

impl fmt::Display for Unbalanced {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unterminated => write!(f, "unterminated loop"),
            Self::NotOpened => write!(f, "loop not opened"),
        }
    }
}

/// Loop validation failures detected before a run starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum LoopError {
    /// Only one of the two loop markers is present.
    #[error("{0}")]
    UnbalancedLoop(Unbalanced),
    /// The loop end precedes the loop start.
    #[error("loop start must go before loop end")]
    MalformedLoopOrder,
    /// Nothing sits between the loop markers.
    #[error("loop is empty")]
    EmptyLoop,
    /// The loop start never received an iteration count.
    #[error("select how many times the loop repeats")]
    MissingIterationCount,
}

/// Reasons an editing or progression request is ignored by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum EditRejection {
    /// The program can only change while editing.
    #[error("the program can only be changed while editing")]
    NotEditing,
    /// Every program slot is in use.
    #[error("all {capacity} program slots are in use")]
    CapacityReached {
        /// Number of slots available to the program.
        capacity: usize,
    },
    /// Loops are not available on the current level.
    #[error("loops are not unlocked on this level")]
    LoopsLocked,
    /// The program already holds a loop start.
    #[error("the program already has a loop start")]
    LoopStartPresent,
    /// The program already holds a loop end.
    #[error("the program already has a loop end")]
    LoopEndPresent,
    /// Iterations were selected without a loop start in the program.
    #[error("the program has no loop start")]
    NoLoopStart,
    /// Undo was requested on an empty program.
    #[error("there is nothing to undo")]
    NothingToUndo,
    /// A run was requested for an empty program.
    #[error("the program is empty")]
    EmptyProgram,
    /// Advancing requires a completed level.
    #[error("the level is not complete")]
    NotComplete,
}

/// Identifier of a level within the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LevelId(u32);

impl LevelId {
    /// Creates a new level identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of a switch within its level, in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SwitchId(u32);

impl SwitchId {
    /// Creates a new switch identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(u32, u32)", into = "(u32, u32)")]
pub struct GridCell {
    column: u32,
    row: u32,
}

impl GridCell {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index, mapped onto the world `x` axis.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index, mapped onto the world `z` axis.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

impl From<(u32, u32)> for GridCell {
    fn from((column, row): (u32, u32)) -> Self {
        Self::new(column, row)
    }
}

impl From<GridCell> for (u32, u32) {
    fn from(cell: GridCell) -> Self {
        (cell.column, cell.row)
    }
}

/// Position on the ground plane, rounded to four decimal places.
///
/// Equality and hashing compare the rounded components, so two points built
/// from slightly different floating-point sums of the same grid step are
/// treated as the same location.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct WorldPoint {
    x: f32,
    z: f32,
}

impl WorldPoint {
    /// Creates a point, rounding both components.
    #[must_use]
    pub fn new(x: f32, z: f32) -> Self {
        Self {
            x: round_component(x),
            z: round_component(z),
        }
    }

    /// Component along the `x` axis.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Component along the `z` axis.
    #[must_use]
    pub const fn z(&self) -> f32 {
        self.z
    }

    /// Point displaced by the provided deltas.
    #[must_use]
    pub fn offset(self, dx: f32, dz: f32) -> Self {
        Self::new(self.x + dx, self.z + dz)
    }

    /// Reports whether both components lie within `tolerance` of `other`.
    #[must_use]
    pub fn within(self, other: WorldPoint, tolerance: f32) -> bool {
        (self.x - other.x).abs() <= tolerance && (self.z - other.z).abs() <= tolerance
    }

    fn key(self) -> (i64, i64) {
        (
            (self.x * COORDINATE_SCALE).round() as i64,
            (self.z * COORDINATE_SCALE).round() as i64,
        )
    }
}

impl PartialEq for WorldPoint {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for WorldPoint {}

impl Hash for WorldPoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

fn round_component(value: f32) -> f32 {
    (value * COORDINATE_SCALE).round() / COORDINATE_SCALE
}

/// Immutable description of a puzzle level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    path: Vec<GridCell>,
    #[serde(rename = "blocks")]
    block_budget: u32,
    #[serde(default)]
    obstacle: Option<usize>,
    #[serde(default)]
    switches: Vec<usize>,
    facing: Facing,
}

impl Level {
    /// Creates a level without an obstacle.
    #[must_use]
    pub fn new(path: Vec<GridCell>, block_budget: u32, facing: Facing) -> Self {
        Self {
            path,
            block_budget,
            obstacle: None,
            switches: Vec::new(),
            facing,
        }
    }

    /// Places an obstacle guarded by switches, all given as path indices.
    #[must_use]
    pub fn with_obstacle(mut self, obstacle: usize, switches: Vec<usize>) -> Self {
        self.obstacle = Some(obstacle);
        self.switches = switches;
        self
    }

    /// Ordered cells from start to goal.
    #[must_use]
    pub fn path(&self) -> &[GridCell] {
        &self.path
    }

    /// Advisory number of blocks an optimal solution uses.
    #[must_use]
    pub const fn block_budget(&self) -> u32 {
        self.block_budget
    }

    /// Path index of the obstacle, if the level has one.
    #[must_use]
    pub const fn obstacle(&self) -> Option<usize> {
        self.obstacle
    }

    /// Path indices of the switches guarding the obstacle.
    #[must_use]
    pub fn switches(&self) -> &[usize] {
        &self.switches
    }

    /// Direction the player faces at the start of the level.
    #[must_use]
    pub const fn facing(&self) -> Facing {
        self.facing
    }
}

/// Snapshot of a switch used by collision queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwitchSnapshot {
    /// Identifier of the switch within the level.
    pub id: SwitchId,
    /// World position of the switch.
    pub position: WorldPoint,
    /// Indicates whether the player already activated the switch.
    pub activated: bool,
}

/// Read-only view of the zones the collision detector evaluates.
#[derive(Clone, Debug)]
pub struct ZoneView<'a> {
    running: bool,
    goal: WorldPoint,
    danger: &'a [WorldPoint],
    obstacle: Option<WorldPoint>,
    switches: Vec<SwitchSnapshot>,
}

impl<'a> ZoneView<'a> {
    /// Captures a new zone view.
    ///
    /// `obstacle` must only be provided while the obstacle is active.
    #[must_use]
    pub fn new(
        running: bool,
        goal: WorldPoint,
        danger: &'a [WorldPoint],
        obstacle: Option<WorldPoint>,
        switches: Vec<SwitchSnapshot>,
    ) -> Self {
        Self {
            running,
            goal,
            danger,
            obstacle,
            switches,
        }
    }

    /// Reports whether a run is in progress.
    #[must_use]
    pub const fn running(&self) -> bool {
        self.running
    }

    /// Position of the goal cell.
    #[must_use]
    pub const fn goal(&self) -> WorldPoint {
        self.goal
    }

    /// Positions of every off-path cell.
    #[must_use]
    pub fn danger(&self) -> &'a [WorldPoint] {
        self.danger
    }

    /// Position of the obstacle while it is active.
    #[must_use]
    pub const fn active_obstacle(&self) -> Option<WorldPoint> {
        self.obstacle
    }

    /// Switches of the level in declaration order.
    #[must_use]
    pub fn switches(&self) -> &[SwitchSnapshot] {
        &self.switches
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Action, Facing, GridCell, Instruction, Level, LoopError, LoopIterations, Outcome,
        Unbalanced, WorldPoint,
    };
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn four_left_turns_restore_facing() {
        for facing in [Facing::North, Facing::East, Facing::South, Facing::West] {
            let turned = facing.turned_left().turned_left().turned_left().turned_left();
            assert_eq!(turned, facing);
            assert_eq!(facing.turned_left().turned_right(), facing);
        }
    }

    #[test]
    fn left_turn_from_east_faces_north() {
        assert_eq!(Facing::East.turned_left(), Facing::North);
        assert_eq!(Facing::East.turned_right(), Facing::South);
    }

    #[test]
    fn world_points_compare_rounded_components() {
        let summed = WorldPoint::new(-0.36 + 0.12 + 0.12 + 0.12, 0.0);
        let direct = WorldPoint::new(0.0, 0.0);
        assert_eq!(summed, direct);
        assert_ne!(WorldPoint::new(0.12, 0.0), WorldPoint::new(0.1201, 0.0));
    }

    #[test]
    fn within_uses_inclusive_per_axis_tolerance() {
        let goal = WorldPoint::new(0.12, -0.24);
        assert!(goal.within(WorldPoint::new(0.124, -0.236), 0.005));
        assert!(!goal.within(WorldPoint::new(0.12, -0.25), 0.005));
    }

    #[test]
    fn loop_iterations_reject_out_of_range_counts() {
        assert_eq!(LoopIterations::try_from(3), Ok(LoopIterations::Three));
        assert!(LoopIterations::try_from(1).is_err());
        assert!(LoopIterations::try_from(5).is_err());
        assert_eq!(LoopIterations::Four.count(), 4);
    }

    #[test]
    fn only_primitive_instructions_map_to_actions() {
        assert_eq!(Instruction::Left.action(), Some(Action::Left));
        assert_eq!(Instruction::LoopEnd.action(), None);
        assert_eq!(Instruction::LoopStart { iterations: None }.action(), None);
    }

    #[test]
    fn loop_errors_describe_the_missing_marker() {
        assert_eq!(
            LoopError::UnbalancedLoop(Unbalanced::NotOpened).to_string(),
            "loop not opened"
        );
        assert_eq!(
            LoopError::UnbalancedLoop(Unbalanced::Unterminated).to_string(),
            "unterminated loop"
        );
    }

    #[test]
    fn level_round_trips_through_bincode() {
        let level = Level::new(
            vec![GridCell::new(3, 4), GridCell::new(2, 4), GridCell::new(3, 3)],
            8,
            Facing::North,
        )
        .with_obstacle(2, vec![1]);
        assert_round_trip(&level);
    }

    #[test]
    fn instruction_round_trips_through_bincode() {
        assert_round_trip(&Instruction::LoopStart {
            iterations: Some(LoopIterations::Three),
        });
        assert_round_trip(&Outcome::Uncomplete);
    }
}
