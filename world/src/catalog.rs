//! Level catalog loading and validation.

use std::{collections::HashSet, time::Duration};

use bunny_hop_core::{EmptyLoopPolicy, Level, LevelId, LoopIterations};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{GridGeometry, MAX_DIMENSION};

const BUILTIN_CATALOG: &str = include_str!("../levels.toml");

/// Largest distance from a whole number of steps still accepted as one.
const GRID_SPAN_SLACK: f32 = 1e-3;

/// Engine settings shared by every level of a catalog.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Largest absolute axis value of the grid in world units.
    pub grid_half_extent: f32,
    /// Distance between neighbouring cells in world units.
    pub grid_step: f32,
    /// Per-axis distance within which the player counts as standing on a cell.
    pub collision_tolerance: f32,
    /// Number of program slots.
    pub program_capacity: usize,
    /// First level index on which loop markers may be placed.
    pub loop_unlock_level: u32,
    /// Leaves a new loop start without a count until the player picks one.
    pub require_iteration_selection: bool,
    /// Treatment of loops that enclose no actions.
    pub empty_loop: EmptyLoopPolicy,
    /// Milliseconds between executor dispatches.
    pub tick_interval_ms: u64,
    /// Milliseconds a single hop takes to animate.
    pub move_duration_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid_half_extent: 0.36,
            grid_step: 0.12,
            collision_tolerance: 0.005,
            program_capacity: 10,
            loop_unlock_level: 3,
            require_iteration_selection: false,
            empty_loop: EmptyLoopPolicy::Continue,
            tick_interval_ms: 1000,
            move_duration_ms: 500,
        }
    }
}

impl Settings {
    /// Iteration count assigned to a freshly placed loop start.
    #[must_use]
    pub const fn default_loop_iterations(&self) -> Option<LoopIterations> {
        if self.require_iteration_selection {
            None
        } else {
            Some(LoopIterations::Two)
        }
    }

    /// Interval between executor dispatches.
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Duration of a single hop animation.
    #[must_use]
    pub const fn move_duration(&self) -> Duration {
        Duration::from_millis(self.move_duration_ms)
    }

    /// Builds the grid geometry described by the settings.
    #[must_use]
    pub fn geometry(&self) -> GridGeometry {
        GridGeometry::build(self.grid_half_extent, self.grid_step)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if !is_positive(self.grid_step) {
            return Err(CatalogError::InvalidSettings("grid_step must be positive"));
        }
        if !is_positive(self.grid_half_extent) {
            return Err(CatalogError::InvalidSettings(
                "grid_half_extent must be positive",
            ));
        }
        let spans = 2.0 * self.grid_half_extent / self.grid_step;
        if (spans - spans.round()).abs() > GRID_SPAN_SLACK {
            return Err(CatalogError::InvalidSettings(
                "grid_half_extent must be a whole number of grid steps",
            ));
        }
        if spans.round() >= MAX_DIMENSION as f32 {
            return Err(CatalogError::InvalidSettings(
                "grid has too many cells per edge",
            ));
        }
        if !is_positive(self.collision_tolerance) || self.collision_tolerance >= self.grid_step / 2.0
        {
            return Err(CatalogError::InvalidSettings(
                "collision_tolerance must be positive and below half a grid step",
            ));
        }
        if self.program_capacity == 0 {
            return Err(CatalogError::InvalidSettings(
                "program_capacity must be positive",
            ));
        }
        if self.tick_interval_ms == 0 {
            return Err(CatalogError::InvalidSettings(
                "tick_interval_ms must be positive",
            ));
        }
        // A hop must land before the next action reads the player position.
        if self.move_duration_ms == 0 || self.move_duration_ms >= self.tick_interval_ms {
            return Err(CatalogError::InvalidSettings(
                "move_duration_ms must be positive and shorter than tick_interval_ms",
            ));
        }
        Ok(())
    }
}

fn is_positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

/// Reasons a level catalog is refused.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The TOML document could not be parsed.
    #[error("failed to parse level catalog: {0}")]
    Parse(#[from] toml::de::Error),
    /// The catalog declares no levels.
    #[error("the level catalog contains no levels")]
    NoLevels,
    /// A setting holds an unusable value.
    #[error("invalid settings: {0}")]
    InvalidSettings(&'static str),
    /// A path lists fewer than two cells.
    #[error("level {level} needs a path of at least two cells")]
    PathTooShort {
        /// Zero-based index of the offending level.
        level: usize,
    },
    /// A path cell lies outside the grid.
    #[error("level {level} uses cell ({column}, {row}) outside the grid")]
    CellOutOfBounds {
        /// Zero-based index of the offending level.
        level: usize,
        /// Column of the cell.
        column: u32,
        /// Row of the cell.
        row: u32,
    },
    /// A path visits the same cell twice.
    #[error("level {level} visits cell ({column}, {row}) more than once")]
    DuplicateCell {
        /// Zero-based index of the offending level.
        level: usize,
        /// Column of the cell.
        column: u32,
        /// Row of the cell.
        row: u32,
    },
    /// The level advertises a zero block budget.
    #[error("level {level} needs a block budget of at least one")]
    ZeroBudget {
        /// Zero-based index of the offending level.
        level: usize,
    },
    /// An obstacle or switch index does not point into the path.
    #[error("level {level} references path index {index} outside its path")]
    IndexOutOfPath {
        /// Zero-based index of the offending level.
        level: usize,
        /// Offending path index.
        index: usize,
    },
    /// Switches were declared without an obstacle to disable.
    #[error("level {level} declares switches without an obstacle")]
    SwitchesWithoutObstacle {
        /// Zero-based index of the offending level.
        level: usize,
    },
    /// An obstacle or switch sits on the start, the goal or another fixture.
    #[error("level {level} places a fixture on path index {index}, which is already taken")]
    FixtureOverlap {
        /// Zero-based index of the offending level.
        level: usize,
        /// Offending path index.
        index: usize,
    },
}

/// Validated, immutable collection of levels and their shared settings.
#[derive(Clone, Debug)]
pub struct LevelCatalog {
    settings: Settings,
    levels: Vec<Level>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    settings: Settings,
    #[serde(default)]
    levels: Vec<Level>,
}

impl LevelCatalog {
    /// Validates the provided levels against the settings.
    pub fn new(settings: Settings, levels: Vec<Level>) -> Result<Self, CatalogError> {
        settings.validate()?;
        if levels.is_empty() {
            return Err(CatalogError::NoLevels);
        }

        let geometry = settings.geometry();
        for (index, level) in levels.iter().enumerate() {
            validate_level(index, level, &geometry)?;
        }

        Ok(Self { settings, levels })
    }

    /// Parses and validates a catalog from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(contents)?;
        Self::new(file.settings, file.levels)
    }

    /// Loads the catalog that ships with the engine.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_toml_str(BUILTIN_CATALOG)
    }

    /// Settings shared by every level.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Levels in catalog order.
    #[must_use]
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Number of levels in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Always `false`; validation rejects empty catalogs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Level with the provided identifier, if it exists.
    #[must_use]
    pub fn level(&self, id: LevelId) -> Option<&Level> {
        usize::try_from(id.get())
            .ok()
            .and_then(|index| self.levels.get(index))
    }

    /// Index of the level that follows `index`, wrapping to the first level.
    #[must_use]
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.levels.len()
    }

    pub(crate) fn level_at(&self, index: usize) -> &Level {
        &self.levels[index % self.levels.len()]
    }
}

fn validate_level(index: usize, level: &Level, geometry: &GridGeometry) -> Result<(), CatalogError> {
    let path = level.path();
    if path.len() < 2 {
        return Err(CatalogError::PathTooShort { level: index });
    }
    if level.block_budget() == 0 {
        return Err(CatalogError::ZeroBudget { level: index });
    }

    let mut seen = HashSet::with_capacity(path.len());
    for cell in path {
        if !geometry.contains(*cell) {
            return Err(CatalogError::CellOutOfBounds {
                level: index,
                column: cell.column(),
                row: cell.row(),
            });
        }
        if !seen.insert(*cell) {
            return Err(CatalogError::DuplicateCell {
                level: index,
                column: cell.column(),
                row: cell.row(),
            });
        }
    }

    if level.obstacle().is_none() && !level.switches().is_empty() {
        return Err(CatalogError::SwitchesWithoutObstacle { level: index });
    }

    let goal_index = path.len() - 1;
    let mut occupied: HashSet<usize> = [0, goal_index].into_iter().collect();
    let fixtures = level.obstacle().into_iter().chain(level.switches().iter().copied());
    for fixture in fixtures {
        if fixture >= path.len() {
            return Err(CatalogError::IndexOutOfPath {
                level: index,
                index: fixture,
            });
        }
        if !occupied.insert(fixture) {
            return Err(CatalogError::FixtureOverlap {
                level: index,
                index: fixture,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bunny_hop_core::{Facing, GridCell};
    use std::collections::HashSet;

    fn straight_level() -> Level {
        Level::new(
            vec![GridCell::new(2, 3), GridCell::new(3, 3), GridCell::new(4, 3)],
            2,
            Facing::East,
        )
    }

    #[test]
    fn builtin_catalog_holds_nine_levels() {
        let catalog = LevelCatalog::builtin().expect("builtin catalog parses");
        assert_eq!(catalog.len(), 9);
        assert_eq!(catalog.settings(), &Settings::default());

        let first = catalog.level(LevelId::new(0)).expect("first level");
        assert_eq!(first.block_budget(), 2);
        assert_eq!(first.facing(), Facing::East);
        assert_eq!(first.path().len(), 3);

        let seventh = catalog.level(LevelId::new(6)).expect("seventh level");
        assert_eq!(seventh.obstacle(), Some(2));
        assert_eq!(seventh.switches(), &[1]);
    }

    #[test]
    fn builtin_levels_keep_danger_and_path_disjoint() {
        let catalog = LevelCatalog::builtin().expect("builtin catalog parses");
        let geometry = catalog.settings().geometry();
        for level in catalog.levels() {
            let path = geometry.resolve_path(level);
            assert_eq!(path.len(), level.path().len());
            let unique: HashSet<_> = path.iter().copied().collect();
            assert_eq!(unique.len(), path.len(), "path cells must be distinct");
            for point in geometry.danger_set(&path) {
                assert!(!unique.contains(&point));
            }
        }
    }

    #[test]
    fn next_index_wraps_to_first_level() {
        let catalog = LevelCatalog::builtin().expect("builtin catalog parses");
        assert_eq!(catalog.next_index(0), 1);
        assert_eq!(catalog.next_index(8), 0);
    }

    #[test]
    fn missing_settings_fall_back_to_defaults() {
        let catalog = LevelCatalog::from_toml_str(
            r#"
            [[levels]]
            path = [[0, 0], [0, 1]]
            blocks = 1
            facing = "south"
            "#,
        )
        .expect("catalog parses");
        assert_eq!(catalog.settings(), &Settings::default());
        assert_eq!(catalog.levels()[0].switches(), &[] as &[usize]);
    }

    #[test]
    fn rejects_empty_catalog() {
        assert!(matches!(
            LevelCatalog::new(Settings::default(), Vec::new()),
            Err(CatalogError::NoLevels)
        ));
    }

    #[test]
    fn rejects_short_paths() {
        let level = Level::new(vec![GridCell::new(0, 0)], 1, Facing::East);
        assert!(matches!(
            LevelCatalog::new(Settings::default(), vec![level]),
            Err(CatalogError::PathTooShort { level: 0 })
        ));
    }

    #[test]
    fn rejects_cells_outside_grid() {
        let level = Level::new(
            vec![GridCell::new(6, 6), GridCell::new(7, 6)],
            1,
            Facing::East,
        );
        assert!(matches!(
            LevelCatalog::new(Settings::default(), vec![level]),
            Err(CatalogError::CellOutOfBounds {
                level: 0,
                column: 7,
                row: 6
            })
        ));
    }

    #[test]
    fn rejects_duplicate_cells() {
        let level = Level::new(
            vec![GridCell::new(1, 1), GridCell::new(1, 2), GridCell::new(1, 1)],
            1,
            Facing::South,
        );
        assert!(matches!(
            LevelCatalog::new(Settings::default(), vec![straight_level(), level]),
            Err(CatalogError::DuplicateCell { level: 1, .. })
        ));
    }

    #[test]
    fn rejects_fixtures_outside_or_on_endpoints() {
        let outside = straight_level().with_obstacle(5, vec![1]);
        assert!(matches!(
            LevelCatalog::new(Settings::default(), vec![outside]),
            Err(CatalogError::IndexOutOfPath { index: 5, .. })
        ));

        let on_goal = straight_level().with_obstacle(2, vec![1]);
        assert!(matches!(
            LevelCatalog::new(Settings::default(), vec![on_goal]),
            Err(CatalogError::FixtureOverlap { index: 2, .. })
        ));
    }

    #[test]
    fn rejects_switches_without_obstacle() {
        let result = LevelCatalog::from_toml_str(
            r#"
            [[levels]]
            path = [[0, 0], [0, 1], [0, 2]]
            blocks = 2
            switches = [1]
            facing = "south"
            "#,
        );
        assert!(matches!(
            result,
            Err(CatalogError::SwitchesWithoutObstacle { level: 0 })
        ));
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(matches!(
            LevelCatalog::from_toml_str("levels = 3"),
            Err(CatalogError::Parse(_))
        ));
    }

    fn rejects_settings(settings: Settings, reason: &str) {
        match LevelCatalog::new(settings, vec![straight_level()]) {
            Err(CatalogError::InvalidSettings(message)) => {
                assert!(message.starts_with(reason), "unexpected reason: {message}");
            }
            other => panic!("settings should be refused: {other:?}"),
        }
    }

    #[test]
    fn rejects_zero_tick_interval() {
        rejects_settings(
            Settings {
                tick_interval_ms: 0,
                ..Settings::default()
            },
            "tick_interval_ms",
        );
    }

    #[test]
    fn rejects_hop_longer_than_tick() {
        rejects_settings(
            Settings {
                move_duration_ms: 1500,
                ..Settings::default()
            },
            "move_duration_ms",
        );
        rejects_settings(
            Settings {
                move_duration_ms: 1000,
                ..Settings::default()
            },
            "move_duration_ms",
        );
        rejects_settings(
            Settings {
                move_duration_ms: 0,
                ..Settings::default()
            },
            "move_duration_ms",
        );
    }

    #[test]
    fn accepts_hop_shorter_than_tick() {
        let settings = Settings {
            move_duration_ms: 900,
            ..Settings::default()
        };
        assert!(LevelCatalog::new(settings, vec![straight_level()]).is_ok());
    }

    #[test]
    fn rejects_non_positive_or_nan_grid_step() {
        for grid_step in [0.0, -0.12, f32::NAN] {
            rejects_settings(
                Settings {
                    grid_step,
                    ..Settings::default()
                },
                "grid_step",
            );
        }
    }

    #[test]
    fn rejects_non_positive_half_extent() {
        for grid_half_extent in [0.0, -0.36, f32::INFINITY] {
            rejects_settings(
                Settings {
                    grid_half_extent,
                    ..Settings::default()
                },
                "grid_half_extent must be positive",
            );
        }
    }

    #[test]
    fn rejects_extent_between_grid_steps() {
        rejects_settings(
            Settings {
                grid_half_extent: 0.33,
                ..Settings::default()
            },
            "grid_half_extent must be a whole number",
        );
    }

    #[test]
    fn rejects_oversized_grid() {
        rejects_settings(
            Settings {
                grid_half_extent: 1000.0,
                grid_step: 0.5,
                ..Settings::default()
            },
            "grid has too many cells",
        );
    }

    #[test]
    fn rejects_tolerance_outside_half_step() {
        for collision_tolerance in [0.0, 0.06, 0.2, f32::NAN] {
            rejects_settings(
                Settings {
                    collision_tolerance,
                    ..Settings::default()
                },
                "collision_tolerance",
            );
        }
    }

    #[test]
    fn rejects_zero_program_capacity() {
        rejects_settings(
            Settings {
                program_capacity: 0,
                ..Settings::default()
            },
            "program_capacity",
        );
    }
}
