//! Grid geometry that places level paths in world space.

use std::collections::HashSet;

use bunny_hop_core::{GridCell, Level, WorldPoint};

/// Largest number of cells along a grid edge.
pub const MAX_DIMENSION: usize = 64;

/// Square grid of world positions centred on the origin.
///
/// Axis values run from `-half_extent` to `half_extent` in `step` increments
/// and are rounded to four decimal places. Column indices map onto the `x`
/// axis and row indices onto the `z` axis.
#[derive(Clone, Debug)]
pub struct GridGeometry {
    step: f32,
    axis: Vec<f32>,
    points: Vec<WorldPoint>,
}

impl GridGeometry {
    /// Enumerates the grid row-major over `[-half_extent, half_extent]`.
    ///
    /// Edges are capped at [`MAX_DIMENSION`] cells.
    #[must_use]
    pub fn build(half_extent: f32, step: f32) -> Self {
        let axis: Vec<f32> = if step > 0.0 && half_extent.is_finite() && half_extent >= 0.0 {
            let spans = ((2.0 * half_extent) / step).round();
            let count = if spans < MAX_DIMENSION as f32 {
                spans as usize + 1
            } else {
                MAX_DIMENSION
            };
            (0..count)
                .map(|index| WorldPoint::new(-half_extent + index as f32 * step, 0.0).x())
                .collect()
        } else {
            Vec::new()
        };

        let mut points = Vec::with_capacity(axis.len() * axis.len());
        for &x in &axis {
            for &z in &axis {
                points.push(WorldPoint::new(x, z));
            }
        }

        Self { step, axis, points }
    }

    /// Number of cells along each edge.
    #[must_use]
    pub fn dimension(&self) -> u32 {
        u32::try_from(self.axis.len()).unwrap_or(u32::MAX)
    }

    /// Distance between neighbouring cells in world units.
    #[must_use]
    pub const fn step(&self) -> f32 {
        self.step
    }

    /// Every grid position in row-major order.
    #[must_use]
    pub fn points(&self) -> &[WorldPoint] {
        &self.points
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub fn contains(&self, cell: GridCell) -> bool {
        self.point(cell).is_some()
    }

    /// World position of the provided cell.
    #[must_use]
    pub fn point(&self, cell: GridCell) -> Option<WorldPoint> {
        let x = self.axis.get(usize::try_from(cell.column()).ok()?)?;
        let z = self.axis.get(usize::try_from(cell.row()).ok()?)?;
        Some(WorldPoint::new(*x, *z))
    }

    /// Maps the level path onto world positions, preserving path order.
    ///
    /// Cells outside the grid are skipped; catalog validation rejects them
    /// before a level can be loaded.
    #[must_use]
    pub fn resolve_path(&self, level: &Level) -> Vec<WorldPoint> {
        level
            .path()
            .iter()
            .filter_map(|cell| self.point(*cell))
            .collect()
    }

    /// Grid positions that are not part of the path.
    #[must_use]
    pub fn danger_set(&self, path: &[WorldPoint]) -> Vec<WorldPoint> {
        let on_path: HashSet<WorldPoint> = path.iter().copied().collect();
        self.points
            .iter()
            .copied()
            .filter(|point| !on_path.contains(point))
            .collect()
    }
}

/// World-space layout of a single level.
#[derive(Clone, Debug)]
pub struct LevelLayout {
    path: Vec<WorldPoint>,
    danger: Vec<WorldPoint>,
    start: WorldPoint,
    goal: WorldPoint,
    obstacle: Option<WorldPoint>,
    switches: Vec<WorldPoint>,
}

impl LevelLayout {
    /// Resolves the path, danger set, obstacle and switches of the level.
    #[must_use]
    pub fn build(geometry: &GridGeometry, level: &Level) -> Self {
        let path = geometry.resolve_path(level);
        let danger = geometry.danger_set(&path);
        let origin = WorldPoint::new(0.0, 0.0);
        let start = path.first().copied().unwrap_or(origin);
        let goal = path.last().copied().unwrap_or(start);
        let obstacle = level
            .obstacle()
            .and_then(|index| path.get(index).copied());
        let switches = level
            .switches()
            .iter()
            .filter_map(|index| path.get(*index).copied())
            .collect();

        Self {
            path,
            danger,
            start,
            goal,
            obstacle,
            switches,
        }
    }

    /// Path positions from start to goal.
    #[must_use]
    pub fn path(&self) -> &[WorldPoint] {
        &self.path
    }

    /// Positions of every off-path cell.
    #[must_use]
    pub fn danger(&self) -> &[WorldPoint] {
        &self.danger
    }

    /// Position the player starts on.
    #[must_use]
    pub const fn start(&self) -> WorldPoint {
        self.start
    }

    /// Position the player must reach.
    #[must_use]
    pub const fn goal(&self) -> WorldPoint {
        self.goal
    }

    /// Position of the obstacle, if the level has one.
    #[must_use]
    pub const fn obstacle(&self) -> Option<WorldPoint> {
        self.obstacle
    }

    /// Positions of the switches in declaration order.
    #[must_use]
    pub fn switches(&self) -> &[WorldPoint] {
        &self.switches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bunny_hop_core::Facing;

    fn geometry() -> GridGeometry {
        GridGeometry::build(0.36, 0.12)
    }

    #[test]
    fn builds_seven_by_seven_grid() {
        let geometry = geometry();
        assert_eq!(geometry.dimension(), 7);
        assert_eq!(geometry.points().len(), 49);
        assert_eq!(geometry.points()[0], WorldPoint::new(-0.36, -0.36));
        assert_eq!(geometry.points()[1], WorldPoint::new(-0.36, -0.24));
        assert_eq!(geometry.points()[48], WorldPoint::new(0.36, 0.36));
    }

    #[test]
    fn oversized_grid_is_capped() {
        let geometry = GridGeometry::build(1000.0, 0.001);
        assert_eq!(geometry.dimension() as usize, MAX_DIMENSION);
        assert_eq!(geometry.points().len(), MAX_DIMENSION * MAX_DIMENSION);
    }

    #[test]
    fn grid_points_are_pairwise_distinct() {
        let geometry = geometry();
        let unique: HashSet<WorldPoint> = geometry.points().iter().copied().collect();
        assert_eq!(unique.len(), geometry.points().len());
    }

    #[test]
    fn columns_map_to_x_and_rows_to_z() {
        let geometry = geometry();
        assert_eq!(
            geometry.point(GridCell::new(2, 3)),
            Some(WorldPoint::new(-0.12, 0.0))
        );
        assert_eq!(
            geometry.point(GridCell::new(4, 3)),
            Some(WorldPoint::new(0.12, 0.0))
        );
        assert_eq!(geometry.point(GridCell::new(7, 0)), None);
    }

    #[test]
    fn resolve_path_preserves_order() {
        let level = Level::new(
            vec![GridCell::new(2, 3), GridCell::new(3, 3), GridCell::new(4, 3)],
            2,
            Facing::East,
        );
        let path = geometry().resolve_path(&level);
        assert_eq!(
            path,
            vec![
                WorldPoint::new(-0.12, 0.0),
                WorldPoint::new(0.0, 0.0),
                WorldPoint::new(0.12, 0.0),
            ]
        );
    }

    #[test]
    fn danger_set_excludes_path_cells() {
        let geometry = geometry();
        let level = Level::new(
            vec![
                GridCell::new(1, 5),
                GridCell::new(1, 4),
                GridCell::new(2, 4),
                GridCell::new(2, 3),
            ],
            4,
            Facing::North,
        );
        let layout = LevelLayout::build(&geometry, &level);
        assert_eq!(layout.danger().len(), 49 - 4);
        for point in layout.path() {
            assert!(!layout.danger().contains(point));
        }
        assert_eq!(layout.start(), WorldPoint::new(-0.24, 0.24));
        assert_eq!(layout.goal(), WorldPoint::new(-0.12, 0.0));
    }

    #[test]
    fn layout_resolves_obstacle_and_switches() {
        let level = Level::new(
            vec![
                GridCell::new(3, 4),
                GridCell::new(2, 4),
                GridCell::new(3, 3),
                GridCell::new(3, 2),
            ],
            8,
            Facing::North,
        )
        .with_obstacle(2, vec![1]);
        let layout = LevelLayout::build(&geometry(), &level);
        assert_eq!(layout.obstacle(), Some(WorldPoint::new(0.0, 0.0)));
        assert_eq!(layout.switches(), &[WorldPoint::new(-0.12, 0.12)]);
    }
}
