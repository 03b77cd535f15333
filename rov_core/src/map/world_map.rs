//! Implementation of the world map.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use ndarray::{s, Array3, ArrayView2};
use ndarray_stats::{errors::MinMaxError, QuantileExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Parameters controlling the world map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldMapParams {
    /// Number of cells along each side of the square map.
    pub size_cells: usize,

    /// Pitch deviation from level at or above which an observation is
    /// discarded, since the projective geometry assumes a level camera.
    ///
    /// Units: degrees
    pub pitch_limit_deg: f64,

    /// Roll deviation from level at or above which an observation is
    /// discarded.
    ///
    /// Units: degrees
    pub roll_limit_deg: f64,
}

/// Accumulating map of the world as seen by the perception pipeline.
///
/// One layer per terrain class, each cell counting the cycles in which it
/// has been observed as that class. Counters only ever increase, so terrain
/// that is seen consistently outweighs one-off misclassifications.
#[derive(Debug, Clone, Serialize)]
pub struct WorldMap {
    params: WorldMapParams,

    /// Observation counters, in (layer, y cell, x cell) order.
    data: Array3<u32>,
}

// ------------------------------------------------------------------------------------------------
// ENUMERATIONS
// ------------------------------------------------------------------------------------------------

/// Terrain classes recorded in the map, one per layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorldMapLayer {
    /// Cells observed as impassable terrain
    Obstacle,

    /// Cells observed as a sample to be collected
    Target,

    /// Cells observed as safe driving surface
    Navigable,
}

/// Errors which can occur during map operations.
#[derive(Debug, Error)]
pub enum WorldMapError {
    #[error("Could not calculate the maximum of the map layer: {0}")]
    MinMaxError(MinMaxError),
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl WorldMapLayer {
    /// All layers in data order.
    pub const ALL: [WorldMapLayer; 3] = [Self::Obstacle, Self::Target, Self::Navigable];

    fn index(&self) -> usize {
        match self {
            WorldMapLayer::Obstacle => 0,
            WorldMapLayer::Target => 1,
            WorldMapLayer::Navigable => 2,
        }
    }
}

impl WorldMap {
    /// Create a new empty map with the given parameters.
    pub fn new(params: WorldMapParams) -> Self {
        let size = params.size_cells;

        Self {
            params,
            data: Array3::zeros((WorldMapLayer::ALL.len(), size, size)),
        }
    }

    /// Number of cells along each side of the square map.
    pub fn size_cells(&self) -> usize {
        self.params.size_cells
    }

    /// Fold one cycle's observations into the map.
    ///
    /// Cells are (x, y) indices in the world frame. Each distinct listed
    /// cell has its counter incremented by one (many warped pixels landing
    /// in one cell make a single observation of it), but only if the
    /// attitude was level enough for the projection to be trusted. If
    /// either pitch or roll is at or over its limit the whole observation
    /// is discarded and `false` is returned.
    pub fn integrate(
        &mut self,
        pitch_deg: f64,
        roll_deg: f64,
        obstacle_cells: &[(usize, usize)],
        target_cells: &[(usize, usize)],
        navigable_cells: &[(usize, usize)],
    ) -> bool {
        if !self.attitude_is_level(pitch_deg, roll_deg) {
            return false;
        }

        self.increment(WorldMapLayer::Obstacle, obstacle_cells);
        self.increment(WorldMapLayer::Target, target_cells);
        self.increment(WorldMapLayer::Navigable, navigable_cells);

        true
    }

    /// True if both pitch and roll are within their fidelity limits.
    pub fn attitude_is_level(&self, pitch_deg: f64, roll_deg: f64) -> bool {
        level_deviation_deg(pitch_deg) < self.params.pitch_limit_deg
            && level_deviation_deg(roll_deg) < self.params.roll_limit_deg
    }

    /// Get a read only view of one layer's counters, indexed (y, x).
    pub fn get_layer(&self, layer: WorldMapLayer) -> ArrayView2<u32> {
        self.data.slice(s![layer.index(), .., ..])
    }

    /// The highest counter value anywhere in the given layer.
    pub fn layer_max(&self, layer: WorldMapLayer) -> Result<u32, WorldMapError> {
        self.get_layer(layer)
            .max()
            .map(|max| *max)
            .map_err(WorldMapError::MinMaxError)
    }

    /// Number of cells in the layer observed at least once.
    pub fn observed_cells(&self, layer: WorldMapLayer) -> usize {
        self.get_layer(layer)
            .iter()
            .filter(|&&count| count > 0)
            .count()
    }

    fn increment(&mut self, layer: WorldMapLayer, cells: &[(usize, usize)]) {
        let size = self.params.size_cells;

        // Many warped pixels land in the same cell, together they make one
        // observation of it
        let mut distinct: Vec<(usize, usize)> = cells
            .iter()
            .copied()
            .filter(|&(x, y)| x < size && y < size)
            .collect();
        distinct.sort_unstable();
        distinct.dedup();

        for (x, y) in distinct {
            let count = &mut self.data[[layer.index(), y, x]];
            *count = count.saturating_add(1);
        }
    }
}

impl Default for WorldMap {
    fn default() -> Self {
        Self::new(WorldMapParams::default())
    }
}

impl Default for WorldMapParams {
    fn default() -> Self {
        Self {
            size_cells: 200,
            pitch_limit_deg: 0.6,
            roll_limit_deg: 0.6,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Deviation of an attitude angle from level.
///
/// The harness reports angles in [0, 360), so an attitude slightly below
/// level arrives as a value just under 360 and must read as a small
/// deviation, not a third of a rotation.
fn level_deviation_deg(angle_deg: f64) -> f64 {
    angle_deg.abs().min((angle_deg - 359.5).abs())
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_integrate_accumulates() {
        let mut map = WorldMap::default();

        assert!(map.integrate(0.0, 0.0, &[(5, 6)], &[], &[(5, 6), (7, 8)]));
        assert_eq!(map.get_layer(WorldMapLayer::Obstacle)[[6, 5]], 1);
        assert_eq!(map.get_layer(WorldMapLayer::Navigable)[[6, 5]], 1);
        assert_eq!(map.get_layer(WorldMapLayer::Navigable)[[8, 7]], 1);
        assert_eq!(map.get_layer(WorldMapLayer::Target).sum(), 0);

        // A second observation of the same cell stacks on the first
        assert!(map.integrate(0.0, 0.0, &[(5, 6)], &[], &[]));
        assert_eq!(map.get_layer(WorldMapLayer::Obstacle)[[6, 5]], 2);
    }

    #[test]
    fn test_duplicate_cells_count_once() {
        let mut map = WorldMap::default();

        // A cell listed many times within one observation gains one count
        assert!(map.integrate(0.0, 0.0, &[], &[], &[(5, 6), (5, 6), (5, 6), (7, 8)]));
        assert_eq!(map.get_layer(WorldMapLayer::Navigable)[[6, 5]], 1);
        assert_eq!(map.get_layer(WorldMapLayer::Navigable)[[8, 7]], 1);

        // Counts across observations still stack
        assert!(map.integrate(0.0, 0.0, &[], &[], &[(5, 6), (5, 6)]));
        assert_eq!(map.get_layer(WorldMapLayer::Navigable)[[6, 5]], 2);
    }

    #[test]
    fn test_integrate_gated_when_tilted() {
        let mut map = WorldMap::default();

        // Pitched over the limit, nothing may change in any layer
        assert!(!map.integrate(1.0, 0.0, &[(1, 1)], &[(2, 2)], &[(3, 3)]));
        for layer in WorldMapLayer::ALL.iter() {
            assert_eq!(map.get_layer(*layer).sum(), 0);
        }

        // Rolled over the limit
        assert!(!map.integrate(0.0, 0.7, &[], &[], &[(3, 3)]));
        assert_eq!(map.get_layer(WorldMapLayer::Navigable).sum(), 0);
    }

    #[test]
    fn test_attitude_wrap() {
        let map = WorldMap::default();

        // Angles just below 360 are small deviations, not huge ones
        assert!(map.attitude_is_level(359.8, 0.0));
        assert!(map.attitude_is_level(0.0, 359.2));

        assert!(!map.attitude_is_level(0.0, 358.0));

        // Exactly at the limit is rejected
        assert!(!map.attitude_is_level(0.6, 0.0));
        assert!(!map.attitude_is_level(0.0, 0.6));
    }

    #[test]
    fn test_out_of_range_cells_ignored() {
        let mut map = WorldMap::default();

        assert!(map.integrate(0.0, 0.0, &[], &[], &[(200, 0), (0, 200)]));
        assert_eq!(map.get_layer(WorldMapLayer::Navigable).sum(), 0);
    }

    #[test]
    fn test_layer_stats() {
        let mut map = WorldMap::default();

        map.integrate(0.0, 0.0, &[], &[(9, 9)], &[]);
        map.integrate(0.0, 0.0, &[], &[(9, 9)], &[]);

        assert_eq!(map.layer_max(WorldMapLayer::Target).unwrap(), 2);
        assert_eq!(map.layer_max(WorldMapLayer::Obstacle).unwrap(), 0);
        assert_eq!(map.observed_cells(WorldMapLayer::Target), 1);
        assert_eq!(map.observed_cells(WorldMapLayer::Navigable), 0);
    }

    #[test]
    fn test_load_params() {
        std::env::set_var("DEIMOS_SW_ROOT", concat!(env!("CARGO_MANIFEST_DIR"), "/.."));

        let loaded: WorldMapParams = util::params::load("world_map.toml").unwrap();
        assert_eq!(loaded, WorldMapParams::default());
    }
}
