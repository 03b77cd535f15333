//! # World mapping module
//!
//! Maintains the rover's persistent record of the terrain it has seen: a
//! square gridded map in which each cell counts how often it has been
//! observed as navigable, obstacle, or target sample.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod world_map;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use world_map::{WorldMap, WorldMapError, WorldMapLayer, WorldMapParams};
