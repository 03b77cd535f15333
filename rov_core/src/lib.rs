//! # Rover core library
//!
//! The perception-to-action core of the rover. Each cycle a camera frame
//! and pose estimate go in, terrain knowledge accumulates in the world
//! map, and one throttle/brake/steer command comes out. The simulation
//! harness owns the loop and the [`data_store::RoverState`]; this library
//! does the thinking in between.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Global data store threaded through each cycle
pub mod data_store;

/// Cyclic executive, runs one perception and decision pass
pub mod exec;

/// Synthetic camera frames for tests and benches
pub mod frame_gen;

/// Localisation data provided by the harness
pub mod loc;

/// World mapping module
pub mod map;

/// Navigation control module
pub mod nav_ctrl;

/// Perception module
pub mod per;
