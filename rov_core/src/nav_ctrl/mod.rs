//! # Navigation control module
//!
//! Converts the perception summaries into per-cycle drive commands and
//! runs the mission state machine: explore the terrain collecting target
//! samples, then drive back to the start position.
//!
//! While collecting, the controller alternates between two driving modes,
//! [`NavMode::Forward`] and [`NavMode::Stop`], steering towards the mean
//! bearing of the navigable terrain. Sample acquisition behaviours
//! (creeping up on a visible sample, requesting a pickup) override the
//! mode logic whenever they apply.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod cmd;
mod params;
mod state;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use cmd::DriveCommand;
pub use params::NavCtrlParams;
pub use state::NavCtrl;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Serialize;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Velocity below which the rover counts as stationary for braking and
/// turning decisions.
///
/// Units: m/s
pub const STATIONARY_SPEED_MS: f64 = 0.2;

/// Velocity below which forward progress counts as blocked, starting the
/// stuck recovery schedule.
///
/// Units: m/s
pub const BLOCKED_SPEED_MS: f64 = 0.1;

// ------------------------------------------------------------------------------------------------
// ENUMERATIONS
// ------------------------------------------------------------------------------------------------

/// Driving mode of the rover while collecting samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum NavMode {
    /// Driving towards the mean navigable bearing
    Forward,

    /// Braking to a halt, then turning in place until a path opens up
    Stop,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Default for NavMode {
    fn default() -> Self {
        NavMode::Forward
    }
}
