//! Drive command output by the navigation controller.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Serialize;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// The actuation demand for one cycle.
///
/// The command persists in the rover state between cycles and the decision
/// logic mutates its fields individually, so a branch which assigns only
/// the throttle inherits the previous cycle's brake and steer. Several
/// recovery behaviours rely on this.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct DriveCommand {
    /// Forward drive demand, negative to reverse.
    ///
    /// Units: normalised, nominally [-1, +1]
    pub throttle: f64,

    /// Brake demand, zero releases the brakes.
    pub brake: f64,

    /// Steering demand, positive to the left.
    ///
    /// Units: degrees
    pub steer_deg: f64,
}
