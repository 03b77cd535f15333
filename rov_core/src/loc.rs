//! # Localisation
//!
//! Pose data for the rover. The harness supplies a new [`Pose`] estimate
//! every cycle, alongside the camera frame it was taken with.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// The pose (position and attitude) of the rover in the world frame.
///
/// Attitude angles arrive from the harness in degrees in the range
/// [0, 360), so an attitude slightly below level reads as a value just
/// under 360 rather than a small negative number.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Pose {
    /// The position of the rover in the world frame.
    ///
    /// Units: metres (the world map uses one cell per metre)
    pub position_m: Vector2<f64>,

    /// Heading about the world vertical axis, measured anticlockwise from
    /// the world x axis.
    ///
    /// Units: degrees, [0, 360)
    pub yaw_deg: f64,

    /// Nose-up/nose-down attitude angle.
    ///
    /// Units: degrees, [0, 360)
    pub pitch_deg: f64,

    /// Attitude angle about the forward axis.
    ///
    /// Units: degrees, [0, 360)
    pub roll_deg: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Pose {
    /// Heading of the rover in radians.
    pub fn yaw_rad(&self) -> f64 {
        self.yaw_deg.to_radians()
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position_m: Vector2::zeros(),
            yaw_deg: 0.0,
            pitch_deg: 0.0,
            roll_deg: 0.0,
        }
    }
}
