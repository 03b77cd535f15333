//! Parameters structure for the navigation controller.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Parameters for the navigation controller.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NavCtrlParams {
    /// Nominal cruise throttle.
    pub throttle_set: f64,

    /// Highest throttle the stuck recovery schedule may apply.
    pub max_throttle: f64,

    /// Nominal full brake demand.
    pub brake_set: f64,

    /// Velocity above which the rover coasts rather than accelerating.
    ///
    /// Units: m/s
    pub max_vel_ms: f64,

    /// Navigable pixel count below which Forward gives up and brakes.
    pub stop_forward_px: usize,

    /// Navigable pixel count required before Stop releases back into
    /// Forward. Kept well above `stop_forward_px` so the transition has
    /// hysteresis.
    pub go_forward_px: usize,

    /// Steering authority.
    ///
    /// Units: degrees
    pub max_steer_deg: f64,

    /// Throttle used to creep towards a visible target sample.
    pub target_creep_throttle: f64,

    /// Number of samples to recover before heading home.
    pub target_sample_goal: u32,

    /// Minimum number of cycles between two pickup requests, covering the
    /// harness's pickup animation.
    pub pickup_cooldown_cycles: u64,

    /// Distance from the start position inside which the return trip is
    /// over.
    ///
    /// Units: metres
    pub home_radius_m: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Default for NavCtrlParams {
    fn default() -> Self {
        Self {
            throttle_set: 0.2,
            max_throttle: 1.0,
            brake_set: 10.0,
            max_vel_ms: 2.0,
            stop_forward_px: 50,
            go_forward_px: 500,
            max_steer_deg: 15.0,
            target_creep_throttle: 0.1,
            target_sample_goal: 6,
            pickup_cooldown_cycles: 100,
            home_radius_m: 2.0,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
