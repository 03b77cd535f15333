//! # Data Store
//!
//! The data store is the single record of everything the rover knows. The
//! harness owns it, writes the telemetry fields in before every cycle, and
//! reads the outputs back out afterwards. In between it is handed to the
//! perception manager and then the navigation controller, each reading the
//! fields of the other as the previous cycle left them.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use image::RgbImage;
use nalgebra::Vector2;

// Internal
use crate::loc::Pose;
use crate::map::WorldMap;
use crate::nav_ctrl::{DriveCommand, NavMode};
use crate::per::PolarSummary;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Rover data store.
#[derive(Default)]
pub struct RoverState {
    // ----- Cycle management -----
    /// Number of cycles already executed
    pub num_cycles: u64,

    /// Session elapsed time sampled at the start of this cycle.
    ///
    /// Units: seconds
    pub time_s: f64,

    // ----- Telemetry, written by the harness before each cycle -----
    /// The latest camera frame
    pub cam_image: Option<RgbImage>,

    /// The latest pose estimate
    pub pose: Option<Pose>,

    /// Forward velocity.
    ///
    /// Units: m/s
    pub vel_ms: f64,

    /// True while the harness reports a sample within pickup range
    pub near_sample: bool,

    /// True while the harness is running a pickup animation
    pub picking_up: bool,

    // ----- Perception outputs, replaced every cycle -----
    /// Displayable overlay of the classified terrain masks
    pub vision_image: Option<RgbImage>,

    /// Polar summary of navigable terrain, `None` until perception has
    /// produced one this cycle
    pub nav_summary: Option<PolarSummary>,

    /// Polar summary of visible target samples, empty when none are in
    /// view
    pub target_summary: PolarSummary,

    /// Accumulated world map
    pub world_map: WorldMap,

    // ----- Mission state -----
    /// Where the mission started and the return trip ends, captured on
    /// the first decision cycle
    pub start_pos_m: Option<Vector2<f64>>,

    /// Distance from the start position, maintained during the return
    /// trip.
    ///
    /// Units: metres
    pub home_dist_m: f64,

    /// Number of samples recovered so far
    pub samples_recovered: u32,

    /// Cycle number of the most recent pickup request, `None` before the
    /// first
    pub last_pickup_cycle: Option<u64>,

    /// Set for one cycle to ask the harness to collect the sample under
    /// the rover
    pub send_pickup: bool,

    /// Latched once all samples are recovered and the rover is back home
    pub mission_complete: bool,

    // ----- Control state -----
    /// Driving mode used while collecting samples
    pub nav_mode: NavMode,

    /// Latched once the return alignment has pointed the rover at home
    pub facing_home: bool,

    /// Session time at which the stuck recovery schedule (re)started.
    ///
    /// Units: seconds
    pub stuck_timer_start_s: f64,

    /// The current actuation demand
    pub cmd: DriveCommand,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl RoverState {
    /// Perform the actions required at the start of a cycle: sample the
    /// session clock and clear the one-cycle output flags.
    pub fn cycle_start(&mut self) {
        self.time_s = util::session::get_elapsed_seconds();

        // The stuck recovery schedule runs on the session clock, align its
        // origin on the first cycle
        if self.num_cycles == 0 {
            self.stuck_timer_start_s = self.time_s;
        }

        self.send_pickup = false;
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
