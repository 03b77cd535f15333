//! Implementation of the navigation controller.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::info;
use nalgebra::Vector2;

// Internal
use super::{DriveCommand, NavCtrlParams, NavMode, BLOCKED_SPEED_MS, STATIONARY_SPEED_MS};
use crate::data_store::RoverState;
use crate::loc::Pose;
use util::maths;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Heading error below which the rover already faces home and no
/// alignment is needed.
///
/// Units: degrees
const ALIGNED_TOLERANCE_DEG: f64 = 0.5;

/// Heading error above which the rover keeps rotating in place while
/// aligning towards home.
///
/// Units: degrees
const ALIGNING_DEADBAND_DEG: f64 = 1.0;

/// Percentile of the navigable bearing distribution forming the lower
/// steering bound on the drive home.
const RETURN_STEER_LOWER_PCNTL: f64 = 30.0;

/// Percentile of the navigable bearing distribution forming the upper
/// steering bound on the drive home.
const RETURN_STEER_UPPER_PCNTL: f64 = 70.0;

/// Gentle brake applied when arriving home still moving, enough to pull up
/// without pitching the rover over.
const HOME_ARRIVAL_BRAKE: f64 = 1.0;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Navigation controller.
///
/// Stateless apart from its parameters: the mode and mission state it
/// drives lives in [`RoverState`], which the harness owns.
pub struct NavCtrl {
    pub(crate) params: NavCtrlParams,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl NavCtrl {
    /// Create a new navigation controller with the given parameters.
    pub fn new(params: NavCtrlParams) -> Self {
        Self { params }
    }

    /// Perform one cycle of decision processing.
    ///
    /// Always resolves to a command, there are no failure paths in the
    /// decision tree.
    pub fn proc(&self, ds: &mut RoverState) -> DriveCommand {
        // Without a pose nothing can be decided, hold everything
        let pose = match ds.pose {
            Some(pose) => pose,
            None => {
                ds.cmd = DriveCommand::default();
                return ds.cmd;
            }
        };

        // The first pose seen becomes the start position, where the return
        // trip ends
        let start_pos_m = *ds.start_pos_m.get_or_insert_with(|| {
            info!(
                "Start position captured: ({:.2}, {:.2})",
                pose.position_m.x, pose.position_m.y
            );
            pose.position_m
        });

        let collecting = ds.samples_recovered < self.params.target_sample_goal;

        if ds.nav_summary.is_some() {
            if collecting {
                match ds.nav_mode {
                    NavMode::Forward => self.mode_forward(ds),
                    NavMode::Stop => self.mode_stop(ds),
                }
            } else {
                // All samples on board, run the trip home
                ds.home_dist_m = (pose.position_m - start_pos_m).norm();

                if ds.home_dist_m > self.params.home_radius_m {
                    self.return_home(ds, &pose, start_pos_m);
                } else {
                    self.arrive_home(ds);
                }
            }
        } else {
            // No terrain data yet, keep moving so some arrives
            ds.cmd.throttle = self.params.throttle_set;
            ds.cmd.brake = 0.0;
            ds.cmd.steer_deg = 0.0;
        }

        // Sample acquisition outranks the mode logic, but only while
        // collection is still underway
        if collecting {
            self.target_override(ds);
            self.pickup_check(ds);
        }

        ds.cmd
    }

    /// Forward mode: drive towards the mean navigable bearing.
    fn mode_forward(&self, ds: &mut RoverState) {
        if nav_sample_count(ds) >= self.params.stop_forward_px {
            if ds.vel_ms < self.params.max_vel_ms {
                if ds.vel_ms < BLOCKED_SPEED_MS && !ds.picking_up {
                    // Throttle is up but the rover isn't moving
                    self.stuck_recovery(ds);
                } else {
                    ds.cmd.throttle = self.params.throttle_set;
                }
            } else {
                // At speed, coast
                ds.cmd.throttle = 0.0;
            }

            // These overwrite whatever brake and steer the recovery
            // schedule set, only its throttle carries through this mode
            ds.cmd.brake = 0.0;
            ds.cmd.steer_deg = self.steer_towards_mean(ds);
        } else {
            // Not enough navigable terrain ahead, brake hard and stop
            ds.cmd.throttle = 0.0;
            ds.cmd.brake = self.params.brake_set;
            ds.cmd.steer_deg = 0.0;
            self.set_mode(ds, NavMode::Stop);
        }
    }

    /// Stop mode: brake to a halt, then turn in place until a path opens.
    fn mode_stop(&self, ds: &mut RoverState) {
        if ds.vel_ms > STATIONARY_SPEED_MS {
            // Still rolling, keep the brakes on
            ds.cmd.throttle = 0.0;
            ds.cmd.brake = self.params.brake_set;
            ds.cmd.steer_deg = 0.0;
        } else if nav_sample_count(ds) < self.params.go_forward_px {
            // Turn in place until enough terrain opens up ahead
            ds.cmd.throttle = 0.0;
            ds.cmd.brake = 0.0;
            ds.cmd.steer_deg = -self.params.max_steer_deg;
        } else {
            // Path ahead again, pull away
            ds.cmd.throttle = self.params.throttle_set;
            ds.cmd.brake = 0.0;
            ds.cmd.steer_deg = self.steer_towards_mean(ds);
            self.set_mode(ds, NavMode::Forward);
        }
    }

    /// Escalating recovery schedule for a rover that isn't moving despite
    /// throttle.
    ///
    /// The schedule runs on time since `stuck_timer_start_s`, which resets
    /// whenever a full pass completes without the rover getting free.
    /// Brackets only assign the fields they care about, anything else
    /// persists from the previous cycle.
    fn stuck_recovery(&self, ds: &mut RoverState) {
        // Baseline for every bracket: double throttle to push through
        ds.cmd.throttle = self.params.throttle_set * 2.0;

        let time_stuck_s = ds.time_s - ds.stuck_timer_start_s;

        if time_stuck_s >= 5.0 && time_stuck_s < 10.0 {
            // Push harder
            ds.cmd.throttle = self.params.max_throttle;
        } else if time_stuck_s >= 10.0 && time_stuck_s < 11.0 {
            // Stop pushing, turn in place
            ds.cmd.throttle = 0.0;
            ds.cmd.brake = 0.0;
            ds.cmd.steer_deg = -self.params.max_steer_deg;
        } else if time_stuck_s >= 11.0 && time_stuck_s < 12.0 {
            // Straighten up and push again
            ds.cmd.steer_deg = 0.0;
            ds.cmd.throttle = self.params.max_throttle;
        } else if time_stuck_s >= 12.0 && time_stuck_s < 13.0 {
            // Another turn in place
            ds.cmd.throttle = 0.0;
            ds.cmd.brake = 0.0;
            ds.cmd.steer_deg = -self.params.max_steer_deg;
        } else if time_stuck_s >= 14.0 && time_stuck_s < 16.0 {
            // No bracket covers [13, 14): there the doubled throttle above
            // stands and the previous cycle's brake and steer persist
            ds.cmd.steer_deg = 0.0;
            ds.cmd.throttle = self.params.max_throttle;
        } else if time_stuck_s >= 16.0 && time_stuck_s < 17.0 {
            // Reverse out, swinging the tail
            ds.cmd.throttle = -1.0;
            ds.cmd.brake = 0.0;
            ds.cmd.steer_deg = 10.0;
        } else if time_stuck_s > 17.0 {
            // A whole pass didn't free us, restart the schedule
            ds.stuck_timer_start_s = ds.time_s;
            ds.cmd.throttle = 0.0;
        }
    }

    /// Drive back to the start position.
    fn return_home(&self, ds: &mut RoverState, pose: &Pose, start_pos_m: Vector2<f64>) {
        let error_deg = heading_error_deg(start_pos_m, pose);

        if error_deg.abs() > ALIGNED_TOLERANCE_DEG && !ds.facing_home {
            if ds.vel_ms > STATIONARY_SPEED_MS {
                // Stop before trying to rotate
                ds.cmd.throttle = 0.0;
                ds.cmd.brake = self.params.brake_set;
                ds.cmd.steer_deg = 0.0;
            } else if error_deg.abs() > ALIGNING_DEADBAND_DEG {
                // Rotate in place towards home
                ds.cmd.throttle = 0.0;
                ds.cmd.brake = 0.0;
                ds.cmd.steer_deg = maths::clamp(
                    error_deg,
                    -self.params.max_steer_deg,
                    self.params.max_steer_deg,
                );
            } else {
                // Close enough, lock the alignment in
                ds.cmd.steer_deg = 0.0;
                ds.facing_home = true;
                info!("Aligned towards home, driving back");
            }
        } else if nav_sample_count(ds) >= self.params.stop_forward_px {
            // Head for home, steering bounded by where the terrain
            // actually allows driving
            let angles_deg = ds
                .nav_summary
                .as_ref()
                .map(|summary| summary.angles_deg())
                .unwrap_or_default();

            let lower_deg = maths::percentile(&angles_deg, RETURN_STEER_LOWER_PCNTL)
                .unwrap_or(-self.params.max_steer_deg)
                .max(-self.params.max_steer_deg);
            let upper_deg = maths::percentile(&angles_deg, RETURN_STEER_UPPER_PCNTL)
                .unwrap_or(self.params.max_steer_deg)
                .max(self.params.max_steer_deg);

            ds.cmd.steer_deg = maths::clamp(error_deg, lower_deg, upper_deg);
            ds.cmd.brake = 0.0;

            if ds.vel_ms < self.params.max_vel_ms {
                // Reuse the recovery schedule, it doubles as a push to get
                // home quickly and frees the rover if it grounds out
                self.stuck_recovery(ds);
            } else {
                ds.cmd.throttle = self.params.throttle_set;
            }
        } else {
            // Path home is blocked, fall back to the stop-and-turn
            // behaviour
            ds.cmd.throttle = 0.0;
            ds.cmd.brake = self.params.brake_set;
            ds.cmd.steer_deg = 0.0;
            self.set_mode(ds, NavMode::Stop);
            self.mode_stop(ds);
        }
    }

    /// Hold position at the start point, mission over.
    fn arrive_home(&self, ds: &mut RoverState) {
        ds.cmd.throttle = 0.0;
        ds.cmd.steer_deg = 0.0;
        ds.cmd.brake = if ds.vel_ms > STATIONARY_SPEED_MS {
            HOME_ARRIVAL_BRAKE
        } else {
            self.params.brake_set
        };

        if !ds.mission_complete {
            ds.mission_complete = true;
            info!(
                "All {} samples collected and home reached, mission complete",
                ds.samples_recovered
            );
        }
    }

    /// Creep towards a visible target sample, overriding the mode logic.
    fn target_override(&self, ds: &mut RoverState) {
        if let Some(mean_deg) = ds.target_summary.mean_angle_deg() {
            ds.cmd.throttle = self.params.target_creep_throttle;
            ds.cmd.steer_deg = maths::clamp(
                mean_deg,
                -self.params.max_steer_deg,
                self.params.max_steer_deg,
            );
        }
    }

    /// Request a pickup when parked over a sample.
    fn pickup_check(&self, ds: &mut RoverState) {
        if !ds.near_sample {
            return;
        }

        let cooldown_elapsed = match ds.last_pickup_cycle {
            Some(cycle) => ds.num_cycles > cycle + self.params.pickup_cooldown_cycles,
            None => true,
        };

        if cooldown_elapsed {
            // Halt over the sample and ask the harness to collect it.
            // Steer is left alone so the approach heading holds.
            ds.cmd.throttle = 0.0;
            ds.cmd.brake = self.params.brake_set;
            ds.send_pickup = true;
            ds.samples_recovered += 1;
            ds.last_pickup_cycle = Some(ds.num_cycles);

            info!(
                "Sample pickup requested, {} of {} recovered",
                ds.samples_recovered, self.params.target_sample_goal
            );
        }
    }

    /// Steering demand tracking the mean navigable bearing, clipped to the
    /// steering authority.
    fn steer_towards_mean(&self, ds: &RoverState) -> f64 {
        let mean_deg = ds
            .nav_summary
            .as_ref()
            .and_then(|summary| summary.mean_angle_deg())
            .unwrap_or(0.0);

        maths::clamp(mean_deg, -self.params.max_steer_deg, self.params.max_steer_deg)
    }

    fn set_mode(&self, ds: &mut RoverState, mode: NavMode) {
        if ds.nav_mode != mode {
            info!("NavMode change: {:?} -> {:?}", ds.nav_mode, mode);
            ds.nav_mode = mode;
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Number of navigable terrain pixels seen this cycle.
fn nav_sample_count(ds: &RoverState) -> usize {
    ds.nav_summary
        .as_ref()
        .map(|summary| summary.len())
        .unwrap_or(0)
}

/// Signed error between the rover's heading and the bearing of the target
/// point.
///
/// The bearing is mapped into [0, 360) before the yaw is subtracted, so
/// the result can span (-360, 360). An error of -90 means the target sits
/// 90 degrees clockwise of the current heading.
fn heading_error_deg(target_m: Vector2<f64>, pose: &Pose) -> f64 {
    let to_target = target_m - pose.position_m;
    let bearing_rad = maths::map_pi_to_2pi(to_target.y.atan2(to_target.x));

    bearing_rad.to_degrees() - pose.yaw_deg
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
