//! # Cyclic executive
//!
//! One perception and decision pass over the rover state. The external
//! driver owns the timing: it writes the cycle's telemetry into the state,
//! calls [`cycle`], and actuates the returned command.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::{trace, warn};

// Internal
use crate::data_store::RoverState;
use crate::nav_ctrl::{DriveCommand, NavCtrl};
use crate::per::PerMgr;

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Run one full cycle over the rover state.
///
/// Perception failures are not fatal: the cycle degrades to a no-data
/// decision pass and the error is logged.
pub fn cycle(per_mgr: &PerMgr, nav_ctrl: &NavCtrl, ds: &mut RoverState) -> DriveCommand {
    ds.cycle_start();

    if let Err(e) = per_mgr.proc(ds) {
        warn!("Perception processing failed: {}", e);
    }

    let cmd = nav_ctrl.proc(ds);

    trace!("Cycle {}: {:?}", ds.num_cycles, cmd);

    ds.num_cycles += 1;

    cmd
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::frame_gen;
    use crate::loc::Pose;
    use crate::map::WorldMapLayer;
    use crate::nav_ctrl::NavCtrlParams;
    use crate::per::{PerMgr, PerMgrParams};
    use nalgebra::Vector2;

    fn managers() -> (PerMgr, NavCtrl) {
        (
            PerMgr::new(PerMgrParams::default()).unwrap(),
            NavCtrl::new(NavCtrlParams::default()),
        )
    }

    #[test]
    fn test_cycle_populates_state() {
        let (per_mgr, nav_ctrl) = managers();
        let mut ds = RoverState::default();
        ds.pose = Some(Pose {
            position_m: Vector2::new(100.0, 100.0),
            ..Default::default()
        });
        ds.cam_image = Some(frame_gen::generate_test_frame(320, 160, 7, None));

        let cmd = cycle(&per_mgr, &nav_ctrl, &mut ds);

        assert_eq!(ds.num_cycles, 1);
        assert!(ds.nav_summary.is_some());
        assert!(ds.vision_image.is_some());
        assert!(ds.start_pos_m.is_some());

        // Level attitude, so the map must have taken the observation
        assert!(ds.world_map.observed_cells(WorldMapLayer::Navigable) > 0);

        // Plenty of open ground ahead, the rover pulls away
        assert!(cmd.throttle > 0.0);
        assert_eq!(cmd.brake, 0.0);
    }

    #[test]
    fn test_cycle_without_frame_keeps_moving() {
        let (per_mgr, nav_ctrl) = managers();
        let mut ds = RoverState::default();
        ds.pose = Some(Pose::default());

        let cmd = cycle(&per_mgr, &nav_ctrl, &mut ds);

        assert!(ds.nav_summary.is_none());
        assert_eq!(cmd.throttle, NavCtrlParams::default().throttle_set);
        assert_eq!(cmd.brake, 0.0);
    }

    #[test]
    fn test_cycle_survives_malformed_frame() {
        let (per_mgr, nav_ctrl) = managers();
        let mut ds = RoverState::default();
        ds.pose = Some(Pose::default());
        ds.cam_image = Some(frame_gen::generate_test_frame(64, 64, 7, None));

        let cmd = cycle(&per_mgr, &nav_ctrl, &mut ds);

        // Degrades to the keep-moving default rather than failing
        assert_eq!(ds.num_cycles, 1);
        assert!(ds.nav_summary.is_none());
        assert_eq!(cmd.throttle, NavCtrlParams::default().throttle_set);
    }
}
