//! # Perception module
//!
//! Converts raw camera frames into terrain knowledge. Each cycle the
//! current frame is warped into a top-down view, segmented into navigable,
//! obstacle, and target sample masks, and the results are written into the
//! rover state three ways:
//!
//! - polar summaries of the navigable and target pixels, which drive the
//!   navigation controller,
//! - an update to the persistent world map, gated on the attitude being
//!   level enough to trust the projection,
//! - a displayable overlay image of the classified masks.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod coords;
pub mod mask;
mod params;
mod warp;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use image::RgbImage;
use log::trace;
use ndarray::Array2;
use thiserror::Error;

// Internal
use crate::data_store::RoverState;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use coords::PolarSummary;
pub use params::PerMgrParams;
pub use warp::PerspectiveWarp;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Brightness of the obstacle channel in the overlay image, kept below
/// full so navigable terrain stands out against it.
pub const OVERLAY_OBSTACLE_LEVEL: u8 = 155;

/// Brightness of the target and navigable channels in the overlay image.
pub const OVERLAY_FULL_LEVEL: u8 = 255;

// ------------------------------------------------------------------------------------------------
// ENUMERATIONS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur during perception processing.
#[derive(Debug, Error)]
pub enum PerError {
    #[error("The warp calibration points are degenerate, no unique perspective transform exists")]
    DegenerateWarpPoints,

    #[error("Expected a {expected_width}x{expected_height} camera frame, got {width}x{height}")]
    UnexpectedFrameShape {
        width: u32,
        height: u32,
        expected_width: u32,
        expected_height: u32,
    },
}

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Perception manager.
///
/// Holds the static calibration and the perspective transform derived from
/// it. All per-cycle state lives in [`RoverState`].
pub struct PerMgr {
    pub(crate) params: PerMgrParams,

    /// Transform between the camera frame and the top-down view
    warp: PerspectiveWarp,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl PerMgr {
    /// Create a new perception manager from the given parameters.
    pub fn new(params: PerMgrParams) -> Result<Self, PerError> {
        let warp = PerspectiveWarp::from_points(&params.warp_src_px, &params.warp_dst_px())?;

        Ok(Self { params, warp })
    }

    /// Process the current camera frame, writing terrain knowledge into
    /// the rover state.
    ///
    /// The previous cycle's summaries and overlay are always cleared. With
    /// no frame or pose available this cycle they stay cleared and the
    /// world map is untouched. A frame of the wrong shape is an error,
    /// which callers should treat as a no-data cycle.
    pub fn proc(&self, ds: &mut RoverState) -> Result<(), PerError> {
        // Perception outputs never carry over between cycles
        ds.vision_image = None;
        ds.nav_summary = None;
        ds.target_summary = PolarSummary::default();

        let pose = match ds.pose {
            Some(pose) => pose,
            None => return Ok(()),
        };

        let frame = match ds.cam_image {
            Some(ref frame) => frame,
            None => return Ok(()),
        };

        let (width, height) = frame.dimensions();
        if width != self.params.frame_width_px || height != self.params.frame_height_px {
            return Err(PerError::UnexpectedFrameShape {
                width,
                height,
                expected_width: self.params.frame_width_px,
                expected_height: self.params.frame_height_px,
            });
        }

        // Top-down view of the scene
        let warped = self.warp.warp_image(frame);

        // Classify the warped view
        let nav_mask = mask::navigable_mask(&warped, &self.params.nav_thresh_rgb);
        let obs_mask = mask::obstacle_mask(&warped, &self.params.obs_thresh_rgb);
        let tgt_mask = mask::target_mask(
            &warped,
            &self.params.target_hsv_lower,
            &self.params.target_hsv_upper,
        );

        // Rover-frame points for each class
        let nav_points = coords::rover_coords(&nav_mask);
        let obs_points = coords::rover_coords(&obs_mask);
        let tgt_points = coords::rover_coords(&tgt_mask);

        trace!(
            "Perception masks: {} navigable, {} obstacle, {} target pixels",
            nav_points.len(),
            obs_points.len(),
            tgt_points.len()
        );

        // Project into the world and fold into the map
        let size_cells = ds.world_map.size_cells();
        let scale = self.params.scale_px_per_m();

        let nav_cells = coords::to_world(&nav_points, &pose, size_cells, scale);
        let obs_cells = coords::to_world(&obs_points, &pose, size_cells, scale);
        let tgt_cells = coords::to_world(&tgt_points, &pose, size_cells, scale);

        let integrated = ds.world_map.integrate(
            pose.pitch_deg,
            pose.roll_deg,
            &obs_cells,
            &tgt_cells,
            &nav_cells,
        );

        if !integrated {
            trace!(
                "Attitude outside fidelity limits (pitch {:.2}, roll {:.2}), map update skipped",
                pose.pitch_deg,
                pose.roll_deg
            );
        }

        ds.vision_image = Some(compose_overlay(&obs_mask, &tgt_mask, &nav_mask));
        ds.nav_summary = Some(coords::to_polar(&nav_points));
        ds.target_summary = coords::to_polar(&tgt_points);

        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Compose the three masks into the displayable overlay image: obstacles
/// in the red channel, targets in green, navigable terrain in blue.
fn compose_overlay(
    obs_mask: &Array2<u8>,
    tgt_mask: &Array2<u8>,
    nav_mask: &Array2<u8>,
) -> RgbImage {
    let (height, width) = nav_mask.dim();
    let mut overlay = RgbImage::new(width as u32, height as u32);

    for (x, y, pixel) in overlay.enumerate_pixels_mut() {
        let cell = [y as usize, x as usize];

        pixel.0 = [
            obs_mask[cell] * OVERLAY_OBSTACLE_LEVEL,
            tgt_mask[cell] * OVERLAY_FULL_LEVEL,
            nav_mask[cell] * OVERLAY_FULL_LEVEL,
        ];
    }

    overlay
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::loc::Pose;
    use crate::map::WorldMapLayer;
    use image::Rgb;
    use nalgebra::Vector2;

    fn level_pose() -> Pose {
        Pose {
            position_m: Vector2::new(100.0, 100.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_proc_uniform_ground() {
        let per_mgr = PerMgr::new(PerMgrParams::default()).unwrap();
        let mut ds = RoverState::default();
        ds.pose = Some(level_pose());
        ds.cam_image = Some(RgbImage::from_pixel(320, 160, Rgb([200, 200, 200])));

        per_mgr.proc(&mut ds).unwrap();

        let nav = ds.nav_summary.as_ref().unwrap();
        assert!(nav.len() > 0);
        assert!(ds.target_summary.is_empty());

        let overlay = ds.vision_image.as_ref().unwrap();
        // In view of the camera the ground is navigable (blue channel)
        assert_eq!(overlay.get_pixel(160, 150).0, [0, 0, 255]);
        // The top-left corner inverse-maps just below the horizon, still
        // inside the frame, so a bright scene reads navigable even there
        assert_eq!(overlay.get_pixel(0, 0).0, [0, 0, 255]);
        // Lower down the flank falls outside the frame's preimage and
        // stays black, which reads as obstacle
        assert_eq!(overlay.get_pixel(0, 100).0, [155, 0, 0]);

        // Observations landed in the map around the rover
        assert!(ds.world_map.observed_cells(WorldMapLayer::Navigable) > 0);
        assert!(ds.world_map.observed_cells(WorldMapLayer::Obstacle) > 0);
        assert_eq!(ds.world_map.observed_cells(WorldMapLayer::Target), 0);

        // However many warped pixels land in one cell, a single pass adds
        // at most one count to it
        assert_eq!(
            ds.world_map.layer_max(WorldMapLayer::Navigable).unwrap(),
            1
        );
    }

    #[test]
    fn test_proc_tilted_observation_gated() {
        let per_mgr = PerMgr::new(PerMgrParams::default()).unwrap();
        let mut ds = RoverState::default();
        let mut pose = level_pose();
        pose.pitch_deg = 1.0;
        ds.pose = Some(pose);
        ds.cam_image = Some(RgbImage::from_pixel(320, 160, Rgb([200, 200, 200])));

        per_mgr.proc(&mut ds).unwrap();

        // The polar summaries still update, only the map is gated
        assert!(ds.nav_summary.as_ref().unwrap().len() > 0);
        assert_eq!(ds.world_map.observed_cells(WorldMapLayer::Navigable), 0);
        assert_eq!(ds.world_map.observed_cells(WorldMapLayer::Obstacle), 0);
    }

    #[test]
    fn test_proc_without_inputs() {
        let per_mgr = PerMgr::new(PerMgrParams::default()).unwrap();
        let mut ds = RoverState::default();
        ds.nav_summary = Some(PolarSummary::default());

        per_mgr.proc(&mut ds).unwrap();

        // Stale summaries are cleared, not carried over
        assert!(ds.nav_summary.is_none());
        assert!(ds.vision_image.is_none());
    }

    #[test]
    fn test_proc_rejects_wrong_frame_shape() {
        let per_mgr = PerMgr::new(PerMgrParams::default()).unwrap();
        let mut ds = RoverState::default();
        ds.pose = Some(level_pose());
        ds.cam_image = Some(RgbImage::new(64, 64));

        assert!(per_mgr.proc(&mut ds).is_err());
        assert!(ds.nav_summary.is_none());
    }
}
