//! Parameters structure for the perception manager.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Parameters for the perception manager.
///
/// The warp calibration was measured against a grid of one metre squares
/// laid out in front of the camera, so the destination square fixes the
/// top-down scale.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PerMgrParams {
    /// Expected width of incoming camera frames.
    ///
    /// Units: pixels
    pub frame_width_px: u32,

    /// Expected height of incoming camera frames.
    ///
    /// Units: pixels
    pub frame_height_px: u32,

    /// Calibration quad in the camera frame, ordered bottom-left,
    /// bottom-right, top-right, top-left.
    ///
    /// Units: pixels, (x, y)
    pub warp_src_px: [[f64; 2]; 4],

    /// Half the side length of the square the calibration quad maps onto.
    ///
    /// Units: pixels
    pub warp_dst_half_size_px: f64,

    /// Gap between the bottom edge of the warped image and the rover
    /// itself, which the camera cannot see.
    ///
    /// Units: pixels
    pub warp_bottom_offset_px: f64,

    /// Lower RGB bound (exclusive) for navigable terrain.
    pub nav_thresh_rgb: [u8; 3],

    /// Upper RGB bound (exclusive) for obstacles.
    pub obs_thresh_rgb: [u8; 3],

    /// Lower HSV bound (inclusive) of the target sample band. Hue on the
    /// OpenCV [0, 180) scale, saturation and value on [0, 255].
    pub target_hsv_lower: [f64; 3],

    /// Upper HSV bound (inclusive) of the target sample band.
    pub target_hsv_upper: [f64; 3],
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl PerMgrParams {
    /// Scale of the warped top-down image.
    ///
    /// Units: pixels per metre
    pub fn scale_px_per_m(&self) -> f64 {
        2.0 * self.warp_dst_half_size_px
    }

    /// Destination quad of the perspective warp, in the same corner order
    /// as [`warp_src_px`](Self::warp_src_px): a square of side
    /// `2 * warp_dst_half_size_px` centred above the rover.
    pub fn warp_dst_px(&self) -> [[f64; 2]; 4] {
        let half = self.warp_dst_half_size_px;
        let centre_x = self.frame_width_px as f64 / 2.0;
        let bottom_y = self.frame_height_px as f64 - self.warp_bottom_offset_px;

        [
            [centre_x - half, bottom_y],
            [centre_x + half, bottom_y],
            [centre_x + half, bottom_y - 2.0 * half],
            [centre_x - half, bottom_y - 2.0 * half],
        ]
    }
}

impl Default for PerMgrParams {
    fn default() -> Self {
        Self {
            frame_width_px: 320,
            frame_height_px: 160,
            warp_src_px: [
                [14.0, 140.0],
                [301.0, 140.0],
                [200.0, 96.0],
                [118.0, 96.0],
            ],
            warp_dst_half_size_px: 5.0,
            warp_bottom_offset_px: 6.0,
            nav_thresh_rgb: [160, 160, 160],
            obs_thresh_rgb: [150, 150, 150],
            target_hsv_lower: [0.0, 100.0, 100.0],
            target_hsv_upper: [55.0, 255.0, 255.0],
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
