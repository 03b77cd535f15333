//! Coordinate transforms between the image, rover, and world frames.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use nalgebra::{Rotation2, Vector2};
use ndarray::Array2;
use serde::Serialize;

// Internal
use crate::loc::Pose;
use util::maths;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Polar summary of one terrain class as seen this cycle: the distance and
/// bearing of every mask pixel, in matching order.
#[derive(Clone, Debug, Default, Serialize)]
pub struct PolarSummary {
    /// Distance from the rover to each terrain pixel.
    ///
    /// Units: top-down pixels (10 px to the metre)
    pub dists_px: Vec<f64>,

    /// Bearing of each terrain pixel from the rover's forward axis,
    /// positive to the left.
    ///
    /// Units: radians
    pub angles_rad: Vec<f64>,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl PolarSummary {
    /// Number of terrain pixels seen.
    pub fn len(&self) -> usize {
        self.angles_rad.len()
    }

    /// True if no terrain pixels were seen.
    pub fn is_empty(&self) -> bool {
        self.angles_rad.is_empty()
    }

    /// Mean bearing in degrees, or `None` if no pixels were seen.
    pub fn mean_angle_deg(&self) -> Option<f64> {
        maths::mean(&self.angles_rad).map(|mean| mean.to_degrees())
    }

    /// All bearings in degrees.
    pub fn angles_deg(&self) -> Vec<f64> {
        self.angles_rad.iter().map(|a| a.to_degrees()).collect()
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Convert mask pixels into rover-frame points.
///
/// The rover sits at the bottom centre of the top-down image, with x
/// pointing up the image (forward) and y pointing left.
pub fn rover_coords(mask: &Array2<u8>) -> Vec<Vector2<f64>> {
    let (height, width) = mask.dim();
    let mut points = Vec::new();

    for ((row, col), &value) in mask.indexed_iter() {
        if value > 0 {
            points.push(Vector2::new(
                height as f64 - row as f64,
                width as f64 / 2.0 - col as f64,
            ));
        }
    }

    points
}

/// Convert rover-frame points to polar form.
pub fn to_polar(points: &[Vector2<f64>]) -> PolarSummary {
    let mut summary = PolarSummary {
        dists_px: Vec::with_capacity(points.len()),
        angles_rad: Vec::with_capacity(points.len()),
    };

    for point in points {
        summary.dists_px.push(point.norm());
        summary.angles_rad.push(point.y.atan2(point.x));
    }

    summary
}

/// Convert rover-frame points into world map cell indices.
///
/// Each point is rotated by the rover's yaw, scaled down to map
/// resolution, translated to the rover's position, then truncated towards
/// zero and clipped into the map. Rotation always precedes translation.
pub fn to_world(
    points: &[Vector2<f64>],
    pose: &Pose,
    map_size_cells: usize,
    scale_px_per_m: f64,
) -> Vec<(usize, usize)> {
    let rotation = Rotation2::new(pose.yaw_rad());
    let max_cell = map_size_cells.saturating_sub(1) as i64;

    points
        .iter()
        .map(|point| {
            let rotated = rotation * point;
            let x = (pose.position_m.x + rotated.x / scale_px_per_m) as i64;
            let y = (pose.position_m.y + rotated.y / scale_px_per_m) as i64;

            (
                x.max(0).min(max_cell) as usize,
                y.max(0).min(max_cell) as usize,
            )
        })
        .collect()
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
