//! Perspective warp between the camera frame and the top-down view.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use image::RgbImage;
use nalgebra::{DMatrix, DVector, Matrix3, Vector3};

// Internal
use super::PerError;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// An exact four-point perspective transform between the camera frame and
/// the top-down grid.
#[derive(Debug, Clone)]
pub struct PerspectiveWarp {
    /// Forward transform, camera pixel to top-down pixel
    fwd: Matrix3<f64>,

    /// Inverse transform, used to sample the camera frame
    inv: Matrix3<f64>,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl PerspectiveWarp {
    /// Solve the transform mapping each source point onto its destination.
    ///
    /// With the last element of the matrix pinned to one the four point
    /// pairs give an 8x8 linear system in the remaining elements. Fails if
    /// the points are degenerate (for instance three collinear corners), in
    /// which case no unique transform exists.
    pub fn from_points(src: &[[f64; 2]; 4], dst: &[[f64; 2]; 4]) -> Result<Self, PerError> {
        let mut a = DMatrix::<f64>::zeros(8, 8);
        let mut b = DVector::<f64>::zeros(8);

        for (i, (s, d)) in src.iter().zip(dst.iter()).enumerate() {
            let (x, y) = (s[0], s[1]);
            let (u, v) = (d[0], d[1]);

            a[(2 * i, 0)] = x;
            a[(2 * i, 1)] = y;
            a[(2 * i, 2)] = 1.0;
            a[(2 * i, 6)] = -u * x;
            a[(2 * i, 7)] = -u * y;
            b[2 * i] = u;

            a[(2 * i + 1, 3)] = x;
            a[(2 * i + 1, 4)] = y;
            a[(2 * i + 1, 5)] = 1.0;
            a[(2 * i + 1, 6)] = -v * x;
            a[(2 * i + 1, 7)] = -v * y;
            b[2 * i + 1] = v;
        }

        let h = a.lu().solve(&b).ok_or(PerError::DegenerateWarpPoints)?;

        let fwd = Matrix3::new(h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0);
        let inv = fwd.try_inverse().ok_or(PerError::DegenerateWarpPoints)?;

        Ok(Self { fwd, inv })
    }

    /// Project a camera frame point into the top-down view.
    ///
    /// `None` if the point sits on the transform's horizon line, where the
    /// projection diverges.
    pub fn project(&self, point: [f64; 2]) -> Option<[f64; 2]> {
        apply_homography(&self.fwd, point)
    }

    /// Warp a camera frame into the top-down view.
    ///
    /// Each output pixel samples its nearest source pixel through the
    /// inverse transform. Output pixels mapping outside the source frame
    /// are left black.
    pub fn warp_image(&self, img: &RgbImage) -> RgbImage {
        let (width, height) = img.dimensions();
        let mut warped = RgbImage::new(width, height);

        for y in 0..height {
            for x in 0..width {
                let src = match apply_homography(&self.inv, [x as f64, y as f64]) {
                    Some(src) => src,
                    None => continue,
                };

                let src_x = src[0].round() as i64;
                let src_y = src[1].round() as i64;

                if src_x >= 0 && src_x < width as i64 && src_y >= 0 && src_y < height as i64 {
                    warped.put_pixel(x, y, *img.get_pixel(src_x as u32, src_y as u32));
                }
            }
        }

        warped
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Apply a homography to a 2D point, normalising out the projective scale.
fn apply_homography(mat: &Matrix3<f64>, point: [f64; 2]) -> Option<[f64; 2]> {
    let projected = mat * Vector3::new(point[0], point[1], 1.0);

    if projected.z.abs() < f64::EPSILON {
        return None;
    }

    Some([projected.x / projected.z, projected.y / projected.z])
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
