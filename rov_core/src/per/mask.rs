//! Terrain classification masks over warped camera frames.
//!
//! Masks are `(row, col)` arrays of zeros and ones, one per terrain class.
//! The navigable and obstacle thresholds are deliberately separated so that
//! pixels between them (shadow edges, the warp's black border fringes)
//! belong to neither class.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use image::RgbImage;
use ndarray::Array2;

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Mask of pixels bright enough in every channel to be navigable ground.
///
/// A pixel is navigable when all three channels are strictly above the
/// threshold.
pub fn navigable_mask(img: &RgbImage, thresh_rgb: &[u8; 3]) -> Array2<u8> {
    mask_by(img, |px| {
        px[0] > thresh_rgb[0] && px[1] > thresh_rgb[1] && px[2] > thresh_rgb[2]
    })
}

/// Mask of pixels dark enough in every channel to be an obstacle.
///
/// A pixel is an obstacle when all three channels are strictly below the
/// threshold.
pub fn obstacle_mask(img: &RgbImage, thresh_rgb: &[u8; 3]) -> Array2<u8> {
    mask_by(img, |px| {
        px[0] < thresh_rgb[0] && px[1] < thresh_rgb[1] && px[2] < thresh_rgb[2]
    })
}

/// Mask of pixels inside the target sample's HSV band, both bounds
/// inclusive.
pub fn target_mask(img: &RgbImage, lower_hsv: &[f64; 3], upper_hsv: &[f64; 3]) -> Array2<u8> {
    mask_by(img, |px| {
        let (h, s, v) = rgb_to_hsv(px[0], px[1], px[2]);

        h >= lower_hsv[0]
            && h <= upper_hsv[0]
            && s >= lower_hsv[1]
            && s <= upper_hsv[1]
            && v >= lower_hsv[2]
            && v <= upper_hsv[2]
    })
}

/// Convert an RGB pixel to HSV using the OpenCV 8-bit scaling: hue in
/// [0, 180), saturation and value in [0, 255].
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    let r = r as f64 / 255.0;
    let g = g as f64 / 255.0;
    let b = b as f64 / 255.0;

    let cmax = r.max(g).max(b);
    let cmin = r.min(g).min(b);
    let delta = cmax - cmin;

    let mut hue_deg = if delta == 0.0 {
        0.0
    } else if cmax == r {
        60.0 * (g - b) / delta
    } else if cmax == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };

    if hue_deg < 0.0 {
        hue_deg += 360.0;
    }

    let sat = if cmax == 0.0 { 0.0 } else { delta / cmax };

    (hue_deg / 2.0, sat * 255.0, cmax * 255.0)
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn mask_by<F>(img: &RgbImage, predicate: F) -> Array2<u8>
where
    F: Fn(&[u8; 3]) -> bool,
{
    let (width, height) = img.dimensions();
    let mut mask = Array2::zeros((height as usize, width as usize));

    for (x, y, pixel) in img.enumerate_pixels() {
        if predicate(&pixel.0) {
            mask[[y as usize, x as usize]] = 1;
        }
    }

    mask
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
