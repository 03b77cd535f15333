//! # Synthetic camera frames
//!
//! Deterministic camera frames for exercising the perception pipeline
//! without the simulation: a bright ground plane below the horizon, dark
//! terrain above it, and optionally a target sample blob. The Perlin
//! texture keeps the masks from being trivially uniform while staying well
//! inside the classification thresholds.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use image::RgbImage;
use noise::{NoiseFn, Perlin, Seedable};

// Internal
use util::maths;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Fraction of the frame height taken by the terrain above the horizon.
const HORIZON_FRACTION: f64 = 0.45;

/// Base brightness of the ground plane, comfortably above the navigable
/// threshold even at full noise swing.
const GROUND_LEVEL: f64 = 200.0;

/// Base brightness of the terrain above the horizon, comfortably below the
/// obstacle threshold.
const SKY_LEVEL: f64 = 100.0;

/// Brightness swing applied by the noise field.
const NOISE_AMPLITUDE: f64 = 20.0;

/// Spatial frequency of the noise field.
const NOISE_SCALE: f64 = 0.05;

/// Colour of the target sample blob, inside the target HSV band.
const TARGET_COLOUR: [u8; 3] = [220, 180, 40];

/// Radius of the target sample blob.
///
/// Units: pixels
const TARGET_RADIUS_PX: f64 = 4.0;

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Generate a deterministic synthetic camera frame.
///
/// The frame has a navigable ground band below the horizon and obstacle
/// terrain above it, textured with Perlin noise so different seeds give
/// different frames. `target_px` draws a sample blob centred on the given
/// pixel.
pub fn generate_test_frame(
    width_px: u32,
    height_px: u32,
    seed: u32,
    target_px: Option<(u32, u32)>,
) -> RgbImage {
    let perlin = Perlin::new().set_seed(seed);
    let horizon_y = (height_px as f64 * HORIZON_FRACTION) as u32;

    let mut frame = RgbImage::new(width_px, height_px);

    for (x, y, pixel) in frame.enumerate_pixels_mut() {
        let noise_val = perlin.get([x as f64 * NOISE_SCALE, y as f64 * NOISE_SCALE]);

        let base = if y < horizon_y { SKY_LEVEL } else { GROUND_LEVEL };
        let level = maths::clamp(base + noise_val * NOISE_AMPLITUDE, 0.0, 255.0).round() as u8;

        pixel.0 = [level, level, level];
    }

    if let Some((tx, ty)) = target_px {
        for (x, y, pixel) in frame.enumerate_pixels_mut() {
            let dx = x as f64 - tx as f64;
            let dy = y as f64 - ty as f64;

            if dx * dx + dy * dy <= TARGET_RADIUS_PX * TARGET_RADIUS_PX {
                pixel.0 = TARGET_COLOUR;
            }
        }
    }

    frame
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::per::mask;

    #[test]
    fn test_determinism() {
        let a = generate_test_frame(320, 160, 3, None);
        let b = generate_test_frame(320, 160, 3, None);
        assert_eq!(a.as_raw(), b.as_raw());

        let c = generate_test_frame(320, 160, 4, None);
        assert_ne!(a.as_raw(), c.as_raw());
    }

    #[test]
    fn test_ground_and_sky_classes() {
        let frame = generate_test_frame(320, 160, 3, None);

        let nav = mask::navigable_mask(&frame, &[160, 160, 160]);
        let obs = mask::obstacle_mask(&frame, &[150, 150, 150]);

        // Everything below the horizon is navigable, everything above it
        // is obstacle
        assert_eq!(nav[[159, 10]], 1);
        assert_eq!(nav[[100, 200]], 1);
        assert_eq!(nav[[10, 10]], 0);

        assert_eq!(obs[[10, 10]], 1);
        assert_eq!(obs[[159, 10]], 0);
    }

    #[test]
    fn test_target_blob() {
        let frame = generate_test_frame(320, 160, 3, Some((100, 120)));

        let tgt = mask::target_mask(&frame, &[0.0, 100.0, 100.0], &[55.0, 255.0, 255.0]);

        assert_eq!(tgt[[120, 100]], 1);
        // The blob is local
        assert_eq!(tgt[[20, 300]], 0);

        let no_target = generate_test_frame(320, 160, 3, None);
        let tgt = mask::target_mask(&no_target, &[0.0, 100.0, 100.0], &[55.0, 255.0, 255.0]);
        assert!(tgt.iter().all(|&v| v == 0));
    }
}
