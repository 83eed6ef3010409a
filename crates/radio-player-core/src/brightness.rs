//! Average perceived brightness of a decoded image.
//!
//! Operates on raw RGBA pixel buffers (the layout `getImageData` hands back),
//! so the classification is a pure function of the pixels and reclassifying
//! the same image always yields the same answer.

/// Classification threshold on the 0-255 brightness scale. Averages strictly
/// above this count as light; exactly on it counts as dark.
pub const DEFAULT_THRESHOLD: f32 = 128.0;

/// Weighted luminance approximation for one pixel. Alpha is ignored.
pub fn perceived(r: u8, g: u8, b: u8) -> f32 {
    0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b)
}

/// Average perceived brightness over an RGBA buffer.
///
/// Returns `None` when the buffer is empty or not a whole number of RGBA
/// quads; callers treat that the same as an unreadable image.
///
/// The sum accumulates in `f64`: images arrive at natural resolution, and
/// an `f32` running sum loses the per-pixel increments once it grows past
/// their ulp, skewing multi-megapixel averages low.
pub fn average(rgba: &[u8]) -> Option<f32> {
    if rgba.is_empty() || rgba.len() % 4 != 0 {
        return None;
    }
    let sum: f64 = rgba
        .chunks_exact(4)
        .map(|px| f64::from(perceived(px[0], px[1], px[2])))
        .sum();
    Some((sum / (rgba.len() / 4) as f64) as f32)
}

/// Whether an RGBA buffer reads as a light image.
///
/// Unreadable buffers fall back to dark, matching the pipeline's contract
/// that a background must always resolve to some theme decision.
pub fn is_light(rgba: &[u8], threshold: f32) -> bool {
    average(rgba).is_some_and(|avg| avg > threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(r: u8, g: u8, b: u8, pixels: usize) -> Vec<u8> {
        let mut buf = Vec::with_capacity(pixels * 4);
        for _ in 0..pixels {
            buf.extend_from_slice(&[r, g, b, 255]);
        }
        buf
    }

    #[test]
    fn perceived_matches_weights() {
        assert_eq!(perceived(255, 0, 0), 0.299 * 255.0);
        assert_eq!(perceived(0, 255, 0), 0.587 * 255.0);
        assert_eq!(perceived(0, 0, 255), 0.114 * 255.0);
        assert_eq!(perceived(0, 0, 0), 0.0);
    }

    #[test]
    fn solid_dark_gray_is_dark() {
        let buf = solid(40, 40, 40, 16);
        assert!(!is_light(&buf, DEFAULT_THRESHOLD));
    }

    #[test]
    fn solid_near_white_is_light() {
        let buf = solid(250, 250, 250, 16);
        assert!(is_light(&buf, DEFAULT_THRESHOLD));
    }

    #[test]
    fn exactly_threshold_is_dark() {
        // Gray 128 averages to exactly 128.0; the boundary belongs to dark.
        let buf = solid(128, 128, 128, 8);
        assert_eq!(average(&buf), Some(128.0));
        assert!(!is_light(&buf, DEFAULT_THRESHOLD));
    }

    #[test]
    fn alpha_is_ignored() {
        let mut buf = solid(200, 200, 200, 4);
        for px in buf.chunks_exact_mut(4) {
            px[3] = 0;
        }
        assert!(is_light(&buf, DEFAULT_THRESHOLD));
    }

    #[test]
    fn unreadable_buffers_fall_back_to_dark() {
        assert!(!is_light(&[], DEFAULT_THRESHOLD));
        assert!(!is_light(&[255, 255, 255], DEFAULT_THRESHOLD));
    }

    #[test]
    fn multi_megapixel_average_does_not_drift_low() {
        // A running f32 sum stalls once it outgrows the per-pixel
        // increment's ulp, dragging large-image averages far below the
        // true value. Gray 140 over a 6000x6000 image must stay light.
        let pixels = 6000 * 6000;
        // Alpha is ignored, so a flat fill is an all-140 gray image.
        let buf = vec![140u8; pixels * 4];
        let avg = average(&buf).unwrap();
        assert!((avg - 140.0).abs() < 0.5, "average drifted to {avg}");
        assert!(is_light(&buf, DEFAULT_THRESHOLD));
    }

    #[test]
    fn classification_is_deterministic() {
        let buf = solid(90, 130, 200, 32);
        let first = is_light(&buf, DEFAULT_THRESHOLD);
        let second = is_light(&buf, DEFAULT_THRESHOLD);
        assert_eq!(first, second);
    }
}
