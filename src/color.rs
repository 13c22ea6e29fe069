//! Color space helpers
//!
//! Colors in configuration are authored in gamma (sRGB) space and converted
//! to linear before they reach shaders.

use glam::{Vec3, Vec4};

/// Convert one sRGB-encoded channel to linear
pub fn gamma_to_linear(value: f32) -> f32 {
    if value <= 0.04045 {
        value / 12.92
    } else {
        ((value + 0.055) / 1.055).powf(2.4)
    }
}

/// Convert an sRGB color to linear, leaving alpha untouched
pub fn srgb_to_linear(color: Vec4) -> Vec4 {
    Vec4::new(
        gamma_to_linear(color.x),
        gamma_to_linear(color.y),
        gamma_to_linear(color.z),
        color.w,
    )
}

// D65 white point in LMS space
const D65_LMS: Vec3 = Vec3::new(0.949237, 1.03542, 1.08728);

fn cie_xy_to_lms(x: f32, y: f32) -> Vec3 {
    let big_y = 1.0;
    let big_x = big_y * x / y;
    let big_z = big_y * (1.0 - x - y) / y;

    Vec3::new(
        0.7328 * big_x + 0.4296 * big_y - 0.1624 * big_z,
        -0.7036 * big_x + 1.6975 * big_y + 0.0061 * big_z,
        0.0030 * big_x + 0.0136 * big_y + 0.9834 * big_z,
    )
}

/// LMS scale factors for a white balance adjustment.
///
/// `temperature` and `tint` are in `[-100, 100]`; `(0, 0)` is close to
/// identity.
pub fn white_balance_coefficients(temperature: f32, tint: f32) -> Vec3 {
    let t1 = temperature / 65.0;
    let t2 = tint / 65.0;

    // Standard illuminant chromaticity shifted along the Planckian locus
    let x = 0.31271 - t1 * if t1 < 0.0 { 0.1 } else { 0.05 };
    let y = 2.87 * x - 3.0 * x * x - 0.275_095_07 + t2 * 0.05;

    let w2 = cie_xy_to_lms(x, y);
    D65_LMS / w2
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_gamma_to_linear_endpoints() {
        assert_eq!(gamma_to_linear(0.0), 0.0);
        assert_relative_eq!(gamma_to_linear(1.0), 1.0, epsilon = 1e-6);
        assert_relative_eq!(gamma_to_linear(0.5), 0.214_041, epsilon = 1e-5);
        assert_relative_eq!(gamma_to_linear(0.04), 0.04 / 12.92, epsilon = 1e-7);
    }

    #[test]
    fn test_srgb_keeps_alpha() {
        let linear = srgb_to_linear(Vec4::new(1.0, 0.5, 0.0, 0.25));
        assert_eq!(linear.w, 0.25);
        assert_relative_eq!(linear.x, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_neutral_white_balance_is_near_identity() {
        let coefficients = white_balance_coefficients(0.0, 0.0);
        assert_relative_eq!(coefficients.x, 1.0, epsilon = 0.01);
        assert_relative_eq!(coefficients.y, 1.0, epsilon = 0.01);
        assert_relative_eq!(coefficients.z, 1.0, epsilon = 0.01);
    }

    #[test]
    fn test_warmer_temperature_boosts_long_wavelengths() {
        let warm = white_balance_coefficients(50.0, 0.0);
        let cool = white_balance_coefficients(-50.0, 0.0);
        assert!(warm.x / warm.z > cool.x / cool.z);
    }
}
