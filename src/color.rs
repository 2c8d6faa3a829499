use glam::Vec3;

/// Color in HSL space, used for the animated tint colors.
///
/// Hue is in degrees and always normalized to `[0, 360)`; saturation and
/// lightness are in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsl {
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
}

impl Hsl {
    pub fn new(hue: f32, saturation: f32, lightness: f32) -> Self {
        Self {
            hue: hue.rem_euclid(360.0),
            saturation,
            lightness,
        }
    }

    /// Rotates the hue by `degrees`, wrapping back into `[0, 360)`.
    pub fn rotate(&mut self, degrees: f32) {
        self.hue = (self.hue + degrees).rem_euclid(360.0);
    }

    pub fn to_rgb(self) -> Vec3 {
        let h = self.hue.rem_euclid(360.0);
        let c = (1.0 - (2.0 * self.lightness - 1.0).abs()) * self.saturation;
        let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
        let m = self.lightness - c / 2.0;

        let (r, g, b) = if h < 60.0 {
            (c, x, 0.0)
        } else if h < 120.0 {
            (x, c, 0.0)
        } else if h < 180.0 {
            (0.0, c, x)
        } else if h < 240.0 {
            (0.0, x, c)
        } else if h < 300.0 {
            (x, 0.0, c)
        } else {
            (c, 0.0, x)
        };

        Vec3::new(r + m, g + m, b + m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Vec3, expected: Vec3) {
        assert!(
            actual.abs_diff_eq(expected, 1e-5),
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn primary_hues_convert_to_rgb() {
        assert_close(Hsl::new(0.0, 1.0, 0.5).to_rgb(), Vec3::new(1.0, 0.0, 0.0));
        assert_close(Hsl::new(120.0, 1.0, 0.5).to_rgb(), Vec3::new(0.0, 1.0, 0.0));
        assert_close(Hsl::new(240.0, 1.0, 0.5).to_rgb(), Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn tint_start_colors_are_cyan_and_yellow() {
        assert_close(Hsl::new(180.0, 1.0, 0.5).to_rgb(), Vec3::new(0.0, 1.0, 1.0));
        assert_close(Hsl::new(60.0, 1.0, 0.5).to_rgb(), Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn lightness_extremes_are_black_and_white() {
        assert_close(Hsl::new(90.0, 1.0, 0.0).to_rgb(), Vec3::ZERO);
        assert_close(Hsl::new(90.0, 1.0, 1.0).to_rgb(), Vec3::ONE);
    }

    #[test]
    fn zero_saturation_is_gray() {
        assert_close(Hsl::new(270.0, 0.0, 0.25).to_rgb(), Vec3::splat(0.25));
    }

    #[test]
    fn rotation_wraps_into_range() {
        let mut color = Hsl::new(350.0, 1.0, 0.5);
        color.rotate(20.0);
        assert!((color.hue - 10.0).abs() < 1e-4);

        color.rotate(-30.0);
        assert!((color.hue - 340.0).abs() < 1e-4);

        color.rotate(3600.0 * 7.0 + 5.0);
        assert!(color.hue >= 0.0 && color.hue < 360.0);
    }
}
