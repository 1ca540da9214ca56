//! RGBA colors and HSL conversion.

/// Color with components in the 0.0-1.0 range
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);

    /// From 8-bit style channels (0-255); values are clamped
    pub fn from_rgb255(rgb: [f32; 3], alpha: f32) -> Self {
        Self {
            r: (rgb[0] / 255.0).clamp(0.0, 1.0),
            g: (rgb[1] / 255.0).clamp(0.0, 1.0),
            b: (rgb[2] / 255.0).clamp(0.0, 1.0),
            a: alpha.clamp(0.0, 1.0),
        }
    }

    /// CSS-style `hsla()`.
    ///
    /// # Arguments
    /// * `hue` - Degrees, any value (wrapped modulo 360)
    /// * `saturation` - Percent (clamped to 0-100)
    /// * `lightness` - Percent (clamped to 0-100)
    /// * `alpha` - Opacity (clamped to 0-1)
    pub fn hsla(hue: f32, saturation: f32, lightness: f32, alpha: f32) -> Self {
        let hue = hue.rem_euclid(360.0);
        let s = (saturation / 100.0).clamp(0.0, 1.0);
        let l = (lightness / 100.0).clamp(0.0, 1.0);

        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs());
        let m = l - c / 2.0;

        let (r1, g1, b1) = if hue < 60.0 {
            (c, x, 0.0)
        } else if hue < 120.0 {
            (x, c, 0.0)
        } else if hue < 180.0 {
            (0.0, c, x)
        } else if hue < 240.0 {
            (0.0, x, c)
        } else if hue < 300.0 {
            (x, 0.0, c)
        } else {
            (c, 0.0, x)
        };

        Self {
            r: r1 + m,
            g: g1 + m,
            b: b1 + m,
            a: alpha.clamp(0.0, 1.0),
        }
    }

    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            a: alpha.clamp(0.0, 1.0),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_hsla_primaries() {
        let red = Color::hsla(0.0, 100.0, 50.0, 1.0);
        assert_relative_eq!(red.r, 1.0);
        assert_relative_eq!(red.g, 0.0);
        assert_relative_eq!(red.b, 0.0);

        let blue = Color::hsla(240.0, 100.0, 50.0, 0.5);
        assert_relative_eq!(blue.b, 1.0);
        assert_relative_eq!(blue.r, 0.0);
        assert_relative_eq!(blue.a, 0.5);
    }

    #[test]
    fn test_hue_wraps_past_360() {
        let a = Color::hsla(30.0, 40.0, 60.0, 1.0);
        let b = Color::hsla(390.0, 40.0, 60.0, 1.0);
        let c = Color::hsla(-330.0, 40.0, 60.0, 1.0);
        assert_relative_eq!(a.r, b.r, epsilon = 1e-5);
        assert_relative_eq!(a.g, b.g, epsilon = 1e-5);
        assert_relative_eq!(a.b, c.b, epsilon = 1e-5);
    }

    #[test]
    fn test_alpha_is_clamped() {
        assert_eq!(Color::hsla(0.0, 0.0, 0.0, 3.0).a, 1.0);
        assert_eq!(Color::from_rgb255([26.0, 28.0, 46.0], -1.0).a, 0.0);
        assert_eq!(Color::BLACK.with_alpha(0.25).a, 0.25);
    }
}
