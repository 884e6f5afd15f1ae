// src/color.rs
//
// Derived, purely cosmetic user colors. The hue is a deterministic
// function of a seed (the user id) so a user keeps their color across
// sessions without storing anything.

/// CSS `hsl()` string for a seed.
pub fn hsl(seed: i64) -> String {
    let hue = (seed * 12345).rem_euclid(360);
    format!("hsl({}, 50%, 40%)", hue)
}

/// Darker variant, used for low-emphasis rendering.
pub fn hsl_dark(seed: i64) -> String {
    let hue = (seed * 12345).rem_euclid(360);
    format!("hsl({}, 30%, 30%)", hue)
}

/// `#RRGGBB` hex color for a seed.
pub fn hex(seed: i64) -> String {
    let hue = (seed * 12345).rem_euclid(360) as f64;
    hsl_to_hex(hue, 0.5, 0.5)
}

fn hsl_to_hex(h: f64, s: f64, l: f64) -> String {
    let h = (h % 360.0) / 360.0;

    let (r, g, b) = if s == 0.0 {
        // No saturation means a shade of gray.
        (l, l, l)
    } else {
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        (
            hue_to_rgb(p, q, h + 1.0 / 3.0),
            hue_to_rgb(p, q, h),
            hue_to_rgb(p, q, h - 1.0 / 3.0),
        )
    };

    format!(
        "#{:02X}{:02X}{:02X}",
        (r * 255.0).round() as u8,
        (g * 255.0).round() as u8,
        (b * 255.0).round() as u8
    )
}

fn hue_to_rgb(p: f64, q: f64, t: f64) -> f64 {
    let mut t = t;
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hsl_is_deterministic_per_seed() {
        assert_eq!(hsl(1), hsl(1));
        assert_ne!(hsl(1), hsl(2));
        assert_eq!(hsl(1), "hsl(105, 50%, 40%)");
        assert_eq!(hsl_dark(1), "hsl(105, 30%, 30%)");
    }

    #[test]
    fn hex_produces_valid_rgb() {
        let c = hex(7);
        assert_eq!(c.len(), 7);
        assert!(c.starts_with('#'));
        assert!(c[1..].chars().all(|ch| ch.is_ascii_hexdigit()));
    }

    #[test]
    fn gray_when_unsaturated() {
        assert_eq!(hsl_to_hex(0.0, 0.0, 0.5), "#808080");
    }
}
