//! Segment color palette & helpers.
//! New segments draw from a fixed set of high-contrast colors first and only
//! fall back to random HSL picks once the palette is used up.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

/// Base palette (hex, lower case). Update here only.
pub const NICE_COLORS: [&str; 20] = [
    "#ff4d4f", "#faad14", "#52c41a", "#1890ff", "#722ed1", //
    "#13c2c2", "#eb2f96", "#fa541c", "#2f54eb", "#a0d911", //
    "#fadb14", "#36cfc9", "#9254de", "#ff7a45", "#40a9ff", //
    "#73d13d", "#ff85c0", "#ffc53d", "#5cdbd3", "#b37feb",
];

/// Returned when neither the palette nor random HSL attempts yield an unused color.
pub const FALLBACK_COLOR: &str = "#7c4dff";

const HSL_ATTEMPTS: usize = 60;

/// Colors compare case-insensitively, ignoring surrounding whitespace.
pub fn normalize_hex(color: &str) -> String {
    color.trim().to_ascii_lowercase()
}

/// `h` in degrees, `s` and `l` in percent.
pub fn hsl_to_hex(h: f64, s: f64, l: f64) -> String {
    let s = s / 100.0;
    let l = l / 100.0;
    let a = s * l.min(1.0 - l);
    let channel = |n: f64| {
        let k = (n + h / 30.0) % 12.0;
        let v = l - a * (k - 3.0).min(9.0 - k).min(1.0).max(-1.0);
        (v * 255.0).round().clamp(0.0, 255.0) as u8
    };
    format!("#{:02x}{:02x}{:02x}", channel(0.0), channel(8.0), channel(4.0))
}

/// Picks a color not present in `used`.
pub fn pick_new_color<'a, I, R>(used: I, rng: &mut R) -> String
where
    I: IntoIterator<Item = &'a str>,
    R: Rng + ?Sized,
{
    let used: HashSet<String> = used.into_iter().map(normalize_hex).collect();
    let candidates: Vec<&str> = NICE_COLORS
        .iter()
        .copied()
        .filter(|c| !used.contains(*c))
        .collect();
    if let Some(c) = candidates.choose(rng) {
        return (*c).to_string();
    }
    for _ in 0..HSL_ATTEMPTS {
        let hue = rng.gen_range(0..360) as f64;
        let sat = 75.0 + rng.gen_range(0..10) as f64;
        let lig = 50.0 + rng.gen_range(0..10) as f64;
        let c = hsl_to_hex(hue, sat, lig);
        if !used.contains(&c) {
            return c;
        }
    }
    FALLBACK_COLOR.to_string()
}
