//! Hue parsing for color-mapping entries
//!
//! A hue is written either as degrees (`"200"`) or as a color name (`"cyan"`).
//! An optional `prefix:` is stripped first so that several entries with the
//! same color can be told apart (`"kick:red"`, `"snare:red"`).

/// Largest accepted hue in degrees (360 wraps to red)
pub const MAX_HUE: u16 = 360;

/// Named colors and their hue in degrees
const NAMED_HUES: &[(&str, u16)] = &[
    ("red", 0),
    ("yellow", 60),
    ("green", 120),
    ("cyan", 180),
    ("blue", 240),
    ("magenta", 300),
];

/// Parse a hue string, returning degrees or `None` if it is not recognised
pub fn parse_hue(value: &str) -> Option<u16> {
    let key = match value.split_once(':') {
        Some((_, rest)) => rest,
        None => value,
    };
    let key = key.trim();

    if let Some((_, hue)) = NAMED_HUES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(key))
    {
        return Some(*hue);
    }

    if !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit()) {
        return key.parse::<u16>().ok().filter(|hue| *hue <= MAX_HUE);
    }

    None
}
