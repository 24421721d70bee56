//! Hex-colour parsing and blending.
//!
//! Block themes specify a single base colour per category; the darker border and
//! shadow tones are derived by blending that colour toward black.

/// Parses a `#rgb` or `#rrggbb` colour into its channels.
///
/// Returns `None` for anything else; callers fall back to their input colour.
pub fn parse_hex(colour: &str) -> Option<(u8, u8, u8)> {
    let hex = colour.strip_prefix('#')?;
    match hex.len() {
        3 => {
            let mut channels = [0u8; 3];
            for (i, ch) in hex.chars().enumerate() {
                let value = ch.to_digit(16)? as u8;
                channels[i] = value * 16 + value;
            }
            Some((channels[0], channels[1], channels[2]))
        }
        6 => {
            // get() rejects offsets that are not char boundaries, so multi-byte
            // input reads as unparseable instead of slicing out of bounds.
            let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
            let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
            let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;
            Some((r, g, b))
        }
        _ => None,
    }
}

/// Blends `factor` of `colour1` into `1 - factor` of `colour2`, channel-wise.
///
/// Returns the mix as `#rrggbb`, or `None` if either input fails to parse.
pub fn blend(colour1: &str, colour2: &str, factor: f64) -> Option<String> {
    let (r1, g1, b1) = parse_hex(colour1)?;
    let (r2, g2, b2) = parse_hex(colour2)?;
    let mix = |a: u8, b: u8| -> u8 {
        (f64::from(a) * factor + f64::from(b) * (1.0 - factor)).round() as u8
    };
    Some(format!(
        "#{:02x}{:02x}{:02x}",
        mix(r1, r2),
        mix(g1, g2),
        mix(b1, b2)
    ))
}
