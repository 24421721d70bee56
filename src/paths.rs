//! Builders for relative SVG path fragments.
//!
//! All shape geometry in this crate is emitted through these helpers so that the
//! fragments concatenate into a single well-formed `d` attribute. Every builder
//! returns a self-delimiting piece of path text (leading/trailing spaces included),
//! and numbers print with their shortest round-trip representation, so whole values
//! come out without a decimal point.

/// Formats a relative coordinate pair, e.g. `"12,-4 "`.
pub fn point(x: f64, y: f64) -> String {
    format!("{},{} ", x, y)
}

/// An absolute move command, e.g. `"M 0,0 "`.
pub fn move_to(x: f64, y: f64) -> String {
    format!("M {}", point(x, y))
}

/// A single relative line command, e.g. `" l 12,-4 "`.
pub fn line_to(x: f64, y: f64) -> String {
    format!(" l {}", point(x, y))
}

/// A relative polyline through the given points, e.g. `" l 4,4 8,0 "`.
pub fn line(points: &[String]) -> String {
    format!(" l {}", points.concat())
}

/// An axis-aligned line command (`h` or `v`), e.g. `" v 16 "`.
pub fn line_on_axis(command: char, value: f64) -> String {
    format!(" {} {} ", command, value)
}

/// A cubic curve command through the given control/end points,
/// e.g. `" c 2,0 3,1 4,2 "`.
pub fn curve(command: char, points: &[String]) -> String {
    format!(" {} {}", command, points.concat())
}

/// A circular arc command of the given radius ending at `end`.
///
/// `flags` carries the x-axis-rotation, large-arc and sweep flags in SVG order,
/// e.g. `"0 0 1"`. The result looks like `"a 12 12 0 0 1 0,24 "`.
pub fn arc(command: char, flags: &str, radius: f64, end: &str) -> String {
    format!("{} {} {} {} {}", command, radius, radius, flags, end)
}
