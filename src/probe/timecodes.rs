//! Initial delay from an extracted v2 timecode file

/// Delay in whole milliseconds of the first frame.
///
/// Line one of the file is the format header, line two the first timestamp.
/// A zero delay needs no sync and comes back as `None`, as does a file
/// without a parseable second line.
pub fn parse_initial_delay(content: &str) -> Option<i64> {
    let first = content.lines().nth(1)?.trim();
    let millis = first.parse::<f64>().ok()?;
    if !millis.is_finite() {
        return None;
    }

    let delay = millis.round() as i64;
    (delay != 0).then_some(delay)
}
