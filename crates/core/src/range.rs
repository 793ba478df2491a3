//! Linear range remapping shared by the timeline, prosody and animation code.

/// Spans narrower than this are treated as empty.
const MIN_SPAN: f64 = 1e-12;

/// Map `x` from the range `[a, b]` onto `[c, d]`.
///
/// Values outside `[a, b]` extrapolate linearly. An empty source range
/// (`a == b`) returns `c` instead of dividing by zero.
pub fn transform(x: f64, a: f64, b: f64, c: f64, d: f64) -> f64 {
    let span = b - a;
    if span.abs() < MIN_SPAN {
        return c;
    }
    (x - a) * ((d - c) / span) + c
}

/// Round to two decimals, the resolution of aligner timestamps.
pub fn round_centis(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
