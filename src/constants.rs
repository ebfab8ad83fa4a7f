//! Shared numeric and naming constants used across the peak picker (C4) and
//! the note/cents decision (C6).

/// Offset added to `round(cf)` to get an absolute note number indexed from
/// C0 = 0; A4 lands at note number 57 (spec.md's `C5_OFFSET`, named for the
/// source constant it mirrors, not for "C5" meaning a module).
pub const C5_OFFSET: i32 = 57;

/// Note names for `note_number % 12`, indexed from C.
pub const NOTE_NAMES: [&str; 12] =
    ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];

/// Computes `cf = -12 * log2(reference_a / frequency_hz)`, the fractional
/// semitone distance from the reference pitch.
pub fn semitones_from_reference(reference_a: f64, frequency_hz: f64) -> f64 {
    -12.0 * (reference_a / frequency_hz).log2()
}
