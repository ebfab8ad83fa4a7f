//! Note/cents decision (C6): chooses the fundamental among peaks, computes
//! the reference frequency and cents deviation, and gates the result on
//! plausibility.

use crate::constants::{semitones_from_reference, C5_OFFSET, NOTE_NAMES};
use crate::error::TunerError;
use crate::peak_picker::Peak;
use crate::temperament::TemperamentRegistry;

/// Half the cents-gate window (spec.md §4.6 step 6): results further than
/// this from the nearest in-tune note are reported invalid.
pub const CENTS_VALIDITY_GATE: f64 = 50.0;

/// Final decision for one analysis hop.
#[derive(Debug, Clone, PartialEq)]
pub struct PitchResult {
    pub valid: bool,
    pub frequency_hz: f64,
    pub reference_hz: f64,
    pub cents: f64,
    pub note_number: i32,
    pub octave: i32,
    pub note_name: &'static str,
    pub confidence: f64,
    pub band_low_hz: f64,
    pub band_high_hz: f64,
    pub peaks: Vec<Peak>,
}

impl PitchResult {
    /// The fully zeroed "no pitch" result exposed by the frame driver (C7)
    /// once the invalid-frame hold-off expires.
    pub fn silent() -> Self {
        Self::invalid(Vec::new(), 0.0)
    }

    fn invalid(peaks: Vec<Peak>, confidence: f64) -> Self {
        Self {
            valid: false,
            frequency_hz: 0.0,
            reference_hz: 0.0,
            cents: 0.0,
            note_number: 0,
            octave: 0,
            note_name: NOTE_NAMES[0],
            confidence,
            band_low_hz: 0.0,
            band_high_hz: 0.0,
            peaks,
        }
    }
}

/// Decides the final note and cents deviation from a peak list (spec.md §4.6).
pub fn decide(
    peaks: &[Peak],
    reference_a: f64,
    registry: &TemperamentRegistry,
    temperament_index: usize,
    key: i32,
    confidence: f64,
) -> Result<PitchResult, TunerError> {
    if peaks.is_empty() {
        return Ok(PitchResult::invalid(Vec::new(), confidence));
    }

    let f = peaks[0].frequency_hz;
    let cf = semitones_from_reference(reference_a, f);
    if !cf.is_finite() {
        return Ok(PitchResult::invalid(peaks.to_vec(), confidence));
    }

    let rounded_cf = cf.round();
    let note = rounded_cf as i32 + C5_OFFSET;
    if note < 0 {
        return Ok(PitchResult::invalid(peaks.to_vec(), confidence));
    }

    let reference_hz =
        registry.reference_frequency(temperament_index, key, reference_a, note, rounded_cf)?;
    let band_low_hz = registry.reference_frequency(
        temperament_index,
        key,
        reference_a,
        note,
        rounded_cf - 0.55,
    )?;
    let band_high_hz = registry.reference_frequency(
        temperament_index,
        key,
        reference_a,
        note,
        rounded_cf + 0.55,
    )?;

    let snapped = peaks
        .iter()
        .min_by(|a, b| {
            let da = (a.frequency_hz - reference_hz).abs();
            let db = (b.frequency_hz - reference_hz).abs();
            da.partial_cmp(&db).unwrap()
        })
        .expect("peaks is non-empty");
    let f = snapped.frequency_hz;

    let cents = -12.0 * (reference_hz / f).log2() * 100.0;
    if !cents.is_finite() || (cents / 100.0).abs() > CENTS_VALIDITY_GATE / 100.0 {
        return Ok(PitchResult::invalid(peaks.to_vec(), confidence));
    }

    Ok(PitchResult {
        valid: true,
        frequency_hz: f,
        reference_hz,
        cents,
        note_number: note,
        octave: note.div_euclid(12),
        note_name: NOTE_NAMES[note.rem_euclid(12) as usize],
        confidence,
        band_low_hz,
        band_high_hz,
        peaks: peaks.to_vec(),
    })
}
