//! Peak picker (C4): local-max detection under amplitude, derivative-sign,
//! and fundamental/note/octave filters, bounded to a short list.

use crate::constants::{semitones_from_reference, C5_OFFSET};
use crate::error::TunerError;
use crate::temperament::TemperamentRegistry;

/// One accepted spectral peak.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    pub frequency_hz: f64,
    pub reference_hz: f64,
    pub note_number: i32,
}

/// Which pitch classes and octaves the *note filter* permits, and whether
/// the *fundamental filter* restricts later peaks to the first peak's pitch
/// class (spec.md §4.4 steps 2-3).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterConfig {
    pub fundamental_filter: bool,
    pub note_filter: bool,
    pub enabled_pitch_classes: [bool; 12],
    pub min_octave: i32,
    pub max_octave: i32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            fundamental_filter: false,
            note_filter: false,
            enabled_pitch_classes: [true; 12],
            min_octave: 0,
            max_octave: 10,
        }
    }
}

/// Output of a peak-picking pass: the accepted peaks (frequency-ascending,
/// at most `max_peaks`) and the largest magnitude observed while scanning
/// (reused as `PitchResult.confidence` by C6).
#[derive(Debug, Clone, PartialEq)]
pub struct PeakPickResult {
    pub peaks: Vec<Peak>,
    pub max_magnitude: f64,
}

/// Runs the peak picker over one hop's refined spectrum.
///
/// `mag`, `refined_freq`, and `derivative` must have the same length `R`.
/// `hps_enabled` controls whether an accepted peak tightens the search
/// window to the octave above it (spec.md §4.4 step 6); when HPS has
/// already sharpened the spectrum that tightening is redundant.
#[allow(clippy::too_many_arguments)]
pub fn pick_peaks(
    mag: &[f64],
    refined_freq: &[f64],
    derivative: &[f64],
    filters: &FilterConfig,
    registry: &TemperamentRegistry,
    temperament_index: usize,
    key: i32,
    reference_a: f64,
    max_peaks: usize,
    min_amplitude: f64,
    hps_enabled: bool,
) -> Result<PeakPickResult, TunerError> {
    assert_eq!(mag.len(), refined_freq.len());
    assert_eq!(mag.len(), derivative.len());

    let r = mag.len();
    let mut peaks: Vec<Peak> = Vec::new();
    let mut fundamental_pitch_class: Option<i32> = None;
    let mut max_so_far = 0.0_f64;
    let mut limit = r.saturating_sub(1);
    let mut i = 1usize;

    while i < limit.saturating_sub(1) && i + 1 < r {
        let freq = refined_freq[i];
        let cf = semitones_from_reference(reference_a, freq);
        if !cf.is_finite() {
            i += 1;
            continue;
        }
        let rounded_cf = cf.round();
        let note = rounded_cf as i32 + C5_OFFSET;
        if note < 0 {
            i += 1;
            continue;
        }

        if filters.fundamental_filter {
            if let Some(pc) = fundamental_pitch_class {
                if note.rem_euclid(12) != pc {
                    i += 1;
                    continue;
                }
            }
        }

        if filters.note_filter {
            let pc = note.rem_euclid(12) as usize;
            let octave = note.div_euclid(12);
            if !filters.enabled_pitch_classes[pc]
                || octave < filters.min_octave
                || octave > filters.max_octave
            {
                i += 1;
                continue;
            }
        }

        if mag[i] > max_so_far {
            max_so_far = mag[i];
        }

        let is_local_max = mag[i] > min_amplitude
            && mag[i] > max_so_far / 4.0
            && derivative[i] > 0.0
            && derivative[i + 1] < 0.0;

        if is_local_max && peaks.len() < max_peaks {
            let reference_hz =
                registry.reference_frequency(temperament_index, key, reference_a, note, rounded_cf)?;
            peaks.push(Peak { frequency_hz: freq, reference_hz, note_number: note });

            if fundamental_pitch_class.is_none() {
                fundamental_pitch_class = Some(note.rem_euclid(12));
            }
            if !hps_enabled {
                limit = limit.min(2 * i - 1);
            }
        }

        i += 1;
    }

    Ok(PeakPickResult { peaks, max_magnitude: max_so_far })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::temperament::TemperamentRegistry;

    fn synthetic_peak_spectrum(r: usize, peak_bin: usize, fps: f64) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let mut mag = vec![0.0; r];
        let mut refined_freq = vec![0.0; r];
        for i in 0..r {
            refined_freq[i] = i as f64 * fps;
        }
        mag[peak_bin - 1] = 0.6;
        mag[peak_bin] = 2.0;
        mag[peak_bin + 1] = 0.6;
        let mut derivative = vec![0.0; r];
        for i in 1..r {
            derivative[i] = mag[i] - mag[i - 1];
        }
        (mag, refined_freq, derivative)
    }

    #[test]
    fn finds_single_local_maximum() {
        let fps = 11025.0 / 16384.0;
        let peak_bin = (440.0 / fps).round() as usize;
        let (mag, refined_freq, derivative) = synthetic_peak_spectrum(7168, peak_bin, fps);
        let registry = TemperamentRegistry::new();
        let result = pick_peaks(
            &mag,
            &refined_freq,
            &derivative,
            &FilterConfig::default(),
            &registry,
            registry.equal_temperament_index(),
            0,
            440.0,
            8,
            0.5,
            true,
        )
        .unwrap();
        assert_eq!(result.peaks.len(), 1);
        assert!((result.peaks[0].frequency_hz - refined_freq[peak_bin]).abs() < 1e-9);
    }

    #[test]
    fn rejects_peaks_below_minimum_amplitude() {
        let fps = 11025.0 / 16384.0;
        let peak_bin = (440.0 / fps).round() as usize;
        let (mut mag, refined_freq, mut derivative) = synthetic_peak_spectrum(7168, peak_bin, fps);
        mag[peak_bin] = 0.2;
        for i in 1..mag.len() {
            derivative[i] = mag[i] - mag[i - 1];
        }
        let registry = TemperamentRegistry::new();
        let result = pick_peaks(
            &mag,
            &refined_freq,
            &derivative,
            &FilterConfig::default(),
            &registry,
            registry.equal_temperament_index(),
            0,
            440.0,
            8,
            0.5,
            true,
        )
        .unwrap();
        assert!(result.peaks.is_empty());
    }

    #[test]
    fn peak_list_is_frequency_ascending_and_capped() {
        let fps = 11025.0 / 16384.0;
        let r = 7168;
        let mut mag = vec![0.0; r];
        let mut refined_freq = vec![0.0; r];
        for i in 0..r {
            refined_freq[i] = i as f64 * fps;
        }
        let base_bin = (220.0 / fps).round() as usize;
        for k in 1..=9u64 {
            let bin = base_bin * k as usize;
            if bin + 1 < r {
                mag[bin - 1] = 0.6;
                mag[bin] = 2.0;
                mag[bin + 1] = 0.6;
            }
        }
        let mut derivative = vec![0.0; r];
        for i in 1..r {
            derivative[i] = mag[i] - mag[i - 1];
        }
        let registry = TemperamentRegistry::new();
        let result = pick_peaks(
            &mag,
            &refined_freq,
            &derivative,
            &FilterConfig::default(),
            &registry,
            registry.equal_temperament_index(),
            0,
            440.0,
            8,
            0.5,
            true,
        )
        .unwrap();
        assert!(result.peaks.len() <= 8);
        for pair in result.peaks.windows(2) {
            assert!(pair[0].frequency_hz < pair[1].frequency_hz);
        }
    }

    #[test]
    fn octave_bias_tightens_search_window_when_hps_is_off() {
        let fps = 11025.0 / 16384.0;
        let r = 7168;
        let mut mag = vec![0.0; r];
        let mut refined_freq = vec![0.0; r];
        for i in 0..r {
            refined_freq[i] = i as f64 * fps;
        }
        let fundamental_bin = (220.0 / fps).round() as usize;
        let octave_above_bin = fundamental_bin * 2;
        for bin in [fundamental_bin, octave_above_bin] {
            mag[bin - 1] = 0.6;
            mag[bin] = 2.0;
            mag[bin + 1] = 0.6;
        }
        let mut derivative = vec![0.0; r];
        for i in 1..r {
            derivative[i] = mag[i] - mag[i - 1];
        }
        let registry = TemperamentRegistry::new();
        let result = pick_peaks(
            &mag,
            &refined_freq,
            &derivative,
            &FilterConfig::default(),
            &registry,
            registry.equal_temperament_index(),
            0,
            440.0,
            8,
            0.5,
            false,
        )
        .unwrap();
        assert_eq!(result.peaks.len(), 1);
    }

    #[test]
    fn fundamental_filter_restricts_to_first_pitch_class() {
        let fps = 11025.0 / 16384.0;
        let r = 7168;
        let mut mag = vec![0.0; r];
        let mut refined_freq = vec![0.0; r];
        for i in 0..r {
            refined_freq[i] = i as f64 * fps;
        }
        let a_bin = (220.0 / fps).round() as usize;
        let bflat_bin = (233.08 / fps).round() as usize;
        for bin in [a_bin, bflat_bin] {
            mag[bin - 1] = 0.6;
            mag[bin] = 2.0;
            mag[bin + 1] = 0.6;
        }
        let mut derivative = vec![0.0; r];
        for i in 1..r {
            derivative[i] = mag[i] - mag[i - 1];
        }
        let registry = TemperamentRegistry::new();
        let mut filters = FilterConfig::default();
        filters.fundamental_filter = true;
        let result = pick_peaks(
            &mag,
            &refined_freq,
            &derivative,
            &filters,
            &registry,
            registry.equal_temperament_index(),
            0,
            440.0,
            8,
            0.5,
            true,
        )
        .unwrap();
        assert_eq!(result.peaks.len(), 1);
    }
}
