//! Configuration types for the analysis pipeline.

use crate::error::TunerError;

/// Configuration for the analysis pipeline (C1/C7).
///
/// The defaults reproduce the fixed constants from the original program:
/// an 11025 Hz sample rate, a 16384-point FFT, and 16x oversampling (so a
/// 1024-sample hop). These can be varied within the power-of-two/positivity
/// constraints enforced by [`AnalysisConfig::new`], but the peak picker's
/// octave-bias tightening and the phase vocoder's fold width both scale
/// with `oversample`, so changing it changes detection behavior.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisConfig {
    /// FFT size in samples (must be a power of two).
    pub fft_size: usize,
    /// Oversample factor; `hop_size = fft_size / oversample`.
    pub oversample: usize,
    /// Sample rate in Hz.
    pub sample_rate: f64,
    /// Reference pitch for A4, in Hz.
    pub reference_a: f64,
    /// Maximum number of peaks retained per frame.
    pub max_peaks: usize,
    /// Minimum peak amplitude to be considered (C4 §4.4).
    pub min_amplitude: f64,
    /// Consecutive invalid frames before the exposed result is zeroed (C7).
    pub invalid_hold_frames: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            fft_size: 16384,
            oversample: 16,
            sample_rate: 11025.0,
            reference_a: 440.0,
            max_peaks: 8,
            min_amplitude: 0.5,
            invalid_hold_frames: 16,
        }
    }
}

impl AnalysisConfig {
    /// Construct a validated configuration, otherwise keeping the defaults.
    pub fn new(fft_size: usize, oversample: usize, sample_rate: f64) -> Result<Self, TunerError> {
        let config = Self { fft_size, oversample, sample_rate, ..Default::default() };
        config.validate()?;
        Ok(config)
    }

    /// Re-check invariants; called by `new` and whenever fields are edited directly.
    pub fn validate(&self) -> Result<(), TunerError> {
        if !self.fft_size.is_power_of_two() {
            return Err(TunerError::UnsupportedFftSize);
        }
        if self.oversample == 0 || !self.oversample.is_power_of_two() {
            return Err(TunerError::InvalidConfiguration);
        }
        if self.hop_size() == 0 || self.hop_size() >= self.fft_size {
            return Err(TunerError::InvalidConfiguration);
        }
        if self.sample_rate <= 0.0 || self.reference_a <= 0.0 {
            return Err(TunerError::InvalidConfiguration);
        }
        Ok(())
    }

    /// Hop size in samples: `fft_size / oversample`.
    pub fn hop_size(&self) -> usize {
        self.fft_size / self.oversample
    }

    /// Number of usable spectrum bins, `fft_size * 7 / 16` (spec.md §4.1).
    pub fn usable_bins(&self) -> usize {
        self.fft_size * 7 / 16
    }

    /// Bin spacing in Hz: `sample_rate / fft_size`.
    pub fn bin_width(&self) -> f64 {
        self.sample_rate / self.fft_size as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_spec_constants() {
        let config = AnalysisConfig::default();
        assert_eq!(config.fft_size, 16384);
        assert_eq!(config.hop_size(), 1024);
        assert_eq!(config.usable_bins(), 7168);
        assert!((config.bin_width() - 0.673_2).abs() < 0.001);
    }

    #[test]
    fn rejects_non_power_of_two_fft_size() {
        assert_eq!(AnalysisConfig::new(1000, 16, 11025.0), Err(TunerError::UnsupportedFftSize));
    }

    #[test]
    fn rejects_hop_not_smaller_than_fft_size() {
        assert_eq!(AnalysisConfig::new(1024, 1, 11025.0), Err(TunerError::InvalidConfiguration));
    }

    #[test]
    fn rejects_non_positive_sample_rate() {
        assert_eq!(AnalysisConfig::new(1024, 16, 0.0), Err(TunerError::InvalidConfiguration));
    }

    #[test]
    fn accepts_smaller_power_of_two_configuration() {
        let config = AnalysisConfig::new(2048, 8, 44100.0).unwrap();
        assert_eq!(config.hop_size(), 256);
        assert_eq!(config.usable_bins(), 896);
    }
}
