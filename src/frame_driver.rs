//! Frame driver (C7): owns the ring buffer, phase-memory vector, and filter
//! state, and orchestrates one hop through C1 -> C2 -> C3(HPS) -> C4 -> C6.
//!
//! Single-threaded cooperative: `on_samples` is a pure function of
//! `(new_samples, self)` that never blocks. Thread discipline for the
//! capture/UI boundary described in spec.md §5 is the caller's
//! responsibility; this type only owns the ring and the phase memory, the
//! two pieces of shared state the spec calls out as exclusive to the driver.

use crate::config::AnalysisConfig;
use crate::decision::{self, PitchResult};
use crate::error::TunerError;
use crate::fft::{hann_window, FftProcessor};
use crate::peak_picker::{self, FilterConfig};
use crate::phase_vocoder;
use crate::preprocess::{self, LowPassFilter};
use crate::temperament::TemperamentRegistry;

/// Drives the analysis pipeline one hop at a time.
pub struct FrameDriver {
    config: AnalysisConfig,
    window: Vec<f64>,
    fft: FftProcessor,
    ring: Vec<f64>,
    phase_memory: Vec<f64>,
    low_pass: LowPassFilter,
    low_pass_enabled: bool,
    hps_enabled: bool,
    filters: FilterConfig,
    registry: TemperamentRegistry,
    temperament_index: usize,
    key: i32,
    dmax: f64,
    invalid_count: u32,
    display_lock: bool,
    current: PitchResult,
    last_magnitude: Vec<f64>,
}

impl FrameDriver {
    pub fn new(config: AnalysisConfig) -> Result<Self, TunerError> {
        config.validate()?;
        let registry = TemperamentRegistry::new();
        let temperament_index = registry.equal_temperament_index();
        let usable_bins = config.usable_bins();
        Ok(Self {
            window: hann_window(config.fft_size),
            fft: FftProcessor::new(config.fft_size, usable_bins),
            ring: vec![0.0; config.fft_size],
            phase_memory: vec![0.0; usable_bins],
            low_pass: LowPassFilter::default(),
            low_pass_enabled: false,
            hps_enabled: true,
            filters: FilterConfig::default(),
            registry,
            temperament_index,
            key: 0,
            dmax: 0.0,
            invalid_count: 0,
            display_lock: false,
            current: PitchResult::silent(),
            last_magnitude: vec![0.0; usable_bins],
            config,
        })
    }

    pub fn set_display_lock(&mut self, locked: bool) {
        self.display_lock = locked;
    }

    pub fn set_low_pass_enabled(&mut self, enabled: bool) {
        self.low_pass_enabled = enabled;
        if !enabled {
            self.low_pass.reset();
        }
    }

    pub fn set_hps_enabled(&mut self, enabled: bool) {
        self.hps_enabled = enabled;
    }

    pub fn set_filters(&mut self, filters: FilterConfig) {
        self.filters = filters;
    }

    pub fn set_temperament_index(&mut self, index: usize) -> Result<(), TunerError> {
        if self.registry.get(index).is_none() {
            return Err(TunerError::TemperamentIndexOutOfRange);
        }
        self.temperament_index = index;
        Ok(())
    }

    pub fn set_key(&mut self, key: i32) {
        self.key = key;
    }

    pub fn registry_mut(&mut self) -> &mut TemperamentRegistry {
        &mut self.registry
    }

    pub fn registry(&self) -> &TemperamentRegistry {
        &self.registry
    }

    pub fn current_result(&self) -> &PitchResult {
        &self.current
    }

    pub fn magnitude_snapshot(&self) -> &[f64] {
        &self.last_magnitude
    }

    /// Feeds one hop of `hop_size()` samples through the pipeline, updating
    /// and returning the exposed [`PitchResult`] (spec.md §4.7).
    pub fn on_samples(&mut self, new_samples: &[f64]) -> Result<&PitchResult, TunerError> {
        if new_samples.len() != self.config.hop_size() {
            return Err(TunerError::BufferSizeMismatch);
        }

        let filtered: Vec<f64> = if self.low_pass_enabled {
            self.low_pass.process_block(new_samples)
        } else {
            new_samples.to_vec()
        };

        let hop = filtered.len();
        let keep = self.ring.len() - hop;
        self.ring.copy_within(hop.., 0);
        self.ring[keep..].copy_from_slice(&filtered);

        let (mut mag, phase, dmax) = self.fft.transform(&self.ring, &self.window);
        // `self.dmax` is exposed as normalisation bookkeeping only (spec.md
        // §4.1 step 1's `max(dmax, 4096)` floor); it is deliberately never
        // applied to `self.ring` before the transform above. WAV decode
        // (§4.10) already scales PCM samples to the ±1.0 range, so folding
        // in an *additional* divide-by-dmax here would double-normalise and
        // make MIN_AMPLITUDE (0.5) track input level instead of the fixed
        // threshold §4.4 specifies. See DESIGN.md's Open Question decisions.
        self.dmax = self.dmax.max(dmax);

        let refined = phase_vocoder::refine(
            &self.phase_memory,
            &phase,
            &mag,
            self.config.bin_width(),
            self.config.hop_size(),
            self.config.fft_size,
            self.config.oversample,
        );
        // Phase memory updates only after C2 has consumed the previous
        // value (spec.md §5 ordering guarantee).
        self.phase_memory = phase;

        let mut derivative = refined.derivative;
        if self.hps_enabled {
            preprocess::apply_hps(&mut mag, &mut derivative);
        }

        let pick = peak_picker::pick_peaks(
            &mag,
            &refined.refined_freq,
            &derivative,
            &self.filters,
            &self.registry,
            self.temperament_index,
            self.key,
            self.config.reference_a,
            self.config.max_peaks,
            self.config.min_amplitude,
            self.hps_enabled,
        )?;

        let result = decision::decide(
            &pick.peaks,
            self.config.reference_a,
            &self.registry,
            self.temperament_index,
            self.key,
            pick.max_magnitude,
        )?;

        self.last_magnitude = mag;

        if self.display_lock {
            return Ok(&self.current);
        }

        if result.valid {
            self.invalid_count = 0;
            self.current = result;
        } else {
            self.invalid_count += 1;
            log::trace!("invalid frame ({}/{} before hold-off)", self.invalid_count, self.config.invalid_hold_frames);
            if self.invalid_count >= self.config.invalid_hold_frames {
                log::debug!("invalid-frame hold-off expired, zeroing exposed result");
                self.current = PitchResult::silent();
            }
        }

        Ok(&self.current)
    }
}
