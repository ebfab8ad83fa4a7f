//! Phase-vocoder bin refiner (C2).
//!
//! Converts the raw phase of each spectrum bin, together with the phase
//! recorded for the same bin on the previous hop, into a sub-bin-accurate
//! frequency estimate. The principal-value reduction and round-half-to-even
//! folding below is the classic phase-vocoder trick (as used by, e.g., the
//! DSPDimension reference implementation that most phase-vocoder code in the
//! wild, including this pack's `other_examples` STFT/PV entries, ultimately
//! derives from): fold the phase difference into `[-pi/2, pi/2]` by
//! subtracting the nearest *even* multiple of pi, which is equivalent mod
//! `2*pi` and symmetric around zero.

use std::f64::consts::PI;

/// Per-hop refinement output: refined frequency (Hz) and magnitude derivative
/// for every usable bin. Index 0 (DC) is always zero in both arrays.
pub struct RefinedSpectrum {
    pub refined_freq: Vec<f64>,
    pub derivative: Vec<f64>,
}

/// Refines bin frequencies using the phase difference between this hop and
/// the previous one (spec.md §4.2).
///
/// `prev_phase`, `phase`, and `mag` must all have the same length `R`
/// (the usable-bin count). `fps` is the bin spacing (`sample_rate / fft_size`).
pub fn refine(
    prev_phase: &[f64],
    phase: &[f64],
    mag: &[f64],
    fps: f64,
    hop_size: usize,
    fft_size: usize,
    oversample: usize,
) -> RefinedSpectrum {
    let r = phase.len();
    assert_eq!(prev_phase.len(), r);
    assert_eq!(mag.len(), r);

    let mut refined_freq = vec![0.0; r];
    let mut derivative = vec![0.0; r];

    for i in 1..r {
        let expect_i = 2.0 * PI * i as f64 * hop_size as f64 / fft_size as f64;

        let mut dp = prev_phase[i] - phase[i];
        dp -= expect_i;
        dp = wrap_to_even_pi_multiple(dp);

        let df = oversample as f64 * dp / (2.0 * PI);
        refined_freq[i] = i as f64 * fps + df * fps;
        derivative[i] = mag[i] - mag[i - 1];
    }

    RefinedSpectrum { refined_freq, derivative }
}

/// Subtracts the nearest *even* multiple of pi from `dp`, folding it into
/// `[-pi/2, pi/2]`. Uses round-half-to-even on the truncated quotient, per
/// spec.md §9 ("Round-half-half convention"): a round-half-away-from-zero
/// implementation would diverge by one bin near the fold points.
fn wrap_to_even_pi_multiple(dp: f64) -> f64 {
    let mut qpd = (dp / PI).trunc();
    let qpd_i = qpd as i64;
    if qpd >= 0.0 {
        if qpd_i % 2 != 0 {
            qpd += 1.0;
        }
    } else if qpd_i % 2 != 0 {
        qpd -= 1.0;
    }
    dp - PI * qpd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dc_bin_stays_zero() {
        let r = 8;
        let phase = vec![0.5; r];
        let prev = vec![0.2; r];
        let mag = vec![1.0; r];
        let out = refine(&prev, &phase, &mag, 1.0, 1024, 16384, 16);
        assert_eq!(out.refined_freq[0], 0.0);
        assert_eq!(out.derivative[0], 0.0);
    }

    #[test]
    fn fold_keeps_within_oversample_width() {
        let r = 32;
        let fps = 11025.0 / 16384.0;
        let mut phase = vec![0.0; r];
        let mut prev = vec![0.0; r];
        for i in 0..r {
            phase[i] = (i as f64 * 0.37).sin();
            prev[i] = (i as f64 * 0.21).cos();
        }
        let mag = vec![1.0; r];
        let out = refine(&prev, &phase, &mag, fps, 1024, 16384, 16);
        let fold_width = 16.0 * fps / 2.0;
        for i in 1..r {
            let expected = i as f64 * fps;
            assert!(
                (out.refined_freq[i] - expected).abs() <= fold_width + 1e-9,
                "bin {i} exceeded fold width"
            );
        }
    }

    #[test]
    fn wrap_is_symmetric_around_zero() {
        assert!((wrap_to_even_pi_multiple(0.1) - 0.1).abs() < 1e-12);
        assert!((wrap_to_even_pi_multiple(-0.1) - (-0.1)).abs() < 1e-12);
    }

    #[test]
    fn derivative_matches_magnitude_slope() {
        let r = 4;
        let phase = vec![0.0; r];
        let prev = vec![0.0; r];
        let mag = vec![0.1, 0.5, 0.2, 0.05];
        let out = refine(&prev, &phase, &mag, 1.0, 1024, 16384, 16);
        assert_eq!(out.derivative[1], 0.4);
        assert_eq!(out.derivative[2], -0.3);
        assert_eq!(out.derivative[3], -0.15);
    }
}
