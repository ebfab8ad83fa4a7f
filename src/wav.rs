//! Minimal WAV decoding (C10), built on `hound`: parses a RIFF/WAVE
//! container, decodes 16-bit PCM or 32-bit float, down-mixes to mono, and
//! resamples to the pipeline's fixed sample rate.

use std::path::Path;

use hound::{SampleFormat, WavReader};

use crate::error::TunerError;

/// Decodes a WAV file into mono `f64` samples at `target_sample_rate`,
/// down-mixing multi-channel input by taking the first channel and
/// resampling if the file's native rate differs (spec.md §4.10).
pub fn decode_wav_file<P: AsRef<Path>>(
    path: P,
    target_sample_rate: f64,
) -> Result<Vec<f64>, TunerError> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();

    let supported = matches!(
        (spec.sample_format, spec.bits_per_sample),
        (SampleFormat::Int, 16) | (SampleFormat::Float, 32)
    );
    if !supported {
        return Err(TunerError::WavFormatError(format!(
            "unsupported sample format: {:?} at {} bits per sample",
            spec.sample_format, spec.bits_per_sample
        )));
    }

    let channels = spec.channels as usize;
    if channels == 0 {
        return Err(TunerError::WavFormatError("WAV file declares zero channels".into()));
    }

    let mono: Vec<f64> = match spec.sample_format {
        SampleFormat::Int => {
            let samples: Vec<i32> =
                reader.samples::<i32>().collect::<Result<_, hound::Error>>()?;
            samples.chunks(channels).map(|frame| frame[0] as f64 / 32768.0).collect()
        }
        SampleFormat::Float => {
            let samples: Vec<f32> =
                reader.samples::<f32>().collect::<Result<_, hound::Error>>()?;
            samples.chunks(channels).map(|frame| frame[0] as f64).collect()
        }
    };

    Ok(resample(&mono, spec.sample_rate as f64, target_sample_rate))
}

/// Resamples by integer decimation when the file rate is an exact integer
/// multiple of the target rate, otherwise falls back to nearest-neighbour
/// (spec.md §4.10: "polyphase resampling is out of scope").
fn resample(samples: &[f64], file_rate: f64, target_rate: f64) -> Vec<f64> {
    if (file_rate - target_rate).abs() < 1e-9 {
        return samples.to_vec();
    }

    let ratio = file_rate / target_rate;
    if ratio >= 1.0 && (ratio - ratio.round()).abs() < 1e-6 {
        let factor = ratio.round() as usize;
        if factor >= 1 {
            log::debug!("decimating WAV samples by integer factor {factor} ({file_rate} Hz -> {target_rate} Hz)");
            return samples.iter().step_by(factor).copied().collect();
        }
    }

    log::debug!("falling back to nearest-neighbour resampling ({file_rate} Hz -> {target_rate} Hz)");
    let out_len = ((samples.len() as f64) / ratio).round().max(0.0) as usize;
    (0..out_len)
        .map(|i| {
            let src_index = ((i as f64) * ratio).round() as usize;
            samples.get(src_index.min(samples.len().saturating_sub(1))).copied().unwrap_or(0.0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{WavSpec, WavWriter};
    use std::path::PathBuf;

    fn temp_wav_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("tuner_core_test_{name}_{}.wav", std::process::id()))
    }

    #[test]
    fn decodes_mono_sixteen_bit_pcm_at_native_rate() {
        let path = temp_wav_path("mono16");
        let spec = WavSpec {
            channels: 1,
            sample_rate: 11025,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        {
            let mut writer = WavWriter::create(&path, spec).unwrap();
            for i in 0..100 {
                writer.write_sample(if i % 2 == 0 { 16384_i16 } else { -16384_i16 }).unwrap();
            }
            writer.finalize().unwrap();
        }

        let samples = decode_wav_file(&path, 11025.0).unwrap();
        assert_eq!(samples.len(), 100);
        assert!((samples[0] - 0.5).abs() < 1e-6);
        assert!((samples[1] - (-0.5)).abs() < 1e-6);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn down_mixes_stereo_to_the_first_channel() {
        let path = temp_wav_path("stereo16");
        let spec = WavSpec {
            channels: 2,
            sample_rate: 11025,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        {
            let mut writer = WavWriter::create(&path, spec).unwrap();
            for i in 0..50 {
                writer.write_sample(i as i16).unwrap();
                writer.write_sample(-(i as i16)).unwrap();
            }
            writer.finalize().unwrap();
        }

        let samples = decode_wav_file(&path, 11025.0).unwrap();
        assert_eq!(samples.len(), 50);
        assert!((samples[10] - 10.0 / 32768.0).abs() < 1e-9);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn decimates_when_file_rate_is_an_integer_multiple_of_target() {
        let samples: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let out = resample(&samples, 22050.0, 11025.0);
        assert_eq!(out.len(), 50);
        assert_eq!(out[1], 2.0);
    }

    #[test]
    fn passes_through_unchanged_when_rates_match() {
        let samples = vec![1.0, 2.0, 3.0];
        let out = resample(&samples, 11025.0, 11025.0);
        assert_eq!(out, samples);
    }

    #[test]
    fn falls_back_to_nearest_neighbour_for_non_integer_ratios() {
        let samples: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let out = resample(&samples, 12000.0, 11025.0);
        assert!(!out.is_empty());
        assert!(out.len() < samples.len());
    }

    #[test]
    fn rejects_unsupported_bit_depth() {
        let path = temp_wav_path("eightbit");
        let spec = WavSpec {
            channels: 1,
            sample_rate: 11025,
            bits_per_sample: 8,
            sample_format: SampleFormat::Int,
        };
        {
            let mut writer = WavWriter::create(&path, spec).unwrap();
            for _ in 0..10 {
                writer.write_sample(100_i8).unwrap();
            }
            writer.finalize().unwrap();
        }

        let result = decode_wav_file(&path, 11025.0);
        assert!(result.is_err());
        std::fs::remove_file(&path).ok();
    }
}
