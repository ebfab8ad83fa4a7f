//! Offline cluster aggregator (C8): merges per-frame peak detections into a
//! stable, ordered list of notes, the way the offline CLI path reports a
//! whole recording's content instead of one hop's.

use crate::decision::PitchResult;

/// ±1.5 Hz: peaks within this distance of a cluster's running mean join it
/// instead of opening a new cluster (spec.md §4.8).
const CLUSTER_TOLERANCE_HZ: f64 = 1.5;

/// Hard cap on the number of clusters tracked during accumulation.
const MAX_CLUSTERS: usize = 64;

/// Fraction of a previously kept cluster's mean within which a 2x/3x
/// multiple is treated as a harmonic and dropped.
const HARMONIC_TOLERANCE: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq)]
struct FrequencyCluster {
    freq_sum: f64,
    cents_sum: f64,
    count: u32,
    note: i32,
    octave: i32,
    note_name: &'static str,
}

impl FrequencyCluster {
    fn mean_freq(&self) -> f64 {
        self.freq_sum / self.count as f64
    }

    fn mean_cents(&self) -> f64 {
        self.cents_sum / self.count as f64
    }
}

/// One stable note surviving aggregation across a whole recording.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectedNote {
    pub note_name: &'static str,
    pub octave: i32,
    pub frequency_hz: f64,
    pub cents: f64,
}

/// Aggregates an ordered sequence of per-frame [`PitchResult`]s into at most
/// `max_notes` stable detected notes, lowest frequency first.
pub fn aggregate(results: &[PitchResult], max_notes: usize) -> Vec<DetectedNote> {
    let mut clusters: Vec<FrequencyCluster> = Vec::new();
    let mut valid_frames: u32 = 0;

    for result in results {
        if !result.valid {
            continue;
        }
        valid_frames += 1;

        for peak in &result.peaks {
            let cents = if peak.reference_hz > 0.0 {
                -12.0 * (peak.reference_hz / peak.frequency_hz).log2() * 100.0
            } else {
                0.0
            };

            if let Some(cluster) = clusters
                .iter_mut()
                .find(|c| (c.mean_freq() - peak.frequency_hz).abs() <= CLUSTER_TOLERANCE_HZ)
            {
                cluster.freq_sum += peak.frequency_hz;
                cluster.cents_sum += cents;
                cluster.count += 1;
            } else if clusters.len() < MAX_CLUSTERS {
                clusters.push(FrequencyCluster {
                    freq_sum: peak.frequency_hz,
                    cents_sum: cents,
                    count: 1,
                    note: peak.note_number,
                    octave: peak.note_number.div_euclid(12),
                    note_name: crate::constants::NOTE_NAMES[peak.note_number.rem_euclid(12) as usize],
                });
            }
        }
    }

    let min_count = valid_frames / 4;
    let mut survivors: Vec<FrequencyCluster> =
        clusters.into_iter().filter(|c| c.count >= min_count).collect();
    survivors.sort_by(|a, b| a.mean_freq().partial_cmp(&b.mean_freq()).unwrap());

    let mut kept: Vec<FrequencyCluster> = Vec::new();
    for candidate in survivors {
        let is_harmonic = kept.iter().any(|k| {
            let mean = k.mean_freq();
            let near = |multiple: f64| {
                let target = mean * multiple;
                (candidate.mean_freq() - target).abs() <= target * HARMONIC_TOLERANCE
            };
            near(2.0) || near(3.0)
        });
        if !is_harmonic {
            kept.push(candidate);
        }
    }

    kept.into_iter()
        .take(max_notes)
        .map(|c| DetectedNote {
            note_name: c.note_name,
            octave: c.octave,
            frequency_hz: c.mean_freq(),
            cents: c.mean_cents(),
        })
        .collect()
}
