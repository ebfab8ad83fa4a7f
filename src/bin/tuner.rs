//! Offline CLI path (spec.md §6): decodes a WAV file, runs it through the
//! same hop-by-hop pipeline the real-time path uses, aggregates the
//! per-frame peaks into a stable note list (C8), and emits the documented
//! JSON contract.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;

use tuner_core::{
    aggregate, AnalysisConfig, CustomTuningRecord, DetectedNote, FrameDriver, PitchResult,
};

/// Real-time instrument tuner: offline analysis of audio files.
#[derive(Parser, Debug)]
#[command(name = "tuner")]
struct Args {
    /// Reference pitch for A4, in Hz.
    #[arg(short = 'r', long = "reference", default_value_t = 440.0)]
    reference: f64,

    /// Wrap all per-file outputs in a single JSON object keyed by basename.
    #[arg(short = 'a', long = "aggregate")]
    aggregate: bool,

    /// Built-in or custom temperament name.
    #[arg(long = "temperament", default_value = "Equal Temperament")]
    temperament: String,

    /// Transposition key as a pitch class (0 = C .. 11 = B).
    #[arg(long = "key", default_value_t = 0)]
    key: i32,

    /// Directory to scan for custom `*.json` tuning files.
    #[arg(long = "tuning-dir")]
    tuning_dir: Option<PathBuf>,

    /// Audio files to analyze.
    files: Vec<PathBuf>,
}

#[derive(Serialize)]
struct NoteJson {
    note_name: &'static str,
    octave: i32,
    frequency: f64,
    cents: f64,
}

#[derive(Serialize)]
#[serde(untagged)]
enum FileOutput {
    Valid {
        valid: bool,
        num_notes: usize,
        notes: Vec<NoteJson>,
        primary_note: &'static str,
        primary_octave: i32,
        primary_frequency: f64,
        primary_cents: f64,
        num_valid_frames: u32,
    },
    Invalid {
        valid: bool,
        error: String,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    if args.files.is_empty() {
        eprintln!("usage: tuner [-r FREQ] [-a] [--temperament NAME] [--key KEY] [--tuning-dir DIR] FILE...");
        return ExitCode::from(1);
    }

    let mut outputs: BTreeMap<String, FileOutput> = BTreeMap::new();
    for file in &args.files {
        let output = analyze_file(file, &args);
        let key = file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.to_string_lossy().into_owned());
        if args.aggregate {
            outputs.insert(key, output);
        } else {
            println!("{}", serde_json::to_string(&output).expect("serializable output"));
        }
    }

    if args.aggregate {
        println!("{}", serde_json::to_string(&outputs).expect("serializable output"));
    }

    ExitCode::SUCCESS
}

fn analyze_file(path: &Path, args: &Args) -> FileOutput {
    match run_analysis(path, args) {
        Ok(output) => output,
        Err(message) => {
            log::warn!("analysis of {} failed: {message}", path.display());
            FileOutput::Invalid { valid: false, error: message }
        }
    }
}

fn run_analysis(path: &Path, args: &Args) -> Result<FileOutput, String> {
    let config = AnalysisConfig { reference_a: args.reference, ..AnalysisConfig::default() };
    let mut driver = FrameDriver::new(config).map_err(|e| e.to_string())?;

    if let Some(dir) = &args.tuning_dir {
        load_custom_tunings(dir, &mut driver)?;
    }

    let temperament_index = driver
        .registry()
        .find_index_by_name(&args.temperament)
        .ok_or_else(|| format!("unknown temperament: {}", args.temperament))?;
    driver.set_temperament_index(temperament_index).map_err(|e| e.to_string())?;
    driver.set_key(args.key);

    let samples = tuner_core::wav::decode_wav_file(path, config.sample_rate).map_err(|e| e.to_string())?;

    let hop = config.hop_size();
    let mut results: Vec<PitchResult> = Vec::new();
    let mut offset = 0;
    while offset + hop <= samples.len() {
        let result = driver.on_samples(&samples[offset..offset + hop]).map_err(|e| e.to_string())?;
        results.push(result.clone());
        offset += hop;
    }
    if offset < samples.len() {
        let mut tail = samples[offset..].to_vec();
        tail.resize(hop, 0.0);
        let result = driver.on_samples(&tail).map_err(|e| e.to_string())?;
        results.push(result.clone());
    }

    let num_valid_frames = results.iter().filter(|r| r.valid).count() as u32;
    let notes: Vec<DetectedNote> = aggregate(&results, 8);
    if notes.is_empty() {
        return Err("No pitch detected".to_string());
    }

    let primary = &notes[0];
    Ok(FileOutput::Valid {
        valid: true,
        num_notes: notes.len(),
        notes: notes
            .iter()
            .map(|n| NoteJson {
                note_name: n.note_name,
                octave: n.octave,
                frequency: n.frequency_hz,
                cents: n.cents,
            })
            .collect(),
        primary_note: primary.note_name,
        primary_octave: primary.octave,
        primary_frequency: primary.frequency_hz,
        primary_cents: primary.cents,
        num_valid_frames,
    })
}

fn load_custom_tunings(dir: &Path, driver: &mut FrameDriver) -> Result<(), String> {
    let entries = std::fs::read_dir(dir).map_err(|e| format!("reading tuning dir: {e}"))?;
    for entry in entries {
        let entry = entry.map_err(|e| format!("reading tuning dir entry: {e}"))?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let contents = std::fs::read_to_string(&path).map_err(|e| format!("reading {}: {e}", path.display()))?;
        let record: CustomTuningRecord =
            serde_json::from_str(&contents).map_err(|e| format!("parsing {}: {e}", path.display()))?;
        let temperament = record.validate().map_err(|e| e.to_string())?;
        driver.registry_mut().add_custom(temperament).map_err(|e| e.to_string())?;
    }
    Ok(())
}
