//! Real-time instrument tuner analysis core.
//!
//! Overlap-added FFT windowing, phase-vocoder bin refinement, optional
//! harmonic-product-spectrum sharpening, constrained peak selection,
//! temperament-aware reference-note computation, the final note/cents
//! decision, and the offline cluster aggregator that merges per-frame
//! detections into a stable multi-note result.

pub mod aggregator;
pub mod builtin_temperaments;
pub mod config;
pub mod constants;
pub mod decision;
pub mod error;
pub mod fft;
pub mod frame_driver;
pub mod peak_picker;
pub mod phase_vocoder;
pub mod preprocess;
pub mod temperament;
pub mod tuning_file;
pub mod wav;

pub use aggregator::{aggregate, DetectedNote};
pub use config::AnalysisConfig;
pub use decision::PitchResult;
pub use error::TunerError;
pub use frame_driver::FrameDriver;
pub use peak_picker::{FilterConfig, Peak};
pub use temperament::{Temperament, TemperamentRegistry};
pub use tuning_file::CustomTuningRecord;
