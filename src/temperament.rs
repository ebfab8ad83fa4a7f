//! Temperament engine (C5): ratio tables, key transposition, and the
//! octave-invariant adjustment factor used by the note/cents decision (C6).

use crate::builtin_temperaments::{builtin_temperaments, EQUAL_TEMPERAMENT_INDEX};
use crate::error::TunerError;

/// A tuning system: a name, a human-readable description, and 12 ratios
/// (one per pitch class, relative to its own tonic) describing how far each
/// scale degree sits from equal temperament.
#[derive(Debug, Clone, PartialEq)]
pub struct Temperament {
    pub name: String,
    pub description: String,
    pub ratios: [f64; 12],
}

impl Temperament {
    /// Validates a temperament as a candidate for the custom partition:
    /// non-empty name, 12 positive finite ratios (spec.md §4.9 / C9).
    pub fn validate(&self) -> Result<(), TunerError> {
        if self.name.trim().is_empty() {
            return Err(TunerError::InvalidTemperament("name must not be empty".into()));
        }
        for ratio in &self.ratios {
            if !ratio.is_finite() || *ratio <= 0.0 {
                return Err(TunerError::InvalidTemperament(
                    "ratios must be positive and finite".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Holds the 32 built-in temperaments (immutable) plus a caller-managed
/// custom partition (spec.md §4.5).
#[derive(Debug, Clone)]
pub struct TemperamentRegistry {
    builtin: Vec<Temperament>,
    custom: Vec<Temperament>,
}

impl Default for TemperamentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TemperamentRegistry {
    pub fn new() -> Self {
        Self { builtin: builtin_temperaments(), custom: Vec::new() }
    }

    /// Number of built-in entries (always [`crate::builtin_temperaments::BUILTIN_COUNT`]).
    pub fn builtin_len(&self) -> usize {
        self.builtin.len()
    }

    pub fn custom_len(&self) -> usize {
        self.custom.len()
    }

    /// Index of the fixed equal-temperament entry within the built-in partition.
    pub fn equal_temperament_index(&self) -> usize {
        EQUAL_TEMPERAMENT_INDEX
    }

    /// Looks up a temperament by combined index: built-ins first, then
    /// custom entries appended after them.
    pub fn get(&self, index: usize) -> Option<&Temperament> {
        if index < self.builtin.len() {
            self.builtin.get(index)
        } else {
            self.custom.get(index - self.builtin.len())
        }
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Temperament> {
        self.builtin.iter().chain(self.custom.iter()).find(|t| t.name == name)
    }

    /// Same linear search as [`Self::find_by_name`], but returning the
    /// combined index [`Self::get`] expects instead of the temperament
    /// itself (callers that need to then pin the selection by index, e.g.
    /// the CLI's `--temperament` flag).
    pub fn find_index_by_name(&self, name: &str) -> Option<usize> {
        self.builtin.iter().chain(self.custom.iter()).position(|t| t.name == name)
    }

    /// Appends a validated temperament to the custom partition, returning
    /// its combined index.
    pub fn add_custom(&mut self, temperament: Temperament) -> Result<usize, TunerError> {
        temperament.validate()?;
        self.custom.push(temperament);
        Ok(self.builtin.len() + self.custom.len() - 1)
    }

    /// Replaces a custom entry in place. Built-ins are immutable (spec.md
    /// §4.5: "the built-in partition can never be mutated").
    pub fn update_custom(&mut self, index: usize, temperament: Temperament) -> Result<(), TunerError> {
        if index < self.builtin.len() {
            return Err(TunerError::BuiltinTemperamentImmutable);
        }
        temperament.validate()?;
        let custom_index = index - self.builtin.len();
        let slot = self
            .custom
            .get_mut(custom_index)
            .ok_or(TunerError::TemperamentIndexOutOfRange)?;
        *slot = temperament;
        Ok(())
    }

    pub fn remove_custom(&mut self, index: usize) -> Result<Temperament, TunerError> {
        if index < self.builtin.len() {
            return Err(TunerError::BuiltinTemperamentImmutable);
        }
        let custom_index = index - self.builtin.len();
        if custom_index >= self.custom.len() {
            return Err(TunerError::TemperamentIndexOutOfRange);
        }
        Ok(self.custom.remove(custom_index))
    }

    /// Ratio of a temperament's pitch class, transposed by `key` semitones
    /// (spec.md §4.5: `ratios[(pitch_class - key + 12) mod 12]`).
    pub fn ratio(&self, index: usize, pitch_class: i32, key: i32) -> Result<f64, TunerError> {
        let temperament = self.get(index).ok_or(TunerError::TemperamentIndexOutOfRange)?;
        let offset = (pitch_class - key).rem_euclid(12) as usize;
        Ok(temperament.ratios[offset])
    }

    /// Octave-invariant adjustment factor for pitch class `pitch_class` at
    /// `key`, relative to the reference pitch class (A, pitch class 9):
    /// `(T.ratios[n_pc]/T.ratios[a_pc]) / (EQUAL.ratios[n_pc]/EQUAL.ratios[a_pc])`
    /// (spec.md §4.5). Equal temperament itself always returns 1.0 (spec.md
    /// §8 invariant), since its numerator and denominator ratios cancel.
    pub fn adjustment(&self, index: usize, pitch_class: i32, key: i32) -> Result<f64, TunerError> {
        const REFERENCE_PITCH_CLASS: i32 = 9;
        let this_n = self.ratio(index, pitch_class, key)?;
        let this_a = self.ratio(index, REFERENCE_PITCH_CLASS, key)?;
        let equal = self.equal_temperament_index();
        let equal_n = self.ratio(equal, pitch_class, key)?;
        let equal_a = self.ratio(equal, REFERENCE_PITCH_CLASS, key)?;
        Ok((this_n / this_a) / (equal_n / equal_a))
    }

    /// `reference_a * 2^(rounded_cf/12) * adj` (spec.md §4.5's `ref_hz`
    /// formula), the single pure function the peak picker (C4) and the
    /// note/cents decision (C6) both call instead of duplicating the ratio
    /// arithmetic (spec.md REDESIGN FLAGS).
    pub fn reference_frequency(
        &self,
        index: usize,
        key: i32,
        reference_a: f64,
        note: i32,
        rounded_cf: f64,
    ) -> Result<f64, TunerError> {
        let adj = self.adjustment(index, note.rem_euclid(12), key)?;
        Ok(reference_a * 2.0_f64.powf(rounded_cf / 12.0) * adj)
    }
}
