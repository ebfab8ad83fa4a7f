//! Temperament persistence contract (C9): a pure validator for custom
//! tuning records, plus the slug generator used to name their files on
//! disk. File I/O itself lives outside the core, in the CLI binary.

use serde::{Deserialize, Serialize};

use crate::error::TunerError;
use crate::temperament::Temperament;

/// On-disk shape of a custom tuning file (spec.md §6): `ratios` must decode
/// to exactly 12 entries, `description` is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomTuningRecord {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub ratios: Vec<f64>,
}

impl CustomTuningRecord {
    /// Validates the record and converts it into a [`Temperament`]: the
    /// name must be non-empty and the ratios array must contain exactly 12
    /// positive finite numbers.
    pub fn validate(&self) -> Result<Temperament, TunerError> {
        if self.name.trim().is_empty() {
            return Err(TunerError::InvalidTemperament("name must not be empty".into()));
        }
        if self.ratios.len() != 12 {
            return Err(TunerError::InvalidTemperament(format!(
                "ratios must contain exactly 12 entries, got {}",
                self.ratios.len()
            )));
        }
        let mut ratios = [0.0_f64; 12];
        for (i, &r) in self.ratios.iter().enumerate() {
            if !r.is_finite() || r <= 0.0 {
                return Err(TunerError::InvalidTemperament(
                    "ratios must be positive and finite".into(),
                ));
            }
            ratios[i] = r;
        }
        let temperament = Temperament {
            name: self.name.clone(),
            description: self.description.clone().unwrap_or_default(),
            ratios,
        };
        temperament.validate()?;
        Ok(temperament)
    }
}

/// Fallback slug when a name collapses to nothing usable.
const FALLBACK_SLUG: &str = "custom_tuning";

/// Generates a filesystem-safe slug from a tuning name: lowercase
/// alphanumerics, runs of anything else collapsed to a single underscore,
/// trailing underscores trimmed (spec.md §4.9).
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_underscore = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_was_underscore = false;
        } else if !last_was_underscore && !slug.is_empty() {
            slug.push('_');
            last_was_underscore = true;
        }
    }
    while slug.ends_with('_') {
        slug.pop();
    }
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_well_formed_record() {
        let record = CustomTuningRecord {
            name: "Kirnberger III".into(),
            description: Some("a well temperament".into()),
            ratios: vec![1.0; 12],
        };
        assert!(record.validate().is_ok());
    }

    #[test]
    fn rejects_empty_name() {
        let record = CustomTuningRecord { name: "   ".into(), description: None, ratios: vec![1.0; 12] };
        assert!(record.validate().is_err());
    }

    #[test]
    fn rejects_wrong_length_ratios() {
        let record = CustomTuningRecord { name: "Short".into(), description: None, ratios: vec![1.0; 11] };
        assert!(record.validate().is_err());
    }

    #[test]
    fn rejects_non_positive_ratio() {
        let mut ratios = vec![1.0; 12];
        ratios[5] = 0.0;
        let record = CustomTuningRecord { name: "Bad".into(), description: None, ratios };
        assert!(record.validate().is_err());
    }

    #[test]
    fn slugify_lowercases_and_collapses_separators() {
        assert_eq!(slugify("Kirnberger III"), "kirnberger_iii");
        assert_eq!(slugify("  1/4-Comma Meantone!! "), "1_4_comma_meantone");
    }

    #[test]
    fn slugify_falls_back_on_an_empty_result() {
        assert_eq!(slugify("!!!"), "custom_tuning");
        assert_eq!(slugify(""), "custom_tuning");
    }

    #[test]
    fn slugify_trims_trailing_underscores() {
        assert_eq!(slugify("trailing---"), "trailing");
    }
}
