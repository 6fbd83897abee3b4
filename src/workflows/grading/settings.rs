use serde::{Deserialize, Serialize};

pub const DEFAULT_MIDTERM_WEIGHT: f64 = 0.4;
pub const DEFAULT_FINAL_WEIGHT: f64 = 0.6;
pub const DEFAULT_PASS_THRESHOLD: f64 = 50.0;
pub const DEFAULT_CONDITIONAL_THRESHOLD: f64 = 40.0;
pub const DEFAULT_FINAL_FLOOR: f64 = 35.0;

/// Weighting and threshold rules applied to every course.
///
/// The two weights are used as given; a pair that does not sum to one is not
/// renormalized. Callers are expected to keep
/// `pass_threshold >= conditional_threshold`; nothing here enforces it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub midterm_weight: f64,
    pub final_weight: f64,
    pub pass_threshold: f64,
    pub conditional_threshold: f64,
    pub final_floor: f64,
}

impl Settings {
    /// Rejects non-finite values and values outside each field's range.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let fractions = [
            ("midterm_weight", self.midterm_weight),
            ("final_weight", self.final_weight),
        ];
        for (field, value) in fractions {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(SettingsError::WeightOutOfRange { field, value });
            }
        }

        let scores = [
            ("pass_threshold", self.pass_threshold),
            ("conditional_threshold", self.conditional_threshold),
            ("final_floor", self.final_floor),
        ];
        for (field, value) in scores {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(SettingsError::ScoreOutOfRange { field, value });
            }
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            midterm_weight: DEFAULT_MIDTERM_WEIGHT,
            final_weight: DEFAULT_FINAL_WEIGHT,
            pass_threshold: DEFAULT_PASS_THRESHOLD,
            conditional_threshold: DEFAULT_CONDITIONAL_THRESHOLD,
            final_floor: DEFAULT_FINAL_FLOOR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SettingsError {
    #[error("{field} must be a fraction between 0 and 1 (found {value})")]
    WeightOutOfRange { field: &'static str, value: f64 },
    #[error("{field} must be a score between 0 and 100 (found {value})")]
    ScoreOutOfRange { field: &'static str, value: f64 },
}
