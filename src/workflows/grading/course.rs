use super::input::{
    deserialize_credit, deserialize_score, normalize_credit, normalize_score, parse_credit,
    parse_score,
};
use serde::{Deserialize, Serialize};

/// A course row as the caller owns it. The evaluator only reads snapshots.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Course {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_credit")]
    pub credit: f64,
    #[serde(default, deserialize_with = "deserialize_score")]
    pub midterm: Option<f64>,
    #[serde(rename = "final", default, deserialize_with = "deserialize_score")]
    pub final_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
}

/// How far a course has been scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseStage {
    Unscored,
    MidtermOnly,
    FullyScored,
}

impl CourseStage {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unscored => "Unscored",
            Self::MidtermOnly => "Midterm only",
            Self::FullyScored => "Fully scored",
        }
    }
}

impl Course {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builds a course from the raw text a user or importer supplied.
    pub fn from_text(name: &str, credit: &str, midterm: &str, final_score: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            credit: parse_credit(credit),
            midterm: parse_score(midterm),
            final_score: parse_score(final_score),
            term: None,
        }
    }

    pub fn with_credit(mut self, credit: f64) -> Self {
        self.credit = normalize_credit(credit);
        self
    }

    pub fn with_midterm(mut self, midterm: Option<f64>) -> Self {
        self.midterm = normalize_score(midterm);
        self
    }

    pub fn with_final(mut self, final_score: Option<f64>) -> Self {
        self.final_score = normalize_score(final_score);
        self
    }

    pub fn with_term(mut self, term: impl Into<String>) -> Self {
        self.term = Some(term.into());
        self
    }

    pub fn stage(&self) -> CourseStage {
        match (self.midterm, self.final_score) {
            (None, _) => CourseStage::Unscored,
            (Some(_), None) => CourseStage::MidtermOnly,
            (Some(_), Some(_)) => CourseStage::FullyScored,
        }
    }
}
