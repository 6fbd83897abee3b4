use super::buckets::DiscreteBuckets;
use super::letter::LetterGrade;
use super::piecewise::PiecewiseLinear;
use super::rounding::MAX_SCORE;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Letter and four-point coefficient resolved for a single score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeResolution {
    pub letter: LetterGrade,
    pub coefficient: f64,
}

/// Minimum integer score at which a policy first awards `letter`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeBoundary {
    pub letter: LetterGrade,
    pub min_score: f64,
}

/// Maps a 0–100 score to a letter and coefficient.
///
/// Implementations must be total over `[0, 100]`, clamp anything outside it,
/// and never award a lower coefficient to a higher score. Both are checked when
/// a policy is constructed, so `resolve` itself cannot fail.
pub trait ScorePolicy {
    fn resolve(&self, score: f64) -> GradeResolution;

    /// Letter boundaries, best letter first.
    fn boundaries(&self) -> Vec<GradeBoundary> {
        let mut boundaries: Vec<GradeBoundary> = Vec::new();
        for score in 0..=MAX_SCORE as u32 {
            let score = f64::from(score);
            let letter = self.resolve(score).letter;
            if boundaries.iter().all(|boundary| boundary.letter != letter) {
                boundaries.push(GradeBoundary {
                    letter,
                    min_score: score,
                });
            }
        }
        boundaries.reverse();
        boundaries
    }

    /// Letter awarded at the bottom of the scale.
    fn failing_letter(&self) -> LetterGrade {
        self.resolve(0.0).letter
    }
}

/// Construction-time rejections for malformed score policies.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PolicyError {
    #[error("score policy has no entries")]
    Empty,
    #[error("score {0} lies outside 0..=100")]
    ScoreOutOfRange(f64),
    #[error("coefficient {coefficient} for {letter} lies outside 0.00..=4.00")]
    CoefficientOutOfRange {
        letter: LetterGrade,
        coefficient: f64,
    },
    #[error("bucket minimums must be strictly descending ({previous} then {next})")]
    Unsorted { previous: f64, next: f64 },
    #[error("lowest bucket starts at {0}; scores below it would be unresolved")]
    MissingCatchAll(f64),
    #[error("bucket at {min_score} awards more than the bucket above it")]
    DecreasingCoefficient { min_score: f64 },
    #[error("bucket at {min_score} awards a lower letter than the bucket below it")]
    DecreasingLetter { min_score: f64 },
    #[error("segment {start}..{end} is empty or not finite")]
    InvalidSegment { start: f64, end: f64 },
    #[error("segments do not cover {start}..{end}")]
    Gap { start: f64, end: f64 },
    #[error("segments overlap on {start}..{end}")]
    Overlap { start: f64, end: f64 },
    #[error("segment starting at {start} has a negative slope")]
    NegativeSlope { start: f64 },
    #[error("coefficient drops at segment boundary {at}")]
    Discontinuity { at: f64 },
}

/// Which policy variant a deployment runs with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    #[default]
    Buckets,
    Piecewise,
}

impl PolicyKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Buckets => "buckets",
            Self::Piecewise => "piecewise",
        }
    }
}

impl FromStr for PolicyKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "buckets" | "bucket" | "table" | "discrete" => Ok(Self::Buckets),
            "piecewise" | "linear" | "formula" | "continuous" => Ok(Self::Piecewise),
            other => Err(format!("unknown grading policy '{other}'")),
        }
    }
}

/// The concrete policy selected for a deployment.
#[derive(Debug, Clone, PartialEq)]
pub enum GradingPolicy {
    Buckets(DiscreteBuckets),
    Piecewise(PiecewiseLinear),
}

impl GradingPolicy {
    /// The institution's standard table for `kind`.
    pub fn standard(kind: PolicyKind) -> Self {
        match kind {
            PolicyKind::Buckets => Self::Buckets(DiscreteBuckets::standard()),
            PolicyKind::Piecewise => Self::Piecewise(PiecewiseLinear::standard()),
        }
    }

    pub fn kind(&self) -> PolicyKind {
        match self {
            Self::Buckets(_) => PolicyKind::Buckets,
            Self::Piecewise(_) => PolicyKind::Piecewise,
        }
    }
}

impl Default for GradingPolicy {
    fn default() -> Self {
        Self::standard(PolicyKind::Buckets)
    }
}

impl ScorePolicy for GradingPolicy {
    fn resolve(&self, score: f64) -> GradeResolution {
        match self {
            Self::Buckets(policy) => policy.resolve(score),
            Self::Piecewise(policy) => policy.resolve(score),
        }
    }

    fn boundaries(&self) -> Vec<GradeBoundary> {
        match self {
            Self::Buckets(policy) => policy.boundaries(),
            Self::Piecewise(policy) => policy.boundaries(),
        }
    }
}
