use super::letter::LetterGrade;
use super::policy::{GradeResolution, PolicyError, ScorePolicy};
use super::rounding::{clamp_score, round_coefficient, MAX_SCORE, MIN_SCORE};
use serde::{Deserialize, Serialize};

const MAX_COEFFICIENT: f64 = 4.0;
const CONTINUITY_TOLERANCE: f64 = 1e-6;

/// `coefficient = slope * score + intercept` over `[range_start, range_end)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearSegment {
    pub range_start: f64,
    pub range_end: f64,
    pub slope: f64,
    pub intercept: f64,
}

impl LinearSegment {
    pub fn new(range_start: f64, range_end: f64, slope: f64, intercept: f64) -> Self {
        Self {
            range_start,
            range_end,
            slope,
            intercept,
        }
    }

    /// Segment for the `(score + offset) / divisor` form used by grading regulations.
    pub fn from_ratio(range_start: f64, range_end: f64, offset: f64, divisor: f64) -> Self {
        Self::new(range_start, range_end, 1.0 / divisor, offset / divisor)
    }

    fn evaluate(&self, score: f64) -> f64 {
        self.slope * score + self.intercept
    }

    fn is_well_formed(&self) -> bool {
        [self.range_start, self.range_end, self.slope, self.intercept]
            .iter()
            .all(|value| value.is_finite())
            && self.range_start < self.range_end
    }
}

/// Continuous policy: a linear formula per score range, with the letter read
/// off the clamped coefficient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LinearSegment>", into = "Vec<LinearSegment>")]
pub struct PiecewiseLinear {
    segments: Vec<LinearSegment>,
}

impl PiecewiseLinear {
    /// Validates that the segments tile `[0, 100]` without gaps or overlaps
    /// and that the coefficient never falls as the score rises.
    pub fn new(mut segments: Vec<LinearSegment>) -> Result<Self, PolicyError> {
        if segments.is_empty() {
            return Err(PolicyError::Empty);
        }
        if let Some(segment) = segments.iter().find(|segment| !segment.is_well_formed()) {
            return Err(PolicyError::InvalidSegment {
                start: segment.range_start,
                end: segment.range_end,
            });
        }
        if let Some(segment) = segments.iter().find(|segment| segment.slope < 0.0) {
            return Err(PolicyError::NegativeSlope {
                start: segment.range_start,
            });
        }

        segments.sort_by(|a, b| a.range_start.total_cmp(&b.range_start));

        let mut covered_to = MIN_SCORE;
        let mut previous: Option<&LinearSegment> = None;
        for segment in &segments {
            if segment.range_start > covered_to {
                return Err(PolicyError::Gap {
                    start: covered_to,
                    end: segment.range_start,
                });
            }
            if segment.range_start < covered_to {
                return Err(PolicyError::Overlap {
                    start: segment.range_start,
                    end: covered_to,
                });
            }
            if let Some(previous) = previous {
                let at = segment.range_start;
                if segment.evaluate(at) + CONTINUITY_TOLERANCE < previous.evaluate(at) {
                    return Err(PolicyError::Discontinuity { at });
                }
            }
            covered_to = segment.range_end;
            previous = Some(segment);
        }

        if covered_to < MAX_SCORE {
            return Err(PolicyError::Gap {
                start: covered_to,
                end: MAX_SCORE,
            });
        }
        if covered_to > MAX_SCORE {
            return Err(PolicyError::ScoreOutOfRange(covered_to));
        }

        Ok(Self { segments })
    }

    /// Eight-range regulation formula, from `y / 68` up to `(y + 52) / 38`.
    pub fn standard() -> Self {
        Self {
            segments: vec![
                LinearSegment::from_ratio(0.0, 34.0, 0.0, 68.0),
                LinearSegment::from_ratio(34.0, 39.0, -29.0, 10.0),
                LinearSegment::from_ratio(39.0, 49.0, -19.0, 20.0),
                LinearSegment::from_ratio(49.0, 57.0, -25.0, 16.0),
                LinearSegment::from_ratio(57.0, 64.0, -29.0, 14.0),
                LinearSegment::from_ratio(64.0, 73.0, -19.0, 18.0),
                LinearSegment::from_ratio(73.0, 81.0, -25.0, 16.0),
                LinearSegment::from_ratio(81.0, 100.0, 52.0, 38.0),
            ],
        }
    }

    pub fn segments(&self) -> &[LinearSegment] {
        &self.segments
    }

    fn segment_for(&self, score: f64) -> Option<&LinearSegment> {
        self.segments
            .iter()
            .find(|segment| segment.range_start <= score && score < segment.range_end)
            .or_else(|| self.segments.last())
    }
}

impl ScorePolicy for PiecewiseLinear {
    fn resolve(&self, score: f64) -> GradeResolution {
        let score = clamp_score(score);
        let raw = self
            .segment_for(score)
            .map(|segment| segment.evaluate(score))
            .unwrap_or(0.0);
        let coefficient = round_coefficient(raw.clamp(0.0, MAX_COEFFICIENT));

        GradeResolution {
            letter: LetterGrade::from_coefficient(coefficient),
            coefficient,
        }
    }
}

impl TryFrom<Vec<LinearSegment>> for PiecewiseLinear {
    type Error = PolicyError;

    fn try_from(segments: Vec<LinearSegment>) -> Result<Self, Self::Error> {
        Self::new(segments)
    }
}

impl From<PiecewiseLinear> for Vec<LinearSegment> {
    fn from(policy: PiecewiseLinear) -> Self {
        policy.segments
    }
}
