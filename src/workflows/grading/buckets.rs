use super::letter::LetterGrade;
use super::policy::{GradeResolution, PolicyError, ScorePolicy};
use super::rounding::{clamp_score, round_half_up, MAX_SCORE, MIN_SCORE};
use serde::{Deserialize, Serialize};

const MAX_COEFFICIENT: f64 = 4.0;

/// One row of a discrete grade table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeBucket {
    pub min_score: f64,
    pub letter: LetterGrade,
    pub coefficient: f64,
}

impl GradeBucket {
    pub const fn new(min_score: f64, letter: LetterGrade, coefficient: f64) -> Self {
        Self {
            min_score,
            letter,
            coefficient,
        }
    }
}

const STANDARD_BUCKETS: [GradeBucket; 9] = [
    GradeBucket::new(82.0, LetterGrade::Aa, 4.0),
    GradeBucket::new(74.0, LetterGrade::Ba, 3.5),
    GradeBucket::new(65.0, LetterGrade::Bb, 3.0),
    GradeBucket::new(58.0, LetterGrade::Cb, 2.5),
    GradeBucket::new(50.0, LetterGrade::Cc, 2.0),
    GradeBucket::new(40.0, LetterGrade::Dc, 1.5),
    GradeBucket::new(35.0, LetterGrade::Dd, 1.0),
    GradeBucket::new(25.0, LetterGrade::Fd, 0.5),
    GradeBucket::new(0.0, LetterGrade::Ff, 0.0),
];

/// Discrete lookup table: the score is rounded half-up and matched against
/// the first bucket whose minimum it reaches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<GradeBucket>", into = "Vec<GradeBucket>")]
pub struct DiscreteBuckets {
    buckets: Vec<GradeBucket>,
}

impl DiscreteBuckets {
    /// Validates a table sorted by descending `min_score`.
    pub fn new(buckets: Vec<GradeBucket>) -> Result<Self, PolicyError> {
        let last = buckets.last().ok_or(PolicyError::Empty)?;
        if last.min_score != MIN_SCORE {
            return Err(PolicyError::MissingCatchAll(last.min_score));
        }

        for bucket in &buckets {
            if !bucket.min_score.is_finite()
                || !(MIN_SCORE..=MAX_SCORE).contains(&bucket.min_score)
            {
                return Err(PolicyError::ScoreOutOfRange(bucket.min_score));
            }
            if !bucket.coefficient.is_finite()
                || !(0.0..=MAX_COEFFICIENT).contains(&bucket.coefficient)
            {
                return Err(PolicyError::CoefficientOutOfRange {
                    letter: bucket.letter,
                    coefficient: bucket.coefficient,
                });
            }
        }

        for pair in buckets.windows(2) {
            let (upper, lower) = (&pair[0], &pair[1]);
            if lower.min_score >= upper.min_score {
                return Err(PolicyError::Unsorted {
                    previous: upper.min_score,
                    next: lower.min_score,
                });
            }
            if lower.coefficient > upper.coefficient {
                return Err(PolicyError::DecreasingCoefficient {
                    min_score: upper.min_score,
                });
            }
            if lower.letter > upper.letter {
                return Err(PolicyError::DecreasingLetter {
                    min_score: upper.min_score,
                });
            }
        }

        Ok(Self { buckets })
    }

    /// 82/74/65/58/50/40/35/25/0 table.
    pub fn standard() -> Self {
        Self {
            buckets: STANDARD_BUCKETS.to_vec(),
        }
    }

    pub fn buckets(&self) -> &[GradeBucket] {
        &self.buckets
    }
}

impl ScorePolicy for DiscreteBuckets {
    fn resolve(&self, score: f64) -> GradeResolution {
        let rounded = round_half_up(clamp_score(score));
        self.buckets
            .iter()
            .find(|bucket| bucket.min_score <= rounded)
            .or_else(|| self.buckets.last())
            .map(|bucket| GradeResolution {
                letter: bucket.letter,
                coefficient: bucket.coefficient,
            })
            .unwrap_or(GradeResolution {
                letter: LetterGrade::Ff,
                coefficient: 0.0,
            })
    }
}

impl TryFrom<Vec<GradeBucket>> for DiscreteBuckets {
    type Error = PolicyError;

    fn try_from(buckets: Vec<GradeBucket>) -> Result<Self, Self::Error> {
        Self::new(buckets)
    }
}

impl From<DiscreteBuckets> for Vec<GradeBucket> {
    fn from(policy: DiscreteBuckets) -> Self {
        policy.buckets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_passes_validation() {
        let validated = DiscreteBuckets::new(STANDARD_BUCKETS.to_vec()).expect("valid table");
        assert_eq!(validated, DiscreteBuckets::standard());
    }

    #[test]
    fn resolves_on_rounded_score() {
        let policy = DiscreteBuckets::standard();
        assert_eq!(policy.resolve(81.5).letter, LetterGrade::Aa);
        assert_eq!(policy.resolve(81.49).letter, LetterGrade::Ba);
        assert_eq!(policy.resolve(67.0).letter, LetterGrade::Bb);
        assert_eq!(policy.resolve(67.0).coefficient, 3.0);
        assert_eq!(policy.resolve(24.4).letter, LetterGrade::Ff);
    }

    #[test]
    fn clamps_scores_outside_the_scale() {
        let policy = DiscreteBuckets::standard();
        assert_eq!(policy.resolve(112.0).letter, LetterGrade::Aa);
        assert_eq!(policy.resolve(-7.0).letter, LetterGrade::Ff);
        assert_eq!(policy.resolve(f64::NAN).letter, LetterGrade::Ff);
    }

    #[test]
    fn boundaries_match_table_minimums() {
        let boundaries = DiscreteBuckets::standard().boundaries();
        let expected: Vec<(LetterGrade, f64)> = STANDARD_BUCKETS
            .iter()
            .map(|bucket| (bucket.letter, bucket.min_score))
            .collect();
        let actual: Vec<(LetterGrade, f64)> = boundaries
            .iter()
            .map(|boundary| (boundary.letter, boundary.min_score))
            .collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn rejects_table_without_catch_all() {
        let error = DiscreteBuckets::new(vec![
            GradeBucket::new(50.0, LetterGrade::Cc, 2.0),
            GradeBucket::new(10.0, LetterGrade::Ff, 0.0),
        ])
        .expect_err("missing zero bucket");
        assert_eq!(error, PolicyError::MissingCatchAll(10.0));
    }

    #[test]
    fn rejects_overlapping_minimums() {
        let error = DiscreteBuckets::new(vec![
            GradeBucket::new(50.0, LetterGrade::Cc, 2.0),
            GradeBucket::new(50.0, LetterGrade::Dc, 1.5),
            GradeBucket::new(0.0, LetterGrade::Ff, 0.0),
        ])
        .expect_err("duplicate minimum");
        assert!(matches!(error, PolicyError::Unsorted { .. }));
    }

    #[test]
    fn rejects_coefficients_that_fall_as_scores_rise() {
        let error = DiscreteBuckets::new(vec![
            GradeBucket::new(50.0, LetterGrade::Cc, 1.0),
            GradeBucket::new(0.0, LetterGrade::Ff, 2.0),
        ])
        .expect_err("inverted coefficients");
        assert_eq!(error, PolicyError::DecreasingCoefficient { min_score: 50.0 });
    }

    #[test]
    fn rejects_letters_that_fall_as_scores_rise() {
        let error = DiscreteBuckets::new(vec![
            GradeBucket::new(50.0, LetterGrade::Ff, 2.0),
            GradeBucket::new(0.0, LetterGrade::Aa, 0.0),
        ])
        .expect_err("inverted letters");
        assert_eq!(error, PolicyError::DecreasingLetter { min_score: 50.0 });
    }

    #[test]
    fn rejects_empty_and_out_of_range_tables() {
        assert_eq!(DiscreteBuckets::new(Vec::new()), Err(PolicyError::Empty));
        let error = DiscreteBuckets::new(vec![
            GradeBucket::new(120.0, LetterGrade::Aa, 4.0),
            GradeBucket::new(0.0, LetterGrade::Ff, 0.0),
        ])
        .expect_err("minimum above 100");
        assert_eq!(error, PolicyError::ScoreOutOfRange(120.0));
    }

    #[test]
    fn deserialization_runs_validation() {
        let raw = r#"[{"min_score": 40.0, "letter": "DC", "coefficient": 1.5}]"#;
        assert!(serde_json::from_str::<DiscreteBuckets>(raw).is_err());

        let raw = r#"[
            {"min_score": 40.0, "letter": "DC", "coefficient": 1.5},
            {"min_score": 0.0, "letter": "FF", "coefficient": 0.0}
        ]"#;
        let policy: DiscreteBuckets = serde_json::from_str(raw).expect("valid table");
        assert_eq!(policy.resolve(39.5).letter, LetterGrade::Dc);
    }
}
