use super::course::{Course, CourseStage};
use super::letter::LetterGrade;
use super::policy::{GradingPolicy, PolicyKind, ScorePolicy};
use super::rounding::{ceil_needed, clamp_score, round_half_up, MAX_SCORE};
use super::settings::Settings;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Pass/fail outcome of a course evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Conditional,
    Fail(FailReason),
    Pending,
}

impl Verdict {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pass => "Passed",
            Self::Conditional => "Conditional",
            Self::Fail(_) => "Failed",
            Self::Pending => "Pending",
        }
    }

    /// Pass and Conditional both count as passing.
    pub const fn is_passing(self) -> bool {
        matches!(self, Self::Pass | Self::Conditional)
    }
}

/// Why a fully scored course failed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailReason {
    /// The final exam missed the floor; the average does not matter.
    BelowFinalFloor { final_score: f64, floor: f64 },
    /// The rounded average missed the conditional threshold.
    BelowThreshold { average: f64, required: f64 },
}

impl FailReason {
    pub fn summary(&self) -> String {
        match self {
            FailReason::BelowFinalFloor { final_score, floor } => {
                format!("final {final_score} is below the final floor of {floor}")
            }
            FailReason::BelowThreshold { average, required } => {
                format!("average {average} is below the required {required}")
            }
        }
    }
}

/// What a projection row aims for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionTarget {
    Pass,
    Conditional,
    Letter(LetterGrade),
}

impl ProjectionTarget {
    pub fn label(&self) -> String {
        match self {
            ProjectionTarget::Pass => "Pass".to_string(),
            ProjectionTarget::Conditional => "Conditional".to_string(),
            ProjectionTarget::Letter(letter) => letter.label().to_string(),
        }
    }
}

/// Final score a student still needs for one target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalRequirement {
    /// Arithmetic requirement, already at or above the final floor.
    Needed(f64),
    /// Arithmetic requirement fell below the floor; the floor applies.
    Floor(f64),
    /// More than 100 is required, or the final carries no weight.
    Unreachable,
}

impl FinalRequirement {
    pub fn score(&self) -> Option<f64> {
        match self {
            FinalRequirement::Needed(score) | FinalRequirement::Floor(score) => Some(*score),
            FinalRequirement::Unreachable => None,
        }
    }

    pub fn label(&self) -> String {
        match self {
            FinalRequirement::Needed(score) => format!("{score}"),
            FinalRequirement::Floor(score) => format!("{score} (floor)"),
            FinalRequirement::Unreachable => ">100".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub target: ProjectionTarget,
    /// Rounded average the target requires.
    pub boundary: f64,
    pub requirement: FinalRequirement,
}

/// Everything derived from one course snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub stage: CourseStage,
    pub weighted_average: Option<f64>,
    pub verdict: Verdict,
    pub letter: Option<LetterGrade>,
    pub coefficient: Option<f64>,
    pub projections: Vec<Projection>,
}

impl EvaluationResult {
    fn pending(stage: CourseStage) -> Self {
        Self {
            stage,
            weighted_average: None,
            verdict: Verdict::Pending,
            letter: None,
            coefficient: None,
            projections: Vec::new(),
        }
    }

    /// Projection for `target`, if one was produced.
    pub fn projection(&self, target: ProjectionTarget) -> Option<&Projection> {
        self.projections
            .iter()
            .find(|projection| projection.target == target)
    }

    pub fn summary(&self) -> String {
        match (self.weighted_average, self.letter) {
            (Some(average), Some(letter)) => match self.verdict {
                Verdict::Fail(reason) => format!(
                    "average {average:.2}: {} ({letter}), {}",
                    self.verdict.label(),
                    reason.summary()
                ),
                verdict => format!("average {average:.2}: {} ({letter})", verdict.label()),
            },
            _ if !self.projections.is_empty() => {
                let needs = self
                    .projections
                    .iter()
                    .filter(|projection| {
                        matches!(
                            projection.target,
                            ProjectionTarget::Pass | ProjectionTarget::Conditional
                        )
                    })
                    .map(|projection| {
                        format!(
                            "{} needs {}",
                            projection.target.label(),
                            projection.requirement.label()
                        )
                    })
                    .collect::<Vec<_>>();
                format!("awaiting final: {}", needs.join(", "))
            }
            _ => "awaiting midterm".to_string(),
        }
    }
}

/// Applies weighting, thresholds, and a score policy to course snapshots.
///
/// Stateless: the same course and settings always produce the same result.
#[derive(Debug, Clone)]
pub struct CourseEvaluator<P = GradingPolicy> {
    policy: P,
}

impl CourseEvaluator {
    /// Evaluator over the institution's standard table for `kind`.
    pub fn standard(kind: PolicyKind) -> Self {
        Self::new(GradingPolicy::standard(kind))
    }
}

impl<P: ScorePolicy> CourseEvaluator<P> {
    pub fn new(policy: P) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn evaluate(&self, course: &Course, settings: &Settings) -> EvaluationResult {
        let stage = course.stage();
        let result = match (course.midterm, course.final_score) {
            (Some(midterm), Some(final_score)) => {
                self.resolve_scores(clamp_score(midterm), clamp_score(final_score), settings)
            }
            (Some(midterm), None) => EvaluationResult {
                projections: self.project(clamp_score(midterm), settings),
                ..EvaluationResult::pending(stage)
            },
            (None, _) => EvaluationResult::pending(stage),
        };

        debug!(
            course = %course.name,
            stage = stage.label(),
            verdict = result.verdict.label(),
            average = ?result.weighted_average,
            "course evaluated"
        );
        result
    }

    /// `midterm * midterm_weight + final * final_weight`, unrounded.
    pub fn weighted_average(midterm: f64, final_score: f64, settings: &Settings) -> f64 {
        midterm * settings.midterm_weight + final_score * settings.final_weight
    }

    fn resolve_scores(
        &self,
        midterm: f64,
        final_score: f64,
        settings: &Settings,
    ) -> EvaluationResult {
        let average = Self::weighted_average(midterm, final_score, settings);

        if final_score < settings.final_floor {
            return EvaluationResult {
                stage: CourseStage::FullyScored,
                weighted_average: Some(average),
                verdict: Verdict::Fail(FailReason::BelowFinalFloor {
                    final_score,
                    floor: settings.final_floor,
                }),
                letter: Some(self.policy.failing_letter()),
                coefficient: Some(0.0),
                projections: Vec::new(),
            };
        }

        let rounded = round_half_up(average);
        let resolution = self.policy.resolve(rounded);
        let verdict = if rounded >= settings.pass_threshold {
            Verdict::Pass
        } else if rounded >= settings.conditional_threshold {
            Verdict::Conditional
        } else {
            Verdict::Fail(FailReason::BelowThreshold {
                average: rounded,
                required: settings.conditional_threshold,
            })
        };

        EvaluationResult {
            stage: CourseStage::FullyScored,
            weighted_average: Some(average),
            verdict,
            letter: Some(resolution.letter),
            coefficient: Some(resolution.coefficient),
            projections: Vec::new(),
        }
    }

    fn project(&self, midterm: f64, settings: &Settings) -> Vec<Projection> {
        let current = midterm * settings.midterm_weight;
        let failing = self.policy.failing_letter();

        // Verdicts compare the rounded average, so fractional thresholds act as
        // their ceiling.
        let mut targets = vec![
            (
                ProjectionTarget::Pass,
                ceil_needed(settings.pass_threshold),
            ),
            (
                ProjectionTarget::Conditional,
                ceil_needed(settings.conditional_threshold),
            ),
        ];
        targets.extend(
            self.policy
                .boundaries()
                .into_iter()
                .filter(|boundary| {
                    boundary.letter != failing
                        && boundary.min_score >= settings.conditional_threshold
                })
                .map(|boundary| (ProjectionTarget::Letter(boundary.letter), boundary.min_score)),
        );
        targets.sort_by(|a, b| b.1.total_cmp(&a.1));

        if settings.final_weight <= 0.0 || settings.final_weight.is_nan() {
            warn!(
                final_weight = settings.final_weight,
                "final carries no weight; no projection target is reachable"
            );
        }

        targets
            .into_iter()
            .map(|(target, boundary)| Projection {
                target,
                boundary,
                requirement: required_final(boundary, current, settings),
            })
            .collect()
    }
}

fn required_final(boundary: f64, current: f64, settings: &Settings) -> FinalRequirement {
    if settings.final_weight <= 0.0 || settings.final_weight.is_nan() {
        return FinalRequirement::Unreachable;
    }

    // A target the midterm already secures needs no final beyond the floor.
    let arithmetic = ceil_needed((boundary - current) / settings.final_weight).max(0.0);
    let needed = arithmetic.max(settings.final_floor);
    if needed > MAX_SCORE {
        FinalRequirement::Unreachable
    } else if arithmetic < settings.final_floor {
        FinalRequirement::Floor(settings.final_floor)
    } else {
        FinalRequirement::Needed(arithmetic)
    }
}
