//! Grade resolution, pass/fail verdicts, and final-exam projections.
//!
//! A [`ScorePolicy`] turns a 0–100 score into a letter and coefficient. The
//! [`CourseEvaluator`] combines midterm and final through [`Settings`], applies
//! the final floor, and projects the final score each target still needs when
//! only the midterm is known. [`TermAggregator`] folds evaluated courses into
//! a term average and GPA.

pub mod aggregate;
mod buckets;
pub mod course;
mod evaluator;
pub mod input;
mod letter;
mod piecewise;
pub mod policy;
mod rounding;
mod settings;

#[cfg(test)]
mod tests;

pub use aggregate::{
    terms, AggregationOptions, GpaMethod, MissingFinal, TermAggregator, TermFilter, TermSummary,
};
pub use buckets::{DiscreteBuckets, GradeBucket};
pub use course::{Course, CourseStage};
pub use evaluator::{
    CourseEvaluator, EvaluationResult, FailReason, FinalRequirement, Projection,
    ProjectionTarget, Verdict,
};
pub use letter::{LetterGrade, UnknownLetterGrade};
pub use piecewise::{LinearSegment, PiecewiseLinear};
pub use policy::{
    GradeBoundary, GradeResolution, GradingPolicy, PolicyError, PolicyKind, ScorePolicy,
};
pub use settings::{Settings, SettingsError};
