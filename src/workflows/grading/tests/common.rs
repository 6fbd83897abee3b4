use crate::workflows::grading::{
    Course, CourseEvaluator, GradingPolicy, PolicyKind, Settings,
};

pub(super) fn settings() -> Settings {
    Settings {
        midterm_weight: 0.4,
        final_weight: 0.6,
        pass_threshold: 50.0,
        conditional_threshold: 40.0,
        final_floor: 35.0,
    }
}

pub(super) fn bucket_evaluator() -> CourseEvaluator {
    CourseEvaluator::new(GradingPolicy::standard(PolicyKind::Buckets))
}

pub(super) fn piecewise_evaluator() -> CourseEvaluator {
    CourseEvaluator::new(GradingPolicy::standard(PolicyKind::Piecewise))
}

pub(super) fn evaluators() -> [(PolicyKind, CourseEvaluator); 2] {
    [
        (PolicyKind::Buckets, bucket_evaluator()),
        (PolicyKind::Piecewise, piecewise_evaluator()),
    ]
}

pub(super) fn scored(midterm: f64, final_score: f64) -> Course {
    Course::new("Matematik I")
        .with_credit(5.0)
        .with_midterm(Some(midterm))
        .with_final(Some(final_score))
}

pub(super) fn midterm_only(midterm: f64) -> Course {
    Course::new("Devre Analizi I")
        .with_credit(5.0)
        .with_midterm(Some(midterm))
}
