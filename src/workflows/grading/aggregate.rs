use super::course::Course;
use super::evaluator::{CourseEvaluator, Verdict};
use super::policy::ScorePolicy;
use super::settings::Settings;
use serde::{Deserialize, Serialize};
use tracing::info;

/// How the four-point GPA is derived from a set of courses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GpaMethod {
    /// Credit-weighted mean of each course's own coefficient.
    #[default]
    CourseCoefficients,
    /// Credit-weighted term average resolved once through the policy.
    TermAverage,
}

/// Treatment of courses that have a midterm but no final yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingFinal {
    #[default]
    Exclude,
    /// Count the midterm as a provisional final.
    AssumeMidterm,
}

/// Which courses a summary covers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TermFilter {
    #[default]
    All,
    Named(String),
}

impl TermFilter {
    pub fn admits(&self, course: &Course) -> bool {
        match self {
            TermFilter::All => true,
            TermFilter::Named(term) => course.term.as_deref() == Some(term.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AggregationOptions {
    pub gpa_method: GpaMethod,
    pub missing_final: MissingFinal,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TermSummary {
    pub term_average: f64,
    pub gpa: f64,
    pub graded_credits: f64,
    pub registered_credits: f64,
    pub course_count: usize,
    pub passed: usize,
    pub failed: usize,
}

/// Folds evaluated courses into a term average and GPA.
pub struct TermAggregator<'a, P> {
    evaluator: &'a CourseEvaluator<P>,
    settings: &'a Settings,
    options: AggregationOptions,
}

impl<'a, P: ScorePolicy> TermAggregator<'a, P> {
    pub fn new(
        evaluator: &'a CourseEvaluator<P>,
        settings: &'a Settings,
        options: AggregationOptions,
    ) -> Self {
        Self {
            evaluator,
            settings,
            options,
        }
    }

    pub fn summarize<'c, I>(&self, courses: I, filter: &TermFilter) -> TermSummary
    where
        I: IntoIterator<Item = &'c Course>,
    {
        let mut summary = TermSummary::default();
        let mut weighted_points = 0.0;
        let mut weighted_coefficients = 0.0;

        for course in courses.into_iter().filter(|course| filter.admits(course)) {
            summary.course_count += 1;
            if course.credit > 0.0 {
                summary.registered_credits += course.credit;
            }

            let graded = match (course.final_score, self.options.missing_final) {
                (None, MissingFinal::AssumeMidterm) => {
                    course.clone().with_final(course.midterm)
                }
                _ => course.clone(),
            };
            let result = self.evaluator.evaluate(&graded, self.settings);

            match result.verdict {
                Verdict::Pass | Verdict::Conditional => summary.passed += 1,
                Verdict::Fail(_) => summary.failed += 1,
                Verdict::Pending => {}
            }

            let (Some(average), Some(coefficient)) = (result.weighted_average, result.coefficient)
            else {
                continue;
            };
            if course.credit <= 0.0 {
                continue;
            }

            weighted_points += average * course.credit;
            weighted_coefficients += coefficient * course.credit;
            summary.graded_credits += course.credit;
        }

        if summary.graded_credits > 0.0 {
            summary.term_average = weighted_points / summary.graded_credits;
            summary.gpa = match self.options.gpa_method {
                GpaMethod::CourseCoefficients => weighted_coefficients / summary.graded_credits,
                GpaMethod::TermAverage => {
                    self.evaluator
                        .policy()
                        .resolve(summary.term_average)
                        .coefficient
                }
            };
        }

        info!(
            courses = summary.course_count,
            graded_credits = summary.graded_credits,
            term_average = summary.term_average,
            gpa = summary.gpa,
            "term summarized"
        );
        summary
    }
}

/// Distinct term names in first-seen order.
pub fn terms<'c, I>(courses: I) -> Vec<String>
where
    I: IntoIterator<Item = &'c Course>,
{
    let mut terms: Vec<String> = Vec::new();
    for term in courses.into_iter().filter_map(|course| course.term.as_ref()) {
        if !terms.contains(term) {
            terms.push(term.clone());
        }
    }
    terms
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::grading::policy::{GradingPolicy, PolicyKind};

    fn courses() -> Vec<Course> {
        vec![
            Course::new("Matematik I")
                .with_credit(6.0)
                .with_midterm(Some(55.0))
                .with_final(Some(75.0))
                .with_term("2024-2025 Güz Dönemi"),
            Course::new("Kimya")
                .with_credit(5.0)
                .with_midterm(Some(85.0))
                .with_final(Some(30.0))
                .with_term("2024-2025 Güz Dönemi"),
            Course::new("Devre Analizi I")
                .with_credit(5.0)
                .with_midterm(Some(44.0))
                .with_term("2025-2026 Güz Dönemi"),
        ]
    }

    #[test]
    fn course_coefficients_count_floor_failures_as_zero() {
        let evaluator = CourseEvaluator::new(GradingPolicy::standard(PolicyKind::Buckets));
        let settings = Settings::default();
        let aggregator = TermAggregator::new(&evaluator, &settings, AggregationOptions::default());

        let summary = aggregator.summarize(&courses(), &TermFilter::All);

        assert_eq!(summary.course_count, 3);
        assert_eq!(summary.registered_credits, 16.0);
        assert_eq!(summary.graded_credits, 11.0);
        // (67 * 6 + 52 * 5) / 11
        assert!((summary.term_average - 662.0 / 11.0).abs() < 1e-9);
        // (3.0 * 6 + 0.0 * 5) / 11
        assert!((summary.gpa - 18.0 / 11.0).abs() < 1e-9);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn term_average_method_resolves_the_mean_once() {
        let evaluator = CourseEvaluator::new(GradingPolicy::standard(PolicyKind::Buckets));
        let settings = Settings::default();
        let options = AggregationOptions {
            gpa_method: GpaMethod::TermAverage,
            ..AggregationOptions::default()
        };
        let aggregator = TermAggregator::new(&evaluator, &settings, options);

        let summary = aggregator.summarize(&courses(), &TermFilter::All);

        // 60.18 rounds to 60, a CB
        assert_eq!(summary.gpa, 2.5);
    }

    #[test]
    fn provisional_finals_use_the_midterm() {
        let evaluator = CourseEvaluator::new(GradingPolicy::standard(PolicyKind::Buckets));
        let settings = Settings::default();
        let options = AggregationOptions {
            missing_final: MissingFinal::AssumeMidterm,
            ..AggregationOptions::default()
        };
        let aggregator = TermAggregator::new(&evaluator, &settings, options);

        let summary = aggregator.summarize(
            &courses(),
            &TermFilter::Named("2025-2026 Güz Dönemi".to_string()),
        );

        assert_eq!(summary.course_count, 1);
        assert_eq!(summary.graded_credits, 5.0);
        assert!((summary.term_average - 44.0).abs() < 1e-9);
        assert_eq!(summary.gpa, 1.5);
    }

    #[test]
    fn empty_selection_reports_zeroes() {
        let evaluator = CourseEvaluator::new(GradingPolicy::default());
        let settings = Settings::default();
        let aggregator = TermAggregator::new(&evaluator, &settings, AggregationOptions::default());

        let summary = aggregator.summarize(&courses(), &TermFilter::Named("Yaz".to_string()));

        assert_eq!(summary, TermSummary::default());
    }

    #[test]
    fn terms_are_listed_in_first_seen_order() {
        assert_eq!(
            terms(&courses()),
            vec![
                "2024-2025 Güz Dönemi".to_string(),
                "2025-2026 Güz Dönemi".to_string()
            ]
        );
    }
}
