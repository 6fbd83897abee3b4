use gradecalc::workflows::grading::{
    terms, AggregationOptions, Course, CourseEvaluator, GpaMethod, MissingFinal, PolicyKind,
    Settings, TermAggregator, TermFilter,
};
use gradecalc::workflows::obs::ObsImporter;
use gradecalc::workflows::transcript::{read_courses, write_courses, Transcript};

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/obs_transcript.txt");
const FIRST_TERM: &str = "2024-2025 Güz Dönemi";
const SECOND_TERM: &str = "2024-2025 Bahar Dönemi";
const CURRENT_TERM: &str = "2025-2026 Güz Dönemi";

fn courses() -> Vec<Course> {
    ObsImporter::from_path(FIXTURE)
        .expect("fixture imports")
        .into_iter()
        .map(Course::from)
        .collect()
}

fn close(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 1e-9
}

#[test]
fn completed_terms_match_the_portal_averages() {
    let evaluator = CourseEvaluator::standard(PolicyKind::Buckets);
    let settings = Settings::default();
    let aggregator = TermAggregator::new(&evaluator, &settings, AggregationOptions::default());
    let courses = courses();

    let first = aggregator.summarize(&courses, &TermFilter::Named(FIRST_TERM.to_string()));
    assert_eq!(first.course_count, 6);
    assert_eq!(first.graded_credits, 30.0);
    assert!(close(first.gpa, 91.0 / 30.0), "gpa {}", first.gpa);
    assert!(close(first.term_average, 2053.8 / 30.0));
    assert_eq!(first.passed, 6);

    let second = aggregator.summarize(&courses, &TermFilter::Named(SECOND_TERM.to_string()));
    assert!(close(second.gpa, 2.7), "gpa {}", second.gpa);
    assert_eq!(second.passed, 7);
    assert_eq!(second.failed, 0);
}

#[test]
fn current_term_has_nothing_graded_until_finals() {
    let evaluator = CourseEvaluator::standard(PolicyKind::Buckets);
    let settings = Settings::default();
    let courses = courses();
    let filter = TermFilter::Named(CURRENT_TERM.to_string());

    let excluded = TermAggregator::new(&evaluator, &settings, AggregationOptions::default())
        .summarize(&courses, &filter);
    assert_eq!(excluded.graded_credits, 0.0);
    assert_eq!(excluded.registered_credits, 30.0);
    assert_eq!(excluded.gpa, 0.0);
    assert_eq!(excluded.term_average, 0.0);

    let provisional = TermAggregator::new(
        &evaluator,
        &settings,
        AggregationOptions {
            missing_final: MissingFinal::AssumeMidterm,
            ..AggregationOptions::default()
        },
    )
    .summarize(&courses, &filter);
    assert_eq!(provisional.graded_credits, 30.0);
    assert!(close(provisional.gpa, 2.7), "gpa {}", provisional.gpa);
}

#[test]
fn overall_gpa_spans_every_graded_term() {
    let evaluator = CourseEvaluator::standard(PolicyKind::Buckets);
    let settings = Settings::default();
    let courses = courses();

    let overall = TermAggregator::new(&evaluator, &settings, AggregationOptions::default())
        .summarize(&courses, &TermFilter::All);

    assert_eq!(overall.course_count, 21);
    assert_eq!(overall.graded_credits, 60.0);
    assert_eq!(overall.registered_credits, 90.0);
    assert!(close(overall.gpa, 172.0 / 60.0));
    assert_eq!(terms(&courses), vec![FIRST_TERM, SECOND_TERM, CURRENT_TERM]);
}

#[test]
fn gpa_methods_and_policies_can_be_swapped() {
    let settings = Settings::default();
    let courses = courses();
    let filter = TermFilter::Named(FIRST_TERM.to_string());

    let bucket = CourseEvaluator::standard(PolicyKind::Buckets);
    let by_average = TermAggregator::new(
        &bucket,
        &settings,
        AggregationOptions {
            gpa_method: GpaMethod::TermAverage,
            ..AggregationOptions::default()
        },
    )
    .summarize(&courses, &filter);
    // 68.46 rounds to 68, a BB.
    assert_eq!(by_average.gpa, 3.0);

    let piecewise = CourseEvaluator::standard(PolicyKind::Piecewise);
    let formula = TermAggregator::new(&piecewise, &settings, AggregationOptions::default())
        .summarize(&courses, &filter);
    assert!(formula.gpa > 0.0 && formula.gpa <= 4.0);
    assert!(close(formula.term_average, by_average.term_average));
}

#[test]
fn course_tables_and_snapshots_survive_a_disk_round_trip() {
    let dir = std::env::temp_dir().join(format!("gradecalc-report-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    let courses = courses();

    let table_path = dir.join("courses.csv");
    write_courses(
        std::fs::File::create(&table_path).expect("table file"),
        &courses,
    )
    .expect("table written");
    let from_table =
        read_courses(std::fs::File::open(&table_path).expect("table file")).expect("table read");

    let snapshot_path = dir.join("snapshot.json");
    let mut transcript = Transcript::new(Settings::default(), courses.clone());
    transcript.save(&snapshot_path).expect("snapshot saved");
    let from_snapshot = Transcript::load(&snapshot_path).expect("snapshot loaded");

    std::fs::remove_dir_all(&dir).ok();

    assert_eq!(from_table, courses);
    assert_eq!(from_snapshot.courses, courses);
    assert!(from_snapshot.saved_at.is_some());
}
