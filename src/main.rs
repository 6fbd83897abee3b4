use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use gradecalc::config::{AppConfig, GradingConfig};
use gradecalc::error::AppError;
use gradecalc::telemetry;
use gradecalc::workflows::grading::{
    terms, AggregationOptions, Course, CourseEvaluator, EvaluationResult, GpaMethod, MissingFinal,
    PolicyKind, Settings, TermAggregator, TermFilter, TermSummary, Verdict,
};
use gradecalc::workflows::obs::ObsImporter;
use gradecalc::workflows::transcript::{read_courses, write_courses, Transcript};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "gradecalc",
    about = "Resolve letter grades, pass/fail verdicts, and the final exam score still needed",
    version
)]
struct Cli {
    #[command(flatten)]
    grading: GradingArgs,
    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Default)]
struct GradingArgs {
    /// Score policy: buckets or piecewise (overrides GRADE_POLICY)
    #[arg(long, global = true)]
    policy: Option<PolicyKind>,
    /// Midterm weight as a fraction, e.g. 0.4
    #[arg(long, global = true)]
    midterm_weight: Option<f64>,
    /// Final weight as a fraction, e.g. 0.6
    #[arg(long, global = true)]
    final_weight: Option<f64>,
    /// Minimum rounded average for a full pass
    #[arg(long, global = true)]
    pass_threshold: Option<f64>,
    /// Minimum rounded average for a conditional pass
    #[arg(long, global = true)]
    conditional_threshold: Option<f64>,
    /// Minimum final exam score; anything lower fails the course
    #[arg(long, global = true)]
    final_floor: Option<f64>,
}

impl GradingArgs {
    fn apply(&self, grading: &mut GradingConfig) {
        if let Some(policy) = self.policy {
            grading.policy = policy;
        }
        self.apply_settings(&mut grading.settings);
    }

    fn apply_settings(&self, settings: &mut Settings) {
        let overrides = [
            (self.midterm_weight, &mut settings.midterm_weight),
            (self.final_weight, &mut settings.final_weight),
            (self.pass_threshold, &mut settings.pass_threshold),
            (self.conditional_threshold, &mut settings.conditional_threshold),
            (self.final_floor, &mut settings.final_floor),
        ];
        for (value, field) in overrides {
            if let Some(value) = value {
                *field = value;
            }
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate a single course from its midterm and (optional) final
    Evaluate(EvaluateArgs),
    /// List the final exam score each grade needs given a midterm
    Project(ProjectArgs),
    /// Summarize term averages and GPA for a saved course list
    Report(ReportArgs),
    /// Convert text copied from the student portal into a course list
    Import(ImportArgs),
}

#[derive(Args, Debug)]
struct EvaluateArgs {
    /// Midterm score; accepts a comma decimal separator
    #[arg(long)]
    midterm: String,
    /// Final exam score; leave out to get projections instead
    #[arg(long = "final")]
    final_score: Option<String>,
    /// Course credit
    #[arg(long, default_value = "0")]
    credit: String,
    /// Course name used in the output
    #[arg(long, default_value = "Course")]
    name: String,
}

#[derive(Args, Debug)]
struct ProjectArgs {
    /// Midterm score; accepts a comma decimal separator
    #[arg(long)]
    midterm: String,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false, id = "source")]
struct CourseSource {
    /// JSON snapshot with settings and courses
    #[arg(long)]
    snapshot: Option<PathBuf>,
    /// CSV table with name,credit,midterm,final,term columns
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Text copied from the student portal's grade page
    #[arg(long)]
    obs: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum GpaArg {
    /// Credit-weighted mean of per-course coefficients
    Courses,
    /// Term average resolved once through the policy
    Average,
}

impl From<GpaArg> for GpaMethod {
    fn from(value: GpaArg) -> Self {
        match value {
            GpaArg::Courses => GpaMethod::CourseCoefficients,
            GpaArg::Average => GpaMethod::TermAverage,
        }
    }
}

#[derive(Args, Debug)]
struct ReportArgs {
    #[command(flatten)]
    source: CourseSource,
    /// Limit the report to one term, e.g. "2024-2025 Güz Dönemi"
    #[arg(long)]
    term: Option<String>,
    /// How the GPA is derived
    #[arg(long, value_enum, default_value = "courses")]
    gpa_method: GpaArg,
    /// Count the midterm as the final for courses still awaiting one
    #[arg(long)]
    assume_midterm: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ImportFormat {
    Csv,
    Snapshot,
}

#[derive(Args, Debug)]
struct ImportArgs {
    /// Text copied from the student portal's grade page
    #[arg(long)]
    obs: PathBuf,
    /// Output format
    #[arg(long, value_enum, default_value = "csv")]
    format: ImportFormat,
    /// Write to this file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct CourseReport<'a> {
    course: &'a Course,
    result: EvaluationResult,
}

#[derive(Debug, Serialize)]
struct TermReport {
    term: Option<String>,
    summary: TermSummary,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    policy: PolicyKind,
    settings: Settings,
    options: AggregationOptions,
    courses: Vec<CourseReport<'a>>,
    terms: Vec<TermReport>,
}

fn main() {
    if let Err(err) = run_cli() {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let mut config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    cli.grading.apply(&mut config.grading);
    config.grading.settings.validate()?;

    info!(
        ?config.environment,
        policy = config.grading.policy.label(),
        "grade calculator ready"
    );

    let evaluator = CourseEvaluator::standard(config.grading.policy);

    match cli.command {
        Command::Evaluate(args) => run_evaluate(&evaluator, &config.grading, args, cli.json),
        Command::Project(args) => run_project(&evaluator, &config.grading, args, cli.json),
        Command::Report(args) => {
            run_report(&evaluator, &config.grading, &cli.grading, args, cli.json)
        }
        Command::Import(args) => run_import(&config.grading, args),
    }
}

fn run_evaluate(
    evaluator: &CourseEvaluator,
    grading: &GradingConfig,
    args: EvaluateArgs,
    json: bool,
) -> Result<(), AppError> {
    let course = Course::from_text(
        &args.name,
        &args.credit,
        &args.midterm,
        args.final_score.as_deref().unwrap_or_default(),
    );
    let result = evaluator.evaluate(&course, &grading.settings);

    if json {
        print_json(&CourseReport {
            course: &course,
            result,
        })
    } else {
        render_evaluation(&course, &result, grading);
        Ok(())
    }
}

fn run_project(
    evaluator: &CourseEvaluator,
    grading: &GradingConfig,
    args: ProjectArgs,
    json: bool,
) -> Result<(), AppError> {
    let course = Course::from_text("Course", "0", &args.midterm, "");
    let result = evaluator.evaluate(&course, &grading.settings);

    if json {
        return print_json(&result.projections);
    }

    match course.midterm {
        Some(midterm) => {
            println!(
                "Midterm {} ({} policy, final floor {})",
                midterm,
                grading.policy.label(),
                grading.settings.final_floor
            );
            render_projections(&result);
        }
        None => println!("No midterm score given; nothing to project."),
    }
    Ok(())
}

fn run_report(
    evaluator: &CourseEvaluator,
    grading: &GradingConfig,
    overrides: &GradingArgs,
    args: ReportArgs,
    json: bool,
) -> Result<(), AppError> {
    let ReportArgs {
        source,
        term,
        gpa_method,
        assume_midterm,
    } = args;

    let (courses, settings) = load_courses(source, grading, overrides)?;
    settings.validate()?;

    let options = AggregationOptions {
        gpa_method: gpa_method.into(),
        missing_final: if assume_midterm {
            MissingFinal::AssumeMidterm
        } else {
            MissingFinal::Exclude
        },
    };
    let aggregator = TermAggregator::new(evaluator, &settings, options);

    let filter = match term {
        Some(name) => TermFilter::Named(name),
        None => TermFilter::All,
    };
    let selected: Vec<&Course> = courses
        .iter()
        .filter(|course| filter.admits(course))
        .collect();

    let mut term_reports = Vec::new();
    if matches!(filter, TermFilter::All) {
        for name in terms(selected.iter().copied()) {
            let summary = aggregator.summarize(
                selected.iter().copied(),
                &TermFilter::Named(name.clone()),
            );
            term_reports.push(TermReport {
                term: Some(name),
                summary,
            });
        }
    }
    term_reports.push(TermReport {
        term: match &filter {
            TermFilter::All => None,
            TermFilter::Named(name) => Some(name.clone()),
        },
        summary: aggregator.summarize(selected.iter().copied(), &filter),
    });

    let report = Report {
        policy: evaluator.policy().kind(),
        settings,
        options,
        courses: selected
            .iter()
            .map(|course| CourseReport {
                course,
                result: evaluator.evaluate(course, &settings),
            })
            .collect(),
        terms: term_reports,
    };

    if json {
        print_json(&report)
    } else {
        render_report(&report);
        Ok(())
    }
}

/// Snapshots carry their own settings; command-line overrides still win.
fn load_courses(
    source: CourseSource,
    grading: &GradingConfig,
    overrides: &GradingArgs,
) -> Result<(Vec<Course>, Settings), AppError> {
    let CourseSource { snapshot, csv, obs } = source;

    if let Some(path) = snapshot {
        let transcript = Transcript::load(path)?;
        let mut settings = transcript.settings;
        overrides.apply_settings(&mut settings);
        return Ok((transcript.courses, settings));
    }

    let courses = match (csv, obs) {
        (Some(path), _) => read_courses(std::fs::File::open(path)?)?,
        (None, Some(path)) => ObsImporter::from_path(path)?
            .into_iter()
            .map(Course::from)
            .collect(),
        (None, None) => Vec::new(),
    };
    Ok((courses, grading.settings))
}

fn run_import(grading: &GradingConfig, args: ImportArgs) -> Result<(), AppError> {
    let courses: Vec<Course> = ObsImporter::from_path(&args.obs)?
        .into_iter()
        .map(Course::from)
        .collect();

    match (args.format, args.output) {
        (ImportFormat::Csv, Some(path)) => {
            write_courses(std::fs::File::create(&path)?, &courses)?;
            info!(path = %path.display(), courses = courses.len(), "course table written");
        }
        (ImportFormat::Csv, None) => write_courses(std::io::stdout().lock(), &courses)?,
        (ImportFormat::Snapshot, Some(path)) => {
            Transcript::new(grading.settings, courses).save(path)?
        }
        (ImportFormat::Snapshot, None) => {
            Transcript::new(grading.settings, courses)
                .write_to(std::io::stdout().lock(), Utc::now())?
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn format_score(score: Option<f64>) -> String {
    match score {
        Some(score) => format!("{score}"),
        None => "-".to_string(),
    }
}

fn render_evaluation(course: &Course, result: &EvaluationResult, grading: &GradingConfig) {
    println!("{} ({} credits)", course.name, course.credit);
    println!(
        "Midterm {}, final {} ({} policy)",
        format_score(course.midterm),
        format_score(course.final_score),
        grading.policy.label()
    );
    println!("Status: {}", result.stage.label());

    if let Some(average) = result.weighted_average {
        println!("Weighted average: {average:.2}");
    }
    if let (Some(letter), Some(coefficient)) = (result.letter, result.coefficient) {
        println!("Letter grade: {letter} ({coefficient:.2})");
    }
    println!("Verdict: {}", result.verdict.label());
    if let Verdict::Fail(reason) = result.verdict {
        println!("Reason: {}", reason.summary());
    }

    if !result.projections.is_empty() {
        render_projections(result);
    }
}

fn render_projections(result: &EvaluationResult) {
    println!("\nFinal exam needed");
    for projection in &result.projections {
        println!(
            "- {} (average {}): {}",
            projection.target.label(),
            projection.boundary,
            projection.requirement.label()
        );
    }
}

fn render_report(report: &Report<'_>) {
    println!("Grade report ({} policy)", report.policy.label());
    println!(
        "Weights: midterm {}, final {}; pass {}, conditional {}, final floor {}",
        report.settings.midterm_weight,
        report.settings.final_weight,
        report.settings.pass_threshold,
        report.settings.conditional_threshold,
        report.settings.final_floor
    );

    if report.courses.is_empty() {
        println!("\nCourses: none");
    } else {
        println!("\nCourses");
        for entry in &report.courses {
            println!(
                "- {} | {} credits | midterm {} | final {} | {}",
                entry.course.name,
                entry.course.credit,
                format_score(entry.course.midterm),
                format_score(entry.course.final_score),
                entry.result.summary()
            );
        }
    }

    for term in &report.terms {
        let label = term.term.as_deref().unwrap_or("All terms");
        let summary = &term.summary;
        println!("\n{label}");
        println!(
            "- average {:.2}, GPA {:.2}",
            summary.term_average, summary.gpa
        );
        println!(
            "- {} courses, {} passed, {} failed",
            summary.course_count, summary.passed, summary.failed
        );
        println!(
            "- {} of {} credits graded",
            summary.graded_credits, summary.registered_credits
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grading() -> GradingConfig {
        GradingConfig {
            policy: PolicyKind::Buckets,
            settings: Settings::default(),
        }
    }

    #[test]
    fn cli_parses_global_overrides_after_the_subcommand() {
        let cli = Cli::try_parse_from([
            "gradecalc",
            "evaluate",
            "--midterm",
            "55",
            "--final",
            "75",
            "--policy",
            "piecewise",
            "--final-floor",
            "40",
            "--json",
        ])
        .expect("arguments parse");

        assert!(cli.json);
        let mut config = grading();
        cli.grading.apply(&mut config);
        assert_eq!(config.policy, PolicyKind::Piecewise);
        assert_eq!(config.settings.final_floor, 40.0);
        assert_eq!(config.settings.pass_threshold, 50.0);
    }

    #[test]
    fn report_requires_exactly_one_source() {
        assert!(Cli::try_parse_from(["gradecalc", "report"]).is_err());
        assert!(Cli::try_parse_from([
            "gradecalc", "report", "--csv", "a.csv", "--obs", "b.txt"
        ])
        .is_err());
        assert!(Cli::try_parse_from(["gradecalc", "report", "--csv", "a.csv"]).is_ok());
    }

    #[test]
    fn course_report_serializes_course_and_result() {
        let evaluator = CourseEvaluator::standard(PolicyKind::Buckets);
        let course = Course::from_text("Kimya", "5", "85", "53");
        let report = CourseReport {
            result: evaluator.evaluate(&course, &Settings::default()),
            course: &course,
        };

        let value = serde_json::to_value(&report).expect("report serializes");
        assert_eq!(value["course"]["name"], "Kimya");
        assert_eq!(value["result"]["letter"], "BB");
        assert_eq!(value["result"]["verdict"], "pass");
    }

    #[test]
    fn missing_scores_render_as_dashes() {
        assert_eq!(format_score(None), "-");
        assert_eq!(format_score(Some(67.5)), "67.5");
    }

    #[test]
    fn snapshot_settings_yield_to_command_line_overrides() {
        let dir = std::env::temp_dir().join(format!("gradecalc-cli-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("snapshot.json");
        let mut transcript = Transcript::new(
            Settings {
                final_floor: 30.0,
                pass_threshold: 60.0,
                ..Settings::default()
            },
            vec![Course::from_text("Fizik I", "6", "45", "60")],
        );
        transcript.save(&path).expect("snapshot saved");

        let overrides = GradingArgs {
            final_floor: Some(45.0),
            ..GradingArgs::default()
        };
        let source = CourseSource {
            snapshot: Some(path),
            csv: None,
            obs: None,
        };
        let (courses, settings) =
            load_courses(source, &grading(), &overrides).expect("courses load");
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(courses.len(), 1);
        assert_eq!(settings.pass_threshold, 60.0);
        assert_eq!(settings.final_floor, 45.0);
    }
}
