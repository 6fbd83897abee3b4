use crate::workflows::grading::{PolicyKind, Settings, SettingsError};
use std::env;
use std::fmt;

/// Distinguishes runtime behavior for different stages of the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub grading: GradingConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let policy = match env::var("GRADE_POLICY") {
            Ok(value) => value
                .parse::<PolicyKind>()
                .map_err(|_| ConfigError::InvalidPolicy { value })?,
            Err(_) => PolicyKind::default(),
        };

        let defaults = Settings::default();
        let settings = Settings {
            midterm_weight: number_var("GRADE_MIDTERM_WEIGHT", defaults.midterm_weight)?,
            final_weight: number_var("GRADE_FINAL_WEIGHT", defaults.final_weight)?,
            pass_threshold: number_var("GRADE_PASS_THRESHOLD", defaults.pass_threshold)?,
            conditional_threshold: number_var(
                "GRADE_CONDITIONAL_THRESHOLD",
                defaults.conditional_threshold,
            )?,
            final_floor: number_var("GRADE_FINAL_FLOOR", defaults.final_floor)?,
        };
        settings.validate().map_err(ConfigError::InvalidSettings)?;

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            grading: GradingConfig { policy, settings },
        })
    }
}

fn number_var(name: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(name) {
        Ok(value) if value.trim().is_empty() => Ok(default),
        Ok(value) => value
            .trim()
            .replace(',', ".")
            .parse::<f64>()
            .ok()
            .filter(|number| number.is_finite())
            .ok_or(ConfigError::InvalidNumber { name, value }),
        Err(_) => Ok(default),
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Scoring policy and weights applied when a command does not override them.
#[derive(Debug, Clone)]
pub struct GradingConfig {
    pub policy: PolicyKind,
    pub settings: Settings,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidNumber { name: &'static str, value: String },
    InvalidPolicy { value: String },
    InvalidSettings(SettingsError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidNumber { name, value } => {
                write!(f, "{name} must be a number, got '{value}'")
            }
            ConfigError::InvalidPolicy { value } => {
                write!(
                    f,
                    "GRADE_POLICY must be 'buckets' or 'piecewise', got '{value}'"
                )
            }
            ConfigError::InvalidSettings(err) => write!(f, "invalid grading settings: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidNumber { .. } | ConfigError::InvalidPolicy { .. } => None,
            ConfigError::InvalidSettings(err) => Some(err),
        }
    }
}
