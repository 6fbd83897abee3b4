use super::TranscriptError;
use crate::workflows::grading::{Course, Settings};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;

/// Saved calculator state. Unknown or missing fields fall back to defaults so
/// older snapshots keep loading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl Transcript {
    pub fn new(settings: Settings, courses: Vec<Course>) -> Self {
        Self {
            settings,
            courses,
            saved_at: None,
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TranscriptError> {
        let file = std::fs::File::open(path.as_ref())?;
        let transcript = Self::from_reader(file)?;
        info!(
            path = %path.as_ref().display(),
            courses = transcript.courses.len(),
            "transcript loaded"
        );
        Ok(transcript)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TranscriptError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Writes the snapshot, stamping `saved_at` with the current time.
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<(), TranscriptError> {
        let file = std::fs::File::create(path.as_ref())?;
        self.write_to(file, Utc::now())?;
        info!(
            path = %path.as_ref().display(),
            courses = self.courses.len(),
            "transcript saved"
        );
        Ok(())
    }

    pub fn write_to<W: Write>(
        &mut self,
        mut writer: W,
        saved_at: DateTime<Utc>,
    ) -> Result<(), TranscriptError> {
        self.saved_at = Some(saved_at);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn snapshot_keeps_settings_courses_and_timestamp() {
        let mut transcript = Transcript::new(
            Settings {
                final_floor: 30.0,
                ..Settings::default()
            },
            vec![Course::new("Kimya")
                .with_credit(5.0)
                .with_midterm(Some(85.0))
                .with_final(Some(53.0))
                .with_term("2024-2025 Güz Dönemi")],
        );
        let stamp = Utc
            .with_ymd_and_hms(2025, 1, 20, 9, 30, 0)
            .single()
            .expect("valid timestamp");

        let mut buffer = Vec::new();
        transcript
            .write_to(&mut buffer, stamp)
            .expect("snapshot written");
        let loaded = Transcript::from_reader(buffer.as_slice()).expect("snapshot read");

        assert_eq!(loaded.saved_at, Some(stamp));
        assert_eq!(loaded.settings.final_floor, 30.0);
        assert_eq!(loaded, transcript);
    }

    #[test]
    fn partial_snapshots_fill_in_defaults() {
        let json = r#"{"courses":[{"name":"Fizik I","credit":"6","midterm":"45","final":""}]}"#;

        let loaded = Transcript::from_reader(json.as_bytes()).expect("snapshot read");

        assert_eq!(loaded.settings, Settings::default());
        assert!(loaded.saved_at.is_none());
        let course = &loaded.courses[0];
        assert_eq!(course.credit, 6.0);
        assert_eq!(course.midterm, Some(45.0));
        assert_eq!(course.final_score, None);
    }

    #[test]
    fn malformed_json_is_reported() {
        match Transcript::from_reader("{ not json".as_bytes()) {
            Err(TranscriptError::Json(_)) => {}
            other => panic!("expected json error, got {other:?}"),
        }
    }
}
