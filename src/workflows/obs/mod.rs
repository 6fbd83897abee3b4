//! Import of course rows pasted from the student information portal.
//!
//! The portal renders a semester table per term; copying it yields loosely
//! tab-separated text with the term header, column titles, and per-course
//! exam lines interleaved. [`ObsImporter`] recovers course code, year, name,
//! credit, midterm, final, and term from that text.

mod normalizer;
mod parser;

use crate::workflows::grading::input::{parse_credit, parse_score};
use crate::workflows::grading::Course;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use tracing::info;

#[derive(Debug)]
pub enum ObsImportError {
    Io(std::io::Error),
    NoCourses,
}

impl std::fmt::Display for ObsImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObsImportError::Io(err) => write!(f, "failed to read portal export: {}", err),
            ObsImportError::NoCourses => {
                write!(f, "no course rows found; paste the whole grade table")
            }
        }
    }
}

impl std::error::Error for ObsImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ObsImportError::Io(err) => Some(err),
            ObsImportError::NoCourses => None,
        }
    }
}

impl From<std::io::Error> for ObsImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedCourse {
    pub code: String,
    pub year: String,
    pub name: String,
    pub credit: f64,
    pub midterm: Option<f64>,
    #[serde(rename = "final")]
    pub final_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
}

impl ImportedCourse {
    pub fn into_course(self) -> Course {
        let course = Course::new(self.name)
            .with_credit(self.credit)
            .with_midterm(self.midterm)
            .with_final(self.final_score);
        match self.term {
            Some(term) => course.with_term(term),
            None => course,
        }
    }
}

impl From<ImportedCourse> for Course {
    fn from(imported: ImportedCourse) -> Self {
        imported.into_course()
    }
}

pub struct ObsImporter;

impl ObsImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<ImportedCourse>, ObsImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(mut reader: R) -> Result<Vec<ImportedCourse>, ObsImportError> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Self::from_text(&text)
    }

    pub fn from_text(text: &str) -> Result<Vec<ImportedCourse>, ObsImportError> {
        let normalized = normalizer::normalize_text(text);
        let courses: Vec<ImportedCourse> = parser::parse_records(&normalized)
            .into_iter()
            .map(|record| ImportedCourse {
                code: record.code,
                year: record.year,
                name: record.name,
                credit: parse_credit(&record.credit),
                midterm: record.midterm.as_deref().and_then(parse_score),
                final_score: record.final_score.as_deref().and_then(parse_score),
                term: record.term,
            })
            .collect();

        if courses.is_empty() {
            return Err(ObsImportError::NoCourses);
        }

        info!(
            courses = courses.len(),
            terms = distinct_terms(&courses),
            "imported courses from portal text"
        );
        Ok(courses)
    }
}

fn distinct_terms(courses: &[ImportedCourse]) -> usize {
    courses
        .iter()
        .filter_map(|course| course.term.as_deref())
        .collect::<HashSet<_>>()
        .len()
}
