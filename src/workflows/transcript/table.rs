use super::TranscriptError;
use crate::workflows::grading::Course;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

#[derive(Debug, Deserialize, Serialize)]
struct CourseRow {
    name: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    credit: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    midterm: Option<String>,
    #[serde(rename = "final", default, deserialize_with = "empty_string_as_none")]
    final_score: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    term: Option<String>,
}

impl CourseRow {
    fn into_course(self) -> Course {
        let course = Course::from_text(
            &self.name,
            self.credit.as_deref().unwrap_or_default(),
            self.midterm.as_deref().unwrap_or_default(),
            self.final_score.as_deref().unwrap_or_default(),
        );
        match self.term {
            Some(term) => course.with_term(term),
            None => course,
        }
    }

    fn from_course(course: &Course) -> Self {
        Self {
            name: course.name.clone(),
            credit: Some(course.credit.to_string()),
            midterm: course.midterm.map(|score| score.to_string()),
            final_score: course.final_score.map(|score| score.to_string()),
            term: course.term.clone(),
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// Reads a `name,credit,midterm,final,term` table. Blank cells are absent
/// scores; rows without a name are skipped.
pub fn read_courses<R: Read>(reader: R) -> Result<Vec<Course>, TranscriptError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut courses = Vec::new();
    for record in csv_reader.deserialize::<CourseRow>() {
        let row = record?;
        if row.name.trim().is_empty() {
            continue;
        }
        courses.push(row.into_course());
    }
    Ok(courses)
}

pub fn write_courses<W: Write>(writer: W, courses: &[Course]) -> Result<(), TranscriptError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for course in courses {
        csv_writer.serialize(CourseRow::from_course(course))?;
    }
    csv_writer.flush()?;
    Ok(())
}
