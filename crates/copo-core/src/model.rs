//! Core data model types for copo.
//!
//! These are the entity records the attainment engine reads. They are owned
//! and written by the entity store's administrative writers; the engine only
//! ever borrows them from a snapshot.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An academic program (e.g. "B.Tech Computer Science").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub id: String,
    pub name: String,
}

/// A course offered within a program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub name: String,
    /// Semester the course is taught in (1-based).
    pub semester: u32,
    pub program_id: String,
}

/// A student. Identity is joined into class breakdowns and reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub roll_number: String,
    #[serde(default)]
    pub semester: Option<u32>,
    #[serde(default)]
    pub program_id: Option<String>,
}

/// A course outcome (CO): one learning objective of one course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseOutcome {
    pub id: String,
    pub course_id: String,
    /// Short code, unique within the course (e.g. "CO1").
    pub co_code: String,
    #[serde(default)]
    pub description: String,
}

/// A program outcome (PO): a program-wide objective that COs feed into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramOutcome {
    pub id: String,
    /// Short code (e.g. "PO3").
    pub po_code: String,
    #[serde(default)]
    pub description: String,
    /// Owning program, when known. Never used to filter propagation.
    #[serde(default)]
    pub program_id: Option<String>,
}

/// Weighted contribution of one CO toward one PO.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoPoLink {
    pub co_id: String,
    pub po_id: String,
    /// Contribution strength. Must be positive.
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

/// Kind of exam. `Internal` and `Final` are built in; anything else is kept
/// verbatim as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ExamType {
    Internal,
    Final,
    Other(String),
}

impl fmt::Display for ExamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExamType::Internal => write!(f, "Internal"),
            ExamType::Final => write!(f, "Final"),
            ExamType::Other(label) => write!(f, "{label}"),
        }
    }
}

impl FromStr for ExamType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "" => Err("exam type must not be empty".to_string()),
            "internal" => Ok(ExamType::Internal),
            "final" => Ok(ExamType::Final),
            _ => Ok(ExamType::Other(trimmed.to_string())),
        }
    }
}

impl TryFrom<String> for ExamType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ExamType> for String {
    fn from(value: ExamType) -> Self {
        value.to_string()
    }
}

/// An exam sitting of a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exam {
    pub id: String,
    pub course_id: String,
    pub exam_type: ExamType,
    pub exam_date: NaiveDate,
}

/// A question of an exam, tagged with exactly one CO.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub exam_id: String,
    #[serde(default)]
    pub text: String,
    pub max_marks: f64,
    pub co_id: String,
}

/// Marks a student obtained on one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentMark {
    /// Record id. Optional in dataset files.
    #[serde(default)]
    pub id: Option<String>,
    pub student_id: String,
    pub question_id: String,
    pub obtained_marks: f64,
}

impl StudentMark {
    /// Identifier used when reporting on this record.
    pub fn record_id(&self) -> String {
        self.id
            .clone()
            .unwrap_or_else(|| format!("{}/{}", self.student_id, self.question_id))
    }
}
