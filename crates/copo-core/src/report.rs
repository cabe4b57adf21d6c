//! Student performance report with JSON persistence.
//!
//! Joins per-course CO attainment with the student's identity. Layout of any
//! exported file (CSV columns, styling) belongs to the caller.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attainment::{student_co_attainment, StudentAttainment};
use crate::error::IntegrityFault;
use crate::index::CourseIndex;
use crate::model::{Course, Student};
use crate::traits::StoreSnapshot;

/// A complete student report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    pub student: StudentSummary,
    /// One section per course, in course creation order.
    pub courses: Vec<CourseSection>,
}

/// Identity fields of the student a report is about.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub roll_number: String,
    pub semester: Option<u32>,
}

impl From<&Student> for StudentSummary {
    fn from(student: &Student) -> Self {
        Self {
            id: student.id.clone(),
            name: student.name.clone(),
            email: student.email.clone(),
            roll_number: student.roll_number.clone(),
            semester: student.semester,
        }
    }
}

/// CO attainment for one course of the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseSection {
    pub course_id: String,
    pub course_name: String,
    pub semester: u32,
    pub attainment: StudentAttainment,
}

/// Courses in which a student has at least one mark, in creation order.
pub fn courses_with_activity<'a>(
    snapshot: &'a dyn StoreSnapshot,
    student_id: &str,
) -> Vec<&'a Course> {
    let active: HashSet<&str> = snapshot
        .marks_for_student(student_id)
        .into_iter()
        .filter_map(|mark| snapshot.question(&mark.question_id))
        .filter_map(|question| snapshot.exam(&question.exam_id))
        .map(|exam| exam.course_id.as_str())
        .collect();

    snapshot
        .courses()
        .into_iter()
        .filter(|course| active.contains(course.id.as_str()))
        .collect()
}

/// Build a report for `student` over `courses`.
pub fn build_student_report(
    snapshot: &dyn StoreSnapshot,
    student: &Student,
    courses: &[&Course],
) -> StudentReport {
    let sections = courses
        .iter()
        .filter_map(|course| {
            let index = CourseIndex::build(snapshot, &course.id)?;
            Some(CourseSection {
                course_id: course.id.clone(),
                course_name: course.name.clone(),
                semester: course.semester,
                attainment: student_co_attainment(&index, snapshot, &student.id),
            })
        })
        .collect();

    StudentReport {
        id: Uuid::new_v4(),
        generated_at: Utc::now(),
        student: StudentSummary::from(student),
        courses: sections,
    }
}

impl StudentReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: StudentReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Every fault attached to any section.
    pub fn faults(&self) -> impl Iterator<Item = &IntegrityFault> {
        self.courses.iter().flat_map(|c| c.attainment.faults.iter())
    }
}
