//! Entity store trait definitions.
//!
//! The engine never talks to storage directly. A store hands out a
//! `StoreSnapshot`, a consistent read view, and every computation runs all
//! of its reads against that single snapshot.

use std::sync::Arc;

use async_trait::async_trait;

use crate::model::{
    CoPoLink, Course, CourseOutcome, Exam, Program, ProgramOutcome, Question, Student, StudentMark,
};

// ---------------------------------------------------------------------------
// Read view
// ---------------------------------------------------------------------------

/// A consistent, read-only view of the entity store.
///
/// Every sequence is returned in creation order.
pub trait StoreSnapshot: Send + Sync {
    fn program(&self, id: &str) -> Option<&Program>;

    fn course(&self, id: &str) -> Option<&Course>;

    /// All courses.
    fn courses(&self) -> Vec<&Course>;

    /// Courses belonging to a program.
    fn courses_for_program(&self, program_id: &str) -> Vec<&Course>;

    fn student(&self, id: &str) -> Option<&Student>;

    /// COs of a course.
    fn outcomes_for_course(&self, course_id: &str) -> Vec<&CourseOutcome>;

    fn program_outcome(&self, id: &str) -> Option<&ProgramOutcome>;

    /// All program outcomes.
    fn program_outcomes(&self) -> Vec<&ProgramOutcome>;

    /// CO-PO links whose CO is `co_id`.
    fn links_for_co(&self, co_id: &str) -> Vec<&CoPoLink>;

    fn exam(&self, id: &str) -> Option<&Exam>;

    /// Exams of a course.
    fn exams_for_course(&self, course_id: &str) -> Vec<&Exam>;

    fn question(&self, id: &str) -> Option<&Question>;

    /// Questions of an exam.
    fn questions_for_exam(&self, exam_id: &str) -> Vec<&Question>;

    /// The mark a student obtained on a question, if one was recorded.
    fn mark(&self, student_id: &str, question_id: &str) -> Option<&StudentMark>;

    /// All marks recorded on a question.
    fn marks_for_question(&self, question_id: &str) -> Vec<&StudentMark>;

    /// All marks recorded for a student.
    fn marks_for_student(&self, student_id: &str) -> Vec<&StudentMark>;
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// A source of snapshots.
///
/// Implementations backed by a transactional system should pin one
/// transaction per snapshot so a concurrent write cannot leak into a
/// computation that is already running.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Human-readable store name (e.g. "memory").
    fn name(&self) -> &str;

    /// Take a consistent read snapshot.
    async fn snapshot(&self) -> anyhow::Result<Arc<dyn StoreSnapshot>>;
}
