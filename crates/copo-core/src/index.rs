//! Per-course index.
//!
//! Built once per computation from snapshot reads: the course's COs in
//! creation order, and CO id -> questions across every exam of the course.

use std::collections::{HashMap, HashSet};

use crate::error::IntegrityFault;
use crate::model::{Course, CourseOutcome, Question};
use crate::traits::StoreSnapshot;

/// Id-indexed view of one course's outcomes and questions.
#[derive(Debug)]
pub struct CourseIndex<'a> {
    pub course: &'a Course,
    outcomes: Vec<&'a CourseOutcome>,
    questions_by_co: HashMap<&'a str, Vec<&'a Question>>,
    /// Every question of every exam of the course, valid or not.
    all_questions: Vec<&'a Question>,
    faults: Vec<IntegrityFault>,
}

impl<'a> CourseIndex<'a> {
    /// Index a course. Returns `None` if the course does not exist.
    ///
    /// Questions with a non-positive maximum are left out of the CO map and
    /// reported as faults. Questions tagged with a CO of another course are
    /// not counted toward any CO of this one.
    pub fn build(snapshot: &'a dyn StoreSnapshot, course_id: &str) -> Option<Self> {
        let course = snapshot.course(course_id)?;
        let outcomes = snapshot.outcomes_for_course(course_id);
        let own: HashSet<&str> = outcomes.iter().map(|co| co.id.as_str()).collect();

        let mut questions_by_co: HashMap<&'a str, Vec<&'a Question>> = HashMap::new();
        let mut all_questions = Vec::new();
        let mut faults = Vec::new();

        for exam in snapshot.exams_for_course(course_id) {
            for question in snapshot.questions_for_exam(&exam.id) {
                all_questions.push(question);
                if question.max_marks <= 0.0 || question.max_marks.is_nan() {
                    faults.push(IntegrityFault::NonPositiveMaxMarks {
                        question_id: question.id.clone(),
                        max_marks: question.max_marks,
                    });
                    continue;
                }
                if own.contains(question.co_id.as_str()) {
                    questions_by_co
                        .entry(question.co_id.as_str())
                        .or_default()
                        .push(question);
                }
            }
        }

        Some(Self {
            course,
            outcomes,
            questions_by_co,
            all_questions,
            faults,
        })
    }

    /// COs of the course in creation order.
    pub fn outcomes(&self) -> &[&'a CourseOutcome] {
        &self.outcomes
    }

    /// Valid questions tagged with `co_id`, in exam then question order.
    pub fn questions_for(&self, co_id: &str) -> &[&'a Question] {
        self.questions_by_co
            .get(co_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Question-level faults found while indexing.
    pub fn faults(&self) -> &[IntegrityFault] {
        &self.faults
    }

    /// Students with at least one mark on any question of the course, in
    /// order of first appearance.
    pub fn roster(&self, snapshot: &'a dyn StoreSnapshot) -> Vec<&'a str> {
        let mut seen = HashSet::new();
        let mut roster = Vec::new();
        for question in &self.all_questions {
            for mark in snapshot.marks_for_question(&question.id) {
                if seen.insert(mark.student_id.as_str()) {
                    roster.push(mark.student_id.as_str());
                }
            }
        }
        roster
    }
}
