//! Per-student CO attainment.
//!
//! For one student and one course, sums obtained and maximum marks over every
//! question tagged with each CO, across all exams of the course.

use serde::{Deserialize, Serialize};

use crate::error::{FaultLog, IntegrityFault};
use crate::index::CourseIndex;
use crate::model::{Question, StudentMark};
use crate::traits::StoreSnapshot;

/// Attainment of one student on one CO.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoAttainment {
    pub co_id: String,
    pub co_code: String,
    pub description: String,
    pub obtained_marks: f64,
    pub total_marks: f64,
    /// `100 * obtained / total`, rounded to 2 decimals.
    pub attainment_percentage: f64,
}

/// Attainment of one student across the COs of one course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentAttainment {
    pub student_id: String,
    pub course_id: String,
    /// COs in creation order. COs without questions, or without a single
    /// valid mark from this student, are absent.
    pub outcomes: Vec<CoAttainment>,
    /// Records skipped because they violate a data invariant.
    #[serde(default)]
    pub faults: Vec<IntegrityFault>,
}

impl StudentAttainment {
    fn empty(student_id: &str, course_id: &str) -> Self {
        Self {
            student_id: student_id.to_string(),
            course_id: course_id.to_string(),
            outcomes: Vec::new(),
            faults: Vec::new(),
        }
    }

    /// Look up a CO by id.
    pub fn get(&self, co_id: &str) -> Option<&CoAttainment> {
        self.outcomes.iter().find(|o| o.co_id == co_id)
    }

    /// Look up a CO by code.
    pub fn by_code(&self, co_code: &str) -> Option<&CoAttainment> {
        self.outcomes.iter().find(|o| o.co_code == co_code)
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Summed marks of one student over the questions of one CO.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Tally {
    pub obtained: f64,
    pub total: f64,
}

impl Tally {
    pub(crate) fn percentage(&self) -> f64 {
        round2(100.0 * self.obtained / self.total)
    }
}

/// Round to 2 decimal places. Exact halves round to the even neighbour.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Check a mark against its question. Returns the fault if it is invalid.
pub(crate) fn check_mark(mark: &StudentMark, question: &Question) -> Option<IntegrityFault> {
    let obtained = mark.obtained_marks;
    if obtained < 0.0 || obtained.is_nan() {
        return Some(IntegrityFault::NegativeMarks {
            mark_id: mark.record_id(),
            student_id: mark.student_id.clone(),
            question_id: question.id.clone(),
            obtained_marks: obtained,
        });
    }
    if obtained > question.max_marks {
        return Some(IntegrityFault::MarksExceedMaximum {
            mark_id: mark.record_id(),
            student_id: mark.student_id.clone(),
            question_id: question.id.clone(),
            obtained_marks: obtained,
            max_marks: question.max_marks,
        });
    }
    None
}

/// Sum a student's marks over the questions of one CO.
///
/// A question without a mark adds only its maximum to the total. A question
/// whose mark is faulty is left out entirely. Returns `None` when the CO has
/// no questions or the student has no valid mark on any of them.
pub(crate) fn tally_outcome(
    index: &CourseIndex<'_>,
    snapshot: &dyn StoreSnapshot,
    student_id: &str,
    co_id: &str,
    faults: &mut FaultLog,
) -> Option<Tally> {
    let mut tally = Tally {
        obtained: 0.0,
        total: 0.0,
    };
    let mut attempted = false;

    for question in index.questions_for(co_id) {
        match snapshot.mark(student_id, &question.id) {
            None => tally.total += question.max_marks,
            Some(mark) => {
                if let Some(fault) = check_mark(mark, question) {
                    faults.push(fault);
                    continue;
                }
                attempted = true;
                tally.obtained += mark.obtained_marks;
                tally.total += question.max_marks;
            }
        }
    }

    (attempted && tally.total > 0.0).then_some(tally)
}

/// Attainment of a student on every CO of an indexed course.
pub fn student_co_attainment(
    index: &CourseIndex<'_>,
    snapshot: &dyn StoreSnapshot,
    student_id: &str,
) -> StudentAttainment {
    let mut faults = FaultLog::default();
    faults.extend(index.faults().iter().cloned());

    let outcomes = index
        .outcomes()
        .iter()
        .filter_map(|co| {
            let tally = tally_outcome(index, snapshot, student_id, &co.id, &mut faults)?;
            Some(CoAttainment {
                co_id: co.id.clone(),
                co_code: co.co_code.clone(),
                description: co.description.clone(),
                obtained_marks: tally.obtained,
                total_marks: tally.total,
                attainment_percentage: tally.percentage(),
            })
        })
        .collect();

    StudentAttainment {
        student_id: student_id.to_string(),
        course_id: index.course.id.clone(),
        outcomes,
        faults: faults.into_vec(),
    }
}

/// Compute a student's CO attainment for a course.
///
/// An unknown student or course yields an empty result, not an error.
pub fn compute_student_co_attainment(
    snapshot: &dyn StoreSnapshot,
    student_id: &str,
    course_id: &str,
) -> StudentAttainment {
    match CourseIndex::build(snapshot, course_id) {
        Some(index) => student_co_attainment(&index, snapshot, student_id),
        None => StudentAttainment::empty(student_id, course_id),
    }
}
