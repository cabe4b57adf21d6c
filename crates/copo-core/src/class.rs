//! Class-wide CO attainment.
//!
//! The class is every student with at least one mark on a question of the
//! course. There is no enrollment table, so the roster is derived from
//! activity.

use serde::{Deserialize, Serialize};

use crate::attainment::{round2, tally_outcome};
use crate::error::{FaultLog, IntegrityFault};
use crate::index::CourseIndex;
use crate::traits::StoreSnapshot;

/// One student's attainment on one CO, as listed in a class breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentCoScore {
    pub student_id: String,
    pub student_name: String,
    pub attainment_percentage: f64,
}

/// Class attainment on one CO.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassCoAttainment {
    pub co_id: String,
    pub co_code: String,
    pub description: String,
    /// Mean of the students' percentages, rounded to 2 decimals.
    pub class_average: f64,
    /// Sorted by name (case-insensitive), then by student id.
    pub student_attainments: Vec<StudentCoScore>,
}

/// Class attainment across the COs of one course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassAttainment {
    pub course_id: String,
    /// COs in creation order. A CO no student attempted is absent.
    pub outcomes: Vec<ClassCoAttainment>,
    #[serde(default)]
    pub faults: Vec<IntegrityFault>,
}

impl ClassAttainment {
    pub fn get(&self, co_id: &str) -> Option<&ClassCoAttainment> {
        self.outcomes.iter().find(|o| o.co_id == co_id)
    }

    pub fn by_code(&self, co_code: &str) -> Option<&ClassCoAttainment> {
        self.outcomes.iter().find(|o| o.co_code == co_code)
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Class attainment for an indexed course.
pub fn class_co_attainment(index: &CourseIndex<'_>, snapshot: &dyn StoreSnapshot) -> ClassAttainment {
    let mut faults = FaultLog::default();
    faults.extend(index.faults().iter().cloned());

    let mut roster: Vec<(String, &str)> = index
        .roster(snapshot)
        .into_iter()
        .map(|id| {
            let name = snapshot
                .student(id)
                .map(|s| s.name.clone())
                .unwrap_or_else(|| id.to_string());
            (name, id)
        })
        .collect();
    roster.sort_by(|(a_name, a_id), (b_name, b_id)| {
        a_name
            .to_lowercase()
            .cmp(&b_name.to_lowercase())
            .then_with(|| a_id.cmp(b_id))
    });

    let mut outcomes = Vec::new();
    for co in index.outcomes() {
        let student_attainments: Vec<StudentCoScore> = roster
            .iter()
            .filter_map(|(name, id)| {
                let tally = tally_outcome(index, snapshot, id, &co.id, &mut faults)?;
                Some(StudentCoScore {
                    student_id: id.to_string(),
                    student_name: name.clone(),
                    attainment_percentage: tally.percentage(),
                })
            })
            .collect();

        if student_attainments.is_empty() {
            continue;
        }

        let sum: f64 = student_attainments
            .iter()
            .map(|s| s.attainment_percentage)
            .sum();
        let class_average = round2(sum / student_attainments.len() as f64);

        outcomes.push(ClassCoAttainment {
            co_id: co.id.clone(),
            co_code: co.co_code.clone(),
            description: co.description.clone(),
            class_average,
            student_attainments,
        });
    }

    ClassAttainment {
        course_id: index.course.id.clone(),
        outcomes,
        faults: faults.into_vec(),
    }
}

/// Compute class CO attainment for a course.
///
/// An unknown course yields an empty result.
pub fn compute_class_co_attainment(snapshot: &dyn StoreSnapshot, course_id: &str) -> ClassAttainment {
    match CourseIndex::build(snapshot, course_id) {
        Some(index) => class_co_attainment(&index, snapshot),
        None => ClassAttainment {
            course_id: course_id.to_string(),
            outcomes: Vec::new(),
            faults: Vec::new(),
        },
    }
}
