//! CO -> PO propagation.
//!
//! Each PO's attainment is the weighted mean of the class averages of the COs
//! linked to it: `sum(weight_i * co_i) / sum(weight_i)`. Weights are used
//! exactly as stored.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::attainment::round2;
use crate::class::class_co_attainment;
use crate::error::{FaultLog, IntegrityFault};
use crate::index::CourseIndex;
use crate::model::Course;
use crate::traits::StoreSnapshot;

/// Which COs feed the propagation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", content = "id", rename_all = "lowercase")]
pub enum PoScope {
    /// COs of one course.
    Course(String),
    /// COs of every course of a program.
    Program(String),
}

impl fmt::Display for PoScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoScope::Course(id) => write!(f, "course {id}"),
            PoScope::Program(id) => write!(f, "program {id}"),
        }
    }
}

/// One CO's share in a PO's attainment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoContribution {
    pub co_id: String,
    pub co_code: String,
    pub course_id: String,
    pub weight: f64,
    /// The CO's class average.
    pub co_attainment: f64,
}

/// Attainment of one PO.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoOutcomeAttainment {
    pub po_id: String,
    pub po_code: String,
    pub description: String,
    /// Weighted mean of the contributions, rounded to 2 decimals.
    pub attainment_percentage: f64,
    /// In course, then CO creation order.
    pub contributing_cos: Vec<CoContribution>,
}

/// PO attainment for a course or program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoAttainment {
    pub scope: PoScope,
    /// POs in creation order. A PO with no contributing CO is absent.
    pub outcomes: Vec<PoOutcomeAttainment>,
    /// COs with a class average but no usable PO link.
    #[serde(default)]
    pub unmapped_cos: Vec<String>,
    #[serde(default)]
    pub faults: Vec<IntegrityFault>,
}

impl PoAttainment {
    pub fn get(&self, po_id: &str) -> Option<&PoOutcomeAttainment> {
        self.outcomes.iter().find(|o| o.po_id == po_id)
    }

    pub fn by_code(&self, po_code: &str) -> Option<&PoOutcomeAttainment> {
        self.outcomes.iter().find(|o| o.po_code == po_code)
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Weighted mean of `(weight, value)` pairs. `None` when the weights sum to
/// zero.
pub fn weighted_mean(pairs: impl IntoIterator<Item = (f64, f64)>) -> Option<f64> {
    let (weighted, weights) = pairs
        .into_iter()
        .fold((0.0, 0.0), |(acc, total), (w, v)| (acc + w * v, total + w));
    (weights > 0.0).then(|| weighted / weights)
}

fn usable_weight(weight: f64) -> bool {
    weight > 0.0
}

fn scoped_courses<'a>(snapshot: &'a dyn StoreSnapshot, scope: &PoScope) -> Vec<&'a Course> {
    match scope {
        PoScope::Course(id) => snapshot.course(id).into_iter().collect(),
        PoScope::Program(id) => snapshot.courses_for_program(id),
    }
}

/// Compute PO attainment for a course or program.
///
/// An unknown course or program yields an empty result.
pub fn compute_po_attainment(snapshot: &dyn StoreSnapshot, scope: &PoScope) -> PoAttainment {
    let mut faults = FaultLog::default();
    let mut by_po: HashMap<String, Vec<CoContribution>> = HashMap::new();
    let mut unmapped_cos = Vec::new();

    for course in scoped_courses(snapshot, scope) {
        let Some(index) = CourseIndex::build(snapshot, &course.id) else {
            continue;
        };
        let class = class_co_attainment(&index, snapshot);
        faults.extend(class.faults);

        // Bad links are reported for every CO in scope, attempted or not.
        for co in index.outcomes() {
            for link in snapshot.links_for_co(&co.id) {
                if !usable_weight(link.weight) {
                    faults.push(IntegrityFault::NonPositiveWeight {
                        co_id: link.co_id.clone(),
                        po_id: link.po_id.clone(),
                        weight: link.weight,
                    });
                }
            }
        }

        for co in &class.outcomes {
            let mut mapped = false;
            for link in snapshot.links_for_co(&co.co_id) {
                if !usable_weight(link.weight) {
                    continue;
                }
                if snapshot.program_outcome(&link.po_id).is_none() {
                    continue;
                }
                mapped = true;
                by_po
                    .entry(link.po_id.clone())
                    .or_default()
                    .push(CoContribution {
                        co_id: co.co_id.clone(),
                        co_code: co.co_code.clone(),
                        course_id: course.id.clone(),
                        weight: link.weight,
                        co_attainment: co.class_average,
                    });
            }
            if !mapped {
                unmapped_cos.push(co.co_id.clone());
            }
        }
    }

    let outcomes = snapshot
        .program_outcomes()
        .into_iter()
        .filter_map(|po| {
            let contributing_cos = by_po.remove(&po.id)?;
            let mean = weighted_mean(
                contributing_cos
                    .iter()
                    .map(|c| (c.weight, c.co_attainment)),
            )?;
            Some(PoOutcomeAttainment {
                po_id: po.id.clone(),
                po_code: po.po_code.clone(),
                description: po.description.clone(),
                attainment_percentage: round2(mean),
                contributing_cos,
            })
        })
        .collect();

    PoAttainment {
        scope: scope.clone(),
        outcomes,
        unmapped_cos,
        faults: faults.into_vec(),
    }
}
