//! Error and fault types.
//!
//! `IntegrityFault` describes a stored record that violates a data invariant.
//! Faults never abort a computation: the offending record is skipped and the
//! fault travels with the result so the caller can decide whether to show it
//! to a user, log it, or fail. `QueryError` is what the query façade returns
//! when a request cannot be answered at all.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A stored record that violates an invariant the engine relies on.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntegrityFault {
    /// A mark is larger than its question's maximum.
    #[error("mark {mark_id}: obtained {obtained_marks} exceeds maximum {max_marks} on question {question_id}")]
    MarksExceedMaximum {
        mark_id: String,
        student_id: String,
        question_id: String,
        obtained_marks: f64,
        max_marks: f64,
    },

    /// A mark is below zero.
    #[error("mark {mark_id}: obtained {obtained_marks} is negative on question {question_id}")]
    NegativeMarks {
        mark_id: String,
        student_id: String,
        question_id: String,
        obtained_marks: f64,
    },

    /// A question whose maximum is zero or negative.
    #[error("question {question_id}: max_marks {max_marks} is not positive")]
    NonPositiveMaxMarks { question_id: String, max_marks: f64 },

    /// A CO-PO link whose weight is zero or negative.
    #[error("CO-PO link {co_id} -> {po_id}: weight {weight} is not positive")]
    NonPositiveWeight {
        co_id: String,
        po_id: String,
        weight: f64,
    },
}

/// Ordered, duplicate-free collection of faults gathered during one call.
#[derive(Debug, Clone, Default)]
pub(crate) struct FaultLog {
    faults: Vec<IntegrityFault>,
}

impl FaultLog {
    pub(crate) fn push(&mut self, fault: IntegrityFault) {
        if !self.faults.contains(&fault) {
            self.faults.push(fault);
        }
    }

    pub(crate) fn extend(&mut self, faults: impl IntoIterator<Item = IntegrityFault>) {
        for fault in faults {
            self.push(fault);
        }
    }

    pub(crate) fn into_vec(self) -> Vec<IntegrityFault> {
        self.faults
    }
}

/// The kind of entity a lookup was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Student,
    Course,
    Program,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Student => write!(f, "student"),
            EntityKind::Course => write!(f, "course"),
            EntityKind::Program => write!(f, "program"),
        }
    }
}

/// Errors returned by the query façade.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The requested id does not resolve in the entity store.
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    /// The entity store could not produce a snapshot.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl QueryError {
    pub fn not_found(kind: EntityKind, id: &str) -> Self {
        QueryError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Returns `true` if this is a `NotFound` error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, QueryError::NotFound { .. })
    }
}
