//! Query façade.
//!
//! Resolves the requested ids against one store snapshot, then dispatches to
//! the aggregators. Every call takes exactly one snapshot, so a concurrent
//! write cannot produce a result that mixes old and new state.

use std::sync::Arc;

use crate::attainment::{compute_student_co_attainment, StudentAttainment};
use crate::class::{compute_class_co_attainment, ClassAttainment};
use crate::error::{EntityKind, QueryError};
use crate::propagation::{compute_po_attainment, PoAttainment, PoScope};
use crate::report::{build_student_report, courses_with_activity, StudentReport};
use crate::traits::{EntityStore, StoreSnapshot};

/// Stateless entry point for attainment queries.
#[derive(Clone)]
pub struct AttainmentEngine {
    store: Arc<dyn EntityStore>,
}

fn require_course(snapshot: &dyn StoreSnapshot, course_id: &str) -> Result<(), QueryError> {
    match snapshot.course(course_id) {
        Some(_) => Ok(()),
        None => Err(QueryError::not_found(EntityKind::Course, course_id)),
    }
}

fn require_student(snapshot: &dyn StoreSnapshot, student_id: &str) -> Result<(), QueryError> {
    match snapshot.student(student_id) {
        Some(_) => Ok(()),
        None => Err(QueryError::not_found(EntityKind::Student, student_id)),
    }
}

impl AttainmentEngine {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Name of the backing store.
    pub fn store_name(&self) -> &str {
        self.store.name()
    }

    /// CO attainment of one student in one course.
    pub async fn student_attainment(
        &self,
        student_id: &str,
        course_id: &str,
    ) -> Result<StudentAttainment, QueryError> {
        let snapshot = self.store.snapshot().await?;
        require_student(snapshot.as_ref(), student_id)?;
        require_course(snapshot.as_ref(), course_id)?;
        Ok(compute_student_co_attainment(
            snapshot.as_ref(),
            student_id,
            course_id,
        ))
    }

    /// Class-wide CO attainment of a course.
    pub async fn class_attainment(&self, course_id: &str) -> Result<ClassAttainment, QueryError> {
        let snapshot = self.store.snapshot().await?;
        require_course(snapshot.as_ref(), course_id)?;
        Ok(compute_class_co_attainment(snapshot.as_ref(), course_id))
    }

    /// PO attainment for a course or a program.
    pub async fn po_attainment(&self, scope: &PoScope) -> Result<PoAttainment, QueryError> {
        let snapshot = self.store.snapshot().await?;
        match scope {
            PoScope::Course(id) => require_course(snapshot.as_ref(), id)?,
            PoScope::Program(id) => {
                if snapshot.program(id).is_none() {
                    return Err(QueryError::not_found(EntityKind::Program, id));
                }
            }
        }
        Ok(compute_po_attainment(snapshot.as_ref(), scope))
    }

    /// Report of a student's CO attainment, joined with their identity.
    ///
    /// With a course id only that course is included. Without one, every
    /// course where the student has at least one mark is included.
    pub async fn student_report(
        &self,
        student_id: &str,
        course_id: Option<&str>,
    ) -> Result<StudentReport, QueryError> {
        let snapshot = self.store.snapshot().await?;
        let snapshot = snapshot.as_ref();
        let student = snapshot
            .student(student_id)
            .ok_or_else(|| QueryError::not_found(EntityKind::Student, student_id))?;

        let courses = match course_id {
            Some(id) => vec![snapshot
                .course(id)
                .ok_or_else(|| QueryError::not_found(EntityKind::Course, id))?],
            None => courses_with_activity(snapshot, student_id),
        };

        Ok(build_student_report(snapshot, student, &courses))
    }
}
