//! In-memory entity store.
//!
//! `Records` is the raw, serializable table set as it appears in dataset
//! files. `Dataset` is the same data arranged as an id-indexed arena with
//! foreign-key indexes, and implements `StoreSnapshot`. `MemoryStore` keeps
//! the current `Dataset` behind an `Arc` and swaps in a rebuilt one on every
//! write, so snapshots handed out earlier stay untouched.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::model::{
    CoPoLink, Course, CourseOutcome, Exam, Program, ProgramOutcome, Question, Student, StudentMark,
};
use crate::traits::{EntityStore, StoreSnapshot};

/// Raw entity tables, in creation order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Records {
    #[serde(default)]
    pub programs: Vec<Program>,
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub course_outcomes: Vec<CourseOutcome>,
    #[serde(default)]
    pub program_outcomes: Vec<ProgramOutcome>,
    #[serde(default)]
    pub co_po_links: Vec<CoPoLink>,
    #[serde(default)]
    pub exams: Vec<Exam>,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub marks: Vec<StudentMark>,
}

impl Records {
    /// Append every table of `other` after the tables of `self`.
    pub fn merge(&mut self, other: Records) {
        self.programs.extend(other.programs);
        self.courses.extend(other.courses);
        self.students.extend(other.students);
        self.course_outcomes.extend(other.course_outcomes);
        self.program_outcomes.extend(other.program_outcomes);
        self.co_po_links.extend(other.co_po_links);
        self.exams.extend(other.exams);
        self.questions.extend(other.questions);
        self.marks.extend(other.marks);
    }
}

/// Position index for a table keyed by a single id.
fn index_by<T>(rows: &[T], key: impl Fn(&T) -> &str) -> HashMap<String, usize> {
    let mut index = HashMap::with_capacity(rows.len());
    for (pos, row) in rows.iter().enumerate() {
        // First record wins on duplicate ids.
        index.entry(key(row).to_string()).or_insert(pos);
    }
    index
}

/// Foreign-key index: parent id -> child positions in creation order.
fn group_by<T>(rows: &[T], key: impl Fn(&T) -> &str) -> HashMap<String, Vec<usize>> {
    let mut index: HashMap<String, Vec<usize>> = HashMap::new();
    for (pos, row) in rows.iter().enumerate() {
        index.entry(key(row).to_string()).or_default().push(pos);
    }
    index
}

fn pick<'a, T>(rows: &'a [T], positions: Option<&Vec<usize>>) -> Vec<&'a T> {
    positions
        .map(|ps| ps.iter().map(|&p| &rows[p]).collect())
        .unwrap_or_default()
}

/// Id-indexed arena over a `Records` set.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Records,
    program_by_id: HashMap<String, usize>,
    course_by_id: HashMap<String, usize>,
    courses_by_program: HashMap<String, Vec<usize>>,
    student_by_id: HashMap<String, usize>,
    outcomes_by_course: HashMap<String, Vec<usize>>,
    po_by_id: HashMap<String, usize>,
    links_by_co: HashMap<String, Vec<usize>>,
    exam_by_id: HashMap<String, usize>,
    exams_by_course: HashMap<String, Vec<usize>>,
    question_by_id: HashMap<String, usize>,
    questions_by_exam: HashMap<String, Vec<usize>>,
    /// student id -> question id -> mark position.
    marks_by_pair: HashMap<String, HashMap<String, usize>>,
    marks_by_question: HashMap<String, Vec<usize>>,
    marks_by_student: HashMap<String, Vec<usize>>,
}

impl Dataset {
    /// Build the arena.
    ///
    /// Marks and links are upserted: a later record for the same
    /// (student, question) or (co, po) pair replaces the earlier one in place.
    pub fn new(mut records: Records) -> Self {
        records.marks = upsert(records.marks, |m| {
            (m.student_id.clone(), m.question_id.clone())
        });
        records.co_po_links = upsert(records.co_po_links, |l| (l.co_id.clone(), l.po_id.clone()));

        let mut marks_by_pair: HashMap<String, HashMap<String, usize>> = HashMap::new();
        for (pos, m) in records.marks.iter().enumerate() {
            marks_by_pair
                .entry(m.student_id.clone())
                .or_default()
                .insert(m.question_id.clone(), pos);
        }

        Self {
            program_by_id: index_by(&records.programs, |p| &p.id),
            course_by_id: index_by(&records.courses, |c| &c.id),
            courses_by_program: group_by(&records.courses, |c| &c.program_id),
            student_by_id: index_by(&records.students, |s| &s.id),
            outcomes_by_course: group_by(&records.course_outcomes, |co| &co.course_id),
            po_by_id: index_by(&records.program_outcomes, |po| &po.id),
            links_by_co: group_by(&records.co_po_links, |l| &l.co_id),
            exam_by_id: index_by(&records.exams, |e| &e.id),
            exams_by_course: group_by(&records.exams, |e| &e.course_id),
            question_by_id: index_by(&records.questions, |q| &q.id),
            questions_by_exam: group_by(&records.questions, |q| &q.exam_id),
            marks_by_pair,
            marks_by_question: group_by(&records.marks, |m| &m.question_id),
            marks_by_student: group_by(&records.marks, |m| &m.student_id),
            records,
        }
    }

    /// The deduplicated records backing this dataset.
    pub fn records(&self) -> &Records {
        &self.records
    }
}

/// Keep one row per key, at the position of its first occurrence, holding the
/// value of its last occurrence.
fn upsert<T, K>(rows: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T>
where
    K: std::hash::Hash + Eq,
{
    let mut position: HashMap<K, usize> = HashMap::with_capacity(rows.len());
    let mut out: Vec<T> = Vec::with_capacity(rows.len());
    for row in rows {
        let k = key(&row);
        match position.get(&k).copied() {
            Some(pos) => out[pos] = row,
            None => {
                position.insert(k, out.len());
                out.push(row);
            }
        }
    }
    out
}

impl StoreSnapshot for Dataset {
    fn program(&self, id: &str) -> Option<&Program> {
        self.program_by_id.get(id).map(|&p| &self.records.programs[p])
    }

    fn course(&self, id: &str) -> Option<&Course> {
        self.course_by_id.get(id).map(|&p| &self.records.courses[p])
    }

    fn courses(&self) -> Vec<&Course> {
        self.records.courses.iter().collect()
    }

    fn courses_for_program(&self, program_id: &str) -> Vec<&Course> {
        pick(&self.records.courses, self.courses_by_program.get(program_id))
    }

    fn student(&self, id: &str) -> Option<&Student> {
        self.student_by_id.get(id).map(|&p| &self.records.students[p])
    }

    fn outcomes_for_course(&self, course_id: &str) -> Vec<&CourseOutcome> {
        pick(
            &self.records.course_outcomes,
            self.outcomes_by_course.get(course_id),
        )
    }

    fn program_outcome(&self, id: &str) -> Option<&ProgramOutcome> {
        self.po_by_id
            .get(id)
            .map(|&p| &self.records.program_outcomes[p])
    }

    fn program_outcomes(&self) -> Vec<&ProgramOutcome> {
        self.records.program_outcomes.iter().collect()
    }

    fn links_for_co(&self, co_id: &str) -> Vec<&CoPoLink> {
        pick(&self.records.co_po_links, self.links_by_co.get(co_id))
    }

    fn exam(&self, id: &str) -> Option<&Exam> {
        self.exam_by_id.get(id).map(|&p| &self.records.exams[p])
    }

    fn exams_for_course(&self, course_id: &str) -> Vec<&Exam> {
        pick(&self.records.exams, self.exams_by_course.get(course_id))
    }

    fn question(&self, id: &str) -> Option<&Question> {
        self.question_by_id
            .get(id)
            .map(|&p| &self.records.questions[p])
    }

    fn questions_for_exam(&self, exam_id: &str) -> Vec<&Question> {
        pick(&self.records.questions, self.questions_by_exam.get(exam_id))
    }

    fn mark(&self, student_id: &str, question_id: &str) -> Option<&StudentMark> {
        self.marks_by_pair
            .get(student_id)
            .and_then(|questions| questions.get(question_id))
            .map(|&p| &self.records.marks[p])
    }

    fn marks_for_question(&self, question_id: &str) -> Vec<&StudentMark> {
        pick(&self.records.marks, self.marks_by_question.get(question_id))
    }

    fn marks_for_student(&self, student_id: &str) -> Vec<&StudentMark> {
        pick(&self.records.marks, self.marks_by_student.get(student_id))
    }
}

/// An entity store held entirely in memory.
pub struct MemoryStore {
    current: RwLock<Arc<Dataset>>,
}

impl MemoryStore {
    pub fn new(records: Records) -> Self {
        Self {
            current: RwLock::new(Arc::new(Dataset::new(records))),
        }
    }

    /// Replace the whole dataset.
    pub async fn replace(&self, records: Records) {
        let dataset = Arc::new(Dataset::new(records));
        *self.current.write().await = dataset;
        tracing::debug!("memory store replaced");
    }

    /// Record or update a student's mark on a question.
    pub async fn record_mark(&self, mark: StudentMark) {
        tracing::debug!(
            student = %mark.student_id,
            question = %mark.question_id,
            obtained = mark.obtained_marks,
            "recording mark"
        );
        self.write(|records| records.marks.push(mark)).await;
    }

    /// Link a CO to a PO, or update the weight of an existing link.
    pub async fn link_outcomes(&self, link: CoPoLink) {
        tracing::debug!(co = %link.co_id, po = %link.po_id, weight = link.weight, "linking outcomes");
        self.write(|records| records.co_po_links.push(link)).await;
    }

    async fn write(&self, apply: impl FnOnce(&mut Records)) {
        let mut guard = self.current.write().await;
        let mut records = guard.records().clone();
        apply(&mut records);
        *guard = Arc::new(Dataset::new(records));
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn snapshot(&self) -> anyhow::Result<Arc<dyn StoreSnapshot>> {
        let dataset: Arc<Dataset> = Arc::clone(&*self.current.read().await);
        Ok(dataset)
    }
}
