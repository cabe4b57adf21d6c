//! Dataset file parser.
//!
//! Loads entity records from TOML or JSON files and directories, and
//! validates them.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::store::Records;

/// Parse a single dataset file into `Records`.
pub fn parse_records(path: &Path) -> Result<Records> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read dataset file: {}", path.display()))?;

    parse_records_str(&content, path)
}

/// Parse dataset content. The format is chosen by the extension of
/// `source_path`: `.json` is JSON, anything else is TOML.
pub fn parse_records_str(content: &str, source_path: &Path) -> Result<Records> {
    let is_json = source_path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(content)
            .with_context(|| format!("failed to parse JSON: {}", source_path.display()))
    } else {
        toml::from_str(content)
            .with_context(|| format!("failed to parse TOML: {}", source_path.display()))
    }
}

fn is_dataset_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == "toml" || ext == "json")
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, files)?;
        } else if is_dataset_file(&path) {
            files.push(path);
        }
    }
    Ok(())
}

/// Recursively load every `.toml` and `.json` file of a directory and merge
/// them in path order. Files that fail to parse are skipped with a warning.
pub fn load_dataset_dir(dir: &Path) -> Result<Records> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut files = Vec::new();
    collect_files(dir, &mut files)?;
    files.sort();

    let mut merged = Records::default();
    for path in &files {
        match parse_records(path) {
            Ok(records) => merged.merge(records),
            Err(e) => {
                tracing::warn!("skipping {}: {:#}", path.display(), e);
            }
        }
    }

    Ok(merged)
}

/// Load a dataset from a file or a directory.
pub fn load_dataset(path: &Path) -> Result<Records> {
    if path.is_dir() {
        load_dataset_dir(path)
    } else {
        parse_records(path)
    }
}

/// A warning from dataset validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationWarning {
    /// Id of the offending record, when it has one.
    pub record: Option<String>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn on(record: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            record: Some(record.into()),
            message: message.into(),
        }
    }
}

fn duplicate_ids<'a>(
    kind: &str,
    ids: impl Iterator<Item = &'a str>,
    warnings: &mut Vec<ValidationWarning>,
) -> HashSet<&'a str> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            warnings.push(ValidationWarning::on(id, format!("duplicate {kind} id: {id}")));
        }
    }
    seen
}

/// Validate a dataset for common issues. Never rejects a dataset.
pub fn validate_records(records: &Records) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let programs = duplicate_ids(
        "program",
        records.programs.iter().map(|p| p.id.as_str()),
        &mut warnings,
    );
    let courses = duplicate_ids(
        "course",
        records.courses.iter().map(|c| c.id.as_str()),
        &mut warnings,
    );
    let students = duplicate_ids(
        "student",
        records.students.iter().map(|s| s.id.as_str()),
        &mut warnings,
    );
    let cos = duplicate_ids(
        "course outcome",
        records.course_outcomes.iter().map(|co| co.id.as_str()),
        &mut warnings,
    );
    let pos = duplicate_ids(
        "program outcome",
        records.program_outcomes.iter().map(|po| po.id.as_str()),
        &mut warnings,
    );
    let exams = duplicate_ids(
        "exam",
        records.exams.iter().map(|e| e.id.as_str()),
        &mut warnings,
    );
    let questions = duplicate_ids(
        "question",
        records.questions.iter().map(|q| q.id.as_str()),
        &mut warnings,
    );

    // Courses
    for course in &records.courses {
        if course.semester == 0 {
            warnings.push(ValidationWarning::on(&course.id, "semester must be positive"));
        }
        if !programs.contains(course.program_id.as_str()) {
            warnings.push(ValidationWarning::on(
                &course.id,
                format!("unknown program: {}", course.program_id),
            ));
        }
    }

    // Course outcomes: code unique within a course
    let mut co_codes = HashSet::new();
    let mut co_course: HashMap<&str, &str> = HashMap::new();
    for co in &records.course_outcomes {
        co_course.entry(co.id.as_str()).or_insert(co.course_id.as_str());
        if !courses.contains(co.course_id.as_str()) {
            warnings.push(ValidationWarning::on(
                &co.id,
                format!("unknown course: {}", co.course_id),
            ));
        }
        if !co_codes.insert((co.course_id.as_str(), co.co_code.as_str())) {
            warnings.push(ValidationWarning::on(
                &co.id,
                format!("duplicate CO code {} in course {}", co.co_code, co.course_id),
            ));
        }
    }

    // Program outcomes: code unique within a program
    let mut po_codes = HashSet::new();
    for po in &records.program_outcomes {
        if !po_codes.insert((po.program_id.as_deref(), po.po_code.as_str())) {
            warnings.push(ValidationWarning::on(
                &po.id,
                format!("duplicate PO code: {}", po.po_code),
            ));
        }
    }

    // CO-PO links
    let mut link_pairs = HashSet::new();
    for link in &records.co_po_links {
        let pair = format!("{}->{}", link.co_id, link.po_id);
        if !cos.contains(link.co_id.as_str()) {
            warnings.push(ValidationWarning::on(
                &pair,
                format!("unknown course outcome: {}", link.co_id),
            ));
        }
        if !pos.contains(link.po_id.as_str()) {
            warnings.push(ValidationWarning::on(
                &pair,
                format!("unknown program outcome: {}", link.po_id),
            ));
        }
        if link.weight <= 0.0 || link.weight.is_nan() {
            warnings.push(ValidationWarning::on(
                &pair,
                format!("weight {} is not positive", link.weight),
            ));
        }
        if !link_pairs.insert((link.co_id.as_str(), link.po_id.as_str())) {
            warnings.push(ValidationWarning::on(
                &pair,
                "duplicate CO-PO link, the later weight is used",
            ));
        }
    }

    // Exams
    let mut exam_course: HashMap<&str, &str> = HashMap::new();
    for exam in &records.exams {
        exam_course
            .entry(exam.id.as_str())
            .or_insert(exam.course_id.as_str());
        if !courses.contains(exam.course_id.as_str()) {
            warnings.push(ValidationWarning::on(
                &exam.id,
                format!("unknown course: {}", exam.course_id),
            ));
        }
    }

    // Questions
    let mut max_marks: HashMap<&str, f64> = HashMap::new();
    for question in &records.questions {
        max_marks
            .entry(question.id.as_str())
            .or_insert(question.max_marks);
        if question.max_marks <= 0.0 || question.max_marks.is_nan() {
            warnings.push(ValidationWarning::on(
                &question.id,
                format!("max_marks {} is not positive", question.max_marks),
            ));
        }
        if !exams.contains(question.exam_id.as_str()) {
            warnings.push(ValidationWarning::on(
                &question.id,
                format!("unknown exam: {}", question.exam_id),
            ));
        }
        match co_course.get(question.co_id.as_str()) {
            None => warnings.push(ValidationWarning::on(
                &question.id,
                format!("unknown course outcome: {}", question.co_id),
            )),
            Some(co_course_id) => {
                if let Some(exam_course_id) = exam_course.get(question.exam_id.as_str()) {
                    if exam_course_id != co_course_id {
                        warnings.push(ValidationWarning::on(
                            &question.id,
                            format!(
                                "course outcome {} belongs to course {}, but exam {} belongs to course {}",
                                question.co_id, co_course_id, question.exam_id, exam_course_id
                            ),
                        ));
                    }
                }
            }
        }
    }

    // Marks
    let mut mark_pairs = HashSet::new();
    for mark in &records.marks {
        let record = mark.record_id();
        if !mark_pairs.insert((mark.student_id.as_str(), mark.question_id.as_str())) {
            warnings.push(ValidationWarning::on(
                &record,
                format!(
                    "supersedes an earlier mark of student {} on question {}",
                    mark.student_id, mark.question_id
                ),
            ));
        }
        if !students.contains(mark.student_id.as_str()) {
            warnings.push(ValidationWarning::on(
                &record,
                format!("unknown student: {}", mark.student_id),
            ));
        }
        if mark.obtained_marks < 0.0 || mark.obtained_marks.is_nan() {
            warnings.push(ValidationWarning::on(
                &record,
                format!("obtained marks {} are negative", mark.obtained_marks),
            ));
        }
        match max_marks.get(mark.question_id.as_str()) {
            None => {
                if !questions.contains(mark.question_id.as_str()) {
                    warnings.push(ValidationWarning::on(
                        &record,
                        format!("unknown question: {}", mark.question_id),
                    ));
                }
            }
            Some(&max) if mark.obtained_marks > max => {
                warnings.push(ValidationWarning::on(
                    &record,
                    format!("obtained marks {} exceed maximum {}", mark.obtained_marks, max),
                ));
            }
            Some(_) => {}
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExamType;

    const VALID_TOML: &str = r#"
[[programs]]
id = "p1"
name = "B.Tech CSE"

[[courses]]
id = "c1"
name = "Algorithms"
semester = 4
program_id = "p1"

[[students]]
id = "s1"
name = "Alice Smith"
email = "alice@student.edu"
roll_number = "CSE-01"

[[course_outcomes]]
id = "co1"
course_id = "c1"
co_code = "CO1"
description = "Analyse algorithm complexity"

[[program_outcomes]]
id = "po1"
po_code = "PO1"
description = "Engineering knowledge"

[[co_po_links]]
co_id = "co1"
po_id = "po1"

[[exams]]
id = "e1"
course_id = "c1"
exam_type = "Internal"
exam_date = "2024-03-01"

[[questions]]
id = "q1"
exam_id = "e1"
text = "Solve the recurrence"
max_marks = 10
co_id = "co1"

[[marks]]
student_id = "s1"
question_id = "q1"
obtained_marks = 7.5
"#;

    #[test]
    fn parse_valid_toml() {
        let records = parse_records_str(VALID_TOML, Path::new("dataset.toml")).unwrap();
        assert_eq!(records.courses.len(), 1);
        assert_eq!(records.courses[0].semester, 4);
        assert_eq!(records.co_po_links[0].weight, 1.0);
        assert_eq!(records.exams[0].exam_type, ExamType::Internal);
        assert_eq!(records.questions[0].max_marks, 10.0);
        assert_eq!(records.marks[0].obtained_marks, 7.5);
        assert!(validate_records(&records).is_empty());
    }

    #[test]
    fn parse_json_by_extension() {
        let json = r#"{
            "programs": [{"id": "p1", "name": "MBA"}],
            "courses": [{"id": "c1", "name": "Finance", "semester": 1, "program_id": "p1"}]
        }"#;
        let records = parse_records_str(json, Path::new("data.JSON")).unwrap();
        assert_eq!(records.programs[0].name, "MBA");
        assert!(records.marks.is_empty());
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        assert!(parse_records_str(bad, Path::new("bad.toml")).is_err());
    }

    #[test]
    fn empty_exam_type_is_rejected() {
        let toml = r#"
[[exams]]
id = "e1"
course_id = "c1"
exam_type = ""
exam_date = "2024-03-01"
"#;
        assert!(parse_records_str(toml, Path::new("x.toml")).is_err());
    }

    #[test]
    fn validate_flags_integrity_problems() {
        let mut records = parse_records_str(VALID_TOML, Path::new("dataset.toml")).unwrap();
        records.marks[0].obtained_marks = 12.0;
        records.co_po_links[0].weight = 0.0;
        records.co_po_links.push(records.co_po_links[0].clone());
        records.questions[0].co_id = "co9".into();
        records.courses[0].semester = 0;

        let warnings = validate_records(&records);
        let has = |needle: &str| warnings.iter().any(|w| w.message.contains(needle));
        assert!(has("exceed maximum"));
        assert!(has("weight 0 is not positive"));
        assert!(has("duplicate CO-PO link"));
        assert!(has("unknown course outcome: co9"));
        assert!(has("semester must be positive"));
    }

    #[test]
    fn validate_flags_duplicates_and_cross_course_questions() {
        let mut records = parse_records_str(VALID_TOML, Path::new("dataset.toml")).unwrap();
        let mut other = records.courses[0].clone();
        other.id = "c2".into();
        records.courses.push(other);
        let mut foreign = records.course_outcomes[0].clone();
        foreign.id = "co2".into();
        foreign.course_id = "c2".into();
        records.course_outcomes.push(foreign);
        let mut dup_code = records.course_outcomes[0].clone();
        dup_code.id = "co3".into();
        records.course_outcomes.push(dup_code);
        records.questions[0].co_id = "co2".into();
        records.marks.push(records.marks[0].clone());

        let warnings = validate_records(&records);
        let has = |needle: &str| warnings.iter().any(|w| w.message.contains(needle));
        assert!(has("duplicate CO code CO1 in course c1"));
        assert!(has("belongs to course c2, but exam e1 belongs to course c1"));
        assert!(has("supersedes an earlier mark"));
    }

    #[test]
    fn load_directory_merges_in_path_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.toml"), VALID_TOML).unwrap();
        std::fs::create_dir_all(dir.path().join("b")).unwrap();
        std::fs::write(
            dir.path().join("b").join("more.json"),
            r#"{"marks": [{"student_id": "s1", "question_id": "q1", "obtained_marks": 9}]}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("c.toml"), "not [valid").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let records = load_dataset(dir.path()).unwrap();
        assert_eq!(records.courses.len(), 1);
        assert_eq!(records.marks.len(), 2);
        assert_eq!(records.marks[1].obtained_marks, 9.0);
    }

    #[test]
    fn load_missing_file_fails() {
        assert!(load_dataset(Path::new("no/such/dataset.toml")).is_err());
    }
}
