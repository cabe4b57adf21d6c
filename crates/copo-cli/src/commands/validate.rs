//! The `copo validate` command.

use anyhow::Result;

use copo_core::parser;

use super::Session;

pub fn execute(session: &Session) -> Result<usize> {
    let path = session.dataset_path()?;
    let records = parser::load_dataset(path)?;

    println!(
        "Dataset: {} ({} courses, {} outcomes, {} questions, {} marks)",
        path.display(),
        records.courses.len(),
        records.course_outcomes.len(),
        records.questions.len(),
        records.marks.len()
    );

    let warnings = parser::validate_records(&records);
    for w in &warnings {
        let prefix = w
            .record
            .as_ref()
            .map(|id| format!("  [{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Dataset valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(0)
}
