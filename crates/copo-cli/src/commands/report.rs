//! The `copo report` command.

use std::path::PathBuf;

use anyhow::Result;

use super::{print_json, report_faults, Session};

pub async fn execute(
    session: &Session,
    student_id: String,
    course_id: Option<String>,
    output: Option<PathBuf>,
) -> Result<usize> {
    let engine = session.engine()?;
    let report = engine
        .student_report(&student_id, course_id.as_deref())
        .await?;

    match output {
        Some(path) => {
            report.save_json(&path)?;
            println!("Report written to {}", path.display());
        }
        None => print_json(&report)?,
    }

    let faults: Vec<_> = report.faults().cloned().collect();
    Ok(report_faults(&faults))
}
