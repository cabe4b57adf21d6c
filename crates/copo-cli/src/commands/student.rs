//! The `copo student` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use super::{pct, print_json, report_faults, Session};
use crate::config::OutputFormat;

pub async fn execute(session: &Session, student_id: String, course_id: String) -> Result<usize> {
    let engine = session.engine()?;
    let attainment = engine.student_attainment(&student_id, &course_id).await?;

    match session.format {
        OutputFormat::Json => print_json(&attainment)?,
        OutputFormat::Table => {
            println!("Student {student_id} in course {course_id}");
            if attainment.is_empty() {
                println!("No attainment data.");
            } else {
                let mut table = Table::new();
                table.set_header(vec!["CO", "Description", "Obtained", "Total", "Attainment"]);
                for co in &attainment.outcomes {
                    table.add_row(vec![
                        Cell::new(&co.co_code),
                        Cell::new(&co.description),
                        Cell::new(co.obtained_marks),
                        Cell::new(co.total_marks),
                        Cell::new(pct(co.attainment_percentage)),
                    ]);
                }
                println!("{table}");
            }
        }
    }

    Ok(report_faults(&attainment.faults))
}
