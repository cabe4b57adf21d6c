//! The `copo class` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use super::{pct, print_json, report_faults, Session};
use crate::config::OutputFormat;

pub async fn execute(session: &Session, course_id: String) -> Result<usize> {
    let engine = session.engine()?;
    let class = engine.class_attainment(&course_id).await?;

    match session.format {
        OutputFormat::Json => print_json(&class)?,
        OutputFormat::Table => {
            println!("Class attainment for course {course_id}");
            if class.is_empty() {
                println!("No attainment data.");
            } else {
                let mut summary = Table::new();
                summary.set_header(vec!["CO", "Description", "Class Average", "Students"]);
                let mut breakdown = Table::new();
                breakdown.set_header(vec!["CO", "Student", "Name", "Attainment"]);

                for co in &class.outcomes {
                    summary.add_row(vec![
                        Cell::new(&co.co_code),
                        Cell::new(&co.description),
                        Cell::new(pct(co.class_average)),
                        Cell::new(co.student_attainments.len()),
                    ]);
                    for score in &co.student_attainments {
                        breakdown.add_row(vec![
                            Cell::new(&co.co_code),
                            Cell::new(&score.student_id),
                            Cell::new(&score.student_name),
                            Cell::new(pct(score.attainment_percentage)),
                        ]);
                    }
                }

                println!("{summary}");
                println!("\n{breakdown}");
            }
        }
    }

    Ok(report_faults(&class.faults))
}
