//! The `copo po` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use copo_core::PoScope;

use super::{pct, print_json, report_faults, Session};
use crate::config::OutputFormat;

pub async fn execute(
    session: &Session,
    course_id: Option<String>,
    program_id: Option<String>,
) -> Result<usize> {
    let scope = match (course_id, program_id) {
        (Some(course), None) => PoScope::Course(course),
        (None, Some(program)) => PoScope::Program(program),
        _ => anyhow::bail!("exactly one of --course or --program is required"),
    };

    let engine = session.engine()?;
    let po = engine.po_attainment(&scope).await?;

    match session.format {
        OutputFormat::Json => print_json(&po)?,
        OutputFormat::Table => {
            println!("PO attainment for {scope}");
            if po.is_empty() {
                println!("No attainment data.");
            } else {
                let mut table = Table::new();
                table.set_header(vec!["PO", "Description", "Attainment", "Contributing COs"]);
                for outcome in &po.outcomes {
                    let contributors = outcome
                        .contributing_cos
                        .iter()
                        .map(|c| format!("{} x{} @ {}", c.co_code, c.weight, pct(c.co_attainment)))
                        .collect::<Vec<_>>()
                        .join(", ");
                    table.add_row(vec![
                        Cell::new(&outcome.po_code),
                        Cell::new(&outcome.description),
                        Cell::new(pct(outcome.attainment_percentage)),
                        Cell::new(contributors),
                    ]);
                }
                println!("{table}");
            }
            if !po.unmapped_cos.is_empty() {
                println!("Unmapped COs: {}", po.unmapped_cos.join(", "));
            }
        }
    }

    Ok(report_faults(&po.faults))
}
