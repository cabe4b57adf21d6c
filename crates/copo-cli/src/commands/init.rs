//! The `copo init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<usize> {
    if Path::new("copo.toml").exists() {
        println!("copo.toml already exists, skipping.");
    } else {
        std::fs::write("copo.toml", SAMPLE_CONFIG)?;
        println!("Created copo.toml");
    }

    std::fs::create_dir_all("datasets")?;
    let sample_path = Path::new("datasets/sample.toml");
    if sample_path.exists() {
        println!("datasets/sample.toml already exists, skipping.");
    } else {
        std::fs::write(sample_path, SAMPLE_DATASET)?;
        println!("Created datasets/sample.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: copo validate");
    println!("  2. Run: copo class --course ds");
    println!("  3. Run: copo po --program btech");

    Ok(0)
}

const SAMPLE_CONFIG: &str = r#"# copo configuration

# Dataset file or directory of .toml/.json files
dataset = "datasets/sample.toml"

# Output format: table or json
format = "table"

# Exit with status 2 when a computation skips faulty records
fail_on_fault = false
"#;

const SAMPLE_DATASET: &str = r#"[[programs]]
id = "btech"
name = "B.Tech Computer Science"

[[courses]]
id = "ds"
name = "Data Structures"
semester = 3
program_id = "btech"

[[students]]
id = "s1"
name = "Asha Rao"
email = "asha@univ.edu"
roll_number = "CS-001"

[[students]]
id = "s2"
name = "Bilal Khan"
email = "bilal@univ.edu"
roll_number = "CS-002"

[[course_outcomes]]
id = "ds-co1"
course_id = "ds"
co_code = "CO1"
description = "Implement linear data structures"

[[course_outcomes]]
id = "ds-co2"
course_id = "ds"
co_code = "CO2"
description = "Analyse tree operations"

[[program_outcomes]]
id = "po1"
po_code = "PO1"
description = "Engineering knowledge"

[[program_outcomes]]
id = "po2"
po_code = "PO2"
description = "Problem analysis"

[[co_po_links]]
co_id = "ds-co1"
po_id = "po1"
weight = 3

[[co_po_links]]
co_id = "ds-co2"
po_id = "po2"
weight = 2

[[exams]]
id = "ds-mid"
course_id = "ds"
exam_type = "Internal"
exam_date = "2024-02-12"

[[questions]]
id = "ds-mid-q1"
exam_id = "ds-mid"
text = "Implement a stack"
max_marks = 10
co_id = "ds-co1"

[[questions]]
id = "ds-mid-q2"
exam_id = "ds-mid"
text = "Balance an AVL tree"
max_marks = 10
co_id = "ds-co2"

[[marks]]
student_id = "s1"
question_id = "ds-mid-q1"
obtained_marks = 8

[[marks]]
student_id = "s1"
question_id = "ds-mid-q2"
obtained_marks = 6

[[marks]]
student_id = "s2"
question_id = "ds-mid-q1"
obtained_marks = 9
"#;
