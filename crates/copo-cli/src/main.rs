//! copo CLI, the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod config;

use commands::Session;
use config::OutputFormat;

#[derive(Parser)]
#[command(name = "copo", version, about = "CO-PO attainment calculator")]
struct Cli {
    /// Dataset file or directory (overrides the config file)
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,

    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// CO attainment of one student in one course
    Student {
        /// Student id
        #[arg(long)]
        student: String,

        /// Course id
        #[arg(long)]
        course: String,
    },

    /// Class-wide CO attainment of a course
    Class {
        /// Course id
        #[arg(long)]
        course: String,
    },

    /// PO attainment for a course or a whole program
    Po {
        /// Course id
        #[arg(long, conflicts_with = "program", required_unless_present = "program")]
        course: Option<String>,

        /// Program id
        #[arg(long)]
        program: Option<String>,
    },

    /// Student performance report as JSON
    Report {
        /// Student id
        #[arg(long)]
        student: String,

        /// Restrict the report to one course
        #[arg(long)]
        course: Option<String>,

        /// Write the report to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Parse and validate the dataset
    Validate,

    /// Create a starter config and sample dataset
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("copo=info")),
        )
        .init();

    let cli = Cli::parse();

    let session = match config::load_config_from(cli.config.as_deref()) {
        Ok(config) => Session::new(config, cli.dataset, cli.format),
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Student { student, course } => {
            commands::student::execute(&session, student, course).await
        }
        Commands::Class { course } => commands::class::execute(&session, course).await,
        Commands::Po { course, program } => commands::po::execute(&session, course, program).await,
        Commands::Report {
            student,
            course,
            output,
        } => commands::report::execute(&session, student, course, output).await,
        Commands::Validate => commands::validate::execute(&session),
        Commands::Init => commands::init::execute(),
    };

    match result {
        Ok(faults) if faults > 0 && session.config.fail_on_fault => {
            eprintln!("Error: {faults} integrity fault(s) reported");
            process::exit(2);
        }
        Ok(_) => {}
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    }
}
