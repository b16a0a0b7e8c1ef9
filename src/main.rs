//! # qms-report CLI
//!
//! Usage:
//!   qms-report job.json -o report.pdf
//!   cat job.json | qms-report --date 2026-03-09
//!   qms-report --example > job.json
//!
//! Log output goes to stderr, filtered by `RUST_LOG` (default `warn`):
//!   RUST_LOG=qms_report=debug qms-report job.json

use std::ffi::OsString;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use qms_report::{export_job, ReportError, ReportJob};

#[derive(Debug, Parser)]
#[command(name = "qms-report", version)]
#[command(about = "Render quality-management report jobs to PDF")]
struct Cli {
    /// Job file: { "reportType", "rows", "options" }. Reads stdin when omitted.
    #[arg(value_name = "JOB")]
    input: Option<PathBuf>,
    /// Output path. Defaults to the generated file name in the current directory.
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
    /// Export date, used in the file name and metadata box.
    #[arg(long, value_name = "YYYY-MM-DD")]
    date: Option<NaiveDate>,
    /// Print the PDF as base64 on stdout instead of writing a file.
    #[arg(long, conflicts_with = "output")]
    base64: bool,
    /// Print a sample job and exit.
    #[arg(long)]
    example: bool,
}

fn main() {
    init_logging();
    if let Err(error) = run(std::env::args_os()) {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // stdout carries --base64 and --example output.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .without_time(),
        )
        .try_init();
}

fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    if cli.example {
        print!("{}", example_job_json());
        return Ok(());
    }

    let input = match &cli.input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };

    let job: ReportJob = serde_json::from_str(&input).map_err(ReportError::from)?;
    let now = chrono::Local::now().naive_local();
    let generated_at = match cli.date {
        Some(date) => date.and_time(now.time()),
        None => now,
    };
    let artifact = export_job(&job, generated_at)?;

    if cli.base64 {
        println!("{}", artifact.to_base64());
        return Ok(());
    }

    let path = cli
        .output
        .unwrap_or_else(|| PathBuf::from(&artifact.file_name));
    fs::write(&path, &artifact.bytes)
        .with_context(|| format!("failed to write {}", path.display()))?;
    eprintln!(
        "Written {} bytes ({} pages) to {}",
        artifact.bytes.len(),
        artifact.pages,
        path.display()
    );
    Ok(())
}

fn example_job_json() -> &'static str {
    r##"{
  "reportType": "Full Non-Conformance Report",
  "options": {
    "companyName": "Acme Manufacturing",
    "brandColor": "#1F4E79",
    "margin": 15
  },
  "rows": [
    {
      "id": 101,
      "code": "NC-2026-014",
      "title": "Torque wrench used past calibration date",
      "department": "Assembly",
      "iso_requirement": "7.1.5",
      "status": "Open",
      "responsible": "M. Silva",
      "occurrence_date": "03/02/2026",
      "description": "Wrench TW-07 was used on line 2 eleven days after its calibration expired. Affected lots 2231 to 2236.",
      "immediate_actions": "Tool quarantined; lots placed on hold pending re-torque check.",
      "root_cause": "Calibration due dates tracked in a spreadsheet nobody owns after the 2025 reorganisation.",
      "corrective_action": "Move instrument recall into the maintenance system with automatic lock-out."
    },
    {
      "id": 102,
      "code": "NC-2026-015",
      "title": "Supplier certificate of conformity missing",
      "department": "Purchasing",
      "iso_requirement": "8.4.2",
      "status": "In Progress",
      "responsible": "J. Costa",
      "occurrence_date": "05/02/2026",
      "description": "Incoming batch of fasteners received without CoC.",
      "immediate_actions": null,
      "root_cause": null,
      "corrective_action": null
    }
  ]
}
"##
}
