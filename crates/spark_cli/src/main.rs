//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `spark_core` linkage and one save + lookup round trip.
//! - Keep output deterministic for quick local sanity checks.
//!
//! Usage: `spark_cli [db_path]` (in-memory database when omitted).

use spark_core::db::{open_db, open_db_in_memory};
use spark_core::{Model, SaveOptions, Section, SectionService};
use std::process::ExitCode;

const PROBE_HANDLE: &str = "spark-probe";

fn main() -> ExitCode {
    println!("spark_core ping={}", spark_core::ping());
    println!("spark_core version={}", spark_core::core_version());

    match run_probe(std::env::args().nth(1)) {
        Ok(summary) => {
            println!("{summary}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("spark_cli probe failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_probe(db_path: Option<String>) -> Result<String, Box<dyn std::error::Error>> {
    let conn = match db_path {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    let mut service = SectionService::for_connection(&conn)?;

    if service.find_by_string(PROBE_HANDLE)?.is_none() {
        let mut section = Section::new(PROBE_HANDLE, "Spark probe");
        if !service.save(&mut section, &SaveOptions::default())? {
            return Err(format!("probe section rejected: {:?}", section.errors()).into());
        }
        service.invalidate_string(PROBE_HANDLE);
    }

    let section = service.get_by_string(PROBE_HANDLE)?;
    Ok(format!(
        "probe section id={} uid={}",
        section.id().map_or_else(|| "none".to_string(), |id| id.to_string()),
        section
            .meta
            .uid
            .map_or_else(|| "none".to_string(), |uid| uid.to_string())
    ))
}
