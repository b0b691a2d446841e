//! DataMerge Runtime
//!
//! Command-line entry point. One run:
//! - Loads a document and finds the nodes to copy
//! - Reads records from a file or a Google Sheets tab
//! - Makes one edited copy of every root per record
//! - Writes the document back and reports per-edit failures
//!
//! Run with: cargo run -p datamerge_runtime -- --document cards.json --records rows.csv
//!       or: cargo run --bin datamerge -- --help

mod boot_config;
mod job;

use boot_config::{BootConfig, USAGE};
use std::process::ExitCode;

fn main() -> ExitCode {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match BootConfig::load() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("{}", USAGE);
            return ExitCode::FAILURE;
        }
    };
    if config.help {
        println!("{}", USAGE);
        return ExitCode::SUCCESS;
    }
    config.print_summary();

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            log::error!("Failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(job::run(&config)) {
        Ok(outcome) => {
            if !outcome.is_clean() {
                log::warn!("{} updates could not be applied", outcome.failures.len());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Merge failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
