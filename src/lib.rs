pub mod cli;
pub mod error;
pub mod facts;
pub mod host;
pub mod managers;
pub mod record;
pub mod select;
pub mod ui;

pub use error::{PkgFactsError, Result};
pub use record::{PackageMap, PackageRecord, SearchMap};

use clap::Parser;
use std::process::exit;

/// Run the pkgfacts CLI entrypoint.
pub fn run_cli() {
    let args = cli::Cli::parse();

    if let Err(e) = cli::dispatch(&args) {
        ui::error(&format!("{e}"));
        exit(1);
    }
}
