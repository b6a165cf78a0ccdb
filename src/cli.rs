//! Command-line surface and dispatcher.

use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::json;

use crate::error::Result;
use crate::facts::{ListParams, SearchParams, installed_packages, search_package_db};
use crate::host::SystemHost;
use crate::managers::get_all_pkg_managers;
use crate::record::PackageRecord;
use crate::select::Strategy;
use crate::ui;

#[derive(Parser, Debug)]
#[command(
    name = "pkgfacts",
    about = "Enumerate and search packages across system package managers",
    long_about = "A uniform front-end over heterogeneous package managers (rpm, apt, \
                  pacman, pkg, portage, apk, pkg_info): detect what is usable on this \
                  system, list installed packages, and search local package databases \
                  by name substring.",
    version,
    term_width = 80
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search local package databases for name substrings
    Search {
        /// Substrings to match against package names
        #[arg(required = true, value_name = "TERM")]
        search_terms: Vec<String>,

        /// Package manager(s) to query, in order ("auto" expands to all)
        #[arg(short = 'm', long = "manager", value_name = "NAME")]
        manager: Vec<String>,

        /// How many available managers to query
        #[arg(long, value_enum, default_value = "first")]
        strategy: Strategy,

        /// Emit JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// List installed packages
    List {
        /// Package manager(s) to query, in order ("auto" expands to all)
        #[arg(short = 'm', long = "manager", value_name = "NAME")]
        manager: Vec<String>,

        /// How many available managers to query
        #[arg(long, value_enum, default_value = "first")]
        strategy: Strategy,

        /// Emit JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Show known package manager families and their availability
    Managers {
        /// Emit JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },
}

/// Dispatch the parsed CLI command to the appropriate handler.
pub fn dispatch(args: &Cli) -> Result<()> {
    let host = SystemHost::new();

    match &args.command {
        Command::Search {
            search_terms,
            manager,
            strategy,
            json,
        } => {
            let params = SearchParams {
                search_terms: search_terms.clone(),
                manager: effective_managers(manager),
                strategy: *strategy,
            };
            let results = search_package_db(&host, &params)?;

            if *json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "package_search_results": results
                    }))?
                );
            } else {
                for (term, records) in &results {
                    ui::header(&format!("Results for \"{term}\""));
                    if records.is_empty() {
                        ui::info("no matches");
                        continue;
                    }
                    for record in records {
                        print_record(record);
                    }
                }
            }
            Ok(())
        }

        Command::List {
            manager,
            strategy,
            json,
        } => {
            let params = ListParams {
                manager: effective_managers(manager),
                strategy: *strategy,
            };
            let installed = installed_packages(&host, &params)?;

            if *json {
                println!("{}", serde_json::to_string_pretty(&installed)?);
            } else {
                for record in installed.values().flatten() {
                    print_record(record);
                }
                ui::success(&format!(
                    "{} installed packages ({} names)",
                    installed.values().map(Vec::len).sum::<usize>(),
                    installed.len()
                ));
            }
            Ok(())
        }

        Command::Managers { json } => {
            let registry = get_all_pkg_managers();
            let mut rows = Vec::new();
            for name in registry.names() {
                let available = registry
                    .construct(name, &host)
                    .is_some_and(|driver| driver.is_available());
                rows.push((name, available));
            }

            if *json {
                let payload: Vec<_> = rows
                    .iter()
                    .map(|(name, available)| json!({ "name": name, "available": available }))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                for (name, available) in rows {
                    let status = if available {
                        "available".green()
                    } else {
                        "not available".dimmed()
                    };
                    println!("{} {}", format!("{name:>9}").bold(), status);
                }
            }
            Ok(())
        }
    }
}

fn effective_managers(manager: &[String]) -> Vec<String> {
    if manager.is_empty() {
        vec!["auto".to_string()]
    } else {
        manager.to_vec()
    }
}

fn print_record(record: &PackageRecord) {
    let source = record.source.as_deref().unwrap_or("unknown");
    println!(
        "  {} {} {}",
        record.name.bold(),
        record.version,
        format!("({source})").dimmed()
    );
}
