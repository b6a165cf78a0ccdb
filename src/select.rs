//! Driver selection and dispatch.
//!
//! [`for_each_pkg_mgr`] is the one control flow every front-end goes
//! through: expand the requested manager list, probe each candidate in
//! order, hand the available ones to a callback, and downgrade
//! per-driver failures to warnings. Only two conditions are fatal:
//! an explicitly requested name the registry does not know, and a pass
//! that ends with zero usable drivers.

use std::collections::HashSet;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{PkgFactsError, Result};
use crate::host::Host;
use crate::managers::registry::DriverRegistry;
use crate::managers::traits::Driver;

/// How many available drivers actually run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Stop after the first driver that was successfully queried.
    #[default]
    First,
    /// Query every available driver.
    All,
}

/// Which managers the caller asked for, before expansion.
#[derive(Debug, Clone)]
pub struct SelectionRequest {
    /// Ordered manager names, case-insensitive. `"auto"` expands to the
    /// full registry.
    pub managers: Vec<String>,
    pub strategy: Strategy,
}

impl Default for SelectionRequest {
    fn default() -> Self {
        Self {
            managers: vec!["auto".to_string()],
            strategy: Strategy::First,
        }
    }
}

/// What one dispatch pass actually did.
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Drivers successfully queried, in encounter order.
    pub used: Vec<String>,
}

/// Expand the request into the candidate list: explicit entries first
/// in the order given, then (when `"auto"` appears anywhere) every
/// registry member not already listed, in registry order.
fn expand_managers(registry: &DriverRegistry, requested: &[String]) -> Vec<String> {
    let mut expanded: Vec<String> = requested
        .iter()
        .map(|m| m.to_lowercase())
        .filter(|m| m != "auto")
        .collect();
    if requested.iter().any(|m| m.eq_ignore_ascii_case("auto")) {
        for name in registry.names() {
            if !expanded.iter().any(|m| m == name) {
                expanded.push(name.to_string());
            }
        }
    }
    expanded
}

/// Run `visit` against every package manager the selection strategy
/// settles on.
///
/// `pkg_mgr` must be `None`: the wrapper owns driver construction, and
/// passing a pre-bound driver means it is being wrapped twice. The
/// callback reports failure through its `Result`; it never terminates
/// the invocation itself.
pub fn for_each_pkg_mgr(
    host: &dyn Host,
    registry: &DriverRegistry,
    request: &SelectionRequest,
    pkg_mgr: Option<&dyn Driver>,
    mut visit: impl FnMut(&dyn Driver) -> Result<()>,
) -> Result<DispatchReport> {
    if pkg_mgr.is_some() {
        return Err(PkgFactsError::Config(
            "for_each_pkg_mgr constructs its own drivers; do not pass `pkg_mgr`".to_string(),
        ));
    }

    let requested_auto = request
        .managers
        .iter()
        .any(|m| m.eq_ignore_ascii_case("auto"));
    let explicit: HashSet<String> = request
        .managers
        .iter()
        .map(|m| m.to_lowercase())
        .filter(|m| m != "auto")
        .collect();

    let candidates = expand_managers(registry, &request.managers);

    // Purely explicit requests with unknown names are a configuration
    // error; after auto-expansion unknown names cannot occur.
    let unknown: Vec<&str> = candidates
        .iter()
        .filter(|name| !registry.contains(name))
        .map(String::as_str)
        .collect();
    if !unknown.is_empty() {
        return Err(PkgFactsError::Config(format!(
            "unsupported manager(s) requested: {}",
            unknown.join(", ")
        )));
    }
    if candidates.is_empty() && !requested_auto {
        return Err(PkgFactsError::Config(
            "no package manager requested".to_string(),
        ));
    }

    let mut seen: HashSet<&str> = HashSet::new();
    let mut report = DispatchReport::default();
    for name in &candidates {
        if !seen.insert(name.as_str()) {
            continue;
        }

        let Some(driver) = registry.construct(name, host) else {
            continue;
        };
        if !driver.is_available() {
            if explicit.contains(name) {
                host.warn(&format!(
                    "Requested package manager {name} was not usable on this system"
                ));
            }
            continue;
        }

        if let Err(e) = visit(driver.as_ref()) {
            host.warn(&format!("Failed to retrieve packages with {name}: {e}"));
            continue;
        }

        report.used.push(name.clone());
        if request.strategy == Strategy::First {
            break;
        }
    }

    if report.used.is_empty() {
        return Err(PkgFactsError::NoUsableManager {
            attempted: candidates,
        });
    }
    Ok(report)
}
