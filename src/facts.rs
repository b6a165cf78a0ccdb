//! Module entry points: the operations a front-end actually asks for,
//! composed from selection, dispatch, and the query engine.

use crate::error::Result;
use crate::host::Host;
use crate::managers::registry::DriverRegistry;
use crate::record::{PackageMap, SearchMap};
use crate::select::{SelectionRequest, Strategy, for_each_pkg_mgr};

/// Parameters for [`search_package_db`].
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub search_terms: Vec<String>,
    /// Requested managers, `"auto"` by default.
    pub manager: Vec<String>,
    pub strategy: Strategy,
}

impl SearchParams {
    pub fn new(search_terms: Vec<String>) -> Self {
        Self {
            search_terms,
            manager: vec!["auto".to_string()],
            strategy: Strategy::First,
        }
    }
}

/// Parameters for [`installed_packages`].
#[derive(Debug, Clone)]
pub struct ListParams {
    pub manager: Vec<String>,
    pub strategy: Strategy,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            manager: vec!["auto".to_string()],
            strategy: Strategy::First,
        }
    }
}

/// Search the local package database of every selected manager.
///
/// The result maps each search term to its matching records; with
/// strategy `all`, a later manager's results replace an earlier one's
/// for the same term. Empty `search_terms` selects and probes managers
/// but adds no results.
pub fn search_package_db(host: &dyn Host, params: &SearchParams) -> Result<SearchMap> {
    search_package_db_with(host, &DriverRegistry::builtin(), params)
}

/// [`search_package_db`] against a caller-supplied registry.
pub fn search_package_db_with(
    host: &dyn Host,
    registry: &DriverRegistry,
    params: &SearchParams,
) -> Result<SearchMap> {
    let request = SelectionRequest {
        managers: params.manager.clone(),
        strategy: params.strategy,
    };
    let mut results = SearchMap::new();
    for_each_pkg_mgr(host, registry, &request, None, |driver| {
        for (term, records) in driver.search_packages(&params.search_terms)? {
            results.insert(term, records);
        }
        Ok(())
    })?;
    Ok(results)
}

/// Enumerate installed packages across every selected manager, keyed by
/// package name. With strategy `all`, records from different managers
/// for the same name accumulate under one key.
pub fn installed_packages(host: &dyn Host, params: &ListParams) -> Result<PackageMap> {
    installed_packages_with(host, &DriverRegistry::builtin(), params)
}

/// [`installed_packages`] against a caller-supplied registry.
pub fn installed_packages_with(
    host: &dyn Host,
    registry: &DriverRegistry,
    params: &ListParams,
) -> Result<PackageMap> {
    let request = SelectionRequest {
        managers: params.manager.clone(),
        strategy: params.strategy,
    };
    let mut installed = PackageMap::new();
    for_each_pkg_mgr(host, registry, &request, None, |driver| {
        for (name, records) in driver.get_packages()? {
            installed.entry(name).or_default().extend(records);
        }
        Ok(())
    })?;
    Ok(installed)
}
