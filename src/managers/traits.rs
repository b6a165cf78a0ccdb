use std::collections::BTreeMap;

use crate::error::Result;
use crate::record::{PackageMap, PackageRecord, SearchMap};

/// The four primitive operations every package-manager family supplies.
///
/// `Raw` is the driver-specific unparsed representation of one package
/// instance (a line, a multi-line block, or a binding object); it is
/// only interpretable by the same driver's `get_package_details`.
pub trait PkgMgr {
    type Raw;

    /// Canonical lowercase family name.
    fn name(&self) -> &'static str;

    /// Whether this driver can run in the current process. Must not
    /// error; probe failures are swallowed and reported as unavailable.
    fn is_available(&self) -> bool;

    /// All installed packages as raw records.
    fn list_installed(&self) -> Result<Vec<Self::Raw>>;

    /// Parse one raw record into the canonical shape. Best-effort: a
    /// field that fails to parse is omitted or defaulted, never an
    /// error. `name` and `version` are always set (possibly degraded).
    fn get_package_details(&self, raw: &Self::Raw) -> PackageRecord;

    /// Raw records from the local repository index whose names match the
    /// given substring. Same raw shape as `list_installed` so both flow
    /// through the same detail parser. Families with no local index
    /// yield nothing.
    fn search_pkg_substr(&self, substr: &str) -> Result<Vec<Self::Raw>>;
}

/// Object-safe view of a driver, blanket-implemented for every
/// [`PkgMgr`] so the registry can hand out trait objects while the
/// aggregation logic stays in the free functions below.
pub trait Driver {
    fn name(&self) -> &'static str;
    fn is_available(&self) -> bool;
    fn get_packages(&self) -> Result<PackageMap>;
    fn search_packages(&self, terms: &[String]) -> Result<SearchMap>;
}

impl<M: PkgMgr> Driver for M {
    fn name(&self) -> &'static str {
        PkgMgr::name(self)
    }

    fn is_available(&self) -> bool {
        PkgMgr::is_available(self)
    }

    fn get_packages(&self) -> Result<PackageMap> {
        get_packages(self)
    }

    fn search_packages(&self, terms: &[String]) -> Result<SearchMap> {
        search_packages(self, terms)
    }
}

/// Enumerate installed packages into a name-keyed map. The same name
/// collects multiple entries when several versions or arches coexist.
pub fn get_packages<M: PkgMgr + ?Sized>(mgr: &M) -> Result<PackageMap> {
    let mut installed: PackageMap = BTreeMap::new();
    for raw in mgr.list_installed()? {
        let mut details = mgr.get_package_details(&raw);
        if details.source.is_none() {
            details.source = Some(mgr.name().to_string());
        }
        installed
            .entry(details.name.clone())
            .or_default()
            .push(details);
    }
    Ok(installed)
}

/// Search the local repository index for each term (duplicates removed)
/// and map the term to its matching records.
///
/// Some package managers return "matches" whose names do not actually
/// contain the term (apk returns "john" when searching for "ansible"),
/// so anything whose parsed name lacks the term as a substring is
/// pruned. A term with no matches maps to an empty list.
pub fn search_packages<M: PkgMgr + ?Sized>(mgr: &M, terms: &[String]) -> Result<SearchMap> {
    let mut results: SearchMap = BTreeMap::new();
    for term in terms {
        if results.contains_key(term) {
            continue;
        }
        let mut matches = Vec::new();
        for raw in mgr.search_pkg_substr(term)? {
            let mut details = mgr.get_package_details(&raw);
            if details.source.is_none() {
                details.source = Some(mgr.name().to_string());
            }
            if details.name.contains(term.as_str()) {
                matches.push(details);
            }
        }
        results.insert(term.clone(), matches);
    }
    Ok(results)
}
