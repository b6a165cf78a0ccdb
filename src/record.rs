use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Canonical normalized description of one package version.
///
/// `name` and `version` are always present for any record handed to a
/// caller; when a backend could not parse them they degrade to a
/// best-effort name and an empty version rather than being absent.
/// Everything else varies per package manager family and is skipped in
/// serialized output when unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    pub name: String,
    pub version: String,

    /// Which package manager family the record came from. Defaulted to
    /// the driver name by the query engine when a backend leaves it out.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epoch: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provides: Option<Vec<String>>,

    // FreeBSD pkg
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub automatic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vital: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_epoch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,

    // Portage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ebuild_revision: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slots: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefixes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffixes: Option<String>,
}

/// Installed packages keyed by name; a name maps to every installed
/// version/arch variant of that package.
pub type PackageMap = BTreeMap<String, Vec<PackageRecord>>;

/// Search results keyed by the requested search term. A term with no
/// matches maps to an empty list, never an absent key.
pub type SearchMap = BTreeMap<String, Vec<PackageRecord>>;
