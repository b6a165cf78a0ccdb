//! Static registration table mapping canonical lowercase family names to
//! driver factories. Adding a new family means one `register` call in
//! [`DriverRegistry::builtin`]; nothing else in the crate enumerates
//! drivers.

use crate::host::Host;
use crate::managers::traits::Driver;
use crate::managers::{apk, apt, pacman, pkg, pkg_info, portage, rpm};

/// Factory constructing a driver bound to the given host for one
/// selection pass. Driver instances are never reused across passes.
pub type DriverFactory = Box<dyn for<'h> Fn(&'h dyn Host) -> Box<dyn Driver + 'h> + Send + Sync>;

pub struct DriverRegistry {
    entries: Vec<(&'static str, DriverFactory)>,
}

impl DriverRegistry {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// All known package manager families, in registry order. "auto"
    /// expands to this list.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("rpm", Box::new(rpm::construct));
        registry.register("apt", Box::new(apt::construct));
        registry.register("pacman", Box::new(pacman::construct));
        registry.register("pkg", Box::new(pkg::construct));
        registry.register("portage", Box::new(portage::construct));
        registry.register("apk", Box::new(apk::construct));
        registry.register("pkg_info", Box::new(pkg_info::construct));
        registry
    }

    pub fn register(&mut self, name: &'static str, factory: DriverFactory) {
        self.entries.push((name, factory));
    }

    /// Family names in registry order.
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(name, _)| *name).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| *n == name)
    }

    /// Construct a fresh driver instance for the named family.
    pub fn construct<'h>(&self, name: &str, host: &'h dyn Host) -> Option<Box<dyn Driver + 'h>> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, factory)| factory(host))
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Every concrete package manager family keyed by canonical lowercase
/// name.
pub fn get_all_pkg_managers() -> DriverRegistry {
    DriverRegistry::builtin()
}
