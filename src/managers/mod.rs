//! # Package Manager Drivers
//!
//! One driver per package-manager family, all implementing the
//! [`PkgMgr`] capability trait (availability probing, listing, detail
//! parsing, substring search). Two shapes exist:
//!
//! - **Binding-backed** (`rpm`, `apt`): wrap an in-process native
//!   binding obtained from the host; when the binding is missing but the
//!   matching CLI exists, they can trigger a one-shot handoff to an
//!   alternate runtime that has it.
//! - **CLI-backed** (`pacman`, `pkg`, `portage`, `apk`, `pkg_info`):
//!   shell out to an executable resolved once via PATH and parse its
//!   text output.
//!
//! The shared aggregation logic (listing into a name-keyed map,
//! searching with substring pruning) lives in free functions in
//! [`traits`], and the blanket [`Driver`] impl makes every driver usable
//! as a trait object through the [`registry`].

pub mod apk;
pub mod apt;
pub mod pacman;
pub mod pkg;
pub mod pkg_info;
pub mod portage;
pub mod registry;
pub mod rpm;
pub mod traits;

pub use registry::{DriverRegistry, get_all_pkg_managers};
pub use traits::{Driver, PkgMgr};

use std::cell::OnceCell;
use std::sync::Arc;

use crate::error::Result;
use crate::host::{Host, PkgDbBinding};

/// Lazily-resolved PATH handle shared by the CLI-backed drivers.
/// Resolution happens at most once per driver instance.
pub(crate) struct CliHandle {
    name: &'static str,
    path: OnceCell<String>,
}

impl CliHandle {
    pub(crate) fn new(name: &'static str) -> Self {
        Self {
            name,
            path: OnceCell::new(),
        }
    }

    pub(crate) fn resolve(&self, host: &dyn Host) -> Result<&str> {
        if let Some(path) = self.path.get() {
            return Ok(path);
        }
        let found = host.find_bin(self.name)?;
        Ok(self
            .path
            .get_or_init(|| found.to_string_lossy().into_owned()))
    }

    pub(crate) fn available(&self, host: &dyn Host) -> bool {
        self.resolve(host).is_ok()
    }
}

/// Lazily-resolved native binding handle shared by the binding-backed
/// drivers. The lookup result (present or absent) is cached per driver
/// instance.
pub(crate) struct LibHandle {
    name: &'static str,
    lib: OnceCell<Option<Arc<dyn PkgDbBinding>>>,
}

impl LibHandle {
    pub(crate) fn new(name: &'static str) -> Self {
        Self {
            name,
            lib: OnceCell::new(),
        }
    }

    pub(crate) fn resolve(&self, host: &dyn Host) -> Option<Arc<dyn PkgDbBinding>> {
        self.lib.get_or_init(|| host.binding(self.name)).clone()
    }
}
