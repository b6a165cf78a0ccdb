//! APT driver, backed by an in-process libapt cache binding. The cache
//! covers every package known to the local index, so searching does not
//! need a separate subcommand.

use crate::error::{PkgFactsError, Result};
use crate::host::{BindingPackage, Host};
use crate::managers::LibHandle;
use crate::managers::traits::{Driver, PkgMgr};
use crate::record::PackageRecord;

const LIB: &str = "apt";

/// CLI counterparts whose presence makes a missing binding worth a
/// handoff attempt and a warning.
const CLIS: [&str; 3] = ["apt", "apt-get", "aptitude"];

const CANDIDATE_RUNTIMES: [&str; 2] = ["/usr/bin/python3", "/usr/bin/python2"];

pub struct Apt<'h> {
    host: &'h dyn Host,
    lib: LibHandle,
}

impl<'h> Apt<'h> {
    pub fn new(host: &'h dyn Host) -> Self {
        Self {
            host,
            lib: LibHandle::new(LIB),
        }
    }
}

pub fn construct(host: &dyn Host) -> Box<dyn Driver + '_> {
    Box::new(Apt::new(host))
}

impl PkgMgr for Apt<'_> {
    type Raw = BindingPackage;

    fn name(&self) -> &'static str {
        "apt"
    }

    fn is_available(&self) -> bool {
        let we_have_lib = self.lib.resolve(self.host).is_some();

        if !we_have_lib {
            for exe in CLIS {
                if self.host.find_bin(exe).is_err() {
                    continue;
                }
                if !self.host.has_respawned()
                    && let Some(runtime) = self.host.probe_runtimes(&CANDIDATE_RUNTIMES, LIB)
                    && self.host.respawn(&runtime).is_ok()
                {
                    // End of the line for this process; the handoff
                    // target takes over.
                    return false;
                }
                self.host.warn(&format!(
                    "Found \"{exe}\" but the {LIB} binding is not loadable in this process"
                ));
                break;
            }
        }

        we_have_lib
    }

    fn list_installed(&self) -> Result<Vec<BindingPackage>> {
        let lib = self
            .lib
            .resolve(self.host)
            .ok_or_else(|| PkgFactsError::DependencyMissing(format!("{LIB} binding")))?;
        lib.installed()
    }

    fn get_package_details(&self, raw: &BindingPackage) -> PackageRecord {
        PackageRecord {
            name: raw.name.clone(),
            version: raw.version.clone(),
            arch: raw.arch.clone(),
            category: raw.category.clone(),
            origin: raw.origin.clone(),
            ..Default::default()
        }
    }

    fn search_pkg_substr(&self, substr: &str) -> Result<Vec<BindingPackage>> {
        let lib = self
            .lib
            .resolve(self.host)
            .ok_or_else(|| PkgFactsError::DependencyMissing(format!("{LIB} binding")))?;
        lib.search(substr)
    }
}
