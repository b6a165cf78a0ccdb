//! RPM driver, backed by an in-process librpm binding supplied by the
//! host. The rpm database holds installed packages only; there is no
//! local repository index to search.

use crate::error::{PkgFactsError, Result};
use crate::host::{BindingPackage, Host};
use crate::managers::LibHandle;
use crate::managers::traits::{Driver, PkgMgr};
use crate::record::PackageRecord;

const LIB: &str = "rpm";
const CLI: &str = "rpm";

/// Runtimes probed for the binding when it is missing in-process.
const CANDIDATE_RUNTIMES: [&str; 3] = [
    "/usr/libexec/platform-python",
    "/usr/bin/python3",
    "/usr/bin/python2",
];

pub struct Rpm<'h> {
    host: &'h dyn Host,
    lib: LibHandle,
}

impl<'h> Rpm<'h> {
    pub fn new(host: &'h dyn Host) -> Self {
        Self {
            host,
            lib: LibHandle::new(LIB),
        }
    }
}

pub fn construct(host: &dyn Host) -> Box<dyn Driver + '_> {
    Box::new(Rpm::new(host))
}

impl PkgMgr for Rpm<'_> {
    type Raw = BindingPackage;

    fn name(&self) -> &'static str {
        "rpm"
    }

    /// We expect the binding loaded in-process; finding only the rpm CLI
    /// triggers the one-shot handoff to a runtime that has the binding,
    /// or a warning when no such runtime exists.
    fn is_available(&self) -> bool {
        let we_have_lib = self.lib.resolve(self.host).is_some();

        if self.host.find_bin(CLI).is_ok() {
            if !we_have_lib
                && !self.host.has_respawned()
                && let Some(runtime) = self.host.probe_runtimes(&CANDIDATE_RUNTIMES, LIB)
                && self.host.respawn(&runtime).is_ok()
            {
                // End of the line for this process: the handoff target
                // produces all further results.
                return false;
            }

            if !we_have_lib {
                self.host.warn(&format!(
                    "Found \"{CLI}\" but the {LIB} binding is not loadable in this process"
                ));
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
            release: raw.release.clone(),
            epoch: raw.epoch,
            arch: raw.arch.clone(),
            ..Default::default()
        }
    }

    fn search_pkg_substr(&self, _substr: &str) -> Result<Vec<BindingPackage>> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::managers::testutil::{StubBinding, StubHost};
    use std::path::PathBuf;
    use std::sync::Arc;

    fn header(name: &str, version: &str, release: &str, arch: &str) -> BindingPackage {
        BindingPackage {
            name: name.to_string(),
            version: version.to_string(),
            release: Some(release.to_string()),
            epoch: Some(0),
            arch: Some(arch.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn available_when_binding_present() {
        let host = StubHost::new().with_binding(
            "rpm",
            Arc::new(StubBinding {
                packages: vec![header("bash", "5.2.26", "3.fc40", "x86_64")],
            }),
        );
        let rpm = Rpm::new(&host);
        assert!(PkgMgr::is_available(&rpm));
        assert!(host.warnings.borrow().is_empty());
    }

    #[test]
    fn missing_binding_with_cli_triggers_handoff() {
        let mut host = StubHost::new().with_bin("rpm");
        host.runtime_with_binding = Some(PathBuf::from("/usr/bin/python3"));
        let rpm = Rpm::new(&host);

        assert!(!PkgMgr::is_available(&rpm));
        assert_eq!(
            host.respawn_calls.borrow().as_slice(),
            [PathBuf::from("/usr/bin/python3")]
        );
    }

    #[test]
    fn handoff_is_single_shot() {
        let mut host = StubHost::new().with_bin("rpm");
        host.runtime_with_binding = Some(PathBuf::from("/usr/bin/python3"));
        host.respawned = true;
        let rpm = Rpm::new(&host);

        assert!(!PkgMgr::is_available(&rpm));
        assert!(host.respawn_calls.borrow().is_empty());
        let warnings = host.warnings.borrow();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("rpm binding"));
    }

    #[test]
    fn missing_binding_without_runtime_only_warns() {
        let host = StubHost::new().with_bin("rpm");
        let rpm = Rpm::new(&host);

        assert!(!PkgMgr::is_available(&rpm));
        assert!(host.respawn_calls.borrow().is_empty());
        assert!(host.warnings.borrow()[0].contains("rpm"));
    }

    #[test]
    fn nothing_on_path_stays_silent() {
        let host = StubHost::new();
        let rpm = Rpm::new(&host);
        assert!(!PkgMgr::is_available(&rpm));
        assert!(host.warnings.borrow().is_empty());
    }

    #[test]
    fn details_map_header_fields() {
        let host = StubHost::new().with_binding(
            "rpm",
            Arc::new(StubBinding {
                packages: vec![header("bash", "5.2.26", "3.fc40", "x86_64")],
            }),
        );
        let rpm = Rpm::new(&host);

        let raws = rpm.list_installed().unwrap();
        let record = rpm.get_package_details(&raws[0]);
        assert_eq!(record.name, "bash");
        assert_eq!(record.version, "5.2.26");
        assert_eq!(record.release.as_deref(), Some("3.fc40"));
        assert_eq!(record.epoch, Some(0));
        assert_eq!(record.arch.as_deref(), Some("x86_64"));
    }

    #[test]
    fn search_yields_nothing() {
        let host = StubHost::new();
        let rpm = Rpm::new(&host);
        assert!(rpm.search_pkg_substr("bash").unwrap().is_empty());
    }
}
