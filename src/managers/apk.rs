//! Alpine apk driver. Both `apk info -v` and `apk search` print one
//! `name-version-release` identifier per line, so listing and searching
//! share the identifier parser.

use crate::error::{PkgFactsError, Result};
use crate::host::Host;
use crate::managers::CliHandle;
use crate::managers::traits::{Driver, PkgMgr};
use crate::record::PackageRecord;

const CLI: &str = "apk";

pub struct Apk<'h> {
    host: &'h dyn Host,
    cli: CliHandle,
}

impl<'h> Apk<'h> {
    pub fn new(host: &'h dyn Host) -> Self {
        Self {
            host,
            cli: CliHandle::new(CLI),
        }
    }
}

pub fn construct(host: &dyn Host) -> Box<dyn Driver + '_> {
    Box::new(Apk::new(host))
}

impl PkgMgr for Apk<'_> {
    type Raw = String;

    fn name(&self) -> &'static str {
        "apk"
    }

    fn is_available(&self) -> bool {
        self.cli.available(self.host)
    }

    fn list_installed(&self) -> Result<Vec<String>> {
        let cli = self.cli.resolve(self.host)?;
        let out = self.host.run_command(&[cli, "info", "-v"], &[])?;
        if out.rc != 0 || !out.stderr.is_empty() {
            return Err(PkgFactsError::ExecutionError {
                manager: "apk".to_string(),
                reason: format!("unable to list packages rc={} : {}", out.rc, out.stderr),
            });
        }
        Ok(out.stdout.lines().map(str::to_string).collect())
    }

    /// Split `name-version-release` from the right; the name itself may
    /// contain dashes. Identifiers with fewer than three parts keep the
    /// whole string as the name and omit the rest.
    fn get_package_details(&self, raw: &String) -> PackageRecord {
        let mut parts: Vec<&str> = raw.rsplitn(3, '-').collect();
        parts.reverse();
        match parts.as_slice() {
            [name, version, release] => PackageRecord {
                name: name.to_string(),
                version: version.to_string(),
                release: Some(release.to_string()),
                ..Default::default()
            },
            _ => PackageRecord {
                name: raw.clone(),
                version: String::new(),
                ..Default::default()
            },
        }
    }

    fn search_pkg_substr(&self, substr: &str) -> Result<Vec<String>> {
        let cli = self.cli.resolve(self.host)?;
        let out = self.host.run_command(&[cli, "search", "--", substr], &[])?;
        if out.rc != 0 {
            if out.stderr.is_empty() {
                return Ok(Vec::new());
            }
            return Err(PkgFactsError::ExecutionError {
                manager: "apk".to_string(),
                reason: format!("unable to search packages rc={} : {}", out.rc, out.stderr),
            });
        }
        Ok(out.stdout.lines().map(str::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::managers::testutil::StubHost;
    use crate::managers::traits::search_packages;

    #[test]
    fn list_installed_runs_info() {
        let host = StubHost::new().with_bin("apk");
        host.push_output(0, "musl-1.2.4-r2\nbusybox-1.36.1-r5\n", "");
        let apk = Apk::new(&host);

        let raws = apk.list_installed().unwrap();
        assert_eq!(raws, ["musl-1.2.4-r2", "busybox-1.36.1-r5"]);
        assert_eq!(host.commands.borrow()[0], ["/usr/bin/apk", "info", "-v"]);
    }

    #[test]
    fn details_right_split_the_identifier() {
        let host = StubHost::new().with_bin("apk");
        let apk = Apk::new(&host);

        let record = apk.get_package_details(&"ansible-core-2.13.6-r0".to_string());
        assert_eq!(record.name, "ansible-core");
        assert_eq!(record.version, "2.13.6");
        assert_eq!(record.release.as_deref(), Some("r0"));
    }

    #[test]
    fn short_identifiers_degrade_to_name_only() {
        let host = StubHost::new().with_bin("apk");
        let apk = Apk::new(&host);

        let record = apk.get_package_details(&"musl-1.2.4".to_string());
        assert_eq!(record.name, "musl-1.2.4");
        assert_eq!(record.version, "");
        assert_eq!(record.release, None);

        let record = apk.get_package_details(&"musl".to_string());
        assert_eq!(record.name, "musl");
        assert_eq!(record.version, "");
    }

    #[test]
    fn details_are_idempotent() {
        let host = StubHost::new().with_bin("apk");
        let apk = Apk::new(&host);
        let raw = "ansible-core-2.13.6-r0".to_string();
        assert_eq!(apk.get_package_details(&raw), apk.get_package_details(&raw));
    }

    #[test]
    fn search_results_flow_through_the_shared_parser() {
        let host = StubHost::new().with_bin("apk");
        // apk search matches descriptions too; "john" famously shows up
        // when searching for "ansible".
        host.push_output(0, "ansible-core-2.13.6-r0\nansible-lint-6.9.1-r0\njohn-1.9.0-r4\n", "");
        let apk = Apk::new(&host);

        let results = search_packages(&apk, &["ansible".to_string()]).unwrap();
        let names: Vec<&str> = results["ansible"].iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["ansible-core", "ansible-lint"]);
        assert_eq!(results["ansible"][0].version, "2.13.6");
        assert_eq!(
            host.commands.borrow()[0],
            ["/usr/bin/apk", "search", "--", "ansible"]
        );
    }

    #[test]
    fn search_with_no_matches_is_empty() {
        let host = StubHost::new().with_bin("apk");
        host.push_output(1, "", "");
        let apk = Apk::new(&host);
        assert!(apk.search_pkg_substr("nosuch").unwrap().is_empty());
    }
}
