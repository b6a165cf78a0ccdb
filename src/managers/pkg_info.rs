//! OpenBSD/NetBSD `pkg_info` driver. Lines look like
//! `name-version    comment`; only the first token matters and the
//! version is everything after the last dash.

use crate::error::{PkgFactsError, Result};
use crate::host::Host;
use crate::managers::CliHandle;
use crate::managers::traits::{Driver, PkgMgr};
use crate::record::PackageRecord;

const CLI: &str = "pkg_info";

pub struct PkgInfo<'h> {
    host: &'h dyn Host,
    cli: CliHandle,
}

impl<'h> PkgInfo<'h> {
    pub fn new(host: &'h dyn Host) -> Self {
        Self {
            host,
            cli: CliHandle::new(CLI),
        }
    }
}

pub fn construct(host: &dyn Host) -> Box<dyn Driver + '_> {
    Box::new(PkgInfo::new(host))
}

impl PkgMgr for PkgInfo<'_> {
    type Raw = String;

    fn name(&self) -> &'static str {
        "pkg_info"
    }

    fn is_available(&self) -> bool {
        self.cli.available(self.host)
    }

    fn list_installed(&self) -> Result<Vec<String>> {
        let cli = self.cli.resolve(self.host)?;
        let out = self.host.run_command(&[cli, "-a"], &[])?;
        if out.rc != 0 || !out.stderr.is_empty() {
            return Err(PkgFactsError::ExecutionError {
                manager: "pkg_info".to_string(),
                reason: format!("unable to list packages rc={} : {}", out.rc, out.stderr),
            });
        }
        Ok(out.stdout.lines().map(str::to_string).collect())
    }

    fn get_package_details(&self, raw: &String) -> PackageRecord {
        let ident = raw.split_whitespace().next().unwrap_or(raw);
        match ident.rsplit_once('-') {
            Some((name, version)) => PackageRecord {
                name: name.to_string(),
                version: version.to_string(),
                ..Default::default()
            },
            None => PackageRecord {
                name: ident.to_string(),
                version: String::new(),
                ..Default::default()
            },
        }
    }

    /// `-Q` queries the local repository index, printing the same
    /// `name-version` identifiers as `-a`.
    fn search_pkg_substr(&self, substr: &str) -> Result<Vec<String>> {
        let cli = self.cli.resolve(self.host)?;
        let out = self.host.run_command(&[cli, "-Q", substr], &[])?;
        if out.rc != 0 {
            if out.stderr.is_empty() {
                return Ok(Vec::new());
            }
            return Err(PkgFactsError::ExecutionError {
                manager: "pkg_info".to_string(),
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

    #[test]
    fn list_installed_runs_pkg_info_a() {
        let host = StubHost::new().with_bin("pkg_info");
        host.push_output(0, "curl-8.5.0    transfer files with URL syntax\nzsh-5.9p1\n", "");
        let pkg_info = PkgInfo::new(&host);

        let raws = pkg_info.list_installed().unwrap();
        assert_eq!(raws.len(), 2);
        assert_eq!(host.commands.borrow()[0], ["/usr/bin/pkg_info", "-a"]);
    }

    #[test]
    fn details_split_the_first_token_on_the_last_dash() {
        let host = StubHost::new().with_bin("pkg_info");
        let pkg_info = PkgInfo::new(&host);

        let raw = "curl-8.5.0    transfer files with URL syntax".to_string();
        let record = pkg_info.get_package_details(&raw);
        assert_eq!(record.name, "curl");
        assert_eq!(record.version, "8.5.0");

        let record = pkg_info.get_package_details(&"g-wrap-1.9.15p3".to_string());
        assert_eq!(record.name, "g-wrap");
        assert_eq!(record.version, "1.9.15p3");
    }

    #[test]
    fn dashless_identifiers_degrade_to_name_only() {
        let host = StubHost::new().with_bin("pkg_info");
        let pkg_info = PkgInfo::new(&host);

        let record = pkg_info.get_package_details(&"quirks".to_string());
        assert_eq!(record.name, "quirks");
        assert_eq!(record.version, "");
    }

    #[test]
    fn search_queries_the_repo_index() {
        let host = StubHost::new().with_bin("pkg_info");
        host.push_output(0, "curl-8.5.0\ncurl-8.5.0p0\n", "");
        let pkg_info = PkgInfo::new(&host);

        let raws = pkg_info.search_pkg_substr("curl").unwrap();
        assert_eq!(raws.len(), 2);
        assert_eq!(
            host.commands.borrow()[0],
            ["/usr/bin/pkg_info", "-Q", "curl"]
        );
    }

    #[test]
    fn search_with_no_matches_is_empty() {
        let host = StubHost::new().with_bin("pkg_info");
        host.push_output(1, "", "");
        let pkg_info = PkgInfo::new(&host);
        assert!(pkg_info.search_pkg_substr("nosuch").unwrap().is_empty());
    }
}
