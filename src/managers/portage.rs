//! Portage driver, built on the portage-utils tools. Listing pipes
//! `qlist` through `qatom` so each installed package arrives as one
//! whitespace-separated column line; search rewrites `qsearch` output
//! into the same column shape.

use crate::error::{PkgFactsError, Result};
use crate::host::Host;
use crate::managers::CliHandle;
use crate::managers::traits::{Driver, PkgMgr};
use crate::record::PackageRecord;

const CLI: &str = "qlist";
const SEARCH_CLI: &str = "qsearch";

/// Column order produced by `qatom` and reproduced for search output.
const ATOMS: [&str; 7] = [
    "category",
    "name",
    "version",
    "ebuild_revision",
    "slots",
    "prefixes",
    "suffixes",
];

pub struct Portage<'h> {
    host: &'h dyn Host,
    cli: CliHandle,
}

impl<'h> Portage<'h> {
    pub fn new(host: &'h dyn Host) -> Self {
        Self {
            host,
            cli: CliHandle::new(CLI),
        }
    }
}

pub fn construct(host: &dyn Host) -> Box<dyn Driver + '_> {
    Box::new(Portage::new(host))
}

impl PkgMgr for Portage<'_> {
    type Raw = String;

    fn name(&self) -> &'static str {
        "portage"
    }

    fn is_available(&self) -> bool {
        self.cli.available(self.host)
    }

    /// `qatom` writes usage hints to stderr for odd atoms, so only the
    /// exit code decides success here.
    fn list_installed(&self) -> Result<Vec<String>> {
        let cli = self.cli.resolve(self.host)?;
        let out = self
            .host
            .run_shell(&format!("{cli} -Iv | xargs -n 1024 qatom"))?;
        if out.rc != 0 {
            return Err(PkgFactsError::ExecutionError {
                manager: "portage".to_string(),
                reason: format!("unable to list packages rc={} : {}", out.rc, out.stderr),
            });
        }
        Ok(out.stdout.lines().map(str::to_string).collect())
    }

    fn get_package_details(&self, raw: &String) -> PackageRecord {
        let mut record = PackageRecord::default();
        for (atom, value) in ATOMS.iter().zip(raw.split_whitespace()) {
            match *atom {
                "category" => record.category = Some(value.to_string()),
                "name" => record.name = value.to_string(),
                "version" => record.version = value.to_string(),
                "ebuild_revision" => record.ebuild_revision = Some(value.to_string()),
                "slots" => record.slots = Some(value.to_string()),
                "prefixes" => record.prefixes = Some(value.to_string()),
                "suffixes" => record.suffixes = Some(value.to_string()),
                _ => {}
            }
        }
        if record.name.is_empty() {
            record.name = raw.trim().to_string();
        }
        record
    }

    /// `qsearch` emits `category/name` lines; rewrite each into the
    /// qatom column shape so the shared detail parser applies.
    fn search_pkg_substr(&self, substr: &str) -> Result<Vec<String>> {
        let qsearch = self.host.find_bin(SEARCH_CLI)?;
        let qsearch = qsearch.to_string_lossy();
        let out = self
            .host
            .run_command(&[&*qsearch, "--name-only", substr], &[("LC_ALL", "C")])?;
        if out.rc != 0 {
            if out.stderr.is_empty() {
                // No matches.
                return Ok(Vec::new());
            }
            return Err(PkgFactsError::ExecutionError {
                manager: "portage".to_string(),
                reason: format!("unable to search packages rc={} : {}", out.rc, out.stderr),
            });
        }

        let mut raws = Vec::new();
        for line in out.stdout.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match line.split_once('/') {
                Some((category, name)) => raws.push(format!("{category} {name}")),
                None => {
                    self.host.warn(&format!(
                        "portage: unexpected search output line, skipping: {line}"
                    ));
                }
            }
        }
        Ok(raws)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::managers::testutil::StubHost;

    const QATOM_OUTPUT: &str = "\
app-shells bash 5.2_p26 r3 <unset> <unset> <unset>
sys-apps portage 3.0.61 <unset> <unset> <unset> <unset>
";

    #[test]
    fn list_installed_pipes_qlist_through_qatom() {
        let host = StubHost::new().with_bin("qlist");
        host.push_output(0, QATOM_OUTPUT, "");
        let portage = Portage::new(&host);

        let raws = portage.list_installed().unwrap();
        assert_eq!(raws.len(), 2);
        assert_eq!(
            host.shell_commands.borrow()[0],
            "/usr/bin/qlist -Iv | xargs -n 1024 qatom"
        );
    }

    #[test]
    fn list_installed_ignores_stderr_when_exit_is_clean() {
        let host = StubHost::new().with_bin("qlist");
        host.push_output(0, QATOM_OUTPUT, "qatom: unknown suffix\n");
        let portage = Portage::new(&host);
        assert_eq!(portage.list_installed().unwrap().len(), 2);
    }

    #[test]
    fn details_zip_columns_with_atoms() {
        let host = StubHost::new().with_bin("qlist");
        let portage = Portage::new(&host);

        let raw = "app-shells bash 5.2_p26 r3 <unset> <unset> <unset>".to_string();
        let record = portage.get_package_details(&raw);
        assert_eq!(record.category.as_deref(), Some("app-shells"));
        assert_eq!(record.name, "bash");
        assert_eq!(record.version, "5.2_p26");
        assert_eq!(record.ebuild_revision.as_deref(), Some("r3"));
        assert_eq!(record.slots.as_deref(), Some("<unset>"));
    }

    #[test]
    fn details_tolerate_missing_trailing_columns() {
        let host = StubHost::new().with_bin("qlist");
        let portage = Portage::new(&host);

        let record = portage.get_package_details(&"app-misc hello".to_string());
        assert_eq!(record.category.as_deref(), Some("app-misc"));
        assert_eq!(record.name, "hello");
        assert_eq!(record.version, "");
        assert_eq!(record.ebuild_revision, None);
    }

    #[test]
    fn search_rewrites_qsearch_lines_into_column_shape() {
        let host = StubHost::new().with_bin("qlist").with_bin("qsearch");
        host.push_output(0, "app-admin/ansible\napp-misc/hello\nmalformed\n", "");
        let portage = Portage::new(&host);

        let raws = portage.search_pkg_substr("ansible").unwrap();
        assert_eq!(raws, ["app-admin ansible", "app-misc hello"]);
        assert_eq!(host.warnings.borrow().len(), 1);

        let record = portage.get_package_details(&raws[0]);
        assert_eq!(record.name, "ansible");
        assert_eq!(record.category.as_deref(), Some("app-admin"));
        assert_eq!(record.version, "");
    }

    #[test]
    fn search_with_no_matches_is_empty() {
        let host = StubHost::new().with_bin("qlist").with_bin("qsearch");
        host.push_output(1, "", "");
        let portage = Portage::new(&host);
        assert!(portage.search_pkg_substr("nosuch").unwrap().is_empty());
    }
}
