//! FreeBSD `pkg` driver. Both listing and searching use `pkg`'s
//! printf-style format strings so each package arrives as one
//! tab-separated line.

use crate::error::{PkgFactsError, Result};
use crate::host::Host;
use crate::managers::CliHandle;
use crate::managers::traits::{Driver, PkgMgr};
use crate::record::PackageRecord;

const CLI: &str = "pkg";

/// Field order mirrors the format strings below.
const ATOMS: [&str; 9] = [
    "name",
    "version",
    "origin",
    "installed",
    "automatic",
    "arch",
    "category",
    "prefix",
    "vital",
];

const QUERY_FORMAT: &str = "%n\t%v\t%R\t%t\t%a\t%q\t%o\t%p\t%V";
/// `rquery` cannot expand install-time fields, so those columns stay
/// empty to keep the shared line parser applicable.
const SEARCH_FORMAT: &str = "%n\t%v\t%R\t\t\t%q\t%o\t%p\t";

pub struct Pkg<'h> {
    host: &'h dyn Host,
    cli: CliHandle,
}

impl<'h> Pkg<'h> {
    pub fn new(host: &'h dyn Host) -> Self {
        Self {
            host,
            cli: CliHandle::new(CLI),
        }
    }
}

pub fn construct(host: &dyn Host) -> Box<dyn Driver + '_> {
    Box::new(Pkg::new(host))
}

impl PkgMgr for Pkg<'_> {
    type Raw = String;

    fn name(&self) -> &'static str {
        "pkg"
    }

    fn is_available(&self) -> bool {
        self.cli.available(self.host)
    }

    fn list_installed(&self) -> Result<Vec<String>> {
        let cli = self.cli.resolve(self.host)?;
        let out = self
            .host
            .run_command(&[cli, "query", QUERY_FORMAT], &[("LC_ALL", "C")])?;
        if out.rc != 0 || !out.stderr.is_empty() {
            return Err(PkgFactsError::ExecutionError {
                manager: "pkg".to_string(),
                reason: format!("unable to list packages rc={} : {}", out.rc, out.stderr),
            });
        }
        Ok(out.stdout.lines().map(str::to_string).collect())
    }

    fn get_package_details(&self, raw: &String) -> PackageRecord {
        let mut record = PackageRecord::default();
        let mut saw_version = false;

        for (atom, value) in ATOMS.iter().zip(raw.split('\t')) {
            match *atom {
                "name" => record.name = value.to_string(),
                "version" => {
                    record.version = value.to_string();
                    saw_version = true;
                }
                "origin" if !value.is_empty() => record.origin = Some(value.to_string()),
                "installed" if !value.is_empty() => record.installed = Some(value.to_string()),
                "automatic" => {
                    record.automatic = value.parse::<i64>().ok().map(|n| n != 0);
                }
                // "%q" prints an ABI triple like FreeBSD:14:amd64.
                "arch" if !value.is_empty() => {
                    record.arch =
                        Some(value.split(':').nth(2).unwrap_or(value).to_string());
                }
                "category" if !value.is_empty() => {
                    record.category =
                        Some(value.split('/').next().unwrap_or(value).to_string());
                }
                "prefix" if !value.is_empty() => record.prefix = Some(value.to_string()),
                "vital" => {
                    record.vital = value.parse::<i64>().ok().map(|n| n != 0);
                }
                _ => {}
            }
        }

        // FreeBSD versions pack the port revision and epoch into the
        // version string: name-1.2_5,3 has revision 5 and epoch 3. Both
        // default to "0" when their delimiter is absent. A revision
        // embedded in the version part wins over one in the epoch
        // trailer.
        if saw_version {
            let full = record.version.clone();
            match full.split_once(',') {
                Some((version_part, trailer)) => {
                    let (version, mut revision) = match version_part.split_once('_') {
                        Some((version, revision)) => (version, Some(revision)),
                        None => (version_part, None),
                    };
                    record.version = version.to_string();
                    match trailer.split_once('_') {
                        Some((epoch, trailer_revision)) => {
                            record.port_epoch = Some(epoch.to_string());
                            revision = revision.or(Some(trailer_revision));
                        }
                        None => record.port_epoch = Some(trailer.to_string()),
                    }
                    record.revision = Some(revision.unwrap_or("0").to_string());
                }
                None => {
                    record.port_epoch = Some("0".to_string());
                    match full.split_once('_') {
                        Some((version, revision)) => {
                            record.version = version.to_string();
                            record.revision = Some(revision.to_string());
                        }
                        None => record.revision = Some("0".to_string()),
                    }
                }
            }
        }

        record
    }

    fn search_pkg_substr(&self, substr: &str) -> Result<Vec<String>> {
        let cli = self.cli.resolve(self.host)?;
        let pattern = format!("*{substr}*");
        let out = self.host.run_command(
            &[cli, "rquery", "-g", SEARCH_FORMAT, &pattern],
            &[("LC_ALL", "C")],
        )?;
        if out.rc != 0 {
            if out.stderr.is_empty() {
                return Ok(Vec::new());
            }
            return Err(PkgFactsError::ExecutionError {
                manager: "pkg".to_string(),
                reason: format!("unable to search packages rc={} : {}", out.rc, out.stderr),
            });
        }

        let mut raws = Vec::new();
        for line in out.stdout.lines() {
            if line.split('\t').count() != ATOMS.len() {
                self.host.warn(&format!(
                    "pkg: unexpected search output line, skipping: {line}"
                ));
                continue;
            }
            raws.push(line.to_string());
        }
        Ok(raws)
    }
}
