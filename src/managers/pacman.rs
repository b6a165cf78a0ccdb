//! pacman driver. Listing and searching both end up as `key : value`
//! blocks (`-Qi` for the local database, `-Ss` + `-Si` for the sync
//! repositories) so one block parser serves both paths.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{PkgFactsError, Result};
use crate::host::Host;
use crate::managers::CliHandle;
use crate::managers::traits::{Driver, PkgMgr};
use crate::record::PackageRecord;

const CLI: &str = "pacman";

fn detail_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([\w ]*\w) +: (.*)$").expect("valid detail regex"))
}

/// Blocks are separated by blank lines; output ends with one, so the
/// final split element is discarded.
fn split_blocks(stdout: &str) -> Vec<String> {
    let mut blocks: Vec<String> = stdout.split("\n\n").map(str::to_string).collect();
    blocks.pop();
    blocks
}

pub struct Pacman<'h> {
    host: &'h dyn Host,
    cli: CliHandle,
}

impl<'h> Pacman<'h> {
    pub fn new(host: &'h dyn Host) -> Self {
        Self {
            host,
            cli: CliHandle::new(CLI),
        }
    }
}

pub fn construct(host: &dyn Host) -> Box<dyn Driver + '_> {
    Box::new(Pacman::new(host))
}

impl PkgMgr for Pacman<'_> {
    type Raw = String;

    fn name(&self) -> &'static str {
        "pacman"
    }

    fn is_available(&self) -> bool {
        self.cli.available(self.host)
    }

    fn list_installed(&self) -> Result<Vec<String>> {
        let cli = self.cli.resolve(self.host)?;
        let out = self.host.run_command(&[cli, "-Qi"], &[("LC_ALL", "C")])?;
        if out.rc != 0 || !out.stderr.is_empty() {
            return Err(PkgFactsError::ExecutionError {
                manager: "pacman".to_string(),
                reason: format!("unable to list packages rc={} : {}", out.rc, out.stderr),
            });
        }
        Ok(split_blocks(&out.stdout))
    }

    /// Parse one `key : value` block. Values may continue onto
    /// subsequent indented lines, which are appended to the last key
    /// seen; a continuation before any key is warned about and skipped.
    fn get_package_details(&self, raw: &String) -> PackageRecord {
        let mut raw_details: HashMap<String, String> = HashMap::new();
        let mut last_detail: Option<String> = None;

        for line in raw.lines() {
            if let Some(caps) = detail_re().captures(line) {
                let key = caps[1].to_string();
                raw_details.insert(key.clone(), caps[2].to_string());
                last_detail = Some(key);
            } else if let Some(key) = &last_detail {
                if let Some(value) = raw_details.get_mut(key) {
                    value.push_str("  ");
                    value.push_str(line.trim_start());
                }
            } else {
                self.host.warn(&format!(
                    "pacman: unexpected line in package details, skipping: {line}"
                ));
            }
        }

        let provides = match raw_details.get("Provides").map(String::as_str) {
            None | Some("None") => None,
            Some(value) => Some(
                value
                    .split("  ")
                    .map(|p| p.split('=').next().unwrap_or(p).to_string())
                    .collect(),
            ),
        };

        PackageRecord {
            name: raw_details.get("Name").cloned().unwrap_or_default(),
            version: raw_details.get("Version").cloned().unwrap_or_default(),
            arch: raw_details.get("Architecture").cloned(),
            provides,
            ..Default::default()
        }
    }

    /// `-Ss` finds matching names in the sync repositories (matching
    /// descriptions too; pruning handles that), then `-Si` fetches the
    /// same block shape the listing parser expects.
    fn search_pkg_substr(&self, substr: &str) -> Result<Vec<String>> {
        let cli = self.cli.resolve(self.host)?;
        let out = self
            .host
            .run_command(&[cli, "-Ss", substr], &[("LC_ALL", "C")])?;
        if out.rc != 0 {
            if out.stderr.is_empty() {
                // No matches.
                return Ok(Vec::new());
            }
            return Err(PkgFactsError::ExecutionError {
                manager: "pacman".to_string(),
                reason: format!("unable to search packages rc={} : {}", out.rc, out.stderr),
            });
        }

        let mut names: Vec<String> = Vec::new();
        for line in out.stdout.lines() {
            // Description lines are indented; headers are "repo/name version".
            if line.is_empty() || line.starts_with(|c: char| c.is_whitespace()) {
                continue;
            }
            let Some(first) = line.split_whitespace().next() else {
                continue;
            };
            let name = first.rsplit('/').next().unwrap_or(first);
            names.push(name.to_string());
        }
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let mut argv: Vec<&str> = vec![cli, "-Si"];
        argv.extend(names.iter().map(String::as_str));
        let out = self.host.run_command(&argv, &[("LC_ALL", "C")])?;
        if out.rc != 0 {
            return Err(PkgFactsError::ExecutionError {
                manager: "pacman".to_string(),
                reason: format!("unable to search packages rc={} : {}", out.rc, out.stderr),
            });
        }
        Ok(split_blocks(&out.stdout))
    }
}
