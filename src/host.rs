//! Narrow interface to the hosting environment.
//!
//! Drivers never touch the process table, PATH, or native bindings
//! directly; everything goes through the [`Host`] trait so an embedding
//! framework can substitute its own process runner, warning sink, and
//! runtime-handoff machinery. [`SystemHost`] is the standalone
//! implementation used by the `pkgfacts` binary.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use crate::error::{PkgFactsError, Result};
use crate::ui;

/// Environment marker set on a handoff child so the alternate runtime
/// never attempts a second handoff.
pub const RESPAWN_MARKER: &str = "PKGFACTS_RESPAWNED";

/// Captured outcome of one external command invocation.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub rc: i32,
    pub stdout: String,
    pub stderr: String,
}

/// One package as yielded by an in-process package database binding.
///
/// Only `name` and `version` are common; the remaining fields are filled
/// in as far as the underlying library exposes them (rpm headers carry
/// release/epoch/arch, the apt cache carries arch/section/origin).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingPackage {
    pub name: String,
    pub version: String,
    pub release: Option<String>,
    pub epoch: Option<u64>,
    pub arch: Option<String>,
    pub category: Option<String>,
    pub origin: Option<String>,
}

/// In-process native binding to a package database (librpm, libapt).
pub trait PkgDbBinding: Send + Sync {
    /// Every installed package known to the database.
    fn installed(&self) -> Result<Vec<BindingPackage>>;

    /// Packages in the local repository index whose names match the
    /// given substring. Implementations may match more loosely; spurious
    /// results are pruned by the query engine.
    fn search(&self, substr: &str) -> Result<Vec<BindingPackage>>;
}

pub trait Host {
    /// Run an external command to completion and capture its output.
    /// `env` entries are applied on top of the inherited environment.
    fn run_command(&self, argv: &[&str], env: &[(&str, &str)]) -> Result<CommandOutput>;

    /// Run a full shell command line (used for backends whose listing is
    /// a pipeline).
    fn run_shell(&self, command: &str) -> Result<CommandOutput>;

    /// Resolve an executable on PATH; errors when it cannot be found.
    fn find_bin(&self, name: &str) -> Result<PathBuf>;

    /// Warning sink. Warnings never abort the invocation.
    fn warn(&self, msg: &str);

    /// Look up an in-process package database binding by name.
    fn binding(&self, name: &str) -> Option<Arc<dyn PkgDbBinding>>;

    /// Whether this process is already the target of a runtime handoff.
    /// A process that has been handed off must never hand off again.
    fn has_respawned(&self) -> bool;

    /// Probe candidate alternate runtimes for one that can load the
    /// named binding, in order. Returns the first hit.
    fn probe_runtimes(&self, candidates: &[&str], binding: &str) -> Option<PathBuf>;

    /// Hand the rest of this invocation off to the given runtime. A real
    /// host does not return from this call on success: the handoff
    /// target produces all further output and the current process exits
    /// with its status.
    fn respawn(&self, runtime: &Path) -> Result<()>;
}

/// Standalone [`Host`] backed by `std::process` and `which`.
///
/// Native bindings can be registered by an embedding application via
/// [`SystemHost::with_binding`]; none are present by default, so the
/// binding-backed drivers (rpm, apt) report unavailable and warn when
/// their CLI counterpart exists. Runtime handoff is opt-in via
/// [`SystemHost::with_respawn`] because it re-executes the current
/// argv under the alternate runtime, which only makes sense when that
/// runtime accepts the same command line.
#[derive(Default)]
pub struct SystemHost {
    bindings: HashMap<String, Arc<dyn PkgDbBinding>>,
    allow_respawn: bool,
}

impl SystemHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_binding(mut self, name: impl Into<String>, binding: Arc<dyn PkgDbBinding>) -> Self {
        self.bindings.insert(name.into(), binding);
        self
    }

    pub fn with_respawn(mut self) -> Self {
        self.allow_respawn = true;
        self
    }
}

impl Host for SystemHost {
    fn run_command(&self, argv: &[&str], env: &[(&str, &str)]) -> Result<CommandOutput> {
        let (program, args) = argv.split_first().ok_or_else(|| PkgFactsError::CommandFailed {
            command: String::new(),
            reason: "empty argv".into(),
        })?;

        let mut cmd = Command::new(program);
        cmd.args(args);
        for (key, value) in env {
            cmd.env(key, value);
        }

        let output = cmd.output().map_err(|e| PkgFactsError::CommandFailed {
            command: argv.join(" "),
            reason: e.to_string(),
        })?;

        Ok(CommandOutput {
            rc: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn run_shell(&self, command: &str) -> Result<CommandOutput> {
        self.run_command(&["sh", "-c", command], &[])
    }

    fn find_bin(&self, name: &str) -> Result<PathBuf> {
        which::which(name).map_err(|_| PkgFactsError::DependencyMissing(name.to_string()))
    }

    fn warn(&self, msg: &str) {
        ui::warning(msg);
    }

    fn binding(&self, name: &str) -> Option<Arc<dyn PkgDbBinding>> {
        self.bindings.get(name).cloned()
    }

    fn has_respawned(&self) -> bool {
        !self.allow_respawn || std::env::var_os(RESPAWN_MARKER).is_some()
    }

    fn probe_runtimes(&self, candidates: &[&str], binding: &str) -> Option<PathBuf> {
        for candidate in candidates {
            let path = Path::new(candidate);
            if !path.exists() {
                continue;
            }
            let probe = Command::new(path)
                .arg("-c")
                .arg(format!("import {binding}"))
                .output();
            if let Ok(out) = probe
                && out.status.success()
            {
                return Some(path.to_path_buf());
            }
        }
        None
    }

    fn respawn(&self, runtime: &Path) -> Result<()> {
        if self.has_respawned() {
            return Err(PkgFactsError::Config(
                "process has already been handed off to an alternate runtime".into(),
            ));
        }

        let status = Command::new(runtime)
            .args(std::env::args_os().skip(1))
            .env(RESPAWN_MARKER, "1")
            .status()
            .map_err(|e| PkgFactsError::CommandFailed {
                command: runtime.display().to_string(),
                reason: e.to_string(),
            })?;

        // The handoff target has produced all output for this invocation.
        std::process::exit(status.code().unwrap_or(1));
    }
}
