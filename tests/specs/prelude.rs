//! Shared helpers for CLI specs.
//!
//! Every [`Project`] gets its own state directory, and therefore its own
//! daemon, socket and journal. The daemon is stopped when the project drops.

use assert_cmd::assert::Assert;
use predicates::prelude::*;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command as StdCommand;
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// Upper bound for anything that waits on the daemon
pub const SPEC_WAIT_MAX_MS: u64 = 5000;

/// Per-command timeout so a hung daemon fails one test instead of the run
const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Directory holding freshly built `kord` and `kordd` binaries.
///
/// Uses the workspace target dir when both binaries exist there, else builds
/// them into a separate target dir (the outer cargo holds the main one).
fn bin_dir() -> &'static Path {
    static DIR: OnceLock<PathBuf> = OnceLock::new();
    DIR.get_or_init(|| {
        let kord = assert_cmd::cargo::cargo_bin("kord");
        if let Some(dir) = kord.parent() {
            if kord.exists() && dir.join("kordd").exists() {
                return dir.to_path_buf();
            }
        }

        let root = Path::new(env!("CARGO_MANIFEST_DIR"));
        let target = root.join("target").join("specs");
        let cargo = std::env::var("CARGO").unwrap_or_else(|_| "cargo".to_string());
        let status = StdCommand::new(cargo)
            .args(["build", "--quiet", "-p", "kord", "-p", "kord-daemon"])
            .env("CARGO_TARGET_DIR", &target)
            .current_dir(root)
            .status()
            .expect("failed to run cargo build for spec binaries");
        assert!(status.success(), "building kord binaries failed");
        target.join("debug")
    })
}

/// An isolated kord installation: state dir, socket dir, and daemon
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// The daemon state directory (`--state-dir`)
    pub fn state_path(&self) -> PathBuf {
        self.dir.path().join("state")
    }

    /// Write a file relative to the state directory
    pub fn file(&self, rel: &str, content: &str) {
        let path = self.state_path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    /// A `kord` invocation bound to this project
    pub fn kord(&self) -> CliBuilder {
        let mut cmd = assert_cmd::Command::new(bin_dir().join("kord"));
        cmd.env("KORD_STATE_DIR", self.state_path())
            .env("KORD_SOCKET_DIR", self.path())
            .env("KORD_DAEMON_BINARY", bin_dir().join("kordd"))
            .env_remove("KORD_NAMESPACE")
            .env_remove("RUST_LOG")
            .current_dir(self.path())
            .timeout(COMMAND_TIMEOUT);
        CliBuilder { cmd }
    }

    /// The daemon log, or empty if it doesn't exist yet
    pub fn daemon_log(&self) -> String {
        std::fs::read_to_string(self.state_path().join("daemon.log")).unwrap_or_default()
    }
}

impl Drop for Project {
    fn drop(&mut self) {
        let _ = self.kord().args(&["daemon", "stop"]).cmd.output();
    }
}

pub struct CliBuilder {
    cmd: assert_cmd::Command,
}

impl CliBuilder {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<OsStr>) -> Self {
        self.cmd.env(key, value);
        self
    }

    /// Run and require exit status 0
    pub fn passes(mut self) -> RunAssert {
        RunAssert(self.cmd.assert().success())
    }

    /// Run and require a non-zero exit status
    pub fn fails(mut self) -> RunAssert {
        RunAssert(self.cmd.assert().failure())
    }
}

pub struct RunAssert(Assert);

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.0.get_output().stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.0.get_output().stderr).into_owned()
    }

    pub fn stdout_has(self, expected: &str) -> Self {
        Self(self.0.stdout(predicate::str::contains(expected)))
    }

    pub fn stdout_lacks(self, unexpected: &str) -> Self {
        Self(self.0.stdout(predicate::str::contains(unexpected).not()))
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        Self(self.0.stderr(predicate::str::contains(expected)))
    }

    pub fn stderr_lacks(self, unexpected: &str) -> Self {
        Self(self.0.stderr(predicate::str::contains(unexpected).not()))
    }
}

/// Poll `check` until it holds or `max_ms` passes
pub fn wait_for(max_ms: u64, mut check: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_millis(max_ms);
    loop {
        if check() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
}
