use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use super::error::DriverError;
use super::version::Version;
use super::{Driver, ExecOptions};

#[cfg(windows)]
pub const EXECUTABLE: &str = "VBoxManage.exe";
#[cfg(not(windows))]
pub const EXECUTABLE: &str = "VBoxManage";

/// Environment variables set by the VirtualBox installers, checked in order.
pub const INSTALL_PATH_VARS: [&str; 2] = ["VBOX_MSI_INSTALL_PATH", "VBOX_INSTALL_PATH"];

pub const DEFAULT_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Drives the `VBoxManage` executable, one process per call.
#[derive(Debug, Clone)]
pub struct VBoxManage {
    program: PathBuf,
    retries: u32,
    retry_delay: Duration,
}

impl VBoxManage {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            retries: DEFAULT_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Attempts for retryable calls (at least one) and the pause between them.
    pub fn with_retries(mut self, retries: u32, retry_delay: Duration) -> Self {
        self.retries = retries.max(1);
        self.retry_delay = retry_delay;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Resolve the executable: an explicit path wins, then the installer
    /// directories, then whatever `VBoxManage` resolves to on `PATH`.
    pub fn locate(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        for var in INSTALL_PATH_VARS {
            let Some(dirs) = std::env::var_os(var) else {
                continue;
            };
            for dir in std::env::split_paths(&dirs) {
                let candidate = dir.join(EXECUTABLE);
                if candidate.is_file() {
                    return candidate;
                }
            }
        }
        PathBuf::from(EXECUTABLE)
    }

    pub fn version(&self) -> Result<Version, DriverError> {
        let output = self.execute("--version", &[], ExecOptions::retryable())?;
        // Kernel module warnings may precede the version line.
        output
            .lines()
            .rev()
            .find_map(|line| line.parse().ok())
            .ok_or_else(|| DriverError::UnknownVersion(output.trim().to_string()))
    }

    fn run_once(&self, subcommand: &str, args: &[&str]) -> Result<String, DriverError> {
        log::debug!(
            "{} {} {}",
            self.program.display(),
            subcommand,
            args.join(" ")
        );
        let output = Command::new(&self.program)
            .arg(subcommand)
            .args(args)
            .output()
            .map_err(|source| DriverError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(DriverError::CommandFailed {
                command: subcommand.to_string(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        String::from_utf8(output.stdout).map_err(|_| DriverError::InvalidOutput {
            command: subcommand.to_string(),
        })
    }
}

impl Driver for VBoxManage {
    fn execute(
        &self,
        subcommand: &str,
        args: &[&str],
        options: ExecOptions,
    ) -> Result<String, DriverError> {
        let attempts = if options.retryable { self.retries } else { 1 };
        let mut attempt = 1;
        loop {
            match self.run_once(subcommand, args) {
                Err(err @ DriverError::CommandFailed { .. }) if attempt < attempts => {
                    log::warn!(
                        "VBoxManage {} failed (attempt {}/{}), retrying: {}",
                        subcommand,
                        attempt,
                        attempts,
                        err
                    );
                    std::thread::sleep(self.retry_delay);
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}
