//! VirtualBox management layer
//!
//! - `manage`: `VBoxManage` process driver
//! - `version`: version detection and subcommand spellings
//! - `error`: driver failures

pub mod error;
pub mod manage;
pub mod version;

pub use error::DriverError;
pub use manage::VBoxManage;
pub use version::{MediumCommands, Version};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecOptions {
    /// The call is read-only and may be repeated on transient failure.
    pub retryable: bool,
}

impl ExecOptions {
    pub fn retryable() -> Self {
        Self { retryable: true }
    }
}

/// Runs management subcommands and hands back their stdout.
pub trait Driver {
    fn execute(
        &self,
        subcommand: &str,
        args: &[&str],
        options: ExecOptions,
    ) -> Result<String, DriverError>;
}

impl<D: Driver + ?Sized> Driver for &D {
    fn execute(
        &self,
        subcommand: &str,
        args: &[&str],
        options: ExecOptions,
    ) -> Result<String, DriverError> {
        (**self).execute(subcommand, args, options)
    }
}
