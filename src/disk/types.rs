use serde::Serialize;

use crate::vbox::DriverError;

/// Identity given to a medium that has not been created yet.
pub const PLACEHOLDER_UUID: &str = "(undefined)";

/// Extension of the growable container format.
pub const GROWABLE_EXTENSION: &str = ".vdi";

/// A storage medium attached to a machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiskDescriptor {
    pub uuid: String,
    /// `<controller>-<port>-<device>`
    pub name: String,
    pub file: String,
}

impl DiskDescriptor {
    pub fn is_growable(&self) -> bool {
        self.file.ends_with(GROWABLE_EXTENSION)
    }
}

/// Attachment point of a medium.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub controller: String,
    pub port: String,
    pub device: String,
}

/// Result of asking VirtualBox whether a UUID names a hard disk.
#[derive(Debug)]
pub enum MediumProbe {
    Disk,
    NotADisk,
    Inconclusive(DriverError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GrowthOutcome {
    Grown {
        old_mb: u64,
        new_mb: u64,
        requested_mb: u64,
    },
    ShrinkRejected {
        current_mb: u64,
        requested_mb: u64,
    },
    Unchanged {
        size_mb: u64,
    },
}
