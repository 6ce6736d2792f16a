use std::path::Path;
use thiserror::Error;

use super::inventory::list_disks;
use super::types::{DiskDescriptor, GrowthOutcome};
use super::utils::{growable_counterpart, parse_capacity, parse_slot};
use crate::notify::{Notice, Notifier};
use crate::vbox::{Driver, DriverError, ExecOptions, MediumCommands, Version};

#[derive(Error, Debug)]
pub enum ResizeError {
    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error("machine {0} has no hard disk attached")]
    NoDisks(String),

    #[error("could not read the capacity of {0}")]
    CapacityUnknown(String),

    #[error("invalid attachment slot: {0}")]
    InvalidSlot(String),
}

/// Whether a provider name refers to VirtualBox.
pub fn is_supported_provider(provider: &str) -> bool {
    provider.to_ascii_lowercase().contains("virtualbox")
}

/// Grows the first hard disk of one machine, converting it to VDI first when
/// its current format cannot be resized in place.
///
/// Only the first disk reported by VirtualBox is considered.
pub struct ResizeDisk<D> {
    driver: D,
    machine_id: String,
    commands: MediumCommands,
}

impl<D: Driver> ResizeDisk<D> {
    pub fn new(driver: D, machine_id: impl Into<String>, version: Version) -> Self {
        Self {
            driver,
            machine_id: machine_id.into(),
            commands: MediumCommands::for_version(version),
        }
    }

    pub fn identify_disks(&self) -> Result<Vec<DiskDescriptor>, DriverError> {
        list_disks(&self.driver, &self.machine_id)
    }

    /// The disk to resize, freshly read from VirtualBox.
    pub fn target(&self) -> Result<DiskDescriptor, ResizeError> {
        self.identify_disks()?
            .into_iter()
            .next()
            .ok_or_else(|| ResizeError::NoDisks(self.machine_id.clone()))
    }

    pub fn ensure_resizable_and_grow(
        &self,
        requested_mb: u64,
        notifier: &dyn Notifier,
    ) -> Result<GrowthOutcome, ResizeError> {
        self.ensure_resizable()?;
        let outcome = self.resize(requested_mb)?;
        match outcome {
            GrowthOutcome::Grown {
                old_mb,
                new_mb,
                requested_mb,
            } => notifier.notify(&Notice::Resized {
                old_mb,
                requested_mb,
                new_mb,
            }),
            GrowthOutcome::ShrinkRejected {
                current_mb,
                requested_mb,
            } => notifier.notify(&Notice::ShrinkRejected {
                current_mb,
                requested_mb,
            }),
            GrowthOutcome::Unchanged { .. } => {}
        }
        Ok(outcome)
    }

    /// Make sure the attached disk is a VDI, cloning and swapping it in if
    /// not. Returns the descriptor of the disk that is now growable.
    pub fn ensure_resizable(&self) -> Result<DiskDescriptor, ResizeError> {
        let old_disk = self.target()?;
        if old_disk.is_growable() {
            return Ok(old_disk);
        }

        let new_disk = growable_counterpart(&old_disk);
        if Path::new(&new_disk.file).exists() {
            log::info!(
                "{} already exists, skipping conversion of {}",
                new_disk.file,
                old_disk.file
            );
            return Ok(new_disk);
        }

        // Each step depends on the previous one; stop at the first failure.
        self.clone_as_vdi(&old_disk, &new_disk)?;
        self.attach_disk(&new_disk)?;
        self.remove_disk(&old_disk)?;
        Ok(new_disk)
    }

    /// Grow the attached disk to `requested_mb`. Never shrinks.
    pub fn resize(&self, requested_mb: u64) -> Result<GrowthOutcome, ResizeError> {
        let target = self.target()?;
        let old_mb = self.disk_size(&target)?;

        if old_mb < requested_mb {
            self.grow_vdi(&target, requested_mb)?;
            let new_mb = self.disk_size(&target)?;
            Ok(GrowthOutcome::Grown {
                old_mb,
                new_mb,
                requested_mb,
            })
        } else if old_mb > requested_mb {
            Ok(GrowthOutcome::ShrinkRejected {
                current_mb: old_mb,
                requested_mb,
            })
        } else {
            log::debug!("{} is already {} MB", target.file, old_mb);
            Ok(GrowthOutcome::Unchanged { size_mb: old_mb })
        }
    }

    pub fn disk_size(&self, disk: &DiskDescriptor) -> Result<u64, ResizeError> {
        let info = self.driver.execute(
            self.commands.show_info,
            &[disk.file.as_str()],
            ExecOptions::default(),
        )?;
        parse_capacity(&info).ok_or_else(|| ResizeError::CapacityUnknown(disk.file.clone()))
    }

    fn clone_as_vdi(&self, src: &DiskDescriptor, dst: &DiskDescriptor) -> Result<(), ResizeError> {
        log::info!("Cloning {} to {}", src.file, dst.file);
        self.driver.execute(
            self.commands.clone,
            &[src.file.as_str(), dst.file.as_str(), "--format", "VDI"],
            ExecOptions::default(),
        )?;
        Ok(())
    }

    fn attach_disk(&self, disk: &DiskDescriptor) -> Result<(), ResizeError> {
        let slot = parse_slot(&disk.name).ok_or_else(|| ResizeError::InvalidSlot(disk.name.clone()))?;
        log::info!("Attaching {} at {}", disk.file, disk.name);
        self.driver.execute(
            "storageattach",
            &[
                self.machine_id.as_str(),
                "--storagectl",
                slot.controller.as_str(),
                "--port",
                slot.port.as_str(),
                "--device",
                slot.device.as_str(),
                "--type",
                "hdd",
                "--medium",
                disk.file.as_str(),
            ],
            ExecOptions::default(),
        )?;
        Ok(())
    }

    fn remove_disk(&self, disk: &DiskDescriptor) -> Result<(), ResizeError> {
        log::info!("Removing {}", disk.file);
        self.driver
            .execute("closemedium", &[disk.file.as_str(), "--delete"], ExecOptions::default())?;
        Ok(())
    }

    fn grow_vdi(&self, disk: &DiskDescriptor, size_mb: u64) -> Result<(), ResizeError> {
        let size = size_mb.to_string();
        self.driver.execute(
            self.commands.modify,
            &[disk.file.as_str(), "--resize", size.as_str()],
            ExecOptions::default(),
        )?;
        Ok(())
    }
}
