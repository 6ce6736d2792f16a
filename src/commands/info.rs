use anyhow::Result;
use serde::Serialize;

use crate::disk::ResizeDisk;
use crate::vbox::{Driver, Version};

#[derive(Serialize)]
pub struct TargetInfo {
    pub machine: String,
    pub name: String,
    pub file: String,
    pub capacity_mb: u64,
    pub growable: bool,
}

/// Describe the disk a resize would act on.
pub fn target_info<D: Driver>(driver: &D, machine: &str, version: Version) -> Result<TargetInfo> {
    let resizer = ResizeDisk::new(driver, machine, version);
    let target = resizer.target()?;
    let capacity_mb = resizer.disk_size(&target)?;
    Ok(TargetInfo {
        machine: machine.to_string(),
        growable: target.is_growable(),
        name: target.name,
        file: target.file,
        capacity_mb,
    })
}

pub fn info<D: Driver>(driver: &D, machine: &str, version: Version, json: bool) -> Result<()> {
    let info = target_info(driver, machine, version)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("Machine: {}", info.machine);
    println!("Disk: {} ({})", info.file, info.name);
    println!("Capacity: {} MB", info.capacity_mb);
    println!(
        "Format: {}",
        if info.growable {
            "VDI (growable)"
        } else {
            "not VDI, will be converted before resizing"
        }
    );
    Ok(())
}
