use anyhow::Result;

use crate::disk::list_disks;
use crate::vbox::Driver;

pub fn disks<D: Driver>(driver: &D, machine: &str, json: bool) -> Result<()> {
    let disks = list_disks(driver, machine)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&disks)?);
        return Ok(());
    }

    if disks.is_empty() {
        println!("No hard disks attached to {}.", machine);
        return Ok(());
    }

    for (idx, disk) in disks.iter().enumerate() {
        println!(
            "{:>3} {:<24} {:<38} {}",
            idx,
            disk.name,
            disk.uuid,
            disk.file
        );
    }
    Ok(())
}
