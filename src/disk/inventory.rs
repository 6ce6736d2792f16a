use std::collections::HashMap;

use super::types::{DiskDescriptor, MediumProbe};
use super::utils::unquoted;
use crate::vbox::{Driver, DriverError, ExecOptions};

const IMAGE_UUID_INFIX: &str = "-ImageUUID-";

/// Parsed `showvminfo --machinereadable` output.
///
/// Keys keep the position of their first appearance; a repeated key
/// overwrites the earlier value.
#[derive(Debug, Default, Clone)]
pub struct VmInfo {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl VmInfo {
    pub fn parse(text: &str) -> Self {
        let mut info = VmInfo::default();
        for line in text.split('\n') {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.is_empty() {
                continue;
            }
            let (key, value) = line.split_once('=').unwrap_or((line, ""));
            info.insert(unquoted(key), unquoted(value));
        }
        info
    }

    fn insert(&mut self, key: &str, value: &str) {
        match self.index.get(key) {
            Some(&pos) => self.entries[pos].1 = value.to_string(),
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), value.to_string()));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.index.get(key).map(|&pos| self.entries[pos].1.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

pub fn vm_info<D: Driver>(driver: &D, machine_id: &str) -> Result<VmInfo, DriverError> {
    let output = driver.execute(
        "showvminfo",
        &[machine_id, "--machinereadable"],
        ExecOptions::retryable(),
    )?;
    Ok(VmInfo::parse(&output))
}

/// Ask whether `uuid` names a hard disk medium.
pub fn probe_medium<D: Driver>(driver: &D, uuid: &str) -> MediumProbe {
    match driver.execute("showmediuminfo", &["disk", uuid], ExecOptions::default()) {
        Ok(_) => MediumProbe::Disk,
        Err(err) if err.is_object_not_found() => MediumProbe::NotADisk,
        Err(err) => MediumProbe::Inconclusive(err),
    }
}

/// Hard disks attached to the machine, in the order VirtualBox lists them.
pub fn list_disks<D: Driver>(
    driver: &D,
    machine_id: &str,
) -> Result<Vec<DiskDescriptor>, DriverError> {
    let info = vm_info(driver, machine_id)?;
    let mut disks = Vec::new();

    for (key, uuid) in info.iter().filter(|(k, _)| k.contains(IMAGE_UUID_INFIX)) {
        match probe_medium(driver, uuid) {
            MediumProbe::Disk => {}
            MediumProbe::NotADisk => {
                log::debug!("{key}: {uuid} is not a hard disk");
                continue;
            }
            MediumProbe::Inconclusive(err) => {
                log::warn!("{key}: could not confirm {uuid} is a hard disk, skipping: {err}");
                continue;
            }
        }

        let name = key.replacen(IMAGE_UUID_INFIX, "-", 1);
        let Some(file) = info.get(&name) else {
            log::warn!("{key}: no medium path recorded under {name}, skipping");
            continue;
        };
        disks.push(DiskDescriptor {
            uuid: uuid.to_string(),
            name,
            file: file.to_string(),
        });
    }

    Ok(disks)
}
