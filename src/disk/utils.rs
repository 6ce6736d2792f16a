use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

use super::types::{DiskDescriptor, GROWABLE_EXTENSION, PLACEHOLDER_UUID, Slot};

static CAPACITY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Capacity:\s+([0-9]+)\s+MB").expect("capacity pattern"));

static BACKSLASHES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\+").expect("backslash pattern"));

/// Strip one layer of surrounding double quotes.
pub fn unquoted(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(s)
}

/// Capacity in MB from medium info output; the last matching line wins.
pub fn parse_capacity(info: &str) -> Option<u64> {
    info.lines()
        .filter_map(|line| CAPACITY_REGEX.captures(line))
        .filter_map(|caps| caps[1].parse().ok())
        .last()
}

/// Split `<controller>-<port>-<device>`. Controller names may contain dashes.
pub fn parse_slot(name: &str) -> Option<Slot> {
    let mut parts = name.rsplitn(3, '-');
    let device = parts.next()?;
    let port = parts.next()?;
    let controller = parts.next()?;
    if controller.is_empty() || port.is_empty() || device.is_empty() {
        return None;
    }
    Some(Slot {
        controller: controller.to_string(),
        port: port.to_string(),
        device: device.to_string(),
    })
}

/// Same directory and base name as `disk`, with the growable extension and
/// no identity yet.
pub fn growable_counterpart(disk: &DiskDescriptor) -> DiskDescriptor {
    let normalized = BACKSLASHES.replace_all(&disk.file, "/");
    let path = Path::new(&*normalized);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file = match path.parent().map(|p| p.to_string_lossy()) {
        Some(dir) if !dir.is_empty() => {
            format!("{}/{stem}{GROWABLE_EXTENSION}", dir.trim_end_matches('/'))
        }
        _ => format!("./{stem}{GROWABLE_EXTENSION}"),
    };
    DiskDescriptor {
        uuid: PLACEHOLDER_UUID.to_string(),
        name: disk.name.clone(),
        file,
    }
}
