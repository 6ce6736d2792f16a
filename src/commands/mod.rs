use anyhow::{Context, Result};

use crate::config::VBoxManageConfig;
use crate::vbox::manage::{DEFAULT_RETRIES, DEFAULT_RETRY_DELAY};
use crate::vbox::{VBoxManage, Version};

pub mod disks;
pub mod info;
pub mod resize;

/// Build the `VBoxManage` driver and settle which release it talks to.
pub fn connect(config: &VBoxManageConfig) -> Result<(VBoxManage, Version)> {
    let program = VBoxManage::locate(config.path.as_deref());
    let vbox = VBoxManage::new(program).with_retries(
        config.retries.unwrap_or(DEFAULT_RETRIES),
        config.retry_delay.unwrap_or(DEFAULT_RETRY_DELAY),
    );

    let version = match config.version.as_deref() {
        Some(v) => v
            .parse::<Version>()
            .with_context(|| format!("invalid vboxmanage.version: {v}"))?,
        None => vbox.version().with_context(|| {
            format!(
                "failed to detect VirtualBox version via {}",
                vbox.program().display()
            )
        })?,
    };
    log::debug!("Using {} (VirtualBox {})", vbox.program().display(), version);
    Ok((vbox, version))
}
