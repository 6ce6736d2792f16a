use anyhow::{Context, Result};

use crate::disk::{is_supported_provider, GrowthOutcome, ResizeDisk};
use crate::notify::{Notice, Notifier};
use crate::vbox::{Driver, ExecOptions, Version};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeOptions {
    pub machine: String,
    /// Target size in MB; nothing is resized when unset.
    pub requested_mb: Option<u64>,
    pub start: bool,
    pub headless: bool,
}

/// Whether disks of machines under `provider` can be resized at all.
/// Reports an unsupported provider to the user.
pub fn check_provider(provider: &str, notifier: &dyn Notifier) -> bool {
    if is_supported_provider(provider) {
        return true;
    }
    notifier.notify(&Notice::UnsupportedProvider {
        provider: provider.to_string(),
    });
    false
}

/// Pre-boot step: grow the disk, then boot the machine if asked to.
///
/// A failed resize is reported and does not stop the boot; its error is
/// returned once the machine has been started.
pub fn run<D: Driver>(
    driver: &D,
    version: Version,
    options: &ResizeOptions,
    notifier: &dyn Notifier,
) -> Result<Option<GrowthOutcome>> {
    let resized = resize_disk(driver, version, options, notifier);
    if let Err(e) = &resized {
        log::error!("Disk resize failed for {}: {:#}", options.machine, e);
    }

    if options.start {
        start_vm(driver, &options.machine, options.headless)?;
    }

    resized
}

fn resize_disk<D: Driver>(
    driver: &D,
    version: Version,
    options: &ResizeOptions,
    notifier: &dyn Notifier,
) -> Result<Option<GrowthOutcome>> {
    let Some(requested_mb) = options.requested_mb else {
        log::info!("No disk size requested for {}", options.machine);
        return Ok(None);
    };

    let outcome = ResizeDisk::new(driver, options.machine.as_str(), version)
        .ensure_resizable_and_grow(requested_mb, notifier)
        .with_context(|| format!("failed to resize disk of {}", options.machine))?;
    Ok(Some(outcome))
}

fn start_vm<D: Driver>(driver: &D, machine: &str, headless: bool) -> Result<()> {
    let kind = if headless { "headless" } else { "gui" };
    log::info!("Starting {} ({})", machine, kind);
    driver
        .execute("startvm", &[machine, "--type", kind], ExecOptions::default())
        .with_context(|| format!("failed to start {machine}"))?;
    Ok(())
}
