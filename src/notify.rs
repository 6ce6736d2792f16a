use std::fmt;

pub const FILESYSTEM_ADVISORY: &str = "You may need to resize the filesystem from within the guest.";

/// Something the user should hear about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Resized {
        old_mb: u64,
        requested_mb: u64,
        new_mb: u64,
    },
    ShrinkRejected {
        current_mb: u64,
        requested_mb: u64,
    },
    UnsupportedProvider {
        provider: String,
    },
}

impl Notice {
    pub fn is_error(&self) -> bool {
        !matches!(self, Notice::Resized { .. })
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Resized {
                old_mb,
                requested_mb,
                new_mb,
            } => write!(
                f,
                "Resized disk: old {old_mb} MB, req {requested_mb} MB, new {new_mb} MB"
            ),
            Notice::ShrinkRejected {
                current_mb,
                requested_mb,
            } => write!(
                f,
                "Disk cannot be decreased in size. {requested_mb} MB requested but disk is already {current_mb} MB."
            ),
            Notice::UnsupportedProvider { provider } => write!(
                f,
                "disksize only supports VirtualBox at present, not '{provider}'. Disk size will not be changed."
            ),
        }
    }
}

pub trait Notifier {
    fn notify(&self, notice: &Notice);
}

/// Reports notices through the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: &Notice) {
        if notice.is_error() {
            log::error!("{notice}");
        } else {
            log::info!("{notice}");
            log::info!("{FILESYSTEM_ADVISORY}");
        }
    }
}
