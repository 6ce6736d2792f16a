use std::fmt;
use std::str::FromStr;

use super::error::DriverError;

/// First release that accepts the `*medium` subcommand spellings.
pub const MEDIUM_VERBS_SINCE: Version = Version { major: 5, minor: 0 };

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
}

impl Version {
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl FromStr for Version {
    type Err = DriverError;

    /// Accepts `VBoxManage --version` output such as `7.0.14r161095`
    /// as well as plain `6.1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut parts = trimmed.split(|c: char| !c.is_ascii_digit());
        let major = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(|| DriverError::UnknownVersion(trimmed.to_string()))?;
        let minor = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
        Ok(Version { major, minor })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Medium subcommand names for one VirtualBox release line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediumCommands {
    pub clone: &'static str,
    pub modify: &'static str,
    pub show_info: &'static str,
}

const MEDIUM: MediumCommands = MediumCommands {
    clone: "clonemedium",
    modify: "modifymedium",
    show_info: "showmediuminfo",
};

const LEGACY_HD: MediumCommands = MediumCommands {
    clone: "clonehd",
    modify: "modifyhd",
    show_info: "showhdinfo",
};

impl MediumCommands {
    pub fn for_version(version: Version) -> Self {
        if version >= MEDIUM_VERBS_SINCE {
            MEDIUM
        } else {
            LEGACY_HD
        }
    }
}
