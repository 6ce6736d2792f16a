use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

const MIB: u64 = 1 << 20;
const SCALES: [&str; 4] = ["KB", "MB", "GB", "TB"];

static SIZE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?<number>[0-9]+)\s?(?<scale>KB|MB|GB|TB)?$").expect("size pattern")
});

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SizeSpecError {
    #[error("'{0}' is not a valid specification of disk size")]
    Invalid(String),

    #[error("'{0}' is too large")]
    Overflow(String),
}

/// A human disk size such as `20GB`, `500 MB` or a bare byte count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeSpec {
    raw: String,
    number: u64,
    scale: Option<usize>,
}

impl SizeSpec {
    pub fn parse(input: &str) -> Result<Self, SizeSpecError> {
        let raw = input.trim();
        let caps = SIZE_REGEX
            .captures(raw)
            .ok_or_else(|| SizeSpecError::Invalid(raw.to_string()))?;
        let number = caps["number"]
            .parse()
            .map_err(|_| SizeSpecError::Overflow(raw.to_string()))?;
        let scale = caps
            .name("scale")
            .and_then(|m| SCALES.iter().position(|s| *s == m.as_str()));
        Ok(Self {
            raw: raw.to_string(),
            number,
            scale,
        })
    }

    pub fn bytes(&self) -> Result<u64, SizeSpecError> {
        let multiplier = match self.scale {
            Some(pos) => 1u64 << (10 * (pos as u32 + 1)),
            None => 1,
        };
        self.number
            .checked_mul(multiplier)
            .ok_or_else(|| SizeSpecError::Overflow(self.raw.clone()))
    }

    /// Whole megabytes, rounded up.
    pub fn megabytes(&self) -> Result<u64, SizeSpecError> {
        Ok(self.bytes()?.div_ceil(MIB))
    }
}

impl FromStr for SizeSpec {
    type Err = SizeSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SizeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
