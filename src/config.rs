use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::size::{SizeSpec, SizeSpecError};
use crate::vbox::manage::{DEFAULT_RETRIES, DEFAULT_RETRY_DELAY};

pub const CONFIG_FILE: &str = ".disksize.toml";
pub const DEFAULT_PROVIDER: &str = "virtualbox";
pub const VALIDATION_SECTION: &str = "Disksize configuration";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disksize: Option<DisksizeConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine: Option<MachineConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vboxmanage: Option<VBoxManageConfig>,
}

/// Requested disk size, either `"20GB"`-style text or a byte count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawSize {
    Text(String),
    Bytes(u64),
}

impl RawSize {
    fn as_text(&self) -> String {
        match self {
            RawSize::Text(s) => s.clone(),
            RawSize::Bytes(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DisksizeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<RawSize>,
}

impl DisksizeConfig {
    pub fn with_size(size: impl Into<String>) -> Self {
        Self {
            size: Some(RawSize::Text(size.into())),
        }
    }

    /// Problems with the configured values; empty when valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if let Some(size) = &self.size
            && let Err(e) = SizeSpec::parse(&size.as_text()).and_then(|s| s.megabytes())
        {
            errors.push(e.to_string());
        }
        errors
    }

    /// The requested size in whole megabytes, or `None` when unset.
    pub fn finalize(&self) -> Result<Option<u64>, SizeSpecError> {
        match &self.size {
            Some(size) => Ok(Some(SizeSpec::parse(&size.as_text())?.megabytes()?)),
            None => Ok(None),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MachineConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VBoxManageConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Skip `VBoxManage --version` and assume this release, e.g. `"6.1"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "humantime_serde")]
    pub retry_delay: Option<Duration>,
}

impl VBoxManageConfig {
    pub fn with_defaults() -> Self {
        Self {
            path: None,
            version: None,
            retries: Some(DEFAULT_RETRIES),
            retry_delay: Some(DEFAULT_RETRY_DELAY),
        }
    }

    /// Command line values take precedence over the file.
    pub fn merge_cli(mut self, path: Option<PathBuf>, version: Option<String>) -> Self {
        if path.is_some() {
            self.path = path;
        }
        if version.is_some() {
            self.version = version;
        }
        self
    }
}

impl AppConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load `path` if it exists.
    pub fn load_optional(path: impl AsRef<Path>) -> anyhow::Result<Option<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from_file(path).map(Some)
    }

    pub fn generate_config_file(path: impl AsRef<Path>, force: bool) -> anyhow::Result<()> {
        let config_path = path.as_ref();

        if config_path.exists() && !force {
            anyhow::bail!(
                "Configuration file {} already exists. Use --force to overwrite.",
                config_path.display()
            );
        }

        fs::write(config_path, Self::generate_full_config()?)?;

        info!("Configuration file generated: {}", config_path.display());
        info!("Please edit this file to customize configuration");
        Ok(())
    }

    pub fn generate_full_config() -> anyhow::Result<String> {
        let config = AppConfig {
            disksize: Some(DisksizeConfig::with_size("40GB")),
            machine: Some(MachineConfig {
                name: None,
                provider: Some(DEFAULT_PROVIDER.to_string()),
            }),
            vboxmanage: Some(VBoxManageConfig::with_defaults()),
        };
        let toml_content = toml::to_string_pretty(&config)?;
        Ok(format!(
            "# disksize configuration file\n# All fields are optional, command line arguments override config file values\n# size accepts a byte count or a number with KB, MB, GB or TB\n\n{}",
            toml_content
        ))
    }
}
