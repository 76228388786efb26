//! Configuration document of the boot loader job.
//!
//! Every key is optional at parse time. Whether a key is required is decided
//! by [`crate::resolve::ConfigResolver`] at the point it is needed, so a BIOS
//! install never trips over a missing UEFI-only key.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

/// Which boot manager to install on UEFI machines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EfiBootLoader {
    Grub,
    #[serde(alias = "uefi-native")]
    SystemdBoot,
    Gummiboot,
}

/// Coarse classification used by the dispatch in [`crate::install`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootManagerKind {
    Grub,
    UefiNative,
}

impl EfiBootLoader {
    pub fn kind(self) -> BootManagerKind {
        match self {
            Self::Grub => BootManagerKind::Grub,
            Self::SystemdBoot | Self::Gummiboot => BootManagerKind::UefiNative,
        }
    }
}

impl fmt::Display for EfiBootLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grub => write!(f, "grub"),
            Self::SystemdBoot => write!(f, "systemd-boot"),
            Self::Gummiboot => write!(f, "gummiboot"),
        }
    }
}

/// The job configuration as written by the distribution.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobConfig {
    pub bootloader_entry_name: Option<String>,
    pub kernel_line: Option<String>,
    pub fallback_kernel_line: Option<String>,
    pub kernel: Option<String>,
    pub img: Option<String>,
    #[serde(default, deserialize_with = "number_or_string")]
    pub timeout: Option<String>,
    pub efi_boot_loader: Option<EfiBootLoader>,
    pub efi_bootloader_id: Option<String>,
    pub grub_install: Option<String>,
    pub grub_mkconfig: Option<String>,
    pub grub_cfg: Option<String>,
}

impl JobConfig {
    /// Load the job configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read job configuration {}", path.display()))?;
        Self::from_json(&json)
            .with_context(|| format!("Failed to parse job configuration {}", path.display()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Look up a string-valued key by its configuration name.
    pub fn get(&self, key: &str) -> Option<&str> {
        let value = match key {
            "bootloaderEntryName" => &self.bootloader_entry_name,
            "kernelLine" => &self.kernel_line,
            "fallbackKernelLine" => &self.fallback_kernel_line,
            "kernel" => &self.kernel,
            "img" => &self.img,
            "timeout" => &self.timeout,
            "efiBootloaderId" => &self.efi_bootloader_id,
            "grubInstall" => &self.grub_install,
            "grubMkconfig" => &self.grub_mkconfig,
            "grubCfg" => &self.grub_cfg,
            _ => return None,
        };
        value.as_deref()
    }
}

/// Accept `"timeout": 5` as well as `"timeout": "5"`. Numbers are kept as
/// written, so `-1` and `5.0` pass through unchanged.
fn number_or_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(D::Error::custom(format!(
            "expected a number or a string, found {}",
            other
        ))),
    }
}
