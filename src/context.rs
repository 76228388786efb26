//! The install context: a read-only snapshot of the installer's shared state.
//!
//! Loaded once from a JSON document using the same keys the installer's
//! shared store uses (`rootMountPoint`, `partitions`, `firmwareType`, ...).

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::BootError;
use crate::partition;

/// How the machine boots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FirmwareType {
    Bios,
    Efi,
}

impl fmt::Display for FirmwareType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bios => write!(f, "bios"),
            Self::Efi => write!(f, "efi"),
        }
    }
}

impl std::str::FromStr for FirmwareType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "bios" => Ok(Self::Bios),
            "efi" => Ok(Self::Efi),
            other => Err(format!("unknown firmware type '{}' (expected bios or efi)", other)),
        }
    }
}

/// One entry of the partition list produced by the partitioning job.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionRecord {
    pub mount_point: String,
    pub device: String,
    #[serde(rename = "fs", alias = "filesystem")]
    pub filesystem: String,
    #[serde(default)]
    pub uuid: String,
}

/// Where a legacy BIOS GRUB gets installed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootLoaderLocation {
    pub install_path: String,
}

/// Distribution branding values shared by all jobs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branding {
    pub bootloader_entry_name: Option<String>,
}

/// Shared state consumed by the boot loader job.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallContext {
    pub root_mount_point: PathBuf,
    pub firmware_type: FirmwareType,
    #[serde(default)]
    pub efi_system_partition: Option<String>,
    #[serde(default)]
    pub boot_loader: Option<BootLoaderLocation>,
    #[serde(default)]
    pub branding: Branding,
    #[serde(default)]
    pub partitions: Vec<PartitionRecord>,
}

impl InstallContext {
    /// Load the snapshot from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read install context {}", path.display()))?;
        Self::from_json(&json)
            .with_context(|| format!("Failed to parse install context {}", path.display()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Mount point of the EFI system partition, relative to the target root.
    pub fn efi_directory(&self) -> Result<&str, BootError> {
        self.efi_system_partition
            .as_deref()
            .ok_or_else(|| BootError::missing("efiSystemPartition"))
    }

    /// Device GRUB is written to on BIOS systems.
    pub fn bios_install_path(&self) -> Result<&str, BootError> {
        self.boot_loader
            .as_ref()
            .map(|b| b.install_path.as_str())
            .ok_or_else(|| BootError::missing("bootLoader.installPath"))
    }

    /// UUID of the partition mounted at `/`.
    pub fn root_uuid(&self) -> Result<&str, BootError> {
        partition::require_partition(&self.partitions, "/").map(|p| p.uuid.as_str())
    }

    /// UUID of the swap partition, or an empty string if there is none.
    ///
    /// The last swap partition listed wins.
    pub fn swap_uuid(&self) -> &str {
        self.partitions
            .iter()
            .rev()
            .find(|p| p.filesystem == partition::SWAP_FILESYSTEM)
            .map_or("", |p| p.uuid.as_str())
    }

    /// Translate an absolute path inside the installed system to a host path.
    pub fn target_path(&self, path: &str) -> PathBuf {
        self.root_mount_point.join(path.trim_start_matches('/'))
    }
}
