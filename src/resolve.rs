//! Two-tier lookup of boot settings: job configuration first, then branding.
//!
//! Only keys in [`BRANDING_FALLBACK_KEYS`] may fall back to branding. Anything
//! else missing from the job configuration is a [`BootError::MissingConfig`].

use crate::context::Branding;
use crate::entries::sanitize_entry_name;
use crate::error::BootError;
use crate::job_config::{EfiBootLoader, JobConfig};

/// Keys allowed to fall back to the branding section.
pub const BRANDING_FALLBACK_KEYS: &[&str] = &["bootloaderEntryName", "efiBootloaderId"];

/// Suffix of the fallback entry title when the job does not configure one.
pub const DEFAULT_FALLBACK_KERNEL_LINE: &str = " (fallback)";

/// Which of the two generated boot entries a setting is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Default,
    Fallback,
}

/// Resolves settings for one job run.
#[derive(Debug, Clone, Copy)]
pub struct ConfigResolver<'a> {
    job: &'a JobConfig,
    branding: &'a Branding,
}

impl<'a> ConfigResolver<'a> {
    pub fn new(job: &'a JobConfig, branding: &'a Branding) -> Self {
        Self { job, branding }
    }

    /// Resolve `key`, falling back to branding where that is allowed.
    pub fn resolve(&self, key: &str) -> Result<String, BootError> {
        if let Some(value) = self.job.get(key) {
            return Ok(value.to_string());
        }

        if BRANDING_FALLBACK_KEYS.contains(&key) {
            if let Some(name) = &self.branding.bootloader_entry_name {
                return Ok(match key {
                    "efiBootloaderId" => sanitize_entry_name(name),
                    _ => name.clone(),
                });
            }
        }

        Err(BootError::missing(key))
    }

    /// Human-readable distribution name used in entry titles.
    pub fn entry_name(&self) -> Result<String, BootError> {
        self.resolve("bootloaderEntryName")
    }

    /// Firmware-visible identifier, always safe to use as a directory name.
    pub fn efi_bootloader_id(&self) -> Result<String, BootError> {
        self.resolve("efiBootloaderId").map(|id| sanitize_entry_name(&id))
    }

    /// Suffix appended to the entry title for `kind`.
    pub fn kernel_line(&self, kind: EntryKind) -> String {
        let (key, default) = match kind {
            EntryKind::Default => ("kernelLine", ""),
            EntryKind::Fallback => ("fallbackKernelLine", DEFAULT_FALLBACK_KERNEL_LINE),
        };
        self.resolve(key).unwrap_or_else(|_| default.to_string())
    }

    pub fn timeout(&self) -> Result<String, BootError> {
        self.resolve("timeout")
    }

    /// The UEFI boot manager; GRUB when the job does not say.
    pub fn efi_boot_loader(&self) -> EfiBootLoader {
        self.job.efi_boot_loader.unwrap_or(EfiBootLoader::Grub)
    }
}
