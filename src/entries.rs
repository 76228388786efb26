//! Boot entry and loader configuration files for the UEFI-native boot manager.
//!
//! Example entry:
//!
//! ```text
//! ## This is just an example config file.
//! ## Please edit the paths and kernel parameters according to your system.
//!
//! title   My Distro
//! linux   /vmlinuz-linux
//! initrd  /initramfs-linux.img
//! options root=UUID=AAAA-BBBB quiet resume=UUID= rw
//! ```

use std::path::{Path, PathBuf};

use log::info;

use crate::common::write_file_atomic;
use crate::error::BootError;
use crate::resolve::EntryKind;

/// Make an entry name usable as a file name: ` ` becomes `_`, `/` becomes `-`.
pub fn sanitize_entry_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            ' ' => '_',
            '/' => '-',
            other => other,
        })
        .collect()
}

/// A single bootable menu choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootEntry {
    pub title: String,
    pub kernel_path: String,
    pub initrd_path: String,
    pub options: String,
    pub is_fallback: bool,
}

impl BootEntry {
    /// Entry booting `kernel`/`initrd` from the root filesystem `root_uuid`.
    ///
    /// `swap_uuid` is empty when the system has no swap partition.
    pub fn new(
        kind: EntryKind,
        title: &str,
        kernel: &str,
        initrd: &str,
        root_uuid: &str,
        swap_uuid: &str,
    ) -> Self {
        Self {
            title: title.to_string(),
            kernel_path: kernel.to_string(),
            initrd_path: initrd.to_string(),
            options: format!("root=UUID={} quiet resume=UUID={} rw", root_uuid, swap_uuid),
            is_fallback: kind == EntryKind::Fallback,
        }
    }

    /// Render the entry file.
    pub fn to_entry_file(&self) -> String {
        format!(
            "## This is just an example config file.\n\
             ## Please edit the paths and kernel parameters according to your system.\n\
             \n\
             title   {}\n\
             linux   {}\n\
             initrd  {}\n\
             options {}\n",
            self.title, self.kernel_path, self.initrd_path, self.options
        )
    }
}

/// The boot manager's top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    pub timeout: String,
    /// Sanitized name of the default entry.
    pub default: String,
}

impl LoaderConfig {
    pub fn new(timeout: &str, entry_name: &str) -> Self {
        Self {
            timeout: timeout.to_string(),
            default: sanitize_entry_name(entry_name),
        }
    }

    pub fn to_loader_conf(&self) -> String {
        format!("timeout {}\ndefault {}\n", self.timeout, self.default)
    }
}

/// Host paths of the files written into the EFI system partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryLayout {
    pub default_entry: PathBuf,
    pub fallback_entry: PathBuf,
    pub loader_conf: PathBuf,
}

impl EntryLayout {
    /// Layout under `esp` (a host path) for the entry named `entry_name`.
    pub fn new(esp: &Path, entry_name: &str) -> Self {
        let loader = esp.join("loader");
        let entries = loader.join("entries");
        let file_stem = sanitize_entry_name(entry_name);
        Self {
            default_entry: entries.join(format!("{}.conf", file_stem)),
            fallback_entry: entries.join(format!("{}-fallback.conf", file_stem)),
            loader_conf: loader.join("loader.conf"),
        }
    }

    pub fn entry_path(&self, kind: EntryKind) -> &Path {
        match kind {
            EntryKind::Default => &self.default_entry,
            EntryKind::Fallback => &self.fallback_entry,
        }
    }
}

/// Write `entry` to `path`, replacing any existing file.
pub fn write_boot_entry(path: &Path, entry: &BootEntry) -> Result<(), BootError> {
    info!("Configure: \"{}\"", entry.title);
    write_config(path, entry.to_entry_file())
}

/// Write the loader configuration to `path`, replacing any existing file.
pub fn write_loader_config(path: &Path, config: &LoaderConfig) -> Result<(), BootError> {
    write_config(path, config.to_loader_conf())
}

fn write_config(path: &Path, content: String) -> Result<(), BootError> {
    write_file_atomic(path, content).map_err(|source| BootError::ConfigWrite {
        path: path.to_path_buf(),
        source,
    })
}
