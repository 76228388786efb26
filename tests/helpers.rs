//! Shared test utilities for bootinst tests.

#![allow(dead_code)]

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bootinst::context::InstallContext;
use bootinst::job_config::JobConfig;
use bootinst::process::{CommandResult, CommandRunner, Invocation, Scope};
use tempfile::TempDir;

/// `parted --list` output for a GPT disk at /dev/sda.
pub const GPT_LISTING: &str = "\
Model: ATA VBOX HARDDISK (scsi)
Disk /dev/sda: 21.5GB
Sector size (logical/physical): 512B/512B
Partition Table: gpt
Disk Flags:

Number  Start   End     Size    File system  Name  Flags
 1      1049kB  2097kB  1049kB                     bios_grub
 2      2097kB  21.5GB  21.5GB  ext4
";

/// `parted --list` output for an MBR disk at /dev/sda.
pub const MSDOS_LISTING: &str = "\
Model: ATA VBOX HARDDISK (scsi)
Disk /dev/sda: 21.5GB
Sector size (logical/physical): 512B/512B
Partition Table: msdos
Disk Flags:
";

/// A scripted reply for invocations of `program` whose arguments contain `arg`.
struct Reply {
    program: String,
    arg: Option<String>,
    result: io::Result<CommandResult>,
}

/// Records every invocation and answers with scripted results.
///
/// Unscripted invocations succeed with empty output.
#[derive(Default)]
pub struct FakeRunner {
    pub invocations: Vec<Invocation>,
    replies: Vec<Reply>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every invocation of `program` with `result`.
    pub fn reply(mut self, program: &str, result: CommandResult) -> Self {
        self.replies.push(Reply {
            program: program.to_string(),
            arg: None,
            result: Ok(result),
        });
        self
    }

    /// Answer invocations of `program` that include `arg` with `result`.
    pub fn reply_when(mut self, program: &str, arg: &str, result: CommandResult) -> Self {
        self.replies.push(Reply {
            program: program.to_string(),
            arg: Some(arg.to_string()),
            result: Ok(result),
        });
        self
    }

    /// Make `program` fail to start, as if it were not installed.
    pub fn missing(mut self, program: &str) -> Self {
        self.replies.push(Reply {
            program: program.to_string(),
            arg: None,
            result: Err(io::Error::new(io::ErrorKind::NotFound, "not found")),
        });
        self
    }

    /// Invocations rendered as `[scope] program args...`.
    pub fn lines(&self) -> Vec<String> {
        self.invocations
            .iter()
            .map(|inv| match &inv.scope {
                Scope::Host => format!("host: {}", inv.command_line()),
                Scope::Target(_) => format!("target: {}", inv.command_line()),
            })
            .collect()
    }

    pub fn programs(&self) -> Vec<&str> {
        self.invocations.iter().map(|i| i.program.as_str()).collect()
    }
}

impl CommandRunner for FakeRunner {
    fn execute(&mut self, invocation: &Invocation) -> io::Result<CommandResult> {
        self.invocations.push(invocation.clone());

        let reply = self.replies.iter().find(|r| {
            r.program == invocation.program
                && r.arg.as_ref().map_or(true, |a| invocation.args.contains(a))
        });
        match reply {
            Some(Reply { result: Ok(result), .. }) => Ok(result.clone()),
            Some(Reply { result: Err(err), .. }) => Err(io::Error::new(err.kind(), err.to_string())),
            None => Ok(CommandResult::ok("")),
        }
    }
}

/// A temporary target root plus helpers to describe the installed system.
pub struct TestEnv {
    /// Temporary directory (kept alive for lifetime of TestEnv)
    pub _temp_dir: TempDir,
    /// Mounted root of the installed system
    pub root: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().join("target");
        fs::create_dir_all(&root).expect("Failed to create target root");
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    /// Install context for this root with the given firmware and partitions.
    ///
    /// `partitions` is a JSON array body, e.g.
    /// `{ "mountPoint": "/", "device": "/dev/sda2", "fs": "ext4", "uuid": "R" }`.
    pub fn context(&self, firmware: &str, partitions: &str) -> InstallContext {
        let json = format!(
            r#"{{
                "rootMountPoint": "{}",
                "firmwareType": "{}",
                "efiSystemPartition": "/boot/efi",
                "bootLoader": {{ "installPath": "/dev/sda" }},
                "branding": {{ "bootloaderEntryName": "My Distro" }},
                "partitions": [{}]
            }}"#,
            self.root.display(),
            firmware,
            partitions
        );
        InstallContext::from_json(&json).expect("Failed to parse test context")
    }

    /// Host path of an absolute path inside the target.
    pub fn path(&self, target_path: &str) -> PathBuf {
        self.root.join(target_path.trim_start_matches('/'))
    }
}

/// A typical UEFI disk: ESP on /dev/sda1, root on /dev/sda2.
pub const EFI_PARTITIONS: &str = r#"
    { "mountPoint": "/boot/efi", "device": "/dev/sda1", "fs": "fat32", "uuid": "ESP-UUID" },
    { "mountPoint": "/", "device": "/dev/sda2", "fs": "ext4", "uuid": "AAAA-BBBB" }
"#;

/// A BIOS disk with root only.
pub const BIOS_PARTITIONS: &str = r#"
    { "mountPoint": "/", "device": "/dev/sda1", "fs": "ext4", "uuid": "AAAA-BBBB" }
"#;

/// Job configuration selecting `efi_boot_loader`.
pub fn job_config(efi_boot_loader: &str) -> JobConfig {
    let json = format!(
        r#"{{
            "efiBootLoader": "{}",
            "kernel": "/vmlinuz-linux",
            "img": "/initramfs-linux.img",
            "timeout": 5,
            "grubInstall": "grub-install",
            "grubMkconfig": "grub-mkconfig",
            "grubCfg": "/boot/grub/grub.cfg"
        }}"#,
        efi_boot_loader
    );
    JobConfig::from_json(&json).expect("Failed to parse test job config")
}

/// Assert that a file has exactly the expected content.
pub fn assert_file_eq(path: &Path, expected: &str) {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read file {}: {}", path.display(), e));
    assert_eq!(content, expected, "Unexpected content in {}", path.display());
}
