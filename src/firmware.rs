//! Boot partition preparation for the detected firmware.
//!
//! UEFI: the partition mounted at the EFI system partition path gets the ESP
//! type code (`EF00`). BIOS: on GPT disks the `/boot` partition (or `/` when
//! there is no separate `/boot`) gets the `bios_grub` flag; MBR disks need
//! nothing.

use log::{info, warn};

use crate::context::{FirmwareType, InstallContext};
use crate::error::{BootError, JobFailure};
use crate::partition::{find_partition, split_device};
use crate::process::{Cmd, CommandRunner};

/// GPT type code of an EFI system partition, as `sgdisk` spells it.
pub const ESP_TYPE_CODE: &str = "EF00";

/// The partition that was prepared for booting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedBoot {
    /// Mount point the partition was found at.
    pub mount_point: String,
    /// Disk holding the partition, e.g. `/dev/sda`.
    pub device: String,
    /// Partition number on that disk, e.g. `1`.
    pub partition_number: String,
}

/// Find the partition relevant for booting without touching the disk.
///
/// On failure the returned [`JobFailure`] carries the diagnostic lines an
/// installer shows: the directory that was searched and whatever partition
/// number and device could be determined.
pub fn locate(firmware: FirmwareType, ctx: &InstallContext) -> Result<PreparedBoot, JobFailure> {
    match firmware {
        FirmwareType::Efi => {
            let efi_directory = ctx.efi_directory()?;
            let partition = find_partition(&ctx.partitions, efi_directory)
                .ok_or_else(|| efi_failure(efi_directory, "", ""))?;
            let (device, number) = split_device(&partition.device)
                .map_err(|err| split_failure(&err, |b, n| efi_failure(efi_directory, n, b)))?;

            info!("EFI directory: \"{}\"", efi_directory);
            Ok(prepared(efi_directory, device, number))
        }
        FirmwareType::Bios => {
            let partition = find_partition(&ctx.partitions, "/boot")
                .or_else(|| find_partition(&ctx.partitions, "/"))
                .ok_or_else(|| bios_failure("", ""))?;
            let (device, number) =
                split_device(&partition.device).map_err(|err| split_failure(&err, bios_failure))?;

            Ok(prepared(&partition.mount_point, device, number))
        }
    }
}

/// Locate the boot partition and mark it for the firmware.
pub fn prepare(
    firmware: FirmwareType,
    ctx: &InstallContext,
    runner: &mut dyn CommandRunner,
) -> Result<PreparedBoot, JobFailure> {
    let boot = locate(firmware, ctx)?;
    info!("Boot partition: \"{}\"", boot.partition_number);
    info!("Boot device: \"{}\"", boot.device);

    match firmware {
        FirmwareType::Efi => set_esp_type_code(&boot, runner)?,
        FirmwareType::Bios => {
            if disk_uses_gpt(&boot.device, runner)? {
                set_bios_grub_flag(&boot, runner)?;
            } else {
                info!("{} is not a GPT disk, no bios_grub flag needed", boot.device);
            }
        }
    }

    Ok(boot)
}

fn set_esp_type_code(boot: &PreparedBoot, runner: &mut dyn CommandRunner) -> Result<(), BootError> {
    Cmd::new("sgdisk")
        .arg(format!("--typecode={}:{}", boot.partition_number, ESP_TYPE_CODE))
        .arg(&boot.device)
        .error_msg(format!(
            "Failed to set ESP type code on {} partition {}",
            boot.device, boot.partition_number
        ))
        .run(runner)?;
    Ok(())
}

fn set_bios_grub_flag(boot: &PreparedBoot, runner: &mut dyn CommandRunner) -> Result<(), BootError> {
    Cmd::new("parted")
        .arg(&boot.device)
        .args(["set", &boot.partition_number, "bios_grub", "on"])
        .error_msg(format!(
            "Failed to set bios_grub on {} partition {}",
            boot.device, boot.partition_number
        ))
        .run(runner)?;
    Ok(())
}

/// Ask `parted` for the partition table of `device` and check for GPT.
fn disk_uses_gpt(device: &str, runner: &mut dyn CommandRunner) -> Result<bool, BootError> {
    let listing = Cmd::new("parted")
        .arg(device)
        .arg("--list")
        .allow_fail()
        .run(runner)?;
    if !listing.success() {
        warn!(
            "parted --list exited with {:?}, inspecting partial output",
            listing.code
        );
    }
    Ok(partition_table_type(&listing.stdout, device) == Some("gpt"))
}

/// Partition table type reported for `disk` in `parted --list` output.
///
/// `parted --list` prints every disk it can see, so the table line is taken
/// from the `Disk <disk>:` section. If that section has no table line the
/// type is unknown. The first table line in the output is used only when
/// `disk` does not appear at all.
pub fn partition_table_type<'a>(listing: &'a str, disk: &str) -> Option<&'a str> {
    let mut in_disk = false;
    let mut first_table = None;

    for line in listing.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("Disk ") {
            if let Some((name, _)) = rest.split_once(':') {
                if name != "Flags" {
                    if in_disk {
                        return None;
                    }
                    in_disk = name.trim() == disk;
                }
            }
        } else if let Some(table) = line.strip_prefix("Partition Table:") {
            let table = table.trim();
            if in_disk {
                return Some(table);
            }
            first_table.get_or_insert(table);
        }
    }

    if in_disk {
        None
    } else {
        first_table
    }
}

fn prepared(mount_point: &str, device: String, partition_number: String) -> PreparedBoot {
    PreparedBoot {
        mount_point: mount_point.to_string(),
        device,
        partition_number,
    }
}

fn efi_failure(efi_directory: &str, number: &str, device: &str) -> JobFailure {
    JobFailure::new(format!("EFI directory \"{}\" not found!", efi_directory))
        .with_detail(format!("Boot partition: \"{}\"", number))
        .with_detail(format!("Boot device: \"{}\"", device))
}

fn bios_failure(device: &str, number: &str) -> JobFailure {
    JobFailure::new(format!("Boot partition: \"{}\"", number))
        .with_detail(format!("Boot device: \"{}\"", device))
}

/// Turn a split error into a diagnostic failure built by `make(base, number)`.
fn split_failure(err: &BootError, make: impl Fn(&str, &str) -> JobFailure) -> JobFailure {
    match err {
        BootError::DeviceParse { base, number, .. } => make(base, number).with_detail(err.to_string()),
        other => make("", "").with_detail(other.to_string()),
    }
}
