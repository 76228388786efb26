//! Partition list lookups and device path splitting.

use crate::context::PartitionRecord;
use crate::error::BootError;

/// Filesystem name the partitioning job uses for swap.
pub const SWAP_FILESYSTEM: &str = "linuxswap";

/// Device name prefixes whose partitions are separated from the disk by `p`
/// (`/dev/nvme0n1p2`, `/dev/mmcblk0p1`, `/dev/loop0p1`).
const P_SEPARATED_FAMILIES: &[&str] = &["nvme", "mmcblk", "loop", "nbd", "md"];

/// First partition mounted exactly at `mount_point`.
pub fn find_partition<'a>(
    partitions: &'a [PartitionRecord],
    mount_point: &str,
) -> Option<&'a PartitionRecord> {
    partitions.iter().find(|p| p.mount_point == mount_point)
}

/// Like [`find_partition`], but a missing mount point is an error.
pub fn require_partition<'a>(
    partitions: &'a [PartitionRecord],
    mount_point: &str,
) -> Result<&'a PartitionRecord, BootError> {
    find_partition(partitions, mount_point).ok_or_else(|| BootError::PartitionNotFound {
        mount_point: mount_point.to_string(),
    })
}

/// Split a partition device path into its disk and partition number.
///
/// `/dev/sda1` gives `("/dev/sda", "1")` and `/dev/nvme0n1p12` gives
/// `("/dev/nvme0n1", "12")`. Fails when either half would be empty, or when a
/// `p`-separated device has no `p` (it names a whole disk, e.g. `/dev/nvme0n1`).
pub fn split_device(device: &str) -> Result<(String, String), BootError> {
    let fail = |base: &str, number: &str| BootError::DeviceParse {
        device: device.to_string(),
        base: base.to_string(),
        number: number.to_string(),
    };

    let base_len = device.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    let (base, number) = device.split_at(base_len);

    if base.is_empty() || number.is_empty() {
        return Err(fail(base, number));
    }

    let name = base.rsplit('/').next().unwrap_or(base);
    if P_SEPARATED_FAMILIES.iter().any(|f| name.starts_with(f)) {
        return match base.strip_suffix('p') {
            Some(disk) if disk.ends_with(|c: char| c.is_ascii_digit()) => {
                Ok((disk.to_string(), number.to_string()))
            }
            _ => Err(fail(device, "")),
        };
    }

    Ok((base.to_string(), number.to_string()))
}
