//! Boot manager installation.
//!
//! [`InstallPlan::select`] maps every (firmware, configured boot manager)
//! combination to exactly one procedure. GRUB runs entirely inside the
//! installed system; the UEFI-native managers are installed from the host
//! against the mounted EFI system partition and get their entry files written
//! directly.

use std::fmt;

use log::info;

use crate::context::{FirmwareType, InstallContext};
use crate::entries::{self, BootEntry, EntryLayout, LoaderConfig};
use crate::error::BootError;
use crate::job_config::{BootManagerKind, EfiBootLoader};
use crate::process::{Cmd, CommandRunner};
use crate::resolve::{ConfigResolver, EntryKind};
use crate::timing::Timer;

/// Directory, relative to the EFI system partition, firmware falls back to.
pub const FALLBACK_DIR: &str = "EFI/boot";

/// Loader file name firmware looks for in [`FALLBACK_DIR`] on x86_64.
pub const FALLBACK_BINARY: &str = "bootx64.efi";

/// A UEFI boot manager that ships its own installer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeManager {
    /// Installer program, invoked as `<program> --path=<esp> install`.
    pub program: &'static str,
    /// Directory under `EFI/` the installer puts its binary in.
    pub directory: &'static str,
    /// File name of the installed 64-bit binary.
    pub binary: &'static str,
}

pub const SYSTEMD_BOOT: NativeManager = NativeManager {
    program: "bootctl",
    directory: "systemd",
    binary: "systemd-bootx64.efi",
};

pub const GUMMIBOOT: NativeManager = NativeManager {
    program: "gummiboot",
    directory: "gummiboot",
    binary: "gummibootx64.efi",
};

/// The installation procedure for one job run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallPlan {
    BiosGrub,
    EfiGrub,
    EfiNative(NativeManager),
}

impl InstallPlan {
    pub fn select(firmware: FirmwareType, loader: EfiBootLoader) -> Self {
        match (firmware, loader.kind()) {
            (FirmwareType::Bios, BootManagerKind::Grub) => Self::BiosGrub,
            (FirmwareType::Bios, BootManagerKind::UefiNative) => Self::BiosGrub,
            (FirmwareType::Efi, BootManagerKind::Grub) => Self::EfiGrub,
            (FirmwareType::Efi, BootManagerKind::UefiNative) => Self::EfiNative(match loader {
                EfiBootLoader::Gummiboot => GUMMIBOOT,
                _ => SYSTEMD_BOOT,
            }),
        }
    }

    /// Run the procedure.
    pub fn execute(
        self,
        ctx: &InstallContext,
        resolver: &ConfigResolver<'_>,
        runner: &mut dyn CommandRunner,
    ) -> Result<(), BootError> {
        match self {
            Self::BiosGrub => install_grub_bios(ctx, resolver, runner),
            Self::EfiGrub => install_grub_efi(ctx, resolver, runner),
            Self::EfiNative(manager) => install_native(manager, ctx, resolver, runner),
        }
    }
}

impl fmt::Display for InstallPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BiosGrub => write!(f, "GRUB (i386-pc)"),
            Self::EfiGrub => write!(f, "GRUB (x86_64-efi)"),
            Self::EfiNative(manager) => write!(f, "{} (UEFI)", manager.program),
        }
    }
}

fn install_grub_bios(
    ctx: &InstallContext,
    resolver: &ConfigResolver<'_>,
    runner: &mut dyn CommandRunner,
) -> Result<(), BootError> {
    let grub_install = resolver.resolve("grubInstall")?;
    let install_path = ctx.bios_install_path()?;
    info!("Installing GRUB for BIOS on {}", install_path);

    Cmd::new(&grub_install)
        .args(["--target=i386-pc", "--recheck", install_path])
        .in_target(&ctx.root_mount_point)
        .run(runner)?;

    grub_mkconfig(ctx, resolver, runner)
}

fn install_grub_efi(
    ctx: &InstallContext,
    resolver: &ConfigResolver<'_>,
    runner: &mut dyn CommandRunner,
) -> Result<(), BootError> {
    let grub_install = resolver.resolve("grubInstall")?;
    let efi_directory = ctx.efi_directory()?;
    let bootloader_id = resolver.efi_bootloader_id()?;
    info!("Installing GRUB for UEFI as \"{}\"", bootloader_id);

    Cmd::new("mkdir")
        .args(["-p", efi_directory])
        .in_target(&ctx.root_mount_point)
        .run(runner)?;

    Cmd::new(&grub_install)
        .arg("--target=x86_64-efi")
        .arg(format!("--efi-directory={}", efi_directory))
        .arg(format!("--bootloader-id={}", bootloader_id))
        .in_target(&ctx.root_mount_point)
        .run(runner)?;

    install_fallback_loader(ctx, efi_directory, &bootloader_id, "grubx64.efi", runner)?;
    grub_mkconfig(ctx, resolver, runner)
}

fn grub_mkconfig(
    ctx: &InstallContext,
    resolver: &ConfigResolver<'_>,
    runner: &mut dyn CommandRunner,
) -> Result<(), BootError> {
    let grub_mkconfig = resolver.resolve("grubMkconfig")?;
    let grub_cfg = resolver.resolve("grubCfg")?;

    Cmd::new(&grub_mkconfig)
        .args(["-o", &grub_cfg])
        .in_target(&ctx.root_mount_point)
        .run(runner)?;
    Ok(())
}

fn install_native(
    manager: NativeManager,
    ctx: &InstallContext,
    resolver: &ConfigResolver<'_>,
    runner: &mut dyn CommandRunner,
) -> Result<(), BootError> {
    let efi_directory = ctx.efi_directory()?;
    let esp = ctx.target_path(efi_directory);

    // Everything the entries need is resolved before the ESP is touched.
    let entry_name = resolver.entry_name()?;
    let kernel = resolver.resolve("kernel")?;
    let img = resolver.resolve("img")?;
    let timeout = resolver.timeout()?;
    let root_uuid = ctx.root_uuid()?;
    let swap_uuid = ctx.swap_uuid();
    info!("Installing {} into {}", manager.program, esp.display());

    Cmd::new(manager.program)
        .arg(format!("--path={}", esp.display()))
        .arg("install")
        .run(runner)?;

    install_fallback_loader(ctx, efi_directory, manager.directory, manager.binary, runner)?;

    let timer = Timer::start("Write boot entries");
    let layout = EntryLayout::new(&esp, &entry_name);
    for kind in [EntryKind::Default, EntryKind::Fallback] {
        let title = format!("{}{}", entry_name, resolver.kernel_line(kind));
        let entry = BootEntry::new(kind, &title, &kernel, &img, root_uuid, swap_uuid);
        entries::write_boot_entry(layout.entry_path(kind), &entry)?;
    }
    entries::write_loader_config(&layout.loader_conf, &LoaderConfig::new(&timeout, &entry_name))?;
    timer.finish();
    Ok(())
}

/// Copy the installed loader to the removable-media path, for firmware that
/// ignores registered boot entries.
fn install_fallback_loader(
    ctx: &InstallContext,
    efi_directory: &str,
    directory: &str,
    binary: &str,
    runner: &mut dyn CommandRunner,
) -> Result<(), BootError> {
    let esp = efi_directory.trim_end_matches('/');
    let fallback_dir = format!("{}/{}", esp, FALLBACK_DIR);

    Cmd::new("mkdir")
        .args(["-p", &fallback_dir])
        .in_target(&ctx.root_mount_point)
        .run(runner)?;

    Cmd::new("cp")
        .arg(format!("{}/EFI/{}/{}", esp, directory, binary))
        .arg(format!("{}/{}", fallback_dir, FALLBACK_BINARY))
        .in_target(&ctx.root_mount_point)
        .run(runner)?;
    Ok(())
}
