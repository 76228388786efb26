//! The boot loader job: prepare the boot partition, install the boot
//! manager, write its configuration.
//!
//! Each stage only starts once the previous one succeeded. Nothing is rolled
//! back on failure; the target is left as the last successful command left it.

use std::path::PathBuf;

use log::info;

use crate::context::{FirmwareType, InstallContext};
use crate::entries::EntryLayout;
use crate::error::JobFailure;
use crate::firmware::{self, PreparedBoot};
use crate::install::InstallPlan;
use crate::job_config::JobConfig;
use crate::process::CommandRunner;
use crate::resolve::{ConfigResolver, EntryKind};
use crate::timing::Timer;

/// Run the job for the firmware type recorded in the install context.
pub fn run_from_context(
    ctx: &InstallContext,
    job: &JobConfig,
    runner: &mut dyn CommandRunner,
) -> Result<(), JobFailure> {
    run(ctx.firmware_type, ctx, job, runner)
}

/// Run the job for `firmware`.
pub fn run(
    firmware: FirmwareType,
    ctx: &InstallContext,
    job: &JobConfig,
    runner: &mut dyn CommandRunner,
) -> Result<(), JobFailure> {
    let resolver = ConfigResolver::new(job, &ctx.branding);
    info!("Firmware type: {}", firmware);
    info!("Root mount point: \"{}\"", ctx.root_mount_point.display());

    let timer = Timer::start("Prepare boot partition");
    firmware::prepare(firmware, ctx, runner)?;
    timer.finish();

    let plan = InstallPlan::select(firmware, resolver.efi_boot_loader());
    info!("Boot manager: {}", plan);

    let timer = Timer::start("Install boot manager");
    plan.execute(ctx, &resolver, runner)?;
    timer.finish();

    Ok(())
}

/// What a run would do, computed without running anything.
#[derive(Debug, Clone)]
pub struct JobPreview {
    pub firmware: FirmwareType,
    pub plan: InstallPlan,
    pub boot: PreparedBoot,
    /// Configuration files the run writes or regenerates, as host paths.
    pub files: Vec<PathBuf>,
}

/// Resolve everything a run depends on and report it.
pub fn preview(
    firmware: FirmwareType,
    ctx: &InstallContext,
    job: &JobConfig,
) -> Result<JobPreview, JobFailure> {
    let resolver = ConfigResolver::new(job, &ctx.branding);
    let boot = firmware::locate(firmware, ctx)?;
    let plan = InstallPlan::select(firmware, resolver.efi_boot_loader());

    let files = match plan {
        InstallPlan::BiosGrub | InstallPlan::EfiGrub => {
            vec![ctx.target_path(&resolver.resolve("grubCfg")?)]
        }
        InstallPlan::EfiNative(_) => {
            let esp = ctx.target_path(ctx.efi_directory()?);
            let layout = EntryLayout::new(&esp, &resolver.entry_name()?);
            vec![
                layout.entry_path(EntryKind::Default).to_path_buf(),
                layout.entry_path(EntryKind::Fallback).to_path_buf(),
                layout.loader_conf,
            ]
        }
    };

    Ok(JobPreview {
        firmware,
        plan,
        boot,
        files,
    })
}
