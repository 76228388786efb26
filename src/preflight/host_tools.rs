//! Tool availability checks, on the host and inside the target root.

use std::path::Path;

use crate::context::{FirmwareType, InstallContext};
use crate::install::InstallPlan;
use crate::resolve::ConfigResolver;

use super::types::CheckResult;

/// Tools the job needs regardless of firmware or boot manager.
pub fn check_common_tools(chroot_program: &str) -> Vec<CheckResult> {
    vec![check_tool_exists(
        chroot_program,
        "Required to run GRUB inside the installed system",
        true,
    )]
}

/// Tools the selected firmware branch and boot manager need.
pub fn check_plan_tools(
    firmware: FirmwareType,
    plan: InstallPlan,
    ctx: &InstallContext,
    resolver: &ConfigResolver<'_>,
) -> Vec<CheckResult> {
    let mut results = Vec::new();

    match firmware {
        FirmwareType::Efi => results.push(check_tool_exists(
            "sgdisk",
            "Required to set the ESP type code (package: gptfdisk)",
            true,
        )),
        FirmwareType::Bios => results.push(check_tool_exists(
            "parted",
            "Required to inspect the disk label and set bios_grub",
            true,
        )),
    }

    match plan {
        InstallPlan::EfiNative(manager) => results.push(check_tool_exists(
            manager.program,
            "Required to install the UEFI boot manager",
            true,
        )),
        InstallPlan::BiosGrub | InstallPlan::EfiGrub => {
            for key in ["grubInstall", "grubMkconfig"] {
                match resolver.resolve(key) {
                    Ok(program) => results.push(check_target_tool(&ctx.root_mount_point, &program)),
                    Err(err) => results.push(CheckResult::fail(key, &err.to_string())),
                }
            }
        }
    }

    results
}

/// Check if a tool exists in PATH.
fn check_tool_exists(tool: &str, purpose: &str, required: bool) -> CheckResult {
    match which::which(tool) {
        Ok(path) => CheckResult::pass_with(tool, &path.display().to_string()),
        Err(_) => {
            let msg = format!("Not found in PATH. {}", purpose);
            if required {
                CheckResult::fail(tool, &msg)
            } else {
                CheckResult::warn(tool, &msg)
            }
        }
    }
}

/// Check that `program` is present inside the installed system.
///
/// Only warns: the target may not be mounted yet when preflight runs.
pub fn check_target_tool(root: &Path, program: &str) -> CheckResult {
    let candidates: Vec<_> = if program.starts_with('/') {
        vec![root.join(program.trim_start_matches('/'))]
    } else {
        ["usr/bin", "usr/sbin", "bin", "sbin"]
            .iter()
            .map(|dir| root.join(dir).join(program))
            .collect()
    };

    match candidates.iter().find(|p| p.is_file()) {
        Some(path) => CheckResult::pass_with(program, &path.display().to_string()),
        None => CheckResult::warn(
            program,
            &format!("Not found in target root {}", root.display()),
        ),
    }
}
