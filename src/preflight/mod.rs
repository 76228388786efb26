//! Preflight checks for a boot loader job.
//!
//! Validates the input documents and the tools the selected procedure needs
//! before anything touches the disk. Run with `bootinst preflight`.

mod host_tools;
mod types;

use anyhow::{bail, Result};
use log::info;

use crate::config::Config;
use crate::context::{FirmwareType, InstallContext};
use crate::install::InstallPlan;
use crate::job_config::JobConfig;
use crate::resolve::ConfigResolver;

pub use types::{CheckResult, CheckStatus, PreflightReport};

/// Run all preflight checks.
pub fn run_preflight(config: &Config, firmware: Option<FirmwareType>) -> PreflightReport {
    let mut checks = Vec::new();

    info!("Checking input documents...");
    let ctx = match InstallContext::load(&config.context_path) {
        Ok(ctx) => {
            checks.push(CheckResult::pass_with(
                "Install context",
                &config.context_path.display().to_string(),
            ));
            Some(ctx)
        }
        Err(err) => {
            checks.push(CheckResult::fail("Install context", &format!("{:#}", err)));
            None
        }
    };
    let job = match JobConfig::load(&config.job_path) {
        Ok(job) => {
            checks.push(CheckResult::pass_with(
                "Job configuration",
                &config.job_path.display().to_string(),
            ));
            Some(job)
        }
        Err(err) => {
            checks.push(CheckResult::fail("Job configuration", &format!("{:#}", err)));
            None
        }
    };

    info!("Checking host tools...");
    checks.extend(host_tools::check_common_tools(&config.chroot_program));

    if let (Some(ctx), Some(job)) = (&ctx, &job) {
        let firmware = firmware.unwrap_or(ctx.firmware_type);
        let resolver = ConfigResolver::new(job, &ctx.branding);
        let plan = InstallPlan::select(firmware, resolver.efi_boot_loader());
        checks.push(CheckResult::pass_with("Install plan", &plan.to_string()));
        checks.extend(host_tools::check_plan_tools(firmware, plan, ctx, &resolver));
    }

    PreflightReport { checks }
}

/// Run preflight and bail if any checks fail.
pub fn run_preflight_or_fail(config: &Config, firmware: Option<FirmwareType>) -> Result<()> {
    let report = run_preflight(config, firmware);
    report.print();

    if !report.all_passed() {
        bail!(
            "Preflight failed: {} check(s) failed. Fix the issues above before installing.",
            report.fail_count()
        );
    }

    println!("All preflight checks passed!\n");
    Ok(())
}
