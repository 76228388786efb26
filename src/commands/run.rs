//! Run command - installs and configures the boot loader.

use anyhow::{anyhow, Result};

use crate::config::Config;
use crate::context::{FirmwareType, InstallContext};
use crate::job;
use crate::job_config::JobConfig;
use crate::process::HostRunner;

/// Execute the run command.
///
/// `firmware` overrides the firmware type recorded in the install context.
pub fn cmd_run(config: &Config, firmware: Option<FirmwareType>) -> Result<()> {
    let ctx = InstallContext::load(&config.context_path)?;
    let job_config = JobConfig::load(&config.job_path)?;
    let firmware = firmware.unwrap_or(ctx.firmware_type);

    let mut runner = HostRunner::new(&config.chroot_program);
    job::run(firmware, &ctx, &job_config, &mut runner)
        .map_err(|failure| anyhow!("Boot loader installation failed: {}", failure))?;

    println!("Boot loader installed.");
    Ok(())
}
