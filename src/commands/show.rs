//! Show command - displays information.

use anyhow::{anyhow, Result};

use crate::config::Config;
use crate::context::{FirmwareType, InstallContext};
use crate::job;
use crate::job_config::JobConfig;

/// Show target for the show command.
pub enum ShowTarget {
    /// Show configuration
    Config,
    /// Show what a run would do
    Plan { firmware: Option<FirmwareType> },
}

/// Execute the show command.
pub fn cmd_show(config: &Config, target: ShowTarget) -> Result<()> {
    match target {
        ShowTarget::Config => config.print(),
        ShowTarget::Plan { firmware } => {
            let ctx = InstallContext::load(&config.context_path)?;
            let job_config = JobConfig::load(&config.job_path)?;
            let firmware = firmware.unwrap_or(ctx.firmware_type);

            let preview = job::preview(firmware, &ctx, &job_config)
                .map_err(|failure| anyhow!("Cannot plan boot loader installation: {}", failure))?;

            println!("Install plan:");
            println!("  Firmware: {}", preview.firmware);
            println!("  Boot manager: {}", preview.plan);
            println!(
                "  Boot partition: {} on {} (mounted at {})",
                preview.boot.partition_number, preview.boot.device, preview.boot.mount_point
            );
            println!("  Files:");
            for file in &preview.files {
                println!("    {}", file.display());
            }
        }
    }
    Ok(())
}
