//! Preflight command - runs preflight checks.

use anyhow::Result;

use crate::config::Config;
use crate::context::FirmwareType;
use crate::preflight;

/// Execute the preflight command.
pub fn cmd_preflight(config: &Config, firmware: Option<FirmwareType>, strict: bool) -> Result<()> {
    if strict {
        preflight::run_preflight_or_fail(config, firmware)?;
    } else {
        let report = preflight::run_preflight(config, firmware);
        report.print();
        if !report.all_passed() {
            println!("Some checks failed. Use --strict to fail with a non-zero exit code.");
        }
    }
    Ok(())
}
