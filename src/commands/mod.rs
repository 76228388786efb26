//! CLI command handlers.
//!
//! Each submodule handles a specific CLI command:
//! - `run` - Install and configure the boot loader
//! - `show` - Display configuration or the install plan
//! - `preflight` - Run preflight checks

mod preflight;
mod run;
pub mod show;

pub use preflight::cmd_preflight;
pub use run::cmd_run;
pub use show::cmd_show;
