//! Bootinst - unattended boot loader installation.
//!
//! Prepares the boot partition of a freshly deployed system, installs GRUB or
//! a UEFI-native boot manager and writes the boot configuration:
//! - UEFI: ESP type code, GRUB (x86_64-efi) or systemd-boot/gummiboot
//! - BIOS: bios_grub flag on GPT disks, GRUB (i386-pc)

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;

use bootinst::commands;
use bootinst::config::{Config, LOG_ENV};
use bootinst::context::FirmwareType;

#[derive(Parser)]
#[command(name = "bootinst")]
#[command(about = "Unattended boot loader installation")]
#[command(
    after_help = "QUICK START:\n  bootinst preflight  Check tools and input documents\n  bootinst show plan  Show what would be done\n  bootinst run        Install the boot loader"
)]
struct Cli {
    /// Install context document (default: $BOOTINST_CONTEXT or context.json)
    #[arg(long, global = true)]
    context: Option<PathBuf>,

    /// Job configuration document (default: $BOOTINST_JOB or bootloader.json)
    #[arg(long, global = true)]
    job: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install and configure the boot loader
    Run {
        /// Firmware type to install for (default: from the install context)
        #[arg(long)]
        firmware: Option<FirmwareType>,
    },

    /// Show information
    Show {
        #[command(subcommand)]
        what: ShowTarget,
    },

    /// Run preflight checks (verify tools and documents before installing)
    Preflight {
        /// Firmware type to check for (default: from the install context)
        #[arg(long)]
        firmware: Option<FirmwareType>,

        /// Fail if any checks fail (exit code 1)
        #[arg(long)]
        strict: bool,
    },
}

#[derive(Subcommand)]
enum ShowTarget {
    /// Show current configuration
    Config,
    /// Show the install plan without running anything
    Plan {
        /// Firmware type to plan for (default: from the install context)
        #[arg(long)]
        firmware: Option<FirmwareType>,
    },
}

/// Log `[LEVEL file:line] - message` lines to stderr.
///
/// `BOOTINST_LOG` takes an env_logger filter, e.g. `info,bootinst::process=debug`.
fn init_logging(default_filter: &str) {
    let env = Env::default().filter_or(LOG_ENV, default_filter);
    let mut builder = env_logger::Builder::from_env(env);
    builder.format(|buf, record| {
        writeln!(
            buf,
            "[{} {}:{}] - {}",
            record.level(),
            record.file().unwrap_or_default(),
            record.line().unwrap_or_default(),
            record.args()
        )
    });
    builder.init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let base_dir = std::env::current_dir()?;

    // Load .env if present
    dotenvy::dotenv().ok();
    let mut config = Config::load(&base_dir);
    if let Some(context) = cli.context {
        config.context_path = context;
    }
    if let Some(job) = cli.job {
        config.job_path = job;
    }

    init_logging(&config.log_filter);

    match cli.command {
        Commands::Run { firmware } => {
            commands::cmd_run(&config, firmware)?;
        }

        Commands::Show { what } => {
            let show_target = match what {
                ShowTarget::Config => commands::show::ShowTarget::Config,
                ShowTarget::Plan { firmware } => commands::show::ShowTarget::Plan { firmware },
            };
            commands::cmd_show(&config, show_target)?;
        }

        Commands::Preflight { firmware, strict } => {
            commands::cmd_preflight(&config, firmware, strict)?;
        }
    }

    Ok(())
}
