//! Configuration management for bootinst.
//!
//! Reads configuration from .env file and environment variables.
//! Environment variables take precedence over .env file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default file name of the install context document.
pub const DEFAULT_CONTEXT_FILE: &str = "context.json";

/// Default file name of the job configuration document.
pub const DEFAULT_JOB_FILE: &str = "bootloader.json";

/// Variable holding the log filter.
pub const LOG_ENV: &str = "BOOTINST_LOG";

/// Log filter used when `BOOTINST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Bootinst configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Install context snapshot (default: context.json)
    pub context_path: PathBuf,
    /// Job configuration (default: bootloader.json)
    pub job_path: PathBuf,
    /// Program used for chroot-scoped commands (default: chroot)
    pub chroot_program: String,
    /// env_logger filter (default: info)
    pub log_filter: String,
}

impl Config {
    /// Load configuration from .env file and environment.
    ///
    /// Relative paths are resolved against `base_dir`.
    pub fn load(base_dir: &Path) -> Self {
        let mut env_vars = HashMap::new();

        if let Ok(entries) = dotenvy::from_path_iter(base_dir.join(".env")) {
            env_vars.extend(entries.flatten());
        }

        // Environment variables override .env file
        env_vars.extend(std::env::vars());

        Self::from_vars(base_dir, &env_vars)
    }

    /// Build config from an already merged variable set, with defaults.
    pub fn from_vars(base_dir: &Path, env_vars: &HashMap<String, String>) -> Self {
        let path_var = |key: &str, default: &str| {
            let path = PathBuf::from(env_vars.get(key).map_or(default, String::as_str));
            if path.is_absolute() {
                path
            } else {
                base_dir.join(path)
            }
        };

        Self {
            context_path: path_var("BOOTINST_CONTEXT", DEFAULT_CONTEXT_FILE),
            job_path: path_var("BOOTINST_JOB", DEFAULT_JOB_FILE),
            chroot_program: env_vars
                .get("BOOTINST_CHROOT")
                .cloned()
                .unwrap_or_else(|| "chroot".to_string()),
            log_filter: env_vars
                .get(LOG_ENV)
                .cloned()
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        }
    }

    /// Print configuration for debugging.
    pub fn print(&self) {
        println!("Configuration:");
        println!("  BOOTINST_CONTEXT: {}", self.context_path.display());
        println!("  BOOTINST_JOB: {}", self.job_path.display());
        println!("  BOOTINST_CHROOT: {}", self.chroot_program);
        println!("  {}: {}", LOG_ENV, self.log_filter);
        let documents = [
            ("Install context", &self.context_path),
            ("Job configuration", &self.job_path),
        ];
        for (name, path) in documents {
            if path.exists() {
                println!("  {}: FOUND", name);
            } else {
                println!("  {}: NOT FOUND", name);
            }
        }
    }
}
