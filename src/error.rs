//! Provides [`BootError`], the failure taxonomy of the boot loader job, and
//! [`JobFailure`], the value the job reports upward.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// An error raised by one of the job's stages.
#[derive(Error, Debug)]
pub enum BootError {
    /// A required configuration key is absent and has no fallback.
    #[error("missing configuration key '{key}'")]
    MissingConfig {
        /// The key that was looked up.
        key: String,
    },

    /// No partition is mounted at a mount point the job depends on.
    #[error("no partition is mounted at \"{mount_point}\"")]
    PartitionNotFound {
        /// The mount point that was searched for.
        mount_point: String,
    },

    /// A device path could not be split into a disk and a partition number.
    #[error("cannot split device \"{device}\" (disk: \"{base}\", partition: \"{number}\")")]
    DeviceParse {
        /// The device path as listed in the partition table.
        device: String,
        /// What was left of the disk part.
        base: String,
        /// What was left of the partition number.
        number: String,
    },

    /// An external tool failed to start or exited non-zero.
    #[error("{message}")]
    ExternalCommand {
        /// The program that was invoked.
        program: String,
        /// Exit code, or `None` when the process never ran or died by signal.
        code: Option<i32>,
        /// Human-readable description including captured stderr.
        message: String,
    },

    /// A boot configuration file could not be written.
    #[error("failed to write {}: {source}", path.display())]
    ConfigWrite {
        /// Destination of the write.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}

impl BootError {
    pub(crate) fn missing(key: &str) -> Self {
        Self::MissingConfig {
            key: key.to_string(),
        }
    }
}

/// The failure value reported by the job entrypoint.
///
/// Mirrors what an installer front-end displays: a short message plus any
/// diagnostic lines that were assembled while the failure was detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFailure {
    pub message: String,
    pub details: Vec<String>,
}

impl JobFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.details.push(detail.into());
        self
    }
}

impl fmt::Display for JobFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        for detail in &self.details {
            write!(f, "\n  {}", detail)?;
        }
        Ok(())
    }
}

impl std::error::Error for JobFailure {}

impl From<BootError> for JobFailure {
    fn from(err: BootError) -> Self {
        let message = match &err {
            BootError::MissingConfig { .. } => "Bootloader configuration is incomplete",
            BootError::PartitionNotFound { .. } => "Boot partition not found",
            BootError::DeviceParse { .. } => "Boot device could not be determined",
            BootError::ExternalCommand { .. } => "Bootloader installation command failed",
            BootError::ConfigWrite { .. } => "Bootloader configuration could not be written",
        };
        Self::new(message).with_detail(err.to_string())
    }
}
