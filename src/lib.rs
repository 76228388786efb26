//! Bootinst library exports.
//!
//! The job is split into stages that can be driven individually, which is
//! how the integration tests in `tests/` exercise them with a recording
//! [`process::CommandRunner`]:
//!
//! - [`firmware`] - boot partition preparation
//! - [`install`] - boot manager installation
//! - [`entries`] - boot entry and loader configuration files
//! - [`job`] - the whole job, as the installer invokes it

pub mod commands;
pub mod common;
pub mod config;
pub mod context;
pub mod entries;
pub mod error;
pub mod firmware;
pub mod install;
pub mod job;
pub mod job_config;
pub mod partition;
pub mod preflight;
pub mod process;
pub mod resolve;
pub mod timing;

pub use error::{BootError, JobFailure};
