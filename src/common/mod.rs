//! Shared utilities across bootinst modules.

pub mod files;

pub use files::write_file_atomic;
