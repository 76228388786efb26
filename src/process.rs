//! Centralized command execution with consistent error handling.
//!
//! Every external tool the job touches goes through a [`CommandRunner`].
//! [`HostRunner`] spawns real processes, optionally chroot-scoped into the
//! installed system; tests substitute a runner that records invocations.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;

use crate::error::BootError;

/// Where a command runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Directly on the installer host.
    Host,
    /// Inside the installed system, with its root at the given mount point.
    Target(PathBuf),
}

/// A fully described command, independent of how it gets executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub scope: Scope,
}

impl Invocation {
    /// Program and arguments as a single line, for logs and error messages.
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Scope::Host => write!(f, "{}", self.command_line()),
            Scope::Target(root) => write!(f, "[{}] {}", root.display(), self.command_line()),
        }
    }
}

/// Result of a command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Exit code, or `None` if terminated by signal.
    pub code: Option<i32>,
    /// Captured stdout as a string.
    pub stdout: String,
    /// Captured stderr as a string.
    pub stderr: String,
}

impl CommandResult {
    /// A successful result carrying the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A failed result with the given exit code and stderr.
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Returns true if the command exited successfully.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Get stderr, trimmed of whitespace.
    pub fn stderr_trimmed(&self) -> &str {
        self.stderr.trim()
    }
}

/// Executes invocations. The only place the job performs process I/O.
pub trait CommandRunner {
    /// Run the invocation to completion and capture its output.
    ///
    /// An `Err` means the process could not be started at all; a non-zero
    /// exit is reported through [`CommandResult::code`].
    fn execute(&mut self, invocation: &Invocation) -> io::Result<CommandResult>;
}

/// Runs commands on the real host, using `chroot` for [`Scope::Target`].
#[derive(Debug, Clone)]
pub struct HostRunner {
    chroot_program: String,
}

impl HostRunner {
    pub fn new(chroot_program: impl Into<String>) -> Self {
        Self {
            chroot_program: chroot_program.into(),
        }
    }

    /// Build the process for an invocation without spawning it.
    pub fn command(&self, invocation: &Invocation) -> Command {
        match &invocation.scope {
            Scope::Host => {
                let mut cmd = Command::new(&invocation.program);
                cmd.args(&invocation.args);
                cmd
            }
            Scope::Target(root) => {
                let mut cmd = Command::new(&self.chroot_program);
                cmd.arg(root).arg(&invocation.program).args(&invocation.args);
                cmd
            }
        }
    }
}

impl Default for HostRunner {
    fn default() -> Self {
        Self::new("chroot")
    }
}

impl CommandRunner for HostRunner {
    fn execute(&mut self, invocation: &Invocation) -> io::Result<CommandResult> {
        let output = self.command(invocation).output()?;
        Ok(CommandResult {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Builder for configuring command execution.
pub struct Cmd {
    invocation: Invocation,
    /// If true, don't fail on non-zero exit.
    allow_fail: bool,
    /// Custom error message prefix.
    error_prefix: Option<String>,
}

impl Cmd {
    /// Create a new command builder that runs on the host.
    pub fn new(program: impl AsRef<str>) -> Self {
        Self {
            invocation: Invocation {
                program: program.as_ref().to_string(),
                args: Vec::new(),
                scope: Scope::Host,
            },
            allow_fail: false,
            error_prefix: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<str>) -> Self {
        self.invocation.args.push(arg.as_ref().to_string());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for arg in args {
            self.invocation.args.push(arg.as_ref().to_string());
        }
        self
    }

    /// Run inside the installed system rooted at `root`.
    pub fn in_target(mut self, root: &Path) -> Self {
        self.invocation.scope = Scope::Target(root.to_path_buf());
        self
    }

    /// Allow non-zero exit codes without failing.
    pub fn allow_fail(mut self) -> Self {
        self.allow_fail = true;
        self
    }

    /// Set a custom error message prefix.
    pub fn error_msg(mut self, msg: impl AsRef<str>) -> Self {
        self.error_prefix = Some(msg.as_ref().to_string());
        self
    }

    /// Run the command through `runner` and capture output.
    pub fn run(self, runner: &mut dyn CommandRunner) -> Result<CommandResult, BootError> {
        debug!("Running: {}", self.invocation);
        let program = self.invocation.program.clone();

        let result = runner
            .execute(&self.invocation)
            .map_err(|err| BootError::ExternalCommand {
                program: program.clone(),
                code: None,
                message: format!("Failed to execute '{}'. Is it installed? ({})", program, err),
            })?;

        if !self.allow_fail && !result.success() {
            let prefix = self
                .error_prefix
                .unwrap_or_else(|| format!("'{}' failed", self.invocation.command_line()));
            let code = result
                .code
                .map_or_else(|| "signal".to_string(), |c| c.to_string());

            let stderr = result.stderr_trimmed();
            let message = if stderr.is_empty() {
                format!("{} (exit code {})", prefix, code)
            } else {
                format!("{} (exit code {}):\n{}", prefix, code, stderr)
            };
            return Err(BootError::ExternalCommand {
                program,
                code: result.code,
                message,
            });
        }

        Ok(result)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_success() {
        let mut runner = HostRunner::default();
        let result = Cmd::new("echo").arg("hello").run(&mut runner).unwrap();
        assert!(result.success());
        assert_eq!(result.stdout.trim(), "hello");
    }

    #[test]
    fn test_run_failure_includes_stderr() {
        let mut runner = HostRunner::default();
        let err = Cmd::new("ls")
            .arg("/nonexistent_path_12345")
            .run(&mut runner)
            .unwrap_err();
        let msg = err.to_string();

        assert!(msg.contains("No such file") || msg.contains("cannot access"));
    }

    #[test]
    fn test_custom_error_message() {
        let mut runner = HostRunner::default();
        let err = Cmd::new("false")
            .error_msg("grub-mkconfig failed")
            .run(&mut runner)
            .unwrap_err();

        match err {
            BootError::ExternalCommand { code, message, .. } => {
                assert_eq!(code, Some(1));
                assert!(message.starts_with("grub-mkconfig failed (exit code 1)"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_allow_fail() {
        let mut runner = HostRunner::default();
        let result = Cmd::new("false").allow_fail().run(&mut runner).unwrap();

        assert!(!result.success());
        assert_eq!(result.code, Some(1));
    }

    #[test]
    fn test_missing_program_is_external_command_error() {
        let mut runner = HostRunner::default();
        let err = Cmd::new("nonexistent_program_12345")
            .run(&mut runner)
            .unwrap_err();
        assert!(matches!(err, BootError::ExternalCommand { code: None, .. }));
    }

    #[test]
    fn test_target_scope_wraps_in_chroot() {
        let runner = HostRunner::new("arch-chroot");
        let invocation = Invocation {
            program: "grub-mkconfig".to_string(),
            args: vec!["-o".to_string(), "/boot/grub/grub.cfg".to_string()],
            scope: Scope::Target(PathBuf::from("/mnt/target")),
        };

        let cmd = runner.command(&invocation);
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();

        assert_eq!(cmd.get_program(), "arch-chroot");
        assert_eq!(args, ["/mnt/target", "grub-mkconfig", "-o", "/boot/grub/grub.cfg"]);
    }

    #[test]
    fn test_invocation_display() {
        let cmd = Cmd::new("mkdir").args(["-p", "/boot/efi"]).in_target(Path::new("/mnt"));
        assert_eq!(cmd.invocation.to_string(), "[/mnt] mkdir -p /boot/efi");
    }
}
