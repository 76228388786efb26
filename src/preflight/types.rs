//! Preflight check types and report.

/// Result of a single preflight check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    /// Check passed.
    Pass,
    /// Check failed - the job will fail.
    Fail,
    /// Check passed but with a warning.
    Warn,
}

impl CheckResult {
    pub fn pass_with(name: &str, details: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Pass,
            details: Some(details.to_string()),
        }
    }

    pub fn fail(name: &str, details: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Fail,
            details: Some(details.to_string()),
        }
    }

    pub fn warn(name: &str, details: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warn,
            details: Some(details.to_string()),
        }
    }
}

/// Results of all preflight checks.
pub struct PreflightReport {
    pub checks: Vec<CheckResult>,
}

impl PreflightReport {
    /// Returns true if all checks passed (no failures).
    pub fn all_passed(&self) -> bool {
        !self.checks.iter().any(|c| c.status == CheckStatus::Fail)
    }

    /// Count of failed checks.
    pub fn fail_count(&self) -> usize {
        self.count(CheckStatus::Fail)
    }

    /// Count of warnings.
    pub fn warn_count(&self) -> usize {
        self.count(CheckStatus::Warn)
    }

    fn count(&self, status: CheckStatus) -> usize {
        self.checks.iter().filter(|c| c.status == status).count()
    }

    /// Print the report to stdout.
    pub fn print(&self) {
        println!("=== Preflight Check Results ===\n");

        for check in &self.checks {
            let (icon, status_str) = match check.status {
                CheckStatus::Pass => ("✓", "PASS"),
                CheckStatus::Fail => ("✗", "FAIL"),
                CheckStatus::Warn => ("⚠", "WARN"),
            };

            print!("  {} [{}] {}", icon, status_str, check.name);
            if let Some(details) = &check.details {
                println!(": {}", details);
            } else {
                println!();
            }
        }

        println!();
        let total = self.checks.len();
        let passed = self.count(CheckStatus::Pass);
        let failed = self.fail_count();
        let warned = self.warn_count();

        println!("Summary: {}/{} passed", passed, total);
        if failed > 0 {
            println!("         {} FAILED - installation will not succeed", failed);
        }
        if warned > 0 {
            println!("         {} warnings", warned);
        }
    }
}
