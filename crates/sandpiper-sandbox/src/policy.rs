//! Shell command policy for the streaming runner.

use crate::error::SandboxError;
use crate::Result;
use regex::Regex;
use tracing::warn;

/// Approves or rejects a shell command before either runner executes it.
///
/// Commands are checked against a regex blocklist; when an allowlist is set,
/// a command must additionally match at least one allowed pattern.
pub struct CommandPolicy {
    /// Allowed command patterns (regex). Empty means "allow everything not
    /// blocked".
    allowed_patterns: Vec<Regex>,

    /// Compiled blocked regexes.
    blocked_regexes: Vec<Regex>,
}

impl Default for CommandPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandPolicy {
    /// Create a policy with the default blocked patterns.
    pub fn new() -> Self {
        let blocked_patterns = [
            // Destructive filesystem operations
            r"rm\s+-rf\s+/",
            r"rm\s+-fr\s+/",
            // Privilege escalation
            r"\bsudo\b",
            r"\bsu\s+-",
            r"\bdoas\b",
            // Overly permissive permissions
            r"chmod\s+777",
            r"chmod\s+a\+rwx",
            // Device writes
            r">\s*/dev/",
            // Filesystem destruction
            r"\bmkfs\b",
            r"\bdd\s+if=",
        ];

        let blocked_regexes = blocked_patterns
            .iter()
            .filter_map(|p| Regex::new(p).ok())
            .collect();

        Self {
            allowed_patterns: vec![],
            blocked_regexes,
        }
    }

    /// Create a policy that blocks nothing. Intended for tests.
    pub fn permissive() -> Self {
        Self {
            allowed_patterns: vec![],
            blocked_regexes: vec![],
        }
    }

    /// Add an allowed pattern. Once any pattern is set, commands must match
    /// one of them.
    pub fn allow(mut self, pattern: &str) -> Self {
        if let Ok(re) = Regex::new(pattern) {
            self.allowed_patterns.push(re);
        }
        self
    }

    /// Add a blocked pattern.
    pub fn block(mut self, pattern: &str) -> Self {
        if let Ok(re) = Regex::new(pattern) {
            self.blocked_regexes.push(re);
        }
        self
    }

    /// Approve or reject a command.
    pub fn check(&self, command: &str) -> Result<()> {
        if command.trim().is_empty() {
            return Err(SandboxError::validation("command must not be empty"));
        }

        if command.contains('\0') {
            warn!("Blocked command with null bytes");
            return Err(SandboxError::CommandRejected(
                "command contains null bytes".to_string(),
            ));
        }

        for re in &self.blocked_regexes {
            if re.is_match(command) {
                warn!("Blocked command: {}", command);
                return Err(SandboxError::CommandRejected(format!(
                    "command matches blocked pattern {}",
                    re.as_str()
                )));
            }
        }

        if !self.allowed_patterns.is_empty()
            && !self.allowed_patterns.iter().any(|re| re.is_match(command))
        {
            warn!("Command not on allowlist: {}", command);
            return Err(SandboxError::CommandRejected(
                "command does not match any allowed pattern".to_string(),
            ));
        }

        Ok(())
    }

    /// Check if a command matches patterns that should require approval
    /// before running, even though it is not outright blocked.
    pub fn is_dangerous(&self, command: &str) -> bool {
        let dangerous_patterns = [
            "rm ", "rmdir", "mv ", "> ", ">> ",
            "curl ", "wget ", "pip install", "npm install",
            "chmod", "chown", "kill ", "pkill",
            "git push", "git reset",
            "docker ", "kubectl ", "ssh ",
        ];

        for pattern in &dangerous_patterns {
            if command.contains(pattern) {
                return true;
            }
        }

        // Command substitution can smuggle any of the above.
        command.contains("$(") || command.contains('`')
    }
}
