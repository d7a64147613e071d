//! Supported sandbox languages and in-container command construction.

use crate::error::SandboxError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Languages the sandbox can execute.
///
/// The image/interpreter pairing is a fixed table; resolving an unsupported
/// language fails before any container engine call is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Python 3.
    Python,

    /// POSIX shell.
    Bash,

    /// Node.js.
    Javascript,
}

impl Language {
    /// All supported languages.
    pub const ALL: &'static [Language] = &[Language::Python, Language::Bash, Language::Javascript];

    /// Container image the language runs in.
    pub fn image(&self) -> &'static str {
        match self {
            Self::Python => "python:3-slim",
            Self::Bash => "alpine:latest",
            Self::Javascript => "node:20-slim",
        }
    }

    /// Interpreter binary invoked inside the container.
    pub fn interpreter(&self) -> &'static str {
        match self {
            Self::Python => "python3",
            Self::Bash => "sh",
            Self::Javascript => "node",
        }
    }

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::Bash => "bash",
            Self::Javascript => "javascript",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = SandboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "python" => Ok(Self::Python),
            "bash" => Ok(Self::Bash),
            "javascript" => Ok(Self::Javascript),
            other => Err(SandboxError::UnsupportedLanguage(other.to_string())),
        }
    }
}

/// Build the argv that runs `code` inside a container for `language`.
///
/// The code body is base64-encoded and decoded inside the container, so shell
/// metacharacters in agent-authored code never reach the invocation command.
pub fn wrap_code(language: Language, code: &str) -> Vec<String> {
    let encoded = BASE64.encode(code.as_bytes());
    vec![
        "sh".to_string(),
        "-c".to_string(),
        format!("echo '{}' | base64 -d | {}", encoded, language.interpreter()),
    ]
}
