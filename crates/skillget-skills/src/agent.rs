//! Agent identity and the install path resolver.
//!
//! Each supported coding agent reads skills from a well-known directory under
//! the user's home.  Detection looks at environment signals first, then at
//! which agent configuration directories exist, and falls back to
//! [`Agent::Default`].

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A coding agent that consumes installed skills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Agent {
    ClaudeCode,
    ClaudeDesktop,
    Codex,
    Cursor,
    Windsurf,
    Continue,
    Aider,
    #[serde(other)]
    Default,
}

/// Environment variables that identify a running agent, in priority order.
const ENV_SIGNALS: &[(&str, Agent)] = &[
    ("CLAUDE_CODE", Agent::ClaudeCode),
    ("CURSOR_SESSION", Agent::Cursor),
    ("WINDSURF_SESSION", Agent::Windsurf),
    ("CODEX_SESSION", Agent::Codex),
];

/// Configuration directories under home, in priority order.
const DIR_SIGNALS: &[(&str, Agent)] = &[
    (".claude", Agent::ClaudeCode),
    (".cursor", Agent::Cursor),
    (".windsurf", Agent::Windsurf),
    (".codex", Agent::Codex),
    (".continue", Agent::Continue),
    (".aider", Agent::Aider),
];

impl Agent {
    pub const ALL: [Agent; 8] = [
        Agent::ClaudeCode,
        Agent::ClaudeDesktop,
        Agent::Codex,
        Agent::Cursor,
        Agent::Windsurf,
        Agent::Continue,
        Agent::Aider,
        Agent::Default,
    ];

    /// Stable identifier used in the state file and on the command line.
    pub fn id(self) -> &'static str {
        match self {
            Self::ClaudeCode => "claude-code",
            Self::ClaudeDesktop => "claude-desktop",
            Self::Codex => "codex",
            Self::Cursor => "cursor",
            Self::Windsurf => "windsurf",
            Self::Continue => "continue",
            Self::Aider => "aider",
            Self::Default => "default",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::ClaudeCode => "Claude Code",
            Self::ClaudeDesktop => "Claude Desktop",
            Self::Codex => "Codex",
            Self::Cursor => "Cursor",
            Self::Windsurf => "Windsurf",
            Self::Continue => "Continue",
            Self::Aider => "Aider",
            Self::Default => "Default",
        }
    }

    /// Skills directory relative to the home directory.
    pub fn skills_subdir(self) -> &'static str {
        match self {
            Self::ClaudeCode | Self::ClaudeDesktop => ".claude/skills",
            Self::Codex => ".codex/skills",
            Self::Cursor => ".cursor/skills",
            Self::Windsurf => ".windsurf/skills",
            Self::Continue => ".continue/skills",
            Self::Aider => ".aider/skills",
            Self::Default => ".ai-skills",
        }
    }

    /// Detect the agent for an environment snapshot.
    ///
    /// `env` answers whether a variable is set to a non-empty value.  The
    /// result depends only on `env` and the directories under `home`, so the
    /// same snapshot always yields the same agent.
    pub fn detect<F>(env: F, home: &Path) -> Agent
    where
        F: Fn(&str) -> Option<String>,
    {
        for &(var, agent) in ENV_SIGNALS {
            if env(var).is_some_and(|v| !v.is_empty()) {
                return agent;
            }
        }
        for &(dir, agent) in DIR_SIGNALS {
            if home.join(dir).exists() {
                return agent;
            }
        }
        Agent::Default
    }

    /// Detect using the real process environment.
    pub fn detect_from_env(home: &Path) -> Agent {
        Self::detect(|k| std::env::var(k).ok(), home)
    }
}

impl std::fmt::Display for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Agent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Agent::ALL
            .into_iter()
            .find(|a| a.id() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = Agent::ALL.iter().map(|a| a.id()).collect();
                format!("unknown agent `{s}` (expected one of: {})", known.join(", "))
            })
    }
}

/// The directory holding every skill for `agent`.
pub fn skills_dir(home: &Path, agent: Agent) -> PathBuf {
    home.join(agent.skills_subdir())
}

/// Where skill `name` is installed for `agent`.
pub fn resolve_install_path(home: &Path, agent: Agent, name: &str) -> PathBuf {
    skills_dir(home, agent).join(name)
}
