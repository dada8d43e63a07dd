//! Client configuration.
//!
//! [`ClientConfig`] is built once per process from the environment and the
//! persisted state file, then handed to the registry client and the
//! lifecycle manager.  Settings mutations write through to the state file.

use std::path::{Path, PathBuf};

use crate::agent::{self, Agent};
use crate::error::{Result, SkillError};
use crate::state::StateFile;
use crate::store::ManifestStore;

/// Default registry endpoint.
pub const DEFAULT_API_URL: &str = "https://api.mcpskills.dev";

/// Overrides the home directory skills are installed under.
pub const ENV_HOME: &str = "SKILL_GET_HOME";
/// Overrides the state file location.
pub const ENV_CONFIG: &str = "SKILL_GET_CONFIG";
/// Overrides the registry endpoint.
pub const ENV_API_URL: &str = "SKILL_GET_API_URL";

/// Resolved client settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub token: Option<String>,
    pub username: Option<String>,
    pub agent: Agent,
    pub home: PathBuf,
    pub state_path: PathBuf,
}

impl ClientConfig {
    /// Build from the process environment.
    pub fn load() -> Result<Self> {
        Self::load_with(|k| std::env::var(k).ok())
    }

    /// Build from an explicit environment snapshot.
    pub fn load_with<F>(env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |k: &str| env(k).filter(|v| !v.is_empty());

        let home = match non_empty(ENV_HOME) {
            Some(h) => PathBuf::from(h),
            None => dirs::home_dir().ok_or_else(|| SkillError::InvalidConfig {
                reason: "could not determine the home directory".into(),
            })?,
        };

        let state_path = match non_empty(ENV_CONFIG) {
            Some(p) => PathBuf::from(p),
            None => dirs::config_dir()
                .unwrap_or_else(|| home.join(".config"))
                .join("skill-get")
                .join("config.json"),
        };

        let state = StateFile::load(&state_path)?;

        let api_url = non_empty(ENV_API_URL)
            .or(state.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_owned());
        let agent = state
            .agent
            .unwrap_or_else(|| Agent::detect(&non_empty, &home));

        tracing::debug!(
            home = %home.display(),
            state = %state_path.display(),
            api_url = %api_url,
            agent = %agent,
            "configuration loaded"
        );

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_owned(),
            token: state.token,
            username: state.username,
            agent,
            home,
            state_path,
        })
    }

    /// Build directly, without consulting the environment or disk.
    pub fn new(home: impl Into<PathBuf>, state_path: impl Into<PathBuf>, agent: Agent) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            token: None,
            username: None,
            agent,
            home: home.into(),
            state_path: state_path.into(),
        }
    }

    /// Set the registry endpoint for this process only.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_owned();
        self
    }

    /// Set the bearer token for this process only.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    // -----------------------------------------------------------------------
    // Derived paths
    // -----------------------------------------------------------------------

    /// Directory holding every installed skill for the configured agent.
    pub fn skills_dir(&self) -> PathBuf {
        agent::skills_dir(&self.home, self.agent)
    }

    /// Where skill `name` is (or would be) installed.
    pub fn install_path(&self, name: &str) -> PathBuf {
        agent::resolve_install_path(&self.home, self.agent, name)
    }

    /// Scratch directory for downloaded archives.
    pub fn scratch_dir(&self) -> PathBuf {
        self.home.join(".cache").join("skill-get").join("tmp")
    }

    pub fn manifest(&self) -> ManifestStore {
        ManifestStore::new(&self.state_path)
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }

    // -----------------------------------------------------------------------
    // Persisted settings
    // -----------------------------------------------------------------------

    /// Store a bearer token and the username it belongs to.
    pub fn set_token(&mut self, token: &str, username: &str) -> Result<()> {
        StateFile::update(&self.state_path, |s| {
            s.token = Some(token.to_owned());
            s.username = Some(username.to_owned());
        })?;
        self.token = Some(token.to_owned());
        self.username = Some(username.to_owned());
        tracing::info!(username = %username, "credentials stored");
        Ok(())
    }

    /// Forget the stored credentials.
    pub fn clear_token(&mut self) -> Result<()> {
        StateFile::update(&self.state_path, |s| {
            s.token = None;
            s.username = None;
        })?;
        self.token = None;
        self.username = None;
        tracing::info!("credentials cleared");
        Ok(())
    }

    /// Persist the target agent; its skills directory is recorded alongside.
    pub fn set_agent(&mut self, agent: Agent) -> Result<()> {
        let skills_path = agent::skills_dir(&self.home, agent);
        StateFile::update(&self.state_path, |s| {
            s.agent = Some(agent);
            s.skills_path = Some(skills_path);
        })?;
        self.agent = agent;
        tracing::info!(agent = %agent, "agent updated");
        Ok(())
    }

    /// Persist a registry endpoint after checking it is an absolute
    /// http(s) URL.
    pub fn set_api_url(&mut self, raw: &str) -> Result<()> {
        let parsed = url::Url::parse(raw).map_err(|e| SkillError::InvalidConfig {
            reason: format!("invalid API URL `{raw}`: {e}"),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SkillError::InvalidConfig {
                reason: format!("API URL must use http or https, got `{}`", parsed.scheme()),
            });
        }
        let normalized = raw.trim_end_matches('/').to_owned();
        StateFile::update(&self.state_path, |s| s.api_url = Some(normalized.clone()))?;
        self.api_url = normalized;
        tracing::info!(api_url = %self.api_url, "API URL updated");
        Ok(())
    }
}
