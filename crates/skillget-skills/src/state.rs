//! The persisted client state file.
//!
//! A single JSON document holds the credential, client settings and the
//! installed-skill manifest.  Every write replaces the file atomically
//! (temp file in the same directory, then rename) and restricts it to the
//! owner, since it carries the bearer token.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::agent::Agent;
use crate::error::Result;
use crate::types::InstalledSkillRecord;

/// On-disk shape of the state file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<Agent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills_path: Option<PathBuf>,
    #[serde(default)]
    pub installed_skills: BTreeMap<String, InstalledSkillRecord>,
    /// Keys written by other clients, carried through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl StateFile {
    /// Read the state at `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) if text.trim().is_empty() => Ok(Self::default()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Atomically replace the file at `path` with this state.
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)?;

        let body = serde_json::to_string_pretty(self)?;
        let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
        tmp.write_all(body.as_bytes())?;
        tmp.as_file().sync_all()?;

        // Restrict file permissions on Unix (owner read/write only).
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(tmp.path(), perms)?;
        }

        tmp.persist(path).map_err(|e| e.error)?;
        tracing::debug!(path = %path.display(), "state file written");
        Ok(())
    }

    /// Load, apply `f`, and save back.
    pub fn update<T>(path: &Path, f: impl FnOnce(&mut StateFile) -> T) -> Result<T> {
        let mut state = Self::load(path)?;
        let out = f(&mut state);
        state.save(path)?;
        Ok(out)
    }
}
