//! Local manifest store: installed skill name → [`InstalledSkillRecord`].
//!
//! Backed by the `installedSkills` map of the state file.  Each call reads
//! the file and each mutation writes it back before returning, so values
//! survive across invocations.  Two processes mutating the store at the same
//! time can lose one of the writes; the client assumes a single invocation
//! at a time.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::state::StateFile;
use crate::types::InstalledSkillRecord;

/// Persistent manifest of installed skills.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    path: PathBuf,
}

impl ManifestStore {
    /// Open the store backed by the state file at `path`.  Nothing is
    /// created until the first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, name: &str) -> Result<Option<InstalledSkillRecord>> {
        let state = StateFile::load(&self.path)?;
        Ok(state.installed_skills.get(name).cloned())
    }

    /// Insert or overwrite the record keyed by its name.
    pub fn put(&self, record: InstalledSkillRecord) -> Result<()> {
        let name = record.name.clone();
        StateFile::update(&self.path, |s| {
            s.installed_skills.insert(name, record);
        })
    }

    /// Remove a record; absent names are a no-op.
    pub fn delete(&self, name: &str) -> Result<()> {
        let state = StateFile::load(&self.path)?;
        if !state.installed_skills.contains_key(name) {
            return Ok(());
        }
        StateFile::update(&self.path, |s| {
            s.installed_skills.remove(name);
        })
    }

    /// All records, sorted by name.
    pub fn list(&self) -> Result<Vec<InstalledSkillRecord>> {
        let state = StateFile::load(&self.path)?;
        Ok(state.installed_skills.into_values().collect())
    }
}
