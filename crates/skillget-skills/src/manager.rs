//! Skill manager: install, update, remove, and local install.
//!
//! The manager reconciles a requested `(name, version)` against the local
//! manifest and the registry, and performs the filesystem transitions
//! between them.  A manifest record is only written after its files have
//! been materialized, so a failed install never shows up as installed.

use std::path::{Path, PathBuf};

use crate::agent::{self, Agent};
use crate::bundle::{self, MARKER_FILE};
use crate::config::ClientConfig;
use crate::error::{FailureKind, Result, SkillError};
use crate::materializer::{Artifact, Materializer};
use crate::registry::Registry;
use crate::store::ManifestStore;
use crate::types::{InstalledSkillRecord, LATEST, LOCAL_VERSION, SkillSource};

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// A completed install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    pub name: String,
    /// The concrete version written to the manifest.
    pub version: String,
    pub path: PathBuf,
}

/// Result of comparing an installed skill with the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCheck {
    pub name: String,
    pub installed: String,
    pub latest: String,
}

impl UpdateCheck {
    pub fn is_current(&self) -> bool {
        self.installed == self.latest
    }
}

/// The two ways a single-skill update can succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// A newer version was installed.
    Updated {
        previous: String,
        install: InstallOutcome,
    },
    /// The installed version is already the latest; nothing was touched.
    AlreadyCurrent { name: String, version: String },
}

/// One skill that failed during a batch update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateFailure {
    pub name: String,
    pub kind: FailureKind,
    pub message: String,
}

/// Aggregate result of [`SkillManager::update_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    pub updated: Vec<InstallOutcome>,
    pub current: Vec<String>,
    pub failed: Vec<UpdateFailure>,
}

impl UpdateSummary {
    /// Number of skills the batch looked at.
    pub fn processed(&self) -> usize {
        self.updated.len() + self.current.len() + self.failed.len()
    }
}

// ---------------------------------------------------------------------------
// Manager
// ---------------------------------------------------------------------------

/// Orchestrates the skill lifecycle against a registry.
pub struct SkillManager<R: Registry> {
    registry: R,
    store: ManifestStore,
    materializer: Materializer,
    home: PathBuf,
    agent: Agent,
}

impl<R: Registry> SkillManager<R> {
    /// Create a manager for the configured agent and state file.
    pub fn new(config: &ClientConfig, registry: R) -> Self {
        Self {
            registry,
            store: config.manifest(),
            materializer: Materializer::new(config.scratch_dir()),
            home: config.home.clone(),
            agent: config.agent,
        }
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn store(&self) -> &ManifestStore {
        &self.store
    }

    pub fn agent(&self) -> Agent {
        self.agent
    }

    /// Where skill `name` is installed for the configured agent.
    pub fn install_path(&self, name: &str) -> PathBuf {
        agent::resolve_install_path(&self.home, self.agent, name)
    }

    pub fn get(&self, name: &str) -> Result<Option<InstalledSkillRecord>> {
        self.store.get(name)
    }

    pub fn list(&self) -> Result<Vec<InstalledSkillRecord>> {
        self.store.list()
    }

    /// Install `name` at `version` (use [`LATEST`] for the newest release).
    ///
    /// An existing install is only replaced when `force` is set, or when the
    /// caller names a concrete version different from the recorded one.
    pub async fn install(&self, name: &str, version: &str, force: bool) -> Result<InstallOutcome> {
        bundle::validate_skill_name(name)?;
        let version = if version.is_empty() { LATEST } else { version };

        if let Some(existing) = self.store.get(name)? {
            if !force && (version == LATEST || existing.version == version) {
                return Err(SkillError::AlreadyInstalled {
                    name: name.to_owned(),
                    version: existing.version,
                });
            }
        }

        tracing::debug!(name = %name, version = %version, force, "resolving version");
        let info = self
            .registry
            .fetch_version_info(name, version)
            .await
            .map_err(|e| SkillError::from_registry(name, e))?;

        let archive = match &info.artifact {
            Some(reference) => Some(
                self.registry
                    .fetch_artifact_bytes(reference)
                    .await
                    .map_err(|e| SkillError::from_registry(name, e))?,
            ),
            None => None,
        };

        let artifact = Artifact {
            archive,
            inline_files: info
                .inline_files()?
                .into_iter()
                .map(|(file, contents)| (file.to_owned(), contents))
                .collect(),
        };

        let path = self.install_path(name);
        self.materializer.materialize(&path, &artifact)?;

        let record =
            InstalledSkillRecord::new(name, &info.version, SkillSource::Registry, path.clone());
        self.store.put(record)?;

        tracing::info!(
            name = %name,
            version = %info.version,
            path = %path.display(),
            "skill installed"
        );
        Ok(InstallOutcome {
            name: name.to_owned(),
            version: info.version,
            path,
        })
    }

    /// Compare an installed registry skill with the registry's latest version.
    pub async fn check_update(&self, name: &str) -> Result<UpdateCheck> {
        let record = self.updatable_record(name)?;

        let package = self
            .registry
            .fetch_latest_metadata(name)
            .await
            .map_err(|e| SkillError::from_registry(name, e))?;
        let latest = package
            .latest_version
            .filter(|v| !v.is_empty())
            .ok_or_else(|| SkillError::NoVersionsAvailable {
                name: name.to_owned(),
            })?;

        Ok(UpdateCheck {
            name: name.to_owned(),
            installed: record.version,
            latest,
        })
    }

    /// Bring one installed skill up to the registry's latest version.
    pub async fn update(&self, name: &str) -> Result<UpdateOutcome> {
        let check = self.check_update(name).await?;
        if check.is_current() {
            tracing::debug!(name = %name, version = %check.installed, "already at latest version");
            return Ok(UpdateOutcome::AlreadyCurrent {
                name: check.name,
                version: check.installed,
            });
        }

        let install = self.install(name, LATEST, true).await?;
        tracing::info!(
            name = %name,
            from = %check.installed,
            to = %install.version,
            "skill updated"
        );
        Ok(UpdateOutcome::Updated {
            previous: check.installed,
            install,
        })
    }

    /// Update every registry-sourced skill, one at a time.
    ///
    /// A failing skill is recorded in the summary and the batch moves on.
    pub async fn update_all(&self) -> Result<UpdateSummary> {
        let mut summary = UpdateSummary::default();

        for record in self.store.list()? {
            if !record.is_updatable() {
                continue;
            }
            match self.update(&record.name).await {
                Ok(UpdateOutcome::Updated { install, .. }) => summary.updated.push(install),
                Ok(UpdateOutcome::AlreadyCurrent { name, .. }) => summary.current.push(name),
                Err(e) => {
                    tracing::warn!(name = %record.name, error = %e, "update failed");
                    summary.failed.push(UpdateFailure {
                        name: record.name,
                        kind: e.kind(),
                        message: e.to_string(),
                    });
                }
            }
        }

        Ok(summary)
    }

    /// Uninstall `name`: delete its directory, then its manifest record.
    pub fn remove(&self, name: &str) -> Result<InstalledSkillRecord> {
        let record = self
            .store
            .get(name)?
            .ok_or_else(|| SkillError::NotInstalled {
                name: name.to_owned(),
            })?;

        match std::fs::remove_dir_all(record.install_path()) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(
                    path = %record.install_path().display(),
                    "install directory already gone"
                );
            }
            Err(e) => return Err(e.into()),
        }
        self.store.delete(name)?;

        tracing::info!(name = %name, "skill removed");
        Ok(record)
    }

    /// Install a bundle from a local directory.
    ///
    /// Without an explicit `name`, the name comes from the first heading of
    /// the bundle's `SKILL.md`, or the directory name when there is none.
    pub fn install_from_local(&self, source: &Path, name: Option<&str>) -> Result<InstallOutcome> {
        let marker = source.join(MARKER_FILE);
        let contents = match std::fs::read_to_string(&marker) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SkillError::InvalidBundle {
                    path: source.to_path_buf(),
                    reason: format!("No {MARKER_FILE} found in source directory"),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let name = match name {
            Some(n) => n.to_owned(),
            None => bundle::derive_skill_name(source, &contents),
        };
        bundle::validate_skill_name(&name)?;

        let path = self.install_path(&name);
        bundle::copy_bundle(source, &path)?;

        let record =
            InstalledSkillRecord::new(&name, LOCAL_VERSION, SkillSource::Local, path.clone());
        self.store.put(record)?;

        tracing::info!(
            name = %name,
            source = %source.display(),
            path = %path.display(),
            "skill installed from local directory"
        );
        Ok(InstallOutcome {
            name,
            version: LOCAL_VERSION.to_owned(),
            path,
        })
    }

    /// Validate a bundle directory without modifying anything.
    pub fn verify_bundle(&self, path: &Path) -> Vec<String> {
        bundle::verify_bundle(path)
    }

    fn updatable_record(&self, name: &str) -> Result<InstalledSkillRecord> {
        let record = self
            .store
            .get(name)?
            .ok_or_else(|| SkillError::NotInstalled {
                name: name.to_owned(),
            })?;
        if !record.is_updatable() {
            return Err(SkillError::NotUpdatable {
                name: name.to_owned(),
                origin: record.source.to_string(),
            });
        }
        Ok(record)
    }
}
