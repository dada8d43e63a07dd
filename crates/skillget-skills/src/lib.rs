//! Skill lifecycle for `skill-get`.
//!
//! This crate provides:
//!
//! - **Manifest store**: the persisted record of installed skills.
//!
//! - **Path resolver**: agent detection and the per-agent install layout.
//!
//! - **Registry client**: metadata, version descriptors, archives, search
//!   and publishing against the skill registry.
//!
//! - **Artifact materializer**: unpacks archives (stripping their wrapper
//!   directory) and writes inline files into an install directory.
//!
//! - **Skill manager**: install, update, update-all, remove and local
//!   install, with the manifest only written after files are in place.
//!
//! # Example
//!
//! ```rust,no_run
//! use skillget_skills::{ClientConfig, HttpRegistry, SkillManager, LATEST};
//!
//! # async fn run() -> skillget_skills::Result<()> {
//! let config = ClientConfig::load()?;
//! let manager = SkillManager::new(&config, HttpRegistry::new(&config));
//!
//! let installed = manager.install("code-review", LATEST, false).await?;
//! println!("{}@{} -> {}", installed.name, installed.version, installed.path.display());
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod bundle;
pub mod config;
pub mod error;
pub mod manager;
pub mod materializer;
pub mod publish;
pub mod registry;
pub mod state;
pub mod store;
pub mod types;

pub use agent::{Agent, resolve_install_path};
pub use bundle::{MARKER_FILE, derive_skill_name, verify_bundle};
pub use config::{ClientConfig, DEFAULT_API_URL};
pub use error::{FailureKind, Result, SkillError};
pub use manager::{
    InstallOutcome, SkillManager, UpdateCheck, UpdateFailure, UpdateOutcome, UpdateSummary,
};
pub use materializer::{Artifact, Materializer};
pub use publish::{PublishPlan, PublishReceipt, pack_bundle};
pub use registry::{HttpRegistry, ListParams, Registry, RegistryError, SearchParams};
pub use store::ManifestStore;
pub use types::{
    ArtifactReference, InstalledSkillRecord, LATEST, LOCAL_VERSION, PackageInfo, Pagination,
    RemoteVersionInfo, SearchPage, SkillSource, User,
};
