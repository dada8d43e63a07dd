//! Error types for the skills subsystem.
//!
//! Every lifecycle operation returns [`SkillError`] on failure.  Callers that
//! need to branch on the failure class (the CLI, the batch updater) use
//! [`SkillError::kind`], which projects each variant onto the closed
//! [`FailureKind`] enumeration.

use std::path::PathBuf;

use crate::registry::RegistryError;

/// Skill-specific errors.
#[derive(Debug, thiserror::Error)]
pub enum SkillError {
    #[error("network error: {message}")]
    Network { code: String, message: String },

    #[error("skill not found: `{name}`")]
    SkillNotFound { name: String },

    #[error("{name}@{version} is already installed. Use --force to reinstall.")]
    AlreadyInstalled { name: String, version: String },

    #[error("skill `{name}` is not installed")]
    NotInstalled { name: String },

    #[error("no versions available for `{name}`")]
    NoVersionsAvailable { name: String },

    #[error("skill `{name}` was installed from a {origin} source and cannot be updated from the registry")]
    NotUpdatable { name: String, origin: String },

    #[error("invalid skill bundle at `{path}`: {reason}")]
    InvalidBundle { path: PathBuf, reason: String },

    #[error("invalid skill name `{name}`: {reason}")]
    InvalidName { name: String, reason: String },

    #[error("not logged in")]
    NotAuthenticated,

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The closed set of failure classes a lifecycle operation can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    NetworkError,
    SkillNotFound,
    AlreadyInstalled,
    NotInstalled,
    NoVersionsAvailable,
    NotUpdatable,
    InvalidBundle,
    InvalidName,
    NotAuthenticated,
    InvalidConfig,
    IoError,
}

impl SkillError {
    /// Classify this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Network { .. } => FailureKind::NetworkError,
            Self::SkillNotFound { .. } => FailureKind::SkillNotFound,
            Self::AlreadyInstalled { .. } => FailureKind::AlreadyInstalled,
            Self::NotInstalled { .. } => FailureKind::NotInstalled,
            Self::NoVersionsAvailable { .. } => FailureKind::NoVersionsAvailable,
            Self::NotUpdatable { .. } => FailureKind::NotUpdatable,
            Self::InvalidBundle { .. } => FailureKind::InvalidBundle,
            Self::InvalidName { .. } => FailureKind::InvalidName,
            Self::NotAuthenticated => FailureKind::NotAuthenticated,
            Self::InvalidConfig { .. } => FailureKind::InvalidConfig,
            // A corrupt state file is a local storage failure.
            Self::Io(_) | Self::Json(_) => FailureKind::IoError,
        }
    }

    /// Map a registry failure observed while working on skill `name`.
    ///
    /// `NotFound` becomes [`SkillError::SkillNotFound`]; everything else is a
    /// network failure, never a silent "not found".
    pub fn from_registry(name: &str, err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound { .. } => Self::SkillNotFound {
                name: name.to_owned(),
            },
            RegistryError::Unavailable { reason } => Self::Network {
                code: "artifact_unavailable".into(),
                message: reason,
            },
            RegistryError::Network { code, message } => Self::Network { code, message },
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NetworkError => "NetworkError",
            Self::SkillNotFound => "SkillNotFound",
            Self::AlreadyInstalled => "AlreadyInstalled",
            Self::NotInstalled => "NotInstalled",
            Self::NoVersionsAvailable => "NoVersionsAvailable",
            Self::NotUpdatable => "NotUpdatable",
            Self::InvalidBundle => "InvalidBundle",
            Self::InvalidName => "InvalidName",
            Self::NotAuthenticated => "NotAuthenticated",
            Self::InvalidConfig => "InvalidConfig",
            Self::IoError => "IOError",
        };
        f.write_str(s)
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, SkillError>;
