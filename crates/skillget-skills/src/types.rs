//! Skill type definitions: the installed-skill record kept in the manifest
//! and the wire types exchanged with the registry.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version sentinel for skills installed from a local directory.
pub const LOCAL_VERSION: &str = "local";

/// Version selector meaning "whatever the registry considers newest".
pub const LATEST: &str = "latest";

// ---------------------------------------------------------------------------
// Installed state
// ---------------------------------------------------------------------------

/// Where an installed skill came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillSource {
    /// Installed from the registry; eligible for update checks.
    Registry,
    /// Copied from a local directory.
    Local,
    /// Installed by some other channel (older clients wrote `github`).
    #[serde(alias = "github")]
    External,
}

impl SkillSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Registry => "registry",
            Self::Local => "local",
            Self::External => "external",
        }
    }
}

impl std::fmt::Display for SkillSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the manifest.
///
/// The install path is always computed by the path resolver from the skill
/// name and the configured agent; there is no public way to set it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledSkillRecord {
    pub name: String,
    pub version: String,
    #[serde(rename = "path")]
    install_path: PathBuf,
    pub installed_at: DateTime<Utc>,
    pub source: SkillSource,
}

impl InstalledSkillRecord {
    /// Build a record stamped with the current time.
    ///
    /// Only the lifecycle manager constructs records, always passing the
    /// resolver's output as `install_path`.
    pub(crate) fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        source: SkillSource,
        install_path: PathBuf,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            install_path,
            installed_at: Utc::now(),
            source,
        }
    }

    /// Where this skill's files live.
    pub fn install_path(&self) -> &Path {
        &self.install_path
    }

    /// Whether update checks apply to this record.
    pub fn is_updatable(&self) -> bool {
        self.source == SkillSource::Registry
    }
}

// ---------------------------------------------------------------------------
// Registry wire types
// ---------------------------------------------------------------------------

/// Publisher information attached to a package.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Author {
    pub username: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub trust_tier: Option<String>,
}

/// Package metadata as returned by `GET /skills/{name}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackageInfo {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub repository: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub downloads: u64,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub rating_count: u64,
    #[serde(default)]
    pub latest_version: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Descriptor returned by `GET /skills/{name}/versions/{version}/download`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DownloadResponse {
    pub version: String,
    #[serde(default)]
    pub tarball_url: Option<String>,
    #[serde(default)]
    pub tarball_sha256: Option<String>,
    #[serde(default)]
    pub skill_md: Option<String>,
    #[serde(default)]
    pub readme: Option<String>,
    #[serde(default)]
    pub config_schema: Option<serde_json::Value>,
}

/// Where to fetch a version's archive from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactReference {
    pub name: String,
    pub version: String,
    /// The URL advertised by the registry, if any.
    pub tarball_url: Option<String>,
}

/// Resolved version information for one install.
#[derive(Debug, Clone, Default)]
pub struct RemoteVersionInfo {
    /// The concrete version the registry resolved the request to.
    pub version: String,
    pub artifact: Option<ArtifactReference>,
    pub skill_md: Option<String>,
    pub readme: Option<String>,
    pub config_schema: Option<serde_json::Value>,
}

impl RemoteVersionInfo {
    /// Build from the download descriptor of skill `name`.
    pub fn from_download(name: &str, resp: DownloadResponse) -> Self {
        let artifact = resp.tarball_url.map(|url| ArtifactReference {
            name: name.to_owned(),
            version: resp.version.clone(),
            tarball_url: Some(url),
        });
        Self {
            version: resp.version,
            artifact,
            skill_md: resp.skill_md,
            readme: resp.readme,
            config_schema: resp.config_schema,
        }
    }

    /// Inline files keyed by the filename they are written under.
    pub fn inline_files(&self) -> Result<BTreeMap<&'static str, String>, serde_json::Error> {
        let mut files = BTreeMap::new();
        if let Some(md) = &self.skill_md {
            files.insert("SKILL.md", md.clone());
        }
        if let Some(readme) = &self.readme {
            files.insert("README.md", readme.clone());
        }
        if let Some(schema) = &self.config_schema {
            files.insert("config.schema.json", serde_json::to_string_pretty(schema)?);
        }
        Ok(files)
    }
}

/// Pagination block of list responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub has_more: bool,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            total: 0,
            page: 1,
            limit: 20,
            has_more: false,
        }
    }
}

/// Result of a registry search or listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchPage {
    pub data: Vec<PackageInfo>,
    #[serde(default)]
    pub query: String,
    pub pagination: Pagination,
}

/// Metadata body of `POST /publish/skills`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PublishRequest {
    pub name: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill_md: Option<String>,
}

/// Response of `POST /publish/skills`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublishResponse {
    pub name: String,
    pub version: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// Response of a tarball upload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub sha256: Option<String>,
    #[serde(default)]
    pub size_bytes: Option<u64>,
}

/// The authenticated user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub trust_tier: Option<String>,
}
