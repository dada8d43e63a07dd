//! Publishing a local bundle to the registry.
//!
//! [`PublishPlan::from_dir`] validates a bundle and derives the metadata to
//! publish; [`PublishPlan::publish`] registers the version and uploads the
//! bundle as a gzipped tarball wrapped in a single `<name>/` directory.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use flate2::Compression;
use flate2::write::GzEncoder;
use regex::Regex;
use serde::Deserialize;

use crate::bundle::{self, MARKER_FILE};
use crate::error::{Result, SkillError};
use crate::registry::{HttpRegistry, RegistryError};
use crate::types::{PublishRequest, PublishResponse, UploadResponse};

/// Version published when `package.json` does not name one.
pub const DEFAULT_VERSION: &str = "1.0.0";

/// License shown when none is declared.
pub const DEFAULT_LICENSE: &str = "MIT";

static CATEGORY: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?im)category:[ \t]*(.+)$").ok());

/// The subset of `package.json` that feeds publish metadata.
#[derive(Debug, Default, Deserialize)]
struct PackageJson {
    name: Option<String>,
    version: Option<String>,
    description: Option<String>,
    keywords: Option<Vec<String>>,
    license: Option<String>,
    repository: Option<Repository>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Repository {
    Url(String),
    Object { url: Option<String> },
}

impl Repository {
    fn normalized(self) -> Option<String> {
        match self {
            Repository::Url(url) => Some(url),
            Repository::Object { url } => url.map(|u| {
                let u = u.strip_prefix("git+").unwrap_or(&u);
                u.strip_suffix(".git").unwrap_or(u).to_owned()
            }),
        }
    }
}

/// Everything needed to publish one bundle.
#[derive(Debug, Clone)]
pub struct PublishPlan {
    pub source_dir: PathBuf,
    pub request: PublishRequest,
}

/// What the registry answered.
#[derive(Debug, Clone)]
pub struct PublishReceipt {
    pub published: PublishResponse,
    pub upload: UploadResponse,
}

impl PublishPlan {
    /// Validate `dir` and derive its publish metadata.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let errors = bundle::verify_bundle(dir);
        if !errors.is_empty() {
            return Err(SkillError::InvalidBundle {
                path: dir.to_path_buf(),
                reason: errors.join("; "),
            });
        }

        let skill_md = std::fs::read_to_string(dir.join(MARKER_FILE))?;
        let readme = read_optional(&dir.join("README.md"))?;
        let package: PackageJson = match read_optional(&dir.join("package.json"))? {
            Some(text) => serde_json::from_str(&text)?,
            None => PackageJson::default(),
        };

        let name = package
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| bundle::derive_skill_name(dir, &skill_md));
        let version = package
            .version
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_VERSION.to_owned());
        let description = package
            .description
            .filter(|d| !d.is_empty())
            .or_else(|| first_prose_line(&skill_md));
        let category = CATEGORY
            .as_ref()
            .and_then(|re| re.captures(&skill_md))
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_owned())
            .filter(|c| !c.is_empty());

        Ok(Self {
            source_dir: dir.to_path_buf(),
            request: PublishRequest {
                name,
                version,
                description,
                keywords: package.keywords.unwrap_or_default(),
                category,
                license: package.license,
                repository: package.repository.and_then(Repository::normalized),
                readme,
                skill_md: Some(skill_md),
            },
        })
    }

    pub fn name(&self) -> &str {
        &self.request.name
    }

    pub fn version(&self) -> &str {
        &self.request.version
    }

    /// License for display; the registry applies the same default.
    pub fn license(&self) -> &str {
        self.request.license.as_deref().unwrap_or(DEFAULT_LICENSE)
    }

    /// Register the version, then upload its tarball.
    pub async fn publish(&self, registry: &HttpRegistry) -> Result<PublishReceipt> {
        if !registry.is_authenticated() {
            return Err(SkillError::NotAuthenticated);
        }

        let published = registry
            .publish_skill(&self.request)
            .await
            .map_err(publish_error)?;

        let tarball = pack_bundle(&self.source_dir, self.name())?;
        let upload = registry
            .upload_tarball(self.name(), self.version(), tarball)
            .await
            .map_err(publish_error)?;

        tracing::info!(name = %self.name(), version = %self.version(), "skill published");
        Ok(PublishReceipt { published, upload })
    }
}

fn publish_error(err: RegistryError) -> SkillError {
    match err {
        RegistryError::Network { code, message } => SkillError::Network { code, message },
        other => SkillError::Network {
            code: "publish_failed".into(),
            message: other.to_string(),
        },
    }
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// First non-blank line that is not a heading.
fn first_prose_line(markdown: &str) -> Option<String> {
    markdown
        .lines()
        .find(|line| !line.trim().is_empty() && !line.starts_with('#'))
        .map(|line| line.trim().to_owned())
}

// ---------------------------------------------------------------------------
// Packing
// ---------------------------------------------------------------------------

/// Pack `dir` into a gzipped tarball whose entries live under `<name>/`.
///
/// Hidden entries, `node_modules` and symlinks are left out.
pub fn pack_bundle(dir: &Path, name: &str) -> Result<Vec<u8>> {
    let enc = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(enc);
    builder.follow_symlinks(false);

    append_dir(&mut builder, dir, Path::new(name))?;

    let enc = builder.into_inner()?;
    Ok(enc.finish()?)
}

fn append_dir(
    builder: &mut tar::Builder<GzEncoder<Vec<u8>>>,
    dir: &Path,
    prefix: &Path,
) -> Result<()> {
    let mut entries = std::fs::read_dir(dir)?.collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let file_name = entry.file_name();
        let skip = file_name
            .to_str()
            .is_some_and(|n| n.starts_with('.') || n == "node_modules");
        let file_type = entry.file_type()?;
        if skip || file_type.is_symlink() {
            continue;
        }

        let archived = prefix.join(&file_name);
        if file_type.is_dir() {
            append_dir(builder, &entry.path(), &archived)?;
        } else {
            builder.append_path_with_name(entry.path(), &archived)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    const BODY: &str = "This skill reviews pull requests and leaves helpful comments.";

    fn bundle_dir(skill_md: &str) -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(MARKER_FILE), skill_md).unwrap();
        tmp
    }

    #[test]
    fn derives_from_skill_md_alone() {
        let md = format!("# Code Review\n\n{BODY}\n\nCategory: Developer Tools\n");
        let dir = bundle_dir(&md);
        let plan = PublishPlan::from_dir(dir.path()).unwrap();

        assert_eq!(plan.name(), "code-review");
        assert_eq!(plan.version(), DEFAULT_VERSION);
        assert_eq!(plan.request.description.as_deref(), Some(BODY));
        assert_eq!(plan.request.category.as_deref(), Some("Developer Tools"));
        assert_eq!(plan.license(), "MIT");
        assert!(plan.request.readme.is_none());
    }

    #[test]
    fn package_json_takes_precedence() {
        let md = format!("# Code Review\n\n{BODY}\n");
        let dir = bundle_dir(&md);
        std::fs::write(
            dir.path().join("package.json"),
            r#"{
                "name": "pr-reviewer",
                "version": "0.3.0",
                "description": "Reviews PRs",
                "keywords": ["git", "review"],
                "license": "Apache-2.0",
                "repository": {"url": "git+https://github.com/acme/pr-reviewer.git"}
            }"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("README.md"), "readme").unwrap();

        let plan = PublishPlan::from_dir(dir.path()).unwrap();
        assert_eq!(plan.name(), "pr-reviewer");
        assert_eq!(plan.version(), "0.3.0");
        assert_eq!(plan.request.description.as_deref(), Some("Reviews PRs"));
        assert_eq!(plan.request.keywords, vec!["git", "review"]);
        assert_eq!(plan.license(), "Apache-2.0");
        assert_eq!(
            plan.request.repository.as_deref(),
            Some("https://github.com/acme/pr-reviewer")
        );
        assert_eq!(plan.request.readme.as_deref(), Some("readme"));
    }

    #[test]
    fn string_repository_is_kept_verbatim() {
        let dir = bundle_dir(&format!("# X\n{BODY}"));
        std::fs::write(
            dir.path().join("package.json"),
            r#"{"repository": "github:acme/x"}"#,
        )
        .unwrap();
        let plan = PublishPlan::from_dir(dir.path()).unwrap();
        assert_eq!(plan.request.repository.as_deref(), Some("github:acme/x"));
    }

    #[test]
    fn invalid_bundle_is_rejected() {
        let dir = bundle_dir("# Tiny");
        let err = PublishPlan::from_dir(dir.path()).unwrap_err();
        assert!(err.to_string().contains("too short"));
    }

    #[test]
    fn packed_tarball_has_single_wrapper() {
        let dir = bundle_dir(&format!("# X\n{BODY}"));
        std::fs::create_dir_all(dir.path().join("scripts")).unwrap();
        std::fs::write(dir.path().join("scripts/run.sh"), "echo hi").unwrap();
        std::fs::create_dir_all(dir.path().join("node_modules/dep")).unwrap();
        std::fs::write(dir.path().join("node_modules/dep/index.js"), "").unwrap();
        std::fs::write(dir.path().join(".env"), "SECRET=1").unwrap();

        let bytes = pack_bundle(dir.path(), "x").unwrap();
        let mut ar = tar::Archive::new(flate2::read::GzDecoder::new(&bytes[..]));
        let mut names: Vec<String> = Vec::new();
        for entry in ar.entries().unwrap() {
            let mut entry = entry.unwrap();
            names.push(entry.path().unwrap().display().to_string());
            let mut sink = Vec::new();
            entry.read_to_end(&mut sink).unwrap();
        }
        assert_eq!(names, vec!["x/SKILL.md", "x/scripts/run.sh"]);
    }

    #[tokio::test]
    async fn publish_requires_token() {
        let dir = bundle_dir(&format!("# X\n{BODY}"));
        let plan = PublishPlan::from_dir(dir.path()).unwrap();
        let registry = HttpRegistry::with_url("http://127.0.0.1:9", None);
        let err = plan.publish(&registry).await.unwrap_err();
        assert!(matches!(err, SkillError::NotAuthenticated));
    }
}
