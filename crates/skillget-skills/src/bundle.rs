//! Local skill bundles: validation, name derivation and copying.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, SkillError};

/// The file every bundle must carry.
pub const MARKER_FILE: &str = "SKILL.md";

/// Minimum length of the marker file, in characters, for a publishable bundle.
pub const MIN_MARKER_CHARS: usize = 50;

/// Name used when neither a heading nor a directory name is available.
const FALLBACK_NAME: &str = "local-skill";

static HEADING: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?m)^#+[ \t]*(\S.*?)\s*$").ok());

/// Check a bundle directory; an empty list means it is valid.
pub fn verify_bundle(path: &Path) -> Vec<String> {
    let mut errors = Vec::new();
    let marker = path.join(MARKER_FILE);

    match std::fs::read_to_string(&marker) {
        Ok(content) => {
            if content.chars().count() < MIN_MARKER_CHARS {
                errors.push(format!(
                    "{MARKER_FILE} is too short (minimum {MIN_MARKER_CHARS} characters)"
                ));
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            errors.push(format!("Missing {MARKER_FILE} file"));
        }
        Err(e) => errors.push(format!("Cannot read {MARKER_FILE}: {e}")),
    }

    errors
}

/// Text of the first markdown heading, without its `#` markers.
pub fn first_heading(markdown: &str) -> Option<&str> {
    HEADING
        .as_ref()?
        .captures(markdown)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// `My Great Skill` → `my-great-skill`.
pub fn slugify(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

/// Skill name for a local bundle: the marker file's first heading, else the
/// directory's own name, else `local-skill`.
///
/// Candidates that [`validate_skill_name`] rejects are passed over, so a
/// heading such as `# Git / Tools` falls through to the directory name.
pub fn derive_skill_name(source: &Path, marker_contents: &str) -> String {
    let from_heading = first_heading(marker_contents)
        .map(slugify)
        .filter(|slug| validate_skill_name(slug).is_ok());
    if let Some(slug) = from_heading {
        return slug;
    }

    let dir = std::fs::canonicalize(source).unwrap_or_else(|_| source.to_path_buf());
    dir.file_name()
        .and_then(|n| n.to_str())
        .filter(|n| validate_skill_name(n).is_ok())
        .map(str::to_owned)
        .unwrap_or_else(|| FALLBACK_NAME.to_owned())
}

/// Reject names that could escape the skills directory.
pub fn validate_skill_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        "name is empty"
    } else if name == "." || name == ".." {
        "name cannot be a relative directory"
    } else if name.contains(['/', '\\']) {
        "name cannot contain a path separator"
    } else if name.contains('\0') {
        "name cannot contain NUL"
    } else {
        return Ok(());
    };
    Err(SkillError::InvalidName {
        name: name.to_owned(),
        reason: reason.to_owned(),
    })
}

/// Copy a bundle directory into `dst`, recursively.
///
/// Symlinks are skipped.  Copying a directory onto itself is a no-op, and a
/// destination nested inside the source is never descended into.
pub fn copy_bundle(src: &Path, dst: &Path) -> Result<()> {
    std::fs::create_dir_all(dst)?;

    let src_real = std::fs::canonicalize(src)?;
    let dst_real = std::fs::canonicalize(dst)?;
    if src_real == dst_real {
        tracing::debug!(path = %src_real.display(), "source is the install path, nothing to copy");
        return Ok(());
    }

    copy_dir(&src_real, &dst_real, &dst_real)
}

fn copy_dir(src: &Path, dst: &Path, dst_root: &Path) -> Result<()> {
    std::fs::create_dir_all(dst)?;

    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        let file_type = entry.file_type()?;

        if file_type.is_symlink() || src_path.as_path() == dst_root {
            continue;
        }

        if file_type.is_dir() {
            copy_dir(&src_path, &dst_path, dst_root)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }

    Ok(())
}
