//! Artifact materializer: turn a fetched artifact into files on disk.
//!
//! An artifact is an optional gzipped tarball plus optional inline files.
//! The tarball is staged in a scratch file, extracted with its top-level
//! wrapper directory stripped, and the scratch file is removed on every exit
//! path.  Inline files are then written under their fixed names, replacing
//! whatever the archive put there.
//!
//! Extraction is not transactional: a failure part way through leaves the
//! target directory partially populated.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use crate::error::Result;

/// Contents of one skill version, ready to be written.
#[derive(Debug, Clone, Default)]
pub struct Artifact {
    /// Gzipped tarball with a single wrapper directory.
    pub archive: Option<Vec<u8>>,
    /// Filename (relative to the target directory) → contents.
    pub inline_files: BTreeMap<String, String>,
}

/// Writes artifacts into install directories.
#[derive(Debug, Clone)]
pub struct Materializer {
    scratch_dir: PathBuf,
}

impl Materializer {
    /// Archives are staged under `scratch_dir` while they are extracted.
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
        }
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Populate `target_dir` from `artifact`.
    pub fn materialize(&self, target_dir: &Path, artifact: &Artifact) -> Result<()> {
        fs::create_dir_all(target_dir)?;

        if let Some(bytes) = &artifact.archive {
            fs::create_dir_all(&self.scratch_dir)?;

            // Removed when `scratch` drops, whichever way this block exits.
            let mut scratch = tempfile::Builder::new()
                .prefix("skill-")
                .suffix(".tar.gz")
                .tempfile_in(&self.scratch_dir)?;
            scratch.write_all(bytes)?;
            scratch.flush()?;

            tracing::debug!(
                scratch = %scratch.path().display(),
                target = %target_dir.display(),
                size = bytes.len(),
                "extracting archive"
            );
            extract_strip_one(scratch.path(), target_dir)?;
        }

        for (filename, contents) in &artifact.inline_files {
            fs::write(target_dir.join(filename), contents)?;
        }

        Ok(())
    }
}

/// Extract a `.tar.gz` into `dest`, dropping the first path component of
/// every entry.
///
/// Entries that sit directly at the archive root, or whose remaining path is
/// not made of plain names, are skipped.  Only regular files and directories
/// are unpacked.
pub fn extract_strip_one(archive_path: &Path, dest: &Path) -> std::io::Result<()> {
    let file = fs::File::open(archive_path)?;
    let gz = flate2::read::GzDecoder::new(file);
    let mut ar = tar::Archive::new(gz);

    for entry in ar.entries()? {
        let mut entry = entry?;
        let path = entry.path()?.into_owned();

        let Some(relative) = strip_first_component(&path) else {
            continue;
        };
        let out = dest.join(&relative);

        let kind = entry.header().entry_type();
        if kind.is_dir() {
            fs::create_dir_all(&out)?;
        } else if kind.is_file() {
            if let Some(parent) = out.parent() {
                fs::create_dir_all(parent)?;
            }
            entry.unpack(&out)?;
        } else {
            tracing::debug!(path = %path.display(), "skipping non-regular archive entry");
        }
    }

    Ok(())
}

/// `wrapper/a/b` → `a/b`, and `./a/b` → `a/b`.
///
/// A leading `.` counts as the stripped component, as it does for archives
/// packed with `tar -C dir .`.  Returns `None` when nothing is left or the
/// path contains anything other than plain names.
fn strip_first_component(path: &Path) -> Option<PathBuf> {
    let mut components = path.components();
    match components.next()? {
        Component::Normal(_) | Component::CurDir => {}
        _ => return None,
    }

    let mut out = PathBuf::new();
    for component in components {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if out.as_os_str().is_empty() {
        None
    } else {
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;

    fn targz(entries: &[(&str, &str)]) -> Vec<u8> {
        let enc = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(enc);
        for (path, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, path, data.as_bytes()).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    /// Like [`targz`] but keeps names verbatim, so `./` prefixes survive.
    fn targz_raw(entries: &[(&str, tar::EntryType, &str)]) -> Vec<u8> {
        let enc = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(enc);
        for (name, kind, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.as_old_mut().name[..name.len()].copy_from_slice(name.as_bytes());
            header.set_entry_type(*kind);
            header.set_size(data.len() as u64);
            header.set_mode(if kind.is_dir() { 0o755 } else { 0o644 });
            header.set_cksum();
            builder.append(&header, data.as_bytes()).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    fn scratch_is_empty(dir: &Path) -> bool {
        !dir.exists() || fs::read_dir(dir).unwrap().next().is_none()
    }

    #[test]
    fn strips_wrapper_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("skills").join("foo");
        let m = Materializer::new(tmp.path().join("scratch"));

        let artifact = Artifact {
            archive: Some(targz(&[
                ("wrapper/SKILL.md", "# Foo"),
                ("wrapper/assets/x.png", "png"),
            ])),
            ..Default::default()
        };
        m.materialize(&target, &artifact).unwrap();

        assert_eq!(fs::read_to_string(target.join("SKILL.md")).unwrap(), "# Foo");
        assert_eq!(fs::read(target.join("assets/x.png")).unwrap(), b"png");
        assert!(!target.join("wrapper").exists());
        assert!(scratch_is_empty(m.scratch_dir()));
    }

    #[test]
    fn dot_rooted_archive_keeps_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("foo");
        let m = Materializer::new(tmp.path().join("scratch"));

        let artifact = Artifact {
            archive: Some(targz_raw(&[
                ("./", tar::EntryType::Directory, ""),
                ("./SKILL.md", tar::EntryType::Regular, "# Foo"),
                ("./assets/", tar::EntryType::Directory, ""),
                ("./assets/x.png", tar::EntryType::Regular, "png"),
            ])),
            ..Default::default()
        };
        m.materialize(&target, &artifact).unwrap();

        assert_eq!(fs::read_to_string(target.join("SKILL.md")).unwrap(), "# Foo");
        assert_eq!(fs::read(target.join("assets/x.png")).unwrap(), b"png");
        assert!(!target.join("x.png").exists());
        assert!(scratch_is_empty(m.scratch_dir()));
    }

    #[test]
    fn root_level_entries_are_dropped() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("foo");
        let m = Materializer::new(tmp.path().join("scratch"));

        let artifact = Artifact {
            archive: Some(targz(&[("stray.txt", "x"), ("pkg/keep.txt", "y")])),
            ..Default::default()
        };
        m.materialize(&target, &artifact).unwrap();

        assert!(!target.join("stray.txt").exists());
        assert!(target.join("keep.txt").exists());
    }

    #[test]
    fn scratch_removed_when_extraction_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("foo");
        let m = Materializer::new(tmp.path().join("scratch"));

        let artifact = Artifact {
            archive: Some(b"definitely not gzip".to_vec()),
            ..Default::default()
        };
        assert!(m.materialize(&target, &artifact).is_err());
        assert!(scratch_is_empty(m.scratch_dir()));
    }

    #[test]
    fn inline_files_overwrite_archive_contents() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("foo");
        let m = Materializer::new(tmp.path().join("scratch"));

        let mut inline = BTreeMap::new();
        inline.insert("SKILL.md".to_owned(), "# Inline".to_owned());
        let artifact = Artifact {
            archive: Some(targz(&[("foo/SKILL.md", "# Archived")])),
            inline_files: inline,
        };
        m.materialize(&target, &artifact).unwrap();

        assert_eq!(fs::read_to_string(target.join("SKILL.md")).unwrap(), "# Inline");
    }

    #[test]
    fn inline_only_creates_target() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("a").join("b");
        let m = Materializer::new(tmp.path().join("scratch"));

        let mut inline = BTreeMap::new();
        inline.insert("README.md".to_owned(), "hi".to_owned());
        m.materialize(
            &target,
            &Artifact {
                archive: None,
                inline_files: inline,
            },
        )
        .unwrap();

        assert!(target.join("README.md").exists());
        assert!(!m.scratch_dir().exists());
    }

    #[test]
    fn strip_first_component_rules() {
        assert_eq!(
            strip_first_component(Path::new("w/a/b.txt")),
            Some(PathBuf::from("a/b.txt"))
        );
        assert_eq!(
            strip_first_component(Path::new("./w/a")),
            Some(PathBuf::from("w/a"))
        );
        assert_eq!(
            strip_first_component(Path::new("./SKILL.md")),
            Some(PathBuf::from("SKILL.md"))
        );
        assert_eq!(strip_first_component(Path::new("./")), None);
        assert_eq!(strip_first_component(Path::new("./../x")), None);
        assert_eq!(strip_first_component(Path::new("w")), None);
        assert_eq!(strip_first_component(Path::new("w/../../etc")), None);
        assert_eq!(strip_first_component(Path::new("/abs/x")), None);
    }
}
