//! Per-AOV file naming: `<base>.<suffix>.<ext>`.
//!
//! A render written one file per pass looks like
//! `shot_010.diffuse.exr`, `shot_010.specular.exr`, ... The last dotted
//! segment of the stem is the AOV suffix, everything before it is the base
//! name shared by all passes of the render.

use anyhow::{Context, Result};
use log::debug;
use std::path::{Path, PathBuf};

use crate::entities::WorkingSet;

use super::media;

/// Parsed `<base>.<suffix>.<ext>` file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AovFileName {
    pub base: String,
    pub suffix: String,
}

/// One file on disk matched to an AOV of the working set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AovFile {
    pub path: PathBuf,
    pub key: String,
    pub suffix: String,
}

/// Split a file name into base name and suffix token.
///
/// Returns None when the stem has no dot (no suffix token).
pub fn split_aov_name(file_name: &str) -> Option<AovFileName> {
    let stem = Path::new(file_name).file_stem()?.to_str()?;
    let (base, suffix) = stem.rsplit_once('.')?;
    if suffix.is_empty() {
        return None;
    }

    Some(AovFileName {
        base: base.to_string(),
        suffix: suffix.to_string(),
    })
}

/// Base name of a representative file (`shot.diffuse.exr` -> `shot`).
///
/// A stem without dots has an empty base name: nothing can share it.
pub fn base_name(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .and_then(split_aov_name)
        .map(|n| n.base)
        .unwrap_or_default()
}

/// List plain file names in a directory, in whatever order the OS returns.
pub fn list_directory(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to list directory: {}", dir.display()))?;

    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to read entry in: {}", dir.display()))?;
        if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
    }

    Ok(names)
}

/// Pick the files of `names` that belong to the same render as `base` and
/// carry a suffix of the working set.
///
/// Result is sorted by suffix, then file name, so the graph does not depend
/// on directory listing order.
pub fn match_aov_files(
    dir: &Path,
    names: &[String],
    base: &str,
    set: &WorkingSet,
    extensions: &[String],
) -> Vec<AovFile> {
    if base.is_empty() {
        return Vec::new();
    }

    let mut files: Vec<AovFile> = names
        .iter()
        .filter(|name| media::has_extension(Path::new(name.as_str()), extensions))
        .filter_map(|name| {
            let parsed = split_aov_name(name)?;
            if parsed.base != base {
                return None;
            }
            let key = set.key_for_suffix(&parsed.suffix)?;
            debug!("Matched {} -> AOV '{}'", name, key);
            Some(AovFile {
                path: dir.join(name),
                key: key.to_string(),
                suffix: parsed.suffix,
            })
        })
        .collect();

    files.sort_by(|a, b| a.suffix.cmp(&b.suffix).then_with(|| a.path.cmp(&b.path)));
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exr() -> Vec<String> {
        vec!["exr".to_string()]
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_split_aov_name() {
        assert_eq!(
            split_aov_name("shot.diffuse.exr"),
            Some(AovFileName { base: "shot".into(), suffix: "diffuse".into() })
        );
        assert_eq!(
            split_aov_name("shot_010.v002.rawGI.exr"),
            Some(AovFileName { base: "shot_010.v002".into(), suffix: "rawGI".into() })
        );
        assert_eq!(split_aov_name("shot.exr"), None);
        assert_eq!(split_aov_name("shot."), None);
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name(Path::new("/renders/shot.diffuse.exr")), "shot");
        assert_eq!(base_name(Path::new("/renders/shot.exr")), "");
    }

    #[test]
    fn test_match_filters_and_sorts() {
        let set = WorkingSet::from_pairs([("diffuse", "diffuse"), ("specular", "specular")]).unwrap();
        let listing = names(&[
            "shot.specular.exr",
            "shot.beauty.exr",
            "other.diffuse.exr",
            "shot.diffuse.exr",
            "shot.diffuse.tif",
            "shot.exr",
            "notes.txt",
        ]);

        let files = match_aov_files(Path::new("/r"), &listing, "shot", &set, &exr());
        let got: Vec<_> = files.iter().map(|f| (f.key.as_str(), f.path.clone())).collect();
        assert_eq!(
            got,
            vec![
                ("diffuse", PathBuf::from("/r/shot.diffuse.exr")),
                ("specular", PathBuf::from("/r/shot.specular.exr")),
            ]
        );
    }

    #[test]
    fn test_match_uses_suffix_not_key() {
        let set = WorkingSet::from_pairs([("reflection", "reflect")]).unwrap();
        let listing = names(&["shot.reflection.exr", "shot.reflect.exr"]);

        let files = match_aov_files(Path::new("/r"), &listing, "shot", &set, &exr());
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].key, "reflection");
        assert_eq!(files[0].suffix, "reflect");
    }

    #[test]
    fn test_match_empty_base_or_set() {
        let set = WorkingSet::new();
        let listing = names(&["shot.diffuse.exr"]);
        assert!(match_aov_files(Path::new("/r"), &listing, "shot", &set, &exr()).is_empty());

        let set = WorkingSet::from_pairs([("diffuse", "diffuse")]).unwrap();
        assert!(match_aov_files(Path::new("/r"), &listing, "", &set, &exr()).is_empty());
    }

    #[test]
    fn test_list_directory_skips_subdirs() {
        use std::fs;

        let temp_dir = std::env::temp_dir().join("aov_compositor_test_list_directory");
        let _ = fs::remove_dir_all(&temp_dir);
        fs::create_dir_all(temp_dir.join("sub.diffuse.exr")).unwrap();
        fs::write(temp_dir.join("shot.diffuse.exr"), b"").unwrap();

        let listing = list_directory(&temp_dir).unwrap();
        assert_eq!(listing, vec!["shot.diffuse.exr".to_string()]);

        let _ = fs::remove_dir_all(&temp_dir);
    }

    #[test]
    fn test_list_missing_directory_fails() {
        let missing = std::env::temp_dir().join("aov_compositor_test_missing_dir_xyz");
        assert!(list_directory(&missing).is_err());
    }
}
