use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Lockfile names picked up when walking a directory.
pub const DEFAULT_LOCKFILE_NAMES: &[&str] = &[
    "package-lock.json",
    "npm-shrinkwrap.json",
    "pnpm-lock.yaml",
    "yarn.lock",
];

/// Directory names never descended into.
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &["node_modules", ".git"];

/// Collects lockfiles under `root` in a stable, name-sorted order.
///
/// A `root` that is itself a file is returned as-is, whatever its name.
/// Unreadable directory entries are skipped.
pub fn discover_lockfiles(
    root: &Path,
    lockfile_names: &[String],
    exclude_dirs: &[String],
) -> Vec<PathBuf> {
    if root.is_file() {
        return vec![root.to_path_buf()];
    }

    let is_excluded = |entry: &DirEntry| {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| exclude_dirs.iter().any(|d| d == name))
    };

    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_excluded(entry))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!(error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| lockfile_names.iter().any(|n| n == name))
        })
        .map(DirEntry::into_path)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn defaults() -> (Vec<String>, Vec<String>) {
        (
            DEFAULT_LOCKFILE_NAMES.iter().map(|s| s.to_string()).collect(),
            DEFAULT_EXCLUDE_DIRS.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn finds_known_lockfiles_and_skips_node_modules() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("web")).unwrap();
        fs::create_dir_all(root.join("api")).unwrap();
        fs::create_dir_all(root.join("node_modules/dep")).unwrap();
        fs::write(root.join("web/pnpm-lock.yaml"), "").unwrap();
        fs::write(root.join("api/package-lock.json"), "{}").unwrap();
        fs::write(root.join("api/package.json"), "{}").unwrap();
        fs::write(root.join("node_modules/dep/package-lock.json"), "{}").unwrap();

        let (names, excludes) = defaults();
        let found = discover_lockfiles(root, &names, &excludes);

        assert_eq!(
            found,
            vec![
                root.join("api/package-lock.json"),
                root.join("web/pnpm-lock.yaml"),
            ]
        );
    }

    #[test]
    fn explicit_file_is_returned_regardless_of_name() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("custom.lock");
        fs::write(&file, "").unwrap();

        let (names, excludes) = defaults();
        assert_eq!(discover_lockfiles(&file, &names, &excludes), vec![file]);
    }

    #[test]
    fn missing_root_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (names, excludes) = defaults();
        assert!(discover_lockfiles(&dir.path().join("nope"), &names, &excludes).is_empty());
    }
}
