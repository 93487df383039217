use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::config::Config;

/// Files eligible for scanning plus a notice for every path that was skipped.
#[derive(Debug, Default)]
pub struct Discovery {
    pub files: Vec<PathBuf>,
    pub skipped: Vec<String>,
}

pub fn is_file_eligible_to_scan(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("md")
}

/// Resolves command-line paths to a sorted, de-duplicated list of Markdown
/// files. Directories are walked; `ignore` globs prune both directories and
/// files found during the walk.
pub fn collect_files(paths: &[PathBuf], config: &Config) -> Discovery {
    let ignore_set = build_glob_set(&config.ignore);
    let mut files = BTreeSet::new();
    let mut skipped = Vec::new();

    for path in paths {
        if !path.exists() {
            skipped.push(format!(
                "Provided path '{}' does not exist. Skipping.",
                path.display()
            ));
        } else if path.is_dir() {
            walk_dir(path, path, &ignore_set, &mut files);
        } else if is_file_eligible_to_scan(path) {
            files.insert(path.clone());
        } else {
            skipped.push(format!(
                "Provided file path '{}' is not a valid markdown file. Skipping.",
                path.display()
            ));
        }
    }

    Discovery {
        files: files.into_iter().collect(),
        skipped,
    }
}

pub(crate) fn build_glob_set(patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    patterns
        .iter()
        .filter_map(|p| GlobBuilder::new(p).case_insensitive(true).build().ok())
        .for_each(|glob| {
            builder.add(glob);
        });
    builder.build().unwrap_or_default()
}

fn matches_glob(path: &Path, root: &Path, set: &GlobSet) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| set.is_match(name))
        || path.strip_prefix(root).is_ok_and(|rel| set.is_match(rel))
}

fn walk_dir(dir: &Path, root: &Path, ignore: &GlobSet, files: &mut BTreeSet<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "unable to read directory");
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();

        if matches_glob(&path, root, ignore) {
            continue;
        }

        if path.is_dir() {
            walk_dir(&path, root, ignore, files);
        } else if is_file_eligible_to_scan(&path) {
            files.insert(path);
        }
    }
}
