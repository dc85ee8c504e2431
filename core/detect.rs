use crate::matcher::matches_extension;
use std::collections::BTreeSet;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
}

/// Scans the project tree for directories that directly contain at least one
/// file with the given extension. Returns their root-relative paths,
/// separator-terminated, sorted and deduplicated. Hidden directories are
/// pruned; scan errors are logged and skipped.
pub fn suggest_include_paths(project_root: &Path, extension: &str) -> Vec<String> {
    log::debug!(
        "Scanning {} for directories with '.{}' files",
        project_root.display(),
        extension
    );
    let mut dirs = BTreeSet::new();
    let walker = WalkDir::new(project_root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry));

    for entry_result in walker {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Error scanning project tree: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() || !matches_extension(entry.path(), extension) {
            continue;
        }
        let Some(parent) = entry.path().parent() else {
            continue;
        };
        let Some(relative) = pathdiff::diff_paths(parent, project_root) else {
            continue;
        };
        if relative.as_os_str().is_empty() {
            log::trace!("Skipping suggestion for the project root itself");
            continue;
        }
        let mut display = relative.to_string_lossy().replace('\\', "/");
        display.push('/');
        dirs.insert(display);
    }
    dirs.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "<?php\n").unwrap();
    }

    #[test]
    fn finds_directories_directly_containing_extension_files() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "app/Http/Controllers/UserController.php");
        write(tmp.path(), "app/Http/Controllers/PostController.php");
        write(tmp.path(), "app/Services/UserService.php");
        write(tmp.path(), "docs/readme.md");
        write(tmp.path(), ".hidden/Secret.php");

        let suggested = suggest_include_paths(tmp.path(), "php");
        assert_eq!(
            suggested,
            vec![
                "app/Http/Controllers/".to_string(),
                "app/Services/".to_string(),
            ]
        );
    }

    #[test]
    fn root_level_files_produce_no_suggestion() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "index.php");
        assert!(suggest_include_paths(tmp.path(), "php").is_empty());
    }
}
