use crate::bundle::{Diagnostic, DiagnosticKind};
use crate::matcher::matches_extension;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Recursively collects every file with the given extension under `dir`, in
/// directory-listing order (no sorting imposed). A missing directory yields
/// zero files; walk errors land in `diagnostics` and traversal continues
/// with siblings.
pub fn collect_files(
    dir: &Path,
    extension: &str,
    use_gitignore: bool,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<PathBuf> {
    if !dir.is_dir() {
        log::debug!("Not a directory, nothing to collect: {}", dir.display());
        return Vec::new();
    }

    let mut builder = WalkBuilder::new(dir);
    builder.hidden(false);
    builder.ignore(use_gitignore);
    builder.git_ignore(use_gitignore);
    builder.git_exclude(use_gitignore);
    builder.git_global(use_gitignore);
    builder.parents(use_gitignore);
    builder.require_git(false);
    builder.follow_links(false);
    log::debug!(
        "Collecting '.{}' files under {} (gitignore: {})",
        extension,
        dir.display(),
        use_gitignore
    );

    let mut files = Vec::new();
    for entry_result in builder.build() {
        match entry_result {
            Ok(entry) => {
                if entry.depth() == 0 {
                    continue;
                }
                let is_file = entry.file_type().map_or(false, |ft| ft.is_file());
                if is_file && matches_extension(entry.path(), extension) {
                    log::trace!("Collected: {}", entry.path().display());
                    files.push(entry.into_path());
                }
            }
            Err(e) => {
                log::warn!("Error walking {}: {}", dir.display(), e);
                diagnostics.push(Diagnostic {
                    kind: DiagnosticKind::Walk,
                    path: dir.display().to_string(),
                    message: e.to_string(),
                });
            }
        }
    }
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
    }

    #[test]
    fn collects_matching_files_recursively() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a/One.php", "<?php\n");
        write(tmp.path(), "a/deep/Two.php", "<?php\n");
        write(tmp.path(), "a/notes.md", "# notes\n");

        let mut diagnostics = Vec::new();
        let mut found = collect_files(&tmp.path().join("a"), "php", false, &mut diagnostics);
        found.sort();

        assert_eq!(
            found,
            vec![
                tmp.path().join("a/One.php"),
                tmp.path().join("a/deep/Two.php"),
            ]
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn missing_directory_yields_nothing() {
        let tmp = TempDir::new().unwrap();
        let mut diagnostics = Vec::new();
        let found = collect_files(&tmp.path().join("absent"), "php", false, &mut diagnostics);
        assert!(found.is_empty());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn gitignore_is_only_honored_when_enabled() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), ".gitignore", "Skipped.php\n");
        write(tmp.path(), "Skipped.php", "<?php\n");
        write(tmp.path(), "Kept.php", "<?php\n");

        let mut diagnostics = Vec::new();
        let mut all = collect_files(tmp.path(), "php", false, &mut diagnostics);
        all.sort();
        assert_eq!(
            all,
            vec![tmp.path().join("Kept.php"), tmp.path().join("Skipped.php")]
        );

        let filtered = collect_files(tmp.path(), "php", true, &mut diagnostics);
        assert_eq!(filtered, vec![tmp.path().join("Kept.php")]);
    }
}
