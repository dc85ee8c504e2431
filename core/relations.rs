use crate::config::RelationRule;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

/// Computes the ordered related-file candidates for one filename.
///
/// A filename belongs to a kind iff it ends with `<suffix>.<extension>`; the
/// remainder is the base name. Each producer of a matching rule derives one
/// candidate `<base><producer.suffix>.<extension>` under its directory. Every
/// rule is evaluated — overlapping suffixes are not treated as exclusive.
/// Candidates are emitted only if they exist on disk as regular files;
/// absent candidates are skipped silently.
pub fn related_candidates(
    project_root: &Path,
    file_name: &str,
    extension: &str,
    kinds: &IndexMap<String, RelationRule>,
) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    for (kind, rule) in kinds {
        let pattern = format!("{}.{}", rule.suffix, extension);
        let Some(base) = file_name.strip_suffix(&pattern) else {
            continue;
        };
        log::trace!("'{}' matches relation kind '{}'", file_name, kind);
        for producer in &rule.related {
            let candidate_name = format!("{}{}.{}", base, producer.suffix, extension);
            let candidate = project_root.join(&producer.dir).join(&candidate_name);
            if candidate.is_file() {
                log::trace!("Related candidate exists: {}", candidate.display());
                candidates.push(candidate);
            } else {
                log::trace!("Related candidate absent, skipped: {}", candidate.display());
            }
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RelatedProducer;
    use std::fs;
    use tempfile::TempDir;

    fn laravel_kinds() -> IndexMap<String, RelationRule> {
        let mut kinds = IndexMap::new();
        kinds.insert(
            "controller".to_string(),
            RelationRule {
                suffix: "Controller".to_string(),
                related: vec![
                    RelatedProducer {
                        dir: "app/Services".to_string(),
                        suffix: "Service".to_string(),
                    },
                    RelatedProducer {
                        dir: "app/Repositories".to_string(),
                        suffix: "Repository".to_string(),
                    },
                ],
            },
        );
        kinds
    }

    fn write(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "<?php\n").unwrap();
    }

    #[test]
    fn existing_candidates_come_back_in_producer_order() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "app/Services/UserService.php");
        write(tmp.path(), "app/Repositories/UserRepository.php");

        let found = related_candidates(tmp.path(), "UserController.php", "php", &laravel_kinds());
        assert_eq!(
            found,
            vec![
                tmp.path().join("app/Services/UserService.php"),
                tmp.path().join("app/Repositories/UserRepository.php"),
            ]
        );
    }

    #[test]
    fn absent_candidates_are_silently_skipped() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "app/Services/UserService.php");

        let found = related_candidates(tmp.path(), "UserController.php", "php", &laravel_kinds());
        assert_eq!(found, vec![tmp.path().join("app/Services/UserService.php")]);
    }

    #[test]
    fn unmatched_filename_yields_nothing() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "app/Services/UserService.php");

        let found = related_candidates(tmp.path(), "User.php", "php", &laravel_kinds());
        assert!(found.is_empty());
    }

    #[test]
    fn every_matching_rule_contributes() {
        let mut kinds = laravel_kinds();
        kinds.insert(
            "broad".to_string(),
            RelationRule {
                suffix: "ler".to_string(),
                related: vec![RelatedProducer {
                    dir: "app/Extras".to_string(),
                    suffix: "Extra".to_string(),
                }],
            },
        );
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "app/Services/UserService.php");
        write(tmp.path(), "app/Extras/UserControlExtra.php");

        let found = related_candidates(tmp.path(), "UserController.php", "php", &kinds);
        assert_eq!(
            found,
            vec![
                tmp.path().join("app/Services/UserService.php"),
                tmp.path().join("app/Extras/UserControlExtra.php"),
            ]
        );
    }

    #[test]
    fn bare_suffix_filename_has_empty_base() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "app/Services/Service.php");

        let found = related_candidates(tmp.path(), "Controller.php", "php", &laravel_kinds());
        assert_eq!(found, vec![tmp.path().join("app/Services/Service.php")]);
    }
}
