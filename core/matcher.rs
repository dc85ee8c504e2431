use crate::config::{MatchMode, PathsConfig};
use std::path::{Path, PathBuf};

/// One configured exclusion entry. A trailing separator in the config string
/// means "this directory and everything beneath it"; without it the entry
/// matches only the exact relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcludePrefix {
    pub path: PathBuf,
    pub subtree: bool,
}

impl ExcludePrefix {
    fn from_entry(entry: &str) -> Self {
        let subtree = entry.ends_with('/') || entry.ends_with('\\');
        Self {
            path: PathBuf::from(entry.trim_end_matches(['/', '\\'])),
            subtree,
        }
    }

    fn excludes(&self, relative: &Path) -> bool {
        if self.subtree {
            relative.starts_with(&self.path)
        } else {
            relative == self.path
        }
    }
}

/// Path eligibility policy, built once per run from `[paths]`.
///
/// Prefix tests are component-wise: including or excluding `app/Http` never
/// captures `app/HttpClient`.
#[derive(Debug, Clone)]
pub enum PathMatcher {
    Include { prefixes: Vec<PathBuf> },
    Exclude { prefixes: Vec<ExcludePrefix> },
}

impl PathMatcher {
    pub fn from_config(paths: &PathsConfig) -> Self {
        match paths.mode {
            MatchMode::Include => PathMatcher::Include {
                prefixes: paths
                    .include
                    .iter()
                    .map(|entry| PathBuf::from(entry.trim_end_matches(['/', '\\'])))
                    .collect(),
            },
            MatchMode::Exclude => PathMatcher::Exclude {
                prefixes: paths
                    .exclude
                    .iter()
                    .map(|entry| ExcludePrefix::from_entry(entry))
                    .collect(),
            },
        }
    }

    /// Whether a root-relative file path is eligible for top-level collection.
    pub fn is_match(&self, relative: &Path) -> bool {
        match self {
            PathMatcher::Include { prefixes } => {
                prefixes.iter().any(|prefix| relative.starts_with(prefix))
            }
            PathMatcher::Exclude { prefixes } => {
                !prefixes.iter().any(|prefix| prefix.excludes(relative))
            }
        }
    }

    /// Whether a related-file candidate at this root-relative path may be
    /// pulled in. Related files are allowed to live outside the include
    /// list, but exclusions still apply.
    pub fn allows_related(&self, relative: &Path) -> bool {
        match self {
            PathMatcher::Include { .. } => true,
            PathMatcher::Exclude { .. } => self.is_match(relative),
        }
    }
}

/// Exact comparison on the final extension component, case-sensitive.
pub fn matches_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .map(|ext| ext == extension)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PathsConfig;

    fn include_matcher(entries: &[&str]) -> PathMatcher {
        PathMatcher::from_config(&PathsConfig {
            mode: MatchMode::Include,
            include: entries.iter().map(|s| s.to_string()).collect(),
            exclude: Vec::new(),
        })
    }

    fn exclude_matcher(entries: &[&str]) -> PathMatcher {
        PathMatcher::from_config(&PathsConfig {
            mode: MatchMode::Exclude,
            include: Vec::new(),
            exclude: entries.iter().map(|s| s.to_string()).collect(),
        })
    }

    #[test]
    fn include_prefix_is_component_wise() {
        let matcher = include_matcher(&["app/Http/"]);
        assert!(matcher.is_match(Path::new("app/Http/Controllers/UserController.php")));
        assert!(!matcher.is_match(Path::new("app/HttpClient/Client.php")));
    }

    #[test]
    fn include_mode_allows_related_anywhere() {
        let matcher = include_matcher(&["app/Http/Controllers/"]);
        assert!(matcher.allows_related(Path::new("app/Services/UserService.php")));
    }

    #[test]
    fn exclude_with_trailing_separator_covers_subtree() {
        let matcher = exclude_matcher(&["app/Http/"]);
        assert!(!matcher.is_match(Path::new("app/Http/Controllers/UserController.php")));
        assert!(matcher.is_match(Path::new("app/HttpHelpers/util.php")));
    }

    #[test]
    fn exclude_without_separator_is_exact() {
        let matcher = exclude_matcher(&["app/Http"]);
        assert!(!matcher.is_match(Path::new("app/Http")));
        assert!(matcher.is_match(Path::new("app/Http/Controllers/UserController.php")));
        assert!(matcher.is_match(Path::new("app/HttpClient/Client.php")));
    }

    #[test]
    fn exclude_mode_gates_related_candidates() {
        let matcher = exclude_matcher(&["app/Services/"]);
        assert!(!matcher.allows_related(Path::new("app/Services/UserService.php")));
        assert!(matcher.allows_related(Path::new("app/Repositories/UserRepository.php")));
    }

    #[test]
    fn extension_comparison_is_exact() {
        assert!(matches_extension(Path::new("a/UserController.php"), "php"));
        assert!(!matches_extension(Path::new("a/UserController.php3"), "php"));
        assert!(!matches_extension(Path::new("a/UserController.PHP"), "php"));
        assert!(!matches_extension(Path::new("a/Makefile"), "php"));
    }
}
