use crate::collect::collect_files;
use crate::config::{BundleConfig, MatchMode};
use crate::error::Result;
use crate::matcher::PathMatcher;
use crate::relations::related_candidates;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BundledFile {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    PathNotFound,
    FileRead,
    Walk,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct Bundle {
    pub files: Vec<BundledFile>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl Bundle {
    /// Canonical text form: the banner line, then one block per file with a
    /// blank line, a `// FILE:` marker and the raw content.
    pub fn render(&self, banner: &str) -> String {
        let mut out = String::new();
        out.push_str(banner);
        out.push('\n');
        for file in &self.files {
            out.push('\n');
            out.push_str("// FILE: ");
            out.push_str(&file.path);
            out.push('\n');
            out.push_str(&file.content);
            out.push('\n');
        }
        out
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        if pretty {
            Ok(serde_json::to_string_pretty(self)?)
        } else {
            Ok(serde_json::to_string(self)?)
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yml::to_string(self)?)
    }
}

/// Bundles one project tree: top-level collection per the configured path
/// policy, then depth-first emission following relation rules. Per-item
/// failures become diagnostics; the build itself never fails.
pub fn build_bundle(project_root: &Path, config: &BundleConfig) -> Bundle {
    BundleBuilder::new(project_root, config).build()
}

/// The top-level file list the bundler would start from, without reading any
/// content. Shared with the debug command.
pub fn collect_top_level(
    project_root: &Path,
    config: &BundleConfig,
) -> (Vec<PathBuf>, Vec<Diagnostic>) {
    let matcher = PathMatcher::from_config(&config.paths);
    let extension = config.effective_extension();
    let mut diagnostics = Vec::new();
    let mut files = Vec::new();

    match config.paths.mode {
        MatchMode::Include => {
            for entry in &config.paths.include {
                let dir = project_root.join(entry.trim_end_matches(['/', '\\']));
                if !dir.is_dir() {
                    log::warn!("Include path not found: {}", dir.display());
                    diagnostics.push(Diagnostic {
                        kind: DiagnosticKind::PathNotFound,
                        path: entry.clone(),
                        message: format!(
                            "Include path not found under {}",
                            project_root.display()
                        ),
                    });
                    continue;
                }
                for file in
                    collect_files(&dir, extension, config.source.use_gitignore, &mut diagnostics)
                {
                    if matcher.is_match(&relative_to(&file, project_root)) {
                        files.push(file);
                    }
                }
            }
        }
        MatchMode::Exclude => {
            if !project_root.is_dir() {
                diagnostics.push(Diagnostic {
                    kind: DiagnosticKind::PathNotFound,
                    path: project_root.display().to_string(),
                    message: "Project root is not a directory".to_string(),
                });
                return (files, diagnostics);
            }
            for file in collect_files(
                project_root,
                extension,
                config.source.use_gitignore,
                &mut diagnostics,
            ) {
                if matcher.is_match(&relative_to(&file, project_root)) {
                    files.push(file);
                }
            }
        }
    }
    (files, diagnostics)
}

fn relative_to(path: &Path, project_root: &Path) -> PathBuf {
    pathdiff::diff_paths(path, project_root).unwrap_or_else(|| path.to_path_buf())
}

pub struct BundleBuilder<'a> {
    project_root: &'a Path,
    config: &'a BundleConfig,
    matcher: PathMatcher,
    extension: String,
    visited: HashSet<PathBuf>,
    bundle: Bundle,
}

impl<'a> BundleBuilder<'a> {
    pub fn new(project_root: &'a Path, config: &'a BundleConfig) -> Self {
        Self {
            project_root,
            config,
            matcher: PathMatcher::from_config(&config.paths),
            extension: config.effective_extension().to_string(),
            visited: HashSet::new(),
            bundle: Bundle::default(),
        }
    }

    pub fn build(mut self) -> Bundle {
        let (top_level, mut diagnostics) = collect_top_level(self.project_root, self.config);
        self.bundle.diagnostics.append(&mut diagnostics);
        for file in top_level {
            self.emit(&file);
        }
        log::info!(
            "Bundled {} files ({} diagnostics).",
            self.bundle.files.len(),
            self.bundle.diagnostics.len()
        );
        self.bundle
    }

    fn emit(&mut self, path: &Path) {
        let canonical = match fs::canonicalize(path) {
            Ok(c) => c,
            Err(e) => {
                self.push_read_diagnostic(path, &e.to_string());
                return;
            }
        };
        // Mark before recursing: relation rules may form cycles.
        if !self.visited.insert(canonical) {
            log::trace!("Already bundled, skipping: {}", path.display());
            return;
        }

        let relative = relative_to(path, self.project_root);
        let bytes = match fs::read(path) {
            Ok(b) => b,
            Err(e) => {
                self.push_read_diagnostic(path, &e.to_string());
                return;
            }
        };
        let content = match String::from_utf8(bytes) {
            Ok(c) => c,
            Err(e) => {
                self.push_read_diagnostic(path, &format!("not valid UTF-8: {}", e));
                return;
            }
        };

        log::debug!("Bundling: {}", relative.display());
        self.bundle.files.push(BundledFile {
            path: relative.to_string_lossy().replace('\\', "/"),
            content,
        });

        if !self.config.source.follow_related {
            return;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            return;
        };
        for candidate in related_candidates(
            self.project_root,
            file_name,
            &self.extension,
            &self.config.relations,
        ) {
            if !self
                .matcher
                .allows_related(&relative_to(&candidate, self.project_root))
            {
                log::trace!("Related candidate excluded: {}", candidate.display());
                continue;
            }
            self.emit(&candidate);
        }
    }

    fn push_read_diagnostic(&mut self, path: &Path, message: &str) {
        log::warn!("Failed to read {}: {}", path.display(), message);
        self.bundle.diagnostics.push(Diagnostic {
            kind: DiagnosticKind::FileRead,
            path: relative_to(path, self.project_root)
                .to_string_lossy()
                .replace('\\', "/"),
            message: message.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Bundle {
        Bundle {
            files: vec![
                BundledFile {
                    path: "app/One.php".to_string(),
                    content: "<?php\necho 1;\n".to_string(),
                },
                BundledFile {
                    path: "app/Two.php".to_string(),
                    content: "<?php\necho 2;".to_string(),
                },
            ],
            diagnostics: Vec::new(),
        }
    }

    #[test]
    fn render_places_banner_and_markers() {
        let text = sample().render("// LOGIC CODE BUNDLE");
        assert_eq!(
            text,
            "// LOGIC CODE BUNDLE\n\
             \n// FILE: app/One.php\n<?php\necho 1;\n\n\
             \n// FILE: app/Two.php\n<?php\necho 2;\n"
        );
    }

    #[test]
    fn render_of_empty_bundle_is_banner_only() {
        let bundle = Bundle::default();
        assert_eq!(bundle.render("// LOGIC CODE BUNDLE"), "// LOGIC CODE BUNDLE\n");
    }

    #[test]
    fn json_omits_empty_diagnostics() {
        let json = sample().to_json(false).unwrap();
        assert!(!json.contains("diagnostics"));
        assert!(json.contains("\"path\":\"app/One.php\""));
    }

    #[test]
    fn json_carries_diagnostics_when_present() {
        let mut bundle = sample();
        bundle.diagnostics.push(Diagnostic {
            kind: DiagnosticKind::PathNotFound,
            path: "app/Missing/".to_string(),
            message: "Include path not found under /tmp/x".to_string(),
        });
        let json = bundle.to_json(false).unwrap();
        assert!(json.contains("\"kind\":\"path_not_found\""));
    }
}
