use crate::error::{AppError, Result};
use indexmap::IndexMap;
use parse_duration::parse;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_DIR: &str = ".xtools/xbundle";
pub const DEFAULT_CONFIG_FILENAME: &str = "xbundle.toml";
pub const DEFAULT_OUTPUT_DIR: &str = ".xtools/xbundle/out";
pub const DEFAULT_WATCH_DELAY: &str = "300ms";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BundleConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default = "default_relations")]
    pub relations: IndexMap<String, RelationRule>,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub save: SaveConfig,
    #[serde(default)]
    pub watch: WatchConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    Include,
    Exclude,
}

impl Default for MatchMode {
    fn default() -> Self {
        MatchMode::Include
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    #[serde(default)]
    pub mode: MatchMode,
    #[serde(default = "default_include_paths")]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(default = "default_true")]
    pub follow_related: bool,
    #[serde(default = "default_false")]
    pub use_gitignore: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RelationRule {
    pub suffix: String,
    #[serde(default)]
    pub related: Vec<RelatedProducer>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RelatedProducer {
    pub dir: String,
    pub suffix: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_banner")]
    pub banner: String,
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_true")]
    pub json_minify: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SaveConfig {
    #[serde(default = "default_save_dir_config")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub filename_base: Option<String>,
    #[serde(default)]
    pub extension: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct WatchConfig {
    #[serde(default = "default_watch_delay_string")]
    pub delay: String,
}

fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_extension() -> String {
    "php".to_string()
}
fn default_format() -> String {
    "text".to_string()
}
fn default_banner() -> String {
    "// LOGIC CODE BUNDLE".to_string()
}
fn default_save_dir_config() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}
fn default_watch_delay_string() -> String {
    DEFAULT_WATCH_DELAY.to_string()
}
fn default_include_paths() -> Vec<String> {
    [
        "app/Http/Controllers/",
        "app/Services/",
        "app/Models/",
        "app/Repositories/",
        "app/Actions/",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_relations() -> IndexMap<String, RelationRule> {
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
    kinds.insert(
        "service".to_string(),
        RelationRule {
            suffix: "Service".to_string(),
            related: vec![
                RelatedProducer {
                    dir: "app/Http/Controllers".to_string(),
                    suffix: "Controller".to_string(),
                },
                RelatedProducer {
                    dir: "app/Actions".to_string(),
                    suffix: "Action".to_string(),
                },
            ],
        },
    );
    kinds
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            source: SourceConfig::default(),
            relations: default_relations(),
            output: OutputConfig::default(),
            save: SaveConfig::default(),
            watch: WatchConfig::default(),
        }
    }
}
impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            mode: MatchMode::default(),
            include: default_include_paths(),
            exclude: Vec::new(),
        }
    }
}
impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            follow_related: default_true(),
            use_gitignore: default_false(),
        }
    }
}
impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            banner: default_banner(),
            format: default_format(),
            json_minify: default_true(),
        }
    }
}
impl Default for SaveConfig {
    fn default() -> Self {
        Self {
            output_dir: default_save_dir_config(),
            filename_base: None,
            extension: None,
        }
    }
}
impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            delay: default_watch_delay_string(),
        }
    }
}

impl BundleConfig {
    pub fn determine_project_root(cli_project_root: Option<&PathBuf>) -> Result<PathBuf> {
        let path_str_opt = cli_project_root
            .map(|p| p.to_string_lossy().to_string())
            .or_else(|| env::var("PROJECT_ROOT").ok().filter(|s| !s.is_empty()));

        let path_to_resolve = match path_str_opt {
            Some(p_str) => PathBuf::from(shellexpand::tilde(&p_str).as_ref()),
            None => env::current_dir().map_err(AppError::Io)?,
        };

        path_to_resolve.canonicalize().map_err(|e| {
            AppError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to canonicalize project root '{}': {}",
                    path_to_resolve.display(),
                    e
                ),
            ))
        })
    }

    pub fn resolve_config_path(
        project_root: &Path,
        cli_config_file: Option<&String>,
        cli_disable_config: bool,
    ) -> Result<Option<PathBuf>> {
        if cli_disable_config {
            log::debug!("Config file loading disabled via CLI flag.");
            return Ok(None);
        }

        let path_to_check = match cli_config_file {
            Some(p_str) => {
                let expanded_path_cow = shellexpand::tilde(p_str);
                let mut path = PathBuf::from(expanded_path_cow.as_ref());
                let looks_like_path = path.is_absolute()
                    || path.components().count() > 1
                    || p_str.contains(['/', '\\']);

                if looks_like_path {
                    if !path.exists() && path.extension().is_none() {
                        path.set_extension("toml");
                    }
                    if !path.exists() {
                        return Err(AppError::Config(format!(
                            "Specified config file not found at path: {}",
                            path.display()
                        )));
                    }
                    log::debug!("Using specified config file path: {}", path.display());
                    Some(path)
                } else {
                    let filename = if path.extension().map_or(true, |e| e != "toml") {
                        format!("{}.toml", path.to_string_lossy())
                    } else {
                        path.to_string_lossy().to_string()
                    };
                    let full_path = project_root.join(DEFAULT_CONFIG_DIR).join(filename);
                    if !full_path.exists() {
                        return Err(AppError::Config(format!(
                            "Specified config file '{}' not found in default directory: {}",
                            path.display(),
                            project_root.join(DEFAULT_CONFIG_DIR).display()
                        )));
                    }
                    log::debug!(
                        "Using specified config filename in default directory: {}",
                        full_path.display()
                    );
                    Some(full_path)
                }
            }
            None => {
                let default_path = project_root
                    .join(DEFAULT_CONFIG_DIR)
                    .join(DEFAULT_CONFIG_FILENAME);
                if default_path.exists() {
                    log::debug!("Using default config file path: {}", default_path.display());
                    Some(default_path)
                } else {
                    log::debug!(
                        "No config file specified and default not found at: {}",
                        default_path.display()
                    );
                    None
                }
            }
        };
        Ok(path_to_check)
    }

    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        log::info!("Loading configuration from: {}", config_path.display());
        let toml_content = fs::read_to_string(config_path).map_err(|e| AppError::FileRead {
            path: config_path.to_path_buf(),
            source: e,
        })?;
        toml::from_str::<BundleConfig>(&toml_content).map_err(|e| {
            AppError::TomlParse(format!(
                "Error parsing config file '{}': {}. Check TOML syntax and structure.",
                config_path.display(),
                e
            ))
        })
    }

    pub fn get_watch_delay(&self) -> Result<Duration> {
        parse(&self.watch.delay).map_err(|e| {
            AppError::DurationParse(format!(
                "Invalid watch delay duration '{}': {}. Use format like '500ms', '2s'.",
                self.watch.delay, e
            ))
        })
    }

    /// The file extension to bundle, without a leading dot.
    pub fn effective_extension(&self) -> &str {
        self.source.extension.trim_start_matches('.')
    }

    pub fn effective_filename_base(&self, project_root: &Path) -> String {
        self.save.filename_base.clone().unwrap_or_else(|| {
            project_root
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "bundle".to_string())
        })
    }

    pub fn validate(&self) -> Result<()> {
        match self.output.format.as_str() {
            "text" | "json" | "yaml" => {}
            other => {
                return Err(AppError::Config(format!(
                    "Unsupported output format '{}'. Expected one of: text, json, yaml.",
                    other
                )));
            }
        }
        if self.effective_extension().is_empty() {
            return Err(AppError::Config(
                "Source extension must not be empty.".to_string(),
            ));
        }
        for entry in self.paths.include.iter().chain(self.paths.exclude.iter()) {
            if entry.trim().is_empty() {
                return Err(AppError::Config(
                    "Path entries must not be empty strings.".to_string(),
                ));
            }
            if Path::new(entry).is_absolute() {
                return Err(AppError::Config(format!(
                    "Path entry '{}' must be relative to the project root.",
                    entry
                )));
            }
        }
        for (kind, rule) in &self.relations {
            if rule.suffix.is_empty() {
                return Err(AppError::Config(format!(
                    "Relation kind '{}' has an empty suffix.",
                    kind
                )));
            }
            for producer in &rule.related {
                if producer.suffix.is_empty() || producer.dir.trim().is_empty() {
                    return Err(AppError::Config(format!(
                        "Relation kind '{}' has a producer with an empty dir or suffix.",
                        kind
                    )));
                }
                if Path::new(&producer.dir).is_absolute() {
                    return Err(AppError::Config(format!(
                        "Relation kind '{}' uses absolute directory '{}'; producer dirs must be project-relative.",
                        kind, producer.dir
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_round_trip_through_toml() {
        let config = BundleConfig::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: BundleConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = toml::from_str::<BundleConfig>("[paths]\nmode = \"include\"\ntypo = true\n");
        assert!(result.is_err());
    }

    #[test]
    fn relation_table_preserves_declaration_order() {
        let toml_src = r#"
[relations.zeta]
suffix = "Zeta"

[relations.alpha]
suffix = "Alpha"
"#;
        let config: BundleConfig = toml::from_str(toml_src).unwrap();
        let kinds: Vec<&String> = config.relations.keys().collect();
        assert_eq!(kinds, vec!["zeta", "alpha"]);
    }

    #[test]
    fn effective_extension_strips_leading_dot() {
        let mut config = BundleConfig::default();
        config.source.extension = ".php".to_string();
        assert_eq!(config.effective_extension(), "php");
    }

    #[test]
    fn validate_rejects_absolute_include_entry() {
        let mut config = BundleConfig::default();
        config.paths.include = vec!["/etc".to_string()];
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn validate_rejects_unknown_format() {
        let mut config = BundleConfig::default();
        config.output.format = "xml".to_string();
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn watch_delay_parses_default() {
        let config = BundleConfig::default();
        assert_eq!(config.get_watch_delay().unwrap(), Duration::from_millis(300));
    }

    #[test]
    fn watch_delay_rejects_garbage() {
        let mut config = BundleConfig::default();
        config.watch.delay = "soon".to_string();
        assert!(matches!(
            config.get_watch_delay(),
            Err(AppError::DurationParse(_))
        ));
    }
}
