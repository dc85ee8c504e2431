pub mod bundle;
pub mod collect;
pub mod config;
pub mod detect;
pub mod error;
pub mod matcher;
pub mod relations;

pub use bundle::{
    Bundle, BundleBuilder, BundledFile, Diagnostic, DiagnosticKind, build_bundle,
    collect_top_level,
};
pub use collect::collect_files;
pub use config::{
    BundleConfig, MatchMode, OutputConfig, PathsConfig, RelatedProducer, RelationRule, SaveConfig,
    SourceConfig, WatchConfig,
};
pub use detect::suggest_include_paths;
pub use error::{AppError, Result};
pub use matcher::{PathMatcher, matches_extension};
pub use relations::related_candidates;
