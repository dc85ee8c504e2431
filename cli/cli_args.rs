use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
pub struct ProjectConfigOpts {
    #[arg(
        long,
        help = "Specify the target project directory (default: current dir).",
        help_heading = "Project Setup",
        value_name = "PATH"
    )]
    pub project_root: Option<PathBuf>,

    #[arg(
        long,
        help = "Specify path/filename of the TOML config file (default: .xtools/xbundle/xbundle.toml).",
        value_name = "CONFIG_FILE",
        conflicts_with = "disable_config_file",
        help_heading = "Project Setup"
    )]
    pub config_file: Option<String>,

    #[arg(
        long,
        help = "Disable loading any TOML config file.",
        conflicts_with = "config_file",
        help_heading = "Project Setup"
    )]
    pub disable_config_file: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FormatOutputOpts {
    #[arg(short = 'f', long, help = "Set the output format.", value_name = "FORMAT", value_parser = ["text", "json", "yaml"], help_heading = "Output Formatting")]
    pub format: Option<String>,

    #[arg(
        long,
        help = "Ensure JSON output is compact (minified) [default].",
        conflicts_with = "disable_json_minify",
        help_heading = "Output Formatting"
    )]
    pub enable_json_minify: bool,

    #[arg(
        long,
        help = "Ensure JSON output is pretty-printed (readable).",
        conflicts_with = "enable_json_minify",
        help_heading = "Output Formatting"
    )]
    pub disable_json_minify: bool,
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Bundle related source files into one flattened text artifact.",
    long_about = "xbundle scans the configured project directories, follows naming-convention \nlinks between related files (Controller -> Service -> Repository), and \nconcatenates everything into a single bundle with file markers. \nSupports text/json/yaml output, watch mode, and include-path suggestions.",
    help_template = "{about-section}\nUsage: {usage}\n\n{all-args}{after-help}",
    after_help = "EXAMPLES:\n  xbundle bundle\n  xbundle bundle --include app/Http/Controllers/ -s\n  xbundle watch -s\n  xbundle config --suggest",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true, help = "Increase message verbosity (-v, -vv).")]
    pub verbose: u8,

    #[arg(
        short,
        long,
        global = true,
        help = "Silence informational messages and warnings."
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    #[command(
        visible_alias = "b",
        about = "Bundle the configured directories into one artifact."
    )]
    Bundle(BundleArgs),

    #[command(
        visible_alias = "w",
        about = "Monitor bundled files and regenerate the bundle automatically."
    )]
    Watch(WatchArgs),

    #[command(
        visible_alias = "m",
        about = "Calculate and display bundle statistics."
    )]
    Metrics(MetricsArgs),

    #[command(
        visible_alias = "d",
        about = "Show effective configuration and planned file inclusions."
    )]
    Debug(DebugArgs),

    #[command(about = "Generate or save shell completion scripts.")]
    Completion(CompletionArgs),

    #[command(about = "Show or save the default configuration file structure.")]
    Config(ConfigArgs),
}

#[derive(Args, Debug, Clone)]
pub struct BundleArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[clap(flatten)]
    pub format_output: FormatOutputOpts,

    #[arg(
        long,
        help = "Force output of the bundle to standard output.",
        help_heading = "Output Control",
        conflicts_with = "save"
    )]
    pub stdout: bool,

    #[arg(
        short = 's', long, value_name = "SAVE_DIR",
        num_args = 0..=1,
        help_heading = "Output Control",
        help = "Save the bundle. Optional SAVE_DIR overrides config/default logic.",
    )]
    pub save: Option<Option<PathBuf>>,

    #[arg(
        long,
        value_name = "TEXT",
        help = "Banner line placed at the top of the text output.",
        help_heading = "Output Formatting"
    )]
    pub banner: Option<String>,

    #[clap(flatten)]
    pub filters: FilterGroup,
    #[clap(flatten)]
    pub relation_toggles: RelationTogglesGroup,
    #[clap(flatten)]
    pub ignore_toggles: IgnoreTogglesGroup,
}

#[derive(Args, Debug, Clone)]
pub struct WatchArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[clap(flatten)]
    pub format_output: FormatOutputOpts,

    #[arg(
        long,
        value_name = "DELAY_STRING",
        help = "Set debounce delay for watch mode [default: 300ms]"
    )]
    pub watch_delay: Option<String>,

    #[arg( short = 's', long, value_name = "SAVE_DIR", num_args = 0..=1, help = "Save the bundle on change. Optional SAVE_DIR overrides config/default logic.", )]
    pub save: Option<Option<PathBuf>>,
}

#[derive(Args, Debug, Clone)]
pub struct MetricsArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[clap(flatten)]
    pub format_output: FormatOutputOpts,
}

#[derive(Args, Debug, Clone)]
pub struct DebugArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[clap(flatten)]
    pub format_output: FormatOutputOpts,
}

#[derive(Args, Debug, Clone)]
pub struct CompletionArgs {
    #[arg(
        long,
        value_enum,
        value_name = "SHELL",
        help = "Shell to generate completions for [default: fish]"
    )]
    pub shell: Option<Shell>,
    #[arg(
        long,
        help = "Save completion script to default location (prompts overwrite)."
    )]
    pub save: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,

    #[arg(
        long,
        help = "Save default config structure to default path (prompts overwrite)."
    )]
    pub save: bool,

    #[arg(
        long,
        conflicts_with = "save",
        help = "Scan the project and list directories containing bundleable files."
    )]
    pub suggest: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterGroup {
    #[arg(long, value_name = "DIR", action = clap::ArgAction::Append, help = "Add a root-relative directory to bundle (replaces the configured include list).", help_heading = "Path Selection")]
    pub include: Vec<String>,

    #[arg(long, value_name = "PREFIX", action = clap::ArgAction::Append, help = "Add a root-relative exclusion prefix (replaces the configured exclude list).", help_heading = "Path Selection")]
    pub exclude: Vec<String>,

    #[arg(long, value_name = "MODE", value_parser = ["include", "exclude"], help = "Path selection mode.", help_heading = "Path Selection")]
    pub mode: Option<String>,

    #[arg(
        short = 'e',
        long,
        value_name = "EXT",
        help = "File extension to bundle (overrides config).",
        help_heading = "Path Selection"
    )]
    pub extension: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct RelationTogglesGroup {
    #[arg(
        long,
        help = "Follow naming-convention links to related files [default: enabled].",
        overrides_with = "no_follow_related",
        help_heading = "Relation Rules"
    )]
    pub follow_related: bool,
    #[arg(
        long,
        help = "Bundle only the directly collected files.",
        overrides_with = "follow_related",
        help_heading = "Relation Rules"
    )]
    pub no_follow_related: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct IgnoreTogglesGroup {
    #[arg(
        long,
        help = "Respect .gitignore files during collection.",
        overrides_with = "disable_gitignore",
        help_heading = "Ignore Rules"
    )]
    pub enable_gitignore: bool,
    #[arg(
        long,
        help = "Do not respect .gitignore files during collection [default].",
        overrides_with = "enable_gitignore",
        help_heading = "Ignore Rules"
    )]
    pub disable_gitignore: bool,
}
