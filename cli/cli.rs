mod cli_args;
mod commands;
mod output;
mod watch;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use colored::*;
use std::path::Path;
use std::process;

use cli_args::{BundleArgs, Cli, Commands, FormatOutputOpts, ProjectConfigOpts, WatchArgs};
use xbundle_core::{AppError, BundleConfig, MatchMode};

fn main() {
    let cli_args = Cli::parse();

    setup_logging(cli_args.quiet, cli_args.verbose);

    let quiet = cli_args.quiet;
    let verbose = cli_args.verbose;

    log::debug!("CLI args parsed: {:?}", cli_args);

    let exit_code = match run_app(cli_args, quiet, verbose) {
        Ok(_) => {
            log::info!("Application finished successfully.");
            0
        }
        Err(e) => {
            let core_err = e.downcast_ref::<AppError>();
            let exit_code = match core_err {
                Some(AppError::Config(_)) => 1,
                Some(AppError::TomlParse(_)) => 1,
                Some(AppError::Io(_)) => 2,
                Some(AppError::FileRead { .. }) => 2,
                Some(AppError::FileWrite { .. }) => 2,
                Some(AppError::DirCreation { .. }) => 2,
                Some(AppError::InvalidArgument(_)) => 5,
                Some(AppError::DurationParse(_)) => 5,
                Some(AppError::TomlSerialize(_)) => 6,
                Some(AppError::JsonSerialize(_)) => 6,
                Some(AppError::YamlError(_)) => 6,
                Some(AppError::TokenCount(_)) => 8,
                Some(_) => 1, // Default exit code for other core AppErrors
                None => 1,    // Default exit code for plain anyhow errors
            };

            // Always surface config/usage errors; everything else respects -q.
            if !quiet || exit_code == 1 || exit_code == 5 {
                eprintln!("{} {:#}", "Error:".red().bold(), e);
            } else {
                log::error!("Application failed: {:#}", e);
            }

            exit_code
        }
    };
    log::debug!("Exiting with code {}", exit_code);
    process::exit(exit_code);
}

fn setup_logging(quiet: bool, verbose: u8) {
    let log_level = if quiet {
        log::LevelFilter::Off // Turn off logging completely if quiet
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,  // Default: Show warnings and errors
            1 => log::LevelFilter::Info,  // -v: Show info, warnings, errors
            2 => log::LevelFilter::Debug, // -vv: Show debug, info, warnings, errors
            _ => log::LevelFilter::Trace, // -vvv+: Show all levels
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None) // Keep logs clean
        .init();
    log::trace!("Logger initialized with level: {:?}", log_level);
}

fn run_app(cli: Cli, quiet: bool, verbose: u8) -> Result<()> {
    match cli.command {
        None => {
            Cli::command().print_help()?;
        }
        Some(command) => match command {
            Commands::Bundle(args) => {
                log::debug!("Executing 'bundle' command...");
                commands::bundle::handle_bundle_command(args, quiet, verbose)?;
            }
            Commands::Watch(args) => {
                log::debug!("Executing 'watch' command...");
                watch::run_watch_mode(args, quiet, verbose)?;
            }
            Commands::Metrics(args) => {
                log::debug!("Executing 'metrics' command...");
                commands::metrics::handle_metrics_command(args, quiet)?;
            }
            Commands::Debug(args) => {
                log::debug!("Executing 'debug' command...");
                commands::debug::handle_debug_command(args)?;
            }
            Commands::Completion(args) => {
                log::debug!("Executing 'completion' command...");
                commands::completion::handle_completion_command(&args, quiet)?;
            }
            Commands::Config(args) => {
                log::debug!("Executing 'config' command...");
                commands::config::handle_config_command(&args, quiet)?;
            }
        },
    }
    Ok(())
}

fn merge_config_with_cli_overrides(mut config: BundleConfig, args: &BundleArgs) -> BundleConfig {
    log::trace!("Applying bundle command CLI overrides to config...");

    // Path selection overrides: a CLI list replaces the configured list.
    if !args.filters.include.is_empty() {
        config.paths.include = args.filters.include.clone();
    }
    if !args.filters.exclude.is_empty() {
        config.paths.exclude = args.filters.exclude.clone();
    }
    if let Some(mode) = args.filters.mode.as_deref() {
        config.paths.mode = if mode == "exclude" {
            MatchMode::Exclude
        } else {
            MatchMode::Include
        };
    }
    if let Some(extension) = &args.filters.extension {
        config.source.extension = extension.clone();
    }

    // Output overrides
    if let Some(format) = &args.format_output.format {
        config.output.format = format.clone();
    }
    if args.format_output.enable_json_minify {
        config.output.json_minify = true;
    }
    if args.format_output.disable_json_minify {
        config.output.json_minify = false;
    }
    if let Some(banner) = &args.banner {
        config.output.banner = banner.clone();
    }

    // Relation toggle overrides
    if args.relation_toggles.follow_related {
        config.source.follow_related = true;
    }
    if args.relation_toggles.no_follow_related {
        config.source.follow_related = false;
    }

    // Ignore toggle overrides
    if args.ignore_toggles.enable_gitignore {
        config.source.use_gitignore = true;
    }
    if args.ignore_toggles.disable_gitignore {
        config.source.use_gitignore = false;
    }

    log::trace!("Config after CLI overrides: {:?}", config);
    config
}

// Helper to load and validate config considering CLI options.
// Kept public as it's used by multiple command modules.
pub fn load_config_for_command(
    project_root: &Path,
    project_opts: &ProjectConfigOpts,
    // Pass specific args structs for commands that can override config parts
    bundle_args: Option<&BundleArgs>,
    watch_args: Option<&WatchArgs>,
    format_override: Option<&FormatOutputOpts>, // For metrics, debug, watch
) -> Result<BundleConfig> {
    let config_path = BundleConfig::resolve_config_path(
        project_root,
        project_opts.config_file.as_ref(),
        project_opts.disable_config_file,
    )
    .context("Failed to resolve configuration path")?;

    let mut config = match &config_path {
        Some(path) => BundleConfig::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => BundleConfig::default(),
    };

    // Apply overrides from BundleArgs if provided
    if let Some(b_args) = bundle_args {
        config = merge_config_with_cli_overrides(config, b_args);
    } else {
        // Apply format overrides common to other commands
        if let Some(fmt_opts) = format_override {
            if let Some(format) = &fmt_opts.format {
                config.output.format = format.clone();
            }
            if fmt_opts.enable_json_minify {
                config.output.json_minify = true;
            }
            if fmt_opts.disable_json_minify {
                config.output.json_minify = false;
            }
        }
        // Apply watch-specific overrides if present
        if let Some(w_args) = watch_args {
            if let Some(delay) = &w_args.watch_delay {
                config.watch.delay = delay.clone();
            }
        }
    }

    config
        .validate()
        .context("Invalid effective configuration")?;

    Ok(config)
}
