use crate::cli_args::BundleArgs;
use crate::load_config_for_command;
use crate::output;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use xbundle_core::{self as core, BundleConfig, MatchMode};

pub fn handle_bundle_command(args: BundleArgs, quiet: bool, verbose: u8) -> Result<()> {
    let project_root =
        BundleConfig::determine_project_root(args.project_config.project_root.as_ref())
            .context("Failed to determine project root")?;
    log::info!("Project root determined: {}", project_root.display());

    let config = Arc::new(
        load_config_for_command(
            &project_root,
            &args.project_config,
            Some(&args), // Pass bundle args for overrides
            None,
            None, // Format handled within load_config_for_command via bundle_args
        )
        .context("Failed to load configuration")?,
    );

    let output_target_args = OutputTargetArgs {
        save: &args.save,
        stdout: args.stdout,
        format_output: &args.format_output,
    };

    trigger_bundle(&project_root, &config, &output_target_args, quiet, verbose)
}

// Encapsulates the bundle-and-emit logic shared by `bundle` and `watch`.
pub fn trigger_bundle(
    project_root: &Path,
    config: &Arc<BundleConfig>,
    output_target_args: &OutputTargetArgs,
    quiet: bool,
    verbose: u8,
) -> Result<()> {
    log::info!("Starting bundle for: {}", project_root.display());

    // An empty include list in include mode means nothing could ever match.
    // That is a setup gap, not an error: warn, emit nothing, succeed.
    if config.paths.mode == MatchMode::Include && config.paths.include.is_empty() {
        if !quiet {
            eprintln!(
                "{}",
                "⚠️ No include paths configured; nothing to bundle. Try 'xbundle config --suggest'."
                    .yellow()
            );
        }
        return Ok(());
    }

    log::debug!("Collecting and bundling files...");
    let bundle = core::build_bundle(project_root, config);
    log::debug!(
        "Bundling complete. {} files, {} diagnostics.",
        bundle.files.len(),
        bundle.diagnostics.len()
    );

    output::report_diagnostics(&bundle.diagnostics, quiet);

    if bundle.files.is_empty() && !quiet && verbose > 0 {
        eprintln!(
            "{}",
            "Warning: No files matched the configured paths; the bundle is empty.".yellow()
        );
    }

    handle_final_output(&bundle, config, output_target_args, project_root, quiet)
}

// Helper struct to pass output-related args cleanly.
// Made public so watch.rs can use it.
pub struct OutputTargetArgs<'a> {
    pub save: &'a Option<Option<PathBuf>>,
    pub stdout: bool,
    pub format_output: &'a crate::cli_args::FormatOutputOpts,
}

fn get_save_details_from_args(
    config: &BundleConfig,
    cli_save_opt: Option<&Option<PathBuf>>,
    project_root: &Path,
) -> (PathBuf, String, String) {
    let save_dir_base = match cli_save_opt {
        Some(Some(cli_path)) => {
            log::trace!(
                "Save directory explicitly provided via CLI: {}",
                cli_path.display()
            );
            cli_path.clone()
        }
        _ => {
            log::trace!(
                "Using configured/default save directory: {}",
                config.save.output_dir.display()
            );
            config.save.output_dir.clone()
        }
    };

    let save_dir = if save_dir_base.is_absolute() {
        save_dir_base
    } else {
        project_root.join(save_dir_base)
    };
    log::trace!("Resolved absolute save directory: {}", save_dir.display());

    let filename_base = config.effective_filename_base(project_root);
    log::trace!("Using filename base: {}", filename_base);

    let extension = config.save.extension.as_deref().unwrap_or_else(|| {
        match config.output.format.to_lowercase().as_str() {
            "yaml" | "yml" => "yaml",
            "json" => "json",
            _ => "txt",
        }
    });
    log::trace!("Using save extension: {}", extension);

    (save_dir, filename_base, extension.to_string())
}

fn handle_final_output(
    bundle: &core::Bundle,
    config: &BundleConfig,
    output_target_args: &OutputTargetArgs,
    project_root: &Path,
    quiet: bool,
) -> Result<()> {
    log::debug!("Determining final output target...");
    let output_target_path: Option<PathBuf> = if output_target_args.save.is_some() {
        let (save_dir, filename_base, extension) =
            get_save_details_from_args(config, output_target_args.save.as_ref(), project_root);
        let filename = format!("{}.{}", filename_base, extension);
        let path = save_dir.join(filename);
        log::debug!("Output target path set to file: {}", path.display());
        Some(path)
    } else if output_target_args.stdout {
        log::debug!("Output target set to stdout (forced).");
        None
    } else {
        log::debug!("Output target set to stdout (default).");
        None
    };

    output::print_bundle_or_save(
        bundle,
        config,
        output_target_path.as_deref(),
        output_target_args.format_output,
        quiet,
    )
}
