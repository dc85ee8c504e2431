use crate::cli_args::DebugArgs;
use crate::load_config_for_command;
use crate::output::print_data_or_text;
use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;
use xbundle_core::{self as core, BundleConfig, Diagnostic};

#[derive(Debug, Serialize)]
struct DebugInfo<'a> {
    effective_config: &'a BundleConfig,
    top_level_files: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    diagnostics: Vec<Diagnostic>,
}

pub fn handle_debug_command(args: DebugArgs) -> Result<()> {
    let project_root =
        BundleConfig::determine_project_root(args.project_config.project_root.as_ref())
            .context("Failed to determine project root")?;
    log::info!("Project root determined: {}", project_root.display());

    let config = load_config_for_command(
        &project_root,
        &args.project_config,
        None,
        None,
        Some(&args.format_output), // Pass format override options
    )
    .context("Failed to load configuration for debug command")?;

    log::debug!("Debug: Collecting planned file list...");
    let (files, diagnostics) = core::collect_top_level(&project_root, &config);
    log::debug!("Debug: {} top-level files planned.", files.len());

    // Root-relative, forward-slash paths, in the order they would be bundled.
    let top_level_files: Vec<String> = files
        .iter()
        .map(|path| {
            path.strip_prefix(&project_root)
                .unwrap_or(path)
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();

    let debug_data = DebugInfo {
        effective_config: &config,
        top_level_files,
        diagnostics,
    };

    if args.format_output.format.is_none() {
        log::debug!("Debug: Printing pretty output...");
        print_debug_info_pretty(&debug_data)?;
    } else {
        log::debug!(
            "Debug: Printing structured output (format: {:?})...",
            args.format_output.format
        );
        print_data_or_text(&debug_data, None, &args.format_output, "json")?;
    }
    Ok(())
}

fn print_debug_info_pretty(debug_info: &DebugInfo) -> Result<()> {
    println!(
        "{}",
        "\n--- Effective Configuration ---"
            .green()
            .bold()
            .underline()
    );
    let config_toml = toml::to_string_pretty(debug_info.effective_config)
        .context("Failed to serialize effective config to TOML")?;
    println!("{}", config_toml);

    print_path_list(
        "Top-Level Files (in bundling order)",
        &debug_info.top_level_files,
    );

    display_relation_rules(debug_info.effective_config);

    if !debug_info.diagnostics.is_empty() {
        println!("{}", "\n--- Diagnostics ---".green().bold().underline());
        for diag in &debug_info.diagnostics {
            println!("- {}: {}", diag.path.yellow(), diag.message.dimmed());
        }
    }

    println!("{}", "\n--- End Debug Info ---".green().bold());
    Ok(())
}

fn print_path_list(title: &str, paths: &[String]) {
    println!(
        "{}",
        format!("\n--- {} ---", title).green().bold().underline()
    );
    if paths.is_empty() {
        println!("{}", "(None)".dimmed());
    } else {
        // Deliberately unsorted: this is the order the bundle will use.
        paths.iter().for_each(|p| println!("- {}", p.cyan()));
    }
}

fn display_relation_rules(config: &BundleConfig) {
    println!("{}", "\n--- Relation Rules ---".green().bold().underline());
    if !config.source.follow_related {
        println!("{}", "(Relation following disabled)".dimmed());
        return;
    }
    if config.relations.is_empty() {
        println!("{}", "(No relation rules configured)".dimmed());
        return;
    }
    println!(
        "{:<14} {:<18} {}",
        "Kind".bold(),
        "Suffix".bold(),
        "Produces".bold()
    );
    println!("{:-<65}", ""); // Separator line

    for (kind, rule) in &config.relations {
        let produces = rule
            .related
            .iter()
            .map(|p| format!("{}/<base>{}", p.dir.trim_end_matches('/'), p.suffix))
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{:<14} {:<18} {}",
            kind.blue(),
            rule.suffix.cyan(),
            produces
        );
    }
}
