use crate::cli_args::MetricsArgs;
use crate::load_config_for_command;
use crate::output::{print_data_or_text, print_metrics_pretty_table, report_diagnostics};
use anyhow::{Context, Result};
use byte_unit::{Byte, UnitType};
use serde::Serialize;
use tiktoken_rs::cl100k_base;
use xbundle_core::{self as core, BundleConfig};

#[derive(Debug, Serialize)]
pub struct ProjectMetrics {
    pub total_files: usize,
    pub total_lines: usize,
    pub total_bytes: u128,
    pub total_bytes_readable: String,
    pub estimated_tokens: usize,
    pub files_details: Vec<FileMetrics>,
}

#[derive(Debug, Serialize)]
pub struct FileMetrics {
    pub path: String,
    pub lines: usize,
    pub bytes: usize,
    pub bytes_readable: String,
    pub estimated_tokens: usize,
}

pub fn handle_metrics_command(args: MetricsArgs, quiet: bool) -> Result<()> {
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
    .context("Failed to load configuration for metrics command")?;

    log::debug!("Building bundle for metrics...");
    let bundle = core::build_bundle(&project_root, &config);
    log::debug!("Bundle built with {} files.", bundle.files.len());

    report_diagnostics(&bundle.diagnostics, quiet);

    if bundle.files.is_empty() {
        if !quiet {
            println!("No files matched the configured paths; nothing to measure.");
        }
        return Ok(()); // Exit gracefully if no files
    }

    log::debug!("Calculating metrics...");
    let metrics = calculate_metrics(&bundle)?;
    log::debug!("Metrics calculation complete.");

    if args.format_output.format.is_none() {
        print_metrics_pretty_table(&metrics)
    } else {
        // Pass None for plain_text, rely on structured output
        print_data_or_text(&metrics, None, &args.format_output, "json")
    }
}

fn calculate_metrics(bundle: &core::Bundle) -> Result<ProjectMetrics> {
    let bpe =
        cl100k_base().map_err(|e| anyhow::anyhow!(core::AppError::TokenCount(e.to_string())))?;
    let mut total_files = 0;
    let mut total_lines = 0;
    let mut total_bytes: u128 = 0;
    let mut total_tokens = 0;
    let mut files_details = Vec::new();

    for file in &bundle.files {
        let bytes = file.content.len();
        if bytes == 0 {
            continue; // Skip empty files
        }

        let lines = file.content.lines().count();
        let tokens = bpe.encode_ordinary(&file.content).len();

        total_files += 1;
        total_lines += lines;
        total_bytes = total_bytes.saturating_add(bytes as u128);
        total_tokens += tokens;

        let file_byte = Byte::from_u128(bytes as u128).unwrap_or_default();
        let file_size_readable = file_byte.get_appropriate_unit(UnitType::Binary).to_string();

        files_details.push(FileMetrics {
            path: file.path.clone(),
            lines,
            bytes,
            bytes_readable: file_size_readable,
            estimated_tokens: tokens,
        });
    }

    // Sort by path for consistent output
    files_details.sort_by(|a, b| a.path.cmp(&b.path));

    let total_byte = Byte::from_u128(total_bytes).unwrap_or_default();
    let total_size_readable = total_byte.get_appropriate_unit(UnitType::Binary).to_string();

    Ok(ProjectMetrics {
        total_files,
        total_lines,
        total_bytes,
        total_bytes_readable: total_size_readable,
        estimated_tokens: total_tokens,
        files_details,
    })
}
