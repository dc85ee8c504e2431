use anyhow::{Context, Result};
use colored::*;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;
use xbundle_core::{AppError, Bundle, BundleConfig, Diagnostic, DiagnosticKind};

use crate::cli_args::FormatOutputOpts;

// --- Public Output Functions ---

pub fn print_bundle_or_save(
    bundle: &Bundle,
    config: &BundleConfig,
    output_path: Option<&Path>,
    format_opts: &FormatOutputOpts,
    quiet: bool,
) -> Result<()> {
    let final_format = format_opts
        .format
        .as_deref()
        .unwrap_or(&config.output.format);
    let pretty_json = !config.output.json_minify; // Use config value after overrides

    let content = serialize_bundle(bundle, config, final_format, pretty_json)?;

    match output_path {
        Some(path) => {
            write_to_file(path, &content)?;
            if !quiet {
                println!(
                    "{} Bundle saved to: {}",
                    "✅".green(),
                    path.display().to_string().blue()
                );
            }
        }
        None => {
            write_to_stdout(&content)?;
        }
    }
    Ok(())
}

/// Prints collected diagnostics to stderr so they never mix with a
/// bundle that is being piped from stdout.
pub fn report_diagnostics(diagnostics: &[Diagnostic], quiet: bool) {
    if diagnostics.is_empty() || quiet {
        return;
    }
    eprintln!(
        "\n{}",
        "⚠️ Warning: Problems encountered while bundling:".yellow()
    );
    for diag in diagnostics {
        let label = match diag.kind {
            DiagnosticKind::PathNotFound => "missing path",
            DiagnosticKind::FileRead => "read failed",
            DiagnosticKind::Walk => "walk error",
        };
        eprintln!(" - {} {}: {}", label.yellow(), diag.path, diag.message);
    }
    eprintln!("---");
}

// Helper for commands that might output structured data or plain text
pub fn print_data_or_text<T: Serialize>(
    data: &T,
    plain_text: Option<String>,
    format_opts: &FormatOutputOpts,
    default_format: &str, // e.g., "json" or "text"
) -> Result<()> {
    let format = format_opts
        .format
        .as_deref()
        .unwrap_or(default_format)
        .to_lowercase();

    if format == "text" {
        match plain_text {
            Some(text) => write_to_stdout(&text),
            None => {
                // Fallback to JSON pretty print if no plain rendering exists
                let content =
                    serde_json::to_string_pretty(data).map_err(AppError::JsonSerialize)?;
                write_to_stdout(&content)
            }
        }
    } else {
        let content = match format.as_str() {
            "yaml" | "yml" => serde_yml::to_string(data).map_err(AppError::YamlError)?,
            _ => {
                // Structured data views default to pretty JSON
                if format_opts.enable_json_minify {
                    serde_json::to_string(data).map_err(AppError::JsonSerialize)?
                } else {
                    serde_json::to_string_pretty(data).map_err(AppError::JsonSerialize)?
                }
            }
        };
        write_to_stdout(&content)
    }
}

// --- Internal Helpers ---

fn serialize_bundle(
    bundle: &Bundle,
    config: &BundleConfig,
    format: &str,
    pretty_json: bool,
) -> Result<String> {
    match format.to_lowercase().as_str() {
        "yaml" | "yml" => bundle.to_yaml().map_err(anyhow::Error::from),
        "json" => bundle.to_json(pretty_json).map_err(anyhow::Error::from),
        "text" => Ok(bundle.render(&config.output.banner)),
        other => Err(anyhow::Error::from(AppError::InvalidArgument(format!(
            "Unsupported output format: {}",
            other
        )))),
    }
}

fn write_to_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| AppError::DirCreation {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    let mut file = File::create(path).map_err(|e| AppError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;
    file.write_all(content.as_bytes())
        .map_err(|e| AppError::FileWrite {
            path: path.to_path_buf(),
            source: e,
        })?;
    Ok(())
}

fn write_to_stdout(content: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(content.as_bytes())
        .context("Failed to write to stdout")?;
    // Add a newline if the content doesn't end with one, for better terminal behavior
    if !content.ends_with('\n') {
        handle
            .write_all(b"\n")
            .context("Failed to write newline to stdout")?;
    }
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}

pub fn print_metrics_pretty_table(
    metrics: &crate::commands::metrics::ProjectMetrics,
) -> Result<()> {
    println!();
    println!("{}", " Bundle Metrics Summary ".green().bold().underline());
    println!(
        "{:<20} {}",
        "Total Files:".green(),
        metrics.total_files.to_string().cyan()
    );
    println!(
        "{:<20} {}",
        "Total Lines:".green(),
        metrics.total_lines.to_string().cyan()
    );
    println!(
        "{:<20} {}",
        "Total Size:".green(),
        metrics.total_bytes_readable.cyan()
    );
    println!(
        "{:<20} {}",
        "Est. Tokens:".green(),
        metrics.estimated_tokens.to_string().cyan()
    );

    if metrics.files_details.is_empty() {
        println!("\n{}", "(No files included in metrics)".yellow());
    } else {
        println!("\n{}", " File Details ".green().bold().underline());
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            Cell::new("Path").fg(Color::Green),
            Cell::new("Lines").fg(Color::Green),
            Cell::new("Size").fg(Color::Green),
            Cell::new("Tokens").fg(Color::Green),
        ]);
        for file in &metrics.files_details {
            table.add_row(vec![
                Cell::new(&file.path).fg(Color::Cyan),
                Cell::new(file.lines).set_alignment(comfy_table::CellAlignment::Right),
                Cell::new(&file.bytes_readable)
                    .set_alignment(comfy_table::CellAlignment::Right)
                    .fg(Color::DarkGrey),
                Cell::new(file.estimated_tokens).set_alignment(comfy_table::CellAlignment::Right),
            ]);
        }
        println!("{table}");
    }
    println!();
    Ok(())
}
