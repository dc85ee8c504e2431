use crate::cli_args::ConfigArgs;
use crate::load_config_for_command;
use anyhow::{Context, Result};
use colored::*;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;
use xbundle_core::config::{DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILENAME};
use xbundle_core::{AppError, BundleConfig, suggest_include_paths};

pub fn handle_config_command(args: &ConfigArgs, quiet: bool) -> Result<()> {
    let project_root =
        BundleConfig::determine_project_root(args.project_config.project_root.as_ref())
            .context("Failed to determine project root for config command")?;
    log::info!("Project root determined: {}", project_root.display());

    if args.suggest {
        return handle_suggest(&project_root, args, quiet);
    }

    let default_config = BundleConfig::default();
    let config_toml = toml::to_string_pretty(&default_config).map_err(AppError::TomlSerialize)?;

    if !args.save {
        if !quiet {
            println!("{}", "# Default xbundle configuration structure:".dimmed());
        }
        println!("{}", config_toml);
        return Ok(());
    }

    let config_dir = project_root.join(DEFAULT_CONFIG_DIR);
    let config_path = config_dir.join(DEFAULT_CONFIG_FILENAME);
    log::debug!("Saving default config to: {}", config_path.display());

    if config_path.exists() {
        if quiet {
            anyhow::bail!(
                "Target file '{}' exists. Overwrite prevented in quiet mode.",
                config_path.display()
            );
        }
        print!(
            "{} Config file already exists at '{}'. Overwrite? [{}/{}] ",
            "⚠️".yellow(),
            config_path.display().to_string().cyan(),
            "y".green(),
            "N".red()
        );
        io::stdout().flush().context("Failed to flush stdout")?;
        let mut response = String::new();
        io::stdin()
            .read_line(&mut response)
            .context("Failed to read user input")?;
        if !response.trim().eq_ignore_ascii_case("y") {
            println!("Save cancelled.");
            return Ok(());
        }
    }

    fs::create_dir_all(&config_dir).map_err(|e| AppError::DirCreation {
        path: config_dir.clone(),
        source: e,
    })?;
    let mut file = File::create(&config_path).map_err(|e| AppError::FileWrite {
        path: config_path.clone(),
        source: e,
    })?;
    file.write_all(config_toml.as_bytes())
        .map_err(|e| AppError::FileWrite {
            path: config_path.clone(),
            source: e,
        })?;

    if !quiet {
        println!(
            "{} Default configuration saved to: {}",
            "✅".green(),
            config_path.display().to_string().blue()
        );
    }
    Ok(())
}

// Scans the project and prints directories that directly contain files
// with the configured extension, as candidates for [paths] include.
fn handle_suggest(project_root: &Path, args: &ConfigArgs, quiet: bool) -> Result<()> {
    let config = load_config_for_command(project_root, &args.project_config, None, None, None)
        .context("Failed to load configuration for suggestion scan")?;
    let extension = config.effective_extension().to_string();

    log::info!(
        "Scanning {} for directories containing '.{}' files...",
        project_root.display(),
        extension
    );
    let suggestions = suggest_include_paths(project_root, &extension);

    if suggestions.is_empty() {
        if !quiet {
            println!(
                "No directories containing '.{}' files were found under {}.",
                extension,
                project_root.display()
            );
        }
        return Ok(());
    }

    if !quiet {
        println!(
            "{}",
            format!("Directories containing '.{}' files:", extension)
                .green()
                .bold()
        );
    }
    for path in &suggestions {
        println!("- {}", path.cyan());
    }
    if !quiet {
        println!(
            "\nAdd the ones you want to the {} list in {}.",
            "[paths] include".bold(),
            project_root
                .join(DEFAULT_CONFIG_DIR)
                .join(DEFAULT_CONFIG_FILENAME)
                .display()
                .to_string()
                .blue()
        );
    }
    Ok(())
}
