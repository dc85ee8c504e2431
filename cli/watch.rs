use crate::cli_args::WatchArgs;
use crate::commands::bundle::{self, OutputTargetArgs};
use crate::load_config_for_command;
use anyhow::{Context, Result};
use colored::*;
use notify::{ErrorKind, RecommendedWatcher};
use notify_debouncer_mini::{Debouncer, new_debouncer};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, mpsc};
use xbundle_core::{self as core, BundleConfig};

fn watch_path(
    watcher: &mut Debouncer<RecommendedWatcher>,
    path: &Path,
    watched_paths: &mut HashSet<PathBuf>,
    quiet: bool,
) {
    // Canonicalize so a file reached through different relative spellings
    // is only registered once; fall back if the path vanished meanwhile.
    let path_to_watch = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

    if !watched_paths.contains(&path_to_watch) && path_to_watch.exists() {
        log::trace!("Attempting to watch: {}", path_to_watch.display());
        match watcher
            .watcher()
            .watch(&path_to_watch, notify::RecursiveMode::NonRecursive)
        {
            Ok(_) => {
                log::debug!("Watching: {}", path_to_watch.display());
                watched_paths.insert(path_to_watch);
            }
            Err(e) => {
                // Don't error out, just report if not quiet
                if !quiet {
                    eprintln!(
                        "{} Failed to watch {}: {}",
                        "⚠️".yellow(),
                        path.display(),
                        e
                    );
                }
                log::warn!("Failed to watch {}: {}", path.display(), e);
            }
        }
    } else if !path_to_watch.exists() {
        log::trace!("Skipping watch for non-existent path: {}", path.display());
    } else {
        log::trace!("Already watching: {}", path_to_watch.display());
    }
}

// Re-derives the watch list from the current bundle membership. Relation
// following can pull files from outside the include dirs, so the set is
// rebuilt rather than derived from the configured paths alone.
fn setup_watches(
    project_root: &Path,
    current_config: &Arc<BundleConfig>,
    watcher: &mut Debouncer<RecommendedWatcher>,
    current_watched: &mut HashSet<PathBuf>,
    quiet: bool,
    verbose: u8,
) -> Result<()> {
    let paths_to_unwatch: Vec<_> = current_watched.iter().cloned().collect();
    log::debug!("Clearing {} previous watches.", paths_to_unwatch.len());
    for path in paths_to_unwatch {
        match watcher.watcher().unwatch(&path) {
            Ok(_) => {
                log::trace!("Unwatched: {}", path.display());
                current_watched.remove(&path);
            }
            Err(e) => match e.kind {
                ErrorKind::WatchNotFound => {
                    log::trace!("Watch not found for {}, removing.", path.display());
                    current_watched.remove(&path); // Remove even if not found
                }
                _ => {
                    if !quiet && verbose > 0 {
                        eprintln!(
                            "{} Failed to unwatch {}: {}",
                            "⚠️".yellow(),
                            path.display(),
                            e
                        );
                    }
                    log::warn!("Failed to unwatch {}: {}", path.display(), e);
                }
            },
        }
    }
    current_watched.clear();

    log::debug!("Setting up new watches based on current bundle membership...");
    let bundle = core::build_bundle(project_root, current_config);
    for file in &bundle.files {
        watch_path(watcher, &project_root.join(&file.path), current_watched, quiet);
    }

    let config_path_to_watch = BundleConfig::resolve_config_path(
        project_root,
        None,  // Rely on default resolution logic here for watching
        false, // Don't disable checking for the config file
    )?;
    if let Some(ref config_path) = config_path_to_watch {
        watch_path(watcher, config_path, current_watched, quiet);
    }

    if current_watched.is_empty() {
        if !quiet {
            println!(
                "{}",
                "⚠️ No bundled or config files found to watch based on current configuration."
                    .yellow()
            );
        }
    } else if !quiet && verbose > 0 {
        println!("🔍 Watching {} files/paths...", current_watched.len());
    }
    Ok(())
}

pub fn run_watch_mode(watch_args: WatchArgs, quiet: bool, verbose: u8) -> Result<()> {
    let project_root =
        BundleConfig::determine_project_root(watch_args.project_config.project_root.as_ref())
            .context("Failed to determine project root for watch mode")?;

    if !quiet {
        println!(
            "👀 Starting watch mode for '{}'. Press Ctrl+C to exit.",
            project_root.display()
        );
    }

    let mut config = Arc::new(
        load_config_for_command(
            &project_root,
            &watch_args.project_config,
            None, // No bundle args
            Some(&watch_args),
            Some(&watch_args.format_output),
        )
        .context("Failed to load initial configuration for watch mode")?,
    );

    let output_target_args = OutputTargetArgs {
        save: &watch_args.save,
        stdout: watch_args.save.is_none(), // Default to stdout if not saving
        format_output: &watch_args.format_output,
    };

    if let Err(e) = bundle::trigger_bundle(
        &project_root,
        &config,
        &output_target_args,
        quiet,
        verbose,
    ) {
        if !quiet {
            eprintln!("{} {}\n", "⚠️ Error during initial bundle:".yellow(), e);
        }
    } else if !quiet && verbose > 0 {
        println!("{}\n", "✅ Initial bundle complete.".green());
    }

    let (tx, rx) = mpsc::channel();
    let delay_duration = config
        .get_watch_delay()
        .context("Invalid watch delay duration")?;
    let mut debouncer = new_debouncer(delay_duration, tx)
        .map_err(|e| anyhow::anyhow!("Failed to create debouncer: {}", e))?;
    let mut watched_paths = HashSet::new();

    if let Err(e) = setup_watches(
        &project_root,
        &config,
        &mut debouncer,
        &mut watched_paths,
        quiet,
        verbose,
    ) {
        if !quiet {
            eprintln!(
                "{} {}\n",
                "⚠️ Error setting up initial watches:".yellow(),
                e
            );
        }
    }

    loop {
        match rx.recv() {
            Ok(event_result) => match event_result {
                Ok(debounced_events) => {
                    if debounced_events.is_empty() {
                        log::trace!("Received empty debounced event list.");
                        continue;
                    }
                    if !quiet && verbose > 0 {
                        eprintln!(
                            "\n{} {} event(s) detected.",
                            "🔄".blue(),
                            debounced_events.len()
                        );
                        for event in &debounced_events {
                            log::trace!("Debounced event: {:?}", event);
                        }
                    }

                    let config_path_being_used_result = BundleConfig::resolve_config_path(
                        &project_root,
                        watch_args.project_config.config_file.as_ref(),
                        watch_args.project_config.disable_config_file,
                    );

                    let config_changed = if let Ok(Some(ref current_config_path)) =
                        config_path_being_used_result
                    {
                        let canonical_config_path = current_config_path.canonicalize().ok();
                        debounced_events.iter().any(|event| {
                            let event_path_canonical = event.path.canonicalize().ok();
                            match (&canonical_config_path, &event_path_canonical) {
                                (Some(conf_canon), Some(evt_canon)) => conf_canon == evt_canon,
                                _ => event.path == *current_config_path,
                            }
                        })
                    } else {
                        false
                    };

                    if config_changed {
                        if !quiet && verbose > 0 {
                            eprintln!(
                                "{}",
                                "🔄 Config file changed. Reloading configuration...".blue()
                            );
                        }
                        match load_config_for_command(
                            &project_root,
                            &watch_args.project_config,
                            None,
                            Some(&watch_args),
                            Some(&watch_args.format_output),
                        ) {
                            Ok(reloaded_config) => {
                                config = Arc::new(reloaded_config);
                                if !quiet && verbose > 0 {
                                    eprintln!("{}", "✅ Configuration reloaded.".green());
                                }
                            }
                            Err(e) => {
                                if !quiet {
                                    eprintln!(
                                        "{} {:#}\n",
                                        "⚠️ Error reloading config:".yellow(),
                                        e
                                    );
                                }
                            }
                        }
                    }

                    if !quiet && verbose > 0 {
                        eprintln!("{}", "\n🔄 Rebundling...".blue());
                    }
                    if let Err(e) = bundle::trigger_bundle(
                        &project_root,
                        &config,
                        &output_target_args,
                        quiet,
                        verbose,
                    ) {
                        if !quiet {
                            eprintln!("{} {:#}\n", "⚠️ Error during rebundle:".yellow(), e);
                        }
                    } else if !quiet && verbose > 0 {
                        println!("{}\n", "✅ Rebundle complete.".green());
                    }

                    // The change may have created or removed related files,
                    // so the watch list is refreshed after every rebundle.
                    if let Err(e) = setup_watches(
                        &project_root,
                        &config,
                        &mut debouncer,
                        &mut watched_paths,
                        quiet,
                        verbose,
                    ) {
                        if !quiet {
                            eprintln!("{} {}\n", "⚠️ Error refreshing watches:".yellow(), e);
                        }
                    }
                }
                Err(error) => {
                    if !quiet {
                        eprintln!("{} {:#}\n", "⚠️ Watch error:".yellow(), error);
                    }
                    log::error!("Notify error received: {:?}", error);
                }
            },
            Err(e) => {
                eprintln!("{} {:#}\n", "⛔ Watcher channel error:".red(), e);
                break Ok(());
            }
        }
    }
}
