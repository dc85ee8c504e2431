use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use xbundle_core::{BundleConfig, DiagnosticKind, MatchMode, build_bundle};

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
}

fn include_config(paths: &[&str]) -> BundleConfig {
    let mut config = BundleConfig::default();
    config.paths.include = paths.iter().map(|s| s.to_string()).collect();
    config
}

fn exclude_config(paths: &[&str]) -> BundleConfig {
    let mut config = BundleConfig::default();
    config.paths.mode = MatchMode::Exclude;
    config.paths.include = Vec::new();
    config.paths.exclude = paths.iter().map(|s| s.to_string()).collect();
    config
}

fn bundled_paths(bundle: &xbundle_core::Bundle) -> Vec<&str> {
    bundle.files.iter().map(|f| f.path.as_str()).collect()
}

#[test]
fn overlapping_include_paths_emit_each_file_once() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "app/One.php", "<?php // one\n");
    write(tmp.path(), "app/Services/TwoService.php", "<?php // two\n");

    let mut config = include_config(&["app/", "app/Services/"]);
    config.source.follow_related = false;

    let bundle = build_bundle(tmp.path(), &config);
    let mut paths = bundled_paths(&bundle);
    paths.sort();
    assert_eq!(paths, vec!["app/One.php", "app/Services/TwoService.php"]);
    assert!(bundle.diagnostics.is_empty());
}

#[test]
fn bundling_twice_is_byte_identical() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "app/Http/Controllers/UserController.php",
        "<?php\nclass UserController {}\n",
    );
    write(
        tmp.path(),
        "app/Services/UserService.php",
        "<?php\nclass UserService {}\n",
    );
    write(
        tmp.path(),
        "app/Actions/UserAction.php",
        "<?php\nclass UserAction {}\n",
    );

    let config = include_config(&["app/Http/Controllers/"]);
    let first = build_bundle(tmp.path(), &config).render(&config.output.banner);
    let second = build_bundle(tmp.path(), &config).render(&config.output.banner);
    assert_eq!(first, second);
}

#[test]
fn relation_cycle_terminates_with_each_file_once() {
    let tmp = TempDir::new().unwrap();
    // Default rules are mutually referential: Controller -> Service -> Controller.
    write(
        tmp.path(),
        "app/Http/Controllers/UserController.php",
        "<?php // controller\n",
    );
    write(
        tmp.path(),
        "app/Services/UserService.php",
        "<?php // service\n",
    );

    let config = include_config(&["app/Http/Controllers/", "app/Services/"]);
    let bundle = build_bundle(tmp.path(), &config);
    assert_eq!(
        bundled_paths(&bundle),
        vec![
            "app/Http/Controllers/UserController.php",
            "app/Services/UserService.php",
        ]
    );
}

#[test]
fn output_follows_include_path_order() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "app/Http/Controllers/FooController.php",
        "<?php // foo\n",
    );
    write(tmp.path(), "app/Services/BarService.php", "<?php // bar\n");

    let config = include_config(&["app/Http/Controllers/", "app/Services/"]);
    let bundle = build_bundle(tmp.path(), &config);
    assert_eq!(
        bundled_paths(&bundle),
        vec![
            "app/Http/Controllers/FooController.php",
            "app/Services/BarService.php",
        ]
    );
}

#[test]
fn absent_related_candidates_leave_no_trace() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "app/Http/Controllers/BazController.php",
        "<?php // baz\n",
    );

    let config = include_config(&["app/Http/Controllers/"]);
    let bundle = build_bundle(tmp.path(), &config);
    assert_eq!(
        bundled_paths(&bundle),
        vec!["app/Http/Controllers/BazController.php"]
    );
    assert!(bundle.diagnostics.is_empty());
}

#[test]
fn missing_include_path_is_a_diagnostic_not_a_stop() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "app/Services/RealService.php", "<?php // real\n");

    let mut config = include_config(&["app/Ghost/", "app/Services/"]);
    config.source.follow_related = false;

    let bundle = build_bundle(tmp.path(), &config);
    assert_eq!(bundled_paths(&bundle), vec!["app/Services/RealService.php"]);
    assert_eq!(bundle.diagnostics.len(), 1);
    assert_eq!(bundle.diagnostics[0].kind, DiagnosticKind::PathNotFound);
    assert_eq!(bundle.diagnostics[0].path, "app/Ghost/");
}

#[test]
fn exclusion_respects_path_component_boundaries() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "app/Http/Inner.php", "<?php // inner\n");
    write(tmp.path(), "app/HttpHelpers/util.php", "<?php // util\n");

    let mut config = exclude_config(&["app/Http/"]);
    config.source.follow_related = false;

    let bundle = build_bundle(tmp.path(), &config);
    assert_eq!(bundled_paths(&bundle), vec!["app/HttpHelpers/util.php"]);
}

#[test]
fn exclusion_also_gates_related_candidates() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "app/Http/Controllers/UserController.php",
        "<?php // controller\n",
    );
    write(
        tmp.path(),
        "app/Services/UserService.php",
        "<?php // service\n",
    );

    let config = exclude_config(&["app/Services/"]);
    let bundle = build_bundle(tmp.path(), &config);
    assert_eq!(
        bundled_paths(&bundle),
        vec!["app/Http/Controllers/UserController.php"]
    );
}

#[test]
fn related_files_follow_their_parent_depth_first() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "app/Http/Controllers/UserController.php",
        "<?php // controller\n",
    );
    write(
        tmp.path(),
        "app/Services/UserService.php",
        "<?php // service\n",
    );
    write(tmp.path(), "app/Models/User.php", "<?php // model\n");

    let config = include_config(&["app/Http/Controllers/", "app/Models/"]);
    let bundle = build_bundle(tmp.path(), &config);
    assert_eq!(
        bundled_paths(&bundle),
        vec![
            "app/Http/Controllers/UserController.php",
            "app/Services/UserService.php",
            "app/Models/User.php",
        ]
    );
}

#[test]
fn relation_chains_are_followed_transitively() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "app/Http/Controllers/UserController.php",
        "<?php // controller\n",
    );
    write(
        tmp.path(),
        "app/Services/UserService.php",
        "<?php // service\n",
    );
    write(tmp.path(), "app/Actions/UserAction.php", "<?php // action\n");

    let config = include_config(&["app/Http/Controllers/"]);
    let bundle = build_bundle(tmp.path(), &config);
    assert_eq!(
        bundled_paths(&bundle),
        vec![
            "app/Http/Controllers/UserController.php",
            "app/Services/UserService.php",
            "app/Actions/UserAction.php",
        ]
    );
}

#[test]
fn disabling_relations_keeps_only_top_level_files() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "app/Http/Controllers/UserController.php",
        "<?php // controller\n",
    );
    write(
        tmp.path(),
        "app/Services/UserService.php",
        "<?php // service\n",
    );

    let mut config = include_config(&["app/Http/Controllers/"]);
    config.source.follow_related = false;

    let bundle = build_bundle(tmp.path(), &config);
    assert_eq!(
        bundled_paths(&bundle),
        vec!["app/Http/Controllers/UserController.php"]
    );
}

#[test]
fn rendered_text_matches_the_documented_layout() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "app/Http/Controllers/UserController.php",
        "<?php\n\nclass UserController {}\n",
    );
    write(
        tmp.path(),
        "app/Services/UserService.php",
        "<?php\n\nclass UserService {}\n",
    );

    let config = include_config(&["app/Http/Controllers/"]);
    let text = build_bundle(tmp.path(), &config).render(&config.output.banner);

    let expected = String::new()
        + "// LOGIC CODE BUNDLE\n"
        + "\n// FILE: app/Http/Controllers/UserController.php\n"
        + "<?php\n\nclass UserController {}\n"
        + "\n"
        + "\n// FILE: app/Services/UserService.php\n"
        + "<?php\n\nclass UserService {}\n"
        + "\n";
    assert_eq!(text, expected);
}

#[test]
fn non_utf8_file_is_reported_and_omitted() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "app/Services/GoodService.php", "<?php // good\n");
    let bad = tmp.path().join("app/Services/BadService.php");
    fs::write(&bad, [0xff, 0xfe, 0x00, 0x9f]).unwrap();

    let mut config = include_config(&["app/Services/"]);
    config.source.follow_related = false;

    let bundle = build_bundle(tmp.path(), &config);
    assert_eq!(
        bundled_paths(&bundle),
        vec!["app/Services/GoodService.php"]
    );
    assert_eq!(bundle.diagnostics.len(), 1);
    assert_eq!(bundle.diagnostics[0].kind, DiagnosticKind::FileRead);
    assert_eq!(bundle.diagnostics[0].path, "app/Services/BadService.php");
}

#[test]
fn custom_extension_is_honored_everywhere() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "app/Http/Controllers/UserController.ts", "// ts\n");
    write(tmp.path(), "app/Services/UserService.ts", "// ts service\n");
    write(
        tmp.path(),
        "app/Http/Controllers/StrayController.php",
        "<?php\n",
    );

    let mut config = include_config(&["app/Http/Controllers/"]);
    config.source.extension = "ts".to_string();

    let bundle = build_bundle(tmp.path(), &config);
    assert_eq!(
        bundled_paths(&bundle),
        vec![
            "app/Http/Controllers/UserController.ts",
            "app/Services/UserService.ts",
        ]
    );
}
