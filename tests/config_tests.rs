//! Integration tests for the configuration layers: defaults, TOML file,
//! `DUPEREVIEW_` environment variables and command-line flags.

use clap::Parser;
use dupereview::cli::{Cli, ThemeArg};
use dupereview::config::Config;
use std::fs;
use std::sync::Mutex;
use tempfile::tempdir;

static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Clear all DUPEREVIEW_* environment variables to avoid interference.
fn clear_env() {
    for (key, _) in std::env::vars() {
        if key.starts_with("DUPEREVIEW_") {
            std::env::remove_var(key);
        }
    }
}

fn cli(args: &[&str]) -> Cli {
    let mut argv = vec!["dupereview", "-s", "/src", "-d", "/dst"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
}

#[test]
fn test_missing_file_gives_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let temp_dir = tempdir().unwrap();

    let config = Config::load_from_path(temp_dir.path().join("absent.toml"));
    assert_eq!(config, Config::default());
    assert_eq!(config.theme, ThemeArg::Auto);
    assert!(!config.include_hidden);
    assert!(!config.follow_symlinks);
}

#[test]
fn test_config_load_from_toml() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let toml_content = r#"
theme = "light"
fps = 24
follow_symlinks = true
include_hidden = true
ignore_patterns = ["*.tmp", ".thumbnails/"]
accessible = true
"#;
    fs::write(&config_path, toml_content).unwrap();

    let config = Config::load_from_path(&config_path);
    assert_eq!(config.theme, ThemeArg::Light);
    assert_eq!(config.fps, 24);
    assert!(config.follow_symlinks);
    assert!(config.include_hidden);
    assert_eq!(config.ignore_patterns, vec!["*.tmp", ".thumbnails/"]);
    assert!(config.accessible);

    let walker = config.walker_config();
    assert!(walker.follow_symlinks);
    assert!(!walker.skip_hidden);
}

#[test]
fn test_env_overrides_file() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "theme = \"light\"\nfps = 24\n").unwrap();

    std::env::set_var("DUPEREVIEW_FPS", "10");
    std::env::set_var("DUPEREVIEW_THEME", "dark");
    let config = Config::load_from_path(&config_path);
    clear_env();

    assert_eq!(config.fps, 10);
    assert_eq!(config.theme, ThemeArg::Dark);
}

#[test]
fn test_cli_overrides_env_and_file() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        "include_hidden = true\nfollow_symlinks = true\nignore_patterns = [\"*.tmp\"]\n",
    )
    .unwrap();

    std::env::set_var("DUPEREVIEW_FPS", "10");
    let mut config = Config::load_from_path(&config_path);
    clear_env();

    config.merge_cli(&cli(&[
        "--fps",
        "60",
        "--no-include-hidden",
        "--theme",
        "light",
        "-i",
        "*.tmp",
        "-i",
        "cache/",
    ]));

    assert_eq!(config.fps, 60);
    assert_eq!(config.theme, ThemeArg::Light);
    assert!(!config.include_hidden);
    // Not given on the command line, so the file value stands
    assert!(config.follow_symlinks);
    assert_eq!(config.ignore_patterns, vec!["*.tmp", "cache/"]);
}

#[test]
fn test_review_options_follow_config() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let mut config = Config::default();
    config.merge_cli(&cli(&["--accessible", "--fps", "15", "--theme", "dark"]));

    let options = config.review_options();
    assert_eq!(options.fps, 15);
    assert!(options.accessible);
    assert!(!options.theme.is_light());
}

#[test]
fn test_malformed_toml_falls_back_to_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "fps = \"fast\"\n[[[").unwrap();

    assert_eq!(Config::load_from_path(&config_path), Config::default());
    assert!(Config::try_load_from_path(&config_path).is_err());
}

#[test]
fn test_unknown_theme_is_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "theme = \"neon\"\n").unwrap();

    let err = Config::try_load_from_path(&config_path).unwrap_err();
    assert!(err.to_string().contains("neon"));
}

#[test]
fn test_fps_range_enforced_on_command_line() {
    let base = ["dupereview", "-s", "/a", "-d", "/b"];
    for bad in ["0", "121", "abc"] {
        let mut argv = base.to_vec();
        argv.extend(["--fps", bad]);
        assert!(Cli::try_parse_from(argv).is_err(), "fps {bad} accepted");
    }
}
