//! Application configuration.
//!
//! Settings are layered, later layers winning:
//!
//! 1. Built-in defaults
//! 2. `config.toml` in the platform config directory
//! 3. `DUPEREVIEW_` environment variables (e.g. `DUPEREVIEW_FPS=24`)
//! 4. Command-line flags, applied with [`Config::merge_cli`]
//!
//! ```toml
//! theme = "dark"
//! fps = 24
//! include_hidden = false
//! ignore_patterns = ["*.tmp", ".thumbnails/"]
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::{Cli, ThemeArg};
use crate::scanner::WalkerConfig;
use crate::tui::surface::DEFAULT_FPS;
use crate::tui::{ReviewOptions, Theme};

/// Prefix of environment variables read into [`Config`].
pub const ENV_PREFIX: &str = "DUPEREVIEW_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Review screen theme
    pub theme: ThemeArg,
    /// Video playback frame rate
    pub fps: u32,
    /// Follow symbolic links while walking
    pub follow_symlinks: bool,
    /// Walk hidden files and directories
    pub include_hidden: bool,
    /// Gitignore-style patterns excluded from both trees
    pub ignore_patterns: Vec<String>,
    /// ASCII borders and textual markers
    pub accessible: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: ThemeArg::Auto,
            fps: DEFAULT_FPS,
            follow_symlinks: false,
            include_hidden: false,
            ignore_patterns: Vec::new(),
            accessible: false,
        }
    }
}

impl Config {
    /// Load from the platform config directory and the environment.
    ///
    /// Falls back to defaults (with a warning) if the file is malformed.
    #[must_use]
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from_path(path),
            None => {
                log::debug!("No config directory on this platform, using defaults");
                Self::load_from_figment(Self::env_figment())
            }
        }
    }

    /// Load from a specific file and the environment.
    ///
    /// A missing file is not an error. A malformed one is logged and
    /// ignored.
    #[must_use]
    pub fn load_from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        log::debug!("Loading config from {}", path.display());
        Self::load_from_figment(Self::figment_for(path))
    }

    /// Load from a specific file and the environment, reporting errors.
    ///
    /// # Errors
    ///
    /// Returns the figment error for malformed TOML, unknown values or
    /// unparsable environment variables.
    pub fn try_load_from_path(path: impl AsRef<Path>) -> Result<Self, figment::Error> {
        Self::figment_for(path.as_ref()).extract()
    }

    /// `config.toml` in the platform config directory, if there is one.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "dupereview").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    fn base_figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
    }

    fn figment_for(path: &Path) -> Figment {
        Self::base_figment()
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    /// Defaults and environment only, for platforms without a config directory.
    fn env_figment() -> Figment {
        Self::base_figment().merge(Env::prefixed(ENV_PREFIX))
    }

    fn load_from_figment(figment: Figment) -> Self {
        match figment.extract() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring invalid configuration: {}", e);
                Self::default()
            }
        }
    }

    /// Apply command-line flags on top of the loaded layers.
    ///
    /// Ignore patterns from the command line are added to the configured ones.
    pub fn merge_cli(&mut self, cli: &Cli) {
        if let Some(theme) = cli.theme {
            self.theme = theme;
        }
        if let Some(fps) = cli.fps {
            self.fps = fps;
        }
        if let Some(follow) = cli.follow_symlinks_override() {
            self.follow_symlinks = follow;
        }
        if let Some(hidden) = cli.include_hidden_override() {
            self.include_hidden = hidden;
        }
        if cli.accessible {
            self.accessible = true;
        }
        for pattern in &cli.ignore_patterns {
            if !self.ignore_patterns.contains(pattern) {
                self.ignore_patterns.push(pattern.clone());
            }
        }
    }

    /// Walker settings for both trees.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig::new(
            self.follow_symlinks,
            !self.include_hidden,
            self.ignore_patterns.clone(),
        )
    }

    /// Display settings for the review screen.
    #[must_use]
    pub fn review_options(&self) -> ReviewOptions {
        ReviewOptions {
            theme: Theme::from_arg(self.theme),
            fps: self.fps,
            accessible: self.accessible,
        }
    }
}
