/// Config directory loader with validation and hot-reload support.
///
/// Reads `readycheck.yaml` from a directory path, validates on load, watches
/// for file changes via `notify`, and emits config change events via
/// `tokio::sync::watch`.
use std::path::{Path, PathBuf};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::watch;

use crate::config::*;
use crate::errors::ReadyCheckError;

/// File name of the ready check configuration inside the config directory.
pub const CONFIG_FILE: &str = "readycheck.yaml";

/// Loads, validates, and watches configuration from a directory.
///
/// Expected directory structure:
/// ```text
/// config/
/// └── readycheck.yaml
/// ```
///
/// A directory without `readycheck.yaml` yields the defaults.
pub struct ConfigLoader {
    /// Root config directory path.
    config_dir: PathBuf,
    /// Watch sender for broadcasting config changes.
    tx: watch::Sender<ReadyCheckConfig>,
    /// File watcher handle (kept alive to maintain the watch).
    _watcher: Option<RecommendedWatcher>,
}

impl ConfigLoader {
    /// Load configuration from a directory, validate, and return a `ConfigLoader`
    /// along with a `watch::Receiver` for subscribing to config changes.
    ///
    /// Call `watch()` afterwards to start hot-reload file watching.
    pub fn load(
        config_dir: &Path,
    ) -> Result<(Self, watch::Receiver<ReadyCheckConfig>), ReadyCheckError> {
        let config = Self::load_all(config_dir)?;
        Self::validate(&config)?;

        let (tx, rx) = watch::channel(config);

        Ok((
            Self {
                config_dir: config_dir.to_path_buf(),
                tx,
                _watcher: None,
            },
            rx,
        ))
    }

    /// The most recent valid configuration.
    pub fn current(&self) -> ReadyCheckConfig {
        self.tx.borrow().clone()
    }

    /// Start watching the config directory for changes.
    ///
    /// File changes trigger a reload. If the new config is valid, it's
    /// broadcast via the watch channel. Invalid configs are logged but don't
    /// replace the current valid config.
    pub fn watch(&mut self) -> Result<(), ReadyCheckError> {
        let config_dir = self.config_dir.clone();
        let tx = self.tx.clone();

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event)
                    if matches!(
                        event.kind,
                        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                    ) =>
                {
                    Self::reload(&config_dir, &tx);
                }
                Ok(_) => {}
                Err(e) => tracing::error!("file watcher error: {e}"),
            }
        })
        .map_err(|e| ReadyCheckError::Config(format!("failed to create file watcher: {e}")))?;

        watcher
            .watch(&self.config_dir, RecursiveMode::NonRecursive)
            .map_err(|e| {
                ReadyCheckError::Config(format!("failed to watch config directory: {e}"))
            })?;

        self._watcher = Some(watcher);
        tracing::info!(dir = %self.config_dir.display(), "started watching config directory");
        Ok(())
    }

    /// Re-read the directory and publish the result if it is valid and differs
    /// from the current config. Returns whether subscribers were notified.
    fn reload(config_dir: &Path, tx: &watch::Sender<ReadyCheckConfig>) -> bool {
        let config = match Self::load_all(config_dir).and_then(|config| {
            Self::validate(&config)?;
            Ok(config)
        }) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "config reload rejected, keeping previous config");
                return false;
            }
        };

        let changed = tx.send_if_modified(|current| {
            if *current == config {
                return false;
            }
            *current = config;
            true
        });
        if changed {
            tracing::info!(dir = %config_dir.display(), "config reloaded");
        }
        changed
    }

    /// Load the config file from a directory, falling back to defaults when absent.
    pub fn load_all(config_dir: &Path) -> Result<ReadyCheckConfig, ReadyCheckError> {
        let path = config_dir.join(CONFIG_FILE);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(ReadyCheckConfig::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| {
            ReadyCheckError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::parse(&content)
            .map_err(|e| ReadyCheckError::Config(format!("failed to parse {}: {e}", path.display())))
    }

    /// Parse a YAML document. An empty document yields the defaults.
    pub fn parse(content: &str) -> Result<ReadyCheckConfig, ReadyCheckError> {
        if content.trim().is_empty() {
            return Ok(ReadyCheckConfig::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Validate the config for internal consistency.
    ///
    /// Checks:
    /// - Accept and cancel emojis are non-empty and distinct
    /// - Default threshold is positive
    /// - Default timeout is positive
    pub fn validate(config: &ReadyCheckConfig) -> Result<(), ReadyCheckError> {
        Self::validate_validation(&config.validation)
    }

    fn validate_validation(config: &ValidationConfig) -> Result<(), ReadyCheckError> {
        for (field, emoji) in [
            ("accept_emoji", &config.accept_emoji),
            ("cancel_emoji", &config.cancel_emoji),
        ] {
            if emoji.trim().is_empty() {
                return Err(ReadyCheckError::Config(format!(
                    "validation.{field} must not be empty"
                )));
            }
        }

        if config.accept_emoji == config.cancel_emoji {
            return Err(ReadyCheckError::Config(format!(
                "validation.accept_emoji and validation.cancel_emoji must differ (both '{}')",
                config.accept_emoji
            )));
        }

        if config.default_threshold == 0 {
            return Err(ReadyCheckError::Config(
                "validation.default_threshold must be positive (got 0)".to_string(),
            ));
        }

        if config.default_timeout_secs == 0 {
            return Err(ReadyCheckError::Config(
                "validation.default_timeout_secs must be positive (got 0)".to_string(),
            ));
        }

        Ok(())
    }
}
