//! Layered TOML settings for twinpane.
//!
//! Later layers override earlier ones field by field. Highest priority first:
//! 1. CLI flags (`--editor`, `--no-watcher`, `--log-file`)
//! 2. Explicit `--config FILE`
//! 3. `$TWINPANE_CONFIG` environment variable (path to config file)
//! 4. Project-local `.twinpane.toml` in the current working directory
//! 5. Global `~/.config/twinpane/config.toml`
//! 6. Built-in defaults

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// `[general]`
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Capture the mouse for wheel scrolling.
    pub mouse: Option<bool>,
}

/// External editor launched on the highlighted entry.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct EditorConfig {
    /// Program name or path, e.g. `code` or `nvim`.
    pub command: Option<String>,
}

/// `[watcher]`: auto-refresh of panels when their directory changes.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct WatcherConfig {
    pub enabled: Option<bool>,
    /// Quiet period before a batch of changes is reported.
    pub debounce_ms: Option<u64>,
}

/// `[theme]`
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeConfig {
    /// Color scheme: "dark" or "light".
    pub scheme: Option<String>,
}

/// Log file settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LogConfig {
    pub file: Option<PathBuf>,
    /// One of "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Everything the config file can set. Each layer is partial; unset fields
/// fall through to the layer below and finally to the getters' defaults.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub editor: EditorConfig,
    pub watcher: WatcherConfig,
    pub theme: ThemeConfig,
    pub log: LogConfig,
    /// Command name → replacement key list, e.g. `copy = ["ctrl+c"]`.
    pub keys: HashMap<String, Vec<String>>,
}

pub const DEFAULT_DEBOUNCE_MS: u64 = crate::fs::watch::DEFAULT_DEBOUNCE_MS;
/// Default editor command.
pub const DEFAULT_EDITOR: &str = "code";
/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Config files searched on every start, highest priority first.
/// `--config` is layered on top by [`AppConfig::load`].
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(env_path) = std::env::var("TWINPANE_CONFIG") {
        paths.push(PathBuf::from(env_path));
    }

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".twinpane.toml"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("twinpane").join("config.toml"));
    }

    paths
}

/// Try to read and parse a TOML config file.
///
/// A missing file is `Ok(None)`; a file that exists but does not parse is an
/// `Err` carrying a message for the log.
fn load_file(path: &Path) -> Result<Option<AppConfig>, String> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return Ok(None),
    };
    toml::from_str::<AppConfig>(&content)
        .map(Some)
        .map_err(|e| format!("failed to parse config file {}: {}", path.display(), e))
}

impl AppConfig {
    /// Merge `other` on top of `self`; `other`'s `Some` values win. Key
    /// bindings merge per command.
    pub fn merge(self, other: &AppConfig) -> AppConfig {
        let mut keys = self.keys;
        keys.extend(other.keys.iter().map(|(k, v)| (k.clone(), v.clone())));

        AppConfig {
            general: GeneralConfig {
                mouse: other.general.mouse.or(self.general.mouse),
            },
            editor: EditorConfig {
                command: other.editor.command.clone().or(self.editor.command),
            },
            watcher: WatcherConfig {
                enabled: other.watcher.enabled.or(self.watcher.enabled),
                debounce_ms: other.watcher.debounce_ms.or(self.watcher.debounce_ms),
            },
            theme: ThemeConfig {
                scheme: other.theme.scheme.clone().or(self.theme.scheme),
            },
            log: LogConfig {
                file: other.log.file.clone().or(self.log.file),
                level: other.log.level.clone().or(self.log.level),
            },
            keys,
        }
    }

    /// Merge defaults, the discovered files, `--config` and the command
    /// line flags in that order.
    /// Files that fail to parse are skipped; their messages are returned so
    /// they can be logged once logging is up.
    pub fn load(
        cli_config_path: Option<&Path>,
        cli_overrides: Option<&AppConfig>,
    ) -> (AppConfig, Vec<String>) {
        let mut config = AppConfig::default();
        let mut warnings = Vec::new();

        let mut layers: Vec<PathBuf> = candidate_paths().into_iter().rev().collect();
        if let Some(cli_path) = cli_config_path {
            layers.push(cli_path.to_path_buf());
        }

        for path in &layers {
            match load_file(path) {
                Ok(Some(file_cfg)) => config = config.merge(&file_cfg),
                Ok(None) => {}
                Err(msg) => warnings.push(msg),
            }
        }

        if let Some(overrides) = cli_overrides {
            config = config.merge(overrides);
        }

        (config, warnings)
    }

    pub fn mouse_enabled(&self) -> bool {
        self.general.mouse.unwrap_or(true)
    }

    pub fn editor_command(&self) -> &str {
        self.editor.command.as_deref().unwrap_or(DEFAULT_EDITOR)
    }

    pub fn watcher_enabled(&self) -> bool {
        self.watcher.enabled.unwrap_or(true)
    }

    pub fn debounce_ms(&self) -> u64 {
        self.watcher.debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS)
    }

    /// Theme scheme: "dark" or "light".
    pub fn theme_scheme(&self) -> &str {
        self.theme.scheme.as_deref().unwrap_or("dark")
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    /// Log file from config, else `<cache dir>/twinpane/twinpane.log`.
    pub fn log_file(&self) -> Option<PathBuf> {
        self.log.file.clone().or_else(|| {
            dirs::cache_dir().map(|dir| dir.join("twinpane").join("twinpane.log"))
        })
    }
}
