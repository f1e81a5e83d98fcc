use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context};
use serde::Deserialize;
use shared::domain::HistoryMode;
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "chat.toml";
const PREFERENCES_FILE: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub server_url: String,
    pub send_history: bool,
    pub data_dir: Option<PathBuf>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5001".into(),
            send_history: true,
            data_dir: None,
        }
    }
}

impl ClientSettings {
    pub fn history_mode(&self) -> HistoryMode {
        HistoryMode::from_enabled(self.send_history)
    }

    /// Preferences file (theme), under the data dir or the per-user local data dir.
    pub fn preferences_path(&self) -> anyhow::Result<PathBuf> {
        let root = match &self.data_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_local_dir()
                .ok_or_else(|| anyhow!("unable to resolve local app data dir"))?
                .join("ask_chat"),
        };
        Ok(root.join(PREFERENCES_FILE))
    }
}

/// Defaults, then the TOML file, then environment overrides.
///
/// An explicit `config_path` must exist; the default `chat.toml` is optional.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<ClientSettings> {
    let mut settings = match config_path {
        Some(path) => read_settings_file(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            read_settings_file(Path::new(DEFAULT_CONFIG_FILE))?
        }
        None => ClientSettings::default(),
    };
    apply_env_overrides(&mut settings, |name| std::env::var(name).ok());
    Ok(settings)
}

fn read_settings_file(path: &Path) -> anyhow::Result<ClientSettings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file '{}'", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("invalid config file '{}'", path.display()))
}

pub fn apply_env_overrides(
    settings: &mut ClientSettings,
    lookup: impl Fn(&str) -> Option<String>,
) {
    let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

    if let Some(v) = non_empty("CHAT_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = non_empty("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = non_empty("APP__SEND_HISTORY") {
        match parse_flag(&v) {
            Some(flag) => settings.send_history = flag,
            None => warn!("ignoring APP__SEND_HISTORY={v}: expected true/false"),
        }
    }

    if let Some(v) = non_empty("APP__DATA_DIR") {
        settings.data_dir = Some(PathBuf::from(v));
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
