//! Light/dark theme preference and its persistence.

use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::{Path, PathBuf},
};

use shared::domain::Theme;
use tracing::{debug, warn};

use crate::error::StoreError;

pub const THEME_KEY: &str = "theme";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// String map kept as a pretty-printed JSON object on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Opens `path`. A missing, unreadable or corrupt file starts out empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!(
                    "ignoring corrupt preferences file '{}': {err}",
                    path.display()
                );
                BTreeMap::new()
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                warn!(
                    "unable to read preferences file '{}': {err}",
                    path.display()
                );
                BTreeMap::new()
            }
        };
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let encoded = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, encoded).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        self.persist()
    }
}

/// Where the active theme is shown.
///
/// Each theme has an icon; the visible one is the theme a toggle would switch to.
pub trait ThemePresenter {
    fn theme_attribute(&self) -> Option<Theme>;
    fn set_theme_attribute(&mut self, theme: Theme);
    fn set_icon_visibility(&mut self, light_icon_visible: bool, dark_icon_visible: bool);
}

pub struct ThemeController<S> {
    store: S,
}

impl<S: KeyValueStore> ThemeController<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Persisted theme, falling back to the system preference.
    pub fn initial_theme(&self, system_prefers_dark: bool) -> Theme {
        match self.store.get(THEME_KEY) {
            Some(raw) => raw.parse().unwrap_or_else(|err| {
                warn!("ignoring persisted theme: {err}");
                Theme::from_system_preference(system_prefers_dark)
            }),
            None => Theme::from_system_preference(system_prefers_dark),
        }
    }

    pub fn start(
        &mut self,
        system_prefers_dark: bool,
        presenter: &mut impl ThemePresenter,
    ) -> Result<Theme, StoreError> {
        let theme = self.initial_theme(system_prefers_dark);
        self.apply_theme(theme, presenter)?;
        Ok(theme)
    }

    /// Updates the presentation, then persists. The presentation changes even if persisting fails.
    pub fn apply_theme(
        &mut self,
        theme: Theme,
        presenter: &mut impl ThemePresenter,
    ) -> Result<(), StoreError> {
        presenter.set_theme_attribute(theme);
        presenter.set_icon_visibility(theme == Theme::Dark, theme == Theme::Light);
        debug!(%theme, "applied theme");
        self.store.set(THEME_KEY, theme.as_str())
    }

    pub fn toggle(&mut self, presenter: &mut impl ThemePresenter) -> Result<Theme, StoreError> {
        let next = presenter
            .theme_attribute()
            .unwrap_or(Theme::Light)
            .flipped();
        self.apply_theme(next, presenter)?;
        Ok(next)
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
#[path = "tests/theme_tests.rs"]
mod tests;
