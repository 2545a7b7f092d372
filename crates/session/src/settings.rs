use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized},
};
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};

use crate::manager::{DEFAULT_REPLY_LATENCY, ManagerConfig};
use crate::theme::ThemePreference;

pub const SETTINGS_DIRECTORY_NAME: &str = "sdm-dashboard";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const SETTINGS_ENV_PREFIX: &str = "SDM_DASHBOARD_";
pub const DEFAULT_LOG_FILTER: &str = "info";
pub const MAX_REPLY_LATENCY_MS: u64 = 60_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSettings {
    #[serde(default)]
    pub theme_mode: ThemePreference,
    #[serde(default = "default_reply_latency_ms")]
    pub reply_latency_ms: u64,
    #[serde(default)]
    pub sidebar_collapsed: bool,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            theme_mode: ThemePreference::default(),
            reply_latency_ms: default_reply_latency_ms(),
            sidebar_collapsed: false,
            log_filter: default_log_filter(),
        }
    }
}

impl DashboardSettings {
    pub fn normalized(mut self) -> Self {
        self.reply_latency_ms = self.reply_latency_ms.min(MAX_REPLY_LATENCY_MS);
        self.log_filter = if self.log_filter.trim().is_empty() {
            default_log_filter()
        } else {
            self.log_filter.trim().to_string()
        };
        self
    }

    pub fn reply_latency(&self) -> Duration {
        Duration::from_millis(self.reply_latency_ms)
    }

    pub fn manager_config(&self) -> ManagerConfig {
        ManagerConfig::default().with_reply_latency(self.reply_latency())
    }
}

/// Current settings plus their JSON file.
///
/// Readers get a cheap `Arc` snapshot; writes persist first and only then swap.
pub struct SettingsStore {
    settings: ArcSwap<DashboardSettings>,
    config_path: PathBuf,
}

impl SettingsStore {
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|path| path.join(SETTINGS_DIRECTORY_NAME))
            .unwrap_or_else(|| PathBuf::from(".sdm-dashboard"))
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join(SETTINGS_FILE_NAME)
    }

    pub fn new(config_path: PathBuf) -> Self {
        let figment = Figment::from(Serialized::defaults(DashboardSettings::default()))
            .merge(Json::file(&config_path))
            .merge(Env::prefixed(SETTINGS_ENV_PREFIX));
        Self::from_figment(figment, config_path)
    }

    /// Like [`SettingsStore::new`] without the environment layer.
    pub fn from_file(config_path: PathBuf) -> Self {
        let figment = Figment::from(Serialized::defaults(DashboardSettings::default()))
            .merge(Json::file(&config_path));
        Self::from_figment(figment, config_path)
    }

    pub fn load() -> Self {
        Self::new(Self::default_config_path())
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn settings(&self) -> Arc<DashboardSettings> {
        self.settings.load_full()
    }

    pub fn update(&self, settings: DashboardSettings) -> Result<(), SettingsError> {
        let normalized_settings = settings.normalized();
        self.persist(&normalized_settings)?;
        self.settings.store(Arc::new(normalized_settings));
        Ok(())
    }

    pub fn modify(
        &self,
        change: impl FnOnce(&mut DashboardSettings),
    ) -> Result<Arc<DashboardSettings>, SettingsError> {
        let mut settings = DashboardSettings::clone(&self.settings());
        change(&mut settings);
        self.update(settings)?;
        Ok(self.settings())
    }

    fn from_figment(figment: Figment, config_path: PathBuf) -> Self {
        let settings = match figment.extract::<DashboardSettings>() {
            Ok(settings) => settings.normalized(),
            Err(error) => {
                tracing::warn!(
                    "failed to parse settings from {:?}: {}. using defaults",
                    config_path,
                    error
                );
                DashboardSettings::default()
            }
        };

        Self {
            settings: ArcSwap::from_pointee(settings),
            config_path,
        }
    }

    fn persist(&self, settings: &DashboardSettings) -> Result<(), SettingsError> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).context(CreateDirSnafu {
                stage: "create-settings-directory",
                path: parent.to_path_buf(),
            })?;
        }

        let content = serde_json::to_string_pretty(settings).context(SerializeConfigSnafu {
            stage: "serialize-settings-json",
        })?;

        let temp_path = self.config_path.with_extension("json.tmp");
        std::fs::write(&temp_path, content).context(WriteFileSnafu {
            stage: "write-temporary-settings-file",
            path: temp_path.clone(),
        })?;

        std::fs::rename(&temp_path, &self.config_path).context(RenameTempFileSnafu {
            stage: "rename-temporary-settings-file",
            from: temp_path,
            to: self.config_path.clone(),
        })?;

        tracing::info!("saved settings to {:?}", self.config_path);
        Ok(())
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SettingsError {
    #[snafu(display("failed to create settings directory at {path:?} on `{stage}`: {source}"))]
    CreateDir {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("failed to serialize settings on `{stage}`: {source}"))]
    SerializeConfig {
        stage: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("failed to write settings file at {path:?} on `{stage}`: {source}"))]
    WriteFile {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display(
        "failed to replace settings file from {from:?} to {to:?} on `{stage}`: {source}"
    ))]
    RenameTempFile {
        stage: &'static str,
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}

fn default_reply_latency_ms() -> u64 {
    DEFAULT_REPLY_LATENCY.as_millis() as u64
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SettingsStore::from_file(dir.path().join(SETTINGS_FILE_NAME));
        let settings = store.settings();

        assert_eq!(*settings, DashboardSettings::default());
        assert_eq!(settings.reply_latency(), Duration::from_millis(1500));
        assert_eq!(settings.log_filter, "info");
    }

    #[test]
    fn update_persists_and_reloads() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join(SETTINGS_FILE_NAME);
        let store = SettingsStore::from_file(path.clone());

        let updated = store
            .modify(|settings| {
                settings.theme_mode = settings.theme_mode.toggle();
                settings.sidebar_collapsed = true;
            })
            .expect("persisted");
        assert!(updated.theme_mode.is_dark());
        assert!(!path.with_extension("json.tmp").exists());

        let reloaded = SettingsStore::from_file(path);
        assert_eq!(reloaded.settings().theme_mode, ThemePreference::Dark);
        assert!(reloaded.settings().sidebar_collapsed);
    }

    #[test]
    fn partial_file_keeps_other_defaults_and_normalizes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(SETTINGS_FILE_NAME);
        std::fs::write(&path, r#"{ "reply_latency_ms": 900000, "log_filter": "  " }"#)
            .expect("write");

        let settings = SettingsStore::from_file(path).settings();
        assert_eq!(settings.reply_latency_ms, MAX_REPLY_LATENCY_MS);
        assert_eq!(settings.log_filter, DEFAULT_LOG_FILTER);
        assert_eq!(settings.theme_mode, ThemePreference::Light);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(SETTINGS_FILE_NAME);
        std::fs::write(&path, "{ not json").expect("write");

        let store = SettingsStore::from_file(path);
        assert_eq!(*store.settings(), DashboardSettings::default());
    }

    #[test]
    fn manager_config_follows_latency() {
        let settings = DashboardSettings {
            reply_latency_ms: 25,
            ..DashboardSettings::default()
        };
        assert_eq!(
            settings.manager_config().reply_latency,
            Duration::from_millis(25)
        );
    }
}
