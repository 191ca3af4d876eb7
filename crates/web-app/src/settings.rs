use log::Level;
use serde::{Deserialize, Serialize};

use crate::log::LevelDef;

#[allow(async_fn_in_trait)]
pub trait SettingsService {
    async fn get_settings(&self) -> Result<Settings, String>;
    async fn set_settings(&self, settings: Settings) -> Result<(), String>;
}

#[allow(async_fn_in_trait)]
pub trait SettingsRepository {
    async fn read_settings(&self) -> Result<Settings, String>;
    async fn write_settings(&self, settings: Settings) -> Result<(), String>;
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the catalog service, relative URLs are resolved against the page.
    pub catalog_url: String,
    #[serde(with = "LevelDef")]
    pub log_level: Level,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            catalog_url: "api".to_string(),
            log_level: Level::Info,
        }
    }
}
