//! Site-wide display preferences (site name and theme color).
//!
//! Loaded once on start with defaults for anything unset. Values are not
//! validated and outlive any user session.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use tracing::info;

mod store;

pub use store::{FilePreferenceStore, MemoryPreferenceStore, PreferenceError, PreferenceStore};

pub const SITE_NAME_KEY: &str = "siteName";
pub const THEME_COLOR_KEY: &str = "themeColor";

pub const DEFAULT_SITE_NAME: &str = "DERSFLIX";
/// Tailwind red-600
pub const DEFAULT_THEME_COLOR: &str = "#DC2626";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitePreferences {
    pub site_name: String,
    pub theme_color: String,
}

/// Current preferences backed by a [`PreferenceStore`]
pub struct SiteSettings {
    store: Arc<dyn PreferenceStore>,
    current: RwLock<SitePreferences>,
}

impl SiteSettings {
    pub fn load(store: Arc<dyn PreferenceStore>) -> Result<Self, PreferenceError> {
        let site_name = store
            .get(SITE_NAME_KEY)?
            .unwrap_or_else(|| DEFAULT_SITE_NAME.to_string());
        let theme_color = store
            .get(THEME_COLOR_KEY)?
            .unwrap_or_else(|| DEFAULT_THEME_COLOR.to_string());
        info!(%site_name, %theme_color, "site preferences loaded");

        Ok(Self {
            store,
            current: RwLock::new(SitePreferences {
                site_name,
                theme_color,
            }),
        })
    }

    pub fn snapshot(&self) -> Result<SitePreferences, PreferenceError> {
        let current = self.current.read().map_err(|_| PreferenceError::Poisoned)?;
        Ok(current.clone())
    }

    pub fn set_site_name(&self, name: &str) -> Result<(), PreferenceError> {
        self.store.set(SITE_NAME_KEY, name)?;
        self.current
            .write()
            .map_err(|_| PreferenceError::Poisoned)?
            .site_name = name.to_string();
        Ok(())
    }

    pub fn set_theme_color(&self, color: &str) -> Result<(), PreferenceError> {
        self.store.set(THEME_COLOR_KEY, color)?;
        self.current
            .write()
            .map_err(|_| PreferenceError::Poisoned)?
            .theme_color = color.to_string();
        Ok(())
    }
}
