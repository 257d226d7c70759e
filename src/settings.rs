use std::{collections::HashMap, path::Path};

use anyhow::{Context, Result};
use ini::Ini;
use tracing::debug;

use crate::constants::{
    DEFAULT_AWS_REGION, SETTING_DEFAULT_REGION, SETTING_STS_VERSION, STS_API_VERSION,
};

/// Key-path lookup of tool settings such as `defaults.region`
pub trait SettingsProvider {
    fn get(&self, path: &str) -> Option<String>;
}

/// Settings keyed by dotted path.
///
/// In the INI file a path `a.b.c` lives in section `[a.b]` under key `c`,
/// so `services.sts.endpoint` is written as:
///
/// ```ini
/// [services.sts]
/// endpoint = https://sts.eu-west-1.amazonaws.com
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    values: HashMap<String, String>,
}

impl Settings {
    /// Built-in defaults used when no settings file overrides them
    pub fn builtin() -> Self {
        Self::default()
            .with(SETTING_DEFAULT_REGION, DEFAULT_AWS_REGION)
            .with(SETTING_STS_VERSION, STS_API_VERSION)
    }

    pub fn with(mut self, path: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(path.into(), value.into());
        self
    }

    /// Built-in defaults overlaid with the file at `path`, if it exists
    pub fn load(path: &Path) -> Result<Self> {
        let settings = Self::builtin();

        if !path.exists() {
            debug!("No settings file at {}, using defaults", path.display());
            return Ok(settings);
        }

        let ini = Ini::load_from_file(path)
            .with_context(|| format!("Failed to load settings file {}", path.display()))?;

        debug!("Loaded settings from {}", path.display());
        Ok(settings.merge_ini(&ini))
    }

    fn merge_ini(mut self, ini: &Ini) -> Self {
        for (section, properties) in ini.iter() {
            for (key, value) in properties.iter() {
                let path = match section {
                    Some(section) => format!("{section}.{key}"),
                    None => key.to_string(),
                };
                self.values.insert(path, value.to_string());
            }
        }
        self
    }
}

impl SettingsProvider for Settings {
    fn get(&self, path: &str) -> Option<String> {
        self.values.get(path).cloned()
    }
}
