use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeSource {
    #[default]
    System,
    Light,
    Dark,
}

impl ThemeSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeSource::System => "system",
            ThemeSource::Light => "light",
            ThemeSource::Dark => "dark",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "system" => Some(ThemeSource::System),
            "light" => Some(ThemeSource::Light),
            "dark" => Some(ThemeSource::Dark),
            _ => None,
        }
    }

    /// Unrecognized values collapse to `System`.
    pub fn coerce(raw: Option<&str>) -> Self {
        raw.and_then(Self::parse).unwrap_or_default()
    }

    /// Dark-mode flag implied by this source given the OS signal.
    pub fn resolve_dark(self, system_prefers_dark: bool) -> bool {
        match self {
            ThemeSource::System => system_prefers_dark,
            ThemeSource::Light => false,
            ThemeSource::Dark => true,
        }
    }
}

impl fmt::Display for ThemeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppearanceSnapshot {
    pub is_dark_mode: bool,
    pub theme_source: ThemeSource,
}

impl AppearanceSnapshot {
    pub fn resolve(theme_source: ThemeSource, system_prefers_dark: bool) -> Self {
        Self {
            is_dark_mode: theme_source.resolve_dark(system_prefers_dark),
            theme_source,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeSourcePayload {
    pub theme_source: ThemeSource,
}
