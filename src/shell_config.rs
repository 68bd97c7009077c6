use std::{
    env,
    path::{Path, PathBuf},
};

use url::Url;

use crate::{
    window_addressing::parse_renderer_base, DEFAULT_DATA_DIR_NAME, DEFAULT_LOG_FILTER,
    LOG_FILTER_ENV, PACKAGED_RENDERER_URL, RENDERER_URL_ENV, ROOT_ENV, SYSTEM_DARK_ENV,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    /// Preferences and logs live under here. `None` when no home directory
    /// could be found and no override was given.
    pub root_dir: Option<PathBuf>,
    pub renderer_base: Url,
    pub log_filter: String,
    pub initial_system_dark: bool,
}

impl ShellConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`ShellConfig::from_env`] with an injectable variable source.
    pub fn from_lookup<L>(lookup: L) -> Self
    where
        L: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let root_dir = non_empty(ROOT_ENV)
            .map(PathBuf::from)
            .or_else(default_root_dir);
        let renderer_base = resolve_renderer_base(non_empty(RENDERER_URL_ENV).as_deref());
        let log_filter = non_empty(LOG_FILTER_ENV).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
        let initial_system_dark = non_empty(SYSTEM_DARK_ENV)
            .map(|raw| parse_flag(&raw))
            .unwrap_or(false);

        Self {
            root_dir,
            renderer_base,
            log_filter,
            initial_system_dark,
        }
    }

    pub fn root_dir(&self) -> Option<&Path> {
        self.root_dir.as_deref()
    }
}

pub fn default_root_dir() -> Option<PathBuf> {
    home::home_dir().map(|home| home.join(DEFAULT_DATA_DIR_NAME))
}

fn resolve_renderer_base(raw: Option<&str>) -> Url {
    if let Some(raw) = raw {
        match parse_renderer_base(raw) {
            Ok(url) => return url,
            Err(error) => {
                tracing::warn!(
                    %error,
                    env = RENDERER_URL_ENV,
                    "ignoring renderer url override, falling back to packaged assets"
                );
            }
        }
    }
    packaged_renderer_base()
}

fn packaged_renderer_base() -> Url {
    match Url::parse(PACKAGED_RENDERER_URL) {
        Ok(url) => url,
        Err(error) => unreachable!("packaged renderer url is invalid: {error}"),
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on" | "dark"
    )
}
