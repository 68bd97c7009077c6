use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use serde_json::{Map, Value};

use crate::{
    appearance_types::ThemeSource, errors::StorageError, DESKTOP_STATE_FILE, PREFERENCE_RECORD_ID,
};

const PREFERENCES_FIELD: &str = "preferences";
const THEME_SOURCE_FIELD: &str = "themeSource";

/// Durable storage for the singleton preference record.
///
/// `Ok(None)` means "no record yet"; only real storage failures are errors.
pub trait PreferenceStore: Send + Sync {
    fn read_theme_source(&self) -> Result<Option<ThemeSource>, StorageError>;
    fn upsert_theme_source(&self, theme_source: ThemeSource) -> Result<(), StorageError>;
}

fn empty_state_object() -> Value {
    Value::Object(Map::new())
}

fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = empty_state_object();
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just normalized into a JSON object"),
    }
}

/// Stores the record in the shell's JSON state file next to any unrelated keys.
#[derive(Debug)]
pub struct JsonPreferenceStore {
    state_path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonPreferenceStore {
    pub fn new(state_path: PathBuf) -> Self {
        Self {
            state_path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn in_root_dir(root_dir: &Path) -> Self {
        Self::new(root_dir.join("data").join(DESKTOP_STATE_FILE))
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    fn read_state(&self) -> Result<Option<Value>, StorageError> {
        let raw = match fs::read_to_string(&self.state_path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StorageError::Read {
                    path: self.state_path.clone(),
                    source,
                });
            }
        };

        serde_json::from_str::<Value>(&raw)
            .map(Some)
            .map_err(|source| StorageError::Parse {
                path: self.state_path.clone(),
                source,
            })
    }
}

impl PreferenceStore for JsonPreferenceStore {
    fn read_theme_source(&self) -> Result<Option<ThemeSource>, StorageError> {
        let Some(state) = self.read_state()? else {
            return Ok(None);
        };

        let Some(raw) = state
            .get(PREFERENCES_FIELD)
            .and_then(|preferences| preferences.get(PREFERENCE_RECORD_ID))
            .and_then(|record| record.get(THEME_SOURCE_FIELD))
        else {
            return Ok(None);
        };

        let parsed = raw.as_str().and_then(ThemeSource::parse);
        if parsed.is_none() {
            tracing::warn!(
                path = %self.state_path.display(),
                value = %raw,
                "ignoring unrecognized persisted theme source"
            );
        }
        Ok(parsed)
    }

    fn upsert_theme_source(&self, theme_source: ThemeSource) -> Result<(), StorageError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(parent_dir) = self.state_path.parent() {
            fs::create_dir_all(parent_dir).map_err(|source| StorageError::Write {
                path: parent_dir.to_path_buf(),
                source,
            })?;
        }

        let mut state = match self.read_state() {
            Ok(Some(state)) => state,
            Ok(None) => empty_state_object(),
            Err(StorageError::Parse { path, source }) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %source,
                    "preference state is not valid JSON; resetting state file"
                );
                empty_state_object()
            }
            Err(error) => return Err(error),
        };
        if !state.is_object() {
            tracing::warn!(
                path = %self.state_path.display(),
                "preference state has non-object root; resetting state file"
            );
        }

        let preferences = ensure_object(
            ensure_object(&mut state)
                .entry(PREFERENCES_FIELD.to_string())
                .or_insert_with(empty_state_object),
        );
        let record = ensure_object(
            preferences
                .entry(PREFERENCE_RECORD_ID.to_string())
                .or_insert_with(empty_state_object),
        );
        record.insert(
            THEME_SOURCE_FIELD.to_string(),
            Value::String(theme_source.as_str().to_string()),
        );

        let serialized = serde_json::to_string_pretty(&state).map_err(StorageError::Serialize)?;
        fs::write(&self.state_path, serialized).map_err(|source| StorageError::Write {
            path: self.state_path.clone(),
            source,
        })?;

        tracing::debug!(theme.source = %theme_source, "persisted theme source preference");
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    theme_source: Mutex<Option<ThemeSource>>,
}

impl MemoryPreferenceStore {
    pub fn with_theme_source(theme_source: ThemeSource) -> Self {
        Self {
            theme_source: Mutex::new(Some(theme_source)),
        }
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn read_theme_source(&self) -> Result<Option<ThemeSource>, StorageError> {
        Ok(*self
            .theme_source
            .lock()
            .unwrap_or_else(PoisonError::into_inner))
    }

    fn upsert_theme_source(&self, theme_source: ThemeSource) -> Result<(), StorageError> {
        *self
            .theme_source
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(theme_source);
        Ok(())
    }
}
