use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::segment::{Segment, SegmentRecord};
use crate::store::{SegmentStore, StoreError};

/// Pretty-printed JSON array of segments on disk. A missing file loads as
/// "nothing saved yet". Preferences live next to it in `<stem>.settings.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings_path(&self) -> PathBuf {
        self.path.with_extension("settings.json")
    }

    fn read(path: &Path) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(path) {
            Ok(txt) if txt.trim().is_empty() => Ok(None),
            Ok(txt) => Ok(Some(txt)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    fn write(path: &Path, json: String) -> Result<(), StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, json).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Settings {
    #[serde(default)]
    auto_remove: Option<bool>,
}

impl SegmentStore for JsonFileStore {
    fn load(&self) -> Result<Option<Vec<SegmentRecord>>, StoreError> {
        let Some(txt) = Self::read(&self.path)? else {
            return Ok(None);
        };
        serde_json::from_str(&txt)
            .map(Some)
            .map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })
    }

    fn save(&mut self, segments: &[Segment]) -> Result<(), StoreError> {
        Self::write(&self.path, serde_json::to_string_pretty(segments)?)
    }

    fn load_auto_remove(&self) -> Result<Option<bool>, StoreError> {
        let path = self.settings_path();
        let Some(txt) = Self::read(&path)? else {
            return Ok(None);
        };
        serde_json::from_str::<Settings>(&txt)
            .map(|s| s.auto_remove)
            .map_err(|source| StoreError::Parse { path, source })
    }

    fn save_auto_remove(&mut self, enabled: bool) -> Result<(), StoreError> {
        let settings = Settings {
            auto_remove: Some(enabled),
        };
        Self::write(&self.settings_path(), serde_json::to_string_pretty(&settings)?)
    }
}
