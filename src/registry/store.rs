//! JSON file persistence for the channel number registry
//!
//! The file is a single JSON object mapping stream path to a positive
//! integer. A missing file is an empty registry; a file that cannot be read
//! or parsed is also treated as empty (with a warning) so a damaged map never
//! stops a run.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::ChannelNumberRegistry;
use crate::errors::{RegistryError, RegistryResult};

#[derive(Debug, Clone)]
pub struct RegistryStore {
    path: PathBuf,
}

impl RegistryStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the registry, falling back to an empty one on any failure
    pub async fn load(&self) -> ChannelNumberRegistry {
        match self.read_entries().await {
            Ok(Some(entries)) => {
                info!("Loaded {} channel numbers from {:?}", entries.len(), self.path);
                ChannelNumberRegistry::from_entries(entries)
            }
            Ok(None) => {
                info!("No channel map at {:?}, starting empty", self.path);
                ChannelNumberRegistry::new()
            }
            Err(e) => {
                warn!("Error loading channel map, starting empty: {}", e);
                ChannelNumberRegistry::new()
            }
        }
    }

    /// Read the persisted mapping; `Ok(None)` when no file exists
    pub async fn read_entries(&self) -> RegistryResult<Option<BTreeMap<String, u64>>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(RegistryError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let entries: BTreeMap<String, u64> =
            serde_json::from_str(&contents).map_err(|e| RegistryError::Malformed {
                path: self.path.clone(),
                message: e.to_string(),
            })?;

        if let Some((stream_path, _)) = entries.iter().find(|(_, number)| **number == 0) {
            return Err(RegistryError::Malformed {
                path: self.path.clone(),
                message: format!("channel number for '{stream_path}' must be positive"),
            });
        }

        Ok(Some(entries))
    }

    /// Write the full mapping atomically (temp file then rename)
    pub async fn save(&self, registry: &ChannelNumberRegistry) -> RegistryResult<()> {
        let contents = serde_json::to_string_pretty(registry.entries())?;

        let write_error = |source| RegistryError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(write_error)?;
        }

        let mut temp_name = self.path.as_os_str().to_owned();
        temp_name.push(".tmp");
        let temp_path = PathBuf::from(temp_name);

        tokio::fs::write(&temp_path, contents).await.map_err(write_error)?;
        tokio::fs::rename(&temp_path, &self.path).await.map_err(write_error)?;

        debug!("Wrote {} channel numbers to {:?}", registry.len(), self.path);
        Ok(())
    }

    /// Persist only when this run assigned new numbers; returns whether it wrote
    pub async fn save_if_changed(&self, registry: &ChannelNumberRegistry) -> RegistryResult<bool> {
        if !registry.has_changes() {
            info!("Channel map unchanged - no new assignments");
            return Ok(false);
        }
        self.save(registry).await?;
        info!(
            "Channel map updated: {:?} ({} new)",
            self.path,
            registry.new_assignments()
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> RegistryStore {
        RegistryStore::new(dir.path().join("channel_map.json"))
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.read_entries().await.unwrap().is_none());
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_empty_and_numbers_from_one() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        tokio::fs::write(store.path(), "{ \"a\": 1, ").await.unwrap();

        assert!(matches!(
            store.read_entries().await,
            Err(RegistryError::Malformed { .. })
        ));
        let mut registry = store.load().await;
        assert!(registry.is_empty());
        assert_eq!(registry.allocate_or_get("new").unwrap().number, 1);
    }

    #[tokio::test]
    async fn test_rejects_non_positive_and_non_integer_values() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        for body in [r#"{"a": 0}"#, r#"{"a": -3}"#, r#"{"a": "one"}"#, r#"[1, 2]"#, r#"{"a": 1.5}"#] {
            tokio::fs::write(store.path(), body).await.unwrap();
            assert!(
                matches!(store.read_entries().await, Err(RegistryError::Malformed { .. })),
                "expected {body} to be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_numbers_beyond_32_bits_are_kept() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        tokio::fs::write(store.path(), r#"{"a": 1, "big": 5000000000}"#)
            .await
            .unwrap();

        let mut registry = store.load().await;
        assert_eq!(registry.get("a"), Some(1));
        assert_eq!(registry.get("big"), Some(5_000_000_000));
        assert_eq!(registry.allocate_or_get("new").unwrap().number, 5_000_000_001);

        store.save(&registry).await.unwrap();
        let reloaded = store.read_entries().await.unwrap().unwrap();
        assert_eq!(reloaded.get("a"), Some(&1));
        assert_eq!(reloaded.get("big"), Some(&5_000_000_000));
    }

    #[tokio::test]
    async fn test_save_round_trip_and_no_temp_file_left() {
        let dir = TempDir::new().unwrap();
        let store = RegistryStore::new(dir.path().join("nested").join("channel_map.json"));

        let mut registry = ChannelNumberRegistry::new();
        registry.allocate_or_get("a").unwrap();
        registry.allocate_or_get("Ñews/ünïcode").unwrap();
        store.save(&registry).await.unwrap();

        let reloaded = store.load().await;
        assert_eq!(reloaded.entries(), registry.entries());
        assert!(!reloaded.has_changes());

        let raw = tokio::fs::read_to_string(store.path()).await.unwrap();
        assert!(raw.contains("Ñews/ünïcode"));
        assert!(!dir.path().join("nested").join("channel_map.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_save_if_changed_skips_unchanged_registry() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let registry = ChannelNumberRegistry::new();
        assert!(!store.save_if_changed(&registry).await.unwrap());
        assert!(!store.path().exists());

        let mut registry = store.load().await;
        registry.allocate_or_get("a").unwrap();
        assert!(store.save_if_changed(&registry).await.unwrap());
        assert!(store.path().exists());
    }
}
