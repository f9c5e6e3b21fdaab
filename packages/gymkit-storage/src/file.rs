//! File-backed store: one file per key under a caller-supplied directory.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::warn;

use crate::BaseKeyValueStore;

/// Key-value store persisted as individual files.
///
/// Keys are sanitized into file names, so distinct keys that sanitize to
/// the same name would collide; the fixed keys used by the client
/// (`auth_token`, `auth_user`) never do.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `root`. The directory is created lazily on
    /// the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(name)
    }
}

#[async_trait]
impl BaseKeyValueStore for FileStore {
    async fn set_string(&self, key: &str, value: &str) {
        if let Err(e) = fs::create_dir_all(&self.root).await {
            warn!(key, error = %e, "could not create storage directory, dropping write");
            return;
        }
        if let Err(e) = fs::write(self.path_for(key), value).await {
            warn!(key, error = %e, "could not persist value, dropping write");
        }
    }

    async fn get_string(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.path_for(key)).await {
            Ok(value) => Some(value),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                warn!(key, error = %e, "could not read value, treating as absent");
                None
            }
        }
    }

    async fn remove(&self, key: &str) {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(key, error = %e, "could not remove value"),
        }
    }

    async fn clear_all(&self) {
        match fs::remove_dir_all(&self.root).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(error = %e, "could not clear storage directory"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KeyValueStoreExt;
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    fn scratch_store() -> FileStore {
        let root = std::env::temp_dir().join(format!("gymkit-storage-test-{}", Uuid::new_v4()));
        FileStore::new(root)
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Fixture {
        name: String,
        visits: u32,
    }

    #[tokio::test]
    async fn set_get_remove_round_trip() {
        let store = scratch_store();

        assert_eq!(store.get_string("auth_token").await, None);

        store.set_string("auth_token", "tok1").await;
        assert_eq!(store.get_string("auth_token").await.as_deref(), Some("tok1"));

        store.set_string("auth_token", "tok2").await;
        assert_eq!(store.get_string("auth_token").await.as_deref(), Some("tok2"));

        store.remove("auth_token").await;
        assert_eq!(store.get_string("auth_token").await, None);

        store.clear_all().await;
    }

    #[tokio::test]
    async fn remove_missing_key_is_noop() {
        let store = scratch_store();
        store.remove("never_written").await;
        store.clear_all().await;
    }

    #[tokio::test]
    async fn clear_all_drops_every_entry() {
        let store = scratch_store();
        store.set_string("a", "1").await;
        store.set_string("b", "2").await;

        store.clear_all().await;

        assert_eq!(store.get_string("a").await, None);
        assert_eq!(store.get_string("b").await, None);
    }

    #[tokio::test]
    async fn json_round_trip() {
        let store = scratch_store();
        let fixture = Fixture {
            name: "Asha".to_string(),
            visits: 12,
        };

        store.set_json("profile", &fixture).await;
        let loaded: Option<Fixture> = store.get_json("profile").await;
        assert_eq!(loaded, Some(fixture));

        store.clear_all().await;
    }

    #[tokio::test]
    async fn corrupt_json_reads_as_absent() {
        let store = scratch_store();
        store.set_string("profile", "{not json").await;

        let loaded: Option<Fixture> = store.get_json("profile").await;
        assert_eq!(loaded, None);

        store.clear_all().await;
    }

    #[tokio::test]
    async fn keys_with_path_separators_are_sanitized() {
        let store = scratch_store();
        store.set_string("../escape", "value").await;
        assert_eq!(store.get_string("../escape").await.as_deref(), Some("value"));
        store.clear_all().await;
    }
}
