//! On-device key-value persistence for the GymKit client.
//!
//! Stores opaque strings (and JSON-serializable values via
//! [`KeyValueStoreExt`]) under named keys. Every operation is asynchronous
//! and infallible at the API surface: underlying storage failures are
//! logged and degrade to "absent" on reads and no-op on writes. Losing a
//! write means the user re-authenticates on the next launch, which is not
//! worth surfacing as an error to every call site.
//!
//! No transactional guarantees across keys.

pub mod file;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use file::FileStore;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

/// Asynchronous string key-value storage.
///
/// Object-safe so it can be injected as `Arc<dyn BaseKeyValueStore>`.
/// JSON convenience methods live on [`KeyValueStoreExt`].
#[async_trait]
pub trait BaseKeyValueStore: Send + Sync {
    /// Store a string value under `key`, replacing any previous value.
    async fn set_string(&self, key: &str, value: &str);

    /// Fetch the value for `key`, or `None` if absent or unreadable.
    async fn get_string(&self, key: &str) -> Option<String>;

    /// Remove the entry for `key`. Removing a missing key is a no-op.
    async fn remove(&self, key: &str);

    /// Remove every entry in the store.
    async fn clear_all(&self);
}

/// JSON helpers over any [`BaseKeyValueStore`], including trait objects.
#[async_trait]
pub trait KeyValueStoreExt: BaseKeyValueStore {
    /// Serialize `value` as JSON and store it under `key`.
    async fn set_json<T: Serialize + Sync>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(encoded) => self.set_string(key, &encoded).await,
            Err(e) => warn!(key, error = %e, "failed to encode value, skipping write"),
        }
    }

    /// Fetch and decode the JSON value under `key`.
    ///
    /// Returns `None` when the key is absent or the stored payload does not
    /// decode as `T` (a corrupt entry reads as absent).
    async fn get_json<T: DeserializeOwned + Send>(&self, key: &str) -> Option<T> {
        let raw = self.get_string(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "stored value did not decode, treating as absent");
                None
            }
        }
    }
}

impl<S: BaseKeyValueStore + ?Sized> KeyValueStoreExt for S {}
