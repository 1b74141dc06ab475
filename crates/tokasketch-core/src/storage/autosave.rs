//! Periodic persistence of the working document.
//!
//! The manager saves under a fixed key so a restarted session can pick up
//! where it left off. A save happens only when the store's revision has
//! moved past what was last written and the interval has elapsed; save
//! failures are logged and retried on the next cycle.

use super::{Storage, StorageError, StorageResult};
use crate::store::{ExportDocument, ShapeStore};
use log::{info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Fixed key the working document is saved under.
pub const AUTOSAVE_KEY: &str = "__autosave__";

/// How often the working document is written at most.
pub const AUTOSAVE_INTERVAL: Duration = Duration::from_secs(3);

/// Drives periodic saves of a [`ShapeStore`] document.
pub struct AutoSaveManager<S: Storage> {
    storage: Arc<S>,
    interval: Duration,
    last_save: Option<Instant>,
    /// Store revision captured at the last successful save.
    saved_revision: Option<u64>,
}

impl<S: Storage> AutoSaveManager<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            interval: AUTOSAVE_INTERVAL,
            last_save: None,
            saved_revision: None,
        }
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    fn interval_elapsed(&self, now: Instant) -> bool {
        self.last_save
            .map_or(true, |last| now.duration_since(last) >= self.interval)
    }

    /// True when the store has changed since the last save and the
    /// interval has elapsed.
    pub fn should_save(&self, store: &ShapeStore, now: Instant) -> bool {
        self.saved_revision != Some(store.revision()) && self.interval_elapsed(now)
    }

    /// Save if needed. Returns true when a save was written. Failures are
    /// logged; the revision stays unsaved so the next cycle retries.
    pub async fn maybe_save(&mut self, store: &ShapeStore, now: Instant) -> bool {
        if !self.should_save(store, now) {
            return false;
        }
        let revision = store.revision();
        match self.save(&store.export()).await {
            Ok(()) => {
                self.saved_revision = Some(revision);
                self.last_save = Some(now);
                true
            }
            Err(e) => {
                warn!("autosave failed: {e}");
                self.last_save = Some(now);
                false
            }
        }
    }

    /// Write the document under the autosave key immediately.
    pub async fn save(&mut self, document: &ExportDocument) -> StorageResult<()> {
        self.storage.save(AUTOSAVE_KEY, document).await
    }

    /// Restore the autosaved document into a store, if one exists.
    /// A missing document is normal; other load failures are logged.
    pub async fn restore(&mut self, store: &mut ShapeStore) -> bool {
        match self.storage.load(AUTOSAVE_KEY).await {
            Ok(document) => {
                store.import(&document);
                self.saved_revision = Some(store.revision());
                info!("restored autosaved document");
                true
            }
            Err(StorageError::NotFound(_)) => false,
            Err(e) => {
                warn!("autosave restore failed: {e}");
                false
            }
        }
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }
}

/// Autosave manager over the default file storage location.
pub fn create_autosave_manager() -> StorageResult<AutoSaveManager<super::FileStorage>> {
    Ok(AutoSaveManager::new(Arc::new(
        super::FileStorage::default_location()?,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;
    use crate::shapes::TokamakElement;
    use crate::storage::{block_on, MemoryStorage};
    use kurbo::Point;

    fn store_with_shape() -> ShapeStore {
        let mut store = ShapeStore::new();
        store.toggle_create(TokamakElement::Loop).unwrap();
        store.pointer_moved(Point::new(5.0, 5.0), Modifiers::default());
        store.canvas_click(Point::new(5.0, 5.0));
        let mut now = Instant::now();
        store.tick(now);
        now += Duration::from_millis(600);
        store.tick(now);
        store
    }

    #[test]
    fn test_saves_only_changed_revisions() {
        let storage = Arc::new(MemoryStorage::new());
        let mut manager = AutoSaveManager::new(storage.clone());
        let store = store_with_shape();
        let mut now = Instant::now();

        assert!(block_on(manager.maybe_save(&store, now)));
        assert!(block_on(storage.exists(AUTOSAVE_KEY)).unwrap());

        // unchanged revision: nothing to save even after the interval
        now += AUTOSAVE_INTERVAL;
        assert!(!block_on(manager.maybe_save(&store, now)));
    }

    #[test]
    fn test_respects_interval() {
        let storage = Arc::new(MemoryStorage::new());
        let mut manager = AutoSaveManager::new(storage);
        let mut store = store_with_shape();
        let mut now = Instant::now();

        assert!(block_on(manager.maybe_save(&store, now)));

        // new revision, but the interval has not elapsed yet
        store.set_plasma_shape({
            let mut p = store.plasma_shape.clone();
            p.show = true;
            p
        });
        now += Duration::from_millis(500);
        assert!(!block_on(manager.maybe_save(&store, now)));

        now += AUTOSAVE_INTERVAL;
        assert!(block_on(manager.maybe_save(&store, now)));
    }

    #[test]
    fn test_restore_roundtrip() {
        let storage = Arc::new(MemoryStorage::new());
        let mut manager = AutoSaveManager::new(storage.clone());
        let store = store_with_shape();
        assert!(block_on(manager.maybe_save(&store, Instant::now())));

        let mut manager2 = AutoSaveManager::new(storage);
        let mut restored = ShapeStore::new();
        assert!(block_on(manager2.restore(&mut restored)));
        assert_eq!(restored.shapes.len(), 1);
        assert_eq!(restored.shapes[0].element(), TokamakElement::Loop);
    }

    #[test]
    fn test_restore_without_saved_state() {
        let storage = Arc::new(MemoryStorage::new());
        let mut manager = AutoSaveManager::new(storage);
        let mut store = ShapeStore::new();
        assert!(!block_on(manager.restore(&mut store)));
    }

    struct BrokenStorage;

    impl Storage for BrokenStorage {
        fn save(
            &self,
            _key: &str,
            _document: &ExportDocument,
        ) -> crate::storage::BoxFuture<'_, StorageResult<()>> {
            Box::pin(async { Err(StorageError::Io("disk unavailable".into())) })
        }

        fn load(
            &self,
            _key: &str,
        ) -> crate::storage::BoxFuture<'_, StorageResult<ExportDocument>> {
            Box::pin(async { Err(StorageError::Io("disk unavailable".into())) })
        }

        fn delete(&self, _key: &str) -> crate::storage::BoxFuture<'_, StorageResult<()>> {
            Box::pin(async { Err(StorageError::Io("disk unavailable".into())) })
        }

        fn list(&self) -> crate::storage::BoxFuture<'_, StorageResult<Vec<String>>> {
            Box::pin(async { Err(StorageError::Io("disk unavailable".into())) })
        }

        fn exists(&self, _key: &str) -> crate::storage::BoxFuture<'_, StorageResult<bool>> {
            Box::pin(async { Err(StorageError::Io("disk unavailable".into())) })
        }
    }

    #[test]
    fn test_restore_survives_backend_failure() {
        let mut manager = AutoSaveManager::new(Arc::new(BrokenStorage));
        let mut store = store_with_shape();
        assert!(!block_on(manager.restore(&mut store)));
        // the store keeps its current document
        assert_eq!(store.shapes.len(), 1);
    }

    #[test]
    fn test_failed_save_retried_next_interval() {
        let mut manager = AutoSaveManager::new(Arc::new(BrokenStorage));
        let store = store_with_shape();
        let mut now = Instant::now();
        assert!(!block_on(manager.maybe_save(&store, now)));
        // the revision stays unsaved, so the next cycle tries again
        now += AUTOSAVE_INTERVAL;
        assert!(manager.should_save(&store, now));
    }
}
