//! ProfileCacheManager - get-or-compute live profiles and surgical invalidation.
//!
//! ## Read path
//!
//! 1. `GET <entityType>:<id>:profile`
//! 2. Hit → return with `from_cache = true`
//! 3. Miss (or unreadable entry, or store failure) → load from the canonical
//!    store, write back with the profile TTL, return with `from_cache = false`
//!
//! ## Invalidation
//!
//! Deletes every key under `<entityType>:<id>:*` and returns once the store
//! acknowledges. Failures are logged and reported, never raised: the entry
//! then lives until its TTL runs out.
//!
//! A read whose load overlapped an invalidation of the same entity never
//! leaves its value behind: each entity maps to an epoch stripe that
//! `invalidate` bumps before deleting, and the write-back is skipped (or
//! undone) when the stripe moved while the read was in flight.
//!
//! Every store and loader call is bounded by `call_timeout`.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value as JsonValue;
use tokio::time::timeout;

use crate::domain::foundation::{EntityId, EntityType};
use crate::domain::live::{
    escape_glob, CacheKey, InvalidationPattern, LiveError, Profile, ProfileLookup,
};
use crate::ports::{CacheStore, ProfileLoader};

/// Configuration for the profile cache.
#[derive(Debug, Clone)]
pub struct ProfileCacheConfig {
    /// Lifetime of a written-back profile.
    pub profile_ttl: Duration,

    /// Upper bound on any single cache or loader call.
    pub call_timeout: Duration,
}

impl Default for ProfileCacheConfig {
    fn default() -> Self {
        Self {
            profile_ttl: Duration::from_secs(60),
            call_timeout: Duration::from_secs(2),
        }
    }
}

impl ProfileCacheConfig {
    pub fn with_profile_ttl(mut self, ttl: Duration) -> Self {
        self.profile_ttl = ttl;
        self
    }

    pub fn with_call_timeout(mut self, bound: Duration) -> Self {
        self.call_timeout = bound;
        self
    }
}

/// What an invalidation achieved.
#[derive(Debug, Clone)]
pub enum InvalidationOutcome {
    /// Store acknowledged the delete.
    Removed {
        pattern: InvalidationPattern,
        keys: u64,
    },
    /// Store did not acknowledge; entries expire on their own.
    Failed(LiveError),
}

impl InvalidationOutcome {
    pub fn is_acknowledged(&self) -> bool {
        matches!(self, InvalidationOutcome::Removed { .. })
    }

    /// Keys removed, zero when the delete failed.
    pub fn keys_removed(&self) -> u64 {
        match self {
            InvalidationOutcome::Removed { keys, .. } => *keys,
            InvalidationOutcome::Failed(_) => 0,
        }
    }
}

/// Number of invalidation epoch stripes. Entities sharing a stripe only
/// cost each other a skipped write-back.
const EPOCH_STRIPES: usize = 64;

/// Get-or-compute cache of live entity profiles.
pub struct ProfileCacheManager {
    store: Arc<dyn CacheStore>,
    loader: Arc<dyn ProfileLoader>,
    config: ProfileCacheConfig,
    epochs: Vec<AtomicU64>,
}

impl ProfileCacheManager {
    pub fn new(store: Arc<dyn CacheStore>, loader: Arc<dyn ProfileLoader>) -> Self {
        Self::with_config(store, loader, ProfileCacheConfig::default())
    }

    pub fn with_config(
        store: Arc<dyn CacheStore>,
        loader: Arc<dyn ProfileLoader>,
        config: ProfileCacheConfig,
    ) -> Self {
        Self {
            store,
            loader,
            config,
            epochs: (0..EPOCH_STRIPES).map(|_| AtomicU64::new(0)).collect(),
        }
    }

    pub fn config(&self) -> &ProfileCacheConfig {
        &self.config
    }

    /// Read a profile, consulting the cache first.
    ///
    /// # Errors
    ///
    /// `LiveError::ProfileUnavailable` when the cache missed and the loader
    /// failed or timed out.
    pub async fn get_profile(
        &self,
        entity_type: EntityType,
        entity_id: &EntityId,
    ) -> Result<ProfileLookup, LiveError> {
        let key = CacheKey::profile(entity_type, entity_id);

        if let Some(profile) = self.read_cached(&key).await {
            tracing::trace!(key = %key, "Profile cache hit");
            return Ok(ProfileLookup {
                profile,
                from_cache: true,
            });
        }

        let epoch = self.epoch_of(entity_type, entity_id);
        let started_at = epoch.load(Ordering::Acquire);

        let unavailable = |reason: String| LiveError::ProfileUnavailable {
            entity_type,
            entity_id: entity_id.clone(),
            reason,
        };

        let data = match timeout(self.config.call_timeout, self.loader.load(entity_type, entity_id)).await {
            Ok(Ok(data)) => data,
            Ok(Err(e)) => return Err(unavailable(e.to_string())),
            Err(_) => {
                return Err(unavailable(format!(
                    "loader timed out after {}ms",
                    self.config.call_timeout.as_millis()
                )))
            }
        };

        let profile = Profile::new(entity_type, entity_id.clone(), data);
        self.write_back(&key, &profile, epoch, started_at).await;

        Ok(ProfileLookup {
            profile,
            from_cache: false,
        })
    }

    /// Read a profile's data, or return `fallback` if it cannot be produced.
    ///
    /// The failure is logged; callers only see the degraded value.
    pub async fn get_profile_or_else(
        &self,
        entity_type: EntityType,
        entity_id: &EntityId,
        fallback: Option<JsonValue>,
    ) -> Option<JsonValue> {
        match self.get_profile(entity_type, entity_id).await {
            Ok(lookup) => Some(lookup.profile.data),
            Err(e) => {
                tracing::warn!(
                    kind = e.kind(),
                    error = %e,
                    has_fallback = fallback.is_some(),
                    "Profile unavailable, using fallback"
                );
                fallback
            }
        }
    }

    /// Drop every cached facet of an entity.
    pub async fn invalidate(&self, entity_type: EntityType, entity_id: &EntityId) -> InvalidationOutcome {
        let pattern = InvalidationPattern::for_entity(entity_type, entity_id);
        // Bumped before the delete so in-flight reads see it.
        self.epoch_of(entity_type, entity_id).fetch_add(1, Ordering::AcqRel);

        let failure = match timeout(self.config.call_timeout, self.store.delete_pattern(pattern.as_str())).await {
            Ok(Ok(keys)) => {
                tracing::debug!(pattern = %pattern, keys, "Invalidated profile cache");
                return InvalidationOutcome::Removed { pattern, keys };
            }
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!("delete timed out after {}ms", self.config.call_timeout.as_millis()),
        };

        let error = LiveError::InvalidationFailed {
            pattern: pattern.to_string(),
            reason: failure,
        };
        tracing::warn!(kind = error.kind(), error = %error, "Cache invalidation failed");
        InvalidationOutcome::Failed(error)
    }

    async fn read_cached(&self, key: &CacheKey) -> Option<Profile> {
        let bytes = match timeout(self.config.call_timeout, self.store.get(key.as_str())).await {
            Ok(Ok(Some(bytes))) => bytes,
            Ok(Ok(None)) => return None,
            Ok(Err(e)) => {
                tracing::warn!(key = %key, error = %e, "Cache read failed, treating as miss");
                return None;
            }
            Err(_) => {
                tracing::warn!(key = %key, "Cache read timed out, treating as miss");
                return None;
            }
        };

        match Profile::from_bytes(&bytes) {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Unreadable cache entry, treating as miss");
                None
            }
        }
    }

    fn epoch_of(&self, entity_type: EntityType, entity_id: &EntityId) -> &AtomicU64 {
        let mut hasher = DefaultHasher::new();
        entity_type.hash(&mut hasher);
        entity_id.hash(&mut hasher);
        &self.epochs[(hasher.finish() as usize) % self.epochs.len()]
    }

    async fn write_back(&self, key: &CacheKey, profile: &Profile, epoch: &AtomicU64, started_at: u64) {
        if epoch.load(Ordering::Acquire) != started_at {
            tracing::debug!(key = %key, "Invalidated during load, skipping write-back");
            return;
        }

        let bytes = match profile.to_bytes() {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Profile not serializable, skipping write-back");
                return;
            }
        };

        match timeout(
            self.config.call_timeout,
            self.store.set(key.as_str(), bytes, self.config.profile_ttl),
        )
        .await
        {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(key = %key, error = %e, "Profile write-back failed"),
            Err(_) => tracing::warn!(key = %key, "Profile write-back timed out"),
        }

        // An invalidation that raced the set may have deleted before it landed.
        if epoch.load(Ordering::Acquire) != started_at {
            let pattern = InvalidationPattern::from_raw(escape_glob(key.as_str()));
            match timeout(self.config.call_timeout, self.store.delete_pattern(pattern.as_str())).await {
                Ok(Ok(_)) => tracing::debug!(key = %key, "Withdrew write-back raced by invalidation"),
                Ok(Err(e)) => tracing::warn!(key = %key, error = %e, "Failed to withdraw raced write-back"),
                Err(_) => tracing::warn!(key = %key, "Withdrawing raced write-back timed out"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cache::InMemoryCacheStore;
    use crate::domain::foundation::{DomainError, ErrorCode};
    use crate::ports::CacheStoreError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    // ════════════════════════════════════════════════════════════════════════
    // Mock Implementations
    // ════════════════════════════════════════════════════════════════════════

    struct CountingLoader {
        calls: AtomicUsize,
        status: std::sync::Mutex<&'static str>,
    }

    impl CountingLoader {
        fn new(status: &'static str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                status: std::sync::Mutex::new(status),
            }
        }

        fn set_status(&self, status: &'static str) {
            *self.status.lock().unwrap() = status;
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ProfileLoader for CountingLoader {
        async fn load(&self, _: EntityType, entity_id: &EntityId) -> Result<JsonValue, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!({ "id": entity_id.as_str(), "status": *self.status.lock().unwrap() }))
        }
    }

    struct FailingLoader;

    #[async_trait]
    impl ProfileLoader for FailingLoader {
        async fn load(&self, _: EntityType, _: &EntityId) -> Result<JsonValue, DomainError> {
            Err(DomainError::new(ErrorCode::EntityNotFound, "seller missing"))
        }
    }

    struct SlowLoader;

    #[async_trait]
    impl ProfileLoader for SlowLoader {
        async fn load(&self, _: EntityType, _: &EntityId) -> Result<JsonValue, DomainError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(json!({}))
        }
    }

    /// Loader whose first call reads the current status and then parks
    /// until released.
    struct ParkedLoader {
        calls: AtomicUsize,
        status: std::sync::Mutex<&'static str>,
        entered: Notify,
        release: Notify,
    }

    impl ParkedLoader {
        fn new(status: &'static str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                status: std::sync::Mutex::new(status),
                entered: Notify::new(),
                release: Notify::new(),
            }
        }
    }

    #[async_trait]
    impl ProfileLoader for ParkedLoader {
        async fn load(&self, _: EntityType, entity_id: &EntityId) -> Result<JsonValue, DomainError> {
            let data = json!({ "id": entity_id.as_str(), "status": *self.status.lock().unwrap() });
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                self.entered.notify_one();
                self.release.notified().await;
            }
            Ok(data)
        }
    }

    /// Store whose first `set` parks until released, then lands.
    struct ParkedSetStore {
        inner: InMemoryCacheStore,
        sets: AtomicUsize,
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl CacheStore for ParkedSetStore {
        async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheStoreError> {
            self.inner.get(key).await
        }
        async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheStoreError> {
            if self.sets.fetch_add(1, Ordering::SeqCst) == 0 {
                self.entered.notify_one();
                self.release.notified().await;
            }
            self.inner.set(key, value, ttl).await
        }
        async fn delete_pattern(&self, pattern: &str) -> Result<u64, CacheStoreError> {
            self.inner.delete_pattern(pattern).await
        }
        async fn ping(&self) -> Result<(), CacheStoreError> {
            Ok(())
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl CacheStore for BrokenStore {
        async fn get(&self, _: &str) -> Result<Option<Vec<u8>>, CacheStoreError> {
            Err(CacheStoreError::Unavailable("down".to_string()))
        }
        async fn set(&self, _: &str, _: Vec<u8>, _: Duration) -> Result<(), CacheStoreError> {
            Err(CacheStoreError::Unavailable("down".to_string()))
        }
        async fn delete_pattern(&self, _: &str) -> Result<u64, CacheStoreError> {
            Err(CacheStoreError::Unavailable("down".to_string()))
        }
        async fn ping(&self) -> Result<(), CacheStoreError> {
            Err(CacheStoreError::Unavailable("down".to_string()))
        }
    }

    fn seller(id: &str) -> EntityId {
        EntityId::new(id).unwrap()
    }

    fn manager_with(loader: Arc<dyn ProfileLoader>) -> (ProfileCacheManager, InMemoryCacheStore) {
        let store = InMemoryCacheStore::new();
        let manager = ProfileCacheManager::new(Arc::new(store.clone()), loader);
        (manager, store)
    }

    // ════════════════════════════════════════════════════════════════════════
    // Tests
    // ════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn miss_loads_and_writes_back() {
        let loader = Arc::new(CountingLoader::new("pending"));
        let (manager, store) = manager_with(loader.clone());

        let first = manager.get_profile(EntityType::Seller, &seller("s1")).await.unwrap();
        let second = manager.get_profile(EntityType::Seller, &seller("s1")).await.unwrap();

        assert!(!first.from_cache);
        assert!(second.from_cache);
        assert_eq!(first.profile, second.profile);
        assert_eq!(loader.calls(), 1);
        assert!(store.contains_key("seller:s1:profile").await);
    }

    #[tokio::test]
    async fn invalidate_forces_next_read_to_miss() {
        let loader = Arc::new(CountingLoader::new("pending"));
        let (manager, _store) = manager_with(loader.clone());
        manager.get_profile(EntityType::Seller, &seller("s1")).await.unwrap();

        loader.set_status("active");
        let outcome = manager.invalidate(EntityType::Seller, &seller("s1")).await;
        let lookup = manager.get_profile(EntityType::Seller, &seller("s1")).await.unwrap();

        assert!(outcome.is_acknowledged());
        assert_eq!(outcome.keys_removed(), 1);
        assert!(!lookup.from_cache);
        assert_eq!(lookup.profile.data["status"], "active");
    }

    #[tokio::test]
    async fn load_overlapping_invalidation_is_not_written_back() {
        let loader = Arc::new(ParkedLoader::new("pending"));
        let (manager, store) = manager_with(loader.clone());
        let manager = Arc::new(manager);

        let in_flight = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.get_profile(EntityType::Seller, &seller("s1")).await })
        };
        loader.entered.notified().await;

        *loader.status.lock().unwrap() = "active";
        let outcome = manager.invalidate(EntityType::Seller, &seller("s1")).await;
        loader.release.notify_one();
        let stale = in_flight.await.unwrap().unwrap();

        assert!(outcome.is_acknowledged());
        assert_eq!(stale.profile.data["status"], "pending");
        assert!(!store.contains_key("seller:s1:profile").await);

        let lookup = manager.get_profile(EntityType::Seller, &seller("s1")).await.unwrap();
        assert!(!lookup.from_cache);
        assert_eq!(lookup.profile.data["status"], "active");
    }

    #[tokio::test]
    async fn write_back_landing_after_invalidation_is_withdrawn() {
        let loader = Arc::new(CountingLoader::new("pending"));
        let store = Arc::new(ParkedSetStore {
            inner: InMemoryCacheStore::new(),
            sets: AtomicUsize::new(0),
            entered: Notify::new(),
            release: Notify::new(),
        });
        let manager = Arc::new(ProfileCacheManager::new(store.clone(), loader.clone()));

        let in_flight = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.get_profile(EntityType::Seller, &seller("s1")).await })
        };
        store.entered.notified().await;

        loader.set_status("active");
        manager.invalidate(EntityType::Seller, &seller("s1")).await;
        store.release.notify_one();
        in_flight.await.unwrap().unwrap();

        assert!(!store.inner.contains_key("seller:s1:profile").await);
        let lookup = manager.get_profile(EntityType::Seller, &seller("s1")).await.unwrap();
        assert!(!lookup.from_cache);
        assert_eq!(lookup.profile.data["status"], "active");
    }

    #[tokio::test]
    async fn earlier_invalidation_does_not_block_write_back() {
        let loader = Arc::new(CountingLoader::new("pending"));
        let (manager, store) = manager_with(loader);

        manager.invalidate(EntityType::Customer, &seller("c1")).await;
        manager.get_profile(EntityType::Seller, &seller("s1")).await.unwrap();

        assert!(store.contains_key("seller:s1:profile").await);
    }

    #[tokio::test]
    async fn double_invalidate_matches_single() {
        let loader = Arc::new(CountingLoader::new("pending"));
        let (manager, store) = manager_with(loader);
        manager.get_profile(EntityType::Seller, &seller("s1")).await.unwrap();
        manager.get_profile(EntityType::Seller, &seller("s2")).await.unwrap();

        let first = manager.invalidate(EntityType::Seller, &seller("s1")).await;
        let second = manager.invalidate(EntityType::Seller, &seller("s1")).await;

        assert_eq!(first.keys_removed(), 1);
        assert!(second.is_acknowledged());
        assert_eq!(second.keys_removed(), 0);
        assert!(store.contains_key("seller:s2:profile").await);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn invalidate_does_not_touch_ids_sharing_a_prefix() {
        let loader = Arc::new(CountingLoader::new("pending"));
        let (manager, store) = manager_with(loader);
        manager.get_profile(EntityType::Seller, &seller("1")).await.unwrap();
        manager.get_profile(EntityType::Seller, &seller("12")).await.unwrap();

        manager.invalidate(EntityType::Seller, &seller("1")).await;

        assert!(store.contains_key("seller:12:profile").await);
    }

    #[tokio::test]
    async fn loader_failure_is_profile_unavailable() {
        let (manager, _store) = manager_with(Arc::new(FailingLoader));

        let err = manager
            .get_profile(EntityType::Seller, &seller("s1"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "profile_unavailable");
        assert!(err.to_string().contains("seller missing"));
    }

    #[tokio::test(start_paused = true)]
    async fn loader_timeout_is_profile_unavailable() {
        let (manager, _store) = manager_with(Arc::new(SlowLoader));

        let err = manager
            .get_profile(EntityType::Order, &seller("o1"))
            .await
            .unwrap_err();

        assert!(matches!(err, LiveError::ProfileUnavailable { .. }));
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn broken_store_degrades_to_loader() {
        let loader = Arc::new(CountingLoader::new("active"));
        let manager = ProfileCacheManager::new(Arc::new(BrokenStore), loader.clone());

        let lookup = manager.get_profile(EntityType::Customer, &seller("c1")).await.unwrap();

        assert!(!lookup.from_cache);
        assert_eq!(loader.calls(), 1);
    }

    #[tokio::test]
    async fn broken_store_invalidation_is_reported_not_raised() {
        let manager = ProfileCacheManager::new(Arc::new(BrokenStore), Arc::new(FailingLoader));

        let outcome = manager.invalidate(EntityType::Seller, &seller("s1")).await;

        match outcome {
            InvalidationOutcome::Failed(err) => assert_eq!(err.kind(), "invalidation_failed"),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn unreadable_entry_is_treated_as_miss() {
        let loader = Arc::new(CountingLoader::new("active"));
        let (manager, store) = manager_with(loader.clone());
        store
            .set("seller:s1:profile", b"not json".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();

        let lookup = manager.get_profile(EntityType::Seller, &seller("s1")).await.unwrap();

        assert!(!lookup.from_cache);
        assert_eq!(loader.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn entry_expires_after_profile_ttl() {
        let loader = Arc::new(CountingLoader::new("active"));
        let store = InMemoryCacheStore::new();
        let manager = ProfileCacheManager::with_config(
            Arc::new(store),
            loader.clone(),
            ProfileCacheConfig::default().with_profile_ttl(Duration::from_secs(5)),
        );

        manager.get_profile(EntityType::Seller, &seller("s1")).await.unwrap();
        tokio::time::advance(Duration::from_secs(6)).await;
        let lookup = manager.get_profile(EntityType::Seller, &seller("s1")).await.unwrap();

        assert!(!lookup.from_cache);
        assert_eq!(loader.calls(), 2);
    }

    #[tokio::test]
    async fn get_profile_or_else_falls_back() {
        let (manager, _store) = manager_with(Arc::new(FailingLoader));

        let with_hint = manager
            .get_profile_or_else(EntityType::Seller, &seller("s1"), Some(json!({"status": "active"})))
            .await;
        let without_hint = manager
            .get_profile_or_else(EntityType::Seller, &seller("s1"), None)
            .await;

        assert_eq!(with_hint, Some(json!({"status": "active"})));
        assert_eq!(without_hint, None);
    }
}
