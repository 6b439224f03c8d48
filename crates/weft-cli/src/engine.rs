//! Engine assembly: wires the store, cache, strategies, bus and
//! orchestrator together with explicit dependency injection.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::adapters::{FsContentReader, LoggingSubscriber, TokenOverlapScorer};
use crate::config::Config;
use crate::error::{CliError, Result};
use weft_detect::{
    DetectConfig, DetectionContext, ImportStrategy, Orchestrator, ReferenceStrategy,
    SimilarityStrategy, StrategyRegistry, StructuralStrategy,
};
use weft_domain::EventKind;
use weft_events::EventBus;
use weft_store::{CacheConfig, CachedStore, SqliteStore};

/// The CLI's store type: SQLite behind the invalidating read cache
pub type Store = CachedStore<SqliteStore>;

/// A fully wired engine instance
pub struct Engine {
    store: Arc<Mutex<Store>>,
    bus: Arc<EventBus>,
    orchestrator: Orchestrator<Store>,
}

impl Engine {
    /// Open the database and wire every component together.
    pub fn open(config: &Config, db_override: Option<&Path>) -> Result<Self> {
        let db_path = config.resolve_db_path(db_override)?;
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let store = CachedStore::new(
            SqliteStore::new(&db_path)?,
            CacheConfig {
                capacity: config.settings.cache_capacity,
                ttl: Duration::from_secs(config.settings.cache_ttl_secs),
            },
        );
        let store = Arc::new(Mutex::new(store));

        let bus = Arc::new(EventBus::new());
        bus.subscribe(EventKind::Any, Arc::new(LoggingSubscriber));

        let detect_config = DetectConfig {
            similarity_threshold: config.detect.similarity_threshold,
            min_stem_length: config.detect.min_stem_length,
            ..Default::default()
        };

        let mut registry = StrategyRegistry::new();
        registry.register(Arc::new(ImportStrategy::new(&detect_config)?))?;
        registry.register(Arc::new(ReferenceStrategy::new(&detect_config)))?;
        registry.register(Arc::new(StructuralStrategy::new()))?;
        registry.register(Arc::new(SimilarityStrategy::new(&detect_config)))?;

        let context = DetectionContext::new(
            Arc::new(FsContentReader),
            Some(Arc::new(TokenOverlapScorer::new())),
        );

        let orchestrator = Orchestrator::new(
            Arc::new(registry),
            Arc::clone(&store),
            Arc::clone(&bus),
            context,
        );

        Ok(Self {
            store,
            bus,
            orchestrator,
        })
    }

    /// The detection orchestrator
    pub fn orchestrator(&self) -> &Orchestrator<Store> {
        &self.orchestrator
    }

    /// The event bus, for registering additional subscribers
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Lock the store for direct queries.
    ///
    /// The lock is only poisoned if another thread panicked while
    /// holding it, which leaves the cache in an unknown state - nothing
    /// a caller could recover from, so this panics with a clear message.
    pub fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().expect("store lock poisoned")
    }

    /// Validate that a path exists on disk, mapping to the CLI's
    /// file-not-found exit code.
    pub fn require_exists(path: &Path) -> Result<()> {
        if path.exists() {
            Ok(())
        } else {
            Err(CliError::FileNotFound(path.display().to_string()))
        }
    }
}
