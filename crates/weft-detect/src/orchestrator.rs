//! Detection orchestrator
//!
//! Runs every eligible strategy over a batch of files, merges their
//! candidates, optionally persists the outcome and announces it on the
//! event bus. Strategy work happens on blocking worker threads; the
//! store is the single mutation point and is only touched from here.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::DetectOptions;
use crate::error::DetectionError;
use crate::strategy::{DetectionStrategy, StrategyRegistry};
use crate::types::{DetectionContext, DetectionMetadata, DetectionReport, StrategyFailure};
use weft_domain::metadata::merge_namespaced;
use weft_domain::relationship::RelationshipKey;
use weft_domain::{
    Direction, Metadata, Relationship, RelationshipEvent, RelationshipStore, RelationshipType,
};
use weft_events::EventBus;

/// Coordinates strategies, store and event bus for detection runs.
///
/// All collaborators are injected at construction; there is no ambient
/// global state. The store handle is shared behind a mutex because
/// SQLite connections are not thread-safe.
pub struct Orchestrator<S>
where
    S: RelationshipStore,
{
    registry: Arc<StrategyRegistry>,
    store: Arc<Mutex<S>>,
    bus: Arc<EventBus>,
    context: DetectionContext,
}

impl<S> Orchestrator<S>
where
    S: RelationshipStore + Send + 'static,
{
    /// Create a new orchestrator
    pub fn new(
        registry: Arc<StrategyRegistry>,
        store: Arc<Mutex<S>>,
        bus: Arc<EventBus>,
        context: DetectionContext,
    ) -> Self {
        Self {
            registry,
            store,
            bus,
            context,
        }
    }

    /// The store handle, for read paths that sit next to detection
    pub fn store(&self) -> Arc<Mutex<S>> {
        Arc::clone(&self.store)
    }

    /// Run detection over a batch of files.
    ///
    /// Every eligible strategy sees the whole batch (so per-strategy
    /// setup is paid once). A single strategy's failure is logged,
    /// reported and excluded from the merge - it never aborts the run.
    /// Store failures do abort the run. The caller may wrap this future
    /// in a timeout; the cancellation flag in `options` is checked
    /// between strategy invocations.
    pub async fn detect(
        &self,
        paths: &[String],
        options: &DetectOptions,
    ) -> Result<DetectionReport, DetectionError> {
        let start = SystemTime::now();

        let eligible: Vec<Arc<dyn DetectionStrategy>> = self
            .registry
            .iter()
            .filter(|s| options.wants(&s.relationship_type()))
            .cloned()
            .collect();

        info!(
            files = paths.len(),
            strategies = eligible.len(),
            apply = options.apply,
            "starting detection run"
        );

        let batch: Arc<Vec<String>> = Arc::new(paths.to_vec());
        let mut workers: Vec<(String, JoinHandle<Result<Vec<Relationship>, DetectionError>>)> =
            Vec::with_capacity(eligible.len());

        for strategy in &eligible {
            if options.cancel.is_cancelled() {
                return Err(DetectionError::Cancelled);
            }
            let key = strategy.key().to_string();
            let strategy = Arc::clone(strategy);
            let ctx = self.context.clone();
            let batch = Arc::clone(&batch);
            workers.push((
                key,
                tokio::task::spawn_blocking(move || strategy.detect(&ctx, &batch)),
            ));
        }

        let mut merged: BTreeMap<RelationshipKey, Relationship> = BTreeMap::new();
        let mut failures = Vec::new();

        for (key, worker) in workers {
            if options.cancel.is_cancelled() {
                return Err(DetectionError::Cancelled);
            }
            match worker.await {
                Ok(Ok(candidates)) => {
                    debug!(strategy = %key, candidates = candidates.len(), "strategy finished");
                    merge_candidates(&mut merged, &key, candidates);
                }
                Ok(Err(e)) => {
                    warn!(strategy = %key, error = %e, "strategy failed; excluded from merge");
                    failures.push(StrategyFailure {
                        strategy: key,
                        reason: e.to_string(),
                    });
                }
                Err(e) => {
                    warn!(strategy = %key, error = %e, "strategy worker panicked or was aborted");
                    failures.push(StrategyFailure {
                        strategy: key,
                        reason: format!("worker failed: {}", e),
                    });
                }
            }
        }

        if let Some(min_strength) = options.min_strength {
            merged.retain(|_, r| r.forward_strength >= min_strength);
        }

        let relationships: Vec<Relationship> = merged.into_values().collect();

        if options.apply {
            let run_types: BTreeSet<RelationshipType> = eligible
                .iter()
                .map(|s| s.relationship_type())
                .collect();
            let events = self.apply(paths, &relationships, &run_types)?;

            self.bus.publish(&RelationshipEvent::Detected {
                sources: paths.to_vec(),
                relationships: relationships.clone(),
            });
            for event in &events {
                self.bus.publish(event);
            }
        }

        let processing_time_ms = start
            .elapsed()
            .unwrap_or(Duration::from_secs(0))
            .as_millis() as u64;

        info!(
            relationships = relationships.len(),
            failures = failures.len(),
            elapsed_ms = processing_time_ms,
            "detection run complete"
        );

        Ok(DetectionReport {
            relationships,
            failures,
            persisted: options.apply,
            metadata: DetectionMetadata {
                files_scanned: paths.len(),
                strategies_run: eligible.len(),
                processing_time_ms,
            },
        })
    }

    /// Batch form of [`detect`](Self::detect): one shared run, results
    /// grouped by source file. Every input path gets an entry, empty
    /// when nothing was detected for it.
    pub async fn detect_many(
        &self,
        paths: &[String],
        options: &DetectOptions,
    ) -> Result<BTreeMap<String, Vec<Relationship>>, DetectionError> {
        let report = self.detect(paths, options).await?;

        let mut by_source: BTreeMap<String, Vec<Relationship>> =
            paths.iter().map(|p| (p.clone(), Vec::new())).collect();
        for relationship in report.relationships {
            by_source
                .entry(relationship.source_path.clone())
                .or_default()
                .push(relationship);
        }
        Ok(by_source)
    }

    /// Persist merged results and prune stale edges.
    ///
    /// For each scanned source file, the run owns the relationship types
    /// it executed: previously stored edges of those types that the run
    /// no longer produced are removed. Returns the per-file `Changed`
    /// events describing the diff; files whose edge set did not change
    /// produce no event (idempotent re-detection).
    fn apply(
        &self,
        paths: &[String],
        relationships: &[Relationship],
        run_types: &BTreeSet<RelationshipType>,
    ) -> Result<Vec<RelationshipEvent>, DetectionError> {
        let mut store = self
            .store
            .lock()
            .map_err(|e| DetectionError::Storage(format!("store lock poisoned: {}", e)))?;

        let sources: BTreeSet<&String> = paths.iter().collect();
        let mut events = Vec::new();
        let mut stale: Vec<Relationship> = Vec::new();

        for source in &sources {
            let existing: Vec<Relationship> = store
                .get_for_file(source.as_str(), Direction::Outgoing)
                .map_err(|e| DetectionError::Storage(e.to_string()))?
                .into_iter()
                .filter(|r| run_types.contains(&r.relationship_type))
                .collect();

            let produced: BTreeMap<RelationshipKey, &Relationship> = relationships
                .iter()
                .filter(|r| r.source_path == **source)
                .map(|r| (r.key(), r))
                .collect();

            let mut added = Vec::new();
            let mut updated = Vec::new();
            let mut removed = Vec::new();

            for (key, candidate) in &produced {
                match existing.iter().find(|r| r.key() == *key) {
                    None => added.push((*candidate).clone()),
                    Some(stored) => {
                        // Predict the post-merge row; identical re-detection
                        // must not count as an update
                        let mut would = stored.clone();
                        would.merge_from(candidate);
                        let materially_changed = would.forward_strength != stored.forward_strength
                            || would.reverse_strength != stored.reverse_strength
                            || would.confidence != stored.confidence
                            || would.metadata != stored.metadata;
                        if materially_changed {
                            updated.push((*candidate).clone());
                        }
                    }
                }
            }

            for stored in existing {
                if !produced.contains_key(&stored.key()) {
                    removed.push(stored.clone());
                    stale.push(stored);
                }
            }

            if !(added.is_empty() && removed.is_empty() && updated.is_empty()) {
                events.push(RelationshipEvent::Changed {
                    file: (*source).clone(),
                    added,
                    removed,
                    updated,
                });
            }
        }

        store
            .add_batch(relationships.to_vec())
            .map_err(|e| DetectionError::Storage(e.to_string()))?;

        for r in &stale {
            store
                .remove(&r.source_path, &r.target_path, Some(&r.relationship_type))
                .map_err(|e| DetectionError::Storage(e.to_string()))?;
        }

        Ok(events)
    }
}

/// Fold one strategy's candidates into the merged map.
///
/// Metadata keys are namespaced by the strategy key first, so when two
/// strategies report the same triple neither side's evidence is dropped;
/// strengths and confidence merge by maximum.
fn merge_candidates(
    merged: &mut BTreeMap<RelationshipKey, Relationship>,
    strategy_key: &str,
    candidates: Vec<Relationship>,
) {
    for mut candidate in candidates {
        let mut namespaced = Metadata::new();
        merge_namespaced(&mut namespaced, strategy_key, &candidate.metadata);
        candidate.metadata = namespaced;

        match merged.get_mut(&candidate.key()) {
            Some(existing) => existing.merge_from(&candidate),
            None => {
                merged.insert(candidate.key(), candidate);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DetectConfig;
    use crate::strategies::{ImportStrategy, ReferenceStrategy, StructuralStrategy};
    use std::collections::HashMap;
    use std::io;
    use weft_domain::{CancelFlag, ContentReader, EventKind, MetadataValue};
    use weft_events::{EventSubscriber, SubscriberError};
    use weft_store::SqliteStore;

    struct MapReader(HashMap<String, String>);

    impl ContentReader for MapReader {
        fn read_text(&self, path: &str) -> io::Result<String> {
            self.0
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.to_string()))
        }
    }

    struct FailingStrategy;

    impl DetectionStrategy for FailingStrategy {
        fn key(&self) -> &str {
            "failing"
        }

        fn relationship_type(&self) -> RelationshipType {
            RelationshipType::Custom("failing".to_string())
        }

        fn detect(
            &self,
            _ctx: &DetectionContext,
            _paths: &[String],
        ) -> Result<Vec<Relationship>, DetectionError> {
            Err(DetectionError::Strategy {
                strategy: "failing".to_string(),
                message: "intentional".to_string(),
            })
        }
    }

    struct EventRecorder {
        events: Mutex<Vec<RelationshipEvent>>,
    }

    impl EventSubscriber for EventRecorder {
        fn name(&self) -> &str {
            "recorder"
        }

        fn on_event(&self, event: &RelationshipEvent) -> Result<(), SubscriberError> {
            self.events.lock().unwrap().push(event.clone());
            Ok(())
        }
    }

    fn orchestrator(
        files: &[(&str, &str)],
    ) -> (Orchestrator<SqliteStore>, Arc<EventRecorder>, Vec<String>) {
        let map: HashMap<String, String> = files
            .iter()
            .map(|(p, c)| (p.to_string(), c.to_string()))
            .collect();
        let paths: Vec<String> = files.iter().map(|(p, _)| p.to_string()).collect();

        let config = DetectConfig::default();
        let mut registry = StrategyRegistry::new();
        registry
            .register(Arc::new(ImportStrategy::new(&config).unwrap()))
            .unwrap();
        registry
            .register(Arc::new(ReferenceStrategy::new(&config)))
            .unwrap();
        registry
            .register(Arc::new(StructuralStrategy::new()))
            .unwrap();

        let recorder = Arc::new(EventRecorder {
            events: Mutex::new(Vec::new()),
        });
        let bus = Arc::new(EventBus::new());
        bus.subscribe(EventKind::Any, recorder.clone());

        let store = Arc::new(Mutex::new(SqliteStore::open_in_memory().unwrap()));
        let context = DetectionContext::new(Arc::new(MapReader(map)), None);

        (
            Orchestrator::new(Arc::new(registry), store, bus, context),
            recorder,
            paths,
        )
    }

    #[tokio::test]
    async fn test_detect_report_only_does_not_persist() {
        let (orchestrator, recorder, paths) =
            orchestrator(&[("a.py", "import b\n"), ("b.py", "x = 1\n")]);

        let report = orchestrator
            .detect(&paths, &DetectOptions::default())
            .await
            .unwrap();

        assert!(!report.persisted);
        assert!(!report.relationships.is_empty());
        assert!(recorder.events.lock().unwrap().is_empty());

        let store = orchestrator.store();
        let store = store.lock().unwrap();
        assert!(store.all().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_detect_apply_persists_and_publishes() {
        let (orchestrator, recorder, paths) =
            orchestrator(&[("a.py", "import b\n"), ("b.py", "x = 1\n")]);

        let options = DetectOptions {
            apply: true,
            ..Default::default()
        };
        let report = orchestrator.detect(&paths, &options).await.unwrap();
        assert!(report.persisted);

        {
            let store = orchestrator.store();
            let store = store.lock().unwrap();
            let stored = store.all().unwrap();
            assert!(stored
                .iter()
                .any(|r| r.source_path == "a.py"
                    && r.target_path == "b.py"
                    && r.relationship_type == RelationshipType::Imports));
        }

        let events = recorder.events.lock().unwrap();
        assert!(events
            .iter()
            .any(|e| matches!(e, RelationshipEvent::Detected { .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, RelationshipEvent::Changed { file, added, .. }
                if file == "a.py" && !added.is_empty())));
    }

    #[tokio::test]
    async fn test_redetection_is_idempotent() {
        let (orchestrator, recorder, paths) =
            orchestrator(&[("a.py", "import b\n"), ("b.py", "x = 1\n")]);

        let options = DetectOptions {
            apply: true,
            ..Default::default()
        };
        orchestrator.detect(&paths, &options).await.unwrap();
        recorder.events.lock().unwrap().clear();

        // Unchanged inputs: no Changed event may carry added/removed
        orchestrator.detect(&paths, &options).await.unwrap();

        let events = recorder.events.lock().unwrap();
        for event in events.iter() {
            if let RelationshipEvent::Changed { added, removed, .. } = event {
                assert!(added.is_empty(), "idempotent re-detection added edges");
                assert!(removed.is_empty(), "idempotent re-detection removed edges");
            }
        }
    }

    #[tokio::test]
    async fn test_stale_edges_are_pruned() {
        let (orchestrator1, _recorder, paths) =
            orchestrator(&[("a.py", "import b\n"), ("b.py", "x = 1\n")]);

        let options = DetectOptions {
            apply: true,
            ..Default::default()
        };
        orchestrator1.detect(&paths, &options).await.unwrap();

        // Rebuild with a.py no longer importing b.py
        let (orchestrator2, recorder2, paths2) =
            orchestrator(&[("a.py", "x = 2\n"), ("b.py", "x = 1\n")]);
        {
            // Seed the second store with the old edge
            let store = orchestrator2.store();
            let mut store = store.lock().unwrap();
            store
                .add(Relationship::new(
                    "a.py",
                    "b.py",
                    RelationshipType::Imports,
                    0.9,
                    0.9,
                ))
                .unwrap();
        }

        orchestrator2.detect(&paths2, &options).await.unwrap();

        let store = orchestrator2.store();
        let store = store.lock().unwrap();
        let remaining = store.all().unwrap();
        assert!(
            !remaining
                .iter()
                .any(|r| r.relationship_type == RelationshipType::Imports),
            "stale import edge should be pruned"
        );

        let events = recorder2.events.lock().unwrap();
        assert!(events
            .iter()
            .any(|e| matches!(e, RelationshipEvent::Changed { removed, .. } if !removed.is_empty())));
    }

    #[tokio::test]
    async fn test_failing_strategy_is_isolated() {
        let map: HashMap<String, String> =
            [("a.py".to_string(), "import b\n".to_string()),
             ("b.py".to_string(), "x = 1\n".to_string())]
            .into_iter()
            .collect();
        let paths = vec!["a.py".to_string(), "b.py".to_string()];

        let config = DetectConfig::default();
        let mut registry = StrategyRegistry::new();
        registry.register(Arc::new(FailingStrategy)).unwrap();
        registry
            .register(Arc::new(ImportStrategy::new(&config).unwrap()))
            .unwrap();

        let store = Arc::new(Mutex::new(SqliteStore::open_in_memory().unwrap()));
        let context = DetectionContext::new(Arc::new(MapReader(map)), None);
        let orchestrator = Orchestrator::new(
            Arc::new(registry),
            store,
            Arc::new(EventBus::new()),
            context,
        );

        let report = orchestrator
            .detect(&paths, &DetectOptions::default())
            .await
            .unwrap();

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].strategy, "failing");
        assert!(
            !report.relationships.is_empty(),
            "healthy strategies still contribute"
        );
    }

    #[tokio::test]
    async fn test_cancellation_between_strategies() {
        let (orchestrator, _recorder, paths) =
            orchestrator(&[("a.py", "import b\n"), ("b.py", "x = 1\n")]);

        let cancel = CancelFlag::new();
        cancel.cancel();
        let options = DetectOptions {
            cancel,
            ..Default::default()
        };

        let result = orchestrator.detect(&paths, &options).await;
        assert!(matches!(result, Err(DetectionError::Cancelled)));
    }

    #[tokio::test]
    async fn test_merged_metadata_is_namespaced() {
        // a.py imports b and also mentions it enough times to trigger
        // the reference strategy on the same pair
        let (orchestrator, _recorder, paths) = orchestrator(&[
            ("alpha.py", "import beta\nbeta.run()\nbeta.stop()\n"),
            ("beta.py", "x = 1\n"),
        ]);

        let report = orchestrator
            .detect(&paths, &DetectOptions::default())
            .await
            .unwrap();

        let import_edge = report
            .relationships
            .iter()
            .find(|r| r.relationship_type == RelationshipType::Imports)
            .expect("import edge");
        assert!(import_edge.metadata.contains_key("imports.import_count"));

        let reference_edge = report
            .relationships
            .iter()
            .find(|r| r.relationship_type == RelationshipType::References)
            .expect("reference edge");
        assert!(matches!(
            reference_edge.metadata.get("references.mention_count"),
            Some(MetadataValue::Int(_))
        ));
    }

    #[tokio::test]
    async fn test_detect_many_groups_by_source() {
        let (orchestrator, _recorder, paths) =
            orchestrator(&[("a.py", "import b\n"), ("b.py", "x = 1\n")]);

        let by_source = orchestrator
            .detect_many(&paths, &DetectOptions::default())
            .await
            .unwrap();

        assert_eq!(by_source.len(), 2);
        assert!(!by_source["a.py"].is_empty());
        assert!(by_source["b.py"].is_empty());
    }

    #[tokio::test]
    async fn test_type_filter_restricts_strategies() {
        let (orchestrator, _recorder, paths) = orchestrator(&[
            ("src/parser.py", "x = 1\n"),
            ("tests/test_parser.py", "from src.parser import x\n"),
        ]);

        let options = DetectOptions {
            types: Some(vec![RelationshipType::StructuralSibling]),
            ..Default::default()
        };
        let report = orchestrator.detect(&paths, &options).await.unwrap();

        assert!(report
            .relationships
            .iter()
            .all(|r| r.relationship_type == RelationshipType::StructuralSibling));
        assert!(!report.relationships.is_empty());
    }
}
