//! Detector pool
//!
//! Named generic detectors with a persisted configuration. Every mutation
//! is saved to the [`PoolStore`] before it returns.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tracing::{info, warn};

use anomaly_api::DetectorEntry;
use anomaly_spi::{Alarm, Diagnoser, PoolDocument, PoolEntryConfig, PoolError, PoolStore};
use forecast_core::ForecastContext;
use sequence_spi::SequenceSource;

use crate::generic::GenericDetector;
use crate::store::MemoryStore;

/// A pool entry as returned by [`DetectorPool::view`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolEntryView {
    pub name: String,
    #[serde(flatten)]
    pub config: PoolEntryConfig,
}

#[derive(Default)]
struct PoolState {
    document: PoolDocument,
    detectors: BTreeMap<String, GenericDetector>,
    /// Keyed by main metric
    diagnosers: HashMap<String, Arc<dyn Diagnoser>>,
}

/// Registry of named detectors.
pub struct DetectorPool {
    state: Mutex<PoolState>,
    store: Box<dyn PoolStore>,
}

impl std::fmt::Debug for DetectorPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectorPool")
            .field("detectors", &self.names())
            .finish()
    }
}

fn build_detector(
    name: &str,
    config: &PoolEntryConfig,
    diagnosers: &HashMap<String, Arc<dyn Diagnoser>>,
) -> Result<GenericDetector, PoolError> {
    let entry = DetectorEntry::from_config(config)?;
    let detector = GenericDetector::new(name, entry)
        .map_err(|e| PoolError::InvalidSchema(e.to_string()))?;
    Ok(match config.main_metric().and_then(|m| diagnosers.get(m)) {
        Some(diagnoser) => detector.with_diagnoser(Arc::clone(diagnoser)),
        None => detector,
    })
}

impl DetectorPool {
    /// Load the persisted document and rebuild its detectors.
    pub fn open(store: impl PoolStore + 'static) -> Result<Self, PoolError> {
        let pool = Self {
            state: Mutex::new(PoolState::default()),
            store: Box::new(store),
        };
        pool.rebuild()?;
        Ok(pool)
    }

    /// Empty pool backed by a [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self {
            state: Mutex::new(PoolState::default()),
            store: Box::new(MemoryStore::new()),
        }
    }

    pub fn store(&self) -> &dyn PoolStore {
        self.store.as_ref()
    }

    fn lock(&self) -> Result<MutexGuard<'_, PoolState>, PoolError> {
        self.state
            .lock()
            .map_err(|_| PoolError::Store("detector pool lock poisoned".to_string()))
    }

    /// Register a detector under `name`.
    pub fn add(&self, name: &str, config: PoolEntryConfig) -> Result<(), PoolError> {
        let mut state = self.lock()?;
        if state.document.contains_key(name) {
            return Err(PoolError::AlreadyExists(name.to_string()));
        }
        let detector = build_detector(name, &config, &state.diagnosers)?;
        state.document.insert(name.to_string(), config);
        if let Err(e) = self.store.save(&state.document) {
            state.document.remove(name);
            return Err(e);
        }
        state.detectors.insert(name.to_string(), detector);
        info!(detector = name, "added detector");
        Ok(())
    }

    /// Register a detector from an untyped JSON entry.
    pub fn add_json(&self, name: &str, value: serde_json::Value) -> Result<(), PoolError> {
        let config: PoolEntryConfig =
            serde_json::from_value(value).map_err(|e| PoolError::InvalidSchema(e.to_string()))?;
        self.add(name, config)
    }

    pub fn delete(&self, name: &str) -> Result<(), PoolError> {
        let mut state = self.lock()?;
        let removed = state
            .document
            .remove(name)
            .ok_or_else(|| PoolError::UnknownDetector(name.to_string()))?;
        if let Err(e) = self.store.save(&state.document) {
            state.document.insert(name.to_string(), removed);
            return Err(e);
        }
        state.detectors.remove(name);
        info!(detector = name, "deleted detector");
        Ok(())
    }

    pub fn pause(&self, name: &str) -> Result<(), PoolError> {
        self.set_running(name, false)
    }

    pub fn resume(&self, name: &str) -> Result<(), PoolError> {
        self.set_running(name, true)
    }

    fn set_running(&self, name: &str, running: bool) -> Result<(), PoolError> {
        let mut state = self.lock()?;
        let previous = match state.document.get_mut(name) {
            Some(config) => std::mem::replace(&mut config.running, running),
            None => return Err(PoolError::UnknownDetector(name.to_string())),
        };
        if let Err(e) = self.store.save(&state.document) {
            if let Some(config) = state.document.get_mut(name) {
                config.running = previous;
            }
            return Err(e);
        }
        info!(detector = name, running, "changed detector state");
        Ok(())
    }

    /// Remove every detector.
    pub fn clear(&self) -> Result<(), PoolError> {
        let mut state = self.lock()?;
        self.store.save(&PoolDocument::new())?;
        state.document.clear();
        state.detectors.clear();
        info!("cleared detector pool");
        Ok(())
    }

    pub fn view(&self, name: &str) -> Option<PoolEntryView> {
        let state = self.lock().ok()?;
        state.document.get(name).map(|config| PoolEntryView {
            name: name.to_string(),
            config: config.clone(),
        })
    }

    pub fn view_all(&self) -> Vec<PoolEntryView> {
        match self.lock() {
            Ok(state) => state
                .document
                .iter()
                .map(|(name, config)| PoolEntryView {
                    name: name.clone(),
                    config: config.clone(),
                })
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.lock()
            .map(|state| state.document.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lock()
            .map(|state| state.document.contains_key(name))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.lock().map(|state| state.document.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reload the persisted document and re-create its detectors.
    ///
    /// Entries that no longer validate are kept in the document but get no
    /// detector. Returns the number of detectors built.
    pub fn rebuild(&self) -> Result<usize, PoolError> {
        let document = self.store.load()?;
        let mut state = self.lock()?;
        let mut detectors = BTreeMap::new();
        for (name, config) in &document {
            match build_detector(name, config, &state.diagnosers) {
                Ok(detector) => {
                    detectors.insert(name.clone(), detector);
                }
                Err(e) => warn!(detector = %name, error = %e, "skipping invalid pool entry"),
            }
        }
        let built = detectors.len();
        state.document = document;
        state.detectors = detectors;
        info!(detectors = built, "rebuilt detector pool");
        Ok(built)
    }

    /// Attach `diagnoser` to every detector whose main metric is `metric`,
    /// including ones added later.
    pub fn register_diagnoser(
        &self,
        metric: &str,
        diagnoser: Arc<dyn Diagnoser>,
    ) -> Result<(), PoolError> {
        let mut state = self.lock()?;
        state
            .diagnosers
            .insert(metric.to_string(), Arc::clone(&diagnoser));
        for detector in state.detectors.values_mut() {
            if detector.entry().main_metric() == metric {
                *detector = detector.clone().with_diagnoser(Arc::clone(&diagnoser));
            }
        }
        Ok(())
    }

    /// Snapshot of the detectors that are not paused.
    pub fn running_detectors(&self) -> Vec<GenericDetector> {
        match self.lock() {
            Ok(state) => state
                .detectors
                .iter()
                .filter(|(name, _)| state.document.get(*name).map_or(false, |c| c.running))
                .map(|(_, detector)| detector.clone())
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Run every running detector over `[now - duration, now]` and rank the alarms.
    pub fn detect_all(
        &self,
        source: &dyn SequenceSource,
        ctx: &mut ForecastContext,
        now: i64,
    ) -> Vec<Alarm> {
        let mut alarms = Vec::new();
        for detector in self.running_detectors() {
            let start = now - detector.entry().duration as i64 * 1000;
            match detector.detect(source, ctx, start, now) {
                Ok(found) => alarms.extend(found),
                Err(e) => warn!(detector = %detector.name(), error = %e, "detector failed"),
            }
        }
        Alarm::rank(&mut alarms);
        alarms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anomaly_spi::{AlarmInfo, AlarmLevel, DetectorRecord};
    use detector_spi::AnomalyMask;
    use sequence_core::source::MemorySource;
    use sequence_spi::Sequence;

    fn record(metric: &str, high: f64) -> DetectorRecord {
        DetectorRecord {
            metric_name: metric.to_string(),
            metric_filter: Default::default(),
            metric_filter_like: Default::default(),
            detector_kind: "threshold".to_string(),
            detector_kwargs: serde_json::json!({ "high": high }),
        }
    }

    fn config(metric: &str, high: f64) -> PoolEntryConfig {
        PoolEntryConfig::new(300, AlarmInfo::new("too high", metric), vec![record(metric, high)])
    }

    struct Note;

    impl Diagnoser for Note {
        fn diagnose(&self, _series: &[Sequence], _mask: &AnomalyMask) -> Option<String> {
            Some("note".to_string())
        }
    }

    #[test]
    fn test_add_pause_view_delete() {
        let pool = DetectorPool::in_memory();
        pool.add("d1", config("os_cpu_usage", 0.9)).unwrap();
        assert!(pool.view("d1").unwrap().config.running);

        pool.pause("d1").unwrap();
        assert!(!pool.view("d1").unwrap().config.running);
        assert!(pool.running_detectors().is_empty());

        pool.resume("d1").unwrap();
        assert_eq!(pool.running_detectors().len(), 1);

        pool.delete("d1").unwrap();
        assert!(pool.view("d1").is_none());
        assert!(pool.is_empty());
    }

    #[test]
    fn test_errors() {
        let pool = DetectorPool::in_memory();
        pool.add("d1", config("os_cpu_usage", 0.9)).unwrap();
        assert_eq!(
            pool.add("d1", config("os_cpu_usage", 0.9)),
            Err(PoolError::AlreadyExists("d1".to_string()))
        );
        assert_eq!(pool.delete("nope"), Err(PoolError::UnknownDetector("nope".to_string())));
        assert_eq!(pool.pause("nope"), Err(PoolError::UnknownDetector("nope".to_string())));
    }

    #[test]
    fn test_add_json_validates() {
        let pool = DetectorPool::in_memory();
        let missing_duration = serde_json::json!({
            "detector_info": [{"metric_name": "m", "detector_kind": "threshold"}]
        });
        assert!(matches!(
            pool.add_json("a", missing_duration),
            Err(PoolError::InvalidSchema(_))
        ));

        let unknown_kind = serde_json::json!({
            "duration": 60,
            "detector_info": [{"metric_name": "m", "detector_kind": "magic"}]
        });
        assert!(matches!(pool.add_json("b", unknown_kind), Err(PoolError::InvalidSchema(_))));

        let valid = serde_json::json!({
            "duration": 60,
            "alarm_info": {"content": "m high", "type": "performance", "level": "error", "cause": "m"},
            "detector_info": [{"metric_name": "m", "detector_kind": "threshold", "detector_kwargs": {"high": 1.0}}]
        });
        pool.add_json("c", valid).unwrap();
        assert_eq!(pool.names(), vec!["c".to_string()]);
        assert_eq!(pool.view("c").unwrap().config.alarm_info.level, AlarmLevel::Error);
    }

    #[test]
    fn test_mutations_are_saved() {
        let pool = DetectorPool::in_memory();
        pool.add("d1", config("m", 1.0)).unwrap();
        pool.add("d2", config("m", 1.0)).unwrap();
        pool.pause("d2").unwrap();
        let saved = pool.store().load().unwrap();
        assert_eq!(saved.len(), 2);
        assert!(!saved["d2"].running);

        pool.clear().unwrap();
        assert!(pool.store().load().unwrap().is_empty());
        assert!(pool.view_all().is_empty());
    }

    #[test]
    fn test_rebuild_skips_invalid_entries() {
        let mut document = PoolDocument::new();
        document.insert("good".to_string(), config("m", 1.0));
        let mut bad = config("m", 1.0);
        bad.duration = 0;
        document.insert("bad".to_string(), bad);

        let pool = DetectorPool::open(MemoryStore::with_document(document)).unwrap();
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.running_detectors().len(), 1);
        assert_eq!(pool.rebuild().unwrap(), 1);
    }

    #[test]
    fn test_view_serializes_flat() {
        let pool = DetectorPool::in_memory();
        pool.add("d1", config("m", 1.0)).unwrap();
        let value = serde_json::to_value(pool.view("d1").unwrap()).unwrap();
        assert_eq!(value["name"], "d1");
        assert_eq!(value["duration"], 300);
        assert_eq!(value["running"], true);
    }

    #[test]
    fn test_detect_all_ranks_and_skips_paused() {
        let source = MemorySource::new(vec![
            Sequence::from_values(0, 1000, vec![0.1, 0.95, 0.2])
                .named("os_cpu_usage")
                .label("instance", "h1"),
            Sequence::from_values(0, 1000, vec![0.95, 0.1, 0.1])
                .named("os_mem_usage")
                .label("instance", "h1"),
        ]);
        let pool = DetectorPool::in_memory();
        pool.add("cpu", config("os_cpu_usage", 0.9)).unwrap();
        let mut mem = config("os_mem_usage", 0.9);
        mem.alarm_info.level = AlarmLevel::Critical;
        pool.add("mem", mem).unwrap();
        pool.register_diagnoser("os_cpu_usage", Arc::new(Note)).unwrap();

        let mut ctx = ForecastContext::new();
        let alarms = pool.detect_all(&source, &mut ctx, 10_000);
        assert_eq!(alarms.len(), 2);
        assert_eq!(alarms[0].metric_name, "os_mem_usage");
        assert_eq!(alarms[1].extra.as_deref(), Some("note"));

        pool.pause("mem").unwrap();
        let alarms = pool.detect_all(&source, &mut ctx, 10_000);
        assert_eq!(alarms.len(), 1);
        assert_eq!(alarms[0].metric_name, "os_cpu_usage");
    }
}
