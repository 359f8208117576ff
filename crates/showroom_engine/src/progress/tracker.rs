use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::geometry::Vec3;

use super::store::KeyValueStore;
use super::zones::{Zone, ZoneCatalog};

pub const PROGRESS_STORE_KEY: &str = "carverse_progress";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    #[serde(default)]
    pub explored_zones: Vec<String>,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub last_update: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BrandProgress {
    pub explored: usize,
    pub total: usize,
    pub percentage: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressDetails {
    pub percentage: u32,
    pub explored: usize,
    pub total: usize,
    pub by_brand: BTreeMap<String, BrandProgress>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type ProgressListener = Box<dyn FnMut(&ProgressDetails)>;

/// Tracks which catalog zones the camera has entered. Every new visit and
/// every reset is flushed to the store and broadcast to subscribers.
pub struct ProgressTracker<S: KeyValueStore> {
    catalog: ZoneCatalog,
    store: S,
    explored: Vec<String>,
    current_zone: Option<usize>,
    listeners: Vec<(SubscriptionId, ProgressListener)>,
    next_subscription_id: u64,
}

impl<S: KeyValueStore> ProgressTracker<S> {
    /// Never fails: an absent, unreadable or corrupt record starts empty.
    pub fn load(catalog: ZoneCatalog, store: S) -> Self {
        let explored = match read_record(&store) {
            Some(record) => known_zone_ids(&catalog, record.explored_zones),
            None => Vec::new(),
        };
        info!(
            explored = explored.len(),
            total = catalog.len(),
            "progress_loaded"
        );
        Self {
            catalog,
            store,
            explored,
            current_zone: None,
            listeners: Vec::new(),
            next_subscription_id: 0,
        }
    }

    /// Returns the first zone containing `position`, recording it on first entry.
    pub fn check_position(&mut self, position: Vec3) -> Option<&Zone> {
        let Some(index) = self
            .catalog
            .zones()
            .iter()
            .position(|zone| zone.bounds.contains(position))
        else {
            self.current_zone = None;
            return None;
        };

        self.current_zone = Some(index);
        if !self.is_explored(&self.catalog.zones()[index].id) {
            self.mark_explored(index);
        }
        self.catalog.zones().get(index)
    }

    pub fn current_zone(&self) -> Option<&Zone> {
        self.current_zone
            .and_then(|index| self.catalog.zones().get(index))
    }

    pub fn reset(&mut self) {
        self.explored.clear();
        self.current_zone = None;
        self.persist();
        self.notify();
        info!("progress_reset");
    }

    pub fn progress_details(&self) -> ProgressDetails {
        let mut by_brand = BTreeMap::<String, BrandProgress>::new();
        for zone in self.catalog.zones() {
            let entry = by_brand.entry(zone.brand.clone()).or_default();
            entry.total += 1;
            if self.is_explored(&zone.id) {
                entry.explored += 1;
            }
        }
        for brand in by_brand.values_mut() {
            brand.percentage = rounded_percentage(brand.explored, brand.total);
        }

        ProgressDetails {
            percentage: self.percentage(),
            explored: self.explored_count(),
            total: self.total_zones(),
            by_brand,
        }
    }

    pub fn percentage(&self) -> u32 {
        rounded_percentage(self.explored_count(), self.total_zones())
    }

    pub fn explored_count(&self) -> usize {
        self.explored.len()
    }

    pub fn total_zones(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_explored(&self, zone_id: &str) -> bool {
        self.explored.iter().any(|id| id == zone_id)
    }

    pub fn explored_zone_ids(&self) -> &[String] {
        &self.explored
    }

    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&ProgressDetails) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription_id);
        self.next_subscription_id = self.next_subscription_id.saturating_add(1);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn mark_explored(&mut self, index: usize) {
        let zone = &self.catalog.zones()[index];
        self.explored.push(zone.id.clone());
        info!(
            zone = %zone.name,
            percentage = self.percentage(),
            "zone_explored"
        );
        self.persist();
        self.notify();
    }

    fn persist(&mut self) {
        let record = ProgressRecord {
            explored_zones: self.explored.clone(),
            last_update: unix_millis_now(),
        };
        let text = match serde_json::to_string(&record) {
            Ok(text) => text,
            Err(err) => {
                error!(error = %err, "progress_encode_failed");
                return;
            }
        };
        if let Err(err) = self.store.set(PROGRESS_STORE_KEY, &text) {
            error!(error = %err, "progress_save_failed");
        }
    }

    fn notify(&mut self) {
        let details = self.progress_details();
        for (_, listener) in &mut self.listeners {
            listener(&details);
        }
    }
}

fn read_record(store: &impl KeyValueStore) -> Option<ProgressRecord> {
    let raw = match store.get(PROGRESS_STORE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            error!(error = %err, "progress_load_failed");
            return None;
        }
    };
    match serde_json::from_str::<ProgressRecord>(&raw) {
        Ok(record) => Some(record),
        Err(err) => {
            warn!(error = %err, "discarding unreadable progress record");
            None
        }
    }
}

fn known_zone_ids(catalog: &ZoneCatalog, ids: Vec<String>) -> Vec<String> {
    let mut kept = Vec::with_capacity(ids.len());
    let mut dropped = 0usize;
    for id in ids {
        if catalog.contains_id(&id) && !kept.contains(&id) {
            kept.push(id);
        } else {
            dropped += 1;
        }
    }
    if dropped > 0 {
        warn!(dropped, "ignored unknown or repeated zone ids in progress record");
    }
    kept
}

fn rounded_percentage(explored: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (explored as f64 / total as f64 * 100.0).round() as u32
}

fn unix_millis_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::io;
    use std::path::PathBuf;
    use std::rc::Rc;

    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::progress::store::{FileStore, MemoryStore, StoreError};

    fn museum_tracker() -> ProgressTracker<MemoryStore> {
        ProgressTracker::load(ZoneCatalog::museum(), MemoryStore::new())
    }

    fn at(x: f32, z: f32) -> Vec3 {
        Vec3::new(x, 4.0, z)
    }

    fn stored_record(store: &impl KeyValueStore) -> ProgressRecord {
        let raw = store
            .get(PROGRESS_STORE_KEY)
            .expect("get")
            .expect("record present");
        serde_json::from_str(&raw).expect("record json")
    }

    fn recording_listener(
        tracker: &mut ProgressTracker<MemoryStore>,
    ) -> (SubscriptionId, Rc<RefCell<Vec<ProgressDetails>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = tracker.subscribe(move |details| sink.borrow_mut().push(details.clone()));
        (id, seen)
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Read {
                path: PathBuf::from("broken"),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
            })
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Write {
                path: PathBuf::from("broken"),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
            })
        }
    }

    #[test]
    fn visiting_one_ferrari_zone_reports_brand_and_overall_progress() {
        let mut tracker = museum_tracker();
        let zone = tracker.check_position(at(-13.0, -110.0)).expect("zone");
        assert_eq!(zone.id, "ferrari_front_1");

        let details = tracker.progress_details();
        let ferrari = details.by_brand["Ferrari"];
        assert_eq!(ferrari.explored, 1);
        assert_eq!(ferrari.total, 3);
        assert_eq!(ferrari.percentage, 33);
        assert_eq!(details.explored, 1);
        assert_eq!(details.total, 13);
        assert_eq!(details.percentage, 8);
        assert_eq!(details.by_brand["Center"].total, 1);
        assert_eq!(details.by_brand.len(), 5);
    }

    #[test]
    fn reentering_a_zone_notifies_once() {
        let mut tracker = museum_tracker();
        let (_, seen) = recording_listener(&mut tracker);

        tracker.check_position(at(0.0, 0.0));
        tracker.check_position(at(1.0, 1.0));
        tracker.check_position(at(0.0, -45.0));
        tracker.check_position(at(0.0, 0.0));

        assert_eq!(tracker.explored_count(), 1);
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(seen.borrow()[0].explored, 1);
    }

    #[test]
    fn every_listener_receives_full_summary() {
        let mut tracker = museum_tracker();
        let (_, first) = recording_listener(&mut tracker);
        let (_, second) = recording_listener(&mut tracker);

        tracker.check_position(at(-110.0, 0.0));
        tracker.check_position(at(110.0, 0.0));

        assert_eq!(first.borrow().len(), 2);
        assert_eq!(*first.borrow(), *second.borrow());
        let last = first.borrow()[1].clone();
        assert_eq!(last.explored, 2);
        assert_eq!(last.by_brand["Tesla"].explored, 1);
        assert_eq!(last.by_brand["BMW"].explored, 1);
    }

    #[test]
    fn unsubscribed_listener_is_not_called() {
        let mut tracker = museum_tracker();
        let (id, seen) = recording_listener(&mut tracker);
        assert!(tracker.unsubscribe(id));
        assert!(!tracker.unsubscribe(id));

        tracker.check_position(at(0.0, 0.0));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn boundary_positions_count_as_inside() {
        let mut tracker = museum_tracker();
        let zone = tracker.check_position(at(-120.0, 20.0)).expect("corner");
        assert_eq!(zone.id, "tesla_left_1");
        let zone = tracker.check_position(at(30.0, -30.0)).expect("corner");
        assert_eq!(zone.id, "center");
    }

    #[test]
    fn leaving_all_zones_clears_current_zone_only() {
        let mut tracker = museum_tracker();
        tracker.check_position(at(0.0, 0.0));
        assert_eq!(tracker.current_zone().map(|zone| zone.id.as_str()), Some("center"));

        assert!(tracker.check_position(at(0.0, -45.0)).is_none());
        assert!(tracker.current_zone().is_none());
        assert!(tracker.is_explored("center"));
    }

    #[test]
    fn each_new_visit_is_persisted_in_visit_order() {
        let mut tracker = museum_tracker();
        tracker.check_position(at(0.0, 110.0));
        tracker.check_position(at(0.0, 0.0));

        let record = stored_record(tracker.store());
        assert_eq!(record.explored_zones, ["porsche_back_1", "center"]);
        assert!(record.last_update > 0);
    }

    #[test]
    fn record_uses_camel_case_keys() {
        let mut tracker = museum_tracker();
        tracker.check_position(at(0.0, 0.0));
        let raw = tracker
            .store()
            .get(PROGRESS_STORE_KEY)
            .expect("get")
            .expect("record");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
        assert_eq!(value["exploredZones"], json!(["center"]));
        assert!(value["lastUpdate"].is_u64());
    }

    #[test]
    fn reset_clears_persists_and_notifies() {
        let mut tracker = museum_tracker();
        tracker.check_position(at(0.0, 0.0));
        tracker.check_position(at(0.0, -80.0));
        let (_, seen) = recording_listener(&mut tracker);

        tracker.reset();

        assert_eq!(tracker.progress_details().explored, 0);
        assert!(tracker.current_zone().is_none());
        assert!(stored_record(tracker.store()).explored_zones.is_empty());
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(seen.borrow()[0].percentage, 0);

        tracker.check_position(at(0.0, 0.0));
        assert_eq!(tracker.explored_count(), 1);
    }

    #[test]
    fn progress_survives_reload() {
        let mut tracker = museum_tracker();
        tracker.check_position(at(90.0, 0.0));
        let store = tracker.into_store();

        let reloaded = ProgressTracker::load(ZoneCatalog::museum(), store);
        assert!(reloaded.is_explored("bmw_right_2"));
        assert_eq!(reloaded.explored_count(), 1);
    }

    #[test]
    fn corrupt_record_starts_empty() {
        let store = MemoryStore::new().with_entry(PROGRESS_STORE_KEY, "{not json");
        let tracker = ProgressTracker::load(ZoneCatalog::museum(), store);
        assert_eq!(tracker.explored_count(), 0);
    }

    #[test]
    fn unknown_and_repeated_ids_are_dropped_on_load() {
        let raw = json!({
            "exploredZones": ["center", "atlantis", "center", "tesla_left_2"],
            "lastUpdate": 1_700_000_000_000u64
        })
        .to_string();
        let store = MemoryStore::new().with_entry(PROGRESS_STORE_KEY, &raw);
        let tracker = ProgressTracker::load(ZoneCatalog::museum(), store);
        assert_eq!(tracker.explored_zone_ids(), ["center", "tesla_left_2"]);
    }

    #[test]
    fn record_without_zone_list_loads_empty() {
        let store = MemoryStore::new().with_entry(PROGRESS_STORE_KEY, r#"{"lastUpdate": 5}"#);
        let tracker = ProgressTracker::load(ZoneCatalog::museum(), store);
        assert_eq!(tracker.explored_count(), 0);
    }

    #[test]
    fn store_failures_are_not_fatal() {
        let mut tracker = ProgressTracker::load(ZoneCatalog::museum(), BrokenStore);
        let seen = Rc::new(RefCell::new(0usize));
        let sink = Rc::clone(&seen);
        tracker.subscribe(move |_| *sink.borrow_mut() += 1);

        assert!(tracker.check_position(at(0.0, 0.0)).is_some());
        tracker.reset();

        assert_eq!(*seen.borrow(), 2);
        assert_eq!(tracker.explored_count(), 0);
    }

    #[test]
    fn file_store_reflects_reset_on_disk() {
        let temp = TempDir::new().expect("temp");
        let mut tracker =
            ProgressTracker::load(ZoneCatalog::museum(), FileStore::new(temp.path()));
        tracker.check_position(at(0.0, 0.0));
        tracker.reset();

        let fresh = FileStore::new(temp.path());
        assert!(stored_record(&fresh).explored_zones.is_empty());
        let reloaded = ProgressTracker::load(ZoneCatalog::museum(), fresh);
        assert_eq!(reloaded.progress_details().explored, 0);
    }

    #[test]
    fn empty_catalog_reports_zero_percent() {
        let catalog = ZoneCatalog::new(Vec::new()).expect("empty catalog");
        let tracker = ProgressTracker::load(catalog, MemoryStore::new());
        let details = tracker.progress_details();
        assert_eq!(details.percentage, 0);
        assert_eq!(details.total, 0);
        assert!(details.by_brand.is_empty());
    }
}
