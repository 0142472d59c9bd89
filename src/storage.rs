use crate::kv::{KeyValueStore, PREFERENCES_KEY, SCANS_KEY, STATS_KEY, StoreError};
use crate::models::{AnalyticsResponse, MonthlyPoint, NewScan, ScanRecord, Severity, UserStats};
use crate::seed::generate_history;
use crate::stats::{self, date_key};
use chrono::{Duration, Local, NaiveDate};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::de::DeserializeOwned;
use tracing::{error, info, warn};
use uuid::Uuid;

const RECENT_DAYS: i64 = 7;

/// Owns the scan collection and its aggregate statistics.
///
/// Every mutation reads the full collection, modifies it, then writes it back
/// together with recomputed statistics. A failed write leaves the previous
/// collection in place.
pub struct RecordStore {
    kv: Box<dyn KeyValueStore + Send>,
    rng: StdRng,
}

impl RecordStore {
    pub fn new(kv: impl KeyValueStore + Send + 'static) -> Self {
        Self::with_rng(kv, StdRng::from_entropy())
    }

    pub fn with_rng(kv: impl KeyValueStore + Send + 'static, rng: StdRng) -> Self {
        Self {
            kv: Box::new(kv),
            rng,
        }
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// All records, most recent first. Missing or corrupt data reads as empty.
    pub fn list(&self) -> Vec<ScanRecord> {
        self.read(SCANS_KEY).unwrap_or_default()
    }

    pub fn append(&mut self, scan: NewScan) -> Result<ScanRecord, StoreError> {
        let record = scan.with_id(new_id());
        let mut records = self.list();
        records.insert(0, record.clone());
        let stats = stats::recompute(&records, &mut self.rng);
        self.commit(&records, &stats)?;
        Ok(record)
    }

    /// Removes the record with `id` if present. Absent ids are not an error.
    pub fn remove(&mut self, id: &str) -> Result<bool, StoreError> {
        let mut records = self.list();
        let before = records.len();
        records.retain(|record| record.id != id);
        let removed = records.len() != before;

        let stats = stats::recompute(&records, &mut self.rng);
        self.commit(&records, &stats)?;
        Ok(removed)
    }

    pub fn ensure_seeded(&mut self) -> Result<(), StoreError> {
        self.ensure_seeded_at(Local::now().date_naive())
    }

    pub fn ensure_seeded_at(&mut self, today: NaiveDate) -> Result<(), StoreError> {
        if self.kv.get(SCANS_KEY).is_none() {
            let records: Vec<ScanRecord> = generate_history(today, &mut self.rng)
                .into_iter()
                .map(|scan| scan.with_id(new_id()))
                .collect();
            info!("seeded {} synthetic scans", records.len());

            let stats = stats::recompute_at(today, &records, &mut self.rng);
            self.commit(&records, &stats)?;
        } else if self.kv.get(STATS_KEY).is_none() {
            let records = self.list();
            let stats = stats::recompute_at(today, &records, &mut self.rng);
            self.write(STATS_KEY, &stats)?;
        }
        Ok(())
    }

    /// Persisted aggregate, or zeroed defaults when none is stored.
    pub fn stats(&self) -> UserStats {
        self.read(STATS_KEY)
            .unwrap_or_else(|| UserStats::empty(date_key(Local::now().date_naive())))
    }

    pub fn refresh_stats(&mut self) -> Result<UserStats, StoreError> {
        let records = self.list();
        let stats = stats::recompute(&records, &mut self.rng);
        self.write(STATS_KEY, &stats)?;
        Ok(stats)
    }

    /// Drops all scans and statistics and seeds a fresh history.
    pub fn reset(&mut self) -> Result<(), StoreError> {
        self.kv.remove(SCANS_KEY)?;
        self.kv.remove(STATS_KEY)?;
        self.ensure_seeded()
    }

    pub fn recent(&self, today: NaiveDate) -> Vec<ScanRecord> {
        let cutoff = date_key(today - Duration::days(RECENT_DAYS));
        self.list()
            .into_iter()
            .filter(|record| record.date >= cutoff)
            .collect()
    }

    /// Severity filter (`all` or absent matches everything) combined with a
    /// case-insensitive search over notes and condition labels.
    pub fn filter(&self, severity: Option<&str>, query: Option<&str>) -> Vec<ScanRecord> {
        let severity = severity
            .filter(|value| !value.trim().eq_ignore_ascii_case("all") && !value.trim().is_empty())
            .map(Severity::parse);
        let query = query
            .map(|value| value.trim().to_lowercase())
            .filter(|value| !value.is_empty());

        self.list()
            .into_iter()
            .filter(|record| match severity {
                None => true,
                Some(wanted) => Some(record.severity) == wanted,
            })
            .filter(|record| match &query {
                None => true,
                Some(needle) => {
                    record.notes.to_lowercase().contains(needle)
                        || record
                            .conditions
                            .iter()
                            .any(|condition| condition.to_lowercase().contains(needle))
                }
            })
            .collect()
    }

    pub fn monthly(&self) -> Vec<MonthlyPoint> {
        stats::monthly(&self.list())
    }

    pub fn analytics(&self) -> AnalyticsResponse {
        stats::build_analytics(&self.list())
    }

    pub fn preferences(&self) -> serde_json::Value {
        self.read(PREFERENCES_KEY)
            .unwrap_or_else(|| serde_json::Value::Object(Default::default()))
    }

    pub fn set_preferences(&mut self, value: &serde_json::Value) -> Result<(), StoreError> {
        self.write(PREFERENCES_KEY, value)
    }

    fn commit(&mut self, records: &[ScanRecord], stats: &UserStats) -> Result<(), StoreError> {
        let previous = self.kv.get(SCANS_KEY);
        self.write(SCANS_KEY, records)?;
        if let Err(err) = self.write(STATS_KEY, stats) {
            let rollback = match previous {
                Some(raw) => self.kv.set(SCANS_KEY, raw),
                None => self.kv.remove(SCANS_KEY),
            };
            if let Err(rollback_err) = rollback {
                error!("failed to restore scans after stats write error: {rollback_err}");
            }
            return Err(err);
        }
        Ok(())
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.kv.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("ignoring corrupt value under {key}: {err}");
                None
            }
        }
    }

    fn write<T: serde::Serialize + ?Sized>(
        &mut self,
        key: &str,
        value: &T,
    ) -> Result<(), StoreError> {
        let payload = serde_json::to_string(value)?;
        self.kv.set(key, payload)
    }
}

fn new_id() -> String {
    format!("scan_{}", Uuid::new_v4().simple())
}
