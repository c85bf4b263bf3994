//! In-memory monitoring element.
//!
//! A process-local implementation of the element and table traits. It
//! backs the test suite and doubles as a reference for writing real
//! bindings: filter requests materialize rows, the lens refresh appends
//! an empty row slot, and delete triggers take effect on the next
//! query, so poll loops observe the same two-phase behavior the live
//! platform exhibits.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::types::{FilterRow, MetricLensRow, MetricLensState, MetricLensStatus, NewMetricLens};
use super::{FilterTable, MetricLensTable, MonitoringElement};
use crate::error::{Error, Result};
use crate::rules::FilterRequest;

#[derive(Default)]
struct Inner {
    filters: Mutex<Vec<FilterRow>>,
    lenses: Mutex<Vec<LensSlot>>,
    requests: Mutex<Vec<FilterRequest>>,
    next_filter_key: AtomicU64,
    refresh_count: AtomicU64,
    poll_now_count: AtomicU64,
    delete_fire_count: AtomicU64,
    fail_queries: AtomicBool,
    hold_requests: AtomicBool,
}

struct LensSlot {
    key: i64,
    row: Option<MetricLensRow>,
}

/// In-memory monitoring element (see module docs).
#[derive(Clone, Default)]
pub struct MemoryElement {
    inner: Arc<Inner>,
}

impl MemoryElement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a filter row, as if a previous run created it.
    pub fn insert_filter(&self, name: &str) {
        let key = self.inner.next_filter_key.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.filters.lock().unwrap().push(FilterRow {
            key: key.to_string(),
            name: name.to_string(),
            enabled: true,
        });
    }

    /// Pre-seed a complete lens row, as if a previous run created it.
    pub fn insert_lens(&self, filter_name: &str, state: MetricLensState, status: MetricLensStatus) {
        let mut lenses = self.inner.lenses.lock().unwrap();
        let key = lenses.iter().map(|s| s.key).max().unwrap_or(0) + 1;
        lenses.push(LensSlot {
            key,
            row: Some(MetricLensRow {
                key: key.to_string(),
                dimension: "Assets".to_string(),
                filter_name: filter_name.to_string(),
                status,
                state,
                lens_type: "Quality MetricLens".to_string(),
            }),
        });
    }

    /// Overwrite the health columns of the lens attached to a filter.
    pub fn set_lens_health(
        &self,
        filter_name: &str,
        state: MetricLensState,
        status: MetricLensStatus,
    ) {
        let mut lenses = self.inner.lenses.lock().unwrap();
        for slot in lenses.iter_mut() {
            if let Some(row) = &mut slot.row {
                if row.filter_name == filter_name {
                    row.state = state;
                    row.status = status;
                }
            }
        }
    }

    /// Make every table query fail until cleared. Trigger writes are
    /// unaffected.
    pub fn set_query_failure(&self, fail: bool) {
        self.inner.fail_queries.store(fail, Ordering::SeqCst);
    }

    /// Accept filter requests without materializing their rows, as a
    /// remote side that never converges.
    pub fn hold_filter_requests(&self, hold: bool) {
        self.inner.hold_requests.store(hold, Ordering::SeqCst);
    }

    /// Filter requests submitted so far.
    pub fn submitted_requests(&self) -> Vec<FilterRequest> {
        self.inner.requests.lock().unwrap().clone()
    }

    /// How often the lens refresh trigger fired.
    pub fn refresh_count(&self) -> u64 {
        self.inner.refresh_count.load(Ordering::SeqCst)
    }

    /// How often the poll-now trigger fired.
    pub fn poll_now_count(&self) -> u64 {
        self.inner.poll_now_count.load(Ordering::SeqCst)
    }

    /// How often any delete trigger fired.
    pub fn delete_fire_count(&self) -> u64 {
        self.inner.delete_fire_count.load(Ordering::SeqCst)
    }

    fn check_query_fault(&self) -> Result<()> {
        if self.inner.fail_queries.load(Ordering::SeqCst) {
            return Err(Error::Remote("injected query failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl FilterTable for MemoryElement {
    async fn find_by_name(&self, name: &str) -> Result<Option<FilterRow>> {
        self.check_query_fault()?;
        let filters = self.inner.filters.lock().unwrap();
        Ok(filters.iter().find(|row| row.name == name).cloned())
    }

    async fn fire_delete(&self, key: &str) -> Result<()> {
        self.inner.delete_fire_count.fetch_add(1, Ordering::SeqCst);
        // Firing on an already-removed row is not an error.
        let mut filters = self.inner.filters.lock().unwrap();
        filters.retain(|row| row.key != key);
        Ok(())
    }
}

#[async_trait]
impl MetricLensTable for MemoryElement {
    async fn find_by_filter(&self, filter_name: &str) -> Result<Option<MetricLensRow>> {
        self.check_query_fault()?;
        let lenses = self.inner.lenses.lock().unwrap();
        Ok(lenses
            .iter()
            .filter_map(|slot| slot.row.as_ref())
            .find(|row| row.filter_name == filter_name)
            .cloned())
    }

    async fn primary_keys(&self) -> Result<Vec<i64>> {
        self.check_query_fault()?;
        let lenses = self.inner.lenses.lock().unwrap();
        Ok(lenses.iter().map(|slot| slot.key).collect())
    }

    async fn fill_row(&self, key: i64, lens: &NewMetricLens) -> Result<()> {
        let mut lenses = self.inner.lenses.lock().unwrap();
        let slot = lenses
            .iter_mut()
            .find(|slot| slot.key == key)
            .ok_or_else(|| Error::Remote(format!("no lens row slot at key {}", key)))?;
        slot.row = Some(MetricLensRow {
            key: key.to_string(),
            dimension: lens.dimension.clone(),
            filter_name: lens.filter_name.clone(),
            status: MetricLensStatus::Na,
            state: if lens.enabled {
                MetricLensState::Enabled
            } else {
                MetricLensState::Disabled
            },
            lens_type: lens.lens_type.clone(),
        });
        Ok(())
    }

    async fn set_state(&self, key: &str, state: MetricLensState) -> Result<()> {
        let mut lenses = self.inner.lenses.lock().unwrap();
        for slot in lenses.iter_mut() {
            if let Some(row) = &mut slot.row {
                if row.key == key {
                    row.state = state;
                }
            }
        }
        Ok(())
    }

    async fn fire_poll_now(&self, _key: &str) -> Result<()> {
        self.inner.poll_now_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn fire_delete(&self, key: &str) -> Result<()> {
        self.inner.delete_fire_count.fetch_add(1, Ordering::SeqCst);
        let mut lenses = self.inner.lenses.lock().unwrap();
        lenses.retain(|slot| slot.key.to_string() != key);
        Ok(())
    }
}

#[async_trait]
impl MonitoringElement for MemoryElement {
    fn filter_table(&self) -> Arc<dyn FilterTable> {
        Arc::new(self.clone())
    }

    fn metric_lens_table(&self) -> Arc<dyn MetricLensTable> {
        Arc::new(self.clone())
    }

    async fn submit_filter_request(&self, request: &FilterRequest) -> Result<()> {
        self.inner.requests.lock().unwrap().push(request.clone());
        if self.inner.hold_requests.load(Ordering::SeqCst) {
            return Ok(());
        }
        let key = self.inner.next_filter_key.fetch_add(1, Ordering::SeqCst) + 1;
        let enabled = request.request.enabled == "true";
        self.inner.filters.lock().unwrap().push(FilterRow {
            key: key.to_string(),
            name: request.request.name.clone(),
            enabled,
        });
        Ok(())
    }

    async fn refresh_lens_list(&self) -> Result<()> {
        self.inner.refresh_count.fetch_add(1, Ordering::SeqCst);
        let mut lenses = self.inner.lenses.lock().unwrap();
        let key = lenses.iter().map(|slot| slot.key).max().unwrap_or(0) + 1;
        lenses.push(LensSlot { key, row: None });
        Ok(())
    }
}
