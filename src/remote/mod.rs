//! Remote monitoring element abstraction.
//!
//! The engine talks to the QoE monitoring service through one element
//! capability and its two logical tables. Implementations are injected
//! as `Arc<dyn …>` into each component constructor; there is no ambient
//! connection handle. Delete, enable, and poll-now are one-shot trigger
//! writes: firing a trigger on a row that is already being processed
//! must not be an error.

pub mod memory;
mod types;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::rules::FilterRequest;

pub use memory::MemoryElement;
pub use types::{FilterRow, MetricLensRow, MetricLensState, MetricLensStatus, NewMetricLens};

/// The remote filter table, keyed by filter name.
#[async_trait]
pub trait FilterTable: Send + Sync {
    /// Key-equality lookup by filter name. Round-trips to the remote
    /// store on every call.
    async fn find_by_name(&self, name: &str) -> Result<Option<FilterRow>>;

    /// Fire the delete trigger on a row.
    async fn fire_delete(&self, key: &str) -> Result<()>;
}

/// The remote metric lens table, looked up by attached filter name.
#[async_trait]
pub trait MetricLensTable: Send + Sync {
    /// Key-equality lookup by the attached filter's name.
    async fn find_by_filter(&self, filter_name: &str) -> Result<Option<MetricLensRow>>;

    /// All primary keys currently in the table.
    async fn primary_keys(&self) -> Result<Vec<i64>>;

    /// Fill the row slot at `key` with lens column values.
    async fn fill_row(&self, key: i64, lens: &NewMetricLens) -> Result<()>;

    /// Write the enablement state column of a row.
    async fn set_state(&self, key: &str, state: MetricLensState) -> Result<()>;

    /// Fire the poll-now trigger on a row.
    async fn fire_poll_now(&self, key: &str) -> Result<()>;

    /// Fire the delete trigger on a row.
    async fn fire_delete(&self, key: &str) -> Result<()>;
}

/// One monitoring element: the injected session capability every
/// operation goes through.
#[async_trait]
pub trait MonitoringElement: Send + Sync {
    /// The element's filter table.
    fn filter_table(&self) -> Arc<dyn FilterTable>;

    /// The element's metric lens table.
    fn metric_lens_table(&self) -> Arc<dyn MetricLensTable>;

    /// Submit a filter creation request. The element forwards it to the
    /// remote service; the resulting row appears asynchronously.
    async fn submit_filter_request(&self, request: &FilterRequest) -> Result<()>;

    /// Ask the element to refresh its lens list, appending a fresh row
    /// slot at the next key.
    async fn refresh_lens_list(&self) -> Result<()>;
}
