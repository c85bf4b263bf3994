//! Compensating teardown of a filter and its metric lens.
//!
//! Each check is one pass over both resources: a surviving row gets its
//! delete trigger fired and counts as not-gone; an absent row counts as
//! gone. The pass is designed to run repeatedly under the poller, so
//! re-firing a delete on a row the remote side is still removing is
//! expected and harmless.

use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::remote::{FilterTable, MetricLensTable};

/// Result of one reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileStatus {
    pub filter_gone: bool,
    pub lens_gone: bool,
}

impl ReconcileStatus {
    /// Both resources confirmed absent.
    pub fn done(&self) -> bool {
        self.filter_gone && self.lens_gone
    }
}

/// Drives removal of the filter row and the lens row for one filter
/// name.
pub struct Reconciler {
    filters: Arc<dyn FilterTable>,
    lenses: Arc<dyn MetricLensTable>,
    filter_name: String,
}

impl Reconciler {
    pub fn new(
        filters: Arc<dyn FilterTable>,
        lenses: Arc<dyn MetricLensTable>,
        filter_name: &str,
    ) -> Self {
        Self {
            filters,
            lenses,
            filter_name: filter_name.to_string(),
        }
    }

    /// Run one pass: fire delete triggers on surviving rows, report
    /// which resources are gone.
    pub async fn reconcile(&self) -> Result<ReconcileStatus> {
        let filter_gone = match self.filters.find_by_name(&self.filter_name).await? {
            Some(row) => {
                debug!(filter = %self.filter_name, key = %row.key, "Filter row still present, firing delete");
                self.filters.fire_delete(&row.key).await?;
                false
            }
            None => true,
        };

        let lens_gone = match self.lenses.find_by_filter(&self.filter_name).await? {
            Some(row) => {
                debug!(filter = %self.filter_name, key = %row.key, "Lens row still present, firing delete");
                self.lenses.fire_delete(&row.key).await?;
                false
            }
            None => true,
        };

        Ok(ReconcileStatus {
            filter_gone,
            lens_gone,
        })
    }
}
