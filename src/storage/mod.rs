//! Instance persistence.
//!
//! The engine reads and writes provision instances through the
//! [`InstanceStore`] trait; [`SqliteInstanceStore`] is the bundled
//! implementation. Lookup by id returns `Option`: a missing instance
//! is data, not an exception.

mod models;
mod sqlite;

use async_trait::async_trait;

use crate::error::Result;
use crate::workflow::{ProvisionInstance, Status, Transition};

pub use models::TransitionRecord;
pub use sqlite::SqliteInstanceStore;

/// Persistence seam for provision instances.
#[async_trait]
pub trait InstanceStore: Send + Sync {
    /// Look up an instance by id.
    async fn get(&self, id: &str) -> Result<Option<ProvisionInstance>>;

    /// Insert or replace an instance and its rule records.
    async fn save(&self, instance: &ProvisionInstance) -> Result<()>;

    /// Overwrite the status of an existing instance.
    async fn set_status(&self, id: &str, status: Status) -> Result<()>;

    /// Append an applied transition to the audit log.
    async fn record_transition(&self, id: &str, transition: Transition) -> Result<()>;

    /// All instances, newest first.
    async fn list(&self) -> Result<Vec<ProvisionInstance>>;

    /// Delete an instance. Returns whether a row was removed.
    async fn delete(&self, id: &str) -> Result<bool>;
}
