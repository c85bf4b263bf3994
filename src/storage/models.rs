//! Storage models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflow::{Status, Transition};

/// One applied transition, kept for audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub id: String,
    pub instance_id: String,
    pub transition: Transition,
    pub from_status: Status,
    pub to_status: Status,
    pub applied_at: DateTime<Utc>,
}
