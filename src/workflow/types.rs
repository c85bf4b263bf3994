//! Provision instance type definitions.
//!
//! An instance document captures everything one provisioning run needs:
//! the filter parameters and the ordered rule records. Documents are
//! written by operators as YAML; see [`super::parser`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::Status;

/// Filter parameters for one provisioning run.
///
/// # Example YAML
///
/// ```yaml
/// name: eventA-live
/// element: QoE Platform - Prod
/// type: create_filter
/// category: CONTENT
/// subcategory: Asset
/// enabled: true
/// rules:
///   - field: Asset Name
///     operator: contains
///     value: Live-1234
///     group: "1"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceSpec {
    /// Filter name, unique per concurrent run. Used as the lookup key
    /// in both remote tables.
    pub name: String,

    /// Name of the monitoring element that handles this run.
    pub element: String,

    /// Remote request type.
    #[serde(rename = "type", default = "default_filter_type")]
    pub filter_type: String,

    /// Filter category (e.g. CONTENT).
    pub category: String,

    /// Filter subcategory (e.g. Asset).
    pub subcategory: String,

    /// Whether the filter starts active on the remote side.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Ordered rule records. May be empty: an empty rule set compiles
    /// to a match-nothing expression, never match-everything.
    #[serde(default)]
    pub rules: Vec<RuleRecord>,
}

fn default_filter_type() -> String {
    "create_filter".to_string()
}

fn default_true() -> bool {
    true
}

/// One flat rule record.
///
/// Records sharing a `group` are ORed together; distinct groups are
/// ANDed. `key` distinguishes "match a field" from "match a field under
/// a specific key" and is dropped from compiled output when blank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleRecord {
    pub field: String,

    #[serde(default)]
    pub key: String,

    pub operator: String,

    pub value: String,

    pub group: String,
}

/// A persisted provisioning run, tracked by lifecycle status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionInstance {
    /// Opaque instance id.
    pub id: String,

    /// Current lifecycle status.
    pub status: Status,

    /// The filter parameters and rule records.
    pub spec: InstanceSpec,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl ProvisionInstance {
    /// Create a new instance in the initial status.
    pub fn new(spec: InstanceSpec) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            status: Status::INITIAL,
            spec,
            created_at: now,
            updated_at: now,
        }
    }

    /// Filter name, the remote lookup key for this run.
    pub fn filter_name(&self) -> &str {
        &self.spec.name
    }
}
