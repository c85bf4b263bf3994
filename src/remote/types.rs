//! Remote row types and their wire enums.
//!
//! Rows live in the remote tabular store; existence is determined by
//! query, never cached locally. The state/status enums travel as small
//! integer codes.

use serde::{Deserialize, Serialize};

/// Enablement state of a metric lens row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricLensState {
    Na,
    Disabled,
    Enabled,
}

impl MetricLensState {
    /// Decode the wire integer. Codes outside the known set read as NA.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Disabled,
            1 => Self::Enabled,
            _ => Self::Na,
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            Self::Na => -1,
            Self::Disabled => 0,
            Self::Enabled => 1,
        }
    }
}

/// Health status of a metric lens row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricLensStatus {
    Na,
    Ok,
    Error,
    WarmUp,
    InvalidFilter,
    InvalidDimension,
    InvalidConfig,
}

impl MetricLensStatus {
    /// Decode the wire integer. Codes outside the known set read as NA.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Ok,
            1 => Self::Error,
            2 => Self::WarmUp,
            3 => Self::InvalidFilter,
            4 => Self::InvalidDimension,
            5 => Self::InvalidConfig,
            _ => Self::Na,
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            Self::Na => -1,
            Self::Ok => 0,
            Self::Error => 1,
            Self::WarmUp => 2,
            Self::InvalidFilter => 3,
            Self::InvalidDimension => 4,
            Self::InvalidConfig => 5,
        }
    }

    /// Statuses that count as healthy for the check-and-enable step.
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Ok | Self::WarmUp)
    }
}

/// One row of the remote filter table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRow {
    /// Primary key within the table.
    pub key: String,
    /// Filter name, the lookup key used by this engine.
    pub name: String,
    pub enabled: bool,
}

/// One row of the remote metric lens table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricLensRow {
    /// Primary key within the table.
    pub key: String,
    /// Dimension the lens aggregates over.
    pub dimension: String,
    /// Name of the filter this lens is attached to.
    pub filter_name: String,
    pub status: MetricLensStatus,
    pub state: MetricLensState,
    pub lens_type: String,
}

/// Column values for filling a freshly refreshed lens row slot.
#[derive(Debug, Clone)]
pub struct NewMetricLens {
    pub dimension: String,
    pub filter_name: String,
    pub lens_type: String,
    pub enabled: bool,
}

impl NewMetricLens {
    /// A quality lens over the Assets dimension, the shape this engine
    /// provisions.
    pub fn quality(filter_name: &str) -> Self {
        Self {
            dimension: "Assets".to_string(),
            filter_name: filter_name.to_string(),
            lens_type: "Quality MetricLens".to_string(),
            enabled: true,
        }
    }
}
