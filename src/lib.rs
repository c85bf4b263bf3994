#![recursion_limit = "256"]
//! qlens - headless provisioning workflow engine for video-QoE
//! monitoring.
//!
//! qlens drives filter and metric-lens provisioning against a QoE
//! monitoring service through an injected element capability. Every
//! remote write is asynchronous on the remote side, so each operation
//! confirms its effect by polling the remote tabular store before it
//! advances the instance's lifecycle status. An external scheduler
//! re-invokes operations that time out; the already-exists and
//! already-absent checks keep retries idempotent.
//!
//! ## Lifecycle
//!
//! ```text
//! draft → ready → in_progress → active → deactivate → complete
//!           ↑                      ↓                      |
//!           +──── reprovision ←────+                      |
//!           +─────────────────────────────────────────────+
//! ```
//!
//! ## Example
//!
//! ```yaml
//! name: eventA-live
//! element: QoE Platform - Prod
//! type: create_filter
//! category: CONTENT
//! subcategory: Asset
//! enabled: true
//!
//! rules:
//!   - field: Asset Name
//!     operator: contains
//!     value: Live-1234
//!     group: "1"
//!   - field: Asset Name
//!     operator: contains
//!     value: Live-5678
//!     group: "2"
//! ```
//!
//! Rules sharing a group are ORed; distinct groups are ANDed. The
//! document above matches assets containing `Live-1234` AND `Live-5678`.

pub mod config;
pub mod engine;
pub mod error;
pub mod remote;
pub mod rules;
pub mod shutdown;
pub mod storage;
pub mod telemetry;
pub mod workflow;

pub use engine::{LensConvergence, Outcome, Provisioner};
pub use error::{Error, Result};
