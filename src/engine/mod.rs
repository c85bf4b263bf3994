//! Provisioning engine: operations, poll-confirm, reconciliation.

mod poll;
mod provisioner;
mod reconcile;

pub use poll::{Poller, DEFAULT_POLL_TIMEOUT, POLL_INTERVAL};
pub use provisioner::{LensConvergence, Outcome, Provisioner};
pub use reconcile::{ReconcileStatus, Reconciler};
