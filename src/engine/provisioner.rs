//! Provisioning operations.
//!
//! Each operation follows the same shape: load the instance, guard its
//! status, perform the remote side effect (skipping it when the remote
//! side already reflects it), confirm through the poller, and only then
//! apply exactly one lifecycle transition. A crash between side effect
//! and transition is recovered by re-invoking the same operation; the
//! already-exists and already-absent checks keep the retry idempotent.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, info, instrument};

use crate::config::ProvisionConfig;
use crate::engine::poll::Poller;
use crate::engine::reconcile::Reconciler;
use crate::error::{Error, Result};
use crate::remote::{MetricLensState, MetricLensTable, MonitoringElement, NewMetricLens};
use crate::rules::FilterRequest;
use crate::shutdown::ShutdownCoordinator;
use crate::storage::InstanceStore;
use crate::workflow::{ProvisionInstance, Status, Transition};

/// How an operation invocation ended.
///
/// A timed-out confirmation is not an error: the instance keeps its
/// status and the caller is expected to re-invoke the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Remote effect confirmed; the transition was applied.
    Completed { transition: Transition },
    /// The confirmation poll budget ran out. No transition applied.
    TimedOut { waited: Duration },
    /// The operation had nothing to do for the current status.
    Skipped { status: Status },
}

/// Observed convergence of the metric lens enable toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LensConvergence {
    /// Lens is enabled and reporting a healthy status.
    Converged,
    /// Lens was disabled and unhealthy; enable was written and a
    /// poll-now fired. Convergence is observed on a later invocation.
    EnableRequested,
    /// Neither converged nor actionable this cycle.
    Pending,
}

/// Drives provision instances through their lifecycle against one
/// monitoring element.
pub struct Provisioner {
    element: Arc<dyn MonitoringElement>,
    store: Arc<dyn InstanceStore>,
    config: ProvisionConfig,
    shutdown: Option<Arc<ShutdownCoordinator>>,
}

impl Provisioner {
    /// Create a provisioner over an element and an instance store.
    pub fn new(element: Arc<dyn MonitoringElement>, store: Arc<dyn InstanceStore>) -> Self {
        Self {
            element,
            store,
            config: ProvisionConfig::default(),
            shutdown: None,
        }
    }

    /// Override engine tuning (poll interval/budget, refresh delay).
    pub fn with_config(mut self, config: ProvisionConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach a shutdown coordinator so confirmation polls stop between
    /// attempts on shutdown.
    pub fn with_shutdown(mut self, shutdown: Arc<ShutdownCoordinator>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Current status of an instance.
    pub async fn status(&self, instance_id: &str) -> Result<Status> {
        Ok(self.load(instance_id).await?.status)
    }

    /// Apply an externally driven transition (e.g. `draft→ready` or the
    /// `active→deactivate` / `active→reprovision` branch picked by the
    /// caller). Guarded by the state machine like every other change.
    pub async fn apply_transition(
        &self,
        instance_id: &str,
        transition: Transition,
    ) -> Result<Status> {
        let instance = self.load(instance_id).await?;
        self.apply(&instance, transition).await?;
        Ok(transition.to())
    }

    /// Create the remote filter and move `ready → in_progress`.
    ///
    /// If the filter row already exists the submission is skipped, but
    /// the confirmation and transition still run.
    #[instrument(name = "provision.create_filter", skip(self))]
    pub async fn create_filter(&self, instance_id: &str) -> Result<Outcome> {
        let instance = self.load(instance_id).await?;
        if instance.status != Status::Ready {
            return Err(Error::Precondition {
                operation: "create_filter",
                instance_id: instance.id.clone(),
                required: "ready",
                actual: instance.status,
            });
        }

        let name = instance.filter_name().to_string();
        let filters = self.element.filter_table();

        if filters.find_by_name(&name).await?.is_some() {
            info!(filter = %name, "Filter already exists, skipping creation");
        } else {
            let request = FilterRequest::from_spec(&instance.spec);
            self.element.submit_filter_request(&request).await?;
            info!(filter = %name, rules = instance.spec.rules.len(), "Submitted filter creation request");
        }

        let confirmed = {
            let filters = filters.clone();
            let name = name.clone();
            self.poller()
                .poll_until(self.config.poll_timeout(), move || {
                    let filters = filters.clone();
                    let name = name.clone();
                    async move { Ok(filters.find_by_name(&name).await?.is_some()) }
                })
                .await?
        };

        if !confirmed {
            error!(filter = %name, "Failed to detect creation of filter");
            return Ok(Outcome::TimedOut {
                waited: self.config.poll_timeout(),
            });
        }

        self.apply(&instance, Transition::ReadyToInProgress).await?;
        Ok(Outcome::Completed {
            transition: Transition::ReadyToInProgress,
        })
    }

    /// Attach a quality metric lens to the filter and move
    /// `in_progress → active`.
    ///
    /// A fresh lens row is obtained by triggering the element's lens
    /// list refresh, waiting a fixed delay for the row slot to appear,
    /// and filling the slot at the highest key. Once the row is
    /// confirmed, the enable toggle is checked before the transition.
    #[instrument(name = "provision.create_metric_lens", skip(self))]
    pub async fn create_metric_lens(&self, instance_id: &str) -> Result<Outcome> {
        let instance = self.load(instance_id).await?;
        if instance.status != Status::InProgress {
            return Err(Error::Precondition {
                operation: "create_metric_lens",
                instance_id: instance.id.clone(),
                required: "in_progress",
                actual: instance.status,
            });
        }

        let name = instance.filter_name().to_string();
        let lenses = self.element.metric_lens_table();

        if lenses.find_by_filter(&name).await?.is_some() {
            info!(filter = %name, "Metric lens already exists, skipping creation");
            self.apply(&instance, Transition::InProgressToActive).await?;
            return Ok(Outcome::Completed {
                transition: Transition::InProgressToActive,
            });
        }

        self.element.refresh_lens_list().await?;
        // The refresh appends the new row slot asynchronously.
        sleep(self.config.lens_refresh_delay()).await;

        let key = lenses
            .primary_keys()
            .await?
            .into_iter()
            .max()
            .ok_or_else(|| {
                Error::Remote("metric lens table has no row slot after refresh".to_string())
            })?;
        lenses.fill_row(key, &NewMetricLens::quality(&name)).await?;
        info!(filter = %name, key, "Filled metric lens row");

        let confirmed = {
            let lenses = lenses.clone();
            let name = name.clone();
            self.poller()
                .poll_until(self.config.poll_timeout(), move || {
                    let lenses = lenses.clone();
                    let name = name.clone();
                    async move { Ok(lenses.find_by_filter(&name).await?.is_some()) }
                })
                .await?
        };

        if !confirmed {
            error!(filter = %name, "Unable to detect metric lens creation");
            return Ok(Outcome::TimedOut {
                waited: self.config.poll_timeout(),
            });
        }

        let convergence = self.check_lens(&lenses, &name).await?;
        info!(filter = %name, ?convergence, "Metric lens check");

        self.apply(&instance, Transition::InProgressToActive).await?;
        Ok(Outcome::Completed {
            transition: Transition::InProgressToActive,
        })
    }

    /// Tear down the filter and its lens, then move
    /// `deactivate → complete` or `reprovision → ready` depending on
    /// the entry status. Any other status is reported as success
    /// without touching the remote side.
    #[instrument(name = "provision.deactivate", skip(self))]
    pub async fn deactivate(&self, instance_id: &str) -> Result<Outcome> {
        let instance = self.load(instance_id).await?;

        let transition = match instance.status {
            Status::Deactivate => Transition::DeactivateToComplete,
            Status::Reprovision => Transition::ReprovisionToReady,
            other => {
                info!(instance = %instance.id, status = %other, "Skipping deactivation for current status");
                return Ok(Outcome::Skipped { status: other });
            }
        };

        let reconciler = Arc::new(Reconciler::new(
            self.element.filter_table(),
            self.element.metric_lens_table(),
            instance.filter_name(),
        ));

        let confirmed = {
            let reconciler = reconciler.clone();
            self.poller()
                .poll_until(self.config.poll_timeout(), move || {
                    let reconciler = reconciler.clone();
                    async move { Ok(reconciler.reconcile().await?.done()) }
                })
                .await?
        };

        if !confirmed {
            error!(filter = %instance.filter_name(), "Failed to detect deletion of filter and lens");
            return Ok(Outcome::TimedOut {
                waited: self.config.poll_timeout(),
            });
        }

        self.apply(&instance, transition).await?;
        Ok(Outcome::Completed { transition })
    }

    /// Read the lens enable toggle and push it towards convergence.
    ///
    /// Disabled and unhealthy: write enabled, fire poll-now. Enabled
    /// and healthy: converged. Anything else is left for a later
    /// invocation to observe.
    async fn check_lens(
        &self,
        lenses: &Arc<dyn MetricLensTable>,
        filter_name: &str,
    ) -> Result<LensConvergence> {
        let Some(row) = lenses.find_by_filter(filter_name).await? else {
            return Ok(LensConvergence::Pending);
        };

        match (row.state, row.status) {
            (MetricLensState::Disabled, status) if !status.is_healthy() => {
                lenses.set_state(&row.key, MetricLensState::Enabled).await?;
                lenses.fire_poll_now(&row.key).await?;
                info!(filter = %filter_name, key = %row.key, "Enabled metric lens and requested poll");
                Ok(LensConvergence::EnableRequested)
            }
            (MetricLensState::Enabled, status) if status.is_healthy() => {
                info!(filter = %filter_name, "Metric lens fully set up");
                Ok(LensConvergence::Converged)
            }
            _ => Ok(LensConvergence::Pending),
        }
    }

    fn poller(&self) -> Poller {
        let mut poller = Poller::new().with_interval(self.config.poll_interval());
        if let Some(shutdown) = &self.shutdown {
            poller = poller.with_shutdown(shutdown.clone());
        }
        poller
    }

    async fn load(&self, instance_id: &str) -> Result<ProvisionInstance> {
        self.store
            .get(instance_id)
            .await?
            .ok_or_else(|| Error::InstanceNotFound(instance_id.to_string()))
    }

    async fn apply(&self, instance: &ProvisionInstance, transition: Transition) -> Result<()> {
        let next = transition.apply(instance.status)?;
        self.store.set_status(&instance.id, next).await?;
        self.store.record_transition(&instance.id, transition).await?;
        info!(instance = %instance.id, transition = %transition, "Applied transition");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{FilterTable, MemoryElement, MetricLensStatus};
    use crate::storage::SqliteInstanceStore;
    use crate::workflow::{InstanceSpec, ProvisionInstance, RuleRecord};

    fn fast_config() -> ProvisionConfig {
        ProvisionConfig {
            poll_interval_seconds: 0,
            poll_timeout_seconds: 30,
            lens_refresh_delay_seconds: 0,
        }
    }

    fn zero_budget_config() -> ProvisionConfig {
        ProvisionConfig {
            poll_interval_seconds: 0,
            poll_timeout_seconds: 0,
            lens_refresh_delay_seconds: 0,
        }
    }

    fn spec(name: &str) -> InstanceSpec {
        InstanceSpec {
            name: name.to_string(),
            element: "QoE Platform - Test".to_string(),
            filter_type: "create_filter".to_string(),
            category: "CONTENT".to_string(),
            subcategory: "Asset".to_string(),
            enabled: true,
            rules: vec![
                RuleRecord {
                    field: "Asset Name".to_string(),
                    key: String::new(),
                    operator: "contains".to_string(),
                    value: "Live-1234".to_string(),
                    group: "1".to_string(),
                },
                RuleRecord {
                    field: "Asset Name".to_string(),
                    key: String::new(),
                    operator: "contains".to_string(),
                    value: "Live-5678".to_string(),
                    group: "2".to_string(),
                },
            ],
        }
    }

    async fn setup(
        name: &str,
        status: Status,
    ) -> (Provisioner, MemoryElement, Arc<SqliteInstanceStore>, String) {
        let element = MemoryElement::new();
        let store = Arc::new(SqliteInstanceStore::open_in_memory().unwrap());

        let mut instance = ProvisionInstance::new(spec(name));
        instance.status = status;
        store.save(&instance).await.unwrap();

        let provisioner = Provisioner::new(Arc::new(element.clone()), store.clone())
            .with_config(fast_config());
        (provisioner, element, store, instance.id)
    }

    #[tokio::test]
    async fn test_create_filter_submits_compiles_and_transitions() {
        let (provisioner, element, store, id) = setup("eventA", Status::Ready).await;

        let outcome = provisioner.create_filter(&id).await.unwrap();

        assert_eq!(
            outcome,
            Outcome::Completed {
                transition: Transition::ReadyToInProgress
            }
        );
        assert_eq!(
            store.get(&id).await.unwrap().unwrap().status,
            Status::InProgress
        );

        let requests = element.submitted_requests();
        assert_eq!(requests.len(), 1);
        let tree = &requests[0].request.rules;
        assert_eq!(tree.op, "and");
        assert_eq!(tree.rules.len(), 2);
        assert_eq!(tree.rules[0].rules[0].value, "Live-1234");
        assert_eq!(tree.rules[1].rules[0].value, "Live-5678");
    }

    #[tokio::test]
    async fn test_create_filter_skips_submission_but_still_transitions() {
        let (provisioner, element, store, id) = setup("eventA", Status::Ready).await;
        element.insert_filter("eventA");

        let outcome = provisioner.create_filter(&id).await.unwrap();

        assert!(matches!(outcome, Outcome::Completed { .. }));
        assert!(element.submitted_requests().is_empty());
        assert_eq!(
            store.get(&id).await.unwrap().unwrap().status,
            Status::InProgress
        );
    }

    #[tokio::test]
    async fn test_create_filter_precondition_failure_touches_nothing() {
        let (provisioner, element, store, id) = setup("eventA", Status::Draft).await;

        let err = provisioner.create_filter(&id).await.unwrap_err();

        assert_eq!(err.code(), "PRECONDITION_FAILED");
        assert!(element.submitted_requests().is_empty());
        assert_eq!(store.get(&id).await.unwrap().unwrap().status, Status::Draft);
    }

    #[tokio::test]
    async fn test_create_filter_unknown_instance() {
        let (provisioner, _, _, _) = setup("eventA", Status::Ready).await;

        let err = provisioner.create_filter("no-such-id").await.unwrap_err();
        assert_eq!(err.code(), "INSTANCE_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_create_filter_times_out_without_transition() {
        let element = MemoryElement::new();
        element.hold_filter_requests(true);
        let store = Arc::new(SqliteInstanceStore::open_in_memory().unwrap());

        let mut instance = ProvisionInstance::new(spec("eventA"));
        instance.status = Status::Ready;
        store.save(&instance).await.unwrap();

        let provisioner = Provisioner::new(Arc::new(element.clone()), store.clone())
            .with_config(zero_budget_config());

        let outcome = provisioner.create_filter(&instance.id).await.unwrap();

        assert!(matches!(outcome, Outcome::TimedOut { .. }));
        // Request went out, but the status must not advance.
        assert_eq!(element.submitted_requests().len(), 1);
        assert_eq!(
            store.get(&instance.id).await.unwrap().unwrap().status,
            Status::Ready
        );
    }

    #[tokio::test]
    async fn test_create_filter_remote_error_aborts() {
        let (provisioner, element, store, id) = setup("eventA", Status::Ready).await;
        element.set_query_failure(true);

        let err = provisioner.create_filter(&id).await.unwrap_err();

        assert_eq!(err.code(), "REMOTE_ERROR");
        assert_eq!(store.get(&id).await.unwrap().unwrap().status, Status::Ready);
    }

    #[tokio::test]
    async fn test_create_metric_lens_fills_fresh_slot_and_transitions() {
        let (provisioner, element, store, id) = setup("eventA", Status::InProgress).await;

        let outcome = provisioner.create_metric_lens(&id).await.unwrap();

        assert_eq!(
            outcome,
            Outcome::Completed {
                transition: Transition::InProgressToActive
            }
        );
        assert_eq!(element.refresh_count(), 1);
        assert_eq!(
            store.get(&id).await.unwrap().unwrap().status,
            Status::Active
        );

        let row = element.find_by_filter("eventA").await.unwrap().unwrap();
        assert_eq!(row.dimension, "Assets");
        assert_eq!(row.lens_type, "Quality MetricLens");
        assert_eq!(row.state, MetricLensState::Enabled);
    }

    #[tokio::test]
    async fn test_create_metric_lens_skips_existing_but_still_transitions() {
        let (provisioner, element, store, id) = setup("eventA", Status::InProgress).await;
        element.insert_lens("eventA", MetricLensState::Enabled, MetricLensStatus::Ok);

        let outcome = provisioner.create_metric_lens(&id).await.unwrap();

        assert!(matches!(outcome, Outcome::Completed { .. }));
        assert_eq!(element.refresh_count(), 0);
        assert_eq!(
            store.get(&id).await.unwrap().unwrap().status,
            Status::Active
        );
    }

    #[tokio::test]
    async fn test_create_metric_lens_requires_in_progress() {
        let (provisioner, _, _, id) = setup("eventA", Status::Active).await;

        let err = provisioner.create_metric_lens(&id).await.unwrap_err();
        assert_eq!(err.code(), "PRECONDITION_FAILED");
    }

    #[tokio::test]
    async fn test_check_lens_enables_disabled_unhealthy_lens() {
        let (provisioner, element, _, _) = setup("eventA", Status::InProgress).await;
        element.insert_lens("eventA", MetricLensState::Disabled, MetricLensStatus::Error);
        let lenses = element.metric_lens_table();

        let convergence = provisioner.check_lens(&lenses, "eventA").await.unwrap();

        assert_eq!(convergence, LensConvergence::EnableRequested);
        assert_eq!(element.poll_now_count(), 1);
        let row = element.find_by_filter("eventA").await.unwrap().unwrap();
        assert_eq!(row.state, MetricLensState::Enabled);
    }

    #[tokio::test]
    async fn test_check_lens_converged() {
        let (provisioner, element, _, _) = setup("eventA", Status::InProgress).await;
        element.insert_lens("eventA", MetricLensState::Enabled, MetricLensStatus::WarmUp);
        let lenses = element.metric_lens_table();

        let convergence = provisioner.check_lens(&lenses, "eventA").await.unwrap();

        assert_eq!(convergence, LensConvergence::Converged);
        assert_eq!(element.poll_now_count(), 0);
    }

    #[tokio::test]
    async fn test_check_lens_other_combinations_are_noops() {
        let (provisioner, element, _, _) = setup("eventA", Status::InProgress).await;
        let lenses = element.metric_lens_table();

        // No row at all.
        assert_eq!(
            provisioner.check_lens(&lenses, "eventA").await.unwrap(),
            LensConvergence::Pending
        );

        // Enabled but unhealthy: wait for the remote side.
        element.insert_lens("eventA", MetricLensState::Enabled, MetricLensStatus::Error);
        assert_eq!(
            provisioner.check_lens(&lenses, "eventA").await.unwrap(),
            LensConvergence::Pending
        );

        // Disabled but already healthy: nothing to push.
        element.set_lens_health("eventA", MetricLensState::Disabled, MetricLensStatus::Ok);
        assert_eq!(
            provisioner.check_lens(&lenses, "eventA").await.unwrap(),
            LensConvergence::Pending
        );
        assert_eq!(element.poll_now_count(), 0);
    }

    #[tokio::test]
    async fn test_deactivate_from_deactivate_completes() {
        let (provisioner, element, store, id) = setup("eventA", Status::Deactivate).await;
        element.insert_filter("eventA");
        element.insert_lens("eventA", MetricLensState::Enabled, MetricLensStatus::Ok);

        let outcome = provisioner.deactivate(&id).await.unwrap();

        assert_eq!(
            outcome,
            Outcome::Completed {
                transition: Transition::DeactivateToComplete
            }
        );
        assert_eq!(
            store.get(&id).await.unwrap().unwrap().status,
            Status::Complete
        );
        assert_eq!(element.delete_fire_count(), 2);
        assert!(element.find_by_name("eventA").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_deactivate_from_reprovision_returns_to_ready() {
        let (provisioner, element, store, id) = setup("eventA", Status::Reprovision).await;
        element.insert_filter("eventA");

        let outcome = provisioner.deactivate(&id).await.unwrap();

        assert_eq!(
            outcome,
            Outcome::Completed {
                transition: Transition::ReprovisionToReady
            }
        );
        assert_eq!(store.get(&id).await.unwrap().unwrap().status, Status::Ready);
    }

    #[tokio::test]
    async fn test_deactivate_outside_required_statuses_is_a_successful_skip() {
        let (provisioner, element, store, id) = setup("eventA", Status::Active).await;
        element.insert_filter("eventA");

        let outcome = provisioner.deactivate(&id).await.unwrap();

        assert_eq!(
            outcome,
            Outcome::Skipped {
                status: Status::Active
            }
        );
        assert_eq!(element.delete_fire_count(), 0);
        assert_eq!(
            store.get(&id).await.unwrap().unwrap().status,
            Status::Active
        );
    }

    #[tokio::test]
    async fn test_deactivate_with_nothing_to_remove_completes_immediately() {
        let (provisioner, element, store, id) = setup("eventA", Status::Deactivate).await;

        let outcome = provisioner.deactivate(&id).await.unwrap();

        assert!(matches!(outcome, Outcome::Completed { .. }));
        assert_eq!(element.delete_fire_count(), 0);
        assert_eq!(
            store.get(&id).await.unwrap().unwrap().status,
            Status::Complete
        );
    }

    #[tokio::test]
    async fn test_deactivate_two_invocation_convergence() {
        // A zero poll budget makes each invocation a single pass, like
        // a remote side that removes rows slowly.
        let element = MemoryElement::new();
        element.insert_filter("eventA");
        element.insert_lens("eventA", MetricLensState::Enabled, MetricLensStatus::Ok);
        let store = Arc::new(SqliteInstanceStore::open_in_memory().unwrap());

        let mut instance = ProvisionInstance::new(spec("eventA"));
        instance.status = Status::Deactivate;
        store.save(&instance).await.unwrap();

        let provisioner = Provisioner::new(Arc::new(element.clone()), store.clone())
            .with_config(zero_budget_config());

        // First invocation fires both delete triggers and times out.
        let first = provisioner.deactivate(&instance.id).await.unwrap();
        assert!(matches!(first, Outcome::TimedOut { .. }));
        assert_eq!(element.delete_fire_count(), 2);
        assert_eq!(
            store.get(&instance.id).await.unwrap().unwrap().status,
            Status::Deactivate
        );

        // Second invocation finds both rows gone and transitions.
        let second = provisioner.deactivate(&instance.id).await.unwrap();
        assert!(matches!(second, Outcome::Completed { .. }));
        assert_eq!(
            store.get(&instance.id).await.unwrap().unwrap().status,
            Status::Complete
        );
    }

    #[tokio::test]
    async fn test_apply_transition_is_guarded() {
        let (provisioner, _, _, id) = setup("eventA", Status::Draft).await;

        let status = provisioner
            .apply_transition(&id, Transition::DraftToReady)
            .await
            .unwrap();
        assert_eq!(status, Status::Ready);

        let err = provisioner
            .apply_transition(&id, Transition::DraftToReady)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_TRANSITION");
    }

    #[tokio::test]
    async fn test_full_lifecycle_and_reprovision_loop() {
        let (provisioner, element, store, id) = setup("eventA", Status::Draft).await;

        provisioner
            .apply_transition(&id, Transition::DraftToReady)
            .await
            .unwrap();
        provisioner.create_filter(&id).await.unwrap();
        provisioner.create_metric_lens(&id).await.unwrap();
        assert_eq!(provisioner.status(&id).await.unwrap(), Status::Active);

        // Reprovision: tear down, land back in ready, run again.
        provisioner
            .apply_transition(&id, Transition::ActiveToReprovision)
            .await
            .unwrap();
        provisioner.deactivate(&id).await.unwrap();
        assert_eq!(provisioner.status(&id).await.unwrap(), Status::Ready);

        provisioner.create_filter(&id).await.unwrap();
        provisioner.create_metric_lens(&id).await.unwrap();

        // Deactivate for good.
        provisioner
            .apply_transition(&id, Transition::ActiveToDeactivate)
            .await
            .unwrap();
        provisioner.deactivate(&id).await.unwrap();
        assert_eq!(provisioner.status(&id).await.unwrap(), Status::Complete);

        // Complete can re-enter the cycle.
        provisioner
            .apply_transition(&id, Transition::CompleteToReady)
            .await
            .unwrap();
        assert_eq!(provisioner.status(&id).await.unwrap(), Status::Ready);

        // Two full provisions happened.
        assert_eq!(element.submitted_requests().len(), 2);
        let log = store.transitions(&id).await.unwrap();
        assert_eq!(log.len(), 10);
        assert!(element.find_by_name("eventA").await.unwrap().is_none());
    }
}
