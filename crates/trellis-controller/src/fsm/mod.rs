//! State machine wiring: shared dependencies, per-object state, and the
//! dispatcher-facing `step` surface.

pub mod patch_shoot;
pub mod transition;

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use trellis_api::{Runtime, Shoot};
use trellis_gardener::auditlog::AuditLogDataSource;
use trellis_gardener::client::ShootClient;
use trellis_gardener::config::ConverterConfig;

use crate::metrics::Metrics;
use crate::status::RuntimeStatusWriter;
use transition::State;

#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    /// Field-manager identity for every shoot submission.
    pub field_manager: String,
    /// Backoff used for transient failures and pending mutations.
    pub requeue_after: Duration,
    /// When set, missing audit-log data is a terminal failure instead of a
    /// logged degradation.
    pub audit_log_mandatory: bool,
    pub converter: ConverterConfig,
}

/// Shared dependencies of every reconciliation pass.
pub struct StateMachine {
    pub shoot_client: Arc<dyn ShootClient>,
    pub status: Arc<dyn RuntimeStatusWriter>,
    pub audit_log: Arc<dyn AuditLogDataSource>,
    pub metrics: Arc<dyn Metrics>,
    pub config: ReconcileConfig,
}

/// Per-object state of one pass: the runtime being reconciled and the shoot
/// as observed before the pass ran.
pub struct SystemState {
    pub runtime: Runtime,
    pub shoot: Shoot,
}

/// What the dispatcher should do after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Enter the named state next.
    Transition(State),
    /// Try again after the given delay; nothing terminal happened.
    RequeueAfter(Duration),
    /// A terminal failure condition was persisted; do not retry.
    Stop,
}

impl StateMachine {
    /// Run one state's worth of work. The dispatcher loops on this until it
    /// gets a `Step::Stop` or a transition into a phase it handles itself.
    pub async fn step(&self, state: State, system: &mut SystemState) -> Step {
        match state {
            State::PatchShoot => patch_shoot::run(self, system).await,
            State::SyncClusterAccess => {
                debug!("cluster access sync is driven by the dispatcher");
                Step::Transition(State::SyncClusterAccess)
            }
        }
    }
}
