//! The patch-shoot pass: one full converge attempt against the remote API.

use tracing::{error, info, warn};

use trellis_api::gardener::{MachineImage, Worker};
use trellis_api::runtime::{ConditionReason, ConditionType};
use trellis_api::Shoot;
use trellis_gardener::auditlog::AuditLogData;
use trellis_gardener::converter::{Converter, PatchOpts};
use trellis_gardener::error::{ConverterError, GardenApiError};
use trellis_gardener::workers::pools_equal;

use super::transition::{self, Outcome, PatchEvent, State};
use super::{StateMachine, Step, SystemState};

const MSG_FAILED_AUDIT_LOG: &str = "Failed to configure audit logs";
const MSG_CONVERSION_ERROR: &str = "Runtime conversion error";
const MSG_SHOOT_PENDING: &str = "Shoot is pending for update";

pub(crate) async fn run(m: &StateMachine, s: &mut SystemState) -> Step {
    let shoot_name = s.shoot.metadata.name.clone().unwrap_or_default();
    info!(shoot = %shoot_name, "patch shoot state");

    let audit_log_data = match m.audit_log.get_audit_log_data(
        &s.runtime.spec.shoot.provider.provider_type,
        &s.runtime.spec.shoot.region,
    ) {
        Ok(data) => Some(data),
        Err(err) => {
            let event = PatchEvent::AuditLogUnavailable {
                mandatory: m.config.audit_log_mandatory,
            };
            match transition::next(State::PatchShoot, event) {
                Outcome::Proceed => {
                    warn!(error = %err, "audit log data unavailable, continuing without it");
                    None
                }
                outcome => {
                    error!(error = %err, "failed to resolve audit log data");
                    return conclude(m, s, outcome, MSG_FAILED_AUDIT_LOG).await;
                }
            }
        }
    };

    if let Err(err) = s.runtime.validate_required_labels() {
        error!(error = %err, "runtime failed validation, exiting with no retry");
        let outcome = transition::next(State::PatchShoot, PatchEvent::ValidationFailed);
        return conclude(m, s, outcome, MSG_CONVERSION_ERROR).await;
    }

    let updated_shoot = match convert_patch(m, s, audit_log_data) {
        Ok(shoot) => shoot,
        Err(err) => {
            error!(error = %err, "failed to convert runtime to shoot, exiting with no retry");
            let outcome = transition::next(State::PatchShoot, PatchEvent::ConversionFailed);
            return conclude(m, s, outcome, MSG_CONVERSION_ERROR).await;
        }
    };
    info!(
        shoot = %shoot_name,
        namespace = %updated_shoot.metadata.namespace.clone().unwrap_or_default(),
        "shoot converted successfully"
    );

    // An apply-patch cannot shrink the worker collection, only grow or
    // modify it. A removed pool therefore needs a full update of just that
    // sub-collection first.
    if !pools_equal(
        &s.shoot.spec.provider.workers,
        &updated_shoot.spec.provider.workers,
    ) {
        let mut replacement = s.shoot.clone();
        replacement.spec.provider.workers = updated_shoot.spec.provider.workers.clone();

        if let Err(err) = m.shoot_client.update_shoot(&replacement).await {
            return handle_api_error(m, s, err, |transient| PatchEvent::WorkerReplaceFailed {
                transient,
            })
            .await;
        }
    }

    let applied = match m.shoot_client.apply_shoot(&updated_shoot).await {
        Ok(applied) => applied,
        Err(err) => {
            return handle_api_error(m, s, err, |transient| PatchEvent::ApplyFailed { transient })
                .await;
        }
    };

    if s.runtime.should_force_reconciliation() {
        info!("force reconciliation marker found, clearing it before continuing");
        s.runtime.clear_force_reconciliation();
        if let Err(err) = m.status.update(&s.runtime).await {
            error!(error = %err, "could not clear the force reconciliation marker, scheduling retry");
            let outcome = transition::next(State::PatchShoot, PatchEvent::MarkerClearFailed);
            return conclude(m, s, outcome, "").await;
        }
    }

    if applied.generation() == s.shoot.generation() {
        info!(shoot = %shoot_name, "shoot did not change after patch, advancing");
        let outcome = transition::next(State::PatchShoot, PatchEvent::Converged);
        return conclude(m, s, outcome, "").await;
    }

    info!(shoot = %shoot_name, "shoot patched successfully, remote is still reconciling");
    let outcome = transition::next(State::PatchShoot, PatchEvent::MutationPending);
    conclude(m, s, outcome, MSG_SHOOT_PENDING).await
}

fn convert_patch(
    m: &StateMachine,
    s: &SystemState,
    audit_log_data: Option<AuditLogData>,
) -> Result<Shoot, ConverterError> {
    let current = &s.shoot;
    let image = current_image(&current.spec.provider.workers);

    let opts = PatchOpts {
        config: m.config.converter.clone(),
        audit_log_data,
        zones: current_zones(&current.spec.provider.workers),
        shoot_kubernetes_version: current.spec.kubernetes.version.clone(),
        shoot_image_name: image.map(|i| i.name.clone()),
        shoot_image_version: image.and_then(|i| i.version.clone()),
        extensions: current.spec.extensions.clone().unwrap_or_default(),
        resources: current.spec.resources.clone().unwrap_or_default(),
        infrastructure_config: current.spec.provider.infrastructure_config.clone(),
        control_plane_config: current.spec.provider.control_plane_config.clone(),
    };

    Converter::for_patch(opts).to_shoot(&s.runtime)
}

/// Zones currently in use, in order of first appearance across the pools.
fn current_zones(workers: &[Worker]) -> Vec<String> {
    let mut zones: Vec<String> = Vec::new();
    for worker in workers {
        for zone in &worker.zones {
            if !zones.contains(zone) {
                zones.push(zone.clone());
            }
        }
    }
    zones
}

fn current_image(workers: &[Worker]) -> Option<&MachineImage> {
    workers.first().and_then(|w| w.machine.image.as_ref())
}

async fn handle_api_error(
    m: &StateMachine,
    s: &mut SystemState,
    err: GardenApiError,
    make_event: impl FnOnce(bool) -> PatchEvent,
) -> Step {
    let transient = err.is_transient();
    if transient {
        info!(error = %err, "shoot is outdated or access was refused, retrying");
    } else {
        error!(error = %err, "failed to patch shoot, exiting with no retry");
    }

    let message = format!("Gardener API shoot patch error: {err}");
    let outcome = transition::next(State::PatchShoot, make_event(transient));
    conclude(m, s, outcome, &message).await
}

/// Execute the effect the transition table decided on.
async fn conclude(m: &StateMachine, s: &mut SystemState, outcome: Outcome, message: &str) -> Step {
    match outcome {
        Outcome::Proceed => {
            // Proceed is resolved at the call site; reaching it here means
            // the table and the pass disagree. Retry rather than guess.
            Step::RequeueAfter(m.config.requeue_after)
        }
        Outcome::Advance(state) => Step::Transition(state),
        Outcome::Requeue => Step::RequeueAfter(m.config.requeue_after),
        Outcome::Pending => {
            s.runtime.update_state_pending(
                ConditionType::RuntimeProvisioned,
                ConditionReason::Processing,
                "Unknown",
                message,
            );
            if let Err(err) = m.status.update_status(&s.runtime).await {
                error!(error = %err, "failed to persist pending status, scheduling retry");
            }
            Step::RequeueAfter(m.config.requeue_after)
        }
        Outcome::Stop { reason } => {
            m.metrics.inc_fsm_stop_counter();
            s.runtime.update_state_pending(
                ConditionType::RuntimeProvisioned,
                reason,
                "False",
                message,
            );
            if let Err(err) = m.status.update_status(&s.runtime).await {
                error!(error = %err, "failed to persist failure condition, scheduling retry");
                return Step::RequeueAfter(m.config.requeue_after);
            }
            Step::Stop
        }
    }
}
