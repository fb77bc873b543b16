//! The pure core of the state machine: named states, the events a pass can
//! observe, and the transition table mapping both onto an effect. Nothing
//! here touches the network, so the table is testable in isolation.

use trellis_api::runtime::ConditionReason;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    /// Initial state of every pass: converge the shoot spec.
    PatchShoot,
    /// Downstream phase (kubeconfig and cluster access sync), driven by the
    /// dispatcher outside this crate.
    SyncClusterAccess,
}

/// Everything the patch-shoot pass can observe, stripped of payload detail
/// the transition decision does not need.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatchEvent {
    AuditLogUnavailable { mandatory: bool },
    ValidationFailed,
    ConversionFailed,
    WorkerReplaceFailed { transient: bool },
    ApplyFailed { transient: bool },
    MarkerClearFailed,
    /// Post-apply generation equals the pre-pass generation.
    Converged,
    /// The remote accepted a mutation and is still reconciling it.
    MutationPending,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Degraded but continuable; the pass carries on.
    Proceed,
    /// Move to the named state.
    Advance(State),
    /// Bounded backoff-requeue with no terminal condition.
    Requeue,
    /// Mark the runtime pending-processing, then requeue.
    Pending,
    /// Persist a failure condition; no automatic retry from here.
    Stop { reason: ConditionReason },
}

pub fn next(state: State, event: PatchEvent) -> Outcome {
    match (state, event) {
        (State::PatchShoot, PatchEvent::AuditLogUnavailable { mandatory: true }) => Outcome::Stop {
            reason: ConditionReason::AuditLogError,
        },
        (State::PatchShoot, PatchEvent::AuditLogUnavailable { mandatory: false }) => {
            Outcome::Proceed
        }
        (State::PatchShoot, PatchEvent::ValidationFailed)
        | (State::PatchShoot, PatchEvent::ConversionFailed) => Outcome::Stop {
            reason: ConditionReason::ConversionError,
        },
        (State::PatchShoot, PatchEvent::WorkerReplaceFailed { transient: true })
        | (State::PatchShoot, PatchEvent::ApplyFailed { transient: true })
        | (State::PatchShoot, PatchEvent::MarkerClearFailed) => Outcome::Requeue,
        (State::PatchShoot, PatchEvent::WorkerReplaceFailed { transient: false })
        | (State::PatchShoot, PatchEvent::ApplyFailed { transient: false }) => Outcome::Stop {
            reason: ConditionReason::ProcessingErr,
        },
        (State::PatchShoot, PatchEvent::Converged) => Outcome::Advance(State::SyncClusterAccess),
        (State::PatchShoot, PatchEvent::MutationPending) => Outcome::Pending,
        // Later phases run outside this crate; no event reaches them here.
        (State::SyncClusterAccess, _) => Outcome::Proceed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_shoot_transition_table() {
        let cases = [
            (
                PatchEvent::AuditLogUnavailable { mandatory: true },
                Outcome::Stop {
                    reason: ConditionReason::AuditLogError,
                },
            ),
            (
                PatchEvent::AuditLogUnavailable { mandatory: false },
                Outcome::Proceed,
            ),
            (
                PatchEvent::ValidationFailed,
                Outcome::Stop {
                    reason: ConditionReason::ConversionError,
                },
            ),
            (
                PatchEvent::ConversionFailed,
                Outcome::Stop {
                    reason: ConditionReason::ConversionError,
                },
            ),
            (
                PatchEvent::WorkerReplaceFailed { transient: true },
                Outcome::Requeue,
            ),
            (
                PatchEvent::WorkerReplaceFailed { transient: false },
                Outcome::Stop {
                    reason: ConditionReason::ProcessingErr,
                },
            ),
            (PatchEvent::ApplyFailed { transient: true }, Outcome::Requeue),
            (
                PatchEvent::ApplyFailed { transient: false },
                Outcome::Stop {
                    reason: ConditionReason::ProcessingErr,
                },
            ),
            (PatchEvent::MarkerClearFailed, Outcome::Requeue),
            (
                PatchEvent::Converged,
                Outcome::Advance(State::SyncClusterAccess),
            ),
            (PatchEvent::MutationPending, Outcome::Pending),
        ];

        for (event, expected) in cases {
            assert_eq!(next(State::PatchShoot, event), expected, "{event:?}");
        }
    }

    #[test]
    fn conflict_is_never_terminal() {
        // The property that matters most: a transient apply failure must not
        // produce a Stop outcome.
        for event in [
            PatchEvent::ApplyFailed { transient: true },
            PatchEvent::WorkerReplaceFailed { transient: true },
        ] {
            assert!(!matches!(
                next(State::PatchShoot, event),
                Outcome::Stop { .. }
            ));
        }
    }
}
