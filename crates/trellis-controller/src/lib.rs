//! trellis-controller
//!
//! The reconciliation state machine. One pass per trigger: compute the
//! desired shoot in patch mode, replace the worker collection when it
//! shrank, apply the rest with server-side apply, classify failures, and
//! decide whether to requeue, stop with a persisted error condition, or
//! advance to the next phase.
//!
//! The surrounding dispatcher guarantees at most one active pass per
//! runtime; this crate performs no internal parallelism.

pub mod fsm;
pub mod metrics;
pub mod status;

pub use crate::fsm::transition::{Outcome, PatchEvent, State};
pub use crate::fsm::{ReconcileConfig, StateMachine, Step, SystemState};
pub use crate::metrics::{Metrics, NoopMetrics};
pub use crate::status::{KubeRuntimeStatusWriter, RuntimeStatusWriter};
