//! trellis-restore
//!
//! Recovery tooling for risky shoot mutations. A backup snapshot taken
//! before the mutation holds the pre-mutation shoot (carrying the baseline
//! generation) and the intended post-mutation shoot. This crate classifies
//! how far the live object has drifted from that baseline and restores the
//! intended state only when exactly one uncaptured change happened.
//!
//! Public API:
//! - `classify()` — generation-drift classification
//! - `BackupReader` — load a snapshot from disk
//! - `RestoreWorkflow` — sequential batch restore with per-target results
//! - `OutputWriter` — persist the batch report

pub mod access;
pub mod backup;
pub mod drift;
pub mod error;
pub mod output;
pub mod results;
pub mod workflow;

pub use crate::access::{ClusterAccess, ClusterClient, KubeClusterAccess};
pub use crate::backup::{BackupReader, RuntimeBackup};
pub use crate::drift::{classify, DriftOutcome};
pub use crate::error::{DriftError, RestoreError};
pub use crate::output::OutputWriter;
pub use crate::results::{Results, RuntimeResult, Status};
pub use crate::workflow::RestoreWorkflow;
