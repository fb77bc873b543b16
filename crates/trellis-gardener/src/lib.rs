//! trellis-gardener
//!
//! Desired-state conversion from a `Runtime` to a Gardener `Shoot`, plus the
//! conflict-aware protocol for applying the result against the Gardener API.
//!
//! Public API:
//! - `Converter::for_create()` / `Converter::for_patch()` — assemble the
//!   extender pipeline for the two operating modes
//! - `Converter::to_shoot()` — build the target spec and run the pipeline
//! - `ShootClient` — narrow apply/update/get seam over the remote API
//! - `pools_equal()` — structural worker-pool comparison

pub mod auditlog;
pub mod client;
pub mod config;
pub mod converter;
pub mod error;
pub mod extender;
pub mod pipeline;
pub mod workers;

pub use crate::auditlog::{AuditLogData, AuditLogDataSource};
pub use crate::client::{BoxFuture, KubeShootClient, ShootClient};
pub use crate::config::ConverterConfig;
pub use crate::converter::{Converter, CreateOpts, PatchOpts};
pub use crate::error::{AuditLogError, ConverterError, GardenApiError};
pub use crate::pipeline::{Extend, Pipeline};
pub use crate::workers::pools_equal;
