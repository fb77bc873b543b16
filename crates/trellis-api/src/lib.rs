//! trellis-api
//!
//! Typed API model shared by the controller and the restore tooling:
//! - `Runtime` — the declarative description of a managed cluster
//! - `Shoot` — the Gardener provisioning object derived from a Runtime
//! - `OpenIDConnect` — auxiliary authenticator resource restored into
//!   managed clusters

pub mod gardener;
pub mod oidc;
pub mod runtime;

pub use crate::gardener::{Shoot, ShootSpec, Worker};
pub use crate::oidc::OpenIDConnect;
pub use crate::runtime::{Runtime, RuntimeSpec};
