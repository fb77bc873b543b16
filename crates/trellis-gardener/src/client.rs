//! Narrow seam over the Gardener API.
//!
//! Every submission uses a fixed field-manager identity; apply-patches force
//! ownership, so this actor wins the field conflicts it initiates. Every
//! call is bounded by an explicit timeout.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use kube::api::{Api, Patch, PatchParams, PostParams};
use tracing::debug;

use trellis_api::Shoot;

use crate::error::{format_err_chain, GardenApiError};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Shoot operations the reconciler and the restore workflow need. Methods
/// return boxed futures for dyn compatibility.
pub trait ShootClient: Send + Sync {
    /// Fetch the live shoot by name.
    fn get_shoot<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<Shoot, GardenApiError>>;

    /// List every shoot in the project namespace.
    fn list_shoots(&self) -> BoxFuture<'_, Result<Vec<Shoot>, GardenApiError>>;

    /// Full update. Used where patch semantics cannot express the change
    /// (shrinking a sub-collection).
    fn update_shoot<'a>(&'a self, shoot: &'a Shoot) -> BoxFuture<'a, Result<Shoot, GardenApiError>>;

    /// Server-side apply-patch with force ownership. Returns the server's
    /// resulting object so callers can read the post-apply generation.
    fn apply_shoot<'a>(&'a self, shoot: &'a Shoot) -> BoxFuture<'a, Result<Shoot, GardenApiError>>;
}

pub struct KubeShootClient {
    api: Api<Shoot>,
    field_manager: String,
    timeout: Duration,
}

impl KubeShootClient {
    pub fn new(client: kube::Client, namespace: &str, field_manager: &str, timeout: Duration) -> Self {
        Self {
            api: Api::namespaced(client, namespace),
            field_manager: field_manager.to_string(),
            timeout,
        }
    }

    async fn bounded<T>(
        &self,
        fut: impl Future<Output = Result<T, kube::Error>>,
    ) -> Result<T, GardenApiError> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(classify),
            Err(_) => Err(GardenApiError::Timeout(self.timeout)),
        }
    }
}

fn classify(err: kube::Error) -> GardenApiError {
    match err {
        kube::Error::Api(resp) if resp.code == 409 => GardenApiError::Conflict(resp.message),
        kube::Error::Api(resp) if resp.code == 403 => GardenApiError::Forbidden(resp.message),
        kube::Error::Api(resp) if resp.code == 404 => GardenApiError::NotFound(resp.message),
        other => GardenApiError::Api(format_err_chain(&other)),
    }
}

impl From<kube::Error> for GardenApiError {
    fn from(err: kube::Error) -> Self {
        classify(err)
    }
}

fn name_of(shoot: &Shoot) -> String {
    shoot.metadata.name.clone().unwrap_or_default()
}

impl ShootClient for KubeShootClient {
    fn get_shoot<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<Shoot, GardenApiError>> {
        Box::pin(async move { self.bounded(self.api.get(name)).await })
    }

    fn list_shoots(&self) -> BoxFuture<'_, Result<Vec<Shoot>, GardenApiError>> {
        Box::pin(async move {
            let list = self
                .bounded(self.api.list(&kube::api::ListParams::default()))
                .await?;
            Ok(list.items)
        })
    }

    fn update_shoot<'a>(&'a self, shoot: &'a Shoot) -> BoxFuture<'a, Result<Shoot, GardenApiError>> {
        Box::pin(async move {
            let name = name_of(shoot);
            debug!(shoot = %name, "updating shoot");
            let params = PostParams {
                field_manager: Some(self.field_manager.clone()),
                ..PostParams::default()
            };
            self.bounded(self.api.replace(&name, &params, shoot)).await
        })
    }

    fn apply_shoot<'a>(&'a self, shoot: &'a Shoot) -> BoxFuture<'a, Result<Shoot, GardenApiError>> {
        Box::pin(async move {
            let name = name_of(shoot);
            debug!(shoot = %name, "applying shoot");
            let params = PatchParams::apply(&self.field_manager).force();
            self.bounded(self.api.patch(&name, &params, &Patch::Apply(shoot)))
                .await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(code: u16) -> kube::Error {
        kube::Error::Api(kube::core::ErrorResponse {
            status: "Failure".into(),
            message: "remote said no".into(),
            reason: "Test".into(),
            code,
        })
    }

    #[test]
    fn conflict_and_forbidden_are_transient() {
        assert!(classify(api_error(409)).is_transient());
        assert!(classify(api_error(403)).is_transient());
        assert!(!classify(api_error(404)).is_transient());
        assert!(!classify(api_error(500)).is_transient());
    }

    #[test]
    fn timeout_is_not_transient() {
        let err = GardenApiError::Timeout(Duration::from_secs(20));
        assert!(!err.is_transient());
    }
}
