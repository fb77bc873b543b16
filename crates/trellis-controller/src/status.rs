//! Persisting runtime spec and status changes back to the control plane.

use std::time::Duration;

use kube::api::{Api, PostParams};

use trellis_api::Runtime;
use trellis_gardener::client::BoxFuture;
use trellis_gardener::error::GardenApiError;

pub trait RuntimeStatusWriter: Send + Sync {
    /// Persist a spec-level change (e.g. a cleared annotation).
    fn update<'a>(&'a self, runtime: &'a Runtime) -> BoxFuture<'a, Result<(), GardenApiError>>;

    /// Persist the status subresource.
    fn update_status<'a>(&'a self, runtime: &'a Runtime)
        -> BoxFuture<'a, Result<(), GardenApiError>>;
}

pub struct KubeRuntimeStatusWriter {
    api: Api<Runtime>,
    timeout: Duration,
}

impl KubeRuntimeStatusWriter {
    pub fn new(client: kube::Client, namespace: &str, timeout: Duration) -> Self {
        Self {
            api: Api::namespaced(client, namespace),
            timeout,
        }
    }

    async fn bounded<T>(
        &self,
        fut: impl std::future::Future<Output = Result<T, kube::Error>>,
    ) -> Result<T, GardenApiError> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(GardenApiError::from),
            Err(_) => Err(GardenApiError::Timeout(self.timeout)),
        }
    }
}

impl RuntimeStatusWriter for KubeRuntimeStatusWriter {
    fn update<'a>(&'a self, runtime: &'a Runtime) -> BoxFuture<'a, Result<(), GardenApiError>> {
        Box::pin(async move {
            let name = runtime.metadata.name.clone().unwrap_or_default();
            self.bounded(self.api.replace(&name, &PostParams::default(), runtime))
                .await
                .map(|_| ())
        })
    }

    fn update_status<'a>(
        &'a self,
        runtime: &'a Runtime,
    ) -> BoxFuture<'a, Result<(), GardenApiError>> {
        Box::pin(async move {
            let name = runtime.metadata.name.clone().unwrap_or_default();
            let data = serde_json::to_vec(runtime)
                .map_err(|e| GardenApiError::Api(e.to_string()))?;
            self.bounded(self.api.replace_status(&name, &PostParams::default(), data))
                .await
                .map(|_| ())
        })
    }
}
