//! Scoped clients for the managed clusters themselves.
//!
//! Auxiliary objects (cluster role bindings, OIDC authenticators) live
//! inside the managed cluster, not on the provisioning control plane. The
//! accessor turns a runtime id into a client for that cluster.

use std::sync::Arc;

use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::api::rbac::v1::ClusterRoleBinding;
use kube::api::{Api, PostParams};
use kube::config::{KubeConfigOptions, Kubeconfig};

use trellis_api::OpenIDConnect;
use trellis_gardener::client::BoxFuture;
use trellis_gardener::error::GardenApiError;

/// Applies the small, fully-owned auxiliary objects via plain update.
pub trait ClusterClient: Send + Sync {
    fn update_cluster_role_binding<'a>(
        &'a self,
        crb: &'a ClusterRoleBinding,
    ) -> BoxFuture<'a, Result<(), GardenApiError>>;

    fn update_open_id_connect<'a>(
        &'a self,
        oidc: &'a OpenIDConnect,
    ) -> BoxFuture<'a, Result<(), GardenApiError>>;
}

pub trait ClusterAccess: Send + Sync {
    fn client_for<'a>(
        &'a self,
        runtime_id: &'a str,
    ) -> BoxFuture<'a, Result<Arc<dyn ClusterClient>, GardenApiError>>;
}

/// Builds managed-cluster clients from the `kubeconfig-<runtime-id>` secret
/// stored on the control plane.
pub struct KubeClusterAccess {
    control_plane: kube::Client,
    namespace: String,
}

impl KubeClusterAccess {
    pub fn new(control_plane: kube::Client, namespace: &str) -> Self {
        Self {
            control_plane,
            namespace: namespace.to_string(),
        }
    }
}

impl ClusterAccess for KubeClusterAccess {
    fn client_for<'a>(
        &'a self,
        runtime_id: &'a str,
    ) -> BoxFuture<'a, Result<Arc<dyn ClusterClient>, GardenApiError>> {
        Box::pin(async move {
            let secrets: Api<Secret> =
                Api::namespaced(self.control_plane.clone(), &self.namespace);
            let secret = secrets.get(&format!("kubeconfig-{runtime_id}")).await?;

            let raw = secret
                .data
                .as_ref()
                .and_then(|data| data.get("config"))
                .ok_or_else(|| {
                    GardenApiError::Api(format!(
                        "kubeconfig secret for runtime {runtime_id} has no config key"
                    ))
                })?;
            let text = std::str::from_utf8(&raw.0)
                .map_err(|err| GardenApiError::Api(format!("kubeconfig is not UTF-8: {err}")))?;

            let kubeconfig = Kubeconfig::from_yaml(text)
                .map_err(|err| GardenApiError::Api(format!("kubeconfig is malformed: {err}")))?;
            let config =
                kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                    .await
                    .map_err(|err| GardenApiError::Api(err.to_string()))?;
            let client = kube::Client::try_from(config)
                .map_err(|err| GardenApiError::Api(err.to_string()))?;

            Ok(Arc::new(KubeClusterClient { client }) as Arc<dyn ClusterClient>)
        })
    }
}

pub struct KubeClusterClient {
    client: kube::Client,
}

impl ClusterClient for KubeClusterClient {
    fn update_cluster_role_binding<'a>(
        &'a self,
        crb: &'a ClusterRoleBinding,
    ) -> BoxFuture<'a, Result<(), GardenApiError>> {
        Box::pin(async move {
            let api: Api<ClusterRoleBinding> = Api::all(self.client.clone());
            let name = crb.metadata.name.clone().unwrap_or_default();
            api.replace(&name, &PostParams::default(), crb)
                .await
                .map(|_| ())
                .map_err(GardenApiError::from)
        })
    }

    fn update_open_id_connect<'a>(
        &'a self,
        oidc: &'a OpenIDConnect,
    ) -> BoxFuture<'a, Result<(), GardenApiError>> {
        Box::pin(async move {
            let api: Api<OpenIDConnect> = Api::all(self.client.clone());
            let name = oidc.metadata.name.clone().unwrap_or_default();
            api.replace(&name, &PostParams::default(), oidc)
                .await
                .map(|_| ())
                .map_err(GardenApiError::from)
        })
    }
}
