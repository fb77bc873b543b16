use trellis_api::gardener::{KubeApiServer, OidcConfig};
use trellis_api::{Runtime, Shoot};

use crate::error::ConverterError;
use crate::pipeline::Extend;

/// Wires the kube-apiserver OIDC configuration. The runtime's own settings
/// win; the operator default applies when the runtime is silent.
pub struct OidcExtender {
    default: Option<OidcConfig>,
}

impl OidcExtender {
    pub fn new(default: Option<OidcConfig>) -> Self {
        Self { default }
    }
}

impl Extend for OidcExtender {
    fn apply(&self, runtime: &Runtime, shoot: &mut Shoot) -> Result<(), ConverterError> {
        let oidc = runtime
            .spec
            .shoot
            .kubernetes
            .kube_api_server
            .as_ref()
            .and_then(|s| s.oidc_config.clone())
            .or_else(|| self.default.clone());

        let Some(oidc) = oidc else {
            return Ok(());
        };

        shoot
            .spec
            .kubernetes
            .kube_api_server
            .get_or_insert_with(KubeApiServer::default)
            .oidc_config = Some(oidc);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use trellis_api::gardener::KubeApiServer as RuntimeKas;
    use trellis_api::runtime::RuntimeSpec;

    use super::*;

    fn default_oidc() -> OidcConfig {
        OidcConfig {
            client_id: Some("operator-client".into()),
            issuer_url: Some("https://auth.example.com".into()),
            ..Default::default()
        }
    }

    #[test]
    fn runtime_oidc_wins_over_operator_default() {
        let mut spec = RuntimeSpec::default();
        spec.shoot.kubernetes.kube_api_server = Some(RuntimeKas {
            oidc_config: Some(OidcConfig {
                client_id: Some("tenant-client".into()),
                ..Default::default()
            }),
            audit_config: None,
        });
        let runtime = Runtime::new("rt", spec);
        let mut shoot = Shoot::new("shoot", Default::default());

        OidcExtender::new(Some(default_oidc()))
            .apply(&runtime, &mut shoot)
            .unwrap();

        let oidc = shoot
            .spec
            .kubernetes
            .kube_api_server
            .unwrap()
            .oidc_config
            .unwrap();
        assert_eq!(oidc.client_id.as_deref(), Some("tenant-client"));
    }

    #[test]
    fn operator_default_applies_when_runtime_is_silent() {
        let runtime = Runtime::new("rt", RuntimeSpec::default());
        let mut shoot = Shoot::new("shoot", Default::default());

        OidcExtender::new(Some(default_oidc()))
            .apply(&runtime, &mut shoot)
            .unwrap();

        let oidc = shoot
            .spec
            .kubernetes
            .kube_api_server
            .unwrap()
            .oidc_config
            .unwrap();
        assert_eq!(oidc.client_id.as_deref(), Some("operator-client"));
    }
}
