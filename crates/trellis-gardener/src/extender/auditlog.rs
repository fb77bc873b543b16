use trellis_api::gardener::{AuditConfig, AuditPolicy, ConfigMapRef, KubeApiServer};
use trellis_api::{Runtime, Shoot};

use crate::error::ConverterError;
use crate::pipeline::Extend;

/// Points the kube-apiserver at the audit policy config map. Installed only
/// when audit-log data was resolved for the runtime's provider and region.
pub struct AuditLogExtender {
    policy_config_map_name: String,
}

impl AuditLogExtender {
    pub fn new(policy_config_map_name: &str) -> Self {
        Self {
            policy_config_map_name: policy_config_map_name.to_string(),
        }
    }
}

impl Extend for AuditLogExtender {
    fn apply(&self, _runtime: &Runtime, shoot: &mut Shoot) -> Result<(), ConverterError> {
        shoot
            .spec
            .kubernetes
            .kube_api_server
            .get_or_insert_with(KubeApiServer::default)
            .audit_config = Some(AuditConfig {
            audit_policy: Some(AuditPolicy {
                config_map_ref: Some(ConfigMapRef {
                    name: self.policy_config_map_name.clone(),
                }),
            }),
        });
        Ok(())
    }
}
