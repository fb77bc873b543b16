use serde_json::json;

use trellis_api::gardener::Extension;
use trellis_api::{Runtime, Shoot};

use crate::auditlog::AuditLogData;
use crate::error::ConverterError;
use crate::pipeline::Extend;

pub const NETWORKING_FILTER_TYPE: &str = "shoot-networking-filter";
pub const CERT_SERVICE_TYPE: &str = "shoot-cert-service";
pub const DNS_SERVICE_TYPE: &str = "shoot-dns-service";
pub const AUDITLOG_SERVICE_TYPE: &str = "shoot-auditlog-service";

/// Builds the Gardener extension list this system owns.
///
/// Create mode emits the full managed set. Patch mode starts from the
/// shoot's current list and updates managed entries in place, leaving
/// entries owned by other actors untouched and in their original position.
pub struct ExtensionsExtender {
    audit_log_data: Option<AuditLogData>,
    current: Vec<Extension>,
    create: bool,
}

impl ExtensionsExtender {
    pub fn for_create(audit_log_data: Option<AuditLogData>) -> Self {
        Self {
            audit_log_data,
            current: Vec::new(),
            create: true,
        }
    }

    pub fn for_patch(audit_log_data: Option<AuditLogData>, current: Vec<Extension>) -> Self {
        Self {
            audit_log_data,
            current,
            create: false,
        }
    }

    fn managed_extensions(&self, runtime: &Runtime) -> Vec<Extension> {
        let mut managed = vec![
            Extension {
                extension_type: NETWORKING_FILTER_TYPE.to_string(),
                provider_config: None,
                disabled: Some(!runtime.spec.security.networking.filter.egress.enabled),
            },
            Extension {
                extension_type: CERT_SERVICE_TYPE.to_string(),
                provider_config: Some(json!({
                    "apiVersion": "service.cert.extensions.gardener.cloud/v1alpha1",
                    "kind": "CertConfig",
                    "shootIssuers": { "enabled": true },
                })),
                disabled: None,
            },
            Extension {
                extension_type: DNS_SERVICE_TYPE.to_string(),
                provider_config: Some(json!({
                    "apiVersion": "service.dns.extensions.gardener.cloud/v1alpha1",
                    "kind": "DNSConfig",
                    "syncProvidersFromShootSpecDNS": true,
                })),
                disabled: None,
            },
        ];

        if let Some(data) = &self.audit_log_data {
            managed.push(Extension {
                extension_type: AUDITLOG_SERVICE_TYPE.to_string(),
                provider_config: Some(json!({
                    "apiVersion": "service.auditlog.extensions.gardener.cloud/v1alpha1",
                    "kind": "AuditlogConfig",
                    "type": "standard",
                    "tenantID": data.tenant_id,
                    "serviceURL": data.service_url,
                    "secretReferenceName": data.secret_name,
                })),
                disabled: None,
            });
        }

        managed
    }
}

impl Extend for ExtensionsExtender {
    fn apply(&self, runtime: &Runtime, shoot: &mut Shoot) -> Result<(), ConverterError> {
        let managed = self.managed_extensions(runtime);

        if self.create {
            shoot.spec.extensions = Some(managed);
            return Ok(());
        }

        let mut merged = self.current.clone();
        for extension in managed {
            match merged
                .iter_mut()
                .find(|e| e.extension_type == extension.extension_type)
            {
                Some(existing) => *existing = extension,
                None => merged.push(extension),
            }
        }
        shoot.spec.extensions = Some(merged);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use trellis_api::runtime::RuntimeSpec;

    use super::*;

    fn runtime() -> Runtime {
        Runtime::new("rt", RuntimeSpec::default())
    }

    #[test]
    fn create_emits_managed_set_with_optional_auditlog_entry() {
        let mut shoot = Shoot::new("shoot", Default::default());
        ExtensionsExtender::for_create(None)
            .apply(&runtime(), &mut shoot)
            .unwrap();
        let extensions = shoot.spec.extensions.clone().unwrap();
        assert_eq!(extensions.len(), 3);
        assert!(!extensions.iter().any(|e| e.extension_type == AUDITLOG_SERVICE_TYPE));

        let data = AuditLogData {
            tenant_id: "t".into(),
            service_url: "https://audit".into(),
            secret_name: None,
        };
        ExtensionsExtender::for_create(Some(data))
            .apply(&runtime(), &mut shoot)
            .unwrap();
        let extensions = shoot.spec.extensions.unwrap();
        assert!(extensions.iter().any(|e| e.extension_type == AUDITLOG_SERVICE_TYPE));
    }

    #[test]
    fn patch_preserves_foreign_entries_and_their_position() {
        let foreign = Extension {
            extension_type: "shoot-oidc-service".into(),
            provider_config: None,
            disabled: Some(false),
        };
        let stale_filter = Extension {
            extension_type: NETWORKING_FILTER_TYPE.into(),
            provider_config: None,
            disabled: Some(false),
        };

        let mut runtime = runtime();
        runtime.spec.security.networking.filter.egress.enabled = false;
        let mut shoot = Shoot::new("shoot", Default::default());

        ExtensionsExtender::for_patch(None, vec![foreign.clone(), stale_filter])
            .apply(&runtime, &mut shoot)
            .unwrap();

        let extensions = shoot.spec.extensions.unwrap();
        assert_eq!(extensions[0], foreign);
        // The managed entry was updated in place, not duplicated.
        let filters: Vec<_> = extensions
            .iter()
            .filter(|e| e.extension_type == NETWORKING_FILTER_TYPE)
            .collect();
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0].disabled, Some(true));
    }
}
