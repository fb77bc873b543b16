//! Assembles the extender pipeline for the two operating modes and builds
//! the shoot skeleton from directly-mapped runtime fields.

use serde_json::Value;

use trellis_api::gardener::{Extension, NamedResourceReference, Networking, ShootSpec};
use trellis_api::{Runtime, Shoot};

use crate::auditlog::AuditLogData;
use crate::config::ConverterConfig;
use crate::error::ConverterError;
use crate::extender::annotations::AnnotationsExtender;
use crate::extender::auditlog::AuditLogExtender;
use crate::extender::cloud_profile::CloudProfileExtender;
use crate::extender::dns::DnsExtender;
use crate::extender::exposure::ExposureClassExtender;
use crate::extender::extensions::ExtensionsExtender;
use crate::extender::kubernetes::KubernetesExtender;
use crate::extender::labels::LabelsExtender;
use crate::extender::maintenance::MaintenanceExtender;
use crate::extender::oidc::OidcExtender;
use crate::extender::provider::ProviderExtender;
use crate::extender::resources::ResourcesExtender;
use crate::extender::seed::SeedExtender;
use crate::extender::tolerations::TolerationsExtender;
use crate::pipeline::{Extend, Pipeline};

pub struct CreateOpts {
    pub config: ConverterConfig,
    pub audit_log_data: Option<AuditLogData>,
}

/// Patch mode additionally carries the current remote state so fields the
/// operator did not touch are preserved rather than clobbered.
pub struct PatchOpts {
    pub config: ConverterConfig,
    pub audit_log_data: Option<AuditLogData>,
    pub zones: Vec<String>,
    pub shoot_kubernetes_version: Option<String>,
    pub shoot_image_name: Option<String>,
    pub shoot_image_version: Option<String>,
    pub extensions: Vec<Extension>,
    pub resources: Vec<NamedResourceReference>,
    pub infrastructure_config: Option<Value>,
    pub control_plane_config: Option<Value>,
}

pub struct Converter {
    pipeline: Pipeline,
    config: ConverterConfig,
}

fn base_extenders(config: &ConverterConfig) -> Vec<Box<dyn Extend>> {
    vec![
        Box::new(AnnotationsExtender),
        Box::new(LabelsExtender),
        Box::new(SeedExtender),
        Box::new(OidcExtender::new(
            config.kubernetes.default_operator_oidc.clone(),
        )),
        Box::new(CloudProfileExtender),
        Box::new(ExposureClassExtender),
        Box::new(MaintenanceExtender::new(
            config.kubernetes.enable_kubernetes_version_auto_update,
            config.kubernetes.enable_machine_image_version_auto_update,
        )),
    ]
}

impl Converter {
    pub fn for_create(opts: CreateOpts) -> Self {
        let config = opts.config;
        let mut stages = base_extenders(&config);

        stages.push(Box::new(ProviderExtender::for_create(
            config.provider.aws.enable_imdsv2,
            &config.machine_image.default_name,
            &config.machine_image.default_version,
        )));
        stages.push(Box::new(DnsExtender::new(
            &config.dns.secret_name,
            &config.dns.domain_prefix,
            &config.dns.provider_type,
        )));
        stages.push(Box::new(TolerationsExtender));
        stages.push(Box::new(ExtensionsExtender::for_create(
            opts.audit_log_data.clone(),
        )));
        stages.push(Box::new(KubernetesExtender::new(
            &config.kubernetes.default_version,
            None,
        )));

        if opts.audit_log_data.is_some() {
            stages.push(Box::new(AuditLogExtender::new(
                &config.audit_log.policy_config_map_name,
            )));
        }

        Self {
            pipeline: Pipeline::new(stages),
            config,
        }
    }

    pub fn for_patch(opts: PatchOpts) -> Self {
        let config = opts.config;
        let mut stages = base_extenders(&config);

        stages.push(Box::new(ProviderExtender::for_patch(
            config.provider.aws.enable_imdsv2,
            &config.machine_image.default_name,
            &config.machine_image.default_version,
            opts.shoot_image_name,
            opts.shoot_image_version,
            opts.zones,
            opts.infrastructure_config,
            opts.control_plane_config,
        )));
        stages.push(Box::new(ExtensionsExtender::for_patch(
            opts.audit_log_data.clone(),
            opts.extensions,
        )));
        stages.push(Box::new(ResourcesExtender::new(opts.resources)));
        stages.push(Box::new(KubernetesExtender::new(
            &config.kubernetes.default_version,
            opts.shoot_kubernetes_version,
        )));

        if opts.audit_log_data.is_some() {
            stages.push(Box::new(AuditLogExtender::new(
                &config.audit_log.policy_config_map_name,
            )));
        }

        Self {
            pipeline: Pipeline::new(stages),
            config,
        }
    }

    /// Build the target spec: directly-mapped fields first, then the
    /// pipeline. The first stage failure is returned as-is and no partial
    /// target escapes.
    pub fn to_shoot(&self, runtime: &Runtime) -> Result<Shoot, ConverterError> {
        let source = &runtime.spec.shoot;

        let mut shoot = Shoot::new(
            &source.name,
            ShootSpec {
                purpose: source.purpose.clone(),
                region: source.region.clone(),
                secret_binding_name: Some(source.secret_binding_name.clone()),
                networking: Some(Networking {
                    network_type: source.networking.network_type.clone(),
                    nodes: Some(source.networking.nodes.clone()),
                    pods: Some(source.networking.pods.clone()),
                    services: Some(source.networking.services.clone()),
                }),
                control_plane: source.control_plane.clone(),
                ..Default::default()
            },
        );
        shoot.metadata.namespace = Some(format!("garden-{}", self.config.gardener.project_name));

        self.pipeline.run(runtime, &mut shoot)?;
        Ok(shoot)
    }
}

#[cfg(test)]
mod tests {
    use trellis_api::gardener::{Machine, Worker};
    use trellis_api::runtime::RuntimeSpec;

    use super::*;

    fn runtime() -> Runtime {
        let mut spec = RuntimeSpec::default();
        spec.shoot.name = "frond-01".into();
        spec.shoot.purpose = Some("production".into());
        spec.shoot.region = "eu-west-1".into();
        spec.shoot.secret_binding_name = "hazel-secret".into();
        spec.shoot.networking.nodes = "10.250.0.0/16".into();
        spec.shoot.networking.pods = "100.96.0.0/11".into();
        spec.shoot.networking.services = "100.64.0.0/13".into();
        spec.shoot.provider.provider_type = "aws".into();
        spec.shoot.provider.workers = vec![Worker {
            name: "pool-1".into(),
            machine: Machine {
                machine_type: "m5.large".into(),
                image: None,
            },
            minimum: 1,
            maximum: 3,
            zones: vec!["eu-west-1a".into()],
            ..Default::default()
        }];
        Runtime::new("rt", spec)
    }

    fn config() -> ConverterConfig {
        let mut config = ConverterConfig::default();
        config.gardener.project_name = "hazel".into();
        config.kubernetes.default_version = "1.32".into();
        config.machine_image.default_name = "gardenlinux".into();
        config.machine_image.default_version = "1592.1.0".into();
        config.dns.secret_name = "dns-credentials".into();
        config.dns.domain_prefix = "clusters.example.dev".into();
        config.dns.provider_type = "aws-route53".into();
        config.audit_log.policy_config_map_name = "audit-policy".into();
        config
    }

    #[test]
    fn create_maps_skeleton_fields_verbatim() {
        let converter = Converter::for_create(CreateOpts {
            config: config(),
            audit_log_data: None,
        });

        let shoot = converter.to_shoot(&runtime()).unwrap();

        assert_eq!(shoot.metadata.name.as_deref(), Some("frond-01"));
        assert_eq!(shoot.metadata.namespace.as_deref(), Some("garden-hazel"));
        assert_eq!(shoot.spec.purpose.as_deref(), Some("production"));
        assert_eq!(shoot.spec.region, "eu-west-1");
        assert_eq!(shoot.spec.secret_binding_name.as_deref(), Some("hazel-secret"));
        assert_eq!(shoot.spec.provider.workers.len(), 1);
        assert_eq!(shoot.spec.provider.workers[0].name, "pool-1");
        assert_eq!(shoot.spec.kubernetes.version.as_deref(), Some("1.32"));
    }

    #[test]
    fn conversion_is_deterministic() {
        let converter = Converter::for_create(CreateOpts {
            config: config(),
            audit_log_data: None,
        });

        let first = serde_json::to_value(converter.to_shoot(&runtime()).unwrap()).unwrap();
        let second = serde_json::to_value(converter.to_shoot(&runtime()).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn patch_keeps_current_kubernetes_version_for_silent_runtime() {
        let converter = Converter::for_patch(PatchOpts {
            config: config(),
            audit_log_data: None,
            zones: vec!["eu-west-1a".into()],
            shoot_kubernetes_version: Some("1.30.4".into()),
            shoot_image_name: Some("gardenlinux".into()),
            shoot_image_version: Some("1443.3.0".into()),
            extensions: Vec::new(),
            resources: Vec::new(),
            infrastructure_config: None,
            control_plane_config: None,
        });

        let shoot = converter.to_shoot(&runtime()).unwrap();
        assert_eq!(shoot.spec.kubernetes.version.as_deref(), Some("1.30.4"));
        // Patch mode does not wire DNS; the domain is immutable.
        assert!(shoot.spec.dns.is_none());
    }

    #[test]
    fn stage_failure_yields_no_partial_target() {
        let mut bad_runtime = runtime();
        bad_runtime.spec.shoot.kubernetes.version = Some("not-a-version".into());

        let converter = Converter::for_create(CreateOpts {
            config: config(),
            audit_log_data: None,
        });

        assert!(converter.to_shoot(&bad_runtime).is_err());
    }
}
