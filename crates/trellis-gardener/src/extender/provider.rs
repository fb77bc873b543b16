use serde_json::{json, Value};

use trellis_api::gardener::{MachineImage, SshAccess, Worker, WorkersSettings};
use trellis_api::{Runtime, Shoot};

use crate::error::ConverterError;
use crate::pipeline::Extend;

/// Builds the provider section: worker pools, provider config blobs and the
/// machine image for every pool.
///
/// In patch mode the current remote zones and machine image are used as
/// fallbacks so that fields the operator did not set are preserved instead
/// of being reset to landscape defaults.
pub struct ProviderExtender {
    enable_imdsv2: bool,
    default_image_name: String,
    default_image_version: String,
    current_image_name: Option<String>,
    current_image_version: Option<String>,
    current_zones: Vec<String>,
    current_infrastructure_config: Option<Value>,
    current_control_plane_config: Option<Value>,
    create: bool,
}

impl ProviderExtender {
    pub fn for_create(
        enable_imdsv2: bool,
        default_image_name: &str,
        default_image_version: &str,
    ) -> Self {
        Self {
            enable_imdsv2,
            default_image_name: default_image_name.to_string(),
            default_image_version: default_image_version.to_string(),
            current_image_name: None,
            current_image_version: None,
            current_zones: Vec::new(),
            current_infrastructure_config: None,
            current_control_plane_config: None,
            create: true,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn for_patch(
        enable_imdsv2: bool,
        default_image_name: &str,
        default_image_version: &str,
        current_image_name: Option<String>,
        current_image_version: Option<String>,
        current_zones: Vec<String>,
        current_infrastructure_config: Option<Value>,
        current_control_plane_config: Option<Value>,
    ) -> Self {
        Self {
            enable_imdsv2,
            default_image_name: default_image_name.to_string(),
            default_image_version: default_image_version.to_string(),
            current_image_name,
            current_image_version,
            current_zones,
            current_infrastructure_config,
            current_control_plane_config,
            create: false,
        }
    }

    fn image_for(&self, worker: &Worker) -> MachineImage {
        if let Some(image) = &worker.machine.image {
            return image.clone();
        }
        if let Some(name) = &self.current_image_name {
            return MachineImage {
                name: name.clone(),
                version: self.current_image_version.clone(),
            };
        }
        MachineImage {
            name: self.default_image_name.clone(),
            version: Some(self.default_image_version.clone()),
        }
    }

    fn build_worker(&self, worker: &Worker, provider_type: &str) -> Worker {
        let mut out = worker.clone();
        out.machine.image = Some(self.image_for(worker));

        if out.zones.is_empty() && !self.current_zones.is_empty() {
            out.zones = self.current_zones.clone();
        }

        if provider_type == "aws" && self.enable_imdsv2 && out.provider_config.is_none() {
            out.provider_config = Some(json!({
                "apiVersion": "aws.provider.extensions.gardener.cloud/v1alpha1",
                "kind": "WorkerConfig",
                "instanceMetadataOptions": {
                    "httpTokens": "required",
                    "httpPutResponseHopLimit": 2,
                },
            }));
        }

        out
    }

    fn default_blob(provider_type: &str, kind: &str) -> serde_json::Value {
        json!({
            "apiVersion": format!("{provider_type}.provider.extensions.gardener.cloud/v1alpha1"),
            "kind": kind,
        })
    }
}

impl Extend for ProviderExtender {
    fn apply(&self, runtime: &Runtime, shoot: &mut Shoot) -> Result<(), ConverterError> {
        let provider = &runtime.spec.shoot.provider;
        let provider_type = provider.provider_type.as_str();

        shoot.spec.provider.provider_type = provider_type.to_string();
        shoot.spec.provider.workers = provider
            .workers
            .iter()
            .map(|w| self.build_worker(w, provider_type))
            .collect();

        // The runtime's own blobs always win; patch falls back to what the
        // shoot currently has, creation to a minimal landscape default.
        shoot.spec.provider.infrastructure_config = provider
            .infrastructure_config
            .clone()
            .or_else(|| self.current_infrastructure_config.clone())
            .or_else(|| {
                self.create
                    .then(|| Self::default_blob(provider_type, "InfrastructureConfig"))
            });
        shoot.spec.provider.control_plane_config = provider
            .control_plane_config
            .clone()
            .or_else(|| self.current_control_plane_config.clone())
            .or_else(|| {
                self.create
                    .then(|| Self::default_blob(provider_type, "ControlPlaneConfig"))
            });

        if self.create {
            shoot.spec.provider.workers_settings = Some(WorkersSettings {
                ssh_access: Some(SshAccess { enabled: false }),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use trellis_api::gardener::Machine;
    use trellis_api::runtime::RuntimeSpec;

    use super::*;

    fn runtime_with_worker(zones: Vec<String>) -> Runtime {
        let mut spec = RuntimeSpec::default();
        spec.shoot.provider.provider_type = "aws".into();
        spec.shoot.provider.workers = vec![Worker {
            name: "pool-1".into(),
            machine: Machine {
                machine_type: "m5.large".into(),
                image: None,
            },
            minimum: 1,
            maximum: 3,
            zones,
            ..Default::default()
        }];
        Runtime::new("rt", spec)
    }

    #[test]
    fn create_defaults_machine_image_and_disables_ssh() {
        let runtime = runtime_with_worker(vec!["eu-west-1a".into()]);
        let mut shoot = Shoot::new("shoot", Default::default());

        ProviderExtender::for_create(false, "gardenlinux", "1592.1.0")
            .apply(&runtime, &mut shoot)
            .unwrap();

        let image = shoot.spec.provider.workers[0].machine.image.clone().unwrap();
        assert_eq!(image.name, "gardenlinux");
        assert_eq!(image.version.as_deref(), Some("1592.1.0"));
        assert_eq!(
            shoot
                .spec
                .provider
                .workers_settings
                .unwrap()
                .ssh_access
                .unwrap()
                .enabled,
            false
        );
    }

    #[test]
    fn patch_preserves_current_zones_and_image() {
        let runtime = runtime_with_worker(vec![]);
        let mut shoot = Shoot::new("shoot", Default::default());

        ProviderExtender::for_patch(
            false,
            "gardenlinux",
            "1592.1.0",
            Some("gardenlinux".into()),
            Some("1443.3.0".into()),
            vec!["eu-west-1a".into(), "eu-west-1b".into()],
            None,
            None,
        )
        .apply(&runtime, &mut shoot)
        .unwrap();

        let worker = &shoot.spec.provider.workers[0];
        assert_eq!(worker.zones, vec!["eu-west-1a", "eu-west-1b"]);
        let image = worker.machine.image.clone().unwrap();
        assert_eq!(image.version.as_deref(), Some("1443.3.0"));
        // Patch mode leaves absent blobs absent instead of inventing defaults.
        assert!(shoot.spec.provider.infrastructure_config.is_none());
    }

    #[test]
    fn imdsv2_config_is_added_for_aws_workers() {
        let runtime = runtime_with_worker(vec!["eu-west-1a".into()]);
        let mut shoot = Shoot::new("shoot", Default::default());

        ProviderExtender::for_create(true, "gardenlinux", "1592.1.0")
            .apply(&runtime, &mut shoot)
            .unwrap();

        let config = shoot.spec.provider.workers[0].provider_config.clone().unwrap();
        assert_eq!(
            config["instanceMetadataOptions"]["httpTokens"],
            serde_json::json!("required")
        );
    }
}
