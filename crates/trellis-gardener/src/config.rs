//! Converter configuration, loaded from a JSON file and threaded explicitly
//! through the converter and state machine constructors.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use trellis_api::gardener::OidcConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConverterConfig {
    #[serde(default)]
    pub gardener: GardenerConfig,
    #[serde(default)]
    pub kubernetes: KubernetesConfig,
    #[serde(default)]
    pub machine_image: MachineImageConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub dns: DnsConfig,
    #[serde(default)]
    pub audit_log: AuditLogPolicyConfig,
}

impl ConverterConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GardenerConfig {
    /// Shoots live in the `garden-<projectName>` namespace.
    pub project_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KubernetesConfig {
    pub default_version: String,
    #[serde(default)]
    pub enable_kubernetes_version_auto_update: bool,
    #[serde(default)]
    pub enable_machine_image_version_auto_update: bool,
    /// Applied when a runtime does not bring its own OIDC configuration.
    #[serde(default)]
    pub default_operator_oidc: Option<OidcConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineImageConfig {
    pub default_name: String,
    pub default_version: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    #[serde(default)]
    pub aws: AwsProviderConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsProviderConfig {
    #[serde(default)]
    pub enable_imdsv2: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsConfig {
    pub secret_name: String,
    pub domain_prefix: String,
    pub provider_type: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogPolicyConfig {
    pub policy_config_map_name: String,
}
