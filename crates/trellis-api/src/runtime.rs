//! The `Runtime` custom resource: the declarative description of a managed
//! cluster, owned by the control plane that stores it and read-only here.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::gardener::{ControlPlane, KubeApiServer, Toleration, Worker};

/// Identifying labels every Runtime must carry before it can be reconciled.
pub const LABEL_RUNTIME_ID: &str = "trellis.dev/runtime-id";
pub const LABEL_GLOBAL_ACCOUNT_ID: &str = "trellis.dev/global-account-id";

/// One-shot marker requesting an unconditional reconciliation pass. Cleared
/// by the controller before it continues, so it fires exactly once.
pub const ANNOTATION_FORCE_RECONCILE: &str = "trellis.dev/force-patch-reconciliation";

/// Annotation stamped on the derived shoot, linking it back to its Runtime.
pub const ANNOTATION_SHOOT_RUNTIME_ID: &str = "infrastructure.trellis.dev/runtime-id";

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[kube(
    group = "infrastructure.trellis.dev",
    version = "v1",
    kind = "Runtime",
    namespaced
)]
#[kube(status = "RuntimeStatus")]
#[serde(rename_all = "camelCase")]
pub struct RuntimeSpec {
    pub shoot: RuntimeShoot,
    #[serde(default)]
    pub security: RuntimeSecurity,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeShoot {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_region: Option<String>,
    pub secret_binding_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exposure_class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enforce_seed_location: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub licence_type: Option<String>,
    #[serde(default)]
    pub kubernetes: RuntimeKubernetes,
    pub provider: RuntimeProvider,
    pub networking: RuntimeNetworking,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_plane: Option<ControlPlane>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerations: Option<Vec<Toleration>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeKubernetes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, rename = "kubeAPIServer", skip_serializing_if = "Option::is_none")]
    pub kube_api_server: Option<KubeApiServer>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeProvider {
    #[serde(rename = "type")]
    pub provider_type: String,
    pub workers: Vec<Worker>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infrastructure_config: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_plane_config: Option<Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeNetworking {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub network_type: Option<String>,
    pub nodes: String,
    pub pods: String,
    pub services: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeSecurity {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub administrators: Vec<String>,
    #[serde(default)]
    pub networking: SecurityNetworking,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecurityNetworking {
    #[serde(default)]
    pub filter: NetworkingFilter,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NetworkingFilter {
    #[serde(default)]
    pub egress: EgressFilter,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EgressFilter {
    pub enabled: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<RuntimeState>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<RuntimeCondition>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, JsonSchema)]
pub enum RuntimeState {
    Ready,
    Pending,
    Failed,
    Terminating,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeCondition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: String,
    pub reason: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConditionType {
    RuntimeProvisioned,
}

impl ConditionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionType::RuntimeProvisioned => "Provisioned",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConditionReason {
    Processing,
    ProcessingErr,
    ConversionError,
    AuditLogError,
}

impl ConditionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionReason::Processing => "Processing",
            ConditionReason::ProcessingErr => "ProcessingErr",
            ConditionReason::ConversionError => "ConversionError",
            ConditionReason::AuditLogError => "AuditLogError",
        }
    }
}

#[derive(Debug, Error)]
#[error("runtime is missing required label {label}")]
pub struct MissingLabelError {
    pub label: &'static str,
}

impl Runtime {
    /// Every Runtime must identify itself before it is acted on. A missing
    /// label is fatal and not retryable.
    pub fn validate_required_labels(&self) -> Result<(), MissingLabelError> {
        for label in [LABEL_RUNTIME_ID, LABEL_GLOBAL_ACCOUNT_ID] {
            let present = self
                .metadata
                .labels
                .as_ref()
                .is_some_and(|labels| labels.get(label).is_some_and(|v| !v.is_empty()));
            if !present {
                return Err(MissingLabelError { label });
            }
        }
        Ok(())
    }

    pub fn runtime_id(&self) -> Option<&str> {
        self.metadata
            .labels
            .as_ref()
            .and_then(|labels| labels.get(LABEL_RUNTIME_ID))
            .map(String::as_str)
    }

    pub fn should_force_reconciliation(&self) -> bool {
        self.metadata
            .annotations
            .as_ref()
            .and_then(|a| a.get(ANNOTATION_FORCE_RECONCILE))
            .is_some_and(|v| v == "true")
    }

    pub fn clear_force_reconciliation(&mut self) {
        if let Some(annotations) = self.metadata.annotations.as_mut() {
            annotations.remove(ANNOTATION_FORCE_RECONCILE);
        }
    }

    /// Move the runtime into Pending and upsert the matching condition.
    pub fn update_state_pending(
        &mut self,
        condition_type: ConditionType,
        reason: ConditionReason,
        status: &str,
        message: &str,
    ) {
        let status_block = self.status.get_or_insert_with(RuntimeStatus::default);
        status_block.state = Some(RuntimeState::Pending);

        let condition = RuntimeCondition {
            condition_type: condition_type.as_str().to_string(),
            status: status.to_string(),
            reason: reason.as_str().to_string(),
            message: message.to_string(),
            last_transition_time: Some(jiff::Timestamp::now().to_string()),
        };

        match status_block
            .conditions
            .iter_mut()
            .find(|c| c.condition_type == condition.condition_type)
        {
            Some(existing) => *existing = condition,
            None => status_block.conditions.push(condition),
        }
    }
}
