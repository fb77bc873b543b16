//! Audit-log landscape data, resolved per (provider, region) before the
//! pipeline runs. Stages never fetch this themselves.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AuditLogError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogData {
    pub tenant_id: String,
    pub service_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_name: Option<String>,
}

/// Resolves audit-log data for a provider/region pair. Absence of data is
/// tolerable unless the reconcile configuration marks it mandatory.
pub trait AuditLogDataSource: Send + Sync {
    fn get_audit_log_data(
        &self,
        provider_type: &str,
        region: &str,
    ) -> Result<AuditLogData, AuditLogError>;
}

/// File-backed source: a JSON map of provider type -> region -> data.
#[derive(Debug, Clone, Default)]
pub struct FileAuditLogSource {
    entries: HashMap<String, HashMap<String, AuditLogData>>,
}

impl FileAuditLogSource {
    pub fn load(path: &Path) -> Result<Self, AuditLogError> {
        let bytes = std::fs::read(path)?;
        let entries = serde_json::from_slice(&bytes)?;
        Ok(Self { entries })
    }

    pub fn from_entries(entries: HashMap<String, HashMap<String, AuditLogData>>) -> Self {
        Self { entries }
    }
}

impl AuditLogDataSource for FileAuditLogSource {
    fn get_audit_log_data(
        &self,
        provider_type: &str,
        region: &str,
    ) -> Result<AuditLogData, AuditLogError> {
        let regions = self.entries.get(provider_type).ok_or_else(|| {
            AuditLogError::MissingProviderConfig {
                provider: provider_type.to_string(),
            }
        })?;
        regions
            .get(region)
            .cloned()
            .ok_or_else(|| AuditLogError::MissingRegionConfig {
                provider: provider_type.to_string(),
                region: region.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> FileAuditLogSource {
        let data = AuditLogData {
            tenant_id: "tenant-1".into(),
            service_url: "https://auditlog.example.com:8081".into(),
            secret_name: Some("auditlog-credentials".into()),
        };
        FileAuditLogSource::from_entries(HashMap::from([(
            "aws".to_string(),
            HashMap::from([("eu-west-1".to_string(), data)]),
        )]))
    }

    #[test]
    fn resolves_known_provider_and_region() {
        let data = source().get_audit_log_data("aws", "eu-west-1").unwrap();
        assert_eq!(data.tenant_id, "tenant-1");
    }

    #[test]
    fn missing_provider_and_region_are_distinct_errors() {
        let err = source().get_audit_log_data("gcp", "eu-west-1").unwrap_err();
        assert!(matches!(err, AuditLogError::MissingProviderConfig { .. }));

        let err = source().get_audit_log_data("aws", "us-east-1").unwrap_err();
        assert!(matches!(err, AuditLogError::MissingRegionConfig { .. }));
    }
}
