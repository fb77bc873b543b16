//! Per-target outcomes of a restore batch, accumulated append-only by the
//! sequential workflow loop and aggregated into summary counts.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Status {
    Success,
    Error,
    Skipped,
    UpdateDetected,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeResult {
    pub runtime_id: String,
    pub shoot_name: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub restored_crbs: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub restored_oidcs: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Results {
    pub results: Vec<RuntimeResult>,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub update_detected: usize,
}

impl Results {
    pub fn error_occurred(&mut self, runtime_id: &str, shoot_name: &str, error_message: &str) {
        self.failed += 1;
        self.results.push(RuntimeResult {
            runtime_id: runtime_id.to_string(),
            shoot_name: shoot_name.to_string(),
            status: Status::Error,
            error_message: Some(error_message.to_string()),
            restored_crbs: Vec::new(),
            restored_oidcs: Vec::new(),
        });
    }

    pub fn operation_succeeded(
        &mut self,
        runtime_id: &str,
        shoot_name: &str,
        restored_crbs: Vec<String>,
        restored_oidcs: Vec<String>,
    ) {
        self.succeeded += 1;
        self.results.push(RuntimeResult {
            runtime_id: runtime_id.to_string(),
            shoot_name: shoot_name.to_string(),
            status: Status::Success,
            error_message: None,
            restored_crbs,
            restored_oidcs,
        });
    }

    pub fn operation_skipped(&mut self, runtime_id: &str, shoot_name: &str) {
        self.skipped += 1;
        self.results.push(RuntimeResult {
            runtime_id: runtime_id.to_string(),
            shoot_name: shoot_name.to_string(),
            status: Status::Skipped,
            error_message: None,
            restored_crbs: Vec::new(),
            restored_oidcs: Vec::new(),
        });
    }

    pub fn automatic_restore_impossible(&mut self, runtime_id: &str, shoot_name: &str) {
        self.update_detected += 1;
        self.results.push(RuntimeResult {
            runtime_id: runtime_id.to_string(),
            shoot_name: shoot_name.to_string(),
            status: Status::UpdateDetected,
            error_message: None,
            restored_crbs: Vec::new(),
            restored_oidcs: Vec::new(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_track_each_outcome_kind() {
        let mut results = Results::default();
        results.operation_succeeded("rt-1", "shoot-1", vec!["crb-admin".into()], vec![]);
        results.error_occurred("rt-2", "shoot-2", "apply failed");
        results.operation_skipped("rt-3", "shoot-3");
        results.automatic_restore_impossible("rt-4", "shoot-4");

        assert_eq!(results.succeeded, 1);
        assert_eq!(results.failed, 1);
        assert_eq!(results.skipped, 1);
        assert_eq!(results.update_detected, 1);
        assert_eq!(results.results.len(), 4);
        // Append-only: entries keep batch order.
        assert_eq!(results.results[1].runtime_id, "rt-2");
        assert_eq!(results.results[1].status, Status::Error);
    }
}
