//! The sequential batch restore.
//!
//! Targets are processed strictly one after another so result ordering is
//! deterministic and no target's failure can starve another's attempt.
//! Every per-target failure is recorded and the loop moves on; only a
//! failure to list shoots at all aborts the batch.

use std::sync::Arc;

use tracing::{error, info, warn};

use trellis_api::runtime::ANNOTATION_SHOOT_RUNTIME_ID;
use trellis_api::Shoot;
use trellis_gardener::client::ShootClient;

use crate::access::ClusterAccess;
use crate::backup::{BackupReader, RuntimeBackup};
use crate::drift::{classify, DriftOutcome};
use crate::error::RestoreError;
use crate::results::Results;

pub struct RestoreWorkflow {
    shoot_client: Arc<dyn ShootClient>,
    cluster_access: Arc<dyn ClusterAccess>,
    reader: BackupReader,
    dry_run: bool,
}

impl RestoreWorkflow {
    pub fn new(
        shoot_client: Arc<dyn ShootClient>,
        cluster_access: Arc<dyn ClusterAccess>,
        reader: BackupReader,
        dry_run: bool,
    ) -> Self {
        Self {
            shoot_client,
            cluster_access,
            reader,
            dry_run,
        }
    }

    pub async fn run(&self, runtime_ids: &[String]) -> Result<Results, RestoreError> {
        let shoots = self.shoot_client.list_shoots().await?;
        let mut results = Results::default();

        for runtime_id in runtime_ids {
            self.restore_one(runtime_id, &shoots, &mut results).await;
        }

        info!(
            succeeded = results.succeeded,
            failed = results.failed,
            skipped = results.skipped,
            update_detected = results.update_detected,
            "restore batch completed"
        );
        Ok(results)
    }

    async fn restore_one(&self, runtime_id: &str, shoots: &[Shoot], results: &mut Results) {
        let Some(current_shoot) = find_shoot(shoots, runtime_id) else {
            let message = format!("no shoot found for runtime {runtime_id}");
            error!(runtime_id, "{message}");
            results.error_occurred(runtime_id, "", &message);
            return;
        };
        let shoot_name = current_shoot.metadata.name.clone().unwrap_or_default();

        if current_shoot.is_being_deleted() {
            let message = "shoot is being deleted".to_string();
            error!(runtime_id, shoot = %shoot_name, "{message}");
            results.error_occurred(runtime_id, &shoot_name, &message);
            return;
        }

        let backup = match self.reader.read(runtime_id, &shoot_name) {
            Ok(backup) => backup,
            Err(err) => {
                let message = format!("failed to read backup: {err}");
                error!(runtime_id, shoot = %shoot_name, "{message}");
                results.error_occurred(runtime_id, &shoot_name, &message);
                return;
            }
        };

        match classify(backup.original_shoot.generation(), current_shoot.generation()) {
            Ok(DriftOutcome::Unchanged) => {
                warn!(
                    runtime_id,
                    shoot = %shoot_name,
                    "shoot was not modified after the backup was taken, skipping"
                );
                results.operation_skipped(runtime_id, &shoot_name);
                return;
            }
            Ok(DriftOutcome::ManualRequired) => {
                warn!(
                    runtime_id,
                    shoot = %shoot_name,
                    "more than one change since the backup; restoring would overwrite them, \
                     manual intervention required"
                );
                results.automatic_restore_impossible(runtime_id, &shoot_name);
                return;
            }
            Ok(DriftOutcome::SafeToApply) => {}
            Err(err) => {
                error!(runtime_id, shoot = %shoot_name, error = %err, "drift classification failed");
                results.error_occurred(runtime_id, &shoot_name, &err.to_string());
                return;
            }
        }

        if self.dry_run {
            info!(runtime_id, shoot = %shoot_name, "restore decision verified (dry run)");
            results.operation_succeeded(runtime_id, &shoot_name, Vec::new(), Vec::new());
            return;
        }

        match self.apply_backup(runtime_id, &backup).await {
            Ok((crbs, oidcs)) => {
                info!(runtime_id, shoot = %shoot_name, "runtime restored successfully");
                results.operation_succeeded(runtime_id, &shoot_name, crbs, oidcs);
            }
            Err(err) => {
                let message = format!("failed to restore runtime: {err}");
                error!(runtime_id, shoot = %shoot_name, "{message}");
                results.error_occurred(runtime_id, &shoot_name, &message);
            }
        }
    }

    /// Apply the intended shoot spec, then the auxiliary objects inside the
    /// managed cluster. Returns the names of the restored auxiliaries.
    async fn apply_backup(
        &self,
        runtime_id: &str,
        backup: &RuntimeBackup,
    ) -> Result<(Vec<String>, Vec<String>), RestoreError> {
        self.shoot_client.apply_shoot(&backup.shoot_for_patch).await?;

        if backup.cluster_role_bindings.is_empty() && backup.oidc_configs.is_empty() {
            return Ok((Vec::new(), Vec::new()));
        }

        let cluster = self.cluster_access.client_for(runtime_id).await?;

        let mut crb_names = Vec::new();
        for crb in &backup.cluster_role_bindings {
            cluster.update_cluster_role_binding(crb).await?;
            crb_names.push(crb.metadata.name.clone().unwrap_or_default());
        }

        let mut oidc_names = Vec::new();
        for oidc in &backup.oidc_configs {
            cluster.update_open_id_connect(oidc).await?;
            oidc_names.push(oidc.metadata.name.clone().unwrap_or_default());
        }

        Ok((crb_names, oidc_names))
    }
}

fn find_shoot<'a>(shoots: &'a [Shoot], runtime_id: &str) -> Option<&'a Shoot> {
    shoots.iter().find(|shoot| {
        shoot
            .metadata
            .annotations
            .as_ref()
            .and_then(|a| a.get(ANNOTATION_SHOOT_RUNTIME_ID))
            .is_some_and(|id| id == runtime_id)
    })
}
