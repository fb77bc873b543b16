//! Reads the on-disk snapshot taken before a risky mutation.
//!
//! Layout per target under the backup root:
//!
//! ```text
//! backup/<runtime-id>/<shoot>-to-restore.yaml   intended post-mutation spec
//! backup/<runtime-id>/<shoot>-original.yaml     pre-mutation spec (baseline)
//! backup/<runtime-id>/crb/*.yaml                optional auxiliary objects
//! backup/<runtime-id>/oidc/*.yaml
//! ```
//!
//! Snapshots are written once by the backup step and never modified here.

use std::path::{Path, PathBuf};

use k8s_openapi::api::rbac::v1::ClusterRoleBinding;
use serde::de::DeserializeOwned;

use trellis_api::{OpenIDConnect, Shoot};

use crate::error::RestoreError;

#[derive(Debug, Clone)]
pub struct RuntimeBackup {
    /// The spec the operator intended to reach.
    pub shoot_for_patch: Shoot,
    /// The pre-mutation spec, carrying the baseline generation.
    pub original_shoot: Shoot,
    pub cluster_role_bindings: Vec<ClusterRoleBinding>,
    pub oidc_configs: Vec<OpenIDConnect>,
}

pub struct BackupReader {
    backup_dir: PathBuf,
    restore_crbs: bool,
    restore_oidc: bool,
}

impl BackupReader {
    pub fn new(backup_dir: &Path, restore_crbs: bool, restore_oidc: bool) -> Self {
        Self {
            backup_dir: backup_dir.to_path_buf(),
            restore_crbs,
            restore_oidc,
        }
    }

    pub fn read(&self, runtime_id: &str, shoot_name: &str) -> Result<RuntimeBackup, RestoreError> {
        let target_dir = self.backup_dir.join("backup").join(runtime_id);

        let shoot_for_patch =
            read_document::<Shoot>(&target_dir.join(format!("{shoot_name}-to-restore.yaml")))?;
        let original_shoot =
            read_document::<Shoot>(&target_dir.join(format!("{shoot_name}-original.yaml")))?;

        let mut cluster_role_bindings = Vec::new();
        if self.restore_crbs {
            cluster_role_bindings = read_directory::<ClusterRoleBinding>(&target_dir.join("crb"))?;
            for crb in &mut cluster_role_bindings {
                crb.metadata.generation = None;
                crb.metadata.resource_version = None;
            }
        }

        let mut oidc_configs = Vec::new();
        if self.restore_oidc {
            oidc_configs = read_directory::<OpenIDConnect>(&target_dir.join("oidc"))?;
            for oidc in &mut oidc_configs {
                oidc.metadata.generation = None;
                oidc.metadata.resource_version = None;
            }
        }

        Ok(RuntimeBackup {
            shoot_for_patch,
            original_shoot,
            cluster_role_bindings,
            oidc_configs,
        })
    }
}

fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, RestoreError> {
    let bytes = std::fs::read(path)?;
    serde_yaml::from_slice(&bytes).map_err(|source| RestoreError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

/// The auxiliary subdirectories are optional; a missing one reads as empty.
fn read_directory<T: DeserializeOwned>(dir: &Path) -> Result<Vec<T>, RestoreError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };

    let mut objects = Vec::new();
    for entry in entries {
        objects.push(read_document(&entry?.path())?);
    }
    Ok(objects)
}
