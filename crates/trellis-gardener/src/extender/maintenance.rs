use trellis_api::gardener::{AutoUpdate, Maintenance};
use trellis_api::{Runtime, Shoot};

use crate::error::ConverterError;
use crate::pipeline::Extend;

/// Applies the landscape-wide auto-update policy.
pub struct MaintenanceExtender {
    kubernetes_version_auto_update: bool,
    machine_image_version_auto_update: bool,
}

impl MaintenanceExtender {
    pub fn new(kubernetes_version_auto_update: bool, machine_image_version_auto_update: bool) -> Self {
        Self {
            kubernetes_version_auto_update,
            machine_image_version_auto_update,
        }
    }
}

impl Extend for MaintenanceExtender {
    fn apply(&self, _runtime: &Runtime, shoot: &mut Shoot) -> Result<(), ConverterError> {
        shoot.spec.maintenance = Some(Maintenance {
            auto_update: Some(AutoUpdate {
                kubernetes_version: self.kubernetes_version_auto_update,
                machine_image_version: self.machine_image_version_auto_update,
            }),
        });
        Ok(())
    }
}
