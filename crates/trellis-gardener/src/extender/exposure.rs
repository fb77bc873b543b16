use trellis_api::{Runtime, Shoot};

use crate::error::ConverterError;
use crate::pipeline::Extend;

/// Passes the exposure class through when the runtime names one.
pub struct ExposureClassExtender;

impl Extend for ExposureClassExtender {
    fn apply(&self, runtime: &Runtime, shoot: &mut Shoot) -> Result<(), ConverterError> {
        if let Some(name) = &runtime.spec.shoot.exposure_class_name {
            shoot.spec.exposure_class_name = Some(name.clone());
        }
        Ok(())
    }
}
