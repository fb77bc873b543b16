use trellis_api::{Runtime, Shoot};

use crate::error::ConverterError;
use crate::pipeline::Extend;

/// Cloud profiles are named after the provider type on this landscape.
pub struct CloudProfileExtender;

impl Extend for CloudProfileExtender {
    fn apply(&self, runtime: &Runtime, shoot: &mut Shoot) -> Result<(), ConverterError> {
        shoot.spec.cloud_profile_name = Some(runtime.spec.shoot.provider.provider_type.clone());
        Ok(())
    }
}
