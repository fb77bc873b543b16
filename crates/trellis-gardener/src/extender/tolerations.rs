use trellis_api::{Runtime, Shoot};

use crate::error::ConverterError;
use crate::pipeline::Extend;

/// Copies the runtime's seed tolerations verbatim.
pub struct TolerationsExtender;

impl Extend for TolerationsExtender {
    fn apply(&self, runtime: &Runtime, shoot: &mut Shoot) -> Result<(), ConverterError> {
        if let Some(tolerations) = &runtime.spec.shoot.tolerations {
            if !tolerations.is_empty() {
                shoot.spec.tolerations = Some(tolerations.clone());
            }
        }
        Ok(())
    }
}
