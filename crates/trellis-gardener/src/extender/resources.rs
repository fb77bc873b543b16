use trellis_api::gardener::NamedResourceReference;
use trellis_api::{Runtime, Shoot};

use crate::error::ConverterError;
use crate::pipeline::Extend;

/// Patch-only: carries the shoot's current resource references over so a
/// patch does not drop references other actors registered.
pub struct ResourcesExtender {
    current: Vec<NamedResourceReference>,
}

impl ResourcesExtender {
    pub fn new(current: Vec<NamedResourceReference>) -> Self {
        Self { current }
    }
}

impl Extend for ResourcesExtender {
    fn apply(&self, _runtime: &Runtime, shoot: &mut Shoot) -> Result<(), ConverterError> {
        if !self.current.is_empty() {
            shoot.spec.resources = Some(self.current.clone());
        }
        Ok(())
    }
}
