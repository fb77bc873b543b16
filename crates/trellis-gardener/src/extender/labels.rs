use std::collections::BTreeMap;

use trellis_api::runtime::{LABEL_GLOBAL_ACCOUNT_ID, LABEL_RUNTIME_ID};
use trellis_api::{Runtime, Shoot};

use crate::error::ConverterError;
use crate::pipeline::Extend;

/// Copies the identifying labels from the runtime onto the shoot so that
/// shoots can be selected by account and runtime id on the Gardener side.
pub struct LabelsExtender;

impl Extend for LabelsExtender {
    fn apply(&self, runtime: &Runtime, shoot: &mut Shoot) -> Result<(), ConverterError> {
        let source = runtime.metadata.labels.clone().unwrap_or_default();
        let target = shoot.metadata.labels.get_or_insert_with(BTreeMap::new);

        for key in [LABEL_RUNTIME_ID, LABEL_GLOBAL_ACCOUNT_ID] {
            if let Some(value) = source.get(key) {
                target.insert(key.to_string(), value.clone());
            }
        }
        Ok(())
    }
}
