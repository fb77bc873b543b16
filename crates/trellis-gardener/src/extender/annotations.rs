use std::collections::BTreeMap;

use trellis_api::runtime::ANNOTATION_SHOOT_RUNTIME_ID;
use trellis_api::{Runtime, Shoot};

use crate::error::ConverterError;
use crate::pipeline::Extend;

/// Stamps the shoot with the identifier of the runtime it was derived from.
pub struct AnnotationsExtender;

impl Extend for AnnotationsExtender {
    fn apply(&self, runtime: &Runtime, shoot: &mut Shoot) -> Result<(), ConverterError> {
        let runtime_id = runtime
            .runtime_id()
            .or(runtime.metadata.name.as_deref())
            .unwrap_or_default()
            .to_string();

        shoot
            .metadata
            .annotations
            .get_or_insert_with(BTreeMap::new)
            .insert(ANNOTATION_SHOOT_RUNTIME_ID.to_string(), runtime_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use trellis_api::runtime::{RuntimeSpec, LABEL_RUNTIME_ID};

    use super::*;

    #[test]
    fn shoot_carries_runtime_id_annotation() {
        let mut runtime = Runtime::new("rt", RuntimeSpec::default());
        runtime.metadata.labels = Some(BTreeMap::from([(
            LABEL_RUNTIME_ID.to_string(),
            "rt-42".to_string(),
        )]));
        let mut shoot = Shoot::new("shoot", Default::default());

        AnnotationsExtender.apply(&runtime, &mut shoot).unwrap();

        let annotations = shoot.metadata.annotations.unwrap();
        assert_eq!(
            annotations.get(ANNOTATION_SHOOT_RUNTIME_ID).map(String::as_str),
            Some("rt-42")
        );
    }
}
