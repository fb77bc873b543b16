use std::collections::BTreeMap;

use trellis_api::gardener::SeedSelector;
use trellis_api::{Runtime, Shoot};

use crate::error::ConverterError;
use crate::pipeline::Extend;

const SEED_REGION_LABEL: &str = "seed.gardener.cloud/region";

/// Pins the shoot to seeds in its own region when the runtime demands it.
pub struct SeedExtender;

impl Extend for SeedExtender {
    fn apply(&self, runtime: &Runtime, shoot: &mut Shoot) -> Result<(), ConverterError> {
        if runtime.spec.shoot.enforce_seed_location != Some(true) {
            return Ok(());
        }

        shoot.spec.seed_selector = Some(SeedSelector {
            match_labels: BTreeMap::from([(
                SEED_REGION_LABEL.to_string(),
                runtime.spec.shoot.region.clone(),
            )]),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use trellis_api::runtime::RuntimeSpec;

    use super::*;

    #[test]
    fn selector_is_only_set_when_location_is_enforced() {
        let mut spec = RuntimeSpec::default();
        spec.shoot.region = "eu-west-1".into();
        let mut runtime = Runtime::new("rt", spec);
        let mut shoot = Shoot::new("shoot", Default::default());

        SeedExtender.apply(&runtime, &mut shoot).unwrap();
        assert!(shoot.spec.seed_selector.is_none());

        runtime.spec.shoot.enforce_seed_location = Some(true);
        SeedExtender.apply(&runtime, &mut shoot).unwrap();
        let selector = shoot.spec.seed_selector.unwrap();
        assert_eq!(
            selector.match_labels.get(SEED_REGION_LABEL).map(String::as_str),
            Some("eu-west-1")
        );
    }
}
