//! Ordered transformation pipeline. Each stage maps runtime fields onto the
//! in-progress shoot spec; the first failing stage aborts the rest.

use trellis_api::{Runtime, Shoot};

use crate::error::ConverterError;

/// One unit of the transformation pipeline.
///
/// Stages mutate only the target argument and perform no remote I/O; all
/// external data is resolved beforehand and baked into the stage at
/// construction time. Stages must be idempotent; a stage whose inputs are
/// absent is left out of the pipeline rather than turned into an internal
/// no-op.
pub trait Extend: Send + Sync {
    fn apply(&self, runtime: &Runtime, shoot: &mut Shoot) -> Result<(), ConverterError>;
}

pub struct Pipeline {
    stages: Vec<Box<dyn Extend>>,
}

impl Pipeline {
    pub fn new(stages: Vec<Box<dyn Extend>>) -> Self {
        Self { stages }
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Apply every stage in order against the same mutable target. The first
    /// failure is returned verbatim and no later stage runs.
    pub fn run(&self, runtime: &Runtime, shoot: &mut Shoot) -> Result<(), ConverterError> {
        for stage in &self.stages {
            stage.apply(runtime, shoot)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use trellis_api::runtime::RuntimeSpec;

    use super::*;

    struct SetPurpose(&'static str);

    impl Extend for SetPurpose {
        fn apply(&self, _runtime: &Runtime, shoot: &mut Shoot) -> Result<(), ConverterError> {
            shoot.spec.purpose = Some(self.0.to_string());
            Ok(())
        }
    }

    struct AppendZone(&'static str);

    impl Extend for AppendZone {
        fn apply(&self, _runtime: &Runtime, shoot: &mut Shoot) -> Result<(), ConverterError> {
            // Idempotent: a zone is only appended once.
            let zones = &mut shoot.spec.provider.workers;
            if let Some(worker) = zones.first_mut() {
                if !worker.zones.iter().any(|z| z == self.0) {
                    worker.zones.push(self.0.to_string());
                }
            }
            Ok(())
        }
    }

    struct Fail;

    impl Extend for Fail {
        fn apply(&self, _runtime: &Runtime, _shoot: &mut Shoot) -> Result<(), ConverterError> {
            Err(ConverterError::InvalidVersion("boom".into()))
        }
    }

    fn runtime() -> Runtime {
        Runtime::new("rt", RuntimeSpec::default())
    }

    fn shoot() -> Shoot {
        Shoot::new("shoot", Default::default())
    }

    #[test]
    fn stages_run_in_order_and_later_stages_win() {
        let pipeline = Pipeline::new(vec![
            Box::new(SetPurpose("evaluation")),
            Box::new(SetPurpose("production")),
        ]);

        let mut target = shoot();
        pipeline.run(&runtime(), &mut target).unwrap();
        assert_eq!(target.spec.purpose.as_deref(), Some("production"));
    }

    #[test]
    fn running_twice_produces_identical_output() {
        let pipeline = Pipeline::new(vec![
            Box::new(SetPurpose("production")),
            Box::new(AppendZone("eu-west-1a")),
        ]);

        let mut target = shoot();
        target.spec.provider.workers.push(Default::default());

        pipeline.run(&runtime(), &mut target).unwrap();
        let first = serde_json::to_value(&target).unwrap();

        pipeline.run(&runtime(), &mut target).unwrap();
        let second = serde_json::to_value(&target).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn first_failure_aborts_remaining_stages() {
        let pipeline = Pipeline::new(vec![
            Box::new(SetPurpose("evaluation")),
            Box::new(Fail),
            Box::new(SetPurpose("production")),
        ]);

        let mut target = shoot();
        let err = pipeline.run(&runtime(), &mut target).unwrap_err();
        assert!(matches!(err, ConverterError::InvalidVersion(_)));
        // The stage after the failure never ran.
        assert_eq!(target.spec.purpose.as_deref(), Some("evaluation"));
    }
}
