use trellis_api::{Runtime, Shoot};

use crate::error::ConverterError;
use crate::pipeline::Extend;

/// Chooses the shoot Kubernetes version.
///
/// The runtime's explicit version wins. Without one, patch mode keeps the
/// current remote version and create mode falls back to the landscape
/// default. The result never goes below the current remote version; the
/// control plane only ever upgrades.
pub struct KubernetesExtender {
    default_version: String,
    current_version: Option<String>,
}

impl KubernetesExtender {
    pub fn new(default_version: &str, current_version: Option<String>) -> Self {
        Self {
            default_version: default_version.to_string(),
            current_version,
        }
    }
}

impl Extend for KubernetesExtender {
    fn apply(&self, runtime: &Runtime, shoot: &mut Shoot) -> Result<(), ConverterError> {
        let requested = runtime
            .spec
            .shoot
            .kubernetes
            .version
            .clone()
            .or_else(|| self.current_version.clone())
            .unwrap_or_else(|| self.default_version.clone());

        let requested_parsed = parse_version(&requested)?;
        let chosen = match &self.current_version {
            Some(current) if requested_parsed < parse_version(current)? => current.clone(),
            _ => requested,
        };

        shoot.spec.kubernetes.version = Some(chosen);
        Ok(())
    }
}

fn parse_version(version: &str) -> Result<(u64, u64, u64), ConverterError> {
    let mut parts = version.trim_start_matches('v').splitn(3, '.');
    let mut next = |required: bool| -> Result<u64, ConverterError> {
        match parts.next() {
            Some(part) => part
                .parse::<u64>()
                .map_err(|_| ConverterError::InvalidVersion(version.to_string())),
            None if required => Err(ConverterError::InvalidVersion(version.to_string())),
            None => Ok(0),
        }
    };
    Ok((next(true)?, next(true)?, next(false)?))
}

#[cfg(test)]
mod tests {
    use trellis_api::runtime::RuntimeSpec;

    use super::*;

    fn runtime_with_version(version: Option<&str>) -> Runtime {
        let mut spec = RuntimeSpec::default();
        spec.shoot.kubernetes.version = version.map(str::to_string);
        Runtime::new("rt", spec)
    }

    fn converted(extender: KubernetesExtender, runtime: &Runtime) -> String {
        let mut shoot = Shoot::new("shoot", Default::default());
        extender.apply(runtime, &mut shoot).unwrap();
        shoot.spec.kubernetes.version.unwrap()
    }

    #[test]
    fn create_mode_uses_default_when_runtime_is_silent() {
        let version = converted(
            KubernetesExtender::new("1.32", None),
            &runtime_with_version(None),
        );
        assert_eq!(version, "1.32");
    }

    #[test]
    fn patch_mode_keeps_current_version_when_runtime_is_silent() {
        let version = converted(
            KubernetesExtender::new("1.32", Some("1.30.4".into())),
            &runtime_with_version(None),
        );
        assert_eq!(version, "1.30.4");
    }

    #[test]
    fn patch_mode_never_downgrades_below_current() {
        let version = converted(
            KubernetesExtender::new("1.32", Some("1.31.2".into())),
            &runtime_with_version(Some("1.30")),
        );
        assert_eq!(version, "1.31.2");
    }

    #[test]
    fn explicit_upgrade_is_honored() {
        let version = converted(
            KubernetesExtender::new("1.32", Some("1.30.4".into())),
            &runtime_with_version(Some("1.31")),
        );
        assert_eq!(version, "1.31");
    }

    #[test]
    fn garbage_version_is_an_error_not_a_guess() {
        let runtime = runtime_with_version(Some("latest"));
        let mut shoot = Shoot::new("shoot", Default::default());
        let err = KubernetesExtender::new("1.32", Some("1.30".into()))
            .apply(&runtime, &mut shoot)
            .unwrap_err();
        assert!(matches!(err, ConverterError::InvalidVersion(_)));
    }
}
