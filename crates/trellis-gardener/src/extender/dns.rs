use trellis_api::gardener::{Dns, DnsProvider};
use trellis_api::{Runtime, Shoot};

use crate::error::ConverterError;
use crate::pipeline::Extend;

/// Wires the cluster domain and the primary DNS provider. Create-only: the
/// domain is immutable once the shoot exists.
pub struct DnsExtender {
    secret_name: String,
    domain_prefix: String,
    provider_type: String,
}

impl DnsExtender {
    pub fn new(secret_name: &str, domain_prefix: &str, provider_type: &str) -> Self {
        Self {
            secret_name: secret_name.to_string(),
            domain_prefix: domain_prefix.to_string(),
            provider_type: provider_type.to_string(),
        }
    }
}

impl Extend for DnsExtender {
    fn apply(&self, runtime: &Runtime, shoot: &mut Shoot) -> Result<(), ConverterError> {
        shoot.spec.dns = Some(Dns {
            domain: Some(format!("{}.{}", runtime.spec.shoot.name, self.domain_prefix)),
            providers: vec![DnsProvider {
                provider_type: Some(self.provider_type.clone()),
                secret_name: Some(self.secret_name.clone()),
                primary: Some(true),
            }],
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use trellis_api::runtime::RuntimeSpec;

    use super::*;

    #[test]
    fn domain_is_derived_from_shoot_name_and_prefix() {
        let mut spec = RuntimeSpec::default();
        spec.shoot.name = "c-12345".into();
        let runtime = Runtime::new("rt", spec);
        let mut shoot = Shoot::new("c-12345", Default::default());

        DnsExtender::new("dns-credentials", "clusters.example.dev", "aws-route53")
            .apply(&runtime, &mut shoot)
            .unwrap();

        let dns = shoot.spec.dns.unwrap();
        assert_eq!(dns.domain.as_deref(), Some("c-12345.clusters.example.dev"));
        assert_eq!(dns.providers[0].primary, Some(true));
    }
}
