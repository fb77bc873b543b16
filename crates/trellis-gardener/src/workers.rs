//! Structural comparison of worker-pool collections.
//!
//! The comparison is explicit and field-by-field so that exactly the fields
//! this system manages decide equality. Order matters: the collections are
//! compared element-wise, a reordering counts as a change.

use trellis_api::gardener::Worker;

pub fn pools_equal(current: &[Worker], desired: &[Worker]) -> bool {
    current.len() == desired.len()
        && current
            .iter()
            .zip(desired.iter())
            .all(|(a, b)| worker_equal(a, b))
}

fn worker_equal(a: &Worker, b: &Worker) -> bool {
    a.name == b.name
        && a.machine.machine_type == b.machine.machine_type
        && a.machine.image == b.machine.image
        && a.minimum == b.minimum
        && a.maximum == b.maximum
        && a.max_surge == b.max_surge
        && a.max_unavailable == b.max_unavailable
        && a.zones == b.zones
        && a.volume == b.volume
        && a.provider_config == b.provider_config
}

#[cfg(test)]
mod tests {
    use trellis_api::gardener::Machine;

    use super::*;

    fn worker(name: &str, maximum: i32) -> Worker {
        Worker {
            name: name.into(),
            machine: Machine {
                machine_type: "m5.large".into(),
                image: None,
            },
            minimum: 1,
            maximum,
            zones: vec!["eu-west-1a".into()],
            ..Default::default()
        }
    }

    #[test]
    fn equal_collections_compare_equal() {
        let a = vec![worker("pool-1", 3), worker("pool-2", 5)];
        let b = vec![worker("pool-1", 3), worker("pool-2", 5)];
        assert!(pools_equal(&a, &b));
    }

    #[test]
    fn removed_pool_is_a_difference() {
        let current = vec![worker("a", 3), worker("b", 3), worker("c", 3)];
        let desired = vec![worker("a", 3), worker("c", 3)];
        assert!(!pools_equal(&current, &desired));
    }

    #[test]
    fn field_change_is_a_difference() {
        let a = vec![worker("pool-1", 3)];
        let mut changed = vec![worker("pool-1", 3)];
        changed[0].maximum = 4;
        assert!(!pools_equal(&a, &changed));

        let mut rezoned = vec![worker("pool-1", 3)];
        rezoned[0].zones = vec!["eu-west-1b".into()];
        assert!(!pools_equal(&a, &rezoned));
    }

    #[test]
    fn reordering_is_a_difference() {
        let a = vec![worker("pool-1", 3), worker("pool-2", 3)];
        let b = vec![worker("pool-2", 3), worker("pool-1", 3)];
        assert!(!pools_equal(&a, &b));
    }
}
