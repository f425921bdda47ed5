#![no_main]

use ferrous_autowire::{Container, ContainerError, Overrides, Signature};
use libfuzzer_sys::fuzz_target;

const IDS: [&str; 6] = ["a", "b", "c", "d", "e", "f"];

// Each byte pair is one operation on a small identifier space, so aliases,
// registrations and lookups collide often.
fuzz_target!(|data: &[u8]| {
    let mut container = Container::new();

    for op in data.chunks_exact(2) {
        let id = IDS[(op[1] % 6) as usize];
        let other = IDS[((op[1] / 6) % 6) as usize];

        match op[0] % 6 {
            0 => {
                let _ = container.set_alias(id, other);
            }
            1 => {
                let value = op[1] as u64;
                let factory = Signature::new("fuzz").factory(move |_| Ok(value));
                let _ = container.set_factory(id, factory);
            }
            2 => {
                let _ = container.set_instance_of(id, op[1] as u64);
            }
            3 => {
                let _ = container.set_argument_overrides(id, Overrides::new().with("n", op[1]));
            }
            4 => {
                let _ = container.add_decorator(
                    id,
                    Signature::new("inc").decorator::<u64, _>(|n, _| Ok(Some(n.wrapping_add(1)))),
                );
            }
            _ => match container.get(id) {
                Ok(instance) => assert!(instance.downcast::<u64>().is_ok()),
                Err(ContainerError::AliasCycle { path }) => {
                    assert!(path.len() >= 2);
                    assert_eq!(path.first().map(String::as_str), Some(id));
                }
                Err(err) => assert!(err.is_not_found(), "unexpected error: {err}"),
            },
        }

        // canonical ids never panic and agree with has()
        if container.canonical_id(id).is_err() {
            assert!(!container.has(id));
        }
    }
});
