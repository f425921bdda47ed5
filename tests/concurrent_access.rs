use ferrous_autowire::{
    Constructor, Container, Injectable, Overrides, Parameter, ResolutionObserver, SharedContainer,
    Signature,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::time::Duration;

#[derive(Default)]
struct BuildCounter {
    pools: AtomicUsize,
}

impl ResolutionObserver for BuildCounter {
    fn resolved(&self, id: &str, _duration: Duration) {
        if id == "Pool" {
            self.pools.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[derive(Debug)]
struct Pool {
    size: u32,
}

impl Injectable for Pool {
    fn id() -> &'static str {
        "Pool"
    }
    fn constructor() -> Constructor<Self> {
        Signature::new("Pool::new")
            .param(Parameter::value::<u32>("size").default(4u32))
            .constructor(|args| Ok(Pool { size: args.value("size")? }))
    }
}

#[derive(Debug)]
struct Repository {
    pool: Arc<Pool>,
}

impl Injectable for Repository {
    fn id() -> &'static str {
        "Repository"
    }
    fn constructor() -> Constructor<Self> {
        Signature::new("Repository::new")
            .param(Parameter::service::<Pool>("pool"))
            .constructor(|args| Ok(Repository { pool: args.service("pool")? }))
    }
}

#[derive(Debug)]
struct Cache {
    pool: Arc<Pool>,
}

impl Injectable for Cache {
    fn id() -> &'static str {
        "Cache"
    }
    fn constructor() -> Constructor<Self> {
        Signature::new("Cache::new")
            .param(Parameter::service::<Pool>("pool"))
            .constructor(|args| Ok(Cache { pool: args.service("pool")? }))
    }
}

#[test]
fn test_concurrent_first_requests_build_once() {
    let counter = Arc::new(BuildCounter::default());
    let mut container = Container::new();
    container.add_observer(counter.clone());
    let shared = SharedContainer::new(container);
    let thread_count = 8;
    let barrier = Barrier::new(thread_count);

    let repositories = crossbeam_utils::thread::scope(|s| {
        let handles: Vec<_> = (0..thread_count)
            .map(|i| {
                let shared = &shared;
                let barrier = &barrier;
                s.spawn(move |_| {
                    barrier.wait();
                    if i % 2 == 0 {
                        shared.get_type::<Repository>().unwrap()
                    } else {
                        let cache = shared.get_type::<Cache>().unwrap();
                        Arc::new(Repository { pool: cache.pool.clone() })
                    }
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect::<Vec<_>>()
    })
    .unwrap();

    // diamond: every path shares one pool
    let pool = shared.get_type::<Pool>().unwrap();
    for repository in &repositories {
        assert!(Arc::ptr_eq(&repository.pool, &pool));
    }
    assert_eq!(counter.pools.load(Ordering::SeqCst), 1);
}

#[test]
fn test_registration_while_resolving() {
    let shared = SharedContainer::new(Container::new());
    let original = shared.get_type::<Pool>().unwrap();

    crossbeam_utils::thread::scope(|s| {
        s.spawn(|_| {
            for _ in 0..50 {
                let pool = shared.get_type::<Pool>().unwrap();
                assert!(pool.size == 4 || pool.size == 32);
            }
        });
        s.spawn(|_| {
            shared
                .set_argument_overrides("Pool", Overrides::new().with("size", 32u32))
                .unwrap();
        });
    })
    .unwrap();

    let updated = shared.get_type::<Pool>().unwrap();
    assert_eq!(updated.size, 32);
    assert!(!Arc::ptr_eq(&original, &updated));
}

#[test]
fn test_with_gives_exclusive_access() {
    let shared: SharedContainer = Container::new().into();
    let clone = shared.clone();

    clone.with(|container| {
        container.set_alias("Storage", "Pool").unwrap();
        container.declare::<Pool>().unwrap();
    });

    assert!(shared.has("Storage"));
    let via_alias = shared.get_as::<Pool>("Storage").unwrap();
    let direct = shared.get_type::<Pool>().unwrap();
    assert!(Arc::ptr_eq(&via_alias, &direct));
}
