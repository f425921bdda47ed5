use ferrous_autowire::{
    Constructor, Container, ContainerError, Injectable, Instance, Overrides, Parameter, Signature,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug)]
struct Logger {
    sink: &'static str,
}

impl Injectable for Logger {
    fn id() -> &'static str {
        "Logger"
    }
    fn constructor() -> Constructor<Self> {
        Constructor::new(|_| Ok(Logger { sink: "console" }))
    }
}

struct Service {
    log: Arc<Logger>,
    name: String,
}

impl Injectable for Service {
    fn id() -> &'static str {
        "Service"
    }
    fn constructor() -> Constructor<Self> {
        Signature::new("Service::new")
            .param(Parameter::service::<Logger>("log"))
            .param(Parameter::value::<String>("name").default("svc".to_string()))
            .constructor(|args| {
                Ok(Service {
                    log: args.service("log")?,
                    name: args.value("name")?,
                })
            })
    }
}

#[test]
fn test_get_is_idempotent() {
    let mut container = Container::new();
    container.declare::<Logger>().unwrap();

    let first = container.get("Logger").unwrap();
    let second = container.get("Logger").unwrap();
    assert!(first.ptr_eq(&second));
}

#[test]
fn test_logger_factory_scenario() {
    let builds = Arc::new(AtomicUsize::new(0));
    let mut container = Container::new();
    container.declare::<Logger>().unwrap();

    let reflective = container.get_as::<Logger>("Logger").unwrap();
    assert_eq!(reflective.sink, "console");

    let counter = builds.clone();
    container
        .set_factory(
            "Logger",
            Signature::new("file_logger").factory(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Logger { sink: "file" })
            }),
        )
        .unwrap();

    // factories do not change discoverability
    assert!(container.has("Logger"));

    let from_factory = container.get_as::<Logger>("Logger").unwrap();
    assert_eq!(from_factory.sink, "file");
    assert_eq!(builds.load(Ordering::SeqCst), 1);

    let fresh = container.get_fresh("Logger").unwrap();
    assert_eq!(builds.load(Ordering::SeqCst), 2);
    assert!(container.get("Logger").unwrap().ptr_eq(&fresh));
    assert!(!Arc::ptr_eq(&from_factory, &fresh.downcast::<Logger>().unwrap()));
}

#[test]
fn test_service_scenario() {
    let mut container = Container::new();

    let default = container.get_type::<Service>().unwrap();
    assert_eq!(default.name, "svc");

    container
        .set_argument_overrides("Service", Overrides::new().with("name", "custom".to_string()))
        .unwrap();
    let custom = container.get_type::<Service>().unwrap();
    assert_eq!(custom.name, "custom");
    assert!(!Arc::ptr_eq(&default, &custom));
    assert!(Arc::ptr_eq(&default.log, &custom.log));

    let logger = container.get_type::<Logger>().unwrap();
    assert!(Arc::ptr_eq(&logger, &custom.log));
}

#[test]
fn test_has_only_reports_constructible_types() {
    trait Port: Send + Sync {}
    struct Tcp;
    impl Port for Tcp {}

    let mut container = Container::new();
    assert!(!container.has("Logger"));

    container.declare_interface::<dyn Port>("Port").unwrap();
    container
        .set_instance("Port", Instance::interface::<dyn Port>(Arc::new(Tcp)))
        .unwrap();
    assert!(!container.has("Port"));
    assert!(container.get_interface::<dyn Port>("Port").is_ok());

    container.set_instance_of("answer", 42u32).unwrap();
    assert!(!container.has("answer"));
}

#[test]
fn test_unknown_identifier_is_not_found() {
    let mut container = Container::new();
    let err = container.get("Nope").unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "`Nope` is not a constructible type and has no factory");

    trait Port: Send + Sync {}
    container.declare_interface::<dyn Port>("Port").unwrap();
    assert!(matches!(container.get("Port"), Err(ContainerError::NotFound { id }) if id == "Port"));
}

#[test]
fn test_supplied_instance_is_returned_as_is() {
    let mut container = Container::new();
    container.declare::<Logger>().unwrap();

    let supplied = Arc::new(Logger { sink: "memory" });
    container
        .set_instance("Logger", Instance::from_arc(supplied.clone()))
        .unwrap();
    let service = container.get_type::<Service>().unwrap();
    assert!(Arc::ptr_eq(&service.log, &supplied));
}

#[test]
fn test_supplied_instance_must_conform() {
    let mut container = Container::new();
    container.declare::<Logger>().unwrap();
    let err = container.set_instance_of("Logger", "not a logger".to_string()).unwrap_err();
    assert!(matches!(
        err,
        ContainerError::TypeMismatch { expected, .. } if expected.ends_with("Logger")
    ));
}

#[test]
fn test_factory_output_must_conform() {
    let mut container = Container::new();
    container.declare::<Logger>().unwrap();
    container
        .set_factory("Logger", Signature::new("wrong").factory(|_| Ok(7u8)))
        .unwrap();
    let err = container.get("Logger").unwrap_err();
    assert!(matches!(err, ContainerError::TypeMismatch { actual: "u8", .. }));
    assert!(!container.is_cached("Logger").unwrap());
}

#[test]
fn test_fresh_type_rebuilds() {
    let mut container = Container::new();
    let first = container.get_type::<Logger>().unwrap();
    let fresh = container.get_fresh_type::<Logger>().unwrap();
    assert!(!Arc::ptr_eq(&first, &fresh));
    assert!(Arc::ptr_eq(&fresh, &container.get_type::<Logger>().unwrap()));
}

#[test]
fn test_invoke_autowires_without_registering() {
    let mut container = Container::new();
    container.declare::<Logger>().unwrap();

    let describe = Signature::new("describe")
        .param(Parameter::service::<Logger>("log"))
        .param(Parameter::value::<u32>("level").default(3u32))
        .factory(|args| {
            let log = args.service::<Logger>("log")?;
            Ok(format!("{}@{}", log.sink, args.value::<u32>("level")?))
        });

    let out = container.invoke(&describe).unwrap();
    assert_eq!(*out.downcast::<String>().unwrap(), "console@3");
    assert!(container.get("describe").unwrap_err().is_not_found());
}

#[test]
fn test_duplicate_identifier() {
    struct Other;
    impl Injectable for Other {
        fn id() -> &'static str {
            "Logger"
        }
        fn constructor() -> Constructor<Self> {
            Constructor::new(|_| Ok(Other))
        }
    }

    let mut container = Container::new();
    container.declare::<Logger>().unwrap();
    container.declare::<Logger>().unwrap();
    let err = container.declare::<Other>().unwrap_err();
    assert!(matches!(err, ContainerError::DuplicateIdentifier { id, .. } if id == "Logger"));
}

#[test]
fn test_callable_errors_propagate() {
    #[derive(Debug)]
    struct Flaky;
    impl Injectable for Flaky {
        fn id() -> &'static str {
            "Flaky"
        }
        fn constructor() -> Constructor<Self> {
            Signature::new("Flaky::connect")
                .constructor(|_| {
                    Err(ContainerError::callable("Flaky::connect", "connection refused"))
                })
        }
    }

    let mut container = Container::new();
    let err = container.get_type::<Flaky>().unwrap_err();
    assert_eq!(err.to_string(), "`Flaky::connect` failed: connection refused");
    assert!(!container.is_cached("Flaky").unwrap());
}

struct Z;

impl Injectable for Z {
    fn id() -> &'static str {
        "Z"
    }
    fn constructor() -> Constructor<Self> {
        Constructor::new(|_| Ok(Z))
    }
}

struct X {
    z: Arc<Z>,
}

impl Injectable for X {
    fn id() -> &'static str {
        "X"
    }
    fn constructor() -> Constructor<Self> {
        Signature::new("X::new")
            .param(Parameter::service::<Z>("z"))
            .constructor(|args| Ok(X { z: args.service("z")? }))
    }
}

struct Y {
    z: Arc<Z>,
}

impl Injectable for Y {
    fn id() -> &'static str {
        "Y"
    }
    fn constructor() -> Constructor<Self> {
        Signature::new("Y::new")
            .param(Parameter::service::<Z>("z"))
            .constructor(|args| Ok(Y { z: args.service("z")? }))
    }
}

struct W {
    x: Arc<X>,
    y: Arc<Y>,
}

impl Injectable for W {
    fn id() -> &'static str {
        "W"
    }
    fn constructor() -> Constructor<Self> {
        Signature::new("W::new")
            .param(Parameter::service::<X>("x"))
            .param(Parameter::service::<Y>("y"))
            .constructor(|args| {
                Ok(W {
                    x: args.service("x")?,
                    y: args.service("y")?,
                })
            })
    }
}

#[test]
fn test_diamond_shares_one_instance() {
    let mut container = Container::new();
    let w = container.get_type::<W>().unwrap();

    assert!(Arc::ptr_eq(&w.x.z, &w.y.z));
    assert!(Arc::ptr_eq(&w.x.z, &container.get_type::<Z>().unwrap()));
}
