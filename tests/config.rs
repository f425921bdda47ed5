#![cfg(feature = "config")]

use ferrous_autowire::{
    Constructor, Container, ContainerConfig, ContainerError, Injectable, Overrides, Parameter,
    Signature,
};
use std::io::Write;

#[derive(Debug)]
struct Server {
    host: String,
    port: u16,
    verbose: bool,
    ratio: f64,
}

impl Injectable for Server {
    fn id() -> &'static str {
        "Server"
    }
    fn constructor() -> Constructor<Self> {
        Signature::new("Server::new")
            .param(Parameter::value::<String>("host").default("127.0.0.1".to_string()))
            .param(Parameter::value::<u16>("port").default(80u16))
            .param(Parameter::value::<bool>("verbose").default(false))
            .param(Parameter::value::<f64>("ratio").default(0.5f64))
            .constructor(|args| {
                Ok(Server {
                    host: args.value("host")?,
                    port: args.value("port")?,
                    verbose: args.value("verbose")?,
                    ratio: args.value("ratio")?,
                })
            })
    }
}

const CONFIG: &str = r#"{
    "aliases": { "Http": "Server" },
    "arguments": {
        "Http": { "host": "0.0.0.0", "port": 8080, "verbose": true, "ratio": 0.75 }
    }
}"#;

#[test]
fn test_config_applies_aliases_and_coerces_scalars() {
    let config = ContainerConfig::from_json_str(CONFIG).unwrap();
    let mut container = Container::new();
    container.apply_config(&config).unwrap();

    assert_eq!(container.canonical_id("Http").unwrap(), "Server");
    let server = container.get_type::<Server>().unwrap();
    assert_eq!(server.host, "0.0.0.0");
    assert_eq!(server.port, 8080);
    assert!(server.verbose);
    assert_eq!(server.ratio, 0.75);
}

#[test]
fn test_config_wins_over_code_overrides() {
    let mut container = Container::new();
    container
        .set_argument_overrides(
            "Server",
            Overrides::new().with("port", 9000u16).with("host", "code".to_string()),
        )
        .unwrap();

    let config =
        ContainerConfig::from_json_str(r#"{ "arguments": { "Server": { "port": 9443 } } }"#)
            .unwrap();
    container.apply_config(&config).unwrap();

    let server = container.get_type::<Server>().unwrap();
    assert_eq!(server.port, 9443);
    assert_eq!(server.host, "code");
}

#[test]
fn test_out_of_range_value_is_a_mismatch() {
    let config =
        ContainerConfig::from_json_str(r#"{ "arguments": { "Server": { "port": 70000 } } }"#)
            .unwrap();
    let mut container = Container::new();
    container.apply_config(&config).unwrap();

    let err = container.get_type::<Server>().unwrap_err();
    assert!(matches!(err, ContainerError::TypeMismatch { expected: "u16", .. }));
}

#[test]
fn test_config_from_path() {
    let path = std::env::temp_dir().join(format!("ferrous-autowire-{}.json", std::process::id()));
    std::fs::File::create(&path)
        .and_then(|mut file| file.write_all(CONFIG.as_bytes()))
        .unwrap();

    let config = ContainerConfig::from_path(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(config.aliases.get("Http").map(String::as_str), Some("Server"));
    assert_eq!(config.arguments["Http"].len(), 4);

    let missing = ContainerConfig::from_path(&path).unwrap_err();
    assert!(matches!(
        missing,
        ContainerError::Config(message) if message.contains("ferrous-autowire-")
    ));
}

#[test]
fn test_invalid_json_is_a_config_error() {
    let err = ContainerConfig::from_json_str("{ not json").unwrap_err();
    assert!(matches!(err, ContainerError::Config(_)));
    assert!(err.to_string().starts_with("Configuration error:"));
}
