//! Declarative container configuration (feature `config`).
//!
//! A [`ContainerConfig`] carries aliases and per-identifier argument
//! overrides, typically loaded from a JSON file:
//!
//! ```json
//! {
//!   "aliases": { "Cache": "RedisCache" },
//!   "arguments": { "RedisCache": { "url": "redis://localhost", "pool": 8 } }
//! }
//! ```
//!
//! Override values stay JSON until a parameter consumes them; scalars are
//! then coerced to the parameter's declared type.

use std::any::TypeId;
use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::arguments::Overrides;
use crate::container::Container;
use crate::error::{ContainerError, ContainerResult};
use crate::instance::Instance;
use crate::key::TypeInfo;

/// Aliases and argument overrides to apply to a container.
///
/// # Examples
///
/// ```rust
/// use ferrous_autowire::{Container, ContainerConfig};
///
/// let config = ContainerConfig::from_json_str(r#"{
///     "aliases": { "Port": "port" },
///     "arguments": { "port": { "value": 8080 } }
/// }"#).unwrap();
///
/// let mut container = Container::new();
/// container.apply_config(&config).unwrap();
/// assert_eq!(container.canonical_id("Port").unwrap(), "port");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContainerConfig {
    /// Source identifier to target identifier
    pub aliases: BTreeMap<String, String>,
    /// Identifier to parameter name to value
    pub arguments: BTreeMap<String, BTreeMap<String, Value>>,
}

impl ContainerConfig {
    pub fn from_json_str(json: &str) -> ContainerResult<Self> {
        serde_json::from_str(json).map_err(|e| ContainerError::Config(e.to_string()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> ContainerResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ContainerError::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| ContainerError::Config(format!("{}: {}", path.display(), e)))
    }
}

impl Container {
    /// Applies `config`: aliases first, in key order, then argument
    /// overrides merged over the ones already set (config values win).
    pub fn apply_config(&mut self, config: &ContainerConfig) -> ContainerResult<()> {
        for (from, to) in &config.aliases {
            self.set_alias(from.as_str(), to.as_str())?;
        }
        for (id, values) in &config.arguments {
            let overrides = values.iter().fold(Overrides::new(), |acc, (name, value)| {
                acc.with_instance(name.as_str(), Instance::new(value.clone()))
            });
            self.merge_argument_overrides(id, overrides)?;
        }
        debug!(
            aliases = config.aliases.len(),
            identifiers = config.arguments.len(),
            "configuration applied"
        );
        Ok(())
    }
}

macro_rules! coerce_integer {
    ($json:expr, $declared:expr, $($ty:ty),+) => {
        $(
            if $declared.type_id == TypeId::of::<$ty>() {
                let number = $json
                    .as_i64()
                    .and_then(|n| <$ty>::try_from(n).ok())
                    .or_else(|| $json.as_u64().and_then(|n| <$ty>::try_from(n).ok()));
                return number.map(Instance::new);
            }
        )+
    };
}

/// Converts a JSON scalar override into the declared scalar type.
///
/// Returns `None` when `value` is not JSON, already conforms, or cannot be
/// represented as `declared` (e.g. an out of range integer); the caller then
/// reports the mismatch.
pub(crate) fn coerce(value: &Instance, declared: &TypeInfo) -> Option<Instance> {
    if value.conforms_to(declared) {
        return None;
    }
    let json = value.downcast::<Value>().ok()?;

    if declared.type_id == TypeId::of::<String>() {
        return json.as_str().map(|s| Instance::new(s.to_string()));
    }
    if declared.type_id == TypeId::of::<bool>() {
        return json.as_bool().map(Instance::new);
    }
    if declared.type_id == TypeId::of::<f64>() {
        return json.as_f64().map(Instance::new);
    }
    if declared.type_id == TypeId::of::<f32>() {
        return json.as_f64().map(|f| Instance::new(f as f32));
    }
    coerce_integer!(json, declared, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
    None
}
