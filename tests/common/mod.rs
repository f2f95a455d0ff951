//! Shared fixtures for integration tests.
//!
//! Probe plugins wrap the built-in kinds and count how often their factory
//! runs, keyed by a `tag` parameter so concurrent tests never share a count.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use serde::Deserialize;

use namerd::config::{load, ComponentError, ConfigError, Document, Format};
use namerd::interface::http::HttpControllerConfig;
use namerd::interface::{InterfaceConfig, InterfaceContext, Servable};
use namerd::namer::fixed::FixedConfig;
use namerd::namer::{Namer, NamerConfig};
use namerd::registry::{builtin, Registry, RegistryEntry};
use namerd::routing::Path;
use namerd::storage::memory::InMemoryConfig;
use namerd::storage::{DtabStore, StorageConfig};
use namerd::telemetry::admin_metrics::AdminMetricsConfig;
use namerd::telemetry::{Telemeter, TelemeterConfig};

fn counts() -> &'static Mutex<HashMap<String, usize>> {
    static COUNTS: OnceLock<Mutex<HashMap<String, usize>>> = OnceLock::new();
    COUNTS.get_or_init(Default::default)
}

fn bump(tag: &str) {
    *counts().lock().unwrap().entry(tag.to_string()).or_default() += 1;
}

/// How many probe factories have run for `tag`.
pub fn builds(tag: &str) -> usize {
    counts().lock().unwrap().get(tag).copied().unwrap_or(0)
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProbeStorage {
    tag: String,
}

impl StorageConfig for ProbeStorage {
    fn build(&self) -> Result<Arc<dyn DtabStore>, ComponentError> {
        bump(&self.tag);
        InMemoryConfig::default().build()
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProbeNamer {
    tag: String,
}

impl NamerConfig for ProbeNamer {
    fn build(&self, prefix: &Path) -> Result<Arc<dyn Namer>, ComponentError> {
        bump(&self.tag);
        FixedConfig::default().build(prefix)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProbeInterface {
    tag: String,
}

impl InterfaceConfig for ProbeInterface {
    fn build(&self, context: &InterfaceContext) -> Result<Arc<dyn Servable>, ComponentError> {
        bump(&self.tag);
        HttpControllerConfig::default().build(context)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProbeTelemeter {
    tag: String,
}

impl TelemeterConfig for ProbeTelemeter {
    fn build(&self) -> Result<Arc<dyn Telemeter>, ComponentError> {
        bump(&self.tag);
        AdminMetricsConfig::default().build()
    }
}

/// Built-in kinds plus the probe kinds. `probe` storage is experimental.
pub fn registry() -> Registry {
    let mut entries = builtin();
    entries.extend([
        RegistryEntry::experimental_storage::<ProbeStorage>("probe"),
        RegistryEntry::namer::<ProbeNamer>("probe"),
        RegistryEntry::interface::<ProbeInterface>("probe"),
        RegistryEntry::telemeter::<ProbeTelemeter>("probe"),
    ]);
    Registry::load(entries).unwrap()
}

/// Load a TOML document against the probe registry.
pub fn document(text: &str) -> Result<Document, ConfigError> {
    load(text, Format::Toml, &registry())
}

/// A TOML document with in-memory storage, one loopback http interface and
/// a `fixed` namer per prefix.
pub fn fixed_namers_toml(prefixes: &[&str]) -> String {
    let mut text = String::new();
    if prefixes.is_empty() {
        text.push_str("namers = []\n");
    }
    text.push_str(
        r#"
[admin]
ip = "127.0.0.1"
port = 0

[storage]
kind = "inMemory"

[[interfaces]]
kind = "http"
ip = "127.0.0.1"
port = 0
"#,
    );
    for prefix in prefixes {
        text.push_str(&format!(
            "\n[[namers]]\nkind = \"fixed\"\nprefix = \"{prefix}\"\naddresses = [\"127.0.0.1:8080\"]\n"
        ));
    }
    text
}
