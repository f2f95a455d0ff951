//! Configuration loading.
//!
//! # Data Flow
//! ```text
//! text (TOML or JSON)
//!     → parse_raw: syntax check, split into top-level sections
//!     → validation::validate: required sections, non-empty interfaces
//!     → decode: resolve each `kind` through the registry, decode params
//!     → Document
//! ```
//!
//! Every polymorphic table carries a `kind` discriminator. The loader strips
//! the keys it owns (`kind`, a namer's `prefix`, storage's `experimental`)
//! and hands the remaining keys to the kind's decoder.

use std::fs;
use std::path::Path as FsPath;

use serde_json::{Map, Value};

use crate::config::schema::{
    AdminConfig, Document, InterfaceSpec, NamerSpec, RawDocument, StorageSpec, TelemeterSpec,
};
use crate::config::validation::validate;
use crate::config::{ConfigError, ParseError};
use crate::registry::{self, Registry, Role};
use crate::routing::Path;

/// Serialization format of a configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Json,
}

impl Format {
    /// JSON for `.json` files, TOML for everything else.
    pub fn from_path(path: &FsPath) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Toml,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Format::Toml => "TOML",
            Format::Json => "JSON",
        }
    }
}

/// Read and load the document at `path` with the process-wide registry.
pub fn load_config(path: &FsPath) -> Result<Document, ConfigError> {
    let registry = registry::global()?;
    load_config_with(path, registry)
}

/// Read and load the document at `path` with an explicit registry.
pub fn load_config_with(path: &FsPath, registry: &Registry) -> Result<Document, ConfigError> {
    let text = fs::read_to_string(path)?;
    tracing::debug!(path = %path.display(), "Loading configuration");
    load(&text, Format::from_path(path), registry)
}

/// Parse, validate and decode `text`.
pub fn load(text: &str, format: Format, registry: &Registry) -> Result<Document, ConfigError> {
    let raw = parse_raw(text, format)?;
    validate(&raw)?;
    decode(raw, registry)
}

/// Parse and decode `text` without the structural checks.
///
/// Kinds are still resolved and required sections still enforced, but an
/// empty interface list is accepted. [`load`] is the full pipeline.
pub fn parse(text: &str, format: Format, registry: &Registry) -> Result<Document, ConfigError> {
    decode(parse_raw(text, format)?, registry)
}

/// Syntax check only: split the document into its sections.
pub fn parse_raw(text: &str, format: Format) -> Result<RawDocument, ParseError> {
    let syntax = |message: String| ParseError::Syntax {
        format: format.name(),
        message,
    };
    let value: Value = match format {
        Format::Toml => toml::from_str(text).map_err(|e| syntax(e.to_string()))?,
        Format::Json => serde_json::from_str(text).map_err(|e| syntax(e.to_string()))?,
    };
    serde_json::from_value(value).map_err(|e| malformed("document", e))
}

/// Resolve every component through `registry`.
pub fn decode(raw: RawDocument, registry: &Registry) -> Result<Document, ConfigError> {
    let admin = match raw.admin {
        None | Some(Value::Null) => None,
        Some(value) => Some(
            serde_json::from_value::<AdminConfig>(value).map_err(|e| malformed("admin", e))?,
        ),
    };

    let storage = raw
        .storage
        .ok_or_else(|| ConfigError::missing("storage"))
        .and_then(|value| decode_storage(value, registry))?;

    let namers = raw
        .namers
        .ok_or_else(|| ConfigError::missing("namers"))?
        .into_iter()
        .enumerate()
        .map(|(i, value)| decode_namer(value, format!("namers[{i}]"), registry))
        .collect::<Result<Vec<_>, _>>()?;

    let interfaces = raw
        .interfaces
        .ok_or_else(|| ConfigError::missing("interfaces"))?
        .into_iter()
        .enumerate()
        .map(|(i, value)| {
            let location = format!("interfaces[{i}]");
            let mut component = Component::split(value, location)?;
            let decoder = registry
                .interface(&component.kind)
                .ok_or_else(|| component.unknown(Role::Interface))?;
            let config = decoder(component.take_params())
                .map_err(|e| component.invalid(Role::Interface, e))?;
            Ok(InterfaceSpec {
                kind: component.kind,
                config,
            })
        })
        .collect::<Result<Vec<_>, ConfigError>>()?;

    let telemetry = raw
        .telemetry
        .map(|telemeters| {
            telemeters
                .into_iter()
                .enumerate()
                .map(|(i, value)| {
                    let mut component = Component::split(value, format!("telemetry[{i}]"))?;
                    let decoder = registry
                        .telemeter(&component.kind)
                        .ok_or_else(|| component.unknown(Role::Telemeter))?;
                    let config = decoder(component.take_params())
                        .map_err(|e| component.invalid(Role::Telemeter, e))?;
                    Ok(TelemeterSpec {
                        kind: component.kind,
                        config,
                    })
                })
                .collect::<Result<Vec<_>, ConfigError>>()
        })
        .transpose()?;

    Ok(Document {
        admin,
        storage,
        namers,
        interfaces,
        telemetry,
    })
}

fn decode_storage(value: Value, registry: &Registry) -> Result<StorageSpec, ConfigError> {
    let mut component = Component::split(value, "storage".to_string())?;
    let experimental = match component.params.remove("experimental") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => flag,
        Some(other) => {
            return Err(malformed(
                "storage.experimental",
                format!("expected a boolean, found {other}"),
            )
            .into())
        }
    };
    let entry = registry
        .storage(&component.kind)
        .ok_or_else(|| component.unknown(Role::Storage))?;
    let config = (entry.decode)(component.take_params())
        .map_err(|e| component.invalid(Role::Storage, e))?;
    Ok(StorageSpec {
        kind: component.kind,
        experimental,
        experimental_required: entry.experimental,
        config,
    })
}

fn decode_namer(value: Value, location: String, registry: &Registry) -> Result<NamerSpec, ConfigError> {
    let mut component = Component::split(value, location)?;
    let prefix = match component.params.remove("prefix") {
        None | Some(Value::Null) => format!("/#/{}", component.kind),
        Some(Value::String(prefix)) => prefix,
        Some(other) => {
            return Err(malformed(
                format!("{}.prefix", component.location),
                format!("expected a path string, found {other}"),
            )
            .into())
        }
    };
    let prefix: Path = prefix
        .parse()
        .map_err(|e| malformed(format!("{}.prefix", component.location), e))?;
    let decoder = registry
        .namer(&component.kind)
        .ok_or_else(|| component.unknown(Role::Namer))?;
    let config = decoder(component.take_params())
        .map_err(|e| component.invalid(Role::Namer, e))?;
    Ok(NamerSpec {
        prefix,
        kind: component.kind,
        config,
    })
}

/// A polymorphic table with its discriminator split off.
struct Component {
    location: String,
    kind: String,
    params: Map<String, Value>,
}

impl Component {
    fn split(value: Value, location: String) -> Result<Self, ParseError> {
        let mut params = match value {
            Value::Object(params) => params,
            other => return Err(malformed(&location, format!("expected a table, found {other}"))),
        };
        let kind = match params.remove("kind") {
            None | Some(Value::Null) => return Err(ParseError::MissingField(format!("{location}.kind"))),
            Some(Value::String(kind)) => kind,
            Some(other) => {
                return Err(malformed(
                    format!("{location}.kind"),
                    format!("expected a string, found {other}"),
                ))
            }
        };
        Ok(Self {
            location,
            kind,
            params,
        })
    }

    fn take_params(&mut self) -> Value {
        Value::Object(std::mem::take(&mut self.params))
    }

    fn unknown(&self, role: Role) -> ParseError {
        ParseError::UnknownKind {
            role,
            kind: self.kind.clone(),
            location: self.location.clone(),
        }
    }

    fn invalid(&self, role: Role, error: serde_json::Error) -> ParseError {
        ParseError::InvalidParams {
            role,
            kind: self.kind.clone(),
            location: self.location.clone(),
            message: error.to_string(),
        }
    }
}

fn malformed(location: impl Into<String>, message: impl ToString) -> ParseError {
    ParseError::Malformed {
        location: location.into(),
        message: message.to_string(),
    }
}
