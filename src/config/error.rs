//! Configuration and composition errors.
//!
//! Every variant is fatal to composition. Validators return on the first
//! violation; nothing is downgraded to a warning.

use thiserror::Error;

use crate::registry::Role;
use crate::routing::Path;

/// Errors produced while turning document text into a [`Document`].
///
/// [`Document`]: crate::config::Document
#[derive(Debug, Error)]
pub enum ParseError {
    /// The text is not valid TOML/JSON.
    #[error("{format} syntax error: {message}")]
    Syntax { format: &'static str, message: String },

    /// The text parsed but its shape is wrong (not an object, unknown key, ...).
    #[error("malformed configuration at '{location}': {message}")]
    Malformed { location: String, message: String },

    /// A required field is null or absent.
    #[error("missing required field '{0}'")]
    MissingField(String),

    /// A `kind` discriminator has no registry entry for its role.
    #[error("unknown {role} kind '{kind}' at '{location}'")]
    UnknownKind {
        role: Role,
        kind: String,
        location: String,
    },

    /// Kind-specific parameters were rejected by the kind's schema.
    #[error("invalid parameters for {role} kind '{kind}' at '{location}': {message}")]
    InvalidParams {
        role: Role,
        kind: String,
        location: String,
        message: String,
    },

    /// The process-wide registry was read before it was installed.
    #[error("plugin registry has not been loaded")]
    RegistryNotLoaded,
}

/// Errors raised by a component factory while materializing a plugin.
#[derive(Debug, Error)]
pub enum ComponentError {
    #[error("invalid parameter '{name}': {message}")]
    InvalidParam { name: &'static str, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage error: {0}")]
    Storage(#[from] crate::storage::StoreError),
}

/// Top-level error for loading, validating and composing a document.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("at least one interface must be configured")]
    NoInterfaces,

    #[error("namer at 'namers[{index}]' has an empty prefix")]
    EmptyNamerPrefix { index: usize },

    #[error("conflicting namers: prefix {0} overlaps prefix {1}")]
    ConflictingNamers(Path, Path),

    #[error("storage kind '{kind}' is experimental; set 'experimental = true' to enable it")]
    ExperimentalFeatureDisabled { kind: String },

    #[error("failed to build {role} kind '{kind}': {source}")]
    Component {
        role: Role,
        kind: String,
        #[source]
        source: ComponentError,
    },
}

impl ConfigError {
    pub(crate) fn missing(field: impl Into<String>) -> Self {
        ConfigError::Parse(ParseError::MissingField(field.into()))
    }

    pub(crate) fn component(role: Role, kind: &str, source: ComponentError) -> Self {
        ConfigError::Component {
            role,
            kind: kind.to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigError::ConflictingNamers("/a".parse().unwrap(), "/a/x".parse().unwrap());
        assert_eq!(err.to_string(), "conflicting namers: prefix /a overlaps prefix /a/x");

        let err = ConfigError::missing("interfaces");
        assert_eq!(err.to_string(), "missing required field 'interfaces'");

        let err = ParseError::UnknownKind {
            role: Role::Namer,
            kind: "nope".into(),
            location: "namers[1]".into(),
        };
        assert_eq!(err.to_string(), "unknown namer kind 'nope' at 'namers[1]'");
    }

    #[test]
    fn test_component_error_keeps_source() {
        let err = ConfigError::component(
            Role::Interface,
            "http",
            ComponentError::InvalidParam {
                name: "ip",
                message: "not an address".into(),
            },
        );
        assert!(err.to_string().contains("interface kind 'http'"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
