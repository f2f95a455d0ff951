//! Structural validation.
//!
//! # Responsibilities
//! - Required sections are present (storage, namers, interfaces)
//! - The interface list is non-empty
//!
//! # Design Decisions
//! - Runs on the untyped document, before any kind is resolved, so the result
//!   does not depend on which plugins are registered
//! - Interfaces are checked first: an empty interface list is reported as
//!   such whatever else is wrong with the document
//! - Returns the first violation only

use crate::config::{ConfigError, RawDocument};

/// Check document-level required fields.
pub fn validate(doc: &RawDocument) -> Result<(), ConfigError> {
    match &doc.interfaces {
        None => return Err(ConfigError::missing("interfaces")),
        Some(interfaces) if interfaces.is_empty() => return Err(ConfigError::NoInterfaces),
        Some(_) => {}
    }
    // An empty namer list is valid: the whole namespace is delegated elsewhere.
    if doc.namers.is_none() {
        return Err(ConfigError::missing("namers"));
    }
    if doc.storage.as_ref().map_or(true, |s| s.is_null()) {
        return Err(ConfigError::missing("storage"));
    }
    Ok(())
}
