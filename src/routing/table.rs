//! Prefix → namer lookup table.
//!
//! # Responsibilities
//! - Store namers keyed by their (disjoint) prefixes
//! - Find the namer governing a path and hand it the residual
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) prefix scan; namer counts are in the tens
//! - Declaration order preserved for listing

use std::fmt;
use std::sync::Arc;

use crate::namer::{Namer, Resolution};
use crate::routing::Path;

/// The namers of a composed instance, keyed by prefix.
///
/// Only built through [`check_prefixes`], which guarantees that no two
/// prefixes overlap, so at most one entry governs any path.
///
/// [`check_prefixes`]: crate::routing::prefix::check_prefixes
#[derive(Default)]
pub struct NamerTable {
    entries: Vec<NamerEntry>,
}

struct NamerEntry {
    prefix: Path,
    kind: String,
    namer: Arc<dyn Namer>,
}

impl NamerTable {
    pub(crate) fn from_entries(entries: Vec<(Path, String, Arc<dyn Namer>)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(prefix, kind, namer)| NamerEntry { prefix, kind, namer })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Prefixes and kinds in declaration order.
    pub fn prefixes(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.entries.iter().map(|e| (&e.prefix, e.kind.as_str()))
    }

    /// The namer registered at exactly `prefix`.
    pub fn get(&self, prefix: &Path) -> Option<&Arc<dyn Namer>> {
        self.entries.iter().find(|e| &e.prefix == prefix).map(|e| &e.namer)
    }

    /// Resolve `path` through the namer whose prefix governs it.
    ///
    /// Returns the governing prefix with the namer's answer, or `None` when no
    /// prefix covers the path.
    pub fn resolve(&self, path: &Path) -> Option<(&Path, Resolution)> {
        self.entries.iter().find_map(|e| {
            path.strip_prefix(&e.prefix)
                .map(|residual| (&e.prefix, e.namer.lookup(&residual)))
        })
    }
}

impl fmt::Debug for NamerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|e| (e.prefix.to_string(), &e.kind)))
            .finish()
    }
}
