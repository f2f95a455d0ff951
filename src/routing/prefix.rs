//! Namer prefix conflict detection.
//!
//! # Responsibilities
//! - Reject empty namer prefixes
//! - Reject any two prefixes where one is an ancestor of (or equal to) the other
//! - Build the namer table once the prefixes form a disjoint partition
//!
//! # Design Decisions
//! - First violation wins; errors are not collected
//! - Emptiness is checked for every entry before any pair is compared
//! - O(n²) pairwise scan, acceptable for tens of namers
//! - No namer is constructed until every prefix has passed

use crate::config::{ConfigError, NamerSpec};
use crate::registry::Role;
use crate::routing::{NamerTable, Path};

/// Verify that `prefixes` partition the namespace without overlap.
///
/// Conflicts are reported as `(earlier, later)` in declaration order.
pub fn check_disjoint<'a, I>(prefixes: I) -> Result<(), ConfigError>
where
    I: IntoIterator<Item = &'a Path>,
{
    let prefixes: Vec<&Path> = prefixes.into_iter().collect();

    if let Some(index) = prefixes.iter().position(|p| p.is_empty()) {
        return Err(ConfigError::EmptyNamerPrefix { index });
    }

    for (i, later) in prefixes.iter().enumerate() {
        if let Some(earlier) = prefixes[..i].iter().find(|earlier| earlier.overlaps(later)) {
            return Err(ConfigError::ConflictingNamers((*earlier).clone(), (*later).clone()));
        }
    }
    Ok(())
}

/// Validate namer prefixes and materialize each namer into a [`NamerTable`].
pub fn check_prefixes(specs: &[NamerSpec]) -> Result<NamerTable, ConfigError> {
    check_disjoint(specs.iter().map(|s| &s.prefix))?;

    let mut entries = Vec::with_capacity(specs.len());
    for spec in specs {
        let namer = spec
            .config
            .build(&spec.prefix)
            .map_err(|e| ConfigError::component(Role::Namer, &spec.kind, e))?;
        tracing::debug!(prefix = %spec.prefix, kind = %spec.kind, "Namer built");
        entries.push((spec.prefix.clone(), spec.kind.clone(), namer));
    }
    Ok(NamerTable::from_entries(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namer::fixed::FixedConfig;

    fn paths(raw: &[&str]) -> Vec<Path> {
        raw.iter().map(|p| p.parse().unwrap()).collect()
    }

    fn spec(prefix: &str) -> NamerSpec {
        NamerSpec {
            prefix: prefix.parse().unwrap(),
            kind: "fixed".into(),
            config: Box::new(FixedConfig::default()),
        }
    }

    #[test]
    fn test_disjoint_prefixes_pass() {
        assert!(check_disjoint(&paths(&["/a", "/b", "/ab", "/c/d", "/c/e"])).is_ok());
        assert!(check_disjoint(&paths(&[])).is_ok());
    }

    #[test]
    fn test_ancestor_conflict_names_both() {
        let err = check_disjoint(&paths(&["/a", "/b", "/a/x"])).unwrap_err();
        match err {
            ConfigError::ConflictingNamers(a, b) => {
                assert_eq!(a.to_string(), "/a");
                assert_eq!(b.to_string(), "/a/x");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_descendant_declared_first_conflicts() {
        let err = check_disjoint(&paths(&["/a/x", "/a"])).unwrap_err();
        assert!(matches!(err, ConfigError::ConflictingNamers(a, b)
            if a.to_string() == "/a/x" && b.to_string() == "/a"));
    }

    #[test]
    fn test_equal_prefixes_conflict() {
        let err = check_disjoint(&paths(&["/a", "/a"])).unwrap_err();
        assert!(matches!(err, ConfigError::ConflictingNamers(_, _)));
    }

    #[test]
    fn test_empty_prefix_wins_over_conflict() {
        let err = check_disjoint(&paths(&["/a", "/a/b", "/"])).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyNamerPrefix { index: 2 }));
    }

    #[test]
    fn test_check_prefixes_builds_table() {
        let table = check_prefixes(&[spec("/a"), spec("/b")]).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_check_prefixes_reports_factory_failure() {
        let bad = NamerSpec {
            prefix: "/a".parse().unwrap(),
            kind: "fixed".into(),
            config: Box::new(FixedConfig {
                addresses: vec!["not-an-address".into()],
            }),
        };
        let err = check_prefixes(&[bad]).unwrap_err();
        assert!(matches!(err, ConfigError::Component { role: Role::Namer, .. }));
    }
}
