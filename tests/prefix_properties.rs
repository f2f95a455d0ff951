use namerd::config::{ConfigError, NamerSpec};
use namerd::namer::fixed::FixedConfig;
use namerd::routing::{check_disjoint, check_prefixes, Path};
use proptest::prelude::*;

fn segment() -> impl Strategy<Value = String> {
    "[a-z0-9_-]{1,6}"
}

fn path(segments: &[String]) -> Path {
    format!("/{}", segments.join("/")).parse().unwrap()
}

fn spec(prefix: Path) -> NamerSpec {
    NamerSpec {
        prefix,
        kind: "fixed".into(),
        config: Box::new(FixedConfig::default()),
    }
}

proptest! {
    #[test]
    fn distinct_first_segments_are_disjoint(
        heads in proptest::collection::btree_set(segment(), 0..12),
        tail in proptest::collection::vec(segment(), 0..3),
    ) {
        let specs: Vec<NamerSpec> = heads
            .iter()
            .map(|head| {
                let mut segments = vec![head.clone()];
                segments.extend(tail.iter().cloned());
                spec(path(&segments))
            })
            .collect();

        let table = check_prefixes(&specs).unwrap();
        prop_assert_eq!(table.len(), heads.len());
    }

    #[test]
    fn ancestor_pairs_conflict(
        base in proptest::collection::vec(segment(), 1..4),
        extra in proptest::collection::vec(segment(), 0..3),
        ancestor_first in any::<bool>(),
    ) {
        let ancestor = path(&base);
        let mut longer = base.clone();
        longer.extend(extra);
        let descendant = path(&longer);

        let (earlier, later) = if ancestor_first {
            (ancestor, descendant)
        } else {
            (descendant, ancestor)
        };
        match check_disjoint([&earlier, &later]) {
            Err(ConfigError::ConflictingNamers(a, b)) => {
                prop_assert_eq!(a, earlier);
                prop_assert_eq!(b, later);
            }
            other => prop_assert!(false, "expected a conflict, got {:?}", other),
        }
    }

    #[test]
    fn empty_prefix_always_fails(
        heads in proptest::collection::btree_set(segment(), 0..6),
        position in any::<prop::sample::Index>(),
    ) {
        let mut prefixes: Vec<Path> = heads.iter().map(|h| path(std::slice::from_ref(h))).collect();
        let index = position.index(prefixes.len() + 1);
        prefixes.insert(index, Path::empty());

        match check_disjoint(&prefixes) {
            Err(ConfigError::EmptyNamerPrefix { index: at }) => prop_assert_eq!(at, index),
            other => prop_assert!(false, "expected an empty prefix error, got {:?}", other),
        }
    }
}
