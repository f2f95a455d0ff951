//! Hierarchical names.
//!
//! # Responsibilities
//! - Parse `/a/b/c` into segments
//! - Segment-wise prefix comparison
//!
//! # Design Decisions
//! - `""` and `"/"` both read as the empty path
//! - Empty segments (`/a//b`) are rejected rather than collapsed
//! - Comparison is per segment, so `/a` is an ancestor of `/a/x` but not of `/ab`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A hierarchical path such as `/io.l5d.fs/users`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Path {
    segments: Vec<String>,
}

/// Error returned when a string is not a valid path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("path '{0}' must start with '/'")]
    MissingLeadingSlash(String),

    #[error("path '{0}' contains an empty segment")]
    EmptySegment(String),

    #[error("path '{path}' contains invalid character '{ch}'")]
    InvalidCharacter { path: String, ch: char },
}

impl Path {
    /// The empty path.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns true if `prefix` is an ancestor of, or equal to, this path.
    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.segments.len() >= prefix.segments.len()
            && self.segments.iter().zip(&prefix.segments).all(|(a, b)| a == b)
    }

    /// The remainder of this path after `prefix`, if `prefix` is an ancestor.
    pub fn strip_prefix(&self, prefix: &Path) -> Option<Path> {
        if self.starts_with(prefix) {
            Some(Path {
                segments: self.segments[prefix.segments.len()..].to_vec(),
            })
        } else {
            None
        }
    }

    /// The first segment and the path below it.
    pub fn split_first(&self) -> Option<(&str, Path)> {
        let (first, rest) = self.segments.split_first()?;
        Some((
            first.as_str(),
            Path {
                segments: rest.to_vec(),
            },
        ))
    }

    /// Returns true if either path is an ancestor of the other.
    pub fn overlaps(&self, other: &Path) -> bool {
        self.starts_with(other) || other.starts_with(self)
    }

    /// Append a segment, returning the extended path.
    pub fn join(&self, segment: &str) -> Result<Path, PathError> {
        let mut joined = self.clone();
        joined.segments.push(segment.to_string());
        validate_segment(&joined.to_string(), segment)?;
        Ok(joined)
    }
}

fn validate_segment(path: &str, segment: &str) -> Result<(), PathError> {
    if segment.is_empty() {
        return Err(PathError::EmptySegment(path.to_string()));
    }
    if let Some(ch) = segment.chars().find(|c| !is_segment_char(*c)) {
        return Err(PathError::InvalidCharacter {
            path: path.to_string(),
            ch,
        });
    }
    Ok(())
}

fn is_segment_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '.' | '#' | '$' | '%' | '-' | '@')
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s == "/" {
            return Ok(Path::empty());
        }
        let rest = s
            .strip_prefix('/')
            .ok_or_else(|| PathError::MissingLeadingSlash(s.to_string()))?;
        let mut segments = Vec::new();
        for segment in rest.split('/') {
            validate_segment(s, segment)?;
            segments.push(segment.to_string());
        }
        Ok(Path { segments })
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "/");
        }
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> Path {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(p("/a/b").segments(), &["a".to_string(), "b".to_string()]);
        assert_eq!(p("/a/b").to_string(), "/a/b");
        assert_eq!(p("/#/io.l5d.fs").len(), 2);
    }

    #[test]
    fn test_empty_forms() {
        assert!(p("").is_empty());
        assert!(p("/").is_empty());
        assert_eq!(Path::empty().to_string(), "/");
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(matches!("a/b".parse::<Path>(), Err(PathError::MissingLeadingSlash(_))));
        assert!(matches!("/a//b".parse::<Path>(), Err(PathError::EmptySegment(_))));
        assert!(matches!("/a/b/".parse::<Path>(), Err(PathError::EmptySegment(_))));
        assert!(matches!(
            "/a b".parse::<Path>(),
            Err(PathError::InvalidCharacter { ch: ' ', .. })
        ));
    }

    #[test]
    fn test_segment_wise_prefix() {
        assert!(p("/a/x").starts_with(&p("/a")));
        assert!(p("/a").starts_with(&p("/a")));
        assert!(!p("/ab").starts_with(&p("/a")));
        assert!(!p("/a").starts_with(&p("/a/x")));
        assert!(p("/a").overlaps(&p("/a/x")));
        assert!(!p("/a").overlaps(&p("/b")));
    }

    #[test]
    fn test_strip_prefix() {
        assert_eq!(p("/a/x/y").strip_prefix(&p("/a")), Some(p("/x/y")));
        assert_eq!(p("/a").strip_prefix(&p("/a")), Some(Path::empty()));
        assert_eq!(p("/b").strip_prefix(&p("/a")), None);
    }

    #[test]
    fn test_split_first() {
        let abc = p("/a/b/c");
        let (head, rest) = abc.split_first().unwrap();
        assert_eq!(head, "a");
        assert_eq!(rest, p("/b/c"));
        assert!(Path::empty().split_first().is_none());
    }

    #[test]
    fn test_serde_as_string() {
        let parsed: Path = serde_json::from_str("\"/a/b\"").unwrap();
        assert_eq!(parsed, p("/a/b"));
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"/a/b\"");
        assert!(serde_json::from_str::<Path>("\"nope\"").is_err());
    }
}
