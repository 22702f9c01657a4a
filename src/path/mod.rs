pub mod ast;
pub mod eval;
pub mod parser;
pub mod segment;
pub mod slice;

pub use ast::{Path, PathSegment, SegmentKind};
pub use eval::{extract_value, inject_into, inject_value};
pub use parser::parse_path;
pub use slice::ArrayIterator;

use crate::error;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

/// Widest gap of `null`s a write past the end of an array may create.
/// Writes landing further out are skipped.
pub const MAX_PADDING: usize = 65_536;

impl Path {
    /// Parse path text; see [`parse_path`].
    pub fn parse(input: &str) -> error::Result<Path> {
        parse_path(input)
    }
}

impl FromStr for Path {
    type Err = error::FieldmapError;

    fn from_str(s: &str) -> error::Result<Path> {
        parse_path(s)
    }
}

/// Memo of parsed paths keyed by their source text.
///
/// Parsing is pure, so the cache only saves work: asking twice for the same
/// text hands back the same shared [`Path`].
#[derive(Debug, Default)]
pub struct PathCache {
    entries: HashMap<String, Arc<Path>>,
}

impl PathCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(&mut self, input: &str) -> error::Result<Arc<Path>> {
        if let Some(path) = self.entries.get(input) {
            return Ok(Arc::clone(path));
        }
        let path = Arc::new(parse_path(input)?);
        self.entries.insert(input.to_string(), Arc::clone(&path));
        Ok(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_returns_shared_instance() {
        let mut cache = PathCache::new();
        let a = cache.parse("users[0].name").unwrap();
        let b = cache.parse("users[0].name").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn cache_does_not_store_failures() {
        let mut cache = PathCache::new();
        assert!(cache.parse("a[").is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn display_reparses_to_same_path() {
        for text in ["", "a.b", "users[0].name", r"we\.ird\[key\]", "[[1,-2]].x", "m[[0]][2]"] {
            let path: Path = text.parse().unwrap();
            let reparsed = Path::parse(&path.to_string()).unwrap();
            assert!(reparsed.kinds().eq(path.kinds()), "{text}");
        }
    }

    #[test]
    fn cached_equals_fresh_parse() {
        let mut cache = PathCache::new();
        let cached = cache.parse("a[[1,-2]].b").unwrap();
        assert_eq!(*cached, parse_path("a[[1,-2]].b").unwrap());
    }
}
