use crate::path::slice::ArrayIterator;
use std::fmt;

/// A parsed path expression: `users[0].name`, `rows[[1,-2]].id`, or the
/// empty root path.
///
/// A `Path` is never modified after parsing, so one instance can be shared
/// freely (see [`crate::path::PathCache`]).
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    segments: Vec<PathSegment>,
    source: String,
}

/// One step of a [`Path`], together with the text it was parsed from.
#[derive(Debug, Clone, PartialEq)]
pub struct PathSegment {
    pub kind: SegmentKind,
    /// The exact source text of this segment, escapes included.
    pub text: String,
    /// Byte offset of `text` within the string handed to the parser.
    pub offset: usize,
}

/// The three kinds of path step.
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentKind {
    /// A named object member: `name`
    ObjectIndex { name: String },
    /// A signed array position: `[2]`, `[-1]`
    ArrayIndex { index: i64 },
    /// A signed array slice: `[[1]]`, `[[1,3]]`, `[[4,-2]]`
    ArrayIterator(ArrayIterator),
}

impl Path {
    /// The empty path, addressing the whole document.
    pub fn root() -> Self {
        Path {
            segments: Vec::new(),
            source: String::new(),
        }
    }

    pub(crate) fn new(segments: Vec<PathSegment>, source: String) -> Self {
        Path { segments, source }
    }

    /// Build a path directly from segment kinds, without source text.
    pub fn from_kinds(kinds: impl IntoIterator<Item = SegmentKind>) -> Self {
        let segments: Vec<PathSegment> = kinds
            .into_iter()
            .map(|kind| PathSegment {
                kind,
                text: String::new(),
                offset: 0,
            })
            .collect();
        let mut path = Path {
            segments,
            source: String::new(),
        };
        path.source = path.to_string();
        path
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// The trimmed text this path was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The segment kinds alone, without source positions.
    pub fn kinds(&self) -> impl Iterator<Item = &SegmentKind> {
        self.segments.iter().map(|s| &s.kind)
    }

    /// True when no segment addresses an array.
    pub fn is_array_free(&self) -> bool {
        self.kinds()
            .all(|k| matches!(k, SegmentKind::ObjectIndex { .. }))
    }
}

// ---------------------------------------------------------------------------
// Display: canonical, re-parseable text
// ---------------------------------------------------------------------------

// A name holding a `[` with no later `]` cannot be followed by another field:
// the escaped-bracket run it opens would swallow the separating dot.

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 && matches!(segment.kind, SegmentKind::ObjectIndex { .. }) {
                write!(f, ".")?;
            }
            write!(f, "{}", segment.kind)?;
        }
        Ok(())
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentKind::ObjectIndex { name } => write!(f, "{}", escape_name(name)),
            SegmentKind::ArrayIndex { index } => write!(f, "[{index}]"),
            SegmentKind::ArrayIterator(iter) => match iter.size {
                Some(size) => write!(f, "[[{},{size}]]", iter.start),
                None => write!(f, "[[{}]]", iter.start),
            },
        }
    }
}

fn escape_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if matches!(c, '\\' | '.' | '[' | ']') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
