use crate::error::{self, FieldmapError};
use crate::path::ast::{Path, PathSegment, SegmentKind};
use crate::path::slice::ArrayIterator;

/// Largest magnitude accepted for an index or slice bound.
const MAX_INTEGER: i64 = i32::MAX as i64;

/// Parse a path expression.
///
/// Surrounding whitespace is ignored and an empty input is the root path.
/// Error offsets are byte offsets into `input` as given.
pub fn parse_path(input: &str) -> error::Result<Path> {
    let start = input.len() - input.trim_start().len();
    let end = input.trim_end().len();
    if start >= end {
        return Ok(Path::root());
    }
    let mut parser = PathParser {
        input,
        pos: start,
        end,
    };
    let segments = parser.parse_segments()?;
    Ok(Path::new(segments, input[start..end].to_string()))
}

struct PathParser<'a> {
    input: &'a str,
    pos: usize,
    end: usize,
}

impl PathParser<'_> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..self.end].chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        let mut chars = self.input[self.pos..self.end].chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error(&self, msg: impl Into<String>) -> FieldmapError {
        FieldmapError::parse_at(msg, self.input, self.pos)
    }

    fn unexpected(&self, expected: &str) -> FieldmapError {
        self.error(format!("expected {expected}, found {}", describe(self.peek())))
    }

    fn expect(&mut self, c: char) -> error::Result<()> {
        if self.peek() == Some(c) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{c}'")))
        }
    }

    fn parse_segments(&mut self) -> error::Result<Vec<PathSegment>> {
        let mut segments = Vec::new();

        // A path may open with an index on a root array.
        if self.peek() == Some('[') && self.peek_next() != Some(']') {
            segments.push(self.parse_index_suffix()?);
        } else {
            segments.push(self.parse_field()?);
        }

        while let Some(c) = self.peek() {
            match c {
                '.' => {
                    self.advance();
                    segments.push(self.parse_field()?);
                }
                '[' => segments.push(self.parse_index_suffix()?),
                _ => return Err(self.unexpected("'.' or '['")),
            }
        }

        Ok(segments)
    }

    /// Parse an identifier. `\c` takes `c` literally; between `\[` and `\]`
    /// dots belong to the name; `[]` is a literal pair.
    fn parse_field(&mut self) -> error::Result<PathSegment> {
        let start = self.pos;
        let mut name = String::new();
        let mut in_escaped_brackets = false;

        while let Some(c) = self.peek() {
            match c {
                '\\' => {
                    self.advance();
                    let escaped = self
                        .advance()
                        .ok_or_else(|| self.unexpected("an escaped character"))?;
                    match escaped {
                        '[' => in_escaped_brackets = true,
                        ']' => in_escaped_brackets = false,
                        _ => {}
                    }
                    name.push(escaped);
                }
                '.' if in_escaped_brackets => {
                    self.advance();
                    name.push('.');
                }
                '.' => break,
                '[' if self.peek_next() == Some(']') => {
                    self.advance();
                    self.advance();
                    name.push_str("[]");
                }
                '[' => break,
                ']' => return Err(self.unexpected("an identifier character")),
                _ => {
                    self.advance();
                    name.push(c);
                }
            }
        }

        if name.is_empty() {
            return Err(self.unexpected("an identifier"));
        }
        Ok(self.segment(SegmentKind::ObjectIndex { name }, start))
    }

    /// Parse `[N]`, `[[N]]` or `[[N,M]]`.
    fn parse_index_suffix(&mut self) -> error::Result<PathSegment> {
        let start = self.pos;
        self.expect('[')?;

        if self.peek() != Some('[') {
            let index = self.parse_integer()?;
            self.expect(']')?;
            return Ok(self.segment(SegmentKind::ArrayIndex { index }, start));
        }

        self.advance();
        let first = self.parse_integer()?;
        let size = match self.peek() {
            Some(',') => {
                self.advance();
                Some(self.parse_integer()?)
            }
            Some(']') => None,
            _ => return Err(self.unexpected("',' or ']'")),
        };
        self.expect(']')?;
        self.expect(']')?;
        Ok(self.segment(
            SegmentKind::ArrayIterator(ArrayIterator::new(first, size)),
            start,
        ))
    }

    /// Parse an optionally signed run of decimal digits.
    fn parse_integer(&mut self) -> error::Result<i64> {
        let negative = match self.peek() {
            Some('-') => {
                self.advance();
                true
            }
            Some('+') => {
                self.advance();
                false
            }
            _ => false,
        };

        let digits_start = self.pos;
        let mut magnitude: i64 = 0;
        while let Some(c) = self.peek() {
            let Some(digit) = c.to_digit(10) else { break };
            magnitude = magnitude * 10 + i64::from(digit);
            if magnitude > MAX_INTEGER {
                return Err(self.error(format!(
                    "integer literal out of range (limit is {MAX_INTEGER})"
                )));
            }
            self.advance();
        }

        if self.pos == digits_start {
            return Err(self.unexpected("a digit"));
        }
        Ok(if negative { -magnitude } else { magnitude })
    }

    fn segment(&self, kind: SegmentKind, start: usize) -> PathSegment {
        PathSegment {
            kind,
            text: self.input[start..self.pos].to_string(),
            offset: start,
        }
    }
}

fn describe(c: Option<char>) -> String {
    match c {
        Some(c) => format!("'{c}'"),
        None => "end of input".to_string(),
    }
}
