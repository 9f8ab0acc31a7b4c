// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Member paths (`position.x`, `points[2].y`, `#points`).

use crate::dynamic::DynamicDataError;
use std::fmt;

/// One step of a member path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Struct member by name.
    Field(String),
    /// Sequence or array element, as written by the caller.
    Index(usize),
}

/// Parsed member path.
///
/// A leading `#` turns the path into a length query on a sequence or array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberPath {
    segments: Vec<PathSegment>,
    length_query: bool,
}

impl MemberPath {
    /// Parse a textual path.
    pub fn parse(path: &str) -> Result<Self, DynamicDataError> {
        let invalid = || DynamicDataError::FieldNotFound(path.to_string());

        let (body, length_query) = match path.strip_prefix('#') {
            Some(rest) => (rest, true),
            None => (path, false),
        };

        let mut segments = Vec::new();
        let mut chars = body.char_indices().peekable();
        let mut expect_name = true;

        while let Some(&(start, c)) = chars.peek() {
            match c {
                '.' if !expect_name => {
                    chars.next();
                    expect_name = true;
                }
                '[' if !expect_name => {
                    chars.next();
                    let mut digits = String::new();
                    loop {
                        match chars.next() {
                            Some((_, ']')) => break,
                            Some((_, d)) if d.is_ascii_digit() => digits.push(d),
                            _ => return Err(invalid()),
                        }
                    }
                    let index = digits.parse::<usize>().map_err(|_| invalid())?;
                    segments.push(PathSegment::Index(index));
                }
                _ if expect_name => {
                    let mut end = body.len();
                    while let Some(&(i, ch)) = chars.peek() {
                        if ch == '.' || ch == '[' {
                            end = i;
                            break;
                        }
                        if ch == ']' || ch.is_whitespace() {
                            return Err(invalid());
                        }
                        chars.next();
                    }
                    let name = &body[start..end];
                    if name.is_empty() {
                        return Err(invalid());
                    }
                    segments.push(PathSegment::Field(name.to_string()));
                    expect_name = false;
                }
                _ => return Err(invalid()),
            }
        }

        if segments.is_empty() || expect_name {
            return Err(invalid());
        }

        Ok(Self {
            segments,
            length_query,
        })
    }

    /// Path segments in order.
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Whether the path was written as `#member`.
    pub fn is_length_query(&self) -> bool {
        self.length_query
    }

    /// Rewrite every element index; `None` from `f` aborts with that index.
    pub fn map_indices<F>(mut self, mut f: F) -> Result<Self, usize>
    where
        F: FnMut(usize) -> Option<usize>,
    {
        for segment in &mut self.segments {
            if let PathSegment::Index(i) = segment {
                *i = f(*i).ok_or(*i)?;
            }
        }
        Ok(self)
    }
}

impl fmt::Display for MemberPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.length_query {
            write!(f, "#")?;
        }
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if i == 0 => write!(f, "{}", name)?,
                PathSegment::Field(name) => write!(f, ".{}", name)?,
                PathSegment::Index(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}
