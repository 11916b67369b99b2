//! Structured addresses into field schemas and form-value trees.
//!
//! A [`Path`] is an ordered list of object keys and array indices. Its textual form
//! joins keys with `.` and writes indices as `[n]`, e.g. `items[2].country`. The text
//! form is what result sets are keyed by; all manipulation happens on segments.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::PathParseError;

/// One step of a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl Segment {
    /// Schema keys made only of ASCII digits address array slots.
    pub fn from_field_key(key: &str) -> Self {
        if !key.is_empty()
            && key.bytes().all(|b| b.is_ascii_digit())
            && let Ok(index) = key.parse::<usize>()
        {
            return Segment::Index(index);
        }
        Segment::Key(key.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
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

    pub fn push_key(&mut self, key: impl Into<String>) {
        self.segments.push(Segment::Key(key.into()));
    }

    pub fn push_index(&mut self, index: usize) {
        self.segments.push(Segment::Index(index));
    }

    /// Returns a new path with `key` appended as an object member.
    pub fn join_key(&self, key: &str) -> Self {
        let mut next = self.clone();
        next.push_key(key);
        next
    }

    /// Returns a new path with `index` appended as an array slot.
    pub fn join_index(&self, index: usize) -> Self {
        let mut next = self.clone();
        next.push_index(index);
        next
    }

    /// Appends a schema key, treating all-digit keys as array slots.
    pub fn join_field(&self, key: &str) -> Self {
        let mut next = self.clone();
        next.segments.push(Segment::from_field_key(key));
        next
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, head) = self.segments.split_last()?;
        Some(Self::from_segments(head.to_vec()))
    }

    pub fn last_key(&self) -> Option<&str> {
        self.segments.iter().rev().find_map(|segment| match segment {
            Segment::Key(key) => Some(key.as_str()),
            Segment::Index(_) => None,
        })
    }

    /// Removes a trailing `key` segment, yielding the context the key lives in.
    ///
    /// `items[0].country` stripped of `country` is `items[0]`; a path that does not
    /// end with `key` yields `None`.
    pub fn strip_key_suffix(&self, key: &str) -> Option<Self> {
        match self.segments.last() {
            Some(Segment::Key(last)) if last == key => self.parent(),
            _ => None,
        }
    }

    /// Drops every array index, giving the row-independent address.
    pub fn without_indices(&self) -> Self {
        Self::from_segments(
            self.segments
                .iter()
                .filter(|segment| matches!(segment, Segment::Key(_)))
                .cloned()
                .collect(),
        )
    }

    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Follows the path through a value tree. Index segments also match object
    /// members whose key is the decimal index.
    pub fn lookup<'a>(&self, tree: &'a Value) -> Option<&'a Value> {
        let mut current = tree;
        for segment in &self.segments {
            current = match (segment, current) {
                (Segment::Key(key), Value::Object(map)) => map.get(key)?,
                (Segment::Index(index), Value::Array(items)) => items.get(*index)?,
                (Segment::Index(index), Value::Object(map)) => map.get(&index.to_string())?,
                _ => return None,
            };
        }
        Some(current)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Key(key) if position == 0 => f.write_str(key)?,
                Segment::Key(key) => write!(f, ".{key}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = PathParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut segments = Vec::new();
        let bytes = raw.as_bytes();
        let mut pos = 0;
        let mut expect_key = true;

        while pos < bytes.len() {
            match bytes[pos] {
                b'[' => {
                    let close = raw[pos..]
                        .find(']')
                        .map(|offset| pos + offset)
                        .ok_or(PathParseError::UnterminatedIndex(pos))?;
                    let digits = &raw[pos + 1..close];
                    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                        return Err(PathParseError::InvalidIndex(digits.to_string()));
                    }
                    let index = digits
                        .parse::<usize>()
                        .map_err(|_| PathParseError::InvalidIndex(digits.to_string()))?;
                    segments.push(Segment::Index(index));
                    pos = close + 1;
                    expect_key = false;
                }
                b'.' => {
                    if segments.is_empty() {
                        return Err(PathParseError::EmptySegment(pos));
                    }
                    pos += 1;
                    expect_key = true;
                    if pos == bytes.len() {
                        return Err(PathParseError::EmptySegment(pos));
                    }
                }
                b']' => {
                    return Err(PathParseError::UnexpectedChar { found: ']', at: pos });
                }
                _ => {
                    if !expect_key {
                        let found = raw[pos..].chars().next().unwrap_or(']');
                        return Err(PathParseError::UnexpectedChar { found, at: pos });
                    }
                    let end = raw[pos..]
                        .find(['.', '[', ']'])
                        .map(|offset| pos + offset)
                        .unwrap_or(bytes.len());
                    segments.push(Segment::Key(raw[pos..end].to_string()));
                    pos = end;
                    expect_key = false;
                }
            }
            if expect_key && pos < bytes.len() && matches!(bytes[pos], b'.' | b'[') {
                return Err(PathParseError::EmptySegment(pos));
            }
        }

        Ok(Self { segments })
    }
}

/// Reads the value stored at a textual path, `None` when the path does not parse
/// or leads nowhere.
pub fn get_nested_value<'a>(tree: &'a Value, path: &str) -> Option<&'a Value> {
    path.parse::<Path>().ok()?.lookup(tree)
}
