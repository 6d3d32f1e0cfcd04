//! Literal dotted-path access into a JSON state tree.
//!
//! Paths are plain segments separated by `.`; a segment made only of ASCII
//! digits addresses an array index. Nothing is ever evaluated.

use std::fmt;

use serde_json::{Map, Value};

use crate::error::{FieldcheckError, Result};

/// Largest array index a path may address. Writes pad arrays up to the
/// index, so this also bounds the allocation a single write can cause.
pub const MAX_INDEX: usize = 65_535;

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl Segment {
    fn as_key(&self) -> String {
        match self {
            Segment::Key(key) => key.clone(),
            Segment::Index(index) => index.to_string(),
        }
    }
}

/// A parsed field path such as `company.name` or `contacts.0.email`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    raw: String,
    segments: Vec<Segment>,
}

impl FieldPath {
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(invalid(raw, "path is empty"));
        }
        let mut segments = Vec::new();
        for part in raw.split('.') {
            if part.is_empty() {
                return Err(invalid(raw, "empty segment"));
            }
            if part.bytes().all(|b| b.is_ascii_digit()) {
                let index = part
                    .parse::<usize>()
                    .ok()
                    .filter(|index| *index <= MAX_INDEX)
                    .ok_or_else(|| invalid(raw, "array index out of range"))?;
                segments.push(Segment::Index(index));
            } else {
                segments.push(Segment::Key(part.to_string()));
            }
        }
        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The final segment, used to key group context entries.
    pub fn last_segment(&self) -> String {
        self.segments
            .last()
            .map(Segment::as_key)
            .unwrap_or_default()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn invalid(raw: &str, reason: &str) -> FieldcheckError {
    FieldcheckError::InvalidPath {
        path: raw.to_string(),
        reason: reason.to_string(),
    }
}

/// Read the value at `path`, or `None` when any segment is missing.
///
/// Index segments also read object keys of the same text, so `a.0` finds
/// `{"a": {"0": ..}}` as well as `{"a": [..]}`.
pub fn get<'a>(root: &'a Value, path: &FieldPath) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.segments() {
        current = match (segment, current) {
            (Segment::Key(key), Value::Object(map)) => map.get(key)?,
            (Segment::Index(index), Value::Array(items)) => items.get(*index)?,
            (Segment::Index(index), Value::Object(map)) => map.get(&index.to_string())?,
            _ => return None,
        };
    }
    Some(current)
}

/// Return `root` with `value` stored at `path`.
///
/// Missing or scalar intermediates are replaced by containers: an array when
/// the next segment is an index, an object otherwise. Arrays are padded with
/// `null` up to the written index.
pub fn set(root: Value, path: &FieldPath, value: Value) -> Value {
    set_inner(root, path.segments(), value)
}

fn set_inner(node: Value, segments: &[Segment], value: Value) -> Value {
    let Some((head, rest)) = segments.split_first() else {
        return value;
    };

    match (head, node) {
        (Segment::Index(index), Value::Array(mut items)) => {
            if items.len() <= *index {
                items.resize(*index + 1, Value::Null);
            }
            let child = std::mem::take(&mut items[*index]);
            items[*index] = set_inner(child, rest, value);
            Value::Array(items)
        }
        (segment, Value::Object(mut map)) => {
            let key = segment.as_key();
            let child = map.remove(&key).unwrap_or(Value::Null);
            map.insert(key, set_inner(child, rest, value));
            Value::Object(map)
        }
        (Segment::Index(index), _) => {
            let mut items = vec![Value::Null; *index + 1];
            items[*index] = set_inner(Value::Null, rest, value);
            Value::Array(items)
        }
        (Segment::Key(key), _) => {
            let mut map = Map::new();
            map.insert(key.clone(), set_inner(Value::Null, rest, value));
            Value::Object(map)
        }
    }
}
