//! Field paths into nested documents
//!
//! A [`FieldPath`] is parsed once (typically at configuration time) and then
//! resolved against documents without re-splitting strings.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Ordered list of segments addressing a value inside nested objects
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Parse a dotted path such as `profile.address.city`
    pub fn parse(dotted: &str) -> Result<Self> {
        let segments: Vec<String> = dotted.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(Error::invalid_argument(format!(
                "Invalid field path '{dotted}': empty segment"
            )));
        }
        Ok(Self { segments })
    }

    /// Build a path from already separated segments
    pub fn from_segments<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() || segments.iter().any(String::is_empty) {
            return Err(Error::invalid_argument("Field path needs non-empty segments"));
        }
        Ok(Self { segments })
    }

    /// Single-segment path for a top-level field
    pub fn top_level<S: Into<String>>(name: S) -> Self {
        Self {
            segments: vec![name.into()],
        }
    }

    /// Path segments in order
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Whether `self` equals `other` or is one of its ancestors
    pub fn is_prefix_of(&self, other: &FieldPath) -> bool {
        other.segments.len() >= self.segments.len()
            && self.segments.iter().zip(&other.segments).all(|(a, b)| a == b)
    }

    /// Child path with one more segment
    pub fn child<S: Into<String>>(&self, segment: S) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    /// Resolve the value at this path
    pub fn get<'a>(&self, doc: &'a Map<String, Value>) -> Option<&'a Value> {
        let (last, parents) = self.segments.split_last()?;
        let mut current = doc;
        for segment in parents {
            current = current.get(segment)?.as_object()?;
        }
        current.get(last)
    }

    /// Resolve the value at this path mutably
    pub fn get_mut<'a>(&self, doc: &'a mut Map<String, Value>) -> Option<&'a mut Value> {
        let (last, parents) = self.segments.split_last()?;
        let mut current = doc;
        for segment in parents {
            current = current.get_mut(segment)?.as_object_mut()?;
        }
        current.get_mut(last)
    }

    /// Set the value at this path, creating intermediate objects
    ///
    /// Non-object intermediates are replaced by objects.
    pub fn set(&self, doc: &mut Map<String, Value>, value: Value) {
        let Some((last, parents)) = self.segments.split_last() else {
            return;
        };
        let mut current = doc;
        for segment in parents {
            let entry = current
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            current = match entry.as_object_mut() {
                Some(map) => map,
                None => return,
            };
        }
        current.insert(last.clone(), value);
    }

    /// Remove the value at this path, returning it
    pub fn remove(&self, doc: &mut Map<String, Value>) -> Option<Value> {
        let (last, parents) = self.segments.split_last()?;
        let mut current = doc;
        for segment in parents {
            current = current.get_mut(segment)?.as_object_mut()?;
        }
        current.remove(last)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl FromStr for FieldPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Flatten nested objects into dotted-path updates
///
/// `{"profile": {"name": "x"}}` becomes `[("profile.name", "x")]`, so a
/// partial update leaves unspecified nested keys untouched. Paths listed in
/// `leaves` are never descended into, and empty objects are kept as values.
pub fn flatten_update(changes: &Map<String, Value>, leaves: &[FieldPath]) -> Vec<(FieldPath, Value)> {
    let mut out = Vec::new();
    for (key, value) in changes {
        flatten_into(FieldPath::top_level(key.clone()), value, leaves, &mut out);
    }
    out
}

fn flatten_into(path: FieldPath, value: &Value, leaves: &[FieldPath], out: &mut Vec<(FieldPath, Value)>) {
    match value {
        Value::Object(map) if !map.is_empty() && !leaves.contains(&path) => {
            for (key, nested) in map {
                flatten_into(path.child(key.clone()), nested, leaves, out);
            }
        }
        _ => out.push((path, value.clone())),
    }
}
