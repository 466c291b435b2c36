use crate::error::CommonError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One step into a property value: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// Location of a field relative to a composition's top-level props.
///
/// The empty path addresses the props object itself. Paths are ordered
/// lexicographically by segment, so every descendant of a path sorts
/// directly after it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditPath(Vec<PathSegment>);

impl EditPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn from_segments(segments: impl IntoIterator<Item = PathSegment>) -> Self {
        Self(segments.into_iter().collect())
    }

    pub fn key(key: impl Into<String>) -> Self {
        Self(vec![PathSegment::Key(key.into())])
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn child_key(&self, key: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(key.into()));
        Self(segments)
    }

    pub fn child_index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// All proper ancestors, nearest first, ending with the root.
    pub fn ancestors(&self) -> Vec<Self> {
        let mut out = Vec::with_capacity(self.0.len());
        let mut current = self.parent();
        while let Some(path) = current {
            current = path.parent();
            out.push(path);
        }
        out
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.0.last()
    }

    /// The top-level prop key this path lives under.
    pub fn first_key(&self) -> Option<&str> {
        match self.0.first() {
            Some(PathSegment::Key(key)) => Some(key),
            _ => None,
        }
    }

    /// Everything after the first segment.
    pub fn tail(&self) -> Self {
        Self(self.0.iter().skip(1).cloned().collect())
    }

    pub fn starts_with(&self, prefix: &EditPath) -> bool {
        self.0.starts_with(&prefix.0)
    }

    pub fn is_descendant_of(&self, ancestor: &EditPath) -> bool {
        self.0.len() > ancestor.0.len() && self.starts_with(ancestor)
    }

    pub fn strip_prefix(&self, prefix: &EditPath) -> Option<Self> {
        self.0
            .strip_prefix(prefix.0.as_slice())
            .map(|rest| Self(rest.to_vec()))
    }

    /// Human-facing label for the field at this path.
    pub fn label(&self) -> String {
        match self.0.last() {
            Some(PathSegment::Key(key)) => key.clone(),
            Some(PathSegment::Index(index)) => format!("[{}]", index),
            None => "props".to_string(),
        }
    }
}

impl fmt::Display for EditPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => write!(f, "{}", key)?,
                PathSegment::Key(key) => write!(f, ".{}", key)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

impl FromStr for EditPath {
    type Err = CommonError;

    /// Parses `colors[2]`, `font.size`, `layers[0].opacity`. The empty
    /// string is the root path.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut segments = Vec::new();
        let mut rest = s.trim();
        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix('[') {
                let close = after
                    .find(']')
                    .ok_or_else(|| CommonError::InvalidPath(s.to_string()))?;
                let index = after[..close]
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| CommonError::InvalidPath(s.to_string()))?;
                segments.push(PathSegment::Index(index));
                rest = &after[close + 1..];
            } else {
                // Only the first key goes without a leading dot
                let dotted = rest.starts_with('.');
                let body = rest.strip_prefix('.').unwrap_or(rest);
                if body.is_empty() || dotted == segments.is_empty() {
                    return Err(CommonError::InvalidPath(s.to_string()));
                }
                let end = body.find(['.', '[']).unwrap_or(body.len());
                if end == 0 || body[..end].contains(']') {
                    return Err(CommonError::InvalidPath(s.to_string()));
                }
                segments.push(PathSegment::Key(body[..end].to_string()));
                rest = &body[end..];
            }
        }
        Ok(Self(segments))
    }
}
