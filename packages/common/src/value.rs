use crate::error::CommonError;
use crate::path::{EditPath, PathSegment};
use crate::result::CommonResult;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// A composition's property object.
pub type PropertyBag = BTreeMap<String, PropValue>;

/// A JSON-like property value.
///
/// Absence (a missing key, an `undefined` optional) is never a variant here;
/// callers model it as `Option<PropValue>`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<PropValue>),
    Object(PropertyBag),
}

// Integral numbers serialize without a trailing `.0` so saved project files
// keep the shape they were written in.
impl Serialize for PropValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PropValue::Null => serializer.serialize_unit(),
            PropValue::Bool(b) => serializer.serialize_bool(*b),
            PropValue::Number(n) if is_integral(*n) => serializer.serialize_i64(*n as i64),
            PropValue::Number(n) => serializer.serialize_f64(*n),
            PropValue::String(s) => serializer.serialize_str(s),
            PropValue::Array(items) => items.serialize(serializer),
            PropValue::Object(fields) => fields.serialize(serializer),
        }
    }
}

fn is_integral(n: f64) -> bool {
    n.is_finite() && n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0
}

impl PropValue {
    /// The JSON type name, used in validation messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            PropValue::Null => "null",
            PropValue::Bool(_) => "boolean",
            PropValue::Number(_) => "number",
            PropValue::String(_) => "string",
            PropValue::Array(_) => "array",
            PropValue::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PropValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<PropValue>> {
        match self {
            PropValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&PropertyBag> {
        match self {
            PropValue::Object(fields) => Some(fields),
            _ => None,
        }
    }

    /// Step one segment into this value.
    pub fn child(&self, segment: &PathSegment) -> Option<&PropValue> {
        match (self, segment) {
            (PropValue::Object(fields), PathSegment::Key(key)) => fields.get(key),
            (PropValue::Array(items), PathSegment::Index(index)) => items.get(*index),
            _ => None,
        }
    }

    pub fn get_path(&self, path: &EditPath) -> Option<&PropValue> {
        path.segments()
            .iter()
            .try_fold(self, |value, segment| value.child(segment))
    }

    /// Returns a copy of `self` with the value at `path` replaced.
    ///
    /// `None` removes an object key, or writes `null` into an array slot.
    /// An index equal to the array length appends.
    pub fn with_path(&self, path: &EditPath, value: Option<PropValue>) -> CommonResult<PropValue> {
        let mut out = self.clone();
        out.set_path(path, value)?;
        Ok(out)
    }

    pub fn set_path(&mut self, path: &EditPath, value: Option<PropValue>) -> CommonResult<()> {
        let segments = path.segments();
        let Some((last, parents)) = segments.split_last() else {
            *self = value.unwrap_or(PropValue::Null);
            return Ok(());
        };

        let mut target = self;
        for (depth, segment) in parents.iter().enumerate() {
            let here = EditPath::from_segments(segments[..=depth].iter().cloned());
            target = match (target, segment) {
                (PropValue::Object(fields), PathSegment::Key(key)) => fields
                    .get_mut(key)
                    .ok_or_else(|| CommonError::NotAContainer {
                        path: here.to_string(),
                        found: "nothing",
                    })?,
                (PropValue::Array(items), PathSegment::Index(index)) => {
                    let len = items.len();
                    items
                        .get_mut(*index)
                        .ok_or(CommonError::IndexOutOfBounds {
                            path: here.to_string(),
                            index: *index,
                            len,
                        })?
                }
                (other, _) => {
                    return Err(CommonError::NotAContainer {
                        path: here.to_string(),
                        found: other.type_name(),
                    })
                }
            };
        }

        match (target, last) {
            (PropValue::Object(fields), PathSegment::Key(key)) => {
                match value {
                    Some(value) => fields.insert(key.clone(), value),
                    None => fields.remove(key),
                };
                Ok(())
            }
            (PropValue::Array(items), PathSegment::Index(index)) => {
                let value = value.unwrap_or(PropValue::Null);
                if *index < items.len() {
                    items[*index] = value;
                    Ok(())
                } else if *index == items.len() {
                    items.push(value);
                    Ok(())
                } else {
                    Err(CommonError::IndexOutOfBounds {
                        path: path.to_string(),
                        index: *index,
                        len: items.len(),
                    })
                }
            }
            (other, _) => Err(CommonError::NotAContainer {
                path: path.parent().unwrap_or_default().to_string(),
                found: other.type_name(),
            }),
        }
    }

    /// Compact JSON text for display.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("null"))
    }

    /// Text shown in a free-form input: strings verbatim, everything else
    /// as JSON.
    pub fn display_text(&self) -> String {
        match self {
            PropValue::String(s) => s.clone(),
            other => other.to_json_string(),
        }
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json_string())
    }
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        PropValue::String(s.to_string())
    }
}

impl From<String> for PropValue {
    fn from(s: String) -> Self {
        PropValue::String(s)
    }
}

impl From<f64> for PropValue {
    fn from(n: f64) -> Self {
        PropValue::Number(n)
    }
}

impl From<i32> for PropValue {
    fn from(n: i32) -> Self {
        PropValue::Number(n as f64)
    }
}

impl From<bool> for PropValue {
    fn from(b: bool) -> Self {
        PropValue::Bool(b)
    }
}

impl<T: Into<PropValue>> From<Vec<T>> for PropValue {
    fn from(items: Vec<T>) -> Self {
        PropValue::Array(items.into_iter().map(Into::into).collect())
    }
}

impl From<PropertyBag> for PropValue {
    fn from(fields: PropertyBag) -> Self {
        PropValue::Object(fields)
    }
}
