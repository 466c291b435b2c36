use crate::color::Rgba8;
use crate::error::ValidationError;
use crate::node::{SchemaKind, SchemaNode};
use compedit_common::{EditPath, PropValue, PropertyBag};

impl SchemaNode {
    /// Strict parse of a value that may be absent.
    ///
    /// Returns the parsed value: declared defaults fill in absent fields,
    /// unknown object keys are dropped. `Ok(None)` means the value is
    /// validly absent.
    pub fn validate(&self, value: Option<&PropValue>) -> Result<Option<PropValue>, ValidationError> {
        self.validate_at(value, &EditPath::root())
    }

    /// Validate a whole props object and return it with defaults applied.
    pub fn resolve_props(&self, props: &PropertyBag) -> Result<PropertyBag, ValidationError> {
        match self.validate(Some(&PropValue::Object(props.clone())))? {
            Some(PropValue::Object(resolved)) => Ok(resolved),
            Some(other) => Err(ValidationError::mismatch(
                &EditPath::root(),
                format!("Expected object, received {}", other.type_name()),
            )),
            None => Ok(PropertyBag::new()),
        }
    }

    pub fn validate_at(&self, value: Option<&PropValue>, path: &EditPath) -> Result<Option<PropValue>, ValidationError> {
        let Some(value) = value else {
            if let Some(default) = &self.default {
                return Ok(Some(default.clone()));
            }
            return match &self.kind {
                SchemaKind::Optional(_) => Ok(None),
                SchemaKind::Unsupported(type_name) => Err(ValidationError::UnsupportedType {
                    path: path.clone(),
                    type_name: type_name.clone(),
                }),
                _ => Err(ValidationError::mismatch(path, "Required")),
            };
        };

        match &self.kind {
            SchemaKind::String => {
                let PropValue::String(s) = value else {
                    return Err(expected(path, "string", value));
                };
                if self.is_color() {
                    s.parse::<Rgba8>()
                        .map_err(|_| ValidationError::mismatch(path, format!("Invalid color `{}`", s)))?;
                }
                Ok(Some(value.clone()))
            }
            SchemaKind::Number(c) => {
                let PropValue::Number(n) = value else {
                    return Err(expected(path, "number", value));
                };
                if !n.is_finite() {
                    return Err(ValidationError::mismatch(path, "Expected a finite number"));
                }
                if c.integer && n.fract() != 0.0 {
                    return Err(ValidationError::mismatch(path, "Expected integer, received float"));
                }
                if let Some(min) = c.min {
                    if *n < min {
                        return Err(ValidationError::mismatch(
                            path,
                            format!("Number must be greater than or equal to {}", min),
                        ));
                    }
                }
                if let Some(max) = c.max {
                    if *n > max {
                        return Err(ValidationError::mismatch(
                            path,
                            format!("Number must be less than or equal to {}", max),
                        ));
                    }
                }
                Ok(Some(value.clone()))
            }
            SchemaKind::Boolean => match value {
                PropValue::Bool(_) => Ok(Some(value.clone())),
                other => Err(expected(path, "boolean", other)),
            },
            SchemaKind::Enum(values) => match value {
                PropValue::String(s) if values.contains(s) => Ok(Some(value.clone())),
                _ => Err(ValidationError::mismatch(
                    path,
                    format!(
                        "Invalid enum value. Expected {}, received {}",
                        values
                            .iter()
                            .map(|v| format!("'{}'", v))
                            .collect::<Vec<_>>()
                            .join(" | "),
                        value
                    ),
                )),
            },
            SchemaKind::Array(a) => {
                let PropValue::Array(items) = value else {
                    return Err(expected(path, "array", value));
                };
                if items.len() < a.min_len {
                    return Err(ValidationError::mismatch(
                        path,
                        format!("Array must contain at least {} element(s)", a.min_len),
                    ));
                }
                if let Some(max) = a.max_len {
                    if items.len() > max {
                        return Err(ValidationError::mismatch(
                            path,
                            format!("Array must contain at most {} element(s)", max),
                        ));
                    }
                }
                let parsed = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        a.element
                            .validate_at(Some(item), &path.child_index(i))
                            .map(|v| v.unwrap_or(PropValue::Null))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Some(PropValue::Array(parsed)))
            }
            SchemaKind::Object(o) => {
                let PropValue::Object(fields) = value else {
                    return Err(expected(path, "object", value));
                };
                let mut parsed = PropertyBag::new();
                for (key, field) in &o.fields {
                    if let Some(v) = field.validate_at(fields.get(key), &path.child_key(key))? {
                        parsed.insert(key.clone(), v);
                    }
                }
                Ok(Some(PropValue::Object(parsed)))
            }
            SchemaKind::Optional(inner) => inner.validate_at(Some(value), path),
            SchemaKind::Nullable(inner) => match value {
                PropValue::Null => Ok(Some(PropValue::Null)),
                other => inner.validate_at(Some(other), path),
            },
            SchemaKind::Union(u) => {
                if u.discriminator.is_some() {
                    if let Some(variant) = u.variants.get(u.active_variant(Some(value))) {
                        return variant.validate_at(Some(value), path);
                    }
                }
                u.variants
                    .iter()
                    .find_map(|variant| variant.validate_at(Some(value), path).ok())
                    .ok_or_else(|| ValidationError::mismatch(path, "Invalid input"))
            }
            SchemaKind::Unsupported(type_name) => Err(ValidationError::UnsupportedType {
                path: path.clone(),
                type_name: type_name.clone(),
            }),
        }
    }

    /// Lenient conversion of raw editor input into the shape this node
    /// expects. Numeric text becomes a number, `true`/`false` text becomes a
    /// boolean; anything that does not convert is returned unchanged so
    /// strict validation can report it.
    pub fn coerce_input(&self, raw: &PropValue) -> PropValue {
        match &self.kind {
            SchemaKind::Number(_) => match raw {
                PropValue::String(text) => match text.trim().parse::<f64>() {
                    Ok(n) if n.is_finite() && !text.trim().is_empty() => PropValue::Number(n),
                    _ => raw.clone(),
                },
                _ => raw.clone(),
            },
            SchemaKind::Boolean => match raw {
                PropValue::String(text) if text == "true" => PropValue::Bool(true),
                PropValue::String(text) if text == "false" => PropValue::Bool(false),
                _ => raw.clone(),
            },
            SchemaKind::Optional(inner) => inner.coerce_input(raw),
            SchemaKind::Nullable(inner) if !raw.is_null() => inner.coerce_input(raw),
            SchemaKind::Union(u) => u
                .variants
                .iter()
                .map(|variant| variant.coerce_input(raw))
                .find(|candidate| self.validate(Some(candidate)).is_ok())
                .unwrap_or_else(|| raw.clone()),
            _ => raw.clone(),
        }
    }
}

fn expected(path: &EditPath, expected: &str, received: &PropValue) -> ValidationError {
    ValidationError::mismatch(
        path,
        format!("Expected {}, received {}", expected, received.type_name()),
    )
}
