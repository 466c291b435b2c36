use crate::node::{SchemaKind, SchemaNode};
use compedit_common::{PropValue, PropertyBag};

const DEFAULT_COLOR: &str = "#ffffff";

impl SchemaNode {
    /// Build a value that satisfies this node, for use when a field goes
    /// from absent to present or an array grows.
    ///
    /// A declared default wins when it validates. `None` means no valid
    /// value can be synthesized (an unsupported type somewhere below).
    pub fn synthesize_default(&self) -> Option<PropValue> {
        if let Some(default) = &self.default {
            if self.validate(Some(default)).is_ok() {
                return Some(default.clone());
            }
        }

        match &self.kind {
            SchemaKind::String if self.is_color() => Some(PropValue::from(DEFAULT_COLOR)),
            SchemaKind::String => Some(PropValue::from("")),
            SchemaKind::Number(c) => {
                let mut n = 0.0_f64;
                if let Some(min) = c.min {
                    n = n.max(min);
                }
                if let Some(max) = c.max {
                    n = n.min(max);
                }
                if c.integer {
                    n = n.ceil();
                    if let Some(max) = c.max {
                        if n > max {
                            n = max.floor();
                        }
                    }
                    // No integer between the bounds
                    if c.min.is_some_and(|min| n < min) {
                        return None;
                    }
                }
                Some(PropValue::Number(n))
            }
            SchemaKind::Boolean => Some(PropValue::Bool(false)),
            SchemaKind::Enum(values) => values.first().cloned().map(PropValue::String),
            SchemaKind::Array(a) => {
                if a.min_len == 0 {
                    return Some(PropValue::Array(Vec::new()));
                }
                let element = a.element.synthesize_default()?;
                Some(PropValue::Array(vec![element; a.min_len]))
            }
            SchemaKind::Object(o) => {
                let mut fields = PropertyBag::new();
                for (key, field) in &o.fields {
                    match (&field.kind, &field.default) {
                        (SchemaKind::Optional(_), None) => continue,
                        _ => {
                            fields.insert(key.clone(), field.synthesize_default()?);
                        }
                    }
                }
                Some(PropValue::Object(fields))
            }
            SchemaKind::Optional(inner) => inner.synthesize_default(),
            SchemaKind::Nullable(inner) => inner.synthesize_default().or(Some(PropValue::Null)),
            SchemaKind::Union(u) => u.variants.iter().find_map(|v| v.synthesize_default()),
            SchemaKind::Unsupported(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_default_without_integer_in_range() {
        let narrow = SchemaNode::number().min(0.5).max(0.7).int();
        assert_eq!(narrow.synthesize_default(), None);

        let wrapped = narrow.clone().optional();
        assert_eq!(wrapped.synthesize_default(), None);

        let wide = SchemaNode::number().min(0.5).max(1.7).int();
        assert_eq!(wide.synthesize_default(), Some(PropValue::Number(1.0)));
    }

    #[test]
    fn test_number_default_respects_bounds() {
        let positive = SchemaNode::number().min(1.0).max(150.0);
        assert_eq!(positive.synthesize_default(), Some(PropValue::Number(1.0)));

        let negative = SchemaNode::number().max(-2.5).int();
        let value = negative.synthesize_default().unwrap();
        assert!(negative.validate(Some(&value)).is_ok());

        let fractional = SchemaNode::number().min(0.5).max(3.0).int();
        assert_eq!(fractional.synthesize_default(), Some(PropValue::Number(1.0)));
    }

    #[test]
    fn test_declared_default_wins_only_when_valid() {
        let valid = SchemaNode::number().min(0.0).default(12);
        assert_eq!(valid.synthesize_default(), Some(PropValue::Number(12.0)));

        let stale = SchemaNode::number().min(20.0).default(12);
        assert_eq!(stale.synthesize_default(), Some(PropValue::Number(20.0)));
    }

    #[test]
    fn test_container_defaults() {
        let palette = SchemaNode::array(SchemaNode::color()).min_len(2);
        assert_eq!(
            palette.synthesize_default(),
            Some(PropValue::from(vec!["#ffffff", "#ffffff"]))
        );

        let shape = SchemaNode::object([
            ("align", SchemaNode::enumeration(["left", "right"])),
            ("note", SchemaNode::string().optional()),
            ("on", SchemaNode::boolean()),
        ]);
        let value = shape.synthesize_default().unwrap();
        assert!(shape.validate(Some(&value)).is_ok());
        assert!(value.as_object().unwrap().get("note").is_none());
    }

    #[test]
    fn test_unsupported_has_no_default() {
        let shape = SchemaNode::object([("x", SchemaNode::unsupported("date"))]);
        assert_eq!(shape.synthesize_default(), None);
    }
}
