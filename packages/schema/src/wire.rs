//! JSON form of a schema, as supplied by an external schema registry.
//!
//! ```json
//! { "type": "object", "fields": [
//!     { "name": "speed", "schema": { "type": "number", "min": 1, "max": 15, "default": 12 } },
//!     { "name": "color", "schema": { "type": "color", "default": "#ff0000" } }
//! ] }
//! ```
//!
//! Unknown `type` tags load as unsupported nodes rather than failing, so a
//! newer registry can still be opened.

use crate::error::SchemaError;
use crate::node::{
    ArraySchema, Brand, NumberConstraints, ObjectSchema, SchemaKind, SchemaNode, UnionSchema,
};
use compedit_common::PropValue;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSchema {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<PropValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub int: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<Box<RawSchema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<RawField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner: Option<Box<RawSchema>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<RawSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawField {
    pub name: String,
    pub schema: RawSchema,
}

fn is_false(b: &bool) -> bool {
    !*b
}

fn required(raw: Option<Box<RawSchema>>, type_name: &str, what: &str) -> Result<SchemaNode, SchemaError> {
    let raw = raw.ok_or_else(|| SchemaError::Wire(format!("`{}` schema is missing `{}`", type_name, what)))?;
    SchemaNode::try_from(*raw)
}

impl TryFrom<RawSchema> for SchemaNode {
    type Error = SchemaError;

    fn try_from(raw: RawSchema) -> Result<Self, Self::Error> {
        let kind = match raw.type_name.as_str() {
            "string" | "color" => SchemaKind::String,
            "number" => SchemaKind::Number(NumberConstraints {
                min: raw.min,
                max: raw.max,
                integer: raw.int,
            }),
            "boolean" => SchemaKind::Boolean,
            "enum" => SchemaKind::Enum(raw.values),
            "array" => SchemaKind::Array(ArraySchema {
                element: Box::new(required(raw.element, "array", "element")?),
                min_len: raw.min_length.unwrap_or(0),
                max_len: raw.max_length,
            }),
            "object" => SchemaKind::Object(ObjectSchema {
                fields: raw
                    .fields
                    .into_iter()
                    .map(|field| Ok((field.name, SchemaNode::try_from(field.schema)?)))
                    .collect::<Result<_, SchemaError>>()?,
            }),
            "optional" => SchemaKind::Optional(Box::new(required(raw.inner, "optional", "inner")?)),
            "nullable" => SchemaKind::Nullable(Box::new(required(raw.inner, "nullable", "inner")?)),
            "union" => SchemaKind::Union(UnionSchema {
                variants: raw
                    .variants
                    .into_iter()
                    .map(SchemaNode::try_from)
                    .collect::<Result<_, _>>()?,
                discriminator: raw.discriminator,
            }),
            other => SchemaKind::Unsupported(other.to_string()),
        };

        let brand = match (raw.type_name.as_str(), raw.brand) {
            ("color", _) => Some(Brand::Color),
            (_, Some(name)) => Some(Brand::from_name(&name)),
            (_, None) => None,
        };

        let node = SchemaNode {
            kind,
            brand,
            default: raw.default,
            description: raw.description,
        };
        node.check()?;
        Ok(node)
    }
}

impl From<SchemaNode> for RawSchema {
    fn from(node: SchemaNode) -> Self {
        let is_color = node.is_color();
        let mut raw = RawSchema {
            brand: node
                .brand
                .filter(|_| !is_color)
                .map(|brand| brand.name().to_string()),
            default: node.default,
            description: node.description,
            ..RawSchema::default()
        };

        raw.type_name = match node.kind {
            SchemaKind::String if is_color => "color".to_string(),
            SchemaKind::String => "string".to_string(),
            SchemaKind::Number(c) => {
                raw.min = c.min;
                raw.max = c.max;
                raw.int = c.integer;
                "number".to_string()
            }
            SchemaKind::Boolean => "boolean".to_string(),
            SchemaKind::Enum(values) => {
                raw.values = values;
                "enum".to_string()
            }
            SchemaKind::Array(a) => {
                raw.element = Some(Box::new(RawSchema::from(*a.element)));
                raw.min_length = Some(a.min_len).filter(|len| *len > 0);
                raw.max_length = a.max_len;
                "array".to_string()
            }
            SchemaKind::Object(o) => {
                raw.fields = o
                    .fields
                    .into_iter()
                    .map(|(name, schema)| RawField {
                        name,
                        schema: schema.into(),
                    })
                    .collect();
                "object".to_string()
            }
            SchemaKind::Optional(inner) => {
                raw.inner = Some(Box::new(RawSchema::from(*inner)));
                "optional".to_string()
            }
            SchemaKind::Nullable(inner) => {
                raw.inner = Some(Box::new(RawSchema::from(*inner)));
                "nullable".to_string()
            }
            SchemaKind::Union(u) => {
                raw.variants = u.variants.into_iter().map(RawSchema::from).collect();
                raw.discriminator = u.discriminator;
                "union".to_string()
            }
            SchemaKind::Unsupported(name) => name,
        };
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_registry_document() {
        let schema: SchemaNode = serde_json::from_str(
            r##"{ "type": "object", "fields": [
                { "name": "speed", "schema": { "type": "number", "min": 1, "max": 15, "default": 12 } },
                { "name": "color", "schema": { "type": "color", "default": "#ff0000" } },
                { "name": "born", "schema": { "type": "date" } }
            ] }"##,
        )
        .unwrap();

        let object = schema.as_object().unwrap();
        assert_eq!(object.keys().collect::<Vec<_>>(), ["speed", "color", "born"]);
        assert!(object.field("color").unwrap().is_color());
        assert_eq!(
            object.field("born").unwrap().kind(),
            &SchemaKind::Unsupported("date".into())
        );
    }

    #[test]
    fn test_invalid_documents_rejected() {
        let small_union = r#"{ "type": "union", "variants": [{ "type": "string" }] }"#;
        assert!(serde_json::from_str::<SchemaNode>(small_union).is_err());

        let headless_array = r#"{ "type": "array" }"#;
        assert!(serde_json::from_str::<SchemaNode>(headless_array).is_err());
    }

    #[test]
    fn test_writes_color_shorthand() {
        let text = serde_json::to_string(&SchemaNode::color().default("#fff")).unwrap();
        assert_eq!(text, r##"{"type":"color","default":"#fff"}"##);
    }
}
