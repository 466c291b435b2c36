use crate::error::{SchemaError, SchemaResult};
use compedit_common::{EditPath, PathSegment, PropValue};
use serde::{Deserialize, Serialize};

/// Type descriptor for one property, possibly nested.
///
/// A node carries its structural kind plus the modifiers every kind may
/// have: a brand, a declared default and a description. Colors are strings
/// branded [`Brand::Color`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "crate::wire::RawSchema", into = "crate::wire::RawSchema")]
pub struct SchemaNode {
    pub(crate) kind: SchemaKind,
    pub(crate) brand: Option<Brand>,
    pub(crate) default: Option<PropValue>,
    pub(crate) description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    String,
    Number(NumberConstraints),
    Boolean,
    Enum(Vec<String>),
    Array(ArraySchema),
    Object(ObjectSchema),
    Optional(Box<SchemaNode>),
    Nullable(Box<SchemaNode>),
    Union(UnionSchema),
    /// A type this engine has no editor for. Never valid.
    Unsupported(String),
}

/// Marker attached to a base kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Brand {
    Color,
    Other(String),
}

impl Brand {
    pub fn name(&self) -> &str {
        match self {
            Brand::Color => "color",
            Brand::Other(name) => name,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "color" => Brand::Color,
            other => Brand::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberConstraints {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub integer: bool,
}

impl NumberConstraints {
    /// Stepper increment: 1 for integers, otherwise 0.01 when the range is
    /// narrower than 10, else 1.
    pub fn step(&self) -> f64 {
        if self.integer {
            return 1.0;
        }
        match (self.min, self.max) {
            (Some(min), Some(max)) if max - min < 10.0 => 0.01,
            _ => 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArraySchema {
    pub element: Box<SchemaNode>,
    pub min_len: usize,
    pub max_len: Option<usize>,
}

impl ArraySchema {
    /// Arrays are editable element-by-element only when their elements are
    /// scalar leaves.
    pub fn has_scalar_elements(&self) -> bool {
        matches!(
            self.element.kind,
            SchemaKind::String | SchemaKind::Number(_) | SchemaKind::Boolean | SchemaKind::Enum(_)
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSchema {
    /// Declaration order is preserved; it is the order fields are shown in.
    pub fields: Vec<(String, SchemaNode)>,
}

impl ObjectSchema {
    pub fn field(&self, name: &str) -> Option<&SchemaNode> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, node)| node)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(key, _)| key.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnionSchema {
    pub variants: Vec<SchemaNode>,
    pub discriminator: Option<String>,
}

impl UnionSchema {
    /// Pick the variant a value belongs to.
    ///
    /// A discriminated union matches on the tag field. Otherwise the first
    /// variant that validates wins, then the first whose base kind matches
    /// the value's shape, then the first variant.
    pub fn active_variant(&self, value: Option<&PropValue>) -> usize {
        if let (Some(key), Some(PropValue::Object(fields))) = (&self.discriminator, value) {
            if let Some(PropValue::String(tag)) = fields.get(key) {
                if let Some(index) = self
                    .variants
                    .iter()
                    .position(|variant| variant.tag_values(key).iter().any(|v| v == tag))
                {
                    return index;
                }
            }
        }

        if let Some(index) = self
            .variants
            .iter()
            .position(|variant| variant.validate(value).is_ok())
        {
            return index;
        }

        value
            .and_then(|value| {
                self.variants
                    .iter()
                    .position(|variant| variant.accepts_shape(value))
            })
            .unwrap_or(0)
    }
}

impl SchemaNode {
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            brand: None,
            default: None,
            description: None,
        }
    }

    pub fn string() -> Self {
        Self::new(SchemaKind::String)
    }

    pub fn color() -> Self {
        Self::string().brand(Brand::Color)
    }

    pub fn number() -> Self {
        Self::new(SchemaKind::Number(NumberConstraints::default()))
    }

    pub fn boolean() -> Self {
        Self::new(SchemaKind::Boolean)
    }

    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(SchemaKind::Enum(values.into_iter().map(Into::into).collect()))
    }

    /// A single-value enum.
    pub fn literal(value: impl Into<String>) -> Self {
        Self::enumeration([value.into()])
    }

    pub fn array(element: SchemaNode) -> Self {
        Self::new(SchemaKind::Array(ArraySchema {
            element: Box::new(element),
            min_len: 0,
            max_len: None,
        }))
    }

    pub fn object<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, SchemaNode)>,
        K: Into<String>,
    {
        Self::new(SchemaKind::Object(ObjectSchema {
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }))
    }

    pub fn union(variants: Vec<SchemaNode>) -> SchemaResult<Self> {
        let node = Self::new(SchemaKind::Union(UnionSchema {
            variants,
            discriminator: None,
        }));
        node.check()?;
        Ok(node)
    }

    pub fn discriminated_union(key: impl Into<String>, variants: Vec<SchemaNode>) -> SchemaResult<Self> {
        let node = Self::new(SchemaKind::Union(UnionSchema {
            variants,
            discriminator: Some(key.into()),
        }));
        node.check()?;
        Ok(node)
    }

    pub fn unsupported(type_name: impl Into<String>) -> Self {
        Self::new(SchemaKind::Unsupported(type_name.into()))
    }

    pub fn optional(self) -> Self {
        Self::new(SchemaKind::Optional(Box::new(self)))
    }

    pub fn nullable(self) -> Self {
        Self::new(SchemaKind::Nullable(Box::new(self)))
    }

    pub fn brand(mut self, brand: Brand) -> Self {
        self.brand = Some(brand);
        self
    }

    pub fn default(mut self, value: impl Into<PropValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Lower bound for numbers. No effect on other kinds.
    pub fn min(mut self, min: f64) -> Self {
        if let SchemaKind::Number(c) = &mut self.kind {
            c.min = Some(min);
        }
        self
    }

    /// Upper bound for numbers. No effect on other kinds.
    pub fn max(mut self, max: f64) -> Self {
        if let SchemaKind::Number(c) = &mut self.kind {
            c.max = Some(max);
        }
        self
    }

    pub fn int(mut self) -> Self {
        if let SchemaKind::Number(c) = &mut self.kind {
            c.integer = true;
        }
        self
    }

    pub fn min_len(mut self, len: usize) -> Self {
        if let SchemaKind::Array(a) = &mut self.kind {
            a.min_len = len;
        }
        self
    }

    pub fn max_len(mut self, len: usize) -> Self {
        if let SchemaKind::Array(a) = &mut self.kind {
            a.max_len = Some(len);
        }
        self
    }

    pub fn kind(&self) -> &SchemaKind {
        &self.kind
    }

    pub fn brand_marker(&self) -> Option<&Brand> {
        self.brand.as_ref()
    }

    pub fn default_value(&self) -> Option<&PropValue> {
        self.default.as_ref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_color(&self) -> bool {
        matches!(self.kind, SchemaKind::String) && self.brand == Some(Brand::Color)
    }

    pub fn as_object(&self) -> Option<&ObjectSchema> {
        match &self.kind {
            SchemaKind::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Short name of this node's type, as shown in descriptions.
    pub fn type_name(&self) -> String {
        match &self.kind {
            SchemaKind::String if self.is_color() => "color-hex".to_string(),
            SchemaKind::String => "string".to_string(),
            SchemaKind::Number(_) => "number".to_string(),
            SchemaKind::Boolean => "boolean".to_string(),
            SchemaKind::Enum(values) => format!("enum({})", values.join("|")),
            SchemaKind::Array(a) => format!("array<{}>", a.element.type_name()),
            SchemaKind::Object(_) => "object".to_string(),
            SchemaKind::Optional(inner) => format!("{}?", inner.type_name()),
            SchemaKind::Nullable(inner) => format!("{} | null", inner.type_name()),
            SchemaKind::Union(u) => u
                .variants
                .iter()
                .map(|v| v.type_name())
                .collect::<Vec<_>>()
                .join(" | "),
            SchemaKind::Unsupported(name) => name.clone(),
        }
    }

    /// Label for one variant in a union switcher.
    pub fn variant_label(&self) -> String {
        self.description.clone().unwrap_or_else(|| self.type_name())
    }

    /// Strip optional, nullable and union layers, following the value to
    /// choose a union variant.
    pub fn unwrap_for(&self, value: Option<&PropValue>) -> &SchemaNode {
        let mut node = self;
        loop {
            node = match &node.kind {
                SchemaKind::Optional(inner) | SchemaKind::Nullable(inner) => inner,
                SchemaKind::Union(u) => match u.variants.get(u.active_variant(value)) {
                    Some(variant) => variant,
                    None => return node,
                },
                _ => return node,
            };
        }
    }

    /// Find the node for the field at `path`, resolving unions against the
    /// current value of the whole props object. Returns the outermost node
    /// at that path, wrappers included.
    pub fn node_at<'s>(&'s self, path: &EditPath, root_value: Option<&PropValue>) -> Option<&'s SchemaNode> {
        let mut node = self;
        let mut value = root_value;
        for segment in path.segments() {
            let container = node.unwrap_for(value);
            value = value.and_then(|v| v.child(segment));
            node = match (&container.kind, segment) {
                (SchemaKind::Object(o), PathSegment::Key(key)) => o.field(key)?,
                (SchemaKind::Array(a), PathSegment::Index(_)) => &a.element,
                _ => return None,
            };
        }
        Some(node)
    }

    /// Whether the value has the right JSON shape for this node's base
    /// kind, ignoring constraints.
    pub fn accepts_shape(&self, value: &PropValue) -> bool {
        match (&self.kind, value) {
            (SchemaKind::String | SchemaKind::Enum(_), PropValue::String(_)) => true,
            (SchemaKind::Number(_), PropValue::Number(_)) => true,
            (SchemaKind::Boolean, PropValue::Bool(_)) => true,
            (SchemaKind::Array(_), PropValue::Array(_)) => true,
            (SchemaKind::Object(_), PropValue::Object(_)) => true,
            (SchemaKind::Nullable(_), PropValue::Null) => true,
            (SchemaKind::Optional(inner) | SchemaKind::Nullable(inner), value) => inner.accepts_shape(value),
            (SchemaKind::Union(u), value) => u.variants.iter().any(|v| v.accepts_shape(value)),
            _ => false,
        }
    }

    /// Literal values a variant declares for a discriminator key.
    fn tag_values(&self, key: &str) -> Vec<String> {
        let node = match &self.kind {
            SchemaKind::Optional(inner) | SchemaKind::Nullable(inner) => inner,
            _ => self,
        };
        match node.as_object().and_then(|o| o.field(key)).map(|f| &f.kind) {
            Some(SchemaKind::Enum(values)) => values.clone(),
            _ => Vec::new(),
        }
    }

    /// Check structural invariants of this node and everything below it.
    pub fn check(&self) -> SchemaResult<()> {
        match &self.kind {
            SchemaKind::Enum(values) if values.is_empty() => Err(SchemaError::EmptyEnum),
            SchemaKind::Number(NumberConstraints {
                min: Some(min),
                max: Some(max),
                ..
            }) if min > max => Err(SchemaError::InvalidBounds {
                min: *min,
                max: *max,
            }),
            SchemaKind::Array(a) => {
                if let Some(max) = a.max_len {
                    if a.min_len > max {
                        return Err(SchemaError::InvalidBounds {
                            min: a.min_len as f64,
                            max: max as f64,
                        });
                    }
                }
                a.element.check()
            }
            SchemaKind::Object(o) => o.fields.iter().try_for_each(|(_, field)| field.check()),
            SchemaKind::Optional(inner) | SchemaKind::Nullable(inner) => inner.check(),
            SchemaKind::Union(u) => {
                if u.variants.len() < 2 {
                    return Err(SchemaError::UnionTooSmall(u.variants.len()));
                }
                if let Some(key) = &u.discriminator {
                    if u.variants.iter().any(|v| v.tag_values(key).is_empty()) {
                        return Err(SchemaError::InvalidDiscriminator(key.clone()));
                    }
                }
                u.variants.iter().try_for_each(|v| v.check())
            }
            _ => Ok(()),
        }
    }
}
