use crate::error::{SchemaError, SchemaResult};
use crate::node::{SchemaKind, SchemaNode};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// A renderable component and the schema of its props.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentBinding {
    pub name: String,
    /// One-line guidance on when to pick this component.
    pub usecase: String,
    pub schema: Arc<SchemaNode>,
}

impl ComponentBinding {
    pub fn new(name: impl Into<String>, usecase: impl Into<String>, schema: SchemaNode) -> Self {
        Self {
            name: name.into(),
            usecase: usecase.into(),
            schema: Arc::new(schema),
        }
    }
}

/// Name to schema lookup for foreground animations and background
/// textures. Registration order is kept for listing.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    animations: Vec<ComponentBinding>,
    backgrounds: Vec<ComponentBinding>,
    index: BTreeMap<String, (Layer, usize)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layer {
    Animation,
    Background,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_animation(&mut self, binding: ComponentBinding) -> SchemaResult<()> {
        self.register(Layer::Animation, binding)
    }

    pub fn register_background(&mut self, binding: ComponentBinding) -> SchemaResult<()> {
        self.register(Layer::Background, binding)
    }

    fn register(&mut self, layer: Layer, binding: ComponentBinding) -> SchemaResult<()> {
        if self.index.contains_key(&binding.name) {
            return Err(SchemaError::DuplicateComponent(binding.name));
        }
        if binding.schema.as_object().is_none() {
            return Err(SchemaError::TopLevelNotObject(binding.name));
        }
        binding.schema.check()?;

        debug!(component = %binding.name, ?layer, "registered component schema");
        let list = match layer {
            Layer::Animation => &mut self.animations,
            Layer::Background => &mut self.backgrounds,
        };
        self.index.insert(binding.name.clone(), (layer, list.len()));
        list.push(binding);
        Ok(())
    }

    pub fn animation(&self, name: &str) -> Option<&ComponentBinding> {
        match self.index.get(name) {
            Some((Layer::Animation, i)) => self.animations.get(*i),
            _ => None,
        }
    }

    pub fn background(&self, name: &str) -> Option<&ComponentBinding> {
        match self.index.get(name) {
            Some((Layer::Background, i)) => self.backgrounds.get(*i),
            _ => None,
        }
    }

    /// Look up a component on either layer.
    pub fn get(&self, name: &str) -> Option<&ComponentBinding> {
        self.animation(name).or_else(|| self.background(name))
    }

    pub fn animations(&self) -> &[ComponentBinding] {
        &self.animations
    }

    pub fn backgrounds(&self) -> &[ComponentBinding] {
        &self.backgrounds
    }
}

/// One-line summary of an object schema's top-level fields, e.g.
/// `speed: number, min: 0, color: color-hex`.
pub fn describe(schema: &SchemaNode) -> String {
    let Some(object) = schema.as_object() else {
        return String::new();
    };
    object
        .fields
        .iter()
        .map(|(key, field)| {
            let mut entry = format!("{}: {}", key, describe_type(field));
            if let SchemaKind::Number(c) = field.kind() {
                if let Some(min) = c.min {
                    entry.push_str(&format!(", min: {}", min));
                }
                if let Some(max) = c.max {
                    entry.push_str(&format!(", max: {}", max));
                }
            }
            entry
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe_type(node: &SchemaNode) -> String {
    match node.kind() {
        SchemaKind::String if node.is_color() => "color-hex".to_string(),
        SchemaKind::String => "string".to_string(),
        SchemaKind::Number(_) => "number".to_string(),
        SchemaKind::Boolean => "boolean".to_string(),
        SchemaKind::Enum(_) => "enum".to_string(),
        SchemaKind::Array(_) => "array".to_string(),
        SchemaKind::Object(_) => "object".to_string(),
        SchemaKind::Optional(_) => "optional".to_string(),
        SchemaKind::Nullable(_) => "nullable".to_string(),
        SchemaKind::Union(_) => "union".to_string(),
        SchemaKind::Unsupported(name) => name.to_lowercase(),
    }
}

/// Prompt context listing each binding with its use case and parameters.
pub fn generation_context<'a>(bindings: impl IntoIterator<Item = &'a ComponentBinding>) -> String {
    bindings
        .into_iter()
        .map(|binding| {
            format!(
                "Animation: {}\nUse case: {}\nParameters: {}\n",
                binding.name,
                binding.usecase,
                describe(&binding.schema)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
