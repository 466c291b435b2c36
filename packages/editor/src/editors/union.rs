//! Unions show a variant switcher and the editor for the active variant.
//! The active variant follows the value, not a separately stored choice.

use crate::dispatch::Dispatcher;
use crate::reducer::{EditContext, EventOutcome};
use crate::view::{FieldSnapshot, Widget};
use compedit_common::EditPath;
use compedit_schema::{SchemaKind, SchemaNode, UnionSchema};

pub(crate) fn widget<'s>(
    dispatcher: &mut Dispatcher<'s, '_>,
    schema: &'s UnionSchema,
    path: &EditPath,
    snapshot: &FieldSnapshot,
) -> Widget {
    let active = schema.active_variant(snapshot.display_value());
    let variants = schema.variants.iter().map(SchemaNode::variant_label).collect();
    let Some(variant) = schema.variants.get(active) else {
        return Widget::Unsupported {
            type_name: "union".to_string(),
        };
    };
    let inner = dispatcher.build(variant, path.clone(), snapshot);
    Widget::Union {
        variants,
        active,
        inner: Box::new(inner),
    }
}

/// The union layer of a field, looking through optional and nullable
/// wrappers.
fn union_layer(node: &SchemaNode) -> Option<&UnionSchema> {
    match node.kind() {
        SchemaKind::Union(schema) => Some(schema),
        SchemaKind::Optional(inner) | SchemaKind::Nullable(inner) => union_layer(inner),
        _ => None,
    }
}

/// Switching variants replaces the value with the new variant's default.
pub(crate) fn select_variant(
    ctx: &mut EditContext<'_, '_>,
    path: &EditPath,
    node: &SchemaNode,
    index: usize,
) -> EventOutcome {
    let Some(schema) = union_layer(node) else {
        return EventOutcome::ignored(format!("`{}` is not a union field", path));
    };
    let Some(variant) = schema.variants.get(index) else {
        return EventOutcome::ignored(format!("`{}` has no variant {}", path, index));
    };
    let current = ctx.current(path);
    if schema.active_variant(current.as_ref()) == index {
        return EventOutcome::ignored(format!("variant {} is already active", index));
    }
    match variant.synthesize_default() {
        Some(value) => ctx.write(path, node, Some(value), true),
        None => EventOutcome::ignored(format!("no valid default for variant {}", index)),
    }
}
