//! Arrays of scalar elements, such as color palettes. Arrays of objects or
//! arrays are shown as unsupported.

use crate::dispatch::Dispatcher;
use crate::reducer::{EditContext, EventOutcome};
use crate::view::{FieldSnapshot, Widget};
use compedit_common::{EditPath, PathSegment, PropValue};
use compedit_schema::{ArraySchema, SchemaKind, SchemaNode};
use tracing::warn;

pub(crate) fn widget<'s>(
    dispatcher: &mut Dispatcher<'s, '_>,
    schema: &'s ArraySchema,
    path: &EditPath,
    snapshot: &FieldSnapshot,
) -> Widget {
    if !schema.has_scalar_elements() {
        let type_name = format!("array<{}>", schema.element.type_name());
        warn!(path = %path, type_name = %type_name, "array elements are not scalar");
        return Widget::Unsupported { type_name };
    }

    let len = snapshot
        .display_value()
        .and_then(PropValue::as_array)
        .map_or(0, Vec::len);
    let items = (0..len)
        .map(|index| {
            let segment = PathSegment::Index(index);
            dispatcher.dispatch(
                &schema.element,
                path.child_index(index),
                snapshot.saved_child(&segment),
                snapshot.incoming_child(&segment),
            )
        })
        .collect();

    Widget::Array {
        items,
        can_add: can_add(schema, len),
        can_remove: can_remove(schema, len),
    }
}

fn can_add(schema: &ArraySchema, len: usize) -> bool {
    schema.max_len.map_or(true, |max| len < max)
}

fn can_remove(schema: &ArraySchema, len: usize) -> bool {
    len > schema.min_len
}

/// Current items and the array schema, when the field is an editable array.
fn editable<'n>(
    ctx: &EditContext<'_, '_>,
    path: &EditPath,
    node: &'n SchemaNode,
) -> Result<(&'n ArraySchema, Vec<PropValue>), EventOutcome> {
    let current = ctx.current(path);
    let SchemaKind::Array(schema) = node.unwrap_for(current.as_ref()).kind() else {
        return Err(EventOutcome::ignored(format!("`{}` is not an array field", path)));
    };
    if !schema.has_scalar_elements() {
        return Err(EventOutcome::ignored(format!("`{}` has no item editor", path)));
    }
    let items = current
        .as_ref()
        .and_then(PropValue::as_array)
        .cloned()
        .unwrap_or_default();
    Ok((schema, items))
}

/// Append the element type's default. Existing items keep their state.
pub(crate) fn add_item(ctx: &mut EditContext<'_, '_>, path: &EditPath, node: &SchemaNode) -> EventOutcome {
    let (schema, mut items) = match editable(ctx, path, node) {
        Ok(found) => found,
        Err(outcome) => return outcome,
    };
    if !can_add(schema, items.len()) {
        return EventOutcome::ignored(format!("`{}` is at its maximum length", path));
    }
    let Some(item) = schema.element.synthesize_default() else {
        return EventOutcome::ignored(format!("no valid default for items of `{}`", path));
    };
    items.push(item);
    ctx.write(path, node, Some(PropValue::Array(items)), false)
}

/// Remove one item. Later items shift down, so item states remount from
/// the array's value.
pub(crate) fn remove_item(
    ctx: &mut EditContext<'_, '_>,
    path: &EditPath,
    node: &SchemaNode,
    index: usize,
) -> EventOutcome {
    let (schema, mut items) = match editable(ctx, path, node) {
        Ok(found) => found,
        Err(outcome) => return outcome,
    };
    if !can_remove(schema, items.len()) {
        return EventOutcome::ignored(format!("`{}` is at its minimum length", path));
    }
    if index >= items.len() {
        return EventOutcome::ignored(format!("`{}` has no item {}", path, index));
    }
    items.remove(index);
    ctx.write(path, node, Some(PropValue::Array(items)), true)
}
