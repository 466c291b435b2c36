//! Enum fields render as a select over the declared literals.

use crate::reducer::{EditContext, EventOutcome};
use crate::view::{FieldSnapshot, Widget};
use compedit_common::{EditPath, PropValue};
use compedit_schema::{SchemaKind, SchemaNode};

pub(crate) fn widget(values: &[String], snapshot: &FieldSnapshot) -> Widget {
    Widget::Select {
        options: values.to_vec(),
        selected: snapshot
            .display_value()
            .and_then(PropValue::as_str)
            .filter(|value| values.iter().any(|v| v == value))
            .map(str::to_string),
    }
}

/// Selection writes the literal directly; values outside the declared set
/// are ignored rather than stored as invalid input.
pub(crate) fn select(
    ctx: &mut EditContext<'_, '_>,
    path: &EditPath,
    node: &SchemaNode,
    literal: String,
) -> EventOutcome {
    let current = ctx.current(path);
    let SchemaKind::Enum(values) = node.unwrap_for(current.as_ref()).kind() else {
        return EventOutcome::ignored(format!("`{}` is not an enum field", path));
    };
    if !values.contains(&literal) {
        return EventOutcome::ignored(format!("`{}` is not one of {}", literal, values.join(", ")));
    }
    ctx.write(path, node, Some(PropValue::String(literal)), false)
}
