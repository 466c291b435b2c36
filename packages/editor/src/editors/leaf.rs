//! Text, number and checkbox fields.
//!
//! Input is stored exactly as typed; validation runs on the coerced value,
//! so `"9"` in a number field is valid and `""` is not.

use crate::reducer::{EditContext, EventOutcome};
use crate::view::{FieldSnapshot, Widget};
use compedit_common::{EditPath, PropValue};
use compedit_schema::{NumberConstraints, SchemaKind, SchemaNode};

pub(crate) fn text_widget(snapshot: &FieldSnapshot) -> Widget {
    Widget::Text {
        value: display_text(snapshot),
    }
}

pub(crate) fn number_widget(constraints: &NumberConstraints, snapshot: &FieldSnapshot) -> Widget {
    Widget::Number {
        text: display_text(snapshot),
        min: constraints.min,
        max: constraints.max,
        step: constraints.step(),
    }
}

pub(crate) fn checkbox_widget(snapshot: &FieldSnapshot) -> Widget {
    Widget::Checkbox {
        checked: snapshot
            .display_value()
            .and_then(PropValue::as_bool)
            .unwrap_or(false),
    }
}

fn display_text(snapshot: &FieldSnapshot) -> String {
    snapshot
        .display_value()
        .map(PropValue::display_text)
        .unwrap_or_default()
}

pub(crate) fn edit(ctx: &mut EditContext<'_, '_>, path: &EditPath, node: &SchemaNode, raw: PropValue) -> EventOutcome {
    let current = ctx.current(path);
    match node.unwrap_for(current.as_ref()).kind() {
        SchemaKind::String | SchemaKind::Number(_) | SchemaKind::Boolean => ctx.write(path, node, Some(raw), false),
        SchemaKind::Enum(_) => EventOutcome::ignored("enum fields take a literal selection"),
        _ => EventOutcome::ignored(format!("`{}` is not a text field", path)),
    }
}
