//! Optional and nullable fields: a present/absent toggle around the inner
//! editor. The inner editor shares the field's path and state.

use crate::dispatch::Dispatcher;
use crate::reducer::{EditContext, EventOutcome};
use crate::view::{FieldSnapshot, Sentinel, Widget};
use compedit_common::EditPath;
use compedit_schema::{SchemaKind, SchemaNode};

pub(crate) fn widget<'s>(
    dispatcher: &mut Dispatcher<'s, '_>,
    inner: &'s SchemaNode,
    sentinel: Sentinel,
    path: &EditPath,
    snapshot: &FieldSnapshot,
) -> Widget {
    let absent = sentinel.matches(snapshot.unsaved.as_ref());
    let inner = (!absent).then(|| Box::new(dispatcher.build(inner, path.clone(), snapshot)));
    Widget::Nullish {
        sentinel,
        absent,
        inner,
    }
}

/// Switching to present seeds the inner type's synthesized default, which
/// always validates.
pub(crate) fn toggle(ctx: &mut EditContext<'_, '_>, path: &EditPath, node: &SchemaNode, absent: bool) -> EventOutcome {
    let (inner, sentinel) = match node.kind() {
        SchemaKind::Optional(inner) => (inner, Sentinel::Undefined),
        SchemaKind::Nullable(inner) => (inner, Sentinel::Null),
        _ => return EventOutcome::ignored(format!("`{}` is not optional or nullable", path)),
    };

    let current_is_absent = ctx
        .state(path)
        .map_or(true, |state| sentinel.matches(state.unsaved()));
    if current_is_absent == absent {
        return EventOutcome::ignored(if absent { "already absent" } else { "already present" });
    }

    if absent {
        return ctx.write(path, node, sentinel.value(), true);
    }
    match inner.synthesize_default() {
        Some(value) => ctx.write(path, node, Some(value), true),
        None => EventOutcome::ignored(format!("no valid default for `{}`", path)),
    }
}
