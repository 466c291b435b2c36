//! Object fields mount one child per declared field, in declaration order.

use crate::dispatch::Dispatcher;
use crate::reducer::{EditContext, SaveRequest};
use crate::state::FieldStatus;
use crate::view::{FieldGroup, FieldSnapshot, Widget};
use compedit_common::{EditPath, PathSegment};
use compedit_schema::catalog::TYPOGRAPHY_KEYS;
use compedit_schema::ObjectSchema;

pub(crate) fn widget<'s>(
    dispatcher: &mut Dispatcher<'s, '_>,
    schema: &'s ObjectSchema,
    path: &EditPath,
    snapshot: &FieldSnapshot,
) -> Widget {
    let fields = schema
        .fields
        .iter()
        .map(|(key, child)| {
            let segment = PathSegment::Key(key.clone());
            dispatcher.dispatch(
                child,
                path.child_key(key.as_str()),
                snapshot.saved_child(&segment),
                snapshot.incoming_child(&segment),
            )
        })
        .collect();
    Widget::Object {
        fields,
        groups: groups(schema),
    }
}

/// Typography props form one group once an object declares two or more
/// of them.
fn groups(schema: &ObjectSchema) -> Vec<FieldGroup> {
    let keys: Vec<String> = schema
        .keys()
        .filter(|key| TYPOGRAPHY_KEYS.contains(key))
        .map(str::to_string)
        .collect();
    if keys.len() < 2 {
        return Vec::new();
    }
    vec![FieldGroup {
        label: "Typography".to_string(),
        keys,
    }]
}

/// One save request per direct child holding a valid unsaved change.
pub(crate) fn save_requests(ctx: &EditContext<'_, '_>, schema: &ObjectSchema, path: &EditPath) -> Vec<SaveRequest> {
    schema
        .keys()
        .filter_map(|key| {
            let child = path.child_key(key);
            let state = ctx.state(&child)?;
            if state.status() != FieldStatus::DirtyValid {
                return None;
            }
            let value = state.validation().parsed()?.clone();
            Some(SaveRequest {
                comp_id: ctx.comp_id.to_string(),
                path: child,
                value,
            })
        })
        .collect()
}
