//! Render output of the editor: one `FieldView` per mounted field, each
//! carrying the widget the dispatcher chose for it.

use crate::state::{FieldStatus, Validation};
use compedit_common::{EditPath, PathSegment, PropValue};
use compedit_schema::SchemaNode;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldView {
    pub path: EditPath,
    pub label: String,
    pub status: FieldStatus,
    /// Own validation and every mounted descendant are valid.
    pub valid: bool,
    pub error: Option<String>,
    pub is_default: bool,
    pub can_save: bool,
    pub can_reset: bool,
    pub widget: Widget,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Widget {
    Text {
        value: String,
    },
    Number {
        text: String,
        min: Option<f64>,
        max: Option<f64>,
        step: f64,
    },
    Checkbox {
        checked: bool,
    },
    #[serde(rename_all = "camelCase")]
    Color {
        text: String,
        /// Swatch `#rrggbb`, absent while the text is not a color.
        rgb: Option<String>,
        opacity_percent: Option<f64>,
    },
    Select {
        options: Vec<String>,
        selected: Option<String>,
    },
    Nullish {
        sentinel: Sentinel,
        absent: bool,
        inner: Option<Box<FieldView>>,
    },
    Object {
        fields: Vec<FieldView>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        groups: Vec<FieldGroup>,
    },
    #[serde(rename_all = "camelCase")]
    Array {
        items: Vec<FieldView>,
        can_add: bool,
        can_remove: bool,
    },
    Union {
        variants: Vec<String>,
        active: usize,
        inner: Box<FieldView>,
    },
    #[serde(rename_all = "camelCase")]
    Unsupported {
        type_name: String,
    },
}

/// Fields of an object shown together under one title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldGroup {
    pub label: String,
    /// Field keys in declaration order.
    pub keys: Vec<String>,
}

/// The value an optional or nullable field holds while absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentinel {
    Undefined,
    Null,
}

impl Sentinel {
    pub fn value(self) -> Option<PropValue> {
        match self {
            Sentinel::Undefined => None,
            Sentinel::Null => Some(PropValue::Null),
        }
    }

    pub fn matches(self, value: Option<&PropValue>) -> bool {
        match self {
            Sentinel::Undefined => value.is_none(),
            Sentinel::Null => matches!(value, Some(PropValue::Null)),
        }
    }
}

impl Widget {
    fn children_valid(&self) -> bool {
        match self {
            Widget::Nullish { inner, .. } => inner.as_ref().map_or(true, |view| view.valid),
            Widget::Object { fields, .. } => fields.iter().all(|view| view.valid),
            Widget::Array { items, .. } => items.iter().all(|view| view.valid),
            Widget::Union { inner, .. } => inner.valid,
            Widget::Unsupported { .. } => false,
            _ => true,
        }
    }
}

/// Snapshot of a field's local state taken when it is mounted for a pass.
#[derive(Debug, Clone)]
pub(crate) struct FieldSnapshot {
    pub unsaved: Option<PropValue>,
    /// Saved value with defaults applied; children read their saved
    /// values from here.
    pub saved: Option<PropValue>,
    pub validation: Validation,
    pub status: FieldStatus,
}

impl FieldSnapshot {
    /// What the field should display: the raw value, or the parsed value
    /// when nothing raw is held (a defaulted field).
    pub fn display_value(&self) -> Option<&PropValue> {
        self.unsaved
            .as_ref()
            .or_else(|| self.validation.parsed().and_then(|parsed| parsed.as_ref()))
    }

    pub fn saved_child(&self, segment: &PathSegment) -> Option<&PropValue> {
        self.saved.as_ref().and_then(|saved| saved.child(segment))
    }

    pub fn incoming_child(&self, segment: &PathSegment) -> Option<&PropValue> {
        self.display_value().and_then(|value| value.child(segment))
    }
}

impl FieldView {
    pub(crate) fn new(path: EditPath, node: &SchemaNode, snapshot: &FieldSnapshot, widget: Widget) -> Self {
        let valid = snapshot.validation.is_valid() && widget.children_valid();
        let is_default = match (node.default_value(), snapshot.validation.parsed()) {
            (Some(default), Some(Some(parsed))) => default == parsed,
            _ => false,
        };
        Self {
            label: path.label(),
            path,
            status: snapshot.status,
            valid,
            error: snapshot.validation.error().map(|e| e.to_string()),
            is_default,
            can_save: valid && snapshot.status.is_dirty(),
            can_reset: snapshot.status.is_dirty(),
            widget,
        }
    }

    /// Depth-first search for the outermost view at `path`.
    pub fn find(&self, path: &EditPath) -> Option<&FieldView> {
        if &self.path == path {
            return Some(self);
        }
        if !path.starts_with(&self.path) {
            return None;
        }
        self.children().find_map(|child| child.find(path))
    }

    /// Step through nullish and union wrappers to the view that edits the
    /// value itself.
    pub fn innermost(&self) -> &FieldView {
        match &self.widget {
            Widget::Nullish { inner: Some(inner), .. } | Widget::Union { inner, .. } => inner.innermost(),
            _ => self,
        }
    }

    pub fn children(&self) -> Box<dyn Iterator<Item = &FieldView> + '_> {
        match &self.widget {
            Widget::Nullish { inner, .. } => Box::new(inner.iter().map(|b| b.as_ref())),
            Widget::Object { fields, .. } => Box::new(fields.iter()),
            Widget::Array { items, .. } => Box::new(items.iter()),
            Widget::Union { inner, .. } => Box::new(std::iter::once(inner.as_ref())),
            _ => Box::new(std::iter::empty()),
        }
    }
}

/// Editor for one composition's props.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RootView {
    pub comp_id: String,
    pub component: String,
    pub notice: Option<RootNotice>,
    /// Absent when the schema cannot be edited at all.
    pub editor: Option<FieldView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RootNotice {
    /// The component's schema is not an object.
    #[serde(rename_all = "camelCase")]
    TopLevelNotObject { type_name: String },
    /// The stored props do not satisfy the schema.
    InvalidSavedProps { message: String },
}
