//! # Type Dispatcher
//!
//! Walks a composition's schema, mounting local state for each field and
//! choosing the widget for its kind. Wrappers (optional, nullable, union)
//! share their field's state and path; containers recurse into children.

use crate::composition::Composition;
use crate::editors::{array, color, enumeration, leaf, nullish, object, union};
use crate::state::{FieldStatus, LocalFieldState, Validation};
use crate::store::EditorStore;
use crate::view::{FieldSnapshot, FieldView, RootNotice, RootView, Sentinel, Widget};
use compedit_common::{EditPath, PropValue};
use compedit_schema::{SchemaKind, SchemaNode};
use tracing::{instrument, warn};

/// Reconciling one field can change an ancestor's aggregate, which in turn
/// changes what its other children should show. Re-render until stable.
const MAX_PASSES: usize = 3;

#[instrument(skip(store, comp), fields(comp_id = comp.id(), component = comp.component()))]
pub(crate) fn render(store: &mut EditorStore, comp: &dyn Composition) -> RootView {
    let schema = comp.schema();
    if schema.as_object().is_none() {
        warn!(type_name = %schema.type_name(), "top-level schema is not an object");
        store.forget(comp.id());
        return RootView {
            comp_id: comp.id().to_string(),
            component: comp.component().to_string(),
            notice: Some(RootNotice::TopLevelNotObject {
                type_name: schema.type_name(),
            }),
            editor: None,
        };
    }

    let passes = run_passes(store, comp.id(), schema, &PropValue::Object(comp.props().clone()));
    if !passes.settled {
        warn!(passes = MAX_PASSES, "field states still changing, showing the last pass");
    }
    store.sweep(comp.id(), passes.last_pass);

    let notice = schema
        .resolve_props(comp.props())
        .err()
        .map(|error| RootNotice::InvalidSavedProps {
            message: error.to_string(),
        });

    RootView {
        comp_id: comp.id().to_string(),
        component: comp.component().to_string(),
        notice,
        editor: passes.editor,
    }
}

struct Passes {
    editor: Option<FieldView>,
    last_pass: u64,
    /// The last pass reconciled nothing.
    settled: bool,
}

fn run_passes(store: &mut EditorStore, comp_id: &str, schema: &SchemaNode, saved: &PropValue) -> Passes {
    let mut passes = Passes {
        editor: None,
        last_pass: 0,
        settled: false,
    };
    for _ in 0..MAX_PASSES {
        passes.last_pass = store.next_pass();
        let mut dispatcher = Dispatcher {
            store: &mut *store,
            comp_id,
            pass: passes.last_pass,
            ancestors: Vec::new(),
            changed: false,
        };
        passes.editor = Some(dispatcher.dispatch(schema, EditPath::root(), Some(saved), Some(saved)));
        if !dispatcher.changed {
            passes.settled = true;
            break;
        }
    }
    passes
}

pub(crate) struct Dispatcher<'s, 'a> {
    store: &'a mut EditorStore,
    comp_id: &'a str,
    pass: u64,
    /// Fields enclosing the one being dispatched, outermost first.
    ancestors: Vec<(EditPath, &'s SchemaNode)>,
    changed: bool,
}

impl<'s, 'a> Dispatcher<'s, 'a> {
    /// Mount the field at `path` and build its view.
    ///
    /// `saved` is the field's saved value as seen by its parent; `incoming`
    /// is the parent's current aggregate value for it, used only when the
    /// field is first mounted.
    pub(crate) fn dispatch(
        &mut self,
        node: &'s SchemaNode,
        path: EditPath,
        saved: Option<&PropValue>,
        incoming: Option<&PropValue>,
    ) -> FieldView {
        let snapshot = self.mount(node, &path, saved, incoming);
        self.ancestors.push((path.clone(), node));
        let view = self.build(node, path, &snapshot);
        self.ancestors.pop();
        view
    }

    /// Build the view for `node` over an already mounted field.
    pub(crate) fn build(&mut self, node: &'s SchemaNode, path: EditPath, snapshot: &FieldSnapshot) -> FieldView {
        let widget = match node.kind() {
            SchemaKind::String if node.is_color() => color::widget(snapshot),
            SchemaKind::String => leaf::text_widget(snapshot),
            SchemaKind::Number(constraints) => leaf::number_widget(constraints, snapshot),
            SchemaKind::Boolean => leaf::checkbox_widget(snapshot),
            SchemaKind::Enum(values) => enumeration::widget(values, snapshot),
            SchemaKind::Optional(inner) => nullish::widget(self, inner, Sentinel::Undefined, &path, snapshot),
            SchemaKind::Nullable(inner) => nullish::widget(self, inner, Sentinel::Null, &path, snapshot),
            SchemaKind::Object(schema) => object::widget(self, schema, &path, snapshot),
            SchemaKind::Array(schema) => array::widget(self, schema, &path, snapshot),
            SchemaKind::Union(schema) => union::widget(self, schema, &path, snapshot),
            SchemaKind::Unsupported(type_name) => unsupported(&path, type_name),
        };
        FieldView::new(path, node, snapshot, widget)
    }

    fn mount(
        &mut self,
        node: &SchemaNode,
        path: &EditPath,
        saved: Option<&PropValue>,
        incoming: Option<&PropValue>,
    ) -> FieldSnapshot {
        let revision = self.store.revision();
        let reconciled = match self.store.field_mut(self.comp_id, path) {
            Some(state) => {
                state.seen_in_pass = self.pass;
                state.reconcile(node, saved, revision)
            }
            None => {
                let mut state = LocalFieldState::mount(node, saved.cloned(), incoming.cloned(), revision);
                state.seen_in_pass = self.pass;
                self.store.insert(self.comp_id, path.clone(), state);
                false
            }
        };

        if reconciled {
            let value = self
                .store
                .field(self.comp_id, path)
                .and_then(|state| state.propagated(node));
            let nearest_first: Vec<_> = self.ancestors.iter().rev().cloned().collect();
            if self.store.propagate(self.comp_id, path, value, &nearest_first) {
                self.changed = true;
            }
        }

        match self.store.field(self.comp_id, path) {
            Some(state) => FieldSnapshot {
                unsaved: state.unsaved().cloned(),
                saved: state.saved_resolved().cloned(),
                validation: state.validation().clone(),
                status: state.status(),
            },
            None => FieldSnapshot {
                unsaved: incoming.cloned(),
                saved: saved.cloned(),
                validation: Validation::compute(node, incoming),
                status: FieldStatus::Clean,
            },
        }
    }
}

fn unsupported(path: &EditPath, type_name: &str) -> Widget {
    warn!(path = %path, type_name, "no editor for schema type");
    Widget::Unsupported {
        type_name: type_name.to_string(),
    }
}
