//! # Edit Reducer
//!
//! Every user action on a field arrives as one [`EditorEvent`] addressed by
//! path. The reducer routes it to the editor for that field's kind, which
//! updates local state and pushes the new value up through the enclosing
//! containers. Nothing here fails: events that do not apply are reported
//! as [`EventOutcome::Ignored`].

use crate::composition::Composition;
use crate::editors::{array, color, enumeration, leaf, nullish, object, union};
use crate::state::LocalFieldState;
use crate::store::EditorStore;
use compedit_common::{EditPath, PathSegment, PropValue};
use compedit_schema::{walk_node, SchemaKind, SchemaNode, SchemaTrail, SchemaVisitor};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EditorEvent {
    /// Raw input typed into a text, number, color or checkbox field.
    Edit { path: EditPath, raw: PropValue },
    SelectLiteral { path: EditPath, literal: String },
    /// Swatch pick; keeps the current opacity.
    SetColorRgb { path: EditPath, rgb: String },
    SetOpacity { path: EditPath, percent: f64 },
    SetNullish { path: EditPath, absent: bool },
    AddItem { path: EditPath },
    RemoveItem { path: EditPath, index: usize },
    SelectVariant { path: EditPath, index: usize },
    Save { path: EditPath },
    Reset { path: EditPath },
}

impl EditorEvent {
    pub fn path(&self) -> &EditPath {
        match self {
            EditorEvent::Edit { path, .. }
            | EditorEvent::SelectLiteral { path, .. }
            | EditorEvent::SetColorRgb { path, .. }
            | EditorEvent::SetOpacity { path, .. }
            | EditorEvent::SetNullish { path, .. }
            | EditorEvent::AddItem { path }
            | EditorEvent::RemoveItem { path, .. }
            | EditorEvent::SelectVariant { path, .. }
            | EditorEvent::Save { path }
            | EditorEvent::Reset { path } => path,
        }
    }
}

/// Request to persist one field, emitted by a successful save.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    pub comp_id: String,
    pub path: EditPath,
    /// `None` removes the prop.
    pub value: Option<PropValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    Updated,
    SaveRequested(Vec<SaveRequest>),
    /// The action is not allowed in the current state (invalid fields).
    Blocked(String),
    /// The event does not apply to the addressed field.
    Ignored(String),
}

impl EventOutcome {
    pub(crate) fn ignored(reason: impl Into<String>) -> Self {
        EventOutcome::Ignored(reason.into())
    }
}

/// Access to one composition's field states while handling an event.
pub(crate) struct EditContext<'a, 's> {
    pub store: &'a mut EditorStore,
    pub comp_id: &'a str,
    pub root: &'s SchemaNode,
}

impl<'a, 's> EditContext<'a, 's> {
    pub fn state(&self, path: &EditPath) -> Option<&LocalFieldState> {
        self.store.field(self.comp_id, path)
    }

    /// What the field currently shows: its raw value, or the parsed default
    /// when it holds none.
    pub fn current(&self, path: &EditPath) -> Option<PropValue> {
        let state = self.state(path)?;
        state
            .unsaved()
            .or_else(|| state.validation().parsed().and_then(|parsed| parsed.as_ref()))
            .cloned()
    }

    /// Schema node of the field at `path`, resolving unions against the
    /// unsaved props.
    pub fn node_at(&self, path: &EditPath) -> Option<&'s SchemaNode> {
        let root_value = self.state(&EditPath::root()).and_then(|state| state.unsaved());
        self.root.node_at(path, root_value)
    }

    fn ancestors(&self, path: &EditPath) -> Vec<(EditPath, &'s SchemaNode)> {
        path.ancestors()
            .into_iter()
            .filter_map(|ancestor| {
                let node = self.node_at(&ancestor)?;
                Some((ancestor, node))
            })
            .collect()
    }

    /// Replace a field's unsaved value and push it up to its ancestors.
    ///
    /// A structural write replaces the shape under the field (item removed,
    /// variant switched); descendant states are dropped and remount from
    /// the new value.
    pub fn write(
        &mut self,
        path: &EditPath,
        node: &SchemaNode,
        value: Option<PropValue>,
        structural: bool,
    ) -> EventOutcome {
        // Resolve ancestors before the write so a union switch below them
        // cannot change the nodes they are validated against.
        let ancestors = self.ancestors(path);
        let Some(state) = self.store.field_mut(self.comp_id, path) else {
            return EventOutcome::ignored(format!("`{}` is not mounted", path));
        };
        state.set_unsaved(node, value);
        let propagated = state.propagated(node);
        let status = state.status();
        if structural {
            self.store.drop_descendants(self.comp_id, path);
        }
        self.store.propagate(self.comp_id, path, propagated, &ancestors);
        debug!(comp_id = self.comp_id, path = %path, ?status, structural, "field updated");
        EventOutcome::Updated
    }
}

#[instrument(skip(store, comp), fields(comp_id = comp.id(), path = %event.path()))]
pub(crate) fn handle(store: &mut EditorStore, comp: &dyn Composition, event: EditorEvent) -> EventOutcome {
    let root = comp.schema();
    if root.as_object().is_none() {
        return EventOutcome::ignored("top-level schema is not an object");
    }
    let mut ctx = EditContext {
        store,
        comp_id: comp.id(),
        root,
    };

    let path = event.path().clone();
    let Some(node) = ctx.node_at(&path) else {
        return EventOutcome::ignored(format!("no field at `{}`", path));
    };
    if ctx.state(&path).is_none() {
        return EventOutcome::ignored(format!("`{}` is not mounted", path));
    }

    let outcome = match event {
        EditorEvent::Edit { raw, .. } => leaf::edit(&mut ctx, &path, node, raw),
        EditorEvent::SelectLiteral { literal, .. } => enumeration::select(&mut ctx, &path, node, literal),
        EditorEvent::SetColorRgb { rgb, .. } => color::set_rgb(&mut ctx, &path, node, &rgb),
        EditorEvent::SetOpacity { percent, .. } => color::set_opacity(&mut ctx, &path, node, percent),
        EditorEvent::SetNullish { absent, .. } => nullish::toggle(&mut ctx, &path, node, absent),
        EditorEvent::AddItem { .. } => array::add_item(&mut ctx, &path, node),
        EditorEvent::RemoveItem { index, .. } => array::remove_item(&mut ctx, &path, node, index),
        EditorEvent::SelectVariant { index, .. } => union::select_variant(&mut ctx, &path, node, index),
        EditorEvent::Save { .. } => save(&mut ctx, &path, node),
        EditorEvent::Reset { .. } => reset(&mut ctx, &path, node),
    };
    debug!(?outcome, "handled event");
    outcome
}

/// Save is refused while anything at or below the field is invalid or has
/// no editor. An object fans out to each dirty direct child so only those
/// props are written. An array element is saved as its whole array, since
/// the stored array can be shorter than the edited one.
fn save(ctx: &mut EditContext<'_, '_>, path: &EditPath, node: &SchemaNode) -> EventOutcome {
    if let Some(array_path) = enclosing_array(path) {
        let Some(array_node) = ctx.node_at(&array_path) else {
            return EventOutcome::ignored(format!("no field at `{}`", array_path));
        };
        debug!(path = %path, array = %array_path, "saving element through its array");
        return save(ctx, &array_path, array_node);
    }

    if !ctx.store.subtree_valid(ctx.comp_id, path) || has_uneditable(node) {
        return EventOutcome::Blocked(format!("`{}` has invalid fields", path));
    }

    let current = ctx.current(path);
    if let SchemaKind::Object(schema) = node.unwrap_for(current.as_ref()).kind() {
        if matches!(current, Some(PropValue::Object(_))) {
            let requests = object::save_requests(ctx, schema, path);
            return if requests.is_empty() {
                EventOutcome::ignored("no unsaved changes")
            } else {
                EventOutcome::SaveRequested(requests)
            };
        }
    }

    match ctx.state(path) {
        Some(state) if state.status().is_dirty() => match state.validation().parsed() {
            Some(parsed) => EventOutcome::SaveRequested(vec![SaveRequest {
                comp_id: ctx.comp_id.to_string(),
                path: path.clone(),
                value: parsed.clone(),
            }]),
            None => EventOutcome::Blocked(format!("`{}` is invalid", path)),
        },
        _ => EventOutcome::ignored("no unsaved changes"),
    }
}

/// Path of the array holding the element at `path`, if any.
fn enclosing_array(path: &EditPath) -> Option<EditPath> {
    let segments = path.segments();
    let index = segments
        .iter()
        .rposition(|segment| matches!(segment, PathSegment::Index(_)))?;
    Some(EditPath::from_segments(segments[..index].iter().cloned()))
}

fn reset(ctx: &mut EditContext<'_, '_>, path: &EditPath, node: &SchemaNode) -> EventOutcome {
    let Some(saved) = ctx.state(path).map(|state| state.saved().cloned()) else {
        return EventOutcome::ignored(format!("`{}` is not mounted", path));
    };
    ctx.write(path, node, saved, true)
}

/// Finds schema parts the dispatcher renders as unsupported.
#[derive(Default)]
struct UneditableFinder {
    found: bool,
}

impl SchemaVisitor for UneditableFinder {
    fn visit_node(&mut self, trail: &SchemaTrail, node: &SchemaNode) {
        if let SchemaKind::Array(schema) = node.kind() {
            if !schema.has_scalar_elements() {
                self.found = true;
                return;
            }
        }
        walk_node(self, trail, node);
    }

    fn visit_unsupported(&mut self, _trail: &SchemaTrail, _type_name: &str) {
        self.found = true;
    }
}

fn has_uneditable(node: &SchemaNode) -> bool {
    let mut finder = UneditableFinder::default();
    finder.visit_node(&SchemaTrail::default(), node);
    finder.found
}
