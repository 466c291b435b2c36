//! # Editor Store
//!
//! Owns the local edit state of every mounted field, keyed by composition
//! id and path, plus the revision counter that tells fields when saved
//! props were replaced from outside.

use crate::composition::Composition;
use crate::reducer::{self, EditorEvent, EventOutcome};
use crate::state::LocalFieldState;
use crate::view::RootView;
use crate::dispatch;
use compedit_common::{EditPath, PropValue};
use compedit_schema::SchemaNode;
use std::collections::BTreeMap;
use tracing::{debug, info};

type FieldKey = (String, EditPath);

#[derive(Debug, Default)]
pub struct EditorStore {
    revision: u64,
    fields: BTreeMap<FieldKey, LocalFieldState>,
    pass: u64,
}

impl EditorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Saved props changed outside this editor. Every field drops its
    /// unsaved value on the next render.
    pub fn props_updated_externally(&mut self) -> u64 {
        self.revision += 1;
        info!(revision = self.revision, "props updated externally");
        self.revision
    }

    /// True while any mounted field holds an unsaved change.
    pub fn is_dirty(&self) -> bool {
        self.fields.values().any(|state| state.status().is_dirty())
    }

    pub fn dirty_fields(&self) -> Vec<(&str, &EditPath)> {
        self.fields
            .iter()
            .filter(|(_, state)| state.status().is_dirty())
            .map(|((comp_id, path), _)| (comp_id.as_str(), path))
            .collect()
    }

    pub fn field(&self, comp_id: &str, path: &EditPath) -> Option<&LocalFieldState> {
        self.fields.get(&(comp_id.to_string(), path.clone()))
    }

    pub fn mounted_count(&self, comp_id: &str) -> usize {
        self.fields.keys().filter(|(id, _)| id == comp_id).count()
    }

    /// Build the editor for a composition, mounting and reconciling field
    /// state as it goes.
    pub fn render(&mut self, comp: &dyn Composition) -> RootView {
        dispatch::render(self, comp)
    }

    pub fn handle(&mut self, comp: &dyn Composition, event: EditorEvent) -> EventOutcome {
        reducer::handle(self, comp, event)
    }

    /// Drop all state for a composition.
    pub fn forget(&mut self, comp_id: &str) {
        self.fields.retain(|(id, _), _| id != comp_id);
    }

    pub(crate) fn field_mut(&mut self, comp_id: &str, path: &EditPath) -> Option<&mut LocalFieldState> {
        self.fields.get_mut(&(comp_id.to_string(), path.clone()))
    }

    pub(crate) fn insert(&mut self, comp_id: &str, path: EditPath, state: LocalFieldState) {
        self.fields.insert((comp_id.to_string(), path), state);
    }

    pub(crate) fn next_pass(&mut self) -> u64 {
        self.pass += 1;
        self.pass
    }

    /// Remove state for fields below `path`. They remount from their
    /// parent's aggregate on the next render.
    pub(crate) fn drop_descendants(&mut self, comp_id: &str, path: &EditPath) {
        self.fields
            .retain(|(id, field), _| id != comp_id || !field.is_descendant_of(path));
    }

    /// Unmount fields of `comp_id` that were not visited in `pass`.
    pub(crate) fn sweep(&mut self, comp_id: &str, pass: u64) {
        let before = self.fields.len();
        self.fields
            .retain(|(id, _), state| id != comp_id || state.seen_in_pass == pass);
        let swept = before - self.fields.len();
        if swept > 0 {
            debug!(comp_id, swept, "unmounted fields");
        }
    }

    /// Every mounted field at or below `path` validates.
    pub(crate) fn subtree_valid(&self, comp_id: &str, path: &EditPath) -> bool {
        self.fields
            .iter()
            .filter(|((id, field), _)| id == comp_id && field.starts_with(path))
            .all(|(_, state)| state.validation().is_valid())
    }

    /// Push a field's contribution up through its mounted ancestors,
    /// nearest first. Each ancestor receives its child's whole value, so
    /// containers that were only defaulted become concrete. Returns true
    /// when any ancestor changed.
    pub(crate) fn propagate(
        &mut self,
        comp_id: &str,
        path: &EditPath,
        value: Option<PropValue>,
        ancestors: &[(EditPath, &SchemaNode)],
    ) -> bool {
        let mut changed = false;
        let mut child_path = path.clone();
        let mut child_value = value;
        for (ancestor, schema) in ancestors {
            let Some(relative) = child_path.strip_prefix(ancestor).filter(|r| !r.is_empty()) else {
                continue;
            };
            let Some(state) = self.field_mut(comp_id, ancestor) else {
                break;
            };
            match state.set_unsaved_at(schema, &relative, child_value) {
                Ok(updated) => changed |= updated,
                Err(error) => {
                    debug!(comp_id, path = %path, ancestor = %ancestor, %error, "could not propagate edit");
                    break;
                }
            }
            child_value = state.propagated(schema);
            child_path = ancestor.clone();
        }
        changed
    }
}
