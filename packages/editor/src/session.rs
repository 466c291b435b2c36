//! # Edit Session Management
//!
//! An EditSession owns one user's editing state: the composition tree,
//! the store of local field states, the selected composition, and the
//! saves waiting on the persistence collaborator.
//!
//! Saves are optimistic. A save request is queued and local state keeps
//! the edit; confirming applies it to the tree through the path mutator,
//! rejecting leaves the field dirty and raises a notification.

use crate::composition::{find_composition, Composition, CompositionNode, TreeLevel, TreeLocator};
use crate::pipeline::{Pipeline, PipelineResult};
use crate::reducer::{EditorEvent, EventOutcome, SaveRequest};
use crate::store::EditorStore;
use crate::undo_stack::{PropChange, UndoStack};
use crate::view::RootView;
use crate::EditorError;
use compedit_common::{CommonError, EditPath, PropValue};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, instrument, warn};

/// Single user's editing session
pub struct EditSession {
    /// Unique session identifier
    pub id: String,

    compositions: Vec<Arc<CompositionNode>>,
    store: EditorStore,

    /// Id of the selected top-level composition
    selected: Option<String>,

    /// Saves waiting for the persistence collaborator
    pending_saves: Vec<PendingSave>,

    undo: UndoStack,
    pipeline: Pipeline,
    notifications: Vec<Notification>,
    next_save: u64,
}

/// Save waiting for acknowledgment
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSave {
    /// Unique save ID
    pub id: String,

    /// Where the target composition sits in the tree
    pub locator: TreeLocator,

    pub request: SaveRequest,

    /// When it was queued
    pub timestamp: u64,
}

/// Transient message for the user
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Notification {
    #[serde(rename_all = "camelCase")]
    SaveFailed {
        comp_id: String,
        path: EditPath,
        message: String,
    },
    /// The composition a save targeted is no longer in the tree.
    #[serde(rename_all = "camelCase")]
    SaveDropped { comp_id: String, path: EditPath },
}

/// Editors for the selected composition and its background.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub foreground: RootView,
    pub background: Option<RootView>,
}

impl EditSession {
    pub fn new(id: impl Into<String>, compositions: Vec<Arc<CompositionNode>>) -> Self {
        Self {
            id: id.into(),
            compositions,
            store: EditorStore::new(),
            selected: None,
            pending_saves: Vec::new(),
            undo: UndoStack::new(),
            pipeline: Pipeline::new(),
            notifications: Vec::new(),
            next_save: 0,
        }
    }

    pub fn with_undo_levels(mut self, levels: usize) -> Self {
        self.undo = UndoStack::with_max_levels(levels);
        self
    }

    pub fn compositions(&self) -> &[Arc<CompositionNode>] {
        &self.compositions
    }

    pub fn store(&self) -> &EditorStore {
        &self.store
    }

    /// Replace the whole composition list, as after a generation or a
    /// project reload. Unsaved edits and undo history are discarded.
    pub fn replace_compositions(&mut self, compositions: Vec<Arc<CompositionNode>>) {
        info!(session = %self.id, count = compositions.len(), "compositions replaced");
        let kept: HashSet<&str> = compositions.iter().flat_map(|comp| tree_ids(comp)).collect();
        for old in &self.compositions {
            for id in tree_ids(old).filter(|id| !kept.contains(id)) {
                self.store.forget(id);
            }
        }
        self.compositions = compositions;
        self.undo.clear();
        self.store.props_updated_externally();
        if let Some(id) = &self.selected {
            if !self.compositions.iter().any(|comp| &comp.id == id) {
                self.selected = None;
            }
        }
    }

    /// Select a top-level composition for editing.
    pub fn select(&mut self, comp_id: &str) -> Result<(), EditorError> {
        if !self.compositions.iter().any(|comp| comp.id == comp_id) {
            return Err(EditorError::UnknownComposition(comp_id.to_string()));
        }
        self.selected = Some(comp_id.to_string());
        Ok(())
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    fn target(&self, level: TreeLevel) -> Result<(TreeLocator, Arc<dyn Composition>), EditorError> {
        let parent_id = self.selected.as_deref().ok_or(EditorError::NoSelection)?;
        let parent = self
            .compositions
            .iter()
            .find(|comp| comp.id == parent_id)
            .ok_or_else(|| EditorError::UnknownComposition(parent_id.to_string()))?;
        let locator = TreeLocator {
            parent_id: parent_id.to_string(),
            level,
        };
        match level {
            TreeLevel::Foreground => Ok((locator, Arc::clone(parent) as Arc<dyn Composition>)),
            TreeLevel::Background => {
                let background = parent
                    .background
                    .as_ref()
                    .ok_or_else(|| EditorError::NoBackground(parent_id.to_string()))?;
                Ok((locator, Arc::clone(background) as Arc<dyn Composition>))
            }
        }
    }

    /// Render the editors for the selected composition.
    pub fn render(&mut self) -> Result<SessionView, EditorError> {
        let foreground = self.render_level(TreeLevel::Foreground)?;
        let background = match self.render_level(TreeLevel::Background) {
            Ok(view) => Some(view),
            Err(EditorError::NoBackground(_)) => None,
            Err(error) => return Err(error),
        };
        Ok(SessionView { foreground, background })
    }

    pub fn render_level(&mut self, level: TreeLevel) -> Result<RootView, EditorError> {
        let (_, comp) = self.target(level)?;
        Ok(self.store.render(comp.as_ref()))
    }

    /// Route an editor event to the selected composition. Save requests
    /// are queued as pending saves.
    pub fn handle(&mut self, level: TreeLevel, event: EditorEvent) -> Result<EventOutcome, EditorError> {
        let (locator, comp) = self.target(level)?;
        let outcome = self.store.handle(comp.as_ref(), event);
        if let EventOutcome::SaveRequested(requests) = &outcome {
            for request in requests {
                self.enqueue(locator.clone(), request.clone());
            }
        }
        Ok(outcome)
    }

    fn enqueue(&mut self, locator: TreeLocator, request: SaveRequest) -> String {
        self.next_save += 1;
        let id = format!("{}-{}", self.id, self.next_save);
        debug!(save_id = %id, comp_id = %request.comp_id, path = %request.path, "save queued");
        self.pending_saves.push(PendingSave {
            id: id.clone(),
            locator,
            request,
            timestamp: current_timestamp(),
        });
        id
    }

    pub fn pending_saves(&self) -> &[PendingSave] {
        &self.pending_saves
    }

    fn take_pending(&mut self, save_id: &str) -> Result<PendingSave, EditorError> {
        let index = self
            .pending_saves
            .iter()
            .position(|save| save.id == save_id)
            .ok_or_else(|| EditorError::UnknownSave(save_id.to_string()))?;
        Ok(self.pending_saves.remove(index))
    }

    /// The collaborator persisted a save: apply it to the tree.
    ///
    /// The revision is not bumped. Fields that were saved become Clean
    /// against the new value; other unsaved edits are kept. A save that
    /// cannot be applied raises a notification instead.
    #[instrument(skip(self), fields(session = %self.id))]
    pub fn confirm_save(&mut self, save_id: &str) -> Result<(), EditorError> {
        let pending = self.take_pending(save_id)?;
        if let Some(change) = self.settle(&pending) {
            self.undo.record(change);
        }
        Ok(())
    }

    /// Confirm every pending save as one undo step. Returns how many
    /// props changed. A save that fails does not stop the ones after it.
    #[instrument(skip(self), fields(session = %self.id))]
    pub fn confirm_all(&mut self) -> usize {
        let pending = std::mem::take(&mut self.pending_saves);
        self.undo.begin_batch();
        self.undo
            .set_batch_description(format!("save {} prop(s)", pending.len()));
        let mut committed = 0;
        for save in &pending {
            if let Some(change) = self.settle(save) {
                self.undo.record(change);
                committed += 1;
            }
        }
        self.undo.end_batch();
        committed
    }

    /// The collaborator failed to persist a save. Local state keeps the
    /// edit so the user can retry.
    pub fn reject_save(&mut self, save_id: &str, message: impl Into<String>) -> Result<(), EditorError> {
        let pending = self.take_pending(save_id)?;
        let message = message.into();
        warn!(
            save_id,
            comp_id = %pending.request.comp_id,
            path = %pending.request.path,
            message = %message,
            "save failed"
        );
        self.notifications.push(Notification::SaveFailed {
            comp_id: pending.request.comp_id,
            path: pending.request.path,
            message,
        });
        Ok(())
    }

    /// Commit a save, reporting a failure to the user.
    fn settle(&mut self, save: &PendingSave) -> Option<PropChange> {
        match self.commit(save) {
            Ok(change) => change,
            Err(error) => {
                let message = error.to_string();
                warn!(
                    save_id = %save.id,
                    comp_id = %save.request.comp_id,
                    path = %save.request.path,
                    message = %message,
                    "save could not be applied"
                );
                self.notifications.push(Notification::SaveFailed {
                    comp_id: save.request.comp_id.clone(),
                    path: save.request.path.clone(),
                    message,
                });
                None
            }
        }
    }

    /// Apply one save to the tree. Returns the committed change, or `None`
    /// when the prop already held the value or the target is gone.
    fn commit(&mut self, save: &PendingSave) -> Result<Option<PropChange>, EditorError> {
        let request = &save.request;
        let key = request
            .path
            .first_key()
            .ok_or_else(|| CommonError::InvalidPath(request.path.to_string()))?;
        let Some(comp) = find_composition(&self.compositions, &save.locator, &request.comp_id) else {
            warn!(save_id = %save.id, comp_id = %request.comp_id, "save target is no longer in the tree");
            self.notifications.push(Notification::SaveDropped {
                comp_id: request.comp_id.clone(),
                path: request.path.clone(),
            });
            return Ok(None);
        };

        let before = comp.props().get(key).cloned();
        let tail = request.path.tail();
        let after = if tail.is_root() {
            request.value.clone()
        } else {
            let base = match &before {
                Some(value) => value.clone(),
                None => prop_default(comp.as_ref(), key).ok_or_else(|| CommonError::NotAContainer {
                    path: key.to_string(),
                    found: "nothing",
                })?,
            };
            Some(base.with_path(&tail, request.value.clone())?)
        };

        if before == after {
            debug!(comp_id = %request.comp_id, key, "save matches stored value");
            return Ok(None);
        }

        let change = PropChange {
            locator: save.locator.clone(),
            comp_id: request.comp_id.clone(),
            key: key.to_string(),
            before,
            after,
        };
        self.compositions = change.apply(&self.compositions);
        info!(comp_id = %change.comp_id, key, "prop committed");
        Ok(Some(change))
    }

    /// Saved props were changed by someone else; every field drops its
    /// unsaved value on the next render.
    pub fn props_updated_externally(&mut self) -> u64 {
        self.store.props_updated_externally()
    }

    /// Discard every unsaved edit in the session.
    pub fn reset_all_unsaved(&mut self) {
        info!(session = %self.id, "resetting all unsaved props");
        self.store.props_updated_externally();
    }

    pub fn is_dirty(&self) -> bool {
        self.store.is_dirty()
    }

    /// Undo the last committed save. Returns false when there is nothing
    /// to undo.
    pub fn undo(&mut self) -> bool {
        let description = self.undo.undo_description().map(str::to_string);
        match self.undo.undo(&self.compositions) {
            Some(tree) => {
                info!(session = %self.id, description = ?description, "undo");
                self.compositions = tree;
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.undo.redo(&self.compositions) {
            Some(tree) => {
                info!(session = %self.id, "redo");
                self.compositions = tree;
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo.can_redo()
    }

    /// Resolve the tree for the renderer.
    pub fn refresh_render(&mut self) -> PipelineResult {
        self.pipeline.refresh(&self.compositions)
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }
}

/// The schema default of a top-level prop.
fn prop_default(comp: &dyn Composition, key: &str) -> Option<PropValue> {
    comp.schema()
        .node_at(&EditPath::key(key), None)
        .and_then(|node| node.validate(None).ok().flatten())
}

/// Ids of a composition and its background.
fn tree_ids(comp: &CompositionNode) -> impl Iterator<Item = &str> {
    std::iter::once(comp.id.as_str()).chain(comp.background.as_ref().map(|bg| bg.id.as_str()))
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::LeafComposition;
    use compedit_common::PropertyBag;
    use compedit_schema::SchemaNode;
    use std::num::NonZeroU32;

    fn composition(props: PropertyBag) -> Arc<CompositionNode> {
        let schema = Arc::new(SchemaNode::object([
            ("text", SchemaNode::string().default("Hi")),
            ("palette", SchemaNode::array(SchemaNode::color()).min_len(1).default(vec!["#ffffff"])),
            ("style", SchemaNode::object([("color", SchemaNode::color())]).optional()),
        ]));
        let duration = NonZeroU32::new(30).unwrap();
        Arc::new(CompositionNode {
            id: "a".into(),
            component: "simpleFadeTransition".into(),
            schema: Arc::clone(&schema),
            props: Arc::new(props),
            duration,
            background: Some(Arc::new(LeafComposition {
                id: "a-bg".into(),
                component: "plainBackground".into(),
                schema,
                props: Arc::new(PropertyBag::new()),
                duration,
            })),
        })
    }

    fn session_with(props: &str) -> EditSession {
        let props: PropertyBag = serde_json::from_str(props).unwrap();
        EditSession::new("s", vec![composition(props)])
    }

    fn session() -> EditSession {
        session_with(r#"{"text": "Hello"}"#)
    }

    fn edit(session: &mut EditSession, path: &str, raw: &str) {
        let outcome = session
            .handle(
                TreeLevel::Foreground,
                EditorEvent::Edit {
                    path: path.parse().unwrap(),
                    raw: raw.into(),
                },
            )
            .unwrap();
        assert_eq!(outcome, EventOutcome::Updated);
    }

    fn save(session: &mut EditSession, path: &str) -> Vec<SaveRequest> {
        let outcome = session
            .handle(TreeLevel::Foreground, EditorEvent::Save { path: path.parse().unwrap() })
            .unwrap();
        match outcome {
            EventOutcome::SaveRequested(requests) => requests,
            other => panic!("expected a save request, got {:?}", other),
        }
    }

    #[test]
    fn test_requires_selection() {
        let mut session = session();
        assert!(matches!(session.render(), Err(EditorError::NoSelection)));
        assert!(matches!(session.select("zzz"), Err(EditorError::UnknownComposition(_))));
        session.select("a").unwrap();
        let view = session.render().unwrap();
        assert_eq!(view.foreground.comp_id, "a");
        assert_eq!(view.background.unwrap().comp_id, "a-bg");
    }

    #[test]
    fn test_nested_save_starts_from_default() {
        let mut session = session();
        session.select("a").unwrap();
        session.render().unwrap();

        let path: EditPath = "palette[0]".parse().unwrap();
        session
            .handle(
                TreeLevel::Background,
                EditorEvent::Edit {
                    path: path.clone(),
                    raw: "#000000".into(),
                },
            )
            .unwrap();
        let outcome = session.handle(TreeLevel::Background, EditorEvent::Save { path }).unwrap();
        assert!(matches!(outcome, EventOutcome::SaveRequested(_)));

        let save_id = session.pending_saves()[0].id.clone();
        session.confirm_save(&save_id).unwrap();
        let background = session.compositions()[0].background.clone().unwrap();
        assert_eq!(
            background.props.get("palette"),
            Some(&PropValue::from(vec!["#000000"]))
        );
        assert!(session.can_undo());
    }

    #[test]
    fn test_rejected_save_keeps_edit() {
        let mut session = session();
        session.select("a").unwrap();
        session.render().unwrap();

        let path = EditPath::key("text");
        session
            .handle(
                TreeLevel::Foreground,
                EditorEvent::Edit {
                    path: path.clone(),
                    raw: "Bye".into(),
                },
            )
            .unwrap();
        session
            .handle(TreeLevel::Foreground, EditorEvent::Save { path: path.clone() })
            .unwrap();
        let save_id = session.pending_saves()[0].id.clone();
        session.reject_save(&save_id, "offline").unwrap();

        assert!(session.pending_saves().is_empty());
        assert!(session.is_dirty());
        assert_eq!(
            session.take_notifications(),
            vec![Notification::SaveFailed {
                comp_id: "a".into(),
                path,
                message: "offline".into(),
            }]
        );
        assert!(matches!(
            session.confirm_save(&save_id),
            Err(EditorError::UnknownSave(_))
        ));
    }

    #[test]
    fn test_save_to_replaced_tree_is_dropped() {
        let mut session = session();
        session.select("a").unwrap();
        session.render().unwrap();
        session
            .handle(
                TreeLevel::Foreground,
                EditorEvent::Edit {
                    path: EditPath::key("text"),
                    raw: "Bye".into(),
                },
            )
            .unwrap();
        session
            .handle(TreeLevel::Foreground, EditorEvent::Save { path: EditPath::key("text") })
            .unwrap();

        assert!(session.store().mounted_count("a") > 0);
        session.replace_compositions(Vec::new());
        assert_eq!(session.selected(), None);
        assert_eq!(session.store().mounted_count("a"), 0);
        assert_eq!(session.store().mounted_count("a-bg"), 0);
        assert_eq!(session.confirm_all(), 0);
        assert!(matches!(
            session.take_notifications().as_slice(),
            [Notification::SaveDropped { .. }]
        ));
    }

    #[test]
    fn test_item_save_writes_whole_array() {
        let mut session = session_with(r##"{"text": "Hello", "palette": ["#111111"]}"##);
        session.select("a").unwrap();
        session.render().unwrap();

        let palette = EditPath::key("palette");
        for _ in 0..2 {
            let outcome = session
                .handle(TreeLevel::Foreground, EditorEvent::AddItem { path: palette.clone() })
                .unwrap();
            assert_eq!(outcome, EventOutcome::Updated);
        }
        session.render_level(TreeLevel::Foreground).unwrap();
        edit(&mut session, "palette[2]", "#222222");

        let requests = save(&mut session, "palette[2]");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].path, palette);
        edit(&mut session, "text", "Bye");
        save(&mut session, "text");

        assert_eq!(session.confirm_all(), 2);
        let props = &session.compositions()[0].props;
        assert_eq!(
            props.get("palette"),
            Some(&PropValue::from(vec!["#111111", "#ffffff", "#222222"]))
        );
        assert_eq!(props.get("text"), Some(&PropValue::from("Bye")));
        assert!(session.take_notifications().is_empty());
        assert!(session.pending_saves().is_empty());
    }

    #[test]
    fn test_failed_commit_does_not_stop_later_saves() {
        let mut session = session_with(r##"{"text": "Hello", "style": {"color": "#111111"}}"##);
        session.select("a").unwrap();
        session.render().unwrap();

        edit(&mut session, "style.color", "#222222");
        let requests = save(&mut session, "style.color");
        assert_eq!(requests[0].path, "style.color".parse::<EditPath>().unwrap());
        edit(&mut session, "text", "Bye");
        save(&mut session, "text");
        assert_eq!(session.pending_saves().len(), 2);

        // The stored style stops being an object before the saves land
        let props: PropertyBag = serde_json::from_str(r#"{"text": "Hello", "style": "plain"}"#).unwrap();
        session.replace_compositions(vec![composition(props)]);

        assert_eq!(session.confirm_all(), 1);
        let props = &session.compositions()[0].props;
        assert_eq!(props.get("text"), Some(&PropValue::from("Bye")));
        assert_eq!(props.get("style"), Some(&PropValue::from("plain")));
        assert!(session.pending_saves().is_empty());
        assert!(session.can_undo());

        let notifications = session.take_notifications();
        assert_eq!(notifications.len(), 1);
        assert!(matches!(
            &notifications[0],
            Notification::SaveFailed { comp_id, path, .. }
                if comp_id == "a" && *path == "style.color".parse::<EditPath>().unwrap()
        ));
    }

    #[test]
    fn test_confirm_save_reports_failed_commit() {
        let mut session = session_with(r##"{"style": {"color": "#111111"}}"##);
        session.select("a").unwrap();
        session.render().unwrap();
        edit(&mut session, "style.color", "#222222");
        save(&mut session, "style.color");

        let props: PropertyBag = serde_json::from_str(r#"{"style": 3}"#).unwrap();
        session.replace_compositions(vec![composition(props)]);
        let save_id = session.pending_saves()[0].id.clone();

        session.confirm_save(&save_id).unwrap();
        assert!(!session.can_undo());
        assert!(matches!(
            session.take_notifications().as_slice(),
            [Notification::SaveFailed { .. }]
        ));
        assert!(matches!(
            session.confirm_save(&save_id),
            Err(EditorError::UnknownSave(_))
        ));
    }
}
