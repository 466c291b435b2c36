//! # Undo/Redo Stack
//!
//! Tracks committed prop changes and enables undo/redo over the
//! composition tree.
//!
//! ## Design
//!
//! - Each change records the prop's previous value, so its inverse is
//!   another change
//! - Undo applies the inverses and moves the batch to the redo stack
//! - Redo reapplies the original changes
//! - New changes clear the redo stack
//! - Supports batched changes (an object save fans out to several props
//!   and undoes as one step)
//!
//! Changes go through the path mutator like any other commit, so undo
//! keeps structural sharing.
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut stack = UndoStack::new();
//! let change = PropChange { locator, comp_id, key, before, after };
//! tree = change.apply(&tree);
//! stack.record(change);
//!
//! tree = stack.undo(&tree).unwrap_or(tree);
//! ```

use crate::composition::{modify_props_in_tree, remove_prop_in_tree, CompositionNode, TreeLocator};
use compedit_common::PropValue;
use std::sync::Arc;

/// One committed top-level prop change.
#[derive(Debug, Clone, PartialEq)]
pub struct PropChange {
    pub locator: TreeLocator,
    pub comp_id: String,
    pub key: String,
    /// `None` when the prop was absent.
    pub before: Option<PropValue>,
    pub after: Option<PropValue>,
}

impl PropChange {
    pub fn apply(&self, tree: &[Arc<CompositionNode>]) -> Vec<Arc<CompositionNode>> {
        match &self.after {
            Some(value) => modify_props_in_tree(tree, &self.locator, &self.comp_id, &self.key, value.clone()),
            None => remove_prop_in_tree(tree, &self.locator, &self.comp_id, &self.key),
        }
    }

    pub fn inverse(&self) -> Self {
        Self {
            before: self.after.clone(),
            after: self.before.clone(),
            ..self.clone()
        }
    }
}

/// A group of changes that should be undone/redone together
#[derive(Debug, Clone)]
pub struct ChangeBatch {
    /// The changes in this batch (in application order)
    pub changes: Vec<PropChange>,

    /// The inverse changes (in reverse order for undo)
    pub inverses: Vec<PropChange>,

    /// Optional description of this batch
    pub description: Option<String>,
}

impl ChangeBatch {
    pub fn single(change: PropChange) -> Self {
        Self {
            inverses: vec![change.inverse()],
            changes: vec![change],
            description: None,
        }
    }
}

/// Undo/redo stack for committed prop changes
#[derive(Debug)]
pub struct UndoStack {
    /// Stack of applied batches (most recent last)
    undo_stack: Vec<ChangeBatch>,

    /// Stack of undone batches (most recent last)
    redo_stack: Vec<ChangeBatch>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    /// Currently building a batch
    current_batch: Option<ChangeBatch>,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            current_batch: None,
        }
    }

    /// Record a change that has already been applied to the tree
    pub fn record(&mut self, change: PropChange) {
        if let Some(batch) = &mut self.current_batch {
            batch.inverses.insert(0, change.inverse()); // Inverses go in reverse order
            batch.changes.push(change);
        } else {
            self.push_batch(ChangeBatch::single(change));
        }
    }

    /// Start a batch of changes (will be undone/redone together)
    pub fn begin_batch(&mut self) {
        self.current_batch = Some(ChangeBatch {
            changes: Vec::new(),
            inverses: Vec::new(),
            description: None,
        });
    }

    /// End the current batch and push to undo stack
    pub fn end_batch(&mut self) {
        if let Some(batch) = self.current_batch.take() {
            if !batch.changes.is_empty() {
                self.push_batch(batch);
            }
        }
    }

    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if let Some(batch) = &mut self.current_batch {
            batch.description = Some(description.into());
        }
    }

    fn push_batch(&mut self, batch: ChangeBatch) {
        self.undo_stack.push(batch);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        // New action invalidates future
        self.redo_stack.clear();
    }

    /// Undo the most recent batch, returning the new tree
    pub fn undo(&mut self, tree: &[Arc<CompositionNode>]) -> Option<Vec<Arc<CompositionNode>>> {
        let batch = self.undo_stack.pop()?;
        let out = batch
            .inverses
            .iter()
            .fold(tree.to_vec(), |tree, inverse| inverse.apply(&tree));
        self.redo_stack.push(batch);
        Some(out)
    }

    /// Redo the most recently undone batch, returning the new tree
    pub fn redo(&mut self, tree: &[Arc<CompositionNode>]) -> Option<Vec<Arc<CompositionNode>>> {
        let batch = self.redo_stack.pop()?;
        let out = batch
            .changes
            .iter()
            .fold(tree.to_vec(), |tree, change| change.apply(&tree));
        self.undo_stack.push(batch);
        Some(out)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_batch = None;
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}
