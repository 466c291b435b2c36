//! # Composition Editor
//!
//! Schema-driven property editing engine for compositions.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ schema: SchemaNode → validate / defaults    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: local edit state + dispatch         │
//! │  - Mount one LocalFieldState per field      │
//! │  - Choose a widget per schema kind          │
//! │  - Reduce editor events, emit save requests │
//! │  - Apply saves to the composition tree      │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ renderer: (component, resolved props)       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Saved props are the source of truth**: local state is a buffer
//!    over them and is rebuilt when they change
//! 2. **Validation follows the value**: it is recomputed from the unsaved
//!    value on every change, never set on its own
//! 3. **Structural sharing**: tree updates replace only the touched nodes
//! 4. **Optimistic saves**: a pending save never blocks further edits
//! 5. **No faults past a field**: bad values and unknown kinds render as
//!    invalid or unsupported fields
//!
//! ## Usage
//!
//! ```rust,ignore
//! use compedit_editor::{hydrate, EditSession, EditorEvent, TreeLevel};
//!
//! let tree = hydrate(&project.compositions, &registry)?;
//! let mut session = EditSession::new("local", tree);
//! session.select("intro")?;
//! session.render()?;
//!
//! session.handle(TreeLevel::Foreground, EditorEvent::Edit {
//!     path: "speed".parse()?,
//!     raw: "9".into(),
//! })?;
//! session.handle(TreeLevel::Foreground, EditorEvent::Save { path: EditPath::root() })?;
//! session.confirm_all();
//! ```

mod composition;
mod dispatch;
mod editors;
mod errors;
mod hydrate;
mod pipeline;
mod reducer;
mod session;
mod state;
mod store;
mod undo_stack;
mod view;

pub use composition::{
    find_composition, modify_props_in_tree, remove_prop_in_tree, Composition, CompositionNode, LeafComposition,
    TreeLevel, TreeLocator,
};
pub use errors::{EditorError, HydrateError};
pub use hydrate::{audit, dehydrate, hydrate, BackgroundRecord, CompositionRecord, ProjectFile};
pub use pipeline::{Pipeline, PipelineResult, RenderInput};
pub use reducer::{EditorEvent, EventOutcome, SaveRequest};
pub use session::{EditSession, Notification, PendingSave, SessionView};
pub use state::{FieldStatus, LocalFieldState, Validation};
pub use store::EditorStore;
pub use undo_stack::{ChangeBatch, PropChange, UndoStack};
pub use view::{FieldGroup, FieldView, RootNotice, RootView, Sentinel, Widget};
