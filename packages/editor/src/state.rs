//! # Local Edit State
//!
//! Each mounted field keeps the last saved value it was handed, the raw
//! value the user is editing, and the validation of that raw value.
//! Validation is only ever recomputed from `unsaved`, so it can never
//! describe a different value.

use compedit_common::{CommonError, CommonResult, EditPath, PropValue};
use compedit_schema::{SchemaNode, ValidationError};
use serde::Serialize;

/// Outcome of validating a field's unsaved value.
#[derive(Debug, Clone, PartialEq)]
pub enum Validation {
    /// Parsed value, `None` when validly absent.
    Valid(Option<PropValue>),
    Invalid(ValidationError),
}

impl Validation {
    pub fn compute(schema: &SchemaNode, unsaved: Option<&PropValue>) -> Self {
        let coerced = unsaved.map(|raw| schema.coerce_input(raw));
        match schema.validate(coerced.as_ref()) {
            Ok(parsed) => Validation::Valid(parsed),
            Err(error) => Validation::Invalid(error),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid(_))
    }

    pub fn parsed(&self) -> Option<&Option<PropValue>> {
        match self {
            Validation::Valid(parsed) => Some(parsed),
            Validation::Invalid(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            Validation::Valid(_) => None,
            Validation::Invalid(error) => Some(error),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldStatus {
    Clean,
    DirtyValid,
    DirtyInvalid,
}

impl FieldStatus {
    pub fn is_dirty(self) -> bool {
        self != FieldStatus::Clean
    }
}

#[derive(Debug, Clone)]
pub struct LocalFieldState {
    saved: Option<PropValue>,
    /// `saved` after schema parsing, so a missing field with a default
    /// compares equal to that default.
    saved_resolved: Option<PropValue>,
    unsaved: Option<PropValue>,
    validation: Validation,
    revision_seen: u64,
    pub(crate) seen_in_pass: u64,
}

impl LocalFieldState {
    pub fn mount(
        schema: &SchemaNode,
        saved: Option<PropValue>,
        unsaved: Option<PropValue>,
        revision: u64,
    ) -> Self {
        let saved_resolved = resolve_saved(schema, saved.as_ref());
        let validation = Validation::compute(schema, unsaved.as_ref());
        Self {
            saved,
            saved_resolved,
            unsaved,
            validation,
            revision_seen: revision,
            seen_in_pass: 0,
        }
    }

    pub fn saved(&self) -> Option<&PropValue> {
        self.saved.as_ref()
    }

    /// The saved value with schema defaults applied, or the raw saved
    /// value when it does not validate.
    pub fn saved_resolved(&self) -> Option<&PropValue> {
        self.saved_resolved.as_ref()
    }

    pub fn unsaved(&self) -> Option<&PropValue> {
        self.unsaved.as_ref()
    }

    pub fn validation(&self) -> &Validation {
        &self.validation
    }

    pub fn revision_seen(&self) -> u64 {
        self.revision_seen
    }

    /// Clean when the unsaved value is valid and matches the saved one,
    /// either raw or after parsing. An invalid value is DirtyInvalid even
    /// when it is the untouched saved value.
    pub fn status(&self) -> FieldStatus {
        match &self.validation {
            Validation::Invalid(_) => FieldStatus::DirtyInvalid,
            Validation::Valid(_) if self.matches_saved() => FieldStatus::Clean,
            Validation::Valid(_) => FieldStatus::DirtyValid,
        }
    }

    /// The unsaved value still stands for the saved one, valid or not.
    fn matches_saved(&self) -> bool {
        self.unsaved == self.saved
            || matches!(&self.validation, Validation::Valid(parsed) if *parsed == self.saved_resolved)
    }

    /// The value this field contributes to its parent's aggregate: the
    /// raw value after lenient coercion, valid or not.
    pub fn propagated(&self, schema: &SchemaNode) -> Option<PropValue> {
        self.unsaved.as_ref().map(|raw| schema.coerce_input(raw))
    }

    pub fn set_unsaved(&mut self, schema: &SchemaNode, unsaved: Option<PropValue>) {
        self.validation = Validation::compute(schema, unsaved.as_ref());
        self.unsaved = unsaved;
    }

    /// Write a value into this field's aggregate at a path relative to the
    /// field. Returns false when the aggregate did not change.
    pub fn set_unsaved_at(
        &mut self,
        schema: &SchemaNode,
        relative: &EditPath,
        value: Option<PropValue>,
    ) -> CommonResult<bool> {
        // A defaulted field holds no raw value; edits below it start from
        // the parsed default.
        let base = self
            .unsaved
            .as_ref()
            .or_else(|| self.validation.parsed().and_then(|parsed| parsed.as_ref()));
        let Some(current) = base else {
            return Err(CommonError::NotAContainer {
                path: relative.to_string(),
                found: "nothing",
            });
        };
        if self.unsaved.is_some() && current.get_path(relative) == value.as_ref() {
            return Ok(false);
        }
        let updated = current.with_path(relative, value)?;
        self.set_unsaved(schema, Some(updated));
        Ok(true)
    }

    /// Discard the unsaved value in favour of the saved one.
    pub fn reset(&mut self, schema: &SchemaNode) {
        self.set_unsaved(schema, self.saved.clone());
    }

    /// Bring this state in line with the latest saved value and revision.
    ///
    /// A new revision discards unsaved work. Otherwise a changed saved
    /// value is followed only if the field had not diverged from the
    /// previous one. Returns true when `unsaved` changed.
    pub fn reconcile(&mut self, schema: &SchemaNode, saved: Option<&PropValue>, revision: u64) -> bool {
        if revision != self.revision_seen {
            self.revision_seen = revision;
            self.replace_saved(schema, saved.cloned());
            let changed = self.unsaved.as_ref() != saved;
            self.set_unsaved(schema, saved.cloned());
            return changed;
        }

        if self.saved.as_ref() == saved {
            return false;
        }

        let following = self.matches_saved();
        self.replace_saved(schema, saved.cloned());
        if following {
            self.set_unsaved(schema, saved.cloned());
        }
        following
    }

    fn replace_saved(&mut self, schema: &SchemaNode, saved: Option<PropValue>) {
        self.saved_resolved = resolve_saved(schema, saved.as_ref());
        self.saved = saved;
    }
}

fn resolve_saved(schema: &SchemaNode, saved: Option<&PropValue>) -> Option<PropValue> {
    schema.validate(saved).unwrap_or_else(|_| saved.cloned())
}
