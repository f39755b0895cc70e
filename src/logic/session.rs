//! Editor sessions: the screen-side state machine every entity view runs.
//!
//! A session holds the rows as last loaded from the store and an optional
//! selection. With nothing selected the screen is in Add mode; selecting a
//! row populates the form and flips the primary action to Update. Updates
//! are refused when the form's key no longer matches the selected row, and
//! deletes require a selection. The session never talks to the store
//! itself: `submit` and `delete` resolve to intents the embedder routes
//! to the matching store call, then feeds the reloaded rows back in.

use crate::logic::edit::{ensure_key_unchanged, EditError};

/// Per-entity glue between a screen's raw text fields and its record type.
pub trait Editable: Sized + Clone {
    /// The screen's raw input fields.
    type Form;
    /// Comparable key value; a tuple for composite keys.
    type Key: PartialEq;

    /// Entity noun for selection messages ("customer").
    const ENTITY: &'static str;
    /// Key description for key-change messages ("customer account number").
    const KEY_DESC: &'static str;

    fn key(&self) -> Self::Key;
    /// Parses and validates the raw fields; numeric and date fields fail
    /// here, before any storage call.
    fn parse(form: &Self::Form) -> Result<Self, EditError>;
    /// Field values for populating the form from a selected row.
    fn to_form(&self) -> Self::Form;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    Add,
    Update,
}

/// What a submit resolved to. The embedder calls `save` for `Add` and
/// `update` for `Update`, then reloads the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Submit<R> {
    Add(R),
    Update(R),
}

#[derive(Debug)]
pub struct EditorSession<R> {
    rows: Vec<R>,
    selected: Option<usize>,
}

impl<R: Editable> EditorSession<R> {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            selected: None,
        }
    }

    /// Replaces the backing rows after a (re)load and drops any selection,
    /// returning the screen to Add mode.
    pub fn reload(&mut self, rows: Vec<R>) {
        self.rows = rows;
        self.selected = None;
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn mode(&self) -> EditMode {
        if self.selected.is_some() {
            EditMode::Update
        } else {
            EditMode::Add
        }
    }

    /// Selects a row and returns its form values for populating the
    /// inputs. An out-of-range index clears the selection instead.
    pub fn select(&mut self, index: usize) -> Option<R::Form> {
        if index < self.rows.len() {
            self.selected = Some(index);
            Some(self.rows[index].to_form())
        } else {
            self.selected = None;
            None
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&R> {
        self.selected.map(|i| &self.rows[i])
    }

    /// Resolves a submit from the current form: Add when nothing is
    /// selected, Update otherwise. An update whose form key differs from
    /// the selected row's key is rejected here and never reaches the
    /// store.
    pub fn submit(&self, form: &R::Form) -> Result<Submit<R>, EditError> {
        let record = R::parse(form)?;
        match self.selected() {
            None => Ok(Submit::Add(record)),
            Some(loaded) => {
                ensure_key_unchanged(loaded.key(), record.key(), R::KEY_DESC)?;
                Ok(Submit::Update(record))
            }
        }
    }

    /// The record to delete, or a selection error when nothing is
    /// selected.
    pub fn delete(&self) -> Result<&R, EditError> {
        self.selected().ok_or(EditError::NoSelection(R::ENTITY))
    }
}

impl<R: Editable> Default for EditorSession<R> {
    fn default() -> Self {
        Self::new()
    }
}
