//! Chapter-focus selection state machine
//!
//! The selector owns the chapter catalog and the user's selection set. The
//! catalog fetch and the preference fetch are independent: a failed catalog
//! fetch still lands in `Ready` (with an empty catalog), and a missing or
//! failed preference fetch just leaves the selection empty. Toggles apply
//! locally first; save only persists and never mutates local state.

use tracing::warn;

use crate::api::{ApiError, Chapter, PreferenceRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogState {
    Loading,
    Ready,
}

/// What to do after a save was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveRequest {
    /// No user identity configured; prompt the user, perform no network call.
    NeedsLogin,
    /// Persist this snapshot of the selection.
    Start { selected: Vec<i64> },
}

/// Result of a completed save, for the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(Vec<i64>),
    Failed(String),
}

type SavedCallback = Box<dyn FnMut(&[i64]) + Send>;

pub struct ChapterSelector {
    catalog: Vec<Chapter>,
    selected: Vec<i64>,
    state: CatalogState,
    saving: bool,
    user_id: Option<String>,
    on_saved: Option<SavedCallback>,
}

impl ChapterSelector {
    pub fn new(user_id: Option<String>) -> Self {
        Self {
            catalog: Vec::new(),
            selected: Vec::new(),
            state: CatalogState::Loading,
            saving: false,
            user_id,
            on_saved: None,
        }
    }

    /// Register a callback invoked with the finalized selection after every
    /// successful save.
    pub fn with_on_saved(mut self, callback: impl FnMut(&[i64]) + Send + 'static) -> Self {
        self.on_saved = Some(Box::new(callback));
        self
    }

    pub fn state(&self) -> CatalogState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == CatalogState::Loading
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn catalog(&self) -> &[Chapter] {
        &self.catalog
    }

    /// Selection in first-toggle order, for render stability.
    pub fn selected(&self) -> &[i64] {
        &self.selected
    }

    pub fn is_selected(&self, chapter_id: i64) -> bool {
        self.selected.contains(&chapter_id)
    }

    /// Feed in the catalog fetch outcome. Failure degrades to `Ready` with an
    /// empty catalog; the selector never sticks in `Loading`.
    pub fn catalog_loaded(&mut self, result: Result<Vec<Chapter>, ApiError>) {
        match result {
            Ok(chapters) => self.catalog = chapters,
            Err(error) => {
                warn!(%error, "failed to fetch chapter catalog");
                self.catalog.clear();
            }
        }
        self.state = CatalogState::Ready;
    }

    /// Feed in the preference fetch outcome. `None` (no record, fetch
    /// skipped, or fetch failed) leaves the selection empty.
    pub fn preferences_loaded(&mut self, record: Option<PreferenceRecord>) {
        let Some(record) = record else {
            return;
        };
        match record.selected_ids() {
            Ok(ids) => self.selected = ids,
            Err(error) => {
                warn!(%error, "failed to decode saved preferences");
            }
        }
    }

    /// Flip membership of one chapter id. Toggling the same id twice is a
    /// no-op on the set.
    pub fn toggle(&mut self, chapter_id: i64) {
        if let Some(position) = self.selected.iter().position(|id| *id == chapter_id) {
            self.selected.remove(position);
        } else {
            self.selected.push(chapter_id);
        }
    }

    /// Ask to persist the current selection.
    ///
    /// Without a configured user identity this is rejected before any network
    /// call. Otherwise the saving flag goes up and the caller receives the
    /// snapshot to send.
    pub fn begin_save(&mut self) -> SaveRequest {
        if self.user_id.is_none() {
            return SaveRequest::NeedsLogin;
        }
        self.saving = true;
        SaveRequest::Start {
            selected: self.selected.clone(),
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Feed in the save outcome. The local selection is left untouched either
    /// way: it was already applied before the save, so failure needs no
    /// rollback.
    pub fn save_finished(&mut self, result: Result<(), ApiError>) -> SaveOutcome {
        self.saving = false;
        match result {
            Ok(()) => {
                if let Some(callback) = self.on_saved.as_mut() {
                    callback(&self.selected);
                }
                SaveOutcome::Saved(self.selected.clone())
            }
            Err(error) => {
                warn!(%error, "failed to save preferences");
                SaveOutcome::Failed(error.to_string())
            }
        }
    }
}
