//! Debounced autosave.
//!
//! A pure state machine driven by the host's clock: the host calls
//! [`AutoSaver::poll`] with the editor's current revision and a timestamp
//! in milliseconds, and performs the save whenever `poll` says so. A burst
//! of changes inside the delay window collapses into a single save.

use serde::Serialize;

/// Indicator shown next to the document title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveStatus {
    #[default]
    Idle,
    /// A change is pending; the delay has not elapsed yet.
    Waiting,
    Saving,
    Saved,
}

impl SaveStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SaveStatus::Idle => "idle",
            SaveStatus::Waiting => "waiting",
            SaveStatus::Saving => "saving",
            SaveStatus::Saved => "saved",
        }
    }
}

#[derive(Debug)]
pub struct AutoSaver {
    delay_ms: u64,
    indicator_ms: u64,
    status: SaveStatus,
    /// Last revision seen by `poll`.
    seen: Option<u64>,
    /// When the pending change was first noticed.
    changed_at: Option<u64>,
    saved_at: Option<u64>,
}

impl AutoSaver {
    pub fn new(delay_ms: u64, indicator_ms: u64) -> Self {
        Self {
            delay_ms,
            indicator_ms,
            status: SaveStatus::Idle,
            seen: None,
            changed_at: None,
            saved_at: None,
        }
    }

    /// Forget any pending change; `revision` is treated as already stored.
    pub fn reset(&mut self, revision: u64) {
        self.status = SaveStatus::Idle;
        self.seen = Some(revision);
        self.changed_at = None;
    }

    pub fn status(&self) -> SaveStatus {
        self.status
    }

    /// Timestamp of the last successful save.
    pub fn saved_at(&self) -> Option<u64> {
        self.saved_at
    }

    pub fn is_pending(&self) -> bool {
        self.changed_at.is_some()
    }

    /// Observe `revision` at `now`. Returns `true` when a save should be
    /// issued now; the caller must then report back through
    /// [`AutoSaver::finish`].
    pub fn poll(&mut self, revision: u64, now: u64) -> bool {
        if self.seen != Some(revision) {
            self.seen = Some(revision);
            self.changed_at = Some(now);
            self.status = SaveStatus::Waiting;
        }

        if let Some(changed_at) = self.changed_at
            && now.saturating_sub(changed_at) >= self.delay_ms
        {
            self.changed_at = None;
            self.status = SaveStatus::Saving;
            return true;
        }

        if self.status == SaveStatus::Saved
            && self
                .saved_at
                .is_some_and(|at| now.saturating_sub(at) >= self.indicator_ms)
        {
            self.status = SaveStatus::Idle;
        }
        false
    }

    /// Report the outcome of a save issued by `poll`. A failure keeps the
    /// change pending so the next delay window retries it; a skipped
    /// (stale) save is not reported as saved.
    pub fn finish<E: std::fmt::Display>(&mut self, result: Result<bool, E>, now: u64) {
        match result {
            Ok(true) => {
                self.saved_at = Some(now);
                // A change that arrived mid-save keeps its own pending state.
                if self.changed_at.is_none() {
                    self.status = SaveStatus::Saved;
                }
            }
            Ok(false) => {
                log::warn!("autosave skipped: the store holds a newer revision");
                if self.changed_at.is_none() {
                    self.status = SaveStatus::Idle;
                }
            }
            Err(e) => {
                log::warn!("autosave failed: {e}");
                self.changed_at = Some(now);
                self.status = SaveStatus::Waiting;
            }
        }
    }
}
