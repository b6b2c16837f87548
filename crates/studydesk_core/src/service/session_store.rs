//! Study session store.
//!
//! # Responsibility
//! - Own the append-only log of completed study intervals.
//! - Rewrite the whole `@study_sessions` collection after every append.
//! - Answer aggregate queries over the in-memory log.
//!
//! # Invariants
//! - Sessions are never updated or removed.
//! - Persistence failures never roll back in-memory state.
//! - After a load that could not read the backing, the stored log is re-read
//!   and kept ahead of new sessions before anything is written.

use crate::kv::{KeyValueBacking, STUDY_SESSIONS_KEY};
use crate::model::session::StudySession;
use crate::repo::collection::JsonCollection;
use crate::service::analytics::{self, CourseShare};
use crate::service::report::{LoadOutcome, MutationReport, PersistOutcome, StoreError};
use crate::service::study_timer::TimerStop;
use chrono::Utc;
use log::{error, info, warn};
use std::sync::{Mutex, MutexGuard};

const SESSIONS: JsonCollection<StudySession> = JsonCollection::new(STUDY_SESSIONS_KEY);

#[derive(Debug, Default)]
struct SessionState {
    sessions: Vec<StudySession>,
    dirty: bool,
    /// Last load failed on I/O; memory holds only sessions appended since.
    unread: bool,
}

/// Persistence-backed study session log.
pub struct SessionStore<B: KeyValueBacking> {
    backing: B,
    state: Mutex<SessionState>,
}

impl<B: KeyValueBacking> SessionStore<B> {
    pub fn new(backing: B) -> Self {
        Self {
            backing,
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn open(backing: B) -> (Self, LoadOutcome) {
        let store = Self::new(backing);
        let outcome = store.load();
        (store, outcome)
    }

    /// Replaces in-memory state with the persisted log; never fails.
    pub fn load(&self) -> LoadOutcome {
        let mut state = self.lock();
        state.unread = false;
        let outcome = match SESSIONS.load(&self.backing) {
            Ok(Some(sessions)) => {
                let count = sessions.len();
                state.sessions = sessions;
                LoadOutcome::Loaded { count }
            }
            Ok(None) => {
                state.sessions.clear();
                LoadOutcome::Missing
            }
            Err(err) => {
                let err = StoreError::from(err);
                error!("event=session_load module=store status=error error={err}");
                state.sessions.clear();
                state.unread = matches!(err, StoreError::Persistence(_));
                LoadOutcome::Recovered(err)
            }
        };
        state.dirty = false;
        info!(
            "event=session_load module=store status=done count={}",
            outcome.count()
        );
        outcome
    }

    /// Records a session ending now.
    ///
    /// # Errors
    /// - `StoreError::InvalidSession` when `duration_secs < 0`.
    pub fn append(
        &self,
        duration_secs: i64,
        course: Option<&str>,
    ) -> Result<MutationReport<StudySession>, StoreError> {
        let session = StudySession::new(Utc::now(), duration_secs, course)?;

        let mut state = self.lock();
        state.sessions.push(session.clone());
        let persist = self.persist(&mut state);
        info!(
            "event=session_append module=store status=ok duration_s={} count={}",
            session.duration,
            state.sessions.len()
        );
        Ok(MutationReport::new(session, persist))
    }

    /// Records the interval produced by stopping a study timer.
    pub fn record_stop(
        &self,
        stop: TimerStop,
    ) -> Result<MutationReport<StudySession>, StoreError> {
        let duration = i64::try_from(stop.duration_secs).unwrap_or(i64::MAX);
        self.append(duration, stop.course.as_deref())
    }

    /// Snapshot of all sessions in recording order.
    pub fn list(&self) -> Vec<StudySession> {
        self.lock().sessions.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().sessions.is_empty()
    }

    /// Total recorded study time in seconds.
    pub fn total_duration(&self) -> u64 {
        analytics::total_duration(&self.lock().sessions)
    }

    pub fn total_hours(&self) -> f64 {
        self.total_duration() as f64 / 3600.0
    }

    /// Mean session length in seconds; `0.0` when nothing is recorded.
    pub fn average_duration_per_session(&self) -> f64 {
        let state = self.lock();
        let count = state.sessions.len().max(1);
        analytics::total_duration(&state.sessions) as f64 / count as f64
    }

    /// Per-course breakdown restricted to `allowed_courses`.
    pub fn distribution_by_course<S: AsRef<str>>(
        &self,
        allowed_courses: &[S],
    ) -> Vec<CourseShare> {
        analytics::distribution_by_course(&self.lock().sessions, allowed_courses)
    }

    pub fn backing(&self) -> &B {
        &self.backing
    }

    pub fn is_dirty(&self) -> bool {
        self.lock().dirty
    }

    /// Rewrites the log if a previous write failed.
    pub fn flush(&self) -> PersistOutcome {
        let mut state = self.lock();
        if !state.dirty {
            return PersistOutcome::Unchanged;
        }
        self.persist(&mut state)
    }

    fn reconcile_unread(&self, state: &mut SessionState) -> Result<(), StoreError> {
        let mut stored = match SESSIONS.load(&self.backing).map_err(StoreError::from) {
            Ok(stored) => stored.unwrap_or_default(),
            Err(err @ StoreError::CorruptState { .. }) => {
                warn!("event=session_reconcile module=store status=discard error={err}");
                Vec::new()
            }
            Err(err) => return Err(err),
        };

        let pending = state.sessions.len();
        stored.append(&mut state.sessions);
        info!(
            "event=session_reconcile module=store status=ok count={} pending={pending}",
            stored.len()
        );
        state.sessions = stored;
        state.unread = false;
        Ok(())
    }

    fn persist(&self, state: &mut SessionState) -> PersistOutcome {
        if state.unread {
            if let Err(err) = self.reconcile_unread(state) {
                state.dirty = true;
                error!(
                    "event=session_persist module=store status=error reason=unread error={err}"
                );
                return PersistOutcome::Failed(err.to_string());
            }
        }

        match SESSIONS.save(&self.backing, &state.sessions) {
            Ok(()) => {
                state.dirty = false;
                PersistOutcome::Written
            }
            Err(err) => {
                state.dirty = true;
                error!(
                    "event=session_persist module=store status=error count={} error={err}",
                    state.sessions.len()
                );
                PersistOutcome::Failed(err.to_string())
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<B: KeyValueBacking> Drop for SessionStore<B> {
    fn drop(&mut self) {
        if self.is_dirty() {
            warn!("event=session_flush module=store status=start reason=drop_dirty");
            let _ = self.flush();
        }
    }
}
