//! Task store.
//!
//! # Responsibility
//! - Own the authoritative task collection for the process lifetime.
//! - Rewrite the whole `@tasks` collection after every mutation.
//! - Dispatch exactly one reminder per successful `add`.
//!
//! # Invariants
//! - Task ids are unique within the store.
//! - `list()` preserves insertion order.
//! - Persistence failures never roll back in-memory state.
//! - A load that could not read the backing never lets a later write
//!   replace the stored collection without re-reading it first.
//! - Unknown ids turn `update_progress`/`mark_done`/`remove` into no-ops.

use crate::kv::{KeyValueBacking, TASKS_KEY};
use crate::model::task::{
    clamp_progress, NewTask, Task, TaskId, TaskValidationError, MAX_PROGRESS,
};
use crate::reminder::{ReminderDispatcher, ReminderRequest};
use crate::repo::collection::JsonCollection;
use crate::service::report::{
    LoadOutcome, MutationReport, PersistOutcome, ReminderOutcome, StoreError,
};
use log::{error, info, warn};
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

const TASKS: JsonCollection<Task> = JsonCollection::new(TASKS_KEY);

#[derive(Debug, Default)]
struct TaskState {
    tasks: Vec<Task>,
    /// Set when the last write failed and memory is ahead of storage.
    dirty: bool,
    /// Set when the last load failed on I/O; storage may hold tasks memory lacks.
    unread: bool,
}

/// Persistence-backed task collection.
pub struct TaskStore<B: KeyValueBacking, D: ReminderDispatcher> {
    backing: B,
    dispatcher: D,
    state: Mutex<TaskState>,
}

impl<B: KeyValueBacking, D: ReminderDispatcher> TaskStore<B, D> {
    /// Creates an empty store. Call `load` to read persisted tasks.
    pub fn new(backing: B, dispatcher: D) -> Self {
        Self {
            backing,
            dispatcher,
            state: Mutex::new(TaskState::default()),
        }
    }

    /// Creates a store and loads persisted tasks in one step.
    pub fn open(backing: B, dispatcher: D) -> (Self, LoadOutcome) {
        let store = Self::new(backing, dispatcher);
        let outcome = store.load();
        (store, outcome)
    }

    /// Replaces in-memory state with the persisted collection.
    ///
    /// Never fails: corrupt or unreadable data is reported and the store
    /// continues with an empty collection. After a read failure the next
    /// write re-reads storage and keeps the stored tasks ahead of new ones.
    pub fn load(&self) -> LoadOutcome {
        let mut state = self.lock();
        state.unread = false;
        let outcome = match self.read_stored() {
            Ok(Some(tasks)) => {
                let count = tasks.len();
                state.tasks = tasks;
                LoadOutcome::Loaded { count }
            }
            Ok(None) => {
                state.tasks.clear();
                LoadOutcome::Missing
            }
            Err(err) => {
                error!("event=task_load module=store status=error error={err}");
                state.tasks.clear();
                state.unread = matches!(err, StoreError::Persistence(_));
                LoadOutcome::Recovered(err)
            }
        };
        state.dirty = false;
        info!(
            "event=task_load module=store status=done count={}",
            outcome.count()
        );
        outcome
    }

    /// Validates and appends a task, persists, then dispatches its reminder.
    ///
    /// # Errors
    /// - `StoreError::InvalidTask` when the draft violates task invariants or
    ///   reuses an existing id. Nothing is mutated in that case.
    pub fn add(&self, draft: NewTask) -> Result<MutationReport<Task>, StoreError> {
        let (task, persist) = {
            let mut state = self.lock();
            let task = draft.into_task(|| fresh_id(&state.tasks))?;
            if state.tasks.iter().any(|existing| existing.id == task.id) {
                return Err(TaskValidationError::DuplicateId(task.id).into());
            }

            state.tasks.push(task.clone());
            let persist = self.persist(&mut state);
            info!(
                "event=task_add module=store status=ok task_id={} count={}",
                task.id,
                state.tasks.len()
            );
            (task, persist)
        };

        let reminder = self.dispatch_reminder(&task);
        Ok(MutationReport {
            value: task,
            persist,
            reminder: Some(reminder),
        })
    }

    /// Sets progress for `id`, clamping into `0..=100`.
    ///
    /// `value` is `true` when a task matched.
    pub fn update_progress(&self, id: &str, progress: i64) -> MutationReport<bool> {
        let clamped = clamp_progress(progress);
        let mut state = self.lock();
        let Some(task) = state.tasks.iter_mut().find(|task| task.id == id) else {
            info!("event=task_update_progress module=store status=noop task_id={id}");
            return MutationReport::new(false, PersistOutcome::Unchanged);
        };

        task.progress = clamped;
        let persist = self.persist(&mut state);
        info!(
            "event=task_update_progress module=store status=ok task_id={id} progress={clamped}"
        );
        MutationReport::new(true, persist)
    }

    /// Marks `id` complete. Its reminder stays scheduled.
    pub fn mark_done(&self, id: &str) -> MutationReport<bool> {
        self.update_progress(id, i64::from(MAX_PROGRESS))
    }

    /// Removes `id` if present. Its reminder stays scheduled.
    pub fn remove(&self, id: &str) -> MutationReport<bool> {
        let mut state = self.lock();
        let before = state.tasks.len();
        state.tasks.retain(|task| task.id != id);
        if state.tasks.len() == before {
            info!("event=task_remove module=store status=noop task_id={id}");
            return MutationReport::new(false, PersistOutcome::Unchanged);
        }

        let persist = self.persist(&mut state);
        info!(
            "event=task_remove module=store status=ok task_id={id} count={}",
            state.tasks.len()
        );
        MutationReport::new(true, persist)
    }

    /// Snapshot of all tasks in insertion order.
    pub fn list(&self) -> Vec<Task> {
        self.lock().tasks.clone()
    }

    pub fn get(&self, id: &str) -> Option<Task> {
        self.lock().tasks.iter().find(|task| task.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().tasks.is_empty()
    }

    /// Whether the last write failed and memory is ahead of storage.
    pub fn is_dirty(&self) -> bool {
        self.lock().dirty
    }

    /// Rewrites the collection if a previous write failed.
    pub fn flush(&self) -> PersistOutcome {
        let mut state = self.lock();
        if !state.dirty {
            return PersistOutcome::Unchanged;
        }
        self.persist(&mut state)
    }

    pub fn backing(&self) -> &B {
        &self.backing
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    fn read_stored(&self) -> Result<Option<Vec<Task>>, StoreError> {
        let tasks = TASKS.load(&self.backing)?;
        if let Some(tasks) = &tasks {
            ensure_unique_ids(tasks)?;
        }
        Ok(tasks)
    }

    /// Folds tasks stored before a failed load back under the in-memory ones.
    ///
    /// Corrupt stored data is dropped, as on a normal load.
    fn reconcile_unread(&self, state: &mut TaskState) -> Result<(), StoreError> {
        let stored = match self.read_stored() {
            Ok(stored) => stored.unwrap_or_default(),
            Err(err @ StoreError::CorruptState { .. }) => {
                warn!("event=task_reconcile module=store status=discard error={err}");
                Vec::new()
            }
            Err(err) => return Err(err),
        };

        let pending = std::mem::take(&mut state.tasks);
        let mut merged: Vec<Task> = stored
            .into_iter()
            .filter(|task| pending.iter().all(|new| new.id != task.id))
            .collect();
        let pending_count = pending.len();
        merged.extend(pending);
        info!(
            "event=task_reconcile module=store status=ok count={} pending={pending_count}",
            merged.len()
        );
        state.tasks = merged;
        state.unread = false;
        Ok(())
    }

    fn persist(&self, state: &mut TaskState) -> PersistOutcome {
        if state.unread {
            if let Err(err) = self.reconcile_unread(state) {
                state.dirty = true;
                error!(
                    "event=task_persist module=store status=error reason=unread error={err}"
                );
                return PersistOutcome::Failed(err.to_string());
            }
        }

        match TASKS.save(&self.backing, &state.tasks) {
            Ok(()) => {
                state.dirty = false;
                PersistOutcome::Written
            }
            Err(err) => {
                state.dirty = true;
                error!(
                    "event=task_persist module=store status=error count={} error={err}",
                    state.tasks.len()
                );
                PersistOutcome::Failed(err.to_string())
            }
        }
    }

    fn dispatch_reminder(&self, task: &Task) -> ReminderOutcome {
        let scheduled =
            ReminderRequest::for_task(task).and_then(|request| self.dispatcher.schedule(&request));
        match scheduled {
            Ok(ticket) => {
                info!(
                    "event=reminder_dispatch module=store status=ok task_id={} fire_at={}",
                    task.id, ticket.fire_at
                );
                ReminderOutcome::Scheduled(ticket)
            }
            Err(err) => {
                warn!(
                    "event=reminder_dispatch module=store status=skipped task_id={} error={err}",
                    task.id
                );
                ReminderOutcome::Skipped(err)
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, TaskState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<B: KeyValueBacking, D: ReminderDispatcher> Drop for TaskStore<B, D> {
    fn drop(&mut self) {
        if self.is_dirty() {
            warn!("event=task_flush module=store status=start reason=drop_dirty");
            let _ = self.flush();
        }
    }
}

fn fresh_id(existing: &[Task]) -> TaskId {
    loop {
        let candidate = Uuid::now_v7().to_string();
        if !existing.iter().any(|task| task.id == candidate) {
            return candidate;
        }
    }
}

fn ensure_unique_ids(tasks: &[Task]) -> Result<(), StoreError> {
    let mut seen = HashSet::with_capacity(tasks.len());
    for task in tasks {
        if !seen.insert(task.id.as_str()) {
            return Err(StoreError::CorruptState {
                key: TASKS_KEY,
                message: format!("duplicate task id `{}`", task.id),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ensure_unique_ids, fresh_id};
    use crate::model::task::NewTask;
    use crate::service::report::StoreError;

    #[test]
    fn fresh_ids_are_distinct_and_time_ordered() {
        let first = fresh_id(&[]);
        let second = fresh_id(&[]);
        assert_ne!(first, second);
        assert!(first < second);
    }

    #[test]
    fn duplicate_ids_are_reported_as_corrupt() {
        let task = NewTask::new("Essay", "English", "2025-06-01")
            .into_task(|| "same".to_string())
            .unwrap();
        let err = ensure_unique_ids(&[task.clone(), task]).unwrap_err();
        assert!(matches!(err, StoreError::CorruptState { key: "@tasks", .. }));
    }
}
