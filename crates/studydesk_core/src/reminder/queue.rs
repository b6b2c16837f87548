//! In-process dispatchers.

use super::{ReminderDispatcher, ReminderError, ReminderRequest, ReminderTicket};
use log::{debug, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Dispatcher that accepts every request and schedules nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReminderDispatcher;

impl ReminderDispatcher for NoopReminderDispatcher {
    fn schedule(&self, request: &ReminderRequest) -> Result<ReminderTicket, ReminderError> {
        Ok(ReminderTicket {
            task_id: request.task_id.clone(),
            fire_at: request.fire_at,
        })
    }
}

/// Permission-gated queue drained by the native shell.
///
/// The shell mirrors the OS notification permission via `set_permission`
/// and periodically hands `drain()` output to the platform scheduler.
#[derive(Debug, Default)]
pub struct QueuedReminderDispatcher {
    permission_granted: AtomicBool,
    pending: Mutex<Vec<ReminderRequest>>,
}

impl QueuedReminderDispatcher {
    pub fn new(permission_granted: bool) -> Self {
        Self {
            permission_granted: AtomicBool::new(permission_granted),
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn set_permission(&self, granted: bool) {
        self.permission_granted.store(granted, Ordering::SeqCst);
    }

    pub fn permission_granted(&self) -> bool {
        self.permission_granted.load(Ordering::SeqCst)
    }

    /// Takes all queued requests in scheduling order.
    pub fn drain(&self) -> Vec<ReminderRequest> {
        let mut pending = self
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        std::mem::take(&mut *pending)
    }

    pub fn pending_len(&self) -> usize {
        self.pending
            .lock()
            .map_or_else(|poisoned| poisoned.into_inner().len(), |pending| pending.len())
    }
}

impl ReminderDispatcher for QueuedReminderDispatcher {
    fn schedule(&self, request: &ReminderRequest) -> Result<ReminderTicket, ReminderError> {
        if !self.permission_granted() {
            warn!("event=reminder_schedule module=reminder status=skipped reason=permission_denied");
            return Err(ReminderError::PermissionDenied);
        }

        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request.clone());
        debug!(
            "event=reminder_schedule module=reminder status=queued fire_at={}",
            request.fire_at
        );
        Ok(ReminderTicket {
            task_id: request.task_id.clone(),
            fire_at: request.fire_at,
        })
    }
}
