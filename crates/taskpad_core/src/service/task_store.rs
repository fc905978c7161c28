//! Task store: the authoritative in-memory collection and its side effects.
//!
//! # Responsibility
//! - Own the task collection and expose CRUD and extras-merge operations.
//! - Keep reminders and the durable snapshot consistent with every mutation.
//!
//! # Invariants
//! - Every mutation updates memory first, then writes the full snapshot, and
//!   returns only after the write finished.
//! - A held reminder is cancelled before its task leaves the collection.
//! - Ids are never reused, even after deletion.
//! - Only validation and not-found errors abort an operation before any
//!   side effect; capability failures degrade without touching the task.

use crate::attachment::manager::{AttachmentError, AttachmentManager};
use crate::capability::{Capability, PortError};
use crate::clock::Clock;
use crate::filter::{available_categories, TaskFilter};
use crate::location::LocationPort;
use crate::model::extras::TaskExtras;
use crate::model::task::{Task, TaskDraft, TaskId, TaskValidationError};
use crate::notify::scheduler::{NotificationPort, NotificationScheduler, SchedulingOutcome};
use crate::storage::durable::{DurableError, DurableStore};
use crate::storage::snapshot::{load_tasks, persist_tasks};
use log::{debug, error, info, warn};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type StoreResult<T> = Result<T, StoreError>;

/// Task store operation failure.
#[derive(Debug)]
pub enum StoreError {
    /// Input rejected before any side effect.
    Validation(TaskValidationError),
    /// Target task does not exist.
    NotFound(TaskId),
    /// Snapshot write failed; memory keeps the mutation.
    Persistence(DurableError),
    /// The user or OS refused a capability; the task is unchanged.
    CapabilityDenied(Capability),
    /// A capability failed for another reason; the task is unchanged.
    CapabilityUnavailable {
        capability: Capability,
        reason: String,
    },
    /// Attachment copy failed; the task is unchanged.
    Attachment(AttachmentError),
    /// No id above the highest issued one is left.
    IdsExhausted,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::Persistence(err) => write!(f, "failed to persist tasks: {err}"),
            Self::CapabilityDenied(capability) => {
                write!(f, "{capability} permission denied")
            }
            Self::CapabilityUnavailable { capability, reason } => {
                write!(f, "{capability} capability unavailable: {reason}")
            }
            Self::Attachment(err) => write!(f, "{err}"),
            Self::IdsExhausted => write!(f, "no task ids left above the highest issued id"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Persistence(err) => Some(err),
            Self::Attachment(err) => Some(err),
            Self::NotFound(_)
            | Self::CapabilityDenied(_)
            | Self::CapabilityUnavailable { .. }
            | Self::IdsExhausted => None,
        }
    }
}

impl From<TaskValidationError> for StoreError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DurableError> for StoreError {
    fn from(value: DurableError) -> Self {
        Self::Persistence(value)
    }
}

impl From<AttachmentError> for StoreError {
    fn from(value: AttachmentError) -> Self {
        Self::Attachment(value)
    }
}

/// Task plus the outcome of the reminder attempt made for it.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskWithReminder {
    pub task: Task,
    pub reminder: SchedulingOutcome,
}

/// Collaborators injected into a [`TaskStore`].
pub struct TaskStorePorts {
    pub durable: Box<dyn DurableStore>,
    pub notifications: Box<dyn NotificationPort>,
    pub location: Box<dyn LocationPort>,
    pub attachments: AttachmentManager,
    pub clock: Arc<dyn Clock>,
}

/// Authoritative task collection with reminder and snapshot synchronization.
pub struct TaskStore {
    durable: Box<dyn DurableStore>,
    scheduler: NotificationScheduler,
    location: Box<dyn LocationPort>,
    attachments: AttachmentManager,
    clock: Arc<dyn Clock>,
    tasks: Vec<Task>,
    last_issued_id: TaskId,
}

impl TaskStore {
    /// Creates an empty store; call [`TaskStore::load`] to hydrate it.
    pub fn new(ports: TaskStorePorts) -> Self {
        Self {
            durable: ports.durable,
            scheduler: NotificationScheduler::new(ports.notifications, Arc::clone(&ports.clock)),
            location: ports.location,
            attachments: ports.attachments,
            clock: ports.clock,
            tasks: Vec::new(),
            last_issued_id: 0,
        }
    }

    /// Creates a store and hydrates it from the durable snapshot.
    pub fn open(ports: TaskStorePorts) -> Self {
        let mut store = Self::new(ports);
        store.load();
        store
    }

    /// Replaces the in-memory collection with the durable snapshot.
    ///
    /// Never fails: absent or malformed snapshots hydrate as empty.
    pub fn load(&mut self) -> &[Task] {
        self.tasks = load_tasks(self.durable.as_ref());
        let highest_loaded = self.tasks.iter().map(|task| task.id).max().unwrap_or(0);
        self.last_issued_id = self.last_issued_id.max(highest_loaded);
        info!(
            "event=store_load module=store status=ok count={}",
            self.tasks.len()
        );
        &self.tasks
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Creates a task, attempting a reminder when the deadline is in the future.
    ///
    /// Reminder failures never fail the call; the outcome is returned
    /// alongside the task.
    pub fn add(&mut self, draft: TaskDraft) -> StoreResult<TaskWithReminder> {
        if let Err(err) = draft.validate() {
            debug!("event=task_add module=store status=rejected reason={err}");
            return Err(err.into());
        }

        let id = self.next_id()?;
        let reminder = self.scheduler.schedule(&draft.title, draft.deadline);
        let mut task = Task::from_draft(id, draft);
        task.notification_id = reminder.handle().cloned();
        self.tasks.push(task.clone());

        self.persist("task_add")?;
        info!(
            "event=task_add module=store status=ok task_id={id} reminder={}",
            reminder.label()
        );
        Ok(TaskWithReminder { task, reminder })
    }

    /// Deletes a task; unknown ids are a no-op.
    ///
    /// A held reminder is cancelled first. Cancellation failures are logged
    /// and never block removal.
    pub fn delete(&mut self, id: TaskId) -> StoreResult<()> {
        let Some(index) = self.position(id) else {
            debug!("event=task_delete module=store status=skipped reason=not_found task_id={id}");
            return Ok(());
        };

        if let Some(handle) = self.tasks[index].notification_id.take() {
            let outcome = self.scheduler.cancel(&handle);
            debug!(
                "event=task_delete module=store status=progress task_id={id} reminder={}",
                outcome.label()
            );
        }

        self.tasks.remove(index);
        self.persist("task_delete")?;
        info!("event=task_delete module=store status=ok task_id={id}");
        Ok(())
    }

    /// Flips `is_checked` and persists.
    pub fn toggle_complete(&mut self, id: TaskId) -> StoreResult<Task> {
        let index = self.require(id)?;
        let task = &mut self.tasks[index];
        task.is_checked = !task.is_checked;
        let updated = task.clone();

        self.persist("task_toggle")?;
        info!(
            "event=task_toggle module=store status=ok task_id={id} checked={}",
            updated.is_checked
        );
        Ok(updated)
    }

    /// Shallow-merges extras into a task, preserving unmentioned fields.
    ///
    /// All patches are validated before the task changes; a rejected patch
    /// leaves the task and the snapshot untouched.
    pub fn merge_extras(&mut self, id: TaskId, extras: &[TaskExtras]) -> StoreResult<Task> {
        let index = self.require(id)?;
        let mut merged = self.tasks[index].clone();
        for patch in extras {
            if let Err(err) = patch.apply_to(&mut merged) {
                debug!(
                    "event=task_merge module=store status=rejected task_id={id} kind={} reason={err}",
                    patch.kind()
                );
                return Err(err.into());
            }
        }

        self.tasks[index] = merged.clone();
        self.persist("task_merge")?;
        info!(
            "event=task_merge module=store status=ok task_id={id} patches={}",
            extras.len()
        );
        Ok(merged)
    }

    /// Moves a deadline, replacing the reminder.
    ///
    /// Any held reminder is cancelled first; a new one is attempted when the
    /// new deadline is in the future.
    pub fn reschedule(&mut self, id: TaskId, deadline: i64) -> StoreResult<TaskWithReminder> {
        let index = self.require(id)?;

        if let Some(handle) = self.tasks[index].notification_id.take() {
            let outcome = self.scheduler.cancel(&handle);
            debug!(
                "event=task_reschedule module=store status=progress task_id={id} previous_reminder={}",
                outcome.label()
            );
        }

        let task = &mut self.tasks[index];
        task.deadline = deadline;
        let reminder = self.scheduler.schedule(&task.title, deadline);
        task.notification_id = reminder.handle().cloned();
        let updated = task.clone();

        self.persist("task_reschedule")?;
        info!(
            "event=task_reschedule module=store status=ok task_id={id} reminder={}",
            reminder.label()
        );
        Ok(TaskWithReminder {
            task: updated,
            reminder,
        })
    }

    /// Attaches the current location reported by the location port.
    pub fn attach_location(&mut self, id: TaskId) -> StoreResult<Task> {
        self.require(id)?;
        let location = self
            .location
            .current_location()
            .map_err(|err| capability_failure(Capability::Location, id, err))?;
        self.merge_extras(id, &[TaskExtras::Location(location)])
    }

    /// Attaches a recorded voice clip reference.
    pub fn attach_audio_note(&mut self, id: TaskId, clip_uri: &str) -> StoreResult<Task> {
        self.merge_extras(id, &[TaskExtras::AudioNote(clip_uri.to_string())])
    }

    /// Picks a document, copies it into the task directory and attaches it.
    ///
    /// Returns `Ok(None)` when the user dismissed the picker.
    pub fn attach_file(&mut self, id: TaskId) -> StoreResult<Option<Task>> {
        self.require(id)?;
        let picked = match self.attachments.pick_source() {
            Ok(Some(descriptor)) => descriptor,
            Ok(None) | Err(PortError::Cancelled) => {
                debug!("event=task_attach_file module=store status=skipped reason=picker_dismissed task_id={id}");
                return Ok(None);
            }
            Err(err) => return Err(capability_failure(Capability::Files, id, err)),
        };

        let stored_path = self.attachments.persist_to_task(id, &picked.uri)?;
        let task = self.merge_extras(
            id,
            &[TaskExtras::AttachedFile(stored_path.display().to_string())],
        )?;
        Ok(Some(task))
    }

    /// Filtered view over the current collection.
    pub fn filtered_view(&self, query: &str, category: &str) -> TaskFilter<'_> {
        TaskFilter::new(&self.tasks, query, category)
    }

    /// Category choices for the current collection, including "All".
    pub fn available_categories(&self) -> BTreeSet<String> {
        available_categories(&self.tasks)
    }

    /// Re-writes the current collection to the durable store.
    pub fn flush(&self) -> StoreResult<()> {
        self.persist("store_flush")
    }

    fn persist(&self, event: &str) -> StoreResult<()> {
        persist_tasks(self.durable.as_ref(), &self.tasks).map_err(|err| {
            error!(
                "event={event} module=store status=error error_code=persist_failed count={} error={err}",
                self.tasks.len()
            );
            StoreError::Persistence(err)
        })
    }

    fn next_id(&mut self) -> StoreResult<TaskId> {
        let Some(floor) = self.last_issued_id.checked_add(1) else {
            error!(
                "event=task_add module=store status=error error_code=ids_exhausted last_id={}",
                self.last_issued_id
            );
            return Err(StoreError::IdsExhausted);
        };
        let id = self.clock.now_ms().max(floor);
        self.last_issued_id = id;
        Ok(id)
    }

    fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    fn require(&self, id: TaskId) -> StoreResult<usize> {
        self.position(id).ok_or(StoreError::NotFound(id))
    }
}

fn capability_failure(capability: Capability, id: TaskId, err: PortError) -> StoreError {
    warn!(
        "event=capability_request module=store status=error capability={capability} task_id={id} error={err}"
    );
    match err {
        PortError::Denied => StoreError::CapabilityDenied(capability),
        other => StoreError::CapabilityUnavailable {
            capability,
            reason: other.to_string(),
        },
    }
}
