#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use taskpad_core::{
    AttachmentManager, FileDescriptor, FilePickerPort, Location, LocationPort, ManualClock,
    MemoryDurableStore, NotificationHandle, NotificationPort, NotificationRequest, PortError,
    PortResult, TaskStore, TaskStorePorts, TASKS_KEY,
};

pub const NOW_MS: i64 = 1_700_000_000_000;
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Default)]
pub struct NotificationLog {
    pub scheduled: Vec<NotificationRequest>,
    pub cancelled: Vec<NotificationHandle>,
    /// Raw snapshot held by the durable store at each cancel call.
    pub snapshot_at_cancel: Vec<Option<Vec<u8>>>,
    pub schedule_error: Option<PortError>,
    pub cancel_error: Option<PortError>,
    next_handle: u32,
}

/// Notification port fake; clones share one log.
#[derive(Clone, Default)]
pub struct RecordingNotifications {
    log: Arc<Mutex<NotificationLog>>,
    durable_probe: Option<MemoryDurableStore>,
}

impl RecordingNotifications {
    pub fn with_durable_probe(durable: MemoryDurableStore) -> Self {
        Self {
            log: Arc::default(),
            durable_probe: Some(durable),
        }
    }

    pub fn log(&self) -> MutexGuard<'_, NotificationLog> {
        self.log.lock().unwrap()
    }

    pub fn fail_schedule(&self, err: PortError) {
        self.log().schedule_error = Some(err);
    }

    pub fn fail_cancel(&self, err: PortError) {
        self.log().cancel_error = Some(err);
    }
}

impl NotificationPort for RecordingNotifications {
    fn schedule(&self, request: &NotificationRequest) -> PortResult<NotificationHandle> {
        let mut log = self.log();
        if let Some(err) = log.schedule_error.clone() {
            return Err(err);
        }
        log.scheduled.push(request.clone());
        log.next_handle += 1;
        Ok(NotificationHandle::new(format!(
            "reminder-{}",
            log.next_handle
        )))
    }

    fn cancel(&self, handle: &NotificationHandle) -> PortResult<()> {
        let snapshot = self
            .durable_probe
            .as_ref()
            .and_then(|durable| durable.get(TASKS_KEY));
        let mut log = self.log();
        log.snapshot_at_cancel.push(snapshot);
        log.cancelled.push(handle.clone());
        match log.cancel_error.clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Location port fake returning a configurable result.
#[derive(Clone)]
pub struct FakeLocation {
    result: Arc<Mutex<PortResult<Location>>>,
}

impl FakeLocation {
    pub fn returning(result: PortResult<Location>) -> Self {
        Self {
            result: Arc::new(Mutex::new(result)),
        }
    }

    pub fn set(&self, result: PortResult<Location>) {
        *self.result.lock().unwrap() = result;
    }
}

impl LocationPort for FakeLocation {
    fn current_location(&self) -> PortResult<Location> {
        self.result.lock().unwrap().clone()
    }
}

/// File picker fake returning a configurable result.
#[derive(Clone)]
pub struct FakePicker {
    result: Arc<Mutex<PortResult<Option<FileDescriptor>>>>,
}

impl FakePicker {
    pub fn returning(result: PortResult<Option<FileDescriptor>>) -> Self {
        Self {
            result: Arc::new(Mutex::new(result)),
        }
    }

    /// Makes the next picks return `path` as a `file://` URI.
    pub fn pick_path(&self, path: &Path) {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        *self.result.lock().unwrap() = Ok(Some(FileDescriptor {
            name,
            uri: format!("file://{}", path.display()),
            size: std::fs::metadata(path).ok().map(|meta| meta.len()),
        }));
    }

    pub fn set(&self, result: PortResult<Option<FileDescriptor>>) {
        *self.result.lock().unwrap() = result;
    }
}

impl FilePickerPort for FakePicker {
    fn pick(&self) -> PortResult<Option<FileDescriptor>> {
        self.result.lock().unwrap().clone()
    }
}

/// Task store wired to fakes, with handles kept for assertions.
pub struct Harness {
    pub store: TaskStore,
    pub durable: MemoryDurableStore,
    pub notifications: RecordingNotifications,
    pub location: FakeLocation,
    pub picker: FakePicker,
    pub clock: ManualClock,
    pub documents: tempfile::TempDir,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_durable(MemoryDurableStore::new())
    }

    pub fn with_durable(durable: MemoryDurableStore) -> Self {
        let notifications = RecordingNotifications::with_durable_probe(durable.clone());
        let location = FakeLocation::returning(Ok(Location::new(1.0, 2.0)));
        let picker = FakePicker::returning(Ok(None));
        let clock = ManualClock::new(NOW_MS);
        let documents = tempfile::tempdir().unwrap();
        let store = build_store(
            &durable,
            &notifications,
            &location,
            &picker,
            &clock,
            documents.path(),
        );
        Self {
            store,
            durable,
            notifications,
            location,
            picker,
            clock,
            documents,
        }
    }

    /// Builds a second store over the same durable state, as after a restart.
    pub fn reopen(&self) -> TaskStore {
        build_store(
            &self.durable,
            &self.notifications,
            &self.location,
            &self.picker,
            &self.clock,
            self.documents.path(),
        )
    }
}

fn build_store(
    durable: &MemoryDurableStore,
    notifications: &RecordingNotifications,
    location: &FakeLocation,
    picker: &FakePicker,
    clock: &ManualClock,
    documents: &Path,
) -> TaskStore {
    TaskStore::open(TaskStorePorts {
        durable: Box::new(durable.clone()),
        notifications: Box::new(notifications.clone()),
        location: Box::new(location.clone()),
        attachments: AttachmentManager::local(documents, Box::new(picker.clone())),
        clock: Arc::new(clock.clone()),
    })
}
