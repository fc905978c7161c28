//! Core domain logic for Taskpad.
//! This crate is the single source of truth for task, reminder and
//! attachment invariants; hosts provide device capabilities through ports.

pub mod attachment;
pub mod capability;
pub mod clock;
pub mod config;
pub mod db;
pub mod filter;
pub mod location;
pub mod logging;
pub mod model;
pub mod notify;
pub mod service;
pub mod storage;

pub use attachment::manager::{
    AttachmentError, AttachmentManager, FileDescriptor, FilePickerPort, FileSystemPort,
    LocalFileSystem,
};
pub use capability::{Capability, PortError, PortResult};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CoreConfig;
pub use filter::{available_categories, filter, TaskFilter, ALL_CATEGORIES};
pub use location::LocationPort;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::extras::TaskExtras;
pub use model::task::{
    Location, NotificationHandle, Priority, Task, TaskDraft, TaskId, TaskValidationError,
};
pub use notify::scheduler::{
    CancellationOutcome, NotificationPort, NotificationRequest, NotificationScheduler,
    SchedulingOutcome,
};
pub use service::task_store::{
    StoreError, StoreResult, TaskStore, TaskStorePorts, TaskWithReminder,
};
pub use storage::durable::{
    DurableError, DurableResult, DurableStore, MemoryDurableStore, SqliteDurableStore,
};
pub use storage::snapshot::{load_tasks, persist_tasks, TASKS_KEY};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
