//! Notification port and reminder scheduler.

use crate::capability::{Capability, PortError, PortResult};
use crate::clock::Clock;
use crate::model::task::NotificationHandle;
use log::{debug, info, warn};
use std::sync::Arc;

/// Fixed title of every reminder.
pub const REMINDER_TITLE: &str = "Task reminder";

/// One-shot notification request handed to the host service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    pub title: String,
    pub body: String,
    pub sound: bool,
    /// Absolute trigger time in epoch milliseconds.
    pub trigger_at_ms: i64,
}

/// Host notification service.
pub trait NotificationPort {
    fn schedule(&self, request: &NotificationRequest) -> PortResult<NotificationHandle>;
    /// Cancels a pending reminder; `PortError::UnknownHandle` means it already
    /// fired or was cancelled.
    fn cancel(&self, handle: &NotificationHandle) -> PortResult<()>;
}

/// Result of a scheduling attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulingOutcome {
    Scheduled(NotificationHandle),
    SkippedPastDeadline,
    Failed(String),
}

impl SchedulingOutcome {
    pub fn handle(&self) -> Option<&NotificationHandle> {
        match self {
            Self::Scheduled(handle) => Some(handle),
            Self::SkippedPastDeadline | Self::Failed(_) => None,
        }
    }

    pub fn into_handle(self) -> Option<NotificationHandle> {
        match self {
            Self::Scheduled(handle) => Some(handle),
            Self::SkippedPastDeadline | Self::Failed(_) => None,
        }
    }

    /// Stable label used in log events.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Scheduled(_) => "scheduled",
            Self::SkippedPastDeadline => "skipped_past_deadline",
            Self::Failed(_) => "failed",
        }
    }
}

/// Result of a best-effort cancellation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancellationOutcome {
    Cancelled,
    /// The handle was unknown to the service (fired or cancelled earlier).
    AlreadyGone,
    Failed(String),
}

impl CancellationOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cancelled => "cancelled",
            Self::AlreadyGone => "already_gone",
            Self::Failed(_) => "failed",
        }
    }
}

/// Schedules and cancels deadline reminders through a [`NotificationPort`].
pub struct NotificationScheduler {
    port: Box<dyn NotificationPort>,
    clock: Arc<dyn Clock>,
}

impl NotificationScheduler {
    pub fn new(port: Box<dyn NotificationPort>, clock: Arc<dyn Clock>) -> Self {
        Self { port, clock }
    }

    /// Builds the reminder payload for one task.
    pub fn reminder_request(title: &str, deadline_ms: i64) -> NotificationRequest {
        NotificationRequest {
            title: REMINDER_TITLE.to_string(),
            body: format!("Last day for \"{title}\"!"),
            sound: true,
            trigger_at_ms: deadline_ms,
        }
    }

    /// Requests a reminder at `deadline_ms`.
    ///
    /// Deadlines at or before now are skipped without contacting the
    /// service. Service failures become [`SchedulingOutcome::Failed`].
    pub fn schedule(&self, title: &str, deadline_ms: i64) -> SchedulingOutcome {
        let now_ms = self.clock.now_ms();
        if deadline_ms <= now_ms {
            debug!(
                "event=reminder_schedule module=notify status=skipped reason=past_deadline deadline_ms={deadline_ms} now_ms={now_ms}"
            );
            return SchedulingOutcome::SkippedPastDeadline;
        }

        let request = Self::reminder_request(title, deadline_ms);
        match self.port.schedule(&request) {
            Ok(handle) => {
                info!(
                    "event=reminder_schedule module=notify status=ok handle={handle} deadline_ms={deadline_ms}"
                );
                SchedulingOutcome::Scheduled(handle)
            }
            Err(err) => {
                let reason = match err {
                    PortError::Denied => {
                        format!("{} permission denied", Capability::Notifications)
                    }
                    other => other.to_string(),
                };
                warn!(
                    "event=reminder_schedule module=notify status=error error_code=schedule_failed error={reason}"
                );
                SchedulingOutcome::Failed(reason)
            }
        }
    }

    /// Cancels a reminder; never fails its caller.
    pub fn cancel(&self, handle: &NotificationHandle) -> CancellationOutcome {
        match self.port.cancel(handle) {
            Ok(()) => {
                info!("event=reminder_cancel module=notify status=ok handle={handle}");
                CancellationOutcome::Cancelled
            }
            Err(PortError::UnknownHandle) => {
                debug!(
                    "event=reminder_cancel module=notify status=ok reason=already_gone handle={handle}"
                );
                CancellationOutcome::AlreadyGone
            }
            Err(err) => {
                warn!(
                    "event=reminder_cancel module=notify status=error error_code=cancel_failed handle={handle} error={err}"
                );
                CancellationOutcome::Failed(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CancellationOutcome, NotificationPort, NotificationRequest, NotificationScheduler,
        SchedulingOutcome, REMINDER_TITLE,
    };
    use crate::capability::{PortError, PortResult};
    use crate::clock::ManualClock;
    use crate::model::task::NotificationHandle;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct StubPort {
        requests: Mutex<Vec<NotificationRequest>>,
        schedule_error: Option<PortError>,
        cancel_error: Option<PortError>,
    }

    impl NotificationPort for StubPort {
        fn schedule(&self, request: &NotificationRequest) -> PortResult<NotificationHandle> {
            self.requests.lock().unwrap().push(request.clone());
            match &self.schedule_error {
                Some(err) => Err(err.clone()),
                None => Ok(NotificationHandle::new("stub-1")),
            }
        }

        fn cancel(&self, _handle: &NotificationHandle) -> PortResult<()> {
            match &self.cancel_error {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }
    }

    fn scheduler_with(port: StubPort, now_ms: i64) -> (NotificationScheduler, Arc<StubPort>) {
        let port = Arc::new(port);
        let scheduler = NotificationScheduler::new(
            Box::new(SharedPort(Arc::clone(&port))),
            Arc::new(ManualClock::new(now_ms)),
        );
        (scheduler, port)
    }

    struct SharedPort(Arc<StubPort>);

    impl NotificationPort for SharedPort {
        fn schedule(&self, request: &NotificationRequest) -> PortResult<NotificationHandle> {
            self.0.schedule(request)
        }

        fn cancel(&self, handle: &NotificationHandle) -> PortResult<()> {
            self.0.cancel(handle)
        }
    }

    #[test]
    fn past_and_immediate_deadlines_skip_the_service() {
        let (scheduler, port) = scheduler_with(StubPort::default(), 1_000);

        assert_eq!(
            scheduler.schedule("late", 999),
            SchedulingOutcome::SkippedPastDeadline
        );
        assert_eq!(
            scheduler.schedule("now", 1_000),
            SchedulingOutcome::SkippedPastDeadline
        );
        assert!(port.requests.lock().unwrap().is_empty());
    }

    #[test]
    fn future_deadline_sends_reminder_payload() {
        let (scheduler, port) = scheduler_with(StubPort::default(), 1_000);

        let outcome = scheduler.schedule("Buy milk", 5_000);
        assert_eq!(
            outcome,
            SchedulingOutcome::Scheduled(NotificationHandle::new("stub-1"))
        );

        let requests = port.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].title, REMINDER_TITLE);
        assert!(requests[0].body.contains("Buy milk"));
        assert!(requests[0].sound);
        assert_eq!(requests[0].trigger_at_ms, 5_000);
    }

    #[test]
    fn service_failure_degrades_to_failed_outcome() {
        let port = StubPort {
            schedule_error: Some(PortError::Denied),
            ..StubPort::default()
        };
        let (scheduler, _) = scheduler_with(port, 0);

        let outcome = scheduler.schedule("x", 10);
        assert!(matches!(&outcome, SchedulingOutcome::Failed(reason) if reason.contains("denied")));
        assert_eq!(outcome.handle(), None);
    }

    #[test]
    fn cancelling_unknown_handle_is_a_safe_no_op() {
        let port = StubPort {
            cancel_error: Some(PortError::UnknownHandle),
            ..StubPort::default()
        };
        let (scheduler, _) = scheduler_with(port, 0);

        assert_eq!(
            scheduler.cancel(&NotificationHandle::new("fired")),
            CancellationOutcome::AlreadyGone
        );
    }

    #[test]
    fn cancel_failure_is_reported_not_raised() {
        let port = StubPort {
            cancel_error: Some(PortError::Unavailable("service down".to_string())),
            ..StubPort::default()
        };
        let (scheduler, _) = scheduler_with(port, 0);

        let outcome = scheduler.cancel(&NotificationHandle::new("n"));
        assert!(matches!(outcome, CancellationOutcome::Failed(reason) if reason.contains("service down")));
    }
}
