//! Deadline reminder scheduling.
//!
//! # Responsibility
//! - Turn a task deadline into a one-shot reminder request.
//! - Convert every notification-service failure into an observable outcome.
//!
//! # Invariants
//! - Past or immediate deadlines never reach the notification service.
//! - Scheduling and cancellation never return an error to their caller.

pub mod scheduler;
