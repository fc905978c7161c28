//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate the durable store, reminder scheduler and capability ports
//!   behind use-case level operations.
//! - Keep host/UI layers decoupled from storage and device details.

pub mod task_store;
