//! Task-scoped attachment copies.
//!
//! # Responsibility
//! - Let the host pick a source document through a picker port.
//! - Copy the source into `<documents>/tasks/<task_id>/` and return the new path.
//!
//! # Invariants
//! - Sources are copied, never moved.
//! - Task directories are created lazily and never removed by the core.

pub mod manager;
