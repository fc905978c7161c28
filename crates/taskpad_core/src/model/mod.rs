//! Task domain model.
//!
//! # Responsibility
//! - Define the single persisted entity (`Task`) and its creation draft.
//! - Define the typed extras that can be merged into a task after creation.
//!
//! # Invariants
//! - Every task is identified by a `TaskId` that is never reused.
//! - Extras are applied all-or-nothing: a rejected patch leaves the task untouched.

pub mod extras;
pub mod task;
