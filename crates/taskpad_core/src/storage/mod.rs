//! Durable persistence of the task collection.
//!
//! # Responsibility
//! - Define the key-value port the task store writes through.
//! - Encode and decode the full-collection snapshot.
//!
//! # Invariants
//! - Snapshots are always complete; no delta persistence.
//! - A write either replaces the stored snapshot fully or leaves it untouched.

pub mod durable;
pub mod snapshot;
