//! Device capability identifiers and the shared port error type.
//!
//! # Responsibility
//! - Name the host capabilities the core consumes results from.
//! - Give every port one error vocabulary so the store can degrade uniformly.
//!
//! # Invariants
//! - `PortError::Denied` is the only error that maps to a capability-denied
//!   result at the store boundary.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Host capability backing one port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    Location,
    Notifications,
    Files,
}

impl Capability {
    /// Stable id used in log events and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Notifications => "notifications",
            Self::Files => "files",
        }
    }

    /// User-facing short description.
    pub fn description(self) -> &'static str {
        match self {
            Self::Location => "Attach the current location to a task.",
            Self::Notifications => "Post a reminder when a task deadline arrives.",
            Self::Files => "Pick a document and copy it next to a task.",
        }
    }
}

impl Display for Capability {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type PortResult<T> = Result<T, PortError>;

/// Failure reported by a host capability port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortError {
    /// The user or OS refused the permission.
    Denied,
    /// The referenced handle is unknown (already fired or cancelled).
    UnknownHandle,
    /// The user dismissed the prompt.
    Cancelled,
    /// The service failed or is not available on this host.
    Unavailable(String),
}

impl Display for PortError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Denied => write!(f, "permission denied"),
            Self::UnknownHandle => write!(f, "handle is unknown"),
            Self::Cancelled => write!(f, "cancelled by user"),
            Self::Unavailable(reason) => write!(f, "service unavailable: {reason}"),
        }
    }
}

impl Error for PortError {}
