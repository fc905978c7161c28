//! Geolocation port.

use crate::capability::PortResult;
use crate::model::task::Location;

/// Host geolocation capability.
///
/// Implementations own the permission prompt and return
/// `PortError::Denied` when the user refuses it.
pub trait LocationPort {
    fn current_location(&self) -> PortResult<Location>;
}
