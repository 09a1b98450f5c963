//! Device entity and its lifecycle state.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a device.
///
/// Stored upper-case (`IN_USE`) and exposed lower-case (`in_use`) over HTTP.
/// Parsing accepts either spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceState {
    Available,
    InUse,
    Inactive,
}

impl DeviceState {
    pub const ALL: [DeviceState; 3] = [
        DeviceState::Available,
        DeviceState::InUse,
        DeviceState::Inactive,
    ];

    /// Representation used in the `devices.state` column.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            DeviceState::Available => "AVAILABLE",
            DeviceState::InUse => "IN_USE",
            DeviceState::Inactive => "INACTIVE",
        }
    }

    /// Representation used in API payloads and query strings.
    pub fn as_api_str(&self) -> &'static str {
        match self {
            DeviceState::Available => "available",
            DeviceState::InUse => "in_use",
            DeviceState::Inactive => "inactive",
        }
    }

    pub fn is_in_use(&self) -> bool {
        matches!(self, DeviceState::InUse)
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_api_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDeviceState(pub String);

impl fmt::Display for UnknownDeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown device state '{}', expected one of: available, in_use, inactive",
            self.0
        )
    }
}

impl std::error::Error for UnknownDeviceState {}

impl FromStr for DeviceState {
    type Err = UnknownDeviceState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        DeviceState::ALL
            .into_iter()
            .find(|state| state.as_api_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownDeviceState(s.to_string()))
    }
}

/// A registered device.
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    pub id: i64,
    pub name: String,
    pub brand: String,
    pub state: DeviceState,
    pub created_on: DateTime<Utc>,
}

impl Device {
    /// Creates a new Device instance.
    pub fn new(
        id: i64,
        name: String,
        brand: String,
        state: DeviceState,
        created_on: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            brand,
            state,
            created_on,
        }
    }

    pub fn is_in_use(&self) -> bool {
        self.state.is_in_use()
    }
}

/// Input data for registering a device. The store assigns `id` and `created_on`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDevice {
    pub name: String,
    pub brand: String,
    pub state: DeviceState,
}

/// Fully resolved values written by an update.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceChanges {
    pub name: String,
    pub brand: String,
    pub state: DeviceState,
}

/// Requested modification of a device.
///
/// `None` fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceUpdate {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub state: Option<DeviceState>,
}

impl DeviceUpdate {
    /// Merges the requested values over `current`.
    pub fn resolve(&self, current: &Device) -> DeviceChanges {
        DeviceChanges {
            name: self.name.clone().unwrap_or_else(|| current.name.clone()),
            brand: self.brand.clone().unwrap_or_else(|| current.brand.clone()),
            state: self.state.unwrap_or(current.state),
        }
    }
}
