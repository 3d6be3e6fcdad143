use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{COMPLAINT_ID_ALPHABET, COMPLAINT_ID_LEN, COMPLAINT_ID_PREFIX};

/// Human-presentable complaint identifier: `CR-` followed by 6 uppercase
/// alphanumeric characters. Doubles as the store's primary key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ComplaintId(String);

impl ComplaintId {
    /// Draw a fresh identifier from the random source. Generation alone
    /// carries no uniqueness guarantee; creation checks the store for a
    /// collision before writing.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..COMPLAINT_ID_LEN)
            .map(|_| COMPLAINT_ID_ALPHABET[rng.gen_range(0..COMPLAINT_ID_ALPHABET.len())] as char)
            .collect();
        Self(format!("{COMPLAINT_ID_PREFIX}{suffix}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComplaintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("Invalid complaint id: {0}")]
pub struct InvalidComplaintId(pub String);

impl FromStr for ComplaintId {
    type Err = InvalidComplaintId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let suffix = s
            .strip_prefix(COMPLAINT_ID_PREFIX)
            .ok_or_else(|| InvalidComplaintId(s.to_string()))?;
        if suffix.len() != COMPLAINT_ID_LEN
            || !suffix.bytes().all(|b| COMPLAINT_ID_ALPHABET.contains(&b))
        {
            return Err(InvalidComplaintId(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

/// Category of the stolen vehicle, as selected by the submitter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum VehicleType {
    Car,
    Bike,
    Truck,
    Other,
}

impl VehicleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Car => "Car",
            Self::Bike => "Bike",
            Self::Truck => "Truck",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side of the complaint a chat message comes from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Sender {
    User,
    Investigator,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::User => "User",
            Self::Investigator => "Investigator",
        })
    }
}

/// Lifecycle status of a complaint. Any status may be set from any other;
/// the ordering in [`crate::lifecycle`] is presentation only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Status {
    Pending,
    Investigating,
    Found,
    Closed,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::Pending,
        Status::Investigating,
        Status::Found,
        Status::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Investigating => "Investigating",
            Self::Found => "Found",
            Self::Closed => "Closed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status string outside the four known values. The store enforces no
/// schema, so externally written records can carry anything.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("Unknown status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for Status {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Investigating" => Ok(Self::Investigating),
            "Found" => Ok(Self::Found),
            "Closed" => Ok(Self::Closed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Geographic position of the theft, present only when geolocation
/// succeeded or the submitter picked a point on the map.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}
