//! Persisted record models.
//!
//! One document per complaint, keyed by the human-presentable id. The
//! document shape IS the schema: there is no versioning and no migration
//! machinery. Field names are camelCase to match the persisted layout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use vigil_shared::attachment::Attachment;
use vigil_shared::types::{ComplaintId, Coordinates, Sender, Status, VehicleType};

use crate::error::Result;

/// A single chat message embedded in a complaint's message log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub sender: Sender,
    /// May be empty only when `attachment` is present.
    pub text: String,
    #[serde(default)]
    pub attachment: Option<Attachment>,
    /// Assigned at append time; log order equals timestamp order.
    pub timestamp: DateTime<Utc>,
}

/// The root record representing one reported vehicle theft.
///
/// Created once, fully populated; thereafter only `status` and `messages`
/// ever change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    pub id: ComplaintId,
    pub owner_name: String,
    /// Derived as `"<email> | <phone>"` at creation.
    pub contact_info: String,
    pub email: String,
    pub phone: String,
    pub vehicle_type: VehicleType,
    pub vehicle_no: String,
    /// Free-text location as entered or reverse-filled from the map.
    pub location: String,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub vehicle_image: Option<Attachment>,
    #[serde(default)]
    pub rc_document: Option<Attachment>,
    /// Theft date as supplied by the submitter; never later than
    /// `timestamp`.
    pub date: DateTime<Utc>,
    pub description: String,
    pub status: Status,
    /// Append-only chat log; insertion order is chat order.
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Creation time; the default sort key across the collection.
    pub timestamp: DateTime<Utc>,
}

impl Complaint {
    pub fn to_document(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Decode a raw store document.
    ///
    /// The data layer enforces no schema, so a record written by another
    /// client can carry an unknown `status` string; such records decode
    /// with `Pending` substituted (renderers keep the raw string via
    /// [`vigil_shared::StatusDisplay::for_raw`]).
    pub fn from_document(mut document: Value) -> Result<Self> {
        if let Some(raw) = document.get("status").and_then(Value::as_str) {
            if raw.parse::<Status>().is_err() {
                tracing::warn!(status = %raw, "document carries unknown status");
                document["status"] = Value::String(Status::Pending.to_string());
            }
        }
        Ok(serde_json::from_value(document)?)
    }
}
