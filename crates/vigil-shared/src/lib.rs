//! # vigil-shared
//!
//! Primitive domain types for the Vigil vehicle-theft complaint tracker:
//! identifiers, status lifecycle metadata, inline attachments, and the
//! constants shared by the store and application layers.

pub mod attachment;
pub mod constants;
pub mod lifecycle;
pub mod types;

pub use attachment::{Attachment, AttachmentError, FileUpload};
pub use lifecycle::{Severity, StatusDisplay, TrackerStep};
pub use types::{ComplaintId, Coordinates, InvalidComplaintId, Sender, Status, UnknownStatus, VehicleType};
