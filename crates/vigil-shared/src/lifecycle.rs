//! Presentation metadata for the complaint lifecycle.
//!
//! Status transitions are deliberately unordered (an investigator may move
//! a case backwards at any time); the ordinal here drives the progress
//! tracker only and must not be read as a transition graph.

use serde::Serialize;

use crate::types::{Status, UnknownStatus};

/// Severity tag, mapped to a CSS class by the UI layer.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum Severity {
    Danger,
    Warning,
    Success,
    Muted,
}

impl Severity {
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Danger => "text-danger",
            Self::Warning => "text-warning",
            Self::Success => "text-success",
            Self::Muted => "text-muted",
        }
    }
}

/// Fixed display metadata for one status value.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct StatusDisplay {
    /// Position in the progress tracker (0-3).
    pub ordinal: u8,
    pub icon: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub severity: Severity,
}

impl StatusDisplay {
    pub fn of(status: Status) -> Self {
        match status {
            Status::Pending => Self {
                ordinal: 0,
                icon: "📝",
                label: "Pending",
                description: "Complaint Received",
                severity: Severity::Danger,
            },
            Status::Investigating => Self {
                ordinal: 1,
                icon: "🕵️",
                label: "Investigating",
                description: "Officer Assigned",
                severity: Severity::Warning,
            },
            Status::Found => Self {
                ordinal: 2,
                icon: "✅",
                label: "Found",
                description: "Vehicle Recovered",
                severity: Severity::Success,
            },
            Status::Closed => Self {
                ordinal: 3,
                icon: "🔒",
                label: "Closed",
                description: "Case Closed",
                severity: Severity::Muted,
            },
        }
    }

    /// Display metadata for a raw status string read straight out of the
    /// store. The data layer enforces no schema, so unknown values fall
    /// back to the default (Pending) styling instead of failing the render.
    pub fn for_raw(raw: &str) -> Self {
        match raw.parse::<Status>() {
            Ok(status) => Self::of(status),
            Err(UnknownStatus(value)) => {
                tracing::warn!(status = %value, "unknown status, using default styling");
                Self::of(Status::Pending)
            }
        }
    }
}

/// One rung of the four-step progress tracker.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct TrackerStep {
    pub status: Status,
    pub display: StatusDisplay,
    /// Reached: the current status or an earlier one.
    pub active: bool,
    /// Strictly earlier than the current status.
    pub complete: bool,
}

/// The full progress tracker for a complaint currently at `current`.
pub fn tracker_steps(current: Status) -> [TrackerStep; 4] {
    let current_ordinal = StatusDisplay::of(current).ordinal;
    Status::ALL.map(|status| {
        let display = StatusDisplay::of(status);
        TrackerStep {
            status,
            display,
            active: display.ordinal <= current_ordinal,
            complete: display.ordinal < current_ordinal,
        }
    })
}
