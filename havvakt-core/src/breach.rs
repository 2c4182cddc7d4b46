//! Edge-triggered per-vessel intrusion state machine.
//!
//! Deduplication is a function of the edge between consecutive samples,
//! not a timer: a vessel loitering inside the geofence for hours produces
//! exactly one alert, and only a confirmed outside sample re-arms the
//! machine. A feed gap while inside is still the same episode, so resuming
//! inside fires nothing.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fix::{PositionFix, VesselId};

/// Whether the vessel's last evaluated sample was inside the geofence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreachStatus {
    #[default]
    Outside,
    Inside,
}

impl fmt::Display for BreachStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreachStatus::Outside => write!(f, "outside"),
            BreachStatus::Inside => write!(f, "inside"),
        }
    }
}

impl FromStr for BreachStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "outside" => Ok(BreachStatus::Outside),
            "inside" => Ok(BreachStatus::Inside),
            other => Err(format!("unknown breach status: {other}")),
        }
    }
}

/// Per-vessel machine state. Created implicitly outside on first sighting,
/// never deleted during a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BreachState {
    pub status: BreachStatus,
    pub last_alert_at: Option<DateTime<Utc>>,
}

/// Raised once per intrusion episode start, never on every inside sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub vessel_id: VesselId,
    /// The fix that triggered the episode.
    pub position: PositionFix,
    pub entered_at: DateTime<Utc>,
}

impl BreachState {
    /// Consumes one sample and its membership result; returns at most one
    /// alert. Transitions:
    ///
    /// - outside + outside sample: stay, no event
    /// - outside + inside sample:  become inside, emit the episode alert
    /// - inside + inside sample:   stay, no event
    /// - inside + outside sample:  become outside, no event (re-arms)
    pub fn observe(&mut self, fix: &PositionFix, inside: bool) -> Option<AlertEvent> {
        match (self.status, inside) {
            (BreachStatus::Outside, true) => {
                self.status = BreachStatus::Inside;
                self.last_alert_at = Some(fix.timestamp);
                Some(AlertEvent {
                    vessel_id: fix.vessel_id,
                    position: fix.clone(),
                    entered_at: fix.timestamp,
                })
            }
            (BreachStatus::Inside, false) => {
                self.status = BreachStatus::Outside;
                None
            }
            _ => None,
        }
    }
}
