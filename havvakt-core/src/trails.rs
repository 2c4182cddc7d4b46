//! Bounded time-windowed movement history per vessel.
//!
//! Each vessel owns an ordered-by-timestamp trail. Appends keep order even
//! when fixes arrive out of order across a batch; eviction runs once per
//! cycle so memory stays bounded for long-lived vessels.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Duration, Utc};

use crate::fix::{PositionFix, VesselId};

/// Per-vessel ordered position history, bounded to a rolling time window.
#[derive(Debug)]
pub struct TrailStore {
    window: Duration,
    trails: HashMap<VesselId, VecDeque<PositionFix>>,
}

impl TrailStore {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            trails: HashMap::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Inserts a fix keeping the vessel's trail timestamp-sorted.
    ///
    /// The feed is normally monotonic within one vessel's stream, so the
    /// insertion point is searched from the tail.
    pub fn append(&mut self, fix: PositionFix) {
        let trail = self.trails.entry(fix.vessel_id).or_default();
        let mut idx = trail.len();
        while idx > 0 && trail[idx - 1].timestamp > fix.timestamp {
            idx -= 1;
        }
        trail.insert(idx, fix);
    }

    /// Removes every entry older than `now - window`, for all vessels.
    /// Vessels whose trail drains completely are dropped. Idempotent.
    pub fn evict(&mut self, now: DateTime<Utc>) {
        let cutoff = now - self.window;
        self.trails.retain(|_, trail| {
            while trail.front().is_some_and(|fix| fix.timestamp < cutoff) {
                trail.pop_front();
            }
            !trail.is_empty()
        });
    }

    /// Read-only snapshot of one vessel's trail, oldest first. Empty for
    /// unknown vessels.
    pub fn trail_of(&self, vessel_id: VesselId) -> impl Iterator<Item = &PositionFix> {
        self.trails.get(&vessel_id).into_iter().flatten()
    }

    /// The most recent fix per vessel.
    pub fn latest_fixes(&self) -> impl Iterator<Item = &PositionFix> {
        self.trails.values().filter_map(VecDeque::back)
    }

    /// All trails, for export and persistence.
    pub fn iter(&self) -> impl Iterator<Item = (VesselId, &VecDeque<PositionFix>)> {
        self.trails.iter().map(|(id, trail)| (*id, trail))
    }

    pub fn vessel_count(&self) -> usize {
        self.trails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trails.is_empty()
    }
}
