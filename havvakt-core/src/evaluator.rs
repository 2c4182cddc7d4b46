//! One-cycle orchestration over a batch of position fixes.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use crate::breach::{AlertEvent, BreachState};
use crate::fix::{PositionFix, VesselId};
use crate::geofence::GeofencePolygon;
use crate::trails::TrailStore;

/// Outcome of one evaluation cycle.
#[derive(Debug, Default)]
pub struct CycleReport {
    pub alerts: Vec<AlertEvent>,
    pub fixes_seen: usize,
    /// Fixes dropped by structural validation. A malformed record never
    /// aborts the cycle or suppresses alerts for unrelated vessels.
    pub fixes_dropped: usize,
}

/// Owns the geofence, the trail store and the per-vessel breach states.
///
/// `run_cycle` is the only mutation entry point; it is synchronous and
/// assumes exclusive access between cycles.
pub struct Evaluator {
    geofence: GeofencePolygon,
    trails: TrailStore,
    states: HashMap<VesselId, BreachState>,
}

impl Evaluator {
    pub fn new(geofence: GeofencePolygon, window: Duration) -> Self {
        Self {
            geofence,
            trails: TrailStore::new(window),
            states: HashMap::new(),
        }
    }

    /// Processes one batch of fixes: validate, append to trails, test
    /// membership, drive the per-vessel machine, then evict stale trail
    /// entries once so exported trails never exceed the window.
    ///
    /// Vessels are independent; batch order does not affect per-vessel
    /// outcomes because state is keyed by vessel id.
    pub fn run_cycle(&mut self, batch: &[PositionFix], now: DateTime<Utc>) -> CycleReport {
        let mut report = CycleReport {
            fixes_seen: batch.len(),
            ..CycleReport::default()
        };

        for fix in batch {
            if let Err(err) = fix.validate() {
                warn!(vessel = %fix.vessel_id, %err, "dropping malformed fix");
                report.fixes_dropped += 1;
                continue;
            }

            self.trails.append(fix.clone());
            let inside = self.geofence.contains(fix.lat, fix.lon);
            let state = self.states.entry(fix.vessel_id).or_default();
            if let Some(alert) = state.observe(fix, inside) {
                report.alerts.push(alert);
            }
        }

        self.trails.evict(now);
        report
    }

    pub fn geofence(&self) -> &GeofencePolygon {
        &self.geofence
    }

    pub fn trails(&self) -> &TrailStore {
        &self.trails
    }

    pub fn breach_states(&self) -> &HashMap<VesselId, BreachState> {
        &self.states
    }

    /// Restores persisted history and machine states after a restart.
    ///
    /// Fixes pass the same structural validation as live ones, so a row a
    /// past cycle would have dropped never re-enters a trail. Valid fixes
    /// are replayed through the ordered append path; states overwrite
    /// whatever the replay would have implied, since the persisted machine
    /// is authoritative for episode continuity.
    pub fn restore(
        &mut self,
        fixes: impl IntoIterator<Item = PositionFix>,
        states: impl IntoIterator<Item = (VesselId, BreachState)>,
    ) {
        for fix in fixes {
            if let Err(err) = fix.validate() {
                warn!(vessel = %fix.vessel_id, %err, "skipping malformed persisted fix");
                continue;
            }
            self.trails.append(fix);
        }
        self.states.extend(states);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breach::BreachStatus;
    use chrono::TimeZone;

    fn unit_square() -> GeofencePolygon {
        GeofencePolygon::new(
            vec![(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)],
            vec![],
        )
        .unwrap()
    }

    fn fix(id: u32, lat: f64, lon: f64, secs: i64) -> PositionFix {
        PositionFix {
            vessel_id: VesselId(id),
            lat,
            lon,
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
            sog: None,
            cog: None,
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn entry_exit_reentry_yields_two_alerts() {
        let mut evaluator = Evaluator::new(unit_square(), Duration::hours(3));

        // Inside at t=0.
        let report = evaluator.run_cycle(&[fix(1, 0.5, 0.5, 0)], at(0));
        assert_eq!(report.alerts.len(), 1);
        assert_eq!(report.alerts[0].entered_at, at(0));

        // Outside at t=60: no alert, state re-armed.
        let report = evaluator.run_cycle(&[fix(1, 2.0, 2.0, 60)], at(60));
        assert!(report.alerts.is_empty());
        assert_eq!(
            evaluator.breach_states()[&VesselId(1)].status,
            BreachStatus::Outside
        );

        // Back inside at t=120: a new episode.
        let report = evaluator.run_cycle(&[fix(1, 0.5, 0.5, 120)], at(120));
        assert_eq!(report.alerts.len(), 1);
        assert_eq!(report.alerts[0].entered_at, at(120));
    }

    #[test]
    fn loitering_inside_alerts_once() {
        let mut evaluator = Evaluator::new(unit_square(), Duration::hours(3));
        let mut total = 0;
        for cycle in 0..10 {
            let secs = cycle * 300;
            total += evaluator
                .run_cycle(&[fix(1, 0.5, 0.5, secs)], at(secs))
                .alerts
                .len();
        }
        assert_eq!(total, 1);
    }

    #[test]
    fn malformed_fix_is_dropped_not_fatal() {
        let mut evaluator = Evaluator::new(unit_square(), Duration::hours(3));
        let batch = [
            fix(1, 200.0, 0.5, 0), // bad latitude
            fix(2, 0.5, 0.5, 0),   // unrelated vessel, inside
        ];
        let report = evaluator.run_cycle(&batch, at(0));
        assert_eq!(report.fixes_seen, 2);
        assert_eq!(report.fixes_dropped, 1);
        assert_eq!(report.alerts.len(), 1);
        assert_eq!(report.alerts[0].vessel_id, VesselId(2));
        // The dropped fix never reached the trail store.
        assert_eq!(evaluator.trails().trail_of(VesselId(1)).count(), 0);
    }

    #[test]
    fn vessels_are_independent_within_a_batch() {
        let mut evaluator = Evaluator::new(unit_square(), Duration::hours(3));
        let batch = [
            fix(1, 0.5, 0.5, 0),
            fix(2, 5.0, 5.0, 0),
            fix(3, 0.2, 0.8, 0),
        ];
        let report = evaluator.run_cycle(&batch, at(0));
        let mut alerted: Vec<u32> = report.alerts.iter().map(|a| a.vessel_id.0).collect();
        alerted.sort_unstable();
        assert_eq!(alerted, vec![1, 3]);
    }

    #[test]
    fn cycle_evicts_stale_trail_entries() {
        let window = Duration::hours(3);
        let mut evaluator = Evaluator::new(unit_square(), window);
        evaluator.run_cycle(&[fix(1, 0.5, 0.5, 0)], at(0));

        let later = window.num_seconds() + 1;
        evaluator.run_cycle(&[fix(1, 0.5, 0.5, later)], at(later));

        let stamps: Vec<i64> = evaluator
            .trails()
            .trail_of(VesselId(1))
            .map(|f| f.timestamp.timestamp())
            .collect();
        assert_eq!(stamps, vec![later]);
    }

    #[test]
    fn restore_resumes_episode_without_realerting() {
        let mut evaluator = Evaluator::new(unit_square(), Duration::hours(3));
        let persisted_state = BreachState {
            status: BreachStatus::Inside,
            last_alert_at: Some(at(0)),
        };
        evaluator.restore(
            vec![fix(1, 0.5, 0.5, 0)],
            vec![(VesselId(1), persisted_state)],
        );

        // Still inside after restart: same episode, no new alert.
        let report = evaluator.run_cycle(&[fix(1, 0.5, 0.5, 300)], at(300));
        assert!(report.alerts.is_empty());
        assert_eq!(evaluator.trails().trail_of(VesselId(1)).count(), 2);
    }

    #[test]
    fn restore_rejects_what_a_cycle_would_drop() {
        let bad = fix(1, 200.0, 0.5, 0);

        let mut evaluator = Evaluator::new(unit_square(), Duration::hours(3));
        let report = evaluator.run_cycle(&[bad.clone()], at(0));
        assert_eq!(report.fixes_dropped, 1);
        assert_eq!(evaluator.trails().trail_of(VesselId(1)).count(), 0);

        // The same fix arriving through the persistence path stays out too.
        let mut restored = Evaluator::new(unit_square(), Duration::hours(3));
        restored.restore(vec![bad, fix(1, 0.5, 0.5, 60)], vec![]);
        let stamps: Vec<i64> = restored
            .trails()
            .trail_of(VesselId(1))
            .map(|f| f.timestamp.timestamp())
            .collect();
        assert_eq!(stamps, vec![60]);
    }
}
