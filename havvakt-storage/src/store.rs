//! SQLite-backed trail and breach-state store.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use thiserror::Error;
use tracing::{debug, info};

use havvakt_core::{BreachState, BreachStatus, PositionFix, VesselId};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("corrupt row: {0}")]
    Corrupt(String),
}

/// One SQLite connection owning the monitor's persistent state.
pub struct TrailDb {
    conn: Connection,
}

impl TrailDb {
    /// Opens (or creates) the database and ensures the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let conn = Connection::open(path.as_ref())?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS positions (
                 mmsi      INTEGER NOT NULL,
                 timestamp TEXT NOT NULL,
                 lat       REAL NOT NULL,
                 lon       REAL NOT NULL,
                 sog       REAL,
                 cog       REAL,
                 PRIMARY KEY (mmsi, timestamp)
             );
             CREATE INDEX IF NOT EXISTS idx_positions_mmsi ON positions(mmsi);
             CREATE INDEX IF NOT EXISTS idx_positions_timestamp ON positions(timestamp);
             CREATE TABLE IF NOT EXISTS breach_state (
                 mmsi          INTEGER PRIMARY KEY,
                 status        TEXT NOT NULL,
                 last_alert_at TEXT
             );",
        )?;
        info!(path = %path.as_ref().display(), "trail database ready");
        Ok(Self { conn })
    }

    /// In-memory database for tests.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS positions (
                 mmsi      INTEGER NOT NULL,
                 timestamp TEXT NOT NULL,
                 lat       REAL NOT NULL,
                 lon       REAL NOT NULL,
                 sog       REAL,
                 cog       REAL,
                 PRIMARY KEY (mmsi, timestamp)
             );
             CREATE TABLE IF NOT EXISTS breach_state (
                 mmsi          INTEGER PRIMARY KEY,
                 status        TEXT NOT NULL,
                 last_alert_at TEXT
             );",
        )?;
        Ok(Self { conn })
    }

    /// Upserts one batch of fixes inside a transaction.
    pub fn save_positions(&mut self, fixes: &[PositionFix]) -> Result<(), StorageError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO positions (mmsi, timestamp, lat, lon, sog, cog)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for fix in fixes {
                stmt.execute(params![
                    fix.vessel_id.0,
                    fix.timestamp.to_rfc3339(),
                    fix.lat,
                    fix.lon,
                    fix.sog,
                    fix.cog,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Deletes rows older than the cutoff; returns how many went away.
    pub fn prune_before(&self, cutoff: DateTime<Utc>) -> Result<usize, StorageError> {
        let deleted = self.conn.execute(
            "DELETE FROM positions WHERE timestamp < ?1",
            params![cutoff.to_rfc3339()],
        )?;
        if deleted > 0 {
            debug!(deleted, "pruned stale position rows");
        }
        Ok(deleted)
    }

    /// Upserts the full breach-state map.
    pub fn save_states<'a>(
        &mut self,
        states: impl IntoIterator<Item = (&'a VesselId, &'a BreachState)>,
    ) -> Result<(), StorageError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO breach_state (mmsi, status, last_alert_at)
                 VALUES (?1, ?2, ?3)",
            )?;
            for (id, state) in states {
                stmt.execute(params![
                    id.0,
                    state.status.to_string(),
                    state.last_alert_at.map(|t| t.to_rfc3339()),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Loads all persisted fixes newer than the cutoff, oldest first.
    pub fn load_positions(&self, cutoff: DateTime<Utc>) -> Result<Vec<PositionFix>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT mmsi, timestamp, lat, lon, sog, cog FROM positions
             WHERE timestamp >= ?1 ORDER BY timestamp",
        )?;
        let rows = stmt.query_map(params![cutoff.to_rfc3339()], |row| {
            Ok((
                row.get::<_, u32>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, f64>(3)?,
                row.get::<_, Option<f64>>(4)?,
                row.get::<_, Option<f64>>(5)?,
            ))
        })?;

        let mut fixes = Vec::new();
        for row in rows {
            let (mmsi, timestamp, lat, lon, sog, cog) = row?;
            let timestamp = parse_timestamp(&timestamp)?;
            fixes.push(PositionFix {
                vessel_id: VesselId(mmsi),
                lat,
                lon,
                timestamp,
                sog,
                cog,
            });
        }
        Ok(fixes)
    }

    /// Loads the persisted breach-state map.
    pub fn load_states(&self) -> Result<HashMap<VesselId, BreachState>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT mmsi, status, last_alert_at FROM breach_state")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, u32>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
            ))
        })?;

        let mut states = HashMap::new();
        for row in rows {
            let (mmsi, status, last_alert_at) = row?;
            let status: BreachStatus = status
                .parse()
                .map_err(StorageError::Corrupt)?;
            let last_alert_at = last_alert_at.map(|t| parse_timestamp(&t)).transpose()?;
            states.insert(
                VesselId(mmsi),
                BreachState {
                    status,
                    last_alert_at,
                },
            );
        }
        Ok(states)
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StorageError::Corrupt(format!("bad timestamp {raw}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn fix(id: u32, secs: i64) -> PositionFix {
        PositionFix {
            vessel_id: VesselId(id),
            lat: 59.5,
            lon: 24.5,
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
            sog: Some(9.5),
            cog: None,
        }
    }

    #[test]
    fn positions_round_trip() {
        let mut db = TrailDb::open_in_memory().unwrap();
        let fixes = vec![fix(1, 0), fix(1, 300), fix(2, 100)];
        db.save_positions(&fixes).unwrap();

        let loaded = db
            .load_positions(Utc.timestamp_opt(0, 0).unwrap())
            .unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded[0].timestamp.timestamp(), 0);
        assert_eq!(loaded[0].sog, Some(9.5));
        assert_eq!(loaded[0].cog, None);
    }

    #[test]
    fn duplicate_fix_replaces_not_duplicates() {
        let mut db = TrailDb::open_in_memory().unwrap();
        db.save_positions(&[fix(1, 0)]).unwrap();
        db.save_positions(&[fix(1, 0)]).unwrap();
        let loaded = db
            .load_positions(Utc.timestamp_opt(0, 0).unwrap())
            .unwrap();
        assert_eq!(loaded.len(), 1);
    }

    #[test]
    fn prune_respects_cutoff() {
        let mut db = TrailDb::open_in_memory().unwrap();
        let window = Duration::hours(3);
        db.save_positions(&[fix(1, 0), fix(1, window.num_seconds() + 60)])
            .unwrap();

        let now = Utc.timestamp_opt(window.num_seconds() + 60, 0).unwrap();
        let deleted = db.prune_before(now - window).unwrap();
        assert_eq!(deleted, 1);

        let loaded = db
            .load_positions(Utc.timestamp_opt(0, 0).unwrap())
            .unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].timestamp, now);
    }

    #[test]
    fn breach_states_round_trip() {
        let mut db = TrailDb::open_in_memory().unwrap();
        let alerted = Utc.timestamp_opt(120, 0).unwrap();
        let mut states = HashMap::new();
        states.insert(
            VesselId(1),
            BreachState {
                status: BreachStatus::Inside,
                last_alert_at: Some(alerted),
            },
        );
        states.insert(VesselId(2), BreachState::default());
        db.save_states(states.iter()).unwrap();

        let loaded = db.load_states().unwrap();
        assert_eq!(loaded, states);
        assert_eq!(loaded[&VesselId(1)].last_alert_at, Some(alerted));
    }

    #[test]
    fn open_creates_file_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trails.db");
        {
            let mut db = TrailDb::open(&path).unwrap();
            db.save_positions(&[fix(1, 0)]).unwrap();
        }
        let db = TrailDb::open(&path).unwrap();
        assert_eq!(
            db.load_positions(Utc.timestamp_opt(0, 0).unwrap())
                .unwrap()
                .len(),
            1
        );
    }
}
