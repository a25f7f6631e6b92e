//! PostgreSQL backend for the trend log.
//!
//! Stores one row per (location, log_date) in `aqi_trend`. The primary key
//! gives the upsert its atomicity: concurrent writers for the same key
//! serialize on the row and the last one wins.

use postgres::{Client, NoTls};

use crate::model::{TrendEntry, TrendError};
use crate::trend::TrendStore;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS aqi_trend (
        location    TEXT        NOT NULL,
        log_date    DATE        NOT NULL,
        aqi         INTEGER     NOT NULL CHECK (aqi >= 0),
        recorded_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        PRIMARY KEY (location, log_date)
    )
";

pub struct PostgresStore {
    client: Client,
}

impl PostgresStore {
    /// Connects and creates the `aqi_trend` table if it does not exist.
    pub fn connect(database_url: &str) -> Result<Self, TrendError> {
        let mut client = Client::connect(database_url, NoTls)?;
        client.batch_execute(SCHEMA)?;
        Ok(Self { client })
    }
}

impl TrendStore for PostgresStore {
    fn upsert(&mut self, entry: &TrendEntry) -> Result<(), TrendError> {
        self.client.execute(
            "INSERT INTO aqi_trend (location, log_date, aqi)
             VALUES ($1, $2, $3)
             ON CONFLICT (location, log_date)
             DO UPDATE SET aqi = EXCLUDED.aqi, recorded_at = now()",
            &[&entry.location, &entry.date, &i32::from(entry.aqi)],
        )?;
        Ok(())
    }

    fn recent(&mut self, location: &str, limit: usize) -> Result<Vec<TrendEntry>, TrendError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = self.client.query(
            "SELECT log_date, aqi
             FROM aqi_trend
             WHERE location = $1
             ORDER BY log_date DESC
             LIMIT $2",
            &[&location, &limit],
        )?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows.iter().rev() {
            let aqi: i32 = row.get(1);
            let aqi = u16::try_from(aqi)
                .map_err(|_| TrendError::Corrupt(format!("AQI {} out of range", aqi)))?;
            entries.push(TrendEntry {
                date: row.get(0),
                location: location.to_string(),
                aqi,
            });
        }

        Ok(entries)
    }
}
