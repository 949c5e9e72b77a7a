//! Aggregate statistics over analysis rows.

use rusqlite::{Connection, Row};

use crate::config::Scope;
use crate::error::StoreResult;
use crate::model::{FAKE_LABEL, REAL_LABEL, Statistics};

const AGGREGATE: &str = "SELECT COUNT(*), \
     COALESCE(SUM(CASE WHEN prediction = ?1 THEN 1 ELSE 0 END), 0), \
     COALESCE(SUM(CASE WHEN prediction = ?2 THEN 1 ELSE 0 END), 0), \
     AVG(confidence) \
     FROM analysis_results";

/// Count, real/fake breakdown, and mean confidence in one statement.
/// Labels other than the two canonical ones count toward the total only.
pub fn compute(conn: &Connection, scope: &Scope) -> StoreResult<Statistics> {
    let stats = match scope.owner() {
        None => conn.query_row(AGGREGATE, [REAL_LABEL, FAKE_LABEL], from_row)?,
        Some(owner) => conn.query_row(
            &format!("{AGGREGATE} WHERE user_id = ?3"),
            [REAL_LABEL, FAKE_LABEL, owner],
            from_row,
        )?,
    };
    Ok(stats)
}

fn from_row(row: &Row<'_>) -> rusqlite::Result<Statistics> {
    let average: Option<f64> = row.get(3)?;
    Ok(Statistics {
        total_analyses: row.get(0)?,
        real_count: row.get(1)?,
        fake_count: row.get(2)?,
        average_confidence: round2(average.unwrap_or(0.0)),
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
