//! Feedback submission.

use rusqlite::{Connection, params};

use crate::error::StoreResult;
use crate::model::{NewFeedback, sql_value};

/// Store one feedback row and return its id. The referenced analysis is not
/// checked for existence.
pub fn submit(conn: &Connection, feedback: &NewFeedback) -> StoreResult<i64> {
    conn.execute(
        "INSERT INTO user_feedback (analysis_id, feedback, timestamp) VALUES (?, ?, ?)",
        params![
            sql_value(&feedback.analysis_id),
            sql_value(&feedback.feedback),
            sql_value(&feedback.timestamp),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}
