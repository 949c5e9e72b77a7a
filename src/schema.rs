//! Schema manager.
//!
//! Creation is idempotent: every table and index uses `IF NOT EXISTS`, and
//! optional columns are added only after checking the live column list, so
//! older stores are migrated additively and nothing is ever dropped or
//! altered in place.

use rusqlite::{Connection, params};
use tracing::info;

use crate::error::StoreResult;

pub const ANALYSIS_RESULTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS analysis_results (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    image_hash VARCHAR(64),
    image_data TEXT,
    prediction VARCHAR(10),
    confidence DECIMAL(5,2),
    analysis_mode VARCHAR(50),
    processing_time INTEGER,
    model_used VARCHAR(100),
    model_author VARCHAR(50),
    probabilities TEXT,
    raw_score DECIMAL(5,4),
    timestamp DATETIME,
    device_info TEXT,
    app_version VARCHAR(20),
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
)
"#;

// The foreign key is declared but not enforced: the connection never turns
// on `PRAGMA foreign_keys`.
pub const USER_FEEDBACK_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS user_feedback (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    analysis_id INTEGER,
    feedback VARCHAR(20),
    timestamp DATETIME,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (analysis_id) REFERENCES analysis_results(id)
)
"#;

pub const SYSTEM_LOGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS system_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    level VARCHAR(10),
    message TEXT,
    timestamp DATETIME,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
)
"#;

pub const TABLES: [(&str, &str); 3] = [
    ("analysis_results", ANALYSIS_RESULTS_TABLE),
    ("user_feedback", USER_FEEDBACK_TABLE),
    ("system_logs", SYSTEM_LOGS_TABLE),
];

/// Columns added to `analysis_results` after the first release.
pub const OPTIONAL_COLUMNS: [(&str, &str); 1] = [("user_id", "TEXT")];

/// Index definitions, run after the optional columns exist.
pub const INDEXES: [&str; 7] = [
    "CREATE INDEX IF NOT EXISTS idx_analysis_timestamp ON analysis_results(timestamp)",
    "CREATE INDEX IF NOT EXISTS idx_analysis_prediction ON analysis_results(prediction)",
    "CREATE INDEX IF NOT EXISTS idx_analysis_mode ON analysis_results(analysis_mode)",
    "CREATE INDEX IF NOT EXISTS idx_analysis_user_id ON analysis_results(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_feedback_analysis_id ON user_feedback(analysis_id)",
    "CREATE INDEX IF NOT EXISTS idx_logs_timestamp ON system_logs(timestamp)",
    "CREATE INDEX IF NOT EXISTS idx_logs_level ON system_logs(level)",
];

/// Create tables, add missing columns, then create indexes. The first
/// failing statement aborts the sequence.
pub fn ensure_schema(conn: &Connection) -> StoreResult<()> {
    for (name, ddl) in TABLES {
        conn.execute_batch(ddl)?;
        info!(table = name, "table ready");
    }

    for (column, decl) in OPTIONAL_COLUMNS {
        if !has_column(conn, "analysis_results", column)? {
            conn.execute_batch(&format!(
                "ALTER TABLE analysis_results ADD COLUMN {column} {decl}"
            ))?;
            info!(table = "analysis_results", column, "column added");
        }
    }

    for index in INDEXES {
        conn.execute_batch(index)?;
    }
    info!(count = INDEXES.len(), "indexes ready");

    Ok(())
}

/// Whether `table` currently has a column named `column`.
pub fn has_column(conn: &Connection, table: &str, column: &str) -> StoreResult<bool> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
    let names = stmt
        .query_map([table], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names.iter().any(|name| name == column))
}

/// Insert the illustrative sample row and return its id.
pub fn seed_sample(conn: &Connection) -> StoreResult<i64> {
    conn.execute(
        r#"
        INSERT INTO analysis_results (
            image_hash, image_data, prediction, confidence, analysis_mode, processing_time,
            model_used, model_author, probabilities, raw_score, timestamp,
            device_info, app_version
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
        params![
            "sample_hash_123",
            "https://picsum.photos/200/200?random=1",
            crate::model::REAL_LABEL,
            85.5,
            "haywoodsloan",
            1500,
            "haywoodsloan/ai-image-detector-deploy",
            "haywoodsloan",
            r#"{"real":85.5,"fake":14.5}"#,
            0.855,
            chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            r#"{"platform":"android","version":"13"}"#,
            "2.0.0",
        ],
    )?;
    let id = conn.last_insert_rowid();
    info!(id, "sample analysis inserted");
    Ok(id)
}
