//! Analysis record operations: create, paginated list, bulk delete.

use rusqlite::{Connection, params};

use crate::config::Scope;
use crate::error::StoreResult;
use crate::model::{AnalysisRow, NewAnalysis, column_value, json_text, sql_value};

pub const DEFAULT_LIMIT: i64 = 50;
pub const DEFAULT_OFFSET: i64 = 0;

/// Pagination window for a list request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: DEFAULT_OFFSET,
        }
    }
}

impl Page {
    /// Build a page from raw query text. Unparsable values and zero fall
    /// back to the defaults; a numeric prefix such as `"20abc"` is honoured.
    pub fn from_query(limit: Option<&str>, offset: Option<&str>) -> Self {
        Self {
            limit: lenient_int(limit).unwrap_or(DEFAULT_LIMIT),
            offset: lenient_int(offset).unwrap_or(DEFAULT_OFFSET),
        }
    }
}

/// Leading-integer parse: optional whitespace, optional sign, digits.
/// Returns `None` for no digits or a zero result.
fn lenient_int(raw: Option<&str>) -> Option<i64> {
    let text = raw?.trim_start();
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let magnitude: i64 = rest[..digits_end].parse().ok()?;
    let value = if negative { -magnitude } else { magnitude };
    (value != 0).then_some(value)
}

/// Insert one analysis row and return its id. The owner, when scoped, comes
/// from the caller's identity.
pub fn create(conn: &Connection, scope: &Scope, new: &NewAnalysis) -> StoreResult<i64> {
    conn.execute(
        r#"
        INSERT INTO analysis_results (
            image_hash, image_data, prediction, confidence, analysis_mode, processing_time,
            model_used, model_author, probabilities, raw_score, timestamp,
            device_info, app_version, user_id
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
        params![
            sql_value(&new.image_hash),
            sql_value(&new.image_data),
            sql_value(&new.prediction),
            sql_value(&new.confidence),
            sql_value(&new.analysis_mode),
            sql_value(&new.processing_time),
            sql_value(&new.model_used),
            sql_value(&new.model_author),
            sql_value(&new.probabilities),
            sql_value(&new.raw_score),
            sql_value(&new.timestamp),
            json_text(&new.device_info),
            sql_value(&new.app_version),
            scope.owner(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Rows newest first. `id` breaks ties between rows created in the same
/// second.
pub fn list(conn: &Connection, scope: &Scope, page: Page) -> StoreResult<Vec<AnalysisRow>> {
    let rows = match scope.owner() {
        None => {
            let mut stmt = conn.prepare(
                "SELECT * FROM analysis_results ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
            )?;
            collect_rows(&mut stmt, params![page.limit, page.offset])?
        }
        Some(owner) => {
            let mut stmt = conn.prepare(
                "SELECT * FROM analysis_results WHERE user_id = ? \
                 ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
            )?;
            collect_rows(&mut stmt, params![owner, page.limit, page.offset])?
        }
    };
    Ok(rows)
}

fn collect_rows(
    stmt: &mut rusqlite::Statement<'_>,
    params: impl rusqlite::Params,
) -> StoreResult<Vec<AnalysisRow>> {
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let rows = stmt
        .query_map(params, |row| {
            let mut record = AnalysisRow::new();
            for (i, name) in columns.iter().enumerate() {
                record.insert(name.clone(), column_value(row.get_ref(i)?));
            }
            Ok(record)
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Delete every visible row. Irreversible; returns the number removed.
pub fn delete_all(conn: &Connection, scope: &Scope) -> StoreResult<usize> {
    let removed = match scope.owner() {
        None => conn.execute("DELETE FROM analysis_results", [])?,
        Some(owner) => conn.execute("DELETE FROM analysis_results WHERE user_id = ?", [owner])?,
    };
    Ok(removed)
}
