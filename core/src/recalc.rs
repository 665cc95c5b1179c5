//! ActionRecalculator (spec §4.4).
//!
//! Runs inside the same transaction as the write that triggered it, so
//! it can never leave a partially-recalculated employee behind: either
//! the whole transaction (primary write plus recalculation) commits,
//! or none of it does.

use crate::model::{Action, EmployeeId};
use rusqlite::{params, Transaction};

/// Rewrites `action` fields for `employee_id`'s active entries, in
/// `(timestamp ASC, id ASC)` order, so they alternate starting with
/// `in`. Scans first and only writes when a violation exists (never
/// touches rows, never logs, on a no-op).
pub fn recalculate(tx: &Transaction, employee_id: EmployeeId) -> rusqlite::Result<()> {
    let mut stmt = tx.prepare(
        "SELECT id, action FROM time_entries \
         WHERE employee_id = ?1 AND active = 1 \
         ORDER BY timestamp ASC, id ASC",
    )?;
    let rows: Vec<(i64, String)> = stmt
        .query_map(params![employee_id], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })?
        .collect::<rusqlite::Result<_>>()?;
    drop(stmt);

    let mut expected = Action::In;
    let mut corrections: Vec<(i64, &'static str)> = Vec::new();
    for (id, action_str) in &rows {
        let current = Action::parse(action_str).unwrap_or(Action::In);
        if current != expected {
            corrections.push((*id, expected.as_str()));
        }
        expected = expected.flip();
    }

    if corrections.is_empty() {
        return Ok(());
    }

    log::warn!(
        "recalculating {} action(s) for employee {employee_id} to restore alternation",
        corrections.len()
    );

    for (id, action) in corrections {
        tx.execute(
            "UPDATE time_entries SET action = ?1 WHERE id = ?2",
            params![action, id],
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE time_entries (
                id INTEGER PRIMARY KEY,
                employee_id INTEGER NOT NULL,
                timestamp TEXT NOT NULL,
                action TEXT NOT NULL,
                active INTEGER NOT NULL DEFAULT 1
            );",
        )
        .unwrap();
        conn
    }

    fn insert(conn: &Connection, id: i64, ts: &str, action: &str, active: bool) {
        conn.execute(
            "INSERT INTO time_entries (id, employee_id, timestamp, action, active) \
             VALUES (?1, 1, ?2, ?3, ?4)",
            rusqlite::params![id, ts, action, active as i64],
        )
        .unwrap();
    }

    fn actions(conn: &Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare(
                "SELECT action FROM time_entries WHERE employee_id = 1 AND active = 1 \
                 ORDER BY timestamp ASC, id ASC",
            )
            .unwrap();
        stmt.query_map([], |r| r.get(0))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap()
    }

    #[test]
    fn no_op_when_already_alternating() {
        let mut conn = setup();
        insert(&conn, 1, "2024-01-01T08:00:00+00:00", "in", true);
        insert(&conn, 2, "2024-01-01T12:00:00+00:00", "out", true);
        let tx = conn.transaction().unwrap();
        recalculate(&tx, 1).unwrap();
        tx.commit().unwrap();
        assert_eq!(actions(&conn), vec!["in", "out"]);
    }

    #[test]
    fn fixes_duplicate_in_after_delete() {
        // Original sequence before a soft delete: in, in, out, out, in, out
        // After deleting the 2nd session's ids (2,3 below removed as inactive),
        // the remaining rows must be re-alternated.
        let mut conn = setup();
        insert(&conn, 1, "2024-01-01T08:00:00+00:00", "in", true);
        insert(&conn, 2, "2024-01-01T08:01:00+00:00", "in", false);
        insert(&conn, 3, "2024-01-01T12:00:00+00:00", "out", true);
        insert(&conn, 4, "2024-01-01T12:01:00+00:00", "out", false);
        insert(&conn, 5, "2024-01-01T13:00:00+00:00", "in", true);
        insert(&conn, 6, "2024-01-01T17:00:00+00:00", "out", true);
        let tx = conn.transaction().unwrap();
        recalculate(&tx, 1).unwrap();
        tx.commit().unwrap();
        assert_eq!(actions(&conn), vec!["in", "out", "in", "out"]);
    }

    #[test]
    fn idempotent() {
        let mut conn = setup();
        insert(&conn, 1, "2024-01-01T08:00:00+00:00", "out", true);
        insert(&conn, 2, "2024-01-01T12:00:00+00:00", "out", true);

        let tx = conn.transaction().unwrap();
        recalculate(&tx, 1).unwrap();
        tx.commit().unwrap();
        let first_pass = actions(&conn);

        let tx = conn.transaction().unwrap();
        recalculate(&tx, 1).unwrap();
        tx.commit().unwrap();
        let second_pass = actions(&conn);

        assert_eq!(first_pass, second_pass);
        assert_eq!(first_pass, vec!["in", "out"]);
    }
}
