//! The Store: atomic persistence of employees and time entries, with
//! per-employee locking, soft-delete, and automatic recalculation
//! (spec §3, §4.3).

mod locks;
mod retry;

use crate::error::{Error, Result};
use crate::model::{normalize_tag, validate_name, validate_tag, Action, Employee, EmployeeId, TimeEntry, TimeEntryId};
use crate::recalc::recalculate;
use chrono::{DateTime, Duration as ChronoDuration, Local, Utc};
use locks::EmployeeLocks;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

pub struct Store {
    conn: Mutex<Connection>,
    locks: EmployeeLocks,
}

/// Reserved employee id (never assigned by AUTOINCREMENT, which starts
/// at 1) used to serialize employee registration.
const REGISTRATION_LOCK_ID: EmployeeId = 0;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS employees (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        name        TEXT NOT NULL,
        rfid_tag    TEXT NOT NULL,
        is_admin    INTEGER NOT NULL,
        created_at  TEXT NOT NULL,
        active      INTEGER NOT NULL DEFAULT 1
    );
    CREATE UNIQUE INDEX IF NOT EXISTS idx_employees_rfid_tag ON employees(rfid_tag);

    CREATE TABLE IF NOT EXISTS time_entries (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        employee_id  INTEGER NOT NULL REFERENCES employees(id),
        timestamp    TEXT NOT NULL,
        action       TEXT NOT NULL CHECK (action IN ('in', 'out')),
        active       INTEGER NOT NULL DEFAULT 1
    );
    CREATE INDEX IF NOT EXISTS idx_time_entries_employee_ts ON time_entries(employee_id, timestamp);
    CREATE INDEX IF NOT EXISTS idx_time_entries_ts ON time_entries(timestamp);
";

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .map_err(|e| Error::StorageUnavailable(e.to_string()))?;
        }
        let conn = Connection::open(path).map_err(|e| Error::StorageUnavailable(e.to_string()))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| Error::StorageUnavailable(e.to_string()))?;
        conn.pragma_update(None, "busy_timeout", 0)
            .map_err(|e| Error::StorageUnavailable(e.to_string()))?;
        conn.execute_batch(SCHEMA)
            .map_err(|e| Error::StorageUnavailable(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
            locks: EmployeeLocks::new(),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| Error::StorageUnavailable(e.to_string()))?;
        conn.execute_batch(SCHEMA)
            .map_err(|e| Error::StorageUnavailable(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
            locks: EmployeeLocks::new(),
        })
    }

    // ---- Employee reads ----------------------------------------------

    pub fn get_employee_by_tag(&self, tag: &str) -> Result<Option<Employee>> {
        let tag = normalize_tag(tag);
        let conn = self.conn.lock().unwrap_or_else(|p| p.into_inner());
        retry::with_retry(|| {
            conn.query_row(
                "SELECT id, name, rfid_tag, is_admin, created_at, active \
                 FROM employees WHERE rfid_tag = ?1 AND active = 1",
                params![tag],
                row_to_employee,
            )
            .optional()
        })
    }

    pub fn get_employee(&self, id: EmployeeId) -> Result<Option<Employee>> {
        let conn = self.conn.lock().unwrap_or_else(|p| p.into_inner());
        retry::with_retry(|| {
            conn.query_row(
                "SELECT id, name, rfid_tag, is_admin, created_at, active \
                 FROM employees WHERE id = ?1",
                params![id],
                row_to_employee,
            )
            .optional()
        })
    }

    pub fn find_employees_by_name(&self, partial: &str) -> Result<Vec<Employee>> {
        let pattern = format!("%{}%", partial.to_lowercase());
        let conn = self.conn.lock().unwrap_or_else(|p| p.into_inner());
        retry::with_retry(|| {
            let mut stmt = conn.prepare(
                "SELECT id, name, rfid_tag, is_admin, created_at, active \
                 FROM employees WHERE active = 1 AND LOWER(name) LIKE ?1 ORDER BY name",
            )?;
            stmt.query_map(params![pattern], row_to_employee)?
                .collect::<rusqlite::Result<Vec<_>>>()
        })
    }

    pub fn get_admin_count(&self) -> Result<i64> {
        let conn = self.conn.lock().unwrap_or_else(|p| p.into_inner());
        retry::with_retry(|| {
            conn.query_row(
                "SELECT COUNT(*) FROM employees WHERE is_admin = 1 AND active = 1",
                [],
                |row| row.get(0),
            )
        })
    }

    // ---- Employee writes ----------------------------------------------

    pub fn create_employee(&self, name: &str, tag: &str, is_admin: bool) -> Result<Employee> {
        let name = validate_name(name)?;
        let tag = normalize_tag(tag);
        validate_tag(&tag)?;

        if self.get_admin_count()? == 0 && !is_admin {
            return Err(Error::FirstUserMustBeAdmin);
        }

        // A new employee has no id yet to lock on; serialize registration
        // itself on a reserved sentinel id so two concurrent registrations
        // for the same tag can't both pass the uniqueness check.
        let registration_lock = self.locks.acquire(REGISTRATION_LOCK_ID);
        let _guard = registration_lock.guard();

        let conn = self.conn.lock().unwrap_or_else(|p| p.into_inner());
        let now = Utc::now();

        // Tag uniqueness holds across active and inactive rows (spec
        // invariant 1); the unique index is the enforced guarantee, but
        // checking first lets us return a typed `DuplicateTag` instead
        // of a raw constraint violation.
        let existing: Option<i64> = retry::with_retry(|| {
            conn.query_row(
                "SELECT 1 FROM employees WHERE rfid_tag = ?1",
                params![tag],
                |row| row.get(0),
            )
            .optional()
        })?;
        if existing.is_some() {
            return Err(Error::DuplicateTag(tag));
        }

        let id = retry::with_retry(|| -> rusqlite::Result<i64> {
            conn.execute(
                "INSERT INTO employees (name, rfid_tag, is_admin, created_at, active) \
                 VALUES (?1, ?2, ?3, ?4, 1)",
                params![name, tag, is_admin as i64, now.to_rfc3339()],
            )?;
            Ok(conn.last_insert_rowid())
        })?;

        Ok(Employee {
            id,
            name,
            rfid_tag: tag,
            is_admin,
            created_at: now,
            active: true,
        })
    }

    pub fn update_employee_name(&self, id: EmployeeId, new_name: &str) -> Result<()> {
        let new_name = validate_name(new_name)?;
        let conn = self.conn.lock().unwrap_or_else(|p| p.into_inner());
        let affected = retry::with_retry(|| {
            conn.execute(
                "UPDATE employees SET name = ?1 WHERE id = ?2 AND active = 1",
                params![new_name, id],
            )
        })?;
        if affected == 0 {
            return Err(Error::InvalidInput(format!("no active employee with id {id}")));
        }
        Ok(())
    }

    // ---- Time entry reads ----------------------------------------------

    pub fn get_last_active_entry(&self, employee_id: EmployeeId) -> Result<Option<TimeEntry>> {
        let conn = self.conn.lock().unwrap_or_else(|p| p.into_inner());
        retry::with_retry(|| {
            conn.query_row(
                "SELECT id, employee_id, timestamp, action, active FROM time_entries \
                 WHERE employee_id = ?1 AND active = 1 \
                 ORDER BY timestamp DESC, id DESC LIMIT 1",
                params![employee_id],
                row_to_entry,
            )
            .optional()
        })
    }

    pub fn list_entries(
        &self,
        employee_id: EmployeeId,
        since: DateTime<Local>,
        until: DateTime<Local>,
    ) -> Result<Vec<TimeEntry>> {
        let conn = self.conn.lock().unwrap_or_else(|p| p.into_inner());
        retry::with_retry(|| {
            let mut stmt = conn.prepare(
                "SELECT id, employee_id, timestamp, action, active FROM time_entries \
                 WHERE employee_id = ?1 AND active = 1 AND timestamp >= ?2 AND timestamp <= ?3 \
                 ORDER BY timestamp ASC, id ASC",
            )?;
            stmt.query_map(
                params![employee_id, since.to_rfc3339(), until.to_rfc3339()],
                row_to_entry,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()
        })
    }

    pub fn list_all_active_entries(&self) -> Result<Vec<(TimeEntry, Employee)>> {
        let conn = self.conn.lock().unwrap_or_else(|p| p.into_inner());
        retry::with_retry(|| {
            let mut stmt = conn.prepare(
                "SELECT t.id, t.employee_id, t.timestamp, t.action, t.active, \
                        e.id, e.name, e.rfid_tag, e.is_admin, e.created_at, e.active \
                 FROM time_entries t JOIN employees e ON e.id = t.employee_id \
                 WHERE t.active = 1 \
                 ORDER BY t.timestamp DESC, t.id DESC",
            )?;
            stmt.query_map([], |row| {
                let entry = row_to_entry(row)?;
                let employee = Employee {
                    id: row.get(5)?,
                    name: row.get(6)?,
                    rfid_tag: row.get(7)?,
                    is_admin: row.get::<_, i64>(8)? != 0,
                    created_at: parse_utc(&row.get::<_, String>(9)?),
                    active: row.get::<_, i64>(10)? != 0,
                };
                Ok((entry, employee))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()
        })
    }

    // ---- Clock actions --------------------------------------------------

    /// Determines the next action and inserts the entry, all under the
    /// employee lock and inside a single transaction (spec §4.3: "action
    /// determination and insert must be a single critical section").
    pub fn create_clock_entry(&self, employee: &Employee) -> Result<TimeEntry> {
        if !employee.active {
            return Err(Error::InactiveEmployee(employee.id));
        }

        let lock = self.locks.acquire(employee.id);
        let _guard = lock.guard();

        let now = Local::now();
        let employee_id = employee.id;
        let mut conn = self.conn.lock().unwrap_or_else(|p| p.into_inner());

        retry::with_retry(move || -> rusqlite::Result<TimeEntry> {
            let tx = conn.transaction()?;

            let last: Option<String> = tx
                .query_row(
                    "SELECT action FROM time_entries \
                     WHERE employee_id = ?1 AND active = 1 \
                     ORDER BY timestamp DESC, id DESC LIMIT 1",
                    params![employee_id],
                    |row| row.get(0),
                )
                .optional()?;

            let action = match last.as_deref() {
                None | Some("out") => Action::In,
                _ => Action::Out,
            };

            tx.execute(
                "INSERT INTO time_entries (employee_id, timestamp, action, active) \
                 VALUES (?1, ?2, ?3, 1)",
                params![employee_id, now.to_rfc3339(), action.as_str()],
            )?;
            let id = tx.last_insert_rowid();
            tx.commit()?;

            Ok(TimeEntry {
                id,
                employee_id,
                timestamp: now,
                action,
                active: true,
            })
        })
    }

    /// Inserts a manually-entered time entry and recalculates the
    /// employee's action sequence in the same transaction.
    pub fn insert_manual_entry(
        &self,
        employee_id: EmployeeId,
        timestamp: DateTime<Local>,
    ) -> Result<TimeEntry> {
        let employee = self
            .get_employee(employee_id)?
            .ok_or_else(|| Error::InvalidInput(format!("no employee with id {employee_id}")))?;
        if !employee.active {
            return Err(Error::InactiveEmployee(employee_id));
        }
        validate_timestamp(timestamp)?;

        let lock = self.locks.acquire(employee_id);
        let _guard = lock.guard();
        let mut conn = self.conn.lock().unwrap_or_else(|p| p.into_inner());

        retry::with_retry(move || -> rusqlite::Result<TimeEntry> {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO time_entries (employee_id, timestamp, action, active) \
                 VALUES (?1, ?2, 'in', 1)",
                params![employee_id, timestamp.to_rfc3339()],
            )?;
            let id = tx.last_insert_rowid();

            recalculate(&tx, employee_id)?;

            let action: String = tx.query_row(
                "SELECT action FROM time_entries WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )?;
            tx.commit()?;

            Ok(TimeEntry {
                id,
                employee_id,
                timestamp,
                action: Action::parse(&action).unwrap_or(Action::In),
                active: true,
            })
        })
        .map_err(remap_recalculation_error(employee_id))
    }

    /// Soft-deletes the given entry ids and recalculates each affected
    /// employee's action sequence. Returns the number of rows deleted.
    pub fn soft_delete_entries(&self, ids: &[TimeEntryId]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let conn = self.conn.lock().unwrap_or_else(|p| p.into_inner());
        let mut by_employee: HashMap<EmployeeId, Vec<TimeEntryId>> = HashMap::new();
        {
            for &id in ids {
                let employee_id: Option<EmployeeId> = conn
                    .query_row(
                        "SELECT employee_id FROM time_entries WHERE id = ?1 AND active = 1",
                        params![id],
                        |row| row.get(0),
                    )
                    .optional()
                    .map_err(|e| Error::StorageUnavailable(e.to_string()))?;
                if let Some(employee_id) = employee_id {
                    by_employee.entry(employee_id).or_default().push(id);
                }
            }
        }
        drop(conn);

        let mut total = 0usize;
        for (employee_id, ids) in by_employee {
            let lock = self.locks.acquire(employee_id);
            let _guard = lock.guard();
            let mut conn = self.conn.lock().unwrap_or_else(|p| p.into_inner());

            let deleted = retry::with_retry(|| -> rusqlite::Result<usize> {
                let tx = conn.transaction()?;
                let mut deleted = 0;
                for &id in &ids {
                    deleted += tx.execute(
                        "UPDATE time_entries SET active = 0 WHERE id = ?1 AND active = 1",
                        params![id],
                    )?;
                }
                recalculate(&tx, employee_id)?;
                tx.commit()?;
                Ok(deleted)
            })
            .map_err(remap_recalculation_error(employee_id))?;

            total += deleted;
        }

        Ok(total)
    }
}

/// Marker used to distinguish a genuine recalculation failure (which
/// should surface typed, per spec §7) from an ordinary storage error
/// that was already retried to exhaustion.
fn remap_recalculation_error(employee_id: EmployeeId) -> impl FnOnce(Error) -> Error {
    move |err| match err {
        Error::StorageUnavailable(msg) => Error::RecalculationFailed(employee_id, msg),
        other => other,
    }
}

fn validate_timestamp(timestamp: DateTime<Local>) -> Result<()> {
    let now = Local::now();
    let earliest = now - ChronoDuration::days(365);
    let latest = now + ChronoDuration::days(1);
    if timestamp < earliest || timestamp > latest {
        return Err(Error::InvalidInput(
            "timestamp must be within [now - 365d, now + 1d]".into(),
        ));
    }
    Ok(())
}

fn row_to_employee(row: &rusqlite::Row) -> rusqlite::Result<Employee> {
    Ok(Employee {
        id: row.get(0)?,
        name: row.get(1)?,
        rfid_tag: row.get(2)?,
        is_admin: row.get::<_, i64>(3)? != 0,
        created_at: parse_utc(&row.get::<_, String>(4)?),
        active: row.get::<_, i64>(5)? != 0,
    })
}

fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<TimeEntry> {
    Ok(TimeEntry {
        id: row.get(0)?,
        employee_id: row.get(1)?,
        timestamp: parse_local(&row.get::<_, String>(2)?),
        action: Action::parse(&row.get::<_, String>(3)?).unwrap_or(Action::In),
        active: row.get::<_, i64>(4)? != 0,
    })
}

fn parse_utc(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn parse_local(s: &str) -> DateTime<Local> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Local))
        .unwrap_or_else(|_| Local::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn local(y: i32, m: u32, d: u32, h: u32, mi: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, h, mi, 0).unwrap()
    }

    #[test]
    fn s6_first_run_enforces_admin() {
        let store = Store::open_in_memory().unwrap();
        let err = store
            .create_employee("X", "T0001", false)
            .unwrap_err();
        assert!(matches!(err, Error::FirstUserMustBeAdmin));

        let admin = store.create_employee("X", "T0001", true).unwrap();
        assert!(admin.is_admin);
        assert_eq!(store.get_admin_count().unwrap(), 1);

        // Once an admin exists, a non-admin registration succeeds.
        let bob = store.create_employee("Bob", "T0002", false).unwrap();
        assert!(!bob.is_admin);
    }

    #[test]
    fn duplicate_tag_rejected_active_and_inactive() {
        let store = Store::open_in_memory().unwrap();
        store.create_employee("Alice", "AAAA1111", true).unwrap();

        let err = store
            .create_employee("Someone Else", "aaaa1111", false)
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateTag(_)));
    }

    #[test]
    fn tag_is_normalized_on_lookup_and_create() {
        let store = Store::open_in_memory().unwrap();
        store.create_employee("Alice", "aaaa1111", true).unwrap();
        let found = store.get_employee_by_tag("AaAa1111").unwrap().unwrap();
        assert_eq!(found.rfid_tag, "AAAA1111");
    }

    #[test]
    fn name_and_tag_validation() {
        let store = Store::open_in_memory().unwrap();
        assert!(matches!(
            store.create_employee("   ", "AAAA1111", true).unwrap_err(),
            Error::InvalidInput(_)
        ));
        assert!(matches!(
            store.create_employee("Alice", "AB", true).unwrap_err(),
            Error::InvalidInput(_)
        ));
    }

    #[test]
    fn s1_simple_in_out_in_out() {
        let store = Store::open_in_memory().unwrap();
        let alice = store.create_employee("Alice", "AAAA1111", true).unwrap();

        store.insert_manual_entry(alice.id, local(2024, 1, 15, 10, 0)).unwrap();
        store.insert_manual_entry(alice.id, local(2024, 1, 15, 12, 0)).unwrap();
        store.insert_manual_entry(alice.id, local(2024, 1, 15, 13, 0)).unwrap();
        store.insert_manual_entry(alice.id, local(2024, 1, 15, 17, 0)).unwrap();

        let entries = store
            .list_entries(
                alice.id,
                local(2024, 1, 15, 0, 0),
                local(2024, 1, 15, 23, 59),
            )
            .unwrap();
        assert_eq!(entries.len(), 4);
        assert_eq!(
            entries.iter().map(|e| e.action).collect::<Vec<_>>(),
            vec![Action::In, Action::Out, Action::In, Action::Out]
        );
    }

    #[test]
    fn inactive_employee_cannot_clock_or_get_manual_entry() {
        let store = Store::open_in_memory().unwrap();
        let alice = store.create_employee("Alice", "AAAA1111", true).unwrap();
        store
            .conn
            .lock()
            .unwrap()
            .execute(
                "UPDATE employees SET active = 0 WHERE id = ?1",
                params![alice.id],
            )
            .unwrap();

        let err = store
            .insert_manual_entry(alice.id, local(2024, 1, 15, 10, 0))
            .unwrap_err();
        assert!(matches!(err, Error::InactiveEmployee(_)));

        let refetched = store.get_employee(alice.id).unwrap().unwrap();
        let err = store.create_clock_entry(&refetched).unwrap_err();
        assert!(matches!(err, Error::InactiveEmployee(_)));
    }

    #[test]
    fn timestamp_out_of_range_rejected() {
        let store = Store::open_in_memory().unwrap();
        let alice = store.create_employee("Alice", "AAAA1111", true).unwrap();

        let too_old = Local::now() - ChronoDuration::days(400);
        let err = store.insert_manual_entry(alice.id, too_old).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        let too_new = Local::now() + ChronoDuration::days(2);
        let err = store.insert_manual_entry(alice.id, too_new).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn soft_delete_is_invisible_and_recalculates() {
        // s4: 08:00 in, 08:01 in, 12:00 out, 12:01 out, 13:00 in, 17:00 out
        let store = Store::open_in_memory().unwrap();
        let alice = store.create_employee("Alice", "AAAA1111", true).unwrap();

        let e1 = store.insert_manual_entry(alice.id, local(2024, 1, 15, 8, 0)).unwrap();
        let e2 = store.insert_manual_entry(alice.id, local(2024, 1, 15, 8, 1)).unwrap();
        let e3 = store.insert_manual_entry(alice.id, local(2024, 1, 15, 12, 0)).unwrap();
        let e4 = store.insert_manual_entry(alice.id, local(2024, 1, 15, 12, 1)).unwrap();
        store.insert_manual_entry(alice.id, local(2024, 1, 15, 13, 0)).unwrap();
        store.insert_manual_entry(alice.id, local(2024, 1, 15, 17, 0)).unwrap();

        // Soft-delete the 2nd session's ids (e2, e4).
        let deleted = store.soft_delete_entries(&[e2.id, e4.id]).unwrap();
        assert_eq!(deleted, 2);

        let remaining = store
            .list_entries(
                alice.id,
                local(2024, 1, 15, 0, 0),
                local(2024, 1, 15, 23, 59),
            )
            .unwrap();
        assert_eq!(remaining.len(), 4);
        assert!(!remaining.iter().any(|e| e.id == e2.id || e.id == e4.id));
        assert_eq!(
            remaining.iter().map(|e| e.action).collect::<Vec<_>>(),
            vec![Action::In, Action::Out, Action::In, Action::Out]
        );

        // e1/e3's actions survive unrelated recalculation.
        assert!(remaining.iter().any(|e| e.id == e1.id && e.action == Action::In));
        assert!(remaining.iter().any(|e| e.id == e3.id && e.action == Action::Out));
    }

    #[test]
    fn soft_delete_is_idempotent_on_already_deleted_ids() {
        let store = Store::open_in_memory().unwrap();
        let alice = store.create_employee("Alice", "AAAA1111", true).unwrap();
        let entry = store.insert_manual_entry(alice.id, local(2024, 1, 15, 8, 0)).unwrap();

        assert_eq!(store.soft_delete_entries(&[entry.id]).unwrap(), 1);
        assert_eq!(store.soft_delete_entries(&[entry.id]).unwrap(), 0);
    }

    #[test]
    fn list_entries_excludes_other_employees() {
        let store = Store::open_in_memory().unwrap();
        let alice = store.create_employee("Alice", "AAAA1111", true).unwrap();
        let bob = store.create_employee("Bob", "BBBB2222", false).unwrap();

        store.insert_manual_entry(alice.id, local(2024, 1, 15, 8, 0)).unwrap();
        store.insert_manual_entry(bob.id, local(2024, 1, 15, 9, 0)).unwrap();

        let alice_entries = store
            .list_entries(alice.id, local(2024, 1, 1, 0, 0), local(2024, 12, 31, 0, 0))
            .unwrap();
        assert_eq!(alice_entries.len(), 1);
        assert_eq!(alice_entries[0].employee_id, alice.id);
    }

    #[test]
    fn update_employee_name_validates_and_applies() {
        let store = Store::open_in_memory().unwrap();
        let alice = store.create_employee("Alice", "AAAA1111", true).unwrap();

        store.update_employee_name(alice.id, "  Alice Smith  ").unwrap();
        let updated = store.get_employee(alice.id).unwrap().unwrap();
        assert_eq!(updated.name, "Alice Smith");
        assert_eq!(updated.rfid_tag, "AAAA1111");

        assert!(matches!(
            store.update_employee_name(alice.id, "   ").unwrap_err(),
            Error::InvalidInput(_)
        ));
    }

    #[test]
    fn manual_entry_tie_break_takes_next_monotonic_id() {
        // Two entries at the exact same timestamp: the later insert
        // (higher id) must sort after the earlier one and the
        // alternation must still hold (spec §9 open question).
        let store = Store::open_in_memory().unwrap();
        let alice = store.create_employee("Alice", "AAAA1111", true).unwrap();
        let ts = local(2024, 1, 15, 8, 0);

        let e1 = store.insert_manual_entry(alice.id, ts).unwrap();
        let e2 = store.insert_manual_entry(alice.id, ts).unwrap();

        assert!(e2.id > e1.id);
        let entries = store
            .list_entries(alice.id, local(2024, 1, 15, 0, 0), local(2024, 1, 15, 23, 59))
            .unwrap();
        assert_eq!(entries[0].id, e1.id);
        assert_eq!(entries[0].action, Action::In);
        assert_eq!(entries[1].id, e2.id);
        assert_eq!(entries[1].action, Action::Out);
    }
}
