//! ClockEngine: determines IN/OUT and persists the result.

use crate::error::Result;
use crate::model::{Action, Employee, TimeEntry};
use crate::store::Store;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockResult {
    pub success: bool,
    pub action: Action,
    pub entry: TimeEntry,
    pub employee: Employee,
}

pub struct ClockEngine;

impl ClockEngine {
    /// Performs a clock action for `employee`: validates activity,
    /// determines IN/OUT, and inserts the entry as a single critical
    /// section under the employee's lock.
    pub fn perform_clock_action(store: &Store, employee: &Employee) -> Result<ClockResult> {
        let entry = store.create_clock_entry(employee)?;
        Ok(ClockResult {
            success: true,
            action: entry.action,
            entry,
            employee: employee.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Action;

    #[test]
    fn alternates_in_out_in_out() {
        let store = Store::open_in_memory().unwrap();
        let employee = store.create_employee("Alice", "AAAA1111", true).unwrap();

        let r1 = ClockEngine::perform_clock_action(&store, &employee).unwrap();
        let r2 = ClockEngine::perform_clock_action(&store, &employee).unwrap();
        let r3 = ClockEngine::perform_clock_action(&store, &employee).unwrap();
        let r4 = ClockEngine::perform_clock_action(&store, &employee).unwrap();

        assert_eq!(r1.action, Action::In);
        assert_eq!(r2.action, Action::Out);
        assert_eq!(r3.action, Action::In);
        assert_eq!(r4.action, Action::Out);
    }

    #[test]
    fn rejects_inactive_employee() {
        let store = Store::open_in_memory().unwrap();
        let mut employee = store.create_employee("Bob", "BBBB2222", true).unwrap();
        employee.active = false;

        let err = ClockEngine::perform_clock_action(&store, &employee).unwrap_err();
        assert!(matches!(err, crate::error::Error::InactiveEmployee(_)));
    }

    #[test]
    fn concurrent_clocks_stay_alternating() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(Store::open_in_memory().unwrap());
        let employee = store.create_employee("Concurrent", "CCCC3333", true).unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            let employee = employee.clone();
            handles.push(thread::spawn(move || {
                ClockEngine::perform_clock_action(&store, &employee).unwrap();
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        let since = chrono::Local::now() - chrono::Duration::days(1);
        let until = chrono::Local::now() + chrono::Duration::days(1);
        let entries = store.list_entries(employee.id, since, until).unwrap();
        assert_eq!(entries.len(), 8);

        let mut expected = Action::In;
        for entry in entries {
            assert_eq!(entry.action, expected);
            expected = expected.flip();
        }
    }
}
