//! Per-employee lock registry (spec §4.3, Design Note §9): a mapping
//! from employee-id to a mutex, acquired on first use and kept for
//! the lifetime of the process.

use crate::model::EmployeeId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Default)]
pub struct EmployeeLocks {
    registry: Mutex<HashMap<EmployeeId, Arc<Mutex<()>>>>,
}

impl EmployeeLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, employee_id: EmployeeId) -> Arc<Mutex<()>> {
        let mut registry = self.registry.lock().unwrap_or_else(|p| p.into_inner());
        registry
            .entry(employee_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Acquires the lock for `employee_id`, blocking until available.
    /// The returned guard must be held for the full read-modify-write.
    pub fn acquire(&self, employee_id: EmployeeId) -> EmployeeLockGuard {
        let lock = self.lock_for(employee_id);
        EmployeeLockGuard { lock }
    }
}

/// Owns the `Arc<Mutex<()>>` for an employee so the guard returned by
/// [`EmployeeLocks::acquire`] can outlive the lookup.
pub struct EmployeeLockGuard {
    lock: Arc<Mutex<()>>,
}

impl EmployeeLockGuard {
    pub fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(|p| p.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn serializes_same_employee() {
        let locks = Arc::new(EmployeeLocks::new());
        let counter = Arc::new(AtomicUsize::new(0));
        let mut handles = Vec::new();

        for _ in 0..8 {
            let locks = Arc::clone(&locks);
            let counter = Arc::clone(&counter);
            handles.push(thread::spawn(move || {
                let handle = locks.acquire(1);
                let _guard = handle.guard();
                let before = counter.load(Ordering::SeqCst);
                thread::yield_now();
                counter.store(before + 1, Ordering::SeqCst);
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(counter.load(Ordering::SeqCst), 8);
    }
}
