//! In-memory application state (spec §2 `AppState`, §9 "global
//! state"): the last-clocked employee (with expiry), the
//! pending-identification handle, and the recent-scan debounce table.
//! Owned exclusively by the `EventDispatcher`; no other component may
//! mutate it (spec §3 "Ownership").

use crate::model::{Employee, EmployeeId};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// The UI adapter's current screen, used by [`crate::router::ScanRouter`]
/// to decide what a tag read means (spec §4.2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Timeclock,
    Register,
    Identify,
    Admin,
    /// Awaiting re-scan of the tag belonging to `employee_id` before
    /// entering the manual entry editor (spec §4.2, §7
    /// `PendingIdentificationMismatch`).
    EntryEditPending { employee_id: EmployeeId },
}

struct Expiring<T> {
    value: T,
    set_at: Instant,
    ttl: Duration,
}

impl<T> Expiring<T> {
    fn new(value: T, ttl: Duration) -> Self {
        Self {
            value,
            set_at: Instant::now(),
            ttl,
        }
    }

    fn get(&self) -> Option<&T> {
        if self.set_at.elapsed() < self.ttl {
            Some(&self.value)
        } else {
            None
        }
    }
}

/// Process-wide, dispatcher-owned state. Constructed once via
/// [`AppState::init_on_app_start`] and torn down via
/// [`AppState::drop_on_app_stop`] (spec §9 "Global state").
pub struct AppState {
    mode: Mode,
    last_clocked: Option<Expiring<Employee>>,
    last_clocked_ttl: Duration,
    pending_identification: Option<Expiring<EmployeeId>>,
    pending_identification_ttl: Duration,
    /// tag -> last-accepted instant, for the ScanRouter debounce
    /// (spec §4.2 step 1). Entries are lazily pruned on lookup.
    recent_scans: HashMap<String, Instant>,
    debounce_window: Duration,
}

impl AppState {
    /// Constructs the initial state for process start-up.
    pub fn init_on_app_start(
        debounce_window: Duration,
        last_clocked_ttl: Duration,
        pending_identification_ttl: Duration,
    ) -> Self {
        Self {
            mode: Mode::Timeclock,
            last_clocked: None,
            last_clocked_ttl,
            pending_identification: None,
            pending_identification_ttl,
            recent_scans: HashMap::new(),
            debounce_window,
        }
    }

    /// Releases all in-memory state. Provided for symmetry with
    /// `init_on_app_start`; the dispatcher calls this on shutdown so
    /// the lifecycle is explicit rather than relying on `Drop` alone.
    pub fn drop_on_app_stop(self) {
        drop(self);
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Returns true and records `tag` as accepted if it was not seen
    /// within the debounce window; returns false (drop the scan) if it
    /// was (spec §4.2 step 1).
    pub fn accept_scan(&mut self, tag: &str) -> bool {
        let now = Instant::now();
        if let Some(last) = self.recent_scans.get(tag) {
            if now.duration_since(*last) < self.debounce_window {
                return false;
            }
        }
        self.recent_scans.insert(tag.to_string(), now);
        self.prune_recent_scans(now);
        true
    }

    fn prune_recent_scans(&mut self, now: Instant) {
        let window = self.debounce_window;
        self.recent_scans
            .retain(|_, seen_at| now.duration_since(*seen_at) < window);
    }

    pub fn set_last_clocked(&mut self, employee: Employee) {
        self.last_clocked = Some(Expiring::new(employee, self.last_clocked_ttl));
    }

    pub fn last_clocked(&self) -> Option<&Employee> {
        self.last_clocked.as_ref().and_then(Expiring::get)
    }

    pub fn set_pending_identification(&mut self, employee_id: EmployeeId) {
        self.pending_identification =
            Some(Expiring::new(employee_id, self.pending_identification_ttl));
    }

    pub fn pending_identification(&self) -> Option<EmployeeId> {
        self.pending_identification.as_ref().and_then(Expiring::get).copied()
    }

    pub fn clear_pending_identification(&mut self) {
        self.pending_identification = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn employee(id: EmployeeId) -> Employee {
        Employee {
            id,
            name: "Test".into(),
            rfid_tag: "AAAA1111".into(),
            is_admin: false,
            created_at: Utc::now(),
            active: true,
        }
    }

    #[test]
    fn debounce_drops_repeat_within_window() {
        let mut state = AppState::init_on_app_start(
            Duration::from_millis(1_200),
            Duration::from_secs(120),
            Duration::from_secs(30),
        );
        assert!(state.accept_scan("AAAA1111"));
        assert!(!state.accept_scan("AAAA1111"));
    }

    #[test]
    fn debounce_allows_after_window_elapses() {
        let mut state = AppState::init_on_app_start(
            Duration::from_millis(20),
            Duration::from_secs(120),
            Duration::from_secs(30),
        );
        assert!(state.accept_scan("AAAA1111"));
        std::thread::sleep(Duration::from_millis(40));
        assert!(state.accept_scan("AAAA1111"));
    }

    #[test]
    fn last_clocked_expires() {
        let mut state = AppState::init_on_app_start(
            Duration::from_millis(1_200),
            Duration::from_millis(20),
            Duration::from_secs(30),
        );
        state.set_last_clocked(employee(1));
        assert!(state.last_clocked().is_some());
        std::thread::sleep(Duration::from_millis(40));
        assert!(state.last_clocked().is_none());
    }

    #[test]
    fn pending_identification_expires() {
        let mut state = AppState::init_on_app_start(
            Duration::from_millis(1_200),
            Duration::from_secs(120),
            Duration::from_millis(20),
        );
        state.set_pending_identification(7);
        assert_eq!(state.pending_identification(), Some(7));
        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(state.pending_identification(), None);
    }

    #[test]
    fn mode_defaults_to_timeclock() {
        let state = AppState::init_on_app_start(
            Duration::from_millis(1_200),
            Duration::from_secs(120),
            Duration::from_secs(30),
        );
        assert_eq!(*state.mode(), Mode::Timeclock);
    }
}
