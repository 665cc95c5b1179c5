//! ScanRouter (spec §4.2): debounces scans and dispatches them based
//! on the current [`Mode`], producing a [`ScanOutcome`] for the caller
//! (the `EventDispatcher`/UI adapter) to act on — popups, LED
//! feedback, screen transitions. The router itself never touches a
//! screen; it only decides *what happened*.

use crate::clock::ClockEngine;
use crate::error::Error;
use crate::model::Employee;
use crate::rfid::TagSource;
use crate::state::{AppState, Mode};
use crate::store::Store;

/// The result of routing one (already-normalized) tag read through
/// the current mode. The dispatcher/UI adapter maps each variant to a
/// popup, screen transition, and/or LED command.
#[derive(Debug)]
pub enum ScanOutcome {
    /// The tag was seen again inside the debounce window; nothing
    /// happened (spec §4.2 step 1).
    Debounced,
    /// `timeclock` mode, no active employee for this tag.
    UnknownTag,
    /// `timeclock` mode, tag belongs to an admin; mode switches.
    SwitchedToAdmin(Employee),
    /// `timeclock` mode, ordinary clock action performed.
    Clocked(crate::clock::ClockResult),
    /// `timeclock` mode, the clock action failed (e.g. the employee
    /// was deactivated between lookup and action).
    ClockFailed(Error),
    /// `register` mode, tag staged on the registration form.
    RegistrationTagStaged(String),
    /// `register` mode, tag already belongs to an employee.
    RegistrationRejected(Employee),
    /// `identify` mode, read-only display of the scanned employee.
    IdentifyDisplay(Employee),
    /// `identify` mode, unknown tag.
    IdentifyUnknown,
    /// `admin` mode, an employee tag was scanned: info popup asking
    /// the operator to switch to clock mode.
    AdminSwitchPrompt,
    /// `admin` mode, another admin tag was scanned: stay.
    AdminStay,
    /// `entry_edit_pending` mode, the scanned tag matched the pending
    /// identification; proceed to the entry editor.
    EntryEditReady(Employee),
    /// `entry_edit_pending` mode, the scanned tag did not match.
    PendingIdentificationMismatch,
}

pub struct ScanRouter;

impl ScanRouter {
    /// Routes a single already-normalized tag read through the
    /// current mode (spec §4.2). Applies the debounce check first,
    /// then dispatches; issues LED feedback via `tag_source` as each
    /// branch's contract requires.
    pub fn handle_scan(
        state: &mut AppState,
        store: &Store,
        tag_source: &dyn TagSource,
        tag: &str,
    ) -> ScanOutcome {
        if !state.accept_scan(tag) {
            return ScanOutcome::Debounced;
        }

        let outcome = match state.mode().clone() {
            Mode::Timeclock => Self::handle_timeclock(state, store, tag_source, tag),
            Mode::Register => Self::handle_register(store, tag_source, tag),
            Mode::Identify => Self::handle_identify(store, tag),
            Mode::Admin => Self::handle_admin(store, tag),
            Mode::EntryEditPending { employee_id } => {
                Self::handle_entry_edit_pending(state, store, employee_id, tag)
            }
        };

        outcome
    }

    fn handle_timeclock(
        state: &mut AppState,
        store: &Store,
        tag_source: &dyn TagSource,
        tag: &str,
    ) -> ScanOutcome {
        let employee = match store.get_employee_by_tag(tag) {
            Ok(Some(employee)) => employee,
            Ok(None) => {
                tag_source.indicate_error();
                return ScanOutcome::UnknownTag;
            }
            Err(e) => {
                log::error!("lookup failed for tag {tag}: {e}");
                tag_source.indicate_error();
                return ScanOutcome::UnknownTag;
            }
        };

        if employee.is_admin {
            state.set_mode(Mode::Admin);
            tag_source.indicate_success();
            return ScanOutcome::SwitchedToAdmin(employee);
        }

        match ClockEngine::perform_clock_action(store, &employee) {
            Ok(result) => {
                state.set_last_clocked(result.employee.clone());
                tag_source.indicate_success();
                ScanOutcome::Clocked(result)
            }
            Err(e) => {
                tag_source.indicate_error();
                ScanOutcome::ClockFailed(e)
            }
        }
    }

    fn handle_register(store: &Store, tag_source: &dyn TagSource, tag: &str) -> ScanOutcome {
        match store.get_employee_by_tag(tag) {
            Ok(Some(employee)) => {
                tag_source.indicate_error();
                ScanOutcome::RegistrationRejected(employee)
            }
            Ok(None) => {
                tag_source.indicate_success();
                ScanOutcome::RegistrationTagStaged(tag.to_string())
            }
            Err(e) => {
                log::error!("registration lookup failed for tag {tag}: {e}");
                tag_source.indicate_error();
                ScanOutcome::RegistrationTagStaged(tag.to_string())
            }
        }
    }

    fn handle_identify(store: &Store, tag: &str) -> ScanOutcome {
        match store.get_employee_by_tag(tag) {
            Ok(Some(employee)) => ScanOutcome::IdentifyDisplay(employee),
            _ => ScanOutcome::IdentifyUnknown,
        }
    }

    fn handle_admin(store: &Store, tag: &str) -> ScanOutcome {
        match store.get_employee_by_tag(tag) {
            Ok(Some(employee)) if employee.is_admin => ScanOutcome::AdminStay,
            Ok(Some(_employee)) => ScanOutcome::AdminSwitchPrompt,
            _ => ScanOutcome::AdminSwitchPrompt,
        }
    }

    fn handle_entry_edit_pending(
        state: &mut AppState,
        store: &Store,
        pending_employee_id: crate::model::EmployeeId,
        tag: &str,
    ) -> ScanOutcome {
        match store.get_employee_by_tag(tag) {
            Ok(Some(employee)) if employee.id == pending_employee_id => {
                state.clear_pending_identification();
                state.set_mode(Mode::Timeclock);
                ScanOutcome::EntryEditReady(employee)
            }
            _ => ScanOutcome::PendingIdentificationMismatch,
        }
    }
}
