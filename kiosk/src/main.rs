//! `timeclock-kiosk`: a headless host process that wires a
//! [`TagSource`] into a [`ScanRouter`] into an [`EventDispatcher`],
//! the same wiring a touchscreen GUI adapter would perform, but
//! driving the console instead (spec §1 Out-of-scope: "the touchscreen
//! GUI... thin adapters over the core").

use once_cell::sync::OnceCell;
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use timeclock_core::dispatcher::EventDispatcher;
use timeclock_core::router::{ScanOutcome, ScanRouter};
use timeclock_core::rfid::{self, TagSource};
use timeclock_core::state::AppState;
use timeclock_core::{AppConfig, Store};

fn main() -> ExitCode {
    timeclock_core::logging::init();
    let config = AppConfig::load();

    let store = match Store::open(&config.storage_path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("fatal: could not open storage at {:?}: {e}", config.storage_path);
            return ExitCode::from(1);
        }
    };

    if let Err(e) = ensure_first_run_admin(&store) {
        eprintln!("fatal: first-run registration failed: {e}");
        return ExitCode::from(2);
    }

    if let Some(log_dir) = config.storage_path.parent() {
        if let Err(e) = timeclock_core::logging::init_scan_log(log_dir) {
            log::warn!("scan audit log unavailable: {e}");
        }
    }

    let state = AppState::init_on_app_start(
        Duration::from_millis(config.debounce_ms),
        Duration::from_secs(config.last_clocked_expiry_secs),
        Duration::from_secs(config.pending_identification_expiry_secs),
    );

    let (dispatcher, handle) = EventDispatcher::start(state, store);

    // The TagSource's callback needs to call back into the very
    // TagSource it belongs to (for LED feedback), so it is
    // constructed with a placeholder cell and filled in immediately
    // after `rfid::open` returns — the same deferred-handle pattern
    // the teacher's `MockRfidReader::set_app_handle` uses.
    let tag_source_cell: Arc<OnceCell<Box<dyn TagSource>>> = Arc::new(OnceCell::new());
    let cell_for_callback = Arc::clone(&tag_source_cell);
    let dispatcher_handle = handle.clone();

    let tag_source = rfid::open(move |tag| {
        let cell = Arc::clone(&cell_for_callback);
        dispatcher_handle.post(move |state, store| {
            let Some(tag_source) = cell.get() else {
                log::warn!("scan arrived before tag source was fully initialized, dropping");
                return;
            };
            let outcome = ScanRouter::handle_scan(state, store, tag_source.as_ref(), &tag);
            audit_outcome(&tag, &outcome);
            print_outcome(&outcome);
        });
    });
    tag_source_cell
        .set(tag_source)
        .unwrap_or_else(|_| panic!("tag source cell set twice"));

    if let Err(e) = tag_source_cell.get().unwrap().start() {
        log::error!("tag source failed to start: {e}");
    }

    println!("timeclock-kiosk running. Press Ctrl-C to stop.");
    wait_for_shutdown_signal();

    dispatcher.stop(Some(tag_source_cell.get().unwrap().as_ref()));
    ExitCode::SUCCESS
}

/// Blocks the main thread until the process receives an interrupt.
/// Uses a plain blocking read on stdin as the "press enter to stop"
/// fallback when no signal handling crate is wired in, matching the
/// console-host nature of this binary (the real kiosk's shutdown is
/// systemd-driven and out of this engine's scope per spec §1).
fn wait_for_shutdown_signal() {
    let mut line = String::new();
    let _ = std::io::stdin().read_line(&mut line);
}

/// Appends one line to the scan audit CSV for every routed outcome,
/// independent of what gets printed to the console.
fn audit_outcome(tag: &str, outcome: &ScanOutcome) {
    let (employee, result) = match outcome {
        ScanOutcome::Debounced => return,
        ScanOutcome::UnknownTag | ScanOutcome::IdentifyUnknown => (None, "unknown_tag"),
        ScanOutcome::SwitchedToAdmin(e) => (Some(e.name.as_str()), "switched_to_admin"),
        ScanOutcome::Clocked(r) => (Some(r.employee.name.as_str()), r.action.as_str()),
        ScanOutcome::ClockFailed(_) => (None, "clock_failed"),
        ScanOutcome::RegistrationTagStaged(_) => (None, "registration_staged"),
        ScanOutcome::RegistrationRejected(e) => (Some(e.name.as_str()), "registration_rejected"),
        ScanOutcome::IdentifyDisplay(e) => (Some(e.name.as_str()), "identify"),
        ScanOutcome::AdminSwitchPrompt => (None, "admin_switch_prompt"),
        ScanOutcome::AdminStay => (None, "admin_stay"),
        ScanOutcome::EntryEditReady(e) => (Some(e.name.as_str()), "entry_edit_ready"),
        ScanOutcome::PendingIdentificationMismatch => (None, "pending_identification_mismatch"),
    };
    timeclock_core::logging::log_scan(tag, employee, result);
}

fn print_outcome(outcome: &ScanOutcome) {
    match outcome {
        ScanOutcome::Debounced => {}
        ScanOutcome::UnknownTag => println!("unknown tag"),
        ScanOutcome::SwitchedToAdmin(employee) => {
            println!("admin mode: {}", employee.name);
        }
        ScanOutcome::Clocked(result) => {
            println!("{} clocked {}", result.employee.name, result.action.as_str());
        }
        ScanOutcome::ClockFailed(e) => println!("clock action failed: {e}"),
        ScanOutcome::RegistrationTagStaged(tag) => println!("tag {tag} staged for registration"),
        ScanOutcome::RegistrationRejected(employee) => {
            println!("tag already belongs to {}", employee.name);
        }
        ScanOutcome::IdentifyDisplay(employee) => {
            println!(
                "{} ({}) tag={}",
                employee.name,
                if employee.is_admin { "admin" } else { "employee" },
                employee.rfid_tag
            );
        }
        ScanOutcome::IdentifyUnknown => println!("unknown tag"),
        ScanOutcome::AdminSwitchPrompt => println!("switch to clock mode to use this tag"),
        ScanOutcome::AdminStay => {}
        ScanOutcome::EntryEditReady(employee) => {
            println!("entry editor ready for {}", employee.name);
        }
        ScanOutcome::PendingIdentificationMismatch => {
            println!("scanned tag does not match the employee being edited");
        }
    }
}

/// First-run policy (spec §4.6): if no admin exists yet, force a
/// console registration prompt with the admin flag forced true.
fn ensure_first_run_admin(store: &Store) -> Result<(), timeclock_core::Error> {
    if store.get_admin_count()? > 0 {
        return Ok(());
    }

    println!("no admin registered yet; register the first administrator.");
    print!("name: ");
    std::io::stdout().flush().ok();
    let mut name = String::new();
    std::io::stdin().read_line(&mut name).ok();

    print!("rfid tag: ");
    std::io::stdout().flush().ok();
    let mut tag = String::new();
    std::io::stdin().read_line(&mut tag).ok();

    let employee = store.create_employee(name.trim(), tag.trim(), true)?;
    println!("registered admin {} (tag {})", employee.name, employee.rfid_tag);
    Ok(())
}
