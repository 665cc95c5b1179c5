//! Core engine for the TimeClock RFID attendance kiosk.
//!
//! This crate contains every piece of business logic the spec calls
//! "the core engine": scan ingestion, the clocking state machine, the
//! persistence layer, session pairing/reporting, and the RFID hardware
//! abstraction. UI adapters (a touchscreen GUI, or the `timeclock-cli`
//! / `timeclock-kiosk` binaries in this workspace) are thin callers of
//! the types exported here.

pub mod clock;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod export;
pub mod logging;
pub mod model;
pub mod recalc;
pub mod report;
pub mod rfid;
pub mod router;
pub mod state;
pub mod store;

pub use clock::{ClockEngine, ClockResult};
pub use config::AppConfig;
pub use error::{Error, Result};
pub use model::{Action, Employee, EmployeeId, TimeEntry, TimeEntryId};
pub use report::{DayReport, Report, ReportEngine, Session, Totals};
pub use state::{AppState, Mode};
pub use store::Store;
