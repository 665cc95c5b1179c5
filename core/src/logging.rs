//! Logging setup and the tag-scan audit trail: a CSV sidecar alongside
//! structured `log`/`env_logger` output.

use chrono::Local;
use once_cell::sync::OnceCell;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

static SCAN_LOGGER: OnceCell<Mutex<File>> = OnceCell::new();

/// Initializes `env_logger` for console output. Safe to call more than
/// once; subsequent calls are no-ops.
pub fn init() {
    let _ = env_logger::Builder::from_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}: {}",
                Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init();
}

/// Initializes the tag-scan CSV audit log under `log_dir`.
pub fn init_scan_log(log_dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(log_dir)?;
    let path = log_dir.join("scans.csv");
    let is_new = !path.exists();

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)?;

    if is_new {
        writeln!(file, "timestamp,tag_id,employee,result")?;
    }

    SCAN_LOGGER
        .set(Mutex::new(file))
        .map_err(|_| std::io::Error::other("scan logger already initialized"))
}

/// Appends one line to the scan audit log. A missing logger (not yet
/// initialized, e.g. in unit tests) is a silent no-op.
pub fn log_scan(tag_id: &str, employee_name: Option<&str>, result: &str) {
    let Some(logger) = SCAN_LOGGER.get() else {
        return;
    };
    let mut file = match logger.lock() {
        Ok(guard) => guard,
        Err(_) => return,
    };
    let employee = employee_name.unwrap_or("unknown");
    let timestamp = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f");
    if let Err(e) = writeln!(file, "{timestamp},{tag_id},{employee},{result}") {
        log::error!("failed to write scan audit log: {e}");
    }
}
