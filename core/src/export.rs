//! Raw-entries CSV export (spec §6): one line per active entry,
//! header first, semicolon-separated, ordered `timestamp DESC`.

use crate::error::{Error, Result};
use crate::store::Store;
use std::io::Write;
use std::path::Path;

const HEADER: &str =
    "entry_id;employee_id;employee_name;rfid_tag;timestamp_iso8601;action;active";

/// Renders the raw-entries CSV contract to a `String`.
pub fn render_csv(store: &Store) -> Result<String> {
    let rows = store.list_all_active_entries()?;
    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');

    for (entry, employee) in rows {
        out.push_str(&format!(
            "{};{};{};{};{};{};{}\n",
            entry.id,
            entry.employee_id,
            employee.name,
            employee.rfid_tag,
            entry.timestamp.to_rfc3339(),
            entry.action.as_str(),
            entry.active,
        ));
    }

    Ok(out)
}

/// Writes the CSV export to `path`, creating parent directories as
/// needed. Used by `timeclock-cli export` and by the
/// `TIME_CLOCK_EXPORT_PATH` pass-through contract (spec §6).
pub fn export_to_file(store: &Store, path: &Path) -> Result<()> {
    let csv = render_csv(store)?;
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| Error::StorageUnavailable(e.to_string()))?;
    }
    let mut file =
        std::fs::File::create(path).map_err(|e| Error::StorageUnavailable(e.to_string()))?;
    file.write_all(csv.as_bytes())
        .map_err(|e| Error::StorageUnavailable(e.to_string()))?;
    Ok(())
}
