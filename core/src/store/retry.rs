//! Transient-error retry policy (spec §4.3): 50ms, 100ms, 200ms, 400ms,
//! then fail with `StorageUnavailable`.

use crate::error::{Error, Result};
use rusqlite::ErrorCode;
use std::thread;
use std::time::Duration;

const BACKOFF_MS: [u64; 4] = [50, 100, 200, 400];

fn is_transient(err: &rusqlite::Error) -> bool {
    matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked)
    )
}

/// Runs `op` with the spec's retry-on-busy policy. `op` is expected to
/// perform a full atomic transaction (begin, act, commit) on every
/// call, since a retried attempt starts from scratch.
pub fn with_retry<T>(mut op: impl FnMut() -> rusqlite::Result<T>) -> Result<T> {
    let mut attempt = 0usize;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(err) if is_transient(&err) => {
                if attempt >= BACKOFF_MS.len() {
                    log::error!("storage retry budget exhausted: {err}");
                    return Err(Error::StorageUnavailable(err.to_string()));
                }
                log::warn!(
                    "transient storage error (attempt {}): {err}, retrying in {}ms",
                    attempt + 1,
                    BACKOFF_MS[attempt]
                );
                thread::sleep(Duration::from_millis(BACKOFF_MS[attempt]));
                attempt += 1;
            }
            Err(err) => {
                log::error!("storage error: {err}");
                return Err(Error::StorageUnavailable(err.to_string()));
            }
        }
    }
}
