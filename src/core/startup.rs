use crate::core::state::AppState;
use anyhow::{Context, Result};
use tracing::info;

/// Rebuild the user store from the WAL, then rewrite the WAL as a compact
/// snapshot so it does not grow without bound across restarts.
pub fn restore_from_wal(state: &AppState) -> Result<usize> {
    let operations = state.wal.replay().context("Failed to replay WAL")?;
    let replayed = operations.len();

    state.user_store.restore(operations);

    let snapshot = state.user_store.snapshot();
    state.wal.compact(&snapshot).context("Failed to compact WAL")?;

    info!(
        operations_replayed = replayed,
        users_loaded = state.user_store.len(),
        active_sessions = state.user_store.active_sessions(),
        "WAL replay completed"
    );

    Ok(replayed)
}
