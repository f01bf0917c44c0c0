//! Focus timer error types.

use thiserror::Error;

/// Errors that can occur in the focus timer engine.
///
/// Degraded conditions (sound, notifications, storage) are not errors here;
/// they are swallowed at the operation boundary and surfaced on the
/// engine's event channel.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FocusError {
    /// `start` was called while a session is already running.
    #[error("集中セッションは既に実行中です")]
    AlreadyRunning,
}
