//! Reminder engine error types.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur in the reminder engine.
///
/// As with the focus engine, degraded conditions (alarm sound, OS
/// mirroring) are never errors; they surface on the event channel.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReminderError {
    /// The given id does not name a known reminder.
    #[error("リマインダーが見つかりません: {0}")]
    NotFound(Uuid),
}
