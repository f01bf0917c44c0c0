//! Core data types for the Kokoro time-management engine.
//!
//! This module defines the data structures used for:
//! - Reminder records and their creation drafts
//! - Persisted focus sessions
//! - Ephemeral focus timer state snapshots
//! - Strict `HH:MM` time-of-day parsing

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Reminder
// ============================================================================

/// A user-defined time-of-day alarm definition, evaluated daily.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    /// Unique identifier, assigned at creation.
    pub id: Uuid,
    /// Time of day in 24-hour `HH:MM` form, stored verbatim.
    ///
    /// The engine parses this at evaluation time; a malformed value never
    /// matches the trigger window and the reminder silently never fires.
    pub time: String,
    /// Optional display label.
    pub title: Option<String>,
    /// Disabled reminders are never evaluated or triggered.
    pub enabled: bool,
    /// Set the instant the reminder fires; prevents re-firing the same day.
    pub triggered: bool,
    /// Whether the OS-level mirrored notification recurs daily.
    pub repeats: bool,
}

impl Reminder {
    /// Creates a reminder from a draft, assigning a fresh id and defaults.
    #[must_use]
    pub fn new(draft: ReminderDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            time: draft.time,
            title: draft.title,
            enabled: true,
            triggered: false,
            repeats: draft.repeats,
        }
    }

    /// Parses the stored `HH:MM` value.
    ///
    /// Returns `None` for malformed input.
    #[must_use]
    pub fn time_of_day(&self) -> Option<NaiveTime> {
        parse_time_of_day(&self.time)
    }

    /// Returns the display label, falling back to the stored time.
    #[must_use]
    pub fn label(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.time)
    }
}

// ============================================================================
// ReminderDraft
// ============================================================================

/// Caller-supplied fields for a new reminder.
///
/// The engine assigns the id and defaults `enabled = true`,
/// `triggered = false` when the draft is added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderDraft {
    /// Time of day in 24-hour `HH:MM` form.
    pub time: String,
    /// Optional display label.
    pub title: Option<String>,
    /// Whether the OS-level mirrored notification recurs daily.
    pub repeats: bool,
}

impl ReminderDraft {
    /// Creates a draft for the given time of day.
    #[must_use]
    pub fn new(time: impl Into<String>) -> Self {
        Self {
            time: time.into(),
            title: None,
            repeats: true,
        }
    }

    /// Sets the display label.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets whether the OS mirror recurs daily.
    #[must_use]
    pub fn with_repeats(mut self, repeats: bool) -> Self {
        self.repeats = repeats;
        self
    }
}

// ============================================================================
// FocusSession
// ============================================================================

/// A contiguous interval of tracked elapsed time, persisted only if it
/// meets the minimum qualifying duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusSession {
    /// Unique identifier, assigned when the session is persisted.
    pub id: Uuid,
    /// Session title as shown in history.
    pub title: String,
    /// Elapsed wall time while running, in milliseconds.
    pub duration_ms: u64,
    /// Timestamp at the moment the session was persisted.
    pub created_at: DateTime<Utc>,
}

impl FocusSession {
    /// Creates a session record stamped with the current time.
    #[must_use]
    pub fn new(title: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            duration_ms,
            created_at: Utc::now(),
        }
    }
}

// ============================================================================
// FocusState
// ============================================================================

/// Snapshot of the focus timer's ephemeral state.
///
/// Never persisted; owned exclusively by the focus engine and consumed by
/// UI collaborators for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FocusState {
    /// Accumulated elapsed milliseconds while running.
    pub focus_ms: u64,
    /// True while the timer is accruing time.
    pub running: bool,
    /// Title bound at `start()`, stored verbatim.
    pub title: String,
    /// Whether ambient sound is acquired at the next `start()`.
    pub white_noise_enabled: bool,
}

// ============================================================================
// Time-of-day parsing
// ============================================================================

/// Parses a strict 24-hour `HH:MM` value.
///
/// Both fields must be two ASCII digits; anything else (including a valid
/// but differently formatted time such as `"9:00"`) returns `None`.
#[must_use]
pub fn parse_time_of_day(value: &str) -> Option<NaiveTime> {
    let (hh, mm) = value.split_once(':')?;
    if hh.len() != 2 || mm.len() != 2 {
        return None;
    }
    if !hh.bytes().all(|b| b.is_ascii_digit()) || !mm.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hour: u32 = hh.parse().ok()?;
    let minute: u32 = mm.parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

// ============================================================================
// Tests
// ============================================================================
