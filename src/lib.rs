//! Kokoro Core Library
//!
//! This library provides the time-driven core of the Kokoro personal
//! time-management app. It includes:
//! - Focus session timer with record-if-qualifying persistence
//! - Reminder engine with a 1 Hz tolerance-window alarm loop
//! - Shared wall-clock tick broadcast driving both engines
//! - Notification gateway mirroring engine state into OS-scheduled
//!   notifications, self-disabling when the capability is unavailable
//! - Single-slot sound resource lifecycles (ambient noise, alarm, chime)
//! - Storage collaborator interface for persisted focus sessions
//!
//! Everything UI-facing (habit CRUD, rendering, navigation) lives in the
//! consuming application; this crate only produces state and events.

pub mod clock;
pub mod focus;
pub mod notification;
pub mod reminder;
pub mod sound;
pub mod storage;
pub mod types;

// Re-export commonly used types for convenience
pub use clock::{Clock, Tick};
pub use focus::{
    FocusError, FocusEvent, FocusTimerEngine, AMBIENT_VOLUME, DEFAULT_SESSION_TITLE,
    MIN_SESSION_DURATION_MS,
};
pub use notification::{
    GatewayAvailability, MockNotificationBackend, NotificationBackend, NotificationContent,
    NotificationError, NotificationGateway, NotificationHandle, NotificationKind,
    NotificationTrigger,
};
pub use reminder::{ReminderEngine, ReminderError, ReminderEvent, TRIGGER_TOLERANCE_MS};
pub use sound::{
    try_create_player, MockSoundPlayer, PlaybackOptions, RodioSoundPlayer, SoundError,
    SoundHandle, SoundPlayer, SoundResource, SoundSource,
};
pub use storage::{MemorySessionStore, SessionStore, StorageError};
pub use types::{parse_time_of_day, FocusSession, FocusState, Reminder, ReminderDraft};

// Re-export the native backend on macOS
#[cfg(target_os = "macos")]
pub use notification::MacosNotificationBackend;
