//! Notification content construction.
//!
//! Content is built platform-neutrally here; backends translate it into
//! their native request type. Each content value carries a
//! [`NotificationKind`] whose tag is embedded in the OS request identifier,
//! which is what `sync_fixed_daily_reminders` reconciles on: the fixed
//! daily pair can be cancelled wholesale without ever touching user-created
//! or per-session notifications.

use uuid::Uuid;

use crate::types::Reminder;

/// Maximum length for user-supplied labels in notifications.
const MAX_LABEL_LENGTH: usize = 100;

// ============================================================================
// NotificationKind
// ============================================================================

/// One of the two fixed daily reminder slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixedSlot {
    /// Fires at 09:00.
    Morning,
    /// Fires at 21:00.
    Evening,
}

impl FixedSlot {
    /// Both slots, in scheduling order.
    pub const ALL: [FixedSlot; 2] = [FixedSlot::Morning, FixedSlot::Evening];

    /// Hour and minute the slot fires at.
    #[must_use]
    pub fn hour_minute(self) -> (u32, u32) {
        match self {
            FixedSlot::Morning => (9, 0),
            FixedSlot::Evening => (21, 0),
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            FixedSlot::Morning => "morning",
            FixedSlot::Evening => "evening",
        }
    }
}

/// Classifies a notification for ownership and reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// One of the reconciled morning/evening pair.
    FixedDaily(FixedSlot),
    /// The OS mirror of a user-created reminder.
    UserReminder(Uuid),
    /// The "session in progress" indicator.
    FocusActive,
    /// The one-shot completion alert for a focus target.
    FocusComplete,
}

/// Marker tag for the fixed daily pair; `sync_fixed_daily_reminders` owns
/// exactly the pending requests whose identifier starts with this tag.
pub const FIXED_DAILY_TAG: &str = "fixed_daily";

impl NotificationKind {
    /// The reconciliation tag carried in the request identifier.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            NotificationKind::FixedDaily(_) => FIXED_DAILY_TAG,
            NotificationKind::UserReminder(_) => "user_reminder",
            NotificationKind::FocusActive => "focus_active",
            NotificationKind::FocusComplete => "focus_complete",
        }
    }

    /// The OS request identifier for this notification.
    ///
    /// Fixed slots and user reminders get stable identifiers so
    /// re-scheduling replaces the previous request instead of stacking a
    /// duplicate; per-session notifications get a fresh identifier.
    #[must_use]
    pub fn request_id(&self) -> String {
        match self {
            NotificationKind::FixedDaily(slot) => format!("{}-{}", self.tag(), slot.suffix()),
            NotificationKind::UserReminder(id) => format!("{}-{}", self.tag(), id),
            NotificationKind::FocusActive | NotificationKind::FocusComplete => {
                format!("{}-{}", self.tag(), Uuid::new_v4())
            }
        }
    }
}

// ============================================================================
// NotificationContent
// ============================================================================

/// Platform-neutral notification content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub body: String,
    /// Ownership/reconciliation classification.
    pub kind: NotificationKind,
    /// Whether delivery plays the default notification sound.
    pub sound: bool,
}

/// Sanitizes a user-supplied label for use in notification text.
///
/// Returns the truncated, control-character-free label, or None if nothing
/// displayable remains.
#[must_use]
pub fn sanitize_label(label: &str) -> Option<String> {
    let truncated: String = label.chars().take(MAX_LABEL_LENGTH).collect();
    let sanitized: String = truncated.chars().filter(|c| !c.is_control()).collect();

    if sanitized.trim().is_empty() {
        None
    } else {
        Some(sanitized)
    }
}

/// Content for a user reminder's OS mirror.
#[must_use]
pub fn reminder_content(reminder: &Reminder) -> NotificationContent {
    let body = reminder
        .title
        .as_deref()
        .and_then(sanitize_label)
        .unwrap_or_else(|| "設定した時刻になりました。".to_string());

    NotificationContent {
        title: "⏰ リマインダー".to_string(),
        body,
        kind: NotificationKind::UserReminder(reminder.id),
        sound: true,
    }
}

/// Content for the "session in progress" indicator.
#[must_use]
pub fn focus_active_content(title: &str) -> NotificationContent {
    let body = match sanitize_label(title) {
        Some(label) => format!("「{label}」に集中しています。"),
        None => "集中しています。".to_string(),
    };

    NotificationContent {
        title: "🎯 集中セッション中".to_string(),
        body,
        kind: NotificationKind::FocusActive,
        sound: false,
    }
}

/// Content for the focus-target completion alert.
#[must_use]
pub fn focus_complete_content(title: &str) -> NotificationContent {
    let body = match sanitize_label(title) {
        Some(label) => format!("「{label}」が目標時間に到達しました。おつかれさまでした。"),
        None => "集中セッションが目標時間に到達しました。".to_string(),
    };

    NotificationContent {
        title: "🎉 集中セッション完了".to_string(),
        body,
        kind: NotificationKind::FocusComplete,
        sound: true,
    }
}

/// Content for one of the fixed daily slots.
#[must_use]
pub fn fixed_slot_content(slot: FixedSlot) -> NotificationContent {
    let (title, body) = match slot {
        FixedSlot::Morning => (
            "🌅 おはようございます",
            "今日のリマインダーを確認しましょう。",
        ),
        FixedSlot::Evening => (
            "🌙 今日のふりかえり",
            "今日のリマインダーをふりかえりましょう。",
        ),
    };

    NotificationContent {
        title: title.to_string(),
        body: body.to_string(),
        kind: NotificationKind::FixedDaily(slot),
        sound: true,
    }
}
