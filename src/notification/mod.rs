//! OS notification integration.
//!
//! [`NotificationGateway`] is the single point of contact with the OS
//! notification capability. It wraps a [`NotificationBackend`] (the native
//! macOS implementation, or a mock in tests) and is deliberately
//! pessimistic: the first backend failure that indicates the capability
//! cannot be used flips the gateway to a sticky `Unavailable` state, after
//! which every call becomes a logged no-op returning `None`. Reminders and
//! focus sessions keep working in-process; only their background/OS-level
//! visibility is lost.
//!
//! # Example
//!
//! ```rust,ignore
//! use kokoro_core::notification::{MacosNotificationBackend, NotificationGateway};
//! use kokoro_core::notification::content::focus_active_content;
//!
//! # async fn demo() {
//! let gateway = NotificationGateway::new(MacosNotificationBackend::new());
//! if gateway.request_permission().await {
//!     let handle = gateway.show_immediate(&focus_active_content("API実装")).await;
//!     if let Some(handle) = handle {
//!         gateway.cancel(&handle).await;
//!     }
//! }
//! # }
//! ```

pub mod content;
pub mod error;

#[cfg(target_os = "macos")]
mod center;
#[cfg(target_os = "macos")]
mod macos;

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use tracing::{debug, warn};

pub use self::content::{
    fixed_slot_content, focus_active_content, focus_complete_content, reminder_content,
    sanitize_label, FixedSlot, NotificationContent, NotificationKind, FIXED_DAILY_TAG,
};
pub use self::error::NotificationError;

#[cfg(target_os = "macos")]
pub use self::macos::MacosNotificationBackend;

// ============================================================================
// NotificationBackend
// ============================================================================

/// An opaque handle to a scheduled or delivered notification.
///
/// Owned by whichever engine scheduled it; the owner must `cancel` it
/// before discarding the handle or the request leaks at the OS level.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NotificationHandle(String);

impl NotificationHandle {
    /// The underlying OS request identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.0
    }
}

/// When a scheduled notification fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationTrigger {
    /// Deliver immediately.
    Immediate,
    /// Deliver once, this many seconds from now.
    AfterSeconds(u64),
    /// Deliver at a wall-clock time of day, optionally every day.
    DailyAt {
        /// Hour, 0-23.
        hour: u32,
        /// Minute, 0-59.
        minute: u32,
        /// Recur daily at the OS level.
        repeats: bool,
    },
}

/// Trait for platform notification backends.
///
/// Backends are dumb: they schedule, cancel, and list. All degradation
/// policy (stickiness, swallowing, logging) lives in the gateway. Backends
/// are shared across engine tasks, hence the `Send + Sync` bounds.
#[allow(async_fn_in_trait)]
pub trait NotificationBackend: Send + Sync {
    /// Checks whether notifications are currently authorized.
    async fn is_authorized(&self) -> Result<bool, NotificationError>;

    /// Prompts the user for notification authorization.
    async fn request_authorization(&self) -> Result<bool, NotificationError>;

    /// Schedules (or replaces, for an already-used id) a notification.
    async fn schedule(
        &self,
        id: &str,
        content: &NotificationContent,
        trigger: &NotificationTrigger,
    ) -> Result<(), NotificationError>;

    /// Cancels a pending or delivered notification. Unknown ids are a no-op.
    async fn cancel(&self, id: &str) -> Result<(), NotificationError>;

    /// Lists the identifiers of all pending notification requests.
    async fn pending_ids(&self) -> Result<Vec<String>, NotificationError>;
}

// ============================================================================
// NotificationGateway
// ============================================================================

/// Availability of the notification capability, decided at first use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayAvailability {
    /// No call has succeeded or failed yet.
    Unknown,
    /// The capability responded successfully at least once.
    Available,
    /// A call failed; the gateway is inert for the rest of the process.
    Unavailable,
}

const AVAILABILITY_UNKNOWN: u8 = 0;
const AVAILABILITY_AVAILABLE: u8 = 1;
const AVAILABILITY_UNAVAILABLE: u8 = 2;

/// Facade over the OS notification capability.
///
/// All operations are best-effort: a backend failure downgrades the gateway
/// permanently (logged once) instead of propagating, and every subsequent
/// call is a no-op returning `None`.
pub struct NotificationGateway<B: NotificationBackend> {
    backend: B,
    availability: AtomicU8,
    permission_granted: AtomicBool,
}

impl<B: NotificationBackend> NotificationGateway<B> {
    /// Creates a gateway over the given backend, availability undecided.
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            availability: AtomicU8::new(AVAILABILITY_UNKNOWN),
            permission_granted: AtomicBool::new(false),
        }
    }

    /// Returns the backend, e.g. for test assertions.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Current availability state.
    #[must_use]
    pub fn availability(&self) -> GatewayAvailability {
        match self.availability.load(Ordering::SeqCst) {
            AVAILABILITY_AVAILABLE => GatewayAvailability::Available,
            AVAILABILITY_UNAVAILABLE => GatewayAvailability::Unavailable,
            _ => GatewayAvailability::Unknown,
        }
    }

    fn is_unavailable(&self) -> bool {
        self.availability.load(Ordering::SeqCst) == AVAILABILITY_UNAVAILABLE
    }

    fn mark_available(&self) {
        // Only resolve Unknown; Unavailable is sticky.
        let _ = self.availability.compare_exchange(
            AVAILABILITY_UNKNOWN,
            AVAILABILITY_AVAILABLE,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
    }

    fn mark_unavailable(&self, context: &str, error: &NotificationError) {
        let previous = self
            .availability
            .swap(AVAILABILITY_UNAVAILABLE, Ordering::SeqCst);
        if previous != AVAILABILITY_UNAVAILABLE {
            warn!(
                "通知機能を無効化します ({}): {} / {}",
                context,
                error,
                error.suggestion()
            );
        }
    }

    /// Requests notification permission.
    ///
    /// Idempotent: an existing grant is re-checked before prompting, and a
    /// previously observed grant short-circuits entirely. Returns false if
    /// permission is denied or the capability is unavailable; denial makes
    /// the gateway inert (a denied capability cannot be used this process).
    pub async fn request_permission(&self) -> bool {
        if self.is_unavailable() {
            return false;
        }
        if self.permission_granted.load(Ordering::SeqCst) {
            return true;
        }

        match self.backend.is_authorized().await {
            Ok(true) => {
                self.mark_available();
                self.permission_granted.store(true, Ordering::SeqCst);
                return true;
            }
            Ok(false) => {}
            Err(e) => {
                self.mark_unavailable("permission check", &e);
                return false;
            }
        }

        match self.backend.request_authorization().await {
            Ok(true) => {
                self.mark_available();
                self.permission_granted.store(true, Ordering::SeqCst);
                true
            }
            Ok(false) => {
                self.mark_unavailable("authorization", &NotificationError::PermissionDenied);
                false
            }
            Err(e) => {
                self.mark_unavailable("authorization", &e);
                false
            }
        }
    }

    /// Shows a notification immediately. Used for "session active"
    /// indicators.
    pub async fn show_immediate(&self, content: &NotificationContent) -> Option<NotificationHandle> {
        self.schedule_with(content, NotificationTrigger::Immediate)
            .await
    }

    /// Schedules a one-shot notification `seconds` from now.
    pub async fn schedule_once_after(
        &self,
        seconds: u64,
        content: &NotificationContent,
    ) -> Option<NotificationHandle> {
        self.schedule_with(content, NotificationTrigger::AfterSeconds(seconds))
            .await
    }

    /// Schedules a notification at a wall-clock time of day.
    pub async fn schedule_recurring_at(
        &self,
        hour: u32,
        minute: u32,
        repeats: bool,
        content: &NotificationContent,
    ) -> Option<NotificationHandle> {
        self.schedule_with(
            content,
            NotificationTrigger::DailyAt {
                hour,
                minute,
                repeats,
            },
        )
        .await
    }

    async fn schedule_with(
        &self,
        content: &NotificationContent,
        trigger: NotificationTrigger,
    ) -> Option<NotificationHandle> {
        if self.is_unavailable() {
            return None;
        }

        let id = content.kind.request_id();
        match self.backend.schedule(&id, content, &trigger).await {
            Ok(()) => {
                self.mark_available();
                debug!("通知をスケジュールしました: {}", id);
                Some(NotificationHandle(id))
            }
            Err(e) => {
                self.mark_unavailable("schedule", &e);
                None
            }
        }
    }

    /// Cancels a previously scheduled notification.
    ///
    /// Tolerant of already-cancelled or unknown handles.
    pub async fn cancel(&self, handle: &NotificationHandle) {
        if self.is_unavailable() {
            return;
        }
        if let Err(e) = self.backend.cancel(&handle.0).await {
            self.mark_unavailable("cancel", &e);
        }
    }

    /// Reconciles the fixed morning/evening reminder pair.
    ///
    /// Lists all pending requests, cancels every one tagged with
    /// [`FIXED_DAILY_TAG`], then re-creates the pair only when
    /// `has_any_user_reminder` is true. Full replace, never merge:
    /// repeated calls converge on exactly two (or zero) fixed requests.
    pub async fn sync_fixed_daily_reminders(&self, has_any_user_reminder: bool) {
        if self.is_unavailable() {
            return;
        }

        let pending = match self.backend.pending_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                self.mark_unavailable("sync", &e);
                return;
            }
        };

        for id in pending
            .iter()
            .filter(|id| id.starts_with(FIXED_DAILY_TAG))
        {
            if let Err(e) = self.backend.cancel(id).await {
                self.mark_unavailable("sync", &e);
                return;
            }
        }

        if !has_any_user_reminder {
            return;
        }

        for slot in FixedSlot::ALL {
            let (hour, minute) = slot.hour_minute();
            if self
                .schedule_recurring_at(hour, minute, true, &fixed_slot_content(slot))
                .await
                .is_none()
                && self.is_unavailable()
            {
                return;
            }
        }
    }
}

// ============================================================================
// MockNotificationBackend
// ============================================================================

/// A scheduled request recorded by [`MockNotificationBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockRequest {
    /// Request identifier.
    pub id: String,
    /// Content as handed to the backend.
    pub content: NotificationContent,
    /// Trigger as handed to the backend.
    pub trigger: NotificationTrigger,
}

/// In-memory notification backend for testing.
#[derive(Debug, Default)]
pub struct MockNotificationBackend {
    requests: std::sync::Mutex<Vec<MockRequest>>,
    cancelled: std::sync::Mutex<Vec<String>>,
    authorized: AtomicBool,
    grant_on_prompt: AtomicBool,
    prompt_count: std::sync::atomic::AtomicUsize,
    should_fail: AtomicBool,
    call_count: std::sync::atomic::AtomicUsize,
}

impl MockNotificationBackend {
    /// A backend that grants permission when prompted.
    #[must_use]
    pub fn new() -> Self {
        let backend = Self::default();
        backend.grant_on_prompt.store(true, Ordering::SeqCst);
        backend
    }

    /// Marks notifications as already authorized (no prompt needed).
    pub fn set_authorized(&self, authorized: bool) {
        self.authorized.store(authorized, Ordering::SeqCst);
    }

    /// Controls whether a prompt results in a grant.
    pub fn set_grant_on_prompt(&self, grant: bool) {
        self.grant_on_prompt.store(grant, Ordering::SeqCst);
    }

    /// Makes every backend call fail.
    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    /// Number of authorization prompts shown.
    #[must_use]
    pub fn prompt_count(&self) -> usize {
        self.prompt_count.load(Ordering::SeqCst)
    }

    /// Total backend calls observed, for asserting inertness.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// All currently pending requests.
    #[must_use]
    pub fn pending(&self) -> Vec<MockRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Pending requests whose identifier starts with the given tag.
    #[must_use]
    pub fn pending_with_tag(&self, tag: &str) -> Vec<MockRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.id.starts_with(tag))
            .cloned()
            .collect()
    }

    /// Every id ever cancelled, in order.
    #[must_use]
    pub fn cancelled(&self) -> Vec<String> {
        self.cancelled.lock().unwrap().clone()
    }

    fn check_failure(&self) -> Result<(), NotificationError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if self.should_fail.load(Ordering::SeqCst) {
            Err(NotificationError::ScheduleFailed("Mock failure".to_string()))
        } else {
            Ok(())
        }
    }
}

impl NotificationBackend for MockNotificationBackend {
    async fn is_authorized(&self) -> Result<bool, NotificationError> {
        self.check_failure()?;
        Ok(self.authorized.load(Ordering::SeqCst))
    }

    async fn request_authorization(&self) -> Result<bool, NotificationError> {
        self.check_failure()?;
        self.prompt_count.fetch_add(1, Ordering::SeqCst);
        let granted = self.grant_on_prompt.load(Ordering::SeqCst);
        if granted {
            self.authorized.store(true, Ordering::SeqCst);
        }
        Ok(granted)
    }

    async fn schedule(
        &self,
        id: &str,
        content: &NotificationContent,
        trigger: &NotificationTrigger,
    ) -> Result<(), NotificationError> {
        self.check_failure()?;
        let mut requests = self.requests.lock().unwrap();
        // Same-id scheduling replaces, as UNUserNotificationCenter does.
        requests.retain(|r| r.id != id);
        requests.push(MockRequest {
            id: id.to_string(),
            content: content.clone(),
            trigger: *trigger,
        });
        Ok(())
    }

    async fn cancel(&self, id: &str) -> Result<(), NotificationError> {
        self.check_failure()?;
        self.requests.lock().unwrap().retain(|r| r.id != id);
        self.cancelled.lock().unwrap().push(id.to_string());
        Ok(())
    }

    async fn pending_ids(&self) -> Result<Vec<String>, NotificationError> {
        self.check_failure()?;
        Ok(self
            .requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.id.clone())
            .collect())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> NotificationGateway<MockNotificationBackend> {
        NotificationGateway::new(MockNotificationBackend::new())
    }

    mod permission_tests {
        use super::*;

        #[tokio::test]
        async fn test_request_permission_prompts_once() {
            let gateway = gateway();

            assert!(gateway.request_permission().await);
            assert!(gateway.request_permission().await);

            assert_eq!(gateway.backend().prompt_count(), 1);
            assert_eq!(gateway.availability(), GatewayAvailability::Available);
        }

        #[tokio::test]
        async fn test_existing_grant_skips_prompt() {
            let gateway = gateway();
            gateway.backend().set_authorized(true);

            assert!(gateway.request_permission().await);
            assert_eq!(gateway.backend().prompt_count(), 0);
        }

        #[tokio::test]
        async fn test_denied_permission_makes_gateway_inert() {
            let gateway = gateway();
            gateway.backend().set_grant_on_prompt(false);

            assert!(!gateway.request_permission().await);
            assert_eq!(gateway.availability(), GatewayAvailability::Unavailable);

            let handle = gateway
                .show_immediate(&focus_active_content("x"))
                .await;
            assert!(handle.is_none());
        }
    }

    mod degradation_tests {
        use super::*;

        #[tokio::test]
        async fn test_first_failure_is_sticky() {
            let gateway = gateway();
            gateway.backend().set_should_fail(true);

            let handle = gateway.show_immediate(&focus_active_content("x")).await;
            assert!(handle.is_none());
            assert_eq!(gateway.availability(), GatewayAvailability::Unavailable);

            // Recovery of the backend must not resurrect the gateway.
            gateway.backend().set_should_fail(false);
            let calls_before = gateway.backend().call_count();

            let handle = gateway.show_immediate(&focus_active_content("x")).await;
            assert!(handle.is_none());
            assert!(!gateway.request_permission().await);
            gateway.sync_fixed_daily_reminders(true).await;

            // The backend is never touched again.
            assert_eq!(gateway.backend().call_count(), calls_before);
        }

        #[tokio::test]
        async fn test_success_marks_available() {
            let gateway = gateway();
            assert_eq!(gateway.availability(), GatewayAvailability::Unknown);

            let handle = gateway.show_immediate(&focus_active_content("x")).await;
            assert!(handle.is_some());
            assert_eq!(gateway.availability(), GatewayAvailability::Available);
        }
    }

    mod scheduling_tests {
        use super::*;

        #[tokio::test]
        async fn test_schedule_once_after() {
            let gateway = gateway();
            let handle = gateway
                .schedule_once_after(1500, &focus_complete_content("Writing"))
                .await
                .unwrap();
            assert!(handle.id().starts_with("focus_complete-"));

            let pending = gateway.backend().pending();
            assert_eq!(pending.len(), 1);
            assert_eq!(pending[0].trigger, NotificationTrigger::AfterSeconds(1500));
        }

        #[tokio::test]
        async fn test_schedule_recurring_at() {
            let gateway = gateway();
            let reminder =
                crate::types::Reminder::new(crate::types::ReminderDraft::new("14:30"));
            let handle = gateway
                .schedule_recurring_at(14, 30, true, &reminder_content(&reminder))
                .await
                .unwrap();
            assert_eq!(handle.id(), format!("user_reminder-{}", reminder.id));

            let pending = gateway.backend().pending();
            assert_eq!(
                pending[0].trigger,
                NotificationTrigger::DailyAt {
                    hour: 14,
                    minute: 30,
                    repeats: true
                }
            );
        }

        #[tokio::test]
        async fn test_cancel_removes_pending() {
            let gateway = gateway();
            let handle = gateway
                .show_immediate(&focus_active_content("x"))
                .await
                .unwrap();

            gateway.cancel(&handle).await;
            assert!(gateway.backend().pending().is_empty());
        }

        #[tokio::test]
        async fn test_cancel_unknown_handle_is_noop() {
            let gateway = gateway();
            let handle = gateway
                .show_immediate(&focus_active_content("x"))
                .await
                .unwrap();

            gateway.cancel(&handle).await;
            gateway.cancel(&handle).await;
            assert_eq!(gateway.availability(), GatewayAvailability::Available);
        }
    }

    mod sync_fixed_tests {
        use super::*;

        #[tokio::test]
        async fn test_sync_with_reminders_creates_pair() {
            let gateway = gateway();
            gateway.sync_fixed_daily_reminders(true).await;

            let fixed = gateway.backend().pending_with_tag(FIXED_DAILY_TAG);
            assert_eq!(fixed.len(), 2);

            let triggers: Vec<_> = fixed.iter().map(|r| r.trigger).collect();
            assert!(triggers.contains(&NotificationTrigger::DailyAt {
                hour: 9,
                minute: 0,
                repeats: true
            }));
            assert!(triggers.contains(&NotificationTrigger::DailyAt {
                hour: 21,
                minute: 0,
                repeats: true
            }));
        }

        #[tokio::test]
        async fn test_sync_is_idempotent() {
            let gateway = gateway();
            gateway.sync_fixed_daily_reminders(true).await;
            gateway.sync_fixed_daily_reminders(true).await;
            gateway.sync_fixed_daily_reminders(true).await;

            assert_eq!(gateway.backend().pending_with_tag(FIXED_DAILY_TAG).len(), 2);
        }

        #[tokio::test]
        async fn test_sync_without_reminders_clears_pair() {
            let gateway = gateway();
            gateway.sync_fixed_daily_reminders(true).await;
            gateway.sync_fixed_daily_reminders(false).await;

            assert!(gateway.backend().pending_with_tag(FIXED_DAILY_TAG).is_empty());
        }

        #[tokio::test]
        async fn test_sync_leaves_other_notifications_alone() {
            let gateway = gateway();
            let handle = gateway
                .show_immediate(&focus_active_content("x"))
                .await
                .unwrap();
            gateway.sync_fixed_daily_reminders(true).await;
            gateway.sync_fixed_daily_reminders(false).await;

            let pending = gateway.backend().pending();
            assert_eq!(pending.len(), 1);
            assert_eq!(pending[0].id, handle.id());
        }
    }
}
