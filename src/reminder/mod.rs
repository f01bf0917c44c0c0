//! Reminder and alarm engine.
//!
//! This module provides the reminder functionality:
//! - Reminder list ownership (add/remove/enable; in-memory for the process
//!   lifetime by design)
//! - Per-tick evaluation against a ±1 second tolerance window
//! - At most one active alarm, with looping alarm-audio lifecycle
//! - OS notification mirroring per reminder, plus reconciliation of the
//!   fixed morning/evening pair
//!
//! Reminders are single-fire-per-day: the `triggered` flag set when a
//! reminder fires suppresses re-firing until the first evaluation of the
//! next day clears every flag.

mod error;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::notification::{
    reminder_content, NotificationBackend, NotificationGateway, NotificationHandle,
};
use crate::sound::{alarm_sound, PlaybackOptions, SoundPlayer, SoundResource};
use crate::types::{Reminder, ReminderDraft};

pub use error::ReminderError;

/// Half-width of the trigger window around a reminder's exact target
/// instant. Evaluation runs once per second and must not miss the instant.
pub const TRIGGER_TOLERANCE_MS: i64 = 1000;

// ============================================================================
// ReminderEvent
// ============================================================================

/// Reminder engine events for UI updates and degraded-mode diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderEvent {
    /// A reminder was added.
    Added {
        /// Id of the new reminder.
        id: Uuid,
    },
    /// A reminder was removed.
    Removed {
        /// Id of the removed reminder.
        id: Uuid,
    },
    /// A reminder was enabled or disabled.
    EnabledChanged {
        /// Id of the affected reminder.
        id: Uuid,
        /// New enabled value.
        enabled: bool,
    },
    /// A reminder reached its trigger window.
    Triggered {
        /// Id of the fired reminder.
        id: Uuid,
    },
    /// The active alarm was acknowledged.
    Dismissed {
        /// Id of the dismissed reminder.
        id: Uuid,
    },
    /// The alarm sound could not be started; the trigger stands.
    AlarmSoundUnavailable {
        /// Backend error description.
        reason: String,
    },
    /// The OS mirror for a reminder could not be scheduled.
    OsScheduleFailed {
        /// Id of the affected reminder.
        id: Uuid,
    },
    /// A new day began; all triggered flags were re-armed.
    DayRolledOver,
}

// ============================================================================
// ReminderEngine
// ============================================================================

struct ReminderInner {
    reminders: Vec<Reminder>,
    active_alarm: Option<Uuid>,
    alarm: SoundResource,
    os_handles: HashMap<Uuid, NotificationHandle>,
    last_eval_day: Option<NaiveDate>,
}

/// The reminder/alarm engine.
///
/// Cheap to clone; clones share state. Evaluation and user operations
/// serialize on one internal mutex.
pub struct ReminderEngine<B: NotificationBackend> {
    inner: Arc<Mutex<ReminderInner>>,
    gateway: Arc<NotificationGateway<B>>,
    event_tx: mpsc::UnboundedSender<ReminderEvent>,
}

impl<B: NotificationBackend> Clone for ReminderEngine<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            gateway: Arc::clone(&self.gateway),
            event_tx: self.event_tx.clone(),
        }
    }
}

impl<B: NotificationBackend + 'static> ReminderEngine<B> {
    /// Creates an engine with an empty reminder list.
    pub fn new(
        gateway: Arc<NotificationGateway<B>>,
        player: Arc<dyn SoundPlayer>,
        event_tx: mpsc::UnboundedSender<ReminderEvent>,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ReminderInner {
                reminders: Vec::new(),
                active_alarm: None,
                alarm: SoundResource::new(player),
                os_handles: HashMap::new(),
                last_eval_day: None,
            })),
            gateway,
            event_tx,
        }
    }

    /// Adds a reminder from a draft and mirrors it to the OS.
    ///
    /// Mirroring is best-effort: on failure the reminder stays in-process
    /// and an [`ReminderEvent::OsScheduleFailed`] event is emitted.
    pub async fn add(&self, draft: ReminderDraft) -> Reminder {
        let reminder = Reminder::new(draft);
        let mut inner = self.inner.lock().await;

        inner.reminders.push(reminder.clone());
        self.schedule_mirror(&mut inner, &reminder).await;
        self.sync_fixed(&inner).await;

        debug!("Reminder added: {} at {}", reminder.id, reminder.time);
        let _ = self.event_tx.send(ReminderEvent::Added { id: reminder.id });
        reminder
    }

    /// Removes a reminder, cancelling its OS mirror.
    ///
    /// If the removed reminder is currently alarming, the alarm is
    /// dismissed as well.
    ///
    /// # Errors
    ///
    /// Returns `ReminderError::NotFound` for an unknown id.
    pub async fn remove(&self, id: Uuid) -> Result<(), ReminderError> {
        let mut inner = self.inner.lock().await;
        let position = inner
            .reminders
            .iter()
            .position(|r| r.id == id)
            .ok_or(ReminderError::NotFound(id))?;
        inner.reminders.remove(position);

        if let Some(handle) = inner.os_handles.remove(&id) {
            self.gateway.cancel(&handle).await;
        }
        if inner.active_alarm == Some(id) {
            inner.active_alarm = None;
            inner.alarm.release();
        }
        self.sync_fixed(&inner).await;

        let _ = self.event_tx.send(ReminderEvent::Removed { id });
        Ok(())
    }

    /// Enables or disables a reminder.
    ///
    /// Disabled reminders are never evaluated; their OS mirror is cancelled
    /// and re-created on re-enable.
    ///
    /// # Errors
    ///
    /// Returns `ReminderError::NotFound` for an unknown id.
    pub async fn set_enabled(&self, id: Uuid, enabled: bool) -> Result<(), ReminderError> {
        let mut inner = self.inner.lock().await;
        let reminder = inner
            .reminders
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(ReminderError::NotFound(id))?;
        if reminder.enabled == enabled {
            return Ok(());
        }
        reminder.enabled = enabled;
        let snapshot = reminder.clone();

        if enabled {
            self.schedule_mirror(&mut inner, &snapshot).await;
        } else if let Some(handle) = inner.os_handles.remove(&id) {
            self.gateway.cancel(&handle).await;
        }

        let _ = self
            .event_tx
            .send(ReminderEvent::EnabledChanged { id, enabled });
        Ok(())
    }

    /// Acknowledges the active alarm, releasing the alarm sound.
    ///
    /// The reminder record stays in the list with `triggered = true`.
    /// No-op when nothing is alarming; in every case no sound resource is
    /// held afterwards.
    pub async fn dismiss_active_alarm(&self) {
        let mut inner = self.inner.lock().await;
        let dismissed = inner.active_alarm.take();
        inner.alarm.release();

        if let Some(id) = dismissed {
            debug!("Alarm dismissed: {}", id);
            let _ = self.event_tx.send(ReminderEvent::Dismissed { id });
        }
    }

    /// Evaluates all reminders against the given wall-clock instant.
    ///
    /// While an alarm is active, evaluation is skipped entirely, which is
    /// what guarantees at most one active alarm. Within one pass every
    /// reminder inside the window is marked triggered; the first becomes
    /// the active alarm and owns the alarm sound.
    pub async fn handle_tick(&self, now: NaiveDateTime) {
        let mut inner = self.inner.lock().await;

        let today = now.date();
        if inner.last_eval_day != Some(today) {
            if inner.last_eval_day.is_some() {
                self.roll_over_day(&mut inner);
            }
            inner.last_eval_day = Some(today);
        }

        if inner.active_alarm.is_some() {
            return;
        }

        let mut fired = Vec::new();
        for reminder in &mut inner.reminders {
            if !reminder.enabled || reminder.triggered {
                continue;
            }
            let Some(time) = reminder.time_of_day() else {
                continue;
            };
            let target = today.and_time(time);
            let diff_ms = (target - now).num_milliseconds();
            if diff_ms > -TRIGGER_TOLERANCE_MS && diff_ms < TRIGGER_TOLERANCE_MS {
                reminder.triggered = true;
                fired.push(reminder.id);
            }
        }

        if let Some(&first) = fired.first() {
            inner.active_alarm = Some(first);
            self.start_alarm_sound(&mut inner);
        }
        for id in fired {
            let _ = self.event_tx.send(ReminderEvent::Triggered { id });
        }
    }

    /// Snapshot of the reminder list for rendering.
    pub async fn reminders(&self) -> Vec<Reminder> {
        self.inner.lock().await.reminders.clone()
    }

    /// Id of the currently alarming reminder, if any.
    pub async fn active_alarm(&self) -> Option<Uuid> {
        self.inner.lock().await.active_alarm
    }

    /// Drives the engine off the shared clock.
    ///
    /// The returned task ends when the clock shuts down.
    pub fn spawn_on(&self, clock: &Clock) -> JoinHandle<()> {
        let mut rx = clock.subscribe();
        let engine = self.clone();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(tick) => engine.handle_tick(tick.at).await,
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(missed)) => {
                        debug!("Reminder engine lagged {} ticks", missed);
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// Schedules (replacing any previous schedule) the OS mirror for a
    /// reminder. A malformed time silently schedules nothing, matching the
    /// in-process evaluation that will never fire it.
    async fn schedule_mirror(&self, inner: &mut ReminderInner, reminder: &Reminder) {
        if let Some(handle) = inner.os_handles.remove(&reminder.id) {
            self.gateway.cancel(&handle).await;
        }

        let Some(time) = reminder.time_of_day() else {
            warn!(
                "リマインダー {} の時刻 '{}' を解釈できないため、OS通知は作成されません",
                reminder.id, reminder.time
            );
            return;
        };

        match self
            .gateway
            .schedule_recurring_at(
                time.hour(),
                time.minute(),
                reminder.repeats,
                &reminder_content(reminder),
            )
            .await
        {
            Some(handle) => {
                inner.os_handles.insert(reminder.id, handle);
            }
            None => {
                let _ = self
                    .event_tx
                    .send(ReminderEvent::OsScheduleFailed { id: reminder.id });
            }
        }
    }

    async fn sync_fixed(&self, inner: &ReminderInner) {
        self.gateway
            .sync_fixed_daily_reminders(!inner.reminders.is_empty())
            .await;
    }

    fn start_alarm_sound(&self, inner: &mut ReminderInner) {
        // Loaded fresh on every trigger; acquire releases whatever the
        // slot still holds from an earlier alarm.
        let started = inner
            .alarm
            .acquire(&alarm_sound(), PlaybackOptions::looping(1.0))
            .and_then(|()| inner.alarm.play());
        if let Err(e) = started {
            warn!("アラーム音を再生できません (リマインダーは発火済みです): {}", e);
            inner.alarm.release();
            let _ = self.event_tx.send(ReminderEvent::AlarmSoundUnavailable {
                reason: e.to_string(),
            });
        }
    }

    fn roll_over_day(&self, inner: &mut ReminderInner) {
        let mut cleared = false;
        for reminder in &mut inner.reminders {
            if reminder.triggered {
                reminder.triggered = false;
                cleared = true;
            }
        }
        if cleared {
            debug!("Day rolled over, re-armed triggered reminders");
            let _ = self.event_tx.send(ReminderEvent::DayRolledOver);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::{MockNotificationBackend, FIXED_DAILY_TAG};
    use crate::sound::MockSoundPlayer;

    struct Fixture {
        engine: ReminderEngine<MockNotificationBackend>,
        events: mpsc::UnboundedReceiver<ReminderEvent>,
        gateway: Arc<NotificationGateway<MockNotificationBackend>>,
        player: Arc<MockSoundPlayer>,
    }

    fn fixture() -> Fixture {
        let gateway = Arc::new(NotificationGateway::new(MockNotificationBackend::new()));
        let player = Arc::new(MockSoundPlayer::new());
        let (tx, rx) = mpsc::unbounded_channel();
        let engine = ReminderEngine::new(gateway.clone(), player.clone(), tx);
        Fixture {
            engine,
            events: rx,
            gateway,
            player,
        }
    }

    fn drain(events: &mut mpsc::UnboundedReceiver<ReminderEvent>) -> Vec<ReminderEvent> {
        let mut out = Vec::new();
        while let Ok(event) = events.try_recv() {
            out.push(event);
        }
        out
    }

    fn at(hour: u32, minute: u32, second: u32, milli: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_milli_opt(hour, minute, second, milli)
            .unwrap()
    }

    fn next_day_at(hour: u32, minute: u32, second: u32, milli: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 2)
            .unwrap()
            .and_hms_milli_opt(hour, minute, second, milli)
            .unwrap()
    }

    mod window_tests {
        use super::*;

        async fn triggered_at(now: NaiveDateTime) -> bool {
            let f = fixture();
            let reminder = f.engine.add(ReminderDraft::new("09:00")).await;
            f.engine.handle_tick(now).await;
            f.engine
                .reminders()
                .await
                .iter()
                .find(|r| r.id == reminder.id)
                .unwrap()
                .triggered
        }

        #[tokio::test]
        async fn test_triggers_inside_window() {
            assert!(triggered_at(at(8, 59, 59, 1)).await);
            assert!(triggered_at(at(8, 59, 59, 500)).await);
            assert!(triggered_at(at(9, 0, 0, 0)).await);
            assert!(triggered_at(at(9, 0, 0, 500)).await);
            assert!(triggered_at(at(9, 0, 0, 999)).await);
        }

        #[tokio::test]
        async fn test_silent_outside_window() {
            assert!(!triggered_at(at(8, 59, 59, 0)).await);
            assert!(!triggered_at(at(8, 59, 58, 999)).await);
            assert!(!triggered_at(at(9, 0, 1, 0)).await);
            assert!(!triggered_at(at(12, 0, 0, 0)).await);
        }

        #[tokio::test]
        async fn test_disabled_reminder_never_triggers() {
            let f = fixture();
            let reminder = f.engine.add(ReminderDraft::new("09:00")).await;
            f.engine.set_enabled(reminder.id, false).await.unwrap();

            f.engine.handle_tick(at(9, 0, 0, 500)).await;
            assert!(f.engine.active_alarm().await.is_none());
            assert!(!f.engine.reminders().await[0].triggered);
        }

        #[tokio::test]
        async fn test_malformed_time_never_triggers() {
            let f = fixture();
            f.engine.add(ReminderDraft::new("9am")).await;
            f.engine.add(ReminderDraft::new("25:61")).await;

            for hour in 0..24 {
                f.engine.handle_tick(at(hour, 0, 0, 0)).await;
            }
            assert!(f.engine.active_alarm().await.is_none());
            assert!(f.engine.reminders().await.iter().all(|r| !r.triggered));
        }

        #[tokio::test]
        async fn test_time_already_passed_does_not_fire_today() {
            let f = fixture();
            f.engine.add(ReminderDraft::new("09:00")).await;

            // First evaluation happens mid-afternoon.
            f.engine.handle_tick(at(14, 0, 0, 0)).await;
            f.engine.handle_tick(at(14, 0, 1, 0)).await;
            assert!(f.engine.active_alarm().await.is_none());
        }
    }

    mod alarm_tests {
        use super::*;

        #[tokio::test]
        async fn test_trigger_starts_looping_alarm() {
            let f = fixture();
            let reminder = f.engine.add(ReminderDraft::new("14:30")).await;

            f.engine.handle_tick(at(14, 30, 0, 500)).await;

            assert_eq!(f.engine.active_alarm().await, Some(reminder.id));
            assert_eq!(f.player.live_count(), 1);
            assert_eq!(f.player.playing_count(), 1);
            assert!(f.player.loads().last().unwrap().1.looping);
        }

        #[tokio::test]
        async fn test_no_refire_while_alarm_active() {
            let f = fixture();
            f.engine.add(ReminderDraft::new("14:30")).await;

            f.engine.handle_tick(at(14, 30, 0, 100)).await;
            f.engine.handle_tick(at(14, 30, 0, 600)).await;
            f.engine.handle_tick(at(14, 30, 2, 0)).await;

            // Still exactly one alarm and one sound.
            assert_eq!(f.player.loads().len(), 1);
            assert_eq!(f.player.playing_count(), 1);
        }

        #[tokio::test]
        async fn test_simultaneous_reminders_one_sound() {
            let mut f = fixture();
            let first = f.engine.add(ReminderDraft::new("14:30")).await;
            let second = f.engine.add(ReminderDraft::new("14:30")).await;
            drain(&mut f.events);

            f.engine.handle_tick(at(14, 30, 0, 500)).await;

            // Both fire independently, only the first owns the alarm.
            let reminders = f.engine.reminders().await;
            assert!(reminders.iter().all(|r| r.triggered));
            assert_eq!(f.engine.active_alarm().await, Some(first.id));
            assert_eq!(f.player.loads().len(), 1);

            let events = drain(&mut f.events);
            assert!(events.contains(&ReminderEvent::Triggered { id: first.id }));
            assert!(events.contains(&ReminderEvent::Triggered { id: second.id }));
        }

        #[tokio::test]
        async fn test_second_alarm_after_dismissal() {
            let f = fixture();
            f.engine.add(ReminderDraft::new("14:30")).await;
            let later = f.engine.add(ReminderDraft::new("14:31")).await;

            f.engine.handle_tick(at(14, 30, 0, 500)).await;
            f.engine.dismiss_active_alarm().await;

            f.engine.handle_tick(at(14, 31, 0, 500)).await;
            assert_eq!(f.engine.active_alarm().await, Some(later.id));
            assert_eq!(f.player.loads().len(), 2);
            assert_eq!(f.player.live_count(), 1);
        }

        #[tokio::test]
        async fn test_dismiss_releases_sound() {
            let f = fixture();
            let reminder = f.engine.add(ReminderDraft::new("14:30")).await;
            f.engine.handle_tick(at(14, 30, 0, 500)).await;

            f.engine.dismiss_active_alarm().await;

            assert!(f.engine.active_alarm().await.is_none());
            assert_eq!(f.player.live_count(), 0);
            assert_eq!(f.player.playing_count(), 0);

            // The record stays, triggered.
            let reminders = f.engine.reminders().await;
            assert_eq!(reminders.len(), 1);
            assert_eq!(reminders[0].id, reminder.id);
            assert!(reminders[0].triggered);
        }

        #[tokio::test]
        async fn test_dismiss_without_alarm_is_noop() {
            let mut f = fixture();
            f.engine.dismiss_active_alarm().await;
            assert!(drain(&mut f.events).is_empty());
        }

        #[tokio::test]
        async fn test_dismiss_after_failed_sound_holds_nothing() {
            let mut f = fixture();
            f.player.set_fail_load(true);
            f.engine.add(ReminderDraft::new("14:30")).await;

            f.engine.handle_tick(at(14, 30, 0, 500)).await;

            // Trigger stands even though the sound never started.
            let events = drain(&mut f.events);
            assert!(events
                .iter()
                .any(|e| matches!(e, ReminderEvent::AlarmSoundUnavailable { .. })));
            assert!(f.engine.active_alarm().await.is_some());

            f.engine.dismiss_active_alarm().await;
            assert_eq!(f.player.live_count(), 0);
            assert!(f.engine.active_alarm().await.is_none());
        }
    }

    mod rollover_tests {
        use super::*;

        #[tokio::test]
        async fn test_triggered_clears_on_new_day() {
            let mut f = fixture();
            f.engine.add(ReminderDraft::new("14:30")).await;

            f.engine.handle_tick(at(14, 30, 0, 500)).await;
            f.engine.dismiss_active_alarm().await;
            assert!(f.engine.reminders().await[0].triggered);
            drain(&mut f.events);

            // First tick of the next day re-arms.
            f.engine.handle_tick(next_day_at(0, 0, 1, 0)).await;
            assert!(!f.engine.reminders().await[0].triggered);
            assert!(drain(&mut f.events).contains(&ReminderEvent::DayRolledOver));

            // And it fires again at the same time of day.
            f.engine.handle_tick(next_day_at(14, 30, 0, 500)).await;
            assert!(f.engine.reminders().await[0].triggered);
        }

        #[tokio::test]
        async fn test_same_day_does_not_roll_over() {
            let mut f = fixture();
            f.engine.add(ReminderDraft::new("14:30")).await;
            f.engine.handle_tick(at(14, 30, 0, 500)).await;
            f.engine.dismiss_active_alarm().await;
            drain(&mut f.events);

            f.engine.handle_tick(at(23, 59, 59, 0)).await;
            assert!(f.engine.reminders().await[0].triggered);
            assert!(!drain(&mut f.events).contains(&ReminderEvent::DayRolledOver));
        }
    }

    mod mirroring_tests {
        use super::*;

        #[tokio::test]
        async fn test_add_schedules_recurring_mirror() {
            let f = fixture();
            let reminder = f
                .engine
                .add(ReminderDraft::new("14:30").with_repeats(true))
                .await;

            let pending = f.gateway.backend().pending_with_tag("user_reminder");
            assert_eq!(pending.len(), 1);
            assert_eq!(pending[0].id, format!("user_reminder-{}", reminder.id));
            assert_eq!(
                pending[0].trigger,
                crate::notification::NotificationTrigger::DailyAt {
                    hour: 14,
                    minute: 30,
                    repeats: true
                }
            );
        }

        #[tokio::test]
        async fn test_malformed_time_schedules_nothing() {
            let f = fixture();
            f.engine.add(ReminderDraft::new("half past nine")).await;
            assert!(f
                .gateway
                .backend()
                .pending_with_tag("user_reminder")
                .is_empty());
        }

        #[tokio::test]
        async fn test_remove_cancels_mirror() {
            let f = fixture();
            let reminder = f.engine.add(ReminderDraft::new("14:30")).await;

            f.engine.remove(reminder.id).await.unwrap();
            assert!(f
                .gateway
                .backend()
                .pending_with_tag("user_reminder")
                .is_empty());
            assert!(f.engine.reminders().await.is_empty());
        }

        #[tokio::test]
        async fn test_remove_unknown_errors() {
            let f = fixture();
            let result = f.engine.remove(Uuid::new_v4()).await;
            assert!(matches!(result, Err(ReminderError::NotFound(_))));
        }

        #[tokio::test]
        async fn test_remove_active_alarm_silences_it() {
            let f = fixture();
            let reminder = f.engine.add(ReminderDraft::new("14:30")).await;
            f.engine.handle_tick(at(14, 30, 0, 500)).await;

            f.engine.remove(reminder.id).await.unwrap();
            assert!(f.engine.active_alarm().await.is_none());
            assert_eq!(f.player.live_count(), 0);
        }

        #[tokio::test]
        async fn test_disable_cancels_and_enable_restores_mirror() {
            let f = fixture();
            let reminder = f.engine.add(ReminderDraft::new("14:30")).await;

            f.engine.set_enabled(reminder.id, false).await.unwrap();
            assert!(f
                .gateway
                .backend()
                .pending_with_tag("user_reminder")
                .is_empty());

            f.engine.set_enabled(reminder.id, true).await.unwrap();
            assert_eq!(
                f.gateway.backend().pending_with_tag("user_reminder").len(),
                1
            );
        }

        #[tokio::test]
        async fn test_set_enabled_same_value_is_noop() {
            let mut f = fixture();
            let reminder = f.engine.add(ReminderDraft::new("14:30")).await;
            drain(&mut f.events);

            f.engine.set_enabled(reminder.id, true).await.unwrap();
            assert!(drain(&mut f.events).is_empty());
        }

        #[tokio::test]
        async fn test_schedule_failure_keeps_reminder() {
            let mut f = fixture();
            f.gateway.backend().set_should_fail(true);

            let reminder = f.engine.add(ReminderDraft::new("14:30")).await;

            assert_eq!(f.engine.reminders().await.len(), 1);
            let events = drain(&mut f.events);
            assert!(events.contains(&ReminderEvent::OsScheduleFailed { id: reminder.id }));

            // And it still fires in-process.
            f.engine.handle_tick(at(14, 30, 0, 500)).await;
            assert_eq!(f.engine.active_alarm().await, Some(reminder.id));
        }
    }

    mod fixed_pair_tests {
        use super::*;

        #[tokio::test]
        async fn test_first_add_creates_fixed_pair() {
            let f = fixture();
            assert!(f
                .gateway
                .backend()
                .pending_with_tag(FIXED_DAILY_TAG)
                .is_empty());

            f.engine.add(ReminderDraft::new("14:30")).await;
            assert_eq!(f.gateway.backend().pending_with_tag(FIXED_DAILY_TAG).len(), 2);
        }

        #[tokio::test]
        async fn test_repeated_adds_keep_exactly_two() {
            let f = fixture();
            f.engine.add(ReminderDraft::new("14:30")).await;
            f.engine.add(ReminderDraft::new("15:30")).await;
            f.engine.add(ReminderDraft::new("16:30")).await;
            assert_eq!(f.gateway.backend().pending_with_tag(FIXED_DAILY_TAG).len(), 2);
        }

        #[tokio::test]
        async fn test_removing_last_reminder_clears_pair() {
            let f = fixture();
            let a = f.engine.add(ReminderDraft::new("14:30")).await;
            let b = f.engine.add(ReminderDraft::new("15:30")).await;

            f.engine.remove(a.id).await.unwrap();
            assert_eq!(f.gateway.backend().pending_with_tag(FIXED_DAILY_TAG).len(), 2);

            f.engine.remove(b.id).await.unwrap();
            assert!(f
                .gateway
                .backend()
                .pending_with_tag(FIXED_DAILY_TAG)
                .is_empty());
        }
    }
}
