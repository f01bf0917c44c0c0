//! Native macOS notification backend.
//!
//! Translates the crate's platform-neutral content/trigger types into
//! `UNNotificationRequest`s. Scheduling with an identifier that is already
//! pending replaces the previous request, which is what gives fixed-slot
//! and per-reminder ids their replace-on-reschedule semantics.

use objc2::rc::Retained;
use objc2_foundation::{NSDateComponents, NSString};
use objc2_user_notifications::{
    UNCalendarNotificationTrigger, UNMutableNotificationContent, UNNotificationRequest,
    UNNotificationSound, UNNotificationTrigger, UNTimeIntervalNotificationTrigger,
};

use super::center::NotificationCenter;
use super::error::NotificationError;
use super::{NotificationBackend, NotificationContent, NotificationTrigger};

/// Notification backend over UNUserNotificationCenter.
///
/// Requires a code-signed application bundle; in unsigned or sandboxed
/// environments the first call fails and the gateway self-disables.
#[derive(Debug, Default)]
pub struct MacosNotificationBackend;

impl MacosNotificationBackend {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl NotificationBackend for MacosNotificationBackend {
    async fn is_authorized(&self) -> Result<bool, NotificationError> {
        NotificationCenter::is_authorized().await
    }

    async fn request_authorization(&self) -> Result<bool, NotificationError> {
        NotificationCenter::request_authorization().await
    }

    async fn schedule(
        &self,
        id: &str,
        content: &NotificationContent,
        trigger: &NotificationTrigger,
    ) -> Result<(), NotificationError> {
        let request = build_request(id, content, trigger);
        NotificationCenter::add_notification_request(&request).await
    }

    async fn cancel(&self, id: &str) -> Result<(), NotificationError> {
        // UNUserNotificationCenter silently ignores unknown identifiers.
        NotificationCenter::remove_notifications(&[id]);
        Ok(())
    }

    async fn pending_ids(&self) -> Result<Vec<String>, NotificationError> {
        NotificationCenter::pending_request_identifiers().await
    }
}

fn build_content(content: &NotificationContent) -> Retained<UNMutableNotificationContent> {
    let native = unsafe { UNMutableNotificationContent::new() };

    let title = NSString::from_str(&content.title);
    let body = NSString::from_str(&content.body);
    unsafe {
        native.setTitle(&title);
        native.setBody(&body);
        if content.sound {
            let sound = UNNotificationSound::defaultSound();
            native.setSound(Some(&sound));
        }
    }

    native
}

fn build_trigger(trigger: &NotificationTrigger) -> Option<Retained<UNNotificationTrigger>> {
    match trigger {
        NotificationTrigger::Immediate => None,
        NotificationTrigger::AfterSeconds(seconds) => {
            let native = unsafe {
                UNTimeIntervalNotificationTrigger::triggerWithTimeInterval_repeats(
                    *seconds as f64,
                    false,
                )
            };
            Some(Retained::into_super(native))
        }
        NotificationTrigger::DailyAt {
            hour,
            minute,
            repeats,
        } => {
            let components = unsafe { NSDateComponents::new() };
            unsafe {
                components.setHour(i64::from(*hour));
                components.setMinute(i64::from(*minute));
            }
            let native = unsafe {
                UNCalendarNotificationTrigger::triggerWithDateMatchingComponents_repeats(
                    &components,
                    *repeats,
                )
            };
            Some(Retained::into_super(native))
        }
    }
}

fn build_request(
    id: &str,
    content: &NotificationContent,
    trigger: &NotificationTrigger,
) -> Retained<UNNotificationRequest> {
    let identifier = NSString::from_str(id);
    let native_content = build_content(content);
    let native_trigger = build_trigger(trigger);

    UNNotificationRequest::requestWithIdentifier_content_trigger(
        &identifier,
        &native_content,
        native_trigger.as_deref(),
    )
}
