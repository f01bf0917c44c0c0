//! Notification system error types.
//!
//! This module defines the error types for the notification gateway and
//! its backends. All errors are designed to provide helpful messages for
//! debugging and graceful degradation.

use thiserror::Error;

/// Errors that can occur in the notification system.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// Failed to request notification authorization from the system.
    #[error("通知許可の取得に失敗しました: {0}")]
    AuthorizationFailed(String),

    /// Notification permission was denied by the user.
    #[error("通知許可が拒否されています")]
    PermissionDenied,

    /// Failed to schedule or deliver a notification.
    #[error("通知のスケジュールに失敗しました: {0}")]
    ScheduleFailed(String),

    /// Failed to cancel a scheduled notification.
    #[error("通知のキャンセルに失敗しました: {0}")]
    CancelFailed(String),

    /// Failed to list pending notifications.
    #[error("通知一覧の取得に失敗しました: {0}")]
    ListFailed(String),

    /// Failed to initialize the notification system.
    #[error("通知システムの初期化に失敗しました: {0}")]
    InitializationFailed(String),

    /// The notification center is not available in this environment.
    #[error("通知センターが利用できません")]
    NotAvailable,
}

impl NotificationError {
    /// Returns true if this error is related to permissions.
    #[must_use]
    pub fn is_permission_error(&self) -> bool {
        matches!(self, Self::PermissionDenied | Self::AuthorizationFailed(_))
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::AuthorizationFailed(_) | Self::PermissionDenied => {
                "システム環境設定 > 通知 でアプリの通知を許可してください"
            }
            Self::ScheduleFailed(_) | Self::CancelFailed(_) | Self::ListFailed(_) => {
                "通知センターを確認してください"
            }
            Self::InitializationFailed(_) => "アプリケーションを再起動してください",
            Self::NotAvailable => "この環境では通知は利用できません",
        }
    }
}
