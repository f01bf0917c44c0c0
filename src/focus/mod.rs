//! Focus session timer engine.
//!
//! This module provides the core focus timer functionality:
//! - Idle → Running → Idle state transitions (start/stop/reset)
//! - Elapsed-time accrual at 1000 ms per clock tick
//! - Record-if-qualifying persistence on stop (25 minute threshold)
//! - Best-effort ambient sound and OS notification side channels
//!
//! Notification handles and the ambient sound are side channels only:
//! losing one is recoverable (the next stop/reset cancels whatever handle
//! is currently recorded) and never a correctness hazard for the state
//! machine itself.

mod error;

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::notification::{
    focus_active_content, focus_complete_content, NotificationBackend, NotificationGateway,
    NotificationHandle,
};
use crate::sound::{ambient_sound, chime_sound, PlaybackOptions, SoundPlayer, SoundResource};
use crate::storage::SessionStore;
use crate::types::{FocusSession, FocusState};

pub use error::FocusError;

/// Minimum accumulated duration for a session to be persisted.
pub const MIN_SESSION_DURATION_MS: u64 = 25 * 60 * 1000;

/// Title recorded when the bound title trims to nothing.
pub const DEFAULT_SESSION_TITLE: &str = "Focus Session";

/// Ambient sound volume relative to full scale.
pub const AMBIENT_VOLUME: f32 = 0.3;

/// Milliseconds accrued per clock tick.
const TICK_MS: u64 = 1000;

// ============================================================================
// FocusEvent
// ============================================================================

/// Focus engine events for UI updates and degraded-mode diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub enum FocusEvent {
    /// A session started.
    Started {
        /// Title bound to the session, verbatim.
        title: String,
        /// Completion target in seconds (0 = open-ended).
        target_seconds: u64,
    },
    /// One second accrued.
    Tick {
        /// Total accumulated milliseconds.
        focus_ms: u64,
    },
    /// A session stopped; `session` is the persisted record, if qualifying.
    Stopped {
        /// The persisted record, or None when below threshold.
        session: Option<FocusSession>,
    },
    /// State was reset to idle, discarding elapsed time.
    Reset,
    /// The running session crossed its target; the chime played
    /// (best-effort) and the session keeps running.
    TargetReached {
        /// Total accumulated milliseconds at the crossing.
        focus_ms: u64,
    },
    /// The ambient sound preference was flipped.
    WhiteNoiseToggled {
        /// New preference value.
        enabled: bool,
    },
    /// Ambient sound could not be acquired; the session runs without it.
    AmbientSoundUnavailable {
        /// Backend error description.
        reason: String,
    },
    /// A qualifying session could not be persisted.
    SessionStoreFailed {
        /// Storage error description.
        reason: String,
    },
}

// ============================================================================
// FocusTimerEngine
// ============================================================================

struct FocusInner {
    focus_ms: u64,
    running: bool,
    title: String,
    target_seconds: u64,
    white_noise_enabled: bool,
    ambient: SoundResource,
    chime: SoundResource,
    indicator: Option<NotificationHandle>,
    completion: Option<NotificationHandle>,
}

/// The focus session timer.
///
/// Cheap to clone; clones share state. All operations serialize on one
/// internal mutex, so a tick can never interleave a half-finished
/// transition.
pub struct FocusTimerEngine<B: NotificationBackend> {
    inner: Arc<Mutex<FocusInner>>,
    gateway: Arc<NotificationGateway<B>>,
    store: Arc<dyn SessionStore>,
    event_tx: mpsc::UnboundedSender<FocusEvent>,
}

impl<B: NotificationBackend> Clone for FocusTimerEngine<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            gateway: Arc::clone(&self.gateway),
            store: Arc::clone(&self.store),
            event_tx: self.event_tx.clone(),
        }
    }
}

impl<B: NotificationBackend + 'static> FocusTimerEngine<B> {
    /// Creates an idle engine.
    pub fn new(
        gateway: Arc<NotificationGateway<B>>,
        store: Arc<dyn SessionStore>,
        player: Arc<dyn SoundPlayer>,
        event_tx: mpsc::UnboundedSender<FocusEvent>,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(FocusInner {
                focus_ms: 0,
                running: false,
                title: String::new(),
                target_seconds: 0,
                white_noise_enabled: false,
                ambient: SoundResource::new(player.clone()),
                chime: SoundResource::new(player),
                indicator: None,
                completion: None,
            })),
            gateway,
            store,
            event_tx,
        }
    }

    /// Starts a focus session.
    ///
    /// The title is stored verbatim (emptiness is a UI validation concern).
    /// Ambient sound and notifications are best-effort: their failure never
    /// blocks the start.
    ///
    /// # Errors
    ///
    /// Returns `FocusError::AlreadyRunning` if a session is running.
    pub async fn start(&self, title: &str, target_seconds: u64) -> Result<(), FocusError> {
        let mut inner = self.inner.lock().await;
        if inner.running {
            return Err(FocusError::AlreadyRunning);
        }

        inner.running = true;
        inner.title = title.to_string();
        inner.target_seconds = target_seconds;

        if inner.white_noise_enabled {
            let acquired = inner
                .ambient
                .acquire(&ambient_sound(), PlaybackOptions::looping(AMBIENT_VOLUME))
                .and_then(|()| inner.ambient.play());
            if let Err(e) = acquired {
                warn!("アンビエントサウンドを開始できません (セッションは継続します): {}", e);
                inner.ambient.release();
                let _ = self.event_tx.send(FocusEvent::AmbientSoundUnavailable {
                    reason: e.to_string(),
                });
            }
        }

        inner.indicator = self.gateway.show_immediate(&focus_active_content(title)).await;
        inner.completion = if target_seconds > 0 {
            self.gateway
                .schedule_once_after(target_seconds, &focus_complete_content(title))
                .await
        } else {
            None
        };

        debug!("Focus session started: {:?}", title);
        let _ = self.event_tx.send(FocusEvent::Started {
            title: title.to_string(),
            target_seconds,
        });

        Ok(())
    }

    /// Stops the running session, persisting it when qualifying.
    ///
    /// Idempotent: stopping an idle engine is a no-op returning `Ok(None)`.
    /// Cleanup (notification cancel, ambient release) is always attempted,
    /// and accrual is torn down before any other cleanup step.
    pub async fn stop(&self) -> Result<Option<FocusSession>, FocusError> {
        let mut inner = self.inner.lock().await;
        if !inner.running {
            return Ok(None);
        }

        // Accrual stops before anything else; a late tick sees Idle.
        inner.running = false;
        self.cleanup(&mut inner).await;

        let session = if inner.focus_ms >= MIN_SESSION_DURATION_MS {
            let trimmed = inner.title.trim();
            let title = if trimmed.is_empty() {
                DEFAULT_SESSION_TITLE
            } else {
                trimmed
            };
            let session = FocusSession::new(title, inner.focus_ms);
            if let Err(e) = self.store.add_focus_session(&session) {
                warn!("セッションを保存できませんでした: {}", e);
                let _ = self.event_tx.send(FocusEvent::SessionStoreFailed {
                    reason: e.to_string(),
                });
            }
            Some(session)
        } else {
            debug!(
                "Focus session below threshold ({} ms), discarding",
                inner.focus_ms
            );
            None
        };

        let _ = self.event_tx.send(FocusEvent::Stopped {
            session: session.clone(),
        });
        Ok(session)
    }

    /// Resets to idle, discarding elapsed time unconditionally.
    ///
    /// Performs the same cleanup as `stop` but never persists.
    pub async fn reset(&self) {
        let mut inner = self.inner.lock().await;
        inner.running = false;
        self.cleanup(&mut inner).await;
        inner.focus_ms = 0;
        inner.title.clear();
        inner.target_seconds = 0;

        let _ = self.event_tx.send(FocusEvent::Reset);
    }

    /// Flips the ambient sound preference.
    ///
    /// Consulted at the next `start`; does not touch a running session's
    /// sound. Returns the new value.
    pub async fn toggle_white_noise(&self) -> bool {
        let mut inner = self.inner.lock().await;
        inner.white_noise_enabled = !inner.white_noise_enabled;
        let enabled = inner.white_noise_enabled;
        let _ = self
            .event_tx
            .send(FocusEvent::WhiteNoiseToggled { enabled });
        enabled
    }

    /// Accrues one tick of elapsed time while running.
    ///
    /// When the accumulated time crosses a nonzero target, the completion
    /// chime plays once (best-effort) and the session keeps running.
    pub async fn handle_tick(&self) {
        let mut inner = self.inner.lock().await;
        if !inner.running {
            return;
        }
        inner.focus_ms += TICK_MS;
        let _ = self.event_tx.send(FocusEvent::Tick {
            focus_ms: inner.focus_ms,
        });

        if inner.target_seconds > 0 && inner.focus_ms == inner.target_seconds * 1000 {
            let played = inner
                .chime
                .acquire(&chime_sound(), PlaybackOptions::one_shot())
                .and_then(|()| inner.chime.play());
            if let Err(e) = played {
                debug!("チャイムを再生できません (無視します): {}", e);
                inner.chime.release();
            }
            let _ = self.event_tx.send(FocusEvent::TargetReached {
                focus_ms: inner.focus_ms,
            });
        }
    }

    /// Snapshot of the ephemeral state for rendering.
    pub async fn state(&self) -> FocusState {
        let inner = self.inner.lock().await;
        FocusState {
            focus_ms: inner.focus_ms,
            running: inner.running,
            title: inner.title.clone(),
            white_noise_enabled: inner.white_noise_enabled,
        }
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
                    Ok(_tick) => engine.handle_tick().await,
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(missed)) => {
                        debug!("Focus engine lagged {} ticks", missed);
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// Cancels kept notification handles and releases the ambient sound.
    /// Every step runs even if an earlier one failed.
    async fn cleanup(&self, inner: &mut FocusInner) {
        if let Some(handle) = inner.indicator.take() {
            self.gateway.cancel(&handle).await;
        }
        if let Some(handle) = inner.completion.take() {
            self.gateway.cancel(&handle).await;
        }
        inner.ambient.release();
        inner.chime.release();
    }

    #[cfg(test)]
    async fn set_focus_ms(&self, focus_ms: u64) {
        self.inner.lock().await.focus_ms = focus_ms;
    }
}

// ============================================================================
// Tests
// ============================================================================
