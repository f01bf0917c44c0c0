//! Sound playback for the focus and reminder engines.
//!
//! This module provides the audio side of the engines:
//!
//! - A handle-based [`SoundPlayer`] backend trait with a rodio
//!   implementation and a mock for testing
//! - [`SoundResource`], the single-slot owned resource each engine uses for
//!   its one live sound (ambient noise or alarm)
//! - Sound role selection (system sounds with synthesized fallbacks)
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────┐   one slot per engine
//! │   SoundResource   │ ← acquire / play / stop / release
//! └─────────┬─────────┘
//!           │ handle
//!           ▼
//! ┌───────────────────┐     ┌──────────────────┐
//! │    SoundPlayer    │────▶│  System Sounds   │
//! │ (rodio or mock)   │     │  (/System/...)   │
//! │                   │     ├──────────────────┤
//! │                   │────▶│ Embedded Sounds  │
//! └───────────────────┘     │  (synthesized)   │
//!                           └──────────────────┘
//! ```
//!
//! Releasing is deliberately infallible: audio cleanup must never block or
//! fail a state transition (stopping a session, dismissing an alarm), so
//! `SoundResource::release` swallows backend errors after logging them.

mod embedded;
mod error;
mod player;
mod source;

use std::sync::Arc;

use tracing::debug;

pub use embedded::embedded_sound_format;
pub use error::SoundError;
pub use player::{try_create_player, RodioSoundPlayer};
pub use source::{
    alarm_sound, ambient_sound, chime_sound, discover_system_sounds, find_system_sound,
    SoundSource,
};

// ============================================================================
// SoundPlayer
// ============================================================================

/// Opaque handle to a loaded sound held by a [`SoundPlayer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SoundHandle(pub(crate) u64);

/// How a sound should be played.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackOptions {
    /// Repeat forever until stopped.
    pub looping: bool,
    /// Linear volume, 1.0 = full scale.
    pub volume: f32,
}

impl PlaybackOptions {
    /// Looping playback at the given volume (ambient noise, alarms).
    #[must_use]
    pub fn looping(volume: f32) -> Self {
        Self {
            looping: true,
            volume,
        }
    }

    /// Single playback at full volume (chimes).
    #[must_use]
    pub fn one_shot() -> Self {
        Self {
            looping: false,
            volume: 1.0,
        }
    }
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self::one_shot()
    }
}

/// Trait for sound playback backends.
///
/// Implementations hold loaded sounds addressed by handle so callers can
/// stop looping playback later. `unload` is infallible; unloading an
/// unknown handle is a no-op.
pub trait SoundPlayer: Send + Sync {
    /// Loads a sound, paused, returning a handle to it.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be opened or decoded, or the
    /// audio device is unavailable.
    fn load(&self, source: &SoundSource, options: &PlaybackOptions) -> Result<SoundHandle, SoundError>;

    /// Starts (or resumes) playback of a loaded sound.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is not loaded or playback fails.
    fn play(&self, handle: SoundHandle) -> Result<(), SoundError>;

    /// Pauses playback of a loaded sound.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is not loaded.
    fn stop(&self, handle: SoundHandle) -> Result<(), SoundError>;

    /// Releases a loaded sound. No-op for unknown handles.
    fn unload(&self, handle: SoundHandle);

    /// Returns true if the audio system is available.
    fn is_available(&self) -> bool;
}

// ============================================================================
// SoundResource
// ============================================================================

/// A single-slot owned sound resource.
///
/// Each engine owns one slot per logical sound (ambient noise, alarm).
/// Acquiring while a handle is held releases the old one first, so the slot
/// can never leak a handle across repeated start/stop cycles; dropping the
/// slot releases whatever it holds.
pub struct SoundResource {
    player: Arc<dyn SoundPlayer>,
    slot: Option<SoundHandle>,
}

impl SoundResource {
    /// Creates an empty slot backed by the given player.
    #[must_use]
    pub fn new(player: Arc<dyn SoundPlayer>) -> Self {
        Self { player, slot: None }
    }

    /// Loads a sound into the slot, releasing any previously held handle.
    ///
    /// The sound starts paused; call [`play`](Self::play) to start it.
    ///
    /// # Errors
    ///
    /// Returns an error if loading fails; the slot is left empty.
    pub fn acquire(
        &mut self,
        source: &SoundSource,
        options: PlaybackOptions,
    ) -> Result<(), SoundError> {
        self.release();
        let handle = self.player.load(source, &options)?;
        self.slot = Some(handle);
        Ok(())
    }

    /// Starts playback of the held sound.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot is empty or playback fails.
    pub fn play(&mut self) -> Result<(), SoundError> {
        match self.slot {
            Some(handle) => self.player.play(handle),
            None => Err(SoundError::PlaybackError(
                "サウンドが読み込まれていません".to_string(),
            )),
        }
    }

    /// Pauses the held sound, if any. Errors are swallowed.
    pub fn stop(&mut self) {
        if let Some(handle) = self.slot {
            if let Err(e) = self.player.stop(handle) {
                debug!("サウンド停止に失敗しました (無視します): {}", e);
            }
        }
    }

    /// Stops and unloads the held sound.
    ///
    /// Safe to call on an empty slot; never fails.
    pub fn release(&mut self) {
        if let Some(handle) = self.slot.take() {
            if let Err(e) = self.player.stop(handle) {
                debug!("サウンド停止に失敗しました (無視します): {}", e);
            }
            self.player.unload(handle);
        }
    }

    /// Returns true if the slot currently holds a sound.
    #[must_use]
    pub fn is_held(&self) -> bool {
        self.slot.is_some()
    }
}

impl Drop for SoundResource {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for SoundResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundResource")
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// MockSoundPlayer
// ============================================================================

/// Mock sound player for testing.
///
/// Records every load/play/stop/unload so tests can assert on resource
/// pairing, and can be told to fail loading or playing.
#[derive(Debug, Default)]
pub struct MockSoundPlayer {
    next_handle: std::sync::atomic::AtomicU64,
    loads: std::sync::Mutex<Vec<(SoundSource, PlaybackOptions)>>,
    live: std::sync::Mutex<std::collections::HashSet<u64>>,
    playing: std::sync::Mutex<std::collections::HashSet<u64>>,
    fail_load: std::sync::atomic::AtomicBool,
    fail_play: std::sync::atomic::AtomicBool,
}

impl MockSoundPlayer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_load(&self, fail: bool) {
        self.fail_load
            .store(fail, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn set_fail_play(&self, fail: bool) {
        self.fail_play
            .store(fail, std::sync::atomic::Ordering::SeqCst);
    }

    /// All (source, options) pairs ever loaded, in order.
    #[must_use]
    pub fn loads(&self) -> Vec<(SoundSource, PlaybackOptions)> {
        self.loads.lock().unwrap().clone()
    }

    /// Number of sounds loaded and not yet unloaded.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.lock().unwrap().len()
    }

    /// Number of sounds currently playing.
    #[must_use]
    pub fn playing_count(&self) -> usize {
        self.playing.lock().unwrap().len()
    }
}

impl SoundPlayer for MockSoundPlayer {
    fn load(&self, source: &SoundSource, options: &PlaybackOptions) -> Result<SoundHandle, SoundError> {
        if self.fail_load.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(SoundError::DecodeError("Mock failure".to_string()));
        }
        let id = self
            .next_handle
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.loads.lock().unwrap().push((source.clone(), options.clone()));
        self.live.lock().unwrap().insert(id);
        Ok(SoundHandle(id))
    }

    fn play(&self, handle: SoundHandle) -> Result<(), SoundError> {
        if self.fail_play.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(SoundError::PlaybackError("Mock failure".to_string()));
        }
        if !self.live.lock().unwrap().contains(&handle.0) {
            return Err(SoundError::InvalidHandle(handle.0));
        }
        self.playing.lock().unwrap().insert(handle.0);
        Ok(())
    }

    fn stop(&self, handle: SoundHandle) -> Result<(), SoundError> {
        if !self.live.lock().unwrap().contains(&handle.0) {
            return Err(SoundError::InvalidHandle(handle.0));
        }
        self.playing.lock().unwrap().remove(&handle.0);
        Ok(())
    }

    fn unload(&self, handle: SoundHandle) {
        self.live.lock().unwrap().remove(&handle.0);
        self.playing.lock().unwrap().remove(&handle.0);
    }

    fn is_available(&self) -> bool {
        true
    }
}
