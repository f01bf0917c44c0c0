//! Sound player implementation using rodio.
//!
//! Unlike a fire-and-forget notification beep, the engines hold looping
//! sounds (ambient noise, alarm) that must be stoppable later, so every
//! loaded sound gets a handle addressing a live `Sink`. Unloading a handle
//! drops its sink; the audio stream itself lives for the player's lifetime.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use tracing::{debug, warn};

use super::error::SoundError;
use super::source::SoundSource;
use super::{PlaybackOptions, SoundHandle, SoundPlayer};

/// A sound player that uses rodio for audio playback.
///
/// Thread-safe; shared across engines via `Arc`. Loaded sounds start
/// paused and are driven through `play`/`stop`/`unload` by handle.
pub struct RodioSoundPlayer {
    /// The audio output stream (must be kept alive for playback).
    _stream: OutputStream,
    /// Handle to the output stream for creating sinks.
    stream_handle: OutputStreamHandle,
    /// Live sinks by handle.
    sinks: Mutex<HashMap<u64, Sink>>,
    /// Next handle value.
    next_handle: AtomicU64,
}

impl RodioSoundPlayer {
    /// Creates a new sound player.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::DeviceNotAvailable` if no audio output device
    /// is available.
    pub fn new() -> Result<Self, SoundError> {
        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| SoundError::DeviceNotAvailable(e.to_string()))?;

        debug!("Audio output stream initialized");

        Ok(Self {
            _stream: stream,
            stream_handle,
            sinks: Mutex::new(HashMap::new()),
            next_handle: AtomicU64::new(1),
        })
    }

    /// Returns the number of currently loaded (not yet unloaded) sounds.
    #[must_use]
    pub fn loaded_count(&self) -> usize {
        self.sinks.lock().unwrap().len()
    }

    fn load_inner(
        &self,
        source: &SoundSource,
        options: &PlaybackOptions,
    ) -> Result<SoundHandle, SoundError> {
        let sink = Sink::try_new(&self.stream_handle)
            .map_err(|e| SoundError::StreamError(e.to_string()))?;
        sink.pause();
        sink.set_volume(options.volume);

        match source {
            SoundSource::System { path, name } => {
                debug!("Loading system sound: {}", name);
                let result = File::open(path)
                    .map_err(|e| SoundError::FileNotFound(format!("{}: {}", path.display(), e)))
                    .and_then(|file| append_decoded(&sink, BufReader::new(file), options.looping));
                if let Err(e) = result {
                    if !e.should_fallback_to_embedded() {
                        return Err(e);
                    }
                    warn!("システムサウンド '{}' を読み込めません ({})。埋め込みサウンドで代替します", name, e);
                    append_embedded(&sink, &SoundSource::embedded(super::source::ALARM_NAME), options)?;
                }
            }
            SoundSource::Embedded { name } => {
                debug!("Loading embedded sound: {}", name);
                append_embedded(&sink, source, options)?;
            }
        }

        let id = self.next_handle.fetch_add(1, Ordering::Relaxed);
        self.sinks.lock().unwrap().insert(id, sink);
        Ok(SoundHandle(id))
    }
}

fn append_decoded<R>(sink: &Sink, reader: R, looping: bool) -> Result<(), SoundError>
where
    R: Read + Seek + Send + Sync + 'static,
{
    let decoder = Decoder::new(reader).map_err(|e| SoundError::DecodeError(e.to_string()))?;
    if looping {
        sink.append(decoder.repeat_infinite());
    } else {
        sink.append(decoder);
    }
    Ok(())
}

fn append_embedded(
    sink: &Sink,
    source: &SoundSource,
    options: &PlaybackOptions,
) -> Result<(), SoundError> {
    let data = source
        .embedded_data()
        .ok_or_else(|| SoundError::PlaybackError("埋め込みサウンドではありません".to_string()))?;
    append_decoded(sink, Cursor::new(data), options.looping)
}

impl SoundPlayer for RodioSoundPlayer {
    fn load(&self, source: &SoundSource, options: &PlaybackOptions) -> Result<SoundHandle, SoundError> {
        self.load_inner(source, options)
    }

    fn play(&self, handle: SoundHandle) -> Result<(), SoundError> {
        let sinks = self.sinks.lock().unwrap();
        let sink = sinks.get(&handle.0).ok_or(SoundError::InvalidHandle(handle.0))?;
        sink.play();
        Ok(())
    }

    fn stop(&self, handle: SoundHandle) -> Result<(), SoundError> {
        let sinks = self.sinks.lock().unwrap();
        let sink = sinks.get(&handle.0).ok_or(SoundError::InvalidHandle(handle.0))?;
        sink.pause();
        Ok(())
    }

    fn unload(&self, handle: SoundHandle) {
        if let Some(sink) = self.sinks.lock().unwrap().remove(&handle.0) {
            sink.stop();
        } else {
            debug!("unload: handle {} already released", handle.0);
        }
    }

    fn is_available(&self) -> bool {
        true
    }
}

impl std::fmt::Debug for RodioSoundPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioSoundPlayer")
            .field("loaded", &self.loaded_count())
            .finish_non_exhaustive()
    }
}

/// Creates a sound player, returning None if audio is unavailable.
///
/// This is a convenience function for optional sound support.
/// If audio initialization fails, a warning is logged and None is returned.
#[must_use]
pub fn try_create_player() -> Option<Arc<RodioSoundPlayer>> {
    match RodioSoundPlayer::new() {
        Ok(player) => Some(Arc::new(player)),
        Err(e) => {
            warn!("オーディオが利用できないため、サウンドを無効にします: {}", e);
            None
        }
    }
}
