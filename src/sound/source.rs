//! Sound source selection.
//!
//! Each engine plays one of three sound roles: looping ambient noise during
//! a focus session, a looping alarm while a reminder rings, and a one-shot
//! chime. Alarm and chime prefer a macOS system sound when one is present
//! and fall back to the synthesized embedded data; ambient noise is always
//! synthesized.

use std::path::PathBuf;

use super::embedded;
use crate::sound::error::SoundError;

/// Represents the source of a sound to be played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoundSource {
    /// A system sound from `/System/Library/Sounds/` or similar.
    System {
        /// The name of the sound (e.g., "Glass").
        name: String,
        /// The full path to the sound file.
        path: PathBuf,
    },
    /// A sound synthesized into the binary's memory.
    Embedded {
        /// The name of the embedded sound.
        name: String,
    },
}

impl SoundSource {
    /// Creates a new system sound source.
    #[must_use]
    pub fn system(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::System {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Creates a new embedded sound source.
    #[must_use]
    pub fn embedded(name: impl Into<String>) -> Self {
        Self::Embedded { name: name.into() }
    }

    /// Returns the name of the sound source.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::System { name, .. } | Self::Embedded { name } => name,
        }
    }

    /// Returns true if this is a system sound.
    #[must_use]
    pub fn is_system(&self) -> bool {
        matches!(self, Self::System { .. })
    }

    /// Returns true if this is an embedded sound.
    #[must_use]
    pub fn is_embedded(&self) -> bool {
        matches!(self, Self::Embedded { .. })
    }

    /// Returns the embedded byte buffer backing this source, if any.
    #[must_use]
    pub(crate) fn embedded_data(&self) -> Option<&'static [u8]> {
        match self {
            Self::Embedded { name } => Some(match name.as_str() {
                AMBIENT_NAME => embedded::white_noise_data(),
                CHIME_NAME => embedded::chime_data(),
                _ => embedded::alarm_data(),
            }),
            Self::System { .. } => None,
        }
    }
}

/// Embedded source names for the three engine roles.
pub(crate) const AMBIENT_NAME: &str = "white_noise";
pub(crate) const ALARM_NAME: &str = "alarm";
pub(crate) const CHIME_NAME: &str = "chime";

/// Directories to search for system sounds, in order of priority.
const SYSTEM_SOUND_DIRS: &[&str] = &["/System/Library/Sounds", "/Library/Sounds"];

/// Supported audio file extensions.
const SUPPORTED_EXTENSIONS: &[&str] = &["aiff", "wav", "mp3", "m4a", "flac"];

/// System sound names preferred for the alarm role, in order.
const ALARM_SOUND_NAMES: &[&str] = &["Sosumi", "Glass", "Ping"];

/// Discovers available system sounds.
///
/// Scans the system sound directories and returns a list of available
/// sounds. Returns an empty vector if no sounds are found (e.g. on
/// non-macOS hosts or in container environments).
#[must_use]
pub fn discover_system_sounds() -> Vec<SoundSource> {
    let mut sounds = Vec::new();

    for dir in SYSTEM_SOUND_DIRS {
        let path = PathBuf::from(dir);
        if !path.exists() {
            continue;
        }

        if let Ok(entries) = std::fs::read_dir(&path) {
            for entry in entries.flatten() {
                let file_path = entry.path();
                if let Some(ext) = file_path.extension() {
                    let ext_str = ext.to_string_lossy().to_lowercase();
                    if SUPPORTED_EXTENSIONS.contains(&ext_str.as_str()) {
                        if let Some(stem) = file_path.file_stem() {
                            sounds.push(SoundSource::System {
                                name: stem.to_string_lossy().into_owned(),
                                path: file_path,
                            });
                        }
                    }
                }
            }
        }
    }

    sounds.sort_by(|a, b| a.name().cmp(b.name()));
    sounds
}

/// Finds a system sound by name.
///
/// # Errors
///
/// Returns `SoundError::FileNotFound` if no sound with the given name exists.
pub fn find_system_sound(name: &str) -> Result<SoundSource, SoundError> {
    let sounds = discover_system_sounds();
    sounds
        .into_iter()
        .find(|s| s.name().eq_ignore_ascii_case(name))
        .ok_or_else(|| SoundError::FileNotFound(format!("システムサウンド '{name}' が見つかりません")))
}

/// The ambient sound played (looping, attenuated) during a focus session.
#[must_use]
pub fn ambient_sound() -> SoundSource {
    SoundSource::embedded(AMBIENT_NAME)
}

/// The alarm sound played (looping) while a reminder rings.
///
/// Prefers a system sound, falling back to the synthesized alarm.
#[must_use]
pub fn alarm_sound() -> SoundSource {
    let system_sounds = discover_system_sounds();
    for preferred in ALARM_SOUND_NAMES {
        if let Some(sound) = system_sounds.iter().find(|s| s.name() == *preferred) {
            return sound.clone();
        }
    }
    SoundSource::embedded(ALARM_NAME)
}

/// The one-shot chime played when a focus session reaches its target.
#[must_use]
pub fn chime_sound() -> SoundSource {
    SoundSource::embedded(CHIME_NAME)
}
