//! Embedded sound data.
//!
//! The three sound roles the engines need (looping ambient noise, looping
//! alarm, one-shot completion chime) are synthesized once per process into
//! in-memory WAV buffers, so playback never depends on files shipping with
//! the application bundle. System sounds, when present, take priority for
//! the alarm role (see `source.rs`).
//!
//! WAV format structure:
//! - RIFF header (12 bytes)
//! - fmt chunk (24 bytes)
//! - data chunk header (8 bytes)
//! - 16-bit PCM mono samples

use std::f32::consts::PI;
use std::sync::OnceLock;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Sample rate for all synthesized sounds.
const SAMPLE_RATE: u32 = 22_050;

/// Fixed seed so the ambient buffer is identical across runs.
const NOISE_SEED: u64 = 0x6b6f_6b6f;

/// Returns one second of white noise, suitable for looped ambient playback.
#[must_use]
pub fn white_noise_data() -> &'static [u8] {
    static DATA: OnceLock<Vec<u8>> = OnceLock::new();
    DATA.get_or_init(|| {
        let mut rng = StdRng::seed_from_u64(NOISE_SEED);
        let samples: Vec<i16> = (0..SAMPLE_RATE)
            .map(|_| rng.gen_range(-0.25f32..0.25f32))
            .map(to_pcm)
            .collect();
        wav_from_samples(&samples)
    })
}

/// Returns a two-tone beep pattern, suitable for looped alarm playback.
#[must_use]
pub fn alarm_data() -> &'static [u8] {
    static DATA: OnceLock<Vec<u8>> = OnceLock::new();
    DATA.get_or_init(|| {
        let mut samples = Vec::new();
        for &(freq, ms) in &[(880.0, 180), (0.0, 70), (660.0, 180), (0.0, 320)] {
            samples.extend(tone(freq, ms, 0.6));
        }
        wav_from_samples(&samples)
    })
}

/// Returns a single decaying tone, used as the completion chime.
#[must_use]
pub fn chime_data() -> &'static [u8] {
    static DATA: OnceLock<Vec<u8>> = OnceLock::new();
    DATA.get_or_init(|| {
        let length = SAMPLE_RATE as usize;
        let samples: Vec<i16> = (0..length)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let envelope = (1.0 - t).max(0.0);
                (523.25 * 2.0 * PI * t).sin() * 0.5 * envelope
            })
            .map(to_pcm)
            .collect();
        wav_from_samples(&samples)
    })
}

/// Returns the format description of the synthesized data.
#[must_use]
pub const fn embedded_sound_format() -> &'static str {
    "WAV (16-bit PCM, 22.05kHz, Mono)"
}

fn tone(freq: f32, ms: u32, amplitude: f32) -> Vec<i16> {
    let length = (SAMPLE_RATE * ms / 1000) as usize;
    (0..length)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            (freq * 2.0 * PI * t).sin() * amplitude
        })
        .map(to_pcm)
        .collect()
}

fn to_pcm(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16
}

fn wav_from_samples(samples: &[i16]) -> Vec<u8> {
    let data_len = (samples.len() * 2) as u32;
    let byte_rate = SAMPLE_RATE * 2;

    let mut wav = Vec::with_capacity(44 + samples.len() * 2);
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_len).to_le_bytes());
    wav.extend_from_slice(b"WAVE");
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes()); // fmt chunk size
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&1u16.to_le_bytes()); // mono
    wav.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&2u16.to_le_bytes()); // block align
    wav.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    for sample in samples {
        wav.extend_from_slice(&sample.to_le_bytes());
    }
    wav
}
