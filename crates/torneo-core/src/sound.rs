//! Audio feedback hooks.
//!
//! Components that give audible feedback take a `&dyn SoundEffects` instead
//! of reaching for a global. The front end supplies an implementation that
//! actually plays tones; the CLI and tests use `Silent` or `TracingSounds`.

use std::sync::Mutex;

use tracing::debug;

/// A short sine tone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency_hz: f32,
    pub duration_secs: f32,
    pub volume: f32,
}

/// C5, played when a step is completed.
pub const SUCCESS_TONE: Tone = Tone { frequency_hz: 523.25, duration_secs: 0.2, volume: 0.05 };
/// A4, played on hover.
pub const HOVER_TONE: Tone = Tone { frequency_hz: 440.0, duration_secs: 0.1, volume: 0.03 };
/// E5, played on click.
pub const CLICK_TONE: Tone = Tone { frequency_hz: 659.25, duration_secs: 0.15, volume: 0.04 };

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Success,
    Hover,
    Click,
}

impl Effect {
    pub fn tone(&self) -> Tone {
        match self {
            Effect::Success => SUCCESS_TONE,
            Effect::Hover => HOVER_TONE,
            Effect::Click => CLICK_TONE,
        }
    }
}

pub trait SoundEffects: Send + Sync {
    fn play(&self, effect: Effect);

    fn success(&self) {
        self.play(Effect::Success);
    }

    fn hover(&self) {
        self.play(Effect::Hover);
    }

    fn click(&self) {
        self.play(Effect::Click);
    }
}

/// Plays nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl SoundEffects for Silent {
    fn play(&self, _effect: Effect) {}
}

/// Logs each effect at debug level instead of playing it.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSounds;

impl SoundEffects for TracingSounds {
    fn play(&self, effect: Effect) {
        let tone = effect.tone();
        debug!(?effect, frequency_hz = tone.frequency_hz, duration_secs = tone.duration_secs, "Sound effect");
    }
}

/// Remembers every effect played, in order.
#[derive(Debug, Default)]
pub struct RecordingSounds {
    played: Mutex<Vec<Effect>>,
}

impl RecordingSounds {
    pub fn played(&self) -> Vec<Effect> {
        self.played.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl SoundEffects for RecordingSounds {
    fn play(&self, effect: Effect) {
        if let Ok(mut played) = self.played.lock() {
            played.push(effect);
        }
    }
}
