//! Audio system using Web Audio API
//!
//! Procedurally generated cues from plain oscillators, no sample files.
//! Plays through the `FeedbackSink` trait, so the simulation never waits on it.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::services::{Cue, FeedbackSink};
use crate::settings::Settings;

/// One oscillator voice of a cue
#[derive(Debug, Clone, Copy)]
struct Voice {
    wave: OscillatorType,
    start_hz: f32,
    end_hz: f32,
    gain: f32,
    /// Seconds after the cue starts
    delay: f64,
    duration: f64,
}

impl Voice {
    const fn new(wave: OscillatorType, start_hz: f32, end_hz: f32, gain: f32, duration: f64) -> Self {
        Self {
            wave,
            start_hz,
            end_hz,
            gain,
            delay: 0.0,
            duration,
        }
    }

    const fn after(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }
}

fn voices(cue: Cue) -> &'static [Voice] {
    use OscillatorType::{Sawtooth, Sine, Square, Triangle};

    const JUMP: &[Voice] = &[Voice::new(Sine, 220.0, 660.0, 0.4, 0.25)];
    const LAND: &[Voice] = &[Voice::new(Sine, 120.0, 50.0, 0.5, 0.12)];
    const COLLECT: &[Voice] = &[
        Voice::new(Triangle, 880.0, 880.0, 0.3, 0.08),
        Voice::new(Triangle, 1320.0, 1320.0, 0.3, 0.12).after(0.07),
    ];
    const PENALTY: &[Voice] = &[Voice::new(Square, 300.0, 120.0, 0.25, 0.3)];
    const CRASH: &[Voice] = &[
        Voice::new(Sawtooth, 140.0, 30.0, 0.5, 0.4),
        Voice::new(Square, 1500.0, 400.0, 0.15, 0.1),
    ];
    const POWER_UP: &[Voice] = &[
        Voice::new(Triangle, 523.0, 523.0, 0.3, 0.1),
        Voice::new(Triangle, 659.0, 659.0, 0.3, 0.1).after(0.1),
        Voice::new(Triangle, 784.0, 784.0, 0.3, 0.1).after(0.2),
        Voice::new(Triangle, 1047.0, 1047.0, 0.35, 0.25).after(0.3),
    ];
    const POWER_DOWN: &[Voice] = &[Voice::new(Triangle, 784.0, 262.0, 0.25, 0.4)];
    const SMASH: &[Voice] = &[
        Voice::new(Square, 2000.0, 200.0, 0.2, 0.15),
        Voice::new(Sine, 90.0, 40.0, 0.35, 0.15),
    ];
    const DIRECTION: &[Voice] = &[Voice::new(Sine, 1800.0, 1200.0, 0.05, 0.05)];
    const LEVEL_COMPLETE: &[Voice] = &[
        Voice::new(Sine, 392.0, 392.0, 0.3, 0.15),
        Voice::new(Sine, 523.0, 523.0, 0.3, 0.15).after(0.15),
        Voice::new(Sine, 659.0, 659.0, 0.3, 0.15).after(0.3),
        Voice::new(Sine, 784.0, 784.0, 0.35, 0.5).after(0.45),
    ];

    match cue {
        Cue::Jump => JUMP,
        Cue::Land => LAND,
        Cue::Collect => COLLECT,
        Cue::Penalty => PENALTY,
        Cue::Crash => CRASH,
        Cue::PowerUp => POWER_UP,
        Cue::PowerDown => POWER_DOWN,
        Cue::Smash => SMASH,
        Cue::DirectionChange => DIRECTION,
        Cue::LevelComplete => LEVEL_COMPLETE,
    }
}

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        // Fails outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let mut audio = Self::new();
        audio.set_master_volume(settings.master_volume);
        audio.set_sfx_volume(settings.sfx_volume);
        audio
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    pub fn play(&self, cue: Cue) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }

        let Some(ctx) = &self.ctx else { return };

        // Browsers keep the context suspended until a user gesture
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        let t = ctx.current_time();
        for voice in voices(cue) {
            self.play_voice(ctx, voice, t, vol);
        }
    }

    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    fn play_voice(&self, ctx: &AudioContext, voice: &Voice, now: f64, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, voice.start_hz, voice.wave) else {
            return;
        };
        let start = now + voice.delay;
        let end = start + voice.duration;

        gain.gain().set_value_at_time(vol * voice.gain, start).ok();
        gain.gain().exponential_ramp_to_value_at_time(0.01, end).ok();
        osc.frequency().set_value_at_time(voice.start_hz, start).ok();
        if voice.end_hz != voice.start_hz {
            osc.frequency()
                .exponential_ramp_to_value_at_time(voice.end_hz, end)
                .ok();
        }

        osc.start_with_when(start).ok();
        osc.stop_with_when(end + 0.05).ok();
    }
}

impl FeedbackSink for AudioManager {
    fn cue(&mut self, cue: Cue) {
        self.play(cue);
    }
}
