//! Collaborators injected into a session
//!
//! The simulation never talks to audio, the leaderboard or the HUD directly.
//! It emits `GameEvent`s; the session turns them into calls on these sinks.
//! Sinks are fire-and-forget: nothing returns a value the game waits on.

use serde::{Deserialize, Serialize};

use crate::sim::{CollectibleKind, GameEvent, GamePhase};

/// Named feedback cue for a sound/haptic layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    Jump,
    Land,
    Collect,
    Penalty,
    Crash,
    PowerUp,
    PowerDown,
    Smash,
    DirectionChange,
    LevelComplete,
}

impl Cue {
    pub fn for_event(event: &GameEvent) -> Option<Cue> {
        match event {
            GameEvent::Jump { .. } => Some(Cue::Jump),
            GameEvent::Land => Some(Cue::Land),
            GameEvent::Collected { .. } => Some(Cue::Collect),
            GameEvent::Penalty { .. } => Some(Cue::Penalty),
            GameEvent::PowerUp { .. } => Some(Cue::PowerUp),
            GameEvent::PowerDown => Some(Cue::PowerDown),
            GameEvent::Crash { .. } => Some(Cue::Crash),
            GameEvent::ObstacleSmashed { .. } => Some(Cue::Smash),
            GameEvent::DirectionChange => Some(Cue::DirectionChange),
            GameEvent::LevelComplete { .. } => Some(Cue::LevelComplete),
            GameEvent::LevelStarted { .. } => None,
        }
    }
}

/// Who is playing, supplied by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub name: String,
    /// Opaque reference to a picture for the leaderboard (URL or data URI)
    pub thumbnail: Option<String>,
}

impl Default for PlayerProfile {
    fn default() -> Self {
        Self {
            name: "Skier".to_string(),
            thumbnail: None,
        }
    }
}

/// Reported once per completed level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    pub name: String,
    pub thumbnail: Option<String>,
    pub score: u64,
    pub level: u32,
}

/// Read-only projection of the level state for the HUD
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HudSnapshot {
    pub score: u64,
    pub time_remaining: u32,
    pub level: u32,
    pub phase: GamePhase,
    pub invincible: bool,
}

pub trait FeedbackSink {
    fn cue(&mut self, cue: Cue);
}

pub trait ScoreSink {
    fn record(&mut self, record: RunRecord);
}

pub trait HudSink {
    fn update(&mut self, hud: &HudSnapshot);

    /// Item pickup toast with its signed point delta
    fn toast(&mut self, _item: CollectibleKind, _delta: i64) {}
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullFeedback;

impl FeedbackSink for NullFeedback {
    fn cue(&mut self, _cue: Cue) {}
}

impl ScoreSink for NullFeedback {
    fn record(&mut self, _record: RunRecord) {}
}

impl HudSink for NullFeedback {
    fn update(&mut self, _hud: &HudSnapshot) {}
}

/// Writes cues and records to the log; used by the headless build
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFeedback;

impl FeedbackSink for LogFeedback {
    fn cue(&mut self, cue: Cue) {
        log::debug!("cue: {:?}", cue);
    }
}

impl ScoreSink for LogFeedback {
    fn record(&mut self, record: RunRecord) {
        log::info!(
            "{} finished level {} with {} points",
            record.name,
            record.level,
            record.score
        );
    }
}

impl HudSink for LogFeedback {
    fn update(&mut self, _hud: &HudSnapshot) {}

    fn toast(&mut self, item: CollectibleKind, delta: i64) {
        log::debug!("{:?} {:+}", item, delta);
    }
}

/// Boxed collaborators handed to a `Session`
pub struct Services {
    pub feedback: Box<dyn FeedbackSink>,
    pub scores: Box<dyn ScoreSink>,
    pub hud: Box<dyn HudSink>,
}

impl Services {
    pub fn new(
        feedback: impl FeedbackSink + 'static,
        scores: impl ScoreSink + 'static,
        hud: impl HudSink + 'static,
    ) -> Self {
        Self {
            feedback: Box::new(feedback),
            scores: Box::new(scores),
            hud: Box::new(hud),
        }
    }
}

impl Default for Services {
    fn default() -> Self {
        Self::new(NullFeedback, NullFeedback, NullFeedback)
    }
}
