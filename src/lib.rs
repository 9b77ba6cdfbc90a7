//! Powder Run - A downhill arcade skiing game
//!
//! Core modules:
//! - `sim`: Headless simulation (terrain, objects, player, collisions, levels)
//! - `game`: Fixed-step session driver and collaborator dispatch
//! - `services`: Feedback, score and HUD sinks injected by the host
//! - `renderer`: WebGPU rendering pipeline
//! - `platform`: Browser/native platform abstraction
//! - `tuning`: Data-driven game balance

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod game;
pub mod leaderboard;
pub mod platform;
pub mod renderer;
pub mod services;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use game::Session;
pub use leaderboard::SessionLeaderboard;
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, the rate all per-step tuning assumes)
    pub const SIM_DT: f64 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 5;
    /// Depth of the skier; the world scrolls past this plane
    pub const PLAYER_Z: f32 = 0.0;
}
