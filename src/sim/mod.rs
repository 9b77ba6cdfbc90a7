//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay headless:
//! - Fixed timestep only (wall-clock only for timers)
//! - Seeded RNG only
//! - Stable iteration order (live objects in id order)
//! - No rendering or platform dependencies

pub mod camera;
pub mod collision;
pub mod countdown;
pub mod objects;
pub mod player;
pub mod segments;
pub mod state;
pub mod terrain;
pub mod tick;

pub use camera::Camera;
pub use collision::{Outcome, check_collisions};
pub use countdown::Countdown;
pub use objects::{CollectibleKind, ObjectKind, ObjectPool, ObstacleKind, Spawner, WorldObject};
pub use player::{Facing, Player};
pub use segments::{GroundRecycler, GroundSegment, MeshResolution};
pub use state::{GameEvent, GamePhase, GameState};
pub use terrain::{HeightField, TerrainSample};
pub use tick::{TickInput, tick, toast_for};
