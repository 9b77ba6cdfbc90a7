//! WebGPU rendering module
//!
//! Reads `GameState` and draws it; owns no gameplay state. Scene building
//! lives in `shapes` so it can be tested without a GPU.

pub mod pipeline;
pub mod shapes;
pub mod sprite;
pub mod vertex;

pub use pipeline::RenderState;
pub use shapes::SceneOptions;
pub use sprite::{SpriteError, SpriteSheet};
pub use vertex::Vertex;
