//! World objects and the spawner that owns them
//!
//! Obstacles, collectibles and ramps appear far down the slope, scroll toward
//! the player with the ground, and are retired into a free list once they are
//! behind the camera.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::segments::GroundRecycler;
use crate::tuning::{Difficulty, SpawnTuning, SpawnWeight};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    Tree,
    Rock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectibleKind {
    Banana,
    Mango,
    Pizza,
    Spaghetti,
}

/// What an object is, and therefore how a collision with it resolves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Obstacle(ObstacleKind),
    Collectible(CollectibleKind),
    Ramp,
}

impl ObjectKind {
    pub fn is_obstacle(&self) -> bool {
        matches!(self, ObjectKind::Obstacle(_))
    }

    pub fn is_collectible(&self) -> bool {
        matches!(self, ObjectKind::Collectible(_))
    }

    /// Resting height of the object's origin above the ground
    pub fn ground_clearance(&self) -> f32 {
        match self {
            ObjectKind::Collectible(_) => 1.0,
            ObjectKind::Obstacle(_) | ObjectKind::Ramp => 0.0,
        }
    }
}

/// A spawned entity. Gameplay data only; renderers read it but never own it.
#[derive(Debug, Clone)]
pub struct WorldObject {
    pub id: u32,
    pub kind: ObjectKind,
    pub pos: Vec3,
    /// Set on first overlap with the player; an object resolves at most once
    pub hit: bool,
    pub visible: bool,
    /// Visual spin (collectibles only)
    pub spin: f32,
    /// Visual scale (smashed obstacles shrink)
    pub scale: f32,
}

impl WorldObject {
    fn reset(&mut self, id: u32, kind: ObjectKind, pos: Vec3) {
        self.id = id;
        self.kind = kind;
        self.pos = pos;
        self.hit = false;
        self.visible = true;
        self.spin = 0.0;
        self.scale = 1.0;
    }
}

/// Live objects plus a free list of retired ones
#[derive(Debug, Clone, Default)]
pub struct ObjectPool {
    /// Live objects in id (spawn) order
    live: Vec<WorldObject>,
    free: Vec<WorldObject>,
    next_id: u32,
}

impl ObjectPool {
    pub fn new() -> Self {
        Self {
            live: Vec::new(),
            free: Vec::new(),
            next_id: 1,
        }
    }

    pub fn live(&self) -> &[WorldObject] {
        &self.live
    }

    pub fn live_mut(&mut self) -> &mut [WorldObject] {
        &mut self.live
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Number of retired objects waiting for reuse
    pub fn pooled(&self) -> usize {
        self.free.len()
    }

    /// Insert an object, reusing a retired slot if one exists
    pub fn insert(&mut self, kind: ObjectKind, pos: Vec3) -> u32 {
        let id = self.next_id;
        self.next_id += 1;

        let object = match self.free.pop() {
            Some(mut object) => {
                object.reset(id, kind, pos);
                object
            }
            None => WorldObject {
                id,
                kind,
                pos,
                hit: false,
                visible: true,
                spin: 0.0,
                scale: 1.0,
            },
        };
        self.live.push(object);
        id
    }

    /// Retire every object whose z is past `threshold`
    pub fn retire_past(&mut self, threshold: f32) -> usize {
        let mut retired = 0;
        let mut i = 0;
        while i < self.live.len() {
            if self.live[i].pos.z > threshold {
                // `remove` keeps id order stable
                self.free.push(self.live.remove(i));
                retired += 1;
            } else {
                i += 1;
            }
        }
        retired
    }

    /// Retire everything (level start)
    pub fn clear(&mut self) {
        self.free.append(&mut self.live);
    }
}

/// Draw a kind from the cumulative weight table
pub fn pick_kind<R: Rng>(weights: &[SpawnWeight], rng: &mut R) -> Option<ObjectKind> {
    let total: f32 = weights.iter().map(|w| w.weight.max(0.0)).sum();
    if total <= 0.0 {
        return None;
    }

    let roll = rng.random::<f32>() * total;
    let mut cumulative = 0.0;
    for entry in weights {
        cumulative += entry.weight.max(0.0);
        if roll < cumulative {
            return Some(entry.kind);
        }
    }
    // Rounding can leave roll == total; fall back to the last weighted row
    weights.iter().rev().find(|w| w.weight > 0.0).map(|w| w.kind)
}

/// Lateral placement for a kind: obstacles mostly line the edges,
/// everything else stays in the central band.
pub fn lateral_offset<R: Rng>(
    kind: ObjectKind,
    play_width: f32,
    tuning: &SpawnTuning,
    rng: &mut R,
) -> f32 {
    if !kind.is_obstacle() {
        return (rng.random::<f32>() * 2.0 - 1.0) * play_width * tuning.central_band;
    }
    if rng.random::<f32>() < tuning.obstacle_edge_bias {
        let side = if rng.random::<bool>() { 1.0 } else { -1.0 };
        let inner = play_width * 0.6;
        let outer = play_width * 1.4;
        side * (inner + rng.random::<f32>() * (outer - inner))
    } else {
        (rng.random::<f32>() * 2.0 - 1.0) * play_width
    }
}

/// Populates the slope and reclaims what the player has passed
#[derive(Debug, Clone)]
pub struct Spawner {
    pub tuning: SpawnTuning,
    pub play_width: f32,
    pub pool: ObjectPool,
}

impl Spawner {
    pub fn new(tuning: SpawnTuning, play_width: f32) -> Self {
        Self {
            tuning,
            play_width,
            pool: ObjectPool::new(),
        }
    }

    /// Spawn one weighted-random object at depth `z` (negative = ahead)
    pub fn spawn_at<R: Rng>(&mut self, z: f32, ground: &GroundRecycler, rng: &mut R) -> Option<u32> {
        let kind = pick_kind(&self.tuning.weights, rng)?;
        let x = lateral_offset(kind, self.play_width, &self.tuning, rng);
        let y = ground.height_at(x, z) + kind.ground_clearance();
        Some(self.pool.insert(kind, Vec3::new(x, y, z)))
    }

    /// Scroll, spin, then retire everything that slid behind the camera.
    /// Returns how many objects were retired.
    pub fn tick(&mut self, speed: f32) -> usize {
        let spin_rate = self.tuning.spin_rate;
        for object in self.pool.live_mut() {
            object.pos.z += speed;
            if object.kind.is_collectible() {
                object.spin = (object.spin + spin_rate) % std::f32::consts::TAU;
            }
        }
        self.pool.retire_past(self.tuning.despawn_distance)
    }

    /// Probabilistic extra spawn far ahead; chance grows with speed
    pub fn maybe_spawn<R: Rng>(
        &mut self,
        difficulty: &Difficulty,
        speed: f32,
        ground: &GroundRecycler,
        rng: &mut R,
    ) -> Option<u32> {
        if rng.random::<f32>() < difficulty.spawn_chance * speed {
            self.spawn_at(-self.tuning.spawn_distance, ground, rng)
        } else {
            None
        }
    }

    /// Clear the track and spread the level's opening population ahead of the player
    pub fn reseed<R: Rng>(&mut self, difficulty: &Difficulty, ground: &GroundRecycler, rng: &mut R) {
        self.pool.clear();
        let count = difficulty.initial_objects;
        if count == 0 {
            return;
        }
        let near = self.tuning.preseed_near;
        let far = self.tuning.spawn_distance;
        let spacing = (far - near) / count as f32;
        for i in 0..count {
            let jitter = rng.random::<f32>() * spacing;
            let z = -(near + i as f32 * spacing + jitter);
            self.spawn_at(z, ground, rng);
        }
        log::debug!("Seeded {} objects for level {}", self.pool.len(), difficulty.level);
    }
}
