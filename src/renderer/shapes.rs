//! Scene geometry
//!
//! Turns a read-only view of the simulation into world-space triangles. There
//! is no depth buffer, so everything is emitted back to front: terrain, then
//! objects from far to near with the skier slotted in at its depth.

use glam::{Vec2, Vec3};

use super::sprite::frame_uv;
use super::vertex::{Vertex, colors};
use crate::consts::PLAYER_Z;
use crate::sim::{
    CollectibleKind, GameState, GroundRecycler, ObjectKind, ObstacleKind, Player, WorldObject,
};

/// Height of the skier billboard in world units
pub const SKIER_HEIGHT: f32 = 2.0;

/// Light direction for terrain shading
const SUN: Vec3 = Vec3::new(-0.4, 0.8, 0.45);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneOptions {
    /// Width over height of one sprite frame, or None to draw the placeholder
    pub sprite_aspect: Option<f32>,
    /// Keep the skier solid while invincible instead of blinking
    pub reduced_motion: bool,
}

fn push_tri(out: &mut Vec<Vertex>, a: Vec3, b: Vec3, c: Vec3, color: [f32; 4]) {
    out.push(Vertex::flat(a.to_array(), color));
    out.push(Vertex::flat(b.to_array(), color));
    out.push(Vertex::flat(c.to_array(), color));
}

/// Quad from four corners in winding order
fn push_quad(out: &mut Vec<Vertex>, a: Vec3, b: Vec3, c: Vec3, d: Vec3, color: [f32; 4]) {
    push_tri(out, a, b, c, color);
    push_tri(out, a, c, d, color);
}

fn lerp_color(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
    let t = t.clamp(0.0, 1.0);
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
        a[3] + (b[3] - a[3]) * t,
    ]
}

fn snow_shade(a: Vec3, b: Vec3, c: Vec3) -> [f32; 4] {
    let normal = (b - a).cross(c - a).normalize_or_zero();
    // Winding may face down; shading only cares about the surface tilt
    let normal = if normal.y < 0.0 { -normal } else { normal };
    let light = normal.dot(SUN.normalize()).max(0.0);
    lerp_color(colors::SNOW_SHADE, colors::SNOW_LIGHT, light)
}

/// All ground segments, farthest first
pub fn terrain(ground: &GroundRecycler) -> Vec<Vertex> {
    let mut segments: Vec<_> = ground.segments().iter().collect();
    segments.sort_by(|a, b| a.z_position.total_cmp(&b.z_position));

    let mut out = Vec::new();
    for segment in segments {
        let mesh = &segment.mesh;
        let offset = Vec3::new(0.0, 0.0, segment.z_position);
        // Row 0 is the far edge of the tile
        for row in 0..mesh.resolution.rows - 1 {
            for col in 0..mesh.resolution.cols - 1 {
                let a = mesh.vertex(col, row) + offset;
                let b = mesh.vertex(col + 1, row) + offset;
                let c = mesh.vertex(col + 1, row + 1) + offset;
                let d = mesh.vertex(col, row + 1) + offset;
                push_tri(&mut out, a, b, c, snow_shade(a, b, c));
                push_tri(&mut out, a, c, d, snow_shade(a, c, d));
            }
        }
    }
    out
}

fn tree(out: &mut Vec<Vertex>, base: Vec3, s: f32) {
    let trunk_w = 0.2 * s;
    push_quad(
        out,
        base + Vec3::new(-trunk_w, 0.0, 0.0),
        base + Vec3::new(trunk_w, 0.0, 0.0),
        base + Vec3::new(trunk_w, 0.9 * s, 0.0),
        base + Vec3::new(-trunk_w, 0.9 * s, 0.0),
        colors::TRUNK,
    );
    for (i, half) in [1.3f32, 1.0, 0.7].into_iter().enumerate() {
        let y = (0.6 + i as f32 * 0.8) * s;
        push_tri(
            out,
            base + Vec3::new(-half * s, y, 0.0),
            base + Vec3::new(half * s, y, 0.0),
            base + Vec3::new(0.0, y + 1.4 * s, 0.0),
            colors::TREE,
        );
    }
}

fn rock(out: &mut Vec<Vertex>, base: Vec3, s: f32) {
    let outline = [
        Vec2::new(-1.0, 0.0),
        Vec2::new(-0.8, 0.45),
        Vec2::new(-0.2, 0.7),
        Vec2::new(0.5, 0.6),
        Vec2::new(0.95, 0.2),
        Vec2::new(1.0, 0.0),
    ];
    let center = base + Vec3::new(0.0, 0.25 * s, 0.0);
    for pair in outline.windows(2) {
        push_tri(
            out,
            center,
            base + Vec3::new(pair[0].x * s, pair[0].y * s, 0.0),
            base + Vec3::new(pair[1].x * s, pair[1].y * s, 0.0),
            colors::ROCK,
        );
    }
}

fn ramp(out: &mut Vec<Vertex>, base: Vec3) {
    let half_w = 1.5;
    let half_d = 1.2;
    let rise = 0.8;
    // Low edge faces the skier (+z), high edge away
    let near_l = base + Vec3::new(-half_w, 0.0, half_d);
    let near_r = base + Vec3::new(half_w, 0.0, half_d);
    let far_l = base + Vec3::new(-half_w, rise, -half_d);
    let far_r = base + Vec3::new(half_w, rise, -half_d);
    let side = lerp_color(colors::RAMP, colors::SKIS, 0.4);
    push_tri(out, near_l, far_l, base + Vec3::new(-half_w, 0.0, -half_d), side);
    push_tri(out, near_r, base + Vec3::new(half_w, 0.0, -half_d), far_r, side);
    push_quad(out, near_l, near_r, far_r, far_l, colors::RAMP);
}

fn collectible(out: &mut Vec<Vertex>, center: Vec3, item: CollectibleKind, spin: f32) {
    let color = match item {
        CollectibleKind::Banana => colors::BANANA,
        CollectibleKind::Mango => colors::MANGO,
        CollectibleKind::Pizza => colors::PIZZA,
        CollectibleKind::Spaghetti => colors::SPAGHETTI,
    };
    // Spin shows as the billboard narrowing and widening
    let half_w = 0.5 * spin.cos().abs() + 0.08;
    let half_h = 0.5;
    let top = center + Vec3::new(0.0, half_h, 0.0);
    let bottom = center - Vec3::new(0.0, half_h, 0.0);
    let left = center - Vec3::new(half_w, 0.0, 0.0);
    let right = center + Vec3::new(half_w, 0.0, 0.0);
    push_quad(out, bottom, right, top, left, color);
}

/// Geometry for one world object; nothing for hidden ones
pub fn object(out: &mut Vec<Vertex>, obj: &WorldObject) {
    if !obj.visible {
        return;
    }
    match obj.kind {
        ObjectKind::Obstacle(ObstacleKind::Tree) => tree(out, obj.pos, obj.scale),
        ObjectKind::Obstacle(ObstacleKind::Rock) => rock(out, obj.pos, obj.scale),
        ObjectKind::Ramp => ramp(out, obj.pos),
        ObjectKind::Collectible(item) => collectible(out, obj.pos, item, obj.spin),
    }
}

fn skier_tint(player: &Player) -> [f32; 4] {
    if player.invincible {
        colors::INVINCIBLE
    } else {
        colors::WHITE
    }
}

/// Billboard corners (bl, br, tr, tl) after squash and forward lean
fn skier_corners(player: &Player, width: f32) -> [Vec3; 4] {
    let scale = player.scale();
    let half_w = width * scale.x / 2.0;
    let height = SKIER_HEIGHT * scale.y;
    let base = player.position(PLAYER_Z);
    let lean = Vec3::new(0.0, 0.0, -player.tilt.sin() * height);
    [
        base + Vec3::new(-half_w, 0.0, 0.0),
        base + Vec3::new(half_w, 0.0, 0.0),
        base + Vec3::new(half_w, height, 0.0) + lean,
        base + Vec3::new(-half_w, height, 0.0) + lean,
    ]
}

/// Textured skier quad using the frame for the current facing
pub fn skier_sprite(out: &mut Vec<Vertex>, player: &Player, frame_aspect: f32) {
    let [bl, br, tr, tl] = skier_corners(player, SKIER_HEIGHT * frame_aspect);
    let (u0, u1) = frame_uv(player.facing);
    let tint = skier_tint(player);
    out.push(Vertex::textured(bl.to_array(), u0, 1.0, tint));
    out.push(Vertex::textured(br.to_array(), u1, 1.0, tint));
    out.push(Vertex::textured(tr.to_array(), u1, 0.0, tint));
    out.push(Vertex::textured(bl.to_array(), u0, 1.0, tint));
    out.push(Vertex::textured(tr.to_array(), u1, 0.0, tint));
    out.push(Vertex::textured(tl.to_array(), u0, 0.0, tint));
}

/// Built-in skier drawn until the sprite sheet is available
pub fn skier_placeholder(out: &mut Vec<Vertex>, player: &Player) {
    let base = player.position(PLAYER_Z);
    let splay = player.move_direction as f32 * 0.35;
    for side in [-0.25f32, 0.25] {
        push_quad(
            out,
            base + Vec3::new(side - 0.08, 0.02, 0.9),
            base + Vec3::new(side + 0.08, 0.02, 0.9),
            base + Vec3::new(side + 0.08 + splay, 0.02, -0.9),
            base + Vec3::new(side - 0.08 + splay, 0.02, -0.9),
            colors::SKIS,
        );
    }

    let [bl, br, tr, tl] = skier_corners(player, 0.8);
    let body = if player.invincible {
        lerp_color(colors::SKIER, colors::INVINCIBLE, 0.6)
    } else {
        colors::SKIER
    };
    push_quad(out, bl, br, tr, tl, body);
    let head = (tl + tr) / 2.0 + Vec3::new(0.0, 0.3, 0.0);
    push_quad(
        out,
        head - Vec3::new(0.0, 0.3, 0.0),
        head + Vec3::new(0.3, 0.0, 0.0),
        head + Vec3::new(0.0, 0.3, 0.0),
        head - Vec3::new(0.3, 0.0, 0.0),
        colors::SNOW_LIGHT,
    );
}

fn skier(out: &mut Vec<Vertex>, player: &Player, options: &SceneOptions) {
    if !player.visible && !options.reduced_motion {
        return;
    }
    match options.sprite_aspect {
        Some(aspect) => skier_sprite(out, player, aspect),
        None => skier_placeholder(out, player),
    }
}

/// Whole frame, back to front
pub fn scene(state: &GameState, options: &SceneOptions) -> Vec<Vertex> {
    let mut out = terrain(&state.ground);

    let mut objects: Vec<&WorldObject> = state.spawner.pool.live().iter().collect();
    objects.sort_by(|a, b| a.pos.z.total_cmp(&b.pos.z));
    let split = objects.partition_point(|o| o.pos.z < PLAYER_Z);

    for obj in &objects[..split] {
        object(&mut out, obj);
    }
    skier(&mut out, &state.player, options);
    for obj in &objects[split..] {
        object(&mut out, obj);
    }
    out
}

/// Camera jitter for the current crash shake
pub fn shake_offset(shake: f32, step: u64) -> Vec3 {
    if shake <= 0.0 {
        return Vec3::ZERO;
    }
    let t = step as f32;
    Vec3::new((t * 1.7).sin(), (t * 2.3).cos(), 0.0) * shake * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::MeshResolution;
    use crate::tuning::Tuning;

    fn state() -> GameState {
        GameState::new(3, Tuning::default(), MeshResolution { cols: 4, rows: 3 }, 0.0)
    }

    fn placeholder() -> SceneOptions {
        SceneOptions {
            sprite_aspect: None,
            reduced_motion: false,
        }
    }

    #[test]
    fn test_terrain_triangle_count() {
        let s = state();
        let verts = terrain(&s.ground);
        // 5 segments x (3 x 2) quads x 2 triangles x 3 vertices
        assert_eq!(verts.len(), 5 * 6 * 2 * 3);
        assert!(verts.iter().all(|v| v.uv[2] == 0.0));
    }

    #[test]
    fn test_terrain_far_to_near() {
        let s = state();
        let verts = terrain(&s.ground);
        assert!(verts.first().unwrap().position[2] < verts.last().unwrap().position[2]);
    }

    #[test]
    fn test_hidden_objects_not_drawn() {
        let mut s = state();
        s.spawner.pool.clear();
        let id = s.spawner.pool.insert(
            ObjectKind::Collectible(CollectibleKind::Banana),
            Vec3::new(0.0, 1.0, -20.0),
        );
        let with = scene(&s, &placeholder()).len();
        s.spawner.pool.live_mut()[0].visible = false;
        assert_eq!(s.spawner.pool.live()[0].id, id);
        let without = scene(&s, &placeholder()).len();
        assert_eq!(with - without, 6);
    }

    #[test]
    fn test_sprite_uses_facing_frame() {
        let mut s = state();
        s.player.facing = crate::sim::Facing::BackLeft;
        let mut out = Vec::new();
        skier_sprite(&mut out, &s.player, 0.5);
        assert_eq!(out.len(), 6);
        assert!(out.iter().all(|v| v.uv[2] == 1.0));
        let us: Vec<f32> = out.iter().map(|v| v.uv[0]).collect();
        assert!(us.iter().all(|u| *u == 0.5 || *u == 0.75));
    }

    #[test]
    fn test_blinking_skier_skipped_unless_reduced_motion() {
        let mut s = state();
        s.spawner.pool.clear();
        let visible = scene(&s, &placeholder()).len();
        s.player.visible = false;
        let blinking = scene(&s, &placeholder()).len();
        assert!(blinking < visible);
        let steady = scene(
            &s,
            &SceneOptions {
                sprite_aspect: None,
                reduced_motion: true,
            },
        )
        .len();
        assert_eq!(steady, visible);
    }

    #[test]
    fn test_skier_drawn_between_far_and_near_objects() {
        let mut s = state();
        s.spawner.pool.clear();
        s.spawner
            .pool
            .insert(ObjectKind::Obstacle(ObstacleKind::Rock), Vec3::new(0.0, 0.0, 3.0));
        s.spawner
            .pool
            .insert(ObjectKind::Ramp, Vec3::new(0.0, 0.0, -30.0));
        let verts = scene(&s, &placeholder());
        let terrain_len = terrain(&s.ground).len();
        // Ramp (far) right after terrain, rock (near) at the very end
        assert_eq!(verts[terrain_len].color, lerp_color(colors::RAMP, colors::SKIS, 0.4));
        assert_eq!(verts.last().unwrap().color, colors::ROCK);
    }

    #[test]
    fn test_no_shake_when_settled() {
        assert_eq!(shake_offset(0.0, 10), Vec3::ZERO);
        assert!(shake_offset(0.6, 10).length() > 0.0);
    }
}
