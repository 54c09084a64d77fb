use std::f32::consts::TAU;

use glam::Vec2;

use crate::error::{ensure_positive, SettingsError};
use crate::math::{angle_from_vertical, from_vertical, point_segment_distance};
use crate::settings::RopeDef;

const VELOCITY_DAMPING: f32 = 0.95;
const RELAX_ITERATIONS: usize = 2;
/// Fraction of the way a scripted segment moves towards its target each tick.
const SCRIPTED_SMOOTHING: f32 = 0.1;
/// Each segment further down swings this much wider than the one above.
const SWING_SPREAD: f32 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct RopeSegment {
    pub pos: Vec2,
    /// Position one tick ago; the difference is the implicit velocity.
    pub old_pos: Vec2,
    pub length: f32,
}

/// A chain of segments hanging from a fixed anchor.
#[derive(Debug, Clone)]
pub struct Rope {
    anchor: Vec2,
    segments: Vec<RopeSegment>,
    segment_length: f32,
    gravity: f32,
    is_moving: bool,
    swing_time: f32,
    swing_speed: f32,
    swing_amplitude: f32,
    end: Vec2,
    angle: f32,
}

impl Rope {
    /// A rope hanging straight down from `anchor`.
    pub fn new(
        anchor: Vec2,
        total_length: f32,
        segment_count: usize,
        gravity: f32,
    ) -> Result<Self, SettingsError> {
        ensure_positive("rope.length", total_length)?;
        if segment_count == 0 {
            return Err(SettingsError::EmptyRope);
        }
        let segment_length = total_length / segment_count as f32;
        let segments = (1..=segment_count)
            .map(|i| {
                let pos = anchor + Vec2::new(0.0, segment_length * i as f32);
                RopeSegment {
                    pos,
                    old_pos: pos,
                    length: segment_length,
                }
            })
            .collect();

        let mut rope = Self {
            anchor,
            segments,
            segment_length,
            gravity,
            is_moving: false,
            swing_time: 0.0,
            swing_speed: 0.0,
            swing_amplitude: 0.0,
            end: anchor,
            angle: 0.0,
        };
        rope.refresh_end();
        Ok(rope)
    }

    pub fn from_def(def: &RopeDef, gravity: f32) -> Result<Self, SettingsError> {
        let rope = Self::new(
            Vec2::new(def.anchor_x, def.anchor_y),
            def.length,
            def.segments,
            gravity,
        )?;
        Ok(if def.moving {
            rope.scripted(def.swing_speed, def.swing_amplitude, def.swing_phase)
        } else {
            rope
        })
    }

    /// Switch to scripted pendulum motion.
    pub fn scripted(mut self, swing_speed: f32, swing_amplitude: f32, phase: f32) -> Self {
        self.is_moving = true;
        self.swing_speed = swing_speed;
        self.swing_amplitude = swing_amplitude;
        self.swing_time = phase.rem_euclid(TAU);
        self
    }

    pub fn update(&mut self) {
        if self.is_moving {
            self.update_scripted();
        } else {
            self.update_free();
        }
        self.refresh_end();
    }

    fn update_scripted(&mut self) {
        self.swing_time = (self.swing_time + self.swing_speed).rem_euclid(TAU);
        let base_angle = self.swing_time.sin() * self.swing_amplitude;

        let mut prev = self.anchor;
        for (i, seg) in self.segments.iter_mut().enumerate() {
            let angle = base_angle * (1.0 + i as f32 * SWING_SPREAD);
            let target =
                self.anchor + from_vertical(angle) * (self.segment_length * (i + 1) as f32);

            seg.old_pos = seg.pos;
            seg.pos += (target - seg.pos) * SCRIPTED_SMOOTHING;
            if let Some(pos) = constrain(seg.pos, prev, seg.length) {
                seg.pos = pos;
            }
            prev = seg.pos;
        }
    }

    fn update_free(&mut self) {
        for seg in &mut self.segments {
            let mut vel = (seg.pos - seg.old_pos) * VELOCITY_DAMPING;
            vel.y += self.gravity;
            seg.old_pos = seg.pos;
            seg.pos += vel;
        }

        for _ in 0..RELAX_ITERATIONS {
            let mut prev = self.anchor;
            for seg in &mut self.segments {
                if let Some(pos) = constrain(seg.pos, prev, seg.length) {
                    seg.pos = pos;
                }
                prev = seg.pos;
            }
        }
    }

    fn refresh_end(&mut self) {
        self.end = self.segments.last().map_or(self.anchor, |s| s.pos);
        self.angle = angle_from_vertical(self.end - self.anchor);
    }

    /// Distance from `p` to the straight anchor-to-end line.
    pub fn distance_to(&self, p: Vec2) -> f32 {
        point_segment_distance(p, self.anchor, self.end)
    }

    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    pub fn end(&self) -> Vec2 {
        self.end
    }

    /// Angle of the anchor-to-end line measured from the vertical.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn segments(&self) -> &[RopeSegment] {
        &self.segments
    }

    pub fn segment_length(&self) -> f32 {
        self.segment_length
    }

    pub fn total_length(&self) -> f32 {
        self.segments.iter().map(|s| s.length).sum()
    }

    pub fn is_moving(&self) -> bool {
        self.is_moving
    }

    /// Nudge the free end, e.g. from a player kicking off.
    pub fn push_end(&mut self, impulse: Vec2) {
        if let Some(last) = self.segments.last_mut() {
            last.old_pos -= impulse;
        }
    }
}

/// Position `pos` exactly `length` away from `prev` along their current offset.
/// `None` when the two coincide and there is no direction to keep.
fn constrain(pos: Vec2, prev: Vec2, length: f32) -> Option<Vec2> {
    let offset = pos - prev;
    let dist = offset.length();
    if dist == 0.0 {
        return None;
    }
    Some(prev + offset * (length / dist))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f32 = 1e-3;

    fn assert_chain_lengths(rope: &Rope) {
        let mut prev = rope.anchor();
        for (i, seg) in rope.segments().iter().enumerate() {
            let d = seg.pos.distance(prev);
            assert!(
                (d - seg.length).abs() < TOLERANCE,
                "segment {i} is {d} from its predecessor, expected {}",
                seg.length
            );
            prev = seg.pos;
        }
    }

    #[test]
    fn new_rope_hangs_straight_down() {
        let rope = Rope::new(Vec2::new(100.0, 0.0), 200.0, 10, 0.4).unwrap();
        assert_eq!(rope.segments().len(), 10);
        assert!((rope.total_length() - 200.0).abs() < TOLERANCE);
        assert_eq!(rope.end(), Vec2::new(100.0, 200.0));
        assert_eq!(rope.angle(), 0.0);
    }

    #[test]
    fn rejects_empty_rope() {
        assert!(matches!(
            Rope::new(Vec2::ZERO, 100.0, 0, 0.4),
            Err(SettingsError::EmptyRope)
        ));
    }

    #[test]
    fn scripted_rope_keeps_segment_lengths() {
        let mut rope = Rope::new(Vec2::new(50.0, 20.0), 220.0, 10, 0.4)
            .unwrap()
            .scripted(0.05, 0.8, 0.0);
        for _ in 0..500 {
            rope.update();
            assert_chain_lengths(&rope);
        }
    }

    #[test]
    fn free_rope_keeps_segment_lengths() {
        let mut rope = Rope::new(Vec2::ZERO, 150.0, 6, 0.4).unwrap();
        rope.push_end(Vec2::new(8.0, 0.0));
        for _ in 0..300 {
            rope.update();
            assert_chain_lengths(&rope);
        }
    }

    #[test]
    fn scripted_rope_swings_both_ways() {
        let mut rope = Rope::new(Vec2::ZERO, 100.0, 5, 0.4)
            .unwrap()
            .scripted(0.05, 0.6, 0.0);
        let mut min_angle = f32::MAX;
        let mut max_angle = f32::MIN;
        for _ in 0..400 {
            rope.update();
            min_angle = min_angle.min(rope.angle());
            max_angle = max_angle.max(rope.angle());
        }
        assert!(min_angle < -0.3, "min angle {min_angle}");
        assert!(max_angle > 0.3, "max angle {max_angle}");
    }

    #[test]
    fn angle_is_measured_from_vertical() {
        let mut rope = Rope::new(Vec2::ZERO, 100.0, 4, 0.0).unwrap();
        // Swing the whole chain out to the right.
        for seg in &mut rope.segments {
            seg.pos = Vec2::new(seg.pos.y, 0.0);
            seg.old_pos = seg.pos;
        }
        rope.refresh_end();
        assert!((rope.angle() - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn coincident_segment_is_left_alone() {
        assert_eq!(constrain(Vec2::ONE, Vec2::ONE, 10.0), None);
        assert_eq!(
            constrain(Vec2::new(0.0, 5.0), Vec2::ZERO, 10.0),
            Some(Vec2::new(0.0, 10.0))
        );
    }

    #[test]
    fn distance_to_rope_line() {
        let rope = Rope::new(Vec2::ZERO, 100.0, 4, 0.0).unwrap();
        assert_eq!(rope.distance_to(Vec2::new(12.0, 40.0)), 12.0);
        assert_eq!(rope.distance_to(Vec2::new(0.0, 130.0)), 30.0);
    }
}
