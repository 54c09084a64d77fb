use glam::Vec2;
use tracing::debug;

use super::dune::{SandDune, SurfaceContact};
use super::rope::Rope;
use super::victory::VictoryCutscene;
use crate::input::SwingInput;
use crate::math::{angle_from_vertical, from_vertical};
use crate::settings::{RopeSwingSettings, SwingPlayerSettings};

#[derive(Debug, Clone, PartialEq)]
pub struct RopeAttachment {
    pub rope: usize,
    pub swing_angle: f32,
    pub swing_speed: f32,
    /// Radius from the anchor, frozen when grabbing.
    pub attachment_distance: f32,
    /// Position one tick ago, turned into velocity on release.
    last_pos: Vec2,
}

/// What the player is doing. Exactly one mode at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum MotionState {
    Free {
        /// Ticks left during which the dune and pipe ignore the player.
        recapture_cooldown: u32,
    },
    RopeAttached(RopeAttachment),
    TerrainContact {
        normal_angle: f32,
        roll_velocity: f32,
        sample: usize,
    },
    InPipe,
    Victorious(VictoryCutscene),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    Attached { rope: usize },
    Released { rope: usize, velocity: Vec2 },
    Landed,
    LeftGround,
    EnteredPipe,
    ExitedPipe,
    ReachedFinish,
    CutsceneFinished,
    FellIntoSea,
}

/// Everything the player collides with, handed in per tick.
pub struct Colliders<'a> {
    pub ropes: &'a [Rope],
    pub dune: &'a SandDune,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    state: MotionState,
    /// Rope let go of most recently; it can't be re-grabbed straight away.
    last_released: Option<usize>,
}

impl Player {
    pub fn new(pos: Vec2, settings: &SwingPlayerSettings) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius: settings.radius,
            state: MotionState::Free {
                recapture_cooldown: 0,
            },
            last_released: None,
        }
    }

    pub fn state(&self) -> &MotionState {
        &self.state
    }

    pub fn attached_rope(&self) -> Option<usize> {
        match &self.state {
            MotionState::RopeAttached(a) => Some(a.rope),
            _ => None,
        }
    }

    pub fn opacity(&self) -> f32 {
        match &self.state {
            MotionState::Victorious(c) => c.opacity(),
            _ => 1.0,
        }
    }

    pub fn scale(&self) -> f32 {
        match &self.state {
            MotionState::Victorious(c) => c.scale(),
            _ => 1.0,
        }
    }

    /// Grab `rope`, freezing the current distance to its anchor as the swing radius.
    pub fn attach(&mut self, index: usize, rope: &Rope) -> PlayerEvent {
        let offset = self.pos - rope.anchor();
        self.state = MotionState::RopeAttached(RopeAttachment {
            rope: index,
            swing_angle: angle_from_vertical(offset),
            swing_speed: 0.0,
            attachment_distance: offset.length(),
            last_pos: self.pos,
        });
        self.vel = Vec2::ZERO;
        debug!(
            "Attached to rope {index} at distance {:.1}",
            offset.length()
        );
        PlayerEvent::Attached { rope: index }
    }

    /// Let go of the rope, keeping the motion seen over the last tick.
    pub fn release(&mut self, settings: &SwingPlayerSettings) -> Option<PlayerEvent> {
        let MotionState::RopeAttached(attachment) = &self.state else {
            return None;
        };
        let rope = attachment.rope;
        let velocity = ((self.pos - attachment.last_pos) * settings.release_scale)
            .clamp_length_max(settings.max_release_speed);

        self.vel = velocity;
        self.last_released = Some(rope);
        self.state = MotionState::Free {
            recapture_cooldown: 0,
        };
        debug!("Released rope {rope} with velocity {velocity:?}");
        Some(PlayerEvent::Released { rope, velocity })
    }

    /// Grab the first rope within reach, skipping the one just released.
    pub fn try_attach(
        &mut self,
        ropes: &[Rope],
        settings: &SwingPlayerSettings,
    ) -> Option<PlayerEvent> {
        let reach = self.radius + settings.attach_margin;
        let (index, rope) = ropes
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != self.last_released)
            .find(|(_, rope)| rope.distance_to(self.pos) < reach)?;
        self.last_released = None;
        Some(self.attach(index, rope))
    }

    pub fn update(
        &mut self,
        colliders: &Colliders,
        input: &SwingInput,
        settings: &RopeSwingSettings,
        dt: f32,
    ) -> Option<PlayerEvent> {
        let event = match self.state {
            MotionState::Free { .. } => self.update_free(colliders, input, settings),
            MotionState::RopeAttached(_) => self.update_swinging(colliders.ropes, input, settings),
            MotionState::TerrainContact { .. } => self.update_rolling(colliders, input, settings),
            MotionState::InPipe => self.update_in_pipe(colliders.dune, &settings.player),
            MotionState::Victorious(ref mut cutscene) => cutscene
                .update(&mut self.pos, dt, &settings.victory)
                .then_some(PlayerEvent::CutsceneFinished),
        };
        if let Some(event) = &event {
            debug!("Player event: {event:?}");
        }
        event
    }

    fn update_free(
        &mut self,
        colliders: &Colliders,
        input: &SwingInput,
        settings: &RopeSwingSettings,
    ) -> Option<PlayerEvent> {
        let player = &settings.player;
        if input.grab_held {
            if let Some(event) = self.try_attach(colliders.ropes, player) {
                return Some(event);
            }
        }

        self.vel.x += input.steering.axis() * player.air_control;
        self.vel.y += settings.gravity;
        self.vel *= player.air_drag;
        self.pos += self.vel;

        if let MotionState::Free { recapture_cooldown } = &mut self.state {
            if *recapture_cooldown > 0 {
                *recapture_cooldown -= 1;
                return self.check_boundaries(settings);
            }
        }

        if let Some(event) = self.check_boundaries(settings) {
            return Some(event);
        }
        if self.pipe_captures(colliders.dune, player) {
            return Some(self.enter_pipe());
        }

        let contact = colliders.dune.closest_point(self.pos);
        if colliders.dune.contains_x(self.pos.x) && self.touches(&contact, player) {
            let roll_velocity = self.vel.dot(contact.tangent());
            self.settle_on(&contact, roll_velocity);
            return Some(PlayerEvent::Landed);
        }
        None
    }

    fn update_swinging(
        &mut self,
        ropes: &[Rope],
        input: &SwingInput,
        settings: &RopeSwingSettings,
    ) -> Option<PlayerEvent> {
        let player = &settings.player;
        let MotionState::RopeAttached(attachment) = &mut self.state else {
            return None;
        };
        let Some(rope) = ropes.get(attachment.rope) else {
            self.state = MotionState::Free {
                recapture_cooldown: 0,
            };
            return None;
        };

        if rope.is_moving() {
            attachment.swing_angle = rope.angle();
        } else if attachment.attachment_distance > 0.0 {
            let k = -settings.gravity / attachment.attachment_distance;
            attachment.swing_speed += attachment.swing_angle.sin() * k;
            attachment.swing_speed += input.steering.axis() * player.pump_strength;
            attachment.swing_speed *= player.pendulum_damping;
            attachment.swing_angle += attachment.swing_speed;
        }

        attachment.last_pos = self.pos;
        self.pos = swing_position(
            rope.anchor(),
            attachment.attachment_distance,
            attachment.swing_angle,
        );
        self.vel = self.pos - attachment.last_pos;
        None
    }

    fn update_rolling(
        &mut self,
        colliders: &Colliders,
        input: &SwingInput,
        settings: &RopeSwingSettings,
    ) -> Option<PlayerEvent> {
        let player = &settings.player;
        if input.grab_held {
            if let Some(event) = self.try_attach(colliders.ropes, player) {
                return Some(event);
            }
        }

        self.pos += self.vel;
        if let Some(event) = self.check_boundaries(settings) {
            return Some(event);
        }
        if self.pipe_captures(colliders.dune, player) {
            return Some(self.enter_pipe());
        }

        let dune = colliders.dune;
        let contact = dune.closest_point(self.pos);
        if !dune.contains_x(self.pos.x) || !self.touches(&contact, player) {
            self.state = MotionState::Free {
                recapture_cooldown: 0,
            };
            return Some(PlayerEvent::LeftGround);
        }

        let MotionState::TerrainContact { roll_velocity, .. } = self.state else {
            return None;
        };
        let roll_velocity =
            roll_velocity * player.roll_friction + settings.gravity * contact.normal_angle.sin();
        self.settle_on(&contact, roll_velocity);
        None
    }

    fn update_in_pipe(
        &mut self,
        dune: &SandDune,
        player: &SwingPlayerSettings,
    ) -> Option<PlayerEvent> {
        let pipe = dune.pipe();
        let to_exit = pipe.exit - self.pos;
        let distance = to_exit.length();

        if distance < player.pipe_exit_distance {
            self.pos = pipe.exit;
            self.vel = pipe.exit_direction * player.pipe_exit_boost;
            self.state = MotionState::Free {
                recapture_cooldown: player.recapture_ticks,
            };
            return Some(PlayerEvent::ExitedPipe);
        }

        let speed = (player.pipe_max_speed * (1.0 - distance / player.pipe_ease_distance))
            .max(player.pipe_min_speed);
        self.vel = to_exit / distance * speed.min(distance);
        self.pos += self.vel;
        None
    }

    /// Snap onto the contact sample and roll along its tangent.
    fn settle_on(&mut self, contact: &SurfaceContact, roll_velocity: f32) {
        self.pos = contact.point;
        self.vel = contact.tangent() * roll_velocity;
        self.state = MotionState::TerrainContact {
            normal_angle: contact.normal_angle,
            roll_velocity,
            sample: contact.index,
        };
    }

    fn touches(&self, contact: &SurfaceContact, player: &SwingPlayerSettings) -> bool {
        contact.distance < self.radius + player.contact_margin
    }

    fn pipe_captures(&self, dune: &SandDune, player: &SwingPlayerSettings) -> bool {
        let pipe = dune.pipe();
        self.pos.distance(pipe.entry) < pipe.radius + self.radius
            && self.pos.x <= pipe.entry.x
            && self.vel.x >= 0.0
            && (self.pos.y - pipe.entry.y).abs() <= player.pipe_vertical_tolerance
    }

    fn enter_pipe(&mut self) -> PlayerEvent {
        self.state = MotionState::InPipe;
        PlayerEvent::EnteredPipe
    }

    fn check_boundaries(&mut self, settings: &RopeSwingSettings) -> Option<PlayerEvent> {
        if self.pos.y - self.radius > settings.sea_level {
            return Some(PlayerEvent::FellIntoSea);
        }
        if self.pos.x >= settings.finish_x {
            let podium = Vec2::new(settings.podium_x, settings.podium_y);
            self.state = MotionState::Victorious(VictoryCutscene::new(podium, &settings.victory));
            self.vel = Vec2::ZERO;
            return Some(PlayerEvent::ReachedFinish);
        }
        None
    }
}

/// Point on a circle of `distance` around `anchor`, angle measured from the vertical.
pub fn swing_position(anchor: Vec2, distance: f32, angle: f32) -> Vec2 {
    anchor + from_vertical(angle) * distance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::DuneDef;

    const DT: f32 = 1.0 / 60.0;

    struct Fixture {
        settings: RopeSwingSettings,
        ropes: Vec<Rope>,
        dune: SandDune,
    }

    impl Fixture {
        fn new() -> Self {
            let settings = RopeSwingSettings::default();
            let ropes = vec![
                Rope::new(Vec2::new(200.0, 40.0), 200.0, 10, settings.gravity).unwrap(),
                Rope::new(Vec2::new(400.0, 40.0), 200.0, 10, settings.gravity)
                    .unwrap()
                    .scripted(0.03, 0.6, 0.0),
            ];
            let dune = SandDune::gaussian(&DuneDef::default()).unwrap();
            Self {
                settings,
                ropes,
                dune,
            }
        }

        fn step(&mut self, player: &mut Player, input: &SwingInput) -> Option<PlayerEvent> {
            for rope in &mut self.ropes {
                rope.update();
            }
            let colliders = Colliders {
                ropes: &self.ropes,
                dune: &self.dune,
            };
            player.update(&colliders, input, &self.settings, DT)
        }
    }

    #[test]
    fn swing_position_hangs_below_anchor() {
        assert_eq!(swing_position(Vec2::ZERO, 50.0, 0.0), Vec2::new(0.0, 50.0));
    }

    #[test]
    fn attach_then_release_has_no_velocity() {
        let fx = Fixture::new();
        let mut player = Player::new(Vec2::new(210.0, 150.0), &fx.settings.player);
        player.vel = Vec2::new(5.0, 3.0);

        player.attach(0, &fx.ropes[0]);
        let event = player.release(&fx.settings.player);

        assert_eq!(
            event,
            Some(PlayerEvent::Released {
                rope: 0,
                velocity: Vec2::ZERO
            })
        );
        assert_eq!(player.vel, Vec2::ZERO);
    }

    #[test]
    fn attach_freezes_anchor_distance() {
        let fx = Fixture::new();
        let mut player = Player::new(Vec2::new(200.0, 140.0), &fx.settings.player);
        player.attach(0, &fx.ropes[0]);
        let MotionState::RopeAttached(a) = player.state() else {
            panic!("expected attached, got {:?}", player.state());
        };
        assert!((a.attachment_distance - 100.0).abs() < 1e-4);
        assert_eq!(a.swing_angle, 0.0);
    }

    #[test]
    fn grab_needs_reach() {
        let mut fx = Fixture::new();
        let input = SwingInput {
            grab_held: true,
            ..SwingInput::default()
        };

        let mut far = Player::new(Vec2::new(260.0, 100.0), &fx.settings.player);
        assert!(!matches!(
            fx.step(&mut far, &input),
            Some(PlayerEvent::Attached { .. })
        ));

        let mut near = Player::new(Vec2::new(212.0, 100.0), &fx.settings.player);
        assert_eq!(
            fx.step(&mut near, &input),
            Some(PlayerEvent::Attached { rope: 0 })
        );
    }

    #[test]
    fn just_released_rope_is_skipped() {
        let mut fx = Fixture::new();
        let mut player = Player::new(Vec2::new(200.0, 150.0), &fx.settings.player);
        player.attach(0, &fx.ropes[0]);
        player.release(&fx.settings.player);

        let input = SwingInput {
            grab_held: true,
            ..SwingInput::default()
        };
        let event = fx.step(&mut player, &input);
        assert!(!matches!(event, Some(PlayerEvent::Attached { .. })));
        assert!(matches!(player.state(), MotionState::Free { .. }));
    }

    #[test]
    fn static_rope_swing_decays() {
        let mut fx = Fixture::new();
        let anchor = fx.ropes[0].anchor();
        let mut player = Player::new(swing_position(anchor, 150.0, 0.8), &fx.settings.player);
        player.attach(0, &fx.ropes[0]);

        let input = SwingInput::default();
        let mut peaks = Vec::new();
        let mut prev_angle = 0.8f32;
        let mut prev_speed = 0.0f32;
        for _ in 0..3000 {
            fx.step(&mut player, &input);
            let MotionState::RopeAttached(a) = player.state() else {
                panic!("fell off the rope");
            };
            assert!(a.swing_angle.is_finite());
            assert!(
                a.swing_angle.abs() <= 0.8 + 1e-4,
                "diverged: {}",
                a.swing_angle
            );
            if prev_speed.signum() != a.swing_speed.signum() && prev_speed != 0.0 {
                peaks.push(prev_angle.abs());
            }
            prev_angle = a.swing_angle;
            prev_speed = a.swing_speed;
        }
        assert!(
            peaks.len() > 4,
            "expected oscillation, saw {} turns",
            peaks.len()
        );
        assert!(peaks.windows(2).all(|w| w[1] <= w[0] + 1e-5));
        assert!(peaks.last().unwrap() < &(peaks[0] * 0.5));
    }

    #[test]
    fn scripted_rope_drives_position() {
        let mut fx = Fixture::new();
        let mut player = Player::new(fx.ropes[1].end(), &fx.settings.player);
        player.attach(1, &fx.ropes[1]);
        for _ in 0..30 {
            fx.step(&mut player, &SwingInput::default());
        }
        let rope = &fx.ropes[1];
        let expected = swing_position(rope.anchor(), 200.0, rope.angle());
        assert!(player.pos.distance(expected) < 1e-3);
    }

    #[test]
    fn release_speed_is_clamped() {
        let fx = Fixture::new();
        let mut player = Player::new(Vec2::new(200.0, 240.0), &fx.settings.player);
        player.attach(0, &fx.ropes[0]);
        player.pos += Vec2::new(50.0, 0.0);
        player.release(&fx.settings.player);
        assert!((player.vel.length() - fx.settings.player.max_release_speed).abs() < 1e-4);
        assert!(player.vel.x > 0.0);
    }

    #[test]
    fn resting_on_a_sample_snaps_to_it() {
        let mut fx = Fixture::new();
        let sample = fx.dune.points()[300];
        let mut player = Player::new(sample, &fx.settings.player);

        let event = fx.step(&mut player, &SwingInput::default());

        assert_eq!(event, Some(PlayerEvent::Landed));
        assert_eq!(player.pos.y, sample.y);
        assert!(matches!(
            player.state(),
            MotionState::TerrainContact { sample: 300, .. }
        ));
    }

    #[test]
    fn rolls_downhill() {
        let mut fx = Fixture::new();
        // Right-hand slope, past the pipe exit.
        let sample = fx.dune.points()[370];
        let mut player = Player::new(sample, &fx.settings.player);
        let input = SwingInput::default();
        for _ in 0..40 {
            fx.step(&mut player, &input);
        }
        assert!(player.pos.x > sample.x);
        if let MotionState::TerrainContact { roll_velocity, .. } = player.state() {
            assert!(*roll_velocity > 0.0);
        }
    }

    #[test]
    fn pipe_carries_player_to_exit() {
        let mut fx = Fixture::new();
        let pipe = fx.dune.pipe().clone();
        let reach = pipe.radius + fx.settings.player.radius;
        let mut player = Player::new(
            pipe.entry - Vec2::new(reach - 2.0, 0.0),
            &fx.settings.player,
        );
        player.vel = Vec2::new(1.0, 0.0);

        let input = SwingInput::default();
        assert_eq!(fx.step(&mut player, &input), Some(PlayerEvent::EnteredPipe));

        let mut last = player.pos.distance(pipe.exit);
        let mut exited = false;
        for _ in 0..500 {
            match fx.step(&mut player, &input) {
                Some(PlayerEvent::ExitedPipe) => {
                    exited = true;
                    break;
                }
                other => assert_eq!(other, None),
            }
            let d = player.pos.distance(pipe.exit);
            assert!(d < last, "distance went from {last} to {d}");
            last = d;
        }
        assert!(exited);
        assert!(last < fx.settings.player.pipe_exit_distance);
        assert_eq!(
            player.state(),
            &MotionState::Free {
                recapture_cooldown: fx.settings.player.recapture_ticks
            }
        );
        assert!(player.vel.dot(pipe.exit_direction) > 0.0);
    }

    #[test]
    fn pipe_ignores_approach_from_the_right() {
        let mut fx = Fixture::new();
        let pipe = fx.dune.pipe().clone();
        let mut player = Player::new(pipe.entry + Vec2::new(10.0, -20.0), &fx.settings.player);
        player.vel = Vec2::new(-1.0, 0.0);
        assert_ne!(
            fx.step(&mut player, &SwingInput::default()),
            Some(PlayerEvent::EnteredPipe)
        );
    }

    #[test]
    fn recapture_cooldown_suppresses_landing() {
        let mut fx = Fixture::new();
        let sample = fx.dune.points()[300];
        let mut player = Player::new(sample, &fx.settings.player);
        player.state = MotionState::Free {
            recapture_cooldown: 3,
        };
        for _ in 0..3 {
            assert_eq!(fx.step(&mut player, &SwingInput::default()), None);
        }
    }

    #[test]
    fn sinking_below_sea_level_is_reported() {
        let mut fx = Fixture::new();
        let sea_level = fx.settings.sea_level;
        assert!(sea_level + 20.0 < fx.settings.world_height);

        let mut afloat = Player::new(Vec2::new(100.0, sea_level), &fx.settings.player);
        assert_eq!(fx.step(&mut afloat, &SwingInput::default()), None);

        let mut sunk = Player::new(Vec2::new(100.0, sea_level + 20.0), &fx.settings.player);
        assert_eq!(
            fx.step(&mut sunk, &SwingInput::default()),
            Some(PlayerEvent::FellIntoSea)
        );
    }

    #[test]
    fn rolling_off_the_dune_end_leaves_the_ground() {
        let mut fx = Fixture::new();
        let points = fx.dune.points();
        let mut player = Player::new(points[points.len() - 3], &fx.settings.player);
        let input = SwingInput::default();

        assert_eq!(fx.step(&mut player, &input), Some(PlayerEvent::Landed));
        let mut left = false;
        for _ in 0..200 {
            match fx.step(&mut player, &input) {
                Some(PlayerEvent::LeftGround) => {
                    left = true;
                    break;
                }
                other => assert_eq!(other, None),
            }
        }
        assert!(left, "still rolling at {:?}", player.pos);
        assert!(!fx.dune.contains_x(player.pos.x));
        assert_eq!(
            player.state(),
            &MotionState::Free {
                recapture_cooldown: 0
            }
        );
    }

    #[test]
    fn recapture_cooldown_blocks_pipe_entry() {
        let mut fx = Fixture::new();
        let pipe = fx.dune.pipe().clone();
        let reach = pipe.radius + fx.settings.player.radius;
        let mut player = Player::new(
            pipe.entry - Vec2::new(reach - 8.0, 0.0),
            &fx.settings.player,
        );
        player.vel = Vec2::new(1.0, 0.0);
        player.state = MotionState::Free {
            recapture_cooldown: 3,
        };

        let input = SwingInput::default();
        for _ in 0..3 {
            assert_eq!(fx.step(&mut player, &input), None);
            assert!(matches!(player.state(), MotionState::Free { .. }));
        }
        assert_eq!(fx.step(&mut player, &input), Some(PlayerEvent::EnteredPipe));
    }

    #[test]
    fn pipe_ignores_players_outside_the_vertical_band() {
        let mut fx = Fixture::new();
        let pipe = fx.dune.pipe().clone();
        let mut player = Player::new(pipe.entry + Vec2::new(-5.0, -30.0), &fx.settings.player);
        player.vel = Vec2::new(1.0, 0.0);
        assert!(player.pos.distance(pipe.entry) < pipe.radius + player.radius);

        let event = fx.step(&mut player, &SwingInput::default());
        assert_ne!(event, Some(PlayerEvent::EnteredPipe));
        assert_ne!(player.state(), &MotionState::InPipe);
    }

    #[test]
    fn crossing_finish_starts_cutscene() {
        let mut fx = Fixture::new();
        let finish = fx.settings.finish_x;
        let mut player = Player::new(Vec2::new(finish - 1.0, 200.0), &fx.settings.player);
        player.vel = Vec2::new(5.0, 0.0);
        assert_eq!(
            fx.step(&mut player, &SwingInput::default()),
            Some(PlayerEvent::ReachedFinish)
        );
        assert!(matches!(player.state(), MotionState::Victorious(_)));

        let mut finished = false;
        for _ in 0..2000 {
            if fx.step(&mut player, &SwingInput::default()) == Some(PlayerEvent::CutsceneFinished) {
                finished = true;
                break;
            }
        }
        assert!(finished);
    }
}
