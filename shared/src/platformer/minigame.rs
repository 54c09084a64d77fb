use glam::Vec2;
use rand::Rng;
use tracing::debug;

use crate::input::Steering;
use crate::settings::{MinigameSettings, PlatformerSettings};

/// Difficulty parameters at some point of the minigame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Difficulty {
    /// 0 at the start, 1 once the full duration has elapsed.
    pub progress: f32,
    pub gravity: f32,
    /// Multiplier on the beam tilt speed.
    pub tilt_factor: f32,
    pub beam_width: f32,
}

impl Difficulty {
    pub fn at(elapsed: f32, settings: &MinigameSettings) -> Self {
        let progress = (elapsed / settings.duration).clamp(0.0, 1.0);
        let lerp = |from: f32, to: f32| from + (to - from) * progress;
        Self {
            progress,
            gravity: lerp(settings.initial_gravity, settings.final_gravity),
            tilt_factor: lerp(1.0, settings.max_tilt_factor),
            beam_width: lerp(settings.initial_beam_width, settings.min_beam_width),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Beam {
    /// Pivot, the middle of the beam's top edge.
    pub pivot: Vec2,
    pub width: f32,
    pub height: f32,
    pub angle: f32,
}

impl Beam {
    /// Height of the beam line at `x`, if `x` is over the beam.
    pub fn surface_at(&self, x: f32) -> Option<f32> {
        let half = self.width / 2.0;
        let rel_x = x - self.pivot.x;
        (-half..=half)
            .contains(&rel_x)
            .then(|| self.pivot.y + self.angle.sin() * rel_x)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ball {
    pub pos: Vec2,
    /// Pixels per tick.
    pub vel: Vec2,
    pub radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinigameOutcome {
    Won,
    Lost,
}

/// Keep the ball on a tilting, shrinking beam until the timer runs out.
#[derive(Debug, Clone)]
pub struct BalanceMinigame {
    elapsed: f32,
    beam: Beam,
    ball: Ball,
    bounds: Vec2,
}

impl BalanceMinigame {
    /// Ball dropped above the centre; the beam starts at a random tilt.
    pub fn new<R: Rng + ?Sized>(rng: &mut R, settings: &PlatformerSettings) -> Self {
        let game = &settings.minigame;
        let centre = Vec2::new(settings.canvas_width, settings.canvas_height) / 2.0;
        let angle = (rng.random::<f32>() * 2.0 - 1.0) * game.max_beam_angle;
        debug!("Minigame starts with beam angle {angle:.3}");
        Self {
            elapsed: 0.0,
            beam: Beam {
                pivot: centre + Vec2::new(0.0, game.beam_offset_y),
                width: game.initial_beam_width,
                height: game.beam_height,
                angle,
            },
            ball: Ball {
                pos: centre - Vec2::new(0.0, game.ball_drop_height),
                vel: Vec2::ZERO,
                radius: game.ball_radius,
            },
            bounds: Vec2::new(settings.canvas_width, settings.canvas_height),
        }
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn time_left(&self, settings: &MinigameSettings) -> f32 {
        (settings.duration - self.elapsed).max(0.0)
    }

    pub fn beam(&self) -> &Beam {
        &self.beam
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    /// Advance one tick. Returns the outcome once the minigame is decided.
    pub fn update(
        &mut self,
        dt: f32,
        steering: &Steering,
        settings: &PlatformerSettings,
    ) -> Option<MinigameOutcome> {
        let game = &settings.minigame;
        let step = settings.fixed_step;
        self.elapsed += dt;

        let difficulty = Difficulty::at(self.elapsed, game);
        self.beam.width = difficulty.beam_width;

        let tilt = game.tilt_speed
            * difficulty.tilt_factor
            * steering.multiplier(&settings.input)
            * step
            * steering.axis();
        self.beam.angle = (self.beam.angle + tilt).clamp(-game.max_beam_angle, game.max_beam_angle);

        self.ball.vel.y += difficulty.gravity * step;
        self.ball.pos += self.ball.vel;

        if let Some(surface) = self.beam.surface_at(self.ball.pos.x) {
            if (self.ball.pos.y - surface).abs() < self.ball.radius + self.beam.height / 2.0 {
                self.ball.pos.y = surface - self.ball.radius;
                self.ball.vel.y = 0.0;
                self.ball.vel.x += self.beam.angle.sin() * difficulty.gravity * step;
            }
        }

        if self.ball_escaped() {
            return Some(MinigameOutcome::Lost);
        }
        (self.elapsed >= game.duration).then_some(MinigameOutcome::Won)
    }

    fn ball_escaped(&self) -> bool {
        let Ball { pos, radius, .. } = self.ball;
        pos.x < -radius
            || pos.x > self.bounds.x + radius
            || pos.y < -radius
            || pos.y > self.bounds.y + radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Direction;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn minigame(seed: u64) -> (BalanceMinigame, PlatformerSettings) {
        let settings = PlatformerSettings::default();
        let game = BalanceMinigame::new(&mut StdRng::seed_from_u64(seed), &settings);
        (game, settings)
    }

    #[test]
    fn beam_width_shrinks_linearly() {
        let settings = MinigameSettings::default();
        assert_eq!(Difficulty::at(0.0, &settings).beam_width, 120.0);
        assert_eq!(
            Difficulty::at(settings.duration, &settings).beam_width,
            40.0
        );
        assert_eq!(
            Difficulty::at(settings.duration * 2.0, &settings).beam_width,
            40.0
        );

        let mut last = f32::INFINITY;
        for i in 0..=50 {
            let width = Difficulty::at(settings.duration * i as f32 / 50.0, &settings).beam_width;
            assert!(width <= last);
            last = width;
        }
    }

    #[test]
    fn difficulty_ramps() {
        let settings = MinigameSettings::default();
        let half = Difficulty::at(settings.duration / 2.0, &settings);
        assert!((half.progress - 0.5).abs() < 1e-6);
        assert!((half.gravity - 10.0).abs() < 1e-5);
        assert!((half.tilt_factor - 2.0).abs() < 1e-5);
        assert_eq!(
            Difficulty::at(settings.duration, &settings).tilt_factor,
            3.0
        );
    }

    #[test]
    fn starts_with_ball_above_centre() {
        let (game, settings) = minigame(1);
        assert_eq!(game.ball().pos, Vec2::new(200.0, 200.0));
        assert_eq!(game.beam().pivot, Vec2::new(200.0, 350.0));
        assert!(game.beam().angle.abs() <= settings.minigame.max_beam_angle);
    }

    #[test]
    fn ball_lands_on_beam() {
        let (mut game, settings) = minigame(2);
        game.beam.angle = 0.0;
        let steering = Steering::default();
        for _ in 0..60 {
            assert_eq!(game.update(settings.fixed_step, &steering, &settings), None);
        }
        let surface = game.beam().surface_at(game.ball().pos.x).unwrap();
        assert!((game.ball().pos.y - (surface - game.ball().radius)).abs() < 1e-3);
        assert_eq!(game.ball().vel.y, 0.0);
    }

    #[test]
    fn tilt_is_clamped() {
        let (mut game, settings) = minigame(3);
        let mut steering = Steering::default();
        steering.press(Direction::Right);
        for _ in 0..60 {
            game.update(settings.fixed_step, &steering, &settings);
        }
        assert_eq!(game.beam().angle, settings.minigame.max_beam_angle);
    }

    #[test]
    fn surviving_the_duration_wins() {
        let (mut game, settings) = minigame(4);
        game.beam.angle = 0.0;
        let steering = Steering::default();
        let mut outcome = None;
        for _ in 0..400 {
            outcome = game.update(settings.fixed_step, &steering, &settings);
            if outcome.is_some() {
                break;
            }
        }
        // A flat beam never moves the ball sideways.
        assert_eq!(outcome, Some(MinigameOutcome::Won));
        assert!(game.elapsed() >= settings.minigame.duration);
    }

    #[test]
    fn loss_beats_win_on_the_same_tick() {
        let (mut game, settings) = minigame(5);
        game.elapsed = settings.minigame.duration;
        game.ball.pos = Vec2::new(-50.0, 100.0);
        let outcome = game.update(settings.fixed_step, &Steering::default(), &settings);
        assert_eq!(outcome, Some(MinigameOutcome::Lost));
    }

    #[test]
    fn tilted_beam_rolls_ball_off() {
        let (mut game, settings) = minigame(6);
        let mut steering = Steering::default();
        steering.press(Direction::Left);
        let mut outcome = None;
        for _ in 0..300 {
            outcome = game.update(settings.fixed_step, &steering, &settings);
            if outcome.is_some() {
                break;
            }
        }
        assert_eq!(outcome, Some(MinigameOutcome::Lost));
    }
}
