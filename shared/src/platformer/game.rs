use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use super::minigame::{BalanceMinigame, MinigameOutcome};
use crate::error::SettingsError;
use crate::input::{Direction, Steering};
use crate::math::{ease_in_out_quad, wrap_x};
use crate::particles::ParticleSystem;
use crate::settings::PlatformerSettings;

/// Vertical velocity handed back to the climber when a transition ends.
const BOOST_EXIT_VELOCITY: f32 = -0.2;
const FALL_EXIT_VELOCITY: f32 = 0.2;

#[derive(Debug, Clone, PartialEq)]
pub struct Platform {
    /// Top-left corner.
    pub pos: Vec2,
    /// Black hole: touching it starts the minigame.
    pub is_special: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Climber {
    /// Top-left corner.
    pub pos: Vec2,
    /// Pixels per tick.
    pub vel: Vec2,
    pub size: Vec2,
}

impl Climber {
    fn overlaps(&self, platform: &Platform, platform_size: Vec2) -> bool {
        self.pos.x + self.size.x > platform.pos.x
            && self.pos.x < platform.pos.x + platform_size.x
            && self.pos.y + self.size.y > platform.pos.y
            && self.pos.y < platform.pos.y + platform_size.y
    }

    /// Where exhaust leaves the rocket.
    pub fn exhaust_origin(&self) -> Vec2 {
        self.pos + Vec2::new(self.size.x / 2.0, self.size.y)
    }
}

#[derive(Debug, Clone)]
pub enum Phase {
    Climbing,
    /// Climber is pulled into the black hole at `platform`.
    EnteringMinigame {
        elapsed: f32,
        from: Vec2,
        to: Vec2,
        platform: usize,
    },
    Minigame {
        game: BalanceMinigame,
        platform: usize,
    },
    RocketBoost {
        elapsed: f32,
    },
    Falling {
        elapsed: f32,
    },
    GameOver,
}

/// Auto-bouncing climber with the balance minigame behind black holes.
pub struct PlatformerGame {
    settings: PlatformerSettings,
    phase: Phase,
    climber: Climber,
    platforms: Vec<Platform>,
    score: u32,
    /// Platforms recycled since the last special one.
    since_special: u32,
    steering: Steering,
    exhaust: ParticleSystem,
    rng: StdRng,
}

impl PlatformerGame {
    pub fn new(settings: PlatformerSettings, seed: u64) -> Result<Self, SettingsError> {
        settings.validate()?;
        let mut game = Self {
            climber: Climber {
                pos: Vec2::ZERO,
                vel: Vec2::ZERO,
                size: Vec2::new(settings.player_width, settings.player_height),
            },
            settings,
            phase: Phase::Climbing,
            platforms: Vec::new(),
            score: 0,
            since_special: 0,
            steering: Steering::default(),
            exhaust: ParticleSystem::new(0.0),
            rng: StdRng::seed_from_u64(seed),
        };
        game.restart();
        Ok(game)
    }

    /// Fresh run: new platforms, zero score, climber above a start platform.
    pub fn restart(&mut self) {
        let (width, height) = (self.settings.canvas_width, self.settings.canvas_height);
        self.climber.pos = Vec2::new(width / 2.0, height - 100.0);
        self.climber.vel = Vec2::new(0.0, -0.6);

        let spacing = self.settings.platform_spacing();
        self.platforms.clear();
        for i in 0..self.settings.platform_count {
            let x = self.random_platform_x();
            self.platforms.push(Platform {
                pos: Vec2::new(x, i as f32 * spacing),
                is_special: false,
            });
        }
        self.platforms[0].pos = Vec2::new(
            self.climber.pos.x - self.settings.platform_width / 2.0,
            self.climber.pos.y + self.climber.size.y,
        );

        self.score = 0;
        self.since_special = 0;
        self.exhaust.clear();
        self.phase = Phase::Climbing;
        info!("New game started");
    }

    pub fn key_down(&mut self, dir: Direction) {
        self.steering.press(dir);
    }

    pub fn key_up(&mut self, dir: Direction) {
        self.steering.release(dir);
    }

    pub fn tilt(&mut self, gamma: f32) {
        self.steering.apply_tilt(gamma, &self.settings.input);
    }

    pub fn update(&mut self, dt: f32) {
        match &mut self.phase {
            Phase::GameOver => {}
            Phase::Climbing => self.climb(),
            Phase::EnteringMinigame {
                elapsed,
                from,
                to,
                platform,
            } => {
                *elapsed += dt;
                let progress = (*elapsed / self.settings.enter_minigame_duration).min(1.0);
                self.climber.pos = from.lerp(*to, ease_in_out_quad(progress));
                if progress >= 1.0 {
                    let platform = *platform;
                    let game = BalanceMinigame::new(&mut self.rng, &self.settings);
                    self.phase = Phase::Minigame { game, platform };
                }
            }
            Phase::Minigame { game, platform } => {
                let platform = *platform;
                if let Some(outcome) = game.update(dt, &self.steering, &self.settings) {
                    self.end_minigame(outcome, platform);
                }
            }
            Phase::RocketBoost { elapsed } => {
                *elapsed += dt;
                let done = *elapsed >= self.settings.boost_duration;
                self.steer_during_transition();
                self.scroll_boost(dt);
                self.exhaust.update(dt);
                if done {
                    self.climber.vel.y = BOOST_EXIT_VELOCITY;
                    self.phase = Phase::Climbing;
                    debug!("Rocket boost finished, score {}", self.score);
                } else {
                    for _ in 0..self.settings.exhaust_particles_per_tick {
                        self.exhaust
                            .spawn_exhaust(&mut self.rng, self.climber.exhaust_origin());
                    }
                }
            }
            Phase::Falling { elapsed } => {
                *elapsed += dt;
                let done = *elapsed >= self.settings.fall_duration;
                self.steer_during_transition();
                self.scroll_fall(dt);
                if done {
                    self.climber.vel.y = FALL_EXIT_VELOCITY;
                    self.phase = Phase::Climbing;
                    debug!("Fall finished, score {}", self.score);
                }
            }
        }
    }

    fn climb(&mut self) {
        let s = &self.settings;
        let step = s.fixed_step;
        self.climber.vel.x =
            self.steering.axis() * s.player_speed * self.steering.multiplier(&s.input) * step;
        self.climber.vel.y += s.gravity * step;
        self.climber.pos += self.climber.vel;
        self.climber.pos.x = wrap_x(self.climber.pos.x, s.canvas_width);

        let platform_size = Vec2::new(s.platform_width, s.platform_height);
        let mut black_hole = None;
        for (index, platform) in self.platforms.iter().enumerate() {
            if !self.climber.overlaps(platform, platform_size) {
                continue;
            }
            if platform.is_special {
                black_hole = Some(index);
                break;
            }
            if self.climber.vel.y > 0.0 {
                self.climber.vel.y = s.jump_force;
            }
        }
        if let Some(index) = black_hole {
            self.enter_minigame(index);
            return;
        }

        let scroll_line = s.canvas_height / 3.0;
        if self.climber.pos.y < scroll_line {
            let offset = scroll_line - self.climber.pos.y;
            self.climber.pos.y += offset;
            for i in 0..self.platforms.len() {
                self.platforms[i].pos.y += offset;
                if self.platforms[i].pos.y > self.settings.canvas_height {
                    self.platforms[i] = self.recycled_platform();
                    self.score += self.settings.score_per_platform;
                }
            }
        }

        if self.climber.pos.y - self.climber.size.y > self.settings.canvas_height {
            info!("Game over with score {}", self.score);
            self.phase = Phase::GameOver;
        }
    }

    /// Replacement for a platform that left the bottom; every n-th one is special.
    fn recycled_platform(&mut self) -> Platform {
        self.since_special += 1;
        let is_special = self.since_special >= self.settings.special_platform_interval;
        if is_special {
            self.since_special = 0;
        }
        Platform {
            pos: Vec2::new(self.random_platform_x(), 0.0),
            is_special,
        }
    }

    fn enter_minigame(&mut self, platform: usize) {
        let target = &self.platforms[platform];
        let centre = target.pos
            + Vec2::new(self.settings.platform_width, self.settings.platform_height) / 2.0;
        debug!("Black hole hit at {:?}", target.pos);
        self.phase = Phase::EnteringMinigame {
            elapsed: 0.0,
            from: self.climber.pos,
            to: centre - self.climber.size / 2.0,
            platform,
        };
    }

    fn end_minigame(&mut self, outcome: MinigameOutcome, platform: usize) {
        if let Some(platform) = self.platforms.get_mut(platform) {
            platform.is_special = false;
        }
        match outcome {
            MinigameOutcome::Won => {
                info!("Minigame won, boosting");
                self.exhaust.clear();
                let origin = self.climber.exhaust_origin();
                for _ in 0..self.settings.initial_exhaust_particles {
                    self.exhaust.spawn_exhaust(&mut self.rng, origin);
                }
                self.phase = Phase::RocketBoost { elapsed: 0.0 };
            }
            MinigameOutcome::Lost => {
                let penalty = self.settings.max_fall_penalty.min(self.score);
                self.score -= penalty;
                info!("Minigame lost, {penalty} points deducted");
                self.phase = Phase::Falling { elapsed: 0.0 };
            }
        }
    }

    fn steer_during_transition(&mut self) {
        let s = &self.settings;
        self.climber.pos.x += self.steering.axis()
            * s.player_speed
            * self.steering.multiplier(&s.input)
            * s.fixed_step;
        self.climber.pos.x = wrap_x(self.climber.pos.x, s.canvas_width);
    }

    /// Platforms stream downwards; each one leaving the bottom scores.
    fn scroll_boost(&mut self, dt: f32) {
        let shift = self.settings.transition_scroll_speed * dt;
        let spacing = self.settings.platform_spacing();
        let bottom = self.settings.canvas_height + spacing;

        for platform in &mut self.platforms {
            platform.pos.y += shift;
        }
        let before = self.platforms.len();
        self.platforms.retain(|p| p.pos.y < bottom);
        let passed = (before - self.platforms.len()) as u32;
        self.score += passed * self.settings.score_per_platform;

        let mut highest = self
            .platforms
            .iter()
            .map(|p| p.pos.y)
            .fold(f32::INFINITY, f32::min);
        if !highest.is_finite() {
            highest = self.settings.canvas_height;
        }
        while highest > -spacing {
            highest -= spacing;
            let x = self.random_platform_x();
            self.platforms.push(Platform {
                pos: Vec2::new(x, highest),
                is_special: false,
            });
        }
    }

    /// Platforms stream upwards; the ones above the top are dropped.
    fn scroll_fall(&mut self, dt: f32) {
        let shift = self.settings.transition_scroll_speed * dt;
        let spacing = self.settings.platform_spacing();

        for platform in &mut self.platforms {
            platform.pos.y -= shift;
        }
        self.platforms.retain(|p| p.pos.y > -spacing);

        let mut lowest = self
            .platforms
            .iter()
            .map(|p| p.pos.y)
            .fold(f32::NEG_INFINITY, f32::max);
        if !lowest.is_finite() {
            lowest = -spacing;
        }
        let bottom = self.settings.canvas_height + spacing;
        while lowest < bottom {
            lowest += spacing;
            let x = self.random_platform_x();
            self.platforms.push(Platform {
                pos: Vec2::new(x, lowest),
                is_special: false,
            });
        }
    }

    fn random_platform_x(&mut self) -> f32 {
        let room = (self.settings.canvas_width - self.settings.platform_width).max(0.0);
        self.rng.random::<f32>() * room
    }

    pub fn settings(&self) -> &PlatformerSettings {
        &self.settings
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn climber(&self) -> &Climber {
        &self.climber
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn exhaust(&self) -> &ParticleSystem {
        &self.exhaust
    }

    pub fn minigame(&self) -> Option<&BalanceMinigame> {
        match &self.phase {
            Phase::Minigame { game, .. } => Some(game),
            _ => None,
        }
    }

    /// 0..=1 through the black hole animation, `None` outside it.
    pub fn entering_progress(&self) -> Option<f32> {
        match &self.phase {
            Phase::EnteringMinigame { elapsed, .. } => {
                Some((elapsed / self.settings.enter_minigame_duration).min(1.0))
            }
            _ => None,
        }
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self.phase, Phase::GameOver)
    }
}
