use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use super::dune::SandDune;
use super::player::{Colliders, MotionState, Player, PlayerEvent};
use super::rope::Rope;
use super::scenery::Scenery;
use crate::error::SettingsError;
use crate::input::{Direction, SwingInput};
use crate::particles::ParticleSystem;
use crate::settings::RopeSwingSettings;

const EXPLOSION_GRAVITY: f32 = 0.1;
/// Share of the release velocity pushed back into a free rope.
const KICK_BACK: f32 = 0.3;

/// Rope swinging across the dune to the finish line.
pub struct RopeSwingGame {
    settings: RopeSwingSettings,
    ropes: Vec<Rope>,
    dune: SandDune,
    player: Player,
    input: SwingInput,
    scenery: Scenery,
    explosion: ParticleSystem,
    rng: StdRng,
    camera_x: f32,
    attempts: u32,
    victories: u32,
}

impl RopeSwingGame {
    pub fn new(settings: RopeSwingSettings, seed: u64) -> Result<Self, SettingsError> {
        settings.validate()?;
        let ropes = settings
            .ropes
            .iter()
            .map(|def| Rope::from_def(def, settings.gravity))
            .collect::<Result<Vec<_>, _>>()?;
        let dune = SandDune::gaussian(&settings.dune)?;
        let mut rng = StdRng::seed_from_u64(seed);
        let scenery = Scenery::new(&mut rng, &settings);
        let player = Player::new(Vec2::ZERO, &settings.player);

        let mut game = Self {
            settings,
            ropes,
            dune,
            player,
            input: SwingInput::default(),
            scenery,
            explosion: ParticleSystem::new(EXPLOSION_GRAVITY),
            rng,
            camera_x: 0.0,
            attempts: 0,
            victories: 0,
        };
        game.reset_player();
        Ok(game)
    }

    /// Put the player back on the end of the starting rope.
    pub fn reset_player(&mut self) {
        let index = self.settings.initial_rope;
        let rope = &self.ropes[index];
        self.player = Player::new(rope.end(), &self.settings.player);
        self.player.attach(index, rope);
        self.input.grab_held = false;
        self.attempts += 1;
        info!("Attempt {} starts on rope {index}", self.attempts);
    }

    pub fn pointer_down(&mut self) {
        self.input.grab_held = true;
    }

    pub fn pointer_up(&mut self) {
        self.input.grab_held = false;
        if let Some(PlayerEvent::Released { rope, velocity }) =
            self.player.release(&self.settings.player)
        {
            // Kicking off swings a hanging rope back the other way.
            self.ropes[rope].push_end(-velocity * KICK_BACK);
        }
    }

    pub fn key_down(&mut self, dir: Direction) {
        self.input.steering.press(dir);
    }

    pub fn key_up(&mut self, dir: Direction) {
        self.input.steering.release(dir);
    }

    pub fn tilt(&mut self, gamma: f32) {
        self.input.steering.apply_tilt(gamma, &self.settings.input);
    }

    pub fn update(&mut self, dt: f32) {
        for rope in &mut self.ropes {
            rope.update();
        }

        let colliders = Colliders {
            ropes: &self.ropes,
            dune: &self.dune,
        };
        let event = self
            .player
            .update(&colliders, &self.input, &self.settings, dt);
        match event {
            Some(PlayerEvent::ReachedFinish) => {
                self.victories += 1;
                info!("Finish line reached after {} attempt(s)", self.attempts);
                self.explosion.burst(
                    &mut self.rng,
                    self.player.pos,
                    self.settings.victory.explosion_particles,
                );
            }
            Some(PlayerEvent::CutsceneFinished) => {
                self.attempts = 0;
                self.reset_player();
            }
            Some(PlayerEvent::FellIntoSea) => {
                info!("Fell into the sea at x={:.0}", self.player.pos.x);
                self.reset_player();
            }
            _ => {}
        }

        self.scenery.update();
        self.explosion.update(dt);
        self.follow_player();
    }

    fn follow_player(&mut self) {
        let max_x = (self.settings.world_width - self.settings.view_width).max(0.0);
        self.camera_x = (self.player.pos.x - self.settings.view_width / 3.0).clamp(0.0, max_x);
    }

    pub fn settings(&self) -> &RopeSwingSettings {
        &self.settings
    }

    pub fn ropes(&self) -> &[Rope] {
        &self.ropes
    }

    pub fn dune(&self) -> &SandDune {
        &self.dune
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn scenery(&self) -> &Scenery {
        &self.scenery
    }

    pub fn explosion(&self) -> &ParticleSystem {
        &self.explosion
    }

    pub fn camera_x(&self) -> f32 {
        self.camera_x
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn victories(&self) -> u32 {
        self.victories
    }

    pub fn is_celebrating(&self) -> bool {
        matches!(self.player.state(), MotionState::Victorious(_))
    }
}
