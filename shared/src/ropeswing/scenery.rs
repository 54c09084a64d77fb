use glam::Vec2;
use rand::Rng;

use crate::math::wrap_x;
use crate::settings::RopeSwingSettings;

#[derive(Debug, Clone)]
pub struct Cloud {
    pub pos: Vec2,
    pub speed: f32,
    pub scale: f32,
}

#[derive(Debug, Clone)]
pub struct Bird {
    pub pos: Vec2,
    pub speed: f32,
    /// Wing phase in radians.
    pub flap: f32,
}

/// Background decoration. Never touches gameplay state.
#[derive(Debug, Clone)]
pub struct Scenery {
    pub clouds: Vec<Cloud>,
    pub birds: Vec<Bird>,
    pub sun: Vec2,
    /// Phase of the sea surface wave.
    pub wave_phase: f32,
    world_width: f32,
}

impl Scenery {
    pub fn new<R: Rng + ?Sized>(rng: &mut R, settings: &RopeSwingSettings) -> Self {
        let width = settings.world_width;
        let clouds = (0..settings.scenery.clouds)
            .map(|_| Cloud {
                pos: Vec2::new(
                    rng.random::<f32>() * width,
                    rng.random::<f32>() * 150.0 + 20.0,
                ),
                speed: rng.random::<f32>() * 0.3 + 0.1,
                scale: rng.random::<f32>() * 0.6 + 0.7,
            })
            .collect();
        let birds = (0..settings.scenery.birds)
            .map(|_| Bird {
                pos: Vec2::new(
                    rng.random::<f32>() * width,
                    rng.random::<f32>() * 120.0 + 60.0,
                ),
                speed: rng.random::<f32>() * 1.0 + 0.8,
                flap: rng.random::<f32>() * std::f32::consts::TAU,
            })
            .collect();

        Self {
            clouds,
            birds,
            sun: Vec2::new(settings.scenery.sun_x, settings.scenery.sun_y),
            wave_phase: 0.0,
            world_width: width,
        }
    }

    pub fn update(&mut self) {
        let width = self.world_width;
        for cloud in &mut self.clouds {
            cloud.pos.x = wrap_x(cloud.pos.x + cloud.speed, width);
        }
        for bird in &mut self.birds {
            bird.pos.x = wrap_x(bird.pos.x + bird.speed, width);
            bird.flap = (bird.flap + 0.2) % std::f32::consts::TAU;
        }
        self.wave_phase = (self.wave_phase + 0.05) % std::f32::consts::TAU;
    }
}
