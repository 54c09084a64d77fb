use glam::Vec2;
use rand::Rng;

#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Remaining life in seconds.
    pub life: f32,
    pub max_life: f32,
}

impl Particle {
    /// 1 when freshly spawned, 0 when expired.
    pub fn fade(&self) -> f32 {
        if self.max_life > 0.0 {
            (self.life / self.max_life).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Short-lived visual particles (rocket exhaust, victory explosion).
#[derive(Debug, Clone, Default)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    /// Per-tick downward acceleration.
    gravity: f32,
}

impl ParticleSystem {
    pub fn new(gravity: f32) -> Self {
        Self {
            particles: Vec::new(),
            gravity,
        }
    }

    pub fn spawn(&mut self, pos: Vec2, vel: Vec2, life: f32) {
        self.particles.push(Particle {
            pos,
            vel,
            life,
            max_life: life,
        });
    }

    /// Exhaust puff below a rocket: mostly downward, slight horizontal spread.
    pub fn spawn_exhaust<R: Rng + ?Sized>(&mut self, rng: &mut R, origin: Vec2) {
        let vel = Vec2::new(
            (rng.random::<f32>() - 0.5) * 2.0,
            rng.random::<f32>() * 5.0 + 5.0,
        );
        let life = rng.random::<f32>() * 0.5 + 0.5;
        self.spawn(origin, vel, life);
    }

    /// Radial burst of `count` particles.
    pub fn burst<R: Rng + ?Sized>(&mut self, rng: &mut R, origin: Vec2, count: usize) {
        for _ in 0..count {
            let angle = rng.random::<f32>() * std::f32::consts::TAU;
            let speed = rng.random::<f32>() * 6.0 + 2.0;
            let life = rng.random::<f32>() + 1.0;
            self.spawn(origin, Vec2::from_angle(angle) * speed, life);
        }
    }

    pub fn update(&mut self, dt: f32) {
        let gravity = self.gravity;
        self.particles.retain_mut(|p| {
            p.pos += p.vel;
            p.vel.y += gravity;
            p.life -= dt;
            p.life > 0.0
        });
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn expired_particles_are_removed() {
        let mut system = ParticleSystem::new(0.0);
        system.spawn(Vec2::ZERO, Vec2::X, 0.1);
        system.spawn(Vec2::ZERO, Vec2::Y, 1.0);

        system.update(0.2);

        assert_eq!(system.len(), 1);
        let survivor = system.iter().next().unwrap();
        assert_eq!(survivor.pos, Vec2::Y);
    }

    #[test]
    fn each_live_particle_moves_once_per_tick() {
        let mut system = ParticleSystem::new(0.5);
        for i in 0..5 {
            system.spawn(Vec2::ZERO, Vec2::new(i as f32, 0.0), 10.0);
        }
        system.update(0.016);
        for (i, p) in system.iter().enumerate() {
            assert_eq!(p.pos.x, i as f32);
            assert_eq!(p.vel.y, 0.5);
        }
    }

    #[test]
    fn exhaust_goes_down() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut system = ParticleSystem::default();
        for _ in 0..50 {
            system.spawn_exhaust(&mut rng, Vec2::ZERO);
        }
        assert!(system
            .iter()
            .all(|p| p.vel.y >= 5.0 && p.vel.x.abs() <= 1.0));
        assert!(system.iter().all(|p| (0.5..1.0).contains(&p.life)));
    }
}
