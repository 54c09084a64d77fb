use glam::Vec2;

use crate::error::{ensure_positive, SettingsError};
use crate::settings::DuneDef;

/// Teleport tube through the dune.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipe {
    pub entry: Vec2,
    pub exit: Vec2,
    pub radius: f32,
    /// Unit launch direction out of the exit.
    pub exit_direction: Vec2,
}

/// Nearest curve sample to some query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceContact {
    pub index: usize,
    pub point: Vec2,
    pub distance: f32,
    /// Tilt of the surface normal from straight up. Equals the slope angle of
    /// the tangent, so gravity along the surface is `g * sin(normal_angle)`.
    pub normal_angle: f32,
}

impl SurfaceContact {
    /// Unit tangent pointing towards +x.
    pub fn tangent(&self) -> Vec2 {
        Vec2::from_angle(self.normal_angle)
    }
}

/// Sampled sand hump. Immutable after construction.
#[derive(Debug, Clone)]
pub struct SandDune {
    points: Vec<Vec2>,
    pipe: Pipe,
}

impl SandDune {
    /// Samples a Gaussian hump and embeds the pipe mouths on its surface.
    pub fn gaussian(def: &DuneDef) -> Result<Self, SettingsError> {
        ensure_positive("dune.sample_step", def.sample_step)?;
        ensure_positive("dune.spread", def.spread)?;
        ensure_positive("dune.pipe.radius", def.pipe.radius)?;

        let centre = (def.start_x + def.end_x) / 2.0;
        let two_var = 2.0 * def.spread * def.spread;
        let curve = |x: f32| def.base_y - def.height * (-(x - centre).powi(2) / two_var).exp();

        let count = ((def.end_x - def.start_x) / def.sample_step).floor() as usize;
        let mut points: Vec<Vec2> = (0..=count)
            .map(|i| {
                let x = def.start_x + i as f32 * def.sample_step;
                Vec2::new(x, curve(x))
            })
            .collect();
        if points.last().is_some_and(|p| p.x < def.end_x) {
            points.push(Vec2::new(def.end_x, curve(def.end_x)));
        }

        let pipe = Pipe {
            entry: Vec2::new(def.pipe.entry_x, curve(def.pipe.entry_x)),
            exit: Vec2::new(def.pipe.exit_x, curve(def.pipe.exit_x)),
            radius: def.pipe.radius,
            exit_direction: Vec2::from_angle(def.pipe.exit_angle_deg.to_radians()),
        };
        Self::from_points(points, pipe)
    }

    pub fn from_points(points: Vec<Vec2>, pipe: Pipe) -> Result<Self, SettingsError> {
        if points.len() < 2 {
            return Err(SettingsError::DuneTooShort);
        }
        if let Some(index) = points.windows(2).position(|w| w[1].x <= w[0].x) {
            return Err(SettingsError::DuneNotMonotonic { index: index + 1 });
        }

        let dune = Self { points, pipe };
        let (start, finish) = dune.span();
        for (end, x) in [("entry", dune.pipe.entry.x), ("exit", dune.pipe.exit.x)] {
            if !dune.contains_x(x) {
                return Err(SettingsError::PipeOutsideDune {
                    end,
                    x,
                    start,
                    finish,
                });
            }
        }
        Ok(dune)
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn pipe(&self) -> &Pipe {
        &self.pipe
    }

    pub fn span(&self) -> (f32, f32) {
        (self.points[0].x, self.points[self.points.len() - 1].x)
    }

    pub fn contains_x(&self, x: f32) -> bool {
        let (start, finish) = self.span();
        (start..=finish).contains(&x)
    }

    /// Surface height at `x` by linear interpolation, `None` outside the span.
    pub fn height_at(&self, x: f32) -> Option<f32> {
        if !self.contains_x(x) {
            return None;
        }
        let i = self.points.partition_point(|p| p.x < x);
        if i == 0 {
            return Some(self.points[0].y);
        }
        let (a, b) = (self.points[i - 1], self.points[i]);
        let t = (x - a.x) / (b.x - a.x);
        Some(a.y + (b.y - a.y) * t)
    }

    /// Nearest sample point to `p`.
    pub fn closest_point(&self, p: Vec2) -> SurfaceContact {
        let (index, distance) = self.points.iter().map(|q| q.distance(p)).enumerate().fold(
            (0, f32::INFINITY),
            |best, (i, d)| if d < best.1 { (i, d) } else { best },
        );

        SurfaceContact {
            index,
            point: self.points[index],
            distance,
            normal_angle: self.normal_angle_at(index),
        }
    }

    /// Normal tilt at a sample, from a central difference (one-sided at the ends).
    pub fn normal_angle_at(&self, index: usize) -> f32 {
        let last = self.points.len() - 1;
        let a = self.points[index.saturating_sub(1)];
        let b = self.points[(index + 1).min(last)];
        let d = b - a;
        d.y.atan2(d.x)
    }
}
