use std::time::Duration;

/// Turns the host's frame delta into a simulation delta.
///
/// Deltas are clamped to one fixed step so a stalled frame (window drag,
/// tab switch) never produces a huge integration step.
#[derive(Debug, Clone)]
pub struct FrameClock {
    fixed_step: f32,
    frames: u64,
}

impl FrameClock {
    pub fn new(fixed_step: f32) -> Self {
        Self {
            fixed_step,
            frames: 0,
        }
    }

    pub fn tick(&mut self, frame_delta: Duration) -> f32 {
        self.frames += 1;
        frame_delta.as_secs_f32().min(self.fixed_step)
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn fixed_step(&self) -> f32 {
        self.fixed_step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_long_frames() {
        let mut clock = FrameClock::new(1.0 / 60.0);
        assert_eq!(clock.tick(Duration::from_millis(500)), 1.0 / 60.0);
        let short = clock.tick(Duration::from_millis(5));
        assert!((short - 0.005).abs() < 1e-6);
        assert_eq!(clock.frames(), 2);
    }
}
