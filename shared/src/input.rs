use crate::settings::InputSettings;

/// Left/right steering shared by keyboard and device tilt.
///
/// Keyboard input sets the flags directly. Tilt input goes through a dead
/// zone and additionally scales movement by how far the device is tilted.
#[derive(Debug, Clone, Default)]
pub struct Steering {
    pub left: bool,
    pub right: bool,
    tilt: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

impl Steering {
    pub fn press(&mut self, dir: Direction) {
        match dir {
            Direction::Left => self.left = true,
            Direction::Right => self.right = true,
        }
    }

    pub fn release(&mut self, dir: Direction) {
        match dir {
            Direction::Left => self.left = false,
            Direction::Right => self.right = false,
        }
    }

    /// Feed a device orientation reading (gamma, degrees of left/right tilt).
    pub fn apply_tilt(&mut self, gamma: f32, settings: &InputSettings) {
        self.tilt = Some(gamma);
        self.left = gamma < -settings.tilt_threshold;
        self.right = gamma > settings.tilt_threshold;
    }

    /// -1 for left, 1 for right, 0 otherwise. Left wins when both are held.
    pub fn axis(&self) -> f32 {
        if self.left {
            -1.0
        } else if self.right {
            1.0
        } else {
            0.0
        }
    }

    /// Movement scale: 1 for keys, proportional to the tilt angle otherwise.
    pub fn multiplier(&self, settings: &InputSettings) -> f32 {
        match self.tilt {
            Some(gamma) => gamma.abs() / 45.0 * settings.tilt_sensitivity,
            None => 1.0,
        }
    }
}

/// Input for the rope swing game.
#[derive(Debug, Clone, Default)]
pub struct SwingInput {
    pub steering: Steering,
    /// Pointer (or grab key) held down: touching a rope attaches.
    pub grab_held: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tilt_dead_zone() {
        let settings = InputSettings::default();
        let mut steering = Steering::default();

        steering.apply_tilt(1.5, &settings);
        assert_eq!(steering.axis(), 0.0);

        steering.apply_tilt(-10.0, &settings);
        assert!(steering.left && !steering.right);

        steering.apply_tilt(30.0, &settings);
        assert!(!steering.left && steering.right);
    }

    #[test]
    fn tilt_scales_movement() {
        let settings = InputSettings::default();
        let mut steering = Steering::default();
        assert_eq!(steering.multiplier(&settings), 1.0);

        steering.apply_tilt(45.0, &settings);
        assert!((steering.multiplier(&settings) - 2.5).abs() < 1e-6);
    }

    #[test]
    fn left_takes_precedence() {
        let mut steering = Steering::default();
        steering.press(Direction::Right);
        steering.press(Direction::Left);
        assert_eq!(steering.axis(), -1.0);
        steering.release(Direction::Left);
        assert_eq!(steering.axis(), 1.0);
    }
}
