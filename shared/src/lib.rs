//! Headless simulation for the canvas arcade games.
//!
//! Nothing in here knows about windows or drawing. The front ends feed input
//! in, call `update` once per frame and read entity state back out.

pub mod clock;
pub mod error;
pub mod input;
pub mod math;
pub mod particles;
pub mod platformer;
pub mod ropeswing;
pub mod settings;

pub use clock::FrameClock;
pub use error::SettingsError;
pub use input::{Direction, Steering, SwingInput};
pub use particles::{Particle, ParticleSystem};
pub use settings::{load_from_file, resolve, PlatformerSettings, RopeSwingSettings};
