//! Vertical platformer with a balance-beam minigame behind black holes.

pub mod game;
pub mod minigame;

pub use game::{Climber, Phase, Platform, PlatformerGame};
pub use minigame::{BalanceMinigame, Ball, Beam, Difficulty, MinigameOutcome};
