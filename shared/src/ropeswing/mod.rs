//! Rope swinging over the sea and a sand dune to the podium.

pub mod dune;
pub mod game;
pub mod player;
pub mod rope;
pub mod scenery;
pub mod victory;

pub use dune::{Pipe, SandDune, SurfaceContact};
pub use game::RopeSwingGame;
pub use player::{Colliders, MotionState, Player, PlayerEvent, RopeAttachment};
pub use rope::{Rope, RopeSegment};
pub use scenery::{Bird, Cloud, Scenery};
pub use victory::{VictoryCutscene, VictoryPhase};
