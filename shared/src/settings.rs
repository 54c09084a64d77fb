use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{ensure_fraction, ensure_positive, SettingsError};

/// Reads a JSON settings file. Missing fields fall back to their defaults.
pub fn load_from_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, SettingsError> {
    let path = path.as_ref();
    let data = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&data)?)
}

/// Settings from `explicit` when given, else from `fallback` if that file
/// exists, else the built-in defaults.
pub fn resolve<T: DeserializeOwned + Default>(
    explicit: Option<&Path>,
    fallback: &Path,
) -> Result<T, SettingsError> {
    match explicit {
        Some(path) => load_from_file(path),
        None if fallback.is_file() => load_from_file(fallback),
        None => Ok(T::default()),
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    /// Tilt (degrees) below which the device counts as level.
    pub tilt_threshold: f32,
    pub tilt_sensitivity: f32,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            tilt_threshold: 2.0,
            tilt_sensitivity: 2.5,
        }
    }
}

//--- Platformer -----------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MinigameSettings {
    /// Seconds the ball has to stay on the beam.
    pub duration: f32,
    pub initial_gravity: f32,
    pub final_gravity: f32,
    /// Beam tilt rate in radians per second at full difficulty factor 1.
    pub tilt_speed: f32,
    pub max_tilt_factor: f32,
    pub initial_beam_width: f32,
    pub min_beam_width: f32,
    pub beam_height: f32,
    pub max_beam_angle: f32,
    pub ball_radius: f32,
    /// Beam pivot sits this far below the canvas centre.
    pub beam_offset_y: f32,
    /// Ball spawns this far above the canvas centre.
    pub ball_drop_height: f32,
}

impl Default for MinigameSettings {
    fn default() -> Self {
        Self {
            duration: 5.0,
            initial_gravity: 8.0,
            final_gravity: 12.0,
            tilt_speed: 3.0,
            max_tilt_factor: 3.0,
            initial_beam_width: 120.0,
            min_beam_width: 40.0,
            beam_height: 10.0,
            max_beam_angle: std::f32::consts::FRAC_PI_6,
            ball_radius: 10.0,
            beam_offset_y: 50.0,
            ball_drop_height: 100.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlatformerSettings {
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub fixed_step: f32,
    pub gravity: f32,

    pub player_width: f32,
    pub player_height: f32,
    pub jump_force: f32,
    pub player_speed: f32,

    pub platform_width: f32,
    pub platform_height: f32,
    pub platform_count: usize,
    pub special_platform_interval: u32,
    pub score_per_platform: u32,
    pub max_fall_penalty: u32,

    pub enter_minigame_duration: f32,
    pub boost_duration: f32,
    pub fall_duration: f32,
    /// Camera scroll speed during boost and fall, pixels per second.
    pub transition_scroll_speed: f32,
    pub initial_exhaust_particles: usize,
    pub exhaust_particles_per_tick: usize,

    pub minigame: MinigameSettings,
    pub input: InputSettings,
}

impl Default for PlatformerSettings {
    fn default() -> Self {
        Self {
            canvas_width: 400.0,
            canvas_height: 600.0,
            fixed_step: 1.0 / 60.0,
            gravity: 3.6,
            player_width: 30.0,
            player_height: 30.0,
            jump_force: -5.7,
            player_speed: 180.0,
            platform_width: 60.0,
            platform_height: 15.0,
            platform_count: 7,
            special_platform_interval: 5,
            score_per_platform: 10,
            max_fall_penalty: 200,
            enter_minigame_duration: 1.0,
            boost_duration: 2.0,
            fall_duration: 2.0,
            transition_scroll_speed: 500.0,
            initial_exhaust_particles: 20,
            exhaust_particles_per_tick: 2,
            minigame: MinigameSettings::default(),
            input: InputSettings::default(),
        }
    }
}

impl PlatformerSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        ensure_positive("canvas_width", self.canvas_width)?;
        ensure_positive("canvas_height", self.canvas_height)?;
        ensure_positive("fixed_step", self.fixed_step)?;
        ensure_positive("platform_width", self.platform_width)?;
        ensure_positive("platform_height", self.platform_height)?;
        ensure_positive("platform_count", self.platform_count as f32)?;
        ensure_positive("minigame.duration", self.minigame.duration)?;
        ensure_positive("minigame.min_beam_width", self.minigame.min_beam_width)?;
        ensure_positive("enter_minigame_duration", self.enter_minigame_duration)?;
        ensure_positive("boost_duration", self.boost_duration)?;
        ensure_positive("fall_duration", self.fall_duration)?;
        Ok(())
    }

    pub fn platform_spacing(&self) -> f32 {
        self.canvas_height / self.platform_count as f32
    }
}

//--- Rope swing -----------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RopeDef {
    pub anchor_x: f32,
    pub anchor_y: f32,
    pub length: f32,
    pub segments: usize,
    /// Scripted pendulum motion instead of free hanging.
    pub moving: bool,
    pub swing_speed: f32,
    pub swing_amplitude: f32,
    pub swing_phase: f32,
}

impl Default for RopeDef {
    fn default() -> Self {
        Self {
            anchor_x: 200.0,
            anchor_y: 40.0,
            length: 220.0,
            segments: 10,
            moving: true,
            swing_speed: 0.025,
            swing_amplitude: 0.7,
            swing_phase: 0.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipeDef {
    pub entry_x: f32,
    pub exit_x: f32,
    pub radius: f32,
    /// Launch direction out of the exit, degrees (0 = right, -90 = up).
    pub exit_angle_deg: f32,
}

impl Default for PipeDef {
    fn default() -> Self {
        Self {
            entry_x: 1470.0,
            exit_x: 1960.0,
            radius: 22.0,
            exit_angle_deg: -50.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DuneDef {
    pub start_x: f32,
    pub end_x: f32,
    pub base_y: f32,
    pub height: f32,
    /// Standard deviation of the Gaussian hump.
    pub spread: f32,
    pub sample_step: f32,
    pub pipe: PipeDef,
}

impl Default for DuneDef {
    fn default() -> Self {
        Self {
            start_x: 1300.0,
            end_x: 2100.0,
            base_y: 540.0,
            height: 260.0,
            spread: 150.0,
            sample_step: 2.0,
            pipe: PipeDef::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SwingPlayerSettings {
    pub radius: f32,
    /// Extra reach when grabbing a rope.
    pub attach_margin: f32,
    pub release_scale: f32,
    pub max_release_speed: f32,
    pub pendulum_damping: f32,
    pub pump_strength: f32,
    pub air_drag: f32,
    pub air_control: f32,
    pub roll_friction: f32,
    /// Extra distance at which the dune still counts as touching.
    pub contact_margin: f32,
    pub pipe_vertical_tolerance: f32,
    pub pipe_min_speed: f32,
    pub pipe_max_speed: f32,
    pub pipe_ease_distance: f32,
    pub pipe_exit_distance: f32,
    pub pipe_exit_boost: f32,
    pub recapture_ticks: u32,
}

impl Default for SwingPlayerSettings {
    fn default() -> Self {
        Self {
            radius: 15.0,
            attach_margin: 5.0,
            release_scale: 3.0,
            max_release_speed: 18.0,
            pendulum_damping: 0.99,
            pump_strength: 0.0015,
            air_drag: 0.995,
            air_control: 0.1,
            roll_friction: 0.985,
            contact_margin: 10.0,
            pipe_vertical_tolerance: 15.0,
            pipe_min_speed: 15.0,
            pipe_max_speed: 30.0,
            pipe_ease_distance: 100.0,
            pipe_exit_distance: 10.0,
            pipe_exit_boost: 14.0,
            recapture_ticks: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VictorySettings {
    pub float_speed: f32,
    pub float_duration: f32,
    pub fade_step: f32,
    pub prepare_delay: f32,
    pub scale_rate: f32,
    pub wait_duration: f32,
    pub explosion_particles: usize,
}

impl Default for VictorySettings {
    fn default() -> Self {
        Self {
            float_speed: 1.5,
            float_duration: 1.5,
            fade_step: 0.03,
            prepare_delay: 0.5,
            scale_rate: 0.1,
            wait_duration: 2.0,
            explosion_particles: 80,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SceneryDef {
    pub clouds: usize,
    pub birds: usize,
    pub sun_x: f32,
    pub sun_y: f32,
}

impl Default for SceneryDef {
    fn default() -> Self {
        Self {
            clouds: 8,
            birds: 5,
            sun_x: 320.0,
            sun_y: 90.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RopeSwingSettings {
    pub world_width: f32,
    pub world_height: f32,
    pub view_width: f32,
    pub view_height: f32,
    pub sea_level: f32,
    pub fixed_step: f32,
    /// Per-tick gravity shared by the player and free ropes.
    pub gravity: f32,
    pub finish_x: f32,
    /// Where the player reappears during the victory cutscene.
    pub podium_x: f32,
    pub podium_y: f32,
    pub initial_rope: usize,
    pub ropes: Vec<RopeDef>,
    pub dune: DuneDef,
    pub player: SwingPlayerSettings,
    pub victory: VictorySettings,
    pub scenery: SceneryDef,
    pub input: InputSettings,
}

impl Default for RopeSwingSettings {
    fn default() -> Self {
        let rope = |anchor_x: f32, moving: bool, swing_phase: f32| RopeDef {
            anchor_x,
            moving,
            swing_phase,
            ..RopeDef::default()
        };
        Self {
            world_width: 3000.0,
            world_height: 600.0,
            view_width: 800.0,
            view_height: 600.0,
            sea_level: 560.0,
            fixed_step: 1.0 / 60.0,
            gravity: 0.4,
            finish_x: 2800.0,
            podium_x: 2880.0,
            podium_y: 380.0,
            initial_rope: 0,
            ropes: vec![
                rope(200.0, true, 0.0),
                rope(480.0, false, 0.0),
                rope(760.0, true, 1.2),
                rope(1040.0, true, 2.4),
                rope(2300.0, false, 0.0),
                rope(2560.0, true, 0.6),
            ],
            dune: DuneDef::default(),
            player: SwingPlayerSettings::default(),
            victory: VictorySettings::default(),
            scenery: SceneryDef::default(),
            input: InputSettings::default(),
        }
    }
}

impl RopeSwingSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        ensure_positive("world_width", self.world_width)?;
        ensure_positive("world_height", self.world_height)?;
        ensure_positive("view_width", self.view_width)?;
        ensure_positive("fixed_step", self.fixed_step)?;
        ensure_positive("player.radius", self.player.radius)?;
        ensure_fraction("player.pendulum_damping", self.player.pendulum_damping)?;
        ensure_positive("player.pipe_min_speed", self.player.pipe_min_speed)?;
        ensure_positive("player.pipe_ease_distance", self.player.pipe_ease_distance)?;
        ensure_positive("player.pipe_exit_distance", self.player.pipe_exit_distance)?;
        ensure_positive("victory.fade_step", self.victory.fade_step)?;
        ensure_positive("victory.scale_rate", self.victory.scale_rate)?;
        ensure_positive("dune.sample_step", self.dune.sample_step)?;
        ensure_positive("dune.spread", self.dune.spread)?;
        ensure_positive("dune.pipe.radius", self.dune.pipe.radius)?;
        for rope in &self.ropes {
            ensure_positive("rope.length", rope.length)?;
            if rope.segments == 0 {
                return Err(SettingsError::EmptyRope);
            }
        }
        if self.initial_rope >= self.ropes.len() {
            return Err(SettingsError::InitialRope {
                index: self.initial_rope,
                count: self.ropes.len(),
            });
        }
        Ok(())
    }
}
