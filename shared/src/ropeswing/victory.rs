use glam::Vec2;
use tracing::debug;

use crate::settings::VictorySettings;

/// Scale counts as converged once it is this close to 1.
const SCALE_EPSILON: f32 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub enum VictoryPhase {
    /// Drifting upwards for a while after crossing the finish line.
    Floating {
        remaining: f32,
    },
    /// Fading out, then holding invisible for `hold` seconds.
    Preparing {
        hold: f32,
    },
    /// Fading and growing back in at the podium.
    Appearing,
    Waiting {
        remaining: f32,
    },
    Exiting,
    Done,
}

/// Scripted end-of-level sequence.
///
/// All timing lives in the struct and advances from `update`, so dropping
/// the cutscene (e.g. on reset) also drops every pending transition.
#[derive(Debug, Clone, PartialEq)]
pub struct VictoryCutscene {
    phase: VictoryPhase,
    opacity: f32,
    scale: f32,
    podium: Vec2,
}

impl VictoryCutscene {
    pub fn new(podium: Vec2, settings: &VictorySettings) -> Self {
        Self {
            phase: VictoryPhase::Floating {
                remaining: settings.float_duration,
            },
            opacity: 1.0,
            scale: 1.0,
            podium,
        }
    }

    pub fn phase(&self) -> &VictoryPhase {
        &self.phase
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn is_done(&self) -> bool {
        self.phase == VictoryPhase::Done
    }

    /// Advance one tick. Moves `pos` while floating and on reappearing.
    /// Returns true once the sequence has finished.
    pub fn update(&mut self, pos: &mut Vec2, dt: f32, settings: &VictorySettings) -> bool {
        let next = match &mut self.phase {
            VictoryPhase::Floating { remaining } => {
                pos.y -= settings.float_speed;
                *remaining -= dt;
                (*remaining <= 0.0).then_some(VictoryPhase::Preparing {
                    hold: settings.prepare_delay,
                })
            }
            VictoryPhase::Preparing { hold } => {
                if self.opacity > 0.0 {
                    self.opacity = (self.opacity - settings.fade_step).max(0.0);
                    None
                } else {
                    *hold -= dt;
                    if *hold <= 0.0 {
                        *pos = self.podium;
                        self.scale = 0.0;
                        Some(VictoryPhase::Appearing)
                    } else {
                        None
                    }
                }
            }
            VictoryPhase::Appearing => {
                self.opacity = (self.opacity + settings.fade_step).min(1.0);
                self.scale += (1.0 - self.scale) * settings.scale_rate;
                if self.opacity >= 1.0 && (1.0 - self.scale).abs() < SCALE_EPSILON {
                    self.scale = 1.0;
                    Some(VictoryPhase::Waiting {
                        remaining: settings.wait_duration,
                    })
                } else {
                    None
                }
            }
            VictoryPhase::Waiting { remaining } => {
                *remaining -= dt;
                (*remaining <= 0.0).then_some(VictoryPhase::Exiting)
            }
            VictoryPhase::Exiting => {
                self.opacity = (self.opacity - settings.fade_step).max(0.0);
                (self.opacity <= 0.0).then_some(VictoryPhase::Done)
            }
            VictoryPhase::Done => None,
        };

        if let Some(next) = next {
            debug!("Victory cutscene: {:?} -> {:?}", self.phase, next);
            self.phase = next;
        }
        self.is_done()
    }
}
