use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to read settings file {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{field} must lie in (0, 1], got {value}")]
    NotAFraction { field: &'static str, value: f32 },
    #[error("A rope needs at least one segment")]
    EmptyRope,
    #[error("Dune curve needs at least two points")]
    DuneTooShort,
    #[error("Dune points must increase in x (point {index})")]
    DuneNotMonotonic { index: usize },
    #[error("Pipe {end} at x={x} lies outside the dune span [{start}, {finish}]")]
    PipeOutsideDune {
        end: &'static str,
        x: f32,
        start: f32,
        finish: f32,
    },
    #[error("Initial rope index {index} out of range ({count} ropes)")]
    InitialRope { index: usize, count: usize },
}

pub(crate) fn ensure_positive(field: &'static str, value: f32) -> Result<(), SettingsError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(SettingsError::NotPositive { field, value })
    }
}

pub(crate) fn ensure_fraction(field: &'static str, value: f32) -> Result<(), SettingsError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(SettingsError::NotAFraction { field, value })
    }
}
