use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ScenarioError {
    #[error("scenario validation error: {0}")]
    Validation(String),
}

/// Rejections from the host-side placement helpers. The simulation tick itself
/// never fails.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlacementError {
    #[error("unknown building '{0}'")]
    UnknownBuilding(String),
    #[error("tile ({x}, {y}) is already occupied")]
    Occupied { x: i32, y: i32 },
    #[error("not enough resources to build '{building}'")]
    InsufficientFunds { building: String },
    #[error("no building at ({x}, {y})")]
    NotFound { x: i32, y: i32 },
}
