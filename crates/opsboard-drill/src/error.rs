use opsboard_model::Level;
use thiserror::Error;

pub type DrillResult<T> = Result<T, DrillError>;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DrillError {
    #[error("{level} is the finest hierarchy level; there is nothing to drill into")]
    TerminalLevel { level: Level },

    #[error("drill navigation requires breakdown mode")]
    NotInBreakdown,

    #[error("breadcrumb {index} out of range (path has {len} entries)")]
    CrumbOutOfRange { index: usize, len: usize },

    #[error("invalid drill config: {0}")]
    InvalidConfig(String),
}
