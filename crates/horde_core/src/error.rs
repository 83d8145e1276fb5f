//! # Core Error Types
//!
//! Errors raised while *building* the runtime (grids, schedules).
//! Nothing in here is ever returned from inside a frame.

use thiserror::Error;

/// Errors that can occur while configuring the core runtime.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Grid cell size must be a positive, finite number.
    #[error("invalid cell size: {0}")]
    InvalidCellSize(f32),

    /// Neighbor query buffers must hold at least one id.
    #[error("query buffer capacity must be greater than zero")]
    ZeroQueryCapacity,

    /// A system consumes a capability that no earlier system provides.
    #[error("system `{consumer}` requires `{capability}` but no earlier system provides it")]
    ScheduleViolation {
        /// The system registered too early.
        consumer: &'static str,
        /// The capability it needs.
        capability: &'static str,
    },
}

/// Result type for core configuration operations.
pub type CoreResult<T> = Result<T, CoreError>;
