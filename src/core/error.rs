use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, SimError>;

/// Errors raised by the simulation core.
///
/// Configuration and argument errors are returned to the caller at
/// `configure`/`spawn` time. `DegenerateGeometry` is produced by geometric
/// helpers and recovered inside the solver loops; it never aborts a tick.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    /// Non-positive or non-finite cell size, sub-step count, time step, or a bad config document.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A call argument violated its contract (e.g. `dt <= 0`, negative radius).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Particle ID outside the store.
    #[error("particle index {id} out of bounds (count {len})")]
    IndexOutOfBounds { id: usize, len: usize },

    /// Two particles share a position, so no contact normal exists.
    #[error("degenerate geometry: particles {a} and {b} coincide")]
    DegenerateGeometry { a: usize, b: usize },
}
