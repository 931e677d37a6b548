use thiserror::Error;

/// Setup and lookup failures of the simulation driver. Business-level
/// denials (busy agents, empty station pool) are return values, not errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimulationError {
    #[error("Agent {0} not found on the roster")]
    UnknownAgent(String),
    #[error("Coordinator already set to {existing}, cannot add {rejected}")]
    DuplicateCoordinator { existing: String, rejected: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid range for {field}: {low} > {high}")]
    InvalidRange {
        field: &'static str,
        low: i64,
        high: i64,
    },
    #[error("Capacity {0} must be greater than zero")]
    ZeroCapacity(&'static str),
    #[error("Low battery threshold {0} exceeds the battery maximum")]
    ThresholdOutOfBounds(u32),
}
