use crate::config::ValidationError;
use crate::registry::ProcessorPoint;
use thiserror::Error;

/// Result type alias for converter operations
pub type Result<T, E = ConverterError> = std::result::Result<T, E>;

/// Errors raised while configuring the processor registry or building a request.
///
/// All of these are configuration or caller errors. Missing data inside a
/// request or response is never reported as an error.
#[derive(Error, Debug)]
pub enum ConverterError {
    #[error("Unknown orchestration point: {0}")]
    UnknownPoint(String),

    #[error("Processor {name} was built for {found} but registered at {expected}")]
    PointMismatch {
        name: String,
        expected: ProcessorPoint,
        found: ProcessorPoint,
    },

    #[error("No processor named {name} at {point}")]
    UnknownProcessor { point: ProcessorPoint, name: String },

    #[error("Malformed processor key {0:?}, expected <point>.<name>")]
    InvalidProcessorKey(String),

    #[error("At least one bid request is required to build an OpenRTB request")]
    NoBidRequests,

    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),
}
