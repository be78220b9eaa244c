//! Converts auction bid requests to OpenRTB 2.x requests and OpenRTB bids back
//! to normalized bid responses.
//!
//! The work is done by small named field processors held in a
//! [`ProcessorRegistry`]. Adapters customise a conversion by registering,
//! wrapping or disabling processors rather than by forking the converter.
//!
//! ```ignore
//! let converter = OrtbConverter::new(ConverterConfig::default())?;
//! let context = converter.context();
//! let request = converter.build_request(&bid_requests, &bidder_request, &context)?;
//! let bids = converter.interpret_response(&request, &bid_requests, &response, &context);
//! ```

pub mod config;
pub mod context;
pub mod converter;
pub mod errors;
pub mod json;
pub mod metrics_defs;
pub mod processors;
pub mod protocol;
pub mod registry;

#[cfg(test)]
mod testutils;

pub use config::{ClientSection, ConverterConfig, ValidationError};
pub use context::ConversionContext;
pub use converter::{OrtbConverter, OrtbRequest};
pub use errors::{ConverterError, Result};
pub use json::{JsonObject, merge};
pub use processors::{MediaTypeResolver, register_resolver};
pub use protocol::{BidRequest, BidResponse, BidderRequest, MediaType, OrtbBid, OrtbResponse};
pub use registry::{Processor, ProcessorKey, ProcessorPoint, ProcessorRegistry};
