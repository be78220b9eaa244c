//! Default field processors.
//!
//! [`default_registry`] seeds a [`ProcessorRegistry`] with the processors below.
//! Names are the public handles adapters use to replace, wrap or disable them.
//!
//! | point          | name            | priority |
//! |----------------|-----------------|----------|
//! | `request`      | `fpd`           | 99       |
//! | `request`      | `props`         | 0        |
//! | `request`      | `currency`      | 0        |
//! | `request`      | `onlyOneClient` | -99      |
//! | `imp`          | `fpd`           | 99       |
//! | `imp`          | `id`            | 0        |
//! | `imp`          | `banner`, `video`, `native`, `audio` | 0 |
//! | `imp`          | `secure`        | 0        |
//! | `imp`          | `bidfloor`      | 0        |
//! | `bid_response` | `mediaType`     | 99       |
//! | `bid_response` | `banner`, `video`, `native`, `audio` | 0 |
//! | `bid_response` | `props`         | 0        |

pub mod audio;
pub mod banner;
pub mod bid_response;
pub mod client_section;
pub mod imp;
pub mod media_type;
pub mod native;
mod params;
pub mod request;
pub mod video;

use crate::config::ConverterConfig;
use crate::context::ConversionContext;
use crate::errors::Result;
use crate::json::JsonObject;
use crate::protocol::{BidRequest, BidResponse, MediaType, OrtbBid};
use crate::registry::{Processor, ProcessorPoint, ProcessorRegistry};
use std::sync::Arc;

pub use audio::AudioResolver;
pub use banner::BannerResolver;
pub use client_section::{client_section_guard, retain_one_client_section};
pub use native::NativeResolver;
pub use video::VideoResolver;

pub const FPD_PRIORITY: i32 = 99;
pub const MEDIA_TYPE_PRIORITY: i32 = 99;
pub const DEFAULT_PRIORITY: i32 = 0;
pub const CLIENT_SECTION_PRIORITY: i32 = -99;

/// Both halves of one media type: request side and response side.
///
/// Registered under the media type's name at the `imp` and `bid_response`
/// points, so either half can be swapped without touching the other types.
pub trait MediaTypeResolver: Send + Sync {
    fn media_type(&self) -> MediaType;

    /// Writes `imp.<media type>` when the ad unit declares this media type.
    /// Must not touch `imp` otherwise.
    fn fill_imp(&self, imp: &mut JsonObject, bid_request: &BidRequest, context: &ConversionContext<'_>);

    /// Writes markup and media-specific fields when the resolved
    /// `bid_response.media_type` is this media type.
    fn fill_response(&self, bid_response: &mut BidResponse, bid: &OrtbBid, context: &ConversionContext<'_>);
}

/// Registers `resolver` at the `imp` and `bid_response` points.
pub fn register_resolver(
    registry: &mut ProcessorRegistry,
    resolver: Arc<dyn MediaTypeResolver>,
) -> Result<()> {
    let name = resolver.media_type().as_str();

    let imp_resolver = Arc::clone(&resolver);
    registry.register(
        ProcessorPoint::Imp,
        name,
        DEFAULT_PRIORITY,
        Processor::imp(move |imp, bid_request, context| {
            imp_resolver.fill_imp(imp, bid_request, context)
        }),
    )?;
    registry.register(
        ProcessorPoint::BidResponse,
        name,
        DEFAULT_PRIORITY,
        Processor::bid_response(move |bid_response, bid, context| {
            resolver.fill_response(bid_response, bid, context)
        }),
    )?;
    Ok(())
}

/// Builds the registry of default processors.
pub fn default_registry(config: &ConverterConfig) -> Result<ProcessorRegistry> {
    let mut registry = ProcessorRegistry::new();

    registry.register(ProcessorPoint::Request, "fpd", FPD_PRIORITY, Processor::request(request::fill_fpd))?;
    registry.register(ProcessorPoint::Request, "props", DEFAULT_PRIORITY, Processor::request(request::fill_props))?;
    registry.register(
        ProcessorPoint::Request,
        "currency",
        DEFAULT_PRIORITY,
        Processor::request(request::fill_currency),
    )?;
    registry.register(
        ProcessorPoint::Request,
        "onlyOneClient",
        CLIENT_SECTION_PRIORITY,
        client_section_guard(config.client_section_precedence.clone()),
    )?;

    registry.register(ProcessorPoint::Imp, "fpd", FPD_PRIORITY, Processor::imp(imp::fill_fpd))?;
    registry.register(ProcessorPoint::Imp, "id", DEFAULT_PRIORITY, Processor::imp(imp::fill_id))?;
    registry.register(
        ProcessorPoint::BidResponse,
        "mediaType",
        MEDIA_TYPE_PRIORITY,
        Processor::bid_response(media_type::fill_media_type),
    )?;

    let resolvers: [Arc<dyn MediaTypeResolver>; 4] = [
        Arc::new(BannerResolver),
        Arc::new(VideoResolver),
        Arc::new(NativeResolver::new(config.native_version.clone())),
        Arc::new(AudioResolver),
    ];
    for resolver in resolvers {
        register_resolver(&mut registry, resolver)?;
    }

    registry.register(ProcessorPoint::Imp, "secure", DEFAULT_PRIORITY, Processor::imp(imp::fill_secure))?;
    registry.register(ProcessorPoint::Imp, "bidfloor", DEFAULT_PRIORITY, Processor::imp(imp::fill_bid_floor))?;
    registry.register(
        ProcessorPoint::BidResponse,
        "props",
        DEFAULT_PRIORITY,
        Processor::bid_response(bid_response::fill_props),
    )?;

    Ok(registry)
}
