use crate::config::ConverterConfig;
use crate::json::JsonObject;
use crate::protocol::{BidRequest, MediaType, OrtbResponse};

/// Ambient values handed unchanged to every processor of one conversion run.
///
/// A fresh context is created by the caller for each request or response cycle.
/// Processors only ever see it through a shared reference.
#[derive(Debug, Clone, Default)]
pub struct ConversionContext<'a> {
    /// Default currency, used when the response envelope has no `cur`.
    pub currency: Option<String>,
    /// Default bid TTL in seconds, used when a bid has no `exp`.
    pub ttl: Option<u64>,
    pub net_revenue: Option<bool>,
    /// When building imps, restricts the media-type resolvers to this type.
    /// When building bid responses, the media type of the bid.
    pub media_type: Option<MediaType>,
    /// Internal request the current response bid answers.
    pub bid_request: Option<&'a BidRequest>,
    /// OpenRTB imp the current response bid answers.
    pub imp: Option<&'a JsonObject>,
    /// Full response body the current bid came from.
    pub ortb_response: Option<&'a OrtbResponse>,
}

impl<'a> ConversionContext<'a> {
    /// Context seeded with the configured defaults.
    pub fn from_config(config: &ConverterConfig) -> Self {
        Self {
            currency: config.currency.clone(),
            ttl: config.ttl,
            net_revenue: config.net_revenue,
            ..Default::default()
        }
    }

    pub fn with_media_type(mut self, media_type: MediaType) -> Self {
        self.media_type = Some(media_type);
        self
    }

    pub fn with_bid_request(mut self, bid_request: &'a BidRequest) -> Self {
        self.bid_request = Some(bid_request);
        self
    }

    pub fn with_imp(mut self, imp: &'a JsonObject) -> Self {
        self.imp = Some(imp);
        self
    }

    pub fn with_ortb_response(mut self, ortb_response: &'a OrtbResponse) -> Self {
        self.ortb_response = Some(ortb_response);
        self
    }

    /// True unless the context pins a different media type.
    pub fn allows(&self, media_type: MediaType) -> bool {
        self.media_type.is_none_or(|pinned| pinned == media_type)
    }
}
