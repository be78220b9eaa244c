use crate::protocol::{BannerParams, BidRequest, OrtbBid, Sizes};
use serde_json::Value as JsonValue;

/// Bid request declaring banner with `sizes` (`[w, h]` or `[[w, h], ...]`).
pub fn banner_request(bid_id: &str, sizes: JsonValue) -> BidRequest {
    let mut bid_request = BidRequest::new(bid_id);
    bid_request.media_types.banner = Some(BannerParams {
        sizes: Sizes::from_value(&sizes),
        ..Default::default()
    });
    bid_request
}

pub fn video_request(bid_id: &str, params: JsonValue) -> BidRequest {
    let mut bid_request = BidRequest::new(bid_id);
    bid_request.media_types.video = params.as_object().cloned();
    bid_request
}

pub fn native_request(bid_id: &str, params: JsonValue) -> BidRequest {
    let mut bid_request = BidRequest::new(bid_id);
    bid_request.media_types.native = params.as_object().cloned();
    bid_request
}

pub fn bid_from(value: JsonValue) -> OrtbBid {
    serde_json::from_value(value).unwrap()
}
