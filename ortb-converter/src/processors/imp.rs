//! Default processors for OpenRTB imps that don't depend on the media type.

use crate::context::ConversionContext;
use crate::json::{JsonObject, is_set, merge};
use crate::protocol::BidRequest;
use serde_json::json;

/// Seeds the imp with the ad unit's `ortb2Imp` first-party data.
pub fn fill_fpd(imp: &mut JsonObject, bid_request: &BidRequest, _context: &ConversionContext<'_>) {
    merge(imp, bid_request.ortb2_imp.as_ref());
}

pub fn fill_id(imp: &mut JsonObject, bid_request: &BidRequest, _context: &ConversionContext<'_>) {
    imp.insert("id".to_string(), json!(bid_request.bid_id));
}

/// Defaults `secure` to 1. An explicit value, including 0, is kept.
pub fn fill_secure(imp: &mut JsonObject, _bid_request: &BidRequest, _context: &ConversionContext<'_>) {
    if !is_set(imp, "secure") {
        imp.insert("secure".to_string(), json!(1));
    }
}

/// Copies the resolved floor onto the imp unless one is already present.
pub fn fill_bid_floor(imp: &mut JsonObject, bid_request: &BidRequest, _context: &ConversionContext<'_>) {
    let Some(floor) = &bid_request.floor else {
        return;
    };
    if is_set(imp, "bidfloor") || !floor.floor.is_finite() || floor.floor <= 0.0 {
        return;
    }
    imp.insert("bidfloor".to_string(), json!(floor.floor));
    imp.insert("bidfloorcur".to_string(), json!(floor.currency));
}
