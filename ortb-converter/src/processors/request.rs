//! Default processors for the top-level OpenRTB request.

use crate::context::ConversionContext;
use crate::json::{JsonObject, is_truthy, merge};
use crate::protocol::BidderRequest;
use serde_json::{Value as JsonValue, json};

/// Seeds the request with the bidder's top-level first-party data.
pub fn fill_fpd(request: &mut JsonObject, bidder_request: &BidderRequest, _context: &ConversionContext<'_>) {
    merge(request, bidder_request.ortb2.as_ref());
}

/// Sets `id`, `test` and `tmax`.
///
/// A publisher-supplied id is kept. `test` is normalized to 0 or 1. `tmax` is
/// only written when the timeout parses as an integer.
pub fn fill_props(request: &mut JsonObject, bidder_request: &BidderRequest, _context: &ConversionContext<'_>) {
    if !request.get("id").is_some_and(is_truthy) {
        request.insert("id".to_string(), json!(uuid::Uuid::new_v4().to_string()));
    }

    let test = request.get("test").is_some_and(is_truthy);
    request.insert("test".to_string(), json!(i32::from(test)));

    if let Some(tmax) = bidder_request.timeout.as_ref().and_then(parse_timeout) {
        request.insert("tmax".to_string(), json!(tmax));
    }
}

/// Sets `cur` to the context currency unless first-party data already did.
pub fn fill_currency(request: &mut JsonObject, _bidder_request: &BidderRequest, context: &ConversionContext<'_>) {
    if request.contains_key("cur") {
        return;
    }
    if let Some(currency) = &context.currency {
        request.insert("cur".to_string(), json!([currency]));
    }
}

/// Reads a timeout the way publishers hand it over.
///
/// Integers are taken as-is, finite floats are truncated and strings are read
/// up to the first non-digit (`"500ms"` is 500). Anything else is `None`.
pub fn parse_timeout(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|n| n.is_finite())
                .map(|n| n.trunc() as i64)
        }),
        JsonValue::String(text) => parse_integer_prefix(text),
        _ => None,
    }
}

fn parse_integer_prefix(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }
    let magnitude: i64 = rest[..digits_len].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
