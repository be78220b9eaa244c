//! Default `props` processor for bid responses.

use crate::context::ConversionContext;
use crate::protocol::{BidResponse, OrtbBid};
use serde_json::Value as JsonValue;

/// Copies the identity, price and metadata fields of `bid`.
///
/// Only fields present on the bid are written. `currency` and `ttl` fall back to
/// the context defaults, and `ext.eventtrackers` is appended to whatever
/// trackers the response already has.
pub fn fill_props(bid_response: &mut BidResponse, bid: &OrtbBid, context: &ConversionContext<'_>) {
    if let Some(bid_request) = context.bid_request {
        bid_response.request_id = Some(bid_request.bid_id.clone());
    }
    if let Some(id) = &bid.id {
        bid_response.seat_bid_id = Some(id.clone());
    }
    if let Some(price) = bid.price {
        bid_response.cpm = Some(price);
    }

    let currency = context
        .ortb_response
        .and_then(|response| response.cur.clone())
        .filter(|cur| !cur.is_empty())
        .or_else(|| context.currency.clone());
    if currency.is_some() {
        bid_response.currency = currency;
    }

    copy_if_present(&mut bid_response.width, bid.w);
    copy_if_present(&mut bid_response.height, bid.h);
    copy_if_present(&mut bid_response.wratio, bid.wratio);
    copy_if_present(&mut bid_response.hratio, bid.hratio);
    if let Some(deal_id) = &bid.dealid {
        bid_response.deal_id = Some(deal_id.clone());
    }
    if let Some(crid) = &bid.crid {
        bid_response.creative_id = Some(crid.clone());
        bid_response.legacy_creative_id = Some(crid.clone());
    }
    if let Some(burl) = &bid.burl {
        bid_response.burl = Some(burl.clone());
    }

    // `exp: 0` is treated as absent.
    let ttl = bid.exp.filter(|exp| *exp > 0).or(context.ttl);
    copy_if_present(&mut bid_response.ttl, ttl);
    copy_if_present(&mut bid_response.net_revenue, context.net_revenue);

    fill_meta(bid_response, bid);

    if let Some(trackers) = bid.ext_field("eventtrackers").and_then(JsonValue::as_array) {
        bid_response.eventtrackers.extend(trackers.iter().cloned());
    }
}

fn fill_meta(bid_response: &mut BidResponse, bid: &OrtbBid) {
    let meta = &mut bid_response.meta;
    if let Some(adomain) = &bid.adomain {
        meta.advertiser_domains = Some(adomain.clone());
    }
    if let Some(dsa) = bid.ext_field("dsa") {
        meta.dsa = Some(dsa.clone());
    }
    if let Some((primary, secondary)) = bid.cat.as_deref().and_then(<[String]>::split_first) {
        meta.primary_cat_id = Some(primary.clone());
        meta.secondary_cat_ids = Some(secondary.to_vec());
    }
    if let Some(attr) = &bid.attr {
        meta.attr = Some(attr.clone());
    }
}

fn copy_if_present<T>(destination: &mut Option<T>, source: Option<T>) {
    if source.is_some() {
        *destination = source;
    }
}
