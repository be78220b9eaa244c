use super::MediaTypeResolver;
use crate::context::ConversionContext;
use crate::json::{JsonObject, is_set, merge, object_at};
use crate::protocol::{BidRequest, BidResponse, MediaType, OrtbBid};
use serde_json::{Value as JsonValue, json};

const AUCTION_PRICE_MACRO: &str = "${AUCTION_PRICE}";

/// Maps `mediaTypes.banner` to `imp.banner` and banner markup back to `ad`/`adUrl`.
#[derive(Debug, Default)]
pub struct BannerResolver;

impl MediaTypeResolver for BannerResolver {
    fn media_type(&self) -> MediaType {
        MediaType::Banner
    }

    fn fill_imp(&self, imp: &mut JsonObject, bid_request: &BidRequest, context: &ConversionContext<'_>) {
        if !context.allows(MediaType::Banner) {
            return;
        }
        let Some(params) = &bid_request.media_types.banner else {
            return;
        };

        let mut banner = JsonObject::new();
        banner.insert("topframe".to_string(), json!(1));

        // Publisher-provided formats take precedence over ad unit sizes.
        let fpd_has_format = bid_request
            .ortb2_imp
            .as_ref()
            .and_then(|ortb2_imp| object_at(ortb2_imp, "banner"))
            .is_some_and(|banner| is_set(banner, "format"));
        if !fpd_has_format {
            if let Some(sizes) = params.sizes.as_ref().filter(|sizes| !sizes.is_empty()) {
                banner.insert("format".to_string(), JsonValue::Array(sizes.to_format()));
            }
        }
        if let Some(pos) = params.pos {
            banner.insert("pos".to_string(), json!(pos));
        }

        merge(&mut banner, object_at(imp, "banner"));
        imp.insert("banner".to_string(), JsonValue::Object(banner));
    }

    fn fill_response(&self, bid_response: &mut BidResponse, bid: &OrtbBid, _context: &ConversionContext<'_>) {
        if bid_response.media_type != Some(MediaType::Banner) {
            return;
        }

        match (bid.adm_str(), bid.nurl.as_deref()) {
            (Some(adm), Some(nurl)) => {
                let nurl = replace_auction_price(nurl, bid.price);
                bid_response.ad = Some(format!("{adm}{}", tracking_pixel(&nurl)));
            }
            (Some(adm), None) => bid_response.ad = Some(adm.to_string()),
            (None, Some(nurl)) => bid_response.ad_url = Some(nurl.to_string()),
            (None, None) => {}
        }
    }
}

fn replace_auction_price(url: &str, price: Option<f64>) -> String {
    match price {
        Some(price) => url.replace(AUCTION_PRICE_MACRO, &price.to_string()),
        None => url.to_string(),
    }
}

fn tracking_pixel(url: &str) -> String {
    format!(
        r#"<div style="position:absolute;left:0px;top:0px;visibility:hidden;"><img src="{}"></div>"#,
        url.replace('"', "%22")
    )
}
