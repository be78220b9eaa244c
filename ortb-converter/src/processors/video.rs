use super::MediaTypeResolver;
use super::params::{VIDEO_PARAMS, filter_params};
use crate::context::ConversionContext;
use crate::json::{JsonObject, merge, object_at};
use crate::protocol::{BidRequest, BidResponse, MediaType, OrtbBid, Size, Sizes};
use serde_json::{Value as JsonValue, json};

/// Maps `mediaTypes.video` to `imp.video` and VAST markup back to `vastXml`/`vastUrl`.
#[derive(Debug, Default)]
pub struct VideoResolver;

impl MediaTypeResolver for VideoResolver {
    fn media_type(&self) -> MediaType {
        MediaType::Video
    }

    fn fill_imp(&self, imp: &mut JsonObject, bid_request: &BidRequest, context: &ConversionContext<'_>) {
        if !context.allows(MediaType::Video) || !bid_request.declares(MediaType::Video) {
            return;
        }
        let Some(params) = &bid_request.media_types.video else {
            return;
        };

        let mut video = filter_params(params, VIDEO_PARAMS);
        if let Some(sizes) = params.get("playerSize").and_then(Sizes::from_value) {
            if sizes.len() > 1 {
                tracing::warn!(
                    bid_id = %bid_request.bid_id,
                    sizes = sizes.len(),
                    "Video ad unit specifies more than one playerSize, using the first"
                );
            }
            if let Some(Size(w, h)) = sizes.first() {
                video.insert("w".to_string(), json!(w));
                video.insert("h".to_string(), json!(h));
            }
        }

        merge(&mut video, object_at(imp, "video"));
        imp.insert("video".to_string(), JsonValue::Object(video));
    }

    fn fill_response(&self, bid_response: &mut BidResponse, bid: &OrtbBid, context: &ConversionContext<'_>) {
        if bid_response.media_type != Some(MediaType::Video) {
            return;
        }

        if let Some(video) = context.imp.and_then(|imp| object_at(imp, "video")) {
            let w = video.get("w").and_then(JsonValue::as_u64);
            let h = video.get("h").and_then(JsonValue::as_u64);
            if let (Some(w), Some(h)) = (w, h) {
                bid_response.player_width = Some(w);
                bid_response.player_height = Some(h);
            }
        }

        if let Some(adm) = bid.adm_str() {
            bid_response.vast_xml = Some(adm.to_string());
        }
        if let Some(nurl) = &bid.nurl {
            bid_response.vast_url = Some(nurl.clone());
        }

        let video_context = context
            .bid_request
            .and_then(|bid_request| bid_request.media_types.video.as_ref())
            .and_then(|video| video.get("context"))
            .and_then(JsonValue::as_str);
        if let Some(video_context) = video_context {
            bid_response.video_context = Some(video_context.to_string());
        }
    }
}
