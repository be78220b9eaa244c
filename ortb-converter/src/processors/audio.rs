use super::MediaTypeResolver;
use super::params::{AUDIO_PARAMS, filter_params};
use crate::context::ConversionContext;
use crate::json::{JsonObject, merge, object_at};
use crate::protocol::{BidRequest, BidResponse, MediaType, OrtbBid};
use serde_json::Value as JsonValue;

/// Maps `mediaTypes.audio` to `imp.audio` and audio markup back to `vastXml`/`vastUrl`.
#[derive(Debug, Default)]
pub struct AudioResolver;

impl MediaTypeResolver for AudioResolver {
    fn media_type(&self) -> MediaType {
        MediaType::Audio
    }

    fn fill_imp(&self, imp: &mut JsonObject, bid_request: &BidRequest, context: &ConversionContext<'_>) {
        if !context.allows(MediaType::Audio) || !bid_request.declares(MediaType::Audio) {
            return;
        }
        let Some(params) = &bid_request.media_types.audio else {
            return;
        };

        let mut audio = filter_params(params, AUDIO_PARAMS);
        merge(&mut audio, object_at(imp, "audio"));
        imp.insert("audio".to_string(), JsonValue::Object(audio));
    }

    fn fill_response(&self, bid_response: &mut BidResponse, bid: &OrtbBid, _context: &ConversionContext<'_>) {
        if bid_response.media_type != Some(MediaType::Audio) {
            return;
        }
        if let Some(adm) = bid.adm_str() {
            bid_response.vast_xml = Some(adm.to_string());
        }
        if let Some(nurl) = &bid.nurl {
            bid_response.vast_url = Some(nurl.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils::bid_from;
    use serde_json::json;

    #[test]
    fn test_fill_imp() {
        let mut bid_request = BidRequest::new("a1");
        bid_request.media_types.audio = json!({
            "mimes": ["audio/mp4"],
            "maxduration": 30,
            "context": "instream",
            "stitched": 1
        })
        .as_object()
        .cloned();
        let mut imp = JsonObject::new();

        AudioResolver.fill_imp(&mut imp, &bid_request, &ConversionContext::default());

        assert_eq!(
            imp["audio"],
            json!({"mimes": ["audio/mp4"], "maxduration": 30, "stitched": 1})
        );
    }

    #[test]
    fn test_fill_imp_respects_pinned_media_type() {
        let mut bid_request = BidRequest::new("a1");
        bid_request.media_types.audio = json!({"mimes": ["audio/mp4"]}).as_object().cloned();
        let mut imp = JsonObject::new();

        let context = ConversionContext::default().with_media_type(MediaType::Banner);
        AudioResolver.fill_imp(&mut imp, &bid_request, &context);

        assert!(imp.is_empty());
    }

    #[test]
    fn test_fill_response() {
        let mut response = BidResponse {
            media_type: Some(MediaType::Audio),
            ..Default::default()
        };
        let bid = bid_from(json!({"adm": "<VAST version=\"4.0\"/>", "nurl": "https://n"}));

        AudioResolver.fill_response(&mut response, &bid, &ConversionContext::default());

        assert_eq!(response.vast_xml.as_deref(), Some("<VAST version=\"4.0\"/>"));
        assert_eq!(response.vast_url.as_deref(), Some("https://n"));
        assert!(response.player_width.is_none());
    }
}
