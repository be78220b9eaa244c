//! Conversion orchestrator.
//!
//! [`OrtbConverter`] runs the registered processors in resolved order over a
//! fresh target:
//!
//! ```text
//! build_request:      [BidRequest] ─imp processors─▶ imps ─request processors─▶ OpenRTB request
//! build_bid_response: OrtbBid ─bid_response processors─▶ BidResponse
//! ```
//!
//! Every run owns its target and only reads the registry, so runs may happen
//! concurrently from many threads sharing one converter.

use crate::config::ConverterConfig;
use crate::context::ConversionContext;
use crate::errors::{ConverterError, Result};
use crate::json::JsonObject;
use crate::metrics_defs::{REQUEST_IMPS, REQUEST_IMPS_DROPPED, RESPONSE_BID_UNMATCHED};
use crate::processors::default_registry;
use crate::protocol::{BidRequest, BidResponse, BidderRequest, OrtbBid, OrtbResponse};
use crate::registry::{ImpProcessorFn, ProcessorRegistry};
use crate::{counter, histogram};
use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// OpenRTB request built by [`OrtbConverter::build_request`].
///
/// Remembers which bid request each imp was built from, whatever id the imp
/// processors gave it, so response bids can be traced back through `impid`.
#[derive(Debug, Clone)]
pub struct OrtbRequest {
    body: JsonObject,
    imp_sources: IndexMap<String, usize>,
}

impl OrtbRequest {
    pub fn body(&self) -> &JsonObject {
        &self.body
    }

    pub fn into_body(self) -> JsonObject {
        self.body
    }

    /// The imp with id `impid` and the index of the bid request it was built
    /// from.
    pub fn imp(&self, impid: &str) -> Option<(&JsonObject, usize)> {
        let source = *self.imp_sources.get(impid)?;
        let imp = self
            .body
            .get("imp")?
            .as_array()?
            .iter()
            .filter_map(JsonValue::as_object)
            .find(|imp| imp.get("id").map(imp_key).as_deref() == Some(impid))?;
        Some((imp, source))
    }
}

/// Imp ids compared as text, so a numeric id still matches a string `impid`.
fn imp_key(id: &JsonValue) -> String {
    match id {
        JsonValue::String(id) => id.clone(),
        other => other.to_string(),
    }
}

/// Converts bid requests to OpenRTB and OpenRTB bids back to bid responses.
#[derive(Clone, Debug)]
pub struct OrtbConverter {
    registry: ProcessorRegistry,
    config: ConverterConfig,
}

impl OrtbConverter {
    /// Creates a converter with the default processors, minus the ones the
    /// configuration disables.
    pub fn new(config: ConverterConfig) -> Result<Self> {
        config.validate()?;

        let mut registry = default_registry(&config)?;
        for key in config.disabled_processor_keys()? {
            registry.disable(key.point, &key.name)?;
        }

        Ok(Self { registry, config })
    }

    /// Creates a converter running exactly the processors of `registry`.
    pub fn from_registry(registry: ProcessorRegistry, config: ConverterConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &ProcessorRegistry {
        &self.registry
    }

    /// Mutable access for adapters that customise processors before the first
    /// conversion.
    pub fn registry_mut(&mut self) -> &mut ProcessorRegistry {
        &mut self.registry
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// A context carrying the configured defaults.
    pub fn context(&self) -> ConversionContext<'static> {
        ConversionContext::from_config(&self.config)
    }

    /// Builds one OpenRTB imp from one bid request.
    pub fn build_imp(&self, bid_request: &BidRequest, context: &ConversionContext<'_>) -> JsonObject {
        run_imp_processors(&self.registry.imp_processors(), bid_request, context)
    }

    /// Builds the OpenRTB request for `bid_requests`.
    ///
    /// Imps are built first, in input order. Imps that end up without an `id`
    /// are dropped. The request processors then run over `{"imp": [...]}`.
    pub fn build_request(
        &self,
        bid_requests: &[BidRequest],
        bidder_request: &BidderRequest,
        context: &ConversionContext<'_>,
    ) -> Result<OrtbRequest> {
        if bid_requests.is_empty() {
            return Err(ConverterError::NoBidRequests);
        }

        let imp_processors = self.registry.imp_processors();
        let mut imps = Vec::with_capacity(bid_requests.len());
        let mut imp_sources = IndexMap::with_capacity(bid_requests.len());
        for (index, bid_request) in bid_requests.iter().enumerate() {
            let imp = run_imp_processors(&imp_processors, bid_request, context);
            let Some(id) = imp.get("id").filter(|id| !id.is_null()) else {
                tracing::error!(
                    bid_id = %bid_request.bid_id,
                    "Built imp has no id, leaving it out of the request"
                );
                counter!(REQUEST_IMPS_DROPPED).increment(1);
                continue;
            };
            imp_sources.entry(imp_key(id)).or_insert(index);
            imps.push(JsonValue::Object(imp));
        }
        histogram!(REQUEST_IMPS).record(imps.len() as f64);

        let mut request = JsonObject::new();
        request.insert("imp".to_string(), JsonValue::Array(imps));
        for processor in self.registry.request_processors() {
            processor(&mut request, bidder_request, context);
        }

        Ok(OrtbRequest {
            body: request,
            imp_sources,
        })
    }

    /// Builds one bid response from one OpenRTB bid.
    ///
    /// The result may lack markup, for instance when no media type could be
    /// determined. Filtering such bids is up to the caller.
    pub fn build_bid_response(&self, bid: &OrtbBid, context: &ConversionContext<'_>) -> BidResponse {
        let mut bid_response = BidResponse::default();
        for processor in self.registry.bid_response_processors() {
            processor(&mut bid_response, bid, context);
        }
        bid_response
    }

    /// Converts every bid of `response` that answers an imp of `ortb_request`.
    ///
    /// Bids are matched to imps by `impid`, and each imp to the bid request it
    /// was built from. When `context` pins no media type and that bid request
    /// declares exactly one, that one is used for the bid.
    pub fn interpret_response(
        &self,
        ortb_request: &OrtbRequest,
        bid_requests: &[BidRequest],
        response: &OrtbResponse,
        context: &ConversionContext<'_>,
    ) -> Vec<BidResponse> {
        let bids = response.seatbid.iter().flat_map(|seatbid| seatbid.bid.iter());
        let mut bid_responses = Vec::new();
        for bid in bids {
            let Some((imp, source)) = bid.impid.as_deref().and_then(|impid| ortb_request.imp(impid)) else {
                tracing::warn!(
                    impid = bid.impid.as_deref().unwrap_or_default(),
                    "Response bid does not match any imp of the request"
                );
                counter!(RESPONSE_BID_UNMATCHED).increment(1);
                continue;
            };

            let mut bid_context = context.clone().with_imp(imp).with_ortb_response(response);
            if let Some(bid_request) = bid_requests.get(source) {
                bid_context = bid_context.with_bid_request(bid_request);
                if bid_context.media_type.is_none() {
                    if let [only] = bid_request.declared_media_types()[..] {
                        bid_context = bid_context.with_media_type(only);
                    }
                }
            }

            bid_responses.push(self.build_bid_response(bid, &bid_context));
        }
        bid_responses
    }
}

fn run_imp_processors(
    processors: &[Arc<ImpProcessorFn>],
    bid_request: &BidRequest,
    context: &ConversionContext<'_>,
) -> JsonObject {
    let mut imp = JsonObject::new();
    for processor in processors {
        processor(&mut imp, bid_request, context);
    }
    imp
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::MediaType;
    use crate::registry::{Processor, ProcessorPoint};
    use crate::testutils::{banner_request, video_request};
    use serde_json::json;

    fn converter() -> OrtbConverter {
        OrtbConverter::new(ConverterConfig::default()).unwrap()
    }

    fn bidder_request(value: JsonValue) -> BidderRequest {
        serde_json::from_value(value).unwrap()
    }

    fn response(value: JsonValue) -> OrtbResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_build_request_banner_only() {
        let converter = converter();
        let bid_requests = [banner_request("b1", json!([[300, 250]]))];

        let request = converter
            .build_request(&bid_requests, &BidderRequest::default(), &converter.context())
            .unwrap()
            .into_body();

        let imps = request["imp"].as_array().unwrap();
        assert_eq!(imps.len(), 1);
        let imp = imps[0].as_object().unwrap();
        assert_eq!(imp["id"], json!("b1"));
        assert_eq!(imp["secure"], json!(1));
        assert_eq!(imp["banner"]["format"], json!([{"w": 300, "h": 250}]));
        for absent in ["video", "native", "audio"] {
            assert!(!imp.contains_key(absent), "unexpected {absent}");
        }
        assert_eq!(request["cur"], json!(["USD"]));
        assert_eq!(request["test"], json!(0));
        assert!(request["id"].as_str().is_some_and(|id| !id.is_empty()));
    }

    #[test]
    fn test_build_request_keeps_explicit_insecure_imp() {
        let converter = converter();
        let mut bid_request = banner_request("b1", json!([300, 250]));
        bid_request.ortb2_imp = json!({"secure": 0}).as_object().cloned();

        let request = converter
            .build_request(&[bid_request], &BidderRequest::default(), &converter.context())
            .unwrap()
            .into_body();

        assert_eq!(request["imp"][0]["secure"], json!(0));
    }

    #[test]
    fn test_build_request_from_first_party_data() {
        let converter = converter();
        let bidder = bidder_request(json!({
            "timeout": "800",
            "ortb2": {
                "id": "auction-request",
                "site": {"page": "https://example.com"},
                "app": {"bundle": "com.example"},
                "regs": {"ext": {"gdpr": 1}}
            }
        }));

        let request = converter
            .build_request(
                &[banner_request("b1", json!([300, 250]))],
                &bidder,
                &converter.context(),
            )
            .unwrap()
            .into_body();

        assert_eq!(request["id"], json!("auction-request"));
        assert_eq!(request["tmax"], json!(800));
        assert_eq!(request["regs"]["ext"]["gdpr"], json!(1));
        assert!(request.contains_key("app"));
        assert!(!request.contains_key("site"));
    }

    #[test]
    fn test_build_request_unparsable_timeout() {
        let converter = converter();
        let bidder = bidder_request(json!({"timeout": "later"}));

        let request = converter
            .build_request(
                &[banner_request("b1", json!([300, 250]))],
                &bidder,
                &converter.context(),
            )
            .unwrap()
            .into_body();

        assert!(!request.contains_key("tmax"));
    }

    #[test]
    fn test_build_request_requires_bid_requests() {
        let converter = converter();
        assert!(matches!(
            converter
                .build_request(&[], &BidderRequest::default(), &converter.context())
                .unwrap_err(),
            ConverterError::NoBidRequests
        ));
    }

    #[test]
    fn test_imps_without_id_are_dropped() {
        let mut converter = converter();
        converter
            .registry_mut()
            .register(
                ProcessorPoint::Imp,
                "id",
                0,
                Processor::imp(|imp, bid_request, _| match bid_request.bid_id.as_str() {
                    "skip" => {}
                    "null" => {
                        imp.insert("id".to_string(), JsonValue::Null);
                    }
                    "blank" => {
                        imp.insert("id".to_string(), json!(""));
                    }
                    bid_id => {
                        imp.insert("id".to_string(), json!(bid_id));
                    }
                }),
            )
            .unwrap();

        let bid_requests = [
            banner_request("keep", json!([300, 250])),
            banner_request("skip", json!([300, 250])),
            banner_request("null", json!([300, 250])),
            banner_request("blank", json!([300, 250])),
        ];
        let request = converter
            .build_request(&bid_requests, &BidderRequest::default(), &converter.context())
            .unwrap()
            .into_body();

        let imps = request["imp"].as_array().unwrap();
        assert_eq!(imps.len(), 2);
        assert_eq!(imps[0]["id"], json!("keep"));
        assert_eq!(imps[1]["id"], json!(""));
    }

    #[test]
    fn test_interpret_response_with_custom_imp_ids() {
        let mut converter = converter();
        converter
            .registry_mut()
            .register(
                ProcessorPoint::Imp,
                "id",
                0,
                Processor::imp(|imp, bid_request, _| {
                    imp.insert("id".to_string(), json!(format!("imp-{}", bid_request.bid_id)));
                }),
            )
            .unwrap();
        let bid_requests = [
            banner_request("b1", json!([300, 250])),
            video_request("v1", json!({"playerSize": [640, 480], "context": "outstream"})),
        ];
        let context = converter.context();
        let request = converter
            .build_request(&bid_requests, &BidderRequest::default(), &context)
            .unwrap();
        assert_eq!(request.body()["imp"][1]["id"], json!("imp-v1"));

        let ortb_response = response(json!({
            "seatbid": [{"bid": [
                {"impid": "imp-v1", "price": 2.0, "adm": "<VAST/>"},
                {"impid": "v1", "price": 2.0, "adm": "<VAST/>"}
            ]}]
        }));

        let bids = converter.interpret_response(&request, &bid_requests, &ortb_response, &context);

        assert_eq!(bids.len(), 1);
        let video = &bids[0];
        assert_eq!(video.request_id.as_deref(), Some("v1"));
        assert_eq!(video.media_type, Some(MediaType::Video));
        assert_eq!(video.vast_xml.as_deref(), Some("<VAST/>"));
        assert_eq!(video.video_context.as_deref(), Some("outstream"));
    }

    #[test]
    fn test_interpret_response_skips_bids_without_impid() {
        let mut converter = converter();
        converter
            .registry_mut()
            .register(
                ProcessorPoint::Imp,
                "id",
                0,
                Processor::imp(|imp, _, _| {
                    imp.insert("id".to_string(), json!(""));
                }),
            )
            .unwrap();
        let bid_requests = [banner_request("b1", json!([300, 250]))];
        let context = converter.context();
        let request = converter
            .build_request(&bid_requests, &BidderRequest::default(), &context)
            .unwrap();

        let ortb_response = response(json!({
            "seatbid": [{"bid": [{"price": 1.0, "adm": "<div/>"}, {"impid": "", "price": 1.0, "adm": "<div/>"}]}]
        }));

        let bids = converter.interpret_response(&request, &bid_requests, &ortb_response, &context);

        assert_eq!(bids.len(), 1);
        assert_eq!(bids[0].request_id.as_deref(), Some("b1"));
    }

    #[test]
    fn test_media_type_filter_when_building_imps() {
        let converter = converter();
        let mut bid_request = banner_request("b1", json!([300, 250]));
        bid_request.media_types.video = json!({"playerSize": [640, 480]}).as_object().cloned();

        let imp = converter.build_imp(&bid_request, &converter.context());
        assert!(imp.contains_key("banner") && imp.contains_key("video"));

        let context = converter.context().with_media_type(MediaType::Video);
        let imp = converter.build_imp(&bid_request, &context);
        assert!(!imp.contains_key("banner"));
        assert!(imp.contains_key("video"));
    }

    #[test]
    fn test_disabled_processors_from_config() {
        let config = ConverterConfig {
            disabled_processors: vec!["imp.secure".to_string(), "request.onlyOneClient".to_string()],
            ..Default::default()
        };
        let converter = OrtbConverter::new(config).unwrap();
        let bidder = bidder_request(json!({"ortb2": {"site": {}, "app": {}}}));

        let request = converter
            .build_request(
                &[banner_request("b1", json!([300, 250]))],
                &bidder,
                &converter.context(),
            )
            .unwrap()
            .into_body();

        assert!(!request["imp"][0].as_object().unwrap().contains_key("secure"));
        assert!(request.contains_key("site") && request.contains_key("app"));
    }

    #[test]
    fn test_new_rejects_unknown_disabled_processor() {
        let config = ConverterConfig {
            disabled_processors: vec!["imp.nonexistent".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            OrtbConverter::new(config).unwrap_err(),
            ConverterError::UnknownProcessor { .. }
        ));
    }

    #[test]
    fn test_interpret_response() {
        let converter = converter();
        let bid_requests = [
            banner_request("b1", json!([300, 250])),
            video_request("v1", json!({"playerSize": [640, 480], "context": "instream"})),
        ];
        let context = converter.context();
        let request = converter
            .build_request(&bid_requests, &BidderRequest::default(), &context)
            .unwrap();

        let ortb_response = response(json!({
            "id": "r",
            "cur": "EUR",
            "seatbid": [{
                "seat": "s",
                "bid": [
                    {"id": "1", "impid": "b1", "price": 1.5, "adm": "<div/>", "crid": "c1", "cat": ["IAB1"]},
                    {"id": "2", "impid": "v1", "price": 3.0, "adm": "<VAST/>"},
                    {"id": "3", "impid": "unknown", "price": 9.0, "adm": "<div/>"}
                ]
            }]
        }));

        let bids = converter.interpret_response(&request, &bid_requests, &ortb_response, &context);

        assert_eq!(bids.len(), 2);

        let banner = &bids[0];
        assert_eq!(banner.request_id.as_deref(), Some("b1"));
        assert_eq!(banner.media_type, Some(MediaType::Banner));
        assert_eq!(banner.ad.as_deref(), Some("<div/>"));
        assert_eq!(banner.currency.as_deref(), Some("EUR"));
        assert_eq!(banner.ttl, Some(300));
        assert_eq!(banner.net_revenue, Some(true));
        assert_eq!(banner.meta.secondary_cat_ids, Some(vec![]));

        let video = &bids[1];
        assert_eq!(video.media_type, Some(MediaType::Video));
        assert_eq!(video.vast_xml.as_deref(), Some("<VAST/>"));
        assert_eq!(video.player_width, Some(640));
        assert_eq!(video.video_context.as_deref(), Some("instream"));
        assert!(video.ad.is_none());
    }

    #[test]
    fn test_interpret_response_ambiguous_media_type_uses_mtype() {
        let converter = converter();
        let mut bid_request = banner_request("b1", json!([300, 250]));
        bid_request.media_types.video = json!({"playerSize": [640, 480]}).as_object().cloned();
        let bid_requests = [bid_request];
        let context = converter.context();
        let request = converter
            .build_request(&bid_requests, &BidderRequest::default(), &context)
            .unwrap();

        let ortb_response = response(json!({
            "seatbid": [{"bid": [
                {"impid": "b1", "price": 1.0, "adm": "<VAST/>", "mtype": 2},
                {"impid": "b1", "price": 1.0, "adm": "<div/>"}
            ]}]
        }));

        let bids = converter.interpret_response(&request, &bid_requests, &ortb_response, &context);

        assert_eq!(bids[0].media_type, Some(MediaType::Video));
        assert_eq!(bids[0].vast_xml.as_deref(), Some("<VAST/>"));
        // Unresolvable: returned, but unusable.
        assert_eq!(bids[1].media_type, None);
        assert!(!bids[1].has_markup());
        assert_eq!(bids[1].cpm, Some(1.0));
    }

    #[test]
    fn test_build_bid_response_uses_context_media_type() {
        let converter = converter();
        let bid: OrtbBid = serde_json::from_value(json!({"adm": "<div/>", "mtype": 2})).unwrap();
        let context = converter.context().with_media_type(MediaType::Banner);

        let bid_response = converter.build_bid_response(&bid, &context);

        assert_eq!(bid_response.media_type, Some(MediaType::Banner));
        assert_eq!(bid_response.ad.as_deref(), Some("<div/>"));
    }

    #[test]
    fn test_concurrent_conversions_share_one_converter() {
        let converter = Arc::new(converter());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let converter = Arc::clone(&converter);
                std::thread::spawn(move || {
                    let bid_id = format!("bid-{i}");
                    let bid_requests = [banner_request(&bid_id, json!([300, 250]))];
                    let request = converter
                        .build_request(&bid_requests, &BidderRequest::default(), &converter.context())
                        .unwrap()
                        .into_body();
                    (bid_id, request)
                })
            })
            .collect();

        let mut request_ids = std::collections::HashSet::new();
        for handle in handles {
            let (bid_id, request) = handle.join().unwrap();
            assert_eq!(request["imp"][0]["id"], json!(bid_id));
            request_ids.insert(request["id"].as_str().unwrap().to_string());
        }
        assert_eq!(request_ids.len(), 8);
    }
}
