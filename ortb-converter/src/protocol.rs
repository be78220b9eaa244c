//! Data types on both sides of the conversion.
//!
//! Inbound, from the auction:
//! - [`BidderRequest`]: shared by every bid request of one auction (timeout,
//!   top-level first-party data).
//! - [`BidRequest`]: one per ad unit (bid id, declared media types, per-imp
//!   first-party data, resolved floor).
//!
//! From the bidding endpoint:
//! - [`OrtbResponse`] / [`SeatBid`] / [`OrtbBid`]: the OpenRTB 2.x response body.
//!
//! Outbound to the auction:
//! - [`BidResponse`]: one normalized bid per OpenRTB response bid.
//!
//! The OpenRTB request itself is a plain [`JsonObject`] because first-party data
//! can carry any OpenRTB field.
//!
//! Every struct keeps unknown keys in `extra_fields` so they survive a round trip.

use crate::json::JsonObject;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// Markup category of an ad slot or a returned bid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Banner,
    Video,
    Native,
    Audio,
}

impl MediaType {
    pub const ALL: [MediaType; 4] = [
        MediaType::Banner,
        MediaType::Video,
        MediaType::Native,
        MediaType::Audio,
    ];

    /// Maps the OpenRTB 2.6 `bid.mtype` code to a media type.
    pub fn from_mtype(code: u64) -> Option<Self> {
        match code {
            1 => Some(MediaType::Banner),
            2 => Some(MediaType::Video),
            3 => Some(MediaType::Audio),
            4 => Some(MediaType::Native),
            _ => None,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            MediaType::Banner => "banner",
            MediaType::Video => "video",
            MediaType::Native => "native",
            MediaType::Audio => "audio",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `[width, height]` pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size(pub u64, pub u64);

/// Ad unit sizes, accepted either as a single `[w, h]` or as `[[w, h], ...]`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SizesRepr")]
pub struct Sizes(pub Vec<Size>);

#[derive(Deserialize)]
#[serde(untagged)]
enum SizesRepr {
    Many(Vec<Size>),
    One(Size),
}

impl From<SizesRepr> for Sizes {
    fn from(repr: SizesRepr) -> Self {
        match repr {
            SizesRepr::Many(sizes) => Sizes(sizes),
            SizesRepr::One(size) => Sizes(vec![size]),
        }
    }
}

impl Sizes {
    /// Parses sizes from a raw JSON value, ignoring malformed input.
    pub fn from_value(value: &JsonValue) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }

    /// OpenRTB `format` objects: `[{"w": 300, "h": 250}, ...]`.
    pub fn to_format(&self) -> Vec<JsonValue> {
        self.0
            .iter()
            .map(|Size(w, h)| serde_json::json!({ "w": w, "h": h }))
            .collect()
    }

    pub fn first(&self) -> Option<Size> {
        self.0.first().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Shared request data for all bid requests sent to one bidder in one auction.
///
/// # Example
/// ```json
/// {
///   "bidderCode": "acme",
///   "timeout": 500,
///   "ortb2": {"site": {"page": "https://example.com"}, "device": {"w": 1512}}
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidderRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bidder_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub auction_id: Option<String>,

    /// Auction timeout in milliseconds. Kept raw because callers hand over
    /// numbers, numeric strings, or garbage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<JsonValue>,

    /// Top-level first-party data (site/app/dooh, device, user, regs, source...).
    /// Consent signals are expected to already be resolved into `regs`/`user`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ortb2: Option<JsonObject>,

    #[serde(flatten)]
    pub extra_fields: JsonObject,
}

/// Declared media types of an ad unit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaTypes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<BannerParams>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<JsonObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native: Option<JsonObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<JsonObject>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BannerParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sizes: Option<Sizes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos: Option<i64>,
    #[serde(flatten)]
    pub extra_fields: JsonObject,
}

/// Floor price already resolved by the floors module for this ad unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Floor {
    pub floor: f64,
    pub currency: String,
}

/// One ad unit as seen by one bidder.
///
/// # Example
/// ```json
/// {
///   "bidId": "2f1a",
///   "adUnitCode": "div-top",
///   "mediaTypes": {"banner": {"sizes": [[300, 250]]}},
///   "ortb2Imp": {"ext": {"tid": "t-1", "gpid": "/1/top"}},
///   "floor": {"floor": 0.5, "currency": "USD"}
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidRequest {
    pub bid_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bidder: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_unit_code: Option<String>,

    #[serde(default)]
    pub media_types: MediaTypes,

    /// Native request already expressed as OpenRTB native assets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_ortb_request: Option<JsonObject>,

    /// Per-imp first-party data, including `ext.tid` and `ext.gpid`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ortb2_imp: Option<JsonObject>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor: Option<Floor>,

    /// Bidder-specific parameters, opaque to the converter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<JsonValue>,

    #[serde(flatten)]
    pub extra_fields: JsonObject,
}

impl BidRequest {
    pub fn new(bid_id: impl Into<String>) -> Self {
        Self {
            bid_id: bid_id.into(),
            ..Default::default()
        }
    }

    /// Whether the ad unit asks for `media_type`.
    ///
    /// Video and audio only count when they carry at least one parameter.
    pub fn declares(&self, media_type: MediaType) -> bool {
        let media_types = &self.media_types;
        match media_type {
            MediaType::Banner => media_types.banner.is_some(),
            MediaType::Video => media_types.video.as_ref().is_some_and(|v| !v.is_empty()),
            MediaType::Native => {
                media_types.native.is_some() || self.native_ortb_request.is_some()
            }
            MediaType::Audio => media_types.audio.as_ref().is_some_and(|a| !a.is_empty()),
        }
    }

    pub fn declared_media_types(&self) -> Vec<MediaType> {
        MediaType::ALL
            .into_iter()
            .filter(|media_type| self.declares(*media_type))
            .collect()
    }
}

/// OpenRTB bid response body.
///
/// # Example
/// ```json
/// {
///   "id": "resp-1",
///   "cur": "EUR",
///   "seatbid": [{"seat": "s1", "bid": [{"id": "b1", "impid": "2f1a", "price": 1.2, "adm": "<div/>"}]}]
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrtbResponse {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
    pub cur: Option<String>,

    #[serde(default, deserialize_with = "lenient::entries")]
    pub seatbid: Vec<SeatBid>,

    #[serde(flatten)]
    pub extra_fields: JsonObject,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeatBid {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
    pub seat: Option<String>,

    #[serde(default, deserialize_with = "lenient::entries")]
    pub bid: Vec<OrtbBid>,

    #[serde(flatten)]
    pub extra_fields: JsonObject,
}

/// One OpenRTB `seatbid[].bid[]` entry.
///
/// Fields are read leniently: whole-number floats and numeric strings are
/// accepted where integers are expected, and a value that cannot be read leaves
/// its field unset instead of failing the response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrtbBid {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
    pub impid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::number")]
    pub price: Option<f64>,
    /// Markup. A string for banner/video/audio, a string or object for native.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adm: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
    pub nurl: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
    pub burl: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::strings")]
    pub adomain: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::strings")]
    pub cat: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::integers")]
    pub attr: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::unsigned")]
    pub w: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::unsigned")]
    pub h: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::unsigned")]
    pub wratio: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::unsigned")]
    pub hratio: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
    pub dealid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
    pub crid: Option<String>,
    /// Seconds the bid may be held before use.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::unsigned")]
    pub exp: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::unsigned")]
    pub mtype: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::object")]
    pub ext: Option<JsonObject>,

    #[serde(flatten)]
    pub extra_fields: JsonObject,
}

impl OrtbBid {
    /// Returns `bid.ext.<key>` if present.
    pub fn ext_field(&self, key: &str) -> Option<&JsonValue> {
        self.ext
            .as_ref()
            .and_then(|ext| ext.get(key))
            .filter(|value| !value.is_null())
    }

    /// `adm` as text, when it is a string.
    pub fn adm_str(&self) -> Option<&str> {
        self.adm.as_ref().and_then(JsonValue::as_str)
    }
}

/// Native markup of a bid response, in OpenRTB native response form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeResponse {
    pub ortb: JsonObject,
}

/// Normalized bid handed back to the auction.
///
/// Fields stay `None` unless a processor had a value for them. A response without
/// any markup field (see [`BidResponse::has_markup`]) is not usable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seat_bid_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wratio: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hratio: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deal_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creative_id: Option<String>,
    /// Same value as `creative_id`, under the snake_case key older consumers read.
    #[serde(rename = "creative_id", skip_serializing_if = "Option::is_none")]
    pub legacy_creative_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub burl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_revenue: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vast_xml: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vast_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native: Option<NativeResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_width: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_height: Option<u64>,
    /// `mediaTypes.video.context` of the matched ad unit, e.g. `outstream`,
    /// for callers that attach a renderer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_context: Option<String>,

    #[serde(default)]
    pub meta: BidMeta,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub eventtrackers: Vec<JsonValue>,

    #[serde(flatten)]
    pub extra_fields: JsonObject,
}

impl BidResponse {
    /// True if any markup field is populated.
    pub fn has_markup(&self) -> bool {
        self.ad.is_some()
            || self.ad_url.is_some()
            || self.vast_xml.is_some()
            || self.vast_url.is_some()
            || self.native.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advertiser_domains: Option<Vec<String>>,
    /// Digital Services Act transparency data from `bid.ext.dsa`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dsa: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_cat_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_cat_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attr: Option<Vec<i64>>,

    #[serde(flatten)]
    pub extra_fields: JsonObject,
}

/// Deserializers for response fields that bidders fill in loosely.
///
/// A value of the wrong shape reads as `None`, and list entries that cannot be
/// read are left out.
mod lenient {
    use crate::json::JsonObject;
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value as JsonValue;

    pub fn unsigned<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
        Ok(as_unsigned(&JsonValue::deserialize(deserializer)?))
    }

    pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        let number = match JsonValue::deserialize(deserializer)? {
            JsonValue::Number(number) => number.as_f64(),
            JsonValue::String(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        };
        Ok(number.filter(|number| number.is_finite()))
    }

    pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        Ok(match JsonValue::deserialize(deserializer)? {
            JsonValue::String(text) => Some(text),
            JsonValue::Number(number) => Some(number.to_string()),
            _ => None,
        })
    }

    pub fn strings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<String>>, D::Error> {
        Ok(match JsonValue::deserialize(deserializer)? {
            JsonValue::Array(items) => Some(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        JsonValue::String(text) => Some(text),
                        _ => None,
                    })
                    .collect(),
            ),
            _ => None,
        })
    }

    pub fn integers<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<i64>>, D::Error> {
        Ok(match JsonValue::deserialize(deserializer)? {
            JsonValue::Array(items) => Some(items.iter().filter_map(as_integer).collect()),
            _ => None,
        })
    }

    pub fn object<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<JsonObject>, D::Error> {
        Ok(match JsonValue::deserialize(deserializer)? {
            JsonValue::Object(object) => Some(object),
            _ => None,
        })
    }

    /// Reads every entry that deserializes as `T`, logging the ones that don't.
    pub fn entries<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let JsonValue::Array(items) = JsonValue::deserialize(deserializer)? else {
            return Ok(Vec::new());
        };
        Ok(items
            .into_iter()
            .filter_map(|item| match serde_json::from_value(item) {
                Ok(entry) => Some(entry),
                Err(error) => {
                    tracing::warn!(%error, "Skipping unreadable OpenRTB response entry");
                    None
                }
            })
            .collect())
    }

    fn as_unsigned(value: &JsonValue) -> Option<u64> {
        match value {
            JsonValue::Number(number) => number.as_u64().or_else(|| {
                number
                    .as_f64()
                    .filter(|float| float.fract() == 0.0 && *float >= 0.0 && *float < u64::MAX as f64)
                    .map(|float| float as u64)
            }),
            JsonValue::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    fn as_integer(value: &JsonValue) -> Option<i64> {
        match value {
            JsonValue::Number(number) => number.as_i64().or_else(|| {
                number
                    .as_f64()
                    .filter(|float| float.fract() == 0.0 && float.abs() < i64::MAX as f64)
                    .map(|float| float as i64)
            }),
            JsonValue::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sizes_accept_single_and_nested() {
        let many: Sizes = serde_json::from_value(json!([[300, 250], [728, 90]])).unwrap();
        assert_eq!(many.0, vec![Size(300, 250), Size(728, 90)]);

        let one: Sizes = serde_json::from_value(json!([640, 480])).unwrap();
        assert_eq!(one.0, vec![Size(640, 480)]);

        assert!(Sizes::from_value(&json!("300x250")).is_none());
        assert_eq!(
            one.to_format(),
            vec![json!({"w": 640, "h": 480})]
        );
    }

    #[test]
    fn test_bid_request_deserialization() {
        let request: BidRequest = serde_json::from_value(json!({
            "bidId": "bid-1",
            "adUnitCode": "div-1",
            "mediaTypes": {
                "banner": {"sizes": [[300, 250]], "pos": 1},
                "video": {"playerSize": [640, 480], "context": "outstream"}
            },
            "ortb2Imp": {"ext": {"tid": "t"}},
            "auctionId": "a-1"
        }))
        .unwrap();

        assert_eq!(request.bid_id, "bid-1");
        assert_eq!(request.media_types.banner.as_ref().unwrap().pos, Some(1));
        assert_eq!(
            request.declared_media_types(),
            vec![MediaType::Banner, MediaType::Video]
        );
        assert_eq!(request.ortb2_imp.unwrap()["ext"]["tid"], json!("t"));
        assert_eq!(request.extra_fields["auctionId"], json!("a-1"));
    }

    #[test]
    fn test_empty_video_is_not_declared() {
        let mut request = BidRequest::new("b");
        request.media_types.video = Some(JsonObject::new());
        assert!(!request.declares(MediaType::Video));

        request.native_ortb_request = Some(JsonObject::new());
        assert_eq!(request.declared_media_types(), vec![MediaType::Native]);
    }

    #[test]
    fn test_mtype_codes() {
        assert_eq!(MediaType::from_mtype(1), Some(MediaType::Banner));
        assert_eq!(MediaType::from_mtype(2), Some(MediaType::Video));
        assert_eq!(MediaType::from_mtype(3), Some(MediaType::Audio));
        assert_eq!(MediaType::from_mtype(4), Some(MediaType::Native));
        assert_eq!(MediaType::from_mtype(0), None);
        assert_eq!(MediaType::from_mtype(9), None);
    }

    #[test]
    fn test_response_keeps_unknown_fields() {
        let response: OrtbResponse = serde_json::from_value(json!({
            "id": "r",
            "cur": "NOK",
            "bidid": "x",
            "seatbid": [{"seat": "s", "bid": [{"impid": "1", "price": 1.5, "mtype": 1, "lurl": "l"}]}]
        }))
        .unwrap();

        assert_eq!(response.extra_fields["bidid"], json!("x"));
        let bid = &response.seatbid[0].bid[0];
        assert_eq!(bid.price, Some(1.5));
        assert_eq!(bid.extra_fields["lurl"], json!("l"));
    }

    #[test]
    fn test_loosely_typed_bid_does_not_reject_response() {
        let response: OrtbResponse = serde_json::from_value(json!({
            "cur": "USD",
            "seatbid": [{"bid": [
                {"impid": "1", "price": 1.0, "w": 300, "h": 250, "mtype": 1},
                {
                    "impid": 2,
                    "price": "2.5",
                    "w": 300.0,
                    "h": "250",
                    "wratio": -1,
                    "exp": 1.5,
                    "mtype": "banner",
                    "attr": [1, "x", 3.0],
                    "cat": ["IAB1", 7],
                    "ext": "none"
                },
                "not a bid"
            ]}]
        }))
        .unwrap();

        let bids = &response.seatbid[0].bid;
        assert_eq!(bids.len(), 2);
        assert_eq!(bids[0].w, Some(300));
        assert_eq!(bids[0].mtype, Some(1));

        let odd = &bids[1];
        assert_eq!(odd.impid.as_deref(), Some("2"));
        assert_eq!(odd.price, Some(2.5));
        assert_eq!((odd.w, odd.h), (Some(300), Some(250)));
        assert_eq!(odd.wratio, None);
        assert_eq!(odd.exp, None);
        assert_eq!(odd.mtype, None);
        assert_eq!(odd.attr, Some(vec![1, 3]));
        assert_eq!(odd.cat, Some(vec!["IAB1".to_string()]));
        assert!(odd.ext.is_none());
    }

    #[test]
    fn test_bid_response_serialization() {
        let response = BidResponse {
            request_id: Some("b".to_string()),
            creative_id: Some("c".to_string()),
            legacy_creative_id: Some("c".to_string()),
            media_type: Some(MediaType::Banner),
            ..Default::default()
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["requestId"], json!("b"));
        assert_eq!(value["creativeId"], json!("c"));
        assert_eq!(value["creative_id"], json!("c"));
        assert_eq!(value["mediaType"], json!("banner"));
        assert_eq!(value["meta"], json!({}));
        assert!(value.get("cpm").is_none());
        assert!(value.get("eventtrackers").is_none());
        assert!(!response.has_markup());
    }
}
