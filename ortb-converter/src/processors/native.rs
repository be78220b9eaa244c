//! Native media type.
//!
//! Ad units describe native slots either with an OpenRTB native request
//! (`nativeOrtbRequest`, or `mediaTypes.native.ortb`) or with the legacy asset
//! declarations:
//!
//! ```json
//! {"title": {"required": true, "len": 80}, "image": {"sizes": [300, 250]}, "sponsoredBy": {}}
//! ```
//!
//! Legacy declarations are converted to OpenRTB native assets. The imp carries
//! the native request as a JSON string, as OpenRTB requires.

use super::MediaTypeResolver;
use crate::context::ConversionContext;
use crate::json::{JsonObject, is_truthy, merge, object_at};
use crate::counter;
use crate::metrics_defs::BID_RESPONSE_NATIVE_INVALID;
use crate::protocol::{BidRequest, BidResponse, MediaType, NativeResponse, OrtbBid, Sizes};
use serde_json::{Value as JsonValue, json};

const DEFAULT_TITLE_LEN: u64 = 140;

const IMAGE_TYPE_ICON: u64 = 1;
const IMAGE_TYPE_MAIN: u64 = 3;

/// OpenRTB native data asset type codes for the legacy keys.
const DATA_ASSET_TYPES: &[(&str, u64)] = &[
    ("sponsoredBy", 1),
    ("body", 2),
    ("rating", 3),
    ("likes", 4),
    ("downloads", 5),
    ("price", 6),
    ("salePrice", 7),
    ("phone", 8),
    ("address", 9),
    ("body2", 10),
    ("displayUrl", 11),
    ("cta", 12),
];

/// Maps native ad unit declarations to `imp.native` and native markup back to
/// `native.ortb`.
#[derive(Debug)]
pub struct NativeResolver {
    default_version: String,
}

impl NativeResolver {
    /// `default_version` is advertised when the native request carries no `ver`.
    pub fn new(default_version: impl Into<String>) -> Self {
        Self {
            default_version: default_version.into(),
        }
    }

    fn native_request(&self, bid_request: &BidRequest) -> Option<JsonObject> {
        let mut request = JsonObject::new();
        request.insert("ver".to_string(), json!(self.default_version));

        if let Some(ortb) = &bid_request.native_ortb_request {
            merge(&mut request, Some(ortb));
        } else {
            let params = bid_request.media_types.native.as_ref()?;
            match object_at(params, "ortb") {
                Some(ortb) => {
                    merge(&mut request, Some(ortb));
                }
                None => {
                    request.insert("assets".to_string(), JsonValue::Array(legacy_assets(params)));
                }
            }
        }
        Some(request)
    }
}

impl Default for NativeResolver {
    fn default() -> Self {
        Self::new("1.2")
    }
}

impl MediaTypeResolver for NativeResolver {
    fn media_type(&self) -> MediaType {
        MediaType::Native
    }

    fn fill_imp(&self, imp: &mut JsonObject, bid_request: &BidRequest, context: &ConversionContext<'_>) {
        if !context.allows(MediaType::Native) {
            return;
        }
        let Some(request) = self.native_request(bid_request) else {
            return;
        };

        let has_assets = request
            .get("assets")
            .and_then(JsonValue::as_array)
            .is_some_and(|assets| !assets.is_empty());
        if !has_assets {
            tracing::warn!(
                bid_id = %bid_request.bid_id,
                "Native ad unit declares no assets, skipping native"
            );
            return;
        }

        let version = request.get("ver").cloned().unwrap_or(JsonValue::Null);
        let mut native = JsonObject::new();
        native.insert(
            "request".to_string(),
            JsonValue::String(JsonValue::Object(request).to_string()),
        );
        if !version.is_null() {
            native.insert("ver".to_string(), version);
        }

        merge(&mut native, object_at(imp, "native"));
        imp.insert("native".to_string(), JsonValue::Object(native));
    }

    fn fill_response(&self, bid_response: &mut BidResponse, bid: &OrtbBid, _context: &ConversionContext<'_>) {
        if bid_response.media_type != Some(MediaType::Native) {
            return;
        }

        match parse_native_markup(bid.adm.as_ref()) {
            Some(ortb) => bid_response.native = Some(NativeResponse { ortb }),
            None => {
                tracing::warn!(
                    impid = bid.impid.as_deref().unwrap_or_default(),
                    "Native bid markup is not an OpenRTB native response"
                );
                counter!(BID_RESPONSE_NATIVE_INVALID).increment(1);
            }
        }
    }
}

/// Reads `adm` as an OpenRTB native response.
///
/// `adm` may be a JSON string or an object, and may be wrapped in the
/// native 1.0 `{"native": {...}}` envelope. Returns `None` unless the
/// response carries an `assets` array.
fn parse_native_markup(adm: Option<&JsonValue>) -> Option<JsonObject> {
    let mut markup = match adm? {
        JsonValue::String(text) => serde_json::from_str::<JsonValue>(text).ok()?,
        value => value.clone(),
    };
    if markup.get("native").is_some_and(JsonValue::is_object) {
        markup = markup["native"].take();
    }

    match markup {
        JsonValue::Object(ortb) if ortb.get("assets").is_some_and(JsonValue::is_array) => Some(ortb),
        _ => None,
    }
}

/// Converts legacy native declarations into OpenRTB native request assets,
/// numbered from 0 in declaration order. Unknown keys are ignored.
fn legacy_assets(params: &JsonObject) -> Vec<JsonValue> {
    params
        .iter()
        .filter_map(|(key, declaration)| {
            let declaration = declaration.as_object()?;
            let body = legacy_asset_body(key, declaration)?;
            Some((declaration, body))
        })
        .enumerate()
        .map(|(id, (declaration, (kind, body)))| {
            let required = declaration.get("required").is_some_and(is_truthy);
            let mut asset = JsonObject::new();
            asset.insert("id".to_string(), json!(id));
            asset.insert("required".to_string(), json!(i32::from(required)));
            asset.insert(kind.to_string(), body);
            JsonValue::Object(asset)
        })
        .collect()
}

fn legacy_asset_body(key: &str, declaration: &JsonObject) -> Option<(&'static str, JsonValue)> {
    let len = declaration.get("len").and_then(JsonValue::as_u64);
    match key {
        "title" => Some(("title", json!({"len": len.unwrap_or(DEFAULT_TITLE_LEN)}))),
        "image" => Some(("img", image_asset(IMAGE_TYPE_MAIN, declaration))),
        "icon" => Some(("img", image_asset(IMAGE_TYPE_ICON, declaration))),
        _ => {
            let (_, data_type) = DATA_ASSET_TYPES.iter().find(|(name, _)| *name == key)?;
            let mut data = JsonObject::new();
            data.insert("type".to_string(), json!(data_type));
            if let Some(len) = len {
                data.insert("len".to_string(), json!(len));
            }
            Some(("data", JsonValue::Object(data)))
        }
    }
}

fn image_asset(image_type: u64, declaration: &JsonObject) -> JsonValue {
    let mut img = JsonObject::new();
    img.insert("type".to_string(), json!(image_type));

    if let Some(size) = declaration
        .get("sizes")
        .and_then(Sizes::from_value)
        .and_then(|sizes| sizes.first())
    {
        img.insert("w".to_string(), json!(size.0));
        img.insert("h".to_string(), json!(size.1));
    }

    let aspect_ratio = declaration
        .get("aspect_ratios")
        .and_then(JsonValue::as_array)
        .and_then(|ratios| ratios.first())
        .and_then(JsonValue::as_object);
    if let Some(aspect_ratio) = aspect_ratio {
        let ratio_width = aspect_ratio.get("ratio_width").and_then(JsonValue::as_u64);
        let ratio_height = aspect_ratio.get("ratio_height").and_then(JsonValue::as_u64);
        if let (Some(ratio_width), Some(ratio_height)) = (ratio_width, ratio_height) {
            if ratio_width > 0 {
                let min_width = aspect_ratio.get("min_width").and_then(JsonValue::as_u64);
                let min_height = min_width
                    .and_then(|min_width| min_width.checked_mul(ratio_height))
                    .map(|scaled| scaled / ratio_width);
                if let (Some(min_width), Some(min_height)) = (min_width, min_height) {
                    img.insert("wmin".to_string(), json!(min_width));
                    img.insert("hmin".to_string(), json!(min_height));
                }
                img.insert(
                    "ext".to_string(),
                    json!({"aspectratios": [format!("{ratio_width}:{ratio_height}")]}),
                );
            }
        }
    }

    if let Some(mimes) = declaration.get("mimes").filter(|mimes| mimes.is_array()) {
        img.insert("mimes".to_string(), mimes.clone());
    }

    JsonValue::Object(img)
}
