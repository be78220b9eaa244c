//! Allow-lists for the OpenRTB parameters an ad unit may pass straight through
//! to `imp.video` and `imp.audio`.

use crate::json::JsonObject;
use serde_json::Value as JsonValue;

#[derive(Clone, Copy, Debug)]
pub(crate) enum ParamKind {
    Integer,
    Number,
    Text,
    /// 0 or 1.
    Flag,
    IntegerList,
    /// Non-empty list of strings.
    TextList,
    Any,
}

impl ParamKind {
    fn accepts(self, value: &JsonValue) -> bool {
        match self {
            ParamKind::Integer => is_integer(value),
            ParamKind::Number => value.is_number(),
            ParamKind::Text => value.is_string(),
            ParamKind::Flag => value.as_u64().is_some_and(|flag| flag <= 1),
            ParamKind::IntegerList => value
                .as_array()
                .is_some_and(|items| items.iter().all(is_integer)),
            ParamKind::TextList => value
                .as_array()
                .is_some_and(|items| !items.is_empty() && items.iter().all(JsonValue::is_string)),
            ParamKind::Any => !value.is_null(),
        }
    }
}

fn is_integer(value: &JsonValue) -> bool {
    value.is_i64() || value.is_u64()
}

pub(crate) const VIDEO_PARAMS: &[(&str, ParamKind)] = &[
    ("mimes", ParamKind::TextList),
    ("minduration", ParamKind::Integer),
    ("maxduration", ParamKind::Integer),
    ("startdelay", ParamKind::Integer),
    ("maxseq", ParamKind::Integer),
    ("poddur", ParamKind::Integer),
    ("protocols", ParamKind::IntegerList),
    ("w", ParamKind::Integer),
    ("h", ParamKind::Integer),
    ("podid", ParamKind::Text),
    ("podseq", ParamKind::Integer),
    ("rqddurs", ParamKind::IntegerList),
    ("placement", ParamKind::Integer),
    ("plcmt", ParamKind::Integer),
    ("linearity", ParamKind::Integer),
    ("skip", ParamKind::Flag),
    ("skipmin", ParamKind::Integer),
    ("skipafter", ParamKind::Integer),
    ("sequence", ParamKind::Integer),
    ("slotinpod", ParamKind::Integer),
    ("mincpmpersec", ParamKind::Number),
    ("battr", ParamKind::IntegerList),
    ("maxextended", ParamKind::Integer),
    ("minbitrate", ParamKind::Integer),
    ("maxbitrate", ParamKind::Integer),
    ("boxingallowed", ParamKind::Integer),
    ("playbackmethod", ParamKind::IntegerList),
    ("playbackend", ParamKind::Integer),
    ("delivery", ParamKind::IntegerList),
    ("pos", ParamKind::Integer),
    ("api", ParamKind::IntegerList),
    ("companiontype", ParamKind::IntegerList),
    ("poddedupe", ParamKind::IntegerList),
];

pub(crate) const AUDIO_PARAMS: &[(&str, ParamKind)] = &[
    ("mimes", ParamKind::TextList),
    ("minduration", ParamKind::Integer),
    ("maxduration", ParamKind::Integer),
    ("poddur", ParamKind::Integer),
    ("protocols", ParamKind::IntegerList),
    ("startdelay", ParamKind::Integer),
    ("rqddurs", ParamKind::IntegerList),
    ("podid", ParamKind::Text),
    ("podseq", ParamKind::Integer),
    ("sequence", ParamKind::Integer),
    ("slotinpod", ParamKind::Integer),
    ("mincpmpersec", ParamKind::Number),
    ("battr", ParamKind::IntegerList),
    ("maxextended", ParamKind::Integer),
    ("minbitrate", ParamKind::Integer),
    ("maxbitrate", ParamKind::Integer),
    ("delivery", ParamKind::IntegerList),
    ("api", ParamKind::IntegerList),
    ("companionad", ParamKind::Any),
    ("feed", ParamKind::Integer),
    ("stitched", ParamKind::Flag),
    ("nvol", ParamKind::Integer),
];

/// Copies the allow-listed, well-typed parameters of `source`, in source order.
pub(crate) fn filter_params(source: &JsonObject, allowed: &[(&str, ParamKind)]) -> JsonObject {
    source
        .iter()
        .filter(|(name, value)| {
            allowed
                .iter()
                .any(|(allowed_name, kind)| allowed_name == name && kind.accepts(value))
        })
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}
