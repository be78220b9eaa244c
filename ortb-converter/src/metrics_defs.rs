//! Metrics definitions for the converter.
//!
//! Emitted through the `metrics` facade, so they are no-ops until the host
//! process installs a recorder.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Histogram,
}

impl MetricType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MetricType::Counter => "Counter",
            MetricType::Histogram => "Histogram",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MetricDef {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub description: &'static str,
}

#[macro_export]
macro_rules! counter {
    ($def:expr $(, $($labels:tt)*)?) => {
        metrics::counter!($def.name $(, $($labels)*)?)
    };
}

#[macro_export]
macro_rules! histogram {
    ($def:expr $(, $($labels:tt)*)?) => {
        metrics::histogram!($def.name $(, $($labels)*)?)
    };
}

pub const REQUEST_IMPS: MetricDef = MetricDef {
    name: "request.imps",
    metric_type: MetricType::Histogram,
    description: "Number of imps in a built OpenRTB request",
};

pub const REQUEST_IMPS_DROPPED: MetricDef = MetricDef {
    name: "request.imps.dropped",
    metric_type: MetricType::Counter,
    description: "Imps left out of a request because no processor gave them an id",
};

pub const CLIENT_SECTION_CONFLICT: MetricDef = MetricDef {
    name: "client_section.conflict",
    metric_type: MetricType::Counter,
    description: "Client sections removed because a request carried more than one",
};

pub const BID_RESPONSE_MEDIA_TYPE_UNRESOLVED: MetricDef = MetricDef {
    name: "bid_response.media_type.unresolved",
    metric_type: MetricType::Counter,
    description: "Response bids whose media type could not be determined",
};

pub const BID_RESPONSE_NATIVE_INVALID: MetricDef = MetricDef {
    name: "bid_response.native.invalid",
    metric_type: MetricType::Counter,
    description: "Native bids whose markup is not an OpenRTB native response",
};

pub const RESPONSE_BID_UNMATCHED: MetricDef = MetricDef {
    name: "response.bid.unmatched",
    metric_type: MetricType::Counter,
    description: "Response bids whose impid matches no imp of the request",
};

pub const ALL_METRICS: &[MetricDef] = &[
    REQUEST_IMPS,
    REQUEST_IMPS_DROPPED,
    CLIENT_SECTION_CONFLICT,
    BID_RESPONSE_MEDIA_TYPE_UNRESOLVED,
    BID_RESPONSE_NATIVE_INVALID,
    RESPONSE_BID_UNMATCHED,
];

/// Registers the description of every metric with the installed recorder.
pub fn describe_metrics() {
    for def in ALL_METRICS {
        match def.metric_type {
            MetricType::Counter => metrics::describe_counter!(def.name, def.description),
            MetricType::Histogram => metrics::describe_histogram!(def.name, def.description),
        }
        tracing::debug!(metric = def.name, kind = def.metric_type.as_str(), "Described metric");
    }
}
