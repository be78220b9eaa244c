//! `request` and `response` subcommands.
//!
//! Both read a JSON document describing one auction for one bidder:
//!
//! ```json
//! {
//!   "bidderRequest": {"timeout": 500, "ortb2": {"site": {"page": "https://example.com"}}},
//!   "bidRequests": [{"bidId": "b1", "mediaTypes": {"banner": {"sizes": [[300, 250]]}}}],
//!   "response": {"cur": "USD", "seatbid": [{"bid": [{"impid": "b1", "price": 1.2, "adm": "<div/>", "mtype": 1}]}]},
//!   "mediaType": "banner"
//! }
//! ```
//!
//! `response` and `mediaType` are only read by the `response` subcommand.

use ortb_converter::{
    BidRequest, BidResponse, BidderRequest, ConverterError, JsonObject, MediaType, OrtbConverter,
    OrtbResponse,
};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("could not read input: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid input document: {0}")]
    InvalidInput(#[from] serde_json::Error),
    #[error(transparent)]
    Converter(#[from] ConverterError),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestInput {
    #[serde(default)]
    pub bidder_request: BidderRequest,
    pub bid_requests: Vec<BidRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseInput {
    #[serde(flatten)]
    pub request: RequestInput,
    pub response: OrtbResponse,
    /// Pins the media type of every returned bid.
    #[serde(default)]
    pub media_type: Option<MediaType>,
}

fn read_input<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, CliError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Builds the OpenRTB request described by the input file.
pub fn build_request(converter: &OrtbConverter, input: &Path) -> Result<JsonObject, CliError> {
    let input: RequestInput = read_input(input)?;
    let request = converter.build_request(
        &input.bid_requests,
        &input.bidder_request,
        &converter.context(),
    )?;

    tracing::debug!(
        imps = input.bid_requests.len(),
        "Built OpenRTB request"
    );
    Ok(request.into_body())
}

/// Builds the OpenRTB request, then converts the response bids that answer it.
pub fn interpret_response(converter: &OrtbConverter, input: &Path) -> Result<Vec<BidResponse>, CliError> {
    let input: ResponseInput = read_input(input)?;
    let request_context = converter.context();
    let ortb_request = converter.build_request(
        &input.request.bid_requests,
        &input.request.bidder_request,
        &request_context,
    )?;

    let mut response_context = converter.context();
    response_context.media_type = input.media_type;
    let bids = converter.interpret_response(
        &ortb_request,
        &input.request.bid_requests,
        &input.response,
        &response_context,
    );

    let incomplete = bids.iter().filter(|bid| !bid.has_markup()).count();
    if incomplete > 0 {
        tracing::warn!(incomplete, total = bids.len(), "Some bids carry no markup");
    }
    Ok(bids)
}
