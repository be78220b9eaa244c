use crate::context::ConversionContext;
use crate::counter;
use crate::metrics_defs::BID_RESPONSE_MEDIA_TYPE_UNRESOLVED;
use crate::protocol::{BidResponse, MediaType, OrtbBid};

/// Resolves the bid's media type: the context wins, then `bid.mtype`.
///
/// When neither is usable `mediaType` stays unset. The media-type resolvers then
/// all no-op and the bid ends up without markup.
pub fn fill_media_type(bid_response: &mut BidResponse, bid: &OrtbBid, context: &ConversionContext<'_>) {
    if bid_response.media_type.is_some() {
        return;
    }

    let resolved = context
        .media_type
        .or_else(|| bid.mtype.and_then(MediaType::from_mtype));
    match resolved {
        Some(media_type) => bid_response.media_type = Some(media_type),
        None => {
            tracing::warn!(
                impid = bid.impid.as_deref().unwrap_or_default(),
                mtype = ?bid.mtype,
                "Could not determine media type of bid"
            );
            counter!(BID_RESPONSE_MEDIA_TYPE_UNRESOLVED).increment(1);
        }
    }
}
