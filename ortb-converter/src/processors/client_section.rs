//! Guard that keeps at most one of the mutually exclusive `site`, `app` and
//! `dooh` sections on an OpenRTB request.

use crate::config::ClientSection;
use crate::counter;
use crate::json::JsonObject;
use crate::metrics_defs::CLIENT_SECTION_CONFLICT;
use crate::registry::Processor;

/// Request processor removing every client section but the first present one
/// in `precedence` order.
pub fn client_section_guard(precedence: Vec<ClientSection>) -> Processor {
    Processor::request(move |request, _bidder_request, _context| {
        retain_one_client_section(request, &precedence);
    })
}

/// Keeps the highest-precedence client section present on `request` and removes
/// the others. A `null` section counts as absent.
///
/// Returns the kept section, if any.
pub fn retain_one_client_section(
    request: &mut JsonObject,
    precedence: &[ClientSection],
) -> Option<ClientSection> {
    let mut present = precedence
        .iter()
        .copied()
        .filter(|section| request.get(section.as_str()).is_some_and(|value| !value.is_null()));

    let kept = present.next()?;
    let dropped: Vec<ClientSection> = present.collect();

    for section in &dropped {
        request.shift_remove(section.as_str());
        tracing::warn!(
            kept = %kept,
            dropped = %section,
            "Request carries more than one client section, dropping the lower-precedence one"
        );
        counter!(CLIENT_SECTION_CONFLICT, "dropped" => section.as_str()).increment(1);
    }

    Some(kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DEFAULT_PRECEDENCE: [ClientSection; 3] =
        [ClientSection::Dooh, ClientSection::App, ClientSection::Site];

    fn request(value: serde_json::Value) -> JsonObject {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_single_or_no_section_is_untouched() {
        let mut site_only = request(json!({"id": "r", "site": {"page": "p"}}));
        let before = site_only.clone();
        assert_eq!(
            retain_one_client_section(&mut site_only, &DEFAULT_PRECEDENCE),
            Some(ClientSection::Site)
        );
        assert_eq!(site_only, before);

        let mut none = request(json!({"id": "r"}));
        assert_eq!(retain_one_client_section(&mut none, &DEFAULT_PRECEDENCE), None);
        assert_eq!(none, request(json!({"id": "r"})));
    }

    #[test]
    fn test_site_and_app_keeps_app() {
        let mut both = request(json!({"site": {"page": "p"}, "app": {"bundle": "b"}}));

        let kept = retain_one_client_section(&mut both, &DEFAULT_PRECEDENCE);

        assert_eq!(kept, Some(ClientSection::App));
        assert_eq!(both, request(json!({"app": {"bundle": "b"}})));
    }

    #[test]
    fn test_all_three_keeps_dooh() {
        let mut all = request(json!({"site": {}, "app": {}, "dooh": {"id": "screen"}}));
        retain_one_client_section(&mut all, &DEFAULT_PRECEDENCE);
        assert_eq!(all, request(json!({"dooh": {"id": "screen"}})));
    }

    #[test]
    fn test_custom_precedence() {
        let mut both = request(json!({"site": {"page": "p"}, "app": {"bundle": "b"}}));
        retain_one_client_section(
            &mut both,
            &[ClientSection::Site, ClientSection::App, ClientSection::Dooh],
        );
        assert_eq!(both, request(json!({"site": {"page": "p"}})));
    }

    #[test]
    fn test_null_section_is_absent() {
        let mut request = request(json!({"site": {"page": "p"}, "app": null}));
        assert_eq!(
            retain_one_client_section(&mut request, &DEFAULT_PRECEDENCE),
            Some(ClientSection::Site)
        );
        assert!(request.contains_key("site"));
    }
}
