//! The shelves shown at the root of the browser.

use serde_json::{Value, json};

use crate::classifier::Classifier;
use crate::error::Result;
use crate::responses::Response;

/// Raw endpoint descriptions, in display order.
pub fn raw_endpoints() -> Vec<Value> {
    vec![
        json!({"title": "New releases albums", "payload": {"browse_id": "FEmusic_new_releases_albums"}}),
        json!({"title": "Mixed for you", "payload": {"browse_id": "FEmusic_mixed_for_you"}}),
        json!({"title": "Listen again", "payload": {"browse_id": "FEmusic_listen_again"}}),
        json!({"title": "Library", "payload": {"browse_id": "FEmusic_library_landing"}}),
    ]
}

/// Classifies the start shelves into root nodes.
pub fn endpoints(classifier: &Classifier) -> Result<Vec<Response>> {
    raw_endpoints()
        .iter()
        .map(|raw| classifier.classify(raw))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responses::ResponseKind;

    #[test]
    fn test_start_endpoints_are_endpoints() {
        let roots = endpoints(&Classifier::default()).unwrap();
        let titles: Vec<_> = roots.iter().filter_map(|r| r.title()).collect();
        assert_eq!(
            titles,
            vec!["New releases albums", "Mixed for you", "Listen again", "Library"]
        );
        assert!(roots.iter().all(|r| r.kind() == ResponseKind::Endpoint));
    }
}
