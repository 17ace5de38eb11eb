use std::fmt;

use serde_json::{Map, Value};

use super::{LazyChildren, Response, ResponseKind};
use crate::chain::{Chain, has_non_empty};
use crate::error::{ResponseError, Result};
use crate::session::Session;

/// A top-level browsing shelf, such as "New releases" or "Library".
#[derive(Debug, Clone)]
pub struct Endpoint {
    title: Option<String>,
    payload: Map<String, Value>,
    children: LazyChildren,
}

impl Endpoint {
    pub(super) fn probe(raw: &Value) -> bool {
        has_non_empty(raw, "payload")
    }

    pub(super) fn parse(raw: &Value) -> Result<Self> {
        let title = match raw.get("title") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => {
                return Err(ResponseError::field(
                    ResponseKind::Endpoint,
                    "title",
                    format!("expected text, got {}", other),
                ));
            }
        };
        let payload = raw
            .get("payload")
            .and_then(Value::as_object)
            .cloned()
            .ok_or_else(|| {
                ResponseError::field(ResponseKind::Endpoint, "payload", "expected a mapping")
            })?;

        Ok(Self {
            title,
            payload,
            children: LazyChildren::default(),
        })
    }

    pub(super) fn children_chains() -> Vec<Chain> {
        vec![chain!["contents", "content", "contents", "items"]]
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    pub fn children(&self, session: &Session) -> Result<&[Response]> {
        self.children
            .resolve(ResponseKind::Endpoint, &self.payload, session)
    }

    pub fn cached_children(&self) -> Option<&[Response]> {
        self.children.get()
    }

    pub(super) fn lazy_children(&self) -> &LazyChildren {
        &self.children
    }
}

impl PartialEq for Endpoint {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title && self.payload == other.payload
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title.as_deref().unwrap_or("(untitled)"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_probe_requires_non_empty_payload() {
        assert!(Endpoint::probe(&json!({"payload": {"browse_id": "x"}})));
        assert!(!Endpoint::probe(&json!({"payload": {}})));
        assert!(!Endpoint::probe(&json!({"title": "No payload"})));
    }

    #[test]
    fn test_parse_keeps_title_and_payload_verbatim() {
        let endpoint = Endpoint::parse(&json!({
            "title": "Mixed for you",
            "payload": {"browse_id": "FEmusic_mixed_for_you"}
        }))
        .unwrap();
        assert_eq!(endpoint.title(), Some("Mixed for you"));
        assert_eq!(endpoint.payload()["browse_id"], "FEmusic_mixed_for_you");
        assert_eq!(endpoint.to_string(), "Mixed for you");
    }

    #[test]
    fn test_parse_allows_missing_title() {
        let endpoint = Endpoint::parse(&json!({"payload": {"browseId": "x"}})).unwrap();
        assert_eq!(endpoint.title(), None);
    }

    #[test]
    fn test_parse_rejects_non_mapping_payload() {
        let err = Endpoint::parse(&json!({"payload": "browse"})).unwrap_err();
        assert!(matches!(
            err,
            ResponseError::FieldParsing {
                field: "payload",
                ..
            }
        ));
    }
}
