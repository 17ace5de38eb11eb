//! Classification of raw payloads into typed [`Response`] nodes.

use std::cell::Cell;

use serde_json::Value;

use crate::error::{ResponseError, Result};
use crate::registry::{Registry, default_registry};
use crate::responses::{Response, ResponseKind};

/// Upper bound on nested envelopes unwrapped while looking for a known kind.
const MAX_ENVELOPE_DEPTH: usize = 4;

/// Turns raw JSON values into typed nodes using a [`Registry`].
///
/// The classifier remembers the last kind that matched and tries it first on
/// the next call: items of one batch are usually the same kind (a list of
/// tracks, a shelf of playlists). This only changes how many probes run, never
/// which kind is chosen, since at most one probe accepts a well-formed value.
///
/// Interior state uses `Cell`, so a classifier is not `Sync`.
#[derive(Debug)]
pub struct Classifier {
    registry: Registry,
    last_kind: Cell<Option<ResponseKind>>,
    probes: Cell<usize>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(default_registry())
    }
}

impl Classifier {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            last_kind: Cell::new(None),
            probes: Cell::new(0),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn last_kind(&self) -> Option<ResponseKind> {
        self.last_kind.get()
    }

    /// Total number of probes run so far.
    pub fn probe_count(&self) -> usize {
        self.probes.get()
    }

    /// Classifies `raw` as exactly one registered kind.
    ///
    /// When no kind accepts the value itself and it is a single-key mapping
    /// around another mapping (a `...Renderer` envelope), the inner mapping is
    /// classified instead.
    pub fn classify(&self, raw: &Value) -> Result<Response> {
        let mut current = raw;
        for _ in 0..=MAX_ENVELOPE_DEPTH {
            if let Some(kind) = self.match_kind(current) {
                let node = kind.parse(current)?;
                self.last_kind.set(Some(kind));
                return Ok(node);
            }
            match single_envelope(current) {
                Some(inner) => current = inner,
                None => break,
            }
        }

        tracing::debug!(keys = %object_keys(raw), "no response kind matched");
        Err(ResponseError::NoMatchingKind {
            keys: object_keys(raw),
        })
    }

    /// Kinds in trial order: the last successful kind first, then the rest in
    /// registration order rotated behind it.
    pub fn trial_order(&self) -> Vec<ResponseKind> {
        let mut kinds = self.registry.all_kinds();
        if let Some(last) = self.last_kind.get()
            && let Some(pos) = kinds.iter().position(|k| *k == last)
        {
            kinds.rotate_left(pos);
        }
        kinds
    }

    fn match_kind(&self, raw: &Value) -> Option<ResponseKind> {
        self.trial_order().into_iter().find(|kind| {
            self.probes.set(self.probes.get() + 1);
            kind.probe(raw)
        })
    }
}

fn single_envelope(raw: &Value) -> Option<&Value> {
    let obj = raw.as_object()?;
    if obj.len() != 1 {
        return None;
    }
    obj.values().next().filter(|inner| inner.is_object())
}

fn object_keys(raw: &Value) -> String {
    match raw.as_object() {
        Some(obj) => obj.keys().cloned().collect::<Vec<_>>().join(", "),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::KindDescriptor;
    use crate::responses::fixtures::{endpoint_raw, playlist_raw, track_raw};
    use serde_json::json;

    fn permutations(kinds: &[ResponseKind]) -> Vec<Vec<ResponseKind>> {
        if kinds.len() <= 1 {
            return vec![kinds.to_vec()];
        }
        let mut out = Vec::new();
        for (i, first) in kinds.iter().enumerate() {
            let mut rest = kinds.to_vec();
            rest.remove(i);
            for mut tail in permutations(&rest) {
                tail.insert(0, *first);
                out.push(tail);
            }
        }
        out
    }

    fn labelled_fixtures() -> Vec<(ResponseKind, Value)> {
        vec![
            (ResponseKind::Endpoint, endpoint_raw()),
            (ResponseKind::Playlist, playlist_raw()),
            (ResponseKind::Track, track_raw("vid", "Song")),
            (
                ResponseKind::Track,
                json!({"playlistPanelVideoRenderer": track_raw("wrapped", "Song")}),
            ),
        ]
    }

    #[test]
    fn test_classification_is_order_independent() {
        for order in permutations(&ResponseKind::ALL) {
            let mut registry = Registry::empty();
            for kind in &order {
                registry.register(KindDescriptor::new(*kind));
            }
            let classifier = Classifier::new(registry);
            // Classify twice so every fixture also runs behind a rotated order
            for _ in 0..2 {
                for (expected, raw) in labelled_fixtures() {
                    let node = classifier.classify(&raw).unwrap();
                    assert_eq!(node.kind(), expected, "order {:?}", order);
                }
            }
        }
    }

    #[test]
    fn test_last_kind_is_tried_first() {
        let classifier = Classifier::default();
        assert_eq!(classifier.trial_order(), ResponseKind::ALL.to_vec());

        classifier.classify(&track_raw("a", "A")).unwrap();
        assert_eq!(classifier.last_kind(), Some(ResponseKind::Track));
        assert_eq!(
            classifier.trial_order(),
            vec![
                ResponseKind::Track,
                ResponseKind::Endpoint,
                ResponseKind::Playlist
            ]
        );

        // A second track needs a single probe
        let before = classifier.probe_count();
        classifier.classify(&track_raw("b", "B")).unwrap();
        assert_eq!(classifier.probe_count() - before, 1);
    }

    #[test]
    fn test_no_matching_kind() {
        let classifier = Classifier::default();
        let err = classifier
            .classify(&json!({"musicCarouselShelfRenderer": {"header": {}}}))
            .unwrap_err();
        assert_eq!(
            err,
            ResponseError::NoMatchingKind {
                keys: "musicCarouselShelfRenderer".to_string()
            }
        );
        assert!(classifier.classify(&json!([1, 2])).is_err());
        assert_eq!(classifier.last_kind(), None);
    }

    #[test]
    fn test_parse_failure_after_probe_is_surfaced() {
        let classifier = Classifier::default();
        let mut raw = track_raw("v", "t");
        raw["lengthText"] = json!({"runs": {"bad": true}});
        assert!(matches!(
            classifier.classify(&raw),
            Err(ResponseError::FieldParsing {
                kind: ResponseKind::Track,
                ..
            })
        ));
        assert_eq!(classifier.last_kind(), None);
    }

    #[test]
    fn test_unregistered_kind_is_never_produced() {
        let mut registry = Registry::empty();
        registry.register(KindDescriptor::new(ResponseKind::Endpoint));
        let classifier = Classifier::new(registry);
        assert!(classifier.classify(&track_raw("v", "t")).is_err());
        assert!(classifier.classify(&endpoint_raw()).is_ok());
    }
}
