//! Typed response nodes reconstructed from raw API payloads.
//!
//! Each kind is a pure [`ResponseKind::probe`] plus a parse step run only
//! after the probe accepts. Non-leaf nodes resolve their children lazily
//! through a [`Session`] and cache the outcome.

mod endpoint;
mod playlist;
mod track;

pub use endpoint::Endpoint;
pub use playlist::Playlist;
pub use track::Track;

use std::cell::OnceCell;
use std::fmt;

use serde_json::{Map, Value};

use crate::chain::{self, Chain};
use crate::error::{ResponseError, Result};
use crate::session::Session;

/// Tag of a response variant, used by the registry and classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResponseKind {
    Endpoint,
    Playlist,
    Track,
}

impl ResponseKind {
    pub const ALL: [ResponseKind; 3] = [
        ResponseKind::Endpoint,
        ResponseKind::Playlist,
        ResponseKind::Track,
    ];

    /// Structural check run before any parsing. Side-effect free.
    pub fn probe(self, raw: &Value) -> bool {
        match self {
            ResponseKind::Endpoint => Endpoint::probe(raw),
            ResponseKind::Playlist => Playlist::probe(raw),
            ResponseKind::Track => Track::probe(raw),
        }
    }

    /// Builds a node of this kind. Only meaningful after `probe` accepted `raw`.
    pub fn parse(self, raw: &Value) -> Result<Response> {
        Ok(match self {
            ResponseKind::Endpoint => Response::Endpoint(Endpoint::parse(raw)?),
            ResponseKind::Playlist => Response::Playlist(Playlist::parse(raw)?),
            ResponseKind::Track => Response::Track(Track::parse(raw)?),
        })
    }

    /// Chains tried, in order, to locate the child list in a fetched response.
    pub fn default_children_chains(self) -> Vec<Chain> {
        match self {
            ResponseKind::Endpoint => Endpoint::children_chains(),
            ResponseKind::Playlist => Playlist::children_chains(),
            ResponseKind::Track => Vec::new(),
        }
    }

    pub fn is_leaf(self) -> bool {
        self == ResponseKind::Track
    }
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResponseKind::Endpoint => "endpoint",
            ResponseKind::Playlist => "playlist",
            ResponseKind::Track => "track",
        })
    }
}

/// A node of the browsing tree.
#[derive(Debug, Clone)]
pub enum Response {
    Endpoint(Endpoint),
    Playlist(Playlist),
    Track(Track),
}

impl Response {
    pub fn kind(&self) -> ResponseKind {
        match self {
            Response::Endpoint(_) => ResponseKind::Endpoint,
            Response::Playlist(_) => ResponseKind::Playlist,
            Response::Track(_) => ResponseKind::Track,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            Response::Endpoint(e) => e.title(),
            Response::Playlist(p) => Some(p.title()),
            Response::Track(t) => Some(t.title()),
        }
    }

    /// Request body used to fetch children. `None` for tracks.
    pub fn payload(&self) -> Option<&Map<String, Value>> {
        match self {
            Response::Endpoint(e) => Some(e.payload()),
            Response::Playlist(p) => Some(p.payload()),
            Response::Track(_) => None,
        }
    }

    /// Returns the children, fetching and classifying them on first call.
    ///
    /// The outcome, success or failure, is cached on this node.
    pub fn children(&self, session: &Session) -> Result<&[Response]> {
        match self {
            Response::Endpoint(e) => e.children(session),
            Response::Playlist(p) => p.children(session),
            Response::Track(_) => Err(ResponseError::Leaf),
        }
    }

    /// Children already resolved by an earlier [`Response::children`] call.
    pub fn cached_children(&self) -> Option<&[Response]> {
        match self {
            Response::Endpoint(e) => e.cached_children(),
            Response::Playlist(p) => p.cached_children(),
            Response::Track(_) => None,
        }
    }

    /// Cached failure of an earlier children read, if any.
    pub fn children_error(&self) -> Option<&ResponseError> {
        match self {
            Response::Endpoint(e) => e.lazy_children().error(),
            Response::Playlist(p) => p.lazy_children().error(),
            Response::Track(_) => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.kind().is_leaf()
    }

    pub fn as_playlist(&self) -> Option<&Playlist> {
        match self {
            Response::Playlist(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_track(&self) -> Option<&Track> {
        match self {
            Response::Track(t) => Some(t),
            _ => None,
        }
    }
}

impl PartialEq for Response {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Response::Endpoint(a), Response::Endpoint(b)) => a == b,
            (Response::Playlist(a), Response::Playlist(b)) => a == b,
            (Response::Track(a), Response::Track(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Endpoint(e) => write!(f, "{}", e),
            Response::Playlist(p) => write!(f, "{}", p),
            Response::Track(t) => write!(f, "{}", t),
        }
    }
}

/// Write-once cache of a non-leaf node's children.
#[derive(Debug, Clone, Default)]
pub(crate) struct LazyChildren(OnceCell<Result<Vec<Response>>>);

impl LazyChildren {
    pub(crate) fn resolve(
        &self,
        kind: ResponseKind,
        payload: &Map<String, Value>,
        session: &Session,
    ) -> Result<&[Response]> {
        match self.0.get_or_init(|| fetch_children(kind, payload, session)) {
            Ok(children) => Ok(children),
            Err(err) => Err(err.clone()),
        }
    }

    pub(crate) fn get(&self) -> Option<&[Response]> {
        match self.0.get() {
            Some(Ok(children)) => Some(children),
            _ => None,
        }
    }

    pub(crate) fn error(&self) -> Option<&ResponseError> {
        match self.0.get() {
            Some(Err(err)) => Some(err),
            _ => None,
        }
    }
}

fn fetch_children(
    kind: ResponseKind,
    payload: &Map<String, Value>,
    session: &Session,
) -> Result<Vec<Response>> {
    tracing::debug!(%kind, ?payload, "resolving children");
    let raw = session
        .transport()
        .send_request(payload)
        .map_err(|err| ResponseError::Transport {
            kind,
            message: err.to_string(),
        })?;

    let chains = session.classifier().registry().children_chains(kind);
    let items = chains
        .iter()
        .find_map(|c| chain::extract(&raw, c).ok().and_then(Value::as_array))
        .ok_or(ResponseError::Children { kind })?;

    let children = items
        .iter()
        .map(|item| session.classifier().classify(item))
        .collect::<Result<Vec<_>>>()?;
    tracing::debug!(%kind, count = children.len(), "children resolved");
    Ok(children)
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Raw payloads shaped like the upstream API, shared by tests.

    use serde_json::{Value, json};

    pub fn endpoint_raw() -> Value {
        json!({"payload": {"browse_id": "FEmusic_library_landing"}, "title": "Library"})
    }

    pub fn playlist_raw() -> Value {
        json!({
            "aspectRatio": "MUSIC_TWO_ROW_ITEM_THUMBNAIL_ASPECT_RATIO_SQUARE",
            "title": {"runs": [{"text": " Road Trip "}]},
            "subtitle": {"runs": [{"text": "Playlist"}, {"text": " · "}, {"text": "50 songs"}]},
            "menu": {"items": [{"navigationEndpoint": {
                "watchPlaylistEndpoint": {
                    "playlistId": "RDCLAK5uy_road",
                    "params": "wAEB",
                    "clickTrackingParams": "CAAQ"
                }
            }}]}
        })
    }

    pub fn track_raw(video_id: &str, title: &str) -> Value {
        json!({
            "videoId": video_id,
            "title": {"runs": [{"text": title}]},
            "lengthText": {"runs": [{"text": "3:45 "}]},
            "longBylineText": {"runs": [
                {"text": "Artist One", "navigationEndpoint": {"browseEndpoint": {
                    "browseId": "UC1",
                    "browseEndpointContextSupportedConfigs": {
                        "browseEndpointContextMusicConfig": {"pageType": "MUSIC_PAGE_TYPE_ARTIST"}
                    }
                }}},
                {"text": " • "},
                {"text": "Album", "navigationEndpoint": {"browseEndpoint": {
                    "browseId": "MPRE1",
                    "browseEndpointContextSupportedConfigs": {
                        "browseEndpointContextMusicConfig": {"pageType": "MUSIC_PAGE_TYPE_ALBUM"}
                    }
                }}}
            ]}
        })
    }
}
