use std::fmt;

use serde_json::{Map, Value};

use super::{LazyChildren, Response, ResponseKind};
use crate::chain::{self, Chain, ParseRule, has_non_empty, runs_text};
use crate::error::{ResponseError, Result};
use crate::session::Session;

/// An album, playlist, or radio queue tile.
#[derive(Debug, Clone)]
pub struct Playlist {
    title: String,
    payload: Map<String, Value>,
    children: LazyChildren,
}

/// Where the request body for a playlist tile can be found, in priority order.
fn payload_rules() -> [ParseRule; 2] {
    [
        // "Listen again" tiles start playback from a video.
        ParseRule::keeping(
            chain!["menu", "items", 0, "navigationEndpoint", "watchEndpoint"],
            &["params", "videoId"],
        ),
        ParseRule::keeping(
            chain!["menu", "items", 0, "navigationEndpoint", "watchPlaylistEndpoint"],
            &["params", "playlistId"],
        ),
    ]
}

impl Playlist {
    pub(super) fn probe(raw: &Value) -> bool {
        has_non_empty(raw, "aspectRatio")
    }

    pub(super) fn parse(raw: &Value) -> Result<Self> {
        Ok(Self {
            title: parse_title(raw)?,
            payload: parse_payload(raw)?,
            children: LazyChildren::default(),
        })
    }

    pub(super) fn children_chains() -> Vec<Chain> {
        vec![
            chain!["contents", 0, "content", "content", "contents"],
            chain!["queueDatas"],
        ]
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    /// Provider id of this playlist or of the video it starts from.
    pub fn item_id(&self) -> Option<&str> {
        self.payload
            .get("playlistId")
            .or_else(|| self.payload.get("videoId"))
            .and_then(Value::as_str)
    }

    pub fn children(&self, session: &Session) -> Result<&[Response]> {
        self.children
            .resolve(ResponseKind::Playlist, &self.payload, session)
    }

    pub fn cached_children(&self) -> Option<&[Response]> {
        self.children.get()
    }

    pub(super) fn lazy_children(&self) -> &LazyChildren {
        &self.children
    }
}

fn parse_title(raw: &Value) -> Result<String> {
    let title = chain::extract(raw, &chain!["title", "runs"])
        .map_err(|err| ResponseError::field(ResponseKind::Playlist, "title", err))?;
    let title = runs_text(title).ok_or_else(|| {
        ResponseError::field(ResponseKind::Playlist, "title", "expected text or runs")
    })?;

    let subtitle = chain::extract(raw, &chain!["subtitle", "runs"])
        .ok()
        .and_then(runs_text);

    Ok(match subtitle {
        Some(subtitle) => format!("{} ({})", title.trim(), subtitle.trim()),
        None => title.trim().to_string(),
    })
}

fn parse_payload(raw: &Value) -> Result<Map<String, Value>> {
    payload_rules()
        .iter()
        .find_map(|rule| rule.apply(raw))
        .ok_or_else(|| {
            ResponseError::field(
                ResponseKind::Playlist,
                "payload",
                "no watch or watch-playlist endpoint in menu",
            )
        })
}

impl PartialEq for Playlist {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title && self.payload == other.payload
    }
}

impl fmt::Display for Playlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responses::fixtures::playlist_raw;
    use serde_json::json;

    fn with_menu(endpoint: Value) -> Value {
        json!({
            "aspectRatio": "square",
            "title": {"runs": "Road Trip"},
            "menu": {"items": [{"navigationEndpoint": endpoint}]}
        })
    }

    #[test]
    fn test_title_without_subtitle() {
        let raw = with_menu(json!({"watchPlaylistEndpoint": {"playlistId": "PL1"}}));
        assert_eq!(Playlist::parse(&raw).unwrap().title(), "Road Trip");
    }

    #[test]
    fn test_title_with_subtitle() {
        let mut raw = with_menu(json!({"watchPlaylistEndpoint": {"playlistId": "PL1"}}));
        raw["subtitle"] = json!({"runs": "Playlist · 50 songs"});
        assert_eq!(
            Playlist::parse(&raw).unwrap().title(),
            "Road Trip (Playlist · 50 songs)"
        );
    }

    #[test]
    fn test_title_from_run_list_is_trimmed() {
        let playlist = Playlist::parse(&playlist_raw()).unwrap();
        assert_eq!(playlist.title(), "Road Trip (Playlist · 50 songs)");
    }

    #[test]
    fn test_payload_prefers_watch_endpoint() {
        let raw = with_menu(json!({
            "watchEndpoint": {"videoId": "v1", "params": "p", "playerParams": "x"},
            "watchPlaylistEndpoint": {"playlistId": "PL1"}
        }));
        let playlist = Playlist::parse(&raw).unwrap();
        assert_eq!(playlist.payload().len(), 2);
        assert_eq!(playlist.payload()["videoId"], "v1");
        assert_eq!(playlist.item_id(), Some("v1"));
    }

    #[test]
    fn test_payload_falls_back_to_watch_playlist_endpoint() {
        let playlist = Playlist::parse(&playlist_raw()).unwrap();
        assert_eq!(playlist.payload()["playlistId"], "RDCLAK5uy_road");
        assert_eq!(playlist.payload()["params"], "wAEB");
        assert!(playlist.payload().get("clickTrackingParams").is_none());
    }

    #[test]
    fn test_payload_missing_is_a_parsing_error() {
        let raw = with_menu(json!({"browseEndpoint": {"browseId": "x"}}));
        assert!(matches!(
            Playlist::parse(&raw),
            Err(ResponseError::FieldParsing {
                kind: ResponseKind::Playlist,
                field: "payload",
                ..
            })
        ));
    }

    #[test]
    fn test_probe_requires_aspect_ratio() {
        assert!(Playlist::probe(&playlist_raw()));
        assert!(!Playlist::probe(&json!({"aspectRatio": ""})));
        assert!(!Playlist::probe(&json!({"title": {"runs": []}})));
    }
}
