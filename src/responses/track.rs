use std::fmt;

use serde_json::Value;

use super::ResponseKind;
use crate::chain::{self, Chain, has_non_empty, runs_text};
use crate::error::{ResponseError, Result};

const ARTIST_PAGE_TYPE: &str = "MUSIC_PAGE_TYPE_ARTIST";

/// A single playable video.
///
/// Identity is the provider-assigned `video_id`, so two tracks with different
/// display fields but the same id compare equal.
#[derive(Debug, Clone)]
pub struct Track {
    artist: String,
    title: String,
    duration: String,
    video_id: String,
}

impl Track {
    pub(super) fn probe(raw: &Value) -> bool {
        has_non_empty(raw, "videoId")
    }

    pub(super) fn parse(raw: &Value) -> Result<Self> {
        Ok(Self {
            artist: parse_artist(raw)?,
            title: parse_text_field(raw, "title", chain!["title", "runs"])?,
            duration: parse_text_field(raw, "lengthText", chain!["lengthText", "runs"])?,
            video_id: raw
                .get("videoId")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        })
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn duration(&self) -> &str {
        &self.duration
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }
}

fn parse_text_field(raw: &Value, field: &'static str, chain: Chain) -> Result<String> {
    let value = chain::extract(raw, &chain)
        .map_err(|err| ResponseError::field(ResponseKind::Track, field, err))?;
    runs_text(value)
        .map(|text| text.trim().to_string())
        .ok_or_else(|| ResponseError::field(ResponseKind::Track, field, "expected text"))
}

fn parse_artist(raw: &Value) -> Result<String> {
    let runs = chain::extract(raw, &chain!["longBylineText", "runs"])
        .ok()
        .and_then(Value::as_array)
        .filter(|runs| !runs.is_empty())
        .ok_or_else(|| {
            ResponseError::field(ResponseKind::Track, "longBylineText", "expected a run list")
        })?;

    let artists: Vec<&str> = runs
        .iter()
        .filter(|run| is_artist_run(run))
        .filter_map(|run| run.get("text").and_then(Value::as_str))
        .collect();

    if !artists.is_empty() {
        return Ok(artists.join(", "));
    }
    runs[0]
        .get("text")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ResponseError::field(ResponseKind::Track, "longBylineText", "run without text"))
}

fn is_artist_run(run: &Value) -> bool {
    let chains = [
        chain![
            "navigationEndpoint",
            "browseEndpoint",
            "browseEndpointContextSupportedConfigs",
            "browseEndpointContextMusicConfig",
            "pageType"
        ],
        chain![
            "navigationEndpoint",
            "browseEndpoint",
            "browseEndpointContextSupportedConfigs",
            "pageType"
        ],
    ];
    chain::extract_first(run, &chains)
        .map(|page_type| page_type == ARTIST_PAGE_TYPE)
        .unwrap_or(false)
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.video_id == other.video_id
    }
}

impl Eq for Track {}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} ({})", self.artist, self.title, self.duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responses::fixtures::track_raw;
    use serde_json::json;

    fn artist_run(text: &str) -> Value {
        json!({"text": text, "navigationEndpoint": {"browseEndpoint": {
            "browseEndpointContextSupportedConfigs": {"pageType": ARTIST_PAGE_TYPE}
        }}})
    }

    fn with_byline(runs: Value) -> Value {
        json!({
            "videoId": "abc",
            "title": {"runs": "Song"},
            "lengthText": {"runs": "2:00"},
            "longBylineText": {"runs": runs}
        })
    }

    #[test]
    fn test_parse_track_fields() {
        let track = Track::parse(&track_raw("vid1", " Song ")).unwrap();
        assert_eq!(track.video_id(), "vid1");
        assert_eq!(track.title(), "Song");
        assert_eq!(track.duration(), "3:45");
        assert_eq!(track.artist(), "Artist One");
        assert_eq!(track.to_string(), "Artist One - Song (3:45)");
        assert_eq!(track.watch_url(), "https://www.youtube.com/watch?v=vid1");
    }

    #[test]
    fn test_artist_falls_back_to_first_run() {
        let track = Track::parse(&with_byline(json!([
            {"text": "Some Channel"},
            {"text": " • "},
            {"text": "1.2M views"}
        ])))
        .unwrap();
        assert_eq!(track.artist(), "Some Channel");
    }

    #[test]
    fn test_artist_joins_marked_runs() {
        let track = Track::parse(&with_byline(json!([
            artist_run("A"),
            {"text": " & "},
            artist_run("B"),
            {"text": " • Album"}
        ])))
        .unwrap();
        assert_eq!(track.artist(), "A, B");
    }

    #[test]
    fn test_non_text_title_is_a_parsing_error() {
        let mut raw = track_raw("v", "x");
        raw["title"]["runs"] = json!({"text": "nested"});
        assert!(matches!(
            Track::parse(&raw),
            Err(ResponseError::FieldParsing { field: "title", .. })
        ));
    }

    #[test]
    fn test_missing_byline_is_a_parsing_error() {
        let mut raw = track_raw("v", "x");
        raw.as_object_mut().unwrap().remove("longBylineText");
        assert!(Track::parse(&raw).is_err());
    }

    #[test]
    fn test_equality_uses_video_id_only() {
        let a = Track::parse(&track_raw("same", "One")).unwrap();
        let b = Track::parse(&track_raw("same", "Two")).unwrap();
        let c = Track::parse(&track_raw("other", "One")).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
