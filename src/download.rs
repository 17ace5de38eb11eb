//! Hands resolved playlists to `yt-dlp`.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};

use crate::responses::{Response, Track};
use crate::session::Session;

pub const DEFAULT_FORMAT: &str = "251";
pub const DEFAULT_FILE_TEMPLATE: &str = "%(uploader)s - %(title)s.%(ext)s";

#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Root directory; each playlist gets its own subdirectory.
    pub target_dir: PathBuf,
    /// `yt-dlp` format selector.
    pub format: String,
    pub file_template: String,
    /// Executable to run, `yt-dlp` unless overridden.
    pub program: String,
}

impl DownloadOptions {
    pub fn new(target_dir: PathBuf) -> Self {
        Self {
            target_dir,
            format: DEFAULT_FORMAT.to_string(),
            file_template: DEFAULT_FILE_TEMPLATE.to_string(),
            program: "yt-dlp".to_string(),
        }
    }
}

/// Outcome of one playlist download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReport {
    pub directory: PathBuf,
    pub tracks: usize,
}

/// Resolves `playlist`'s tracks and downloads them into a directory named after it.
pub fn download_playlist(
    playlist: &Response,
    session: &Session,
    options: &DownloadOptions,
) -> Result<DownloadReport> {
    let Some(meta) = playlist.as_playlist() else {
        bail!("only playlists can be downloaded, got a {}", playlist.kind());
    };

    let tracks: Vec<&Track> = playlist
        .children(session)
        .with_context(|| format!("failed to list tracks of '{}'", meta.title()))?
        .iter()
        .filter_map(Response::as_track)
        .collect();
    if tracks.is_empty() {
        bail!("playlist '{}' has no tracks", meta.title());
    }

    let directory = options.target_dir.join(sanitize_dir_name(meta.title()));
    fs::create_dir_all(&directory)
        .with_context(|| format!("failed to create {}", directory.display()))?;

    let args = yt_dlp_args(options, &directory, &tracks);
    tracing::info!(
        playlist = meta.title(),
        tracks = tracks.len(),
        dir = %directory.display(),
        "starting download"
    );
    let output = Command::new(&options.program)
        .args(&args)
        .output()
        .with_context(|| format!("failed to run {}", options.program))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        tracing::error!(status = %output.status, %stderr, "download failed");
        bail!("{} exited with {}", options.program, output.status);
    }

    Ok(DownloadReport {
        directory,
        tracks: tracks.len(),
    })
}

/// Command line for extracting mp3 audio with embedded metadata and cover.
pub fn yt_dlp_args(options: &DownloadOptions, directory: &Path, tracks: &[&Track]) -> Vec<String> {
    let output = directory
        .join(&options.file_template)
        .to_string_lossy()
        .into_owned();
    let mut args: Vec<String> = [
        "--format",
        options.format.as_str(),
        "--output",
        output.as_str(),
        "--extract-audio",
        "--audio-format",
        "mp3",
        "--audio-quality",
        "0",
        "--embed-metadata",
        "--embed-thumbnail",
        "--convert-thumbnails",
        "jpg",
        "--retries",
        "35",
        "--windows-filenames",
        "--no-progress",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    args.extend(tracks.iter().map(|t| t.watch_url()));
    args
}

/// Makes a playlist title safe to use as a directory name.
pub fn sanitize_dir_name(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim().trim_end_matches('.').trim_end();
    if cleaned.is_empty() {
        "playlist".to_string()
    } else {
        cleaned.to_string()
    }
}
