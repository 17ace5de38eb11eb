//! Session credentials captured from the browser's "Copy as cURL".
//!
//! A capture of any authenticated `youtubei/v1` request carries everything
//! needed to replay it: the API key in the query string, cookies and auth
//! headers, and the `context` object in the JSON body.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum CredentialsError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid cURL capture: {0}")]
    Parse(String),

    #[error("invalid credentials JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no account `{wanted}` (available: {available})")]
    AccountNotFound { wanted: String, available: String },
}

/// Everything replayed on each request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub headers: BTreeMap<String, String>,
    pub params: BTreeMap<String, String>,
    pub json_data: Map<String, Value>,
}

impl Credentials {
    /// Writes these credentials as JSON, loadable again with [`read_credentials_from_file`].
    pub fn save(&self, path: &Path) -> Result<(), CredentialsError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|source| CredentialsError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Reads credentials from a saved `.json` file or a raw cURL capture.
pub fn read_credentials_from_file(path: &Path) -> Result<Credentials, CredentialsError> {
    let content = fs::read_to_string(path).map_err(|source| CredentialsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if path.extension().is_some_and(|ext| ext == "json") {
        Ok(serde_json::from_str(&content)?)
    } else {
        parse_curl_request(&content)
    }
}

/// Parses every readable credentials file directly inside `dir`.
///
/// Files that do not parse are skipped. A missing directory yields an empty map.
pub fn search_credentials_in_dir(dir: &Path) -> BTreeMap<String, Credentials> {
    let mut found = BTreeMap::new();
    if !dir.is_dir() {
        return found;
    }
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let name = entry.file_name().to_string_lossy().into_owned();
        match read_credentials_from_file(entry.path()) {
            Ok(credentials) => {
                found.insert(name, credentials);
            }
            Err(err) => tracing::debug!(file = %name, error = %err, "skipping credentials file"),
        }
    }
    found
}

/// Parses a "Copy as cURL" capture, in either bash or Windows cmd flavour.
pub fn parse_curl_request(raw: &str) -> Result<Credentials, CredentialsError> {
    let normalized = if raw.contains("^\"") || raw.contains("^\n") || raw.contains("^\r\n") {
        fix_cmd_escapes(raw)
    } else {
        raw.to_string()
    };
    let words = split_words(&normalized)?;

    let mut url = None;
    let mut headers = BTreeMap::new();
    let mut body = None;
    let mut words = words.into_iter();
    while let Some(word) = words.next() {
        match word.as_str() {
            "curl" if url.is_none() && headers.is_empty() => {}
            "-H" | "--header" => {
                let header = words
                    .next()
                    .ok_or_else(|| CredentialsError::Parse("-H without a value".to_string()))?;
                let (key, value) = header
                    .split_once(':')
                    .ok_or_else(|| CredentialsError::Parse(format!("malformed header `{}`", header)))?;
                headers.insert(key.trim().to_lowercase(), value.trim().to_string());
            }
            "-b" | "--cookie" => {
                if let Some(cookie) = words.next() {
                    headers.insert("cookie".to_string(), cookie);
                }
            }
            "--data-raw" | "--data" | "--data-binary" | "-d" => body = words.next(),
            "-X" | "--request" => {
                words.next();
            }
            flag if flag.starts_with('-') => {}
            _ if url.is_none() => url = Some(word),
            _ => {}
        }
    }

    let url = url.ok_or_else(|| CredentialsError::Parse("no request URL".to_string()))?;
    let params = reqwest::Url::parse(&url)
        .map_err(|err| CredentialsError::Parse(format!("bad URL `{}`: {}", url, err)))?
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let body = body.ok_or_else(|| CredentialsError::Parse("no --data-raw body".to_string()))?;
    let mut json_data = match serde_json::from_str::<Value>(&body)? {
        Value::Object(map) => map,
        _ => return Err(CredentialsError::Parse("body is not a JSON object".to_string())),
    };
    // The captured request's own target would override every replayed payload
    json_data.remove("browseId");

    if headers.is_empty() {
        return Err(CredentialsError::Parse("no headers".to_string()));
    }

    Ok(Credentials {
        headers,
        params,
        json_data,
    })
}

/// Undoes cmd.exe escaping: `^"` becomes `"`, `^` line continuations are joined.
fn fix_cmd_escapes(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '^' {
            match chars.next() {
                Some('\r') => {
                    chars.next_if_eq(&'\n');
                }
                Some('\n') => {}
                Some(escaped) => out.push(escaped),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Splits a shell command line into words.
///
/// `$'...'` segments are rewritten as plain single-quoted text first, since
/// the POSIX splitter does not know bash's ANSI-C quoting.
fn split_words(input: &str) -> Result<Vec<String>, CredentialsError> {
    let input = expand_ansi_c_quotes(&input.replace("\r\n", "\n"));
    shlex::split(&input).ok_or_else(|| CredentialsError::Parse("unterminated quote".to_string()))
}

fn expand_ansi_c_quotes(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut quote = None;
    while let Some(c) = chars.next() {
        out.push(c);
        match (quote, c) {
            (Some('"'), '\\') | (None, '\\') => out.extend(chars.next()),
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '$') if chars.next_if_eq(&'\'').is_some() => {
                out.pop();
                out.push('\'');
                while let Some(c) = chars.next() {
                    match c {
                        '\'' => {
                            out.push('\'');
                            break;
                        }
                        '\\' => match chars.next() {
                            Some('n') => out.push('\n'),
                            Some('t') => out.push('\t'),
                            Some('\'') => out.push_str("'\\''"),
                            Some(other) => out.push(other),
                            None => {}
                        },
                        _ => out.push(c),
                    }
                }
            }
            (None, _) => {}
        }
    }
    out
}

/// Validates a cURL capture and stores it as `<name>.json` in `dir`.
///
/// Returns the written path. An existing account of the same name is replaced.
pub fn import_curl_capture(raw: &str, dir: &Path, name: &str) -> Result<PathBuf, CredentialsError> {
    let name = name.trim();
    if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
        return Err(CredentialsError::Parse(format!("invalid account name `{}`", name)));
    }
    let credentials = parse_curl_request(raw)?;
    fs::create_dir_all(dir).map_err(|source| CredentialsError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(format!("{}.json", name));
    credentials.save(&path)?;
    tracing::info!(path = %path.display(), "imported credentials");
    Ok(path)
}

/// Account name shown for a credentials file: the file name without extension.
pub fn account_name(file_name: &str) -> &str {
    Path::new(file_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(file_name)
}

/// Picks an account from a [`search_credentials_in_dir`] result.
///
/// `wanted` matches either the file name or the account name. Without it the
/// last account in name order is used.
pub fn select_account(
    found: BTreeMap<String, Credentials>,
    wanted: Option<&str>,
) -> Result<(String, Credentials), CredentialsError> {
    let available = found
        .keys()
        .map(|file| account_name(file).to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let selected = match wanted {
        Some(wanted) => found
            .into_iter()
            .find(|(file, _)| file == wanted || account_name(file) == wanted),
        None => found.into_iter().next_back(),
    };
    match selected {
        Some((file, credentials)) => Ok((account_name(&file).to_string(), credentials)),
        None => Err(CredentialsError::AccountNotFound {
            wanted: wanted.unwrap_or_default().to_string(),
            available,
        }),
    }
}
