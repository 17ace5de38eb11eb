//! Path walking over nested JSON values.
//!
//! The upstream API wraps the same logical field at different depths depending
//! on where it is rendered, so callers usually declare several candidate
//! [`Chain`]s and take the first one that resolves.

use std::collections::BTreeSet;
use std::fmt;

use serde_json::{Map, Value};

use crate::error::ChainError;

/// A single step of a [`Chain`]: a mapping key or a sequence index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Step {
    Key(String),
    Index(usize),
}

impl From<&str> for Step {
    fn from(key: &str) -> Self {
        Step::Key(key.to_string())
    }
}

impl From<String> for Step {
    fn from(key: String) -> Self {
        Step::Key(key)
    }
}

impl From<usize> for Step {
    fn from(index: usize) -> Self {
        Step::Index(index)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Key(key) => f.write_str(key),
            Step::Index(index) => write!(f, "{}", index),
        }
    }
}

/// An ordered path of steps locating one candidate value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Chain(Vec<Step>);

impl Chain {
    pub fn new(steps: Vec<Step>) -> Self {
        Self(steps)
    }

    pub fn steps(&self) -> &[Step] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" → ")?;
            }
            write!(f, "{}", step)?;
        }
        Ok(())
    }
}

/// Builds a [`Chain`] from string keys and integer indices.
///
/// ```
/// use ytm_browser::chain;
/// let c = chain!["contents", 0, "content"];
/// assert_eq!(c.steps().len(), 3);
/// ```
#[macro_export]
macro_rules! chain {
    () => {
        $crate::chain::Chain::default()
    };
    ($($step:expr),+ $(,)?) => {
        $crate::chain::Chain::new(vec![$($crate::chain::Step::from($step)),+])
    };
}

/// Walks `value` along `chain`. An empty chain returns `value` itself.
pub fn extract<'a>(value: &'a Value, chain: &Chain) -> Result<&'a Value, ChainError> {
    let mut current = value;
    for (step_idx, step) in chain.steps().iter().enumerate() {
        current = match step {
            Step::Key(key) => current
                .as_object()
                .and_then(|obj| obj.get(key))
                .ok_or_else(|| ChainError::MissingKey {
                    key: key.clone(),
                    step: step_idx,
                })?,
            Step::Index(index) => current
                .as_array()
                .and_then(|arr| arr.get(*index))
                .ok_or(ChainError::IndexOutOfRange {
                    index: *index,
                    step: step_idx,
                })?,
        };
    }
    Ok(current)
}

/// Returns the value at the first chain that resolves.
///
/// When every chain fails, the error of the last one is returned.
pub fn extract_first<'a>(value: &'a Value, chains: &[Chain]) -> Result<&'a Value, ChainError> {
    let mut last_err = ChainError::MissingKey {
        key: String::new(),
        step: 0,
    };
    for chain in chains {
        match extract(value, chain) {
            Ok(found) => return Ok(found),
            Err(err) => last_err = err,
        }
    }
    Err(last_err)
}

/// A chain plus an optional set of keys to keep from the mapping it reaches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRule {
    pub chain: Chain,
    pub return_keys: Option<BTreeSet<&'static str>>,
}

impl ParseRule {
    pub fn new(chain: Chain) -> Self {
        Self {
            chain,
            return_keys: None,
        }
    }

    pub fn keeping(chain: Chain, keys: &[&'static str]) -> Self {
        Self {
            chain,
            return_keys: Some(keys.iter().copied().collect()),
        }
    }

    /// Extracts the mapping at this rule's chain, filtered to `return_keys`.
    ///
    /// Returns `None` when the chain does not resolve, the target is not a
    /// mapping, or nothing survives the filter.
    pub fn apply(&self, value: &Value) -> Option<Map<String, Value>> {
        let found = extract(value, &self.chain).ok()?.as_object()?;
        let filtered: Map<String, Value> = match &self.return_keys {
            Some(keys) => found
                .iter()
                .filter(|(k, _)| keys.contains(k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            None => found.clone(),
        };
        if filtered.is_empty() {
            None
        } else {
            Some(filtered)
        }
    }
}

/// Flattens upstream display text into a plain string.
///
/// Text is stored either as a plain string or as a list of runs
/// (`[{"text": "..."}, ...]`); runs are concatenated.
pub fn runs_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(runs) => runs
            .iter()
            .map(|run| run.get("text").and_then(Value::as_str))
            .collect::<Option<String>>(),
        _ => None,
    }
}

/// Returns `true` when `key` is present and holds something other than
/// `null`, `""`, `[]` or `{}`.
pub fn has_non_empty(value: &Value, key: &str) -> bool {
    match value.get(key) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
        Some(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_nested_key_and_index() {
        let value = json!({"a": [1, {"b": 2}]});
        assert_eq!(extract(&value, &chain!["a", 1, "b"]), Ok(&json!(2)));
    }

    #[test]
    fn test_extract_key_on_scalar_fails() {
        let value = json!({"a": 1});
        assert_eq!(
            extract(&value, &chain!["a", "b"]),
            Err(ChainError::MissingKey {
                key: "b".to_string(),
                step: 1
            })
        );
    }

    #[test]
    fn test_extract_index_out_of_range() {
        let value = json!({"a": [1]});
        assert_eq!(
            extract(&value, &chain!["a", 3]),
            Err(ChainError::IndexOutOfRange { index: 3, step: 1 })
        );
        // Index step on a mapping is also an index failure
        assert!(matches!(
            extract(&value, &chain![0]),
            Err(ChainError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_extract_empty_chain_is_identity() {
        for value in [json!(null), json!("x"), json!([1, 2]), json!({"k": {}})] {
            assert_eq!(extract(&value, &chain![]), Ok(&value));
        }
    }

    #[test]
    fn test_extract_first_takes_first_resolving_chain() {
        let value = json!({"queueDatas": [1], "other": [2]});
        let chains = [chain!["contents", 0], chain!["queueDatas"], chain!["other"]];
        assert_eq!(extract_first(&value, &chains), Ok(&json!([1])));
        assert!(extract_first(&value, &[chain!["nope"]]).is_err());
    }

    #[test]
    fn test_parse_rule_filters_keys() {
        let value = json!({"ep": {"params": "p", "videoId": "v", "extra": 1}});
        let rule = ParseRule::keeping(chain!["ep"], &["params", "videoId"]);
        let payload = rule.apply(&value).unwrap();
        assert_eq!(payload.len(), 2);
        assert_eq!(payload["videoId"], "v");
    }

    #[test]
    fn test_parse_rule_rejects_empty_filtered_result() {
        let value = json!({"ep": {"clickTrackingParams": "x"}});
        let rule = ParseRule::keeping(chain!["ep"], &["params", "playlistId"]);
        assert_eq!(rule.apply(&value), None);
        let not_a_map = ParseRule::new(chain!["ep", "clickTrackingParams"]);
        assert_eq!(not_a_map.apply(&value), None);
    }

    #[test]
    fn test_runs_text() {
        assert_eq!(runs_text(&json!("Road Trip")).as_deref(), Some("Road Trip"));
        assert_eq!(
            runs_text(&json!([{"text": "Road "}, {"text": "Trip"}])).as_deref(),
            Some("Road Trip")
        );
        assert_eq!(runs_text(&json!({"text": "x"})), None);
        assert_eq!(runs_text(&json!([{"nope": 1}])), None);
    }

    #[test]
    fn test_has_non_empty() {
        let value = json!({"a": "", "b": {}, "c": "x", "d": null, "e": 0});
        assert!(!has_non_empty(&value, "a"));
        assert!(!has_non_empty(&value, "b"));
        assert!(has_non_empty(&value, "c"));
        assert!(!has_non_empty(&value, "d"));
        assert!(has_non_empty(&value, "e"));
        assert!(!has_non_empty(&value, "missing"));
    }

    #[test]
    fn test_chain_display() {
        assert_eq!(chain!["contents", 0, "items"].to_string(), "contents → 0 → items");
    }
}
