//! Cited source model and deduplication.
//!
//! Grounded answers arrive with a list of citation candidates that may
//! repeat the same locator. [`dedupe_sources`] collapses them so each
//! locator appears at most once per response.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Placeholder title used when the service omits one.
pub const UNTITLED_SOURCE: &str = "Untitled Source";

/// A citation to a dataset or page backing part of an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// The URI uniquely identifying the cited source.
    pub uri: String,
    /// Human-readable title, falling back to [`UNTITLED_SOURCE`].
    pub title: String,
}

impl Source {
    pub fn new(uri: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            title: title.into(),
        }
    }

    /// Label to display for this source: the title, or the uri when the
    /// title is empty.
    pub fn label(&self) -> &str {
        if self.title.is_empty() {
            &self.uri
        } else {
            &self.title
        }
    }
}

/// Collapses duplicate locators: one entry per distinct uri, positioned at
/// the first occurrence, carrying the last occurrence's title.
///
/// The order/value split is maintained explicitly with an ordered key list
/// plus a uri-keyed map, rather than relying on any container's iteration
/// order. Callers must filter empty-uri sources before calling.
pub fn dedupe_sources(sources: Vec<Source>) -> Vec<Source> {
    let mut seen_order: Vec<String> = Vec::new();
    let mut latest: HashMap<String, Source> = HashMap::new();

    for source in sources {
        if !latest.contains_key(&source.uri) {
            seen_order.push(source.uri.clone());
        }
        latest.insert(source.uri.clone(), source);
    }

    seen_order
        .into_iter()
        .filter_map(|uri| latest.remove(&uri))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(dedupe_sources(Vec::new()).is_empty());
    }

    #[test]
    fn distinct_uris_pass_through_in_order() {
        let sources = vec![
            Source::new("http://a", "A"),
            Source::new("http://b", "B"),
        ];
        assert_eq!(dedupe_sources(sources.clone()), sources);
    }

    #[test]
    fn duplicate_keeps_first_position_and_last_title() {
        let deduped = dedupe_sources(vec![
            Source::new("http://a", "A"),
            Source::new("http://b", "B"),
            Source::new("http://a", "A2"),
        ]);
        assert_eq!(
            deduped,
            vec![Source::new("http://a", "A2"), Source::new("http://b", "B")]
        );
    }

    #[test]
    fn dedupe_is_idempotent() {
        let sources = vec![
            Source::new("http://a", "A"),
            Source::new("http://a", "A2"),
            Source::new("http://b", "B"),
            Source::new("http://b", "B"),
        ];
        let once = dedupe_sources(sources);
        let twice = dedupe_sources(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn label_falls_back_to_uri() {
        let untitled = Source::new("http://a", "");
        assert_eq!(untitled.label(), "http://a");
        let titled = Source::new("http://a", "Rainfall 2020");
        assert_eq!(titled.label(), "Rainfall 2020");
    }
}
