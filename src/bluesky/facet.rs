// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Rich-text facets.
//!
//! Bluesky does not parse links out of the text of a post. Instead, a post
//! carries a list of _facets_, each of which annotates a span of the text.
//! Spans are given as offsets into the UTF-8 encoding of the text, so they
//! count bytes, not characters: in `"café https://example.com"` the link
//! starts at byte 6 even though it is the sixth character.
//!
//! See the [rich text documentation] for details.
//!
//! [rich text documentation]: https://docs.bsky.app/docs/advanced-guides/post-richtext

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(https?://([\w_-]+(?:(?:\.[\w_-]+)+))([\w.,@?^=%&:/~+#-]*[\w@?^=%&/~+#-]))")
        .expect("invalid URL regex")
});

const LINK_FEATURE: &str = "app.bsky.richtext.facet#link";

/// An annotation on a span of a post's text.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Facet {
    index: ByteSlice,
    features: Vec<Feature>,
}

impl Facet {
    /// A facet that turns the bytes from `byte_start` up to, but not
    /// including, `byte_end` into a link to `uri`.
    pub fn link(byte_start: usize, byte_end: usize, uri: impl Into<String>) -> Self {
        let uri = uri.into();
        let index = ByteSlice {
            byte_start,
            byte_end,
        };
        let features = vec![Feature {
            kind: String::from(LINK_FEATURE),
            uri,
        }];
        Self { index, features }
    }

    /// Offset of the first byte of the span.
    pub fn byte_start(&self) -> usize {
        self.index.byte_start
    }

    /// Offset just past the last byte of the span.
    pub fn byte_end(&self) -> usize {
        self.index.byte_end
    }

    /// The URI the span links to.
    pub fn uri(&self) -> Option<&str> {
        self.features
            .iter()
            .find(|feature| feature.kind == LINK_FEATURE)
            .map(|feature| feature.uri.as_str())
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct ByteSlice {
    byte_start: usize,
    byte_end: usize,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
struct Feature {
    #[serde(rename = "$type")]
    kind: String,
    uri: String,
}

/// Finds every HTTP and HTTPS URL in `text` and returns a link facet for
/// each one, in the order they appear.
///
/// Each match is searched for after the end of the previous one, so a URL
/// that appears more than once gets a separate, non-overlapping facet for
/// every occurrence.
///
/// # Examples
///
/// ```
/// use skypost::bluesky::facet::links;
///
/// let facets = links("I ❤️ https://bsky.app");
/// assert_eq!(facets.len(), 1);
/// assert_eq!(facets[0].byte_start(), 9);
/// assert_eq!(facets[0].byte_end(), 25);
/// assert_eq!(facets[0].uri(), Some("https://bsky.app"));
/// ```
pub fn links(text: &str) -> Vec<Facet> {
    let mut cursor = 0;
    let mut facets = vec![];
    while let Some(url) = URL.find_at(text, cursor) {
        facets.push(Facet::link(url.start(), url.end(), url.as_str()));
        cursor = url.end();
    }
    facets
}
