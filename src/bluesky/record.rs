//! Request and response bodies for the Bluesky XRPC API.
//!
//! These structures mirror the JSON documents described by the
//! `com.atproto` and `app.bsky` lexicons, but only the fields this crate
//! reads or writes.

use crate::bluesky::facet::Facet;
use serde::{Deserialize, Serialize};

/// The collection that holds posts.
pub const POST_COLLECTION: &str = "app.bsky.feed.post";

const IMAGES_EMBED: &str = "app.bsky.embed.images";

/// Body of a successful `com.atproto.server.createSession` call.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub access_jwt: String,
    pub did: String,
    pub handle: String,
}

/// Body of a successful `com.atproto.repo.uploadBlob` call.
#[derive(Debug, Deserialize)]
pub struct UploadBlobResponse {
    /// Reference to the uploaded blob.
    ///
    /// The reference is opaque to us; it is handed back to Bluesky
    /// verbatim when the blob is embedded in a post.
    pub blob: serde_json::Value,
}

/// Body of a successful `com.atproto.repo.createRecord` call.
#[derive(Debug, Deserialize)]
pub struct CreateRecordResponse {
    /// AT URI of the new record, such as
    /// `at://did:plc:xyz/app.bsky.feed.post/3k4duaz5vfs2b`.
    pub uri: String,
}

/// Body of an unsuccessful XRPC call.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: Option<String>,
}

/// Body of a `com.atproto.repo.createRecord` call that creates a post.
#[derive(Debug, PartialEq, Serialize)]
pub struct CreateRecord {
    pub repo: String,
    pub collection: String,
    pub record: PostRecord,
}

impl CreateRecord {
    /// A request to create `record` in the repository of `did`.
    pub fn post(did: impl Into<String>, record: PostRecord) -> Self {
        let repo = did.into();
        let collection = String::from(POST_COLLECTION);
        Self {
            repo,
            collection,
            record,
        }
    }
}

/// An `app.bsky.feed.post` record.
#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    #[serde(rename = "$type")]
    pub kind: String,

    pub text: String,

    pub created_at: String,

    pub langs: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub facets: Option<Vec<Facet>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub embed: Option<ImagesEmbed>,
}

impl PostRecord {
    /// A post record with no facets and no embed.
    pub fn new(
        text: impl Into<String>,
        created_at: impl Into<String>,
        lang: impl Into<String>,
    ) -> Self {
        Self {
            kind: String::from(POST_COLLECTION),
            text: text.into(),
            created_at: created_at.into(),
            langs: vec![lang.into()],
            facets: None,
            embed: None,
        }
    }

    /// Sets the record's facets.
    ///
    /// An empty list of facets is left off the record entirely.
    pub fn facets(self, facets: Vec<Facet>) -> Self {
        let facets = if facets.is_empty() {
            None
        } else {
            Some(facets)
        };
        Self { facets, ..self }
    }

    /// Embeds images in the record.
    ///
    /// An empty list of images is left off the record entirely.
    pub fn images(self, images: Vec<Image>) -> Self {
        let embed = if images.is_empty() {
            None
        } else {
            Some(ImagesEmbed::new(images))
        };
        Self { embed, ..self }
    }
}

/// An `app.bsky.embed.images` embed.
#[derive(Debug, PartialEq, Serialize)]
pub struct ImagesEmbed {
    #[serde(rename = "$type")]
    pub kind: String,

    pub images: Vec<Image>,
}

impl ImagesEmbed {
    fn new(images: Vec<Image>) -> Self {
        let kind = String::from(IMAGES_EMBED);
        Self { kind, images }
    }
}

/// An uploaded image, ready to be embedded in a post.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Image {
    /// Alt text. Bluesky requires the field, so images without alt text
    /// are sent with an empty string.
    pub alt: String,

    /// The blob reference returned when the image was uploaded.
    pub image: serde_json::Value,
}
