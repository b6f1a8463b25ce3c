//! Posts waiting to be published.

use crate::conf::DEFAULT_LANG;
use crate::media::Media;

/// The content of a post: text, the language it is written in, and any
/// attached media.
///
/// A post is built up a piece at a time:
///
/// ```
/// use skypost::media::Media;
/// use skypost::post::Post;
///
/// let image = Media::new(None, vec![0x89, 0x50, 0x4e, 0x47], "image/png", None);
/// let post = Post::new("Look at https://example.com")
///     .lang("pt")
///     .media(vec![image]);
/// assert_eq!(post.text(), "Look at https://example.com");
/// assert_eq!(post.language(), "pt");
/// assert_eq!(post.attachments().len(), 1);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Post {
    text: String,
    lang: String,
    media: Vec<Media>,
}

impl Post {
    /// Creates a new post in the [default language](DEFAULT_LANG) with no
    /// media.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            text,
            lang: String::from(DEFAULT_LANG),
            media: vec![],
        }
    }

    /// Sets the language the post is written in, as a BCP 47 tag such as
    /// `en` or `pt-BR`.
    pub fn lang(self, lang: impl Into<String>) -> Self {
        let lang = lang.into();
        Self { lang, ..self }
    }

    /// Attaches media to the post, in the order it should be displayed.
    pub fn media(self, media: Vec<Media>) -> Self {
        Self { media, ..self }
    }

    /// The text of the post.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The language of the post.
    pub fn language(&self) -> &str {
        &self.lang
    }

    /// Media attached to the post.
    pub fn attachments(&self) -> &[Media] {
        &self.media
    }
}
