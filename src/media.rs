// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Images and other media attached to posts.

use dialoguer::Input;
use log::debug;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A piece of media, such as an image, held in memory.
///
/// Media are usually loaded from a file with [`Media::from_img()`],
/// attached to a [`Post`](crate::post::Post), and uploaded once when the
/// post is published. Everything except the alt text is fixed once the
/// media has been created.
#[derive(Clone, PartialEq)]
pub struct Media {
    path: Option<PathBuf>,
    content: Vec<u8>,
    mime: String,
    alt: Option<String>,
}

impl Media {
    /// Creates media from raw bytes.
    ///
    /// `path` is where the content came from, if anywhere; media without
    /// a path are never [prompted](Media::check_alt_text) for alt text.
    pub fn new(
        path: Option<PathBuf>,
        content: impl Into<Vec<u8>>,
        mime: impl Into<String>,
        alt: Option<String>,
    ) -> Self {
        let content = content.into();
        let mime = mime.into();
        Self {
            path,
            content,
            mime,
            alt,
        }
    }

    /// Reads an image from disk.
    ///
    /// The MIME type is guessed from the file name.
    ///
    /// Returns an [`enum@Error`] if the file does not exist, cannot be read,
    /// or its MIME type cannot be determined.
    pub async fn from_img(img: impl AsRef<Path>, alt: Option<String>) -> Result<Self, Error> {
        let img = img.as_ref();
        let exists = tokio::fs::try_exists(img)
            .await
            .map_err(|err| Error::Read(img.to_path_buf(), err))?;
        if !exists {
            return Err(Error::NotFound(img.to_path_buf()));
        }

        let content = tokio::fs::read(img)
            .await
            .map_err(|err| Error::Read(img.to_path_buf(), err))?;
        let mime = mime_guess::from_path(img)
            .first()
            .ok_or_else(|| Error::UnknownMimeType(img.to_path_buf()))?;
        debug!("read {} bytes of {mime} from {}", content.len(), img.display());

        Ok(Self::new(
            Some(img.to_path_buf()),
            content,
            mime.essence_str(),
            alt,
        ))
    }

    /// Where the media was loaded from, if anywhere.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The raw content.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// The MIME type of the content.
    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// A textual description of the media, if one was supplied.
    pub fn alt(&self) -> Option<&str> {
        self.alt.as_deref()
    }

    /// Sets the alt text. Blank text clears it.
    pub fn set_alt(&mut self, alt: impl Into<String>) {
        let alt = alt.into();
        let alt = alt.trim();
        self.alt = if alt.is_empty() {
            None
        } else {
            Some(alt.to_string())
        };
    }

    /// Asks for alt text until some is given.
    ///
    /// Nothing is asked if the media already has alt text, or if it was
    /// not loaded from a file.
    pub fn check_alt_text<P: Prompt>(&mut self, prompt: &P) -> Result<(), Error> {
        while self.alt.is_none() {
            let Some(path) = &self.path else { break };
            let question = format!("Enter an alt text for {}", path.display());
            let answer = prompt.ask(&question).map_err(Error::Prompt)?;
            self.set_alt(answer);
        }
        Ok(())
    }
}

impl std::fmt::Debug for Media {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Media")
            .field("path", &self.path)
            .field("content", &format_args!("<{} bytes>", self.content.len()))
            .field("mime", &self.mime)
            .field("alt", &self.alt)
            .finish()
    }
}

/// Asks a person a question and returns their answer.
///
/// Implementations other than [`ConsolePrompt`] are mostly useful for
/// testing, or for front ends that are not terminals.
pub trait Prompt {
    /// Asks `question` and returns the answer, which may be blank.
    fn ask(&self, question: &str) -> io::Result<String>;
}

/// Asks questions on the terminal.
#[derive(Debug, Default)]
pub struct ConsolePrompt;

impl Prompt for ConsolePrompt {
    fn ask(&self, question: &str) -> io::Result<String> {
        Input::<String>::new()
            .with_prompt(question)
            .allow_empty(true)
            .interact_text()
    }
}

/// A media error.
#[derive(Debug, Error)]
pub enum Error {
    /// The media file does not exist.
    #[error("File {} does not exist", .0.display())]
    NotFound(PathBuf),

    /// The media file exists but could not be read.
    #[error("Could not read {}: {}", .0.display(), .1)]
    Read(PathBuf, #[source] io::Error),

    /// The MIME type of the media could not be determined.
    #[error("Could not guess mime type for {}", .0.display())]
    UnknownMimeType(PathBuf),

    /// An error occurred while asking for alt text.
    #[error("Could not read alt text: {0}")]
    Prompt(#[source] io::Error),
}
