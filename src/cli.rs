//! Drives the command-line program.

use crate::bluesky::{self, Bluesky};
use crate::conf::Settings;
use crate::media::{self, ConsolePrompt, Media, Prompt};
use crate::post::Post;
use clap::Parser;
use clap_verbosity_flag::Verbosity;
use log::debug;
use std::path::PathBuf;
use thiserror::Error;

/// Program configuration.
#[derive(Debug, Parser)]
#[command(version)]
#[command(about = "Posts text, links, and images to Bluesky", long_about = None)]
pub struct Config {
    #[command(flatten)]
    verbosity: Verbosity,

    /// Text of the post
    text: String,

    /// Language the post is written in [default: $SKYPOST_LANG or "en"]
    #[arg(short, long)]
    lang: Option<String>,

    /// Attach an image (may be repeated, up to Bluesky's limit)
    #[arg(short, long = "image", value_name = "PATH")]
    images: Vec<PathBuf>,

    /// Alt text for the image in the same position (may be repeated)
    #[arg(long = "alt", value_name = "TEXT")]
    alts: Vec<String>,

    /// Never ask for missing alt text
    #[arg(long, default_value_t = false)]
    no_prompt: bool,
}

impl Config {
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// The alt text given for the image at `index`, if any.
    fn alt(&self, index: usize) -> Option<String> {
        self.alts.get(index).cloned()
    }
}

/// Runs the command-line program.
#[derive(Debug)]
pub struct Runner {
    config: Config,
    settings: Settings,
}

impl Runner {
    /// Create a new program runner using the given `config` and
    /// `settings`.
    pub fn new(config: Config, settings: Settings) -> Self {
        Self { config, settings }
    }

    /// Publishes the post described by the configuration and returns its
    /// URL.
    ///
    /// The client is created before anything else happens, so missing
    /// credentials are reported before any image is read or any question
    /// is asked.
    pub async fn run(&self) -> Result<String, Error> {
        let mut client = Bluesky::new(&self.settings)?;
        let media = self.load_media(&ConsolePrompt).await?;
        let post = self.post(media);

        client.auth().await?;
        Ok(client.post(&post).await?)
    }

    async fn load_media<P: Prompt>(&self, prompt: &P) -> Result<Vec<Media>, Error> {
        let (alts, images) = (self.config.alts.len(), self.config.images.len());
        if alts > images {
            return Err(Error::UnmatchedAltText { alts, images });
        }

        let mut media = Vec::with_capacity(self.config.images.len());
        for (i, path) in self.config.images.iter().enumerate() {
            let mut item = Media::from_img(path, self.config.alt(i)).await?;
            if !self.config.no_prompt {
                item.check_alt_text(prompt)?;
            }
            media.push(item);
        }
        debug!("loaded {} images", media.len());
        Ok(media)
    }

    fn post(&self, media: Vec<Media>) -> Post {
        let lang = self
            .config
            .lang
            .as_deref()
            .unwrap_or_else(|| self.settings.lang());
        Post::new(&self.config.text).lang(lang).media(media)
    }
}

/// Runs the program with the given `config` and settings from the
/// environment, printing the URL of the new post.
pub async fn run(config: Config) -> Result<(), Error> {
    let runner = Runner::new(config, Settings::from_env());
    let url = runner.run().await?;
    println!("{url}");
    Ok(())
}

/// A program error.
#[derive(Debug, Error)]
pub enum Error {
    /// An error talking to Bluesky.
    #[error(transparent)]
    Bluesky(#[from] bluesky::Error),

    /// An error loading media.
    #[error(transparent)]
    Media(#[from] media::Error),

    /// More alt texts were given than images.
    #[error("Got {alts} alt texts but only {images} images")]
    UnmatchedAltText { alts: usize, images: usize },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ScriptedPrompt, scratch_file};

    fn config(args: &[&str]) -> Config {
        let args = std::iter::once("skypost").chain(args.iter().copied());
        Config::try_parse_from(args).unwrap()
    }

    #[test]
    fn it_parses_text_and_images() {
        let config = config(&["-i", "a.png", "--image", "b.jpg", "--alt", "A", "Hello"]);
        assert_eq!(config.text, "Hello");
        assert_eq!(config.images, vec![PathBuf::from("a.png"), PathBuf::from("b.jpg")]);
        assert_eq!(config.alt(0), Some(String::from("A")));
        assert_eq!(config.alt(1), None);
        assert!(!config.no_prompt);
    }

    #[test]
    fn it_requires_text() {
        assert!(Config::try_parse_from(["skypost", "-i", "a.png"]).is_err());
    }

    #[test]
    fn it_uses_the_configured_language_by_default() {
        let runner = Runner::new(config(&["Olá"]), Settings::default().lang_from("pt"));
        assert_eq!(runner.post(vec![]).language(), "pt");
    }

    #[test]
    fn it_prefers_the_language_given_on_the_command_line() {
        let runner = Runner::new(
            config(&["--lang", "es", "Hola"]),
            Settings::default().lang_from("pt"),
        );
        let post = runner.post(vec![]);
        assert_eq!(post.language(), "es");
        assert_eq!(post.text(), "Hola");
    }

    #[tokio::test]
    async fn it_fails_without_credentials_before_reading_images() {
        let runner = Runner::new(
            config(&["-i", "/does/not/exist.png", "Hello"]),
            Settings::default(),
        );
        let err = runner.run().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Bluesky(bluesky::Error::CredentialsNotConfigured)
        ));
    }

    #[tokio::test]
    async fn it_loads_images_and_asks_for_missing_alt_text() {
        let first = scratch_file("png", b"first");
        let second = scratch_file("gif", b"second");
        let args = [
            "-i",
            first.to_str().unwrap(),
            "-i",
            second.to_str().unwrap(),
            "--alt",
            "The first one",
            "Pictures",
        ];
        let runner = Runner::new(config(&args), Settings::default());
        let prompt = ScriptedPrompt::new(["The second one"]);

        let media = runner.load_media(&prompt).await.unwrap();
        assert_eq!(media.len(), 2);
        assert_eq!(media[0].alt(), Some("The first one"));
        assert_eq!(media[1].alt(), Some("The second one"));
        assert_eq!(media[1].mime(), "image/gif");
        assert_eq!(prompt.questions().len(), 1);

        std::fs::remove_file(first).unwrap();
        std::fs::remove_file(second).unwrap();
    }

    #[tokio::test]
    async fn it_rejects_alt_text_without_an_image() {
        let image = scratch_file("png", b"image");
        let args = ["-i", image.to_str().unwrap(), "--alt", "One", "--alt", "Two", "Picture"];
        let runner = Runner::new(config(&args), Settings::default());
        let prompt = ScriptedPrompt::new(Vec::<String>::new());

        let err = runner.load_media(&prompt).await.unwrap_err();
        assert!(matches!(
            err,
            Error::UnmatchedAltText { alts: 2, images: 1 }
        ));
        assert_eq!(err.to_string(), "Got 2 alt texts but only 1 images");
        assert!(prompt.questions().is_empty());

        std::fs::remove_file(image).unwrap();
    }

    #[tokio::test]
    async fn it_does_not_ask_when_told_not_to() {
        let image = scratch_file("png", b"image");
        let args = ["--no-prompt", "-i", image.to_str().unwrap(), "Picture"];
        let runner = Runner::new(config(&args), Settings::default());
        let prompt = ScriptedPrompt::new(Vec::<String>::new());

        let media = runner.load_media(&prompt).await.unwrap();
        assert_eq!(media[0].alt(), None);
        assert!(prompt.questions().is_empty());

        std::fs::remove_file(image).unwrap();
    }
}
