//! Environment and configuration utilities.

use crate::auth::Credentials;
use log::debug;
use std::env;

/// Environment variable holding the account identifier.
pub const IDENTIFIER_VAR: &str = "SKYPOST_BSKY_EMAIL";

/// Environment variable holding the account password.
pub const PASSWORD_VAR: &str = "SKYPOST_BSKY_PASSWORD";

/// Environment variable holding the base URL of the Bluesky agent.
pub const AGENT_VAR: &str = "SKYPOST_BSKY_AGENT";

/// Environment variable holding the default language of new posts.
pub const LANG_VAR: &str = "SKYPOST_LANG";

/// The agent used when `$SKYPOST_BSKY_AGENT` is not set.
pub const DEFAULT_AGENT: &str = "https://bsky.social";

/// The post language used when `$SKYPOST_LANG` is not set.
pub const DEFAULT_LANG: &str = "en";

/// Everything needed to talk to a Bluesky agent.
///
/// Settings are read once, usually with [`Settings::from_env()`], and then
/// handed to the [client](crate::bluesky::Bluesky) that needs them.
#[derive(Clone, Debug)]
pub struct Settings {
    credentials: Option<Credentials>,
    agent: String,
    lang: String,
}

impl Default for Settings {
    /// Settings without credentials, pointing at the main Bluesky agent.
    fn default() -> Self {
        Self {
            credentials: None,
            agent: String::from(DEFAULT_AGENT),
            lang: String::from(DEFAULT_LANG),
        }
    }
}

impl Settings {
    /// Reads settings from the environment.
    ///
    /// Missing credentials are not an error here: the settings simply have
    /// no credentials, and creating a client from them will fail. The agent
    /// and language fall back to [`DEFAULT_AGENT`] and [`DEFAULT_LANG`].
    ///
    /// # Examples
    ///
    /// ```
    /// use skypost::conf::Settings;
    /// # use temp_env::with_vars_unset;
    /// # with_vars_unset(["SKYPOST_BSKY_EMAIL", "SKYPOST_BSKY_AGENT"], || {
    /// let settings = Settings::from_env();
    /// assert!(settings.credentials().is_none());
    /// assert_eq!(settings.agent(), "https://bsky.social");
    /// # });
    /// ```
    pub fn from_env() -> Self {
        let credentials = Credentials::from_env(IDENTIFIER_VAR, PASSWORD_VAR)
            .inspect_err(|err| debug!("no Bluesky credentials configured: {err}"))
            .ok();
        let agent = Self::var_or(AGENT_VAR, DEFAULT_AGENT);
        let lang = Self::var_or(LANG_VAR, DEFAULT_LANG);
        Self {
            credentials,
            lang,
            ..Self::default()
        }
        .agent_from(agent)
    }

    fn var_or(name: &str, default: &str) -> String {
        env::var(name)
            .ok()
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| String::from(default))
    }

    /// Uses the given credentials.
    pub fn credentials_from(self, credentials: Credentials) -> Self {
        let credentials = Some(credentials);
        Self {
            credentials,
            ..self
        }
    }

    /// Uses the given agent base URL.
    ///
    /// Trailing slashes are removed.
    pub fn agent_from(self, agent: impl Into<String>) -> Self {
        let agent = agent.into().trim_end_matches('/').to_string();
        Self { agent, ..self }
    }

    /// Uses the given default post language.
    pub fn lang_from(self, lang: impl Into<String>) -> Self {
        let lang = lang.into();
        Self { lang, ..self }
    }

    /// The account credentials, if they are configured.
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Base URL of the Bluesky agent, without a trailing slash.
    pub fn agent(&self) -> &str {
        &self.agent
    }

    /// Default language for new posts.
    pub fn lang(&self) -> &str {
        &self.lang
    }
}
