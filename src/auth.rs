// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Account credentials.

use serde::Serialize;
use std::{env, error, fmt};

/// An identifier and password used to log in to a Bluesky account.
///
/// The identifier is usually the account's email address or handle. The
/// password can be the account password, but an [app password] is
/// strongly recommended.
///
/// Credentials are only ever held in memory.
///
/// [app password]: https://bsky.app/settings/app-passwords
#[derive(Clone, PartialEq, Serialize)]
pub struct Credentials {
    identifier: String,
    password: String,
}

impl Credentials {
    /// Creates a new set of credentials.
    ///
    /// Returns an error if either value is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use skypost::auth::Credentials;
    /// let credentials = Credentials::new("me@example.com", "app-password").unwrap();
    /// assert_eq!(credentials.identifier(), "me@example.com");
    /// assert!(Credentials::new("", "app-password").is_err());
    /// ```
    pub fn new(identifier: impl Into<String>, password: impl Into<String>) -> CredentialsResult {
        let identifier = identifier.into();
        let password = password.into();
        if identifier.is_empty() {
            Err(CredentialsError::Empty("identifier"))
        } else if password.is_empty() {
            Err(CredentialsError::Empty("password"))
        } else {
            Ok(Self {
                identifier,
                password,
            })
        }
    }

    /// Reads credentials from the environment variables `identifier_var`
    /// and `password_var`.
    ///
    /// Returns an error if either variable is unset, empty, or not valid
    /// Unicode.
    pub fn from_env(identifier_var: &str, password_var: &str) -> CredentialsResult {
        let identifier = Self::var(identifier_var)?;
        let password = Self::var(password_var)?;
        Self::new(identifier, password)
    }

    fn var(name: &str) -> Result<String, CredentialsError> {
        let value = env::var(name).map_err(|err| CredentialsError::EnvError(name.into(), err))?;
        if value.is_empty() {
            Err(CredentialsError::EnvError(
                name.into(),
                env::VarError::NotPresent,
            ))
        } else {
            Ok(value)
        }
    }

    /// The account identifier.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The account password.
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("password", &"********")
            .finish()
    }
}

/// Standard result type for [`Credentials`] creation.
pub type CredentialsResult = Result<Credentials, CredentialsError>;

/// Indicates an error when creating credentials.
#[derive(Debug)]
pub enum CredentialsError {
    /// An error occurred while retrieving a value from the environment.
    EnvError(String, env::VarError),

    /// A credential was empty.
    Empty(&'static str),
}

impl fmt::Display for CredentialsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialsError::EnvError(name, err) => write!(f, "Environment error: ${name}: {err}"),
            CredentialsError::Empty(field) => write!(f, "The {field} must not be empty"),
        }
    }
}

impl error::Error for CredentialsError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            CredentialsError::EnvError(_, err) => Some(err),
            CredentialsError::Empty(_) => None,
        }
    }
}
