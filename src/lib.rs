// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! skypost is a command-line tool for posting to [Bluesky]. It publishes a
//! post in a single step: it logs in, uploads any attached images, turns
//! every link in the text into a clickable link, creates the post, and
//! prints the post's URL.
//!
//! # Examples
//!
//! Post some text:
//!
//! ```bash
//! skypost "Just setting up my skypost"
//! ```
//!
//! Links are detected automatically:
//!
//! ```bash
//! skypost "Read the docs at https://docs.bsky.app"
//! ```
//!
//! Attach images, with alt text. skypost asks for alt text for any image
//! that does not have any, unless `--no-prompt` is given:
//!
//! ```bash
//! skypost -i cat.png --alt "A cat asleep on a keyboard" -i dog.jpg "My pets"
//! ```
//!
//! Post in a language other than English:
//!
//! ```bash
//! skypost --lang pt "Olá, mundo!"
//! ```
//!
//! Get usage and help for the tool:
//!
//! ```bash
//! skypost --help
//! ```
//!
//! # Bluesky Account Setup
//!
//! skypost needs the credentials of the account it posts to:
//!
//! 1. Create an [app password] for your account. You can use your
//!    account password, but an app password can be revoked without
//!    affecting the rest of your account.
//! 2. Store your handle or email address in `$SKYPOST_BSKY_EMAIL` and the
//!    app password in `$SKYPOST_BSKY_PASSWORD`:
//!
//!    ```bash
//!    $ export SKYPOST_BSKY_EMAIL='alice.bsky.social'
//!    $ export SKYPOST_BSKY_PASSWORD='copied app password'
//!    ```
//!
//! If your account is hosted somewhere other than `https://bsky.social`,
//! set `$SKYPOST_BSKY_AGENT` to the base URL of your PDS. Set
//! `$SKYPOST_LANG` to change the default language of your posts.
//!
//! # License
//!
//! skypost is licensed under the terms of the [Apache License 2.0]. Please
//! see the LICENSE file accompanying this source code or visit the previous
//! link for more information on licensing.
//!
//! [Apache License 2.0]: https://www.apache.org/licenses/LICENSE-2.0
//! [Bluesky]: https://bsky.app
//! [app password]: https://bsky.app/settings/app-passwords

pub mod auth;
pub mod bluesky;
pub mod cli;
pub mod clock;
pub mod conf;
pub mod http;
pub mod media;
pub mod post;
pub mod retry;

#[cfg(test)]
mod test_utils;
