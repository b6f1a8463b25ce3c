//! Bluesky API clients and services for communicating with Bluesky over HTTP.

pub mod client;
pub mod facet;
pub mod record;
pub mod service;

pub use client::{Bluesky, Error, RemoteServiceError, Session};
