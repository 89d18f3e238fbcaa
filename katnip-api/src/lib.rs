//! Typed client for the Katnip block explorer API.

pub mod client;
pub mod model;

pub use client::api::{BlocksQuery, Error, KatnipApi, KatnipApiHttpClient, Order};
pub use client::types::Url;
