//! Resolution, polling and presentation layer of the Katnip block explorer.

pub mod config;
pub mod explorer;
pub mod poller;
pub mod route;
pub mod search;
pub mod view;
