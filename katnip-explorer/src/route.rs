use std::fmt::{Display, Formatter};
use std::str::FromStr;

use thiserror::Error;

/// Addressable views of the explorer, in their `#/...` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Block(String),
    Transaction(String),
    Search(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown route: {0}")]
pub struct InvalidRoute(pub String);

impl Display for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Route::Home => write!(f, "#/"),
            Route::Block(hash) => write!(f, "#/block/{}", hash),
            Route::Transaction(id) => write!(f, "#/tx/{}", id),
            Route::Search(query) => write!(f, "#/search/{}", query),
        }
    }
}

impl FromStr for Route {
    type Err = InvalidRoute;

    /// Accepts `#/block/x`, `#block/x` and `/block/x` alike.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let path = s.trim();
        let path = path.strip_prefix('#').unwrap_or(path);
        let path = path.strip_prefix('/').unwrap_or(path);
        if path.is_empty() {
            return Ok(Route::Home);
        }
        let (kind, key) = path.split_once('/').ok_or_else(|| InvalidRoute(s.to_string()))?;
        if key.is_empty() {
            return Err(InvalidRoute(s.to_string()));
        }
        match kind {
            "block" => Ok(Route::Block(key.to_string())),
            "tx" => Ok(Route::Transaction(key.to_string())),
            "search" => Ok(Route::Search(key.to_string())),
            _ => Err(InvalidRoute(s.to_string())),
        }
    }
}
