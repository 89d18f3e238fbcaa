use log::debug;

use katnip_api::client::api::{Error, KatnipApi};
use katnip_api::model::{Block, Transaction};

use crate::route::Route;

/// Outcome of resolving a search query.
#[derive(Debug)]
pub enum SearchResolution {
    Block(Block),
    Transaction(Transaction),
    /// Neither a block nor a transaction is known under the query.
    NotFound(String),
    Failed(Error),
}

impl SearchResolution {
    /// Where to navigate when the query resolved to a resource.
    pub fn route(&self) -> Option<Route> {
        match self {
            SearchResolution::Block(block) => Some(Route::Block(block.hash.clone())),
            SearchResolution::Transaction(tx) => Some(Route::Transaction(tx.id.clone())),
            _ => None,
        }
    }

    /// User-facing message when the query did not resolve.
    pub fn message(&self) -> Option<String> {
        match self {
            SearchResolution::NotFound(query) => Some(format!(
                "Couldn't find a block or transaction with ID or hash of {}",
                query
            )),
            SearchResolution::Failed(err) => Some(match (err.code(), err) {
                (Some(code), Error::Remote { message, .. }) => format!("Error {}: {}", code, message),
                (Some(code), Error::NotFound { message }) => format!("Error {}: {}", code, message),
                (None, Error::Remote { message, .. }) => format!("Error: {}", message),
                _ => format!("Error: {}", err),
            }),
            _ => None,
        }
    }
}

/// Resolve `query` as a block hash first and, only if no such block exists,
/// as a transaction id. Any other failure ends the resolution immediately.
pub async fn resolve_search<A>(api: &A, query: &str) -> SearchResolution
where
    A: KatnipApi + ?Sized,
{
    let query = query.trim();
    if query.is_empty() {
        return SearchResolution::NotFound(String::new());
    }
    match api.get_block(query).await {
        Ok(block) => {
            debug!(target: "search", "[{}] resolved to a block", query);
            return SearchResolution::Block(Block::from(block));
        }
        Err(err) if !err.is_not_found() => {
            debug!(target: "search", "[{}] block lookup failed: {}", query, err);
            return SearchResolution::Failed(err);
        }
        Err(_) => {}
    }
    match api.get_transaction(query).await {
        Ok(tx) => {
            debug!(target: "search", "[{}] resolved to a transaction", query);
            SearchResolution::Transaction(Transaction::from(tx))
        }
        Err(err) if err.is_not_found() => {
            debug!(target: "search", "[{}] not found", query);
            SearchResolution::NotFound(query.to_string())
        }
        Err(err) => {
            debug!(target: "search", "[{}] transaction lookup failed: {}", query, err);
            SearchResolution::Failed(err)
        }
    }
}
