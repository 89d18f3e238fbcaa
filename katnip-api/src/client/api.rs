use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use isahc::{AsyncReadResponseExt, HttpClient};
use log::debug;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::client::model::{ApiBlock, ApiErrorBody, ApiTx};
use crate::client::types::{with_path, InvalidUrl, Url};

pub const NOT_FOUND_CODE: i64 = 404;

#[derive(Error, Debug)]
pub enum Error {
    #[error("not found: {message}")]
    NotFound { message: String },
    #[error("error {}: {}", display_code(.code), .message)]
    Remote { code: Option<i64>, message: String },
    #[error("isahc: {0}")]
    Http(#[from] isahc::Error),
    #[error("json decoding: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Url(#[from] InvalidUrl),
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

fn display_code(code: &Option<i64>) -> String {
    code.map(|c| c.to_string()).unwrap_or_else(|| "?".into())
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Error code reported by the API, if the failure came with one.
    pub fn code(&self) -> Option<i64> {
        match self {
            Error::NotFound { .. } => Some(NOT_FOUND_CODE),
            Error::Remote { code, .. } => *code,
            _ => None,
        }
    }
}

impl From<ApiErrorBody> for Error {
    fn from(body: ApiErrorBody) -> Self {
        match body.error_code {
            Some(NOT_FOUND_CODE) => Error::NotFound {
                message: body.error_message,
            },
            code => Error::Remote {
                code,
                message: body.error_message,
            },
        }
    }
}

/// Decode a response body: a JSON object carrying `errorMessage` is a failure,
/// anything else is the resource itself. The HTTP status is not consulted.
pub fn decode_envelope<T: DeserializeOwned>(body: Value) -> Result<T, Error> {
    if let Some(message) = body.get("errorMessage").filter(|m| !m.is_null()) {
        let error_message = message
            .as_str()
            .map(String::from)
            .unwrap_or_else(|| message.to_string());
        let error_code = body.get("errorCode").and_then(Value::as_i64);
        return Err(Error::from(ApiErrorBody {
            error_code,
            error_message,
        }));
    }
    Ok(serde_json::from_value(body)?)
}

pub const DEFAULT_BLOCKS_LIMIT: u16 = 10;
pub const MAX_BLOCKS_LIMIT: u16 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Order {
    Ascending,
    Descending,
}

impl Display for Order {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Order::Ascending => f.write_str("asc"),
            Order::Descending => f.write_str("desc"),
        }
    }
}

impl FromStr for Order {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Order::Ascending),
            "desc" => Ok(Order::Descending),
            other => Err(Error::InvalidQuery(format!("unknown order {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlocksQuery {
    pub limit: u16,
    pub skip: Option<u64>,
    pub order: Option<Order>,
}

impl Default for BlocksQuery {
    fn default() -> Self {
        Self::latest(DEFAULT_BLOCKS_LIMIT)
    }
}

impl BlocksQuery {
    pub fn latest(limit: u16) -> Self {
        Self {
            limit,
            skip: None,
            order: None,
        }
    }

    /// Render as a query string, rejecting limits the server would refuse.
    pub fn to_query_string(&self) -> Result<String, Error> {
        if self.limit < 1 || self.limit > MAX_BLOCKS_LIMIT {
            return Err(Error::InvalidQuery(format!(
                "limit must be between 1 and {}, got {}",
                MAX_BLOCKS_LIMIT, self.limit
            )));
        }
        let mut query = format!("limit={}", self.limit);
        if let Some(skip) = self.skip {
            query.push_str(&format!("&skip={}", skip));
        }
        if let Some(order) = self.order {
            query.push_str(&format!("&order={}", order));
        }
        Ok(query)
    }
}

#[async_trait]
pub trait KatnipApi {
    /// Most recent blocks, in the order the server returns them.
    async fn get_blocks(&self, query: BlocksQuery) -> Result<Vec<ApiBlock>, Error>;
    async fn get_block_count(&self) -> Result<u64, Error>;
    async fn get_block(&self, hash: &str) -> Result<ApiBlock, Error>;
    async fn get_transaction(&self, id: &str) -> Result<ApiTx, Error>;
    async fn get_transaction_by_hash(&self, hash: &str) -> Result<ApiTx, Error>;
}

#[async_trait]
impl<A> KatnipApi for Arc<A>
where
    A: KatnipApi + Send + Sync + ?Sized,
{
    async fn get_blocks(&self, query: BlocksQuery) -> Result<Vec<ApiBlock>, Error> {
        (**self).get_blocks(query).await
    }

    async fn get_block_count(&self) -> Result<u64, Error> {
        (**self).get_block_count().await
    }

    async fn get_block(&self, hash: &str) -> Result<ApiBlock, Error> {
        (**self).get_block(hash).await
    }

    async fn get_transaction(&self, id: &str) -> Result<ApiTx, Error> {
        (**self).get_transaction(id).await
    }

    async fn get_transaction_by_hash(&self, hash: &str) -> Result<ApiTx, Error> {
        (**self).get_transaction_by_hash(hash).await
    }
}

#[derive(Clone)]
pub struct KatnipApiHttpClient {
    pub client: HttpClient,
    pub base_url: Url,
}

impl KatnipApiHttpClient {
    pub fn new(client: HttpClient, base_url: Url) -> Self {
        Self { client, base_url }
    }

    async fn fetch<T: DeserializeOwned>(&self, segments: &[&str], query: Option<&str>) -> Result<T, Error> {
        let url = with_path(&self.base_url, segments, query)?;
        debug!(target: "api", "GET {}", url);
        let body = self.client.get_async(url.as_str()).await?.json::<Value>().await?;
        decode_envelope(body)
    }
}

#[async_trait]
impl KatnipApi for KatnipApiHttpClient {
    async fn get_blocks(&self, query: BlocksQuery) -> Result<Vec<ApiBlock>, Error> {
        let query = query.to_query_string()?;
        self.fetch(&["blocks"], Some(&query)).await
    }

    async fn get_block_count(&self) -> Result<u64, Error> {
        self.fetch(&["blocks", "count"], None).await
    }

    async fn get_block(&self, hash: &str) -> Result<ApiBlock, Error> {
        self.fetch(&["block", hash], None).await
    }

    async fn get_transaction(&self, id: &str) -> Result<ApiTx, Error> {
        self.fetch(&["transaction", "id", id], None).await
    }

    async fn get_transaction_by_hash(&self, hash: &str) -> Result<ApiTx, Error> {
        self.fetch(&["transaction", "hash", hash], None).await
    }
}
