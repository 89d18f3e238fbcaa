use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::client::api::{BlocksQuery, Error, KatnipApi, Order};
use crate::client::model::{ApiBlock, ApiErrorBody, ApiTx};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ApiCall {
    GetBlocks(BlocksQuery),
    GetBlockCount,
    GetBlock(String),
    GetTransaction(String),
    GetTransactionByHash(String),
}

#[derive(Default)]
struct State {
    /// Most recent first.
    blocks: Vec<ApiBlock>,
    transactions: Vec<ApiTx>,
    failures: HashMap<ApiCall, ApiErrorBody>,
    calls: Vec<ApiCall>,
}

/// API backed by in-memory data. Records every call it serves and can be told
/// to fail specific calls with an error envelope.
#[derive(Default)]
pub struct InMemoryApi {
    state: Mutex<State>,
}

impl InMemoryApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the known blocks. `blocks` must be ordered most recent first.
    pub fn set_blocks(&self, blocks: Vec<ApiBlock>) {
        self.state.lock().blocks = blocks;
    }

    pub fn put_transaction(&self, tx: ApiTx) {
        let mut state = self.state.lock();
        state.transactions.retain(|t| t.transaction_id != tx.transaction_id);
        state.transactions.push(tx);
    }

    pub fn fail(&self, call: ApiCall, error_code: Option<i64>, error_message: &str) {
        self.state.lock().failures.insert(
            call,
            ApiErrorBody {
                error_code,
                error_message: error_message.to_string(),
            },
        );
    }

    pub fn clear_failure(&self, call: &ApiCall) {
        self.state.lock().failures.remove(call);
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.state.lock().calls.clone()
    }

    fn record(&self, call: ApiCall) -> Result<(), Error> {
        let mut state = self.state.lock();
        let failure = state.failures.get(&call).cloned();
        state.calls.push(call);
        match failure {
            Some(body) => Err(Error::from(body)),
            None => Ok(()),
        }
    }
}

fn not_found(what: &str) -> Error {
    Error::NotFound {
        message: format!("no {} was found", what),
    }
}

#[async_trait]
impl KatnipApi for InMemoryApi {
    async fn get_blocks(&self, query: BlocksQuery) -> Result<Vec<ApiBlock>, Error> {
        query.to_query_string()?;
        self.record(ApiCall::GetBlocks(query))?;
        let state = self.state.lock();
        let mut blocks = state.blocks.clone();
        if query.order == Some(Order::Ascending) {
            blocks.reverse();
        }
        Ok(blocks
            .into_iter()
            .skip(query.skip.unwrap_or(0) as usize)
            .take(query.limit as usize)
            .collect())
    }

    async fn get_block_count(&self) -> Result<u64, Error> {
        self.record(ApiCall::GetBlockCount)?;
        Ok(self.state.lock().blocks.len() as u64)
    }

    async fn get_block(&self, hash: &str) -> Result<ApiBlock, Error> {
        self.record(ApiCall::GetBlock(hash.to_string()))?;
        let state = self.state.lock();
        state
            .blocks
            .iter()
            .chain(state.transactions.iter().flat_map(|tx| tx.blocks.iter()))
            .find(|b| b.block_hash == hash)
            .cloned()
            .ok_or_else(|| not_found("block with the given block hash"))
    }

    async fn get_transaction(&self, id: &str) -> Result<ApiTx, Error> {
        self.record(ApiCall::GetTransaction(id.to_string()))?;
        let state = self.state.lock();
        state
            .transactions
            .iter()
            .find(|tx| tx.transaction_id == id)
            .cloned()
            .ok_or_else(|| not_found("transaction with the given txid"))
    }

    async fn get_transaction_by_hash(&self, hash: &str) -> Result<ApiTx, Error> {
        self.record(ApiCall::GetTransactionByHash(hash.to_string()))?;
        let state = self.state.lock();
        state
            .transactions
            .iter()
            .find(|tx| tx.transaction_hash == hash)
            .cloned()
            .ok_or_else(|| not_found("transaction with the given txhash"))
    }
}

#[cfg(test)]
mod tests {
    use crate::client::api::{BlocksQuery, KatnipApi, Order};
    use crate::client::memory::{ApiCall, InMemoryApi};
    use crate::client::model::ApiBlock;

    fn block(hash: &str, blue_score: u64) -> ApiBlock {
        ApiBlock {
            block_hash: hash.into(),
            blue_score,
            timestamp: 0,
            parent_block_hashes: vec![],
            transaction_count: 0,
            hash_merkle_root: String::new(),
            accepted_id_merkle_root: String::new(),
            utxo_commitment: String::new(),
            version: 1,
            bits: 0,
            nonce: 0,
            difficulty: 0.0,
            transaction_ids: vec![],
        }
    }

    #[tokio::test]
    async fn pages_through_blocks() {
        let api = InMemoryApi::new();
        api.set_blocks(vec![block("c", 3), block("b", 2), block("a", 1)]);
        let page = api
            .get_blocks(BlocksQuery {
                limit: 2,
                skip: Some(1),
                order: None,
            })
            .await
            .unwrap();
        assert_eq!(page.iter().map(|b| b.block_hash.as_str()).collect::<Vec<_>>(), vec!["b", "a"]);
        let asc = api
            .get_blocks(BlocksQuery {
                limit: 1,
                skip: None,
                order: Some(Order::Ascending),
            })
            .await
            .unwrap();
        assert_eq!(asc[0].block_hash, "a");
        assert_eq!(api.get_block_count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn injected_failures_are_served_and_recorded() {
        let api = InMemoryApi::new();
        api.set_blocks(vec![block("a", 1)]);
        api.fail(ApiCall::GetBlock("a".into()), Some(500), "database is down");
        let err = api.get_block("a").await.unwrap_err();
        assert_eq!(err.code(), Some(500));
        api.clear_failure(&ApiCall::GetBlock("a".into()));
        assert!(api.get_block("a").await.is_ok());
        assert!(api.get_transaction("a").await.unwrap_err().is_not_found());
        assert_eq!(
            api.calls(),
            vec![
                ApiCall::GetBlock("a".into()),
                ApiCall::GetBlock("a".into()),
                ApiCall::GetTransaction("a".into()),
            ]
        );
    }
}
