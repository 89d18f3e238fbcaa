use async_trait::async_trait;
use log::trace;

use crate::client::api::{BlocksQuery, Error, KatnipApi};
use crate::client::model::{ApiBlock, ApiTx};

/// Logs every call made through the wrapped API and its outcome.
pub struct KatnipApiTracing<A> {
    inner: A,
}

impl<A> KatnipApiTracing<A> {
    pub fn wrap(api: A) -> Self {
        Self { inner: api }
    }
}

fn outcome<T>(res: &Result<T, Error>, describe: impl FnOnce(&T) -> String) -> String {
    match res {
        Ok(value) => describe(value),
        Err(err) => format!("Err({})", err),
    }
}

#[async_trait]
impl<A> KatnipApi for KatnipApiTracing<A>
where
    A: KatnipApi + Send + Sync,
{
    async fn get_blocks(&self, query: BlocksQuery) -> Result<Vec<ApiBlock>, Error> {
        trace!(target: "api", "get_blocks({:?})", query);
        let res = self.inner.get_blocks(query).await;
        trace!(
            target: "api",
            "get_blocks({:?}) -> {}",
            query,
            outcome(&res, |blocks| format!("{} blocks", blocks.len()))
        );
        res
    }

    async fn get_block_count(&self) -> Result<u64, Error> {
        trace!(target: "api", "get_block_count()");
        let res = self.inner.get_block_count().await;
        trace!(target: "api", "get_block_count() -> {}", outcome(&res, |n| n.to_string()));
        res
    }

    async fn get_block(&self, hash: &str) -> Result<ApiBlock, Error> {
        trace!(target: "api", "get_block({})", hash);
        let res = self.inner.get_block(hash).await;
        trace!(
            target: "api",
            "get_block({}) -> {}",
            hash,
            outcome(&res, |b| format!("Block(blue_score={})", b.blue_score))
        );
        res
    }

    async fn get_transaction(&self, id: &str) -> Result<ApiTx, Error> {
        trace!(target: "api", "get_transaction({})", id);
        let res = self.inner.get_transaction(id).await;
        trace!(
            target: "api",
            "get_transaction({}) -> {}",
            id,
            outcome(&res, |tx| format!("Tx(hash={})", tx.transaction_hash))
        );
        res
    }

    async fn get_transaction_by_hash(&self, hash: &str) -> Result<ApiTx, Error> {
        trace!(target: "api", "get_transaction_by_hash({})", hash);
        let res = self.inner.get_transaction_by_hash(hash).await;
        trace!(
            target: "api",
            "get_transaction_by_hash({}) -> {}",
            hash,
            outcome(&res, |tx| format!("Tx(id={})", tx.transaction_id))
        );
        res
    }
}
