use katnip_api::client::api::{BlocksQuery, Error, KatnipApi};
use katnip_api::model::{Block, Transaction};

use crate::search::{resolve_search, SearchResolution};

/// Read side of the explorer: point lookups, the recent blocks list and
/// search resolution over a [`KatnipApi`].
pub struct Explorer<A> {
    api: A,
    recent_blocks_limit: u16,
}

impl<A> Explorer<A>
where
    A: KatnipApi,
{
    pub fn new(api: A, recent_blocks_limit: u16) -> Self {
        Self {
            api,
            recent_blocks_limit,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn into_api(self) -> A {
        self.api
    }

    /// Latest blocks as ordered by the server.
    pub async fn get_recent_blocks(&self) -> Result<Vec<Block>, Error> {
        let blocks = self
            .api
            .get_blocks(BlocksQuery::latest(self.recent_blocks_limit))
            .await?;
        Ok(blocks.into_iter().map(Block::from).collect())
    }

    pub async fn get_blocks(&self, query: BlocksQuery) -> Result<Vec<Block>, Error> {
        let blocks = self.api.get_blocks(query).await?;
        Ok(blocks.into_iter().map(Block::from).collect())
    }

    pub async fn get_block_count(&self) -> Result<u64, Error> {
        self.api.get_block_count().await
    }

    pub async fn get_block(&self, hash: &str) -> Result<Block, Error> {
        self.api.get_block(hash).await.map(Block::from)
    }

    pub async fn get_transaction(&self, id: &str) -> Result<Transaction, Error> {
        self.api.get_transaction(id).await.map(Transaction::from)
    }

    pub async fn get_transaction_by_hash(&self, hash: &str) -> Result<Transaction, Error> {
        self.api.get_transaction_by_hash(hash).await.map(Transaction::from)
    }

    pub async fn resolve_search(&self, query: &str) -> SearchResolution {
        resolve_search(&self.api, query).await
    }
}
