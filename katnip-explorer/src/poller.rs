use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::{pin_mut, Stream, StreamExt};
use log::{debug, trace, warn};
use tokio::sync::{watch, Notify};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::MissedTickBehavior;

use katnip_api::client::api::{BlocksQuery, Error, KatnipApi};
use katnip_api::model::Block;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConf {
    pub interval: Duration,
    pub limit: u16,
}

/// One fetch of the latest blocks per tick, the first one immediately.
/// A tick that comes due while a fetch is still pending is skipped, so fetches
/// never overlap and outcomes arrive in request order.
pub fn recent_blocks<A>(api: A, conf: PollerConf) -> impl Stream<Item = Result<Vec<Block>, Error>>
where
    A: KatnipApi,
{
    async_stream::stream! {
        let mut ticker = tokio::time::interval(conf.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            trace!(target: "poller", "Refreshing latest {} blocks", conf.limit);
            yield api
                .get_blocks(BlocksQuery::latest(conf.limit))
                .await
                .map(|blocks| blocks.into_iter().map(Block::from).collect());
        }
    }
}

/// Handle of a running [`RecentBlocksPoller`]. Dropping it stops the poller.
pub struct PollerHandle {
    active: Arc<AtomicBool>,
    stop_signal: Arc<Notify>,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// No further ticks happen after this call, and the outcome of a fetch
    /// still in flight is never published.
    pub fn stop(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            debug!(target: "poller", "Stopping recent blocks poller");
        }
        self.stop_signal.notify_one();
    }

    /// Stop the poller and wait for its task to finish. Fails if the task
    /// panicked.
    pub async fn join(mut self) -> Result<(), JoinError> {
        self.stop();
        match self.task.take() {
            Some(task) => task.await,
            None => Ok(()),
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Keeps a displayed list of the latest blocks fresh.
pub struct RecentBlocksPoller;

impl RecentBlocksPoller {
    /// Spawn the poller on the current tokio runtime. The receiver always holds
    /// the last successfully fetched list; it starts empty.
    pub fn start<A>(api: A, conf: PollerConf) -> (PollerHandle, watch::Receiver<Vec<Block>>)
    where
        A: KatnipApi + Send + Sync + 'static,
    {
        let (display, displayed) = watch::channel(Vec::new());
        let active = Arc::new(AtomicBool::new(true));
        let stop_signal = Arc::new(Notify::new());
        let task = tokio::spawn(run(
            api,
            conf,
            display,
            Arc::clone(&active),
            Arc::clone(&stop_signal),
        ));
        let handle = PollerHandle {
            active,
            stop_signal,
            task: Some(task),
        };
        (handle, displayed)
    }
}

async fn run<A>(
    api: A,
    conf: PollerConf,
    display: watch::Sender<Vec<Block>>,
    active: Arc<AtomicBool>,
    stop_signal: Arc<Notify>,
) where
    A: KatnipApi + Send + Sync,
{
    let updates = recent_blocks(api, conf);
    pin_mut!(updates);
    loop {
        let next = tokio::select! {
            _ = stop_signal.notified() => break,
            next = updates.next() => next,
        };
        if !active.load(Ordering::SeqCst) {
            trace!(target: "poller", "Discarding outcome delivered after stop");
            break;
        }
        match next {
            Some(Ok(blocks)) => {
                trace!(target: "poller", "Displaying {} blocks", blocks.len());
                display.send_replace(blocks);
            }
            // Last good list stays displayed.
            Some(Err(err)) => warn!(target: "poller", "Failed to refresh recent blocks: {}", err),
            None => break,
        }
        if display.is_closed() {
            debug!(target: "poller", "No one is watching recent blocks anymore");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use futures::StreamExt;

    use katnip_api::client::memory::{ApiCall, InMemoryApi};
    use katnip_api::client::model::ApiBlock;
    use katnip_api::client::api::BlocksQuery;

    use crate::poller::{recent_blocks, PollerConf};

    fn block(hash: &str) -> ApiBlock {
        ApiBlock {
            block_hash: hash.into(),
            blue_score: 0,
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
    async fn stream_yields_each_tick_outcome() {
        let api = Arc::new(InMemoryApi::new());
        api.set_blocks(vec![block("b"), block("a")]);
        let conf = PollerConf {
            interval: Duration::from_millis(5),
            limit: 1,
        };
        let failing = ApiCall::GetBlocks(BlocksQuery::latest(1));
        let updates = recent_blocks(Arc::clone(&api), conf);
        futures::pin_mut!(updates);

        let first = updates.next().await.unwrap().unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].hash, "b");

        api.fail(failing.clone(), Some(500), "boom");
        assert_eq!(updates.next().await.unwrap().unwrap_err().code(), Some(500));

        api.clear_failure(&failing);
        assert!(updates.next().await.unwrap().is_ok());
        assert_eq!(api.calls().len(), 3);
    }
}
