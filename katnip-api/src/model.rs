use std::fmt::{Display, Formatter};

use derive_more::{From, Into};

use crate::client::model::{ApiBlock, ApiTx, ApiTxInput, ApiTxOutput};

pub const SOMPI_PER_KAS: u64 = 100_000_000;

/// Amount in the smallest currency unit. Displays in KAS.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into)]
pub struct Sompi(pub u64);

impl Sompi {
    pub fn saturating_add(self, other: Sompi) -> Sompi {
        Sompi(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: Sompi) -> Sompi {
        Sompi(self.0.saturating_sub(other.0))
    }
}

impl Display for Sompi {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let whole = self.0 / SOMPI_PER_KAS;
        let frac = self.0 % SOMPI_PER_KAS;
        if frac == 0 {
            write!(f, "{}", whole)
        } else {
            let digits = format!("{:08}", frac);
            write!(f, "{}.{}", whole, digits.trim_end_matches('0'))
        }
    }
}

/// What is known about the transactions of a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockTransactions {
    Listed(Vec<String>),
    /// The block has no transactions.
    Empty,
    /// Pruned or header-only block: the server knows the count but not the ids.
    Unavailable { count: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub hash: String,
    pub blue_score: u64,
    /// Seconds since epoch.
    pub timestamp: u64,
    pub parent_hashes: Vec<String>,
    pub transaction_count: u64,
    pub transactions: BlockTransactions,
    pub hash_merkle_root: String,
    pub accepted_id_merkle_root: String,
    pub utxo_commitment: String,
    pub version: i32,
    pub bits: u32,
    pub nonce: u64,
    pub difficulty: f64,
}

impl Block {
    pub fn num_parents(&self) -> usize {
        self.parent_hashes.len()
    }
}

impl From<ApiBlock> for Block {
    fn from(ab: ApiBlock) -> Self {
        let transactions = match (ab.transaction_ids.is_empty(), ab.transaction_count) {
            (false, _) => BlockTransactions::Listed(ab.transaction_ids),
            (true, 0) => BlockTransactions::Empty,
            (true, count) => BlockTransactions::Unavailable { count },
        };
        Self {
            hash: ab.block_hash,
            blue_score: ab.blue_score,
            timestamp: ab.timestamp,
            parent_hashes: ab.parent_block_hashes,
            transaction_count: ab.transaction_count,
            transactions,
            hash_merkle_root: ab.hash_merkle_root,
            accepted_id_merkle_root: ab.accepted_id_merkle_root,
            utxo_commitment: ab.utxo_commitment,
            version: ab.version,
            bits: ab.bits,
            nonce: ab.nonce,
            difficulty: ab.difficulty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxInput {
    pub value: Sompi,
    pub address: Option<String>,
}

impl From<ApiTxInput> for TxInput {
    fn from(input: ApiTxInput) -> Self {
        Self {
            value: Sompi(input.value),
            address: non_empty(input.address),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutput {
    pub value: Sompi,
    pub address: Option<String>,
}

impl From<ApiTxOutput> for TxOutput {
    fn from(output: ApiTxOutput) -> Self {
        Self {
            value: Sompi(output.value),
            address: non_empty(output.address),
        }
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: String,
    pub hash: String,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    /// Blocks including this transaction. More than one while a reorg is visible.
    pub blocks: Vec<Block>,
}

impl Transaction {
    pub fn is_coinbase(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn total_input(&self) -> Sompi {
        self.inputs
            .iter()
            .fold(Sompi::default(), |acc, i| acc.saturating_add(i.value))
    }

    pub fn total_output(&self) -> Sompi {
        self.outputs
            .iter()
            .fold(Sompi::default(), |acc, o| acc.saturating_add(o.value))
    }

    /// Zero for coinbase transactions. Inputs spending unknown outputs carry
    /// no value, so the difference is clamped at zero.
    pub fn fee(&self) -> Sompi {
        if self.is_coinbase() {
            Sompi::default()
        } else {
            self.total_input().saturating_sub(self.total_output())
        }
    }

    pub fn recipient_addresses(&self) -> impl Iterator<Item = &str> {
        self.outputs.iter().filter_map(|o| o.address.as_deref())
    }

    pub fn from_addresses(&self) -> impl Iterator<Item = &str> {
        self.inputs.iter().filter_map(|i| i.address.as_deref())
    }
}

impl From<ApiTx> for Transaction {
    fn from(tx: ApiTx) -> Self {
        Self {
            id: tx.transaction_id,
            hash: tx.transaction_hash,
            inputs: tx.inputs.into_iter().map(TxInput::from).collect(),
            outputs: tx.outputs.into_iter().map(TxOutput::from).collect(),
            blocks: tx.blocks.into_iter().map(Block::from).collect(),
        }
    }
}
