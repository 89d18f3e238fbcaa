use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiBlock {
    pub block_hash: String,
    pub blue_score: u64,
    pub timestamp: u64,
    #[serde(default)]
    pub parent_block_hashes: Vec<String>,
    pub transaction_count: u64,
    #[serde(default)]
    pub hash_merkle_root: String,
    #[serde(rename = "acceptedIDMerkleRoot", default)]
    pub accepted_id_merkle_root: String,
    #[serde(default)]
    pub utxo_commitment: String,
    pub version: i32,
    pub bits: u32,
    pub nonce: u64,
    pub difficulty: f64,
    /// Empty for pruned or header-only blocks.
    #[serde(rename = "transactionIds", alias = "transactionIDs", default)]
    pub transaction_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiTxInput {
    #[serde(default)]
    pub value: u64,
    /// Absent when the previous output is unknown.
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiTxOutput {
    pub value: u64,
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTx {
    pub transaction_id: String,
    pub transaction_hash: String,
    #[serde(default)]
    pub inputs: Vec<ApiTxInput>,
    #[serde(default)]
    pub outputs: Vec<ApiTxOutput>,
    /// Blocks including this transaction.
    #[serde(default)]
    pub blocks: Vec<ApiBlock>,
}

/// Failure envelope returned by the API in place of a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error_code: Option<i64>,
    pub error_message: String,
}
