//! Plain-text views over resolved explorer data.

use std::fmt::Write;

use chrono::{Local, TimeZone};

use katnip_api::model::{Block, BlockTransactions, Transaction};

use crate::route::Route;

const LIST_HASH_PREFIX_LEN: usize = 32;

pub const PRUNED_BLOCK_MESSAGE: &str = "Cannot show transactions for pruned or header only block";

pub fn format_timestamp(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| Local.timestamp_opt(secs, 0).single())
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| secs.to_string())
}

fn shorten(hash: &str) -> String {
    match hash.char_indices().nth(LIST_HASH_PREFIX_LEN) {
        Some((cut, _)) => format!("{}...", &hash[..cut]),
        None => hash.to_string(),
    }
}

fn format_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let line = cells
        .zip(widths)
        .map(|(cell, w)| format!("{:<w$}", cell, w = *w))
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}

fn write_table(out: &mut String, header: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }
    let _ = writeln!(out, "{}", format_row(header.iter().copied(), &widths));
    for row in rows {
        let _ = writeln!(out, "{}", format_row(row.iter().map(String::as_str), &widths));
    }
}

fn write_fields(out: &mut String, fields: &[(&str, String)]) {
    let width = fields.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    for (label, value) in fields {
        let _ = writeln!(out, "  {:<w$}  {}", label, value, w = width);
    }
}

fn write_section(out: &mut String, title: &str) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", title);
}

pub fn render_block_list(blocks: &[Block]) -> String {
    let rows: Vec<Vec<String>> = blocks
        .iter()
        .map(|b| {
            vec![
                shorten(&b.hash),
                b.blue_score.to_string(),
                format_timestamp(b.timestamp),
                b.transaction_count.to_string(),
                b.num_parents().to_string(),
            ]
        })
        .collect();
    let mut out = String::new();
    write_table(
        &mut out,
        &["Hash", "Blue Score", "Timestamp", "Transactions", "Number of parents"],
        &rows,
    );
    out
}

pub fn render_block(block: &Block) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Block {}", block.hash);
    write_fields(
        &mut out,
        &[
            ("Hash", block.hash.clone()),
            ("Timestamp", format_timestamp(block.timestamp)),
            ("Blue Score", block.blue_score.to_string()),
            ("Number of Parents", block.num_parents().to_string()),
            ("Number of Transactions", block.transaction_count.to_string()),
            ("Difficulty", block.difficulty.to_string()),
            ("Hash Merkle Root", block.hash_merkle_root.clone()),
            ("Accepted ID Merkle Root", block.accepted_id_merkle_root.clone()),
            ("UTXO Commitment", block.utxo_commitment.clone()),
            ("Version", block.version.to_string()),
            ("Bits", format!("0x{:x}", block.bits)),
            ("Nonce", format!("0x{:x}", block.nonce)),
        ],
    );

    write_section(&mut out, "Parents");
    for parent in &block.parent_hashes {
        let _ = writeln!(out, "  {}", Route::Block(parent.clone()));
    }

    write_section(&mut out, "Block Transactions");
    match &block.transactions {
        BlockTransactions::Listed(ids) => {
            for id in ids {
                let _ = writeln!(out, "  {}", Route::Transaction(id.clone()));
            }
        }
        BlockTransactions::Empty => {
            let _ = writeln!(out, "  No transactions");
        }
        BlockTransactions::Unavailable { .. } => {
            let _ = writeln!(out, "  {}", PRUNED_BLOCK_MESSAGE);
        }
    }
    out
}

pub fn render_transaction(tx: &Transaction) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Transaction {}", tx.id);
    write_fields(
        &mut out,
        &[
            ("ID", tx.id.clone()),
            ("Hash", tx.hash.clone()),
            ("Total Input", format!("{} KAS", tx.total_input())),
            ("Total Output", format!("{} KAS", tx.total_output())),
            ("Fees", format!("{} KAS", tx.fee())),
            ("Number of Inputs", tx.inputs.len().to_string()),
            ("Number of Outputs", tx.outputs.len().to_string()),
        ],
    );

    write_section(&mut out, "Recipient Addresses");
    for address in tx.recipient_addresses() {
        let _ = writeln!(out, "  {}", address);
    }

    if !tx.is_coinbase() {
        write_section(&mut out, "From Addresses");
        for address in tx.from_addresses() {
            let _ = writeln!(out, "  {}", address);
        }
    }

    write_section(&mut out, "Including Blocks");
    let rows: Vec<Vec<String>> = tx
        .blocks
        .iter()
        .map(|b| vec![Route::Block(b.hash.clone()).to_string(), b.blue_score.to_string()])
        .collect();
    write_table(&mut out, &["Hash", "Blue Score"], &rows);
    out
}

#[cfg(test)]
mod tests {
    use katnip_api::model::{Block, BlockTransactions, Sompi, Transaction, TxInput, TxOutput};

    use crate::view::{render_block, render_block_list, render_transaction, PRUNED_BLOCK_MESSAGE};

    fn block(hash: &str, transactions: BlockTransactions, count: u64) -> Block {
        Block {
            hash: hash.into(),
            blue_score: 7,
            timestamp: 1_600_000_000,
            parent_hashes: vec!["p1".into(), "p2".into()],
            transaction_count: count,
            transactions,
            hash_merkle_root: "hmr".into(),
            accepted_id_merkle_root: "aimr".into(),
            utxo_commitment: "utxo".into(),
            version: 1,
            bits: 0x1e7fffff,
            nonce: 255,
            difficulty: 1.0,
        }
    }

    fn tx(inputs: &[u64], outputs: &[u64]) -> Transaction {
        Transaction {
            id: "tx1".into(),
            hash: "h1".into(),
            inputs: inputs
                .iter()
                .map(|v| TxInput {
                    value: Sompi(*v),
                    address: Some("A".into()),
                })
                .collect(),
            outputs: outputs
                .iter()
                .map(|v| TxOutput {
                    value: Sompi(*v),
                    address: Some("B".into()),
                })
                .collect(),
            blocks: vec![block("abc", BlockTransactions::Empty, 0)],
        }
    }

    fn tx_links(view: &str) -> Vec<&str> {
        view.lines()
            .map(str::trim)
            .filter(|l| l.starts_with("#/tx/"))
            .collect()
    }

    #[test]
    fn block_lists_its_transactions() {
        let view = render_block(&block(
            "abc",
            BlockTransactions::Listed(vec!["t1".into(), "t2".into()]),
            2,
        ));
        assert_eq!(tx_links(&view), vec!["#/tx/t1", "#/tx/t2"]);
        assert!(view.contains("#/block/p1"));
        assert!(view.contains("0x1e7fffff"));
        assert!(view.contains("0xff"));
        assert!(!view.contains(PRUNED_BLOCK_MESSAGE));
    }

    #[test]
    fn pruned_block_cannot_show_transactions() {
        let view = render_block(&block("abc", BlockTransactions::Unavailable { count: 3 }, 3));
        assert!(view.contains(PRUNED_BLOCK_MESSAGE));
        assert!(tx_links(&view).is_empty());
    }

    #[test]
    fn empty_block_is_not_shown_as_pruned() {
        let view = render_block(&block("abc", BlockTransactions::Empty, 0));
        assert!(view.contains("No transactions"));
        assert!(!view.contains(PRUNED_BLOCK_MESSAGE));
        assert!(tx_links(&view).is_empty());
    }

    #[test]
    fn transaction_amounts() {
        let view = render_transaction(&tx(&[100_000_000], &[99_000_000]));
        let line = |label: &str| {
            view.lines()
                .find(|l| l.trim_start().starts_with(label))
                .map(|l| l.trim_start()[label.len()..].trim().to_string())
                .unwrap()
        };
        assert_eq!(line("Total Input"), "1 KAS");
        assert_eq!(line("Total Output"), "0.99 KAS");
        assert_eq!(line("Fees"), "0.01 KAS");
        assert!(view.contains("From Addresses"));
        assert!(view.contains("#/block/abc"));
    }

    #[test]
    fn coinbase_has_no_fee_nor_senders() {
        let view = render_transaction(&tx(&[], &[5_000_000_000]));
        assert!(view.contains("0 KAS"));
        assert!(!view.contains("From Addresses"));
    }

    #[test]
    fn block_list_shortens_hashes() {
        let long_hash = "f".repeat(64);
        let view = render_block_list(&[block(&long_hash, BlockTransactions::Empty, 0)]);
        let mut lines = view.lines();
        assert!(lines.next().unwrap().starts_with("Hash"));
        let row = lines.next().unwrap();
        assert!(row.starts_with(&format!("{}...", "f".repeat(32))));
        assert!(!row.contains(&long_hash));
    }
}
