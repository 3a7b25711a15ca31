use std::collections::BTreeMap;

use interunit_core::{BlockId, Direction, Money, TransactionBlock};

use crate::tracker::{FileSide, UnmatchedTracker};

/// Header amounts bucketed by exact value, one index per file. The
/// sorted map keeps every downstream pass deterministic.
#[derive(Debug, Default)]
pub struct AmountIndex {
    by_amount: BTreeMap<Money, Buckets>,
}

#[derive(Debug, Default)]
struct Buckets {
    lenders: Vec<BlockId>,
    borrowers: Vec<BlockId>,
}

/// One amount-gated candidate: a file-1 block and a file-2 block with the
/// same header amount and opposite directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidatePair {
    pub amount: Money,
    pub file1_block: BlockId,
    pub file2_block: BlockId,
    pub file1_is_lender: bool,
}

impl AmountIndex {
    pub fn build(blocks: &[TransactionBlock]) -> Self {
        let mut by_amount: BTreeMap<Money, Buckets> = BTreeMap::new();
        for (id, block) in blocks.iter().enumerate() {
            if !block.amount.is_positive() {
                continue;
            }
            let bucket = by_amount.entry(block.amount).or_default();
            match block.direction {
                Direction::Lender => bucket.lenders.push(id),
                Direction::Borrower => bucket.borrowers.push(id),
            }
        }
        AmountIndex { by_amount }
    }
}

/// The universal gate: intersect the two indexes and cross lenders with
/// borrowers, never same-direction pairs. Same-direction collisions on a
/// shared amount are recorded as rejections so the audit trail explains
/// why those blocks stayed apart.
pub fn find_matching_pairs(
    file1: &AmountIndex,
    file2: &AmountIndex,
    blocks1: &[TransactionBlock],
    blocks2: &[TransactionBlock],
    tracker: &mut UnmatchedTracker,
) -> Vec<CandidatePair> {
    let mut pairs = Vec::new();

    for (amount, b1) in &file1.by_amount {
        let Some(b2) = file2.by_amount.get(amount) else { continue };

        for &l in &b1.lenders {
            for &b in &b2.borrowers {
                pairs.push(CandidatePair {
                    amount: *amount,
                    file1_block: l,
                    file2_block: b,
                    file1_is_lender: true,
                });
            }
        }
        for &b in &b1.borrowers {
            for &l in &b2.lenders {
                pairs.push(CandidatePair {
                    amount: *amount,
                    file1_block: b,
                    file2_block: l,
                    file1_is_lender: false,
                });
            }
        }

        for (ours, theirs, direction) in [
            (&b1.lenders, &b2.lenders, Direction::Lender),
            (&b1.borrowers, &b2.borrowers, Direction::Borrower),
        ] {
            if ours.is_empty() || theirs.is_empty() {
                continue;
            }
            let reason = format!("Transaction types don't match (both same type: {direction})");
            for &id in ours.iter() {
                tracker.record_rejection(FileSide::File1, blocks1[id].header_row, &reason);
            }
            for &id in theirs.iter() {
                tracker.record_rejection(FileSide::File2, blocks2[id].header_row, &reason);
            }
        }
    }

    pairs
}
