pub mod aggregated_po;
pub mod interunit;
pub mod lc;
pub mod manual;
pub mod narration;
pub mod po;
pub mod salary;
pub mod settlement;
pub mod usd;

use interunit_core::{MatchDetail, MatchRecord, MatchType, TransactionBlock};

use crate::amount_index::CandidatePair;
use crate::context::RunContext;
use crate::engine::{EngineOptions, FileData};
use crate::extract::BlockTokens;
use crate::mapping::AccountMapping;
use crate::tracker::FileSide;

/// Read-only view of one run handed to every strategy.
pub struct StrategyInput<'a> {
    pub file1: &'a FileData,
    pub file2: &'a FileData,
    /// Amount-and-direction gated block pairs, in deterministic order.
    pub pairs: &'a [CandidatePair],
    pub mapping: &'a AccountMapping,
    pub options: &'a EngineOptions,
}

impl<'a> StrategyInput<'a> {
    pub fn blocks(&self, pair: &CandidatePair) -> (&TransactionBlock, &TransactionBlock) {
        (
            &self.file1.blocks[pair.file1_block],
            &self.file2.blocks[pair.file2_block],
        )
    }

    pub fn tokens(&self, pair: &CandidatePair) -> (&BlockTokens, &BlockTokens) {
        (
            &self.file1.tokens[pair.file1_block],
            &self.file2.tokens[pair.file2_block],
        )
    }
}

/// One stage of the cascade. Strategies examine unclaimed gated pairs,
/// accept matches into the context and record rejections; they never
/// fail the run.
pub trait Strategy {
    fn match_type(&self) -> MatchType;
    fn run(&self, input: &StrategyInput<'_>, ctx: &mut RunContext);
}

/// The fixed-priority cascade. Order is part of the contract: earlier
/// strategies claim blocks away from later ones.
pub fn cascade() -> Vec<Box<dyn Strategy>> {
    vec![
        Box::new(narration::NarrationStrategy),
        Box::new(lc::LcStrategy),
        Box::new(po::PoStrategy),
        Box::new(aggregated_po::AggregatedPoStrategy),
        Box::new(interunit::InterunitStrategy),
        Box::new(settlement::SettlementStrategy),
        Box::new(salary::SalaryStrategy),
        Box::new(usd::UsdStrategy),
    ]
}

/// Record a rejection reason against both headers of a pair.
pub(crate) fn reject_pair(
    ctx: &mut RunContext,
    input: &StrategyInput<'_>,
    pair: &CandidatePair,
    reason: &str,
) {
    let (b1, b2) = input.blocks(pair);
    ctx.tracker.record_rejection(FileSide::File1, b1.header_row, reason);
    ctx.tracker.record_rejection(FileSide::File2, b2.header_row, reason);
}


/// Build the record for an accepted one-to-one pair.
pub(crate) fn pair_record(
    input: &StrategyInput<'_>,
    pair: &CandidatePair,
    match_type: MatchType,
    detail: MatchDetail,
) -> MatchRecord {
    let (b1, b2) = input.blocks(pair);
    MatchRecord {
        id: None,
        match_type,
        file1_header: b1.header_row,
        file2_headers: vec![b2.header_row],
        file1_is_lender: pair.file1_is_lender,
        amount: pair.amount,
        detail,
        audit_info: String::new(),
    }
}
