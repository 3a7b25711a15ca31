use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use interunit_core::{MatchDetail, MatchType, Money};

use crate::context::RunContext;
use crate::strategy::{pair_record, StrategyInput};

/// A gated pair the cascade could not decide, offered for human review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualCandidate {
    pub file1_header: usize,
    pub file2_header: usize,
    pub amount: Money,
    pub file1_is_lender: bool,
    /// Short-code references seen in either narration, as review hints.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub short_code_hints: Vec<String>,
}

/// A reviewer's decision, fed back into a later run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualConfirmation {
    pub file1_header: usize,
    pub file2_header: usize,
}

/// All pairs still unclaimed after the cascade, in gate order.
pub fn candidates(input: &StrategyInput<'_>, ctx: &RunContext) -> Vec<ManualCandidate> {
    let mut out = Vec::new();
    for pair in input.pairs {
        if ctx.pair_claimed(input.file1, input.file2, pair) {
            continue;
        }
        let (b1, b2) = input.blocks(pair);
        let (t1, t2) = input.tokens(pair);
        let mut hints = t1.short_code_refs.clone();
        for code in &t2.short_code_refs {
            if !hints.contains(code) {
                hints.push(code.clone());
            }
        }
        out.push(ManualCandidate {
            file1_header: b1.header_row,
            file2_header: b2.header_row,
            amount: pair.amount,
            file1_is_lender: pair.file1_is_lender,
            short_code_hints: hints,
        });
    }
    debug!(candidates = out.len(), "manual review candidates collected");
    out
}

/// Apply reviewer confirmations. Each must name a still-unclaimed gated
/// pair; anything else is logged and skipped.
pub fn fold_confirmed(
    input: &StrategyInput<'_>,
    ctx: &mut RunContext,
    confirmations: &[ManualConfirmation],
) {
    for confirmation in confirmations {
        let pair = input.pairs.iter().find(|p| {
            input.file1.blocks[p.file1_block].header_row == confirmation.file1_header
                && input.file2.blocks[p.file2_block].header_row == confirmation.file2_header
        });
        let Some(pair) = pair else {
            warn!(
                file1_header = confirmation.file1_header,
                file2_header = confirmation.file2_header,
                "confirmation does not name a gated pair, skipping"
            );
            continue;
        };
        if ctx.pair_claimed(input.file1, input.file2, pair) {
            warn!(
                file1_header = confirmation.file1_header,
                file2_header = confirmation.file2_header,
                "confirmation names an already matched block, skipping"
            );
            continue;
        }
        ctx.accept(pair_record(input, pair, MatchType::Manual, MatchDetail::Manual));
    }
}
