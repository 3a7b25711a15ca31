use tracing::debug;

use interunit_core::{MatchDetail, MatchType};

use crate::context::RunContext;
use crate::strategy::{pair_record, reject_pair, Strategy, StrategyInput};

/// Purchase-order matching: a single shared PO reference on each side.
/// Multi-PO lender blocks belong to the aggregated stage that follows.
pub struct PoStrategy;

fn distinct(pos: &[String]) -> Vec<&String> {
    let mut out: Vec<&String> = Vec::new();
    for po in pos {
        if !out.contains(&po) {
            out.push(po);
        }
    }
    out
}

impl Strategy for PoStrategy {
    fn match_type(&self) -> MatchType {
        MatchType::Po
    }

    fn run(&self, input: &StrategyInput<'_>, ctx: &mut RunContext) {
        let mut found = 0usize;
        for pair in input.pairs {
            if ctx.pair_claimed(input.file1, input.file2, pair) {
                continue;
            }
            let (t1, t2) = input.tokens(pair);
            let pos1 = distinct(&t1.pos);
            let pos2 = distinct(&t2.pos);
            if pos1.is_empty() || pos2.is_empty() {
                continue;
            }
            if pos1.len() == 1 && pos2.len() == 1 && pos1[0] == pos2[0] {
                let number = pos1[0].clone();
                ctx.accept(pair_record(
                    input,
                    pair,
                    MatchType::Po,
                    MatchDetail::Po { number },
                ));
                found += 1;
            } else if !pos1.iter().any(|po| pos2.contains(po)) {
                let reason =
                    format!("PO numbers don't match: '{}' vs '{}'", pos1[0], pos2[0]);
                reject_pair(ctx, input, pair, &reason);
            }
        }
        debug!(found, "PO matching complete");
    }
}
