use tracing::debug;

use interunit_core::{MatchDetail, MatchType};

use crate::context::RunContext;
use crate::strategy::{pair_record, reject_pair, Strategy, StrategyInput};

/// Final-settlement matching on five-digit employee IDs shared by both
/// blocks.
pub struct SettlementStrategy;

impl Strategy for SettlementStrategy {
    fn match_type(&self) -> MatchType {
        MatchType::Settlement
    }

    fn run(&self, input: &StrategyInput<'_>, ctx: &mut RunContext) {
        let mut found = 0usize;
        for pair in input.pairs {
            if ctx.pair_claimed(input.file1, input.file2, pair) {
                continue;
            }
            let (t1, t2) = input.tokens(pair);
            if t1.employee_ids.is_empty() && t2.employee_ids.is_empty() {
                continue;
            }
            match t1.employee_ids.intersection(&t2.employee_ids).next() {
                Some(id) => {
                    ctx.accept(pair_record(
                        input,
                        pair,
                        MatchType::Settlement,
                        MatchDetail::Settlement {
                            employee_id: id.clone(),
                            keyword_found: t1.settlement_keyword || t2.settlement_keyword,
                        },
                    ));
                    found += 1;
                }
                None => {
                    let ids1: Vec<&String> = t1.employee_ids.iter().collect();
                    let ids2: Vec<&String> = t2.employee_ids.iter().collect();
                    let reason = format!(
                        "Settlement mismatch: File 1 IDs {ids1:?}, File 2 IDs {ids2:?}"
                    );
                    reject_pair(ctx, input, pair, &reason);
                }
            }
        }
        debug!(found, "settlement matching complete");
    }
}
