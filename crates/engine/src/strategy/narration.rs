use tracing::debug;

use interunit_core::{MatchDetail, MatchType};

use crate::context::RunContext;
use crate::extract::BlockTokens;
use crate::strategy::{pair_record, Strategy, StrategyInput};

/// Highest-priority stage: byte-identical narration text on both sides.
pub struct NarrationStrategy;

fn usable_narration<'a>(tokens: &'a BlockTokens, min_len: usize) -> Option<&'a str> {
    let text = tokens.narration.as_deref()?.trim();
    if text.len() <= min_len {
        return None;
    }
    if matches!(text.to_lowercase().as_str(), "nan" | "none" | "") {
        return None;
    }
    Some(text)
}

impl Strategy for NarrationStrategy {
    fn match_type(&self) -> MatchType {
        MatchType::Narration
    }

    fn run(&self, input: &StrategyInput<'_>, ctx: &mut RunContext) {
        let mut found = 0usize;
        for pair in input.pairs {
            if ctx.pair_claimed(input.file1, input.file2, pair) {
                continue;
            }
            let (t1, t2) = input.tokens(pair);
            let min_len = input.options.min_narration_len;
            let (Some(n1), Some(n2)) = (usable_narration(t1, min_len), usable_narration(t2, min_len))
            else {
                continue;
            };
            if n1 != n2 {
                continue;
            }
            ctx.accept(pair_record(
                input,
                pair,
                MatchType::Narration,
                MatchDetail::Narration { text: n1.to_string() },
            ));
            found += 1;
        }
        debug!(found, "narration matching complete");
    }
}
