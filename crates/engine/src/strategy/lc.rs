use tracing::debug;

use interunit_core::{MatchDetail, MatchType};

use crate::context::RunContext;
use crate::strategy::{pair_record, reject_pair, Strategy, StrategyInput};

/// Letter-of-credit matching: both blocks carry exactly one LC reference
/// and the references agree.
pub struct LcStrategy;

impl Strategy for LcStrategy {
    fn match_type(&self) -> MatchType {
        MatchType::Lc
    }

    fn run(&self, input: &StrategyInput<'_>, ctx: &mut RunContext) {
        let mut found = 0usize;
        for pair in input.pairs {
            if ctx.pair_claimed(input.file1, input.file2, pair) {
                continue;
            }
            let (t1, t2) = input.tokens(pair);
            if t1.lcs.is_empty() || t2.lcs.is_empty() {
                continue;
            }
            if t1.lcs.len() == 1 && t2.lcs.len() == 1 && t1.lcs[0] == t2.lcs[0] {
                let number = t1.lcs[0].clone();
                ctx.accept(pair_record(
                    input,
                    pair,
                    MatchType::Lc,
                    MatchDetail::Lc { number },
                ));
                found += 1;
            } else if !t1.lcs.iter().any(|lc| t2.lcs.contains(lc)) {
                let reason =
                    format!("LC numbers don't match: '{}' vs '{}'", t1.lcs[0], t2.lcs[0]);
                reject_pair(ctx, input, pair, &reason);
            }
            // A shared LC among several distinct ones is left for later
            // strategies; one block covering many LCs is not a pair.
        }
        debug!(found, "LC matching complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineOptions;
    use crate::strategy::testutil::*;
    use crate::tracker::FileSide;

    #[test]
    fn identical_single_lc_matches() {
        let f1 = file(vec![
            header("5,000.00", "", "Fund transfer"),
            narration("Being payment against LC 123456"),
            terminator(),
        ]);
        let f2 = file(vec![
            header("", "5,000.00", "Fund receipt"),
            narration("Received against LC 123456 dt 01/07/2024"),
            terminator(),
        ]);
        let mut ctx = crate::context::RunContext::new();
        let pairs = gate(&f1, &f2, &mut ctx);
        let mapping = empty_mapping();
        let options = EngineOptions::default();
        let input = StrategyInput { file1: &f1, file2: &f2, pairs: &pairs, mapping: &mapping, options: &options };

        LcStrategy.run(&input, &mut ctx);

        assert_eq!(ctx.matches.len(), 1);
        let m = &ctx.matches[0];
        assert_eq!(m.match_type, MatchType::Lc);
        assert_eq!(m.detail, MatchDetail::Lc { number: "LC 123456".to_string() });
        assert!(m.file1_is_lender);
    }

    #[test]
    fn different_lcs_record_the_rejection() {
        let f1 = file(vec![
            header("5,000.00", "", "Fund transfer"),
            narration("Being payment against LC 111111"),
            terminator(),
        ]);
        let f2 = file(vec![
            header("", "5,000.00", "Fund receipt"),
            narration("Received against LC 222222"),
            terminator(),
        ]);
        let mut ctx = crate::context::RunContext::new();
        let pairs = gate(&f1, &f2, &mut ctx);
        let mapping = empty_mapping();
        let options = EngineOptions::default();
        let input = StrategyInput { file1: &f1, file2: &f2, pairs: &pairs, mapping: &mapping, options: &options };

        LcStrategy.run(&input, &mut ctx);

        assert!(ctx.matches.is_empty());
        assert_eq!(
            ctx.tracker.reasons(FileSide::File1, 0),
            ["LC numbers don't match: 'LC 111111' vs 'LC 222222'"]
        );
    }

    #[test]
    fn shared_lc_among_several_is_left_undecided() {
        let f1 = file(vec![
            header("5,000.00", "", "Fund transfer"),
            narration("Being payment against LC 111111 and LC 222222"),
            terminator(),
        ]);
        let f2 = file(vec![
            header("", "5,000.00", "Fund receipt"),
            narration("Received against LC 111111"),
            terminator(),
        ]);
        let mut ctx = crate::context::RunContext::new();
        let pairs = gate(&f1, &f2, &mut ctx);
        let mapping = empty_mapping();
        let options = EngineOptions::default();
        let input = StrategyInput { file1: &f1, file2: &f2, pairs: &pairs, mapping: &mapping, options: &options };

        LcStrategy.run(&input, &mut ctx);

        assert!(ctx.matches.is_empty());
        assert!(ctx.tracker.reasons(FileSide::File1, 0).is_empty());
    }
}
