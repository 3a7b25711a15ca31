use tracing::debug;

use interunit_core::{MatchDetail, MatchType};

use crate::context::RunContext;
use crate::strategy::{pair_record, reject_pair, Strategy, StrategyInput};

/// Foreign-currency matching: the dollar figures quoted in both blocks
/// must agree as multisets, text-exact.
pub struct UsdStrategy;

fn sorted(amounts: &[String]) -> Vec<String> {
    let mut out = amounts.to_vec();
    out.sort();
    out
}

impl Strategy for UsdStrategy {
    fn match_type(&self) -> MatchType {
        MatchType::Usd
    }

    fn run(&self, input: &StrategyInput<'_>, ctx: &mut RunContext) {
        let mut found = 0usize;
        for pair in input.pairs {
            if ctx.pair_claimed(input.file1, input.file2, pair) {
                continue;
            }
            let (t1, t2) = input.tokens(pair);
            if t1.usd.is_empty() || t2.usd.is_empty() {
                continue;
            }
            if t1.usd.len() != t2.usd.len() {
                let reason = format!(
                    "Different number of USD amounts: {} vs {}",
                    t1.usd.len(),
                    t2.usd.len()
                );
                reject_pair(ctx, input, pair, &reason);
                continue;
            }
            let (u1, u2) = (sorted(&t1.usd), sorted(&t2.usd));
            if u1 != u2 {
                let reason = format!("USD amounts don't match exactly: {u1:?} vs {u2:?}");
                reject_pair(ctx, input, pair, &reason);
                continue;
            }
            ctx.accept(pair_record(
                input,
                pair,
                MatchType::Usd,
                MatchDetail::Usd { amounts: u1 },
            ));
            found += 1;
        }
        debug!(found, "USD matching complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RunContext;
    use crate::engine::{EngineOptions, FileData};
    use crate::strategy::testutil::*;
    use crate::tracker::FileSide;

    fn run(f1: &FileData, f2: &FileData) -> RunContext {
        let mut ctx = RunContext::new();
        let pairs = gate(f1, f2, &mut ctx);
        let mapping = empty_mapping();
        let options = EngineOptions::default();
        let input = StrategyInput { file1: f1, file2: f2, pairs: &pairs, mapping: &mapping, options: &options };
        UsdStrategy.run(&input, &mut ctx);
        ctx
    }

    fn pair_of(text1: &str, text2: &str) -> (FileData, FileData) {
        let f1 = file(vec![header("17,000.00", "", text1), terminator()]);
        let f2 = file(vec![header("", "17,000.00", text2), terminator()]);
        (f1, f2)
    }

    #[test]
    fn equal_usd_multisets_match() {
        let (f1, f2) = pair_of(
            "Inward $6,400 and $80 against export bill",
            "Received $80 and $6,400 against export bill",
        );
        let ctx = run(&f1, &f2);

        assert_eq!(ctx.matches.len(), 1);
        assert_eq!(
            ctx.matches[0].detail,
            MatchDetail::Usd { amounts: vec!["$6,400".to_string(), "$80".to_string()] }
        );
    }

    #[test]
    fn different_counts_record_the_rejection() {
        let (f1, f2) = pair_of(
            "Inward $6,400 and $80 against export bill",
            "Received $6,400 against export bill",
        );
        let ctx = run(&f1, &f2);

        assert!(ctx.matches.is_empty());
        assert_eq!(
            ctx.tracker.reasons(FileSide::File1, 0),
            ["Different number of USD amounts: 2 vs 1"]
        );
    }

    #[test]
    fn different_amounts_record_the_rejection() {
        let (f1, f2) = pair_of(
            "Inward $147,401.28 against export",
            "Received $147,401.29 against export",
        );
        let ctx = run(&f1, &f2);

        assert!(ctx.matches.is_empty());
        assert_eq!(
            ctx.tracker.reasons(FileSide::File2, 0),
            [r#"USD amounts don't match exactly: ["$147,401.28"] vs ["$147,401.29"]"#]
        );
    }
}
