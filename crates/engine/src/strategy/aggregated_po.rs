use std::collections::BTreeSet;

use tracing::debug;

use interunit_core::{Direction, MatchDetail, MatchRecord, MatchType, Money};

use crate::context::RunContext;
use crate::strategy::{Strategy, StrategyInput};
use crate::tracker::FileSide;

/// One-to-many PO matching: a file-1 lender voucher naming several POs is
/// settled by the set of file-2 borrower vouchers that cover every one of
/// them, with borrower credits summing exactly to the lender debit.
pub struct AggregatedPoStrategy;

fn distinct(pos: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for po in pos {
        if !out.contains(po) {
            out.push(po.clone());
        }
    }
    out
}

fn usable_header(text: &str, min_len: usize) -> bool {
    let t = text.trim();
    t.len() >= min_len && !matches!(t.to_lowercase().as_str(), "nan" | "none" | "")
}

impl Strategy for AggregatedPoStrategy {
    fn match_type(&self) -> MatchType {
        MatchType::AggregatedPo
    }

    fn run(&self, input: &StrategyInput<'_>, ctx: &mut RunContext) {
        let mut found = 0usize;

        for (id1, lender) in input.file1.blocks.iter().enumerate() {
            if lender.direction != Direction::Lender || ctx.claimed1.contains(&lender.header_row) {
                continue;
            }
            let t1 = &input.file1.tokens[id1];
            if !usable_header(&t1.header_text, input.options.min_narration_len) {
                continue;
            }
            let lender_pos = distinct(&t1.header_pos);
            if lender_pos.len() < 2 {
                continue;
            }

            let mut covered: BTreeSet<&str> = BTreeSet::new();
            let mut borrowers: Vec<usize> = Vec::new();
            let mut total = Money::zero();

            for (id2, borrower) in input.file2.blocks.iter().enumerate() {
                if borrower.direction != Direction::Borrower
                    || ctx.claimed2.contains(&borrower.header_row)
                    || borrowers.contains(&borrower.header_row)
                {
                    continue;
                }
                let t2 = &input.file2.tokens[id2];
                if !usable_header(&t2.header_text, input.options.min_narration_len) {
                    continue;
                }
                for po in &lender_pos {
                    if !covered.contains(po.as_str()) && t2.header_pos.contains(po) {
                        covered.insert(po);
                        borrowers.push(borrower.header_row);
                        total = total + borrower.credit;
                        break;
                    }
                }
            }

            if covered.len() != lender_pos.len() {
                debug!(
                    lender = lender.header_row,
                    missing = lender_pos.len() - covered.len(),
                    "aggregated PO coverage incomplete"
                );
                continue;
            }

            if total != lender.debit {
                let reason = format!("Amounts don't match: {} vs {}", lender.debit, total);
                ctx.tracker
                    .record_rejection(FileSide::File1, lender.header_row, &reason);
                for &h in &borrowers {
                    ctx.tracker.record_rejection(FileSide::File2, h, &reason);
                }
                continue;
            }

            ctx.accept(MatchRecord {
                id: None,
                match_type: MatchType::AggregatedPo,
                file1_header: lender.header_row,
                file2_headers: borrowers,
                file1_is_lender: true,
                amount: lender.debit,
                detail: MatchDetail::AggregatedPo { po_numbers: lender_pos },
                audit_info: String::new(),
            });
            found += 1;
        }
        debug!(found, "aggregated PO matching complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RunContext;
    use crate::engine::EngineOptions;
    use crate::strategy::testutil::*;

    const PO_A: &str = "G24/PO/2024/9/29505";
    const PO_B: &str = "CIL/C//PO//11/2024";

    fn lender_file() -> crate::engine::FileData {
        file(vec![
            header("10,000.00", "", &format!("Paid against {PO_A} and {PO_B}")),
            terminator(),
        ])
    }

    fn borrower_file(credit_a: &str, credit_b: &str) -> crate::engine::FileData {
        file(vec![
            header("", credit_a, &format!("Received against {PO_A}")),
            terminator(),
            header("", credit_b, &format!("Received against {PO_B}")),
            terminator(),
        ])
    }

    fn run(f1: &crate::engine::FileData, f2: &crate::engine::FileData) -> RunContext {
        let mut ctx = RunContext::new();
        let mapping = empty_mapping();
        let options = EngineOptions::default();
        let input = StrategyInput { file1: f1, file2: f2, pairs: &[], mapping: &mapping, options: &options };
        AggregatedPoStrategy.run(&input, &mut ctx);
        ctx
    }

    #[test]
    fn lender_settled_by_two_borrower_blocks() {
        let f1 = lender_file();
        let f2 = borrower_file("6,000.00", "4,000.00");
        let ctx = run(&f1, &f2);

        assert_eq!(ctx.matches.len(), 1);
        let m = &ctx.matches[0];
        assert_eq!(m.match_type, MatchType::AggregatedPo);
        assert_eq!(m.file1_header, 0);
        assert_eq!(m.file2_headers, vec![0, 2]);
        assert_eq!(m.amount, Money::from_cents(1_000_000));
        assert_eq!(
            m.detail,
            MatchDetail::AggregatedPo { po_numbers: vec![PO_A.to_string(), PO_B.to_string()] }
        );
        assert!(ctx.claimed2.contains(&0) && ctx.claimed2.contains(&2));
    }

    #[test]
    fn sum_mismatch_rejects_every_header() {
        let f1 = lender_file();
        let f2 = borrower_file("6,000.00", "3,000.00");
        let ctx = run(&f1, &f2);

        assert!(ctx.matches.is_empty());
        let reason = "Amounts don't match: 10000.00 vs 9000.00";
        assert_eq!(ctx.tracker.reasons(FileSide::File1, 0), [reason]);
        assert_eq!(ctx.tracker.reasons(FileSide::File2, 0), [reason]);
        assert_eq!(ctx.tracker.reasons(FileSide::File2, 2), [reason]);
    }

    #[test]
    fn uncovered_po_leaves_the_lender_alone() {
        let f1 = lender_file();
        let f2 = file(vec![
            header("", "6,000.00", &format!("Received against {PO_A}")),
            terminator(),
        ]);
        let ctx = run(&f1, &f2);

        assert!(ctx.matches.is_empty());
        assert!(ctx.tracker.reasons(FileSide::File1, 0).is_empty());
    }
}
