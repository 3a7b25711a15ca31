use tracing::debug;

use interunit_core::{MatchDetail, MatchType, RowRole, TransactionBlock};
use interunit_sheet::SheetModel;

use crate::context::RunContext;
use crate::mapping::AccountMapping;
use crate::strategy::{pair_record, Strategy, StrategyInput};
use crate::tracker::FileSide;

/// Interunit loan matching through the account map: the lender's bold
/// ledger accounts resolve to short codes, and the borrower's narration
/// must reference one of them.
pub struct InterunitStrategy;

struct BlockAccounts {
    /// Short codes of every mapped ledger-account row in the block.
    ledger_codes: Vec<String>,
    /// Codes of the first mapped ledger row after the header. When the
    /// header says "(as per details)" the voucher is split across several
    /// accounts and only this first leg identifies the counterparty.
    primary_codes: Vec<String>,
    as_per_details: bool,
    /// Short codes referenced by the narration text.
    narration_codes: Vec<String>,
}

impl BlockAccounts {
    fn analyze(model: &SheetModel, mapping: &AccountMapping, block: &TransactionBlock, narration_text: &str) -> Self {
        let header_particulars = model
            .row(block.header_row)
            .map(|r| r.particulars.to_lowercase())
            .unwrap_or_default();
        let as_per_details = header_particulars.contains("(as per details)");

        let mut ledger_codes: Vec<String> = Vec::new();
        let mut primary_codes: Vec<String> = Vec::new();
        for &row_idx in &block.rows {
            let Some(row) = model.row(row_idx) else { continue };
            if row_idx == block.header_row || row.role != RowRole::LedgerAccount {
                continue;
            }
            if let Some((_, codes)) = mapping.ledger_account_codes(&row.particulars) {
                if primary_codes.is_empty() {
                    primary_codes = codes.clone();
                }
                for code in codes {
                    if !ledger_codes.contains(&code) {
                        ledger_codes.push(code);
                    }
                }
            }
        }
        // The header's own particulars can name the account too.
        if let Some(row) = model.row(block.header_row) {
            if let Some((_, codes)) = mapping.ledger_account_codes(&row.particulars) {
                for code in codes {
                    if !ledger_codes.contains(&code) {
                        ledger_codes.push(code);
                    }
                }
            }
        }

        BlockAccounts {
            ledger_codes,
            primary_codes,
            as_per_details,
            narration_codes: mapping.narration_codes(narration_text),
        }
    }

    fn has_interunit_data(&self) -> bool {
        !self.ledger_codes.is_empty() || !self.narration_codes.is_empty()
    }

    /// The codes identifying this block when it acts as the lender.
    fn lender_codes(&self) -> &[String] {
        if self.as_per_details && !self.primary_codes.is_empty() {
            &self.primary_codes
        } else {
            &self.ledger_codes
        }
    }
}

impl Strategy for InterunitStrategy {
    fn match_type(&self) -> MatchType {
        MatchType::Interunit
    }

    fn run(&self, input: &StrategyInput<'_>, ctx: &mut RunContext) {
        if input.mapping.is_empty() {
            debug!("no account mapping loaded, skipping interunit matching");
            return;
        }
        let mut found = 0usize;
        for pair in input.pairs {
            if ctx.pair_claimed(input.file1, input.file2, pair) {
                continue;
            }
            let (b1, b2) = input.blocks(pair);
            let (t1, t2) = input.tokens(pair);
            let a1 = BlockAccounts::analyze(&input.file1.sheet, input.mapping, b1, &t1.narration_text);
            let a2 = BlockAccounts::analyze(&input.file2.sheet, input.mapping, b2, &t2.narration_text);

            if !a1.has_interunit_data() || !a2.has_interunit_data() {
                if !a1.has_interunit_data() {
                    ctx.tracker.record_rejection(
                        FileSide::File1,
                        b1.header_row,
                        "No interunit account found in File 1 block",
                    );
                }
                if !a2.has_interunit_data() {
                    ctx.tracker.record_rejection(
                        FileSide::File2,
                        b2.header_row,
                        "No interunit account found in File 2 block",
                    );
                }
                continue;
            }

            let (lender, borrower) = if pair.file1_is_lender { (&a1, &a2) } else { (&a2, &a1) };
            let hit = lender
                .lender_codes()
                .iter()
                .find(|code| borrower.narration_codes.contains(code));
            match hit {
                Some(code) => {
                    ctx.accept(pair_record(
                        input,
                        pair,
                        MatchType::Interunit,
                        MatchDetail::Interunit { short_code: code.clone() },
                    ));
                    found += 1;
                }
                None => {
                    let reason = "Borrower's narration does not contain lender's short code";
                    ctx.tracker.record_rejection(FileSide::File1, b1.header_row, reason);
                    ctx.tracker.record_rejection(FileSide::File2, b2.header_row, reason);
                }
            }
        }
        debug!(found, "interunit matching complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interunit_core::{MatchDetail, MatchType};

    use crate::context::RunContext;
    use crate::engine::{EngineOptions, FileData};
    use crate::strategy::testutil::*;
    use crate::strategy::StrategyInput;
    use crate::tracker::FileSide;

    fn mapping() -> AccountMapping {
        AccountMapping::from_toml(
            r#"
            [[accounts]]
            name = "Brac Bank PLC-CD-A/C-2028701210002"
            codes = ["BBL#0002", "BBL#10002"]

            [[accounts]]
            name = "Eastern Bank PLC-CD-A/C-1011060724056"
            codes = ["EBL#4056"]
            "#,
        )
        .unwrap()
    }

    fn run(f1: &FileData, f2: &FileData, mapping: &AccountMapping) -> RunContext {
        let mut ctx = RunContext::new();
        let pairs = gate(f1, f2, &mut ctx);
        let options = EngineOptions::default();
        let input = StrategyInput { file1: f1, file2: f2, pairs: &pairs, mapping, options: &options };
        InterunitStrategy.run(&input, &mut ctx);
        ctx
    }

    #[test]
    fn lender_ledger_code_named_in_borrower_narration() {
        let f1 = file(vec![
            header("5,000.00", "", "Fund transfer"),
            ledger("Brac Bank PLC-CD-A/C-2028701210002"),
            narration("Being fund transferred to sister concern"),
            terminator(),
        ]);
        let f2 = file(vec![
            header("", "5,000.00", "Fund receipt"),
            narration("Being fund received vide BBL#0002 dt 01/07/2024"),
            terminator(),
        ]);
        let ctx = run(&f1, &f2, &mapping());

        assert_eq!(ctx.matches.len(), 1);
        let m = &ctx.matches[0];
        assert_eq!(m.match_type, MatchType::Interunit);
        assert_eq!(m.detail, MatchDetail::Interunit { short_code: "BBL#0002".to_string() });
    }

    #[test]
    fn borrower_without_the_code_records_the_rejection() {
        let f1 = file(vec![
            header("5,000.00", "", "Fund transfer"),
            ledger("Brac Bank PLC-CD-A/C-2028701210002"),
            terminator(),
        ]);
        let f2 = file(vec![
            header("", "5,000.00", "Fund receipt"),
            narration("Being fund received vide EBL#4056"),
            terminator(),
        ]);
        let ctx = run(&f1, &f2, &mapping());

        assert!(ctx.matches.is_empty());
        let reason = "Borrower's narration does not contain lender's short code";
        assert_eq!(ctx.tracker.reasons(FileSide::File1, 0), [reason]);
        assert_eq!(ctx.tracker.reasons(FileSide::File2, 0), [reason]);
    }

    #[test]
    fn block_without_interunit_data_is_reported_per_side() {
        let f1 = file(vec![
            header("5,000.00", "", "Fund transfer"),
            ledger("Brac Bank PLC-CD-A/C-2028701210002"),
            terminator(),
        ]);
        let f2 = file(vec![
            header("", "5,000.00", "Fund receipt"),
            narration("Being fund received from head office"),
            terminator(),
        ]);
        let ctx = run(&f1, &f2, &mapping());

        assert!(ctx.matches.is_empty());
        assert!(ctx.tracker.reasons(FileSide::File1, 0).is_empty());
        assert_eq!(
            ctx.tracker.reasons(FileSide::File2, 0),
            ["No interunit account found in File 2 block"]
        );
    }

    #[test]
    fn as_per_details_header_uses_the_first_mapped_leg() {
        let f1 = file(vec![
            header("5,000.00", "", "(as per details)"),
            ledger("Eastern Bank PLC-CD-A/C-1011060724056"),
            ledger("Brac Bank PLC-CD-A/C-2028701210002"),
            terminator(),
        ]);
        let f2 = file(vec![
            header("", "5,000.00", "Fund receipt"),
            narration("Being fund received vide BBL#0002"),
            terminator(),
        ]);
        let ctx = run(&f1, &f2, &mapping());

        // Only the first leg (EBL#4056) identifies the lender, so the
        // BBL reference on the borrower side is not enough.
        assert!(ctx.matches.is_empty());
        assert_eq!(
            ctx.tracker.reasons(FileSide::File1, 0),
            ["Borrower's narration does not contain lender's short code"]
        );
    }
}
