use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use interunit_core::{Direction, MatchDetail, MatchRecord, Money, TransactionBlock};

use crate::assign::validate_sequence;
use crate::engine::FileData;
use crate::strategy::manual::ManualCandidate;

/// The full result of one reconciliation run, serialized as the report.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReconOutcome {
    pub matches: Vec<MatchRecord>,
    pub manual_candidates: Vec<ManualCandidate>,
    /// Audit text per unmatched file-1 header row.
    pub unmatched_file1: BTreeMap<usize, String>,
    pub unmatched_file2: BTreeMap<usize, String>,
    /// Match counts keyed by strategy name.
    pub counts: BTreeMap<String, usize>,
}

impl ReconOutcome {
    pub fn assemble(
        matches: Vec<MatchRecord>,
        manual_candidates: Vec<ManualCandidate>,
        unmatched_file1: BTreeMap<usize, String>,
        unmatched_file2: BTreeMap<usize, String>,
    ) -> Self {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for m in &matches {
            *counts.entry(m.match_type.to_string()).or_default() += 1;
        }
        ReconOutcome { matches, manual_candidates, unmatched_file1, unmatched_file2, counts }
    }
}

fn amounts_suffix(amount: Money) -> String {
    format!("\nLender Amount: {amount}\nBorrower Amount: {amount}")
}

/// Human-readable summary line(s) for an accepted match.
pub fn create_audit_info(record: &MatchRecord) -> String {
    let amount = record.amount;
    match &record.detail {
        MatchDetail::Lc { number } => {
            format!("LC Match: {number}{}", amounts_suffix(amount))
        }
        MatchDetail::Po { number } => {
            format!("PO Match: {number}{}", amounts_suffix(amount))
        }
        MatchDetail::Interunit { short_code } => {
            format!("Interunit Loan Match: {short_code}{}", amounts_suffix(amount))
        }
        MatchDetail::Usd { amounts } => {
            format!("USD Match: {}{}", amounts.join(", "), amounts_suffix(amount))
        }
        MatchDetail::Settlement { employee_id, keyword_found } => {
            let mut out = format!("Settlement Match (ID: {employee_id})");
            if *keyword_found {
                out.push_str(" - 'Final Settlement' keyword found");
            }
            out
        }
        MatchDetail::Salary { month, year } => {
            if month.starts_with("EID_UL_") {
                format!("Festival Bonus Match - {month} {year}")
            } else {
                format!("Salary/Remuneration Match - {month} {year}")
            }
        }
        MatchDetail::AggregatedPo { po_numbers } => {
            format!(
                "Aggregated PO Match: {}{}",
                po_numbers.join(", "),
                amounts_suffix(amount)
            )
        }
        MatchDetail::Narration { .. } | MatchDetail::Manual => {
            format!("{} Match{}", record.match_type, amounts_suffix(amount))
        }
    }
}

/// Internal-consistency checks on a finished report: ID density and
/// one-match-per-header exclusivity. Returns every problem found.
pub fn verify_outcome(outcome: &ReconOutcome) -> Vec<String> {
    let mut problems = validate_sequence(&outcome.matches);

    let mut seen1: BTreeMap<usize, &str> = BTreeMap::new();
    let mut seen2: BTreeMap<usize, &str> = BTreeMap::new();
    for m in &outcome.matches {
        let id = m.id.as_deref().unwrap_or("?");
        if let Some(other) = seen1.insert(m.file1_header, id) {
            problems.push(format!(
                "file 1 header {} claimed by both {other} and {id}",
                m.file1_header
            ));
        }
        if m.file2_headers.is_empty() {
            problems.push(format!("match {id} has no file 2 headers"));
        }
        for &h in &m.file2_headers {
            if let Some(other) = seen2.insert(h, id) {
                problems.push(format!("file 2 header {h} claimed by both {other} and {id}"));
            }
        }
    }

    for (&h, id) in &seen1 {
        if outcome.unmatched_file1.contains_key(&h) {
            problems.push(format!("file 1 header {h} is both matched ({id}) and unmatched"));
        }
    }
    for (&h, id) in &seen2 {
        if outcome.unmatched_file2.contains_key(&h) {
            problems.push(format!("file 2 header {h} is both matched ({id}) and unmatched"));
        }
    }

    problems
}

fn block_by_header(blocks: &[TransactionBlock], header: usize) -> Option<&TransactionBlock> {
    blocks.iter().find(|b| b.header_row == header)
}

/// Cross-check a report against the files it was produced from: amounts
/// agree, directions oppose, aggregated borrower credits sum exactly.
pub fn verify_against(outcome: &ReconOutcome, file1: &FileData, file2: &FileData) -> Vec<String> {
    let mut problems = verify_outcome(outcome);

    for m in &outcome.matches {
        let id = m.id.as_deref().unwrap_or("?");
        let Some(b1) = block_by_header(&file1.blocks, m.file1_header) else {
            problems.push(format!("match {id}: file 1 header {} not found", m.file1_header));
            continue;
        };
        let expected1 = if m.file1_is_lender { Direction::Lender } else { Direction::Borrower };
        if b1.direction != expected1 {
            problems.push(format!("match {id}: file 1 block direction is {}", b1.direction));
        }

        let mut blocks2 = Vec::new();
        for &h in &m.file2_headers {
            match block_by_header(&file2.blocks, h) {
                Some(b) => blocks2.push(b),
                None => problems.push(format!("match {id}: file 2 header {h} not found")),
            }
        }
        for b2 in &blocks2 {
            if b2.direction != b1.direction.opposite() {
                problems.push(format!("match {id}: file 2 block {} has direction {}", b2.header_row, b2.direction));
            }
        }

        if m.file2_headers.len() > 1 {
            let total = blocks2.iter().fold(Money::zero(), |acc, b| acc + b.amount);
            if total != b1.amount {
                problems.push(format!(
                    "match {id}: aggregated amounts {total} do not sum to {}",
                    b1.amount
                ));
            }
        } else if let Some(b2) = blocks2.first() {
            if b1.amount != b2.amount || m.amount != b1.amount {
                problems.push(format!(
                    "match {id}: amounts disagree ({}, {}, {})",
                    m.amount, b1.amount, b2.amount
                ));
            }
        }
    }

    problems
}

#[cfg(test)]
mod tests {
    use super::*;
    use interunit_core::MatchType;

    fn record(detail: MatchDetail, match_type: MatchType) -> MatchRecord {
        MatchRecord {
            id: Some("M001".to_string()),
            match_type,
            file1_header: 0,
            file2_headers: vec![0],
            file1_is_lender: true,
            amount: Money::from_cents(500_000),
            detail,
            audit_info: String::new(),
        }
    }

    #[test]
    fn lc_audit_text() {
        let r = record(MatchDetail::Lc { number: "LC 123456".to_string() }, MatchType::Lc);
        assert_eq!(
            create_audit_info(&r),
            "LC Match: LC 123456\nLender Amount: 5000.00\nBorrower Amount: 5000.00"
        );
    }

    #[test]
    fn settlement_audit_text_with_keyword() {
        let r = record(
            MatchDetail::Settlement { employee_id: "10234".to_string(), keyword_found: true },
            MatchType::Settlement,
        );
        assert_eq!(
            create_audit_info(&r),
            "Settlement Match (ID: 10234) - 'Final Settlement' keyword found"
        );
    }

    #[test]
    fn bonus_and_salary_audit_texts() {
        let bonus = record(
            MatchDetail::Salary { month: "EID_UL_FITR".to_string(), year: "2025".to_string() },
            MatchType::Salary,
        );
        assert_eq!(create_audit_info(&bonus), "Festival Bonus Match - EID_UL_FITR 2025");

        let salary = record(
            MatchDetail::Salary { month: "APRIL".to_string(), year: "2025".to_string() },
            MatchType::Salary,
        );
        assert_eq!(create_audit_info(&salary), "Salary/Remuneration Match - APRIL 2025");
    }

    #[test]
    fn generic_audit_text_uses_type_name() {
        let r = record(MatchDetail::Manual, MatchType::Manual);
        assert!(create_audit_info(&r).starts_with("Manual Match\n"));
    }

    #[test]
    fn verify_flags_double_claims() {
        let mut a = record(MatchDetail::Manual, MatchType::Manual);
        a.id = Some("M001".to_string());
        let mut b = record(MatchDetail::Manual, MatchType::Manual);
        b.id = Some("M002".to_string());
        b.file1_header = 5;

        let outcome = ReconOutcome::assemble(vec![a, b], Vec::new(), BTreeMap::new(), BTreeMap::new());
        let problems = verify_outcome(&outcome);
        assert!(problems.iter().any(|p| p.contains("file 2 header 0")));
    }

    #[test]
    fn counts_keyed_by_strategy_name() {
        let outcome = ReconOutcome::assemble(
            vec![
                record(MatchDetail::Lc { number: "LC 1".into() }, MatchType::Lc),
                record(MatchDetail::Manual, MatchType::Manual),
            ],
            Vec::new(),
            BTreeMap::new(),
            BTreeMap::new(),
        );
        assert_eq!(outcome.counts.get("LC"), Some(&1));
        assert_eq!(outcome.counts.get("Manual"), Some(&1));
    }
}
