use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

use interunit_core::{RowRole, TransactionBlock};
use interunit_sheet::SheetModel;

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

re!(re_lc,
    r"\b(?:L/C|LC)[-\s]?\d+[/\s]?\d*\b");
// PO references are continuous slash-joined segments anchored on /PO/,
// e.g. CIL/C//PO//11/2024 or G24/PO/2024/9/29505.
re!(re_po,
    r"(?:^|\s)([A-Z0-9/]+/PO/[A-Z0-9/]+)(?:\s|$|[,.])");
re!(re_usd,
    r"\$\s*\.?\s*[\d,]+\.?\d*");
re!(re_employee_id,
    r"(?i)(?:Employee\s*[-\s]?\s*)?ID\s*[:\-]?\s*(\d{5})");
re!(re_final_settlement,
    r"(?i)final\s+settlement");
re!(re_month_of,
    r"\bMONTH\s+OF\s+(JANUARY|FEBRUARY|MARCH|APRIL|MAY|JUNE|JULY|AUGUST|SEPTEMBER|OCTOBER|NOVEMBER|DECEMBER)\s*[- ]\s*(20\d{2}|\d{2})\b");
re!(re_salary_of,
    r"\b(?:SALARY|REMUNERATION)\s+OF\s+(JANUARY|FEBRUARY|MARCH|APRIL|MAY|JUNE|JULY|AUGUST|SEPTEMBER|OCTOBER|NOVEMBER|DECEMBER)\s*[- ]\s*(20\d{2}|\d{2})\b");
re!(re_festival_bonus,
    r"\bFESTIVAL\s+BONUS\b");
re!(re_eid_year,
    r"\bEID(?:\s*[- ]\s*UL)?\s*[- ]\s*(FITR|AZHA)\s*[- ]\s*(20\d{2})\b");
// Narration short codes like MTBL#3858 or OBL#8826.
re!(re_short_code,
    r"([A-Z]{2,4})#(\d{4,6})");

// ── Token extractors ─────────────────────────────────────────────────────────

pub fn extract_lcs(text: &str) -> Vec<String> {
    let upper = text.to_uppercase();
    let mut out = Vec::new();
    for m in re_lc().find_iter(&upper) {
        let token = m.as_str().trim().to_string();
        if !out.contains(&token) {
            out.push(token);
        }
    }
    out
}

pub fn extract_pos(text: &str) -> Vec<String> {
    let upper = text.to_uppercase();
    re_po()
        .captures_iter(&upper)
        .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

pub fn extract_usd_amounts(text: &str) -> Vec<String> {
    let upper = text.to_uppercase();
    re_usd()
        .find_iter(&upper)
        .map(|m| m.as_str().to_string())
        .collect()
}

pub fn extract_employee_ids(text: &str) -> BTreeSet<String> {
    re_employee_id()
        .captures_iter(text)
        .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

pub fn has_settlement_keyword(text: &str) -> bool {
    re_final_settlement().is_match(text)
}

pub fn extract_short_codes(text: &str) -> Vec<String> {
    let upper = text.to_uppercase();
    let mut out = Vec::new();
    for m in re_short_code().find_iter(&upper) {
        let token = m.as_str().to_string();
        if !out.contains(&token) {
            out.push(token);
        }
    }
    out
}

/// Uppercase and strip to `[A-Z0-9- ]` with collapsed whitespace, so the
/// salary and bonus patterns see predictable text.
pub fn normalize_salary_text(text: &str) -> String {
    let kept: String = text
        .to_uppercase()
        .chars()
        .map(|c| match c {
            'A'..='Z' | '0'..='9' | '-' => c,
            _ => ' ',
        })
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn expand_year(raw: &str) -> String {
    if raw.len() == 4 {
        raw.to_string()
    } else {
        format!("20{raw}")
    }
}

/// All (MONTH, YYYY) keys from "MONTH OF ..." and "SALARY/REMUNERATION OF ..."
/// phrasings; two-digit years are widened to 20YY.
pub fn extract_month_years(text: &str) -> BTreeSet<(String, String)> {
    let t = normalize_salary_text(text);
    let mut keys = BTreeSet::new();
    for re in [re_month_of(), re_salary_of()] {
        for c in re.captures_iter(&t) {
            if let (Some(month), Some(year)) = (c.get(1), c.get(2)) {
                keys.insert((month.as_str().to_string(), expand_year(year.as_str())));
            }
        }
    }
    keys
}

/// (EID kind, YYYY) keys; empty unless the text also carries FESTIVAL BONUS.
pub fn extract_festival_bonus_keys(text: &str) -> BTreeSet<(String, String)> {
    let t = normalize_salary_text(text);
    if !re_festival_bonus().is_match(&t) {
        return BTreeSet::new();
    }
    re_eid_year()
        .captures_iter(&t)
        .filter_map(|c| {
            let kind = c.get(1)?.as_str().to_string();
            let year = c.get(2)?.as_str().to_string();
            Some((kind, year))
        })
        .collect()
}

pub fn looks_like_salary(text: &str) -> bool {
    let t = normalize_salary_text(text);
    let has_keyword = t.contains("SALARY") || t.contains("REMUNERATION");
    let has_month_year = re_month_of().is_match(&t) || re_salary_of().is_match(&t);
    let bonus_like = re_festival_bonus().is_match(&t) && re_eid_year().is_match(&t);
    (has_keyword && has_month_year) || bonus_like
}

// ── Per-block token bundle ───────────────────────────────────────────────────

/// Everything the strategies need from a block's text, computed once per
/// block so the cascade never re-reads cells.
#[derive(Debug, Clone, Default)]
pub struct BlockTokens {
    /// Particulars of the header row.
    pub header_text: String,
    /// First narration row's text, when the block has one.
    pub narration: Option<String>,
    /// All narration rows joined.
    pub narration_text: String,
    /// Every non-empty particulars cell in the block joined.
    pub block_text: String,
    pub lcs: Vec<String>,
    pub pos: Vec<String>,
    pub header_pos: Vec<String>,
    pub usd: Vec<String>,
    pub employee_ids: BTreeSet<String>,
    pub settlement_keyword: bool,
    pub salary_keys: BTreeSet<(String, String)>,
    pub bonus_keys: BTreeSet<(String, String)>,
    pub salary_like: bool,
    pub short_code_refs: Vec<String>,
}

impl BlockTokens {
    pub fn collect(model: &SheetModel, block: &TransactionBlock) -> Self {
        let header_text = model
            .row(block.header_row)
            .map(|r| r.particulars.clone())
            .unwrap_or_default();

        let mut narration = None;
        let mut narration_parts = Vec::new();
        let mut block_parts = Vec::new();
        for &row_idx in &block.rows {
            let Some(row) = model.row(row_idx) else { continue };
            if !row.particulars.is_empty() {
                block_parts.push(row.particulars.clone());
            }
            if row.role == RowRole::Narration && !row.particulars.is_empty() {
                if narration.is_none() {
                    narration = Some(row.particulars.clone());
                }
                narration_parts.push(row.particulars.clone());
            }
        }
        let narration_text = narration_parts.join(" ");
        let block_text = block_parts.join(" ");

        let usd = {
            let from_header = extract_usd_amounts(&header_text);
            if from_header.is_empty() {
                extract_usd_amounts(&narration_text)
            } else {
                from_header
            }
        };

        BlockTokens {
            lcs: extract_lcs(&narration_text),
            pos: extract_pos(&narration_text),
            header_pos: extract_pos(&header_text),
            usd,
            employee_ids: extract_employee_ids(&block_text),
            settlement_keyword: has_settlement_keyword(&block_text),
            salary_keys: extract_month_years(&block_text),
            bonus_keys: extract_festival_bonus_keys(&block_text),
            salary_like: looks_like_salary(&block_text),
            short_code_refs: extract_short_codes(&narration_text),
            header_text,
            narration,
            narration_text,
            block_text,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── LC / PO ───────────────────────────────────────────────────────────────

    #[test]
    fn lc_variants() {
        assert_eq!(extract_lcs("against LC 123456/2"), vec!["LC 123456/2"]);
        assert_eq!(extract_lcs("against L/C-654321"), vec!["L/C-654321"]);
        assert_eq!(extract_lcs("payment of lc 9981"), vec!["LC 9981"]);
        assert!(extract_lcs("no letters of credit here").is_empty());
    }

    #[test]
    fn lc_deduplicates() {
        let lcs = extract_lcs("LC 1234 adjusted, balance of LC 1234");
        assert_eq!(lcs, vec!["LC 1234"]);
    }

    #[test]
    fn po_anchored_on_po_segment() {
        assert_eq!(
            extract_pos("payment against G24/PO/2024/9/29505 being made"),
            vec!["G24/PO/2024/9/29505"]
        );
        assert_eq!(
            extract_pos("CIL/C//PO//11/2024."),
            vec!["CIL/C//PO//11/2024"]
        );
        assert!(extract_pos("PO box 1234").is_empty());
    }

    // ── USD ──────────────────────────────────────────────────────────────────

    #[test]
    fn usd_formats() {
        assert_eq!(extract_usd_amounts("inward $147,401.28 against export"), vec!["$147,401.28"]);
        assert_eq!(extract_usd_amounts("$80 and $6,400"), vec!["$80", "$6,400"]);
        assert_eq!(extract_usd_amounts("$.789,663.20 remitted"), vec!["$.789,663.20"]);
        assert!(extract_usd_amounts("no dollars").is_empty());
    }

    // ── Settlement ───────────────────────────────────────────────────────────

    #[test]
    fn employee_ids_five_digits() {
        let ids = extract_employee_ids("Final settlement of Employee ID: 10234 and ID-20456");
        assert!(ids.contains("10234"));
        assert!(ids.contains("20456"));
        assert!(extract_employee_ids("ID: 123").is_empty());
    }

    #[test]
    fn settlement_keyword_case_insensitive() {
        assert!(has_settlement_keyword("being FINAL  Settlement paid"));
        assert!(!has_settlement_keyword("settlement of dues"));
    }

    // ── Salary / bonus ───────────────────────────────────────────────────────

    #[test]
    fn month_year_phrasings() {
        let keys = extract_month_years("SALARY FOR THE MONTH OF APRIL-2025");
        assert!(keys.contains(&("APRIL".to_string(), "2025".to_string())));

        let keys = extract_month_years("REMUNERATION OF JULY 24");
        assert!(keys.contains(&("JULY".to_string(), "2024".to_string())));
    }

    #[test]
    fn salary_gate_requires_keyword_and_date() {
        assert!(looks_like_salary("Salary for the month of April-2025 paid"));
        assert!(!looks_like_salary("month of April-2025"));
        assert!(!looks_like_salary("Salary paid to staff"));
    }

    #[test]
    fn festival_bonus_needs_both_markers() {
        let text = "FESTIVAL BONUS for EID-UL-FITR-2025";
        assert_eq!(
            extract_festival_bonus_keys(text),
            BTreeSet::from([("FITR".to_string(), "2025".to_string())])
        );
        assert!(extract_festival_bonus_keys("EID UL AZHA 2025 allowance").is_empty());
        assert!(looks_like_salary(text));
    }

    #[test]
    fn eid_separator_variants() {
        for text in [
            "festival bonus eid ul fitr 2025",
            "Festival Bonus EID-UL-FITR-2025",
            "festival bonus, EID UL-FITR 2025!",
        ] {
            assert_eq!(
                extract_festival_bonus_keys(text),
                BTreeSet::from([("FITR".to_string(), "2025".to_string())]),
                "failed on {text:?}"
            );
        }
    }

    #[test]
    fn normalize_strips_punctuation() {
        assert_eq!(
            normalize_salary_text("Salary, of:  April-2025 (net)"),
            "SALARY OF APRIL-2025 NET"
        );
    }

    // ── Short codes ──────────────────────────────────────────────────────────

    #[test]
    fn short_code_refs() {
        assert_eq!(
            extract_short_codes("transferred to MTBL#3858 & obl#8826"),
            vec!["MTBL#3858", "OBL#8826"]
        );
        assert!(extract_short_codes("account 2028701210002").is_empty());
    }
}
